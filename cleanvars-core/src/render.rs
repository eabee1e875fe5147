// cleanvars-core/src/render.rs
//! Chain rendering and the secret-hiding pipeline.
//!
//! Rendering concatenates the live chain back into text, substituting
//! every secret node with the value template applied to a variable name
//! derived from its key. An unquoted secret at the top level gets wrapped
//! in double quotes so the placeholder stays a single YAML scalar; a
//! secret inside quotes keeps the quoting already present in the chain.
//!
//! License: MIT OR APACHE 2.0

use crate::errors::ScrubError;
use crate::fields::variable_name;
use crate::identify::identify_secrets;
use crate::merge::merge_value_spans;
use crate::multiline::group_multiline_blocks;
use crate::node::{NodeArena, NodeKind};
use crate::tokenizer::{close_unterminated_quotes, fold_backslashes, tokenize};

/// The replacement written in place of a secret value. The `${name}`
/// placeholder receives the sanitized variable name derived from the key,
/// so the default template turns `password: hunter2` into
/// `password: "{{ password }}"`.
#[derive(Debug, Clone)]
pub struct ValueTemplate {
    template: String,
}

impl ValueTemplate {
    pub fn new(template: impl Into<String>) -> Self {
        ValueTemplate {
            template: template.into(),
        }
    }

    /// Expand the template for the key named `field_name`.
    pub fn expand(&self, field_name: &str) -> String {
        self.template.replace("${name}", &variable_name(field_name))
    }
}

impl Default for ValueTemplate {
    fn default() -> Self {
        ValueTemplate::new("{{ ${name} }}")
    }
}

/// Concatenate the live chain, substituting secret nodes with the
/// expanded template.
pub fn render(arena: &NodeArena, template: &ValueTemplate) -> String {
    let mut out = String::new();
    for id in arena.iter() {
        if arena.kind(id) != NodeKind::Secret {
            out.push_str(arena.text(id));
            continue;
        }
        let key_text = match arena.node(id).secret_value_of {
            Some(key) => arena.text(key),
            None => {
                debug_assert!(false, "secret node without a key");
                ""
            }
        };
        let replacement = template.expand(key_text);
        // The root holder carries no text; a secret attached to it was
        // unquoted in the input.
        let unquoted = arena.node(id).holder.is_none_or(|h| arena.text(h).is_empty());
        if unquoted {
            out.push('"');
            out.push_str(&replacement);
            out.push('"');
        } else {
            out.push_str(&replacement);
        }
    }
    out
}

fn try_hide_secrets(block: &str, template: &ValueTemplate) -> Result<String, ScrubError> {
    let mut arena = tokenize(block);
    close_unterminated_quotes(&mut arena);
    fold_backslashes(&mut arena);
    group_multiline_blocks(&mut arena);
    merge_value_spans(&mut arena)?;
    identify_secrets(&mut arena)?;
    Ok(render(&arena, template))
}

/// Run the whole secret-hiding pipeline over one block of text. Accepts
/// arbitrary input and never fails: an invariant failure inside a pass is
/// a bug, asserted in development builds, and leaves the block unchanged
/// in release builds.
pub fn hide_secrets(block: &str, template: &ValueTemplate) -> String {
    match try_hide_secrets(block, template) {
        Ok(out) => out,
        Err(err) => {
            debug_assert!(false, "secret-hiding pipeline failed: {err}");
            log::error!("secret-hiding pipeline failed, block left unchanged: {err}");
            block.to_string()
        }
    }
}
