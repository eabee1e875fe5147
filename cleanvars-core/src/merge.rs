// cleanvars-core/src/merge.rs
//! Value-span consolidation.
//!
//! The tokenizer splits an unquoted value such as `!pass w0rd` over
//! several nodes. For every key whose name looks sensitive, this pass
//! merges the fragments following the separator into the first value node
//! so that the identification pass sees the whole value as one node.
//! Quoted values are left alone; their extent is already delimited by the
//! holder and its closing quote.
//!
//! License: MIT OR APACHE 2.0

use crate::errors::ScrubError;
use crate::fields::is_sensitive_field_name;
use crate::node::{NodeArena, NodeId, NodeKind};

/// True when `node` is followed, over at least one space, by a field that
/// is itself followed by a `:`. In `secret1: foo secret2: bar` the two
/// keys hold distinct secrets and the span of the first must not swallow
/// the second.
fn is_a_new_key_value(arena: &NodeArena, node: NodeId) -> bool {
    let Some(mut current) = arena.next(node) else {
        return false;
    };
    if arena.kind(current) != NodeKind::Space {
        return false;
    }
    while arena.kind(current) == NodeKind::Space {
        match arena.next(current) {
            Some(n) => current = n,
            None => return false,
        }
    }
    arena.kind(current) == NodeKind::Field
        && arena.next(current).is_some_and(|n| arena.text(n) == ":")
}

/// The separator that binds the value to the key `node`: the first
/// non-space node after the key, if it is a separator.
fn find_separator_node(arena: &NodeArena, node: NodeId) -> Option<NodeId> {
    let mut current = node;
    while let Some(next) = arena.next(current) {
        match arena.kind(next) {
            NodeKind::Space => current = next,
            NodeKind::Separator => return Some(next),
            _ => return None,
        }
    }
    None
}

/// Merge the fragmented value span of every sensitive key into a single
/// node. A separator of the other character than the key's own (`=` under
/// a `:` key, or the reverse) is part of the value and merges too.
pub fn merge_value_spans(arena: &mut NodeArena) -> Result<(), ScrubError> {
    let mut current = arena.root();
    while let Some(next) = arena.next(current) {
        current = next;
        if arena.kind(current) != NodeKind::Field {
            continue;
        }
        if !is_sensitive_field_name(arena.text(current)) {
            continue;
        }
        let Some(candidate) = arena.find_secret_candidate(current)? else {
            continue;
        };
        let Some(separator) = find_separator_node(arena, current) else {
            continue;
        };
        if arena.kind(candidate) == NodeKind::QuotedStringHolder {
            let Some(closing) = arena.node(candidate).closed_by else {
                return Err(ScrubError::InvariantViolation(
                    "quoted value candidate left unclosed after quote repair".to_string(),
                ));
            };
            current = closing;
            continue;
        }
        let separator_text = arena.text(separator).to_string();
        while let Some(n) = arena.next(candidate) {
            let mergeable = matches!(
                arena.kind(n),
                NodeKind::Space | NodeKind::Field | NodeKind::Unknown
            ) || (arena.kind(n) == NodeKind::Separator
                && arena.text(n) != separator_text);
            if !mergeable || is_a_new_key_value(arena, candidate) {
                break;
            }
            log::debug!("merging value fragment {:?}", arena.text(n));
            arena.merge_with_next(candidate);
        }
    }
    Ok(())
}
