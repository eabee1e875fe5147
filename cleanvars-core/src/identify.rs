// cleanvars-core/src/identify.rs
//! Secret identification over the merged node chain.
//!
//! Walks the chain once and, for every key whose name looks sensitive,
//! relabels its value node as a secret pointing back to the key. Quoted
//! values first get their interior collapsed into one node; the opening
//! and closing quote nodes stay in the chain so the rendered output keeps
//! the original quoting. The node text is never rewritten here, which
//! lets callers inspect the identified secrets before rendering.
//!
//! Values that are filesystem paths, UUIDs or Jinja2 expressions are left
//! alone no matter what their key is called.
//!
//! License: MIT OR APACHE 2.0

use crate::errors::ScrubError;
use crate::fields::{is_jinja2_expression, is_path, is_sensitive_field_name, is_uuid_string};
use crate::node::{NodeArena, NodeId, NodeKind};

fn is_exempt_value(text: &str) -> bool {
    let trimmed = text.trim();
    is_uuid_string(trimmed) || is_path(trimmed) || is_jinja2_expression(trimmed)
}

fn tag(arena: &mut NodeArena, value: NodeId, key: NodeId) {
    log::debug!(
        "identified secret value for field {:?}",
        arena.text(key)
    );
    let node = arena.node_mut(value);
    node.kind = NodeKind::Secret;
    node.secret_value_of = Some(key);
}

/// Tag every sensitive key's value node as `Secret`. Expects the chain to
/// have gone through quote repair and value-span merging first.
pub fn identify_secrets(arena: &mut NodeArena) -> Result<(), ScrubError> {
    let mut cursor = Some(arena.root());
    while let Some(id) = cursor {
        cursor = arena.next(id);
        if arena.kind(id) != NodeKind::Field {
            continue;
        }
        if !is_sensitive_field_name(arena.text(id)) {
            continue;
        }
        let Some(candidate) = arena.find_secret_candidate(id)? else {
            continue;
        };
        if arena.kind(candidate) == NodeKind::QuotedStringHolder {
            let Some(closing) = arena.node(candidate).closed_by else {
                return Err(ScrubError::InvariantViolation(
                    "quoted value candidate left unclosed after quote repair".to_string(),
                ));
            };
            let Some(interior) = arena.next(candidate) else {
                return Err(ScrubError::InvariantViolation(
                    "quote holder detached from its closing node".to_string(),
                ));
            };
            if interior != closing {
                // Collapse everything strictly between the quotes.
                loop {
                    match arena.next(interior) {
                        Some(n) if n == closing => break,
                        Some(_) => arena.merge_with_next(interior),
                        None => {
                            return Err(ScrubError::InvariantViolation(
                                "quote closing unreachable from its interior".to_string(),
                            ))
                        }
                    }
                }
                if !is_exempt_value(arena.text(interior)) {
                    tag(arena, interior, id);
                }
            }
            cursor = arena.next(closing);
        } else {
            if !is_exempt_value(arena.text(candidate)) {
                tag(arena, candidate, id);
            }
            cursor = arena.next(candidate);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merge::merge_value_spans;
    use crate::multiline::group_multiline_blocks;
    use crate::tokenizer::{close_unterminated_quotes, fold_backslashes, tokenize};
    use std::collections::BTreeMap;

    fn parse(block: &str) -> NodeArena {
        let mut arena = tokenize(block);
        close_unterminated_quotes(&mut arena);
        fold_backslashes(&mut arena);
        group_multiline_blocks(&mut arena);
        merge_value_spans(&mut arena).unwrap();
        identify_secrets(&mut arena).unwrap();
        arena
    }

    fn secrets(arena: &NodeArena) -> BTreeMap<String, String> {
        arena
            .iter()
            .filter(|&id| arena.kind(id) == NodeKind::Secret)
            .map(|id| {
                let key = arena.node(id).secret_value_of.expect("secret has a key");
                (arena.text(key).to_string(), arena.text(id).to_string())
            })
            .collect()
    }

    #[test]
    fn trailing_secret_on_last_line() {
        let arena = parse("password1: foobar\npassword: barfoo");
        assert_eq!(
            secrets(&arena),
            BTreeMap::from([
                ("password1".to_string(), "foobar".to_string()),
                ("password".to_string(), "barfoo".to_string()),
            ])
        );
    }

    #[test]
    fn quoted_key_and_quoted_value() {
        let arena = parse("\n    \"password9\": \"my_password10: maxplus\"\n    ");
        assert_eq!(
            secrets(&arena),
            BTreeMap::from([(
                "password9".to_string(),
                "my_password10: maxplus".to_string()
            )])
        );
    }

    #[test]
    fn pattern_within_quoted_string() {
        let arena = parse("\n    'password9: \"my_password10: maxplus\"'\n    ");
        assert_eq!(
            secrets(&arena),
            BTreeMap::from([(
                "password9".to_string(),
                "my_password10: maxplus".to_string()
            )])
        );
    }

    #[test]
    fn nested_single_quote_inside_double_quotes() {
        let arena = parse("\n    \"aaa'\n       passwd: bob'\"\n    ");
        assert_eq!(
            secrets(&arena),
            BTreeMap::from([("passwd".to_string(), "bob".to_string())])
        );
    }

    #[test]
    fn protected_double_quotes() {
        let arena = parse("\n    \"aaa\n       \\\"passwd: bob\\\"\"\n    ");
        assert_eq!(
            secrets(&arena),
            BTreeMap::from([("passwd".to_string(), "bob".to_string())])
        );
    }

    #[test]
    fn vars_file_with_quoted_password() {
        let arena = parse(
            "\nansible_user: root\nansible_host: esxi1-gw.ws.testing.ansible.com\nansible_password: '!234AaAa56'\n",
        );
        assert_eq!(
            secrets(&arena),
            BTreeMap::from([("ansible_password".to_string(), "!234AaAa56".to_string())])
        );
    }

    #[test]
    fn unquoted_value_with_spaces() {
        let arena = parse("ansible_password: an unquoted string\n");
        assert_eq!(
            secrets(&arena),
            BTreeMap::from([(
                "ansible_password".to_string(),
                "an unquoted string".to_string()
            )])
        );
    }

    #[test]
    fn long_crypt_hash_value() {
        let hash = "$6$j212wezy$7H/1LT4f9/N3wpgNunhsIqtMj62OKiS3nyNwuizouQc3u7MbYCarYeAHWYPYb2FT.lbioDm2RrkJPb9BZMN1O/";
        let arena = parse(&format!("\n    passwd: {hash}\n    "));
        assert_eq!(
            secrets(&arena),
            BTreeMap::from([("passwd".to_string(), hash.to_string())])
        );
    }

    #[test]
    fn many_secrets_in_one_block() {
        let sample = concat!(
            "\n",
            "'(?i)password1:': \"{{ _iosxr_password }}\"\n",
            "\"this is somethingpass: password2: else my_password3: 'password4: _Agaim': barfoo\"\n",
            "password5: maxplus\n",
            "password6: \"maxplus\"\n",
            "password7: \"my_password8: maxplus\"\n",
            "\"password9\": \"my_password10: maxplus\"\n",
            "password11: \"my_password12:\n          maxplus\"\n",
        );
        let arena = parse(sample);
        assert_eq!(
            secrets(&arena),
            BTreeMap::from([
                ("somethingpass".to_string(), "password2".to_string()),
                ("my_password3".to_string(), "password4: _Agaim".to_string()),
                ("password5".to_string(), "maxplus".to_string()),
                ("password6".to_string(), "maxplus".to_string()),
                ("password7".to_string(), "my_password8: maxplus".to_string()),
                ("password9".to_string(), "my_password10: maxplus".to_string()),
                (
                    "password11".to_string(),
                    "my_password12:\n          maxplus".to_string()
                ),
            ])
        );
    }

    #[test]
    fn empty_quoted_value_produces_no_secret() {
        let arena = parse("password=\"\"");
        assert!(secrets(&arena).is_empty());
        assert_eq!(arena.reconstruct(), "password=\"\"");
    }

    #[test]
    fn path_value_is_exempt() {
        let arena = parse("private_key: ~/.ssh/id_rsa");
        assert!(secrets(&arena).is_empty());
    }

    #[test]
    fn uuid_value_is_exempt() {
        let arena = parse("secret_key: ce34efc1-f5e3-4b0f-bb2c-5272319589a7");
        assert!(secrets(&arena).is_empty());
    }

    #[test]
    fn jinja2_value_is_exempt() {
        let arena = parse("password6: \"{{ vaulted_password }}\"");
        assert!(secrets(&arena).is_empty());
    }

    #[test]
    fn allow_listed_field_is_exempt() {
        let arena = parse("line=\"%wheel\tALL=(ALL)\tNOPASSWD: ALL\"");
        assert!(secrets(&arena).is_empty());
    }

    #[test]
    fn block_scalar_value_is_one_secret() {
        let arena = parse("passwd: |\n  my\n  multi\n  line\n");
        assert_eq!(
            secrets(&arena),
            BTreeMap::from([("passwd".to_string(), "|\n  my\n  multi\n  line".to_string())])
        );
    }
}
