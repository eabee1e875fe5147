// cleanvars-core/src/tokenizer.rs
//! Single-pass tolerant tokenizer for YAML/INI-like text.
//!
//! Consumes the input character by character and builds the node chain.
//! Quoting context is tracked through the holder chain: a quote character
//! closes the innermost open holder with the same literal character and
//! the same escape-protection status, otherwise it opens a new level.
//! Escaped and unescaped quote contexts never close each other.
//!
//! The tokenizer accepts any input and always produces a chain whose
//! concatenated text reproduces the input exactly; it has no error case.
//!
//! License: MIT OR APACHE 2.0

use crate::node::{NodeArena, NodeId, NodeKind};

/// Variable names cannot start with a digit.
fn is_valid_first_character_for_a_variable(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '-' || c == '_'
}

fn is_valid_variable_character(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

fn is_field_value_separator(c: char) -> bool {
    c == ':' || c == '='
}

/// Break `block` into the typed node chain. Every character lands in
/// exactly one node; adjacent characters of the same kind coalesce.
pub fn tokenize(block: &str) -> NodeArena {
    let mut arena = NodeArena::new();
    let mut current = arena.root();

    for (pos, c) in block.char_indices() {
        match c {
            '\\' => {
                let node = arena.push(pos);
                arena.attach(node, current);
                arena.node_mut(node).kind = NodeKind::Backslash;
                current = node;
            }
            '\'' | '"' => {
                let is_protected = arena.kind(current) == NodeKind::Backslash;
                let quote = if c == '\'' { "'" } else { "\"" };

                // Innermost compatible opener, skipping holders of a
                // different character or escape context. The current node
                // can itself be the opener (an empty quoted string).
                let mut open = None;
                let mut holder = if arena.kind(current) == NodeKind::QuotedStringHolder {
                    Some(current)
                } else {
                    arena.node(current).holder
                };
                while let Some(h) = holder {
                    let n = arena.node(h);
                    if n.text == quote && n.is_protected == is_protected && n.closed_by.is_none() {
                        open = Some(h);
                        break;
                    }
                    holder = n.holder;
                }

                match open {
                    Some(h) => {
                        let node = arena.push(pos);
                        arena.attach(node, current);
                        arena.node_mut(node).kind = NodeKind::QuotedStringClosing;
                        arena.node_mut(h).closed_by = Some(node);
                        current = node;
                    }
                    None => {
                        let node = arena.push(pos);
                        arena.node_mut(node).kind = NodeKind::QuotedStringHolder;
                        arena.node_mut(node).is_protected = is_protected;
                        arena.attach(node, current);
                        current = node;
                    }
                }
            }
            c if is_valid_first_character_for_a_variable(c) => {
                if arena.kind(current) != NodeKind::Field {
                    let node = arena.push(pos);
                    arena.attach(node, current);
                    arena.node_mut(node).kind = NodeKind::Field;
                    current = node;
                }
            }
            c if is_valid_variable_character(c) => {
                // A digit extends a field or an unknown run but cannot
                // start a field.
                if arena.kind(current) != NodeKind::Field && arena.kind(current) != NodeKind::Unknown
                {
                    let node = arena.push(pos);
                    arena.attach(node, current);
                    current = node;
                }
            }
            c if is_field_value_separator(c) => {
                let node = arena.push(pos);
                arena.attach(node, current);
                arena.node_mut(node).kind = NodeKind::Separator;
                current = node;
            }
            '\n' => {
                let node = arena.push(pos);
                arena.attach(node, current);
                arena.node_mut(node).kind = NodeKind::NewLine;
                current = node;
            }
            ' ' => {
                let node = arena.push(pos);
                arena.attach(node, current);
                arena.node_mut(node).kind = NodeKind::Space;
                current = node;
            }
            _ => {
                if arena.kind(current) != NodeKind::Unknown {
                    let node = arena.push(pos);
                    arena.attach(node, current);
                    current = node;
                }
            }
        }
        arena.node_mut(current).text.push(c);
    }
    arena
}

/// Degrade holders left open at end of input to plain unknown text. The
/// root is the implicit top-level context and stays open.
pub fn close_unterminated_quotes(arena: &mut NodeArena) {
    let mut cursor = arena.next(arena.root());
    while let Some(id) = cursor {
        cursor = arena.next(id);
        if arena.kind(id) == NodeKind::QuotedStringHolder && arena.node(id).closed_by.is_none() {
            arena.node_mut(id).kind = NodeKind::Unknown;
        }
    }
}

/// Fold each backslash that protects a quote into that quote's node, and
/// degrade every other backslash to unknown text. The backslash kind only
/// exists to identify protected quotes during tokenization.
pub fn fold_backslashes(arena: &mut NodeArena) {
    let mut cursor = arena.next(arena.root());
    while let Some(id) = cursor {
        if arena.kind(id) != NodeKind::Backslash {
            cursor = arena.next(id);
            continue;
        }
        let next = arena.next(id);
        let protects_quote = next.is_some_and(|n| {
            matches!(
                arena.kind(n),
                NodeKind::QuotedStringHolder | NodeKind::QuotedStringClosing
            ) && arena.node(id).holder == arena.node(n).holder
        });
        if let (true, Some(n)) = (protects_quote, next) {
            let backslash_text = std::mem::take(&mut arena.node_mut(id).text);
            arena.node_mut(n).text.insert_str(0, &backslash_text);
            let prev = arena.previous(id);
            if let Some(p) = prev {
                arena.node_mut(p).next = Some(n);
            }
            arena.node_mut(n).previous = prev;
            let tombstone = arena.node_mut(id);
            tombstone.kind = NodeKind::Deleted;
            tombstone.next = None;
            tombstone.previous = None;
            cursor = arena.next(n);
        } else {
            arena.node_mut(id).kind = NodeKind::Unknown;
            cursor = arena.next(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(arena: &NodeArena) -> Vec<NodeKind> {
        arena.iter().map(|id| arena.kind(id)).collect()
    }

    fn expand(arena: &NodeArena) -> Vec<(String, NodeKind)> {
        arena
            .iter()
            .map(|id| (arena.text(id).to_string(), arena.kind(id)))
            .collect()
    }

    #[test]
    fn simple_key_value_string() {
        let arena = tokenize("config_reverseproxy_oauth_password: \"passw0rd\"");
        assert_eq!(
            expand(&arena),
            vec![
                ("".to_string(), NodeKind::QuotedStringHolder),
                (
                    "config_reverseproxy_oauth_password".to_string(),
                    NodeKind::Field
                ),
                (":".to_string(), NodeKind::Separator),
                (" ".to_string(), NodeKind::Space),
                ("\"".to_string(), NodeKind::QuotedStringHolder),
                ("passw0rd".to_string(), NodeKind::Field),
                ("\"".to_string(), NodeKind::QuotedStringClosing),
            ]
        );
    }

    #[test]
    fn spaces_are_one_node_each() {
        let arena = tokenize("config_reverseproxy_oauth_password:      \"passw0rd\"");
        assert_eq!(
            kinds(&arena),
            vec![
                NodeKind::QuotedStringHolder,
                NodeKind::Field,
                NodeKind::Separator,
                NodeKind::Space,
                NodeKind::Space,
                NodeKind::Space,
                NodeKind::Space,
                NodeKind::Space,
                NodeKind::Space,
                NodeKind::QuotedStringHolder,
                NodeKind::Field,
                NodeKind::QuotedStringClosing,
            ]
        );
    }

    #[test]
    fn empty_quoted_value() {
        let arena = tokenize("password=\"\"");
        assert_eq!(
            kinds(&arena),
            vec![
                NodeKind::QuotedStringHolder,
                NodeKind::Field,
                NodeKind::Separator,
                NodeKind::QuotedStringHolder,
                NodeKind::QuotedStringClosing,
            ]
        );
        let ids: Vec<_> = arena.iter().collect();
        assert_eq!(arena.node(ids[3]).closed_by, Some(ids[4]));
    }

    #[test]
    fn adjacent_empty_pairs_close_innermost_first() {
        let arena = tokenize("k: '' \"\"");
        assert_eq!(
            kinds(&arena),
            vec![
                NodeKind::QuotedStringHolder,
                NodeKind::Field,
                NodeKind::Separator,
                NodeKind::Space,
                NodeKind::QuotedStringHolder,
                NodeKind::QuotedStringClosing,
                NodeKind::Space,
                NodeKind::QuotedStringHolder,
                NodeKind::QuotedStringClosing,
            ]
        );
        let ids: Vec<_> = arena.iter().collect();
        assert_eq!(arena.node(ids[4]).closed_by, Some(ids[5]));
        assert_eq!(arena.node(ids[7]).closed_by, Some(ids[8]));
    }

    #[test]
    fn one_character_quoted_value() {
        let arena = tokenize("password=\"a\"");
        assert_eq!(
            kinds(&arena),
            vec![
                NodeKind::QuotedStringHolder,
                NodeKind::Field,
                NodeKind::Separator,
                NodeKind::QuotedStringHolder,
                NodeKind::Field,
                NodeKind::QuotedStringClosing,
            ]
        );
        let ids: Vec<_> = arena.iter().collect();
        assert_eq!(arena.node(ids[3]).closed_by, Some(ids[5]));
    }

    #[test]
    fn nested_quote_of_a_different_character_is_skipped_transparently() {
        // The closing double quote pairs with the outer double quote even
        // though a single-quote level opened in between and never closed.
        let arena = tokenize("\"aaa'\n   passwd: bob'\"");
        let ids: Vec<_> = arena.iter().collect();
        let outer = ids[1];
        assert_eq!(arena.text(outer), "\"");
        assert_eq!(arena.kind(outer), NodeKind::QuotedStringHolder);
        let closer = arena.node(outer).closed_by.expect("outer quote closed");
        assert_eq!(arena.next(closer), None);
    }

    #[test]
    fn escaped_quotes_pair_with_each_other_only() {
        let mut arena = tokenize("\"aaa\n   \\\"passwd: bob\\\"\"");
        let protected: Vec<_> = arena
            .iter()
            .filter(|&id| arena.node(id).is_protected)
            .collect();
        assert_eq!(protected.len(), 1);
        assert!(arena.node(protected[0]).closed_by.is_some());

        close_unterminated_quotes(&mut arena);
        fold_backslashes(&mut arena);
        // Backslashes are folded into the quote nodes they protect.
        assert!(arena.iter().all(|id| arena.kind(id) != NodeKind::Backslash));
        assert_eq!(arena.reconstruct(), "\"aaa\n   \\\"passwd: bob\\\"\"");
    }

    #[test]
    fn unterminated_quote_degrades_to_unknown() {
        let mut arena = tokenize("my_password=      !pass w0rd\"");
        close_unterminated_quotes(&mut arena);
        assert!(arena
            .iter()
            .skip(1)
            .all(|id| arena.kind(id) != NodeKind::QuotedStringHolder));
        assert_eq!(arena.reconstruct(), "my_password=      !pass w0rd\"");
    }

    #[test]
    fn lone_backslash_degrades_to_unknown() {
        let mut arena = tokenize("a\\b");
        close_unterminated_quotes(&mut arena);
        fold_backslashes(&mut arena);
        let texts: Vec<&str> = arena.iter().map(|id| arena.text(id)).collect();
        assert_eq!(texts, vec!["", "a", "\\", "b"]);
        assert_eq!(arena.kind(arena.iter().nth(2).unwrap()), NodeKind::Unknown);
    }
}
