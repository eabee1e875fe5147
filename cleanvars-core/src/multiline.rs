// cleanvars-core/src/multiline.rs
//! YAML block-scalar grouping.
//!
//! A `key: |` (or `key: >`) header followed by an indented block is folded
//! into a single field node so that the whole scalar is treated as one
//! atomic value by the secret identification passes. Continuation lines
//! belong to the block while their leading space run is at least as long
//! as the first continuation line's indent.
//!
//! License: MIT OR APACHE 2.0

use crate::node::{NodeArena, NodeId, NodeKind};

/// The nodes that compose one line, with the length of its leading space
/// run.
struct Line {
    indent: usize,
    nodes: Vec<NodeId>,
}

impl Line {
    fn last(&self) -> NodeId {
        *self.nodes.last().expect("a line holds at least one node")
    }
}

/// True when `id` is the `|`/`>` header of a block scalar: preceded by
/// `field`, `:` separator and a space, followed by a newline and a space.
/// Headers tokenize as unknown text; only their literal text matters.
fn is_block_header(arena: &NodeArena, id: NodeId) -> bool {
    let text = arena.text(id);
    if text != "|" && text != ">" {
        return false;
    }
    let p1 = arena.previous(id);
    let p2 = p1.and_then(|p| arena.previous(p));
    let p3 = p2.and_then(|p| arena.previous(p));
    let (Some(p1), Some(p2), Some(p3)) = (p1, p2, p3) else {
        return false;
    };
    if arena.kind(p1) != NodeKind::Space
        || arena.kind(p2) != NodeKind::Separator
        || arena.kind(p3) != NodeKind::Field
    {
        return false;
    }
    if arena.text(p2) != ":" {
        return false;
    }
    let n1 = arena.next(id);
    let n2 = n1.and_then(|n| arena.next(n));
    matches!(
        (n1.map(|n| arena.kind(n)), n2.map(|n| arena.kind(n))),
        (Some(NodeKind::NewLine), Some(NodeKind::Space))
    )
}

/// Read one line starting at `start`: leading spaces first, then every
/// node up to and including the newline (or end of input).
fn read_one_line(arena: &NodeArena, start: NodeId) -> Line {
    let mut indent = 0;
    let mut nodes = Vec::new();
    let mut c = start;
    while arena.kind(c) == NodeKind::Space {
        let Some(n) = arena.next(c) else {
            break;
        };
        indent += arena.text(c).len();
        nodes.push(c);
        c = n;
    }
    loop {
        nodes.push(c);
        if arena.kind(c) == NodeKind::NewLine {
            break;
        }
        match arena.next(c) {
            Some(n) => c = n,
            None => break,
        }
    }
    Line { indent, nodes }
}

/// Collect the continuation lines belonging to the block headed by
/// `header`, stopping at the first line indented less than the first one.
fn collect_block_lines(arena: &NodeArena, header: NodeId) -> Vec<Line> {
    // Slip past the newline that follows the header.
    let Some(mut c) = arena.next(header) else {
        return Vec::new();
    };
    while arena.kind(c) == NodeKind::Space {
        match arena.next(c) {
            Some(n) => c = n,
            None => break,
        }
    }
    let Some(first_of_line) = arena.next(c) else {
        return Vec::new();
    };
    let first = read_one_line(arena, first_of_line);
    let first_indent = first.indent;
    let mut last = first.last();
    let mut lines = vec![first];
    while let Some(n) = arena.next(last) {
        let line = read_one_line(arena, n);
        if line.indent < first_indent {
            break;
        }
        last = line.last();
        lines.push(line);
    }
    lines
}

/// Fold every block scalar into its header node, in text order. The
/// merged node becomes a field and remembers the key three nodes back as
/// the owner of its eventual secret value.
pub fn group_multiline_blocks(arena: &mut NodeArena) {
    let mut cursor = Some(arena.root());
    while let Some(id) = cursor {
        if is_block_header(arena, id) {
            let lines = collect_block_lines(arena, id);
            if !lines.is_empty() {
                let total: usize = lines.iter().map(|l| l.nodes.len()).sum();
                for idx in 0..total {
                    if idx + 1 == total
                        && arena
                            .next(id)
                            .is_some_and(|n| arena.kind(n) == NodeKind::NewLine)
                    {
                        break;
                    }
                    arena.merge_with_next(id);
                }
                arena.node_mut(id).kind = NodeKind::Field;
                let key = arena
                    .previous(id)
                    .and_then(|p| arena.previous(p))
                    .and_then(|p| arena.previous(p));
                arena.node_mut(id).secret_value_of = key;
            }
        }
        cursor = arena.next(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::tokenize;

    fn kinds(arena: &NodeArena) -> Vec<NodeKind> {
        arena.iter().map(|id| arena.kind(id)).collect()
    }

    #[test]
    fn block_scalar_folds_into_one_field() {
        let mut arena = tokenize("a: |\n  my\n  multi\n  line\n");
        assert_eq!(
            kinds(&arena),
            vec![
                NodeKind::QuotedStringHolder,
                NodeKind::Field,
                NodeKind::Separator,
                NodeKind::Space,
                NodeKind::Unknown,
                NodeKind::NewLine,
                NodeKind::Space,
                NodeKind::Space,
                NodeKind::Field,
                NodeKind::NewLine,
                NodeKind::Space,
                NodeKind::Space,
                NodeKind::Field,
                NodeKind::NewLine,
                NodeKind::Space,
                NodeKind::Space,
                NodeKind::Field,
                NodeKind::NewLine,
            ]
        );
        group_multiline_blocks(&mut arena);
        assert_eq!(
            kinds(&arena),
            vec![
                NodeKind::QuotedStringHolder,
                NodeKind::Field,
                NodeKind::Separator,
                NodeKind::Space,
                NodeKind::Field,
                NodeKind::NewLine,
            ]
        );
        let ids: Vec<_> = arena.iter().collect();
        assert_eq!(arena.text(ids[4]), "|\n  my\n  multi\n  line");
        assert_eq!(arena.text(ids[5]), "\n");
        assert_eq!(arena.node(ids[4]).secret_value_of, Some(ids[1]));
        assert_eq!(arena.reconstruct(), "a: |\n  my\n  multi\n  line\n");
    }

    #[test]
    fn header_without_continuation_is_untouched() {
        let mut arena = tokenize("a: |\nb: zz");
        let before = kinds(&arena);
        group_multiline_blocks(&mut arena);
        assert_eq!(kinds(&arena), before);
    }

    #[test]
    fn block_ends_at_dedent() {
        let mut arena = tokenize("key: |\n  aa\n  bb\nother: cc\n");
        group_multiline_blocks(&mut arena);
        let ids: Vec<_> = arena.iter().collect();
        assert_eq!(arena.text(ids[4]), "|\n  aa\n  bb");
        assert_eq!(arena.reconstruct(), "key: |\n  aa\n  bb\nother: cc\n");
    }
}
