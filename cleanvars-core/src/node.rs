// cleanvars-core/src/node.rs
//! The typed node chain produced by the tolerant tokenizer.
//!
//! Nodes live in an arena and are addressed by index; `previous`, `next`,
//! `holder` and `closed_by` are optional indices rather than references,
//! which keeps the doubly linked chain and its holder back-references free
//! of ownership cycles. Splicing a node out during a merge is an index
//! rewrite; the tombstone stays in the arena but is no longer reachable
//! from the chain.
//!
//! License: MIT OR APACHE 2.0

use crate::errors::ScrubError;

/// The different kinds of node produced by the tokenizer and the later
/// passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// Opaque text with no recognized structure.
    Unknown,
    /// An identifier-like run: a candidate key name or an unquoted value
    /// fragment.
    Field,
    /// A lone `:` or `=`.
    Separator,
    /// An opening quote; the implicit root context is also a holder.
    QuotedStringHolder,
    /// The quote that closes a holder.
    QuotedStringClosing,
    NewLine,
    Space,
    /// Assigned only by the secret identifier; terminal for later passes.
    Secret,
    /// A `\` whose only role is to protect the following character.
    Backslash,
    /// Tombstone left behind by a merge; unlinked from the chain.
    Deleted,
}

/// Index of a node inside a [`NodeArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// One typed, positioned span of the chain representing part of the
/// original text.
#[derive(Debug)]
pub struct Node {
    /// Source byte offset, kept for diagnostics.
    pub begin_at: usize,
    /// Accumulated characters belonging to this node.
    pub text: String,
    pub kind: NodeKind,
    pub previous: Option<NodeId>,
    pub next: Option<NodeId>,
    /// Nearest still-open quote holder enclosing this node at the time it
    /// was attached; the root for top-level nodes.
    pub holder: Option<NodeId>,
    /// For a secret node, the field node naming the key that owns it.
    pub secret_value_of: Option<NodeId>,
    /// For a holder, the closing node that terminates it.
    pub closed_by: Option<NodeId>,
    /// Nodes directly enclosed by this holder.
    pub sub: Vec<NodeId>,
    /// True if this holder's opening quote was backslash-escaped.
    pub is_protected: bool,
}

impl Node {
    fn new(begin_at: usize) -> Self {
        Node {
            begin_at,
            text: String::new(),
            kind: NodeKind::Unknown,
            previous: None,
            next: None,
            holder: None,
            secret_value_of: None,
            closed_by: None,
            sub: Vec::new(),
            is_protected: false,
        }
    }
}

/// Arena owning every node of one parsed block, anchored by a synthetic
/// root holder with empty text that is never closed and never merged away.
#[derive(Debug)]
pub struct NodeArena {
    nodes: Vec<Node>,
}

impl NodeArena {
    pub fn new() -> Self {
        let mut arena = NodeArena { nodes: Vec::new() };
        let root = arena.push(0);
        arena.node_mut(root).kind = NodeKind::QuotedStringHolder;
        arena
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub(crate) fn push(&mut self, begin_at: usize) -> NodeId {
        self.nodes.push(Node::new(begin_at));
        NodeId(self.nodes.len() - 1)
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    pub fn kind(&self, id: NodeId) -> NodeKind {
        self.node(id).kind
    }

    pub fn text(&self, id: NodeId) -> &str {
        &self.node(id).text
    }

    pub fn next(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).next
    }

    pub fn previous(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).previous
    }

    /// Attach a freshly created node behind `previous` and record the
    /// nearest enclosing open quote holder, found by walking backwards.
    /// The root is always open, so every attached node gets a holder.
    pub(crate) fn attach(&mut self, id: NodeId, previous: NodeId) {
        self.node_mut(id).previous = Some(previous);
        self.node_mut(previous).next = Some(id);
        let mut holder = previous;
        loop {
            let h = self.node(holder);
            if h.kind == NodeKind::QuotedStringHolder && h.closed_by.is_none() {
                self.node_mut(holder).sub.push(id);
                self.node_mut(id).holder = Some(holder);
                break;
            }
            match h.previous {
                Some(p) => holder = p,
                None => break,
            }
        }
    }

    /// Merge `id` with the node that follows it: the follower's text is
    /// appended, the follower becomes an unlinked `Deleted` tombstone with
    /// no content, and the merged node degrades to `Unknown`.
    pub(crate) fn merge_with_next(&mut self, id: NodeId) {
        let Some(next) = self.node(id).next else {
            debug_assert!(false, "merge_with_next called on the last node of the chain");
            return;
        };
        let consumed = std::mem::take(&mut self.node_mut(next).text);
        let after = self.node(next).next;
        {
            let node = self.node_mut(id);
            node.kind = NodeKind::Unknown;
            node.text.push_str(&consumed);
            node.next = after;
        }
        {
            let tombstone = self.node_mut(next);
            tombstone.kind = NodeKind::Deleted;
            tombstone.next = None;
            tombstone.previous = None;
        }
        if let Some(after) = after {
            self.node_mut(after).previous = Some(id);
        }
    }

    /// Locate the value node associated with the field `id`: scan forward
    /// over spaces and quote closings, require at least one separator
    /// before any content counts, and return the first field, unknown or
    /// quote-holder node. Any other kind means the key has no value. A
    /// scan landing on an already identified secret is a bug in a pass.
    pub fn find_secret_candidate(&self, id: NodeId) -> Result<Option<NodeId>, ScrubError> {
        let mut candidate = self.node(id).next;
        let mut has_separator = false;
        while let Some(c) = candidate {
            match self.kind(c) {
                NodeKind::Space | NodeKind::QuotedStringClosing => {}
                kind if has_separator => {
                    return match kind {
                        NodeKind::Secret => Err(ScrubError::InvariantViolation(
                            "value scan reached an already identified secret".to_string(),
                        )),
                        NodeKind::Field | NodeKind::Unknown | NodeKind::QuotedStringHolder => {
                            Ok(Some(c))
                        }
                        _ => Ok(None),
                    };
                }
                NodeKind::Separator => has_separator = true,
                _ => return Ok(None),
            }
            candidate = self.node(c).next;
        }
        Ok(None)
    }

    /// Iterate the live chain from the root, in text order.
    pub fn iter(&self) -> NodeIter<'_> {
        NodeIter {
            arena: self,
            cursor: Some(self.root()),
        }
    }

    /// Iterate the live chain starting at `id` (inclusive).
    pub fn iter_from(&self, id: NodeId) -> NodeIter<'_> {
        NodeIter {
            arena: self,
            cursor: Some(id),
        }
    }

    /// Concatenate every live node's text in chain order. At every
    /// pipeline stage before rendering this reproduces the input exactly.
    pub fn reconstruct(&self) -> String {
        let mut out = String::new();
        for id in self.iter() {
            out.push_str(self.text(id));
        }
        out
    }
}

impl Default for NodeArena {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over the live chain, following `next` links.
pub struct NodeIter<'a> {
    arena: &'a NodeArena,
    cursor: Option<NodeId>,
}

impl Iterator for NodeIter<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.cursor?;
        self.cursor = self.arena.node(id).next;
        Some(id)
    }
}
