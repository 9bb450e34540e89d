//! The decompiler's node tree.
//!
//! One [`Node`] wraps one instruction occurrence within a specific decompilation run,
//! binding it to its `[start, end)` byte range, its structural children, and the inbound
//! jump references that drive block segmentation.
//!
//! Ownership is strictly downward: the [`NodeTree`] arena owns every node, containers own
//! their children through ordered [`NodeId`] lists, and every upward or lateral link
//! (`parent`, `referenced_by`, jump targets) is a non-owning [`NodeId`]. This preserves the
//! query surface of a back-pointer design without reference cycles.

use crate::instruction::{FormatVersion, Instruction};

/// Unique identifier for a node within one [`NodeTree`].
///
/// Ids are arena slot indices; they are meaningless across trees and never reused within
/// one tree, so a node that a pass detaches from the tree keeps its id without invalidating
/// links to other nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub(crate) fn new(index: usize) -> NodeId {
        NodeId(index)
    }

    /// The arena slot index of this id.
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

/// The structural role a node plays in the reconstructed control flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// A plain statement or expression occurrence with no control-flow role.
    Statement,
    /// An unconditional transfer: a jump instruction, or a computed jump whose
    /// destination could not be determined statically (`target` stays `None`).
    Jump {
        /// The node whose start offset this jump transfers to, once resolved.
        target: Option<NodeId>,
    },
    /// A push of a continuation address onto the execution-flow stack.
    PushFlow {
        /// The node at the pushed continuation address, once resolved.
        target: Option<NodeId>,
    },
    /// A conditional transfer. `inverted` is true when the transfer fires on a *false*
    /// condition (the jump-if-not idiom). Pop-flow conditionals never acquire a target;
    /// their destination is determined by the nearest enclosing push.
    ConditionalJump {
        /// The node this branch transfers to, once resolved.
        target: Option<NodeId>,
        /// Whether the branch fires when the condition is false.
        inverted: bool,
    },
    /// An ordered run of siblings with no internal control transfer except at the very end.
    Block,
    /// A structured `if`: the condition expression plus an absorbed body of blocks,
    /// replacing a conditional-jump idiom.
    IfBlock {
        /// The condition expression of the replaced branch.
        condition: NodeId,
    },
    /// A structured loop body: the push-execution-flow idiom with its absorbed span.
    JumpBlock,
    /// A jump to a bare-return epilogue, simplified to a direct return.
    Return,
}

impl NodeKind {
    /// Whether nodes of this kind own other statements structurally.
    #[must_use]
    pub fn is_container(self) -> bool {
        matches!(
            self,
            NodeKind::Block | NodeKind::IfBlock { .. } | NodeKind::JumpBlock
        )
    }

    /// The resolved transfer target, for kinds that carry one.
    #[must_use]
    pub fn target(self) -> Option<NodeId> {
        match self {
            NodeKind::Jump { target }
            | NodeKind::PushFlow { target }
            | NodeKind::ConditionalJump { target, .. } => target,
            _ => None,
        }
    }
}

/// One node of the decompilation tree.
///
/// `source` borrows the instruction this node represents; synthetic containers introduced
/// by structuring ([`NodeKind::Block`] and the run's root) have no source of their own.
#[derive(Debug)]
pub struct Node<'a> {
    /// Structural role of this node.
    pub kind: NodeKind,
    /// The instruction occurrence this node wraps, if any.
    pub source: Option<&'a Instruction>,
    /// First byte of this node's range in the original stream.
    pub start: u32,
    /// One past the last byte of this node's range.
    pub end: u32,
    /// The owning container, `None` only for the root.
    pub parent: Option<NodeId>,
    /// Owned structural children, in stream order.
    pub children: Vec<NodeId>,
    /// Every node whose control transfer targets this node's start offset.
    /// Kept sorted and deduplicated.
    pub referenced_by: Vec<NodeId>,
}

/// Arena-owned decompilation tree for one function.
///
/// Built fresh per decompilation run and discarded after the emitter consumes it. The pass
/// pipeline holds sole mutation rights while it executes; afterwards the tree is read-only.
#[derive(Debug)]
pub struct NodeTree<'a> {
    nodes: Vec<Node<'a>>,
    root: NodeId,
    version: FormatVersion,
}

impl<'a> NodeTree<'a> {
    /// Create an empty tree whose root is a synthetic block covering offset 0.
    #[must_use]
    pub fn new(version: FormatVersion) -> NodeTree<'a> {
        let root = Node {
            kind: NodeKind::Block,
            source: None,
            start: 0,
            end: 0,
            parent: None,
            children: Vec::new(),
            referenced_by: Vec::new(),
        };
        NodeTree {
            nodes: vec![root],
            root: NodeId(0),
            version,
        }
    }

    /// The synthetic root node id.
    #[must_use]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// The format version this tree was built under.
    #[must_use]
    pub fn version(&self) -> FormatVersion {
        self.version
    }

    /// Number of nodes ever allocated in this tree, detached nodes included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the tree holds only its root.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    /// Immutable access to a node.
    ///
    /// # Panics
    ///
    /// Panics if `id` does not belong to this tree. Ids are only ever minted by the tree
    /// itself, so an out-of-range id is a pipeline bug, not an input condition.
    #[must_use]
    pub fn node(&self, id: NodeId) -> &Node<'a> {
        &self.nodes[id.0]
    }

    /// Mutable access to a node. Same panic contract as [`NodeTree::node`].
    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node<'a> {
        &mut self.nodes[id.0]
    }

    /// Allocate a new node and return its id. The node is not attached to any child list;
    /// the caller wires it into the tree.
    pub(crate) fn alloc(
        &mut self,
        kind: NodeKind,
        source: Option<&'a Instruction>,
        start: u32,
        end: u32,
        parent: Option<NodeId>,
    ) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            kind,
            source,
            start,
            end,
            parent,
            children: Vec::new(),
            referenced_by: Vec::new(),
        });
        id
    }

    /// Replace a container's child list, repointing every child's parent link.
    pub(crate) fn set_children(&mut self, parent: NodeId, children: Vec<NodeId>) {
        for &child in &children {
            self.nodes[child.0].parent = Some(parent);
        }
        self.nodes[parent.0].children = children;
    }

    /// Append one child to a container, repointing its parent link.
    pub(crate) fn push_child(&mut self, parent: NodeId, child: NodeId) {
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    /// Record that `from` transfers control to `target`.
    pub(crate) fn add_reference(&mut self, target: NodeId, from: NodeId) {
        let refs = &mut self.nodes[target.0].referenced_by;
        if let Err(position) = refs.binary_search(&from) {
            refs.insert(position, from);
        }
    }

    /// Depth-first pre-order traversal of the attached tree.
    pub fn for_each<F: FnMut(NodeId)>(&self, f: &mut F) {
        self.for_each_from(self.root, f);
    }

    fn for_each_from<F: FnMut(NodeId)>(&self, id: NodeId, f: &mut F) {
        f(id);
        for &child in &self.nodes[id.0].children {
            self.for_each_from(child, f);
        }
    }

    /// Flatten the tree back into the original top-level instruction sequence.
    ///
    /// Containers that structurally replaced an instruction (an `if` its branch, a loop
    /// its push, a simplified return its jump) contribute that instruction at their own
    /// position; plain blocks contribute only their children. The result is the input
    /// stream's top-level instructions in original relative order — structuring never
    /// drops or duplicates an instruction.
    #[must_use]
    pub fn flatten(&self) -> Vec<&'a Instruction> {
        let mut out = Vec::new();
        self.flatten_from(self.root, &mut out);
        out
    }

    fn flatten_from(&self, id: NodeId, out: &mut Vec<&'a Instruction>) {
        let node = &self.nodes[id.0];
        match node.kind {
            NodeKind::Block => {
                for &child in &node.children {
                    self.flatten_from(child, out);
                }
            }
            NodeKind::IfBlock { .. } | NodeKind::JumpBlock => {
                if let Some(source) = node.source {
                    out.push(source);
                }
                for &child in &node.children {
                    self.flatten_from(child, out);
                }
            }
            _ => {
                if let Some(source) = node.source {
                    out.push(source);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alloc_and_wire() {
        let jump = Instruction::Jump { target: 0 };
        let mut tree = NodeTree::new(FormatVersion::empty());
        let root = tree.root();

        let id = tree.alloc(NodeKind::Jump { target: None }, Some(&jump), 0, 5, None);
        tree.push_child(root, id);

        assert_eq!(tree.node(id).parent, Some(root));
        assert_eq!(tree.node(root).children, vec![id]);
        assert_eq!(tree.node(id).end - tree.node(id).start, 5);
    }

    #[test]
    fn references_stay_sorted_and_unique() {
        let mut tree = NodeTree::new(FormatVersion::empty());
        let a = tree.alloc(NodeKind::Statement, None, 0, 1, None);
        let b = tree.alloc(NodeKind::Jump { target: Some(a) }, None, 1, 6, None);
        let c = tree.alloc(NodeKind::Jump { target: Some(a) }, None, 6, 11, None);

        tree.add_reference(a, c);
        tree.add_reference(a, b);
        tree.add_reference(a, b);

        assert_eq!(tree.node(a).referenced_by, vec![b, c]);
    }

    #[test]
    fn flatten_skips_synthetic_blocks() {
        let first = Instruction::Nothing;
        let second = Instruction::EndOfScript;
        let mut tree = NodeTree::new(FormatVersion::empty());
        let root = tree.root();

        let block = tree.alloc(NodeKind::Block, None, 0, 2, None);
        let a = tree.alloc(NodeKind::Statement, Some(&first), 0, 1, None);
        let b = tree.alloc(NodeKind::Statement, Some(&second), 1, 2, None);
        tree.set_children(block, vec![a, b]);
        tree.push_child(root, block);

        assert_eq!(tree.flatten(), vec![&first, &second]);
    }
}
