//! Pass 5: fold inverted conditional jumps into `if` regions.

use crate::{
    decompiler::{
        passes::DecompilerPass,
        tree::{NodeId, NodeKind, NodeTree},
    },
    Result,
};

/// Recognizes the canonical `if` shape: a block ending in a jump-if-not whose target is
/// the start of a later sibling. The statements between the branch and its target become
/// the `if` body; the branch's condition expression is hoisted onto the new region node.
///
/// Bodies are folded recursively, so nested conditionals structure inside out. A branch
/// whose target lies outside the current container (a loop exit, for instance) is left
/// alone for a later pass or the emitter to render as an explicit conditional goto.
pub struct CreateIfBlocks;

impl<'a> DecompilerPass<'a> for CreateIfBlocks {
    fn name(&self) -> &'static str {
        "CreateIfBlocks"
    }

    fn run(&self, tree: &mut NodeTree<'a>) -> Result<()> {
        let root = tree.root();
        fold_ifs(tree, root);
        Ok(())
    }
}

/// Fold every recognizable `if` shape among `container`'s children, recursing into the
/// bodies it creates and into pre-existing sub-containers.
pub(crate) fn fold_ifs(tree: &mut NodeTree<'_>, container: NodeId) {
    let mut i = 0;
    while i < tree.node(container).children.len() {
        let child = tree.node(container).children[i];

        if tree.node(child).kind.is_container() && tree.node(child).kind != NodeKind::Block {
            fold_ifs(tree, child);
            i += 1;
            continue;
        }

        let Some((branch, target)) = block_if_shape(tree, container, i) else {
            i += 1;
            continue;
        };

        let children = tree.node(container).children.clone();
        let target_index = children[i + 1..]
            .iter()
            .position(|&c| tree.node(c).start == tree.node(target).start)
            .map(|p| p + i + 1);
        let Some(j) = target_index else {
            i += 1;
            continue;
        };

        let branch_node = tree.node(branch);
        let condition = branch_node.children[0];
        let source = branch_node.source;
        let branch_start = branch_node.start;
        let body_end = tree.node(children[j]).start;

        // Detach the branch; the region node takes over its instruction and byte range.
        let block = child;
        tree.node_mut(block).children.pop();
        tree.node_mut(block).end = branch_start;
        let block_empty = tree.node(block).children.is_empty();

        let if_block = tree.alloc(
            NodeKind::IfBlock { condition },
            source,
            branch_start,
            body_end,
            None,
        );
        tree.node_mut(condition).parent = Some(if_block);
        tree.set_children(if_block, children[i + 1..j].to_vec());

        let mut rebuilt = children[..i].to_vec();
        if !block_empty {
            rebuilt.push(block);
        }
        rebuilt.push(if_block);
        rebuilt.extend_from_slice(&children[j..]);
        tree.set_children(container, rebuilt);

        fold_ifs(tree, if_block);
        i = if block_empty { i + 1 } else { i + 2 };
    }
}

/// If the `i`-th child of `container` is a block ending in a resolved, inverted
/// conditional jump, return that branch node and its target.
fn block_if_shape(tree: &NodeTree<'_>, container: NodeId, i: usize) -> Option<(NodeId, NodeId)> {
    let children = &tree.node(container).children;
    let block = children[i];
    if tree.node(block).kind != NodeKind::Block || i + 1 >= children.len() {
        return None;
    }
    let &branch = tree.node(block).children.last()?;
    match tree.node(branch).kind {
        NodeKind::ConditionalJump {
            target: Some(target),
            inverted: true,
        } => Some((branch, target)),
        _ => None,
    }
}
