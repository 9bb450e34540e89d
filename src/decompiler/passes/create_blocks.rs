//! Pass 4: group the linear statement list into basic blocks.

use crate::{
    decompiler::{
        passes::DecompilerPass,
        tree::{NodeId, NodeKind, NodeTree},
    },
    instruction::Instruction,
    Result,
};

/// Partitions the root's children into maximal single-entry, single-exit runs.
///
/// A block begins at the first statement, at any jump target (a node with a non-empty
/// `referenced_by` list), and after any control transfer. Every top-level node ends up in
/// exactly one block, so flattening the tree still yields the original statement order.
pub struct CreateBasicBlocks;

impl<'a> DecompilerPass<'a> for CreateBasicBlocks {
    fn name(&self) -> &'static str {
        "CreateBasicBlocks"
    }

    fn run(&self, tree: &mut NodeTree<'a>) -> Result<()> {
        let root = tree.root();
        let statements = tree.node(root).children.clone();
        if statements.is_empty() {
            return Ok(());
        }

        let mut blocks: Vec<NodeId> = Vec::new();
        let mut run: Vec<NodeId> = Vec::new();

        for &id in &statements {
            let is_leader = !tree.node(id).referenced_by.is_empty();
            if is_leader && !run.is_empty() {
                blocks.push(seal(tree, std::mem::take(&mut run)));
            }

            let is_terminator = tree
                .node(id)
                .source
                .is_some_and(Instruction::is_control_transfer);
            run.push(id);
            if is_terminator {
                blocks.push(seal(tree, std::mem::take(&mut run)));
            }
        }
        if !run.is_empty() {
            blocks.push(seal(tree, run));
        }

        tree.set_children(root, blocks);
        Ok(())
    }
}

/// Wrap a run of statements in a fresh block node spanning their byte range.
fn seal<'a>(tree: &mut NodeTree<'a>, run: Vec<NodeId>) -> NodeId {
    let start = tree.node(run[0]).start;
    let end = tree.node(run[run.len() - 1]).end;
    let block = tree.alloc(NodeKind::Block, None, start, end, None);
    tree.set_children(block, run);
    block
}
