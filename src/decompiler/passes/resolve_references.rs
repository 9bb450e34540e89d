//! Pass 3: record back-references from jump targets to their jump sites.

use crate::{
    decompiler::{
        passes::DecompilerPass,
        tree::{NodeId, NodeTree},
    },
    Result,
};

/// Populates each node's `referenced_by` list from the resolved transfer targets.
///
/// The block-forming pass uses these lists to start a new basic block at every node some
/// transfer lands on. Existing lists are cleared first so the pass can rerun after
/// structural rewrites without accumulating stale entries.
pub struct ResolveReferences;

impl<'a> DecompilerPass<'a> for ResolveReferences {
    fn name(&self) -> &'static str {
        "ResolveReferences"
    }

    fn run(&self, tree: &mut NodeTree<'a>) -> Result<()> {
        let mut edges: Vec<(NodeId, NodeId)> = Vec::new();
        tree.for_each(&mut |id| {
            if let Some(target) = tree.node(id).kind.target() {
                edges.push((target, id));
            }
        });

        for index in 0..tree.len() {
            tree.node_mut(NodeId::new(index)).referenced_by.clear();
        }
        for (target, from) in edges {
            tree.add_reference(target, from);
        }

        Ok(())
    }
}
