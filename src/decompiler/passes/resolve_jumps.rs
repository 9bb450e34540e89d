//! Pass 2: resolve raw jump offsets into node references.

use crate::{
    decompiler::{
        passes::DecompilerPass,
        tree::{NodeId, NodeKind, NodeTree},
    },
    instruction::Instruction,
    Error, Result,
};

/// Resolves every statically addressed transfer among the root's children.
///
/// Jumps, jump-if-nots and push-execution-flows carry an absolute byte offset that must
/// equal some sibling's start offset; a dangling one is fatal. Pop-flow transfers are
/// context dependent (owned by the nearest enclosing push) and are consumed structurally
/// by the loop-folding pass instead. Computed jumps are the one best-effort category: with
/// no symbol information available their target legitimately stays unresolved and the
/// emitter renders them as indirect jumps.
pub struct ResolveJumpTargets;

impl<'a> DecompilerPass<'a> for ResolveJumpTargets {
    fn name(&self) -> &'static str {
        "ResolveJumpTargets"
    }

    fn run(&self, tree: &mut NodeTree<'a>) -> Result<()> {
        let root = tree.root();
        let siblings = tree.node(root).children.clone();

        for &id in &siblings {
            let node = tree.node(id);
            let raw = match (&node.kind, node.source) {
                // Computed jumps have no static offset to resolve.
                (NodeKind::Jump { .. }, Some(Instruction::ComputedJump { .. })) => continue,
                // Pop-flow conditionals are resolved structurally, not here.
                (
                    NodeKind::ConditionalJump { .. },
                    Some(Instruction::PopExecutionFlowIfNot { .. }),
                ) => continue,
                (
                    NodeKind::Jump { .. } | NodeKind::PushFlow { .. } | NodeKind::ConditionalJump { .. },
                    Some(source),
                ) => match source.raw_target() {
                    Some(raw) => raw,
                    None => continue,
                },
                _ => continue,
            };

            let target = find_sibling_at(tree, &siblings, raw).ok_or(Error::UnresolvedJump {
                offset: node.start,
                target: raw,
            })?;

            let node = tree.node_mut(id);
            node.kind = match node.kind {
                NodeKind::Jump { .. } => NodeKind::Jump {
                    target: Some(target),
                },
                NodeKind::PushFlow { .. } => NodeKind::PushFlow {
                    target: Some(target),
                },
                NodeKind::ConditionalJump { inverted, .. } => NodeKind::ConditionalJump {
                    target: Some(target),
                    inverted,
                },
                _ => unreachable!("only transfer kinds reach resolution"),
            };
        }

        Ok(())
    }
}

fn find_sibling_at(tree: &NodeTree<'_>, siblings: &[NodeId], offset: u32) -> Option<NodeId> {
    siblings
        .iter()
        .copied()
        .find(|&id| tree.node(id).start == offset)
}
