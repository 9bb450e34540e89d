//! Pass 7: rewrite jumps to a bare-return epilogue as direct returns.

use crate::{
    decompiler::{
        passes::DecompilerPass,
        tree::{NodeKind, NodeTree},
    },
    instruction::Instruction,
    Result,
};

/// Compilers commonly emit one shared `return;` epilogue and route every early exit to it
/// with a jump. Rendering those as gotos obscures the source shape, so this pass retypes
/// any jump whose target is a bare return into a return of its own. Jumps to returns that
/// carry a value are left alone; duplicating the value expression would change what the
/// emitter prints.
pub struct RemoveGotoReturns;

impl<'a> DecompilerPass<'a> for RemoveGotoReturns {
    fn name(&self) -> &'static str {
        "RemoveGotoReturns"
    }

    fn run(&self, tree: &mut NodeTree<'a>) -> Result<()> {
        let mut rewrites = Vec::new();
        tree.for_each(&mut |id| {
            let NodeKind::Jump {
                target: Some(target),
            } = tree.node(id).kind
            else {
                return;
            };
            if let Some(Instruction::Return { value }) = tree.node(target).source {
                if **value == Instruction::Nothing {
                    rewrites.push(id);
                }
            }
        });

        for id in rewrites {
            tree.node_mut(id).kind = NodeKind::Return;
        }
        Ok(())
    }
}
