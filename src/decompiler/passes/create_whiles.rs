//! Pass 6: fold push-execution-flow spans into loop regions.

use crate::{
    decompiler::{
        passes::{create_ifs::fold_ifs, DecompilerPass},
        tree::{NodeId, NodeKind, NodeTree},
    },
    Result,
};

/// Recognizes the execution-flow loop idiom: a block consisting of a single resolved
/// push-execution-flow, whose pushed continuation is the start of a later sibling. The
/// span in between becomes the loop region; pop-flow transfers inside it return to the
/// pushed continuation.
///
/// Newly formed regions are re-folded for `if` shapes, since block segmentation could not
/// see across the loop boundary on the first pass.
pub struct CreateWhileBlocks;

impl<'a> DecompilerPass<'a> for CreateWhileBlocks {
    fn name(&self) -> &'static str {
        "CreateWhileBlocks"
    }

    fn run(&self, tree: &mut NodeTree<'a>) -> Result<()> {
        let root = tree.root();
        fold_whiles(tree, root);
        Ok(())
    }
}

fn fold_whiles(tree: &mut NodeTree<'_>, container: NodeId) {
    let mut i = 0;
    while i < tree.node(container).children.len() {
        let child = tree.node(container).children[i];

        if tree.node(child).kind.is_container() && tree.node(child).kind != NodeKind::Block {
            fold_whiles(tree, child);
            i += 1;
            continue;
        }

        let Some((push, target)) = block_loop_shape(tree, container, i) else {
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

        let source = tree.node(push).source;
        let start = tree.node(child).start;
        let end = tree.node(children[j]).start;

        let jump_block = tree.alloc(NodeKind::JumpBlock, source, start, end, None);
        tree.set_children(jump_block, children[i + 1..j].to_vec());

        let mut rebuilt = children[..i].to_vec();
        rebuilt.push(jump_block);
        rebuilt.extend_from_slice(&children[j..]);
        tree.set_children(container, rebuilt);

        fold_whiles(tree, jump_block);
        fold_ifs(tree, jump_block);
        i += 1;
    }
}

/// If the `i`-th child of `container` is a block holding exactly one resolved
/// push-execution-flow, return that push node and its continuation target.
fn block_loop_shape(tree: &NodeTree<'_>, container: NodeId, i: usize) -> Option<(NodeId, NodeId)> {
    let children = &tree.node(container).children;
    let block = children[i];
    if tree.node(block).kind != NodeKind::Block || i + 1 >= children.len() {
        return None;
    }
    match tree.node(block).children.as_slice() {
        &[push] => match tree.node(push).kind {
            NodeKind::PushFlow {
                target: Some(target),
            } => Some((push, target)),
            _ => None,
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        decompiler::passes::{
            CreateBasicBlocks, CreateBasicNodes, CreateIfBlocks, ResolveJumpTargets,
            ResolveReferences,
        },
        instruction::{FormatVersion, Instruction},
    };

    fn structure(script: &[Instruction]) -> NodeTree<'_> {
        let mut tree = NodeTree::new(FormatVersion::empty());
        CreateBasicNodes::new(script).run(&mut tree).unwrap();
        ResolveJumpTargets.run(&mut tree).unwrap();
        ResolveReferences.run(&mut tree).unwrap();
        CreateBasicBlocks.run(&mut tree).unwrap();
        CreateIfBlocks.run(&mut tree).unwrap();
        CreateWhileBlocks.run(&mut tree).unwrap();
        tree
    }

    fn while_true_script() -> Vec<Instruction> {
        // 0: pushflow 13 { 5: nothing, 6: popflowifnot(true), 8: jump 5 } 13: endofscript
        vec![
            Instruction::PushExecutionFlow { target: 13 },
            Instruction::Nothing,
            Instruction::PopExecutionFlowIfNot {
                condition: Box::new(Instruction::True),
            },
            Instruction::Jump { target: 5 },
            Instruction::EndOfScript,
        ]
    }

    #[test]
    fn folds_the_flow_loop_idiom() {
        let script = while_true_script();
        let tree = structure(&script);

        let top = tree.node(tree.root()).children.clone();
        assert_eq!(top.len(), 2);

        let loop_region = top[0];
        assert_eq!(tree.node(loop_region).kind, NodeKind::JumpBlock);
        assert_eq!(tree.node(loop_region).start, 0);
        assert_eq!(tree.node(loop_region).end, 13);
        assert_eq!(
            tree.node(loop_region).source,
            Some(&Instruction::PushExecutionFlow { target: 13 })
        );

        // The pop-flow conditional stays an unresolved conditional inside the body.
        let body_has_pop = tree.node(loop_region).children.iter().any(|&block| {
            tree.node(block).children.iter().any(|&n| {
                matches!(
                    tree.node(n).kind,
                    NodeKind::ConditionalJump { target: None, .. }
                )
            })
        });
        assert!(body_has_pop);
    }

    #[test]
    fn flatten_survives_loop_folding() {
        let script = while_true_script();
        let tree = structure(&script);
        let flat = tree.flatten();
        assert_eq!(flat.len(), script.len());
        for (got, expected) in flat.iter().zip(&script) {
            assert_eq!(*got, expected);
        }
    }

    #[test]
    fn push_mixed_with_statements_is_not_a_loop() {
        // The push shares a block with a leading statement, so the idiom does not match.
        let script = [
            Instruction::Nothing,
            Instruction::PushExecutionFlow { target: 7 },
            Instruction::Nothing,
            Instruction::EndOfScript,
        ];
        let tree = structure(&script);
        let top = tree.node(tree.root()).children.clone();
        assert!(top
            .iter()
            .all(|&c| tree.node(c).kind == NodeKind::Block));
    }
}
