//! Pass 1: build one node per instruction occurrence.

use crate::{
    decompiler::{
        passes::DecompilerPass,
        tree::{NodeId, NodeKind, NodeTree},
    },
    instruction::{walk, Instruction, InstructionVisitor},
    Result,
};

/// Builds the initial node tree from the flat instruction stream.
///
/// Every top-level instruction becomes a direct child of the synthetic root, fully expanded
/// into structural sub-nodes via the shared visitor, so every node's `[start, end)` range
/// matches the size calculator exactly. Jump-like tags become jump nodes; conditional tags
/// become conditional-jump nodes with `inverted = true` (the format only has jump-if-not).
pub struct CreateBasicNodes<'a> {
    instructions: &'a [Instruction],
}

impl<'a> CreateBasicNodes<'a> {
    /// Create the pass over one function's instruction stream.
    #[must_use]
    pub fn new(instructions: &'a [Instruction]) -> Self {
        CreateBasicNodes { instructions }
    }
}

impl<'a> DecompilerPass<'a> for CreateBasicNodes<'a> {
    fn name(&self) -> &'static str {
        "CreateBasicNodes"
    }

    fn run(&self, tree: &mut NodeTree<'a>) -> Result<()> {
        let version = tree.version();
        let mut offset = 0;
        let mut builder = NodeBuilder {
            tree,
            stack: Vec::new(),
        };

        for instruction in self.instructions {
            walk(instruction, version, &mut offset, &mut builder)?;
        }

        let root = tree.root();
        tree.node_mut(root).end = offset;
        Ok(())
    }
}

/// Visitor that mirrors the traversal as a node stack: enter pushes a node under the
/// current stack top (or the root), exit records the final range and pops.
struct NodeBuilder<'a, 't> {
    tree: &'t mut NodeTree<'a>,
    stack: Vec<NodeId>,
}

impl<'a> InstructionVisitor<'a> for NodeBuilder<'a, '_> {
    fn enter(&mut self, instruction: &'a Instruction, offset: u32) -> Result<()> {
        let parent = self.stack.last().copied().unwrap_or_else(|| self.tree.root());
        let id = self
            .tree
            .alloc(kind_for(instruction), Some(instruction), offset, offset, None);
        self.tree.push_child(parent, id);
        self.stack.push(id);
        Ok(())
    }

    fn exit(&mut self, _instruction: &'a Instruction, _start: u32, end: u32) -> Result<()> {
        if let Some(id) = self.stack.pop() {
            self.tree.node_mut(id).end = end;
        }
        Ok(())
    }
}

fn kind_for(instruction: &Instruction) -> NodeKind {
    match instruction {
        Instruction::Jump { .. } | Instruction::ComputedJump { .. } => {
            NodeKind::Jump { target: None }
        }
        Instruction::PushExecutionFlow { .. } => NodeKind::PushFlow { target: None },
        Instruction::JumpIfNot { .. } | Instruction::PopExecutionFlowIfNot { .. } => {
            NodeKind::ConditionalJump {
                target: None,
                inverted: true,
            }
        }
        _ => NodeKind::Statement,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instruction::{compute_total_size, FormatVersion, PropertyRef};

    #[test]
    fn nodes_mirror_stream_order_and_sizes() {
        let script = [
            Instruction::Let {
                property: PropertyRef(1),
                variable: Box::new(Instruction::LocalVariable {
                    variable: PropertyRef(1),
                }),
                value: Box::new(Instruction::IntConst { value: 3 }),
            },
            Instruction::Jump { target: 0 },
            Instruction::EndOfScript,
        ];

        let mut tree = NodeTree::new(FormatVersion::empty());
        CreateBasicNodes::new(&script).run(&mut tree).unwrap();

        let root = tree.root();
        let children = &tree.node(root).children;
        assert_eq!(children.len(), 3);

        // Contiguous sibling ranges matching the computed sizes.
        let mut expected_start = 0;
        for (&id, instruction) in children.iter().zip(&script) {
            let node = tree.node(id);
            assert_eq!(node.start, expected_start);
            assert_eq!(
                node.end - node.start,
                crate::instruction::compute_size(instruction, FormatVersion::empty()).unwrap()
            );
            expected_start = node.end;
        }
        assert_eq!(
            tree.node(root).end,
            compute_total_size(&script, FormatVersion::empty()).unwrap()
        );

        // The assignment node owns its two operand sub-nodes.
        let assignment = tree.node(children[0]);
        assert_eq!(assignment.children.len(), 2);
        assert!(matches!(
            tree.node(children[1]).kind,
            NodeKind::Jump { target: None }
        ));
    }

    #[test]
    fn conditional_nodes_are_inverted() {
        let script = [Instruction::JumpIfNot {
            target: 0,
            condition: Box::new(Instruction::True),
        }];

        let mut tree = NodeTree::new(FormatVersion::empty());
        CreateBasicNodes::new(&script).run(&mut tree).unwrap();

        let root = tree.root();
        let branch = tree.node(tree.node(root).children[0]);
        assert!(matches!(
            branch.kind,
            NodeKind::ConditionalJump {
                target: None,
                inverted: true
            }
        ));
        // The condition expression is the branch's structural child.
        assert_eq!(branch.children.len(), 1);
    }
}
