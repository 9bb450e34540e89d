//! Generic offset-tracking instruction traversal.
//!
//! [`walk`] drives a writer-order traversal of one instruction tree while maintaining the
//! running byte offset, consulting the authoritative layout for every tag. The size
//! calculator is a walk with no hooks; the decompiler's node builder is a walk that pushes
//! and pops a node stack from the hooks. Sharing the skeleton keeps the two structurally
//! aligned: they cannot disagree about where a nested expression starts or ends.

use crate::{
    instruction::{
        layout::{for_each_operand, Operand},
        FormatVersion, Instruction,
    },
    Error, Result,
};

/// Maximum supported expression nesting depth.
///
/// Recursion depth equals instruction-tree depth; the cap turns a pathological or
/// adversarial stream into [`Error::RecursionLimit`] instead of a stack overflow. The
/// walker, decoder and encoder all recurse once per nesting level with several KiB of
/// frame each, so the cap must leave worst-case headroom on a default 2 MiB thread stack
/// (rayon workers and test threads both run on one).
pub const MAX_EXPRESSION_DEPTH: usize = 64;

/// Hooks invoked by [`walk`] around every instruction in the tree.
///
/// The lifetime parameter is the lifetime of the instructions being walked, so an
/// implementation may retain references to them (the decompiler's node builder does).
/// Both hooks default to doing nothing, so the default traversal only advances the offset.
pub trait InstructionVisitor<'a> {
    /// Called before an instruction's operands are visited. `offset` is the instruction's
    /// start offset (the position of its opcode byte).
    ///
    /// # Errors
    ///
    /// Returning an error aborts the walk.
    fn enter(&mut self, instruction: &'a Instruction, offset: u32) -> Result<()> {
        let _ = (instruction, offset);
        Ok(())
    }

    /// Called after an instruction's operands have been visited, with its full
    /// `[start, end)` byte range.
    ///
    /// # Errors
    ///
    /// Returning an error aborts the walk.
    fn exit(&mut self, instruction: &'a Instruction, start: u32, end: u32) -> Result<()> {
        let _ = (instruction, start, end);
        Ok(())
    }
}

/// A visitor with no hooks; walking with it computes pure sizes.
pub(crate) struct NoopVisitor;

impl InstructionVisitor<'_> for NoopVisitor {}

/// Walk one instruction tree in writer order, advancing `offset` by the exact serialized
/// size of everything visited.
///
/// # Errors
///
/// Returns [`Error::RecursionLimit`] if expression nesting exceeds
/// [`MAX_EXPRESSION_DEPTH`], or any error produced by the visitor's hooks.
pub fn walk<'a, V: InstructionVisitor<'a>>(
    instruction: &'a Instruction,
    version: FormatVersion,
    offset: &mut u32,
    visitor: &mut V,
) -> Result<()> {
    walk_at_depth(instruction, version, offset, visitor, 0)
}

fn walk_at_depth<'a, V: InstructionVisitor<'a>>(
    instruction: &'a Instruction,
    version: FormatVersion,
    offset: &mut u32,
    visitor: &mut V,
    depth: usize,
) -> Result<()> {
    if depth >= MAX_EXPRESSION_DEPTH {
        return Err(Error::RecursionLimit(MAX_EXPRESSION_DEPTH));
    }

    let start = *offset;
    visitor.enter(instruction, start)?;

    // Opcode byte.
    *offset += 1;

    for_each_operand(instruction, version, &mut |operand| match operand {
        Operand::Expr(child) => walk_at_depth(child, version, offset, visitor, depth + 1),
        fixed => {
            *offset += fixed.byte_size();
            Ok(())
        }
    })?;

    visitor.exit(instruction, start, *offset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instruction::FunctionRef;

    /// Records enter/exit events with their offsets.
    struct Recorder {
        events: Vec<(&'static str, u32, u32)>,
    }

    impl<'a> InstructionVisitor<'a> for Recorder {
        fn enter(&mut self, instruction: &'a Instruction, offset: u32) -> Result<()> {
            self.events
                .push((instruction.opcode().mnemonic(), offset, offset));
            Ok(())
        }

        fn exit(&mut self, instruction: &'a Instruction, start: u32, end: u32) -> Result<()> {
            self.events
                .push((instruction.opcode().mnemonic(), start, end));
            Ok(())
        }
    }

    #[test]
    fn walk_tracks_nested_offsets() {
        // CallMath(f, [IntConst(1), True]) = 1 + 8 + (1+4) + 1 + 1 = 16 bytes
        let call = Instruction::CallMath {
            function: FunctionRef(3),
            params: vec![Instruction::IntConst { value: 1 }, Instruction::True],
        };

        let mut offset = 0;
        let mut recorder = Recorder { events: Vec::new() };
        walk(&call, FormatVersion::empty(), &mut offset, &mut recorder).unwrap();

        assert_eq!(offset, 16);
        // Exit of the int constant covers [9, 14); exit of `true` covers [14, 15);
        // the trailing parameter marker belongs to the call itself.
        assert!(recorder.events.contains(&("IntConst", 9, 14)));
        assert!(recorder.events.contains(&("True", 14, 15)));
        assert!(recorder.events.contains(&("CallMath", 0, 16)));
    }

    #[test]
    fn walk_rejects_runaway_nesting() {
        let mut instruction = Instruction::Nothing;
        for _ in 0..MAX_EXPRESSION_DEPTH + 1 {
            instruction = Instruction::Return {
                value: Box::new(instruction),
            };
        }

        let mut offset = 0;
        let result = walk(
            &instruction,
            FormatVersion::empty(),
            &mut offset,
            &mut NoopVisitor,
        );
        assert!(matches!(result, Err(Error::RecursionLimit(_))));
    }
}
