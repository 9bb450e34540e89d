//! Bytecode stream encoding.
//!
//! The encoder writes directly from the authoritative per-tag layout
//! ([`crate::instruction::layout`]), so the bytes it produces measure exactly what
//! [`crate::compute_size`] predicts — the property the whole offset model rests on.
//!
//! # Example
//!
//! ```rust
//! use vscope::codec::write_instruction;
//! use vscope::{compute_size, FormatVersion, Instruction};
//!
//! let jump = Instruction::Jump { target: 5 };
//! let mut bytes = Vec::new();
//! write_instruction(&jump, FormatVersion::empty(), &mut bytes)?;
//! assert_eq!(bytes, [0x06, 0x05, 0x00, 0x00, 0x00]);
//! assert_eq!(bytes.len() as u32, compute_size(&jump, FormatVersion::empty())?);
//! # Ok::<(), vscope::Error>(())
//! ```

use crate::{
    codec::io::ScriptIO,
    instruction::{
        layout::{for_each_operand, Operand},
        FormatVersion, Instruction, MAX_EXPRESSION_DEPTH,
    },
    Error, Result,
};

/// Serialize a single instruction (including all nested expressions) to `out`.
///
/// # Errors
///
/// Returns [`Error::RecursionLimit`] if expression nesting exceeds
/// [`MAX_EXPRESSION_DEPTH`].
pub fn write_instruction(
    instruction: &Instruction,
    version: FormatVersion,
    out: &mut Vec<u8>,
) -> Result<()> {
    write_at_depth(instruction, version, out, 0)
}

/// Serialize a whole instruction stream to `out`.
///
/// # Errors
///
/// Same failure modes as [`write_instruction`].
pub fn write_stream(
    instructions: &[Instruction],
    version: FormatVersion,
    out: &mut Vec<u8>,
) -> Result<()> {
    for instruction in instructions {
        write_at_depth(instruction, version, out, 0)?;
    }
    Ok(())
}

fn write_at_depth(
    instruction: &Instruction,
    version: FormatVersion,
    out: &mut Vec<u8>,
    depth: usize,
) -> Result<()> {
    if depth >= MAX_EXPRESSION_DEPTH {
        return Err(Error::RecursionLimit(MAX_EXPRESSION_DEPTH));
    }

    out.push(instruction.opcode().byte());

    for_each_operand(instruction, version, &mut |operand| {
        match operand {
            Operand::U8(value) | Operand::Marker(value) => value.write_le(out),
            Operand::U16(value) => value.write_le(out),
            Operand::U32(value) => value.write_le(out),
            Operand::U64(value) => value.write_le(out),
            Operand::I32(value) => value.write_le(out),
            Operand::F32(value) => value.write_le(out),
            Operand::F64(value) => value.write_le(out),
            Operand::Str(value) => {
                out.extend_from_slice(value.as_bytes());
                out.push(0);
            }
            Operand::WStr(value) => {
                for unit in value.code_units() {
                    unit.write_le(out);
                }
                0u16.write_le(out);
            }
            Operand::Expr(child) => return write_at_depth(child, version, out, depth + 1),
        }
        Ok(())
    })
}
