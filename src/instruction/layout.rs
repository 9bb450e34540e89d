//! The authoritative per-tag serialized layout.
//!
//! Exactly one place in the crate knows the writer-order operand sequence of every
//! instruction tag: [`for_each_operand`]. The size calculator, the generic visitor and the
//! binary encoder all consult it, so the three can never drift apart. (The decoder is the
//! inverse direction and is held in sync by the round-trip and size-exactness tests.)
//!
//! The order here matches the binary writer, which is not always operand-declaration order:
//! a [`Context`](crate::Instruction::Context) expression serializes its object
//! sub-expression first, then 12 bytes of fixed metadata, then the inner expression.

use widestring::Utf16Str;

use crate::{
    instruction::{opcode::markers, FormatVersion, Instruction},
    Result,
};

/// One serialized operand of an instruction, in writer order.
///
/// `Expr` operands recurse into a nested instruction (opcode byte included); every other
/// variant is a fixed-width or string-shaped field charged to the owning instruction.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Operand<'a> {
    /// Single raw byte (cast conversion codes).
    U8(u8),
    /// 16-bit little-endian value.
    U16(u16),
    /// 32-bit little-endian value.
    U32(u32),
    /// 64-bit little-endian value (reference handles).
    U64(u64),
    /// 32-bit little-endian signed value.
    I32(i32),
    /// 32-bit little-endian float.
    F32(f32),
    /// 64-bit little-endian float.
    F64(f64),
    /// NUL-terminated narrow string.
    Str(&'a str),
    /// NUL-terminated UTF-16 string.
    WStr(&'a Utf16Str),
    /// Nested expression, serialized in full at this position.
    Expr(&'a Instruction),
    /// List-terminator marker byte.
    Marker(u8),
}

impl Operand<'_> {
    /// Serialized byte length of this operand. `Expr` operands report 0 here; their cost
    /// is the recursive cost of the nested instruction and is charged by the caller.
    pub(crate) fn byte_size(&self) -> u32 {
        match self {
            Operand::U8(_) | Operand::Marker(_) => 1,
            Operand::U16(_) => 2,
            Operand::U32(_) | Operand::I32(_) | Operand::F32(_) => 4,
            Operand::U64(_) | Operand::F64(_) => 8,
            Operand::Str(s) => u32::try_from(s.len()).unwrap_or(u32::MAX) + 1,
            Operand::WStr(s) => 2 * (u32::try_from(s.len()).unwrap_or(u32::MAX) + 1),
            Operand::Expr(_) => 0,
        }
    }
}

/// Emits a vector-like component at the width the format version dictates.
fn component(value: f64, version: FormatVersion) -> Operand<'static> {
    if version.contains(FormatVersion::WIDE_VECTORS) {
        Operand::F64(value)
    } else {
        #[allow(clippy::cast_possible_truncation)]
        Operand::F32(value as f32)
    }
}

/// Yield every serialized operand of `instruction` in writer order, excluding the leading
/// opcode byte, which every tag charges identically.
///
/// # Errors
///
/// Propagates the first error returned by the callback; the walk stops there.
pub(crate) fn for_each_operand<'a>(
    instruction: &'a Instruction,
    version: FormatVersion,
    f: &mut dyn FnMut(Operand<'a>) -> Result<()>,
) -> Result<()> {
    match instruction {
        Instruction::LocalVariable { variable } | Instruction::InstanceVariable { variable } => {
            f(Operand::U64(variable.0))
        }
        Instruction::Return { value } => f(Operand::Expr(value)),
        Instruction::Jump { target } | Instruction::PushExecutionFlow { target } => {
            f(Operand::U32(*target))
        }
        Instruction::JumpIfNot { target, condition } => {
            f(Operand::U32(*target))?;
            f(Operand::Expr(condition))
        }
        Instruction::Nothing
        | Instruction::SelfRef
        | Instruction::True
        | Instruction::False
        | Instruction::NoObject
        | Instruction::PopExecutionFlow
        | Instruction::EndOfScript => Ok(()),
        Instruction::Let {
            property,
            variable,
            value,
        } => {
            f(Operand::U64(property.0))?;
            f(Operand::Expr(variable))?;
            f(Operand::Expr(value))
        }
        Instruction::Context {
            object,
            skip_size,
            field,
            inner,
        } => {
            // Writer order differs from field order: object first, then the fixed
            // metadata, then the inner expression.
            f(Operand::Expr(object))?;
            f(Operand::U32(*skip_size))?;
            f(Operand::U64(field.0))?;
            f(Operand::Expr(inner))
        }
        Instruction::VirtualFunction { name, params }
        | Instruction::LocalVirtualFunction { name, params } => {
            f(Operand::U64(name.index))?;
            f(Operand::U32(name.number))?;
            for param in params {
                f(Operand::Expr(param))?;
            }
            f(Operand::Marker(markers::END_FUNCTION_PARMS))
        }
        Instruction::FinalFunction { function, params }
        | Instruction::CallMath { function, params } => {
            f(Operand::U64(function.0))?;
            for param in params {
                f(Operand::Expr(param))?;
            }
            f(Operand::Marker(markers::END_FUNCTION_PARMS))
        }
        Instruction::IntConst { value } => f(Operand::I32(*value)),
        Instruction::FloatConst { value } => f(Operand::F32(*value)),
        Instruction::StringConst { value } => f(Operand::Str(value)),
        Instruction::ObjectConst { object } => f(Operand::U64(object.0)),
        Instruction::NameConst { name } => {
            f(Operand::U64(name.index))?;
            f(Operand::U32(name.number))
        }
        Instruction::RotationConst { value } | Instruction::VectorConst { value } => {
            f(component(value[0], version))?;
            f(component(value[1], version))?;
            f(component(value[2], version))
        }
        Instruction::StructConst {
            strukt,
            serialized_size,
            fields,
        } => {
            f(Operand::U64(strukt.0))?;
            f(Operand::U32(*serialized_size))?;
            for field in fields {
                f(Operand::Expr(field))?;
            }
            f(Operand::Marker(markers::END_STRUCT_CONST))
        }
        Instruction::UnicodeStringConst { value } => f(Operand::WStr(value)),
        Instruction::Cast { conversion, inner } => {
            f(Operand::U8(*conversion))?;
            f(Operand::Expr(inner))
        }
        Instruction::ComputedJump { destination } => f(Operand::Expr(destination)),
        Instruction::PopExecutionFlowIfNot { condition } => f(Operand::Expr(condition)),
        Instruction::ArrayConst {
            inner_property,
            elements,
        } => {
            f(Operand::U64(inner_property.0))?;
            f(Operand::U32(u32::try_from(elements.len()).unwrap_or(u32::MAX)))?;
            for element in elements {
                f(Operand::Expr(element))?;
            }
            f(Operand::Marker(markers::END_ARRAY_CONST))
        }
        Instruction::SetConst {
            inner_property,
            elements,
        } => {
            f(Operand::U64(inner_property.0))?;
            f(Operand::U32(u32::try_from(elements.len()).unwrap_or(u32::MAX)))?;
            for element in elements {
                f(Operand::Expr(element))?;
            }
            f(Operand::Marker(markers::END_SET_CONST))
        }
        Instruction::MapConst {
            key_property,
            entries,
        } => {
            f(Operand::U64(key_property.0))?;
            f(Operand::U32(u32::try_from(entries.len()).unwrap_or(u32::MAX)))?;
            for (key, value) in entries {
                f(Operand::Expr(key))?;
                f(Operand::Expr(value))?;
            }
            f(Operand::Marker(markers::END_MAP_CONST))
        }
        Instruction::SwitchValue {
            end_offset,
            index,
            cases,
            default,
        } => {
            f(Operand::U16(u16::try_from(cases.len()).unwrap_or(u16::MAX)))?;
            f(Operand::U32(*end_offset))?;
            f(Operand::Expr(index))?;
            for case in cases {
                f(Operand::Expr(&case.value))?;
                f(Operand::U32(case.next_offset))?;
                f(Operand::Expr(&case.result))?;
            }
            f(Operand::Expr(default))
        }
    }
}
