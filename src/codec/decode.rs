//! Bytecode stream decoding.
//!
//! Turns raw bytes back into [`Instruction`] values. This is the inverse of
//! [`crate::codec::write_instruction`] and is held in sync with the authoritative layout by
//! the round-trip tests: for every tag, `read(write(x)) == x` and the bytes written measure
//! exactly [`crate::compute_size`].
//!
//! # Example
//!
//! ```rust
//! use vscope::codec::{read_stream, Parser};
//! use vscope::{FormatVersion, Instruction};
//!
//! let bytes = [0x06, 0x05, 0x00, 0x00, 0x00, 0x53]; // jump 5; end-of-script
//! let mut parser = Parser::new(&bytes);
//! let script = read_stream(&mut parser, FormatVersion::empty())?;
//! assert_eq!(script[0], Instruction::Jump { target: 5 });
//! assert_eq!(script[1], Instruction::EndOfScript);
//! # Ok::<(), vscope::Error>(())
//! ```

use crate::{
    codec::Parser,
    instruction::{
        opcode::markers, FormatVersion, FunctionRef, Instruction, ObjectRef, Opcode, PropertyRef,
        ScriptName, SwitchCase, MAX_EXPRESSION_DEPTH,
    },
    Error, Result,
};

/// Decode a single instruction (including all nested expressions) from the cursor.
///
/// # Errors
///
/// Returns [`Error::InvalidOpcode`] for a byte outside the closed instruction set,
/// [`Error::OutOfBounds`] for a truncated stream, [`Error::Malformed`] for inconsistent
/// list terminators, or [`Error::RecursionLimit`] for runaway expression nesting.
pub fn read_instruction(parser: &mut Parser<'_>, version: FormatVersion) -> Result<Instruction> {
    read_at_depth(parser, version, 0)
}

/// Decode instructions until the end of the data.
///
/// The [`Instruction::EndOfScript`] terminator, if present, is included in the returned
/// stream; decoding simply continues while bytes remain.
///
/// # Errors
///
/// Same failure modes as [`read_instruction`].
pub fn read_stream(parser: &mut Parser<'_>, version: FormatVersion) -> Result<Vec<Instruction>> {
    let mut instructions = Vec::new();
    while parser.has_more_data() {
        instructions.push(read_instruction(parser, version)?);
    }
    Ok(instructions)
}

fn read_at_depth(
    parser: &mut Parser<'_>,
    version: FormatVersion,
    depth: usize,
) -> Result<Instruction> {
    if depth >= MAX_EXPRESSION_DEPTH {
        return Err(Error::RecursionLimit(MAX_EXPRESSION_DEPTH));
    }

    let byte = parser.read_le::<u8>()?;
    let opcode = Opcode::from_byte(byte).ok_or(Error::InvalidOpcode(byte))?;

    let instruction = match opcode {
        Opcode::LocalVariable => Instruction::LocalVariable {
            variable: PropertyRef(parser.read_le::<u64>()?),
        },
        Opcode::InstanceVariable => Instruction::InstanceVariable {
            variable: PropertyRef(parser.read_le::<u64>()?),
        },
        Opcode::Return => Instruction::Return {
            value: Box::new(read_at_depth(parser, version, depth + 1)?),
        },
        Opcode::Jump => Instruction::Jump {
            target: parser.read_le::<u32>()?,
        },
        Opcode::JumpIfNot => Instruction::JumpIfNot {
            target: parser.read_le::<u32>()?,
            condition: Box::new(read_at_depth(parser, version, depth + 1)?),
        },
        Opcode::Nothing => Instruction::Nothing,
        Opcode::Let => Instruction::Let {
            property: PropertyRef(parser.read_le::<u64>()?),
            variable: Box::new(read_at_depth(parser, version, depth + 1)?),
            value: Box::new(read_at_depth(parser, version, depth + 1)?),
        },
        Opcode::SelfRef => Instruction::SelfRef,
        Opcode::Context => {
            let object = Box::new(read_at_depth(parser, version, depth + 1)?);
            let skip_size = parser.read_le::<u32>()?;
            let field = PropertyRef(parser.read_le::<u64>()?);
            let inner = Box::new(read_at_depth(parser, version, depth + 1)?);
            Instruction::Context {
                object,
                skip_size,
                field,
                inner,
            }
        }
        Opcode::VirtualFunction => Instruction::VirtualFunction {
            name: read_name(parser)?,
            params: read_params(parser, version, depth)?,
        },
        Opcode::LocalVirtualFunction => Instruction::LocalVirtualFunction {
            name: read_name(parser)?,
            params: read_params(parser, version, depth)?,
        },
        Opcode::FinalFunction => Instruction::FinalFunction {
            function: FunctionRef(parser.read_le::<u64>()?),
            params: read_params(parser, version, depth)?,
        },
        Opcode::CallMath => Instruction::CallMath {
            function: FunctionRef(parser.read_le::<u64>()?),
            params: read_params(parser, version, depth)?,
        },
        Opcode::IntConst => Instruction::IntConst {
            value: parser.read_le::<i32>()?,
        },
        Opcode::FloatConst => Instruction::FloatConst {
            value: parser.read_le::<f32>()?,
        },
        Opcode::StringConst => Instruction::StringConst {
            value: parser.read_string()?,
        },
        Opcode::ObjectConst => Instruction::ObjectConst {
            object: ObjectRef(parser.read_le::<u64>()?),
        },
        Opcode::NameConst => Instruction::NameConst {
            name: read_name(parser)?,
        },
        Opcode::RotationConst => Instruction::RotationConst {
            value: read_components(parser, version)?,
        },
        Opcode::VectorConst => Instruction::VectorConst {
            value: read_components(parser, version)?,
        },
        Opcode::True => Instruction::True,
        Opcode::False => Instruction::False,
        Opcode::NoObject => Instruction::NoObject,
        Opcode::StructConst => {
            let strukt = ObjectRef(parser.read_le::<u64>()?);
            let serialized_size = parser.read_le::<u32>()?;
            let mut fields = Vec::new();
            while parser.peek_byte()? != markers::END_STRUCT_CONST {
                fields.push(read_at_depth(parser, version, depth + 1)?);
            }
            expect_marker(parser, markers::END_STRUCT_CONST)?;
            Instruction::StructConst {
                strukt,
                serialized_size,
                fields,
            }
        }
        Opcode::UnicodeStringConst => Instruction::UnicodeStringConst {
            value: parser.read_string_utf16()?,
        },
        Opcode::Cast => Instruction::Cast {
            conversion: parser.read_le::<u8>()?,
            inner: Box::new(read_at_depth(parser, version, depth + 1)?),
        },
        Opcode::PushExecutionFlow => Instruction::PushExecutionFlow {
            target: parser.read_le::<u32>()?,
        },
        Opcode::PopExecutionFlow => Instruction::PopExecutionFlow,
        Opcode::ComputedJump => Instruction::ComputedJump {
            destination: Box::new(read_at_depth(parser, version, depth + 1)?),
        },
        Opcode::PopExecutionFlowIfNot => Instruction::PopExecutionFlowIfNot {
            condition: Box::new(read_at_depth(parser, version, depth + 1)?),
        },
        Opcode::EndOfScript => Instruction::EndOfScript,
        Opcode::ArrayConst => {
            let inner_property = PropertyRef(parser.read_le::<u64>()?);
            let elements = read_counted(parser, version, depth, markers::END_ARRAY_CONST)?;
            Instruction::ArrayConst {
                inner_property,
                elements,
            }
        }
        Opcode::SetConst => {
            let inner_property = PropertyRef(parser.read_le::<u64>()?);
            let elements = read_counted(parser, version, depth, markers::END_SET_CONST)?;
            Instruction::SetConst {
                inner_property,
                elements,
            }
        }
        Opcode::MapConst => {
            let key_property = PropertyRef(parser.read_le::<u64>()?);
            let count = parser.read_le::<u32>()?;
            let mut entries = Vec::with_capacity(count as usize);
            for _ in 0..count {
                let key = read_at_depth(parser, version, depth + 1)?;
                let value = read_at_depth(parser, version, depth + 1)?;
                entries.push((key, value));
            }
            expect_marker(parser, markers::END_MAP_CONST)?;
            Instruction::MapConst {
                key_property,
                entries,
            }
        }
        Opcode::SwitchValue => {
            let case_count = parser.read_le::<u16>()?;
            let end_offset = parser.read_le::<u32>()?;
            let index = Box::new(read_at_depth(parser, version, depth + 1)?);
            let mut cases = Vec::with_capacity(usize::from(case_count));
            for _ in 0..case_count {
                let value = read_at_depth(parser, version, depth + 1)?;
                let next_offset = parser.read_le::<u32>()?;
                let result = read_at_depth(parser, version, depth + 1)?;
                cases.push(SwitchCase {
                    value,
                    next_offset,
                    result,
                });
            }
            let default = Box::new(read_at_depth(parser, version, depth + 1)?);
            Instruction::SwitchValue {
                end_offset,
                index,
                cases,
                default,
            }
        }
    };

    Ok(instruction)
}

fn read_name(parser: &mut Parser<'_>) -> Result<ScriptName> {
    Ok(ScriptName {
        index: parser.read_le::<u64>()?,
        number: parser.read_le::<u32>()?,
    })
}

fn read_components(parser: &mut Parser<'_>, version: FormatVersion) -> Result<[f64; 3]> {
    let mut value = [0.0; 3];
    for component in &mut value {
        *component = if version.contains(FormatVersion::WIDE_VECTORS) {
            parser.read_le::<f64>()?
        } else {
            f64::from(parser.read_le::<f32>()?)
        };
    }
    Ok(value)
}

fn read_params(
    parser: &mut Parser<'_>,
    version: FormatVersion,
    depth: usize,
) -> Result<Vec<Instruction>> {
    let mut params = Vec::new();
    while parser.peek_byte()? != markers::END_FUNCTION_PARMS {
        params.push(read_at_depth(parser, version, depth + 1)?);
    }
    expect_marker(parser, markers::END_FUNCTION_PARMS)?;
    Ok(params)
}

fn read_counted(
    parser: &mut Parser<'_>,
    version: FormatVersion,
    depth: usize,
    marker: u8,
) -> Result<Vec<Instruction>> {
    let count = parser.read_le::<u32>()?;
    let mut elements = Vec::with_capacity(count as usize);
    for _ in 0..count {
        elements.push(read_at_depth(parser, version, depth + 1)?);
    }
    expect_marker(parser, marker)?;
    Ok(elements)
}

fn expect_marker(parser: &mut Parser<'_>, marker: u8) -> Result<()> {
    let byte = parser.read_le::<u8>()?;
    if byte != marker {
        return Err(malformed_error!(
            "expected terminator 0x{:02X} at {}, found 0x{:02X}",
            marker,
            parser.pos() - 1,
            byte
        ));
    }
    Ok(())
}
