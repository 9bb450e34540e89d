//! Exact serialized-size computation.
//!
//! These functions are the shared offset model of the whole system: the decompiler uses them
//! to assign every node its `[start, end)` byte range, and the compiler's code generator uses
//! them to back-patch jump targets before emitting the final stream. They must match the
//! binary writer bit-for-bit — a mismatch here corrupts every computed jump target. The
//! guarantee is enforced by walking the same authoritative layout the encoder writes from,
//! and by the size-exactness tests in `tests/roundtrip.rs`.

use crate::{
    instruction::{
        visitor::{walk, NoopVisitor},
        FormatVersion, Instruction,
    },
    Result,
};

/// Compute the exact serialized byte length of one instruction tree.
///
/// # Errors
///
/// Returns [`crate::Error::RecursionLimit`] if expression nesting exceeds
/// [`crate::instruction::MAX_EXPRESSION_DEPTH`].
///
/// # Examples
///
/// ```rust
/// use vscope::{compute_size, FormatVersion, Instruction};
///
/// let jump = Instruction::Jump { target: 64 };
/// assert_eq!(compute_size(&jump, FormatVersion::empty()).unwrap(), 5);
///
/// let text = Instruction::StringConst { value: "hi".into() };
/// assert_eq!(compute_size(&text, FormatVersion::empty()).unwrap(), 4);
/// ```
pub fn compute_size(instruction: &Instruction, version: FormatVersion) -> Result<u32> {
    let mut offset = 0;
    advance(instruction, version, &mut offset)?;
    Ok(offset)
}

/// Compute the exact serialized byte length of a whole instruction stream.
///
/// # Errors
///
/// Returns [`crate::Error::RecursionLimit`] if expression nesting exceeds
/// [`crate::instruction::MAX_EXPRESSION_DEPTH`].
pub fn compute_total_size(instructions: &[Instruction], version: FormatVersion) -> Result<u32> {
    let mut offset = 0;
    for instruction in instructions {
        advance(instruction, version, &mut offset)?;
    }
    Ok(offset)
}

/// Add the serialized size of `instruction` to `offset`, recursing into nested expressions
/// in binary writer order.
///
/// # Errors
///
/// Returns [`crate::Error::RecursionLimit`] if expression nesting exceeds
/// [`crate::instruction::MAX_EXPRESSION_DEPTH`].
pub fn advance(instruction: &Instruction, version: FormatVersion, offset: &mut u32) -> Result<()> {
    walk(instruction, version, offset, &mut NoopVisitor)
}

#[cfg(test)]
mod tests {
    use widestring::Utf16String;

    use super::*;
    use crate::instruction::{FunctionRef, ObjectRef, PropertyRef, ScriptName, SwitchCase};

    fn size(instruction: &Instruction) -> u32 {
        compute_size(instruction, FormatVersion::empty()).unwrap()
    }

    #[test]
    fn fixed_cost_instructions() {
        assert_eq!(size(&Instruction::Nothing), 1);
        assert_eq!(size(&Instruction::True), 1);
        assert_eq!(size(&Instruction::PopExecutionFlow), 1);
        assert_eq!(size(&Instruction::EndOfScript), 1);
        assert_eq!(size(&Instruction::Jump { target: 0 }), 5);
        assert_eq!(size(&Instruction::PushExecutionFlow { target: 0 }), 5);
        assert_eq!(size(&Instruction::IntConst { value: -1 }), 5);
        assert_eq!(
            size(&Instruction::LocalVariable {
                variable: PropertyRef(1)
            }),
            9
        );
        assert_eq!(
            size(&Instruction::ObjectConst {
                object: ObjectRef(1)
            }),
            9
        );
        assert_eq!(
            size(&Instruction::NameConst {
                name: ScriptName { index: 1, number: 0 }
            }),
            13
        );
    }

    #[test]
    fn string_costs_count_terminators() {
        assert_eq!(size(&Instruction::StringConst { value: String::new() }), 2);
        assert_eq!(
            size(&Instruction::StringConst {
                value: "abc".into()
            }),
            5
        );
        assert_eq!(
            size(&Instruction::UnicodeStringConst {
                value: Utf16String::from_str("abc")
            }),
            9
        );
    }

    #[test]
    fn vector_width_depends_on_version() {
        let vector = Instruction::VectorConst {
            value: [1.0, 2.0, 3.0],
        };
        assert_eq!(compute_size(&vector, FormatVersion::empty()).unwrap(), 13);
        assert_eq!(
            compute_size(&vector, FormatVersion::WIDE_VECTORS).unwrap(),
            25
        );

        let rotation = Instruction::RotationConst {
            value: [0.0, 90.0, 180.0],
        };
        assert_eq!(compute_size(&rotation, FormatVersion::empty()).unwrap(), 13);
        assert_eq!(
            compute_size(&rotation, FormatVersion::WIDE_VECTORS).unwrap(),
            25
        );
    }

    #[test]
    fn recursive_costs() {
        // let v = 1  ->  1 + 8 + (1 + 8) + (1 + 4) = 23
        let assignment = Instruction::Let {
            property: PropertyRef(2),
            variable: Box::new(Instruction::LocalVariable {
                variable: PropertyRef(2),
            }),
            value: Box::new(Instruction::IntConst { value: 1 }),
        };
        assert_eq!(size(&assignment), 23);

        // f()  ->  1 + 8 + 1 = 10
        let call = Instruction::FinalFunction {
            function: FunctionRef(1),
            params: Vec::new(),
        };
        assert_eq!(size(&call), 10);

        // context: 1 + object(1) + 4 + 8 + inner(9) = 23
        let context = Instruction::Context {
            object: Box::new(Instruction::SelfRef),
            skip_size: 9,
            field: PropertyRef(5),
            inner: Box::new(Instruction::InstanceVariable {
                variable: PropertyRef(5),
            }),
        };
        assert_eq!(size(&context), 23);
    }

    #[test]
    fn switch_value_cost() {
        // 1 + 2 + 4 + index(5) + case(value 5 + 4 + result 5) + default(1) = 27
        let switch = Instruction::SwitchValue {
            end_offset: 27,
            index: Box::new(Instruction::IntConst { value: 0 }),
            cases: vec![SwitchCase {
                value: Instruction::IntConst { value: 1 },
                next_offset: 26,
                result: Instruction::IntConst { value: 10 },
            }],
            default: Box::new(Instruction::Nothing),
        };
        assert_eq!(size(&switch), 27);
    }

    #[test]
    fn total_size_sums_stream() {
        let stream = [
            Instruction::Jump { target: 6 },
            Instruction::Nothing,
            Instruction::EndOfScript,
        ];
        assert_eq!(
            compute_total_size(&stream, FormatVersion::empty()).unwrap(),
            7
        );
    }
}
