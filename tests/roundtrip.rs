//! Codec integration tests.
//!
//! These tests exercise the contract between the three consumers of instruction layout:
//! for every instruction `x` and version `v`, `write(x, v)` produces exactly
//! `compute_size(x, v)` bytes and reading them back yields `x` again.

use strum::IntoEnumIterator;
use vscope::{prelude::*, Error, Result, MAX_EXPRESSION_DEPTH};
use widestring::Utf16String;

/// A representative instruction for each opcode, with nested expressions and non-trivial
/// operand values so a layout mistake cannot hide behind zeroes.
fn representative(opcode: Opcode) -> Instruction {
    let name = ScriptName {
        index: 7,
        number: 2,
    };
    match opcode {
        Opcode::LocalVariable => Instruction::LocalVariable {
            variable: PropertyRef(0x1122_3344_5566_7788),
        },
        Opcode::InstanceVariable => Instruction::InstanceVariable {
            variable: PropertyRef(42),
        },
        Opcode::Return => Instruction::Return {
            value: Box::new(Instruction::IntConst { value: -1 }),
        },
        Opcode::Jump => Instruction::Jump { target: 0x0102_0304 },
        Opcode::JumpIfNot => Instruction::JumpIfNot {
            target: 64,
            condition: Box::new(Instruction::InstanceVariable {
                variable: PropertyRef(9),
            }),
        },
        Opcode::Nothing => Instruction::Nothing,
        Opcode::Let => Instruction::Let {
            property: PropertyRef(3),
            variable: Box::new(Instruction::LocalVariable {
                variable: PropertyRef(3),
            }),
            value: Box::new(Instruction::FloatConst { value: 2.5 }),
        },
        Opcode::SelfRef => Instruction::SelfRef,
        Opcode::Context => Instruction::Context {
            object: Box::new(Instruction::ObjectConst {
                object: ObjectRef(10),
            }),
            skip_size: 9,
            field: PropertyRef(11),
            inner: Box::new(Instruction::InstanceVariable {
                variable: PropertyRef(11),
            }),
        },
        Opcode::VirtualFunction => Instruction::VirtualFunction {
            name,
            params: vec![Instruction::True, Instruction::IntConst { value: 5 }],
        },
        Opcode::FinalFunction => Instruction::FinalFunction {
            function: FunctionRef(77),
            params: vec![Instruction::SelfRef],
        },
        Opcode::IntConst => Instruction::IntConst { value: i32::MIN },
        Opcode::FloatConst => Instruction::FloatConst { value: -0.5 },
        Opcode::StringConst => Instruction::StringConst {
            value: "Hello".into(),
        },
        Opcode::ObjectConst => Instruction::ObjectConst {
            object: ObjectRef(u64::MAX),
        },
        Opcode::NameConst => Instruction::NameConst { name },
        Opcode::RotationConst => Instruction::RotationConst {
            value: [0.0, 90.0, -45.0],
        },
        Opcode::VectorConst => Instruction::VectorConst {
            value: [1.0, 2.0, 3.0],
        },
        Opcode::True => Instruction::True,
        Opcode::False => Instruction::False,
        Opcode::NoObject => Instruction::NoObject,
        Opcode::StructConst => Instruction::StructConst {
            strukt: ObjectRef(5),
            serialized_size: 24,
            fields: vec![
                Instruction::IntConst { value: 1 },
                Instruction::FloatConst { value: 2.0 },
            ],
        },
        Opcode::UnicodeStringConst => Instruction::UnicodeStringConst {
            value: Utf16String::from_str("héllo"),
        },
        Opcode::Cast => Instruction::Cast {
            conversion: 0x39,
            inner: Box::new(Instruction::IntConst { value: 12 }),
        },
        Opcode::LocalVirtualFunction => Instruction::LocalVirtualFunction {
            name,
            params: vec![],
        },
        Opcode::PushExecutionFlow => Instruction::PushExecutionFlow { target: 200 },
        Opcode::PopExecutionFlow => Instruction::PopExecutionFlow,
        Opcode::ComputedJump => Instruction::ComputedJump {
            destination: Box::new(Instruction::LocalVariable {
                variable: PropertyRef(6),
            }),
        },
        Opcode::PopExecutionFlowIfNot => Instruction::PopExecutionFlowIfNot {
            condition: Box::new(Instruction::False),
        },
        Opcode::EndOfScript => Instruction::EndOfScript,
        Opcode::ArrayConst => Instruction::ArrayConst {
            inner_property: PropertyRef(8),
            elements: vec![
                Instruction::IntConst { value: 1 },
                Instruction::IntConst { value: 2 },
            ],
        },
        Opcode::SetConst => Instruction::SetConst {
            inner_property: PropertyRef(8),
            elements: vec![Instruction::NameConst { name }],
        },
        Opcode::MapConst => Instruction::MapConst {
            key_property: PropertyRef(4),
            entries: vec![(
                Instruction::StringConst { value: "k".into() },
                Instruction::IntConst { value: 9 },
            )],
        },
        Opcode::CallMath => Instruction::CallMath {
            function: FunctionRef(3),
            params: vec![Instruction::FloatConst { value: 1.0 }],
        },
        Opcode::SwitchValue => Instruction::SwitchValue {
            end_offset: 120,
            index: Box::new(Instruction::LocalVariable {
                variable: PropertyRef(2),
            }),
            cases: vec![
                SwitchCase {
                    value: Instruction::IntConst { value: 0 },
                    next_offset: 60,
                    result: Instruction::StringConst {
                        value: "zero".into(),
                    },
                },
                SwitchCase {
                    value: Instruction::IntConst { value: 1 },
                    next_offset: 90,
                    result: Instruction::StringConst { value: "one".into() },
                },
            ],
            default: Box::new(Instruction::StringConst {
                value: "other".into(),
            }),
        },
    }
}

/// Every opcode writes exactly as many bytes as the size calculator predicts and reads
/// back equal, under both the narrow and the wide vector format.
#[test]
fn every_opcode_roundtrips_with_exact_size() -> Result<()> {
    for version in [FormatVersion::empty(), FormatVersion::WIDE_VECTORS] {
        for opcode in Opcode::iter() {
            let instruction = representative(opcode);

            let mut bytes = Vec::new();
            write_instruction(&instruction, version, &mut bytes)?;
            assert_eq!(
                bytes.len() as u32,
                compute_size(&instruction, version)?,
                "size mismatch for {opcode:?} under {version:?}"
            );
            assert_eq!(bytes[0], opcode as u8);

            let mut parser = Parser::new(&bytes);
            let decoded = read_instruction(&mut parser, version)?;
            assert_eq!(decoded, instruction, "value mismatch for {opcode:?}");
            assert_eq!(parser.remaining(), 0, "trailing bytes for {opcode:?}");
        }
    }
    Ok(())
}

/// Vector and rotation constants are the only version-sensitive layouts.
#[test]
fn wide_vectors_change_component_width_only() -> Result<()> {
    let vector = Instruction::VectorConst {
        value: [1.0, 2.0, 3.0],
    };
    assert_eq!(compute_size(&vector, FormatVersion::empty())?, 13);
    assert_eq!(compute_size(&vector, FormatVersion::WIDE_VECTORS)?, 25);

    // Narrow serialization truncates to f32, so only f32-exact components survive.
    let mut bytes = Vec::new();
    write_instruction(&vector, FormatVersion::empty(), &mut bytes)?;
    let mut parser = Parser::new(&bytes);
    assert_eq!(read_instruction(&mut parser, FormatVersion::empty())?, vector);
    Ok(())
}

/// A whole function body decodes as a stream and re-encodes byte-identically.
#[test]
fn stream_roundtrip_is_byte_identical() -> Result<()> {
    let version = FormatVersion::empty();
    let script = vec![
        Instruction::Let {
            property: PropertyRef(1),
            variable: Box::new(Instruction::LocalVariable {
                variable: PropertyRef(1),
            }),
            value: Box::new(Instruction::IntConst { value: 10 }),
        },
        Instruction::JumpIfNot {
            target: 34,
            condition: Box::new(Instruction::LocalVariable {
                variable: PropertyRef(1),
            }),
        },
        Instruction::Return {
            value: Box::new(Instruction::Nothing),
        },
        Instruction::EndOfScript,
    ];

    let mut bytes = Vec::new();
    write_stream(&script, version, &mut bytes)?;
    assert_eq!(bytes.len() as u32, compute_total_size(&script, version)?);

    let mut parser = Parser::new(&bytes);
    let decoded = read_stream(&mut parser, version)?;
    assert_eq!(decoded, script);

    let mut rewritten = Vec::new();
    write_stream(&decoded, version, &mut rewritten)?;
    assert_eq!(rewritten, bytes);
    Ok(())
}

/// Expression nesting beyond the depth cap fails cleanly in both directions.
#[test]
fn recursion_limit_is_enforced() {
    let mut deep = Instruction::IntConst { value: 0 };
    for _ in 0..=MAX_EXPRESSION_DEPTH {
        deep = Instruction::Cast {
            conversion: 0,
            inner: Box::new(deep),
        };
    }

    assert!(matches!(
        compute_size(&deep, FormatVersion::empty()),
        Err(Error::RecursionLimit(_))
    ));

    let mut bytes = Vec::new();
    assert!(matches!(
        write_instruction(&deep, FormatVersion::empty(), &mut bytes),
        Err(Error::RecursionLimit(_))
    ));
}

/// Truncated and corrupt streams surface as errors instead of panics.
#[test]
fn malformed_input_is_rejected() -> Result<()> {
    // Truncated jump operand.
    let mut parser = Parser::new(&[0x06, 0x01]);
    assert!(matches!(
        read_instruction(&mut parser, FormatVersion::empty()),
        Err(Error::OutOfBounds)
    ));

    // A byte outside the opcode table.
    let mut parser = Parser::new(&[0xFF]);
    assert!(matches!(
        read_instruction(&mut parser, FormatVersion::empty()),
        Err(Error::InvalidOpcode(0xFF))
    ));

    // A list terminator where an instruction is required.
    let mut parser = Parser::new(&[0x16]);
    assert!(matches!(
        read_instruction(&mut parser, FormatVersion::empty()),
        Err(Error::InvalidOpcode(0x16))
    ));
    Ok(())
}
