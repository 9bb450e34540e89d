//! The tagged instruction model.
//!
//! One [`Instruction`] value represents one decoded unit of the bytecode stream: an opcode plus
//! its typed operands. The tag set is closed and mirrors [`crate::instruction::Opcode`]
//! one-to-one; every place an instruction is matched handles every tag, so an unhandled tag is
//! a compile error rather than a runtime defect.
//!
//! Expression-valued operands are stored as nested boxed instructions, reflecting the stream's
//! prefix encoding: a conditional jump owns its condition expression, a call owns its argument
//! expressions, and so on.

use widestring::Utf16String;

use crate::instruction::Opcode;

/// Non-owning handle to a property (variable or field) definition.
///
/// Serialized as an 8-byte value. Resolution to an actual symbol is the concern of the
/// external symbol table; inside this crate the handle is opaque.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PropertyRef(pub u64);

/// Non-owning handle to an object asset. Serialized as an 8-byte value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectRef(pub u64);

/// Non-owning handle to a callable function. Serialized as an 8-byte value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FunctionRef(pub u64);

/// An interned name: a table index plus a disambiguating instance number.
///
/// Serialized as 12 bytes (8-byte index, 4-byte number).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScriptName {
    /// Index into the external name table.
    pub index: u64,
    /// Instance number distinguishing repeated names.
    pub number: u32,
}

/// One arm of a [`Instruction::SwitchValue`] expression.
#[derive(Debug, Clone, PartialEq)]
pub struct SwitchCase {
    /// The value this arm matches against the control expression.
    pub value: Instruction,
    /// Absolute byte offset of the next case, as stored in the stream.
    pub next_offset: u32,
    /// The expression this arm evaluates to.
    pub result: Instruction,
}

/// One decoded bytecode instruction with its typed operands.
///
/// Instructions are immutable values. Control-transfer tags carry their raw absolute byte
/// target exactly as serialized; translating raw offsets into structural references is the
/// decompiler's job, and computing them from a tree is the compiler's (via
/// [`crate::compute_size`]).
///
/// # Examples
///
/// ```rust
/// use vscope::{compute_size, FormatVersion, Instruction};
///
/// // if (!cond) goto 42  — 1 opcode byte, 4 target bytes, 1 byte for the condition.
/// let branch = Instruction::JumpIfNot {
///     target: 42,
///     condition: Box::new(Instruction::True),
/// };
/// assert_eq!(compute_size(&branch, FormatVersion::empty()).unwrap(), 6);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Instruction {
    /// Read of a function-local variable. `1 + 8` bytes.
    LocalVariable {
        /// The variable being read.
        variable: PropertyRef,
    },
    /// Read of an object instance variable. `1 + 8` bytes.
    InstanceVariable {
        /// The variable being read.
        variable: PropertyRef,
    },
    /// Return from the current function. `1` byte plus the value expression
    /// ([`Instruction::Nothing`] for a bare `return;`).
    Return {
        /// The returned value expression.
        value: Box<Instruction>,
    },
    /// Unconditional jump to an absolute byte offset. `1 + 4` bytes.
    Jump {
        /// Absolute byte offset of the jump destination.
        target: u32,
    },
    /// Jump taken when the condition evaluates to *false*. `1 + 4` bytes plus the condition.
    JumpIfNot {
        /// Absolute byte offset of the jump destination.
        target: u32,
        /// The boolean condition expression.
        condition: Box<Instruction>,
    },
    /// No-operation expression placeholder. `1` byte.
    Nothing,
    /// Assignment. `1 + 8` bytes plus both expressions, variable first.
    Let {
        /// The property backing the assignment destination.
        property: PropertyRef,
        /// The destination expression.
        variable: Box<Instruction>,
        /// The assigned value expression.
        value: Box<Instruction>,
    },
    /// Reference to the executing object. `1` byte.
    SelfRef,
    /// Member access. Writer order: the object expression, then 12 fixed metadata bytes
    /// (4-byte skip size, 8-byte field handle), then the inner expression.
    Context {
        /// Expression yielding the object to switch context to.
        object: Box<Instruction>,
        /// Bytes to skip past the inner expression if the object is null.
        skip_size: u32,
        /// The field being accessed, for null-access diagnostics.
        field: PropertyRef,
        /// The expression evaluated in the object's context.
        inner: Box<Instruction>,
    },
    /// Virtual (name-dispatched) call. `1 + 12` bytes plus parameters plus a terminator byte.
    VirtualFunction {
        /// Name of the callee, dispatched at runtime.
        name: ScriptName,
        /// Ordered argument expressions.
        params: Vec<Instruction>,
    },
    /// Statically bound call. `1 + 8` bytes plus parameters plus a terminator byte.
    FinalFunction {
        /// The callee.
        function: FunctionRef,
        /// Ordered argument expressions.
        params: Vec<Instruction>,
    },
    /// 32-bit signed integer constant. `1 + 4` bytes.
    IntConst {
        /// The constant value.
        value: i32,
    },
    /// 32-bit float constant. `1 + 4` bytes.
    FloatConst {
        /// The constant value.
        value: f32,
    },
    /// Narrow string constant. `1 + (len + 1)` bytes including the NUL terminator.
    /// The string must not contain embedded NUL bytes.
    StringConst {
        /// The constant value.
        value: String,
    },
    /// Object asset reference constant. `1 + 8` bytes.
    ObjectConst {
        /// The referenced object.
        object: ObjectRef,
    },
    /// Interned name constant. `1 + 12` bytes.
    NameConst {
        /// The constant value.
        name: ScriptName,
    },
    /// Rotation constant. `1 + 3 * component_width` bytes; the component width is 4 or 8
    /// depending on [`crate::FormatVersion::WIDE_VECTORS`].
    RotationConst {
        /// Pitch, yaw and roll components.
        value: [f64; 3],
    },
    /// Vector constant. Same width rules as [`Instruction::RotationConst`].
    VectorConst {
        /// X, Y and Z components.
        value: [f64; 3],
    },
    /// Boolean `true` constant. `1` byte.
    True,
    /// Boolean `false` constant. `1` byte.
    False,
    /// Null object reference. `1` byte.
    NoObject,
    /// Struct constant. `1 + 8 + 4` bytes plus the field expressions plus a terminator byte.
    StructConst {
        /// The struct type being constructed.
        strukt: ObjectRef,
        /// Serialized size of the struct value, as recorded in the stream.
        serialized_size: u32,
        /// Per-field default expressions, in declaration order.
        fields: Vec<Instruction>,
    },
    /// UTF-16 string constant. `1 + 2 * (len + 1)` bytes where `len` counts UTF-16 code
    /// units, including the two-byte NUL terminator.
    UnicodeStringConst {
        /// The constant value.
        value: Utf16String,
    },
    /// Primitive conversion. `1 + 1` bytes (raw conversion code) plus the inner expression.
    Cast {
        /// Raw conversion code as serialized.
        conversion: u8,
        /// The expression being converted.
        inner: Box<Instruction>,
    },
    /// Virtual call dispatched against the local scope. Same layout as
    /// [`Instruction::VirtualFunction`].
    LocalVirtualFunction {
        /// Name of the callee.
        name: ScriptName,
        /// Ordered argument expressions.
        params: Vec<Instruction>,
    },
    /// Push a continuation address onto the execution-flow stack. `1 + 4` bytes.
    PushExecutionFlow {
        /// Absolute byte offset execution resumes at when the flow is popped.
        target: u32,
    },
    /// Pop the execution-flow stack and jump to the popped address. `1` byte.
    PopExecutionFlow,
    /// Indirect jump through a computed offset. `1` byte plus the destination expression.
    ComputedJump {
        /// Expression yielding the destination offset at runtime.
        destination: Box<Instruction>,
    },
    /// Pop the execution-flow stack and jump if the condition is *false*. `1` byte plus the
    /// condition expression.
    PopExecutionFlowIfNot {
        /// The boolean condition expression.
        condition: Box<Instruction>,
    },
    /// Stream terminator. `1` byte.
    EndOfScript,
    /// Array literal. `1 + 8 + 4` bytes plus the element expressions plus a terminator byte.
    ArrayConst {
        /// Property describing the element type.
        inner_property: PropertyRef,
        /// Element expressions in order.
        elements: Vec<Instruction>,
    },
    /// Set literal. Same layout as [`Instruction::ArrayConst`].
    SetConst {
        /// Property describing the element type.
        inner_property: PropertyRef,
        /// Element expressions in order.
        elements: Vec<Instruction>,
    },
    /// Map literal. `1 + 8 + 4` bytes plus key/value expression pairs plus a terminator byte.
    MapConst {
        /// Property describing the key type.
        key_property: PropertyRef,
        /// Ordered key/value entry pairs.
        entries: Vec<(Instruction, Instruction)>,
    },
    /// Statically bound math-library call, dispatched without a context switch. Same layout
    /// as [`Instruction::FinalFunction`].
    CallMath {
        /// The callee.
        function: FunctionRef,
        /// Ordered argument expressions.
        params: Vec<Instruction>,
    },
    /// Multi-way value selection. `1 + 2 + 4` bytes plus the control expression, the cases
    /// (each: match value, 4-byte next-case offset, result expression) and the default
    /// expression.
    SwitchValue {
        /// Absolute byte offset of the first instruction after the switch.
        end_offset: u32,
        /// The control expression the cases match against.
        index: Box<Instruction>,
        /// The case arms, in serialized order.
        cases: Vec<SwitchCase>,
        /// The expression evaluated when no case matches.
        default: Box<Instruction>,
    },
}

impl Instruction {
    /// The opcode tag of this instruction.
    #[must_use]
    pub fn opcode(&self) -> Opcode {
        match self {
            Instruction::LocalVariable { .. } => Opcode::LocalVariable,
            Instruction::InstanceVariable { .. } => Opcode::InstanceVariable,
            Instruction::Return { .. } => Opcode::Return,
            Instruction::Jump { .. } => Opcode::Jump,
            Instruction::JumpIfNot { .. } => Opcode::JumpIfNot,
            Instruction::Nothing => Opcode::Nothing,
            Instruction::Let { .. } => Opcode::Let,
            Instruction::SelfRef => Opcode::SelfRef,
            Instruction::Context { .. } => Opcode::Context,
            Instruction::VirtualFunction { .. } => Opcode::VirtualFunction,
            Instruction::FinalFunction { .. } => Opcode::FinalFunction,
            Instruction::IntConst { .. } => Opcode::IntConst,
            Instruction::FloatConst { .. } => Opcode::FloatConst,
            Instruction::StringConst { .. } => Opcode::StringConst,
            Instruction::ObjectConst { .. } => Opcode::ObjectConst,
            Instruction::NameConst { .. } => Opcode::NameConst,
            Instruction::RotationConst { .. } => Opcode::RotationConst,
            Instruction::VectorConst { .. } => Opcode::VectorConst,
            Instruction::True => Opcode::True,
            Instruction::False => Opcode::False,
            Instruction::NoObject => Opcode::NoObject,
            Instruction::StructConst { .. } => Opcode::StructConst,
            Instruction::UnicodeStringConst { .. } => Opcode::UnicodeStringConst,
            Instruction::Cast { .. } => Opcode::Cast,
            Instruction::LocalVirtualFunction { .. } => Opcode::LocalVirtualFunction,
            Instruction::PushExecutionFlow { .. } => Opcode::PushExecutionFlow,
            Instruction::PopExecutionFlow => Opcode::PopExecutionFlow,
            Instruction::ComputedJump { .. } => Opcode::ComputedJump,
            Instruction::PopExecutionFlowIfNot { .. } => Opcode::PopExecutionFlowIfNot,
            Instruction::EndOfScript => Opcode::EndOfScript,
            Instruction::ArrayConst { .. } => Opcode::ArrayConst,
            Instruction::SetConst { .. } => Opcode::SetConst,
            Instruction::MapConst { .. } => Opcode::MapConst,
            Instruction::CallMath { .. } => Opcode::CallMath,
            Instruction::SwitchValue { .. } => Opcode::SwitchValue,
        }
    }

    /// The raw absolute target offset, for tags that carry a statically known one.
    ///
    /// Returns `Some` for [`Instruction::Jump`], [`Instruction::JumpIfNot`] and
    /// [`Instruction::PushExecutionFlow`]. Pop-flow transfers are context dependent and
    /// computed jumps are runtime dependent; both return `None`.
    #[must_use]
    pub fn raw_target(&self) -> Option<u32> {
        match self {
            Instruction::Jump { target }
            | Instruction::JumpIfNot { target, .. }
            | Instruction::PushExecutionFlow { target } => Some(*target),
            _ => None,
        }
    }

    /// Whether this instruction transfers control away from the fall-through path.
    ///
    /// Used by basic-block construction: a block ends at (inclusive of) such an instruction.
    #[must_use]
    pub fn is_control_transfer(&self) -> bool {
        matches!(
            self,
            Instruction::Jump { .. }
                | Instruction::JumpIfNot { .. }
                | Instruction::PushExecutionFlow { .. }
                | Instruction::PopExecutionFlow
                | Instruction::PopExecutionFlowIfNot { .. }
                | Instruction::ComputedJump { .. }
                | Instruction::EndOfScript
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_target_only_for_static_transfers() {
        assert_eq!(Instruction::Jump { target: 8 }.raw_target(), Some(8));
        assert_eq!(
            Instruction::PushExecutionFlow { target: 16 }.raw_target(),
            Some(16)
        );
        assert_eq!(
            Instruction::JumpIfNot {
                target: 4,
                condition: Box::new(Instruction::False)
            }
            .raw_target(),
            Some(4)
        );
        assert_eq!(Instruction::PopExecutionFlow.raw_target(), None);
        assert_eq!(
            Instruction::ComputedJump {
                destination: Box::new(Instruction::IntConst { value: 4 })
            }
            .raw_target(),
            None
        );
    }

    #[test]
    fn control_transfer_classification() {
        assert!(Instruction::Jump { target: 0 }.is_control_transfer());
        assert!(Instruction::PopExecutionFlow.is_control_transfer());
        assert!(Instruction::EndOfScript.is_control_transfer());
        assert!(!Instruction::Nothing.is_control_transfer());
        assert!(!Instruction::Return {
            value: Box::new(Instruction::Nothing)
        }
        .is_control_transfer());
    }
}
