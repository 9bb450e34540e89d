//! Opcode identifiers for the visual-scripting virtual machine.
//!
//! Each variant corresponds to one serialized opcode byte. The set is closed: every byte a
//! well-formed stream can contain maps to exactly one [`Opcode`], and every [`Opcode`] maps to
//! exactly one [`crate::instruction::Instruction`] tag. Enum tooling (iteration, counting) is
//! derived so tests can exhaustively cover the instruction set.

use strum::{EnumCount, EnumIter, FromRepr, IntoStaticStr};

/// Identifiers for the instructions of the scripting VM's bytecode format.
///
/// The numeric values are the opcode bytes as they appear in the serialized stream.
/// [`Opcode::from_byte`] performs the only fallible tag decode in the library; everywhere
/// else the set is closed by construction and matched exhaustively.
///
/// # Opcode Categories
///
/// - **Control flow**: [`Jump`](Opcode::Jump), [`JumpIfNot`](Opcode::JumpIfNot),
///   [`PushExecutionFlow`](Opcode::PushExecutionFlow), [`PopExecutionFlow`](Opcode::PopExecutionFlow),
///   [`PopExecutionFlowIfNot`](Opcode::PopExecutionFlowIfNot), [`ComputedJump`](Opcode::ComputedJump),
///   [`Return`](Opcode::Return), [`EndOfScript`](Opcode::EndOfScript)
/// - **Variables**: [`LocalVariable`](Opcode::LocalVariable), [`InstanceVariable`](Opcode::InstanceVariable),
///   [`Let`](Opcode::Let)
/// - **Calls**: [`FinalFunction`](Opcode::FinalFunction), [`VirtualFunction`](Opcode::VirtualFunction),
///   [`LocalVirtualFunction`](Opcode::LocalVirtualFunction), [`CallMath`](Opcode::CallMath)
/// - **Constants**: integer, float, boolean, string, name, object, vector, rotation, struct,
///   array, set and map constants
/// - **Other**: [`Cast`](Opcode::Cast), [`Context`](Opcode::Context), [`SwitchValue`](Opcode::SwitchValue),
///   [`SelfRef`](Opcode::SelfRef), [`Nothing`](Opcode::Nothing)
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumCount, EnumIter, FromRepr, IntoStaticStr,
)]
#[repr(u8)]
pub enum Opcode {
    /// Read of a function-local variable slot.
    LocalVariable = 0x00,
    /// Read of an object instance variable.
    InstanceVariable = 0x01,
    /// Return from the current function, with an optional value expression.
    Return = 0x04,
    /// Unconditional jump to an absolute byte offset.
    Jump = 0x06,
    /// Conditional jump taken when the condition evaluates to *false*.
    JumpIfNot = 0x07,
    /// No-operation expression placeholder.
    Nothing = 0x0B,
    /// Assignment of an expression to a variable expression.
    Let = 0x0F,
    /// Reference to the executing object itself.
    SelfRef = 0x17,
    /// Member access: evaluate an object expression, then an expression in its context.
    Context = 0x19,
    /// Virtual (name-dispatched) function call.
    VirtualFunction = 0x1B,
    /// Statically bound function call.
    FinalFunction = 0x1C,
    /// 32-bit signed integer constant.
    IntConst = 0x1D,
    /// 32-bit float constant.
    FloatConst = 0x1E,
    /// NUL-terminated narrow string constant.
    StringConst = 0x1F,
    /// Reference to an object asset.
    ObjectConst = 0x20,
    /// Interned name constant.
    NameConst = 0x21,
    /// Rotation constant (three components, width depends on the format version).
    RotationConst = 0x22,
    /// Vector constant (three components, width depends on the format version).
    VectorConst = 0x23,
    /// Boolean `true` constant.
    True = 0x27,
    /// Boolean `false` constant.
    False = 0x28,
    /// Null object reference constant.
    NoObject = 0x2A,
    /// Struct constant with per-field default expressions.
    StructConst = 0x2F,
    /// NUL-terminated UTF-16 string constant.
    UnicodeStringConst = 0x34,
    /// Primitive conversion applied to an inner expression.
    Cast = 0x38,
    /// Virtual call dispatched against the local scope.
    LocalVirtualFunction = 0x45,
    /// Push a continuation address onto the execution-flow stack.
    PushExecutionFlow = 0x4A,
    /// Pop the execution-flow stack and transfer control to the popped address.
    PopExecutionFlow = 0x4B,
    /// Indirect jump through a runtime-computed offset expression.
    ComputedJump = 0x4E,
    /// Pop the execution-flow stack and transfer if the condition is *false*.
    PopExecutionFlowIfNot = 0x4F,
    /// Terminator marking the end of the instruction stream.
    EndOfScript = 0x53,
    /// Array literal constant.
    ArrayConst = 0x58,
    /// Set literal constant.
    SetConst = 0x5D,
    /// Map literal constant.
    MapConst = 0x5F,
    /// Statically bound call into the math library (no context switch).
    CallMath = 0x68,
    /// Multi-way value selection on a control expression.
    SwitchValue = 0x69,
}

impl Opcode {
    /// Decode an opcode from its serialized byte value.
    ///
    /// Returns `None` for bytes outside the closed instruction set, including the
    /// list-terminator marker bytes which are not instructions in their own right.
    #[must_use]
    pub fn from_byte(value: u8) -> Option<Opcode> {
        Opcode::from_repr(value)
    }

    /// The serialized byte value of this opcode.
    #[must_use]
    pub fn byte(self) -> u8 {
        self as u8
    }

    /// The human-readable mnemonic of this opcode.
    #[must_use]
    pub fn mnemonic(self) -> &'static str {
        self.into()
    }
}

/// Terminator marker bytes.
///
/// These bytes close variable-length operand lists in the serialized form. They are not
/// instructions: the size calculator charges them to the owning instruction's fixed cost,
/// and the decoder consumes them when reading the owning instruction.
pub(crate) mod markers {
    /// Closes the parameter list of every call flavor.
    pub(crate) const END_FUNCTION_PARMS: u8 = 0x16;
    /// Closes the field list of a struct constant.
    pub(crate) const END_STRUCT_CONST: u8 = 0x30;
    /// Closes the element list of an array constant.
    pub(crate) const END_ARRAY_CONST: u8 = 0x59;
    /// Closes the element list of a set constant.
    pub(crate) const END_SET_CONST: u8 = 0x5E;
    /// Closes the entry list of a map constant.
    pub(crate) const END_MAP_CONST: u8 = 0x60;
}
