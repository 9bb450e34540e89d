//! Instruction model, serialized-size contract and generic traversal.
//!
//! This module defines the in-memory representation of the scripting VM's bytecode and the
//! exact, version-dependent layout rules every other component is built on.
//!
//! # Key Types
//! - [`Instruction`] - One decoded instruction with typed operands
//! - [`Opcode`] - The closed set of instruction tags with their serialized byte values
//! - [`FormatVersion`] - Flags affecting the serialized width of certain operand kinds
//! - [`InstructionVisitor`] - Hooks for offset-tracking traversal of an instruction tree
//!
//! # Main Functions
//! - [`compute_size`] - Exact serialized byte length of one instruction tree
//! - [`compute_total_size`] - Exact serialized byte length of a whole stream
//! - [`advance`] - Streaming size accumulation in binary writer order
//! - [`walk`] - Generic traversal shared by the size calculator and the node builder
//!
//! # Example
//! ```rust
//! use vscope::{compute_total_size, FormatVersion, Instruction};
//!
//! let script = [
//!     Instruction::Jump { target: 6 },
//!     Instruction::EndOfScript,
//! ];
//! assert_eq!(compute_total_size(&script, FormatVersion::empty()).unwrap(), 6);
//! ```

pub(crate) mod layout;
mod model;
pub(crate) mod opcode;
mod size;
mod version;
mod visitor;

pub use model::{
    FunctionRef, Instruction, ObjectRef, PropertyRef, ScriptName, SwitchCase,
};
pub use opcode::Opcode;
pub use size::{advance, compute_size, compute_total_size};
pub use version::FormatVersion;
pub use visitor::{walk, InstructionVisitor, MAX_EXPRESSION_DEPTH};
