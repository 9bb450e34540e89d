//! # vscope Prelude
//!
//! This module provides a convenient prelude for the most commonly used types and
//! functions from the vscope library. Import this module to get quick access to the
//! essentials for decoding, sizing and structuring script bytecode.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all vscope operations
pub use crate::Error;

/// The result type used throughout vscope
pub use crate::Result;

// ================================================================================================
// Instruction Model
// ================================================================================================

/// One decoded instruction with typed operands
pub use crate::instruction::Instruction;

/// The closed set of serialized opcode bytes
pub use crate::instruction::Opcode;

/// Feature flags that change serialized layout between format revisions
pub use crate::instruction::FormatVersion;

/// Handle and name types carried by instruction operands
pub use crate::instruction::{FunctionRef, ObjectRef, PropertyRef, ScriptName, SwitchCase};

/// Exact serialized size calculation
pub use crate::instruction::{compute_size, compute_total_size};

// ================================================================================================
// Codec
// ================================================================================================

/// Bounds-checked little-endian cursor over a byte slice
pub use crate::codec::Parser;

/// Stream decoding entry points
pub use crate::codec::{read_instruction, read_stream};

/// Stream encoding entry points
pub use crate::codec::{write_instruction, write_stream};

// ================================================================================================
// Decompiler
// ================================================================================================

/// Structuring entry points
pub use crate::decompiler::{decompile, decompile_all, ScriptFunction};

/// The structural tree and its node types
pub use crate::decompiler::{Node, NodeId, NodeKind, NodeTree};
