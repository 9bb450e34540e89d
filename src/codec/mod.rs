//! Binary instruction stream codec.
//!
//! Reading and writing of serialized instruction streams. The codec covers the instruction
//! stream only; the surrounding container file format is an external collaborator and is
//! not modeled here.
//!
//! # Key Types
//! - [`Parser`] - Bounds-checked little-endian cursor over a byte slice
//!
//! # Main Functions
//! - [`read_instruction`] / [`read_stream`] - Decode bytes into [`crate::Instruction`] values
//! - [`write_instruction`] / [`write_stream`] - Serialize instructions back to bytes
//!
//! The central contract: for every instruction `x` and version `v`,
//! `read(write(x, v), v) == x` and `write(x, v).len() == compute_size(x, v)`.

mod decode;
mod encode;
pub(crate) mod io;
mod parser;

pub use decode::{read_instruction, read_stream};
pub use encode::{write_instruction, write_stream};
pub use io::ScriptIO;
pub use parser::Parser;
