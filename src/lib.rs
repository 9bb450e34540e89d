// Copyright 2026 vscope contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]

//! # vscope
//!
//! A cross-platform library for decoding, analyzing and re-encoding the stack-based
//! bytecode of a visual-scripting virtual machine. Built in pure Rust, `vscope` parses
//! serialized script functions into a typed instruction model, computes exact
//! version-dependent serialized sizes, writes streams back byte-for-byte, and structures
//! flat instruction lists into `if`/loop regions for decompilation.
//!
//! ## Features
//!
//! - **Typed instruction model** - A closed enum covering every opcode the format defines
//! - **Exact size calculation** - Byte-accurate serialized sizes, including the wide-vector format change
//! - **Byte-faithful codec** - Decode and re-encode streams without loss
//! - **Control-flow structuring** - A fixed pass pipeline reconstructing `if` and loop shape
//! - **Parallel batch runs** - Structure many functions concurrently with per-function error isolation
//!
//! ## Quick Start
//!
//! Add `vscope` to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! vscope = "0.1"
//! ```
//!
//! ### Decoding and structuring
//!
//! ```rust,no_run
//! use vscope::prelude::*;
//!
//! let bytes = std::fs::read("function.bin")?;
//! let mut parser = Parser::new(&bytes);
//! let script = read_stream(&mut parser, FormatVersion::WIDE_VECTORS)?;
//!
//! let tree = decompile(&script, FormatVersion::WIDE_VECTORS)?;
//! println!("{} top-level regions", tree.node(tree.root()).children.len());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ### Size calculation
//!
//! ```rust
//! use vscope::{compute_size, FormatVersion, Instruction};
//!
//! let jump = Instruction::Jump { target: 16 };
//! assert_eq!(compute_size(&jump, FormatVersion::empty()).unwrap(), 5);
//! ```
//!
//! ## Architecture
//!
//! `vscope` is organized into three layers:
//!
//! - [`instruction`] - The typed instruction model, opcode set, format versioning and the
//!   shared size/traversal machinery
//! - [`codec`] - Binary decoding and byte-faithful re-encoding of instruction streams
//! - [`decompiler`] - The node tree and the pass pipeline that folds control-flow idioms
//!   into structured regions
//!
//! Every consumer of instruction layout (the size calculator, the codec, the structural
//! visitor) derives from one authoritative operand table, so the three can never disagree
//! about how many bytes an instruction occupies.
//!
//! ## Error Handling
//!
//! All operations return [`Result<T, Error>`](Result) with detailed error information:
//!
//! ```rust,no_run
//! use vscope::{decompile, Error, FormatVersion, Instruction};
//!
//! let script = vec![Instruction::Jump { target: 99 }];
//! match decompile(&script, FormatVersion::empty()) {
//!     Ok(tree) => println!("{} nodes", tree.len()),
//!     Err(Error::UnresolvedJump { offset, target }) => {
//!         println!("dangling jump at {offset} to {target}");
//!     }
//!     Err(e) => println!("Error: {e}"),
//! }
//! ```

#[macro_use]
pub(crate) mod error;

/// Convenient re-exports of the most commonly used types and functions.
///
/// # Example
///
/// ```rust,no_run
/// use vscope::prelude::*;
///
/// let bytes = std::fs::read("function.bin")?;
/// let mut parser = Parser::new(&bytes);
/// let script = read_stream(&mut parser, FormatVersion::empty())?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub mod prelude;

/// The typed instruction model and its size machinery.
///
/// # Key Types
///
/// - [`Instruction`] - One decoded instruction with typed operands
/// - [`Opcode`] - The closed set of serialized opcode bytes
/// - [`FormatVersion`] - Feature flags that change serialized layout
///
/// # Main Functions
///
/// - [`compute_size`] / [`compute_total_size`] - Exact serialized sizes
/// - [`instruction::walk`] - Offset-tracking traversal over an instruction's expression tree
pub mod instruction;

/// Binary decoding and encoding of instruction streams.
///
/// # Main Functions
///
/// - [`codec::read_instruction`] / [`codec::read_stream`] - Decode from bytes
/// - [`codec::write_instruction`] / [`codec::write_stream`] - Re-encode byte-faithfully
///
/// # Examples
///
/// ```rust,no_run
/// use vscope::{codec::{read_instruction, Parser}, FormatVersion};
///
/// let bytes = [0x06, 0x10, 0x00, 0x00, 0x00]; // jump to offset 16
/// let mut parser = Parser::new(&bytes);
/// let instruction = read_instruction(&mut parser, FormatVersion::empty())?;
/// # Ok::<(), vscope::Error>(())
/// ```
pub mod codec;

/// Control-flow structuring of decoded functions.
///
/// # Key Types
///
/// - [`decompiler::NodeTree`] - Arena-owned structural tree for one function
/// - [`decompiler::NodeKind`] - The structural role of each node
/// - [`decompiler::passes::DecompilerPass`] - One stage of the fixed pipeline
///
/// # Main Functions
///
/// - [`decompile`] - Run the full pipeline over one function
/// - [`decompile_all`] - Structure many functions in parallel
pub mod decompiler;

/// `vscope` Result type
///
/// A type alias for [`std::result::Result<T, Error>`] where the error type is always
/// [`Error`]. Used consistently throughout the crate for all fallible operations.
pub type Result<T> = std::result::Result<T, Error>;

/// `vscope` Error type
///
/// The main error type for all operations in this crate: malformed streams, unknown
/// opcodes, unresolvable jumps and expression-depth overruns.
pub use error::Error;

pub use decompiler::{decompile, decompile_all};
pub use instruction::{
    compute_size, compute_total_size, FormatVersion, Instruction, Opcode, MAX_EXPRESSION_DEPTH,
};
