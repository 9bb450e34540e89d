use thiserror::Error;

macro_rules! malformed_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::Malformed {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::Malformed {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// This enum covers all failure modes of the codec and the decompiler pipeline. Each variant
/// provides specific context about the failure to enable appropriate handling by callers.
///
/// # Error Categories
///
/// ## Codec Errors
/// - [`Error::OutOfBounds`] - Attempted to read beyond the end of the byte stream
/// - [`Error::InvalidOpcode`] - A byte that maps to no known opcode
/// - [`Error::Malformed`] - Corrupted or inconsistent serialized data
///
/// ## Decompilation Errors
/// - [`Error::UnresolvedJump`] - A required jump target matches no instruction start
/// - [`Error::RecursionLimit`] - Maximum expression nesting depth exceeded
/// - [`Error::FunctionFailed`] - Per-function wrapper used by the batch driver
///
/// # Examples
///
/// ```rust
/// use vscope::{decompile, Error, FormatVersion, Instruction};
///
/// // A jump into the middle of nowhere is fatal, not silently dropped.
/// let script = [Instruction::Jump { target: 500 }];
/// match decompile(&script, FormatVersion::empty()) {
///     Err(Error::UnresolvedJump { offset, target }) => {
///         eprintln!("dangling jump at {offset} -> {target}");
///     }
///     other => panic!("expected UnresolvedJump, got {other:?}"),
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// An out of bound access was attempted while reading the byte stream.
    ///
    /// This error occurs when decoding would read data beyond the end of the
    /// provided buffer. It's a safety check that also catches truncated scripts.
    #[error("Out of Bound read would have occurred!")]
    OutOfBounds,

    /// The stream contains a byte that maps to no known opcode.
    ///
    /// The instruction set is closed; any byte outside the defined opcode table
    /// indicates a corrupt stream or a format revision this library does not model.
    #[error("Invalid opcode - 0x{0:02X}")]
    InvalidOpcode(u8),

    /// The serialized data is damaged or internally inconsistent.
    ///
    /// The error includes the source location where the malformation was
    /// detected for debugging purposes.
    #[error("Malformed - {file}:{line}: {message}")]
    Malformed {
        /// The message to be printed for the Malformed error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// A jump, conditional jump or push-execution-flow instruction names a target
    /// offset that is not the start offset of any instruction in the stream.
    ///
    /// This is fatal for the whole function: a dangling required jump means either
    /// a corrupt stream or a pipeline ordering bug, and no partial tree is returned.
    #[error("Unresolved jump at offset {offset} - target {target} matches no instruction start")]
    UnresolvedJump {
        /// Start offset of the offending jump instruction
        offset: u32,
        /// The raw target offset that could not be matched
        target: u32,
    },

    /// Expression nesting exceeded the maximum supported recursion depth.
    #[error("Maximum recursion depth reached - {0}")]
    RecursionLimit(usize),

    /// A function in a batch decompilation run failed.
    ///
    /// Wraps the underlying error together with the identity of the function,
    /// so callers of the parallel driver can report failures by name.
    #[error("Function '{name}' failed to decompile: {source}")]
    FunctionFailed {
        /// Name of the function that failed
        name: String,
        /// The underlying failure
        #[source]
        source: Box<Error>,
    },
}
