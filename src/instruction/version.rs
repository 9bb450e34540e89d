//! Serialization format version flags.

use bitflags::bitflags;

bitflags! {
    /// Flags describing how a given bytecode stream serializes version-dependent operands.
    ///
    /// A `FormatVersion` travels alongside every size computation and codec call: two
    /// instructions with identical tags and operands can serialize to different byte counts
    /// under different versions. The value is immutable for the duration of one function's
    /// pipeline run.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use vscope::{compute_size, FormatVersion, Instruction};
    ///
    /// let vector = Instruction::VectorConst { value: [1.0, 2.0, 3.0] };
    /// // 1 opcode byte + 3 components of 4 bytes each.
    /// assert_eq!(compute_size(&vector, FormatVersion::empty()).unwrap(), 13);
    /// // 1 opcode byte + 3 components of 8 bytes each.
    /// assert_eq!(compute_size(&vector, FormatVersion::WIDE_VECTORS).unwrap(), 25);
    /// ```
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct FormatVersion: u32 {
        /// Vector-like constants use 8-byte components instead of 4-byte components.
        const WIDE_VECTORS = 0x0001;
    }
}

impl FormatVersion {
    /// Byte width of a single vector or rotation component under this version.
    #[must_use]
    pub fn vector_component_width(&self) -> u32 {
        if self.contains(FormatVersion::WIDE_VECTORS) {
            8
        } else {
            4
        }
    }
}
