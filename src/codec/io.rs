//! Endian-aware primitive reading and writing.
//!
//! The [`ScriptIO`] trait gives the codec a single, type-safe surface for the little-endian
//! primitives the bytecode format is built from. All reads are bounds-checked by the caller
//! ([`crate::codec::Parser`]); all writes append to a growable buffer.

/// Little-endian read/write support for the primitive types the format serializes.
///
/// Implemented for `u8`, `u16`, `u32`, `u64`, `i32`, `f32` and `f64`. All implementations
/// are thread-safe as they only work with primitive values.
pub trait ScriptIO: Sized {
    /// Serialized width in bytes.
    const WIDTH: usize;

    /// Decode a value from `data`, which is guaranteed by the caller to hold at least
    /// [`Self::WIDTH`] bytes.
    fn from_le_slice(data: &[u8]) -> Self;

    /// Append this value's little-endian encoding to `out`.
    fn write_le(&self, out: &mut Vec<u8>);
}

macro_rules! impl_script_io {
    ($($ty:ty),*) => {
        $(
            impl ScriptIO for $ty {
                const WIDTH: usize = std::mem::size_of::<$ty>();

                fn from_le_slice(data: &[u8]) -> Self {
                    let mut bytes = [0u8; std::mem::size_of::<$ty>()];
                    bytes.copy_from_slice(&data[..std::mem::size_of::<$ty>()]);
                    <$ty>::from_le_bytes(bytes)
                }

                fn write_le(&self, out: &mut Vec<u8>) {
                    out.extend_from_slice(&self.to_le_bytes());
                }
            }
        )*
    };
}

impl_script_io!(u8, u16, u32, u64, i32, f32, f64);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primitive_roundtrip() {
        let mut buffer = Vec::new();
        0x1122_3344_u32.write_le(&mut buffer);
        assert_eq!(buffer, [0x44, 0x33, 0x22, 0x11]);
        assert_eq!(u32::from_le_slice(&buffer), 0x1122_3344);

        let mut buffer = Vec::new();
        (-5_i32).write_le(&mut buffer);
        assert_eq!(i32::from_le_slice(&buffer), -5);

        let mut buffer = Vec::new();
        1.5_f64.write_le(&mut buffer);
        assert_eq!(buffer.len(), f64::WIDTH);
        assert!((f64::from_le_slice(&buffer) - 1.5).abs() < f64::EPSILON);
    }
}
