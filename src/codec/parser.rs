//! Low-level byte stream parser for bytecode decoding.
//!
//! [`Parser`] is a cursor over a borrowed byte slice with bounds-checked little-endian
//! reads. All operations validate data availability before reading, so a truncated or
//! corrupt stream surfaces as [`crate::Error::OutOfBounds`] instead of panicking.
//!
//! # Example
//!
//! ```rust
//! use vscope::codec::Parser;
//!
//! let data = [0x01, 0x02, 0x03, 0x04];
//! let mut parser = Parser::new(&data);
//!
//! let value = parser.read_le::<u16>()?;
//! assert_eq!(value, 0x0201);
//! assert_eq!(parser.pos(), 2);
//! # Ok::<(), vscope::Error>(())
//! ```

use crate::{codec::io::ScriptIO, Error::OutOfBounds, Result};

/// A cursor-based binary data parser with bounds checking.
///
/// The parser maintains a position within a borrowed byte slice and advances it as values
/// are read. It never reads past the end of the data.
pub struct Parser<'a> {
    /// The binary data being parsed
    data: &'a [u8],
    /// Current position within the data buffer
    position: usize,
}

impl<'a> Parser<'a> {
    /// Create a new [`Parser`] over a byte slice.
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        Parser { data, position: 0 }
    }

    /// Returns the length of the underlying data buffer.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the parser has no data.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns the current read position.
    #[must_use]
    pub fn pos(&self) -> usize {
        self.position
    }

    /// Returns the number of bytes remaining after the current position.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.position)
    }

    /// Returns `true` if at least one more byte can be read.
    #[must_use]
    pub fn has_more_data(&self) -> bool {
        self.position < self.data.len()
    }

    /// Move the cursor to an absolute position.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::OutOfBounds`] if `pos` is past the end of the data.
    pub fn seek(&mut self, pos: usize) -> Result<()> {
        if pos > self.data.len() {
            return Err(OutOfBounds);
        }
        self.position = pos;
        Ok(())
    }

    /// Peek at the byte under the cursor without advancing.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::OutOfBounds`] at end of data.
    pub fn peek_byte(&self) -> Result<u8> {
        self.data.get(self.position).copied().ok_or(OutOfBounds)
    }

    /// Read a primitive `T` in little-endian order and advance the cursor.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::OutOfBounds`] if fewer than `T::WIDTH` bytes remain.
    pub fn read_le<T: ScriptIO>(&mut self) -> Result<T> {
        if self.remaining() < T::WIDTH {
            return Err(OutOfBounds);
        }
        let value = T::from_le_slice(&self.data[self.position..]);
        self.position += T::WIDTH;
        Ok(value)
    }

    /// Read bytes until (and including) a NUL terminator, returning the string before it.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::OutOfBounds`] if no terminator is found, or
    /// [`crate::Error::Malformed`] if the bytes are not valid UTF-8.
    pub fn read_string(&mut self) -> Result<String> {
        let start = self.position;
        while self.peek_byte()? != 0 {
            self.position += 1;
        }
        let bytes = &self.data[start..self.position];
        // Consume the terminator.
        self.position += 1;
        String::from_utf8(bytes.to_vec())
            .map_err(|_| malformed_error!("string constant at {} is not valid UTF-8", start))
    }

    /// Read UTF-16 code units until (and including) a two-byte NUL terminator.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::OutOfBounds`] if no terminator is found, or
    /// [`crate::Error::Malformed`] if the units are not valid UTF-16.
    pub fn read_string_utf16(&mut self) -> Result<widestring::Utf16String> {
        let start = self.position;
        let mut units = Vec::new();
        loop {
            let unit = self.read_le::<u16>()?;
            if unit == 0 {
                break;
            }
            units.push(unit);
        }
        widestring::Utf16String::from_vec(units)
            .map_err(|_| malformed_error!("wide string constant at {} is not valid UTF-16", start))
    }
}
