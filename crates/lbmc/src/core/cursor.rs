// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Bounds-checked big-endian read cursor.
//!
//! All LBMC integers are network order. Reads never panic: running past the
//! view yields [`DecodeError::OutOfBounds`] with the absolute offset of the
//! failed read, so errors raised inside a sub-view still point at the right
//! byte of the enclosing message.

use crate::error::{DecodeError, Result};

/// Generate big-endian read methods for primitive types.
///
/// Each generated method checks bounds, converts via `from_be_bytes()` and
/// advances the offset.
macro_rules! impl_read_be {
    ($name:ident, $type:ty, $size:expr) => {
        pub fn $name(&mut self) -> Result<$type> {
            let bytes = self.read_array::<{ $size }>()?;
            Ok(<$type>::from_be_bytes(bytes))
        }
    };
}

/// Immutable cursor over one message (or a bounded part of it).
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    buffer: &'a [u8],
    offset: usize,
    /// Absolute position of `buffer[0]` in the outermost view.
    base: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(buffer: &'a [u8]) -> Self {
        Self {
            buffer,
            offset: 0,
            base: 0,
        }
    }

    impl_read_be!(read_u16_be, u16, 2);
    impl_read_be!(read_u32_be, u32, 4);
    impl_read_be!(read_u64_be, u64, 8);

    pub fn read_u8(&mut self) -> Result<u8> {
        let [b] = self.read_array::<1>()?;
        Ok(b)
    }

    pub fn peek_u8(&self) -> Result<u8> {
        self.check(1)?;
        Ok(self.buffer[self.offset])
    }

    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(N)?);
        Ok(out)
    }

    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        self.check(len)?;
        let slice = &self.buffer[self.offset..self.offset + len];
        self.offset += len;
        Ok(slice)
    }

    /// Read a NUL-terminated byte string; the terminator is consumed but not
    /// returned. A missing terminator takes the rest of the view.
    pub fn read_cstr(&mut self) -> &'a [u8] {
        let rest = &self.buffer[self.offset..];
        match rest.iter().position(|&b| b == 0) {
            Some(nul) => {
                self.offset += nul + 1;
                &rest[..nul]
            }
            None => {
                self.offset = self.buffer.len();
                rest
            }
        }
    }

    pub fn skip(&mut self, len: usize) -> Result<()> {
        self.check(len)?;
        self.offset += len;
        Ok(())
    }

    /// Split off the next `len` bytes as an independent cursor and advance
    /// past them. No bytes are copied.
    pub fn sub_view(&mut self, len: usize) -> Result<Cursor<'a>> {
        let base = self.absolute_offset();
        let bytes = self.read_bytes(len)?;
        Ok(Cursor {
            buffer: bytes,
            offset: 0,
            base,
        })
    }

    /// Everything not yet consumed, without advancing.
    pub fn rest(&self) -> &'a [u8] {
        &self.buffer[self.offset..]
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn absolute_offset(&self) -> usize {
        self.base + self.offset
    }

    pub fn remaining(&self) -> usize {
        self.buffer.len().saturating_sub(self.offset)
    }

    pub fn is_eof(&self) -> bool {
        self.offset >= self.buffer.len()
    }

    fn check(&self, len: usize) -> Result<()> {
        if len > self.remaining() {
            return Err(DecodeError::OutOfBounds {
                offset: self.absolute_offset(),
                wanted: len,
                available: self.remaining(),
            });
        }
        Ok(())
    }
}
