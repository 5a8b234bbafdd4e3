// Copyright (C) 2025 Ryan Daum <ryan.daum@gmail.com> This program is free
// software: you can redistribute it and/or modify it under the terms of the GNU
// General Public License as published by the Free Software Foundation, version
// 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//

use bytes::{Buf, Bytes};
use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, Eq, PartialEq)]
pub enum ReadError {
    #[error("read of {wanted} bytes at offset {offset} runs past end of code ({size} bytes)")]
    OutOfBounds {
        offset: usize,
        wanted: usize,
        size: usize,
    },
}

/// A seekable big-endian cursor over a shared code segment.
///
/// Cloning the reader is cheap: the underlying bytes are reference counted, so each execution
/// can keep its own cursor over a container shared with other executions.
#[derive(Debug, Clone)]
pub struct CodeReader {
    code: Bytes,
    position: usize,
}

macro_rules! read_fixed {
    ($name:ident, $get:ident, $ty:ty) => {
        pub fn $name(&mut self) -> Result<$ty, ReadError> {
            let mut rest = self.code.get(self.position..).unwrap_or_default();
            let value = rest.$get().map_err(|e| ReadError::OutOfBounds {
                offset: self.position,
                wanted: e.requested,
                size: self.code.len(),
            })?;
            self.position += size_of::<$ty>();
            Ok(value)
        }
    };
}

impl CodeReader {
    pub fn new(code: Bytes) -> Self {
        Self { code, position: 0 }
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn size(&self) -> usize {
        self.code.len()
    }

    pub fn remaining(&self) -> usize {
        self.code.len().saturating_sub(self.position)
    }

    /// Moves the cursor. Seeking to exactly `size()` is allowed (the end of the stream); anything
    /// past it is refused.
    pub fn seek(&mut self, offset: usize) -> Result<(), ReadError> {
        if offset > self.code.len() {
            return Err(ReadError::OutOfBounds {
                offset,
                wanted: 0,
                size: self.code.len(),
            });
        }
        self.position = offset;
        Ok(())
    }

    pub fn skip(&mut self, count: usize) -> Result<(), ReadError> {
        self.take(count).map(|_| ())
    }

    /// Borrow the next `count` bytes and advance past them.
    pub fn take(&mut self, count: usize) -> Result<&[u8], ReadError> {
        let start = self.position;
        let end = start
            .checked_add(count)
            .filter(|end| *end <= self.code.len())
            .ok_or(ReadError::OutOfBounds {
                offset: start,
                wanted: count,
                size: self.code.len(),
            })?;
        self.position = end;
        Ok(&self.code[start..end])
    }

    read_fixed!(read_u8, try_get_u8, u8);
    read_fixed!(read_u16, try_get_u16, u16);
    read_fixed!(read_u32, try_get_u32, u32);
    read_fixed!(read_i8, try_get_i8, i8);
    read_fixed!(read_i16, try_get_i16, i16);
    read_fixed!(read_i32, try_get_i32, i32);
    read_fixed!(read_f32, try_get_f32, f32);

    /// The opcode at `offset`, without moving the cursor.
    pub fn peek_u16_at(&self, offset: usize) -> Result<u16, ReadError> {
        let mut cursor = CodeReader {
            code: self.code.clone(),
            position: offset,
        };
        cursor.read_u16()
    }

    pub fn bytes(&self) -> &Bytes {
        &self.code
    }
}
