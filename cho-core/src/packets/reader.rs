//! Cursor-based packet reader, the mirror of [`PacketWriter`].
//!
//! Every read is bounds-checked and advances the cursor by exactly the
//! bytes it consumed. The cursor is not rewindable; restart by
//! constructing a new reader over the same buffer.
//!
//! [`PacketWriter`]: super::PacketWriter

use crate::error::ChoError;

/// A read cursor over an immutable byte buffer.
#[derive(Debug)]
pub struct PacketReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> PacketReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Bytes left between the cursor and the end of the buffer.
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// Whether the cursor has reached the end of the buffer.
    pub fn is_empty(&self) -> bool {
        self.pos >= self.buf.len()
    }

    /// Current cursor offset from the start of the buffer.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Take the next `n` bytes, advancing the cursor.
    fn take(&mut self, n: usize) -> Result<&'a [u8], ChoError> {
        let remaining = self.remaining();
        if n > remaining {
            return Err(ChoError::UnexpectedEof {
                needed: n,
                remaining,
            });
        }
        let slice = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    pub fn read_i8(&mut self) -> Result<i8, ChoError> {
        Ok(self.take(1)?[0] as i8)
    }

    pub fn read_u8(&mut self) -> Result<u8, ChoError> {
        Ok(self.take(1)?[0])
    }

    pub fn read_i16(&mut self) -> Result<i16, ChoError> {
        Ok(i16::from_le_bytes(self.take(2)?.try_into().unwrap()))
    }

    pub fn read_u16(&mut self) -> Result<u16, ChoError> {
        Ok(u16::from_le_bytes(self.take(2)?.try_into().unwrap()))
    }

    pub fn read_i32(&mut self) -> Result<i32, ChoError> {
        Ok(i32::from_le_bytes(self.take(4)?.try_into().unwrap()))
    }

    pub fn read_u32(&mut self) -> Result<u32, ChoError> {
        Ok(u32::from_le_bytes(self.take(4)?.try_into().unwrap()))
    }

    pub fn read_i64(&mut self) -> Result<i64, ChoError> {
        Ok(i64::from_le_bytes(self.take(8)?.try_into().unwrap()))
    }

    pub fn read_u64(&mut self) -> Result<u64, ChoError> {
        Ok(u64::from_le_bytes(self.take(8)?.try_into().unwrap()))
    }

    pub fn read_f32(&mut self) -> Result<f32, ChoError> {
        Ok(f32::from_le_bytes(self.take(4)?.try_into().unwrap()))
    }

    /// Base-128 variable-length unsigned integer, least-significant
    /// group first.
    pub fn read_uleb128(&mut self) -> Result<u64, ChoError> {
        let mut value = 0u64;
        let mut shift = 0u32;
        loop {
            let byte = self.read_u8()?;
            if shift >= 64 {
                return Err(ChoError::Malformed("uleb128 value does not fit in 64 bits"));
            }
            value |= u64::from(byte & 0x7f) << shift;
            if byte & 0x80 == 0 {
                return Ok(value);
            }
            shift += 7;
        }
    }

    /// Protocol string. Any marker byte other than 0x0b means "no
    /// string present": exactly one byte is consumed and the empty
    /// string is returned.
    pub fn read_str(&mut self) -> Result<String, ChoError> {
        if self.read_u8()? != 0x0b {
            return Ok(String::new());
        }
        let length = self.read_uleb128()? as usize;
        let bytes = self.take(length)?;
        Ok(std::str::from_utf8(bytes)?.to_owned())
    }

    /// Advance the cursor without interpreting bytes. Used to discard
    /// the payload of an unrecognized packet.
    pub fn skip(&mut self, n: usize) -> Result<(), ChoError> {
        self.take(n).map(|_| ())
    }

    /// Read the 7-byte packet header, returning the raw packet id and
    /// the payload length. The caller is responsible for consuming or
    /// skipping exactly that many bytes next.
    pub fn read_header(&mut self) -> Result<(u16, u32), ChoError> {
        let id = self.read_u16()?;
        self.skip(1)?;
        let length = self.read_u32()?;
        Ok((id, length))
    }
}
