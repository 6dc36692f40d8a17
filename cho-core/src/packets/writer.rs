//! Sequential packet writer with deferred header backfill.

use bytes::{BufMut, Bytes, BytesMut};

use super::{HEADER_SIZE, PacketId};

/// An append-only builder for a single outbound packet.
///
/// The 7-byte header region is reserved up front and backfilled by
/// [`finish`], since the payload length is only known once all writes
/// are complete. Every `write_*` returns the builder, so packets are
/// assembled as one chained expression:
///
/// ```
/// use cho_core::packets::{PacketId, PacketWriter};
///
/// let packet = PacketWriter::new()
///     .write_i32(1001)
///     .finish(PacketId::StartSpectating);
/// ```
///
/// All integers are little-endian on the wire.
///
/// [`finish`]: PacketWriter::finish
#[derive(Debug)]
pub struct PacketWriter {
    buf: BytesMut,
}

impl PacketWriter {
    /// A writer with the header region preallocated.
    pub fn new() -> Self {
        let mut buf = BytesMut::with_capacity(HEADER_SIZE + 32);
        buf.resize(HEADER_SIZE, 0);
        Self { buf }
    }

    pub fn write_i8(mut self, value: i8) -> Self {
        self.buf.put_i8(value);
        self
    }

    pub fn write_u8(mut self, value: u8) -> Self {
        self.buf.put_u8(value);
        self
    }

    pub fn write_i16(mut self, value: i16) -> Self {
        self.buf.put_i16_le(value);
        self
    }

    pub fn write_u16(mut self, value: u16) -> Self {
        self.buf.put_u16_le(value);
        self
    }

    pub fn write_i32(mut self, value: i32) -> Self {
        self.buf.put_i32_le(value);
        self
    }

    pub fn write_u32(mut self, value: u32) -> Self {
        self.buf.put_u32_le(value);
        self
    }

    pub fn write_i64(mut self, value: i64) -> Self {
        self.buf.put_i64_le(value);
        self
    }

    pub fn write_u64(mut self, value: u64) -> Self {
        self.buf.put_u64_le(value);
        self
    }

    pub fn write_f32(mut self, value: f32) -> Self {
        self.buf.put_f32_le(value);
        self
    }

    /// Base-128 variable-length unsigned integer: the low 7 bits of
    /// each group with the continuation bit (0x80) on all but the final
    /// byte, least-significant group first.
    pub fn write_uleb128(mut self, mut value: u64) -> Self {
        while value >= 0x80 {
            self.buf.put_u8((value as u8 & 0x7f) | 0x80);
            value >>= 7;
        }
        self.buf.put_u8(value as u8);
        self
    }

    /// Protocol string: a single zero byte for the empty string,
    /// otherwise the 0x0b presence marker, the UTF-8 byte length as
    /// uleb128, then the raw bytes.
    pub fn write_str(mut self, value: &str) -> Self {
        if value.is_empty() {
            return self.write_u8(0);
        }

        self = self.write_u8(0x0b).write_uleb128(value.len() as u64);
        self.buf.put_slice(value.as_bytes());
        self
    }

    /// Backfill the header in place and return the completed packet.
    pub fn finish(mut self, id: PacketId) -> Bytes {
        let payload_length = (self.buf.len() - HEADER_SIZE) as u32;
        self.buf[0..2].copy_from_slice(&(id as u16).to_le_bytes());
        self.buf[2] = 0;
        self.buf[3..7].copy_from_slice(&payload_length.to_le_bytes());
        self.buf.freeze()
    }
}

impl Default for PacketWriter {
    fn default() -> Self {
        Self::new()
    }
}
