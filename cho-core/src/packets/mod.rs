//! Binary packet codec for the bancho wire format.
//!
//! Any number of packets may be concatenated in one HTTP body with no
//! outer length prefix; the stream is self-describing purely via
//! headers:
//!
//! ```text
//! packet id:       u16  (2, little-endian)
//! pad:             u8   (1, always zero)
//! payload length:  u32  (4, little-endian)
//! payload:         [u8] (exactly `payload length` bytes)
//! ```
//!
//! A reader must never consume past `payload length`; under- or
//! over-consumption desynchronizes every subsequent packet in the
//! buffer.

pub mod builders;
pub mod dispatch;
pub mod id;
pub mod reader;
pub mod writer;

pub use dispatch::{DispatchTable, PacketHandler};
pub use id::PacketId;
pub use reader::PacketReader;
pub use writer::PacketWriter;

/// Size of the fixed packet header on the wire.
pub const HEADER_SIZE: usize = 7;
