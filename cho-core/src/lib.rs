//! # cho-core
//!
//! Client-side implementation of the osu!bancho wire protocol,
//! transported over repeated HTTP POSTs rather than a persistent
//! socket.
//!
//! This crate contains:
//! - **Packets**: `PacketWriter` / `PacketReader` for the binary wire
//!   format, `PacketId`, and one-line packet builders
//! - **Dispatch**: `DispatchTable` mapping packet ids to async handlers
//! - **State**: `ClientState` and the `PresenceRegistry` of remote users
//! - **Net**: `ChoClient` (handshake, send queue, heartbeat), the
//!   rotating `Session` credential, and the injected `HttpTransport`
//! - **Error**: `ChoError`, a typed `thiserror`-based error hierarchy

pub mod error;
pub mod flags;
pub mod hashes;
pub mod hwid;
pub mod net;
pub mod packets;
pub mod state;
pub mod version;

// ── Re-exports for ergonomic usage ───────────────────────────────

pub use error::ChoError;
pub use flags::Privileges;
pub use hwid::HardwareId;
pub use net::{ChoClient, HttpResponse, HttpTransport, ReqwestTransport, Session, TargetServer};
pub use packets::{
    DispatchTable, HEADER_SIZE, PacketHandler, PacketId, PacketReader, PacketWriter,
};
pub use state::{ClientState, Presence, PresenceRegistry};
pub use version::ClientVersion;
