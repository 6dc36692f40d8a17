//! Packet identifiers for the subset of the protocol this client
//! speaks.
//!
//! Uses a proper enum with `TryFrom`, no panics on unknown values. Ids
//! the client does not recognize are skipped by the dispatcher, so this
//! enum only needs the packets we build or handle.

use crate::error::ChoError;

/// Well-known packet ids.
///
/// Packets up to the login reply are written by this client; the rest
/// arrive from the server.
#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PacketId {
    // ── Client → Server ──────────────────────────────────────────
    /// Public chat message.
    SendPublicMessage = 1,
    /// Graceful logout notice.
    Logout = 2,
    /// Ask the server to resend our stats.
    RequestStatusUpdate = 3,
    /// Zero-payload keep-alive.
    Heartbeat = 4,
    /// Begin spectating another user.
    StartSpectating = 16,
    /// Stop spectating.
    StopSpectating = 17,
    /// Private chat message.
    SendPrivateMessage = 25,

    // ── Server → Client ──────────────────────────────────────────
    /// Login result: the assigned user id, or a negative error code.
    LoginReply = 5,
    /// Incoming chat message.
    ChatMessage = 7,
    /// Heartbeat acknowledgement.
    Pong = 8,
    /// Another user logged out.
    UserLogout = 12,
    /// Server notification text.
    Notification = 24,
    /// Our privilege bits changed.
    Privileges = 71,
    /// The protocol version the server speaks.
    ProtocolVersion = 75,
    /// Another user's presence snapshot.
    UserPresence = 83,
    /// The server is restarting.
    Restart = 86,
}

impl TryFrom<u16> for PacketId {
    type Error = ChoError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Ok(match value {
            1 => Self::SendPublicMessage,
            2 => Self::Logout,
            3 => Self::RequestStatusUpdate,
            4 => Self::Heartbeat,
            5 => Self::LoginReply,
            7 => Self::ChatMessage,
            8 => Self::Pong,
            12 => Self::UserLogout,
            16 => Self::StartSpectating,
            17 => Self::StopSpectating,
            24 => Self::Notification,
            25 => Self::SendPrivateMessage,
            71 => Self::Privileges,
            75 => Self::ProtocolVersion,
            83 => Self::UserPresence,
            86 => Self::Restart,
            _ => return Err(ChoError::UnknownPacket { value }),
        })
    }
}
