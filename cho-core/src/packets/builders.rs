//! One-line builders for common outbound packets.
//!
//! Convenience wrappers over [`PacketWriter`] that fill in a known
//! payload shape. Anything not covered here can be assembled with the
//! writer directly and handed to the client's queue.
//!
//! [`PacketWriter`]: super::PacketWriter

use bytes::Bytes;

use super::{PacketId, PacketWriter};

/// Zero-payload keep-alive.
pub fn heartbeat() -> Bytes {
    PacketWriter::new().finish(PacketId::Heartbeat)
}

/// Zero-payload logout notice.
pub fn logout() -> Bytes {
    PacketWriter::new().finish(PacketId::Logout)
}

/// Ask the server to resend our stats.
pub fn request_status_update() -> Bytes {
    PacketWriter::new().finish(PacketId::RequestStatusUpdate)
}

/// Chat message to a public channel (e.g. `"#osu"`).
pub fn send_public_message(content: &str, target: &str) -> Bytes {
    PacketWriter::new()
        .write_str("")
        .write_str(content)
        .write_str(target)
        .finish(PacketId::SendPublicMessage)
}

/// Chat message to another user.
pub fn send_private_message(content: &str, target: &str) -> Bytes {
    PacketWriter::new()
        .write_str("")
        .write_str(content)
        .write_str(target)
        .finish(PacketId::SendPrivateMessage)
}

/// Begin spectating the given user.
pub fn start_spectating(user_id: i32) -> Bytes {
    PacketWriter::new()
        .write_i32(user_id)
        .finish(PacketId::StartSpectating)
}

/// Stop spectating.
pub fn stop_spectating() -> Bytes {
    PacketWriter::new().finish(PacketId::StopSpectating)
}
