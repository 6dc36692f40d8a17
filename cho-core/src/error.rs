//! Domain-specific error types for the cho protocol.
//!
//! All fallible operations return `Result<T, ChoError>`.
//! No panics on invalid input, every error is typed and recoverable.

use thiserror::Error;

/// The canonical error type for the cho client.
#[derive(Debug, Error)]
pub enum ChoError {
    // ── Configuration Errors ─────────────────────────────────────
    /// A required field was not set before an operation that needs it.
    #[error("missing required configuration: {0}")]
    MissingConfig(&'static str),

    /// An operation that requires an authenticated session was invoked
    /// before one existed.
    #[error("not connected")]
    NotConnected,

    // ── Transport Errors ─────────────────────────────────────────
    /// The server answered with a non-success HTTP status. The outbound
    /// queue is preserved so the caller may retry.
    #[error("server responded with status {status} (expected 200)")]
    Transport { status: u16 },

    /// The HTTP layer failed before a status was produced.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    // ── Session Errors ───────────────────────────────────────────
    /// The server withheld or revoked the session token. Retrying with
    /// the stale token will not help; a fresh login is required.
    #[error("session token rejected by server")]
    SessionRejected,

    // ── Decode Errors ────────────────────────────────────────────
    /// A read ran past the end of the packet buffer.
    #[error("unexpected end of buffer: needed {needed} bytes, {remaining} remaining")]
    UnexpectedEof { needed: usize, remaining: usize },

    /// The buffer violated the wire format in a way that is not a
    /// simple truncation.
    #[error("malformed packet data: {0}")]
    Malformed(&'static str),

    /// A string payload was not valid UTF-8.
    #[error("invalid utf-8 in string payload: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),

    /// A numeric value did not map to any known packet id.
    #[error("unknown packet id: {value:#06x}")]
    UnknownPacket { value: u16 },
}

impl ChoError {
    /// Whether this error means the current session is unusable and the
    /// caller must authenticate again, as opposed to a transient fault
    /// worth retrying with the same session.
    pub fn requires_reauth(&self) -> bool {
        matches!(self, ChoError::SessionRejected)
    }
}
