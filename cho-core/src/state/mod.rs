//! Client-side view of server-assigned state.

pub mod presence;

pub use presence::{Presence, PresenceRegistry};

use crate::flags::Privileges;

/// State assigned by the server over the life of a connection.
///
/// Mutated only by dispatch handlers running under the connection
/// lock. `user_id == 0` means not yet assigned or logged out.
#[derive(Debug, Default)]
pub struct ClientState {
    /// Our server-assigned user id.
    pub user_id: i32,
    /// The protocol version the server reports.
    pub protocol_version: i32,
    /// Our privilege bits.
    pub privileges: Privileges,
    /// The username we logged in with.
    pub username: Option<String>,
    /// Every remote user the server has told us about.
    pub presences: PresenceRegistry,
}
