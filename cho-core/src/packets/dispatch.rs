//! Packet-to-handler dispatch.
//!
//! A response body is a concatenation of framed packets. The
//! dispatcher walks it FIFO, reading each 7-byte header and either
//! running the registered handler or skipping the payload. Handlers
//! run sequentially, so handler ordering is deterministic per flush.
//!
//! A handler receives the shared reader positioned at the start of its
//! packet's payload and MUST consume exactly the payload length before
//! returning. This is a documented contract, not an enforced one;
//! under- or over-reading desynchronizes every later packet in the
//! buffer.

use std::collections::HashMap;

use async_trait::async_trait;
use tracing::trace;

use super::{PacketId, PacketReader};
use crate::error::ChoError;
use crate::flags::Privileges;
use crate::state::{ClientState, Presence};

// ── PacketHandler ────────────────────────────────────────────────

/// An asynchronous handler for a single packet type.
#[async_trait]
pub trait PacketHandler: Send + Sync {
    /// Consume this packet's payload from `reader` and apply its
    /// effects to `state`.
    async fn handle(
        &self,
        state: &mut ClientState,
        reader: &mut PacketReader<'_>,
    ) -> Result<(), ChoError>;
}

/// Plain functions and closures work as handlers directly.
#[async_trait]
impl<F> PacketHandler for F
where
    F: Fn(&mut ClientState, &mut PacketReader<'_>) -> Result<(), ChoError> + Send + Sync,
{
    async fn handle(
        &self,
        state: &mut ClientState,
        reader: &mut PacketReader<'_>,
    ) -> Result<(), ChoError> {
        self(state, reader)
    }
}

// ── DispatchTable ────────────────────────────────────────────────

/// Maps packet ids to handlers. At most one handler per id;
/// registering over an existing id replaces the previous handler.
pub struct DispatchTable {
    handlers: HashMap<u16, Box<dyn PacketHandler>>,
}

impl DispatchTable {
    /// An empty table with no handlers installed.
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// A table with the built-in login and presence handlers.
    pub fn with_defaults() -> Self {
        let mut table = Self::new();
        table.register(PacketId::LoginReply, handle_login_reply);
        table.register(PacketId::ProtocolVersion, handle_protocol_version);
        table.register(PacketId::Privileges, handle_privileges);
        table.register(PacketId::UserPresence, handle_user_presence);
        table.register(PacketId::UserLogout, handle_user_logout);
        table
    }

    /// Install (or replace) the handler for a packet id.
    pub fn register<H>(&mut self, id: PacketId, handler: H)
    where
        H: PacketHandler + 'static,
    {
        self.handlers.insert(id as u16, Box::new(handler));
    }

    pub fn is_registered(&self, id: PacketId) -> bool {
        self.handlers.contains_key(&(id as u16))
    }

    /// Walk a response buffer, dispatching each packet in order.
    ///
    /// Packets with no registered handler (including ids this client
    /// does not know at all) are skipped by their declared payload
    /// length to stay synchronized. A decode error aborts processing
    /// of the remaining buffer.
    pub async fn dispatch(&self, state: &mut ClientState, buf: &[u8]) -> Result<(), ChoError> {
        let mut reader = PacketReader::new(buf);
        while !reader.is_empty() {
            let (id, length) = reader.read_header()?;
            match self.handlers.get(&id) {
                Some(handler) => handler.handle(state, &mut reader).await?,
                None => {
                    trace!(packet_id = id, length, "no handler registered, skipping");
                    reader.skip(length as usize)?;
                }
            }
        }
        Ok(())
    }
}

impl Default for DispatchTable {
    fn default() -> Self {
        Self::new()
    }
}

// ── Built-in handlers ────────────────────────────────────────────

/// The assigned user id, or a negative error code the server uses to
/// explain a refused login.
fn handle_login_reply(
    state: &mut ClientState,
    reader: &mut PacketReader<'_>,
) -> Result<(), ChoError> {
    state.user_id = reader.read_i32()?;
    Ok(())
}

fn handle_protocol_version(
    state: &mut ClientState,
    reader: &mut PacketReader<'_>,
) -> Result<(), ChoError> {
    state.protocol_version = reader.read_i32()?;
    Ok(())
}

fn handle_privileges(
    state: &mut ClientState,
    reader: &mut PacketReader<'_>,
) -> Result<(), ChoError> {
    state.privileges = Privileges::from_bits_truncate(reader.read_i32()? as u32);
    Ok(())
}

fn handle_user_presence(
    state: &mut ClientState,
    reader: &mut PacketReader<'_>,
) -> Result<(), ChoError> {
    let presence = Presence::from_reader(reader)?;
    state.presences.add(presence);
    Ok(())
}

fn handle_user_logout(
    state: &mut ClientState,
    reader: &mut PacketReader<'_>,
) -> Result<(), ChoError> {
    let user_id = reader.read_i32()?;
    state.presences.remove(user_id);
    Ok(())
}
