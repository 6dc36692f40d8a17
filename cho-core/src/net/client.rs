//! The connection/session manager.
//!
//! Owns the session credential, the outbound byte queue, the login
//! handshake, and the heartbeat task. The queue and credential are the
//! only shared mutable state; every flush-like operation holds the
//! connection lock across its whole read-post-dispatch cycle, so the
//! heartbeat task and caller-initiated sends never interleave their
//! byte-level effects, even across the suspension point inside the
//! network call.
//!
//! Lifecycle:
//!
//! ```text
//!  Disconnected ──connect()──► Connected ──logout()──► Disconnected
//!       │                          │
//!       └──── refused login ◄──────┘ (flush SessionRejected)
//! ```

use std::sync::Arc;
use std::time::Duration;

use bytes::{Bytes, BytesMut};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::session::{Session, TOKEN_REJECTED, TOKEN_RESPONSE_HEADER};
use super::target::TargetServer;
use super::transport::HttpTransport;
use crate::error::ChoError;
use crate::hashes;
use crate::hwid::HardwareId;
use crate::packets::dispatch::{DispatchTable, PacketHandler};
use crate::packets::{PacketId, builders};
use crate::state::ClientState;
use crate::version::ClientVersion;

/// Default pause between heartbeat flushes.
const DEFAULT_HEARTBEAT_INTERVAL: Duration = Duration::from_secs(5);

/// Display-city field of the login body. Outdated, always zero.
const DISPLAY_CITY: &str = "0";

// ── Link ─────────────────────────────────────────────────────────

/// State shared between caller-initiated operations and the heartbeat
/// task. Only ever touched under the client's mutex.
struct Link {
    session: Option<Session>,
    queue: BytesMut,
    state: ClientState,
    dispatch: DispatchTable,
}

impl Link {
    fn is_connected(&self) -> bool {
        self.session.is_some() && self.state.user_id > 0
    }
}

/// Flush the queued bytes through the session, dispatch the response,
/// and clear the queue. The queue is cleared only after the whole
/// exchange succeeds, so a failed flush naturally resends the same
/// bytes next time (at-least-once, not exactly-once).
async fn flush_link(link: &mut Link, transport: &dyn HttpTransport) -> Result<(), ChoError> {
    let Some(session) = link.session.as_mut() else {
        return Err(ChoError::NotConnected);
    };

    let body = Bytes::copy_from_slice(&link.queue);
    let response = session.send(transport, body).await?;

    let Link {
        state, dispatch, ..
    } = link;
    dispatch.dispatch(state, &response).await?;

    link.queue.clear();
    Ok(())
}

// ── ChoClient ────────────────────────────────────────────────────

/// A single logical connection to a bancho-compatible server.
///
/// Create with [`new`], configure with the `with_*` setters, then
/// [`connect`]. Clones are cheap and drive the same underlying
/// connection, which is how the heartbeat task shares it.
///
/// [`new`]: ChoClient::new
/// [`connect`]: ChoClient::connect
#[derive(Clone)]
pub struct ChoClient {
    server: Option<TargetServer>,
    version: Option<ClientVersion>,
    hwid: Option<HardwareId>,
    allow_dms: bool,
    heartbeat_interval: Duration,
    transport: Arc<dyn HttpTransport>,
    link: Arc<Mutex<Link>>,
}

impl ChoClient {
    /// A disconnected client over the given transport, with the default
    /// dispatch table installed.
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            server: None,
            version: None,
            hwid: None,
            allow_dms: true,
            heartbeat_interval: DEFAULT_HEARTBEAT_INTERVAL,
            transport,
            link: Arc::new(Mutex::new(Link {
                session: None,
                queue: BytesMut::new(),
                state: ClientState::default(),
                dispatch: DispatchTable::with_defaults(),
            })),
        }
    }

    pub fn with_server(mut self, server: TargetServer) -> Self {
        self.server = Some(server);
        self
    }

    pub fn with_version(mut self, version: ClientVersion) -> Self {
        self.version = Some(version);
        self
    }

    pub fn with_hardware(mut self, hwid: HardwareId) -> Self {
        self.hwid = Some(hwid);
        self
    }

    /// Whether the login announces that private messages from strangers
    /// are accepted.
    pub fn with_allow_dms(mut self, allow: bool) -> Self {
        self.allow_dms = allow;
        self
    }

    pub fn with_heartbeat_interval(mut self, interval: Duration) -> Self {
        self.heartbeat_interval = interval;
        self
    }

    /// Install (or replace) the handler for one packet id on this
    /// instance.
    pub async fn register_handler<H>(&self, id: PacketId, handler: H)
    where
        H: PacketHandler + 'static,
    {
        self.link.lock().await.dispatch.register(id, handler);
    }

    /// Whether an authenticated session exists and the server has
    /// assigned us a user id.
    pub async fn is_connected(&self) -> bool {
        self.link.lock().await.is_connected()
    }

    pub async fn user_id(&self) -> i32 {
        self.link.lock().await.state.user_id
    }

    pub async fn protocol_version(&self) -> i32 {
        self.link.lock().await.state.protocol_version
    }

    /// Number of remote users currently known to be online.
    pub async fn presence_count(&self) -> usize {
        self.link.lock().await.state.presences.len()
    }

    // ── Handshake ────────────────────────────────────────────────

    /// Perform the login handshake.
    ///
    /// Returns `Ok(false)` when the server refuses the login, which is
    /// an expected outcome rather than an error; configuration,
    /// transport, and decode problems surface as errors. On success a
    /// session is established and [`is_connected`] turns true.
    ///
    /// `password_is_hashed` marks `password` as already being the MD5
    /// hex digest the protocol wants.
    ///
    /// [`is_connected`]: ChoClient::is_connected
    pub async fn connect(
        &self,
        username: &str,
        password: &str,
        password_is_hashed: bool,
    ) -> Result<bool, ChoError> {
        let server = self.server.clone().ok_or(ChoError::MissingConfig("server"))?;
        let version = self
            .version
            .as_ref()
            .ok_or(ChoError::MissingConfig("version"))?;
        let hwid = self
            .hwid
            .as_ref()
            .ok_or(ChoError::MissingConfig("hardware id"))?;

        let password_md5 = if password_is_hashed {
            password.to_owned()
        } else {
            hashes::md5_hex(password)
        };

        let client_info = [
            version.to_string(),
            hwid.utc_offset.to_string(),
            DISPLAY_CITY.to_owned(),
            hwid.to_login_block(),
            (if self.allow_dms { "1" } else { "0" }).to_owned(),
        ]
        .join("|");
        let body = format!("{username}\n{password_md5}\n{client_info}");

        debug!(username, endpoint = %server.bancho, "starting login handshake");
        let response = self
            .transport
            .post(&server.bancho, Bytes::from(body), &[])
            .await?;

        let token = match response.header(TOKEN_RESPONSE_HEADER) {
            Some(token) if token != TOKEN_REJECTED => token.to_owned(),
            _ => {
                debug!("server withheld a session token, login refused");
                return Ok(false);
            }
        };

        let mut link = self.link.lock().await;
        {
            let Link {
                state, dispatch, ..
            } = &mut *link;
            dispatch.dispatch(state, &response.body).await?;
        }

        if link.state.user_id > 0 {
            link.state.username = Some(username.to_owned());
            link.session = Some(Session::new(token, server.bancho.clone()));
            debug!(user_id = link.state.user_id, "login complete");
        }
        Ok(link.is_connected())
    }

    /// Resume an existing session from a known token instead of
    /// performing the handshake.
    pub async fn connect_with_token(
        &self,
        token: &str,
        username: &str,
        user_id: i32,
    ) -> Result<(), ChoError> {
        let server = self.server.clone().ok_or(ChoError::MissingConfig("server"))?;

        let mut link = self.link.lock().await;
        link.state.user_id = user_id;
        link.state.username = Some(username.to_owned());
        link.session = Some(Session::new(token, server.bancho));
        Ok(())
    }

    // ── Steady state ─────────────────────────────────────────────

    /// Append a framed packet to the outbound queue. Nothing is sent
    /// until the next flush.
    pub async fn enqueue(&self, packet: &[u8]) {
        self.link.lock().await.queue.extend_from_slice(packet);
    }

    /// Send the entire queued buffer to the server in one request and
    /// dispatch the response.
    pub async fn flush(&self) -> Result<(), ChoError> {
        let mut link = self.link.lock().await;
        flush_link(&mut link, self.transport.as_ref()).await
    }

    /// Start the periodic heartbeat task.
    ///
    /// Each tick enqueues a zero-payload heartbeat and flushes the
    /// queue, then sleeps for the configured interval. The task exits
    /// cleanly once the connection is observed to be disconnected, and
    /// stops with a warning on the first flush error rather than
    /// spinning.
    pub async fn start_heartbeat(&self) -> Result<JoinHandle<()>, ChoError> {
        if !self.is_connected().await {
            return Err(ChoError::NotConnected);
        }

        let link = Arc::clone(&self.link);
        let transport = Arc::clone(&self.transport);
        let interval = self.heartbeat_interval;

        Ok(tokio::spawn(async move {
            loop {
                {
                    let mut link = link.lock().await;
                    if !link.is_connected() {
                        debug!("connection closed, heartbeat loop exiting");
                        break;
                    }
                    link.queue.extend_from_slice(&builders::heartbeat());
                    if let Err(error) = flush_link(&mut link, transport.as_ref()).await {
                        warn!(%error, "heartbeat flush failed, stopping loop");
                        break;
                    }
                }
                tokio::time::sleep(interval).await;
            }
        }))
    }

    /// Start the heartbeat and wait until it stops.
    pub async fn run(&self) -> Result<(), ChoError> {
        let heartbeat = self.start_heartbeat().await?;
        let _ = heartbeat.await;
        Ok(())
    }

    /// Log out: enqueue the logout notice, flush once, then drop the
    /// session locally regardless of whether that flush succeeded. The
    /// local state always ends up Disconnected; the flush error, if
    /// any, is still returned.
    pub async fn logout(&self) -> Result<(), ChoError> {
        let mut link = self.link.lock().await;
        if !link.is_connected() {
            return Err(ChoError::NotConnected);
        }

        link.queue.extend_from_slice(&builders::logout());
        let result = flush_link(&mut link, self.transport.as_ref()).await;

        link.state.user_id = 0;
        link.session = None;
        debug!("logged out");
        result
    }
}
