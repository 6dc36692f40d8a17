//! Integration tests — full login lifecycle, session rotation, and
//! failure scenarios over a scripted mock transport.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use tokio_test::{assert_err, assert_ok};

use cho_core::packets::builders;
use cho_core::{
    ChoClient, ChoError, ClientState, ClientVersion, HardwareId, HttpResponse, HttpTransport,
    PacketId, PacketReader, PacketWriter, TargetServer,
};

// ── Mock transport ───────────────────────────────────────────────

#[derive(Debug, Clone)]
struct RecordedRequest {
    url: String,
    body: Vec<u8>,
    headers: Vec<(String, String)>,
}

impl RecordedRequest {
    fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Replays scripted responses in order and records every request.
/// Running out of scripted responses is an error, which doubles as the
/// "transport died" scenario for loop tests.
struct MockTransport {
    requests: Mutex<Vec<RecordedRequest>>,
    responses: Mutex<VecDeque<HttpResponse>>,
}

impl MockTransport {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            requests: Mutex::new(Vec::new()),
            responses: Mutex::new(VecDeque::new()),
        })
    }

    fn push_response(&self, response: HttpResponse) {
        self.responses.lock().unwrap().push_back(response);
    }

    fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn post(
        &self,
        url: &str,
        body: Bytes,
        headers: &[(String, String)],
    ) -> Result<HttpResponse, ChoError> {
        self.requests.lock().unwrap().push(RecordedRequest {
            url: url.to_owned(),
            body: body.to_vec(),
            headers: headers.to_vec(),
        });
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or(ChoError::Malformed("no scripted response left"))
    }
}

// ── Helpers ──────────────────────────────────────────────────────

fn response(token: Option<&str>, body: Bytes) -> HttpResponse {
    let mut headers = HashMap::new();
    if let Some(token) = token {
        headers.insert("cho-token".to_owned(), token.to_owned());
    }
    HttpResponse {
        status: 200,
        headers,
        body,
    }
}

fn status_response(status: u16) -> HttpResponse {
    HttpResponse {
        status,
        headers: HashMap::new(),
        body: Bytes::new(),
    }
}

fn login_reply(user_id: i32) -> Bytes {
    PacketWriter::new()
        .write_i32(user_id)
        .finish(PacketId::LoginReply)
}

fn protocol_version(version: i32) -> Bytes {
    PacketWriter::new()
        .write_i32(version)
        .finish(PacketId::ProtocolVersion)
}

fn user_presence(user_id: i32, username: &str) -> Bytes {
    PacketWriter::new()
        .write_i32(user_id)
        .write_str(username)
        .write_u8(24 + 2)
        .write_u8(192)
        .write_u8(1)
        .write_f32(52.2)
        .write_f32(21.0)
        .write_i32(1337)
        .finish(PacketId::UserPresence)
}

fn concat(parts: &[Bytes]) -> Bytes {
    let mut out = Vec::new();
    for part in parts {
        out.extend_from_slice(part);
    }
    Bytes::from(out)
}

fn test_client(transport: Arc<MockTransport>) -> ChoClient {
    ChoClient::new(transport)
        .with_server(TargetServer::from_base_url("example.com", false))
        .with_version(ClientVersion::new(2022, 4, 24))
        .with_hardware(HardwareId::generate())
        .with_heartbeat_interval(Duration::from_millis(10))
}

/// Log in with a scripted happy-path response: token `token-1`,
/// user id 1001, protocol version 19.
async fn connect_ok(client: &ChoClient, transport: &MockTransport) {
    transport.push_response(response(
        Some("token-1"),
        concat(&[login_reply(1001), protocol_version(19)]),
    ));
    assert!(client.connect("someone", "password", false).await.unwrap());
}

// ── Handshake ────────────────────────────────────────────────────

#[tokio::test]
async fn login_establishes_session() {
    let transport = MockTransport::new();
    transport.push_response(response(
        Some("token-1"),
        concat(&[
            login_reply(1001),
            protocol_version(19),
            user_presence(42, "peppy"),
        ]),
    ));

    let client = test_client(Arc::clone(&transport));
    assert!(!client.is_connected().await);

    assert!(client.connect("someone", "password", false).await.unwrap());
    assert!(client.is_connected().await);
    assert_eq!(client.user_id().await, 1001);
    assert_eq!(client.protocol_version().await, 19);
    assert_eq!(client.presence_count().await, 1);

    let requests = transport.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].url, "http://c.example.com/");
    // the handshake carries no session header
    assert!(requests[0].headers.is_empty());
}

#[tokio::test]
async fn login_body_layout() {
    let transport = MockTransport::new();
    transport.push_response(response(Some("token-1"), login_reply(7)));

    let client = test_client(Arc::clone(&transport));
    client.connect("someone", "password", false).await.unwrap();

    let requests = transport.requests();
    let body = String::from_utf8(requests[0].body.clone()).unwrap();
    let lines: Vec<&str> = body.split('\n').collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], "someone");
    assert_eq!(lines[1], "5f4dcc3b5aa765d61d8327deb882cf99"); // md5("password")

    let fields: Vec<&str> = lines[2].split('|').collect();
    assert_eq!(fields.len(), 5);
    assert_eq!(fields[0], "b20220424");
    assert_eq!(fields[2], "0");
    assert_eq!(fields[3].split(':').count(), 5);
    assert_eq!(fields[4], "1");
}

#[tokio::test]
async fn prehashed_password_is_passed_through() {
    let transport = MockTransport::new();
    transport.push_response(response(Some("token-1"), login_reply(7)));

    let client = test_client(Arc::clone(&transport));
    let digest = "5f4dcc3b5aa765d61d8327deb882cf99";
    client.connect("someone", digest, true).await.unwrap();

    let body = String::from_utf8(transport.requests()[0].body.clone()).unwrap();
    assert_eq!(body.split('\n').nth(1), Some(digest));
}

#[tokio::test]
async fn login_refused_without_a_token() {
    let transport = MockTransport::new();
    transport.push_response(response(None, login_reply(1001)));

    let client = test_client(Arc::clone(&transport));
    let connected = client.connect("someone", "password", false).await.unwrap();
    assert!(!connected);
    assert!(!client.is_connected().await);
    // the refused response body is never dispatched
    assert_eq!(client.user_id().await, 0);
}

#[tokio::test]
async fn login_refused_with_the_sentinel_token() {
    let transport = MockTransport::new();
    transport.push_response(response(Some("no"), Bytes::new()));

    let client = test_client(Arc::clone(&transport));
    assert!(!client.connect("someone", "password", false).await.unwrap());
    assert!(!client.is_connected().await);
}

#[tokio::test]
async fn login_with_error_code_creates_no_session() {
    let transport = MockTransport::new();
    // valid token but the reply carries an error code instead of a
    // user id
    transport.push_response(response(Some("token-1"), login_reply(-1)));

    let client = test_client(Arc::clone(&transport));
    assert!(!client.connect("someone", "password", false).await.unwrap());
    assert!(!client.is_connected().await);
    assert_err!(client.flush().await);
}

#[tokio::test]
async fn login_without_configuration_fails_fast() {
    let transport = MockTransport::new();

    let client = ChoClient::new(transport.clone() as Arc<dyn HttpTransport>);
    let err = client.connect("someone", "password", false).await.unwrap_err();
    assert!(matches!(err, ChoError::MissingConfig("server")));

    let client = ChoClient::new(transport.clone() as Arc<dyn HttpTransport>)
        .with_server(TargetServer::from_base_url("example.com", false));
    let err = client.connect("someone", "password", false).await.unwrap_err();
    assert!(matches!(err, ChoError::MissingConfig("version")));

    // nothing ever reached the wire
    assert!(transport.requests().is_empty());
}

#[tokio::test]
async fn token_resume_skips_the_handshake() {
    let transport = MockTransport::new();
    let client = test_client(Arc::clone(&transport));

    client
        .connect_with_token("resumed-token", "someone", 55)
        .await
        .unwrap();
    assert!(client.is_connected().await);
    assert_eq!(client.user_id().await, 55);

    transport.push_response(response(Some("token-2"), Bytes::new()));
    assert_ok!(client.flush().await);
    assert_eq!(
        transport.requests()[0].header("osu-token"),
        Some("resumed-token")
    );
}

// ── Steady-state sends ───────────────────────────────────────────

#[tokio::test]
async fn flush_before_connect_fails_fast() {
    let transport = MockTransport::new();
    let client = test_client(Arc::clone(&transport));
    assert!(matches!(
        client.flush().await.unwrap_err(),
        ChoError::NotConnected
    ));
    assert!(transport.requests().is_empty());
}

#[tokio::test]
async fn flush_adopts_the_rotated_token() {
    let transport = MockTransport::new();
    let client = test_client(Arc::clone(&transport));
    connect_ok(&client, &transport).await;

    transport.push_response(response(Some("token-2"), Bytes::new()));
    client.enqueue(&builders::heartbeat()).await;
    assert_ok!(client.flush().await);

    transport.push_response(response(Some("token-3"), Bytes::new()));
    client.enqueue(&builders::heartbeat()).await;
    assert_ok!(client.flush().await);

    let requests = transport.requests();
    assert_eq!(requests.len(), 3);
    assert_eq!(requests[1].header("osu-token"), Some("token-1"));
    assert_eq!(requests[2].header("osu-token"), Some("token-2"));
}

#[tokio::test]
async fn flush_without_a_fresh_token_is_a_rejection() {
    let transport = MockTransport::new();
    let client = test_client(Arc::clone(&transport));
    connect_ok(&client, &transport).await;

    transport.push_response(response(None, Bytes::new()));
    let err = client.flush().await.unwrap_err();
    assert!(matches!(err, ChoError::SessionRejected));
    assert!(err.requires_reauth());
}

#[tokio::test]
async fn failed_flush_preserves_the_queue_for_resend() {
    let transport = MockTransport::new();
    let client = test_client(Arc::clone(&transport));
    connect_ok(&client, &transport).await;

    client.enqueue(&builders::start_spectating(77)).await;

    transport.push_response(status_response(500));
    let err = client.flush().await.unwrap_err();
    assert!(matches!(err, ChoError::Transport { status: 500 }));
    assert!(client.is_connected().await);

    // the retry sends exactly the same bytes
    transport.push_response(response(Some("token-2"), Bytes::new()));
    assert_ok!(client.flush().await);

    let requests = transport.requests();
    assert_eq!(requests[1].body, requests[2].body);
    assert_eq!(requests[2].body, builders::start_spectating(77).to_vec());
    // both attempts used the same un-rotated token
    assert_eq!(requests[1].header("osu-token"), Some("token-1"));
    assert_eq!(requests[2].header("osu-token"), Some("token-1"));
}

#[tokio::test]
async fn successful_flush_clears_the_queue() {
    let transport = MockTransport::new();
    let client = test_client(Arc::clone(&transport));
    connect_ok(&client, &transport).await;

    client.enqueue(&builders::request_status_update()).await;
    transport.push_response(response(Some("token-2"), Bytes::new()));
    assert_ok!(client.flush().await);

    transport.push_response(response(Some("token-3"), Bytes::new()));
    assert_ok!(client.flush().await);

    let requests = transport.requests();
    assert_eq!(requests[1].body, builders::request_status_update().to_vec());
    assert!(requests[2].body.is_empty());
}

#[tokio::test]
async fn flush_dispatches_the_response_body() {
    let transport = MockTransport::new();
    let client = test_client(Arc::clone(&transport));
    connect_ok(&client, &transport).await;

    transport.push_response(response(
        Some("token-2"),
        concat(&[user_presence(8, "dave"), user_presence(9, "erin")]),
    ));
    assert_ok!(client.flush().await);
    assert_eq!(client.presence_count().await, 2);
}

// ── Logout ───────────────────────────────────────────────────────

#[tokio::test]
async fn logout_sends_the_logout_packet() {
    let transport = MockTransport::new();
    let client = test_client(Arc::clone(&transport));
    connect_ok(&client, &transport).await;

    transport.push_response(response(Some("token-2"), Bytes::new()));
    assert_ok!(client.logout().await);
    assert!(!client.is_connected().await);

    let requests = transport.requests();
    assert_eq!(requests[1].body, builders::logout().to_vec());
}

#[tokio::test]
async fn logout_clears_state_even_when_the_flush_fails() {
    let transport = MockTransport::new();
    let client = test_client(Arc::clone(&transport));
    connect_ok(&client, &transport).await;

    transport.push_response(status_response(503));
    let err = client.logout().await.unwrap_err();
    assert!(matches!(err, ChoError::Transport { status: 503 }));
    assert!(!client.is_connected().await);
    assert_eq!(client.user_id().await, 0);

    // already disconnected: a second logout is a precondition error
    assert!(matches!(
        client.logout().await.unwrap_err(),
        ChoError::NotConnected
    ));
}

// ── Heartbeat ────────────────────────────────────────────────────

#[tokio::test]
async fn heartbeat_requires_a_connection() {
    let transport = MockTransport::new();
    let client = test_client(Arc::clone(&transport));
    assert!(matches!(
        client.start_heartbeat().await.unwrap_err(),
        ChoError::NotConnected
    ));
}

#[tokio::test]
async fn heartbeat_sends_frames_and_stops_on_error() {
    let transport = MockTransport::new();
    let client = test_client(Arc::clone(&transport));
    connect_ok(&client, &transport).await;

    // one scripted tick; the second tick finds no response and must
    // stop the loop instead of spinning
    transport.push_response(response(Some("token-2"), Bytes::new()));
    let handle = client.start_heartbeat().await.unwrap();

    tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("heartbeat loop did not stop")
        .unwrap();

    let requests = transport.requests();
    assert!(requests.len() >= 2);
    assert_eq!(requests[1].body, builders::heartbeat().to_vec());
    assert_eq!(requests[1].header("osu-token"), Some("token-1"));
}

#[tokio::test]
async fn heartbeat_exits_cleanly_after_logout() {
    let transport = MockTransport::new();
    let client = ChoClient::new(transport.clone() as Arc<dyn HttpTransport>)
        .with_server(TargetServer::from_base_url("example.com", false))
        .with_version(ClientVersion::new(2022, 4, 24))
        .with_hardware(HardwareId::generate())
        .with_heartbeat_interval(Duration::from_millis(100));
    connect_ok(&client, &transport).await;

    transport.push_response(response(Some("token-2"), Bytes::new()));
    let handle = client.start_heartbeat().await.unwrap();

    // let the first tick land, then drop the session while the loop
    // sleeps; either ordering leaves the loop observing a dead link
    tokio::time::sleep(Duration::from_millis(30)).await;
    transport.push_response(response(Some("token-3"), Bytes::new()));
    let _ = client.logout().await;

    tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("heartbeat loop did not exit after logout")
        .unwrap();
    assert!(!client.is_connected().await);
}

// ── Handler overrides ────────────────────────────────────────────

/// Consumes notification payloads and counts them.
struct CountingNotificationHandler(Arc<AtomicUsize>);

#[async_trait]
impl cho_core::PacketHandler for CountingNotificationHandler {
    async fn handle(
        &self,
        _state: &mut ClientState,
        reader: &mut PacketReader<'_>,
    ) -> Result<(), ChoError> {
        reader.read_str()?;
        self.0.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[tokio::test]
async fn registered_handler_receives_dispatched_packets() {
    let transport = MockTransport::new();
    let client = test_client(Arc::clone(&transport));

    let seen = Arc::new(AtomicUsize::new(0));
    client
        .register_handler(
            PacketId::Notification,
            CountingNotificationHandler(Arc::clone(&seen)),
        )
        .await;

    transport.push_response(response(
        Some("token-1"),
        concat(&[
            login_reply(1001),
            PacketWriter::new()
                .write_str("welcome back")
                .finish(PacketId::Notification),
        ]),
    ));
    assert!(client.connect("someone", "password", false).await.unwrap());
    assert_eq!(seen.load(Ordering::SeqCst), 1);
}
