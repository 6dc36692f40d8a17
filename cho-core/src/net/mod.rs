//! Connection management: the transport contract, the rotating session
//! credential, server endpoints, and the client itself.

pub mod client;
pub mod session;
pub mod target;
pub mod transport;

pub use client::ChoClient;
pub use session::{Session, TOKEN_REJECTED, TOKEN_REQUEST_HEADER, TOKEN_RESPONSE_HEADER};
pub use target::TargetServer;
pub use transport::{HttpResponse, HttpTransport, ReqwestTransport, USER_AGENT};
