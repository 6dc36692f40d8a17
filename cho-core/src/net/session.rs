//! The rotating session credential.

use bytes::Bytes;
use tracing::debug;

use super::transport::HttpTransport;
use crate::error::ChoError;

/// Request header carrying our current token.
pub const TOKEN_REQUEST_HEADER: &str = "osu-token";

/// Response header carrying the next token, or the reject sentinel.
pub const TOKEN_RESPONSE_HEADER: &str = "cho-token";

/// The well-known token value meaning "authentication not granted or
/// revoked".
pub const TOKEN_REJECTED: &str = "no";

/// An authenticated session: the capability token plus the endpoint it
/// is valid for.
///
/// The server may rotate the token on every single response. [`send`]
/// always adopts the latest value; a stale token is rejected on the
/// next request.
///
/// [`send`]: Session::send
#[derive(Debug, Clone)]
pub struct Session {
    token: String,
    url: String,
}

impl Session {
    pub fn new(token: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            url: url.into(),
        }
    }

    /// The token that will be attached to the next request.
    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// POST a packet buffer to the session endpoint, rotate the token,
    /// and return the response body.
    ///
    /// A non-200 status leaves the token untouched so the caller may
    /// retry the same exchange. A missing or sentinel response token is
    /// treated as revocation of the session, never as a transient
    /// fault.
    pub async fn send(
        &mut self,
        transport: &dyn HttpTransport,
        body: Bytes,
    ) -> Result<Bytes, ChoError> {
        if self.token.is_empty() || self.token == TOKEN_REJECTED {
            return Err(ChoError::SessionRejected);
        }

        let headers = [(TOKEN_REQUEST_HEADER.to_owned(), self.token.clone())];
        let response = transport.post(&self.url, body, &headers).await?;
        if response.status != 200 {
            return Err(ChoError::Transport {
                status: response.status,
            });
        }

        match response.header(TOKEN_RESPONSE_HEADER) {
            Some(token) if token != TOKEN_REJECTED => {
                if token != self.token {
                    debug!("session token rotated");
                    self.token = token.to_owned();
                }
            }
            _ => return Err(ChoError::SessionRejected),
        }

        Ok(response.body)
    }
}
