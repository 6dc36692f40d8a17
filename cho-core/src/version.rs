//! Client version identification.

use std::fmt;

/// A client build version, rendered as `b{year}{month}{day}{stream}`
/// in the handshake body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientVersion {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    /// Release stream suffix (e.g. `"cuttingedge"`), if any.
    pub stream: Option<String>,
}

impl ClientVersion {
    pub fn new(year: u16, month: u8, day: u8) -> Self {
        Self {
            year,
            month,
            day,
            stream: None,
        }
    }

    pub fn with_stream(mut self, stream: impl Into<String>) -> Self {
        self.stream = Some(stream.into());
        self
    }
}

impl fmt::Display for ClientVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stream = self.stream.as_deref().unwrap_or("");
        write!(
            f,
            "b{}{:02}{:02}{}",
            self.year, self.month, self.day, stream
        )
    }
}
