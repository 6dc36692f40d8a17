//! Hardware identity presented during the handshake.

use rand::Rng;

use crate::hashes;

/// The hardware-identifier block sent in the login body, plus the UTC
/// offset the client claims.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HardwareId {
    /// Hours from UTC reported to the server.
    pub utc_offset: i32,
    pub path_md5: String,
    /// Network adapter ids, `.`-separated.
    pub adapters: String,
    pub adapters_md5: String,
    pub uninstall_md5: String,
    pub disk_md5: String,
}

impl HardwareId {
    /// Generate a plausible randomized identity.
    pub fn generate() -> Self {
        let adapter_count = rand::rng().random_range(1..=4);
        let adapters = (0..adapter_count)
            .map(|_| hashes::random_string(10))
            .collect::<Vec<_>>()
            .join(".");

        Self {
            utc_offset: rand::rng().random_range(-12..=12),
            path_md5: hashes::random_md5(),
            adapters_md5: hashes::md5_hex(&adapters),
            adapters,
            uninstall_md5: hashes::random_md5(),
            disk_md5: hashes::random_md5(),
        }
    }

    /// The `:`-delimited block as it appears in the login body.
    pub fn to_login_block(&self) -> String {
        [
            self.path_md5.as_str(),
            self.adapters.as_str(),
            self.adapters_md5.as_str(),
            self.uninstall_md5.as_str(),
            self.disk_md5.as_str(),
        ]
        .join(":")
    }
}
