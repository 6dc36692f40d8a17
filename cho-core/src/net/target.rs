//! Endpoint URLs of the target server.

/// The public endpoints of a bancho-compatible server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetServer {
    /// The packet endpoint (the `c.` subdomain).
    pub bancho: String,
    /// The avatar endpoint (the `a.` subdomain).
    pub avatar: String,
    /// The web endpoint (the `osu.` subdomain).
    pub osu: String,
}

impl TargetServer {
    /// Derive the endpoints from a bare base domain by prepending the
    /// usual subdomains.
    ///
    /// `base_url` is the domain without protocol or trailing slash,
    /// e.g. `"ppy.sh"`.
    pub fn from_base_url(base_url: &str, https: bool) -> Self {
        let prefix = if https { "https://" } else { "http://" };
        Self {
            bancho: format!("{prefix}c.{base_url}/"),
            avatar: format!("{prefix}a.{base_url}/"),
            osu: format!("{prefix}osu.{base_url}/"),
        }
    }
}
