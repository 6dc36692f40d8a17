//! MD5 and random-identifier helpers for the login handshake.

use rand::Rng;
use rand::distr::Alphanumeric;

/// Hex-encoded MD5 digest of a string.
pub fn md5_hex(data: &str) -> String {
    format!("{:x}", md5::compute(data.as_bytes()))
}

/// Random alphanumeric string of the given length.
pub fn random_string(length: usize) -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}

/// A syntactically valid, randomly generated MD5 hex digest.
pub fn random_md5() -> String {
    md5_hex(&random_string(16))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn md5_reference_vectors() {
        assert_eq!(md5_hex(""), "d41d8cd98f00b204e9800998ecf8427e");
        assert_eq!(md5_hex("password"), "5f4dcc3b5aa765d61d8327deb882cf99");
    }

    #[test]
    fn random_string_shape() {
        let s = random_string(10);
        assert_eq!(s.len(), 10);
        assert!(s.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn random_md5_is_hex() {
        let digest = random_md5();
        assert_eq!(digest.len(), 32);
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
