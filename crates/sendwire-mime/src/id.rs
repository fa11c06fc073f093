//! Unique tokens for multipart boundaries and Message-IDs.

use chrono::Utc;
use rand::Rng;

/// Timestamp plus a random suffix: distinct across concurrent calls in one
/// process and across restarts.
fn unique_token() -> String {
    let millis = Utc::now().timestamp_millis();
    let random: u64 = rand::thread_rng().r#gen();
    format!("{millis:x}.{random:016x}")
}

/// Generates a multipart boundary.
///
/// Only characters from the RFC 2046 boundary alphabet are used, and the
/// `=_` prefix cannot occur in base64 or quoted-printable content.
#[must_use]
pub fn generate_boundary() -> String {
    format!("=_sendwire_{}", unique_token())
}

/// Generates a Message-ID (without angle brackets) for `host`.
#[must_use]
pub fn generate_message_id(host: &str) -> String {
    let host = host.trim();
    let host = if host.is_empty() { "localhost" } else { host };
    format!("{}@{host}", unique_token())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn boundaries_are_unique() {
        let all: HashSet<_> = (0..1000).map(|_| generate_boundary()).collect();
        assert_eq!(all.len(), 1000);
    }

    #[test]
    fn boundary_uses_safe_characters() {
        let boundary = generate_boundary();
        assert!(boundary.len() <= 70);
        assert!(
            boundary
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || "=_.".contains(c))
        );
    }

    #[test]
    fn message_id_carries_host() {
        let id = generate_message_id("smtp.example.com");
        let (local, host) = id.split_once('@').unwrap_or_default();
        assert_eq!(host, "smtp.example.com");
        assert!(local.contains('.'));
        assert_ne!(id, generate_message_id("smtp.example.com"));
    }

    #[test]
    fn message_id_falls_back_to_localhost() {
        assert!(generate_message_id(" ").ends_with("@localhost"));
    }
}
