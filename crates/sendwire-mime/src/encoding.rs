//! RFC 2047 header encoding and mailbox formatting.

use crate::error::{Error, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;

/// Largest number of raw bytes per encoded-word, keeping each word under
/// the 75 character limit of RFC 2047.
const MAX_WORD_BYTES: usize = 45;

/// Encodes a header value as RFC 2047 encoded-words when it needs it.
///
/// Plain ASCII is returned unchanged. Non-ASCII text, or text that would
/// itself look like an encoded-word, becomes one or more
/// `=?utf-8?B?...?=` words separated by spaces.
#[must_use]
pub fn encode_rfc2047(text: &str) -> String {
    if text.is_ascii() && !text.contains("=?") {
        return text.to_string();
    }

    let mut words = Vec::new();
    let mut chunk = String::new();
    for c in text.chars() {
        if chunk.len() + c.len_utf8() > MAX_WORD_BYTES {
            words.push(encoded_word(&chunk));
            chunk.clear();
        }
        chunk.push(c);
    }
    if !chunk.is_empty() {
        words.push(encoded_word(&chunk));
    }

    words.join(" ")
}

fn encoded_word(chunk: &str) -> String {
    format!("=?utf-8?B?{}?=", STANDARD.encode(chunk.as_bytes()))
}

/// Decodes a header value made of base64 encoded-words.
///
/// Values without encoded-words are returned unchanged. Whitespace between
/// adjacent encoded-words is dropped.
///
/// # Errors
///
/// Returns an error if an encoded-word is malformed or not valid UTF-8.
pub fn decode_rfc2047(text: &str) -> Result<String> {
    if !text.contains("=?") {
        return Ok(text.to_string());
    }

    let mut out = Vec::new();
    for word in text.split_whitespace() {
        let inner = word
            .strip_prefix("=?")
            .and_then(|w| w.strip_suffix("?="))
            .ok_or_else(|| Error::InvalidHeader(word.to_string()))?;

        let mut parts = inner.splitn(3, '?');
        let (Some(_charset), Some(encoding), Some(payload)) =
            (parts.next(), parts.next(), parts.next())
        else {
            return Err(Error::InvalidHeader(word.to_string()));
        };

        if !encoding.eq_ignore_ascii_case("B") {
            return Err(Error::InvalidHeader(format!("Unknown encoding: {encoding}")));
        }

        let bytes = STANDARD
            .decode(payload)
            .map_err(|e| Error::InvalidHeader(e.to_string()))?;
        out.extend_from_slice(&bytes);
    }

    String::from_utf8(out).map_err(|e| Error::InvalidHeader(e.to_string()))
}

/// Formats a mailbox for `From:` / `To:`.
///
/// ASCII display names become quoted strings, non-ASCII names become
/// encoded-words, and an empty name leaves just the bracketed address.
#[must_use]
pub fn format_mailbox(name: &str, email: &str) -> String {
    let name = name.trim();
    if name.is_empty() {
        return format!("<{email}>");
    }

    if name.is_ascii() && !name.contains("=?") {
        let escaped = name.replace('\\', "\\\\").replace('"', "\\\"");
        format!("\"{escaped}\" <{email}>")
    } else {
        format!("{} <{email}>", encode_rfc2047(name))
    }
}
