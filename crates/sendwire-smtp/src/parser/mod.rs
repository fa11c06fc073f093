//! SMTP response parser.

use crate::error::{Error, Result};
use crate::types::{Reply, ReplyCode};

/// One physical line of an SMTP reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyLine {
    /// Three-digit reply code.
    pub code: ReplyCode,
    /// Text after the separator (may be empty).
    pub text: String,
    /// True for `250-...` lines, which announce that more lines follow.
    pub is_continuation: bool,
}

/// Parses a single reply line such as `250-SIZE 1000` or `220 ready`.
///
/// # Errors
///
/// Returns an error if the line does not start with a three-digit code
/// followed by `-`, a space, or the end of the line.
pub fn parse_reply_line(line: &str) -> Result<ReplyLine> {
    let bytes = line.as_bytes();
    if bytes.len() < 3 || !bytes[..3].iter().all(u8::is_ascii_digit) {
        return Err(Error::Protocol(format!("Invalid reply line: {line}")));
    }

    let code = line[..3]
        .parse::<u16>()
        .map_err(|_| Error::Protocol(format!("Invalid reply code: {}", &line[..3])))?;

    let (is_continuation, text) = match bytes.get(3) {
        None => (false, ""),
        Some(b' ') => (false, &line[4..]),
        Some(b'-') => (true, &line[4..]),
        Some(_) => return Err(Error::Protocol(format!("Malformed reply line: {line}"))),
    };

    Ok(ReplyLine {
        code: ReplyCode::new(code),
        text: text.to_string(),
        is_continuation,
    })
}

/// Parses an SMTP reply from response lines.
///
/// SMTP replies can be single-line or multi-line:
/// - Single: `250 OK\r\n`
/// - Multi: `250-First line\r\n250-Second line\r\n250 Last line\r\n`
///
/// # Errors
///
/// Returns an error if the reply is malformed or its lines disagree on the code.
pub fn parse_reply(lines: &[String]) -> Result<Reply> {
    let Some((first, _)) = lines.split_first() else {
        return Err(Error::Protocol("Empty reply".into()));
    };

    let code = parse_reply_line(first)?.code;
    let mut message = Vec::with_capacity(lines.len());

    for line in lines {
        let parsed = parse_reply_line(line)?;
        if parsed.code != code {
            return Err(Error::Protocol(format!(
                "Reply code changed mid-reply: {code} then {}",
                parsed.code
            )));
        }
        message.push(parsed.text);
    }

    Ok(Reply::new(code, message))
}
