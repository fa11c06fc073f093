//! EHLO keywords.

/// An extension advertised in the EHLO reply.
///
/// Only the keywords that change how a submission runs get their own variant.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Extension {
    /// `STARTTLS`
    StartTls,
    /// `AUTH` with the mechanisms the client recognizes.
    Auth(Vec<AuthMechanism>),
    /// `SIZE`, with the limit in bytes when one is given.
    Size(Option<usize>),
    /// `8BITMIME`; message parts are sent with `Content-Transfer-Encoding: 8bit`.
    EightBitMime,
    /// Any other keyword, kept verbatim for logging.
    Other(String),
}

impl Extension {
    /// Parses one line of the EHLO reply, minus the code.
    #[must_use]
    pub fn parse(line: &str) -> Self {
        let mut parts = line.split_whitespace();
        let Some(keyword) = parts.next() else {
            return Self::Other(line.to_string());
        };

        match keyword.to_ascii_uppercase().as_str() {
            "STARTTLS" => Self::StartTls,
            "AUTH" => Self::Auth(parts.filter_map(AuthMechanism::parse).collect()),
            "SIZE" => Self::Size(parts.next().and_then(|s| s.parse().ok())),
            "8BITMIME" => Self::EightBitMime,
            _ => Self::Other(line.to_string()),
        }
    }
}

/// SASL mechanism. The client only ever drives `LOGIN`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthMechanism {
    /// `PLAIN`
    Plain,
    /// `LOGIN`: username and password in two base64 challenge rounds.
    Login,
}

impl AuthMechanism {
    /// Parses a mechanism name; unrecognized names yield `None`.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        if s.eq_ignore_ascii_case("LOGIN") {
            Some(Self::Login)
        } else if s.eq_ignore_ascii_case("PLAIN") {
            Some(Self::Plain)
        } else {
            None
        }
    }

    /// The mechanism name as sent in `AUTH`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Plain => "PLAIN",
            Self::Login => "LOGIN",
        }
    }
}
