//! multipart/alternative message construction.

use crate::encoding::{encode_rfc2047, format_mailbox};
use crate::error::{Error, Result};
use crate::header::Headers;
use crate::html::{html_document, strip_html};
use crate::id::{generate_boundary, generate_message_id};
use chrono::{DateTime, Utc};
use std::fmt;

/// Value of the `X-Mailer` header.
pub const MAILER: &str = concat!("sendwire/", env!("CARGO_PKG_VERSION"));

/// A built message: headers plus a plain-text and an HTML alternative.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    message_id: String,
    boundary: String,
    headers: Headers,
    text: String,
    html: String,
}

impl Message {
    /// Starts building a message.
    #[must_use]
    pub fn builder() -> MessageBuilder {
        MessageBuilder::new()
    }

    /// Message-ID without angle brackets.
    #[must_use]
    pub fn message_id(&self) -> &str {
        &self.message_id
    }

    /// The multipart boundary.
    #[must_use]
    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    /// Top-level headers.
    #[must_use]
    pub const fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Content of the `text/plain` part.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Content of the `text/html` part.
    #[must_use]
    pub fn html(&self) -> &str {
        &self.html
    }

    /// Renders the message with CRLF line endings, ready for DATA.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        self.to_string().into_bytes()
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\r\n", self.headers)?;
        write_part(f, &self.boundary, "text/plain", &self.text)?;
        write_part(f, &self.boundary, "text/html", &self.html)?;
        write!(f, "--{}--\r\n", self.boundary)
    }
}

fn write_part(f: &mut fmt::Formatter<'_>, boundary: &str, mime: &str, content: &str) -> fmt::Result {
    write!(
        f,
        "--{boundary}\r\n\
         Content-Type: {mime}; charset=utf-8\r\n\
         Content-Transfer-Encoding: 8bit\r\n\
         \r\n\
         {}\r\n",
        crlf(content)
    )
}

/// Normalizes any mix of line endings to CRLF.
fn crlf(text: &str) -> String {
    text.replace("\r\n", "\n")
        .replace('\r', "\n")
        .replace('\n', "\r\n")
}

/// Builder for [`Message`].
#[derive(Debug, Clone, Default)]
pub struct MessageBuilder {
    from: Option<(String, String)>,
    to: Option<(String, String)>,
    subject: String,
    text: Option<String>,
    html: Option<String>,
    message_id: Option<String>,
    id_host: Option<String>,
    date: Option<DateTime<Utc>>,
}

impl MessageBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the sender display name and address.
    #[must_use]
    pub fn from(mut self, name: impl Into<String>, email: impl Into<String>) -> Self {
        self.from = Some((name.into(), email.into()));
        self
    }

    /// Sets the recipient display name and address.
    #[must_use]
    pub fn to(mut self, name: impl Into<String>, email: impl Into<String>) -> Self {
        self.to = Some((name.into(), email.into()));
        self
    }

    /// Sets the subject.
    #[must_use]
    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = subject.into();
        self
    }

    /// Derives both alternatives from one HTML-ish body.
    ///
    /// The plain part is the body with tags stripped; the HTML part is the
    /// body with newlines turned into `<br>`, wrapped in a document.
    #[must_use]
    pub fn body(mut self, body: &str) -> Self {
        self.text = Some(strip_html(body));
        self.html = Some(html_document(body));
        self
    }

    /// Overrides the plain-text alternative.
    #[must_use]
    pub fn text_body(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Overrides the HTML alternative.
    #[must_use]
    pub fn html_body(mut self, html: impl Into<String>) -> Self {
        self.html = Some(html.into());
        self
    }

    /// Uses `host` as the right-hand side of the generated Message-ID.
    ///
    /// Defaults to the sender's domain.
    #[must_use]
    pub fn message_id_host(mut self, host: impl Into<String>) -> Self {
        self.id_host = Some(host.into());
        self
    }

    /// Uses a fixed Message-ID instead of generating one.
    #[must_use]
    pub fn message_id(mut self, id: impl Into<String>) -> Self {
        self.message_id = Some(id.into());
        self
    }

    /// Sets the `Date` header. Defaults to now.
    #[must_use]
    pub const fn date(mut self, date: DateTime<Utc>) -> Self {
        self.date = Some(date);
        self
    }

    /// Builds the message.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingHeader`] if the sender or recipient is unset.
    pub fn build(self) -> Result<Message> {
        let (from_name, from_email) = self.from.ok_or(Error::MissingHeader("From"))?;
        let (to_name, to_email) = self.to.ok_or(Error::MissingHeader("To"))?;

        let message_id = self.message_id.unwrap_or_else(|| {
            let host = self.id_host.unwrap_or_else(|| {
                from_email
                    .rsplit_once('@')
                    .map(|(_, domain)| domain.to_string())
                    .unwrap_or_default()
            });
            generate_message_id(&host)
        });
        let message_id = message_id
            .trim_start_matches('<')
            .trim_end_matches('>')
            .to_string();
        let boundary = generate_boundary();
        let date = self.date.unwrap_or_else(Utc::now);

        let mut headers = Headers::new();
        headers.add("Message-ID", format!("<{message_id}>"));
        headers.add("Date", date.to_rfc2822());
        headers.add("From", format_mailbox(&from_name, &from_email));
        headers.add("To", format_mailbox(&to_name, &to_email));
        headers.add("Subject", encode_rfc2047(&self.subject));
        headers.add("MIME-Version", "1.0");
        headers.add(
            "Content-Type",
            format!("multipart/alternative; boundary=\"{boundary}\""),
        );
        headers.add("X-Mailer", MAILER);

        Ok(Message {
            message_id,
            boundary,
            headers,
            text: self.text.unwrap_or_default(),
            html: self.html.unwrap_or_default(),
        })
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::redundant_clone,
    clippy::manual_string_new,
    clippy::needless_collect,
    clippy::unreadable_literal,
    clippy::used_underscore_items,
    clippy::similar_names
)]
mod tests {
    use super::*;
    use crate::encoding::decode_rfc2047;
    use chrono::TimeZone;
    use proptest::prelude::*;

    fn sample(subject: &str, body: &str) -> Message {
        MessageBuilder::new()
            .from("A", "a@example.com")
            .to("B", "b@example.com")
            .subject(subject)
            .body(body)
            .message_id_host("smtp.example.com")
            .build()
            .unwrap()
    }

    /// Splits a rendered message into (header block, parts), checking delimiters.
    fn split(rendered: &str, boundary: &str) -> (String, Vec<String>) {
        let (head, rest) = rendered.split_once("\r\n\r\n").unwrap();
        let closing = format!("\r\n--{boundary}--\r\n");
        assert!(rest.ends_with(&closing));
        let rest = &rest[..rest.len() - closing.len()];

        let delimiter = format!("--{boundary}\r\n");
        let parts = rest
            .split(&format!("\r\n{delimiter}"))
            .map(|p| p.strip_prefix(&delimiter).unwrap_or(p).to_string())
            .collect();
        (head.to_string(), parts)
    }

    fn part_content(part: &str) -> &str {
        part.split_once("\r\n\r\n").unwrap().1
    }

    #[test]
    fn headers_in_order() {
        let message = sample("Hi", "Hello\nWorld");
        let names: Vec<_> = message.headers().iter().map(|(n, _)| n).collect();
        assert_eq!(
            names,
            vec![
                "Message-ID",
                "Date",
                "From",
                "To",
                "Subject",
                "MIME-Version",
                "Content-Type",
                "X-Mailer"
            ]
        );
        assert_eq!(message.headers().get("From"), Some("\"A\" <a@example.com>"));
        assert_eq!(message.headers().get("To"), Some("\"B\" <b@example.com>"));
        assert_eq!(message.headers().get("Subject"), Some("Hi"));
        assert_eq!(message.headers().get("MIME-Version"), Some("1.0"));
        assert!(message.message_id().ends_with("@smtp.example.com"));
        assert_eq!(
            message.headers().get("Message-ID").unwrap(),
            format!("<{}>", message.message_id())
        );
    }

    #[test]
    fn fixed_date_is_rfc2822() {
        let date = Utc.with_ymd_and_hms(2024, 3, 11, 9, 30, 0).unwrap();
        let message = MessageBuilder::new()
            .from("A", "a@example.com")
            .to("B", "b@example.com")
            .date(date)
            .build()
            .unwrap();
        assert_eq!(
            message.headers().get("Date"),
            Some("Mon, 11 Mar 2024 09:30:00 +0000")
        );
    }

    #[test]
    fn renders_two_parts_plain_then_html() {
        let message = sample("Hi", "Hello\nWorld");
        let rendered = message.to_string();
        let (head, parts) = split(&rendered, message.boundary());

        assert!(head.contains(&format!(
            "Content-Type: multipart/alternative; boundary=\"{}\"",
            message.boundary()
        )));
        assert_eq!(parts.len(), 2);
        assert!(parts[0].starts_with("Content-Type: text/plain; charset=utf-8\r\n"));
        assert!(parts[0].contains("Content-Transfer-Encoding: 8bit\r\n"));
        assert_eq!(part_content(&parts[0]), "Hello\r\nWorld");
        assert!(parts[1].starts_with("Content-Type: text/html; charset=utf-8\r\n"));
        assert!(part_content(&parts[1]).contains("Hello<br>\r\nWorld"));
    }

    #[test]
    fn every_line_ends_with_crlf() {
        let rendered = sample("Hi", "one\rtwo\nthree\r\nfour").to_string();
        assert!(!rendered.replace("\r\n", "").contains('\n'));
        assert!(!rendered.replace("\r\n", "").contains('\r'));
    }

    #[test]
    fn injected_subject_stays_one_header() {
        let message = sample("Hi\r\nBcc: everyone@example.com", "x");
        let rendered = message.to_string();
        let (head, _) = split(&rendered, message.boundary());
        let parsed = Headers::parse(&head).unwrap();
        assert!(parsed.get("Bcc").is_none());
        assert_eq!(parsed.get("Subject"), Some("Hi Bcc: everyone@example.com"));
    }

    #[test]
    fn non_ascii_subject_and_names_are_encoded() {
        let message = MessageBuilder::new()
            .from("Zoë", "z@example.com")
            .to("José", "j@example.com")
            .subject("Café ☕")
            .body("x")
            .build()
            .unwrap();

        let rendered = message.to_string();
        assert!(rendered.split("\r\n\r\n").next().unwrap().is_ascii());
        let subject = message.headers().get("Subject").unwrap();
        assert_eq!(decode_rfc2047(subject).unwrap(), "Café ☕");
        assert!(message.message_id().ends_with("@example.com"));
    }

    #[test]
    fn missing_sender_or_recipient() {
        let err = MessageBuilder::new().to("B", "b@example.com").build();
        assert_eq!(err.unwrap_err(), Error::MissingHeader("From"));

        let err = MessageBuilder::new().from("A", "a@example.com").build();
        assert_eq!(err.unwrap_err(), Error::MissingHeader("To"));
    }

    #[test]
    fn explicit_message_id_drops_brackets() {
        let message = MessageBuilder::new()
            .from("A", "a@example.com")
            .to("B", "b@example.com")
            .message_id("<fixed@host>")
            .build()
            .unwrap();
        assert_eq!(message.message_id(), "fixed@host");
        assert_eq!(message.headers().get("Message-ID"), Some("<fixed@host>"));
    }

    #[test]
    fn x_mailer_names_the_crate() {
        let message = sample("s", "b");
        assert_eq!(message.headers().get("X-Mailer"), Some(MAILER));
        assert!(MAILER.starts_with("sendwire/"));
    }

    proptest! {
        #[test]
        fn boundary_markers_always_match(subject in "\\PC{0,40}", body in "\\PC{0,300}") {
            let message = sample(&subject, &body);
            let rendered = message.to_string();
            let boundary = message.boundary();

            let declared = format!("boundary=\"{boundary}\"");
            prop_assert_eq!(rendered.matches(&declared).count(), 1);
            prop_assert_eq!(rendered.matches(&format!("\r\n--{boundary}\r\n")).count(), 2);
            prop_assert_eq!(rendered.matches(&format!("--{boundary}--\r\n")).count(), 1);
            let closing = format!("--{boundary}--\r\n");
            prop_assert!(rendered.ends_with(&closing));
        }

        #[test]
        fn plain_part_is_stripped_body(body in "[a-zA-Z0-9 .,<>/&;\n]{0,300}") {
            let message = sample("s", &body);
            let rendered = message.to_string();
            let (_, parts) = split(&rendered, message.boundary());

            prop_assert_eq!(parts.len(), 2);
            let text = part_content(&parts[0]).replace("\r\n", "\n");
            prop_assert_eq!(text, strip_html(&body));
        }
    }
}
