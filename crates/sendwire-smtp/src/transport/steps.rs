//! The SMTP dialogue as a table of steps.

use super::config::Security;
use crate::types::ReplyCode;

/// A stage of the submission dialogue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Wait for the server greeting.
    Greeting,
    /// `EHLO` on the initial connection.
    Ehlo,
    /// `STARTTLS`, then the TLS handshake.
    StartTls,
    /// `EHLO` again over the new TLS stream.
    EhloAfterTls,
    /// `AUTH LOGIN`.
    AuthLogin,
    /// base64 username.
    Username,
    /// base64 password.
    Password,
    /// `MAIL FROM:<..>`.
    MailFrom,
    /// `RCPT TO:<..>`.
    RcptTo,
    /// `DATA`.
    Data,
    /// The message body and terminator.
    Payload,
}

impl Stage {
    /// Short name used in logs.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Greeting => "greeting",
            Self::Ehlo => "ehlo",
            Self::StartTls => "starttls",
            Self::EhloAfterTls => "ehlo_after_tls",
            Self::AuthLogin => "auth_login",
            Self::Username => "username",
            Self::Password => "password",
            Self::MailFrom => "mail_from",
            Self::RcptTo => "rcpt_to",
            Self::Data => "data",
            Self::Payload => "payload",
        }
    }

    /// Returns true for the stages that only exist on the STARTTLS path.
    #[must_use]
    pub const fn is_starttls_only(self) -> bool {
        matches!(self, Self::StartTls | Self::EhloAfterTls)
    }
}

/// One row of the dialogue: what to do, which reply code must come back,
/// and the message reported when it does not.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    /// The stage.
    pub stage: Stage,
    /// The only reply code that lets the dialogue continue.
    pub expect: ReplyCode,
    /// Failure label, prefixed to the server reply in errors.
    pub failure: &'static str,
}

impl Step {
    const fn new(stage: Stage, expect: ReplyCode, failure: &'static str) -> Self {
        Self {
            stage,
            expect,
            failure,
        }
    }
}

/// Every step in order. QUIT follows the last one and its reply is ignored.
pub static STEPS: [Step; 11] = [
    Step::new(Stage::Greeting, ReplyCode::SERVICE_READY, "SMTP connection failed"),
    Step::new(Stage::Ehlo, ReplyCode::OK, "EHLO failed"),
    Step::new(Stage::StartTls, ReplyCode::SERVICE_READY, "STARTTLS failed"),
    Step::new(Stage::EhloAfterTls, ReplyCode::OK, "EHLO after TLS failed"),
    Step::new(Stage::AuthLogin, ReplyCode::AUTH_CONTINUE, "AUTH LOGIN failed"),
    Step::new(Stage::Username, ReplyCode::AUTH_CONTINUE, "Username authentication failed"),
    Step::new(Stage::Password, ReplyCode::AUTH_SUCCEEDED, "Password authentication failed"),
    Step::new(Stage::MailFrom, ReplyCode::OK, "MAIL FROM failed"),
    Step::new(Stage::RcptTo, ReplyCode::OK, "RCPT TO failed"),
    Step::new(Stage::Data, ReplyCode::START_DATA, "DATA command failed"),
    Step::new(Stage::Payload, ReplyCode::OK, "Message sending failed"),
];

/// The steps that apply to a security mode.
///
/// Whether the STARTTLS pair actually runs is decided later, once the EHLO
/// reply shows if the server offers it.
pub fn plan(security: Security) -> impl Iterator<Item = &'static Step> {
    STEPS
        .iter()
        .filter(move |step| security == Security::StartTls || !step.stage.is_starttls_only())
}
