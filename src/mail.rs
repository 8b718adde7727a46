use std::collections::BTreeSet;

use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use log::debug;

use crate::error::{JeevesError, Result};

pub const DEFAULT_SMTP_PORT: u16 = 25;

/// Delivers one rendered HTML document to one recipient.
#[allow(async_fn_in_trait)]
pub trait MailTransport {
    /// Returns the recipients the server refused; an empty set means the
    /// message was accepted for every recipient.
    async fn send(&self, from: &str, to: &str, subject: &str, html: &str)
        -> Result<BTreeSet<String>>;
}

/// SMTP relay upgraded with STARTTLS.
///
/// A connection is opened for each `send` and closed before it returns,
/// whether or not the message was accepted.
pub struct SmtpMailer {
    host: String,
    port: u16,
}

impl SmtpMailer {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

fn build_message(from: &str, to: &str, subject: &str, html: &str) -> Result<Message> {
    let from: Mailbox = from
        .parse()
        .map_err(|e| JeevesError::Mail(format!("Invalid sender address {from}: {e}")))?;
    let to: Mailbox = to
        .parse()
        .map_err(|e| JeevesError::Mail(format!("Invalid recipient address {to}: {e}")))?;

    Message::builder()
        .from(from)
        .to(to)
        .subject(subject)
        .header(ContentType::TEXT_HTML)
        .body(html.to_string())
        .map_err(|e| JeevesError::Mail(format!("Failed to build message: {e}")))
}

impl MailTransport for SmtpMailer {
    async fn send(
        &self,
        from: &str,
        to: &str,
        subject: &str,
        html: &str,
    ) -> Result<BTreeSet<String>> {
        let message = build_message(from, to, subject, html)?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.host)
            .map_err(|e| JeevesError::Mail(format!("Invalid SMTP host {}: {e}", self.host)))?
            .port(self.port)
            .build();

        debug!("Sending reminder to {to} via {}:{}", self.host, self.port);

        match transport.send(message).await {
            Ok(response) if response.is_positive() => Ok(BTreeSet::new()),
            Ok(response) => {
                debug!("SMTP server answered {:?} for {to}", response.code());
                Ok(BTreeSet::from([to.to_string()]))
            }
            // Permanent (5xx) replies mean the server refused the recipient.
            Err(e) if e.is_permanent() => {
                debug!("SMTP server refused {to}: {e}");
                Ok(BTreeSet::from([to.to_string()]))
            }
            Err(e) => Err(JeevesError::Mail(format!("SMTP delivery failed: {e}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_message_headers() {
        let message = build_message(
            "Jeeves <jeeves@example.com>",
            "alice@example.com",
            "Jeeves Reminder for alice@example.com",
            "<p>hello</p>",
        )
        .unwrap();

        let raw = String::from_utf8(message.formatted()).unwrap();
        assert!(raw.contains("From: Jeeves <jeeves@example.com>"));
        assert!(raw.contains("To: alice@example.com"));
        assert!(raw.contains("Subject: Jeeves Reminder for alice@example.com"));
        assert!(raw.contains("Content-Type: text/html; charset=utf-8"));
    }

    #[test]
    fn test_build_message_rejects_bad_recipient() {
        let result = build_message("jeeves@example.com", "not an address", "s", "b");
        assert!(matches!(result, Err(JeevesError::Mail(_))));
    }
}
