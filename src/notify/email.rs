use anyhow::{Context, Result};
use lettre::message::{header, Mailbox, Message};
use lettre::transport::smtp::{authentication::Credentials, AsyncSmtpTransport};
use lettre::{AsyncTransport, Tokio1Executor};

use crate::config::SmtpSettings;

/// Delivers the rendered digest over an authenticated SMTP relay.
pub struct EmailSender {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Mailbox,
}

impl EmailSender {
    pub fn new(settings: &SmtpSettings) -> Result<Self> {
        let creds = Credentials::new(settings.user.clone(), settings.pass.clone());
        let mailer = AsyncSmtpTransport::<Tokio1Executor>::relay(&settings.host)
            .context("invalid SMTP host")?
            .credentials(creds)
            .build();

        let from = settings.from.parse().context("invalid DIGEST_EMAIL_FROM")?;
        let to = settings.to.parse().context("invalid DIGEST_EMAIL_TO")?;

        Ok(Self { mailer, from, to })
    }

    pub fn from_env() -> Result<Self> {
        Self::new(&SmtpSettings::from_env()?)
    }

    pub async fn send(&self, subject: &str, body: &str) -> Result<()> {
        let msg = build_message(&self.from, &self.to, subject, body)?;
        self.mailer.send(msg).await.context("send email")?;
        Ok(())
    }
}

fn build_message(from: &Mailbox, to: &Mailbox, subject: &str, body: &str) -> Result<Message> {
    Message::builder()
        .from(from.clone())
        .to(to.clone())
        .subject(subject)
        .header(header::ContentType::TEXT_PLAIN)
        .body(body.to_string())
        .context("build email")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_assembles_for_plain_subject_and_body() {
        let from: Mailbox = "Digest Bot <bot@example.com>".parse().unwrap();
        let to: Mailbox = "reader@example.com".parse().unwrap();
        let msg = build_message(&from, &to, "Gen-AI weekly digest", "hello\nworld");
        assert!(msg.is_ok());
    }

    #[test]
    fn sender_rejects_malformed_addresses() {
        let settings = SmtpSettings {
            host: "smtp.example.com".to_string(),
            user: "u".to_string(),
            pass: "p".to_string(),
            from: "not an address".to_string(),
            to: "reader@example.com".to_string(),
        };
        assert!(EmailSender::new(&settings).is_err());
    }
}
