use anyhow::Context;
use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Message, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Tokio1Executor};
use std::path::Path;

use crate::config::MailConfig;
use crate::utils;
use crate::Result;

/// Fixed subject line of the delivery mail
pub const MAIL_SUBJECT: &str = "Your Mashup File 🎵";

/// Trait for sending the finished archive to a recipient.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Deliverer: Send + Sync {
    /// Send `archive_path` as an attachment to `recipient`. No retries:
    /// authentication, connection, and recipient rejections all surface as
    /// delivery failures.
    async fn deliver(&self, recipient: &str, archive_path: &Path) -> Result<()>;
}

/// SMTP deliverer over an authenticated implicit-TLS connection.
pub struct SmtpDeliverer {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    sender_address: String,
}

impl SmtpDeliverer {
    /// Build a deliverer from explicit mail configuration. Fails if the
    /// sender credentials are missing from the environment.
    pub fn new(mail: &MailConfig) -> Result<Self> {
        if mail.sender_address.is_empty() || mail.sender_password.is_empty() {
            anyhow::bail!(
                "Mail credentials not configured. Set {} and {}.",
                crate::config::SENDER_EMAIL_VAR,
                crate::config::EMAIL_PASSWORD_VAR
            );
        }

        let credentials = Credentials::new(
            mail.sender_address.clone(),
            mail.sender_password.clone(),
        );

        // relay() speaks SMTPS (TLS from the first byte), matching the
        // implicit-TLS submission port.
        let mailer = AsyncSmtpTransport::<Tokio1Executor>::relay(&mail.smtp_host)
            .context("Failed to configure SMTP relay")?
            .port(mail.smtp_port)
            .credentials(credentials)
            .build();

        Ok(Self {
            mailer,
            sender_address: mail.sender_address.clone(),
        })
    }

    /// Construct the outbound message: fixed subject, short text body, and
    /// the archive as a binary attachment named by its file name.
    fn build_message(&self, recipient: &str, archive_path: &Path) -> Result<Message> {
        let attachment_name = archive_path
            .file_name()
            .and_then(|n| n.to_str())
            .context("Archive has no usable file name")?
            .to_string();

        let archive_bytes = fs_err::read(archive_path)?;

        let message = Message::builder()
            .from(
                self.sender_address
                    .parse()
                    .context("Invalid sender address")?,
            )
            .to(recipient.parse().context("Invalid recipient address")?)
            .subject(MAIL_SUBJECT)
            .multipart(
                MultiPart::mixed()
                    .singlepart(SinglePart::plain(
                        "Your mashup is attached. Enjoy!".to_string(),
                    ))
                    .singlepart(
                        Attachment::new(attachment_name).body(
                            archive_bytes,
                            ContentType::parse("application/zip")
                                .expect("static MIME type parses"),
                        ),
                    ),
            )
            .context("Failed to build mail message")?;

        Ok(message)
    }
}

#[async_trait]
impl Deliverer for SmtpDeliverer {
    async fn deliver(&self, recipient: &str, archive_path: &Path) -> Result<()> {
        utils::check_file_accessible(archive_path)?;

        let size = fs_err::metadata(archive_path)?.len();
        tracing::info!(
            "Sending {} ({}) to {}",
            archive_path.display(),
            utils::format_file_size(size),
            recipient
        );

        let message = self.build_message(recipient, archive_path)?;

        self.mailer
            .send(message)
            .await
            .context("SMTP send failed")?;

        tracing::info!("Delivery accepted by {}", recipient);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_mail_config() -> MailConfig {
        MailConfig {
            smtp_host: "smtp.gmail.com".to_string(),
            smtp_port: 465,
            sender_address: "sender@example.com".to_string(),
            sender_password: "app-password".to_string(),
        }
    }

    #[test]
    fn test_missing_credentials_rejected() {
        let mut mail = test_mail_config();
        mail.sender_password.clear();
        assert!(SmtpDeliverer::new(&mail).is_err());

        let mut mail = test_mail_config();
        mail.sender_address.clear();
        assert!(SmtpDeliverer::new(&mail).is_err());
    }

    #[tokio::test]
    async fn test_message_carries_subject_and_attachment() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("mashup.zip");
        fs_err::write(&archive, b"PK\x03\x04zipbytes").unwrap();

        let deliverer = SmtpDeliverer::new(&test_mail_config()).unwrap();
        let message = deliverer
            .build_message("user@example.com", &archive)
            .unwrap();

        let formatted = String::from_utf8_lossy(&message.formatted()).to_string();
        assert!(formatted.contains("user@example.com"));
        assert!(formatted.contains("application/zip"));
        assert!(formatted.contains("mashup.zip"));
    }

    #[tokio::test]
    async fn test_invalid_recipient_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("mashup.zip");
        fs_err::write(&archive, b"zip").unwrap();

        let deliverer = SmtpDeliverer::new(&test_mail_config()).unwrap();
        assert!(deliverer.build_message("not-an-address", &archive).is_err());
    }
}
