/**
 * Digest Mailers
 *
 * `Mailer` is the single send primitive the digest job needs. Two
 * implementations are provided:
 *
 * - `SmtpMailer` - lettre's async SMTP transport on the tokio executor
 * - `LogMailer` - writes each message to the log, used when no SMTP relay
 *   is configured
 */
use async_trait::async_trait;
use lettre::{
    address::AddressError,
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use std::fmt;
use thiserror::Error;

use crate::shared::SmtpConfig;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("Invalid address: {source}")]
    Address {
        address: String,
        #[source]
        source: AddressError,
    },

    #[error("Failed to build message: {0}")]
    Message(#[from] lettre::error::Error),

    #[error("SMTP error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),

    #[error("Send failed: {0}")]
    SendFailed(String),
}

fn parse_mailbox(address: &str) -> Result<Mailbox, MailError> {
    address.parse().map_err(|source| MailError::Address {
        address: address.to_string(),
        source,
    })
}

/// Sends one plain-text message
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_message(&self, to: &str, subject: &str, body: &str) -> Result<(), MailError>;
}

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    /// Build a mailer for the configured relay
    ///
    /// Credentials are only used when both username and password are set.
    pub fn new(config: &SmtpConfig, from: &str) -> Result<Self, MailError> {
        let from = parse_mailbox(from)?;
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)?.port(config.port);
        if let (Some(username), Some(password)) = (&config.username, &config.password) {
            builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
        }

        tracing::info!("[Digest] SMTP relay {}:{}", config.host, config.port);
        Ok(Self {
            transport: builder.build(),
            from,
        })
    }
}

impl fmt::Debug for SmtpMailer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmtpMailer")
            .field("from", &self.from.to_string())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send_message(&self, to: &str, subject: &str, body: &str) -> Result<(), MailError> {
        let message = Message::builder()
            .from(self.from.clone())
            .to(parse_mailbox(to)?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())?;

        self.transport.send(message).await?;
        Ok(())
    }
}

/// Development mailer that only logs
#[derive(Debug, Default, Clone, Copy)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send_message(&self, to: &str, subject: &str, body: &str) -> Result<(), MailError> {
        tracing::info!(
            "[Digest] Mail to {} | {} | {} bytes\n{}",
            to,
            subject,
            body.len(),
            body
        );
        Ok(())
    }
}
