//! Mail transport seam.
//!
//! Notices are dispatched through the narrow [`Mailer`] trait so the
//! notification service can be exercised with an in-memory transport.
//! The production implementation drives an SMTP relay via lettre.

use std::sync::Mutex;

use async_trait::async_trait;
use lettre::message::{Mailbox, header::ContentType};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::config::SmtpSettings;
use crate::error::{EngineError, EngineResult};
use crate::fees::format_amount;

use super::notice::{RenewalNotice, format_date};

/// Dispatches one grouped client notice.
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Sends the notice to its resolved recipients.
    async fn send(&self, notice: &RenewalNotice) -> EngineResult<()>;
}

/// SMTP transport for client notices.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    /// Builds an SMTP mailer from the configured relay settings.
    pub fn new(settings: &SmtpSettings) -> EngineResult<Self> {
        let creds = Credentials::new(settings.user.clone(), settings.password.clone());
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.host)
            .map_err(|e| EngineError::MailDispatch {
                message: format!("failed to create SMTP relay: {}", e),
            })?
            .port(settings.port)
            .credentials(creds)
            .build();

        let from: Mailbox = format!("{} <{}>", settings.from_name, settings.from_email)
            .parse()
            .map_err(|e| EngineError::MailDispatch {
                message: format!("invalid sender address: {}", e),
            })?;

        Ok(Self { transport, from })
    }

    /// Renders the plain-text body of a notice.
    fn render_body(notice: &RenewalNotice) -> String {
        let mut body = String::new();
        for line in &notice.lines {
            body.push_str(&format!(
                "{}\n  cost {}  fee {}  VAT {}  total {}\n",
                line.description,
                format_amount(line.cost, notice.language),
                format_amount(line.fee, notice.language),
                format_amount(line.vat, notice.language),
                format_amount(line.total, notice.language),
            ));
        }
        body.push_str(&format!(
            "\nTotal excl. VAT: {}\nTotal: {}\n",
            format_amount(notice.total_ht, notice.language),
            format_amount(notice.total, notice.language),
        ));
        body.push_str(&format!(
            "Amounts valid until {}.\n",
            format_date(notice.validity_date, notice.language)
        ));
        if let Some(deadline) = notice.instruction_deadline {
            body.push_str(&format!(
                "Please instruct us by {}.\n",
                format_date(deadline, notice.language)
            ));
        }
        body
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, notice: &RenewalNotice) -> EngineResult<()> {
        let mut builder = Message::builder()
            .from(self.from.clone())
            .subject(&notice.subject)
            .header(ContentType::TEXT_PLAIN);

        for recipient in &notice.recipients {
            let mailbox: Mailbox =
                recipient
                    .parse()
                    .map_err(|e| EngineError::MailDispatch {
                        message: format!("invalid recipient '{}': {}", recipient, e),
                    })?;
            builder = builder.to(mailbox);
        }

        let message = builder
            .body(Self::render_body(notice))
            .map_err(|e| EngineError::MailDispatch {
                message: format!("failed to build message: {}", e),
            })?;

        self.transport
            .send(message)
            .await
            .map_err(|e| EngineError::MailDispatch {
                message: format!("failed to send notice: {}", e),
            })?;

        Ok(())
    }
}

/// In-memory transport recording every notice instead of sending it.
///
/// Used by tests and dry runs.
#[derive(Debug, Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<RenewalNotice>>,
}

impl RecordingMailer {
    /// Creates an empty recording transport.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns every notice recorded so far.
    pub fn sent(&self) -> Vec<RenewalNotice> {
        self.sent.lock().expect("mailer mutex poisoned").clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, notice: &RenewalNotice) -> EngineResult<()> {
        self.sent
            .lock()
            .expect("mailer mutex poisoned")
            .push(notice.clone());
        Ok(())
    }
}
