use crate::NotifyError;
use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::{Attachment, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::info;

/// A binary attachment (the ticket PDF).
#[derive(Debug, Clone)]
pub struct EmailAttachment {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// An outbound email. Retry/backoff is the transport's concern, not ours.
#[derive(Debug, Clone)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub html_body: String,
    pub attachment: Option<EmailAttachment>,
}

/// Seam to the mail system: one concrete SMTP implementation for production
/// and a logging one for development and tests.
#[async_trait]
pub trait EmailTransport: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> Result<(), NotifyError>;
}

/// Sends real mail over SMTP via lettre.
pub struct SmtpEmailTransport {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: String,
}

impl SmtpEmailTransport {
    pub fn new(
        host: &str,
        port: u16,
        username: String,
        password: String,
        from: String,
    ) -> Result<Self, NotifyError> {
        let mailer = AsyncSmtpTransport::<Tokio1Executor>::relay(host)
            .map_err(|e| NotifyError::Transport(e.to_string()))?
            .port(port)
            .credentials(Credentials::new(username, password))
            .build();
        Ok(Self { mailer, from })
    }
}

#[async_trait]
impl EmailTransport for SmtpEmailTransport {
    async fn send(&self, message: &EmailMessage) -> Result<(), NotifyError> {
        let builder = Message::builder()
            .from(
                self.from
                    .parse()
                    .map_err(|e| NotifyError::Transport(format!("bad from address: {}", e)))?,
            )
            .to(message
                .to
                .parse()
                .map_err(|e| NotifyError::Transport(format!("bad recipient: {}", e)))?)
            .subject(&message.subject);

        let html = SinglePart::builder()
            .header(ContentType::TEXT_HTML)
            .body(message.html_body.clone());

        let email = match &message.attachment {
            Some(attachment) => {
                let content_type = ContentType::parse(&attachment.content_type)
                    .map_err(|e| NotifyError::Transport(e.to_string()))?;
                let part = Attachment::new(attachment.filename.clone())
                    .body(attachment.bytes.clone(), content_type);
                builder
                    .multipart(MultiPart::mixed().singlepart(html).singlepart(part))
                    .map_err(|e| NotifyError::Transport(e.to_string()))?
            }
            None => builder
                .singlepart(html)
                .map_err(|e| NotifyError::Transport(e.to_string()))?,
        };

        self.mailer
            .send(email)
            .await
            .map(|_| ())
            .map_err(|e| NotifyError::Transport(e.to_string()))
    }
}

/// Development transport: logs what would have been sent instead of sending.
pub struct LogEmailTransport;

#[async_trait]
impl EmailTransport for LogEmailTransport {
    async fn send(&self, message: &EmailMessage) -> Result<(), NotifyError> {
        info!(
            to = %message.to,
            subject = %message.subject,
            attachment = message
                .attachment
                .as_ref()
                .map(|a| a.filename.as_str())
                .unwrap_or("none"),
            "development mode: email not sent"
        );
        Ok(())
    }
}
