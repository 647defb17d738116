pub mod dispatcher;
pub mod email;
pub mod pdf;
pub mod reminder;

pub use dispatcher::NotificationDispatcher;
pub use email::{EmailAttachment, EmailMessage, EmailTransport, LogEmailTransport, SmtpEmailTransport};
pub use pdf::{PdfTicketRenderer, TicketRenderer};
pub use reminder::ReminderScheduler;

/// Notification-side failures. Ticket dispatch errors propagate back to the
/// booking service; reminder errors are logged only.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("Failed to render ticket PDF: {0}")]
    Render(String),

    #[error("Failed to send email: {0}")]
    Transport(String),
}
