use crate::email::{EmailAttachment, EmailMessage, EmailTransport};
use crate::pdf::TicketRenderer;
use crate::reminder::ReminderScheduler;
use crate::NotifyError;
use async_trait::async_trait;
use chrono::Duration;
use encore_booking::{TicketDetails, TicketNotifier};
use std::sync::Arc;
use tracing::info;

/// Wires the renderer, the mail transport and the reminder scheduler into
/// the booking service's notifier seam.
///
/// Ticket dispatch errors propagate to the caller (the booking ends up
/// pending-notification); reminder scheduling never fails a booking.
pub struct NotificationDispatcher {
    renderer: Arc<dyn TicketRenderer>,
    transport: Arc<dyn EmailTransport>,
    reminders: ReminderScheduler,
}

impl NotificationDispatcher {
    pub fn new(renderer: Arc<dyn TicketRenderer>, transport: Arc<dyn EmailTransport>) -> Self {
        let reminders = ReminderScheduler::new(Arc::clone(&transport), Duration::hours(2));
        Self {
            renderer,
            transport,
            reminders,
        }
    }

    pub fn reminders(&self) -> &ReminderScheduler {
        &self.reminders
    }

    /// Account-verification email with the tokenized link.
    pub async fn send_verification(
        &self,
        email: &str,
        verification_url: &str,
    ) -> Result<(), NotifyError> {
        let message = EmailMessage {
            to: email.to_string(),
            subject: "Verify your email address".into(),
            html_body: format!(
                "<h1>Welcome to Acting Europe</h1>\
                 <p>Please confirm your email address by clicking the link below:</p>\
                 <p><a href=\"{url}\">{url}</a></p>\
                 <p>If you did not create an account, you can ignore this email.</p>",
                url = verification_url,
            ),
            attachment: None,
        };
        self.transport.send(&message).await
    }
}

fn ticket_email(ticket: &TicketDetails, pdf: Vec<u8>) -> EmailMessage {
    let seats = ticket
        .seats
        .iter()
        .map(|s| s.to_string())
        .collect::<Vec<_>>()
        .join(", ");
    EmailMessage {
        to: ticket.customer_email.clone(),
        subject: format!("Your tickets for {}", ticket.event_title),
        html_body: format!(
            "<h1>Thank you for your booking, {}!</h1>\
             <p><strong>{}</strong><br/>{} at {}<br/>{}</p>\
             <p>Seats: {}</p>\
             <p>Booking reference: <strong>{}</strong></p>\
             <p>Your e-ticket is attached. Please present it at the venue entrance.</p>",
            ticket.customer_name,
            ticket.event_title,
            ticket.event_date,
            ticket.event_time,
            ticket.venue_name,
            seats,
            ticket.booking_reference,
        ),
        attachment: Some(EmailAttachment {
            filename: format!("ticket-{}.pdf", ticket.booking_reference),
            content_type: "application/pdf".into(),
            bytes: pdf,
        }),
    }
}

#[async_trait]
impl TicketNotifier for NotificationDispatcher {
    async fn booking_confirmed(
        &self,
        ticket: &TicketDetails,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let pdf = self.renderer.render(ticket)?;
        self.transport.send(&ticket_email(ticket, pdf)).await?;
        info!(
            reference = %ticket.booking_reference,
            to = %ticket.customer_email,
            "ticket email dispatched"
        );
        self.reminders.schedule(ticket);
        Ok(())
    }
}
