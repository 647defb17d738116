use crate::email::{EmailMessage, EmailTransport};
use chrono::{Duration, Utc};
use encore_booking::TicketDetails;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::task::JoinHandle;
use tracing::{error, info};
use uuid::Uuid;

/// Schedules one-shot "starts soon" reminder emails.
///
/// Timers are keyed by booking id so a later void operation can cancel them.
/// Each fired timer drops its own map entry, so the table only ever holds
/// armed reminders. A reminder whose fire time is already past is skipped
/// with a log line.
pub struct ReminderScheduler {
    transport: Arc<dyn EmailTransport>,
    lead: Duration,
    timers: Arc<Mutex<HashMap<Uuid, JoinHandle<()>>>>,
}

impl ReminderScheduler {
    pub fn new(transport: Arc<dyn EmailTransport>, lead: Duration) -> Self {
        Self {
            transport,
            lead,
            timers: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Schedule the reminder for `starts_at - lead`. Returns whether a timer
    /// was actually armed.
    pub fn schedule(&self, ticket: &TicketDetails) -> bool {
        let fire_at = ticket.starts_at - self.lead;
        let delay = fire_at - Utc::now();
        let Ok(delay) = delay.to_std() else {
            info!(
                reference = %ticket.booking_reference,
                "event starts within the reminder window, not scheduling"
            );
            return false;
        };

        let transport = Arc::clone(&self.transport);
        let timers = Arc::clone(&self.timers);
        let message = reminder_email(ticket);
        let reference = ticket.booking_reference.clone();
        let booking_id = ticket.booking_id;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Err(err) = transport.send(&message).await {
                error!(reference = %reference, error = %err, "reminder email failed");
            }
            timers.lock().expect("reminder timer lock").remove(&booking_id);
        });

        let mut timers = self.timers.lock().expect("reminder timer lock");
        if let Some(previous) = timers.insert(ticket.booking_id, handle) {
            previous.abort();
        }
        info!(
            reference = %ticket.booking_reference,
            fire_at = %fire_at,
            "reminder scheduled"
        );
        true
    }

    /// Cancel a pending reminder (e.g. when a booking is voided). No-op if
    /// none is armed.
    pub fn cancel(&self, booking_id: Uuid) {
        if let Some(handle) = self
            .timers
            .lock()
            .expect("reminder timer lock")
            .remove(&booking_id)
        {
            handle.abort();
        }
    }

    pub fn pending(&self) -> usize {
        self.timers.lock().expect("reminder timer lock").len()
    }
}

fn reminder_email(ticket: &TicketDetails) -> EmailMessage {
    let seats = ticket
        .seats
        .iter()
        .map(|s| s.to_string())
        .collect::<Vec<_>>()
        .join(", ");
    EmailMessage {
        to: ticket.customer_email.clone(),
        subject: format!("Reminder: {} starts in 2 hours", ticket.event_title),
        html_body: format!(
            "<h1>See you soon, {}!</h1>\
             <p><strong>{}</strong> starts at {} on {} at {}.</p>\
             <p>Your seats: {}</p>\
             <p>Booking reference: {}</p>",
            ticket.customer_name,
            ticket.event_title,
            ticket.event_time,
            ticket.event_date,
            ticket.venue_name,
            seats,
            ticket.booking_reference,
        ),
        attachment: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NotifyError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct RecordingTransport {
        sent: AtomicUsize,
    }

    #[async_trait]
    impl EmailTransport for RecordingTransport {
        async fn send(&self, _message: &EmailMessage) -> Result<(), NotifyError> {
            self.sent.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn ticket(starts_in: Duration) -> TicketDetails {
        TicketDetails {
            booking_id: Uuid::new_v4(),
            booking_reference: "AE-123456-042".into(),
            event_title: "Hamlet".into(),
            event_date: "2025-06-14".into(),
            event_time: "19:30".into(),
            venue_name: "Chamber Stage".into(),
            seats: vec![],
            customer_name: "Ana Ivanova".into(),
            customer_email: "ana@example.com".into(),
            starts_at: Utc::now() + starts_in,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_reminder_fires_before_event() {
        let transport = Arc::new(RecordingTransport {
            sent: AtomicUsize::new(0),
        });
        let scheduler = ReminderScheduler::new(transport.clone(), Duration::hours(2));

        assert!(scheduler.schedule(&ticket(Duration::hours(3))));
        assert_eq!(scheduler.pending(), 1);

        // One hour to the fire time, plus slack for the spawned task.
        tokio::time::sleep(std::time::Duration::from_secs(3601)).await;
        assert_eq!(transport.sent.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_imminent_event_skips_scheduling() {
        let transport = Arc::new(RecordingTransport {
            sent: AtomicUsize::new(0),
        });
        let scheduler = ReminderScheduler::new(transport.clone(), Duration::hours(2));

        // Starts in 30 minutes: the 2-hour-ahead moment is already past.
        assert!(!scheduler.schedule(&ticket(Duration::minutes(30))));
        assert_eq!(scheduler.pending(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_disarms_timer() {
        let transport = Arc::new(RecordingTransport {
            sent: AtomicUsize::new(0),
        });
        let scheduler = ReminderScheduler::new(transport.clone(), Duration::hours(2));

        let ticket = ticket(Duration::hours(3));
        scheduler.schedule(&ticket);
        scheduler.cancel(ticket.booking_id);

        tokio::time::sleep(std::time::Duration::from_secs(7200)).await;
        assert_eq!(transport.sent.load(Ordering::SeqCst), 0);
        assert_eq!(scheduler.pending(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fired_timer_drops_its_entry() {
        let transport = Arc::new(RecordingTransport {
            sent: AtomicUsize::new(0),
        });
        let scheduler = ReminderScheduler::new(transport.clone(), Duration::hours(2));

        for _ in 0..5 {
            assert!(scheduler.schedule(&ticket(Duration::hours(3))));
        }
        assert_eq!(scheduler.pending(), 5);

        tokio::time::sleep(std::time::Duration::from_secs(3601)).await;
        assert_eq!(transport.sent.load(Ordering::SeqCst), 5);
        // A long-running process schedules thousands of these; fired timers
        // must not linger in the table.
        assert_eq!(scheduler.pending(), 0);
    }
}
