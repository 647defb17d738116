use crate::ledger::{Booking, BookingLedger};
use crate::session::{SelectionSession, SessionError};
use crate::tracker::{SeatStatus, SeatTracker, TrackerError};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use encore_catalog::{Event, Venue};
use encore_shared::{Actor, CustomerInfo, SeatId};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// Everything the notification side needs to render and send a ticket.
#[derive(Debug, Clone)]
pub struct TicketDetails {
    pub booking_id: Uuid,
    pub booking_reference: String,
    pub event_title: String,
    pub event_date: String,
    pub event_time: String,
    pub venue_name: String,
    pub seats: Vec<SeatId>,
    pub customer_name: String,
    pub customer_email: String,
    pub starts_at: DateTime<Utc>,
}

/// Seam to the notification dispatcher. The booking service only knows that
/// confirmation has a side effect which can fail; rendering, transport and
/// reminder scheduling live behind this trait.
#[async_trait]
pub trait TicketNotifier: Send + Sync {
    async fn booking_confirmed(
        &self,
        ticket: &TicketDetails,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

/// Booking-attempt error taxonomy. Every variant is scoped to one attempt;
/// none is fatal to the process.
#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Selection is capped at {0} seats")]
    Capacity(usize),

    #[error("Seat {0} is no longer available")]
    Conflict(SeatId),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Ticket notification failed: {0}")]
    Notification(String),

    #[error("Operation requires an admin actor")]
    Forbidden,
}

impl From<SessionError> for BookingError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::CapacityExceeded(max) => BookingError::Capacity(max),
            other => BookingError::Validation(other.to_string()),
        }
    }
}

impl From<TrackerError> for BookingError {
    fn from(err: TrackerError) -> Self {
        match err {
            TrackerError::Conflict(seat)
            | TrackerError::BlockRejected(seat)
            | TrackerError::NotHeld(seat)
            | TrackerError::HoldExpired(seat) => BookingError::Conflict(seat),
        }
    }
}

/// Orchestrates one booking attempt end to end: selection sessions, seat
/// leases, the ledger append, and the notification side effect.
///
/// Owns all shared mutable seat state; callers keep the whole service behind
/// a single lock so hold/commit/release are serialized (spec'd arbitration).
pub struct BookingService {
    tracker: SeatTracker,
    ledger: BookingLedger,
    sessions: HashMap<Uuid, SelectionSession>,
    notifier: Arc<dyn TicketNotifier>,
    hold_ttl: Duration,
}

impl BookingService {
    pub fn new(notifier: Arc<dyn TicketNotifier>, hold_ttl: Duration) -> Self {
        Self {
            tracker: SeatTracker::new(),
            ledger: BookingLedger::new(),
            sessions: HashMap::new(),
            notifier,
            hold_ttl,
        }
    }

    /// Rebuild tracker and ledger state from persisted bookings and block
    /// lists. Holds are not restored; they die with the process.
    pub fn restore(&mut self, bookings: Vec<Booking>, blocked: &[(Uuid, Vec<SeatId>)]) {
        for booking in &bookings {
            self.tracker.restore(booking.event_id, &booking.seats, &[]);
        }
        for (event_id, seats) in blocked {
            self.tracker.restore(*event_id, &[], seats);
        }
        self.ledger = BookingLedger::from_records(bookings);
    }

    // --- Selection sessions ---

    pub fn start_session(&mut self, event_id: Uuid, actor: Actor) -> Uuid {
        let session = SelectionSession::new(event_id, actor, self.hold_ttl);
        let id = session.id;
        self.sessions.insert(id, session);
        id
    }

    pub fn session(&self, id: &Uuid) -> Option<&SelectionSession> {
        self.sessions.get(id)
    }

    fn session_mut(&mut self, id: &Uuid) -> Result<&mut SelectionSession, BookingError> {
        self.sessions
            .get_mut(id)
            .ok_or_else(|| BookingError::NotFound(format!("session {}", id)))
    }

    /// Select a seat: capacity-check the session, then take a lease. On a
    /// lease conflict the seat is dropped from the selection again, so the
    /// session and tracker never disagree.
    pub fn select_seat(
        &mut self,
        session_id: Uuid,
        seat: SeatId,
        venue: &Venue,
    ) -> Result<(), BookingError> {
        if !venue.contains(seat) {
            return Err(BookingError::NotFound(format!(
                "seat {} in venue {}",
                seat, venue.name
            )));
        }
        let ttl = self.hold_ttl;
        let session = self.session_mut(&session_id)?;
        let event_id = session.event_id;
        session.add_seat(seat)?;
        if let Err(err) = self.tracker.hold(event_id, &[seat], session_id, ttl) {
            // roll the selection back so we don't show a seat we never leased
            let _ = self.session_mut(&session_id)?.remove_seat(seat);
            return Err(err.into());
        }
        Ok(())
    }

    /// Drop a seat from the selection and release its lease. Idempotent.
    pub fn deselect_seat(&mut self, session_id: Uuid, seat: SeatId) -> Result<(), BookingError> {
        let session = self.session_mut(&session_id)?;
        let event_id = session.event_id;
        session.remove_seat(seat)?;
        self.tracker.release(event_id, &[seat], session_id);
        Ok(())
    }

    /// User closed the flow without confirming: release everything.
    pub fn abandon_session(&mut self, session_id: Uuid) -> Result<(), BookingError> {
        let session = self.session_mut(&session_id)?;
        let event_id = session.event_id;
        let seats: Vec<SeatId> = session.seats().to_vec();
        session.mark_abandoned();
        self.tracker.release(event_id, &seats, session_id);
        self.sessions.remove(&session_id);
        Ok(())
    }

    /// Confirm the selection: commit the leases, append to the ledger, then
    /// dispatch the ticket. A dispatch failure parks the booking as
    /// pending-notification and is reported to the caller; the seats stay
    /// booked either way.
    pub async fn confirm(
        &mut self,
        session_id: Uuid,
        customer: CustomerInfo,
        event: &Event,
        venue: &Venue,
    ) -> Result<Booking, BookingError> {
        let session = self.session_mut(&session_id)?;
        session.validate_confirm(&customer)?;
        let event_id = session.event_id;
        let seats: Vec<SeatId> = session.seats().to_vec();

        self.tracker.commit(event_id, &seats, session_id)?;
        if let Some(session) = self.sessions.get_mut(&session_id) {
            session.mark_confirmed();
        }
        self.sessions.remove(&session_id);

        let booking = self.ledger.create(event_id, seats, customer);
        info!(
            reference = %booking.booking_reference,
            seats = booking.seats.len(),
            "booking committed"
        );

        let ticket = TicketDetails {
            booking_id: booking.id,
            booking_reference: booking.booking_reference.clone(),
            event_title: event.title.clone(),
            event_date: event.date.to_string(),
            event_time: event.time.format("%H:%M").to_string(),
            venue_name: venue.name.clone(),
            seats: booking.seats.clone(),
            customer_name: booking.customer.full_name(),
            customer_email: booking.customer.email.clone(),
            starts_at: event.starts_at(),
        };

        match self.notifier.booking_confirmed(&ticket).await {
            Ok(()) => Ok(booking),
            Err(err) => {
                warn!(
                    reference = %booking.booking_reference,
                    error = %err,
                    "ticket dispatch failed, parking booking as pending"
                );
                // unwrap is safe: the booking was just inserted
                self.ledger
                    .mark_pending_notification(&booking.id)
                    .expect("booking just created");
                Err(BookingError::Notification(err.to_string()))
            }
        }
    }

    // --- Seat map and admin path ---

    /// Per-seat status for every seat in the venue plan, in row order.
    pub fn seat_map(&mut self, event_id: Uuid, venue: &Venue) -> Vec<(SeatId, SeatStatus)> {
        venue
            .seats()
            .collect::<Vec<_>>()
            .into_iter()
            .map(|seat| (seat, self.tracker.status(event_id, seat)))
            .collect()
    }

    /// Privileged toggle, independent of any selection session. The actor
    /// capability comes from the auth layer; the core only checks it.
    pub fn set_seat_blocked(
        &mut self,
        actor: &Actor,
        event_id: Uuid,
        seat: SeatId,
        blocked: bool,
        venue: &Venue,
    ) -> Result<SeatStatus, BookingError> {
        if !actor.is_admin() {
            return Err(BookingError::Forbidden);
        }
        if !venue.contains(seat) {
            return Err(BookingError::NotFound(format!(
                "seat {} in venue {}",
                seat, venue.name
            )));
        }
        self.tracker.set_blocked(event_id, seat, blocked)?;
        Ok(self.tracker.status(event_id, seat))
    }

    /// Clear lapsed leases and drop the idle sessions that held them; the
    /// API runs this on a timer. Release is owner-checked, so a seat that
    /// was re-leased by another session in the meantime is left alone.
    pub fn sweep_expired_holds(&mut self) -> usize {
        let swept = self.tracker.sweep_expired();
        let now = Utc::now();
        let idle: Vec<Uuid> = self
            .sessions
            .iter()
            .filter(|(_, s)| s.expired(now))
            .map(|(id, _)| *id)
            .collect();
        for id in idle {
            if let Some(session) = self.sessions.remove(&id) {
                self.tracker.release(session.event_id, session.seats(), id);
            }
        }
        swept
    }

    // --- Ledger reads / persistence ---

    pub fn find_by_reference(&self, reference: &str) -> Option<&Booking> {
        self.ledger.find_by_reference(reference)
    }

    pub fn list_by_event(&self, event_id: Uuid) -> Vec<&Booking> {
        self.ledger.list_by_event(event_id)
    }

    pub fn list_by_customer_email(&self, email: &str) -> Vec<&Booking> {
        self.ledger.list_by_customer_email(email)
    }

    pub fn export_bookings(&self) -> Vec<Booking> {
        self.ledger.export()
    }

    pub fn blocked_seats(&self, event_id: Uuid) -> Vec<SeatId> {
        self.tracker.blocked_seats(event_id)
    }
}
