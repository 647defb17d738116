use chrono::{DateTime, Utc};
use encore_shared::{CustomerInfo, SeatId};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// A confirmed booking is normally `Confirmed`. If the ticket email or PDF
/// fails after the seats were committed, the booking is parked as
/// `PendingNotification` so it can be retried instead of silently passing
/// for complete.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    Confirmed,
    PendingNotification,
}

/// An immutable audit record of a confirmed seat purchase.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    pub event_id: Uuid,
    pub seats: Vec<SeatId>,
    pub customer: CustomerInfo,
    pub booking_reference: String,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("Booking not found: {0}")]
    NotFound(String),
}

/// Append-only store of bookings. No update or delete; the only mutation
/// after creation is the notification-status transition.
pub struct BookingLedger {
    bookings: HashMap<Uuid, Booking>,
    by_reference: HashMap<String, Uuid>,
}

impl BookingLedger {
    pub fn new() -> Self {
        Self {
            bookings: HashMap::new(),
            by_reference: HashMap::new(),
        }
    }

    pub fn from_records(records: Vec<Booking>) -> Self {
        let mut ledger = Self::new();
        for booking in records {
            ledger.by_reference.insert(booking.booking_reference.clone(), booking.id);
            ledger.bookings.insert(booking.id, booking);
        }
        ledger
    }

    /// Append a booking, stamping its creation time and a fresh unique
    /// reference.
    pub fn create(
        &mut self,
        event_id: Uuid,
        seats: Vec<SeatId>,
        customer: CustomerInfo,
    ) -> Booking {
        let booking = Booking {
            id: Uuid::new_v4(),
            event_id,
            seats,
            customer,
            booking_reference: self.unique_reference(),
            status: BookingStatus::Confirmed,
            created_at: Utc::now(),
        };
        self.by_reference
            .insert(booking.booking_reference.clone(), booking.id);
        self.bookings.insert(booking.id, booking.clone());
        booking
    }

    fn unique_reference(&self) -> String {
        loop {
            let reference = generate_reference();
            if !self.by_reference.contains_key(&reference) {
                return reference;
            }
        }
    }

    pub fn get(&self, id: &Uuid) -> Option<&Booking> {
        self.bookings.get(id)
    }

    pub fn find_by_reference(&self, reference: &str) -> Option<&Booking> {
        self.by_reference
            .get(reference)
            .and_then(|id| self.bookings.get(id))
    }

    pub fn list_by_event(&self, event_id: Uuid) -> Vec<&Booking> {
        let mut list: Vec<&Booking> = self
            .bookings
            .values()
            .filter(|b| b.event_id == event_id)
            .collect();
        list.sort_by_key(|b| b.created_at);
        list
    }

    pub fn list_by_customer_email(&self, email: &str) -> Vec<&Booking> {
        let mut list: Vec<&Booking> = self
            .bookings
            .values()
            .filter(|b| b.customer.email.eq_ignore_ascii_case(email))
            .collect();
        list.sort_by_key(|b| b.created_at);
        list
    }

    pub fn mark_pending_notification(&mut self, id: &Uuid) -> Result<(), LedgerError> {
        self.set_status(id, BookingStatus::PendingNotification)
    }

    pub fn mark_confirmed(&mut self, id: &Uuid) -> Result<(), LedgerError> {
        self.set_status(id, BookingStatus::Confirmed)
    }

    fn set_status(&mut self, id: &Uuid, status: BookingStatus) -> Result<(), LedgerError> {
        let booking = self
            .bookings
            .get_mut(id)
            .ok_or_else(|| LedgerError::NotFound(id.to_string()))?;
        booking.status = status;
        Ok(())
    }

    /// Snapshot for persistence, ordered by creation time.
    pub fn export(&self) -> Vec<Booking> {
        let mut all: Vec<Booking> = self.bookings.values().cloned().collect();
        all.sort_by_key(|b| b.created_at);
        all
    }
}

impl Default for BookingLedger {
    fn default() -> Self {
        Self::new()
    }
}

/// Human-shareable reference: "AE-" + six time-derived digits + three random
/// digits, e.g. AE-123456-042.
fn generate_reference() -> String {
    let millis = Utc::now().timestamp_millis() % 1_000_000;
    let suffix: u32 = rand::thread_rng().gen_range(0..1000);
    format!("AE-{:06}-{:03}", millis, suffix)
}
