use chrono::{DateTime, Duration, Utc};
use encore_shared::{Actor, CustomerInfo, SeatId};
use uuid::Uuid;

/// Seats a non-admin actor may put in a single booking.
pub const MAX_SEATS_PER_BOOKING: usize = 5;

/// Selection lifecycle: Empty -> Selecting -> AtCapacity -> Confirmed /
/// Abandoned. AtCapacity only applies to non-admin actors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Empty,
    Selecting,
    AtCapacity,
    Confirmed,
    Abandoned,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("Selection is capped at {0} seats")]
    CapacityExceeded(usize),

    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("No seats selected")]
    EmptySelection,

    #[error("Session is already {0:?}")]
    Closed(SessionState),
}

/// One user's in-progress seat selection for a single event.
///
/// Holds the ordered seat list and the state machine; the lease bookkeeping
/// itself lives in the seat tracker.
#[derive(Debug)]
pub struct SelectionSession {
    pub id: Uuid,
    pub event_id: Uuid,
    pub actor: Actor,
    seats: Vec<SeatId>,
    state: SessionState,
    ttl: Duration,
    expires_at: DateTime<Utc>,
}

impl SelectionSession {
    /// `ttl` is the idle deadline: a session untouched for that long is
    /// eligible for pruning, in step with its seat leases.
    pub fn new(event_id: Uuid, actor: Actor, ttl: Duration) -> Self {
        Self {
            id: Uuid::new_v4(),
            event_id,
            actor,
            seats: Vec::new(),
            state: SessionState::Empty,
            ttl,
            expires_at: Utc::now() + ttl,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn seats(&self) -> &[SeatId] {
        &self.seats
    }

    /// Whether the session has sat idle past its deadline. Its seat leases
    /// share the same ttl, so an expired session holds no live lease.
    pub fn expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    fn touch(&mut self) {
        self.expires_at = Utc::now() + self.ttl;
    }

    fn ensure_open(&self) -> Result<(), SessionError> {
        match self.state {
            SessionState::Confirmed | SessionState::Abandoned => {
                Err(SessionError::Closed(self.state))
            }
            _ => Ok(()),
        }
    }

    /// Add a seat to the selection. Selecting an already-selected seat is a
    /// no-op; a non-admin actor at the cap gets a capacity error and keeps
    /// the seats already picked.
    pub fn add_seat(&mut self, seat: SeatId) -> Result<(), SessionError> {
        self.ensure_open()?;
        if self.seats.contains(&seat) {
            return Ok(());
        }
        if !self.actor.is_admin() && self.seats.len() >= MAX_SEATS_PER_BOOKING {
            return Err(SessionError::CapacityExceeded(MAX_SEATS_PER_BOOKING));
        }
        self.seats.push(seat);
        self.state = if !self.actor.is_admin() && self.seats.len() == MAX_SEATS_PER_BOOKING {
            SessionState::AtCapacity
        } else {
            SessionState::Selecting
        };
        self.touch();
        Ok(())
    }

    /// Remove a seat; removing an unselected seat is a no-op.
    pub fn remove_seat(&mut self, seat: SeatId) -> Result<(), SessionError> {
        self.ensure_open()?;
        self.seats.retain(|s| *s != seat);
        self.state = if self.seats.is_empty() {
            SessionState::Empty
        } else {
            SessionState::Selecting
        };
        self.touch();
        Ok(())
    }

    /// Check the session can be confirmed with the given customer details.
    /// Does not change state; the booking service transitions the session
    /// only after the seat commit succeeds.
    pub fn validate_confirm(&self, customer: &CustomerInfo) -> Result<(), SessionError> {
        self.ensure_open()?;
        if self.seats.is_empty() {
            return Err(SessionError::EmptySelection);
        }
        if let Some(field) = customer.missing_field() {
            return Err(SessionError::MissingField(field));
        }
        Ok(())
    }

    pub fn mark_confirmed(&mut self) {
        self.state = SessionState::Confirmed;
    }

    pub fn mark_abandoned(&mut self) {
        self.state = SessionState::Abandoned;
    }
}
