use chrono::{DateTime, Duration, Utc};
use encore_shared::SeatId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Internal per-seat state. A hold carries the owning session and its lease
/// deadline; an expired hold counts as available everywhere.
#[derive(Debug, Clone, PartialEq, Eq)]
enum SeatState {
    Available,
    Held {
        session_id: Uuid,
        expires_at: DateTime<Utc>,
    },
    Booked,
    /// Taken out of sale by an admin ("reserved for sponsors").
    Blocked,
}

/// Externally visible seat status.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SeatStatus {
    Available,
    Held,
    Booked,
    Blocked,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TrackerError {
    #[error("Seat {0} is already held or booked by another session")]
    Conflict(SeatId),

    #[error("Seat {0} is not held by this session")]
    NotHeld(SeatId),

    #[error("Hold on seat {0} has expired")]
    HoldExpired(SeatId),

    #[error("Seat {0} cannot be blocked in its current state")]
    BlockRejected(SeatId),
}

/// The single owner of per-(event, seat) availability.
///
/// All seat state transitions go through this type; callers keep it behind
/// one lock so hold/commit/release are serialized. Leases expire lazily on
/// read, with `sweep_expired` available for periodic cleanup.
pub struct SeatTracker {
    events: HashMap<Uuid, HashMap<SeatId, SeatState>>,
}

impl SeatTracker {
    pub fn new() -> Self {
        Self {
            events: HashMap::new(),
        }
    }

    /// Rebuild booked/blocked seats from persisted bookings and block lists.
    /// Holds are deliberately not persisted; they die with the process.
    pub fn restore(&mut self, event_id: Uuid, booked: &[SeatId], blocked: &[SeatId]) {
        let seats = self.events.entry(event_id).or_default();
        for &seat in booked {
            seats.insert(seat, SeatState::Booked);
        }
        for &seat in blocked {
            seats.insert(seat, SeatState::Blocked);
        }
    }

    fn state(&mut self, event_id: Uuid, seat: SeatId, now: DateTime<Utc>) -> SeatState {
        let entry = self
            .events
            .entry(event_id)
            .or_default()
            .entry(seat)
            .or_insert(SeatState::Available);
        if let SeatState::Held { expires_at, .. } = entry {
            if *expires_at <= now {
                *entry = SeatState::Available;
            }
        }
        entry.clone()
    }

    /// Current status of one seat, expiring a stale lease on the way.
    pub fn status(&mut self, event_id: Uuid, seat: SeatId) -> SeatStatus {
        match self.state(event_id, seat, Utc::now()) {
            SeatState::Available => SeatStatus::Available,
            SeatState::Held { .. } => SeatStatus::Held,
            SeatState::Booked => SeatStatus::Booked,
            SeatState::Blocked => SeatStatus::Blocked,
        }
    }

    /// Acquire a lease on every requested seat, all-or-nothing.
    ///
    /// Fails with `Conflict` if any seat is held by a different live session,
    /// booked, or blocked. Re-holding seats the session already owns simply
    /// refreshes their lease. Never blocks waiting for another session.
    pub fn hold(
        &mut self,
        event_id: Uuid,
        seats: &[SeatId],
        session_id: Uuid,
        ttl: Duration,
    ) -> Result<(), TrackerError> {
        let now = Utc::now();

        // Check before mutating so a conflict leaves nothing half-held.
        for &seat in seats {
            match self.state(event_id, seat, now) {
                SeatState::Available => {}
                SeatState::Held { session_id: owner, .. } if owner == session_id => {}
                _ => return Err(TrackerError::Conflict(seat)),
            }
        }

        let expires_at = now + ttl;
        let event_seats = self.events.entry(event_id).or_default();
        for &seat in seats {
            event_seats.insert(
                seat,
                SeatState::Held {
                    session_id,
                    expires_at,
                },
            );
        }
        Ok(())
    }

    /// Release the session's holds on the given seats. Idempotent: seats not
    /// held by this session are left untouched.
    pub fn release(&mut self, event_id: Uuid, seats: &[SeatId], session_id: Uuid) {
        let Some(event_seats) = self.events.get_mut(&event_id) else {
            return;
        };
        for seat in seats {
            if let Some(SeatState::Held { session_id: owner, .. }) = event_seats.get(seat) {
                if *owner == session_id {
                    event_seats.insert(*seat, SeatState::Available);
                }
            }
        }
    }

    /// Convert the session's holds into booked seats, all-or-nothing.
    ///
    /// Fails if any hold has lapsed (`HoldExpired`) or was never taken by
    /// this session (`NotHeld`); no seat changes state on failure.
    pub fn commit(
        &mut self,
        event_id: Uuid,
        seats: &[SeatId],
        session_id: Uuid,
    ) -> Result<(), TrackerError> {
        let now = Utc::now();
        for &seat in seats {
            match self.events.get(&event_id).and_then(|s| s.get(&seat)) {
                Some(SeatState::Held { session_id: owner, expires_at }) => {
                    if *owner != session_id {
                        return Err(TrackerError::NotHeld(seat));
                    }
                    if *expires_at <= now {
                        return Err(TrackerError::HoldExpired(seat));
                    }
                }
                _ => return Err(TrackerError::NotHeld(seat)),
            }
        }

        let event_seats = self.events.entry(event_id).or_default();
        for &seat in seats {
            event_seats.insert(seat, SeatState::Booked);
        }
        Ok(())
    }

    /// Admin toggle: take a seat out of sale or put it back. Only an
    /// available seat can be blocked; unblocking an unblocked seat is a
    /// no-op.
    pub fn set_blocked(
        &mut self,
        event_id: Uuid,
        seat: SeatId,
        blocked: bool,
    ) -> Result<(), TrackerError> {
        let now = Utc::now();
        let state = self.state(event_id, seat, now);
        let event_seats = self.events.entry(event_id).or_default();
        match (state, blocked) {
            (SeatState::Available, true) => {
                event_seats.insert(seat, SeatState::Blocked);
                Ok(())
            }
            (SeatState::Blocked, false) => {
                event_seats.insert(seat, SeatState::Available);
                Ok(())
            }
            (SeatState::Blocked, true) | (SeatState::Available, false) => Ok(()),
            _ => Err(TrackerError::BlockRejected(seat)),
        }
    }

    /// Drop every lapsed hold, returning how many were cleared.
    pub fn sweep_expired(&mut self) -> usize {
        let now = Utc::now();
        let mut cleared = 0;
        for seats in self.events.values_mut() {
            for state in seats.values_mut() {
                if let SeatState::Held { expires_at, .. } = state {
                    if *expires_at <= now {
                        *state = SeatState::Available;
                        cleared += 1;
                    }
                }
            }
        }
        cleared
    }

    /// Seats currently blocked for an event (persisted alongside bookings).
    pub fn blocked_seats(&self, event_id: Uuid) -> Vec<SeatId> {
        let mut blocked: Vec<SeatId> = self
            .events
            .get(&event_id)
            .map(|seats| {
                seats
                    .iter()
                    .filter(|(_, s)| **s == SeatState::Blocked)
                    .map(|(seat, _)| *seat)
                    .collect()
            })
            .unwrap_or_default();
        blocked.sort();
        blocked
    }
}

impl Default for SeatTracker {
    fn default() -> Self {
        Self::new()
    }
}
