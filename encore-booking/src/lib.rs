pub mod ledger;
pub mod service;
pub mod session;
pub mod tracker;

pub use ledger::{Booking, BookingLedger, BookingStatus, LedgerError};
pub use service::{BookingError, BookingService, TicketDetails, TicketNotifier};
pub use session::{SelectionSession, SessionError, SessionState};
pub use tracker::{SeatStatus, SeatTracker, TrackerError};
