pub mod actor;
pub mod customer;
pub mod pii;
pub mod seat;
pub mod user;

pub use actor::{Actor, Role};
pub use customer::CustomerInfo;
pub use pii::Masked;
pub use seat::SeatId;
pub use user::User;
