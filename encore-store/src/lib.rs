pub mod app_config;
pub mod file_store;

pub use app_config::Config;
pub use file_store::{BlockedSeats, FileStore, StoreError};
