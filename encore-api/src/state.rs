use encore_booking::BookingService;
use encore_catalog::CatalogManager;
use encore_notify::NotificationDispatcher;
use encore_shared::User;
use encore_store::FileStore;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

#[derive(Clone)]
pub struct AuthConfig {
    pub secret: String,
    pub expiration: u64,
}

/// Shared application state.
///
/// The booking service is the single owner of seat state and sits behind one
/// mutex, which is what serializes hold/commit/release. The catalog and the
/// user directory are read-mostly and live behind RwLocks.
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<RwLock<CatalogManager>>,
    pub booking: Arc<Mutex<BookingService>>,
    pub users: Arc<RwLock<Vec<User>>>,
    pub store: Arc<FileStore>,
    pub dispatcher: Arc<NotificationDispatcher>,
    pub auth: AuthConfig,
    pub public_url: String,
}
