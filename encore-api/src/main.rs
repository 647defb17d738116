use std::net::SocketAddr;
use std::sync::Arc;

use chrono::Duration;
use encore_api::{app, AppState, AuthConfig};
use encore_booking::BookingService;
use encore_catalog::{CatalogManager, Venue};
use encore_notify::{
    EmailTransport, LogEmailTransport, NotificationDispatcher, PdfTicketRenderer,
    SmtpEmailTransport,
};
use encore_store::{Config, FileStore};
use tokio::sync::{Mutex, RwLock};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "encore_api=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().expect("Failed to load config");
    tracing::info!("Starting Encore API on port {}", config.server.port);

    let store = Arc::new(FileStore::new(&config.store.data_dir));
    store.ensure_dir().await.expect("Failed to create data dir");

    let mut venues = store.load_venues().await.expect("Failed to load venues");
    if venues.is_empty() {
        venues = seed_venues();
        store
            .save_venues(&venues)
            .await
            .expect("Failed to seed venues");
        tracing::info!(count = venues.len(), "seeded default venues");
    }
    let events = store.load_events().await.expect("Failed to load events");
    let news = store.load_news().await.expect("Failed to load news");
    let bookings = store.load_bookings().await.expect("Failed to load bookings");
    let blocked = store
        .load_blocked_seats()
        .await
        .expect("Failed to load blocked seats");
    let users = store.load_users().await.expect("Failed to load users");

    let catalog = CatalogManager::from_records(venues, events, news);

    let transport: Arc<dyn EmailTransport> = if config.smtp.enabled {
        Arc::new(
            SmtpEmailTransport::new(
                &config.smtp.host,
                config.smtp.port,
                config.smtp.username.clone(),
                config.smtp.password.clone(),
                config.smtp.from.clone(),
            )
            .expect("Failed to build SMTP transport"),
        )
    } else {
        tracing::warn!("SMTP disabled, emails will be logged instead of sent");
        Arc::new(LogEmailTransport)
    };
    let dispatcher = Arc::new(NotificationDispatcher::new(
        Arc::new(PdfTicketRenderer),
        transport,
    ));

    let hold_ttl = Duration::seconds(config.business_rules.seat_hold_seconds as i64);
    let mut booking = BookingService::new(dispatcher.clone(), hold_ttl);
    let blocked: Vec<_> = blocked.into_iter().map(|b| (b.event_id, b.seats)).collect();
    booking.restore(bookings, &blocked);
    let booking = Arc::new(Mutex::new(booking));

    let state = AppState {
        catalog: Arc::new(RwLock::new(catalog)),
        booking: booking.clone(),
        users: Arc::new(RwLock::new(users)),
        store,
        dispatcher,
        auth: AuthConfig {
            secret: config.auth.jwt_secret.clone(),
            expiration: config.auth.jwt_expiration_seconds,
        },
        public_url: config.server.public_url.clone(),
    };

    // Background sweep so abandoned holds lapse even with no traffic.
    let sweep_interval =
        std::time::Duration::from_secs(config.business_rules.hold_sweep_seconds.max(1));
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(sweep_interval);
        loop {
            ticker.tick().await;
            let swept = booking.lock().await.sweep_expired_holds();
            if swept > 0 {
                tracing::debug!(swept, "expired seat holds released");
            }
        }
    });

    let app = app(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind address");
    axum::serve(listener, app).await.expect("Server error");
}

/// First-run seating plans for the festival's two houses. Row 7 of the main
/// hall is an aisle.
fn seed_venues() -> Vec<Venue> {
    let main_stage = Venue::with_rows(
        "Main Stage".into(),
        "The main hall of the drama theatre".into(),
        "Kyustendil".into(),
        &[16, 16, 18, 18, 18, 18, 0, 20, 20, 20, 20, 20, 20, 14],
    )
    .expect("static layout");
    let chamber_stage = Venue::with_rows(
        "Chamber Stage".into(),
        "Intimate performance space for smaller productions".into(),
        "Kyustendil".into(),
        &[12, 13, 14, 13, 13, 13, 9, 9],
    )
    .expect("static layout");
    vec![main_stage, chamber_stage]
}
