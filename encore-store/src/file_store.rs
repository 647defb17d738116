use encore_booking::Booking;
use encore_catalog::{Event, NewsItem, Venue};
use encore_shared::{SeatId, User};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;
use uuid::Uuid;

/// Admin-blocked seats for one event, persisted next to the bookings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockedSeats {
    pub event_id: Uuid,
    pub seats: Vec<SeatId>,
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Store serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Flat-file persistence: one JSON record file per entity type under the
/// configured data directory. No schema versioning; every write replaces
/// the whole file via a temp-file rename.
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub async fn ensure_dir(&self) -> Result<(), StoreError> {
        tokio::fs::create_dir_all(&self.dir).await?;
        Ok(())
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    async fn read_collection<T: DeserializeOwned>(&self, name: &str) -> Result<Vec<T>, StoreError> {
        let path = self.path(name);
        if !Path::new(&path).exists() {
            return Ok(Vec::new());
        }
        let bytes = tokio::fs::read(&path).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn write_collection<T: Serialize>(
        &self,
        name: &str,
        records: &[T],
    ) -> Result<(), StoreError> {
        let path = self.path(name);
        let tmp = self.path(&format!("{}.tmp", name));
        let bytes = serde_json::to_vec_pretty(records)?;
        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, &path).await?;
        info!(file = name, count = records.len(), "record file written");
        Ok(())
    }

    pub async fn load_events(&self) -> Result<Vec<Event>, StoreError> {
        self.read_collection("events.json").await
    }

    pub async fn save_events(&self, events: &[Event]) -> Result<(), StoreError> {
        self.write_collection("events.json", events).await
    }

    pub async fn load_venues(&self) -> Result<Vec<Venue>, StoreError> {
        self.read_collection("venues.json").await
    }

    pub async fn save_venues(&self, venues: &[Venue]) -> Result<(), StoreError> {
        self.write_collection("venues.json", venues).await
    }

    pub async fn load_bookings(&self) -> Result<Vec<Booking>, StoreError> {
        self.read_collection("bookings.json").await
    }

    pub async fn save_bookings(&self, bookings: &[Booking]) -> Result<(), StoreError> {
        self.write_collection("bookings.json", bookings).await
    }

    pub async fn load_users(&self) -> Result<Vec<User>, StoreError> {
        self.read_collection("users.json").await
    }

    pub async fn save_users(&self, users: &[User]) -> Result<(), StoreError> {
        self.write_collection("users.json", users).await
    }

    pub async fn load_news(&self) -> Result<Vec<NewsItem>, StoreError> {
        self.read_collection("news.json").await
    }

    pub async fn save_news(&self, news: &[NewsItem]) -> Result<(), StoreError> {
        self.write_collection("news.json", news).await
    }

    pub async fn load_blocked_seats(&self) -> Result<Vec<BlockedSeats>, StoreError> {
        self.read_collection("blocked_seats.json").await
    }

    pub async fn save_blocked_seats(&self, blocked: &[BlockedSeats]) -> Result<(), StoreError> {
        self.write_collection("blocked_seats.json", blocked).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use encore_shared::CustomerInfo;

    fn temp_store() -> FileStore {
        let dir = std::env::temp_dir().join(format!("encore-store-{}", Uuid::new_v4()));
        FileStore::new(dir)
    }

    #[tokio::test]
    async fn test_missing_files_read_as_empty() {
        let store = temp_store();
        store.ensure_dir().await.unwrap();
        assert!(store.load_events().await.unwrap().is_empty());
        assert!(store.load_bookings().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_bookings_round_trip() {
        let store = temp_store();
        store.ensure_dir().await.unwrap();

        let mut ledger = encore_booking::BookingLedger::new();
        let booking = ledger.create(
            Uuid::new_v4(),
            vec![SeatId::new(3, 1), SeatId::new(3, 2)],
            CustomerInfo {
                first_name: "Ana".into(),
                last_name: "Ivanova".into(),
                email: "ana@example.com".into(),
                phone: None,
            },
        );
        store.save_bookings(&ledger.export()).await.unwrap();

        let restored = store.load_bookings().await.unwrap();
        assert_eq!(restored.len(), 1);
        assert_eq!(restored[0].booking_reference, booking.booking_reference);
        assert_eq!(restored[0].seats, booking.seats);
    }

    #[tokio::test]
    async fn test_venues_round_trip() {
        let store = temp_store();
        store.ensure_dir().await.unwrap();

        let venue = Venue::with_rows(
            "Chamber Stage".into(),
            "".into(),
            "Kyustendil".into(),
            &[12, 13, 14, 13, 13, 13, 9, 9],
        )
        .unwrap();
        store.save_venues(&[venue.clone()]).await.unwrap();

        let restored = store.load_venues().await.unwrap();
        assert_eq!(restored[0].id, venue.id);
        assert_eq!(restored[0].capacity(), 96);
    }

    #[tokio::test]
    async fn test_blocked_seats_round_trip() {
        let store = temp_store();
        store.ensure_dir().await.unwrap();

        let event_id = Uuid::new_v4();
        store
            .save_blocked_seats(&[BlockedSeats {
                event_id,
                seats: vec![SeatId::new(1, 1)],
            }])
            .await
            .unwrap();

        let restored = store.load_blocked_seats().await.unwrap();
        assert_eq!(restored[0].event_id, event_id);
        assert_eq!(restored[0].seats, vec![SeatId::new(1, 1)]);
    }
}
