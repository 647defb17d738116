use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kinds of festival programming.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    Performance,
    Workshop,
    Discussion,
}

/// A festival event. Always references its venue by id; the venue record
/// itself lives in the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: Uuid,
    pub title: String,
    pub event_type: EventType,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub venue_id: Uuid,
    pub company: String,
    pub description: String,
    pub image_url: Option<String>,
    pub is_featured: bool,
    pub price: String,
    pub tags: Vec<String>,
}

impl Event {
    /// Event start as a UTC instant, used for reminder scheduling.
    pub fn starts_at(&self) -> DateTime<Utc> {
        Utc.from_utc_datetime(&self.date.and_time(self.time))
    }
}
