use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A news post shown on the festival site, managed from the admin panel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsItem {
    pub id: Uuid,
    pub title: String,
    pub body: String,
    pub image_url: Option<String>,
    pub published_at: DateTime<Utc>,
}

impl NewsItem {
    pub fn new(title: String, body: String, image_url: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title,
            body,
            image_url,
            published_at: Utc::now(),
        }
    }
}
