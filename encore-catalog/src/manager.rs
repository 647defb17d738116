use crate::event::Event;
use crate::layout::Venue;
use crate::news::NewsItem;
use std::collections::HashMap;
use uuid::Uuid;

/// In-memory catalog of venues, events and news.
///
/// The API layer owns one of these behind a lock and flushes it to the
/// flat-file store after each mutation.
pub struct CatalogManager {
    venues: HashMap<Uuid, Venue>,
    events: HashMap<Uuid, Event>,
    news: HashMap<Uuid, NewsItem>,
}

impl CatalogManager {
    pub fn new() -> Self {
        Self {
            venues: HashMap::new(),
            events: HashMap::new(),
            news: HashMap::new(),
        }
    }

    /// Rebuild the catalog from persisted records.
    pub fn from_records(venues: Vec<Venue>, events: Vec<Event>, news: Vec<NewsItem>) -> Self {
        Self {
            venues: venues.into_iter().map(|v| (v.id, v)).collect(),
            events: events.into_iter().map(|e| (e.id, e)).collect(),
            news: news.into_iter().map(|n| (n.id, n)).collect(),
        }
    }

    // --- Venues ---

    pub fn add_venue(&mut self, venue: Venue) -> Uuid {
        let id = venue.id;
        self.venues.insert(id, venue);
        id
    }

    pub fn venue(&self, id: &Uuid) -> Option<&Venue> {
        self.venues.get(id)
    }

    pub fn venue_mut(&mut self, id: &Uuid) -> Result<&mut Venue, CatalogError> {
        self.venues
            .get_mut(id)
            .ok_or_else(|| CatalogError::VenueNotFound(id.to_string()))
    }

    pub fn venues(&self) -> Vec<&Venue> {
        let mut all: Vec<&Venue> = self.venues.values().collect();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        all
    }

    /// A venue can only be removed once no event references it.
    pub fn remove_venue(&mut self, id: &Uuid) -> Result<Venue, CatalogError> {
        if self.events.values().any(|e| e.venue_id == *id) {
            return Err(CatalogError::VenueInUse(id.to_string()));
        }
        self.venues
            .remove(id)
            .ok_or_else(|| CatalogError::VenueNotFound(id.to_string()))
    }

    // --- Events ---

    /// Events must reference a known venue by id.
    pub fn add_event(&mut self, event: Event) -> Result<Uuid, CatalogError> {
        if !self.venues.contains_key(&event.venue_id) {
            return Err(CatalogError::VenueNotFound(event.venue_id.to_string()));
        }
        let id = event.id;
        self.events.insert(id, event);
        Ok(id)
    }

    pub fn event(&self, id: &Uuid) -> Option<&Event> {
        self.events.get(id)
    }

    pub fn events(&self) -> Vec<&Event> {
        let mut all: Vec<&Event> = self.events.values().collect();
        all.sort_by(|a, b| a.starts_at().cmp(&b.starts_at()));
        all
    }

    pub fn update_event(&mut self, id: &Uuid, event: Event) -> Result<(), CatalogError> {
        if !self.venues.contains_key(&event.venue_id) {
            return Err(CatalogError::VenueNotFound(event.venue_id.to_string()));
        }
        if !self.events.contains_key(id) {
            return Err(CatalogError::EventNotFound(id.to_string()));
        }
        self.events.insert(*id, Event { id: *id, ..event });
        Ok(())
    }

    pub fn remove_event(&mut self, id: &Uuid) -> Result<Event, CatalogError> {
        self.events
            .remove(id)
            .ok_or_else(|| CatalogError::EventNotFound(id.to_string()))
    }

    /// The venue for an event, resolving the id reference.
    pub fn event_venue(&self, event_id: &Uuid) -> Result<(&Event, &Venue), CatalogError> {
        let event = self
            .events
            .get(event_id)
            .ok_or_else(|| CatalogError::EventNotFound(event_id.to_string()))?;
        let venue = self
            .venues
            .get(&event.venue_id)
            .ok_or_else(|| CatalogError::VenueNotFound(event.venue_id.to_string()))?;
        Ok((event, venue))
    }

    // --- News ---

    pub fn add_news(&mut self, item: NewsItem) -> Uuid {
        let id = item.id;
        self.news.insert(id, item);
        id
    }

    pub fn news(&self) -> Vec<&NewsItem> {
        let mut all: Vec<&NewsItem> = self.news.values().collect();
        all.sort_by(|a, b| b.published_at.cmp(&a.published_at));
        all
    }

    /// Replace title, body and image of an existing item. The original
    /// publication date stays; edits do not bump an item up the feed.
    pub fn update_news(&mut self, id: &Uuid, item: NewsItem) -> Result<(), CatalogError> {
        let Some(existing) = self.news.get(id) else {
            return Err(CatalogError::NewsNotFound(id.to_string()));
        };
        let published_at = existing.published_at;
        self.news.insert(
            *id,
            NewsItem {
                id: *id,
                published_at,
                ..item
            },
        );
        Ok(())
    }

    pub fn remove_news(&mut self, id: &Uuid) -> Result<NewsItem, CatalogError> {
        self.news
            .remove(id)
            .ok_or_else(|| CatalogError::NewsNotFound(id.to_string()))
    }

    /// Snapshot for persistence.
    pub fn export(&self) -> (Vec<Venue>, Vec<Event>, Vec<NewsItem>) {
        (
            self.venues.values().cloned().collect(),
            self.events.values().cloned().collect(),
            self.news.values().cloned().collect(),
        )
    }
}

impl Default for CatalogManager {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Venue not found: {0}")]
    VenueNotFound(String),

    #[error("Venue still referenced by events: {0}")]
    VenueInUse(String),

    #[error("Event not found: {0}")]
    EventNotFound(String),

    #[error("News item not found: {0}")]
    NewsNotFound(String),
}
