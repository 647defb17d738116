pub mod event;
pub mod layout;
pub mod manager;
pub mod news;

pub use event::{Event, EventType};
pub use layout::{LayoutError, Venue, VenueRow};
pub use manager::{CatalogError, CatalogManager};
pub use news::NewsItem;
