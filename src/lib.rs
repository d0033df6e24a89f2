pub mod cards;
pub mod catalog;
pub mod config;
pub mod enrich;
pub mod error;
pub mod geo;
pub mod geocode;
pub mod links;
pub mod logging;
pub mod metrics;
pub mod neighborhoods;
pub mod pipeline;
pub mod server;
pub mod types;

// Re-export the pieces most callers need
pub use catalog::Catalog;
pub use error::{FinderError, Result};
pub use pipeline::{search, SearchSession};
pub use types::{Coordinates, PriceRange, RankedVenue, SearchCriteria, SearchResult, Venue};
