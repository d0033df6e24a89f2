use thiserror::Error;

#[derive(Error, Debug)]
pub enum FinderError {
    /// Catalog source missing, unreadable or not a venue list.
    #[error("Venue data unavailable at '{path}': {reason}")]
    DataUnavailable { path: String, reason: String },

    /// The geocoder answered, but knows no such place.
    #[error("Location not found: {place}")]
    LocationNotFound { place: String },

    /// Transport or provider failure while geocoding.
    #[error("Location lookup failed: {0}")]
    LookupFailed(String),

    #[error("Invalid search criteria: {0}")]
    InvalidCriteria(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON deserialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl FinderError {
    /// Whether a caller may reasonably retry the same request.
    pub fn is_retryable(&self) -> bool {
        matches!(self, FinderError::LookupFailed(_) | FinderError::Http(_))
    }

    /// Short label used for metrics and API responses.
    pub fn kind(&self) -> &'static str {
        match self {
            FinderError::DataUnavailable { .. } => "data_unavailable",
            FinderError::LocationNotFound { .. } => "location_not_found",
            FinderError::LookupFailed(_) | FinderError::Http(_) => "lookup_failed",
            FinderError::InvalidCriteria(_) => "invalid_criteria",
            FinderError::Json(_) | FinderError::Toml(_) | FinderError::Config(_) => "config",
            FinderError::Io(_) => "io",
        }
    }
}

pub type Result<T> = std::result::Result<T, FinderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_lookup_failures_are_retryable() {
        assert!(FinderError::LookupFailed("timeout".into()).is_retryable());
        assert!(!FinderError::LocationNotFound { place: "Nowhereville".into() }.is_retryable());
        assert!(!FinderError::DataUnavailable {
            path: "data/venues.json".into(),
            reason: "missing".into()
        }
        .is_retryable());
    }

    #[test]
    fn kinds_distinguish_not_found_from_failed() {
        let not_found = FinderError::LocationNotFound { place: "Nowhereville".into() };
        let failed = FinderError::LookupFailed("connection reset".into());
        assert_eq!(not_found.kind(), "location_not_found");
        assert_eq!(failed.kind(), "lookup_failed");
        assert_eq!(not_found.to_string(), "Location not found: Nowhereville");
    }
}
