//! Metrics for catalog loading, geocoding, searching and enrichment.
//!
//! Recording goes through the `metrics` facade and is a no-op until
//! [`init_metrics`] installs the Prometheus recorder.

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::{Once, OnceLock};
use tracing::{info, warn};

static INIT: Once = Once::new();
static HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

macro_rules! finder_metric {
    (counter, $name:literal) => {
        concat!("rooftop_finder_", $name, "_total")
    };
    (histogram, $name:literal) => {
        concat!("rooftop_finder_", $name)
    };
}

pub const SEARCHES: &str = finder_metric!(counter, "searches");
pub const SEARCH_FAILURES: &str = finder_metric!(counter, "search_failures");
pub const SEARCH_RESULTS: &str = finder_metric!(histogram, "search_results");
pub const GEOCODE_CACHE_HITS: &str = finder_metric!(counter, "geocode_cache_hits");
pub const ENRICHMENT_FALLBACKS: &str = finder_metric!(counter, "enrichment_fallbacks");
pub const CATALOG_DROPPED_RECORDS: &str = finder_metric!(counter, "catalog_dropped_records");

/// Install the Prometheus recorder. Idempotent.
pub fn init_metrics() {
    INIT.call_once(|| match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            let _ = HANDLE.set(handle);
            describe_all();
            info!("Prometheus recorder installed");
        }
        Err(e) => warn!("Failed to install Prometheus recorder: {}", e),
    });
}

/// Prometheus text exposition of everything recorded so far.
pub fn render() -> Option<String> {
    HANDLE.get().map(|h| h.render())
}

fn describe_all() {
    ::metrics::describe_counter!(SEARCHES, "Searches that resolved an origin");
    ::metrics::describe_counter!(SEARCH_FAILURES, "Searches aborted by a geocoding failure");
    ::metrics::describe_histogram!(SEARCH_RESULTS, "Venues returned per search");
    ::metrics::describe_counter!(GEOCODE_CACHE_HITS, "Geocode lookups answered from cache");
    ::metrics::describe_counter!(
        ENRICHMENT_FALLBACKS,
        "Descriptions returned unmodified after a provider failure"
    );
    ::metrics::describe_counter!(CATALOG_DROPPED_RECORDS, "Catalog records dropped by validation");
}

pub fn record_search(result_count: usize) {
    ::metrics::counter!(SEARCHES).increment(1);
    ::metrics::histogram!(SEARCH_RESULTS).record(result_count as f64);
}

pub fn record_search_failure(kind: &'static str) {
    ::metrics::counter!(SEARCH_FAILURES, "kind" => kind).increment(1);
}

pub fn record_geocode_cache_hit() {
    ::metrics::counter!(GEOCODE_CACHE_HITS).increment(1);
}

pub fn record_enrichment_fallback() {
    ::metrics::counter!(ENRICHMENT_FALLBACKS).increment(1);
}

pub fn record_dropped_records(count: usize) {
    if count > 0 {
        ::metrics::counter!(CATALOG_DROPPED_RECORDS).increment(count as u64);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_follow_prefix_convention() {
        assert_eq!(SEARCHES, "rooftop_finder_searches_total");
        assert_eq!(SEARCH_RESULTS, "rooftop_finder_search_results");
    }

    #[test]
    fn recording_without_recorder_is_a_noop() {
        record_search(3);
        record_search_failure("lookup_failed");
        record_dropped_records(0);
    }
}
