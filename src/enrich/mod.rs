//! Optional rewriting of venue descriptions.
//!
//! Enrichment never fails outward: every implementation returns the base
//! description when it cannot do better, and a missing API key selects the
//! [`PassthroughEnricher`].

mod openai;

pub use openai::OpenAiEnricher;

use crate::config::EnrichmentConfig;
use crate::types::Venue;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{info, warn};

#[async_trait]
pub trait DescriptionEnricher: Send + Sync {
    /// Rewritten description for `venue_name`, or `base_description` unchanged.
    async fn enrich(&self, venue_name: &str, base_description: &str) -> String;

    /// Whether this enricher can change anything at all.
    fn is_enabled(&self) -> bool {
        true
    }
}

/// Identity enricher used when no provider is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct PassthroughEnricher;

#[async_trait]
impl DescriptionEnricher for PassthroughEnricher {
    async fn enrich(&self, _venue_name: &str, base_description: &str) -> String {
        base_description.to_string()
    }

    fn is_enabled(&self) -> bool {
        false
    }
}

pub fn enricher_from_config(config: &EnrichmentConfig) -> Arc<dyn DescriptionEnricher> {
    let Some(api_key) = config.api_key.as_deref().filter(|k| !k.trim().is_empty()) else {
        info!("No enrichment API key configured; descriptions are shown as written");
        return Arc::new(PassthroughEnricher);
    };
    match OpenAiEnricher::new(config, api_key) {
        Ok(enricher) => Arc::new(enricher),
        Err(e) => {
            warn!("Could not build enrichment client, falling back to passthrough: {}", e);
            Arc::new(PassthroughEnricher)
        }
    }
}

/// Enrich the descriptions of `venues` concurrently.
///
/// Output order matches input order. A task that dies keeps its venue's
/// unchanged base description.
pub async fn enrich_descriptions(
    enricher: Arc<dyn DescriptionEnricher>,
    venues: &[Arc<Venue>],
) -> Vec<String> {
    let mut descriptions: Vec<String> = venues.iter().map(|v| v.vibe.clone()).collect();
    if !enricher.is_enabled() {
        return descriptions;
    }

    let mut tasks = JoinSet::new();
    for (index, venue) in venues.iter().enumerate() {
        let enricher = enricher.clone();
        let venue = venue.clone();
        tasks.spawn(async move { (index, enricher.enrich(&venue.name, &venue.vibe).await) });
    }
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((index, text)) => descriptions[index] = text,
            Err(e) => warn!("Enrichment task failed: {}", e),
        }
    }
    descriptions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Coordinates, PriceRange};

    struct Shouting;

    #[async_trait]
    impl DescriptionEnricher for Shouting {
        async fn enrich(&self, venue_name: &str, base_description: &str) -> String {
            format!("{}: {}", venue_name, base_description.to_uppercase())
        }
    }

    fn venue(name: &str, vibe: &str) -> Arc<Venue> {
        Arc::new(Venue {
            name: name.into(),
            address: String::new(),
            coordinates: Coordinates::new(40.7, -73.9),
            neighborhood: String::new(),
            borough: String::new(),
            price_range: PriceRange::Moderate,
            rating: 4.0,
            vibe: vibe.into(),
        })
    }

    #[tokio::test]
    async fn passthrough_is_identity() {
        for text in ["", "Skyline views", "  padded  ", "émoji 🌇"] {
            assert_eq!(PassthroughEnricher.enrich("Any", text).await, text);
        }
    }

    #[test]
    fn missing_key_selects_passthrough() {
        let enricher = enricher_from_config(&EnrichmentConfig::default());
        assert!(!enricher.is_enabled());

        let blank = EnrichmentConfig {
            api_key: Some("   ".into()),
            ..EnrichmentConfig::default()
        };
        assert!(!enricher_from_config(&blank).is_enabled());
    }

    #[tokio::test]
    async fn concurrent_enrichment_preserves_order() {
        let venues = vec![venue("A", "one"), venue("B", "two"), venue("C", "three")];
        let out = enrich_descriptions(Arc::new(Shouting), &venues).await;
        assert_eq!(out, vec!["A: ONE", "B: TWO", "C: THREE"]);
        assert_eq!(venues[0].vibe, "one");
    }

    #[tokio::test]
    async fn disabled_enricher_returns_base_descriptions() {
        let venues = vec![venue("A", "one")];
        let out = enrich_descriptions(Arc::new(PassthroughEnricher), &venues).await;
        assert_eq!(out, vec!["one"]);
    }
}
