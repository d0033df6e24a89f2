use super::DescriptionEnricher;
use crate::config::EnrichmentConfig;
use crate::error::{FinderError, Result};
use crate::metrics;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

const SYSTEM_PROMPT: &str =
    "Write sophisticated, concise rooftop bar descriptions in 2-3 sentences.";

/// Rewrites descriptions through an OpenAI-compatible chat completions API.
pub struct OpenAiEnricher {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

impl OpenAiEnricher {
    pub fn new(config: &EnrichmentConfig, api_key: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;
        Ok(Self {
            client,
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            api_key: api_key.to_string(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        })
    }

    async fn complete(&self, venue_name: &str, base_description: &str) -> Result<String> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: format!("Describe {}: {}", venue_name, base_description),
                },
            ],
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?
            .error_for_status()?;
        let body: ChatResponse = response.json().await?;

        body.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty())
            .ok_or_else(|| FinderError::LookupFailed("completion had no text".to_string()))
    }
}

#[async_trait]
impl DescriptionEnricher for OpenAiEnricher {
    async fn enrich(&self, venue_name: &str, base_description: &str) -> String {
        match self.complete(venue_name, base_description).await {
            Ok(text) => {
                debug!(venue = venue_name, "Description enriched");
                text
            }
            Err(e) => {
                warn!(venue = venue_name, "Enrichment failed, keeping base description: {}", e);
                metrics::record_enrichment_fallback();
                base_description.to_string()
            }
        }
    }
}
