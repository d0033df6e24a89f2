use crate::error::{FinderError, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_PATH_ENV: &str = "ROOFTOP_FINDER_CONFIG";
pub const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub catalog: CatalogConfig,
    pub geocoder: GeocoderConfig,
    pub enrichment: EnrichmentConfig,
    pub search: SearchConfig,
    pub logging: LoggingConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub path: PathBuf,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data/rooftop_bars.json"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GeocoderConfig {
    pub base_url: String,
    pub user_agent: String,
    /// Appended to every query, after the borough.
    pub region_suffix: String,
    pub timeout_seconds: u64,
    pub cache: bool,
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            base_url: "https://nominatim.openstreetmap.org".to_string(),
            user_agent: "elevate_nyc_finder".to_string(),
            region_suffix: "New York, NY".to_string(),
            timeout_seconds: 10,
            cache: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EnrichmentConfig {
    /// Absent means enrichment is disabled and descriptions pass through.
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub timeout_seconds: u64,
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-3.5-turbo".to_string(),
            max_tokens: 100,
            temperature: 0.7,
            timeout_seconds: 15,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub default_radius_miles: f64,
    pub default_min_rating: f64,
    pub display_limit: usize,
    pub featured_limit: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_radius_miles: 2.0,
            default_min_rating: 3.0,
            display_limit: 8,
            featured_limit: 6,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub directory: PathBuf,
    pub file_name: String,
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("logs"),
            file_name: "rooftop_finder.log".to_string(),
            filter: "rooftop_finder=info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

impl Config {
    /// Parse a TOML document. Missing sections and keys take their defaults.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.check()?;
        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            FinderError::Config(format!("Failed to read config file '{}': {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    /// Load configuration for the binary.
    ///
    /// An explicit path must exist. Otherwise `$ROOFTOP_FINDER_CONFIG`, then
    /// `config.toml`, are tried and defaults are used when neither exists.
    /// The enrichment key falls back to `$OPENAI_API_KEY`.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut config = match explicit {
            Some(path) => Self::load_from(path)?,
            None => {
                let path = std::env::var(CONFIG_PATH_ENV)
                    .map(PathBuf::from)
                    .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));
                if path.exists() {
                    Self::load_from(&path)?
                } else {
                    Config::default()
                }
            }
        };

        if config.enrichment.api_key.is_none() {
            config.enrichment.api_key = std::env::var(OPENAI_API_KEY_ENV)
                .ok()
                .filter(|key| !key.trim().is_empty());
        }
        Ok(config)
    }

    fn check(&self) -> Result<()> {
        let radius = self.search.default_radius_miles;
        if radius.is_nan() || radius <= 0.0 {
            return Err(FinderError::Config(format!(
                "search.default_radius_miles must be positive, got {}",
                radius
            )));
        }
        if !(0.0..=2.0).contains(&self.enrichment.temperature) {
            return Err(FinderError::Config(format!(
                "enrichment.temperature must be between 0 and 2, got {}",
                self.enrichment.temperature
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_document_is_all_defaults() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config.catalog.path, PathBuf::from("data/rooftop_bars.json"));
        assert_eq!(config.geocoder.user_agent, "elevate_nyc_finder");
        assert_eq!(config.search.display_limit, 8);
        assert_eq!(config.enrichment.max_tokens, 100);
        assert!(config.enrichment.api_key.is_none());
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = Config::from_toml_str(
            r#"
            [search]
            default_radius_miles = 5.0

            [server]
            port = 9000
            "#,
        )
        .unwrap();
        assert_eq!(config.search.default_radius_miles, 5.0);
        assert_eq!(config.search.default_min_rating, 3.0);
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "127.0.0.1");
    }

    #[test]
    fn rejects_non_positive_radius() {
        let err = Config::from_toml_str("[search]\ndefault_radius_miles = 0.0\n").unwrap_err();
        assert!(matches!(err, FinderError::Config(_)));
    }

    #[test]
    fn load_from_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[catalog]\npath = \"venues.json\"").unwrap();
        let config = Config::load_from(file.path()).unwrap();
        assert_eq!(config.catalog.path, PathBuf::from("venues.json"));
    }

    #[test]
    fn load_from_missing_file_is_config_error() {
        let err = Config::load_from(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, FinderError::Config(_)));
    }
}
