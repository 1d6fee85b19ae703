use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub export: ExportConfig,
}

/// Outbound access to the search endpoint.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_timeout")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_rate_limit")]
    pub rate_limit_per_second: f64,
    /// `KEY=VALUE` file with harvested session headers. Process environment is used when unset.
    #[serde(default)]
    pub headers_file: Option<PathBuf>,
    #[serde(default = "default_headers_reload_secs")]
    pub headers_reload_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            user_agent: default_user_agent(),
            request_timeout_secs: default_timeout(),
            rate_limit_per_second: default_rate_limit(),
            headers_file: None,
            headers_reload_secs: default_headers_reload_secs(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SessionConfig {
    #[serde(default = "default_search_deadline")]
    pub search_deadline_secs: u64,
    /// Fraction of page requests that must succeed, `0.0` accepts any partial result.
    #[serde(default = "default_min_page_success_rate")]
    pub min_page_success_rate: f64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            search_deadline_secs: default_search_deadline(),
            min_page_success_rate: default_min_page_success_rate(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StoreConfig {
    #[serde(default = "default_max_searches")]
    pub max_searches: usize,
    #[serde(default = "default_reuse_ttl")]
    pub reuse_ttl_secs: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            max_searches: default_max_searches(),
            reuse_ttl_secs: default_reuse_ttl(),
        }
    }
}

/// File format of an exported result table.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, schemars::JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Xlsx,
    Csv,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Xlsx => "xlsx",
            Self::Csv => "csv",
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExportConfig {
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default)]
    pub format: ExportFormat,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            format: ExportFormat::default(),
        }
    }
}

fn default_base_url() -> String {
    "https://www.booking.com".into()
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/125.0.0.0 Safari/537.36".into()
}

fn default_timeout() -> u64 {
    30
}

fn default_rate_limit() -> f64 {
    1.0
}

fn default_headers_reload_secs() -> u64 {
    3600
}

fn default_search_deadline() -> u64 {
    600
}

fn default_min_page_success_rate() -> f64 {
    0.5
}

fn default_max_searches() -> usize {
    20
}

fn default_reuse_ttl() -> u64 {
    900
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("scraped_hotel_data")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_default_values() {
        let config = Config::default();
        assert_eq!(config.api.base_url, "https://www.booking.com");
        assert_eq!(config.api.request_timeout_secs, 30);
        assert!((config.api.rate_limit_per_second - 1.0).abs() < f64::EPSILON);
        assert!(config.api.headers_file.is_none());
        assert_eq!(config.session.search_deadline_secs, 600);
    }

    #[test]
    fn store_and_export_defaults() {
        let config = Config::default();
        assert_eq!(config.store.max_searches, 20);
        assert_eq!(config.store.reuse_ttl_secs, 900);
        assert_eq!(config.export.output_dir, PathBuf::from("scraped_hotel_data"));
        assert_eq!(config.export.format, ExportFormat::Xlsx);
    }

    #[test]
    fn export_format_reads_lowercase() {
        let config: Config = serde_yml::from_str("export:\n  format: csv").unwrap();
        assert_eq!(config.export.format, ExportFormat::Csv);
        assert_eq!(config.export.format.extension(), "csv");
    }

    #[test]
    fn config_serde_roundtrip() {
        let original = Config::default();
        let yaml = serde_yml::to_string(&original).unwrap();
        let restored: Config = serde_yml::from_str(&yaml).unwrap();
        assert_eq!(restored.api.base_url, original.api.base_url);
        assert_eq!(restored.store.max_searches, original.store.max_searches);
        assert!(
            (restored.session.min_page_success_rate - original.session.min_page_success_rate)
                .abs()
                < f64::EPSILON
        );
    }

    #[test]
    fn config_deserialize_with_overrides() {
        let yaml = "session:\n  min_page_success_rate: 0.9";
        let config: Config = serde_yml::from_str(yaml).unwrap();
        assert!((config.session.min_page_success_rate - 0.9).abs() < f64::EPSILON);
        // Other fields get defaults
        assert_eq!(config.session.search_deadline_secs, 600);
        assert_eq!(config.api.request_timeout_secs, 30);
    }
}
