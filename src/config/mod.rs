pub mod types;

use std::io::ErrorKind;
use std::path::Path;

use crate::error::{Result, ScrapeError};
use types::Config;

/// Read a YAML config from `path`. A missing file yields the defaults.
pub fn load_config(path: &Path) -> Result<Config> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::info!(path = %path.display(), "No config file, using defaults");
            return Ok(Config::default());
        }
        Err(e) => {
            return Err(ScrapeError::Config(format!(
                "cannot read {}: {e}",
                path.display()
            )));
        }
    };

    let config: Config = serde_yml::from_str(&content)?;
    check_ranges(&config)?;
    Ok(config)
}

fn check_ranges(config: &Config) -> Result<()> {
    let rate = config.session.min_page_success_rate;
    if !(0.0..=1.0).contains(&rate) {
        return Err(ScrapeError::Config(format!(
            "session.min_page_success_rate must be within 0..=1, got {rate}"
        )));
    }
    if config.session.search_deadline_secs == 0 {
        return Err(ScrapeError::Config(
            "session.search_deadline_secs must be positive".into(),
        ));
    }
    Ok(())
}
