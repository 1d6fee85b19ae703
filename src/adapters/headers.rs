//! Header providers for the authenticated search session.
//!
//! Headers are harvested out-of-band from a live browser session and handed
//! over either through the process environment or a `KEY=VALUE` file. The
//! providers here only read them; nothing refreshes the session itself.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::{Result, ScrapeError};
use crate::ports::header_provider::{HeaderProvider, Headers};

pub const CSRF_HEADER: &str = "x-booking-csrf-token";

/// Harvested variable name and the header it is sent as.
pub const HARVESTED_HEADERS: [(&str, &str); 8] = [
    ("USER_AGENT", "user-agent"),
    ("X_BOOKING_CONTEXT_ACTION_NAME", "x-booking-context-action-name"),
    ("X_BOOKING_CONTEXT_AID", "x-booking-context-aid"),
    ("X_BOOKING_CSRF_TOKEN", CSRF_HEADER),
    ("X_BOOKING_ET_SERIALIZED_STATE", "x-booking-et-serialized-state"),
    ("X_BOOKING_PAGEVIEW_ID", "x-booking-pageview-id"),
    ("X_BOOKING_SITE_TYPE_ID", "x-booking-site-type-id"),
    ("X_BOOKING_TOPIC", "x-booking-topic"),
];

/// Headers every search request carries.
pub fn default_headers() -> Headers {
    Headers::from([
        ("content-type".to_string(), "application/json".to_string()),
        ("accept".to_string(), "*/*".to_string()),
        ("origin".to_string(), "https://www.booking.com".to_string()),
    ])
}

/// Defaults overlaid with every harvested variable `lookup` can resolve.
/// Fails when the CSRF token is not among them.
pub fn harvested_headers(lookup: impl Fn(&str) -> Option<String>) -> Result<Headers> {
    let mut headers = default_headers();
    for (var, header) in HARVESTED_HEADERS {
        if let Some(value) = lookup(var).filter(|v| !v.trim().is_empty()) {
            headers.insert(header.to_string(), value.trim().to_string());
        }
    }
    if !headers.contains_key(CSRF_HEADER) {
        return Err(ScrapeError::Headers {
            reason: "X_BOOKING_CSRF_TOKEN is not set".into(),
        });
    }
    Ok(headers)
}

/// A fixed header map.
#[derive(Debug, Clone, Default)]
pub struct StaticHeaders(pub Headers);

#[async_trait]
impl HeaderProvider for StaticHeaders {
    async fn headers(&self) -> Result<Headers> {
        Ok(self.0.clone())
    }
}

/// Reads the harvested variables from the process environment on each call.
pub struct EnvHeaderProvider {
    lookup: Box<dyn Fn(&str) -> Option<String> + Send + Sync>,
}

impl EnvHeaderProvider {
    pub fn from_env() -> Self {
        Self::with_lookup(|name| std::env::var(name).ok())
    }

    pub fn with_lookup(lookup: impl Fn(&str) -> Option<String> + Send + Sync + 'static) -> Self {
        Self {
            lookup: Box::new(lookup),
        }
    }
}

#[async_trait]
impl HeaderProvider for EnvHeaderProvider {
    async fn headers(&self) -> Result<Headers> {
        harvested_headers(&self.lookup)
    }
}

/// Reads the harvested variables from a `KEY=VALUE` file and keeps the
/// resulting map for `reload_after` before reading the file again.
pub struct EnvFileHeaderProvider {
    path: PathBuf,
    reload_after: Duration,
    cached: RwLock<Option<(Headers, Instant)>>,
}

impl EnvFileHeaderProvider {
    pub fn new(path: impl Into<PathBuf>, reload_after: Duration) -> Self {
        Self {
            path: path.into(),
            reload_after,
            cached: RwLock::new(None),
        }
    }
}

#[async_trait]
impl HeaderProvider for EnvFileHeaderProvider {
    async fn headers(&self) -> Result<Headers> {
        {
            let guard = self.cached.read().await;
            if let Some((ref headers, loaded_at)) = *guard
                && loaded_at.elapsed() < self.reload_after
            {
                return Ok(headers.clone());
            }
        }

        debug!(path = %self.path.display(), "Loading harvested headers");
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| ScrapeError::Headers {
                reason: format!("cannot read {}: {e}", self.path.display()),
            })?;
        let vars = parse_env_file(&content);
        let headers = harvested_headers(|name| vars.get(name).cloned())?;

        *self.cached.write().await = Some((headers.clone(), Instant::now()));
        Ok(headers)
    }
}

/// Parse `KEY=VALUE` lines. Blank lines and `#` comments are skipped, an
/// optional `export ` prefix is dropped, and matching surrounding quotes are
/// stripped from values.
pub fn parse_env_file(content: &str) -> HashMap<String, String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| {
            let line = line.strip_prefix("export ").unwrap_or(line);
            let (key, value) = line.split_once('=')?;
            Some((key.trim().to_string(), unquote(value.trim()).to_string()))
        })
        .collect()
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = value
            .strip_prefix(quote)
            .and_then(|v| v.strip_suffix(quote))
        {
            return inner;
        }
    }
    value
}

/// Expiry of the CSRF token, read from its JWT `exp` claim. `None` when
/// there is no token or it does not decode.
pub fn csrf_token_expiry(headers: &Headers) -> Option<DateTime<Utc>> {
    let token = headers.get(CSRF_HEADER)?;
    let payload = token.split('.').nth(1)?;
    let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
    let claims: serde_json::Value = serde_json::from_slice(&bytes).ok()?;
    DateTime::from_timestamp(claims.get("exp")?.as_i64()?, 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    fn jwt_with_exp(exp: i64) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
        let claims = URL_SAFE_NO_PAD.encode(format!(r#"{{"exp":{exp}}}"#));
        format!("{header}.{claims}.signature")
    }

    fn lookup_from(
        pairs: &[(&str, &str)],
    ) -> impl Fn(&str) -> Option<String> + Send + Sync + use<> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn harvested_headers_map_names_over_defaults() {
        let headers = harvested_headers(lookup_from(&[
            ("X_BOOKING_CSRF_TOKEN", "tok"),
            ("X_BOOKING_TOPIC", "capla_browser_b-search-web-searchresults"),
            ("USER_AGENT", "Mozilla/5.0"),
        ]))
        .unwrap();
        assert_eq!(headers[CSRF_HEADER], "tok");
        assert_eq!(
            headers["x-booking-topic"],
            "capla_browser_b-search-web-searchresults"
        );
        assert_eq!(headers["user-agent"], "Mozilla/5.0");
        assert_eq!(headers["content-type"], "application/json");
        assert_eq!(headers["origin"], "https://www.booking.com");
        assert!(!headers.contains_key("x-booking-pageview-id"));
    }

    #[test]
    fn missing_csrf_token_is_an_error() {
        let err = harvested_headers(lookup_from(&[("X_BOOKING_CSRF_TOKEN", "  ")])).unwrap_err();
        assert!(matches!(err, ScrapeError::Headers { .. }));
    }

    #[tokio::test]
    async fn env_provider_uses_lookup() {
        let provider =
            EnvHeaderProvider::with_lookup(lookup_from(&[("X_BOOKING_CSRF_TOKEN", "t")]));
        assert_eq!(provider.headers().await.unwrap()[CSRF_HEADER], "t");
    }

    #[test]
    fn parse_env_file_handles_quotes_comments_and_export() {
        let vars = parse_env_file(
            "# harvested\n\nUSER_AGENT=\"Mozilla/5.0 (X11)\"\nexport X_BOOKING_TOPIC='topic'\nX_BOOKING_AID=a=b\nnot a pair\n",
        );
        assert_eq!(vars["USER_AGENT"], "Mozilla/5.0 (X11)");
        assert_eq!(vars["X_BOOKING_TOPIC"], "topic");
        assert_eq!(vars["X_BOOKING_AID"], "a=b");
        assert_eq!(vars.len(), 3);
    }

    #[tokio::test]
    async fn env_file_provider_caches_until_reload() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "X_BOOKING_CSRF_TOKEN=first").unwrap();
        let provider = EnvFileHeaderProvider::new(file.path(), Duration::from_secs(3600));
        assert_eq!(provider.headers().await.unwrap()[CSRF_HEADER], "first");

        std::fs::write(file.path(), "X_BOOKING_CSRF_TOKEN=second\n").unwrap();
        assert_eq!(provider.headers().await.unwrap()[CSRF_HEADER], "first");
    }

    #[tokio::test]
    async fn env_file_provider_reloads_after_ttl() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "X_BOOKING_CSRF_TOKEN=first").unwrap();
        let provider = EnvFileHeaderProvider::new(file.path(), Duration::ZERO);
        assert_eq!(provider.headers().await.unwrap()[CSRF_HEADER], "first");

        std::fs::write(file.path(), "X_BOOKING_CSRF_TOKEN=second\n").unwrap();
        assert_eq!(provider.headers().await.unwrap()[CSRF_HEADER], "second");
    }

    #[tokio::test]
    async fn env_file_provider_missing_file_is_headers_error() {
        let dir = tempfile::tempdir().unwrap();
        let provider =
            EnvFileHeaderProvider::new(dir.path().join("absent.env"), Duration::from_secs(60));
        assert!(matches!(
            provider.headers().await,
            Err(ScrapeError::Headers { .. })
        ));
    }

    #[test]
    fn csrf_expiry_decodes_exp_claim() {
        let mut headers = default_headers();
        headers.insert(CSRF_HEADER.into(), jwt_with_exp(1_750_000_000));
        let expiry = csrf_token_expiry(&headers).unwrap();
        assert_eq!(expiry.timestamp(), 1_750_000_000);
    }

    #[test]
    fn csrf_expiry_none_for_opaque_token() {
        let mut headers = default_headers();
        assert!(csrf_token_expiry(&headers).is_none());
        headers.insert(CSRF_HEADER.into(), "opaque".into());
        assert!(csrf_token_expiry(&headers).is_none());
        headers.insert(CSRF_HEADER.into(), "a.!!!.c".into());
        assert!(csrf_token_expiry(&headers).is_none());
    }
}
