use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde_json::Value;
use tracing::{debug, trace};
use url::Url;

use crate::adapters::graphql::rate_limiter::RateLimiter;
use crate::config::types::ApiConfig;
use crate::error::{Result, ScrapeError};
use crate::ports::header_provider::Headers;
use crate::ports::search_api::SearchApi;

const GRAPHQL_PATH: &str = "/dml/graphql";

/// `SearchApi` over the site's GraphQL endpoint.
pub struct BookingGraphQLClient {
    http: Client,
    rate_limiter: RateLimiter,
    endpoint: Url,
}

impl BookingGraphQLClient {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let http = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .cookie_store(true)
            .build()?;

        let base = config.base_url.trim_end_matches('/');
        let endpoint = Url::parse(&format!("{base}{GRAPHQL_PATH}"))?;

        Ok(Self {
            http,
            rate_limiter: RateLimiter::new(config.rate_limit_per_second),
            endpoint,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn request_url(&self, currency: &str) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("selected_currency", currency);
        url
    }
}

/// Convert the supplied map into request headers, rejecting names or values
/// that cannot go on the wire.
pub fn header_map(headers: &Headers) -> Result<HeaderMap> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        let header_name =
            HeaderName::from_bytes(name.as_bytes()).map_err(|e| ScrapeError::Headers {
                reason: format!("invalid header name {name:?}: {e}"),
            })?;
        let header_value = HeaderValue::from_str(value).map_err(|e| ScrapeError::Headers {
            reason: format!("invalid value for header {name}: {e}"),
        })?;
        map.insert(header_name, header_value);
    }
    Ok(map)
}

#[async_trait]
impl SearchApi for BookingGraphQLClient {
    async fn post_search(
        &self,
        currency: &str,
        offset: u32,
        payload: &Value,
        headers: &Headers,
    ) -> Result<Value> {
        let url = self.request_url(currency);
        let header_map = header_map(headers)?;

        self.rate_limiter.wait().await;
        debug!(url = %url, offset, "GraphQL search request");

        let response = self
            .http
            .post(url.as_str())
            .headers(header_map)
            .json(payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            debug!(offset, status = status.as_u16(), "GraphQL search rejected");
            return Err(ScrapeError::Transport {
                status: status.as_u16(),
                offset,
            });
        }

        let body = response.text().await?;
        debug!(offset, body_len = body.len(), "GraphQL response received");
        trace!(offset, body = %body, "GraphQL raw response");

        serde_json::from_str(&body)
            .map_err(|e| ScrapeError::malformed("response body", format!("not valid JSON ({e})")))
    }
}
