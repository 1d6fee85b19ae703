//! One search run: probe, validate, paginate, extract, clean.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde_json::Value;
use tracing::{Instrument as _, Span, debug, error, info, info_span, warn};

use crate::adapters::graphql::parsers::items::extract_page;
use crate::adapters::graphql::parsers::validate::validate;
use crate::adapters::graphql::query::{build_query, page_offsets};
use crate::adapters::headers::csrf_token_expiry;
use crate::config::types::SessionConfig;
use crate::domain::cleaning::{assemble, clean};
use crate::domain::criteria::SearchCriteria;
use crate::domain::table::{ResultRow, ResultTable};
use crate::error::{Result, ScrapeError};
use crate::ports::header_provider::{HeaderProvider, Headers};
use crate::ports::search_api::SearchApi;

/// Owns the criteria of a single search and drives it to a cleaned table or
/// a fatal error. Sessions share nothing, so several may run at once.
pub struct SearchSession {
    criteria: SearchCriteria,
    api: Arc<dyn SearchApi>,
    header_provider: Arc<dyn HeaderProvider>,
    config: SessionConfig,
    span: Span,
}

impl SearchSession {
    pub fn new(
        criteria: SearchCriteria,
        api: Arc<dyn SearchApi>,
        header_provider: Arc<dyn HeaderProvider>,
        config: SessionConfig,
    ) -> Self {
        let span = info_span!(
            "search_session",
            city = %criteria.city,
            check_in = %criteria.check_in,
            check_out = %criteria.check_out,
            currency = %criteria.currency,
        );
        Self {
            criteria,
            api,
            header_provider,
            config,
            span,
        }
    }

    /// Log under `span` instead of the session's own.
    #[must_use]
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Run the search within the configured deadline.
    pub async fn run(self) -> Result<ResultTable> {
        let secs = self.config.search_deadline_secs;
        let span = self.span.clone();
        let outcome = tokio::time::timeout(Duration::from_secs(secs), self.execute())
            .instrument(span)
            .await;
        outcome.unwrap_or_else(|_| {
            error!(secs, "Search deadline exceeded");
            Err(ScrapeError::DeadlineExceeded { secs })
        })
    }

    async fn execute(&self) -> Result<ResultTable> {
        let headers = self.header_provider.headers().await?;
        if let Some(expiry) = csrf_token_expiry(&headers)
            && expiry <= Utc::now()
        {
            warn!(%expiry, "CSRF token has expired, requests will likely be rejected");
        }

        info!("Sending probe request");
        let probe = self.fetch(0, &headers).await?;
        let validation = validate(&probe, &self.criteria)?;
        if validation.total_count == 0 {
            error!("Search returned no properties");
            return Err(ScrapeError::NoResults);
        }
        info!(total = validation.total_count, "Probe validated, fetching pages");

        let batches = self.fetch_pages(validation.total_count, &headers).await?;
        let table = assemble(batches);
        if table.is_empty() {
            error!("No rows were scraped from any page");
            return Err(ScrapeError::NoResults);
        }

        Ok(clean(table, &self.criteria))
    }

    async fn fetch(&self, offset: u32, headers: &Headers) -> Result<Value> {
        let payload = serde_json::to_value(build_query(&self.criteria, offset))?;
        self.api
            .post_search(&self.criteria.currency, offset, &payload, headers)
            .await
    }

    /// Fetch every page in turn, skipping failed ones. Fails when too few
    /// pages succeed.
    #[allow(clippy::cast_precision_loss)]
    async fn fetch_pages(&self, total: u64, headers: &Headers) -> Result<Vec<Vec<ResultRow>>> {
        let mut batches = Vec::new();
        let mut attempted = 0_usize;
        let mut failed = 0_usize;

        for offset in page_offsets(total) {
            attempted += 1;
            match self.fetch(offset, headers).await {
                Ok(json) => match extract_page(&json) {
                    Some(rows) => {
                        debug!(offset, rows = rows.len(), "Page fetched");
                        batches.push(rows);
                    }
                    None => {
                        failed += 1;
                        warn!(offset, "Skipping page without a results list");
                    }
                },
                Err(e) => {
                    failed += 1;
                    warn!(offset, error = %e, "Skipping failed page");
                }
            }
        }

        let succeeded = attempted - failed;
        let required = self.config.min_page_success_rate * attempted as f64;
        if attempted > 0 && (succeeded as f64) < required {
            error!(failed, attempted, "Too many page requests failed");
            return Err(ScrapeError::TooManyPageFailures {
                failed,
                total: attempted,
            });
        }
        info!(pages = attempted, failed, "Pagination finished");
        Ok(batches)
    }
}
