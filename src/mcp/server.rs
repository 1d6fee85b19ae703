use std::fmt::Write as _;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use rmcp::{
    ErrorData as McpError, RoleServer, ServerHandler,
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{
        CallToolResult, Content, Implementation, ListResourcesResult, PaginatedRequestParams,
        ProtocolVersion, RawResource, ReadResourceRequestParams, ReadResourceResult, Resource,
        ResourceContents, ServerCapabilities, ServerInfo,
    },
    schemars,
    service::RequestContext,
    tool, tool_handler, tool_router,
};
use tracing::info;

use crate::adapters::export::export_to_dir;
use crate::config::types::{Config, ExportFormat};
use crate::domain::criteria::SearchCriteria;
use crate::error::ScrapeError;
use crate::ports::header_provider::HeaderProvider;
use crate::ports::result_store::{ResultStore, StoredRow, StoredSearch};
use crate::ports::search_api::SearchApi;
use crate::session::SearchSession;

pub const LATEST_RESULTS_URI: &str = "booking://results/latest";

const DEFAULT_LIMIT: usize = 10;

// ---------- Tool parameter types ----------

#[derive(Debug, serde::Deserialize, schemars::JsonSchema)]
pub struct HotelSearchParams {
    /// City to search. Anything after the first comma is ignored when
    /// checking the result (e.g. "San Francisco, USA" checks "San Francisco").
    pub city: String,
    /// Country the city is in. When given, the search must resolve to it.
    pub country: Option<String>,
    /// Check-in date (YYYY-MM-DD)
    pub check_in: String,
    /// Check-out date (YYYY-MM-DD), after check-in
    pub check_out: String,
    /// Number of adults (default: 1, at most 30)
    pub adults: Option<u32>,
    /// Number of children (default: 0, at most 10)
    pub children: Option<u32>,
    /// Number of rooms (default: 1, at most 30)
    pub rooms: Option<u32>,
    /// Price currency code, e.g. "USD" or "EUR"
    pub currency: String,
    /// Only return hotels (default: true)
    pub hotels_only: Option<bool>,
    /// Number of best-value hotels to show (default: 10)
    pub limit: Option<usize>,
    /// Scrape again even if an identical recent search is stored (default: false)
    pub refresh: Option<bool>,
}

#[derive(Debug, serde::Deserialize, schemars::JsonSchema)]
pub struct HotelResultsParams {
    /// Number of rows to show (default: all)
    pub limit: Option<usize>,
}

#[derive(Debug, serde::Deserialize, schemars::JsonSchema)]
pub struct HotelExportParams {
    /// Directory to write the file to (default: configured output directory)
    pub output_dir: Option<String>,
    /// "xlsx" or "csv" (default: configured format)
    pub format: Option<ExportFormat>,
}

impl HotelSearchParams {
    fn to_criteria(&self) -> Result<SearchCriteria, ScrapeError> {
        let mut criteria = SearchCriteria::new(
            self.city.trim(),
            parse_date("check_in", &self.check_in)?,
            parse_date("check_out", &self.check_out)?,
            self.currency.trim().to_uppercase(),
        );
        criteria.country = self
            .country
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(String::from);
        criteria.adults = self.adults.unwrap_or(1);
        criteria.children = self.children.unwrap_or(0);
        criteria.rooms = self.rooms.unwrap_or(1);
        criteria.property_type_only = self.hotels_only.unwrap_or(true);
        criteria.validate()?;
        Ok(criteria)
    }
}

fn parse_date(field: &str, value: &str) -> Result<NaiveDate, ScrapeError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|e| {
        ScrapeError::InvalidCriteria {
            reason: format!("{field} '{value}' is not a YYYY-MM-DD date: {e}"),
        }
    })
}

/// Stored rows, best price/review ratio first.
fn ranked_rows(search: &StoredSearch) -> Vec<&StoredRow> {
    let mut rows: Vec<&StoredRow> = search.rows.iter().collect();
    rows.sort_by(|a, b| a.record.price_per_review.total_cmp(&b.record.price_per_review));
    rows
}

fn format_rows(search: &StoredSearch, limit: Option<usize>) -> String {
    let criteria = &search.criteria;
    let mut text = String::new();
    let _ = writeln!(
        text,
        "{} hotels in {} from {} to {} ({}):\n",
        search.rows.len(),
        criteria.normalized_city(),
        criteria.check_in,
        criteria.check_out,
        criteria.currency,
    );
    let rows = ranked_rows(search);
    let shown = limit.unwrap_or(rows.len()).min(rows.len());
    for (rank, row) in rows.iter().take(shown).enumerate() {
        let r = &row.record;
        let _ = write!(
            text,
            "{}. **{}** (ID: {})\n   {:.2} {} | Review: {:.1} | Price/review: {:.2}",
            rank + 1,
            r.hotel_name,
            row.id,
            r.price,
            criteria.currency,
            r.review_score,
            r.price_per_review,
        );
        if let Some(kind) = r.accommodation_type {
            let _ = write!(text, " | {kind}");
        }
        text.push('\n');
    }
    if shown < rows.len() {
        let _ = writeln!(text, "\n... and {} more.", rows.len() - shown);
    }
    text
}

// ---------- Server ----------

#[derive(Clone)]
pub struct BookingMcpServer {
    api: Arc<dyn SearchApi>,
    header_provider: Arc<dyn HeaderProvider>,
    store: Arc<dyn ResultStore>,
    config: Arc<Config>,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl BookingMcpServer {
    pub fn new(
        api: Arc<dyn SearchApi>,
        header_provider: Arc<dyn HeaderProvider>,
        store: Arc<dyn ResultStore>,
        config: Config,
    ) -> Self {
        Self {
            api,
            header_provider,
            store,
            config: Arc::new(config),
            tool_router: Self::tool_router(),
        }
    }

    /// The latest stored search as pretty JSON, if any.
    pub fn latest_results_json(&self) -> Result<Option<String>, McpError> {
        self.store
            .latest()
            .map(|search| serde_json::to_string_pretty(&search))
            .transpose()
            .map_err(|e| {
                McpError::internal_error(format!("failed to serialize results: {e}"), None)
            })
    }

    async fn search(
        &self,
        criteria: SearchCriteria,
        refresh: bool,
    ) -> Result<StoredSearch, ScrapeError> {
        if !refresh {
            let max_age = Duration::from_secs(self.config.store.reuse_ttl_secs);
            if let Some(stored) = self.store.recent(&criteria, max_age) {
                info!(city = %criteria.city, "Reusing recent stored search");
                self.store.set_latest(stored.clone());
                return Ok(stored);
            }
        }

        let session = SearchSession::new(
            criteria.clone(),
            Arc::clone(&self.api),
            Arc::clone(&self.header_provider),
            self.config.session.clone(),
        );
        let table = session.run().await?;
        Ok(self.store.replace_latest(&criteria, &table))
    }

    /// Search hotel prices for a city and dates, validate that the site
    /// understood the query, and rank the results by price per review point.
    #[tool(
        name = "hotel_search",
        description = "Search hotel prices for a city and stay dates. Scrapes every result page, verifies the site resolved the same city, dates, party size, currency and hotel filter, cleans the rows and ranks them by price per review point (lower is better). Stores the result for hotel_results and hotel_export.",
        annotations(read_only_hint = false, open_world_hint = true)
    )]
    async fn hotel_search(
        &self,
        Parameters(params): Parameters<HotelSearchParams>,
    ) -> Result<CallToolResult, McpError> {
        let criteria = match params.to_criteria() {
            Ok(criteria) => criteria,
            Err(e) => return Ok(CallToolResult::error(vec![Content::text(e.to_string())])),
        };

        match self.search(criteria, params.refresh.unwrap_or(false)).await {
            Ok(stored) if stored.rows.is_empty() => Ok(CallToolResult::success(vec![Content::text(
                "The search returned properties, but every row was dropped during cleaning.",
            )])),
            Ok(stored) => {
                let limit = params.limit.unwrap_or(DEFAULT_LIMIT);
                Ok(CallToolResult::success(vec![Content::text(format_rows(
                    &stored,
                    Some(limit),
                ))]))
            }
            Err(e) if e.is_validation_failure() => Ok(CallToolResult::error(vec![Content::text(
                format!(
                    "Search aborted: {e}. The site interpreted the query differently; check the city spelling, add the country, or adjust the dates and party size."
                ),
            )])),
            Err(e) => Ok(CallToolResult::error(vec![Content::text(format!(
                "Search failed: {e}. If requests are rejected, refresh the harvested session headers."
            ))])),
        }
    }

    /// Show the rows of the latest search.
    #[tool(
        name = "hotel_results",
        description = "Show the rows stored by the latest hotel_search, ranked by price per review point.",
        annotations(read_only_hint = true, open_world_hint = false)
    )]
    async fn hotel_results(
        &self,
        Parameters(params): Parameters<HotelResultsParams>,
    ) -> Result<CallToolResult, McpError> {
        match self.store.latest() {
            Some(stored) => Ok(CallToolResult::success(vec![Content::text(format_rows(
                &stored,
                params.limit,
            ))])),
            None => Ok(CallToolResult::error(vec![Content::text(
                "No stored results yet. Run hotel_search first.",
            )])),
        }
    }

    /// Write the latest search to a spreadsheet file.
    #[tool(
        name = "hotel_export",
        description = "Export the latest hotel_search rows to an xlsx (default) or csv file named after the city and dates. Returns the file path.",
        annotations(read_only_hint = false, open_world_hint = false)
    )]
    async fn hotel_export(
        &self,
        Parameters(params): Parameters<HotelExportParams>,
    ) -> Result<CallToolResult, McpError> {
        let Some(stored) = self.store.latest() else {
            return Ok(CallToolResult::error(vec![Content::text(
                "No stored results to export. Run hotel_search first.",
            )]));
        };
        let dir = params
            .output_dir
            .map_or_else(|| self.config.export.output_dir.clone(), PathBuf::from);

        let format = params.format.unwrap_or(self.config.export.format);
        let rows = stored.rows.len();

        let written = tokio::task::spawn_blocking(move || {
            export_to_dir(&dir, &stored.criteria, &stored.to_table(), format)
        })
        .await
        .map_err(|e| McpError::internal_error(format!("export task failed: {e}"), None))?;

        match written {
            Ok(path) => Ok(CallToolResult::success(vec![Content::text(format!(
                "Exported {rows} rows to {}",
                path.display()
            ))])),
            Err(e) => Ok(CallToolResult::error(vec![Content::text(format!(
                "Export failed: {e}"
            ))])),
        }
    }
}

#[tool_handler]
impl ServerHandler for BookingMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .enable_resources()
                .build(),
            server_info: Implementation::from_build_env(),
            instructions: Some(
                "Hotel price scout for Booking.com search results.\n\
                 \n\
                 ## Tools\n\
                 - hotel_search: scrape, validate and rank hotels for a city and stay dates\n\
                 - hotel_results: show the rows of the latest search\n\
                 - hotel_export: write the latest search to an xlsx or csv file\n\
                 \n\
                 ## Resources\n\
                 booking://results/latest holds the latest search as JSON.\n\
                 \n\
                 ## Notes\n\
                 - A search aborts when the site resolves a different city, dates, party size, \
                 currency or hotel filter than requested.\n\
                 - Identical searches within the reuse window are served from the store; pass \
                 refresh=true to scrape again."
                    .into(),
            ),
        }
    }

    async fn list_resources(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListResourcesResult, McpError> {
        let resources = self
            .store
            .latest()
            .map(|search| Resource {
                annotations: None,
                raw: RawResource {
                    uri: LATEST_RESULTS_URI.into(),
                    name: format!(
                        "Hotels: {} {} to {}",
                        search.criteria.normalized_city(),
                        search.criteria.check_in,
                        search.criteria.check_out
                    ),
                    title: None,
                    description: Some("Latest hotel_search rows".into()),
                    mime_type: Some("application/json".into()),
                    size: None,
                    icons: None,
                    meta: None,
                },
            })
            .into_iter()
            .collect();
        Ok(ListResourcesResult {
            resources,
            next_cursor: None,
            meta: None,
        })
    }

    async fn read_resource(
        &self,
        request: ReadResourceRequestParams,
        _context: RequestContext<RoleServer>,
    ) -> Result<ReadResourceResult, McpError> {
        let json = if request.uri == LATEST_RESULTS_URI {
            self.latest_results_json()?
        } else {
            None
        };
        match json {
            Some(text) => Ok(ReadResourceResult {
                contents: vec![ResourceContents::text(text, request.uri)],
            }),
            None => Err(McpError::resource_not_found(
                format!("resource not found: {}", request.uri),
                None,
            )),
        }
    }
}
