use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScrapeError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Search request at offset {offset} returned HTTP {status}")]
    Transport { status: u16, offset: u32 },

    #[error("Error {field} not match: {entered} != {echoed}")]
    Mismatch {
        field: &'static str,
        entered: String,
        echoed: String,
    },

    #[error("Malformed search response: {field} is {reason}")]
    MalformedResponse { field: String, reason: String },

    #[error("Search returned no results")]
    NoResults,

    #[error("Too many failed pages: {failed} of {total} page requests failed")]
    TooManyPageFailures { failed: usize, total: usize },

    #[error("Search did not finish within {secs}s")]
    DeadlineExceeded { secs: u64 },

    #[error("Request headers unavailable: {reason}")]
    Headers { reason: String },

    #[error("Invalid search criteria: {reason}")]
    InvalidCriteria { reason: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yml::Error),

    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Spreadsheet error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),
}

impl ScrapeError {
    pub(crate) fn malformed(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedResponse {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Whether the error stems from the remote system reinterpreting the query
    /// or answering with nothing usable.
    pub fn is_validation_failure(&self) -> bool {
        matches!(
            self,
            Self::Mismatch { .. } | Self::MalformedResponse { .. } | Self::NoResults
        )
    }
}

pub type Result<T> = std::result::Result<T, ScrapeError>;
