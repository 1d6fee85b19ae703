//! Typed partial schema of the `FullSearch` response, covering only the
//! fields the pipeline reads.
//!
//! Every field is a [`Slot`], which keeps apart a key that is absent, a key
//! that is explicitly `null`, and a value of an unexpected shape. Decoding a
//! response into these types never fails on content.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::domain::table::Scalar;
use crate::error::{Result, ScrapeError};

#[derive(Debug, Clone, PartialEq)]
pub enum Slot<T> {
    Missing,
    Null,
    Invalid,
    Present(T),
}

impl<T> Default for Slot<T> {
    fn default() -> Self {
        Self::Missing
    }
}

impl<T> Slot<T> {
    pub fn present(&self) -> Option<&T> {
        match self {
            Self::Present(v) => Some(v),
            _ => None,
        }
    }

    /// The value, or a `MalformedResponse` naming `field` and why it is unusable.
    pub fn require(&self, field: &str) -> Result<&T> {
        match self {
            Self::Present(v) => Ok(v),
            Self::Missing => Err(ScrapeError::malformed(field, "missing")),
            Self::Null => Err(ScrapeError::malformed(field, "null")),
            Self::Invalid => Err(ScrapeError::malformed(field, "of an unexpected type")),
        }
    }
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for Slot<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(match value {
            Value::Null => Self::Null,
            other => T::deserialize(other).map_or(Self::Invalid, Self::Present),
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SearchResponse {
    pub data: Slot<ResponseData>,
}

impl SearchResponse {
    pub fn from_value(json: &Value) -> Self {
        Self::deserialize(json).unwrap_or_default()
    }

    /// The `data.searchQueries.search` block.
    pub fn search(&self) -> Result<&SearchOutput> {
        self.data
            .require("data")?
            .search_queries
            .require("data.searchQueries")?
            .search
            .require("data.searchQueries.search")
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ResponseData {
    pub search_queries: Slot<SearchQueries>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SearchQueries {
    pub search: Slot<SearchOutput>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SearchOutput {
    pub pagination: Slot<Pagination>,
    pub breadcrumbs: Slot<Vec<Slot<Breadcrumb>>>,
    pub flexible_dates_config: Slot<FlexibleDatesConfig>,
    pub search_meta: Slot<SearchMeta>,
    pub applied_filter_options: Slot<Vec<Slot<FilterOption>>>,
    pub results: Slot<Vec<Slot<ResultItem>>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Pagination {
    pub nb_results_total: Slot<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Breadcrumb {
    pub name: Slot<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FlexibleDatesConfig {
    pub date_range_calendar: Slot<DateRangeCalendar>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DateRangeCalendar {
    pub checkin: Slot<Vec<Slot<String>>>,
    pub checkout: Slot<Vec<Slot<String>>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SearchMeta {
    pub nb_adults: Slot<u32>,
    pub nb_children: Slot<u32>,
    pub nb_rooms: Slot<u32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FilterOption {
    pub url_id: Slot<String>,
}

/// One search result. The three groups vary independently between items.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ResultItem {
    pub display_name: Slot<DisplayName>,
    pub basic_property_data: Slot<BasicPropertyData>,
    pub blocks: Slot<Vec<Slot<Block>>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DisplayName {
    pub text: Slot<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BasicPropertyData {
    pub review_score: Slot<ReviewScore>,
    pub accommodation_type_id: Slot<i64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ReviewScore {
    pub score: Slot<Scalar>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Block {
    pub final_price: Slot<Price>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Price {
    pub amount: Slot<Scalar>,
    pub currency: Slot<String>,
}
