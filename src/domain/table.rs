use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::accommodation::AccommodationType;

/// A numeric cell as it arrives from the API, before coercion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Number(f64),
    Text(String),
}

impl Scalar {
    /// Numeric value, `None` for text that is not a finite number.
    pub fn to_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => n.is_finite().then_some(*n),
            Self::Text(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        }
    }
}

/// One listing as extracted from a result page. Every field may be absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultRow {
    pub name: Option<String>,
    pub review_score: Option<Scalar>,
    pub price: Option<Scalar>,
    pub accommodation_type: Option<AccommodationType>,
}

/// Rows accumulated across pages, in encounter order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub rows: Vec<ResultRow>,
}

impl Table {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// A cleaned row, with the columns handed to persistence and export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HotelRecord {
    pub hotel_name: String,
    pub price: f64,
    pub review_score: f64,
    pub price_per_review: f64,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub as_of: DateTime<Utc>,
    pub city: String,
    pub accommodation_type: Option<AccommodationType>,
}

/// Final output of a search: rows unique by name, positive price and review
/// score, and `price_per_review == price / review_score`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultTable {
    pub records: Vec<HotelRecord>,
}

impl ResultTable {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records ordered by price/review ratio, best value first.
    pub fn ranked(&self) -> Vec<&HotelRecord> {
        let mut ranked: Vec<&HotelRecord> = self.records.iter().collect();
        ranked.sort_by(|a, b| a.price_per_review.total_cmp(&b.price_per_review));
        ranked
    }
}

impl From<&ResultTable> for Table {
    fn from(table: &ResultTable) -> Self {
        let rows = table
            .records
            .iter()
            .map(|r| ResultRow {
                name: Some(r.hotel_name.clone()),
                review_score: Some(Scalar::Number(r.review_score)),
                price: Some(Scalar::Number(r.price)),
                accommodation_type: r.accommodation_type,
            })
            .collect();
        Self { rows }
    }
}
