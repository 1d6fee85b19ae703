use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{NaiveDate, TimeZone, Utc};
use serde_json::{Value, json};

use crate::adapters::graphql::query::HOTEL_FILTER_ID;
use crate::adapters::headers::{CSRF_HEADER, default_headers};
use crate::domain::accommodation::AccommodationType;
use crate::domain::criteria::SearchCriteria;
use crate::domain::table::{HotelRecord, ResultTable};
use crate::error::Result;
use crate::ports::header_provider::Headers;
use crate::ports::search_api::SearchApi;

type SearchFn = Box<dyn Fn(&str, u32, &Value) -> Result<Value> + Send + Sync>;

/// One recorded `post_search` call.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub currency: String,
    pub offset: u32,
    pub payload: Value,
    pub headers: Headers,
}

pub struct MockSearchApi {
    search_fn: Mutex<SearchFn>,
    delay: Duration,
    calls: Mutex<Vec<RecordedCall>>,
}

impl Default for MockSearchApi {
    fn default() -> Self {
        Self::new()
    }
}

impl MockSearchApi {
    pub fn new() -> Self {
        Self {
            search_fn: Mutex::new(Box::new(|_, _, _| Ok(page_json(vec![])))),
            delay: Duration::ZERO,
            calls: Mutex::new(Vec::new()),
        }
    }

    #[must_use]
    pub fn with_search(
        self,
        f: impl Fn(&str, u32, &Value) -> Result<Value> + Send + Sync + 'static,
    ) -> Self {
        *self.search_fn.lock().unwrap() = Box::new(f);
        self
    }

    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn offsets(&self) -> Vec<u32> {
        self.calls().iter().map(|c| c.offset).collect()
    }
}

#[async_trait]
impl SearchApi for MockSearchApi {
    async fn post_search(
        &self,
        currency: &str,
        offset: u32,
        payload: &Value,
        headers: &Headers,
    ) -> Result<Value> {
        self.calls.lock().unwrap().push(RecordedCall {
            currency: currency.to_string(),
            offset,
            payload: payload.clone(),
            headers: headers.clone(),
        });
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let f = self.search_fn.lock().unwrap();
        f(currency, offset, payload)
    }
}

// --- Factory functions ---

pub fn sample_criteria() -> SearchCriteria {
    SearchCriteria::new(
        "Paris",
        NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
        NaiveDate::from_ymd_opt(2025, 6, 5).unwrap(),
        "EUR",
    )
}

pub fn test_headers() -> Headers {
    let mut headers = default_headers();
    headers.insert(CSRF_HEADER.to_string(), "test-csrf".to_string());
    headers
}

/// A result item as the API returns it.
pub fn item_json(name: &str, review: f64, price: f64, type_id: i64) -> Value {
    json!({
        "displayName": {"text": name},
        "basicPropertyData": {
            "accommodationTypeId": type_id,
            "reviewScore": {"score": review}
        },
        "blocks": [{"finalPrice": {"amount": price, "currency": "EUR"}}]
    })
}

/// A page response carrying `items`.
pub fn page_json(items: Vec<Value>) -> Value {
    json!({"data": {"searchQueries": {"search": {"results": items}}}})
}

/// A probe response echoing `criteria` faithfully, reporting `total` results.
pub fn probe_json(criteria: &SearchCriteria, total: u64) -> Value {
    let filters = if criteria.property_type_only {
        json!([{"urlId": "review_score=80"}, {"urlId": HOTEL_FILTER_ID}])
    } else {
        json!([])
    };
    let country = criteria.country.clone().unwrap_or_else(|| "France".into());
    json!({
        "data": {"searchQueries": {"search": {
            "pagination": {"nbResultsPerPage": 100, "nbResultsTotal": total},
            "breadcrumbs": [
                {"name": country, "destType": "COUNTRY"},
                {"name": "Ile de France", "destType": "REGION"},
                {"name": criteria.normalized_city(), "destType": "CITY"}
            ],
            "flexibleDatesConfig": {"dateRangeCalendar": {
                "checkin": [criteria.check_in.format("%Y-%m-%d").to_string()],
                "checkout": [criteria.check_out.format("%Y-%m-%d").to_string()]
            }},
            "searchMeta": {
                "nbAdults": criteria.adults,
                "nbChildren": criteria.children,
                "nbRooms": criteria.rooms
            },
            "appliedFilterOptions": filters,
            "results": [{
                "displayName": {"text": "Probe Hotel"},
                "blocks": [{"finalPrice": {"amount": 100, "currency": criteria.currency}}]
            }]
        }}}
    })
}

/// `n` clean records named `Hotel 1..=n`; higher numbers rank better.
pub fn sample_table(n: usize) -> ResultTable {
    let as_of = Utc.with_ymd_and_hms(2025, 5, 20, 12, 0, 0).unwrap();
    let criteria = sample_criteria();
    let records = (1..=n)
        .map(|i| {
            let review_score = i as f64;
            HotelRecord {
                hotel_name: format!("Hotel {i}"),
                price: 100.0,
                review_score,
                price_per_review: 100.0 / review_score,
                check_in: criteria.check_in,
                check_out: criteria.check_out,
                as_of,
                city: "Paris".into(),
                accommodation_type: Some(AccommodationType::Hotels),
            }
        })
        .collect();
    ResultTable { records }
}
