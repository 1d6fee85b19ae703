use serde_json::Value;
use tracing::{debug, warn};

use crate::adapters::graphql::schema::{ResultItem, SearchResponse, Slot};
use crate::domain::accommodation::AccommodationType;
use crate::domain::table::ResultRow;

/// Flatten one page of result items. Yields exactly one row per item; any
/// absent or unusable nested group leaves its columns empty.
pub fn extract_rows(items: &[Slot<ResultItem>]) -> Vec<ResultRow> {
    items
        .iter()
        .map(|slot| slot.present().map_or_else(ResultRow::default, extract_row))
        .collect()
}

pub fn extract_row(item: &ResultItem) -> ResultRow {
    let name = item
        .display_name
        .present()
        .and_then(|display| display.text.present())
        .cloned();

    let (review_score, accommodation_type) = match item.basic_property_data.present() {
        Some(property) => (
            property
                .review_score
                .present()
                .and_then(|review| review.score.present())
                .cloned(),
            Some(AccommodationType::from_id(
                property.accommodation_type_id.present().copied(),
            )),
        ),
        None => (None, None),
    };

    let price = item
        .blocks
        .present()
        .and_then(|blocks| blocks.first())
        .and_then(Slot::present)
        .and_then(|block| block.final_price.present())
        .and_then(|price| price.amount.present())
        .cloned();

    ResultRow {
        name,
        review_score,
        price,
        accommodation_type,
    }
}

/// Rows of one page response, or `None` when the page carries no usable
/// results list.
pub fn extract_page(json: &Value) -> Option<Vec<ResultRow>> {
    let response = SearchResponse::from_value(json);
    let items = match response
        .search()
        .and_then(|search| search.results.require("results"))
    {
        Ok(items) => items,
        Err(e) => {
            warn!(error = %e, "Page has no results list");
            return None;
        }
    };
    let rows = extract_rows(items);
    debug!(rows = rows.len(), "Extracted page rows");
    Some(rows)
}
