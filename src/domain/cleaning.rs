use std::collections::HashSet;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use super::criteria::SearchCriteria;
use super::table::{HotelRecord, ResultRow, ResultTable, Scalar, Table};

/// Concatenate per-page batches in encounter order.
pub fn assemble(batches: Vec<Vec<ResultRow>>) -> Table {
    let rows: Vec<ResultRow> = batches.into_iter().flatten().collect();
    if rows.is_empty() {
        warn!("No rows to assemble, no data was scraped");
    } else {
        debug!(rows = rows.len(), "Assembled result table");
    }
    Table { rows }
}

/// Clean a raw table, stamping every record with the current time.
pub fn clean(table: Table, criteria: &SearchCriteria) -> ResultTable {
    clean_at(table, criteria, Utc::now())
}

/// Clean a raw table into ranked-ready records.
///
/// Stages, in order: attach city and dates, dedupe by name (first wins),
/// coerce price and review score to numbers, drop rows missing name, price
/// or review score, drop rows whose price or review score is not positive,
/// and compute `price_per_review`.
pub fn clean_at(table: Table, criteria: &SearchCriteria, as_of: DateTime<Utc>) -> ResultTable {
    if table.is_empty() {
        warn!("Table is empty, nothing to clean");
        return ResultTable::default();
    }

    let input_rows = table.len();
    let city = criteria.normalized_city().to_string();

    let mut seen: HashSet<String> = HashSet::new();
    let deduped: Vec<ResultRow> = table
        .rows
        .into_iter()
        .filter(|row| match &row.name {
            Some(name) => seen.insert(name.clone()),
            None => true,
        })
        .collect();
    let after_dedupe = deduped.len();

    let records: Vec<HotelRecord> = deduped
        .into_iter()
        .filter_map(|row| {
            let hotel_name = row.name?;
            let price = row.price.as_ref().and_then(Scalar::to_f64)?;
            let review_score = row.review_score.as_ref().and_then(Scalar::to_f64)?;
            if price <= 0.0 || review_score <= 0.0 {
                return None;
            }
            Some(HotelRecord {
                hotel_name,
                price,
                review_score,
                price_per_review: price / review_score,
                check_in: criteria.check_in,
                check_out: criteria.check_out,
                as_of,
                city: city.clone(),
                accommodation_type: row.accommodation_type,
            })
        })
        .collect();

    info!(
        input_rows,
        duplicates = input_rows - after_dedupe,
        dropped = after_dedupe - records.len(),
        kept = records.len(),
        "Cleaned result table"
    );

    ResultTable { records }
}
