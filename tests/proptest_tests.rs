#![allow(clippy::cast_possible_truncation)]

use std::collections::HashSet;

use chrono::{NaiveDate, TimeZone, Utc};
use proptest::prelude::*;
use serde_json::{Value, json};

use booking_scout::adapters::graphql::parsers::items::extract_page;
use booking_scout::adapters::graphql::query::{PAGE_SIZE, page_offsets};
use booking_scout::domain::accommodation::AccommodationType;
use booking_scout::domain::cleaning::{assemble, clean_at};
use booking_scout::domain::criteria::SearchCriteria;
use booking_scout::domain::table::{ResultRow, Scalar, Table};

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

/// A JSON value standing in for one result item, from well formed down to
/// garbage that is not even an object.
fn arb_item_json() -> impl Strategy<Value = Value> {
    prop_oneof![
        (
            "[A-Za-z ]{1,12}",
            prop::option::of(-2.0..10.0_f64),
            prop::option::of(-50.0..900.0_f64),
            prop::option::of(190..230_i64),
        )
            .prop_map(|(name, review, price, type_id)| json!({
                "displayName": {"text": name},
                "basicPropertyData": {
                    "accommodationTypeId": type_id,
                    "reviewScore": {"score": review}
                },
                "blocks": [{"finalPrice": {"amount": price, "currency": "EUR"}}]
            })),
        Just(Value::Null),
        Just(json!({})),
        Just(json!({"displayName": null, "blocks": []})),
        Just(json!({"basicPropertyData": "unexpected"})),
        any::<i64>().prop_map(Value::from),
        "[a-z]{0,8}".prop_map(Value::from),
    ]
}

fn arb_scalar() -> impl Strategy<Value = Scalar> {
    prop_oneof![
        (-100.0..1000.0_f64).prop_map(Scalar::Number),
        (-100.0..1000.0_f64).prop_map(|n| Scalar::Text(format!("{n}"))),
        "[a-z]{0,4}".prop_map(Scalar::Text),
    ]
}

fn arb_row() -> impl Strategy<Value = ResultRow> {
    (
        prop::option::of("Hotel [A-E]"),
        prop::option::of(arb_scalar()),
        prop::option::of(arb_scalar()),
        prop::option::of(any::<i64>()),
    )
        .prop_map(|(name, review_score, price, type_id)| ResultRow {
            name,
            review_score,
            price,
            accommodation_type: type_id.map(|id| AccommodationType::from_id(Some(id))),
        })
}

fn arb_table() -> impl Strategy<Value = Table> {
    prop::collection::vec(prop::collection::vec(arb_row(), 0..20), 0..5).prop_map(assemble)
}

fn criteria() -> SearchCriteria {
    SearchCriteria::new(
        "Vienna, Austria",
        NaiveDate::from_ymd_opt(2025, 11, 3).unwrap(),
        NaiveDate::from_ymd_opt(2025, 11, 6).unwrap(),
        "EUR",
    )
}

// ---------------------------------------------------------------------------
// Extraction
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn extract_page_yields_one_row_per_item(items in prop::collection::vec(arb_item_json(), 0..40)) {
        let page = json!({"data": {"searchQueries": {"search": {"results": items}}}});
        let rows = extract_page(&page).unwrap();
        prop_assert_eq!(rows.len(), items.len());
    }

    #[test]
    fn accommodation_mapping_is_total(id in prop::option::of(any::<i64>())) {
        let ty = AccommodationType::from_id(id);
        let known = [204, 201, 213, 216, 203, 219];
        match id {
            Some(id) if known.contains(&id) => prop_assert_ne!(ty, AccommodationType::Other),
            _ => prop_assert_eq!(ty, AccommodationType::Other),
        }
    }
}

// ---------------------------------------------------------------------------
// Cleaning
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn cleaned_names_are_unique(table in arb_table()) {
        let cleaned = clean_at(table, &criteria(), Utc::now());
        let mut seen = HashSet::new();
        for record in &cleaned.records {
            prop_assert!(seen.insert(record.hotel_name.clone()));
        }
    }

    #[test]
    fn cleaned_values_are_positive_and_ratio_exact(table in arb_table()) {
        let cleaned = clean_at(table, &criteria(), Utc::now());
        for record in &cleaned.records {
            prop_assert!(record.price > 0.0);
            prop_assert!(record.review_score > 0.0);
            prop_assert_eq!(record.price_per_review, record.price / record.review_score);
            prop_assert_eq!(record.city.as_str(), "Vienna");
        }
    }

    #[test]
    fn cleaning_never_grows_the_table(table in arb_table()) {
        let input = table.len();
        let cleaned = clean_at(table, &criteria(), Utc::now());
        prop_assert!(cleaned.len() <= input);
    }

    #[test]
    fn cleaning_is_idempotent(table in arb_table()) {
        let as_of = Utc.with_ymd_and_hms(2025, 10, 1, 8, 0, 0).unwrap();
        let once = clean_at(table, &criteria(), as_of);
        let twice = clean_at(Table::from(&once), &criteria(), as_of);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn ranking_is_sorted_by_ratio(table in arb_table()) {
        let cleaned = clean_at(table, &criteria(), Utc::now());
        let ranked = cleaned.ranked();
        prop_assert_eq!(ranked.len(), cleaned.len());
        for pair in ranked.windows(2) {
            prop_assert!(pair[0].price_per_review <= pair[1].price_per_review);
        }
    }
}

// ---------------------------------------------------------------------------
// Pagination
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn page_offsets_cover_total(total in 0..5000_u64) {
        let offsets: Vec<u32> = page_offsets(total).collect();
        prop_assert_eq!(offsets.len() as u64, total.div_ceil(u64::from(PAGE_SIZE)));
        for (i, offset) in offsets.iter().enumerate() {
            prop_assert_eq!(*offset, i as u32 * PAGE_SIZE);
            prop_assert!(u64::from(*offset) < total);
        }
    }
}
