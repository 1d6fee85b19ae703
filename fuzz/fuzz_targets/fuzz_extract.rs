#![no_main]
use booking_scout::adapters::graphql::parsers::items::extract_page;
use booking_scout::domain::cleaning::{assemble, clean};
use booking_scout::domain::criteria::SearchCriteria;
use chrono::NaiveDate;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(json) = serde_json::from_slice::<serde_json::Value>(data) {
        if let Some(rows) = extract_page(&json) {
            let criteria = SearchCriteria::new("Paris", NaiveDate::MIN, NaiveDate::MAX, "EUR");
            let _ = clean(assemble(vec![rows]), &criteria);
        }
    }
});
