#![no_main]
use booking_scout::domain::criteria::SearchCriteria;
use chrono::NaiveDate;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(json) = serde_json::from_slice::<serde_json::Value>(data) {
        let (Some(check_in), Some(check_out)) = (
            NaiveDate::from_ymd_opt(2025, 6, 1),
            NaiveDate::from_ymd_opt(2025, 6, 5),
        ) else {
            return;
        };
        let criteria = SearchCriteria::new("Paris", check_in, check_out, "EUR");
        let _ = booking_scout::adapters::graphql::parsers::validate::validate(&json, &criteria);
    }
});
