use serde_json::Value;
use tracing::{debug, error, info};

use crate::adapters::graphql::query::HOTEL_FILTER_ID;
use crate::adapters::graphql::schema::{SearchOutput, SearchResponse, Slot};
use crate::domain::criteria::SearchCriteria;
use crate::error::{Result, ScrapeError};

/// Echoed location placeholder when no breadcrumb carries the entered name.
pub const NOT_MATCH: &str = "Not Match";

const DATE_FORMAT: &str = "%Y-%m-%d";

/// How the remote API reports it interpreted the query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EchoedFields {
    pub city: String,
    pub country: Option<String>,
    pub check_in: String,
    pub check_out: String,
    pub adults: u32,
    pub children: u32,
    pub rooms: u32,
    pub currency: String,
    pub property_type_only: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    pub total_count: u64,
    /// `None` when the search matched nothing and no checks ran.
    pub echoed: Option<EchoedFields>,
}

/// Read the total count from a probe response and cross-check every echoed
/// field against `criteria`, failing on the first mismatch.
pub fn validate(json: &Value, criteria: &SearchCriteria) -> Result<ValidationResult> {
    let response = SearchResponse::from_value(json);
    let search = response.search()?;

    let total_count = *search
        .pagination
        .require("pagination")?
        .nb_results_total
        .require("pagination.nbResultsTotal")?;

    if total_count == 0 {
        info!("Search matched no properties, skipping echoed field checks");
        return Ok(ValidationResult {
            total_count,
            echoed: None,
        });
    }

    let echoed = extract_echoed(search, criteria)?;
    compare(&echoed, criteria)?;
    debug!(total_count, "Echoed search parameters match the entered criteria");

    Ok(ValidationResult {
        total_count,
        echoed: Some(echoed),
    })
}

/// Collect every echoed field. Lookup failures surface before any comparison.
pub fn extract_echoed(search: &SearchOutput, criteria: &SearchCriteria) -> Result<EchoedFields> {
    let city = find_breadcrumb(search, criteria.normalized_city())?;
    let country = match criteria.country.as_deref() {
        Some(entered) => Some(find_breadcrumb(search, entered.trim())?),
        None => None,
    };

    let calendar = search
        .flexible_dates_config
        .require("flexibleDatesConfig")?
        .date_range_calendar
        .require("flexibleDatesConfig.dateRangeCalendar")?;
    let check_in = first_entry(&calendar.checkin, "dateRangeCalendar.checkin")?;
    let check_out = first_entry(&calendar.checkout, "dateRangeCalendar.checkout")?;

    let meta = search.search_meta.require("searchMeta")?;
    let adults = *meta.nb_adults.require("searchMeta.nbAdults")?;
    let children = *meta.nb_children.require("searchMeta.nbChildren")?;
    let rooms = *meta.nb_rooms.require("searchMeta.nbRooms")?;

    Ok(EchoedFields {
        city,
        country,
        check_in,
        check_out,
        adults,
        children,
        rooms,
        currency: find_currency(search)?,
        property_type_only: has_hotel_filter(search),
    })
}

/// Name of the first breadcrumb equal to `expected` ignoring case, else
/// [`NOT_MATCH`]. A missing or null breadcrumb list is malformed.
pub fn find_breadcrumb(search: &SearchOutput, expected: &str) -> Result<String> {
    let breadcrumbs = search.breadcrumbs.require("breadcrumbs")?;
    let wanted = expected.to_lowercase();
    let found = breadcrumbs
        .iter()
        .filter_map(Slot::present)
        .filter_map(|crumb| crumb.name.present())
        .find(|name| name.to_lowercase() == wanted);
    Ok(found.map_or_else(|| NOT_MATCH.to_string(), String::clone))
}

/// First price currency across all result items.
pub fn find_currency(search: &SearchOutput) -> Result<String> {
    let items = search.results.require("results")?;
    items
        .iter()
        .filter_map(Slot::present)
        .filter_map(|item| item.blocks.present())
        .flatten()
        .filter_map(Slot::present)
        .filter_map(|block| block.final_price.present())
        .find_map(|price| price.currency.present().cloned())
        .ok_or_else(|| ScrapeError::malformed("results.blocks.finalPrice.currency", "missing"))
}

/// Whether the applied filters include the hotel-only filter.
pub fn has_hotel_filter(search: &SearchOutput) -> bool {
    search
        .applied_filter_options
        .present()
        .into_iter()
        .flatten()
        .filter_map(Slot::present)
        .filter_map(|option| option.url_id.present())
        .any(|id| id == HOTEL_FILTER_ID)
}

fn first_entry(list: &Slot<Vec<Slot<String>>>, field: &str) -> Result<String> {
    let entries = list.require(field)?;
    let first = entries
        .first()
        .ok_or_else(|| ScrapeError::malformed(field, "empty"))?;
    first.require(&format!("{field}[0]")).cloned()
}

fn compare(echoed: &EchoedFields, criteria: &SearchCriteria) -> Result<()> {
    check("city", criteria.normalized_city(), echoed.city.as_str())?;
    if let (Some(entered), Some(found)) = (criteria.country.as_deref(), &echoed.country) {
        check("country", entered.trim(), found.as_str())?;
    }
    check(
        "check_in",
        &criteria.check_in.format(DATE_FORMAT).to_string(),
        &echoed.check_in,
    )?;
    check(
        "check_out",
        &criteria.check_out.format(DATE_FORMAT).to_string(),
        &echoed.check_out,
    )?;
    check("adults", &criteria.adults, &echoed.adults)?;
    check("children", &criteria.children, &echoed.children)?;
    check("rooms", &criteria.rooms, &echoed.rooms)?;
    check("currency", criteria.currency.as_str(), echoed.currency.as_str())?;
    check(
        "property_type_only",
        &criteria.property_type_only,
        &echoed.property_type_only,
    )
}

fn check<T>(field: &'static str, entered: &T, echoed: &T) -> Result<()>
where
    T: PartialEq + std::fmt::Display + ?Sized,
{
    if entered == echoed {
        return Ok(());
    }
    let err = ScrapeError::Mismatch {
        field,
        entered: entered.to_string(),
        echoed: echoed.to_string(),
    };
    error!(%err, "Echoed search parameter does not match");
    Err(err)
}
