use serde::Serialize;
use serde_json::{Map, Value};

use crate::domain::criteria::SearchCriteria;

/// The `FullSearch` document. Only variables change between requests.
pub const FULL_SEARCH_QUERY: &str = include_str!("full_search.graphql");

pub const OPERATION_NAME: &str = "FullSearch";

/// Results per page, fixed by the query shape.
pub const PAGE_SIZE: u32 = 100;

/// Applied-filter id restricting results to hotel properties.
pub const HOTEL_FILTER_ID: &str = "ht_id=204";

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryPayload {
    pub operation_name: &'static str,
    pub variables: QueryVariables,
    pub extensions: Map<String, Value>,
    pub query: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryVariables {
    pub input: SearchInput,
    pub carousel_low_code_exp: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchInput {
    pub dates: StayDates,
    pub flexible_dates_config: FlexibleDatesInput,
    pub nb_rooms: u32,
    pub nb_adults: u32,
    pub nb_children: u32,
    pub children_ages: Vec<u32>,
    pub location: LocationInput,
    pub pagination: PaginationInput,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filters: Option<FiltersInput>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StayDates {
    pub checkin: String,
    pub checkout: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlexibleDatesInput {
    pub date_range_calendar: DateRangeInput,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRangeInput {
    pub checkin: Vec<String>,
    pub checkout: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationInput {
    pub search_string: String,
    pub dest_type: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationInput {
    pub rows_per_page: u32,
    pub offset: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FiltersInput {
    pub selected_filters: &'static str,
}

/// Build the `FullSearch` payload for one page.
pub fn build_query(criteria: &SearchCriteria, offset: u32) -> QueryPayload {
    let checkin = criteria.check_in.format(DATE_FORMAT).to_string();
    let checkout = criteria.check_out.format(DATE_FORMAT).to_string();

    let input = SearchInput {
        dates: StayDates {
            checkin: checkin.clone(),
            checkout: checkout.clone(),
        },
        flexible_dates_config: FlexibleDatesInput {
            date_range_calendar: DateRangeInput {
                checkin: vec![checkin],
                checkout: vec![checkout],
            },
        },
        nb_rooms: criteria.rooms,
        nb_adults: criteria.adults,
        nb_children: criteria.children,
        children_ages: vec![0; criteria.children as usize],
        location: LocationInput {
            search_string: criteria.city.clone(),
            dest_type: "CITY",
        },
        pagination: PaginationInput {
            rows_per_page: PAGE_SIZE,
            offset,
        },
        filters: criteria.property_type_only.then_some(FiltersInput {
            selected_filters: HOTEL_FILTER_ID,
        }),
    };

    QueryPayload {
        operation_name: OPERATION_NAME,
        variables: QueryVariables {
            input,
            carousel_low_code_exp: false,
        },
        extensions: Map::new(),
        query: FULL_SEARCH_QUERY,
    }
}

/// Offsets `0, 100, 200, ...` strictly below `total`.
pub fn page_offsets(total: u64) -> impl Iterator<Item = u32> {
    let end = u32::try_from(total).unwrap_or(u32::MAX);
    (0..end).step_by(PAGE_SIZE as usize)
}
