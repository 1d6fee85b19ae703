use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ScrapeError};

/// Largest party the search form accepts.
pub const MAX_ADULTS: u32 = 30;
pub const MAX_CHILDREN: u32 = 10;
pub const MAX_ROOMS: u32 = 30;

/// User-entered parameters for one booking search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchCriteria {
    pub city: String,
    pub country: Option<String>,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub adults: u32,
    pub children: u32,
    pub rooms: u32,
    pub currency: String,
    /// Restrict results to hotel properties.
    pub property_type_only: bool,
}

impl SearchCriteria {
    /// One adult, one room, no children, hotels only.
    pub fn new(
        city: impl Into<String>,
        check_in: NaiveDate,
        check_out: NaiveDate,
        currency: impl Into<String>,
    ) -> Self {
        Self {
            city: city.into(),
            country: None,
            check_in,
            check_out,
            adults: 1,
            children: 0,
            rooms: 1,
            currency: currency.into(),
            property_type_only: true,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if normalize_city(&self.city).is_empty() {
            return Err(ScrapeError::InvalidCriteria {
                reason: "city is required".into(),
            });
        }
        if self.currency.trim().is_empty() {
            return Err(ScrapeError::InvalidCriteria {
                reason: "currency is required".into(),
            });
        }
        if self.adults == 0 {
            return Err(ScrapeError::InvalidCriteria {
                reason: "at least one adult is required".into(),
            });
        }
        if self.rooms == 0 {
            return Err(ScrapeError::InvalidCriteria {
                reason: "at least one room is required".into(),
            });
        }
        for (field, value, max) in [
            ("adults", self.adults, MAX_ADULTS),
            ("children", self.children, MAX_CHILDREN),
            ("rooms", self.rooms, MAX_ROOMS),
        ] {
            if value > max {
                return Err(ScrapeError::InvalidCriteria {
                    reason: format!("{field} must be at most {max}, got {value}"),
                });
            }
        }
        if self.check_out <= self.check_in {
            return Err(ScrapeError::InvalidCriteria {
                reason: "check-out date must be after check-in date".into(),
            });
        }
        Ok(())
    }

    pub fn normalized_city(&self) -> &str {
        normalize_city(&self.city)
    }

    /// Stable key identifying identical searches. Case is kept, since the
    /// echoed city and currency are compared case-sensitively.
    pub fn cache_key(&self) -> String {
        format!(
            "search:{}:{}:{}:{}:a{}:c{}:r{}:{}:{}",
            self.normalized_city(),
            self.country.as_deref().map_or("-", str::trim),
            self.check_in,
            self.check_out,
            self.adults,
            self.children,
            self.rooms,
            self.currency.trim(),
            if self.property_type_only { "hotels" } else { "all" },
        )
    }
}

/// Keep only the part of a city entry before the first comma, so
/// "San Francisco, CA, USA" becomes "San Francisco".
pub fn normalize_city(city: &str) -> &str {
    city.split_once(',').map_or(city, |(head, _)| head).trim()
}
