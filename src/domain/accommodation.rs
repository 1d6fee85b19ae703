use std::fmt;

use serde::{Deserialize, Serialize};

/// Accommodation category reported by the search API as a numeric id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccommodationType {
    #[serde(rename = "Hotels")]
    Hotels,
    #[serde(rename = "Apartments")]
    Apartments,
    #[serde(rename = "Villas")]
    Villas,
    #[serde(rename = "Guesthouses")]
    Guesthouses,
    #[serde(rename = "Hostels")]
    Hostels,
    #[serde(rename = "Entire homes & apartments")]
    EntireHomes,
    #[serde(rename = "Other")]
    Other,
}

impl AccommodationType {
    /// Total mapping: unknown or missing ids are `Other`.
    pub fn from_id(id: Option<i64>) -> Self {
        match id {
            Some(204) => Self::Hotels,
            Some(201) => Self::Apartments,
            Some(213) => Self::Villas,
            Some(216) => Self::Guesthouses,
            Some(203) => Self::Hostels,
            Some(219) => Self::EntireHomes,
            _ => Self::Other,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Hotels => "Hotels",
            Self::Apartments => "Apartments",
            Self::Villas => "Villas",
            Self::Guesthouses => "Guesthouses",
            Self::Hostels => "Hostels",
            Self::EntireHomes => "Entire homes & apartments",
            Self::Other => "Other",
        }
    }
}

impl fmt::Display for AccommodationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
