use crate::error::ParseError;
use crate::models::raw::{lenient, parse_date};
use crate::models::{ApartmentId, ApartmentType};
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Search filters shared by the search pager, the map view and the backend.
///
/// Every present filter must hold for a listing to match.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SearchFilters {
    /// Inclusive lower price bound
    #[serde(default, deserialize_with = "lenient::opt_i64")]
    pub min_price: Option<i64>,
    /// Inclusive upper price bound
    #[serde(default, deserialize_with = "lenient::opt_i64")]
    pub max_price: Option<i64>,
    #[serde(default, deserialize_with = "opt_apartment_type")]
    pub apartment_type: Option<ApartmentType>,
    /// Earliest acceptable entry date. Unparseable input leaves it unset.
    #[serde(default, deserialize_with = "opt_date")]
    pub entry_date: Option<NaiveDate>,
    /// Roommate genders, any of which satisfies a shared listing
    #[serde(default)]
    pub genders: Vec<String>,
    /// Labels that must all be present
    #[serde(default)]
    pub features: Vec<String>,
    /// Free text over description, address and publisher name
    #[serde(default)]
    pub query_text: Option<String>,
}

fn opt_apartment_type<'de, D: Deserializer<'de>>(d: D) -> Result<Option<ApartmentType>, D::Error> {
    Ok(match Option::<Value>::deserialize(d)? {
        Some(Value::String(s)) => s.parse().ok(),
        Some(other) => lenient::as_i64(&other).and_then(|code| ApartmentType::try_from(code).ok()),
        None => None,
    })
}

fn opt_date<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveDate>, D::Error> {
    Ok(Option::<String>::deserialize(d)?
        .as_deref()
        .and_then(parse_date))
}

/// Opaque resume position in the like-ordered feed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(try_from = "String", into = "String")]
pub struct Cursor(usize);

impl Cursor {
    pub fn from_offset(offset: usize) -> Self {
        Self(offset)
    }

    pub fn offset(&self) -> usize {
        self.0
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Cursor {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse()
            .map(Cursor)
            .map_err(|_| ParseError::Number(s.to_string()))
    }
}

impl TryFrom<String> for Cursor {
    type Error = ParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Cursor> for String {
    fn from(c: Cursor) -> Self {
        c.to_string()
    }
}

/// Geographic viewport of the map screen
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct MapBounds {
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
}

/// One page of the like-ordered feed
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeedPage {
    pub ids: Vec<ApartmentId>,
    /// `None` once the end of the feed has been reached
    pub next_cursor: Option<Cursor>,
}

/// One page of search results, with the size of the whole result set
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchPage {
    pub ids: Vec<ApartmentId>,
    pub total: usize,
}
