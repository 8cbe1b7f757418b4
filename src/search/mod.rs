//! Listing predicates and orderings.
//!
//! The search pager, the map view, the mock backend and the home screen's
//! inline filter ([`local::LocalSearch`]) all match listings through the
//! functions here.

pub mod local;

pub use local::{ListingFilters, LocalSearch, MatchStrategy};

use crate::models::{Apartment, ApartmentType};
use crate::source::SearchFilters;
use chrono::NaiveDate;
use std::cmp::Ordering;

pub fn price_in_range(apartment: &Apartment, min: Option<i64>, max: Option<i64>) -> bool {
    min.map_or(true, |min| apartment.price >= min) && max.map_or(true, |max| apartment.price <= max)
}

pub fn type_matches(apartment: &Apartment, wanted: Option<ApartmentType>) -> bool {
    wanted.map_or(true, |t| apartment.apartment_type() == t)
}

/// The listing must be enterable on or after `earliest`; listings without an
/// entry date never satisfy a date filter.
pub fn entry_date_matches(apartment: &Apartment, earliest: Option<NaiveDate>) -> bool {
    match earliest {
        Some(earliest) => apartment.entry_date.is_some_and(|d| d >= earliest),
        None => true,
    }
}

/// Only shared listings with roommates are constrained: one of them must have
/// one of the requested genders. Roommates of unknown gender never match.
pub fn gender_matches(apartment: &Apartment, genders: &[String]) -> bool {
    let roommates = apartment.roommates();
    if genders.is_empty() || roommates.is_empty() {
        return true;
    }
    roommates
        .iter()
        .any(|r| genders.iter().any(|g| r.has_gender(g)))
}

pub fn features_match(apartment: &Apartment, features: &[String]) -> bool {
    apartment.labels.contains_all(features)
}

pub fn text_matches(apartment: &Apartment, query: Option<&str>) -> bool {
    let query = match query.map(str::trim) {
        Some(q) if !q.is_empty() => q.to_lowercase(),
        _ => return true,
    };
    let haystack = [
        apartment.description.as_str(),
        apartment.location.address.as_str(),
        apartment.creator.full_name.as_str(),
    ]
    .concat()
    .to_lowercase();
    haystack.contains(&query)
}

impl SearchFilters {
    pub fn matches(&self, apartment: &Apartment) -> bool {
        price_in_range(apartment, self.min_price, self.max_price)
            && type_matches(apartment, self.apartment_type)
            && entry_date_matches(apartment, self.entry_date)
            && gender_matches(apartment, &self.genders)
            && features_match(apartment, &self.features)
            && text_matches(apartment, self.query_text.as_deref())
    }
}

/// Search ordering: likes (desc), then price (desc).
pub fn by_popularity(a: &Apartment, b: &Apartment) -> Ordering {
    b.num_of_likes
        .cmp(&a.num_of_likes)
        .then_with(|| b.price.cmp(&a.price))
}

/// Feed ordering: likes (desc), then id (asc). Total, so cursors stay stable.
pub fn by_likes_then_id(a: &Apartment, b: &Apartment) -> Ordering {
    b.num_of_likes.cmp(&a.num_of_likes).then_with(|| a.id.cmp(&b.id))
}

/// Every listing matching `filters`, in search order.
pub fn filter_sorted<'a, I>(apartments: I, filters: &SearchFilters) -> Vec<&'a Apartment>
where
    I: IntoIterator<Item = &'a Apartment>,
{
    let mut matched: Vec<&Apartment> = apartments
        .into_iter()
        .filter(|a| filters.matches(a))
        .collect();
    matched.sort_by(|a, b| by_popularity(a, b));
    matched
}
