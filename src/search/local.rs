//! The home screen's inline filter bar, applied to listings already on hand.

use super::{features_match, gender_matches, price_in_range, type_matches};
use crate::models::raw::{lenient, parse_date};
use crate::models::{Apartment, ApartmentType, Location};
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

/// Listings within this distance of a street-level location match it.
pub const STREET_RADIUS_M: f64 = 500.0;

/// How a selected location is compared to listing addresses, chosen from the
/// location's geocoding types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchStrategy {
    Country,
    Locality,
    Sublocality,
    Street,
}

impl MatchStrategy {
    pub fn for_types(types: &[String]) -> Self {
        let has = |pred: &dyn Fn(&str) -> bool| types.iter().any(|t| pred(t.as_str()));

        if has(&|t| matches!(t, "street_address" | "route" | "premise" | "subpremise" | "establishment")) {
            Self::Street
        } else if has(&|t| t.starts_with("sublocality") || t == "neighborhood") {
            Self::Sublocality
        } else if has(&|t| t == "locality") {
            Self::Locality
        } else if has(&|t| t == "country") {
            Self::Country
        } else {
            Self::Street
        }
    }
}

/// The free-form part of the filter bar
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ListingFilters {
    #[serde(default, deserialize_with = "opt_date")]
    pub available_from: Option<NaiveDate>,
    #[serde(default, deserialize_with = "opt_date")]
    pub available_to: Option<NaiveDate>,
    /// Preferred roommate gender for shared listings
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_bool")]
    pub allow_pet: Option<bool>,
    #[serde(default, deserialize_with = "lenient::opt_bool")]
    pub allow_smoking: Option<bool>,
    #[serde(default, deserialize_with = "lenient::opt_bool")]
    pub parking: Option<bool>,
    #[serde(default)]
    pub labels: Vec<String>,
}

fn opt_date<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveDate>, D::Error> {
    Ok(Option::<String>::deserialize(d)?
        .as_deref()
        .and_then(parse_date))
}

impl ListingFilters {
    /// Overlap of `[entry, exit]` with the requested window. Open ends match.
    fn available(&self, apartment: &Apartment) -> bool {
        let starts_in_time = match (self.available_to, apartment.entry_date) {
            (Some(to), Some(entry)) => entry <= to,
            _ => true,
        };
        let lasts_long_enough = match (self.available_from, apartment.exit_date) {
            (Some(from), Some(exit)) => exit >= from,
            _ => true,
        };
        starts_in_time && lasts_long_enough
    }

    /// Toggles only constrain when switched on.
    fn amenities(&self, apartment: &Apartment) -> bool {
        (self.allow_pet != Some(true) || apartment.allow_pet)
            && (self.allow_smoking != Some(true) || apartment.allow_smoking)
            && (self.parking != Some(true) || apartment.parking_spaces > 0)
    }

    pub fn matches(&self, apartment: &Apartment) -> bool {
        let gender = self
            .gender
            .as_deref()
            .map(str::trim)
            .filter(|g| !g.is_empty())
            .map(|g| vec![g.to_string()])
            .unwrap_or_default();

        self.available(apartment)
            && gender_matches(apartment, &gender)
            && self.amenities(apartment)
            && features_match(apartment, &self.labels)
    }
}

/// Filter bar state: type chips, location box, price slider and the
/// advanced filter sheet.
#[derive(Debug, Clone, Default)]
pub struct LocalSearch {
    pub selected_type: Option<ApartmentType>,
    pub selected_location: Option<Location>,
    pub price_range: Option<(i64, i64)>,
    pub filters: ListingFilters,
}

impl LocalSearch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_type(&mut self, apartment_type: Option<ApartmentType>) {
        self.selected_type = apartment_type;
    }

    pub fn set_location(&mut self, location: Option<Location>) {
        self.selected_location = location;
    }

    pub fn set_price_range(&mut self, range: Option<(i64, i64)>) {
        self.price_range = range;
    }

    pub fn set_filters(&mut self, filters: ListingFilters) {
        self.filters = filters;
    }

    /// Replace the advanced filters from the sheet's JSON payload.
    pub fn set_filters_json(&mut self, json: &str) -> Result<(), serde_json::Error> {
        self.filters = serde_json::from_str(json)?;
        Ok(())
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Listings that pass every active control, in input order.
    pub fn apply<'a>(&self, apartments: &'a [Apartment]) -> Vec<&'a Apartment> {
        apartments.iter().filter(|a| self.matches(a)).collect()
    }

    pub fn matches(&self, apartment: &Apartment) -> bool {
        let (min, max) = match self.price_range {
            Some((min, max)) => (Some(min), Some(max)),
            None => (None, None),
        };

        type_matches(apartment, self.selected_type)
            && price_in_range(apartment, min, max)
            && self
                .selected_location
                .as_ref()
                .map_or(true, |loc| location_matches(apartment, loc))
            && self.filters.matches(apartment)
    }
}

fn normalize(address: &str) -> String {
    address
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn location_matches(apartment: &Apartment, wanted: &Location) -> bool {
    let address = normalize(&apartment.location.address);
    let component = normalize(wanted.primary_component());
    if component.is_empty() {
        return true;
    }

    match MatchStrategy::for_types(&wanted.types) {
        MatchStrategy::Country | MatchStrategy::Locality | MatchStrategy::Sublocality => {
            address.contains(&component)
        }
        MatchStrategy::Street => match (apartment.location.coordinates, wanted.coordinates) {
            (Some(here), Some(there)) => here.distance_m(&there) < STREET_RADIUS_M,
            _ => address == normalize(&wanted.address) || address.contains(&component),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ApartmentId, Coordinates};

    fn at(id: i64, address: &str, coords: Option<(f64, f64)>) -> Apartment {
        Apartment {
            location: Location {
                address: address.to_string(),
                coordinates: coords.map(|(lat, lon)| Coordinates::new(lat, lon)),
                types: vec![],
            },
            ..Apartment::placeholder(ApartmentId(id))
        }
    }

    fn query(address: &str, types: &[&str], coords: Option<(f64, f64)>) -> Location {
        Location {
            address: address.to_string(),
            coordinates: coords.map(|(lat, lon)| Coordinates::new(lat, lon)),
            types: types.iter().map(|t| t.to_string()).collect(),
        }
    }

    #[test]
    fn strategy_from_geocoding_types() {
        let t = |v: &[&str]| v.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        assert_eq!(MatchStrategy::for_types(&t(&["country", "political"])), MatchStrategy::Country);
        assert_eq!(MatchStrategy::for_types(&t(&["locality", "political"])), MatchStrategy::Locality);
        assert_eq!(
            MatchStrategy::for_types(&t(&["sublocality_level_1", "political"])),
            MatchStrategy::Sublocality
        );
        assert_eq!(MatchStrategy::for_types(&t(&["route"])), MatchStrategy::Street);
        assert_eq!(MatchStrategy::for_types(&[]), MatchStrategy::Street);
    }

    #[test]
    fn locality_matches_by_address_component() {
        let a = at(1, "Dizengoff 50, Tel Aviv, Israel", None);
        let b = at(2, "Herzl 3, Haifa, Israel", None);
        let tel_aviv = query("Tel Aviv, Israel", &["locality"], None);
        assert!(location_matches(&a, &tel_aviv));
        assert!(!location_matches(&b, &tel_aviv));

        let israel = query("Israel", &["country"], None);
        assert!(location_matches(&a, &israel));
        assert!(location_matches(&b, &israel));
    }

    #[test]
    fn street_level_uses_distance_when_coordinates_exist() {
        let near = at(1, "Somewhere 1", Some((32.0800, 34.7800)));
        let far = at(2, "Somewhere 2", Some((32.1000, 34.7800)));
        let street = query("Dizengoff 100, Tel Aviv", &["street_address"], Some((32.0810, 34.7800)));
        assert!(location_matches(&near, &street));
        assert!(!location_matches(&far, &street));

        let no_coords = at(3, "Dizengoff  100, Tel Aviv", None);
        assert!(location_matches(&no_coords, &street));
    }

    #[test]
    fn availability_window_overlap() {
        let mut a = Apartment::placeholder(ApartmentId(1));
        a.entry_date = NaiveDate::from_ymd_opt(2024, 9, 1);
        a.exit_date = NaiveDate::from_ymd_opt(2024, 12, 31);

        let window = |from: (i32, u32, u32), to: (i32, u32, u32)| ListingFilters {
            available_from: NaiveDate::from_ymd_opt(from.0, from.1, from.2),
            available_to: NaiveDate::from_ymd_opt(to.0, to.1, to.2),
            ..Default::default()
        };
        assert!(window((2024, 10, 1), (2024, 11, 1)).matches(&a));
        assert!(window((2024, 8, 1), (2024, 9, 1)).matches(&a));
        assert!(!window((2024, 6, 1), (2024, 8, 31)).matches(&a));
        assert!(!window((2025, 1, 1), (2025, 2, 1)).matches(&a));

        a.exit_date = None;
        assert!(window((2025, 1, 1), (2025, 2, 1)).matches(&a));
    }

    #[test]
    fn combined_controls() {
        let mut pet_friendly = at(1, "A 1, Tel Aviv", None);
        pet_friendly.allow_pet = true;
        pet_friendly.price = 5000;
        let mut no_pets = at(2, "B 2, Tel Aviv", None);
        no_pets.price = 5000;
        let mut pricey = at(3, "C 3, Tel Aviv", None);
        pricey.allow_pet = true;
        pricey.price = 9000;
        let listings = vec![pet_friendly, no_pets, pricey];

        let mut search = LocalSearch::new();
        search.set_type(Some(ApartmentType::Rental));
        search.set_price_range(Some((4000, 6000)));
        search
            .set_filters_json(r#"{"allowPet": true, "allowSmoking": false}"#)
            .unwrap();

        let ids: Vec<_> = search.apply(&listings).iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![ApartmentId(1)]);

        search.clear();
        assert_eq!(search.apply(&listings).len(), 3);

        search.set_type(Some(ApartmentType::Shared));
        assert!(search.apply(&listings).is_empty());
    }

    #[test]
    fn gender_preference_and_labels() {
        use crate::models::{ApartmentKind, Roommate};

        let shared = |id: i64, roommates: &str, tags: &[&str]| Apartment {
            kind: ApartmentKind::Shared {
                number_of_roommates: None,
                roommates: Roommate::parse_list(roommates),
            },
            labels: tags.iter().copied().collect(),
            ..Apartment::placeholder(ApartmentId(id))
        };
        let listings = vec![
            shared(1, "name:Dana,gender:female", &["balcony", "elevator"]),
            shared(2, "name:Omer,gender:male", &["balcony"]),
            shared(3, "name:Noa,gender:Female", &["elevator"]),
            Apartment {
                labels: ["Balcony"].into_iter().collect(),
                ..Apartment::placeholder(ApartmentId(4))
            },
        ];
        let matched = |search: &LocalSearch| -> Vec<ApartmentId> {
            search.apply(&listings).iter().map(|a| a.id).collect()
        };

        let mut search = LocalSearch::new();
        search.set_filters_json(r#"{"gender": "female"}"#).unwrap();
        assert_eq!(matched(&search), vec![ApartmentId(1), ApartmentId(3), ApartmentId(4)]);

        search
            .set_filters_json(r#"{"gender": "female", "labels": ["balcony"]}"#)
            .unwrap();
        assert_eq!(matched(&search), vec![ApartmentId(1), ApartmentId(4)]);

        search
            .set_filters_json(r#"{"labels": ["balcony", "elevator"]}"#)
            .unwrap();
        assert_eq!(matched(&search), vec![ApartmentId(1)]);

        search.set_filters_json(r#"{"gender": "  "}"#).unwrap();
        assert_eq!(matched(&search).len(), 4);
    }

    #[test]
    fn bad_filter_json_is_reported() {
        let mut search = LocalSearch::new();
        assert!(search.set_filters_json("{not json").is_err());
    }
}
