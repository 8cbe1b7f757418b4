pub mod labels;
pub mod location;
pub mod raw;
pub mod roommates;

pub use labels::Labels;
pub use location::{Coordinates, Location};
pub use raw::RawApartment;
pub use roommates::Roommate;

use crate::error::ParseError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Listing identifier. Displays as the stringified id used to key the entity map.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct ApartmentId(pub i64);

impl fmt::Display for ApartmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ApartmentId {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse()
            .map(ApartmentId)
            .map_err(|_| ParseError::Number(s.to_string()))
    }
}

impl From<i64> for ApartmentId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// The numeric listing discriminator.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ApartmentType {
    Rental = 0,
    Shared = 1,
    Sublet = 2,
}

impl ApartmentType {
    pub fn code(self) -> i64 {
        self as i64
    }
}

impl TryFrom<i64> for ApartmentType {
    type Error = ParseError;

    fn try_from(code: i64) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Self::Rental),
            1 => Ok(Self::Shared),
            2 => Ok(Self::Sublet),
            other => Err(ParseError::ApartmentType(other)),
        }
    }
}

impl FromStr for ApartmentType {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "rental" => Ok(Self::Rental),
            "shared" => Ok(Self::Shared),
            "sublet" => Ok(Self::Sublet),
            other => other
                .parse::<i64>()
                .map_err(|_| ParseError::Number(s.to_string()))
                .and_then(Self::try_from),
        }
    }
}

/// Fields that only exist for one kind of listing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ApartmentKind {
    Rental {
        contract_length_months: Option<u32>,
        extension_possible: bool,
    },
    Shared {
        number_of_roommates: Option<u32>,
        roommates: Vec<Roommate>,
    },
    Sublet {
        can_cancel_without_penalty: bool,
        is_whole_property: bool,
    },
}

impl ApartmentKind {
    pub fn apartment_type(&self) -> ApartmentType {
        match self {
            Self::Rental { .. } => ApartmentType::Rental,
            Self::Shared { .. } => ApartmentType::Shared,
            Self::Sublet { .. } => ApartmentType::Sublet,
        }
    }
}

impl Default for ApartmentKind {
    fn default() -> Self {
        Self::Rental {
            contract_length_months: None,
            extension_possible: false,
        }
    }
}

/// Who published the listing
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Creator {
    pub id: Option<i64>,
    pub full_name: String,
    pub avatar_url: Option<String>,
}

/// Core listing data model
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Apartment {
    pub id: ApartmentId,
    pub creator: Creator,
    pub kind: ApartmentKind,
    pub location: Location,
    pub description: String,
    pub price: i64,
    pub rooms: f32,
    pub allow_pet: bool,
    pub allow_smoking: bool,
    pub parking_spaces: u32,
    pub entry_date: Option<NaiveDate>,
    pub exit_date: Option<NaiveDate>,
    pub labels: Labels,
    pub num_of_likes: u32,
    pub is_liked_by_user: bool,
}

impl Apartment {
    /// An empty record for `id`; the starting point when a patch arrives for
    /// an id the store has never seen.
    pub fn placeholder(id: ApartmentId) -> Self {
        Self {
            id,
            creator: Creator::default(),
            kind: ApartmentKind::default(),
            location: Location::default(),
            description: String::new(),
            price: 0,
            rooms: 0.0,
            allow_pet: false,
            allow_smoking: false,
            parking_spaces: 0,
            entry_date: None,
            exit_date: None,
            labels: Labels::default(),
            num_of_likes: 0,
            is_liked_by_user: false,
        }
    }

    pub fn apartment_type(&self) -> ApartmentType {
        self.kind.apartment_type()
    }

    pub fn roommates(&self) -> &[Roommate] {
        match &self.kind {
            ApartmentKind::Shared { roommates, .. } => roommates,
            _ => &[],
        }
    }

    /// Shallow merge: every field present on the patch overwrites, the rest stay.
    pub fn merge(&mut self, patch: ApartmentPatch) {
        debug_assert_eq!(self.id, patch.id);
        let ApartmentPatch {
            id: _,
            creator,
            kind,
            location,
            description,
            price,
            rooms,
            allow_pet,
            allow_smoking,
            parking_spaces,
            entry_date,
            exit_date,
            labels,
            num_of_likes,
            is_liked_by_user,
        } = patch;

        if let Some(v) = creator {
            self.creator = v;
        }
        if let Some(v) = kind {
            self.kind = v;
        }
        if let Some(v) = location {
            self.location = v;
        }
        if let Some(v) = description {
            self.description = v;
        }
        if let Some(v) = price {
            self.price = v;
        }
        if let Some(v) = rooms {
            self.rooms = v;
        }
        if let Some(v) = allow_pet {
            self.allow_pet = v;
        }
        if let Some(v) = allow_smoking {
            self.allow_smoking = v;
        }
        if let Some(v) = parking_spaces {
            self.parking_spaces = v;
        }
        if let Some(v) = entry_date {
            self.entry_date = v;
        }
        if let Some(v) = exit_date {
            self.exit_date = v;
        }
        if let Some(v) = labels {
            self.labels = v;
        }
        if let Some(v) = num_of_likes {
            self.num_of_likes = v;
        }
        if let Some(v) = is_liked_by_user {
            self.is_liked_by_user = v;
        }
    }
}

/// A partial listing: `None` means "leave as is" when upserted.
///
/// Nullable columns use `Option<Option<_>>` so a patch can clear them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApartmentPatch {
    pub id: ApartmentId,
    pub creator: Option<Creator>,
    pub kind: Option<ApartmentKind>,
    pub location: Option<Location>,
    pub description: Option<String>,
    pub price: Option<i64>,
    pub rooms: Option<f32>,
    pub allow_pet: Option<bool>,
    pub allow_smoking: Option<bool>,
    pub parking_spaces: Option<u32>,
    pub entry_date: Option<Option<NaiveDate>>,
    pub exit_date: Option<Option<NaiveDate>>,
    pub labels: Option<Labels>,
    pub num_of_likes: Option<u32>,
    pub is_liked_by_user: Option<bool>,
}

impl ApartmentPatch {
    pub fn new(id: impl Into<ApartmentId>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    /// Build a full record, starting from [`Apartment::placeholder`].
    pub fn into_apartment(self) -> Apartment {
        let mut apartment = Apartment::placeholder(self.id);
        apartment.merge(self);
        apartment
    }
}

impl From<Apartment> for ApartmentPatch {
    fn from(a: Apartment) -> Self {
        Self {
            id: a.id,
            creator: Some(a.creator),
            kind: Some(a.kind),
            location: Some(a.location),
            description: Some(a.description),
            price: Some(a.price),
            rooms: Some(a.rooms),
            allow_pet: Some(a.allow_pet),
            allow_smoking: Some(a.allow_smoking),
            parking_spaces: Some(a.parking_spaces),
            entry_date: Some(a.entry_date),
            exit_date: Some(a.exit_date),
            labels: Some(a.labels),
            num_of_likes: Some(a.num_of_likes),
            is_liked_by_user: Some(a.is_liked_by_user),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full(id: i64) -> Apartment {
        Apartment {
            creator: Creator {
                id: Some(7),
                full_name: "Noa Levi".to_string(),
                avatar_url: None,
            },
            kind: ApartmentKind::Sublet {
                can_cancel_without_penalty: true,
                is_whole_property: false,
            },
            location: Location::from_address("Allenby 10, Tel Aviv"),
            description: "Sunny".to_string(),
            price: 5200,
            rooms: 2.5,
            exit_date: NaiveDate::from_ymd_opt(2025, 1, 1),
            num_of_likes: 4,
            ..Apartment::placeholder(ApartmentId(id))
        }
    }

    #[test]
    fn merge_keeps_untouched_fields() {
        let mut a = full(1);
        let before = a.clone();
        a.merge(ApartmentPatch {
            price: Some(99),
            ..ApartmentPatch::new(1)
        });
        assert_eq!(a.price, 99);
        assert_eq!(Apartment { price: before.price, ..a.clone() }, before);
    }

    #[test]
    fn merge_can_clear_nullable_dates() {
        let mut a = full(1);
        a.merge(ApartmentPatch {
            exit_date: Some(None),
            ..ApartmentPatch::new(1)
        });
        assert_eq!(a.exit_date, None);
    }

    #[test]
    fn full_patch_round_trips() {
        let a = full(3);
        assert_eq!(ApartmentPatch::from(a.clone()).into_apartment(), a);
    }

    #[test]
    fn apartment_type_codes() {
        assert_eq!(ApartmentType::try_from(1).unwrap(), ApartmentType::Shared);
        assert_eq!(ApartmentType::Sublet.code(), 2);
        assert_eq!("shared".parse::<ApartmentType>().unwrap(), ApartmentType::Shared);
        assert_eq!("0".parse::<ApartmentType>().unwrap(), ApartmentType::Rental);
        assert!(ApartmentType::try_from(5).is_err());
        assert_eq!(full(1).apartment_type(), ApartmentType::Sublet);
    }

    #[test]
    fn id_displays_as_key() {
        assert_eq!(ApartmentId(42).to_string(), "42");
        assert_eq!("42".parse::<ApartmentId>().unwrap(), ApartmentId(42));
        assert!("x".parse::<ApartmentId>().is_err());
    }
}
