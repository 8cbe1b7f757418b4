//! The listing record as the backend (and the bundled fixtures) spell it:
//! PascalCase columns, string-encoded JSON, loosely typed numbers.
//!
//! Everything is parsed once here. A field that fails to parse is logged
//! and left out of the resulting patch; it never rejects the whole record.

use super::{
    ApartmentId, ApartmentKind, ApartmentPatch, ApartmentType, Creator, Labels, Location, Roommate,
};
use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::warn;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RawApartment {
    #[serde(rename = "ApartmentID")]
    pub apartment_id: i64,
    #[serde(rename = "Creator_ID", default, deserialize_with = "lenient::opt_i64")]
    pub creator_id: Option<i64>,
    #[serde(rename = "Creator_FullName", default)]
    pub creator_full_name: Option<String>,
    #[serde(rename = "Creator_ProfilePicture", default)]
    pub creator_profile_picture: Option<String>,
    #[serde(rename = "ApartmentType", default, deserialize_with = "lenient::opt_i64")]
    pub apartment_type: Option<i64>,
    #[serde(rename = "Location", default)]
    pub location: Option<String>,
    #[serde(rename = "Description", default)]
    pub description: Option<String>,
    #[serde(rename = "Price", default, deserialize_with = "lenient::opt_i64")]
    pub price: Option<i64>,
    #[serde(rename = "AmountOfRooms", default, deserialize_with = "lenient::opt_f64")]
    pub amount_of_rooms: Option<f64>,
    #[serde(rename = "AllowPet", default, deserialize_with = "lenient::opt_bool")]
    pub allow_pet: Option<bool>,
    #[serde(rename = "AllowSmoking", default, deserialize_with = "lenient::opt_bool")]
    pub allow_smoking: Option<bool>,
    #[serde(rename = "ParkingSpace", default, deserialize_with = "lenient::opt_i64")]
    pub parking_space: Option<i64>,
    #[serde(rename = "EntryDate", default)]
    pub entry_date: Option<String>,
    #[serde(rename = "ExitDate", default)]
    pub exit_date: Option<String>,
    #[serde(rename = "Rental_ContractLength", default, deserialize_with = "lenient::opt_i64")]
    pub rental_contract_length: Option<i64>,
    #[serde(rename = "Rental_ExtensionPossible", default, deserialize_with = "lenient::opt_bool")]
    pub rental_extension_possible: Option<bool>,
    #[serde(rename = "Shared_NumberOfRoommates", default, deserialize_with = "lenient::opt_i64")]
    pub shared_number_of_roommates: Option<i64>,
    #[serde(rename = "Roommates", default)]
    pub roommates: Option<String>,
    #[serde(rename = "Sublet_CanCancelWithoutPenalty", default, deserialize_with = "lenient::opt_bool")]
    pub sublet_can_cancel_without_penalty: Option<bool>,
    #[serde(rename = "Sublet_IsWholeProperty", default, deserialize_with = "lenient::opt_bool")]
    pub sublet_is_whole_property: Option<bool>,
    #[serde(rename = "LabelsJson", default)]
    pub labels_json: Option<String>,
    #[serde(rename = "NumOfLikes", default, deserialize_with = "lenient::opt_i64")]
    pub num_of_likes: Option<i64>,
    #[serde(rename = "IsLikedByUser", default, deserialize_with = "lenient::opt_bool")]
    pub is_liked_by_user: Option<bool>,
}

impl From<RawApartment> for ApartmentPatch {
    fn from(raw: RawApartment) -> Self {
        let id = ApartmentId(raw.apartment_id);
        let creator = (raw.creator_id.is_some()
            || raw.creator_full_name.is_some()
            || raw.creator_profile_picture.is_some())
        .then(|| Creator {
            id: raw.creator_id,
            full_name: raw.creator_full_name.clone().unwrap_or_default(),
            avatar_url: raw.creator_profile_picture.clone(),
        });

        let location = raw.location.as_deref().map(|s| {
            Location::parse(s).unwrap_or_else(|err| {
                warn!(%id, %err, "unparseable location, keeping the raw text as address");
                Location::from_address(s)
            })
        });

        let labels = raw.labels_json.as_deref().map(|s| {
            Labels::parse(s).unwrap_or_else(|err| {
                warn!(%id, %err, "unparseable labels, using none");
                Labels::default()
            })
        });

        ApartmentPatch {
            id,
            creator,
            kind: raw.kind(),
            location,
            description: raw.description,
            price: raw.price,
            rooms: raw.amount_of_rooms.map(|r| r as f32),
            allow_pet: raw.allow_pet,
            allow_smoking: raw.allow_smoking,
            parking_spaces: raw.parking_space.map(non_negative),
            entry_date: raw.entry_date.as_deref().map(parse_date),
            exit_date: raw.exit_date.as_deref().map(parse_date),
            labels,
            num_of_likes: raw.num_of_likes.map(non_negative),
            is_liked_by_user: raw.is_liked_by_user,
        }
    }
}

impl RawApartment {
    /// Build the variant-specific fields from the discriminator. Columns that
    /// belong to other variants are ignored.
    fn kind(&self) -> Option<ApartmentKind> {
        let code = self.apartment_type?;
        let apartment_type = match ApartmentType::try_from(code) {
            Ok(t) => t,
            Err(err) => {
                warn!(id = self.apartment_id, %err, "dropping listing kind");
                return None;
            }
        };

        Some(match apartment_type {
            ApartmentType::Rental => ApartmentKind::Rental {
                contract_length_months: self.rental_contract_length.map(non_negative),
                extension_possible: self.rental_extension_possible.unwrap_or(false),
            },
            ApartmentType::Shared => {
                let roommates = self
                    .roommates
                    .as_deref()
                    .map(Roommate::parse_list)
                    .unwrap_or_default();
                ApartmentKind::Shared {
                    number_of_roommates: self.shared_number_of_roommates.map(non_negative),
                    roommates,
                }
            }
            ApartmentType::Sublet => ApartmentKind::Sublet {
                can_cancel_without_penalty: self.sublet_can_cancel_without_penalty.unwrap_or(false),
                is_whole_property: self.sublet_is_whole_property.unwrap_or(false),
            },
        })
    }
}

fn non_negative(n: i64) -> u32 {
    n.clamp(0, u32::MAX as i64) as u32
}

/// Lenient date parsing: `YYYY-MM-DD`, RFC 3339, or anything that starts
/// with a `YYYY-MM-DD` prefix. Everything else is `None`.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(d);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    s.get(..10)
        .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
}

/// `deserialize_with` helpers for columns that arrive as numbers or strings.
pub mod lenient {
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    pub fn as_f64(value: &Value) -> Option<f64> {
        let n = match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            _ => None,
        };
        n.filter(|n| n.is_finite())
    }

    pub fn as_i64(value: &Value) -> Option<i64> {
        match value {
            Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.round() as i64)),
            other => as_f64(other).map(|f| f.round() as i64),
        }
    }

    pub fn as_bool(value: &Value) -> Option<bool> {
        match value {
            Value::Bool(b) => Some(*b),
            Value::Number(n) => n.as_i64().map(|n| n != 0),
            Value::String(s) => match s.trim().to_lowercase().as_str() {
                "true" | "1" | "yes" => Some(true),
                "false" | "0" | "no" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }

    pub fn opt_i64<'de, D: Deserializer<'de>>(d: D) -> Result<Option<i64>, D::Error> {
        Ok(Option::<Value>::deserialize(d)?.as_ref().and_then(as_i64))
    }

    pub fn opt_f64<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
        Ok(Option::<Value>::deserialize(d)?.as_ref().and_then(as_f64))
    }

    pub fn opt_bool<'de, D: Deserializer<'de>>(d: D) -> Result<Option<bool>, D::Error> {
        Ok(Option::<Value>::deserialize(d)?.as_ref().and_then(as_bool))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn decode(value: serde_json::Value) -> ApartmentPatch {
        serde_json::from_value::<RawApartment>(value).unwrap().into()
    }

    #[test]
    fn converts_a_shared_listing() {
        let apartment = decode(json!({
            "ApartmentID": 11,
            "Creator_ID": "3",
            "Creator_FullName": "Dana Cohen",
            "ApartmentType": 1,
            "Location": "{\"address\":\"Florentin 5, Tel Aviv\",\"latitude\":32.056,\"longitude\":34.769}",
            "Price": "4300",
            "AmountOfRooms": 3,
            "AllowPet": 1,
            "AllowSmoking": "false",
            "ParkingSpace": 0,
            "EntryDate": "2024-09-01T00:00:00.000Z",
            "ExitDate": null,
            "Shared_NumberOfRoommates": 2,
            "Roommates": "name:Omer,gender:male|name:Maya,gender:female",
            "Rental_ContractLength": 12,
            "LabelsJson": "[\"Balcony\",\"Elevator\"]",
            "NumOfLikes": 9,
            "IsLikedByUser": false
        }))
        .into_apartment();

        assert_eq!(apartment.id, ApartmentId(11));
        assert_eq!(apartment.creator.id, Some(3));
        assert_eq!(apartment.price, 4300);
        assert!(apartment.allow_pet);
        assert!(!apartment.allow_smoking);
        assert_eq!(apartment.entry_date, NaiveDate::from_ymd_opt(2024, 9, 1));
        assert_eq!(apartment.exit_date, None);
        assert!(apartment.labels.contains("balcony"));
        assert_eq!(apartment.location.address, "Florentin 5, Tel Aviv");
        match &apartment.kind {
            ApartmentKind::Shared {
                number_of_roommates,
                roommates,
            } => {
                assert_eq!(*number_of_roommates, Some(2));
                assert_eq!(roommates.len(), 2);
            }
            other => panic!("expected a shared listing, got {other:?}"),
        }
    }

    #[test]
    fn bad_columns_fall_back_instead_of_failing() {
        let apartment = decode(json!({
            "ApartmentID": 12,
            "ApartmentType": 2,
            "Location": "{broken",
            "LabelsJson": "balcony",
            "Sublet_IsWholeProperty": true
        }))
        .into_apartment();

        assert_eq!(apartment.location.address, "{broken");
        assert!(apartment.labels.is_empty());
        assert_eq!(
            apartment.kind,
            ApartmentKind::Sublet {
                can_cancel_without_penalty: false,
                is_whole_property: true
            }
        );
    }

    #[test]
    fn missing_columns_stay_out_of_the_patch() {
        let patch = decode(json!({ "ApartmentID": 1, "Price": 99 }));
        assert_eq!(patch.price, Some(99));
        assert!(patch.location.is_none());
        assert!(patch.kind.is_none());
        assert!(patch.creator.is_none());
        assert!(patch.entry_date.is_none());
    }

    #[test]
    fn one_bad_roommate_entry_keeps_the_others() {
        let apartment = decode(json!({
            "ApartmentID": 13,
            "ApartmentType": 1,
            "Roommates": "name:Itay,gender:male|Omer"
        }))
        .into_apartment();

        let roommates = apartment.roommates();
        assert_eq!(roommates.len(), 2);
        assert!(roommates[0].has_gender("male"));
        assert!(roommates.iter().all(|r| !r.has_gender("female")));
    }

    #[test]
    fn unknown_type_drops_kind() {
        let patch = decode(json!({ "ApartmentID": 1, "ApartmentType": 9 }));
        assert!(patch.kind.is_none());
    }

    #[test]
    fn date_formats() {
        assert_eq!(parse_date("2024-08-01"), NaiveDate::from_ymd_opt(2024, 8, 1));
        assert_eq!(
            parse_date("2024-08-01T10:00:00+03:00"),
            NaiveDate::from_ymd_opt(2024, 8, 1)
        );
        assert_eq!(parse_date("2024-08-01 10:00"), NaiveDate::from_ymd_opt(2024, 8, 1));
        assert_eq!(parse_date("next week"), None);
        assert_eq!(parse_date(""), None);
    }
}
