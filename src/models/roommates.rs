use crate::error::ParseError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;
use tracing::warn;

/// One current occupant of a shared apartment.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Roommate {
    pub name: Option<String>,
    pub gender: Option<String>,
    pub age: Option<u32>,
    /// Any other `key:value` pairs carried by the entry.
    pub extra: BTreeMap<String, String>,
}

impl Roommate {
    /// Parse the `Roommates` column.
    ///
    /// Entries are separated by `|`, e.g.
    /// `name:Dana,gender:female,age:27|name:Omer,gender:male`. A malformed entry
    /// is kept as a roommate named after the entry text, with no known gender.
    pub fn parse_list(raw: &str) -> Vec<Roommate> {
        raw.split('|')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(|entry| {
                entry.parse().unwrap_or_else(|err: ParseError| {
                    warn!(%err, "keeping roommate entry as a bare name");
                    Roommate {
                        name: Some(entry.to_string()),
                        ..Default::default()
                    }
                })
            })
            .collect()
    }

    pub fn has_gender(&self, wanted: &str) -> bool {
        self.gender
            .as_deref()
            .is_some_and(|g| g.eq_ignore_ascii_case(wanted.trim()))
    }
}

/// One entry: `,`-separated `key:value` pairs.
impl FromStr for Roommate {
    type Err = ParseError;

    fn from_str(entry: &str) -> Result<Self, Self::Err> {
        let mut roommate = Roommate::default();
        for pair in entry.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let (key, value) = pair
                .split_once(':')
                .ok_or_else(|| ParseError::Roommate(entry.to_string()))?;
            let key = key.trim().to_lowercase();
            let value = value.trim();
            match key.as_str() {
                "name" => roommate.name = Some(value.to_string()),
                "gender" => roommate.gender = Some(value.to_string()),
                "age" => roommate.age = value.parse().ok(),
                _ => {
                    roommate.extra.insert(key, value.to_string());
                }
            }
        }
        Ok(roommate)
    }
}
