use crate::error::{ParseError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;

/// Amenity tags attached to a listing, normalized to lowercase.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Labels(BTreeSet<String>);

impl Labels {
    /// Parse the `LabelsJson` column: an array of strings, or of objects
    /// carrying the tag under `label`, `value` or `name`.
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Ok(Self::default());
        }

        let value: Value =
            serde_json::from_str(trimmed).map_err(|e| ParseError::Labels(e.to_string()))?;
        let Value::Array(items) = value else {
            return Err(ParseError::Labels("expected a JSON array".to_string()));
        };

        let tags = items.iter().filter_map(|item| match item {
            Value::String(s) => Some(s.as_str()),
            Value::Object(map) => ["label", "value", "name"]
                .iter()
                .find_map(|key| map.get(*key).and_then(Value::as_str)),
            _ => None,
        });

        Ok(tags.collect())
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.0.contains(&tag.trim().to_lowercase())
    }

    /// True when every tag in `wanted` is present.
    pub fn contains_all<'a, I>(&self, wanted: I) -> bool
    where
        I: IntoIterator<Item = &'a String>,
    {
        wanted.into_iter().all(|tag| self.contains(tag))
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'a> FromIterator<&'a str> for Labels {
    fn from_iter<T: IntoIterator<Item = &'a str>>(iter: T) -> Self {
        Self(
            iter.into_iter()
                .map(|tag| tag.trim().to_lowercase())
                .filter(|tag| !tag.is_empty())
                .collect(),
        )
    }
}
