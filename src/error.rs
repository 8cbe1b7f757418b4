use thiserror::Error;

/// Errors produced while parsing the string-encoded fields of a listing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// `Location` looked like JSON but was not a valid location object.
    #[error("Invalid location: {0}")]
    Location(String),

    /// `LabelsJson` was not a JSON array of tags.
    #[error("Invalid labels: {0}")]
    Labels(String),

    /// A roommate entry was not a list of `key:value` pairs.
    #[error("Invalid roommate entry: {0:?}")]
    Roommate(String),

    /// `ApartmentType` outside of 0..=2.
    #[error("Unknown apartment type: {0}")]
    ApartmentType(i64),

    /// An id or cursor that is not a non-negative integer.
    #[error("Invalid number: {0:?}")]
    Number(String),
}

/// Convenience alias used by the model parsers.
pub type Result<T> = std::result::Result<T, ParseError>;
