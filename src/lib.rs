//! # roome-store
//!
//! Client-side listing store for the RooMe apartment and roommate app: a
//! normalized entity map with a like-ordered home feed, a filtered search
//! and a map viewport over a pluggable [`source::ApartmentSource`].

pub mod config;
pub mod error;
pub mod models;
pub mod search;
pub mod source;
pub mod store;

pub use error::ParseError;
pub use models::{Apartment, ApartmentId, ApartmentKind, ApartmentPatch, ApartmentType};
pub use source::{ApartmentSource, MockSource, SearchFilters};
pub use store::{ApartmentsStore, LoadOutcome};
