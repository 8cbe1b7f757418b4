pub mod fixtures;
pub mod mock;
pub mod traits;
pub mod types;

pub use mock::MockSource;
pub use traits::ApartmentSource;
pub use types::{Cursor, FeedPage, MapBounds, SearchFilters, SearchPage};
