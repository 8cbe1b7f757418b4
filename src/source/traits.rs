use crate::models::{Apartment, ApartmentId};
use crate::source::types::{Cursor, FeedPage, MapBounds, SearchFilters, SearchPage};
use anyhow::Result;
use async_trait::async_trait;

/// Backend the store reads listings from.
///
/// The bundled [`MockSource`](crate::source::MockSource) serves an in-memory
/// dataset; a networked backend only needs these four queries.
#[async_trait]
pub trait ApartmentSource: Send + Sync {
    /// Listings ordered by likes (desc), then id (asc), starting at `cursor`.
    async fn feed_by_likes(&self, cursor: Option<Cursor>, limit: usize) -> Result<FeedPage>;

    /// Filtered and sorted listings, 1-based `page`.
    async fn search(&self, filters: &SearchFilters, page: usize, page_size: usize)
        -> Result<SearchPage>;

    /// Top `limit` listings for a map viewport.
    async fn map_query(
        &self,
        bounds: &MapBounds,
        filters: &SearchFilters,
        limit: usize,
    ) -> Result<Vec<ApartmentId>>;

    /// Full records for `ids`. Unknown ids are skipped.
    async fn fetch_by_ids(&self, ids: &[ApartmentId]) -> Result<Vec<Apartment>>;

    /// Get the name of the backend
    fn source_name(&self) -> &'static str;
}
