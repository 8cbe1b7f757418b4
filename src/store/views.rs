use crate::models::ApartmentId;
use crate::source::{Cursor, MapBounds, SearchFilters};

/// Like-ordered home feed, paged forward by cursor.
#[derive(Debug, Clone, PartialEq)]
pub struct HomeView {
    pub ids: Vec<ApartmentId>,
    pub cursor: Option<Cursor>,
    pub has_more: bool,
    pub loading: bool,
    pub error: Option<String>,
}

impl Default for HomeView {
    fn default() -> Self {
        Self {
            ids: Vec::new(),
            cursor: None,
            has_more: true,
            loading: false,
            error: None,
        }
    }
}

/// Filtered search results, paged by number.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchView {
    /// Filters of the last applied search; `None` until one has run.
    pub last_filters: Option<SearchFilters>,
    /// Last loaded page, 1-based. 0 before the first search.
    pub page: usize,
    pub page_size: usize,
    /// Size of the full result set
    pub total: usize,
    pub ids: Vec<ApartmentId>,
    pub loading: bool,
    pub error: Option<String>,
}

impl SearchView {
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size,
            ..Default::default()
        }
    }

    pub fn has_more(&self) -> bool {
        self.last_filters.is_some() && self.ids.len() < self.total
    }
}

/// Top listings for the map viewport. Always replaced, never appended.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MapView {
    pub bounds: Option<MapBounds>,
    pub filters: SearchFilters,
    pub ids: Vec<ApartmentId>,
    pub loading: bool,
    pub error: Option<String>,
}
