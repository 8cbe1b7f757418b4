use crate::models::{Apartment, ApartmentId, ApartmentPatch, RawApartment};
use crate::search::{by_likes_then_id, filter_sorted};
use crate::source::fixtures;
use crate::source::traits::ApartmentSource;
use crate::source::types::{Cursor, FeedPage, MapBounds, SearchFilters, SearchPage};
use anyhow::{Context, Result};
use async_trait::async_trait;
use rand::Rng;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

/// In-memory backend standing in for the listings API
pub struct MockSource {
    apartments: Vec<Apartment>,
    min_delay: Duration,
    max_delay: Duration,
}

impl MockSource {
    /// Serve `apartments` with no simulated latency
    pub fn new(apartments: Vec<Apartment>) -> Self {
        Self {
            apartments,
            min_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        }
    }

    /// Serve the bundled sample listings
    pub fn with_fixtures() -> Self {
        Self::from_raw(fixtures::sample_listings())
    }

    pub fn from_raw(records: Vec<RawApartment>) -> Self {
        Self::new(
            records
                .into_iter()
                .map(|raw| ApartmentPatch::from(raw).into_apartment())
                .collect(),
        )
    }

    /// Load a JSON array of raw listing records
    pub async fn load_json(path: &Path) -> Result<Self> {
        let json = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read dataset {}", path.display()))?;
        let records: Vec<RawApartment> =
            serde_json::from_str(&json).context("Failed to parse dataset")?;
        info!("Loaded {} listings from {}", records.len(), path.display());
        Ok(Self::from_raw(records))
    }

    /// Delay every call by a uniformly random duration in `[min, max]`
    pub fn with_delay(mut self, min: Duration, max: Duration) -> Self {
        self.min_delay = min;
        self.max_delay = max.max(min);
        self
    }

    pub fn apartments(&self) -> &[Apartment] {
        &self.apartments
    }

    fn pick_delay(&self) -> Duration {
        if self.max_delay <= self.min_delay {
            return self.min_delay;
        }
        rand::thread_rng().gen_range(self.min_delay..=self.max_delay)
    }

    async fn simulate_latency(&self) {
        let delay = self.pick_delay();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}

impl Default for MockSource {
    fn default() -> Self {
        Self::with_fixtures()
    }
}

#[async_trait]
impl ApartmentSource for MockSource {
    async fn feed_by_likes(&self, cursor: Option<Cursor>, limit: usize) -> Result<FeedPage> {
        self.simulate_latency().await;

        let mut sorted: Vec<&Apartment> = self.apartments.iter().collect();
        sorted.sort_by(|a, b| by_likes_then_id(a, b));

        let start = cursor.map_or(0, |c| c.offset()).min(sorted.len());
        let end = start.saturating_add(limit).min(sorted.len());
        let ids = sorted[start..end].iter().map(|a| a.id).collect();
        // an empty page never hands out a cursor, so a zero limit cannot loop
        let next_cursor = (end > start && end < sorted.len()).then(|| Cursor::from_offset(end));

        debug!(start, end, total = sorted.len(), "served feed page");
        Ok(FeedPage { ids, next_cursor })
    }

    async fn search(
        &self,
        filters: &SearchFilters,
        page: usize,
        page_size: usize,
    ) -> Result<SearchPage> {
        self.simulate_latency().await;

        let matched = filter_sorted(&self.apartments, filters);
        let total = matched.len();
        let ids = matched
            .into_iter()
            .skip(page.saturating_sub(1).saturating_mul(page_size))
            .take(page_size)
            .map(|a| a.id)
            .collect();

        debug!(page, page_size, total, "served search page");
        Ok(SearchPage { ids, total })
    }

    async fn map_query(
        &self,
        _bounds: &MapBounds,
        filters: &SearchFilters,
        limit: usize,
    ) -> Result<Vec<ApartmentId>> {
        self.simulate_latency().await;

        // TODO: geofilter by `_bounds` once the listings API defines how a
        // viewport query treats listings without coordinates.
        Ok(filter_sorted(&self.apartments, filters)
            .into_iter()
            .take(limit)
            .map(|a| a.id)
            .collect())
    }

    async fn fetch_by_ids(&self, ids: &[ApartmentId]) -> Result<Vec<Apartment>> {
        self.simulate_latency().await;

        Ok(ids
            .iter()
            .filter_map(|id| self.apartments.iter().find(|a| a.id == *id))
            .cloned()
            .collect())
    }

    fn source_name(&self) -> &'static str {
        "Mock"
    }
}
