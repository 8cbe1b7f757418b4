#![allow(dead_code)]

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use roome_store::config::StoreConfig;
use roome_store::models::{ApartmentKind, Labels, Location, Roommate};
use roome_store::source::{Cursor, FeedPage, MapBounds, SearchPage};
use roome_store::store::ApartmentsStore;
use roome_store::{Apartment, ApartmentId, ApartmentSource, MockSource, SearchFilters};
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub fn listing(id: i64, likes: u32, price: i64) -> Apartment {
    Apartment {
        price,
        num_of_likes: likes,
        description: format!("Listing number {id}"),
        location: Location::from_address(format!("Street {id}, Tel Aviv")),
        ..Apartment::placeholder(ApartmentId(id))
    }
}

pub fn shared(roommates: &str) -> ApartmentKind {
    ApartmentKind::Shared {
        number_of_roommates: None,
        roommates: Roommate::parse_list(roommates),
    }
}

pub fn labels(tags: &[&str]) -> Labels {
    tags.iter().copied().collect()
}

pub fn ids(raw: &[i64]) -> Vec<ApartmentId> {
    raw.iter().copied().map(ApartmentId).collect()
}

pub fn config(home_page_size: usize, search_page_size: usize) -> StoreConfig {
    StoreConfig {
        home_page_size,
        search_page_size,
        ..StoreConfig::default()
    }
}

/// Mock backend that counts calls and can be told to fail or to withhold
/// records from `fetch_by_ids`.
pub struct RecordingSource {
    inner: MockSource,
    pub fail_with: Mutex<Option<String>>,
    pub feed_calls: AtomicUsize,
    pub search_calls: AtomicUsize,
    pub map_calls: AtomicUsize,
    pub hidden: Mutex<HashSet<ApartmentId>>,
}

impl RecordingSource {
    pub fn new(inner: MockSource) -> Arc<Self> {
        Arc::new(Self {
            inner,
            fail_with: Mutex::new(None),
            feed_calls: AtomicUsize::new(0),
            search_calls: AtomicUsize::new(0),
            map_calls: AtomicUsize::new(0),
            hidden: Mutex::new(HashSet::new()),
        })
    }

    pub fn fail(&self, message: &str) {
        *self.fail_with.lock().unwrap() = Some(message.to_string());
    }

    pub fn recover(&self) {
        *self.fail_with.lock().unwrap() = None;
    }

    pub fn hide(&self, id: i64) {
        self.hidden.lock().unwrap().insert(ApartmentId(id));
    }

    pub fn unhide_all(&self) {
        self.hidden.lock().unwrap().clear();
    }

    fn check(&self) -> Result<()> {
        match self.fail_with.lock().unwrap().clone() {
            Some(message) => Err(anyhow!(message)),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ApartmentSource for RecordingSource {
    async fn feed_by_likes(&self, cursor: Option<Cursor>, limit: usize) -> Result<FeedPage> {
        self.feed_calls.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        self.inner.feed_by_likes(cursor, limit).await
    }

    async fn search(
        &self,
        filters: &SearchFilters,
        page: usize,
        page_size: usize,
    ) -> Result<SearchPage> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        self.inner.search(filters, page, page_size).await
    }

    async fn map_query(
        &self,
        bounds: &MapBounds,
        filters: &SearchFilters,
        limit: usize,
    ) -> Result<Vec<ApartmentId>> {
        self.map_calls.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        self.inner.map_query(bounds, filters, limit).await
    }

    async fn fetch_by_ids(&self, ids: &[ApartmentId]) -> Result<Vec<Apartment>> {
        self.check()?;
        let visible: Vec<ApartmentId> = {
            let hidden = self.hidden.lock().unwrap();
            ids.iter().filter(|id| !hidden.contains(*id)).copied().collect()
        };
        self.inner.fetch_by_ids(&visible).await
    }

    fn source_name(&self) -> &'static str {
        "Recording"
    }
}

pub fn store_over(
    apartments: Vec<Apartment>,
    config: StoreConfig,
) -> (ApartmentsStore<RecordingSource>, Arc<RecordingSource>) {
    let source = RecordingSource::new(MockSource::new(apartments));
    let store = ApartmentsStore::with_shared_source(Arc::clone(&source), config);
    (store, source)
}
