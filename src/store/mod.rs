//! Session-scoped listing store.
//!
//! [`ApartmentsStore`] owns the normalized entity map and three independent
//! read paths over it: the like-ordered home feed, the filtered search and
//! the map viewport. Views hold ids only and resolve records through the
//! entity map; every page is upserted before its ids become visible.
//!
//! All state sits behind one mutex that is never held across an `.await`.
//! In-flight work is tagged with the session epoch (bumped by
//! [`ApartmentsStore::clear_all`]) and a per-view generation counter; results
//! that come back stale are dropped instead of applied.

pub mod entities;
pub mod views;

pub use entities::EntityStore;
pub use views::{HomeView, MapView, SearchView};

use crate::config::StoreConfig;
use crate::models::{Apartment, ApartmentId, ApartmentPatch};
use crate::source::{ApartmentSource, Cursor, FeedPage, MapBounds, SearchFilters, SearchPage};
use anyhow::Result;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};

/// What became of a load request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The result was applied to the view.
    Loaded,
    /// A guard made the call a no-op (already loading, nothing more to load, ...).
    Skipped,
    /// A newer request or a `clear_all` replaced this one; nothing was applied.
    Superseded,
    /// The backend failed; the message is stored in the view's `error`.
    Failed(String),
}

#[derive(Debug, Default)]
struct State {
    entities: EntityStore,
    home: HomeView,
    search: SearchView,
    map: MapView,
    epoch: u64,
    home_generation: u64,
    search_generation: u64,
    map_generation: u64,
}

impl State {
    fn new(config: &StoreConfig) -> Self {
        Self {
            search: SearchView::new(config.search_page_size),
            ..Default::default()
        }
    }
}

/// Ticket for one in-flight request.
#[derive(Debug, Clone, Copy)]
struct Ticket {
    epoch: u64,
    generation: u64,
}

#[derive(Debug, Clone, Copy)]
enum Lane {
    Home,
    Search,
    Map,
}

/// Clears a view's `loading` flag if the load holding it is dropped before it
/// finishes (a caller's timeout, a losing `select!` branch). A newer request
/// or a cleared session owns the flag by then and is left alone.
struct InFlight<'a> {
    state: &'a Mutex<State>,
    lane: Lane,
    ticket: Ticket,
    armed: bool,
}

impl<'a> InFlight<'a> {
    fn new(state: &'a Mutex<State>, lane: Lane, ticket: Ticket) -> Self {
        Self {
            state,
            lane,
            ticket,
            armed: true,
        }
    }

    /// The load completed; it settles the flag itself.
    fn finish(mut self) {
        self.armed = false;
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut guard = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let state = &mut *guard;
        if state.epoch != self.ticket.epoch {
            return;
        }
        let (current, loading) = match self.lane {
            Lane::Home => (state.home_generation, &mut state.home.loading),
            Lane::Search => (state.search_generation, &mut state.search.loading),
            Lane::Map => (state.map_generation, &mut state.map.loading),
        };
        if current == self.ticket.generation {
            *loading = false;
            debug!(lane = ?self.lane, "load dropped before completion");
        }
    }
}

pub struct ApartmentsStore<S> {
    source: Arc<S>,
    config: StoreConfig,
    state: Arc<Mutex<State>>,
}

impl<S> Clone for ApartmentsStore<S> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
            config: self.config.clone(),
            state: Arc::clone(&self.state),
        }
    }
}

fn failure_message(err: &anyhow::Error, fallback: &str) -> String {
    let message = err.to_string();
    if message.trim().is_empty() {
        fallback.to_string()
    } else {
        message
    }
}

impl<S: ApartmentSource + 'static> ApartmentsStore<S> {
    pub fn new(source: S, config: StoreConfig) -> Self {
        Self::with_shared_source(Arc::new(source), config)
    }

    pub fn with_shared_source(source: Arc<S>, config: StoreConfig) -> Self {
        let state = State::new(&config);
        Self {
            source,
            config,
            state: Arc::new(Mutex::new(state)),
        }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        // State is only ever replaced field-by-field, so a poisoned guard is still usable.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // --- entity map -------------------------------------------------------

    /// Snapshot of the entity map
    pub fn entities(&self) -> EntityStore {
        self.lock().entities.clone()
    }

    pub fn entity(&self, id: ApartmentId) -> Option<Apartment> {
        self.lock().entities.get(&id).cloned()
    }

    /// Insert or shallow-merge listings into the entity map.
    pub fn upsert_apartments<I, P>(&self, items: I)
    where
        I: IntoIterator<Item = P>,
        P: Into<ApartmentPatch>,
    {
        let applied = self.lock().entities.upsert(items);
        if applied > 0 {
            debug!(applied, "upserted listings");
        }
    }

    /// Resolve ids in order; unknown ids are skipped.
    pub fn get_apartments_by_ids(&self, ids: &[ApartmentId]) -> Vec<Apartment> {
        self.lock().entities.get_many(ids)
    }

    /// Forget everything loaded this session. In-flight requests are dropped
    /// when they complete.
    pub fn clear_all(&self) {
        let mut state = self.lock();
        let epoch = state.epoch + 1;
        let (home_generation, search_generation, map_generation) = (
            state.home_generation,
            state.search_generation,
            state.map_generation,
        );
        *state = State {
            epoch,
            home_generation,
            search_generation,
            map_generation,
            ..State::new(&self.config)
        };
        info!(epoch, "cleared listing store");
    }

    /// Start a fresh session: clear, then load the first feed page.
    pub async fn initialize_on_login(&self) -> LoadOutcome {
        self.clear_all();
        self.load_home_first_page().await
    }

    // --- home feed --------------------------------------------------------

    pub fn home(&self) -> HomeView {
        self.lock().home.clone()
    }

    /// Load the feed from the start, replacing the current ids.
    pub async fn load_home_first_page(&self) -> LoadOutcome {
        self.load_home(true).await
    }

    /// Append the next feed page. No-op while loading or once exhausted.
    pub async fn load_home_next_page(&self) -> LoadOutcome {
        self.load_home(false).await
    }

    async fn load_home(&self, first: bool) -> LoadOutcome {
        let (cursor, ticket) = {
            let mut state = self.lock();
            if state.home.loading {
                debug!(first, "home feed already loading");
                return LoadOutcome::Skipped;
            }
            if !first && !state.home.has_more {
                debug!("home feed exhausted");
                return LoadOutcome::Skipped;
            }
            state.home_generation += 1;
            state.home.loading = true;
            state.home.error = None;
            let cursor = if first { None } else { state.home.cursor };
            let ticket = Ticket {
                epoch: state.epoch,
                generation: state.home_generation,
            };
            (cursor, ticket)
        };
        let in_flight = InFlight::new(&self.state, Lane::Home, ticket);

        let result = self.fetch_feed_page(cursor).await;
        in_flight.finish();

        let mut state = self.lock();
        if state.epoch != ticket.epoch {
            debug!("dropping feed page from a cleared session");
            return LoadOutcome::Superseded;
        }
        state.home.loading = false;

        match result {
            Ok((page, apartments)) => {
                state.entities.upsert(apartments);
                let count = page.ids.len();
                if first {
                    state.home.ids = page.ids;
                } else {
                    state.home.ids.extend(page.ids);
                }
                state.home.has_more = page.next_cursor.is_some();
                state.home.cursor = page.next_cursor;
                info!(
                    count,
                    total = state.home.ids.len(),
                    has_more = state.home.has_more,
                    "loaded home feed page"
                );
                LoadOutcome::Loaded
            }
            Err(err) => {
                let fallback = if first {
                    "home_first_page_failed"
                } else {
                    "home_next_page_failed"
                };
                let message = failure_message(&err, fallback);
                warn!(error = %message, "home feed load failed");
                state.home.error = Some(message.clone());
                LoadOutcome::Failed(message)
            }
        }
    }

    async fn fetch_feed_page(&self, cursor: Option<Cursor>) -> Result<(FeedPage, Vec<Apartment>)> {
        let page = self
            .source
            .feed_by_likes(cursor, self.config.home_page_size)
            .await?;
        let apartments = self.source.fetch_by_ids(&page.ids).await?;
        Ok((page, apartments))
    }

    // --- search -----------------------------------------------------------

    pub fn search(&self) -> SearchView {
        self.lock().search.clone()
    }

    /// Debounced search.
    ///
    /// Waits out the debounce window; if another search started meanwhile,
    /// this one never runs. With `reset` the results replace page 1, otherwise
    /// the next page is appended.
    pub async fn run_search(&self, filters: SearchFilters, reset: bool) -> LoadOutcome {
        let ticket = {
            let mut state = self.lock();
            state.search_generation += 1;
            state.search.loading = true;
            state.search.error = None;
            Ticket {
                epoch: state.epoch,
                generation: state.search_generation,
            }
        };
        let in_flight = InFlight::new(&self.state, Lane::Search, ticket);

        tokio::time::sleep(self.config.search_debounce()).await;

        let page = {
            let state = self.lock();
            if !Self::search_is_current(&state, ticket) {
                debug!(generation = ticket.generation, "search superseded during debounce");
                return LoadOutcome::Superseded;
            }
            if reset {
                1
            } else {
                state.search.page + 1
            }
        };

        self.execute_search(filters, page, reset, in_flight, "search_failed")
            .await
    }

    /// Append the next page of the last search. No-op before any search, while
    /// one is in flight, or once every result is loaded.
    pub async fn load_next_search_page(&self) -> LoadOutcome {
        let (filters, page, ticket) = {
            let mut state = self.lock();
            if state.search.loading {
                debug!("search already in flight");
                return LoadOutcome::Skipped;
            }
            let Some(filters) = state.search.last_filters.clone() else {
                debug!("no search to continue");
                return LoadOutcome::Skipped;
            };
            if !state.search.has_more() {
                debug!("search results exhausted");
                return LoadOutcome::Skipped;
            }
            state.search_generation += 1;
            state.search.loading = true;
            state.search.error = None;
            let ticket = Ticket {
                epoch: state.epoch,
                generation: state.search_generation,
            };
            (filters, state.search.page + 1, ticket)
        };
        let in_flight = InFlight::new(&self.state, Lane::Search, ticket);

        self.execute_search(filters, page, false, in_flight, "search_next_page_failed")
            .await
    }

    fn search_is_current(state: &State, ticket: Ticket) -> bool {
        state.epoch == ticket.epoch && state.search_generation == ticket.generation
    }

    async fn execute_search(
        &self,
        filters: SearchFilters,
        page: usize,
        reset: bool,
        in_flight: InFlight<'_>,
        fallback: &str,
    ) -> LoadOutcome {
        let ticket = in_flight.ticket;
        let page_size = self.config.search_page_size;
        let result = self.fetch_search_page(&filters, page, page_size).await;
        in_flight.finish();

        let mut state = self.lock();
        if !Self::search_is_current(&state, ticket) {
            debug!(generation = ticket.generation, "dropping stale search result");
            return LoadOutcome::Superseded;
        }
        state.search.loading = false;

        match result {
            Ok((results, apartments)) => {
                state.entities.upsert(apartments);
                let count = results.ids.len();
                if reset {
                    state.search.ids = results.ids;
                } else {
                    state.search.ids.extend(results.ids);
                }
                state.search.total = results.total;
                state.search.page = page;
                state.search.page_size = page_size;
                state.search.last_filters = Some(filters);
                info!(page, count, total = results.total, "applied search results");
                LoadOutcome::Loaded
            }
            Err(err) => {
                let message = failure_message(&err, fallback);
                warn!(error = %message, page, "search failed");
                state.search.error = Some(message.clone());
                LoadOutcome::Failed(message)
            }
        }
    }

    async fn fetch_search_page(
        &self,
        filters: &SearchFilters,
        page: usize,
        page_size: usize,
    ) -> Result<(SearchPage, Vec<Apartment>)> {
        let results = self.source.search(filters, page, page_size).await?;
        let apartments = self.source.fetch_by_ids(&results.ids).await?;
        Ok((results, apartments))
    }

    /// Resolve a window of the accumulated search ids.
    ///
    /// Ids missing from the entity map are skipped here and fetched in the
    /// background; read the slice again once they land. Background fetching
    /// needs a Tokio runtime and is skipped outside of one.
    pub fn get_search_slice(&self, offset: usize, limit: usize) -> Vec<Apartment> {
        let (resolved, missing, epoch) = {
            let state = self.lock();
            let window: Vec<ApartmentId> = state
                .search
                .ids
                .iter()
                .skip(offset)
                .take(limit)
                .copied()
                .collect();
            (
                state.entities.get_many(&window),
                state.entities.missing(&window),
                state.epoch,
            )
        };

        if !missing.is_empty() {
            self.spawn_backfill(missing, epoch);
        }
        resolved
    }

    fn spawn_backfill(&self, ids: Vec<ApartmentId>, epoch: u64) {
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            warn!(missing = ids.len(), "no runtime to backfill search slice");
            return;
        };

        debug!(missing = ids.len(), "backfilling search slice");
        let store = self.clone();
        handle.spawn(async move {
            match store.source.fetch_by_ids(&ids).await {
                Ok(found) => {
                    let mut state = store.lock();
                    if state.epoch == epoch {
                        state.entities.upsert(found);
                    }
                }
                Err(err) => warn!(error = %err, "search slice backfill failed"),
            }
        });
    }

    // --- map --------------------------------------------------------------

    pub fn map(&self) -> MapView {
        self.lock().map.clone()
    }

    pub fn set_map_bounds(&self, bounds: MapBounds) {
        self.lock().map.bounds = Some(bounds);
    }

    pub fn set_map_filters(&self, filters: SearchFilters) {
        self.lock().map.filters = filters;
    }

    /// Replace the map ids with the top listings for the current bounds and
    /// filters. No-op until bounds are set.
    pub async fn refresh_map(&self) -> LoadOutcome {
        let (bounds, filters, ticket) = {
            let mut state = self.lock();
            let Some(bounds) = state.map.bounds else {
                debug!("map bounds not set");
                return LoadOutcome::Skipped;
            };
            state.map_generation += 1;
            state.map.loading = true;
            state.map.error = None;
            let ticket = Ticket {
                epoch: state.epoch,
                generation: state.map_generation,
            };
            (bounds, state.map.filters.clone(), ticket)
        };
        let in_flight = InFlight::new(&self.state, Lane::Map, ticket);

        let result = self.fetch_map(&bounds, &filters).await;
        in_flight.finish();

        let mut state = self.lock();
        if state.epoch != ticket.epoch || state.map_generation != ticket.generation {
            debug!("dropping stale map result");
            return LoadOutcome::Superseded;
        }
        state.map.loading = false;

        match result {
            Ok((ids, apartments)) => {
                state.entities.upsert(apartments);
                info!(count = ids.len(), "refreshed map");
                state.map.ids = ids;
                LoadOutcome::Loaded
            }
            Err(err) => {
                let message = failure_message(&err, "map_refresh_failed");
                warn!(error = %message, "map refresh failed");
                state.map.error = Some(message.clone());
                LoadOutcome::Failed(message)
            }
        }
    }

    async fn fetch_map(
        &self,
        bounds: &MapBounds,
        filters: &SearchFilters,
    ) -> Result<(Vec<ApartmentId>, Vec<Apartment>)> {
        let ids = self
            .source
            .map_query(bounds, filters, self.config.map_limit)
            .await?;
        let apartments = self.source.fetch_by_ids(&ids).await?;
        Ok((ids, apartments))
    }
}
