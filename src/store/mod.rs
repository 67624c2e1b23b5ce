//! Generic in-memory resource store.
//!
//! A [`ResourceStore`] holds the currently loaded page of one backend
//! resource, its filter state and the record open in a detail view. Every
//! action goes through the shared [`ApiClient`] and returns a [`Result`];
//! callers decide whether to surface or ignore a failure.

mod coalesce;
mod cursor;
mod filters;

pub use coalesce::*;
pub use cursor::*;
pub use filters::*;

use std::future::Future;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::Notify;

use crate::errors::{ApiError, Result};
use crate::http::{ApiClient, Body, Query};
use crate::models::{Identified, Page};

/// What a store does with its page after a successful update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationPolicy {
    /// Re-issue the list request with the page and filters captured when the
    /// mutation started.
    Refetch,
    /// Replace the matching record with the one the server returned.
    PatchById,
}

/// Shape of a list response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Envelope {
    /// `{ data, total }` with `offset`/`limit` and filter parameters.
    Paged,
    /// `{ data }`, no query parameters.
    Data,
    /// Bare JSON array, no query parameters.
    Array,
}

/// Static description of one REST resource.
pub trait Resource: Send + Sync + 'static {
    /// Name used in logs and on the command line.
    const NAME: &'static str;
    /// Collection path, e.g. `/banner-hero`.
    const PATH: &'static str;
    const FILTERS: &'static [FilterKey] = &[];
    const POLICY: MutationPolicy = MutationPolicy::Refetch;
    const ENVELOPE: Envelope = Envelope::Paged;

    /// Row type of the list endpoint.
    type Item: Identified + Clone + DeserializeOwned + Send + Sync + 'static;
    /// Record type of the by-id endpoint.
    type Detail: Identified + Clone + DeserializeOwned + Send + Sync + 'static;

    fn item_path(id: i64) -> String {
        format!("{}/{}", Self::PATH, id)
    }
}

/// Copy of a store's page buffer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageSnapshot<T> {
    pub items: Vec<T>,
    pub total: u64,
}

impl<T> Default for PageSnapshot<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            total: 0,
        }
    }
}

struct StoreState<R: Resource> {
    items: Vec<R::Item>,
    total: u64,
    filters: Filters,
    current: Option<R::Detail>,
    last_page: PageRequest,
    /// Bumped by every list start and every cancel; a list writes the buffer
    /// only while its own ticket is still the latest.
    generation: u64,
}

pub struct ResourceStore<R: Resource> {
    client: ApiClient,
    state: RwLock<StoreState<R>>,
    in_flight: AtomicUsize,
    cancel: Notify,
    coalescer: Option<Coalescer<PageSnapshot<R::Item>>>,
    _resource: PhantomData<R>,
}

impl<R: Resource> ResourceStore<R> {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            state: RwLock::new(StoreState {
                items: Vec::new(),
                total: 0,
                filters: Filters::empty_for(R::FILTERS),
                current: None,
                last_page: PageRequest::default(),
                generation: 0,
            }),
            in_flight: AtomicUsize::new(0),
            cancel: Notify::new(),
            coalescer: None,
            _resource: PhantomData,
        }
    }

    /// Store whose list calls join the one already in flight.
    pub fn coalescing(client: ApiClient) -> Self {
        Self {
            coalescer: Some(Coalescer::new()),
            ..Self::new(client)
        }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    /// True while any action of this store awaits the network.
    pub fn is_loading(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    pub fn snapshot(&self) -> PageSnapshot<R::Item> {
        let state = self.state.read();
        PageSnapshot {
            items: state.items.clone(),
            total: state.total,
        }
    }

    pub fn filters(&self) -> Filters {
        self.state.read().filters.clone()
    }

    pub fn current(&self) -> Option<R::Detail> {
        self.state.read().current.clone()
    }

    pub fn last_page(&self) -> PageRequest {
        self.state.read().last_page
    }

    /// Merge filter values into the filter state. Keys this resource does not
    /// declare are ignored.
    pub fn set_filters(&self, filters: &Filters) {
        let mut state = self.state.write();
        for (name, value) in filters.iter() {
            if state.filters.contains(name) {
                state.filters.set(name, value);
            } else {
                tracing::warn!(resource = R::NAME, filter = name, "Ignoring unknown filter");
            }
        }
    }

    pub fn clear_filters(&self) {
        self.state.write().filters = Filters::empty_for(R::FILTERS);
    }

    /// Fetch one page. Only the non-empty values of `filters` are sent, and
    /// those are merged into the filter state once the page has loaded. On
    /// failure neither the page buffer nor the filter state changes.
    pub async fn list(&self, page: PageRequest, filters: &Filters) -> Result<PageSnapshot<R::Item>> {
        let active: Vec<(&'static str, String)> = R::FILTERS
            .iter()
            .map(|key| (key.name, filters.get(key.name).trim().to_string()))
            .filter(|(_, value)| !value.is_empty())
            .collect();

        let snapshot = self.load(page, filters).await?;

        let mut state = self.state.write();
        for (name, value) in active {
            state.filters.set(name, value);
        }
        Ok(snapshot)
    }

    /// Fetch `page` with the current filter state.
    pub async fn refresh_with_filters(&self, page: PageRequest) -> Result<PageSnapshot<R::Item>> {
        let filters = self.filters();
        self.load(page, &filters).await
    }

    /// Re-issue the last successful page request with the current filters.
    pub async fn refresh(&self) -> Result<PageSnapshot<R::Item>> {
        self.refresh_with_filters(self.last_page()).await
    }

    /// Abort every list in flight on this store with [`ApiError::Cancelled`].
    pub fn cancel(&self) {
        self.state.write().generation += 1;
        self.cancel.notify_waiters();
        tracing::debug!(resource = R::NAME, "Cancelled in-flight list requests");
    }

    pub async fn get_by_id(&self, id: i64) -> Result<R::Detail> {
        let detail: R::Detail = self
            .track(self.client.get(&R::item_path(id), None))
            .await
            .inspect_err(|e| tracing::error!(resource = R::NAME, id, "Failed to fetch by id: {}", e))?;
        self.state.write().current = Some(detail.clone());
        Ok(detail)
    }

    /// POST to the collection, then refetch the page the store showed when
    /// the call started.
    pub async fn create(&self, body: Body) -> Result<Value> {
        let (page, filters) = self.capture();
        let created = self
            .track(self.client.post::<Value>(R::PATH, body))
            .await
            .inspect_err(|e| tracing::error!(resource = R::NAME, "Failed to create: {}", e))?;
        tracing::info!(resource = R::NAME, "Created record");
        self.refetch(page, &filters).await;
        Ok(created)
    }

    /// PUT a record, then refetch or patch in place per [`Resource::POLICY`].
    /// A patch that cannot be applied (partial reply, record not loaded)
    /// falls back to a refetch.
    pub async fn update(&self, id: i64, body: Body) -> Result<Value> {
        let (page, filters) = self.capture();
        let updated = self
            .track(self.client.put::<Value>(&R::item_path(id), body))
            .await
            .inspect_err(|e| tracing::error!(resource = R::NAME, id, "Failed to update: {}", e))?;
        tracing::info!(resource = R::NAME, id, "Updated record");

        let patched = R::POLICY == MutationPolicy::PatchById && self.replace_record(id, &updated);
        if !patched {
            self.refetch(page, &filters).await;
        }
        Ok(updated)
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        let (page, filters) = self.capture();
        self.track(self.client.delete(&R::item_path(id)))
            .await
            .inspect_err(|e| tracing::error!(resource = R::NAME, id, "Failed to delete: {}", e))?;
        tracing::info!(resource = R::NAME, id, "Deleted record");
        self.refetch(page, &filters).await;
        Ok(())
    }

    /// Apply `patch` to the buffered record with `id`. Returns whether such a
    /// record was loaded.
    pub fn patch_item(&self, id: i64, patch: impl FnOnce(&mut R::Item)) -> bool {
        let mut state = self.state.write();
        match state.items.iter_mut().find(|item| item.id() == id) {
            Some(item) => {
                patch(item);
                true
            }
            None => false,
        }
    }

    /// Apply `patch` to the detail slot when it holds `id`.
    pub fn patch_current(&self, id: i64, patch: impl FnOnce(&mut R::Detail)) -> bool {
        let mut state = self.state.write();
        match state.current.as_mut().filter(|current| current.id() == id) {
            Some(current) => {
                patch(current);
                true
            }
            None => false,
        }
    }

    pub fn set_current(&self, detail: Option<R::Detail>) {
        self.state.write().current = detail;
    }

    /// Run an entity-specific action with the loading flag raised.
    pub async fn track<F: Future>(&self, fut: F) -> F::Output {
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        let _done = scopeguard::guard(&self.in_flight, |n| {
            n.fetch_sub(1, Ordering::SeqCst);
        });
        fut.await
    }

    fn capture(&self) -> (PageRequest, Filters) {
        let state = self.state.read();
        (state.last_page, state.filters.clone())
    }

    async fn refetch(&self, page: PageRequest, filters: &Filters) {
        if let Err(e) = self.load(page, filters).await {
            tracing::warn!(resource = R::NAME, "Refresh after mutation failed: {}", e);
        }
    }

    async fn load(&self, page: PageRequest, filters: &Filters) -> Result<PageSnapshot<R::Item>> {
        let query = (R::ENVELOPE == Envelope::Paged).then(|| list_query(page, R::FILTERS, filters));
        match &self.coalescer {
            Some(coalescer) => coalescer.run(|| self.fetch(page, query)).await,
            None => self.fetch(page, query).await,
        }
    }

    async fn fetch(&self, page: PageRequest, query: Option<Query>) -> Result<PageSnapshot<R::Item>> {
        self.track(async {
            let ticket = {
                let mut state = self.state.write();
                state.generation += 1;
                state.generation
            };
            let cancelled = self.cancel.notified();

            tracing::debug!(
                resource = R::NAME,
                query = %query.as_ref().map(Query::to_string).unwrap_or_default(),
                "Fetching list"
            );

            let response = tokio::select! {
                _ = cancelled => Err(ApiError::Cancelled),
                res = self.client.get::<Value>(R::PATH, query.as_ref()) => res,
            };

            let snapshot = match response.and_then(decode_listing::<R::Item>) {
                Ok(snapshot) => snapshot,
                Err(ApiError::Cancelled) => return Err(ApiError::Cancelled),
                Err(e) => {
                    tracing::error!(resource = R::NAME, "Failed to fetch list: {}", e);
                    return Err(e);
                }
            };

            let mut state = self.state.write();
            if state.generation != ticket {
                tracing::debug!(resource = R::NAME, ticket, "Discarding superseded list response");
                return Err(ApiError::Cancelled);
            }
            state.items = snapshot.items.clone();
            state.total = snapshot.total;
            state.last_page = page;
            Ok(snapshot)
        })
        .await
    }

    /// Swap the buffered copies of `id` for `value`. Returns whether any
    /// loaded record was replaced.
    fn replace_record(&self, id: i64, value: &Value) -> bool {
        let item: R::Item = match serde_json::from_value(value.clone()) {
            Ok(item) => item,
            Err(e) => {
                tracing::warn!(resource = R::NAME, id, "Update response is not a full record: {}", e);
                return false;
            }
        };

        let mut state = self.state.write();
        let mut replaced = false;
        if let Some(slot) = state.items.iter_mut().find(|i| i.id() == id) {
            *slot = item;
            replaced = true;
        }
        if state.current.as_ref().is_some_and(|c| c.id() == id) {
            if let Ok(detail) = serde_json::from_value::<R::Detail>(value.clone()) {
                state.current = Some(detail);
                replaced = true;
            }
        }
        if !replaced {
            tracing::debug!(resource = R::NAME, id, "Updated record is not loaded");
        }
        replaced
    }
}

/// Decode any of the list envelopes into a snapshot.
fn decode_listing<T: DeserializeOwned>(value: Value) -> Result<PageSnapshot<T>> {
    if value.is_array() {
        let items: Vec<T> = serde_json::from_value(value)?;
        return Ok(PageSnapshot {
            total: items.len() as u64,
            items,
        });
    }
    let page: Page<T> = serde_json::from_value(value)?;
    Ok(PageSnapshot {
        total: page.total_or_len(),
        items: page.data,
    })
}
