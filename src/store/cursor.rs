//! Cursor-paginated, per-language resource store.

use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use super::Coalescer;
use crate::errors::Result;
use crate::http::{ApiClient, Body, Query};
use crate::models::{CursorPage, Identified, Lang, LocalizedDetail};

/// A resource listed one language at a time, with opaque cursors.
pub trait CursorResource: Send + Sync + 'static {
    const NAME: &'static str;
    const PATH: &'static str;
    const DEFAULT_LIMIT: u32 = 20;

    type Item: Identified + Clone + DeserializeOwned + Send + Sync + 'static;
}

/// One language's loaded page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CursorSnapshot<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub next_cursor: Option<String>,
}

impl<T> Default for CursorSnapshot<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            total: 0,
            next_cursor: None,
        }
    }
}

struct CursorState<T> {
    pages: HashMap<Lang, CursorSnapshot<T>>,
    details: HashMap<Lang, HashMap<i64, LocalizedDetail>>,
    current: Option<T>,
}

pub struct CursorStore<R: CursorResource> {
    client: ApiClient,
    state: RwLock<CursorState<R::Item>>,
    in_flight: AtomicUsize,
    /// One details request per `(lang, id)` at a time.
    details_in_flight: Mutex<HashMap<(Lang, i64), Arc<Coalescer<LocalizedDetail>>>>,
    _resource: PhantomData<R>,
}

impl<R: CursorResource> CursorStore<R> {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            state: RwLock::new(CursorState {
                pages: HashMap::new(),
                details: HashMap::new(),
                current: None,
            }),
            in_flight: AtomicUsize::new(0),
            details_in_flight: Mutex::new(HashMap::new()),
            _resource: PhantomData,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    /// Loaded page for `lang`; empty until the first successful list.
    pub fn snapshot(&self, lang: Lang) -> CursorSnapshot<R::Item> {
        self.state
            .read()
            .pages
            .get(&lang)
            .cloned()
            .unwrap_or_default()
    }

    pub fn current(&self) -> Option<R::Item> {
        self.state.read().current.clone()
    }

    pub fn cached_detail(&self, id: i64, lang: Lang) -> Option<LocalizedDetail> {
        self.state
            .read()
            .details
            .get(&lang)
            .and_then(|by_id| by_id.get(&id))
            .cloned()
    }

    /// GET `<path>?limit&lang[&cursor]`; replaces the buffer of `lang`.
    pub async fn list(
        &self,
        lang: Lang,
        limit: u32,
        cursor: Option<&str>,
    ) -> Result<CursorSnapshot<R::Item>> {
        let query = Query::cursor(limit, lang.as_str(), cursor);
        let page: CursorPage<R::Item> = self
            .tracked(self.client.get(R::PATH, Some(&query)))
            .await
            .inspect_err(|e| {
                tracing::error!(resource = R::NAME, lang = %lang, "Failed to fetch list: {}", e)
            })?;

        let snapshot = CursorSnapshot {
            total: page.total.unwrap_or(page.data.len() as u64),
            items: page.data,
            next_cursor: page.next_cursor,
        };
        self.state.write().pages.insert(lang, snapshot.clone());
        Ok(snapshot)
    }

    /// GET `<path>/:id?lang`; fills the current slot.
    pub async fn get_by_id(&self, id: i64, lang: Lang) -> Result<R::Item> {
        let query = Query::new().push("lang", lang.as_str());
        let item: R::Item = self
            .tracked(self.client.get(&format!("{}/{}", R::PATH, id), Some(&query)))
            .await
            .inspect_err(|e| tracing::error!(resource = R::NAME, id, "Failed to fetch by id: {}", e))?;
        self.state.write().current = Some(item.clone());
        Ok(item)
    }

    /// GET `<path>/:id/detail?lang`, served from the per-language cache when
    /// already fetched. Concurrent calls for the same record share one
    /// request.
    pub async fn details(&self, id: i64, lang: Lang) -> Result<LocalizedDetail> {
        if let Some(hit) = self.cached_detail(id, lang) {
            return Ok(hit);
        }

        let coalescer = self
            .details_in_flight
            .lock()
            .entry((lang, id))
            .or_default()
            .clone();
        let result = coalescer.run(|| self.fetch_details(id, lang)).await;

        let mut in_flight = self.details_in_flight.lock();
        if !coalescer.is_running() {
            in_flight.remove(&(lang, id));
        }
        result
    }

    async fn fetch_details(&self, id: i64, lang: Lang) -> Result<LocalizedDetail> {
        let query = Query::new().push("lang", lang.as_str());
        let detail: LocalizedDetail = self
            .tracked(self.client.get(&format!("{}/{}/detail", R::PATH, id), Some(&query)))
            .await
            .inspect_err(|e| {
                tracing::error!(resource = R::NAME, id, lang = %lang, "Failed to fetch details: {}", e)
            })?;

        self.state
            .write()
            .details
            .entry(lang)
            .or_default()
            .insert(id, detail.clone());
        Ok(detail)
    }

    /// Drop cached details for one language, or for all of them.
    pub fn clear_details_cache(&self, lang: Option<Lang>) {
        let mut state = self.state.write();
        match lang {
            Some(lang) => {
                state.details.remove(&lang);
            }
            None => state.details.clear(),
        }
    }

    pub async fn create(&self, body: Body) -> Result<Value> {
        let created = self
            .tracked(self.client.post::<Value>(R::PATH, body))
            .await
            .inspect_err(|e| tracing::error!(resource = R::NAME, "Failed to create: {}", e))?;
        tracing::info!(resource = R::NAME, "Created record");
        Ok(created)
    }

    /// Update a record; its cached details become stale and are dropped.
    pub async fn update(&self, id: i64, body: Body) -> Result<Value> {
        let updated = self
            .tracked(self.client.put::<Value>(&format!("{}/{}", R::PATH, id), body))
            .await
            .inspect_err(|e| tracing::error!(resource = R::NAME, id, "Failed to update: {}", e))?;
        self.forget(id);
        tracing::info!(resource = R::NAME, id, "Updated record");
        Ok(updated)
    }

    /// Delete a record and remove it from every loaded language page.
    pub async fn delete(&self, id: i64) -> Result<()> {
        self.tracked(self.client.delete(&format!("{}/{}", R::PATH, id)))
            .await
            .inspect_err(|e| tracing::error!(resource = R::NAME, id, "Failed to delete: {}", e))?;

        self.forget(id);
        let mut state = self.state.write();
        for page in state.pages.values_mut() {
            let before = page.items.len();
            page.items.retain(|item| item.id() != id);
            if page.items.len() < before {
                page.total = page.total.saturating_sub(1);
            }
        }
        if state.current.as_ref().is_some_and(|c| c.id() == id) {
            state.current = None;
        }
        tracing::info!(resource = R::NAME, id, "Deleted record");
        Ok(())
    }

    fn forget(&self, id: i64) {
        for by_id in self.state.write().details.values_mut() {
            by_id.remove(&id);
        }
    }

    async fn tracked<F: std::future::Future>(&self, fut: F) -> F::Output {
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        let _done = scopeguard::guard(&self.in_flight, |n| {
            n.fetch_sub(1, Ordering::SeqCst);
        });
        fut.await
    }
}
