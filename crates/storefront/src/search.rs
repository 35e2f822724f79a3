//! Debounced live search.
//!
//! Every keystroke restarts a quiet-window timer; only the keyword still
//! current when the timer fires reaches the network. Requests already in
//! flight are never cancelled. Instead each one carries a sequence number and
//! its response is dropped unless it belongs to the newest keystroke and the
//! [`LiveSearch`] is still alive.

use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use navdana_core::Product;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::api::{ApiClient, ApiError};
use crate::config::DEFAULT_SEARCH_DEBOUNCE;

/// Backend that can answer a keyword search.
pub trait ProductSearch: Send + Sync + 'static {
    /// Search products by keyword.
    fn search_products(
        &self,
        keyword: &str,
    ) -> impl Future<Output = Result<Vec<Product>, ApiError>> + Send;
}

impl ProductSearch for ApiClient {
    fn search_products(
        &self,
        keyword: &str,
    ) -> impl Future<Output = Result<Vec<Product>, ApiError>> + Send {
        Self::search_products(self, keyword)
    }
}

/// What the search dropdown shows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchState {
    /// Keyword as last typed.
    pub keyword: String,
    /// Results for the newest keyword that has completed.
    pub results: Vec<Product>,
    /// A request for `keyword` is scheduled or in flight.
    pub loading: bool,
}

struct Shared {
    latest: AtomicU64,
    alive: AtomicBool,
    state: watch::Sender<SearchState>,
}

impl Shared {
    fn is_current(&self, seq: u64) -> bool {
        self.alive.load(Ordering::Acquire) && self.latest.load(Ordering::Acquire) == seq
    }
}

/// Debounced search box state.
pub struct LiveSearch<S = ApiClient> {
    backend: Arc<S>,
    debounce: Duration,
    shared: Arc<Shared>,
    timer: Mutex<Option<JoinHandle<()>>>,
}

impl<S> std::fmt::Debug for LiveSearch<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LiveSearch")
            .field("debounce", &self.debounce)
            .field("latest", &self.shared.latest.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl<S: ProductSearch> LiveSearch<S> {
    /// Create a live search with the given quiet window.
    #[must_use]
    pub fn new(backend: S, debounce: Duration) -> Self {
        Self::from_arc(Arc::new(backend), debounce)
    }

    /// Create a live search with the default 300 ms quiet window.
    #[must_use]
    pub fn with_default_debounce(backend: S) -> Self {
        Self::new(backend, DEFAULT_SEARCH_DEBOUNCE)
    }

    /// Create a live search over a shared backend.
    #[must_use]
    pub fn from_arc(backend: Arc<S>, debounce: Duration) -> Self {
        let (state, _) = watch::channel(SearchState::default());
        Self {
            backend,
            debounce,
            shared: Arc::new(Shared {
                latest: AtomicU64::new(0),
                alive: AtomicBool::new(true),
                state,
            }),
            timer: Mutex::new(None),
        }
    }

    /// Record a keystroke.
    ///
    /// A blank keyword clears the results immediately without a request.
    /// Anything else (re)starts the quiet-window timer.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn search(&self, keyword: &str) {
        let seq = self.shared.latest.fetch_add(1, Ordering::AcqRel) + 1;

        if let Some(timer) = self
            .timer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            timer.abort();
        }

        if keyword.trim().is_empty() {
            self.shared.state.send_replace(SearchState {
                keyword: keyword.to_string(),
                results: Vec::new(),
                loading: false,
            });
            return;
        }

        self.shared.state.send_modify(|state| {
            state.keyword = keyword.to_string();
            state.loading = true;
        });

        let backend = Arc::clone(&self.backend);
        let shared = Arc::clone(&self.shared);
        let debounce = self.debounce;
        let keyword = keyword.trim().to_string();

        tracing::debug!(seq, keyword = %keyword, ?debounce, "Scheduling search");
        let timer = tokio::spawn(async move {
            tokio::time::sleep(debounce).await;
            if !shared.is_current(seq) {
                return;
            }
            // Detached so the next keystroke's abort never reaches it.
            tokio::spawn(fetch(backend, shared, seq, keyword));
        });

        *self.timer.lock().unwrap_or_else(PoisonError::into_inner) = Some(timer);
    }

    /// Current dropdown state.
    #[must_use]
    pub fn state(&self) -> SearchState {
        self.shared.state.borrow().clone()
    }

    /// Results for the newest completed keyword.
    #[must_use]
    pub fn results(&self) -> Vec<Product> {
        self.shared.state.borrow().results.clone()
    }

    /// Watch the dropdown state.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SearchState> {
        self.shared.state.subscribe()
    }
}

async fn fetch<S: ProductSearch>(backend: Arc<S>, shared: Arc<Shared>, seq: u64, keyword: String) {
    let results = match backend.search_products(&keyword).await {
        Ok(products) => products,
        Err(e) => {
            tracing::warn!(error = %e, keyword = %keyword, "Live search failed");
            Vec::new()
        }
    };

    if !shared.is_current(seq) {
        tracing::debug!(seq, keyword = %keyword, "Discarding stale search response");
        return;
    }

    shared.state.send_modify(|state| {
        state.results = results;
        state.loading = false;
    });
}

impl<S> Drop for LiveSearch<S> {
    fn drop(&mut self) {
        self.shared.alive.store(false, Ordering::Release);
        if let Some(timer) = self
            .timer
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            timer.abort();
        }
    }
}
