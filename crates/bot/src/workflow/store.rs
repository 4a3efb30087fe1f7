//! In-memory store of pending requests.
//!
//! Requests live until the retention window has passed since their
//! identifier was issued. Every lookup sweeps the whole map first, under the
//! same lock, so an expired request is never returned and a concurrent `put`
//! is never lost to the sweep.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, TimeDelta, Utc};
use esa_gatekeeper_core::RequestId;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use super::Clock;
use super::request::PendingRequest;

/// Concurrency-safe map from request identifier to request.
#[derive(Clone)]
pub struct PendingStore {
    inner: Arc<StoreInner>,
}

struct StoreInner {
    requests: Mutex<HashMap<RequestId, PendingRequest>>,
    retention: TimeDelta,
    clock: Clock,
    /// Nanosecond timestamp of the last issued identifier.
    last_issued: AtomicI64,
}

impl std::fmt::Debug for PendingStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingStore")
            .field("retention", &self.inner.retention)
            .finish_non_exhaustive()
    }
}

impl PendingStore {
    #[must_use]
    pub fn new(retention: TimeDelta, clock: Clock) -> Self {
        Self {
            inner: Arc::new(StoreInner {
                requests: Mutex::new(HashMap::new()),
                retention,
                clock,
                last_issued: AtomicI64::new(i64::MIN),
            }),
        }
    }

    /// Current time according to the store's clock.
    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        (self.inner.clock)()
    }

    /// Issue a fresh identifier, strictly later than every identifier issued
    /// before by this store.
    #[must_use]
    pub fn generate(&self) -> RequestId {
        let now = self.now().timestamp_nanos_opt().unwrap_or(i64::MAX - 1);
        let issued = match self.inner.last_issued.fetch_update(
            Ordering::SeqCst,
            Ordering::SeqCst,
            |last| Some(now.max(last.saturating_add(1))),
        ) {
            Ok(last) | Err(last) => now.max(last.saturating_add(1)),
        };
        RequestId::from_timestamp(DateTime::from_timestamp_nanos(issued))
    }

    /// Insert or replace the request stored under its identifier.
    pub async fn put(&self, request: PendingRequest) {
        let mut requests = self.inner.requests.lock().await;
        debug!(request_id = %request.id, "Storing request");
        requests.insert(request.id.clone(), request);
    }

    /// Look up a request, sweeping expired entries first.
    pub async fn get(&self, id: &RequestId) -> Option<PendingRequest> {
        let mut requests = self.inner.requests.lock().await;
        self.sweep_locked(&mut requests);
        requests.get(id).cloned()
    }

    /// Atomically check and update a request.
    ///
    /// `advance` receives the current request and returns its successor,
    /// which replaces it in the store. On `Err` the store is left untouched.
    /// Returns `None` when the request does not exist or has expired.
    pub async fn transition<F, E>(
        &self,
        id: &RequestId,
        advance: F,
    ) -> Option<Result<PendingRequest, E>>
    where
        F: FnOnce(&PendingRequest) -> Result<PendingRequest, E>,
    {
        let mut requests = self.inner.requests.lock().await;
        self.sweep_locked(&mut requests);
        let current = requests.get(id)?;
        Some(advance(current).map(|next| {
            requests.insert(id.clone(), next.clone());
            next
        }))
    }

    /// Remove every expired request. Returns how many were removed.
    pub async fn sweep(&self) -> usize {
        let mut requests = self.inner.requests.lock().await;
        self.sweep_locked(&mut requests)
    }

    /// Number of requests currently held, expired ones included.
    pub async fn len(&self) -> usize {
        self.inner.requests.lock().await.len()
    }

    /// Whether the store holds no request at all.
    pub async fn is_empty(&self) -> bool {
        self.inner.requests.lock().await.is_empty()
    }

    fn sweep_locked(&self, requests: &mut HashMap<RequestId, PendingRequest>) -> usize {
        let now = self.now();
        let retention = self.inner.retention;
        let before = requests.len();
        requests.retain(|id, _| {
            id.issued_at()
                .is_some_and(|issued| now.signed_duration_since(issued) <= retention)
        });
        before - requests.len()
    }

    /// Sweep the store on a fixed period until the runtime shuts down.
    #[must_use]
    pub fn spawn_sweeper(&self, period: std::time::Duration) -> JoinHandle<()> {
        let store = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let removed = store.sweep().await;
                if removed > 0 {
                    info!(removed, "Expired pending requests swept");
                }
            }
        })
    }
}
