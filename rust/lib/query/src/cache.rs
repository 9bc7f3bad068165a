use std::any::Any;
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use netadmin_client::ApiError;
use netadmin_flux::{StateStore, StateValue};
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::key::QueryKey;

/// Failure of a query, shared by every caller waiting on the same fetch.
///
/// Causes are not classified: auth failures, server errors and network
/// loss all surface as one message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct QueryError {
    pub message: String,
}

impl QueryError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<ApiError> for QueryError {
    fn from(err: ApiError) -> Self {
        Self::new(err.to_string())
    }
}

type Outcome = Result<StateValue, QueryError>;

#[derive(Default)]
struct Entry {
    value: Option<StateValue>,
    error: Option<QueryError>,
    fetched_at: Option<Instant>,
    /// Bumped by every invalidation; a fetch that started under an older
    /// generation cannot make the entry fresh.
    generation: u64,
    stale: bool,
    inflight: Option<watch::Receiver<Option<Outcome>>>,
}

impl Entry {
    fn is_fresh(&self, stale_time: Duration) -> bool {
        !self.stale
            && self.value.is_some()
            && self.fetched_at.is_some_and(|t| t.elapsed() < stale_time)
    }

    fn snapshot(&self) -> QuerySnapshot {
        QuerySnapshot {
            data: self.value.clone(),
            is_loading: self.inflight.is_some(),
            is_stale: self.stale,
            error: self.error.clone(),
        }
    }
}

/// Type-erased query state, published to the store at `query/{key}`.
#[derive(Debug, Clone, Default)]
pub struct QuerySnapshot {
    pub data: Option<StateValue>,
    pub is_loading: bool,
    pub is_stale: bool,
    pub error: Option<QueryError>,
}

/// Typed `{data, isLoading, error}` view of one query.
#[derive(Debug, Clone)]
pub struct QueryState<T> {
    pub data: Option<Arc<T>>,
    pub is_loading: bool,
    pub error: Option<QueryError>,
}

impl<T> Default for QueryState<T> {
    fn default() -> Self {
        Self {
            data: None,
            is_loading: false,
            error: None,
        }
    }
}

enum Begin {
    Hit(StateValue),
    Join(watch::Receiver<Option<Outcome>>),
    Lead {
        tx: watch::Sender<Option<Outcome>>,
        rx: watch::Receiver<Option<Outcome>>,
        generation: u64,
    },
}

/// Shared cache of remote reads, keyed by [`QueryKey`].
///
/// - A fresh entry is returned without calling the fetcher.
/// - At most one fetch per key is in flight; concurrent callers await it.
/// - The fetch runs on a spawned task, so it finishes and fills the
///   cache even if every caller stops waiting.
/// - [`QueryCache::invalidate`] marks a key prefix stale; the next read
///   refetches.
pub struct QueryCache {
    store: Arc<StateStore>,
    entries: Mutex<HashMap<QueryKey, Entry>>,
    stale_time: Duration,
}

impl QueryCache {
    pub fn new(store: Arc<StateStore>, stale_time: Duration) -> Self {
        Self {
            store,
            entries: Mutex::new(HashMap::new()),
            stale_time,
        }
    }

    pub fn store(&self) -> &Arc<StateStore> {
        &self.store
    }

    pub fn stale_time(&self) -> Duration {
        self.stale_time
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<QueryKey, Entry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Read `key`, fetching through `fetcher` when the cache has no fresh
    /// value.
    ///
    /// `fetcher` is only invoked by the caller that starts a fetch.
    pub async fn fetch<T, F, Fut>(self: &Arc<Self>, key: QueryKey, fetcher: F) -> Result<Arc<T>, QueryError>
    where
        T: Any + Send + Sync,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, QueryError>> + Send + 'static,
    {
        let outcome = match self.begin(&key) {
            Begin::Hit(value) => {
                debug!(%key, "query cache hit");
                Ok(value)
            }
            Begin::Join(rx) => {
                debug!(%key, "joining in-flight query");
                wait(rx, &key).await
            }
            Begin::Lead { tx, rx, generation } => {
                debug!(%key, generation, "fetching query");
                self.publish(&key);
                let fut = fetcher();
                let cache = Arc::clone(self);
                let task_key = key.clone();
                tokio::spawn(async move {
                    // Inner task so a panicking fetch still settles the entry.
                    let outcome = match tokio::spawn(fut).await {
                        Ok(result) => result.map(StateValue::new),
                        Err(e) => {
                            warn!(key = %task_key, error = %e, "query fetch did not finish");
                            Err(QueryError::new(format!("query {} failed: {}", task_key, e)))
                        }
                    };
                    cache.complete(&task_key, generation, &outcome);
                    // Nobody listening is fine: the cache already has it.
                    let _ = tx.send(Some(outcome));
                });
                wait(rx, &key).await
            }
        };

        outcome?
            .downcast::<T>()
            .ok_or_else(|| QueryError::new(format!("query {} holds a different type", key)))
    }

    fn begin(&self, key: &QueryKey) -> Begin {
        let mut entries = self.lock();
        let entry = entries.entry(key.clone()).or_default();

        if entry.is_fresh(self.stale_time) {
            if let Some(value) = &entry.value {
                return Begin::Hit(value.clone());
            }
        }
        if let Some(rx) = &entry.inflight {
            return Begin::Join(rx.clone());
        }

        let (tx, rx) = watch::channel(None);
        entry.inflight = Some(rx.clone());
        Begin::Lead {
            tx,
            rx,
            generation: entry.generation,
        }
    }

    fn complete(&self, key: &QueryKey, generation: u64, outcome: &Outcome) {
        {
            let mut entries = self.lock();
            let entry = entries.entry(key.clone()).or_default();

            if entry.generation == generation {
                entry.inflight = None;
                match outcome {
                    Ok(value) => {
                        entry.value = Some(value.clone());
                        entry.error = None;
                        entry.stale = false;
                        entry.fetched_at = Some(Instant::now());
                    }
                    // Old data stays visible but never becomes fresh again.
                    Err(err) => entry.error = Some(err.clone()),
                }
            } else if entry.value.is_none() {
                // Invalidated mid-flight: keep the data for display but
                // leave the entry stale.
                if let Ok(value) = outcome {
                    entry.value = Some(value.clone());
                    entry.fetched_at = Some(Instant::now());
                }
            }
        }

        match outcome {
            Ok(_) => debug!(%key, "query settled"),
            Err(err) => warn!(%key, error = %err, "query failed"),
        }
        self.publish(key);
    }

    /// Mark every key equal to or under `prefix` stale.
    ///
    /// In-flight fetches for those keys are detached: their results can no
    /// longer make the entry fresh, and the next read starts a new fetch.
    /// Returns the number of keys affected.
    pub fn invalidate(&self, prefix: &QueryKey) -> usize {
        let keys: Vec<QueryKey> = {
            let mut entries = self.lock();
            entries
                .iter_mut()
                .filter(|(k, _)| k.is_under(prefix))
                .map(|(k, entry)| {
                    entry.generation += 1;
                    entry.stale = true;
                    entry.inflight = None;
                    k.clone()
                })
                .collect()
        };

        for key in &keys {
            self.publish(key);
        }
        debug!(%prefix, count = keys.len(), "invalidated queries");
        keys.len()
    }

    /// `true` if `key` would be served from cache right now.
    pub fn is_fresh(&self, key: &QueryKey) -> bool {
        self.lock()
            .get(key)
            .is_some_and(|e| e.is_fresh(self.stale_time))
    }

    pub fn snapshot(&self, key: &QueryKey) -> QuerySnapshot {
        self.lock().get(key).map(Entry::snapshot).unwrap_or_default()
    }

    /// Typed view of `key`. Data of another type reads as absent.
    pub fn state<T: Any + Send + Sync>(&self, key: &QueryKey) -> QueryState<T> {
        let snap = self.snapshot(key);
        QueryState {
            data: snap.data.and_then(|v| v.downcast::<T>()),
            is_loading: snap.is_loading,
            error: snap.error,
        }
    }

    fn publish(&self, key: &QueryKey) {
        let snap = self.snapshot(key);
        self.store.set(&key.state_path(), snap);
    }
}

async fn wait(mut rx: watch::Receiver<Option<Outcome>>, key: &QueryKey) -> Outcome {
    let settled = rx
        .wait_for(Option::is_some)
        .await
        .map(|slot| (*slot).clone());
    match settled {
        Ok(Some(outcome)) => outcome,
        _ => Err(QueryError::new(format!("query {} was abandoned", key))),
    }
}
