use std::any::Any;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use crate::trie::Trie;
use crate::value::{StateValue, SubscriptionId};

/// Callback type for state change notifications.
pub type ChangeHandler = Arc<dyn Fn(&str, &StateValue) + Send + Sync>;

/// Path-addressed state shared between the data layer and renderers.
///
/// Paths used by the admin client:
/// - `app/route`, `app/page`: current navigation target and page title
/// - `query/{key}`: snapshot of every cached query
/// - `form/{entity}/draft|errors|busy`: live form controller state
///
/// `set` stores a value and synchronously notifies subscribers whose
/// pattern (`+` / `#` wildcards) matches the path. Values are kept in a
/// `BTreeMap` so `scan(prefix)` is an ordered range read.
pub struct StateStore {
    values: RwLock<BTreeMap<String, StateValue>>,
    handlers: Trie<HandlerEntry>,
    next_id: AtomicU64,
}

#[derive(Clone)]
struct HandlerEntry {
    id: SubscriptionId,
    handler: ChangeHandler,
}

impl StateStore {
    pub fn new() -> Self {
        Self {
            values: RwLock::new(BTreeMap::new()),
            handlers: Trie::new(),
            next_id: AtomicU64::new(1),
        }
    }

    /// Set a typed value at the given path and notify matching subscribers.
    pub fn set<T: Any + Send + Sync>(&self, path: &str, value: T) {
        self.set_value(path, StateValue::new(value));
    }

    /// Set a pre-built value and notify matching subscribers.
    ///
    /// The write lock is released before handlers run, so a handler may
    /// read the store.
    pub fn set_value(&self, path: &str, value: StateValue) {
        {
            let mut values = self.values.write().unwrap_or_else(PoisonError::into_inner);
            values.insert(path.to_string(), value.clone());
        }
        for entry in self.handlers.match_topic(path) {
            (entry.handler)(path, &value);
        }
    }

    pub fn get(&self, path: &str) -> Option<StateValue> {
        let values = self.values.read().unwrap_or_else(PoisonError::into_inner);
        values.get(path).cloned()
    }

    /// Read the value at `path` as `T`.
    ///
    /// Returns `None` when the path is unset or holds another type.
    pub fn get_as<T: Any + Send + Sync>(&self, path: &str) -> Option<Arc<T>> {
        self.get(path)?.downcast::<T>()
    }

    /// Remove the value at `path`. Does NOT notify subscribers.
    pub fn remove(&self, path: &str) -> Option<StateValue> {
        let mut values = self.values.write().unwrap_or_else(PoisonError::into_inner);
        values.remove(path)
    }

    /// Entries strictly under `{prefix}/`, ordered by path.
    pub fn scan(&self, prefix: &str) -> Vec<(String, StateValue)> {
        let values = self.values.read().unwrap_or_else(PoisonError::into_inner);
        let scan_prefix = format!("{}/", prefix.trim_end_matches('/'));
        values
            .range(scan_prefix.clone()..)
            .take_while(|(k, _)| k.starts_with(&scan_prefix))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    pub fn contains(&self, path: &str) -> bool {
        let values = self.values.read().unwrap_or_else(PoisonError::into_inner);
        values.contains_key(path)
    }

    pub fn len(&self) -> usize {
        let values = self.values.read().unwrap_or_else(PoisonError::into_inner);
        values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Subscribe to changes on paths matching `pattern`.
    pub fn subscribe<F>(&self, pattern: &str, handler: F) -> SubscriptionId
    where
        F: Fn(&str, &StateValue) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.handlers.insert(
            pattern,
            HandlerEntry {
                id,
                handler: Arc::new(handler),
            },
        );
        id
    }

    /// Unsubscribe a handler by its ID and the pattern it was registered with.
    pub fn unsubscribe(&self, pattern: &str, id: SubscriptionId) {
        self.handlers.remove(pattern, |entry| entry.id == id);
    }

    /// All stored paths, ordered.
    pub fn paths(&self) -> Vec<String> {
        let values = self.values.read().unwrap_or_else(PoisonError::into_inner);
        values.keys().cloned().collect()
    }
}

impl Default for StateStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn set_get_and_overwrite() {
        let store = StateStore::new();
        store.set("app/route", "/admin/ont".to_string());
        store.set("app/route", "/admin/stb".to_string());

        let v = store.get("app/route").unwrap();
        assert_eq!(v.downcast_ref::<String>().unwrap(), "/admin/stb");
        assert!(store.get("app/page").is_none());
    }

    #[test]
    fn get_as_downcasts_or_none() {
        let store = StateStore::new();
        store.set("form/ont/busy", true);

        assert_eq!(store.get_as::<bool>("form/ont/busy").as_deref(), Some(&true));
        assert!(store.get_as::<String>("form/ont/busy").is_none());
        assert!(store.get_as::<bool>("form/stb/busy").is_none());
    }

    #[test]
    fn remove_does_not_notify() {
        let store = StateStore::new();
        let hits = Arc::new(AtomicU64::new(0));
        let h = hits.clone();
        store.subscribe("#", move |_, _| {
            h.fetch_add(1, Ordering::Relaxed);
        });

        store.set("query/ont/list", 1u32);
        assert!(store.remove("query/ont/list").is_some());
        assert!(store.remove("query/ont/list").is_none());
        assert_eq!(hits.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn scan_returns_ordered_children_only() {
        let store = StateStore::new();
        store.set("query/ont", 0u32);
        store.set("query/ont/list", 1u32);
        store.set("query/ont/detail/7", 2u32);
        store.set("query/ontology", 3u32);

        let paths: Vec<String> = store.scan("query/ont").into_iter().map(|(k, _)| k).collect();
        assert_eq!(paths, vec!["query/ont/detail/7", "query/ont/list"]);
        assert_eq!(store.scan("query/ont/").len(), 2);
    }

    #[test]
    fn len_contains_paths() {
        let store = StateStore::new();
        assert!(store.is_empty());
        store.set("b", 1u32);
        store.set("a", 2u32);

        assert_eq!(store.len(), 2);
        assert!(store.contains("a"));
        assert_eq!(store.paths(), vec!["a", "b"]);
    }

    #[test]
    fn subscribers_receive_path_and_value() {
        let store = StateStore::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let s = seen.clone();
        store.subscribe("form/+/errors", move |path, value| {
            let n = *value.downcast_ref::<usize>().unwrap();
            s.lock().unwrap().push((path.to_string(), n));
        });

        store.set("form/ont/errors", 2usize);
        store.set("form/ont/draft", 9usize);
        store.set("form/stb/errors", 0usize);

        assert_eq!(
            *seen.lock().unwrap(),
            vec![("form/ont/errors".to_string(), 2), ("form/stb/errors".to_string(), 0)]
        );
    }

    #[test]
    fn unsubscribe_keeps_other_handlers() {
        let store = StateStore::new();
        let a = Arc::new(AtomicU64::new(0));
        let b = Arc::new(AtomicU64::new(0));
        let (ac, bc) = (a.clone(), b.clone());
        let id_a = store.subscribe("query/#", move |_, _| {
            ac.fetch_add(1, Ordering::Relaxed);
        });
        store.subscribe("query/#", move |_, _| {
            bc.fetch_add(1, Ordering::Relaxed);
        });

        store.set("query/location/list", 1u32);
        store.unsubscribe("query/#", id_a);
        store.set("query/location/list", 2u32);

        assert_eq!(a.load(Ordering::Relaxed), 1);
        assert_eq!(b.load(Ordering::Relaxed), 2);
    }

    #[test]
    fn handler_can_read_store_during_notification() {
        let store = Arc::new(StateStore::new());
        let observed = Arc::new(Mutex::new(None));
        let (st, ob) = (Arc::downgrade(&store), observed.clone());
        store.subscribe("app/route", move |path, _| {
            if let Some(st) = st.upgrade() {
                *ob.lock().unwrap() = st.get_as::<String>(path);
            }
        });

        store.set("app/route", "/admin/cable".to_string());
        assert_eq!(
            observed.lock().unwrap().as_deref().map(String::as_str),
            Some("/admin/cable")
        );
    }

    #[test]
    fn concurrent_set_and_get() {
        let store = Arc::new(StateStore::new());
        let handles: Vec<_> = (0..8u32)
            .map(|i| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    let path = format!("query/e{}", i);
                    store.set(&path, i);
                    store.get_as::<u32>(&path).map(|v| *v)
                })
            })
            .collect();
        for (i, h) in handles.into_iter().enumerate() {
            assert_eq!(h.join().unwrap(), Some(i as u32));
        }
        assert_eq!(store.len(), 8);
    }
}
