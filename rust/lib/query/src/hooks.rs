use std::sync::Arc;

use netadmin_client::ResourceApi;
use netadmin_core::{ListParams, Resource};

use crate::cache::{QueryCache, QueryError, QueryState};
use crate::key::QueryKey;
use crate::mutation::MutationHook;

/// Cached reads and mutations of one entity over a shared [`QueryCache`].
pub struct ResourceHooks<T: Resource> {
    api: Arc<dyn ResourceApi<T>>,
    cache: Arc<QueryCache>,
}

impl<T: Resource> Clone for ResourceHooks<T> {
    fn clone(&self) -> Self {
        Self {
            api: Arc::clone(&self.api),
            cache: Arc::clone(&self.cache),
        }
    }
}

impl<T: Resource> ResourceHooks<T> {
    pub fn new(api: Arc<dyn ResourceApi<T>>, cache: Arc<QueryCache>) -> Self {
        Self { api, cache }
    }

    pub fn api(&self) -> &Arc<dyn ResourceApi<T>> {
        &self.api
    }

    pub fn cache(&self) -> &Arc<QueryCache> {
        &self.cache
    }

    /// List the collection, optionally scoped by `params`.
    pub async fn list(&self, params: &ListParams) -> Result<Arc<Vec<T>>, QueryError> {
        let api = Arc::clone(&self.api);
        let owned = params.clone();
        self.cache
            .fetch(QueryKey::list(T::NAME, params), move || async move {
                Ok::<_, QueryError>(api.list(&owned).await?.data)
            })
            .await
    }

    /// Fetch one record.
    pub async fn by_id(&self, id: &str) -> Result<Arc<T>, QueryError> {
        let api = Arc::clone(&self.api);
        let owned = id.to_string();
        self.cache
            .fetch(QueryKey::detail(T::NAME, id), move || async move {
                Ok::<_, QueryError>(api.get(&owned).await?.data)
            })
            .await
    }

    pub fn list_state(&self, params: &ListParams) -> QueryState<Vec<T>> {
        self.cache.state(&QueryKey::list(T::NAME, params))
    }

    pub fn detail_state(&self, id: &str) -> QueryState<T> {
        self.cache.state(&QueryKey::detail(T::NAME, id))
    }

    /// Mark every cached read of this entity stale.
    pub fn invalidate(&self) -> usize {
        self.cache.invalidate(&QueryKey::entity(T::NAME))
    }

    pub fn mutation(&self) -> MutationHook<T> {
        MutationHook::new(Arc::clone(&self.api), Arc::clone(&self.cache))
    }
}
