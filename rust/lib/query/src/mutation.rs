use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use netadmin_client::ResourceApi;
use netadmin_core::{ApiResponse, Resource};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::cache::{QueryCache, QueryError};
use crate::key::QueryKey;

/// A write against one entity collection.
///
/// Serialized as `{"type": "create", "data": {..}}`,
/// `{"type": "update", "id": "7", "data": {..}}` or
/// `{"type": "delete", "id": "7"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MutationRequest {
    Create { data: Value },
    Update { id: String, data: Value },
    Delete { id: String },
}

impl MutationRequest {
    pub fn kind(&self) -> &'static str {
        match self {
            MutationRequest::Create { .. } => "create",
            MutationRequest::Update { .. } => "update",
            MutationRequest::Delete { .. } => "delete",
        }
    }

    pub fn id(&self) -> Option<&str> {
        match self {
            MutationRequest::Create { .. } => None,
            MutationRequest::Update { id, .. } | MutationRequest::Delete { id } => Some(id),
        }
    }
}

/// Result of a successful mutation.
#[derive(Debug, Clone)]
pub enum MutationOutcome<T> {
    /// Create or update: the record as stored by the backend.
    Saved(ApiResponse<T>),
    Deleted { id: String, response: ApiResponse<Value> },
}

impl<T> MutationOutcome<T> {
    pub fn message(&self) -> Option<&str> {
        match self {
            MutationOutcome::Saved(resp) => resp.message.as_deref(),
            MutationOutcome::Deleted { response, .. } => response.message.as_deref(),
        }
    }
}

#[derive(Default)]
struct MutationShared {
    pending: AtomicUsize,
    error: Mutex<Option<QueryError>>,
}

/// Decrements the pending count however the mutation future ends.
struct PendingGuard<'a>(&'a AtomicUsize);

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Mutation lifecycle of one entity: `pending`, last `error`, and
/// [`MutationHook::mutate_async`].
///
/// Clones share state, so a view and the form that drives it observe the
/// same pending flag.
pub struct MutationHook<T: Resource> {
    api: Arc<dyn ResourceApi<T>>,
    cache: Arc<QueryCache>,
    shared: Arc<MutationShared>,
}

impl<T: Resource> Clone for MutationHook<T> {
    fn clone(&self) -> Self {
        Self {
            api: Arc::clone(&self.api),
            cache: Arc::clone(&self.cache),
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T: Resource> MutationHook<T> {
    pub fn new(api: Arc<dyn ResourceApi<T>>, cache: Arc<QueryCache>) -> Self {
        Self {
            api,
            cache,
            shared: Arc::default(),
        }
    }

    pub fn is_pending(&self) -> bool {
        self.shared.pending.load(Ordering::SeqCst) > 0
    }

    /// Error of the most recent mutation, cleared by the next success.
    pub fn error(&self) -> Option<QueryError> {
        self.shared
            .error
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn set_error(&self, error: Option<QueryError>) {
        *self.shared.error.lock().unwrap_or_else(PoisonError::into_inner) = error;
    }

    /// Send `request` and wait for the backend.
    ///
    /// On success every query of the entity is invalidated before this
    /// returns, so a read issued afterwards observes the write. Failures
    /// are returned to the caller and never retried.
    pub async fn mutate_async(&self, request: MutationRequest) -> Result<MutationOutcome<T>, QueryError> {
        self.shared.pending.fetch_add(1, Ordering::SeqCst);
        let _pending = PendingGuard(&self.shared.pending);

        let result = match &request {
            MutationRequest::Create { data } => self.api.create(data).await.map(MutationOutcome::Saved),
            MutationRequest::Update { id, data } => {
                self.api.update(id, data).await.map(MutationOutcome::Saved)
            }
            MutationRequest::Delete { id } => self
                .api
                .delete(id)
                .await
                .map(|response| MutationOutcome::Deleted {
                    id: id.clone(),
                    response,
                }),
        };

        match result {
            Ok(outcome) => {
                self.set_error(None);
                let invalidated = self.cache.invalidate(&QueryKey::entity(T::NAME));
                info!(
                    resource = T::NAME,
                    kind = request.kind(),
                    id = request.id(),
                    invalidated,
                    "mutation applied"
                );
                Ok(outcome)
            }
            Err(err) => {
                let err = QueryError::from(err);
                warn!(resource = T::NAME, kind = request.kind(), error = %err, "mutation failed");
                self.set_error(Some(err.clone()));
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_wire_shape() {
        let update = MutationRequest::Update {
            id: "7".into(),
            data: json!({"serialNumber": "ZTE1"}),
        };
        assert_eq!(
            serde_json::to_value(&update).unwrap(),
            json!({"type": "update", "id": "7", "data": {"serialNumber": "ZTE1"}})
        );

        let delete: MutationRequest = serde_json::from_value(json!({"type": "delete", "id": "3"})).unwrap();
        assert_eq!(delete.kind(), "delete");
        assert_eq!(delete.id(), Some("3"));

        let create = MutationRequest::Create { data: json!({}) };
        assert_eq!(create.id(), None);
    }
}
