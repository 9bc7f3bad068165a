use serde::Serialize;
use serde::de::DeserializeOwned;

/// A managed inventory entity exposed by the admin REST API.
///
/// Each entity (location, ONT, STB, cable, inventory item) implements this
/// trait so the client, the query hooks and the form controller can be
/// written once and parametrized per entity.
pub trait Resource: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Singular machine name, used for query keys and state paths (`ont`).
    const NAME: &'static str;

    /// URL segment under the API base (`{base}/{PATH}`).
    const PATH: &'static str;

    /// Human-readable title used by the page shell.
    const LABEL: &'static str;

    /// Backend-assigned identifier. `None` for records never persisted.
    fn id(&self) -> Option<&str>;
}
