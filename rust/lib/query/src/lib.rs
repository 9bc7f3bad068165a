//! Remote Data Hook: shared query cache and mutation lifecycle.
//!
//! [`QueryCache`] is an explicit service injected into every hook: reads
//! are cached by [`QueryKey`], concurrent reads of the same key share one
//! request, and mutations invalidate the keys of the entity they touched.
//! Every state transition is published to the flux [`StateStore`] under
//! `query/{key}` so list views can re-render.
//!
//! [`StateStore`]: netadmin_flux::StateStore

pub mod cache;
pub mod hooks;
pub mod key;
pub mod mutation;

pub use cache::{QueryCache, QueryError, QuerySnapshot, QueryState};
pub use hooks::ResourceHooks;
pub use key::QueryKey;
pub use mutation::{MutationHook, MutationOutcome, MutationRequest};
