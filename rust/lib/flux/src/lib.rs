//! Flux: path-addressed state for the admin client.
//!
//! Rust owns all state and logic; a renderer (terminal, web view, desktop)
//! only subscribes to paths and draws what it finds there.
//!
//! - [`StateStore`]: `get` / `set` / `scan` / `subscribe` on `/`-separated
//!   paths, with MQTT-style `+` and `#` subscription patterns.
//! - [`RouteTable`]: URL pattern (`/admin/ont/edit/:id`) to handler
//!   resolution with parameter capture.
//! - [`Trie`]: the segment trie both are built on.

pub mod router;
pub mod store;
pub mod trie;
pub mod value;

pub use router::{RouteMatch, RouteTable, build_path};
pub use store::{ChangeHandler, StateStore};
pub use trie::{Resolved, Trie};
pub use value::{StateValue, SubscriptionId};
