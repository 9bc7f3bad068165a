//! Golden tests for the admin client.
//!
//! [`GoldenBackend`] serves the admin REST API from memory over real HTTP;
//! the test modules drive the reqwest client, the query hooks, the form
//! controllers and the page shell against it.

mod backend;

pub use backend::{ADMIN_PASSWORD, ADMIN_USER, COLLECTIONS, GoldenBackend};

mod shell_test;
