//! Inventory admin module: the five managed entities, their form schemas,
//! the route table, the side menu and the page shell tying them to the
//! query cache and form controllers.

pub mod menu;
pub mod model;
pub mod routes;
pub mod shell;

pub use menu::{MenuItem, menu};
pub use model::{Cable, EntityKind, InventoryItem, Location, Ont, Stb};
pub use routes::{Route, all_routes, route_table};
pub use shell::{AdminContext, AdminShell, EntityApis, Page, ShellError};
