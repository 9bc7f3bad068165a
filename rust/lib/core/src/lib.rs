pub mod config;
pub mod error;
pub mod resource;
pub mod types;

pub use config::AdminConfig;
pub use error::{ErrorBody, ServiceError};
pub use resource::Resource;
pub use types::{ApiResponse, ListParams, new_id, now_rfc3339};
