pub mod context;
pub mod login;
pub mod resource;

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use netadmin_client::{NoAuth, StaticToken, TokenSource};
use netadmin_inventory::{AdminContext, AdminShell, EntityApis};

use crate::config::{self, ClientConfig};

/// Build a shell against the effective endpoint, authenticated with the
/// current context's token when there is one.
pub fn connect(client_config_path: &Path, api_flag: Option<&str>) -> Result<AdminShell> {
    let client_config = ClientConfig::load(client_config_path)?;
    let ctx = client_config.current();
    let admin = config::resolve(|k| std::env::var(k).ok(), ctx, api_flag);

    let token: Arc<dyn TokenSource> = match ctx.filter(|c| !c.token.is_empty()) {
        Some(c) => Arc::new(StaticToken::new(c.token.clone())),
        None => Arc::new(NoAuth),
    };
    tracing::debug!(endpoint = %admin.api_endpoint, "connecting");

    let apis = EntityApis::http(&admin, token)?;
    Ok(AdminShell::new(AdminContext::new(admin, apis)))
}
