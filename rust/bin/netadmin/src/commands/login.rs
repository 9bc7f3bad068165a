//! Login / logout / session status commands.

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use netadmin_client::{AuthClient, PasswordLogin, StaticToken};

use crate::config::{self, ClientConfig};

/// Log in against the current context and store the issued token in it.
pub async fn login(
    username: &str,
    password: &str,
    client_config_path: &Path,
    api_flag: Option<&str>,
) -> Result<()> {
    let mut client_config = ClientConfig::load(client_config_path)?;
    let ctx = client_config
        .current()
        .ok_or_else(|| anyhow::anyhow!("No current context. Run `netadmin use context <name>`."))?
        .clone();
    let admin = config::resolve(|k| std::env::var(k).ok(), Some(&ctx), api_flag);

    let data = PasswordLogin::new(&admin.api_endpoint, username, password)
        .login()
        .await?;

    let ctx_mut = client_config
        .get_mut(&ctx.name)
        .ok_or_else(|| anyhow::anyhow!("Context disappeared"))?;
    ctx_mut.token = data.token;
    client_config.save(client_config_path)?;

    println!("Logged in as {}.", username);
    println!("Token saved to context \"{}\".", ctx.name);
    Ok(())
}

/// Clear the token of the current context.
pub fn logout(client_config_path: &Path) -> Result<()> {
    let mut config = ClientConfig::load(client_config_path)?;

    let current_name = config.current_context.clone();
    if current_name.is_empty() {
        anyhow::bail!("No current context.");
    }

    let ctx = config
        .get_mut(&current_name)
        .ok_or_else(|| anyhow::anyhow!("Current context not found."))?;
    ctx.token = String::new();
    config.save(client_config_path)?;
    println!("Logged out from context \"{}\".", current_name);
    Ok(())
}

/// Ask the backend whether the stored token is still accepted.
pub async fn status(client_config_path: &Path, api_flag: Option<&str>) -> Result<()> {
    let client_config = ClientConfig::load(client_config_path)?;
    let ctx = client_config.current();
    let admin = config::resolve(|k| std::env::var(k).ok(), ctx, api_flag);

    println!("Context:   {}", ctx.map(|c| c.name.as_str()).unwrap_or("-"));
    println!("Endpoint:  {}", admin.api_endpoint);

    let Some(token) = ctx.map(|c| c.token.as_str()).filter(|t| !t.is_empty()) else {
        println!("Session:   not logged in");
        return Ok(());
    };
    let auth = AuthClient::new(&admin.api_endpoint, Arc::new(StaticToken::new(token)));
    match auth.check().await {
        Ok(_) => println!("Session:   valid"),
        Err(e) => println!("Session:   rejected ({})", e),
    }
    Ok(())
}
