//! Client-side context management.
//!
//! Reads/writes `~/.netadmin/config.toml`.

use std::path::{Path, PathBuf};

use netadmin_core::AdminConfig;
use netadmin_core::config::ENV_API_ENDPOINT;
use serde::{Deserialize, Serialize};

/// A named backend: API endpoint plus the token stored by `netadmin login`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Context {
    pub name: String,

    /// Base API endpoint (e.g. "http://localhost:8080/api").
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub server: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub token: String,
}

/// Client configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Name of the currently active context.
    #[serde(rename = "current-context", default)]
    pub current_context: String,

    #[serde(default)]
    pub contexts: Vec<Context>,
}

impl ClientConfig {
    /// Default config file path: ~/.netadmin/config.toml.
    pub fn default_path() -> PathBuf {
        dirs_path().join("config.toml")
    }

    /// Load config from disk, or return default if file doesn't exist.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn current(&self) -> Option<&Context> {
        self.contexts.iter().find(|c| c.name == self.current_context)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Context> {
        self.contexts.iter_mut().find(|c| c.name == name)
    }

    /// Add or replace a context.
    pub fn upsert_context(&mut self, ctx: Context) {
        if let Some(existing) = self.get_mut(&ctx.name) {
            *existing = ctx;
        } else {
            self.contexts.push(ctx);
        }
    }

    /// Remove a context by name. Returns true if it was found.
    pub fn remove_context(&mut self, name: &str) -> bool {
        let len = self.contexts.len();
        self.contexts.retain(|c| c.name != name);
        if self.current_context == name {
            self.current_context = String::new();
        }
        self.contexts.len() < len
    }
}

/// Effective admin configuration.
///
/// The API endpoint comes from `--api`, else `NETADMIN_API_ENDPOINT`,
/// else the current context's server, else the built-in default.
pub fn resolve<F>(lookup: F, ctx: Option<&Context>, api_flag: Option<&str>) -> AdminConfig
where
    F: Fn(&str) -> Option<String>,
{
    let env_has_endpoint = lookup(ENV_API_ENDPOINT).is_some();
    let mut config = AdminConfig::from_env_with(lookup);
    if !env_has_endpoint {
        if let Some(ctx) = ctx.filter(|c| !c.server.is_empty()) {
            config = config.with_args(&[format!("--api={}", ctx.server)]);
        }
    }
    if let Some(api) = api_flag {
        config = config.with_args(&[format!("--api={}", api)]);
    }
    config
}

fn dirs_path() -> PathBuf {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(".netadmin")
}
