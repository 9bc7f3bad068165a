//! `netadmin`: command-line front-end of the inventory admin client.
//!
//! Manages contexts and sessions, and drives the admin pages headlessly:
//! the same routes, queries and forms, printed to the terminal.

mod commands;
mod config;

use std::io::Write;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use commands::resource::Output;
use netadmin_inventory::EntityKind;
use tracing_subscriber::EnvFilter;

/// Inventory admin CLI.
#[derive(Parser, Debug)]
#[command(name = "netadmin", about = "Telecom inventory admin client")]
struct Cli {
    /// Path to client config file (default: ~/.netadmin/config.toml).
    #[arg(long = "config", global = true)]
    config: Option<String>,

    /// Override the API endpoint of the current context.
    #[arg(long = "api", global = true)]
    api: Option<String>,

    /// Output format.
    #[arg(long = "output", short = 'o', global = true, value_enum, default_value = "table")]
    output: Output,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Manage contexts.
    Context {
        #[command(subcommand)]
        action: ContextAction,
    },

    /// Switch the current context.
    Use {
        #[command(subcommand)]
        what: UseWhat,
    },

    /// Login to the current context's server.
    Login {
        #[arg(long)]
        user: Option<String>,
        /// Password (prompted when omitted).
        #[arg(long)]
        password: Option<String>,
    },

    /// Clear the token of the current context.
    Logout,

    /// Show the endpoint and whether the stored session is accepted.
    Status,

    /// Print the page route table.
    Routes,

    /// Print the admin menu.
    Menu,

    /// Open a page by path (e.g. /admin/ont/edit/7).
    Open { path: String },

    /// List records of an entity.
    List {
        entity: EntityKind,
        /// Only records at this location (ONT, STB).
        #[arg(long)]
        location: Option<String>,
    },

    /// Show one record.
    Get { entity: EntityKind, id: String },

    /// Create a record through its form.
    Create {
        entity: EntityKind,
        /// Field assignment, repeatable.
        #[arg(long = "set", value_name = "FIELD=VALUE")]
        set: Vec<String>,
    },

    /// Update a record through its form.
    Update {
        entity: EntityKind,
        id: String,
        #[arg(long = "set", value_name = "FIELD=VALUE")]
        set: Vec<String>,
    },

    /// Delete a record.
    Delete {
        entity: EntityKind,
        id: String,
        /// Skip confirmation.
        #[arg(long = "yes", short = 'y')]
        yes: bool,
    },

    /// Show version.
    Version,
}

#[derive(Subcommand, Debug)]
enum ContextAction {
    /// Add or update a context.
    Add {
        name: String,
        /// Base API endpoint, e.g. http://localhost:8080/api.
        #[arg(long)]
        server: String,
    },
    /// List all contexts.
    List,
    /// Delete a context.
    Delete { name: String },
}

#[derive(Subcommand, Debug)]
enum UseWhat {
    /// Switch to a context.
    Context { name: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config_path = cli
        .config
        .map(PathBuf::from)
        .unwrap_or_else(config::ClientConfig::default_path);
    let api = cli.api.as_deref();
    let output = cli.output;

    match cli.command {
        Commands::Context { action } => match action {
            ContextAction::Add { name, server } => commands::context::add(&name, &server, &config_path)?,
            ContextAction::List => commands::context::list(&config_path)?,
            ContextAction::Delete { name } => commands::context::delete(&name, &config_path)?,
        },

        Commands::Use { what } => match what {
            UseWhat::Context { name } => commands::context::use_context(&name, &config_path)?,
        },

        Commands::Login { user, password } => {
            let username = match user {
                Some(u) => u,
                None => {
                    eprint!("Username: ");
                    std::io::stderr().flush()?;
                    let mut s = String::new();
                    std::io::stdin().read_line(&mut s)?;
                    s.trim().to_string()
                }
            };
            let password = match password {
                Some(p) => p,
                None => rpassword::prompt_password("Password: ")?,
            };
            if username.is_empty() || password.is_empty() {
                anyhow::bail!("Username and password are required.");
            }
            commands::login::login(&username, &password, &config_path, api).await?;
        }

        Commands::Logout => commands::login::logout(&config_path)?,

        Commands::Status => commands::login::status(&config_path, api).await?,

        Commands::Routes => commands::resource::routes(),

        Commands::Menu => {
            let shell = commands::connect(&config_path, api)?;
            commands::resource::menu(&shell);
        }

        Commands::Open { path } => {
            let shell = commands::connect(&config_path, api)?;
            commands::resource::open(&shell, &path, output).await?;
        }

        Commands::List { entity, location } => {
            let shell = commands::connect(&config_path, api)?;
            commands::resource::list(&shell, entity, location.as_deref(), output).await?;
        }

        Commands::Get { entity, id } => {
            let shell = commands::connect(&config_path, api)?;
            commands::resource::get(&shell, entity, &id, output).await?;
        }

        Commands::Create { entity, set } => {
            let shell = commands::connect(&config_path, api)?;
            let record = commands::resource::save(&shell, entity, None, &set).await?;
            if output == Output::Json {
                println!("{}", serde_json::to_string_pretty(&record)?);
            }
        }

        Commands::Update { entity, id, set } => {
            let shell = commands::connect(&config_path, api)?;
            let record = commands::resource::save(&shell, entity, Some(&id), &set).await?;
            if output == Output::Json {
                println!("{}", serde_json::to_string_pretty(&record)?);
            }
        }

        Commands::Delete { entity, id, yes } => {
            if !yes {
                eprint!("Delete {} \"{}\"? [y/N]: ", entity, id);
                std::io::stderr().flush()?;
                let mut answer = String::new();
                std::io::stdin().read_line(&mut answer)?;
                if !answer.trim().eq_ignore_ascii_case("y") {
                    println!("Cancelled.");
                    return Ok(());
                }
            }
            let shell = commands::connect(&config_path, api)?;
            commands::resource::delete(&shell, entity, &id).await?;
        }

        Commands::Version => {
            println!("netadmin {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
