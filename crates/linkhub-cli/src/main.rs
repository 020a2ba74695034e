//! LinkHub CLI
//!
//! Command-line interface for LinkHub - a personal, categorized bookmark list.

use std::fs::File;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use linkhub_core::{Config, LinkError};

mod commands;
mod output;
mod prompt;

use commands::link::{AddArgs, EditArgs};
use output::{Output, OutputFormat};

#[derive(Parser)]
#[command(name = "linkhub")]
#[command(about = "LinkHub - Save, organize, and search your links")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Use a specific config file
    #[arg(long = "config", global = true, value_name = "PATH")]
    config_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in as a user
    Login {
        /// User ID that owns the links
        user_id: String,
        /// Email shown in greetings
        #[arg(short, long)]
        email: Option<String>,
        /// Access token for the hosted backend
        #[arg(long)]
        token: Option<String>,
    },
    /// Sign out
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Manage links
    Link {
        #[command(subcommand)]
        command: LinkCommands,
    },
    /// List categories and link counts
    Categories {
        /// Active category filter
        #[arg(short, long)]
        category: Option<String>,
    },
    /// Show or set configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand)]
enum LinkCommands {
    /// Save a new link
    #[command(alias = "create")]
    Add {
        /// URL to save (https:// is added when no scheme is given)
        url: String,
        /// Link title
        #[arg(short, long)]
        title: Option<String>,
        /// Category id (default: first built-in category)
        #[arg(short, long)]
        category: Option<String>,
        /// Short description
        #[arg(short, long)]
        description: Option<String>,
    },
    /// List links grouped by category
    #[command(alias = "ls")]
    List {
        /// Only links whose title, URL, or description contain this text
        #[arg(short, long)]
        search: Option<String>,
        /// Only links in this category
        #[arg(short, long)]
        category: Option<String>,
        /// One list instead of category groups
        #[arg(long)]
        flat: bool,
    },
    /// Show link details
    Show {
        /// Link ID (full UUID or prefix)
        id: String,
    },
    /// Edit a link (prompts when no fields are given)
    Edit {
        /// Link ID (full UUID or prefix)
        id: String,
        /// New title
        #[arg(short, long)]
        title: Option<String>,
        /// New URL
        #[arg(short, long)]
        url: Option<String>,
        /// New category id
        #[arg(short, long)]
        category: Option<String>,
        /// New description (empty to clear)
        #[arg(short, long)]
        description: Option<String>,
    },
    /// Delete a link
    #[command(alias = "rm")]
    Delete {
        /// Link ID (full UUID or prefix)
        id: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Open a link in the browser
    Open {
        /// Link ID (full UUID or prefix)
        id: String,
    },
    /// Search links
    Search {
        /// Search query
        query: String,
    },
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (data_dir, backend, rest_url, api_key, log_file)
        key: String,
        /// Configuration value
        value: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));

    // Config commands work on the file itself, even if it is invalid
    if let Commands::Config { command } = &cli.command {
        return handle_config_command(command.clone(), cli.config_file.as_ref(), &output);
    }

    let config = Config::load_with_cli_override(cli.config_file.as_ref())
        .context("Failed to load configuration")?;
    init_logging(&config);

    let result = run(cli.command, &config, &output).await;
    if let Err(ref e) = result {
        if let Some(hint) = recovery_hint(e) {
            output.message(&format!("Hint: {}", hint));
        }
    }
    result
}

async fn run(command: Commands, config: &Config, output: &Output) -> Result<()> {
    debug!("Using {} backend", config.backend);

    match command {
        Commands::Login {
            user_id,
            email,
            token,
        } => commands::session::login(config, user_id, email, token, output).await,
        Commands::Logout => commands::session::logout(config, output),
        Commands::Whoami => commands::session::whoami(config, output),
        Commands::Link { command } => handle_link_command(command, config, output).await,
        Commands::Categories { category } => {
            commands::category::list(config, category, output).await
        }
        Commands::Config { .. } => unreachable!(), // Handled in main
    }
}

async fn handle_link_command(command: LinkCommands, config: &Config, output: &Output) -> Result<()> {
    match command {
        LinkCommands::Add {
            url,
            title,
            category,
            description,
        } => {
            let args = AddArgs {
                url,
                title,
                category,
                description,
            };
            commands::link::add(config, args, output).await
        }
        LinkCommands::List {
            search,
            category,
            flat,
        } => commands::link::list(config, search, category, flat, output).await,
        LinkCommands::Show { id } => commands::link::show(config, id, output).await,
        LinkCommands::Edit {
            id,
            title,
            url,
            category,
            description,
        } => {
            let args = EditArgs {
                title,
                url,
                category,
                description,
            };
            commands::link::edit(config, id, args, output).await
        }
        LinkCommands::Delete { id, yes } => commands::link::delete(config, id, yes, output).await,
        LinkCommands::Open { id } => commands::link::open(config, id, output).await,
        LinkCommands::Search { query } => commands::link::search(config, query, output).await,
    }
}

fn handle_config_command(
    command: Option<ConfigCommands>,
    config_path: Option<&PathBuf>,
    output: &Output,
) -> Result<()> {
    match command {
        Some(ConfigCommands::Show) | None => commands::config::show(config_path, output),
        Some(ConfigCommands::Set { key, value }) => {
            commands::config::set(key, value, config_path, output)
        }
    }
}

/// Suggest a next step for store failures
fn recovery_hint(error: &anyhow::Error) -> Option<&'static str> {
    let store_error = error
        .downcast_ref::<LinkError>()
        .and_then(LinkError::as_store)?;
    store_error.recovery_suggestion().or_else(|| {
        store_error
            .is_retryable()
            .then_some("The link store may be temporarily unavailable. Retrying may help.")
    })
}

/// Initialize logging
///
/// Logging is off unless LINKHUB_LOG is set to a level. Output goes to the
/// configured log file, or stderr.
fn init_logging(config: &Config) {
    let Ok(log_level) = std::env::var("LINKHUB_LOG") else {
        return;
    };

    let env_filter = EnvFilter::new(format!(
        "linkhub_core={},linkhub_cli={}",
        log_level, log_level
    ));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false);

    // Ignore the error if a subscriber is already installed
    match config.log_file {
        Some(ref log_path) => match File::create(log_path) {
            Ok(log_file) => {
                let _ = builder.with_ansi(false).with_writer(log_file).try_init();
            }
            Err(e) => {
                eprintln!("Warning: Could not create log file {:?}: {}", log_path, e);
            }
        },
        None => {
            let _ = builder.with_writer(std::io::stderr).try_init();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use linkhub_core::{NewLink, StoreError};
    use uuid::Uuid;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_link_add() {
        let cli = Cli::parse_from([
            "linkhub", "--json", "link", "add", "docs.rs", "-t", "Docs", "-c", "learning",
        ]);
        assert!(cli.json);
        match cli.command {
            Commands::Link {
                command:
                    LinkCommands::Add {
                        url,
                        title,
                        category,
                        description,
                    },
            } => {
                assert_eq!(url, "docs.rs");
                assert_eq!(title.as_deref(), Some("Docs"));
                assert_eq!(category.as_deref(), Some("learning"));
                assert!(description.is_none());
            }
            _ => panic!("expected link add"),
        }
    }

    #[test]
    fn test_recovery_hint() {
        let id = Uuid::new_v4();
        let not_found: anyhow::Error =
            LinkError::Store(StoreError::NotFoundOrForbidden { id }).into();
        assert!(recovery_hint(&not_found).is_some());

        let invalid = linkhub_core::validation::validate_new(NewLink::new("", "", "")).unwrap_err();
        let invalid: anyhow::Error = LinkError::Validation(invalid).into();
        assert!(recovery_hint(&invalid).is_none());

        assert!(recovery_hint(&anyhow::anyhow!("other")).is_none());
    }

    #[test]
    fn test_recovery_hint_for_retryable_backend_errors() {
        let unavailable: anyhow::Error = LinkError::Store(StoreError::Backend {
            status: 503,
            message: "Service Unavailable".to_string(),
        })
        .into();
        assert!(recovery_hint(&unavailable).unwrap().contains("Retrying"));

        let rejected: anyhow::Error = LinkError::Store(StoreError::Backend {
            status: 400,
            message: "Bad Request".to_string(),
        })
        .into();
        assert!(recovery_hint(&rejected).is_none());
    }
}
