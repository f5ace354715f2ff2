use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

use regguard::accounts::{self, AccountStore, SqliteAccounts};
use regguard::config::Config;
use regguard::guard::{self, RegistrationGuard};
use regguard::logs::AppendLog;
use regguard::moderation::decide;
use regguard::notify;
use regguard::output::terminal;
use regguard::scoring::RegistrationCandidate;

/// regguard: spam registration screening.
///
/// Scores new accounts with cheap local heuristics and, when an API key is
/// configured, a rate-limited LLM classifier. Accounts at or above the
/// threshold are deleted or quarantined.
#[derive(Parser)]
#[command(name = "regguard", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database and the quarantine role
    Init,

    /// Register an account and screen it (as the account-created hook would)
    Register {
        username: String,
        email: String,
    },

    /// Score a username/email pair without creating or touching an account
    Check {
        username: String,
        email: String,
    },

    /// Show recent log entries (newest first)
    Logs {
        /// Number of entries to show
        #[arg(long, default_value = "10")]
        limit: usize,

        /// Show the classifier usage log instead of the spam log
        #[arg(long)]
        usage: bool,
    },

    /// Show configuration, moderation tallies and log sizes
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("regguard=info")),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::load()?;

    match cli.command {
        Commands::Init => {
            info!("Initializing regguard database...");
            let store = open_store(&config, true)?;
            let guard = RegistrationGuard::from_config(&config, store.clone())?;
            let caps = guard.ensure_quarantine_role().await?;
            let table_count = store.table_count().await?;

            println!("Database initialized at: {}", config.db_path);
            println!("Tables created: {table_count}");
            println!(
                "Quarantine role capabilities: {}",
                if caps.is_empty() {
                    "none".to_string()
                } else {
                    caps.into_iter().collect::<Vec<_>>().join(", ")
                }
            );
            if !guard.classifier_enabled() {
                println!(
                    "{}",
                    "Classifier disabled: set REGGUARD_API_KEY to enable it.".dimmed()
                );
            }
        }

        Commands::Register { username, email } => {
            let store = open_store(&config, false)?;
            let guard = RegistrationGuard::from_config(&config, store.clone())?;
            guard.ensure_quarantine_role().await?;

            let account_id = store.create_account(&username, &email).await?;
            info!(account_id, "Account created");

            if let Some(verdict) = guard.on_account_created(account_id).await? {
                terminal::display_verdict(
                    &verdict.candidate,
                    &verdict.score,
                    verdict.outcome,
                    Some(verdict.disposition),
                    guard.policy(),
                );
            }
        }

        Commands::Check { username, email } => {
            let engine = guard::build_engine(&config, notify::from_config(&config))?;
            let candidate = RegistrationCandidate::new(username, email);
            let score = engine.score(&candidate).await;
            let policy = config.policy();
            let outcome = decide(score.score, &policy);
            terminal::display_verdict(&candidate, &score, outcome, None, &policy);
        }

        Commands::Logs { limit, usage } => {
            let (title, path) = if usage {
                ("Classifier Usage", &config.usage_log_path)
            } else {
                ("Recent Spam Blocks", &config.spam_log_path)
            };
            let lines = AppendLog::new(path).recent(limit).await?;
            terminal::display_log(title, &lines, "No entries recorded yet.");
        }

        Commands::Status => {
            let store = if Path::new(&config.db_path).exists() {
                Some(open_store(&config, false)?)
            } else {
                None
            };
            regguard::status::show(&config, store.as_ref()).await?;
        }
    }

    Ok(())
}

/// Open the account store, creating it when `create` is set.
fn open_store(config: &Config, create: bool) -> Result<Arc<dyn AccountStore>> {
    let conn = if create {
        accounts::initialize(&config.db_path)?
    } else {
        accounts::open(&config.db_path)?
    };
    Ok(Arc::new(SqliteAccounts::new(conn)))
}

