//! Camrent CLI - Firestore seeding and maintenance.
//!
//! # Usage
//!
//! ```bash
//! # Load categories, brands, products and site settings from YAML
//! camrent-cli seed fixtures/catalog.yaml
//!
//! # Validate a seed file without writing
//! camrent-cli seed fixtures/catalog.yaml --dry-run
//!
//! # Rebuild the Algolia product index from Firestore
//! camrent-cli reindex
//!
//! # Give a Firebase user access to the admin console
//! camrent-cli admin grant <uid> --email ops@example.com
//! camrent-cli admin revoke <uid>
//! ```
//!
//! # Environment Variables
//!
//! - `FIREBASE_PROJECT_ID` plus credentials, as for the servers
//! - `ALGOLIA_APP_ID`, `ALGOLIA_ADMIN_KEY`, `ALGOLIA_INDEX` for `reindex`

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;
use std::sync::Arc;

use camrent_firebase::{Datastore, FirebaseConfig, HttpDatastore};
use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "camrent-cli")]
#[command(author, version, about = "Camrent maintenance tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the documents in a YAML file to Firestore
    Seed {
        /// Path to the seed file
        file: PathBuf,

        /// Validate and report without writing
        #[arg(long)]
        dry_run: bool,
    },
    /// Replace the Algolia product index with the current catalog
    Reindex,
    /// Manage admin console access
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Set `role: admin` on a user
    Grant {
        /// Firebase Auth user ID
        uid: String,

        /// Email stored when the user document does not exist yet
        #[arg(short, long)]
        email: Option<String>,
    },
    /// Set `role: customer` on a user
    Revoke {
        /// Firebase Auth user ID
        uid: String,
    },
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "camrent_cli=info,camrent_firebase=warn".into());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn connect() -> Result<Arc<dyn Datastore>, Box<dyn std::error::Error>> {
    let config = FirebaseConfig::from_env()?;
    tracing::info!(project = %config.project_id, "Connecting to Firestore");
    Ok(Arc::new(HttpDatastore::connect(&config).await?))
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Seed { file, dry_run } => {
            let seed = commands::seed::SeedFile::load(&file).await?;
            if dry_run {
                seed.validate(None).await?;
                commands::seed::report(&seed);
            } else {
                let db = connect().await?;
                commands::seed::run(db.as_ref(), &seed).await?;
            }
        }
        Commands::Reindex => {
            let db = connect().await?;
            let search = commands::reindex::client_from_env()?;
            commands::reindex::run(db.as_ref(), &search).await?;
        }
        Commands::Admin { action } => {
            let db = connect().await?;
            match action {
                AdminAction::Grant { uid, email } => {
                    commands::admin::grant(db.as_ref(), &uid, email.as_deref()).await?;
                }
                AdminAction::Revoke { uid } => {
                    commands::admin::revoke(db.as_ref(), &uid).await?;
                }
            }
        }
    }
    Ok(())
}
