mod config;
mod lifecycle;
mod mapper;
mod output;
mod storage;
mod walkthrough;

use std::sync::Arc;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand, ValueEnum};
use futures_util::TryStreamExt;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dynowalk_core::person::PERSON_TABLE;
use dynowalk_core::storage::{ItemStore, TableAdmin};
use dynowalk_core::table::format_table_info;

use crate::config::Config;
use crate::lifecycle::TableLifecycle;
use crate::output::{aprintln, Console};
use crate::storage::InMemoryStore;
use crate::walkthrough::Walkthrough;

/// dynowalk - Walk through table and item operations against DynamoDB
#[derive(Debug, Parser)]
#[command(name = "dynowalk")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    global: Global,

    /// Table used by the walkthrough
    #[arg(long, env = "DYNOWALK_TABLE_NAME", default_value = PERSON_TABLE, global = true)]
    table_name: String,

    /// Storage backend
    #[arg(long, env = "DYNOWALK_BACKEND", value_enum, default_value_t = Backend::Dynamodb, global = true)]
    backend: Backend,

    /// Custom endpoint URL (for local DynamoDB)
    #[arg(long, env = "AWS_ENDPOINT_URL", global = true)]
    endpoint_url: Option<String>,

    /// AWS region
    #[arg(long, env = "AWS_REGION", default_value = "us-east-1", global = true)]
    region: String,

    /// AWS credentials profile
    #[arg(long, env = "AWS_PROFILE", global = true)]
    profile: Option<String>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Pretty, global = true)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Clone, clap::Args)]
struct Global {
    /// Silence the status output
    #[clap(long, global = true)]
    silent: bool,

    /// Enable debug logging
    #[clap(long, global = true)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Backend {
    /// AWS DynamoDB or a local DynamoDB endpoint
    Dynamodb,
    /// In-process store, nothing leaves the machine
    Memory,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Human-readable status lines
    Pretty,
    /// JSON document on stdout
    Json,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run the full walkthrough (default)
    Run,
    /// List the visible tables
    Tables,
    /// Describe a table
    Describe {
        /// Table to describe (defaults to --table-name)
        table: Option<String>,
    },
}

struct Stores {
    items: Arc<dyn ItemStore>,
    admin: Arc<dyn TableAdmin>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.global.verbose {
        "dynowalk=debug"
    } else {
        "dynowalk=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let console = Console::new(cli.global.silent || cli.format == OutputFormat::Json);
    let config = Config::from_env();
    let stores = connect(&cli, console).await?;

    let cancel = CancellationToken::new();
    tokio::spawn(cancel_on_ctrl_c(cancel.clone()));

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => {
            let walkthrough = Walkthrough::new(
                stores.items,
                stores.admin,
                &cli.table_name,
                config,
                cancel,
                console,
            )?;
            let report = walkthrough.run().await;

            if cli.format == OutputFormat::Json {
                aprintln!("{}", serde_json::to_string_pretty(&report)?);
            }

            if !report.succeeded() {
                bail!(
                    "{} walkthrough step(s) failed",
                    report.failures().count()
                );
            }
        }
        Commands::Tables => {
            let tables: Vec<String> = stores.admin.list_tables().try_collect().await?;
            match cli.format {
                OutputFormat::Json => aprintln!("{}", serde_json::to_string_pretty(&tables)?),
                OutputFormat::Pretty => console.block(&tables),
            }
        }
        Commands::Describe { table } => {
            let lifecycle = TableLifecycle::new(stores.admin, config.wait_policy, cancel, console);
            let table = table.unwrap_or(cli.table_name);
            let description = lifecycle.describe_table(&table).await?;
            match cli.format {
                OutputFormat::Json => aprintln!("{}", serde_json::to_string_pretty(&description)?),
                OutputFormat::Pretty => console.block(&format_table_info(&description)),
            }
        }
    }

    Ok(())
}

/// Builds the selected storage backend once; it is passed explicitly from here on.
async fn connect(cli: &Cli, console: Console) -> Result<Stores> {
    match cli.backend {
        Backend::Memory => {
            console.field("Target:", "in-memory store");
            let store = Arc::new(InMemoryStore::new().with_transition_polls(1));
            Ok(Stores {
                items: store.clone(),
                admin: store,
            })
        }
        #[cfg(feature = "dynamodb")]
        Backend::Dynamodb => {
            let aws = storage::dynamodb::AwsConfig {
                endpoint_url: cli.endpoint_url.clone(),
                region: cli.region.clone(),
                profile: cli.profile.clone(),
            };
            console.field("Target:", aws.target_display());
            tracing::debug!(endpoint = ?aws.endpoint_url, region = %aws.region, "Creating DynamoDB client");

            let store = Arc::new(storage::DynamoDbStore::new(
                storage::dynamodb::create_client(&aws).await,
            ));
            Ok(Stores {
                items: store.clone(),
                admin: store,
            })
        }
        #[cfg(not(feature = "dynamodb"))]
        Backend::Dynamodb => {
            bail!("dynowalk was built without the 'dynamodb' feature; use --backend memory")
        }
    }
}

async fn cancel_on_ctrl_c(cancel: CancellationToken) {
    if signal::ctrl_c().await.is_ok() {
        tracing::warn!("Ctrl+C received, cancelling");
        cancel.cancel();
    }
}
