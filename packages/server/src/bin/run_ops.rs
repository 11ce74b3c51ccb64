//! Operator CLI for daily blog runs.
//!
//! Same operations as the HTTP surface, run directly against the database.
//! Prints JSON to stdout.

use std::sync::Arc;

use anyhow::{Context, Result};
use blog_automation::config::Config;
use blog_automation::domains::runs::activities::{
    drain_batch, list_runs, parse_run_id, reconcile_stuck_runs, terminate_run, TerminateOutcome,
};
use blog_automation::kernel::ServerDeps;
use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::json;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "run_ops")]
#[command(about = "Drain, reconcile and terminate daily blog runs")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start a run and drain one batch of pending topics
    Drain,

    /// Fail stuck and empty runs
    Reconcile {
        #[arg(long)]
        timeout_minutes: Option<f64>,
    },

    /// Force a run to failed
    Terminate {
        run_id: String,
        #[arg(long)]
        reason: Option<String>,
    },

    /// Show recent runs
    List {
        #[arg(long)]
        limit: Option<i64>,
    },
}

fn output<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so stdout stays machine-readable
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn,blog_automation=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let deps = connect().await?;

    match cli.command {
        Commands::Drain => output(&drain_batch(&deps).await?),
        Commands::Reconcile { timeout_minutes } => {
            output(&reconcile_stuck_runs(timeout_minutes, &deps).await?)
        }
        Commands::Terminate { run_id, reason } => {
            let run_id = parse_run_id(Some(&run_id))?;
            match terminate_run(run_id, reason.as_deref(), &deps).await? {
                TerminateOutcome::Terminated(run) => output(&json!({ "success": true, "run": run })),
                TerminateOutcome::NotFound => output(&json!({
                    "success": true,
                    "run": null,
                    "message": "Run not found"
                })),
            }
        }
        Commands::List { limit } => output(&list_runs(limit, &deps).await?),
    }
}

async fn connect() -> Result<Arc<ServerDeps>> {
    let config = Config::from_env().context("Failed to load configuration")?;
    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;
    Ok(Arc::new(ServerDeps::from_config(&config, pool)))
}
