//! `tasklist` server and maintenance command line.
//!
//! Usage:
//!
//! ```text
//! tasklist serve
//! tasklist repair-order [--by-creation-time] [--list <id>]
//! ```
//!
//! Settings come from the environment; see [`AppConfig`]. Without
//! `DATABASE_URL` everything is kept in memory.

use clap::{Parser, Subcommand};
use eyre::WrapErr;
use mockable::DefaultClock;
use std::sync::Arc;
use tasklist::config::{AppConfig, Environment, FromEnv};
use tasklist::task::{
    adapters::{
        http::{ApiState, TokenVerifier, router},
        memory::InMemoryTaskStore,
        postgres::{PostgresTaskStore, connect_pool},
    },
    domain::ListId,
    ports::{ListRepository, TaskRepository},
    services::{RepairStrategy, TaskOrderService},
};
use tasklist::telemetry::init_tracing;
use tracing::{info, warn};

/// Top-level CLI parser for the `tasklist` binary.
#[derive(Debug, Parser)]
#[command(name = "tasklist", version, about = "Ordered task lists over HTTP")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Subcommand)]
enum Command {
    /// Serve the HTTP API.
    Serve,
    /// Rewrite a contiguous order for every list, or for one list.
    RepairOrder {
        /// Rebuild the order strictly from creation time.
        #[arg(long)]
        by_creation_time: bool,
        /// Repair only this list.
        #[arg(long)]
        list: Option<ListId>,
    },
}

type Service<S> = TaskOrderService<S, S, DefaultClock>;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let cli = Cli::parse();
    init_tracing(Environment::from_env());
    let config = AppConfig::from_env().wrap_err("invalid configuration")?;

    if let Some(database) = &config.database {
        let pool = connect_pool(&database.url, database.pool_size)
            .wrap_err("failed to create database pool")?;
        let store = Arc::new(PostgresTaskStore::new(pool));
        store
            .apply_schema()
            .await
            .wrap_err("failed to apply database schema")?;
        run(cli.command, &config, store).await
    } else {
        info!("DATABASE_URL not set; using the in-memory store");
        run(cli.command, &config, Arc::new(InMemoryTaskStore::new())).await
    }
}

async fn run<S>(command: Command, config: &AppConfig, store: Arc<S>) -> eyre::Result<()>
where
    S: ListRepository + TaskRepository + 'static,
{
    let service = TaskOrderService::new(Arc::clone(&store), store, Arc::new(DefaultClock))
        .with_policy(config.reorder_policy());

    match command {
        Command::Serve => serve(config, service).await,
        Command::RepairOrder {
            by_creation_time,
            list,
        } => {
            let strategy = if by_creation_time {
                RepairStrategy::CreationTime
            } else {
                RepairStrategy::CurrentOrder
            };
            repair(&service, strategy, list).await
        }
    }
}

async fn serve<S>(config: &AppConfig, service: Service<S>) -> eyre::Result<()>
where
    S: ListRepository + TaskRepository + 'static,
{
    let verifier = TokenVerifier::new(config.jwt_secret.as_bytes());
    let app = router(ApiState::new(service, verifier));
    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .wrap_err_with(|| format!("failed to bind {}", config.bind_addr))?;

    info!(addr = %config.bind_addr, environment = ?config.environment, "tasklist listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .wrap_err("server error")?;
    info!("tasklist stopped");
    Ok(())
}

async fn repair<S>(
    service: &Service<S>,
    strategy: RepairStrategy,
    list: Option<ListId>,
) -> eyre::Result<()>
where
    S: ListRepository + TaskRepository + 'static,
{
    let reports = match list {
        Some(list_id) => vec![service.repair_order(list_id, strategy).await?],
        None => service.repair_all(strategy).await?,
    };

    let repaired = reports.iter().filter(|report| report.changed()).count();
    for report in reports.iter().filter(|report| report.changed()) {
        info!(
            list_id = %report.list_id,
            repositioned = report.repositioned,
            tasks = report.task_count,
            "repaired list"
        );
    }
    info!(
        lists = reports.len(),
        repaired,
        ?strategy,
        "order repair finished"
    );
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to listen for shutdown signal");
    }
    info!("shutdown requested");
}
