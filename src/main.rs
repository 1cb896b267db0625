//! todo-web
//!
//! A single-user to-do list served over HTTP and stored in one SQLite table.

use anyhow::Result;
use clap::Parser;
use todo_web::cli::{Cli, Command};
use todo_web::config::{Config, ConfigLoader};
use todo_web::db::TaskStore;
use todo_web::logging::{self, LogTarget};
use todo_web::web;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    logging::init(&LogTarget::parse(&cli.log), cli.verbose)?;

    let loader = ConfigLoader::load(cli.config.as_deref())?;
    for source in loader.sources() {
        info!("Using config file {}", source.display());
    }
    let mut config = loader.into_config();
    cli.apply_overrides(&mut config);

    match cli.command() {
        Command::Init => run_init(&config),
        Command::Serve => run_server(config).await,
    }
}

/// Create the task table and exit.
fn run_init(config: &Config) -> Result<()> {
    let store = TaskStore::new(&config.server.db_path);
    store.init()?;
    info!("Initialized task table in {:?}", store.path());
    Ok(())
}

/// Initialize storage once, then serve HTTP until Ctrl-C.
async fn run_server(config: Config) -> Result<()> {
    let addr = config.server.bind_addr()?;

    info!("Starting todo-web v{}", env!("CARGO_PKG_VERSION"));
    info!("Database: {:?}", config.server.db_path);

    let store = TaskStore::new(&config.server.db_path);
    store.init()?;

    web::serve_until(store, addr, shutdown_signal()).await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown requested");
}
