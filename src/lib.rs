//! rTimeTracker library root.
//! Exposes the CLI parser, the high-level run() function and the
//! store / gateway / sync layers it is built on.

pub mod cli;
pub mod config;
pub mod core;
pub mod db;
pub mod errors;
pub mod export;
pub mod gateway;
pub mod models;
pub mod store;
pub mod ui;
pub mod utils;

use clap::Parser;
use cli::parser::{Cli, Commands};
use config::Config;
use errors::AppResult;

/// Central command dispatcher
pub async fn dispatch(cli: &Cli, cfg: &Config) -> AppResult<()> {
    let cmd = &cli.command;
    match cmd {
        Commands::Init => cli::commands::init::handle(cli),
        Commands::Config { .. } => cli::commands::config::handle(cmd, cfg),
        Commands::Log { .. } => cli::commands::log::handle(cmd, cfg).await,
        Commands::Add { .. } | Commands::Sub { .. } => cli::commands::add::handle(cmd, cfg).await,
        Commands::List { .. } => cli::commands::list::handle(cmd, cfg).await,
        Commands::Start { .. } | Commands::Stop | Commands::Status | Commands::Track { .. } => {
            cli::commands::timer::handle(cmd, cfg).await
        }
        Commands::Edit { .. } | Commands::Rename { .. } => cli::commands::edit::handle(cmd, cfg).await,
        Commands::Del { .. } => cli::commands::del::handle(cmd, cfg).await,
        Commands::Push { .. } | Commands::Pull { .. } | Commands::Upload { .. } => {
            cli::commands::sync::handle(cmd, cfg).await
        }
        Commands::Export { .. } | Commands::Import { .. } => cli::commands::export::handle(cmd, cfg).await,
        Commands::Server { .. } => cli::commands::server::handle(cmd, cfg).await,
    }
}

/// Entry point used by main.rs
pub fn run() -> AppResult<()> {
    let cli = Cli::parse();

    // config is loaded once; command line flags win over the file
    let mut cfg = Config::load()?;
    if let Some(custom_db) = &cli.db {
        cfg.database = custom_db.clone();
    }
    if let Some(backend) = cli.backend {
        cfg.backend = backend;
    }
    if let Some(server) = &cli.server {
        cfg.server_url = server.clone();
    }
    if let Some(sim_store) = &cli.sim_store {
        cfg.simulated_store = Some(sim_store.clone());
    }
    if cli.test {
        cfg.simulated_latency_ms = 0;
    }

    log::debug!(
        "database={} backend={:?} server={}",
        cfg.database,
        cfg.backend,
        cfg.server_url
    );

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(dispatch(&cli, &cfg))
}
