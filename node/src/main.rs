// Copyright (c) 2026 PeerLedger Contributors. MIT License.
// See LICENSE for details.

//! # PeerLedger Node
//!
//! Entry point for the `peerledger-node` binary. Parses CLI arguments,
//! initializes logging and metrics, opens the ledger, and serves the HTTP
//! API.
//!
//! The binary supports three subcommands:
//!
//! - `run`      serve the API and the metrics endpoint
//! - `add-user` provision an account in the data directory
//! - `version`  print build version information

mod api;
mod cli;
mod logging;
mod metrics;

use anyhow::{Context, Result};
use clap::Parser;
use std::path::Path;
use std::sync::Arc;
use tokio::signal;

use peerledger::account::Account;
use peerledger::config::LedgerConfig;
use peerledger::LedgerService;

use cli::{Commands, PeerLedgerCli};
use logging::LogFormat;
use metrics::NodeMetrics;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = PeerLedgerCli::parse();

    match cli.command {
        Commands::Run(args) => run_node(args).await,
        Commands::AddUser(args) => {
            logging::init_logging(logging::DEFAULT_FILTER, LogFormat::Pretty);
            let account = add_user(&args)?;
            println!("{}", account.id);
            Ok(())
        }
        Commands::Version => {
            print_version();
            Ok(())
        }
    }
}

/// Opens the ledger database under `data_dir`, creating it if needed.
fn open_service(data_dir: &Path, config: &LedgerConfig) -> Result<LedgerService> {
    let db_path = data_dir.join("db");
    std::fs::create_dir_all(&db_path)
        .with_context(|| format!("failed to create database directory: {}", db_path.display()))?;

    let service = LedgerService::open(&db_path, config)
        .with_context(|| format!("failed to open database at {}", db_path.display()))?;
    tracing::info!(path = %db_path.display(), "database opened");
    Ok(service)
}

/// Serves the API and metrics endpoints until a shutdown signal arrives.
async fn run_node(args: cli::RunArgs) -> Result<()> {
    logging::init_logging(logging::DEFAULT_FILTER, LogFormat::from_str_lossy(&args.log_format));

    tracing::info!(
        api_port = args.api_port,
        metrics_port = args.metrics_port,
        data_dir = %args.data_dir.display(),
        "starting peerledger-node"
    );

    // --- Persistent storage ---
    let config = LedgerConfig {
        flush_on_write: !args.no_flush,
        ..LedgerConfig::default()
    };
    let service = Arc::new(open_service(&args.data_dir, &config)?);
    tracing::info!(accounts = service.accounts().account_count(), "ledger ready");

    // --- Metrics ---
    let node_metrics = Arc::new(NodeMetrics::new().context("failed to register metrics")?);

    // --- Application state ---
    let app_state = api::AppState {
        version: format!(
            "{} (ledger {})",
            env!("CARGO_PKG_VERSION"),
            peerledger::config::LEDGER_VERSION,
        ),
        service,
        metrics: Arc::clone(&node_metrics),
    };

    // --- API server ---
    let api_router = api::create_router(app_state);
    let api_addr = format!("0.0.0.0:{}", args.api_port);
    let api_listener = tokio::net::TcpListener::bind(&api_addr)
        .await
        .with_context(|| format!("failed to bind API listener on {}", api_addr))?;
    tracing::info!("API server listening on {}", api_addr);

    // --- Metrics server ---
    let metrics_router = axum::Router::new()
        .route("/metrics", axum::routing::get(metrics::metrics_handler))
        .with_state(Arc::clone(&node_metrics));
    let metrics_addr = format!("0.0.0.0:{}", args.metrics_port);
    let metrics_listener = tokio::net::TcpListener::bind(&metrics_addr)
        .await
        .with_context(|| format!("failed to bind metrics listener on {}", metrics_addr))?;
    tracing::info!("Metrics server listening on {}", metrics_addr);

    // --- Serve ---
    tokio::select! {
        res = axum::serve(api_listener, api_router) => {
            if let Err(e) = res {
                tracing::error!("API server error: {}", e);
            }
        }
        res = axum::serve(metrics_listener, metrics_router) => {
            if let Err(e) = res {
                tracing::error!("Metrics server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            tracing::info!("shutdown signal received, draining connections");
        }
    }

    tracing::info!("peerledger-node stopped");
    Ok(())
}

/// Provisions an account directly in the data directory.
fn add_user(args: &cli::AddUserArgs) -> Result<Account> {
    let config = LedgerConfig {
        min_password_length: args.min_password_length,
        ..LedgerConfig::default()
    };
    let service = open_service(&args.data_dir, &config)?;
    let account = service
        .accounts()
        .create(&args.username, &args.password, args.balance)
        .with_context(|| format!("failed to create account {}", args.username))?;

    tracing::info!(account_id = account.id, "account provisioned");
    Ok(account)
}

/// Prints version information to stdout.
fn print_version() {
    println!("peerledger-node {}", env!("CARGO_PKG_VERSION"));
    println!("ledger          {}", peerledger::config::LEDGER_VERSION);
    println!("rustc           {}", rustc_version());
}

/// Returns the Rust compiler version used to build this binary.
fn rustc_version() -> &'static str {
    option_env!("RUSTC_VERSION").unwrap_or("unknown")
}

/// Waits for SIGINT (Ctrl+C) or SIGTERM, whichever comes first.
///
/// On non-Unix platforms, only Ctrl+C is supported. If a handler cannot be
/// installed, that branch never completes.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn add_user_args(dir: &Path, username: &str, password: &str) -> cli::AddUserArgs {
        cli::AddUserArgs {
            data_dir: dir.to_path_buf(),
            username: username.into(),
            password: password.into(),
            balance: 15.0,
            min_password_length: peerledger::config::MIN_PASSWORD_LENGTH,
        }
    }

    #[test]
    fn add_user_provisions_a_loginable_account() {
        let dir = tempfile::tempdir().unwrap();
        let account = add_user(&add_user_args(dir.path(), "rachit", "rachit123")).unwrap();
        assert_eq!(account.balance, 15.0);

        let service = open_service(dir.path(), &LedgerConfig::default()).unwrap();
        assert_eq!(service.authenticate("rachit", "rachit123").unwrap(), account.id);
    }

    #[test]
    fn add_user_rejects_duplicates() {
        let dir = tempfile::tempdir().unwrap();
        add_user(&add_user_args(dir.path(), "rachit", "rachit123")).unwrap();
        assert!(add_user(&add_user_args(dir.path(), "rachit", "another-pass")).is_err());
    }
}
