//! # CLI Interface
//!
//! Defines the command-line argument structure for `peerledger-node` using
//! `clap` derive. Supports three subcommands: `run`, `add-user`, and
//! `version`.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use peerledger::config::{DEFAULT_API_PORT, DEFAULT_METRICS_PORT, MIN_PASSWORD_LENGTH};

/// PeerLedger node.
///
/// Serves the lending ledger and credit score API over HTTP and exposes
/// Prometheus metrics.
#[derive(Parser, Debug)]
#[command(
    name = "peerledger-node",
    about = "PeerLedger lending ledger node",
    version,
    propagate_version = true
)]
pub struct PeerLedgerCli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands for the node binary.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Open the ledger and serve the HTTP API.
    Run(RunArgs),
    /// Provision an account directly in the data directory.
    AddUser(AddUserArgs),
    /// Print version information and exit.
    Version,
}

/// Arguments for the `run` subcommand.
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Directory holding the sled database. Created on first run.
    #[arg(long, short = 'd', env = "PEERLEDGER_DATA_DIR", default_value = "peerledger-data")]
    pub data_dir: PathBuf,

    /// Port for the REST API.
    #[arg(long, env = "PEERLEDGER_API_PORT", default_value_t = DEFAULT_API_PORT)]
    pub api_port: u16,

    /// Port for the Prometheus metrics endpoint.
    #[arg(long, env = "PEERLEDGER_METRICS_PORT", default_value_t = DEFAULT_METRICS_PORT)]
    pub metrics_port: u16,

    /// Log output format: `pretty` or `json`.
    #[arg(long, env = "PEERLEDGER_LOG_FORMAT", default_value = "pretty")]
    pub log_format: String,

    /// Skip the fsync after each write. Faster, but a crash may lose the
    /// most recent writes.
    #[arg(long)]
    pub no_flush: bool,
}

/// Arguments for the `add-user` subcommand.
#[derive(Parser, Debug)]
pub struct AddUserArgs {
    /// Directory holding the sled database. Must not be in use by a
    /// running node.
    #[arg(long, short = 'd', env = "PEERLEDGER_DATA_DIR", default_value = "peerledger-data")]
    pub data_dir: PathBuf,

    /// Login name for the new account.
    #[arg(long, short = 'u')]
    pub username: String,

    /// Plaintext credential. Prefer the environment variable over the flag
    /// so it does not land in shell history.
    #[arg(long, env = "PEERLEDGER_PASSWORD", hide_env_values = true)]
    pub password: String,

    /// Opening balance.
    #[arg(long, default_value_t = 0.0)]
    pub balance: f64,

    /// Minimum credential length to accept.
    #[arg(long, default_value_t = MIN_PASSWORD_LENGTH)]
    pub min_password_length: usize,
}
