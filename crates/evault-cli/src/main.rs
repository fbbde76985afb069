//! # evault CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.
//! Uses clap derive macros for argument parsing.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use evault_cli::audit::{run_audit_chain, AuditChainArgs};
use evault_cli::hash::{run_hash, run_verify, HashArgs, VerifyArgs};
use evault_cli::ledger::{run_ledger, LedgerArgs};

/// Evidence Vault CLI
///
/// Offline tooling for the Evidence Vault: streaming file hashing and
/// verification, custody ledger replay against exported records, and
/// audit-chain verification.
#[derive(Parser, Debug)]
#[command(name = "evault", version = "0.3.7", about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Compute the streaming SHA-256 digest of a file and print it as hex.
    Hash(HashArgs),

    /// Verify a file against a stored SHA-256 digest.
    Verify(VerifyArgs),

    /// Custody ledger operations on exported evidence records (replay, audit).
    Ledger(LedgerArgs),

    /// Audit-chain operations on exported audit trails (verify).
    #[command(name = "audit-chain")]
    AuditChain(AuditChainArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize tracing based on verbosity level.
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let result = match cli.command {
        Commands::Hash(args) => run_hash(&args),
        Commands::Verify(args) => run_verify(&args),
        Commands::Ledger(args) => run_ledger(&args),
        Commands::AuditChain(args) => run_audit_chain(&args),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
