//! # Audit-Chain Subcommand
//!
//! Offline verification of an exported audit trail. The export format is a
//! JSON array of audit events as the API serializes them; this module reads
//! only the chained fields and ignores the rest, so exports can carry
//! whatever context they like without breaking verification.

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Args, Subcommand};
use serde::Deserialize;
use uuid::Uuid;

use evault_crypto::{chain_hash, GENESIS_HASH};

/// Arguments for the `evault audit-chain` subcommand.
#[derive(Args, Debug)]
pub struct AuditChainArgs {
    #[command(subcommand)]
    pub command: AuditChainCommand,
}

/// Audit-chain subcommands.
#[derive(Subcommand, Debug)]
pub enum AuditChainCommand {
    /// Verify that every exported event links to its predecessor and that
    /// every event hash recomputes from its own fields.
    Verify {
        /// Path to the exported audit trail JSON (array of events).
        #[arg(value_name = "EXPORT")]
        export: PathBuf,
    },
}

/// The chained fields of one exported audit event.
#[derive(Debug, Deserialize)]
struct ChainedEvent {
    event_type: String,
    resource_type: String,
    resource_id: Uuid,
    action: String,
    previous_hash: String,
    event_hash: String,
}

/// Execute the audit-chain subcommand.
pub fn run_audit_chain(args: &AuditChainArgs) -> Result<u8> {
    match &args.command {
        AuditChainCommand::Verify { export } => cmd_verify(export),
    }
}

/// Recompute the chain and report the breaks.
fn cmd_verify(export: &Path) -> Result<u8> {
    let events: Vec<ChainedEvent> = crate::read_json(export)?;

    let mut broken = Vec::new();
    let mut expected_prev = GENESIS_HASH.to_string();

    for (index, event) in events.iter().enumerate() {
        let recomputed = chain_hash(
            &event.previous_hash,
            &event.event_type,
            &event.resource_type,
            event.resource_id,
            &event.action,
        );
        if event.previous_hash != expected_prev || event.event_hash != recomputed {
            broken.push(index);
        }
        expected_prev = event.event_hash.clone();
    }

    if broken.is_empty() {
        println!("OK: audit chain valid events={}", events.len());
        Ok(0)
    } else {
        println!(
            "FAIL: audit chain broken events={} broken_links={}",
            events.len(),
            broken.len()
        );
        for index in &broken {
            println!(
                "  event {} ({}): link does not verify",
                index, events[*index].event_type
            );
        }
        Ok(1)
    }
}
