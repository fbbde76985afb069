//! # evault-cli — Offline Tooling for the Evidence Vault
//!
//! Provides the `evault` command-line interface for operators working with
//! exported vault data: hashing evidence files, verifying them against
//! stored digests, replaying exported custody ledgers, and verifying
//! exported audit chains. Everything here runs offline against local files;
//! nothing talks to the API.
//!
//! ## Subcommands
//!
//! - `evault hash` — Streaming SHA-256 digest of a file.
//! - `evault verify` — Integrity check of a file against a stored digest.
//! - `evault ledger` — Custody ledger replay and consistency checks.
//! - `evault audit-chain` — Offline audit-chain verification.

pub mod audit;
pub mod hash;
pub mod ledger;

use std::path::Path;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;

/// Read and parse a JSON export file.
///
/// Used by the ledger and audit-chain subcommands, which both operate on
/// JSON exports produced by the API.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read file: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("failed to parse JSON: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_json_parses_valid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.json");
        std::fs::write(&path, r#"{"key": "value"}"#).unwrap();

        let value: serde_json::Value = read_json(&path).unwrap();
        assert_eq!(value["key"], "value");
    }

    #[test]
    fn read_json_missing_file_names_the_path() {
        let result: Result<serde_json::Value> = read_json(Path::new("/tmp/evault-no-such.json"));
        let err = result.unwrap_err().to_string();
        assert!(err.contains("failed to read file"));
    }

    #[test]
    fn read_json_malformed_content_names_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "not json {{{").unwrap();

        let result: Result<serde_json::Value> = read_json(&path);
        let err = result.unwrap_err().to_string();
        assert!(err.contains("failed to parse JSON"));
    }
}
