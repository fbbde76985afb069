//! # Hash and Verify Subcommands
//!
//! Streaming SHA-256 digest computation and verification against a stored
//! digest. Files are consumed in chunks, so forensic images larger than
//! memory hash fine.
//!
//! ## Exit Codes
//!
//! `verify` distinguishes a failed check from an unusable input:
//! 0 = verified, 1 = digest mismatch, 2 = source unreadable.

use std::fs::File;
use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::Args;

use evault_core::ContentDigest;
use evault_crypto::{compute_digest, IntegrityError};

/// Arguments for the `evault hash` subcommand.
#[derive(Args, Debug)]
pub struct HashArgs {
    /// Path to the file to hash.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,
}

/// Arguments for the `evault verify` subcommand.
#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Path to the file to verify.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Stored SHA-256 hex digest to verify against.
    #[arg(long)]
    pub digest: String,
}

/// Execute the hash subcommand: print the file's digest as lowercase hex.
pub fn run_hash(args: &HashArgs) -> Result<u8> {
    let file = File::open(&args.file)
        .map_err(|e| anyhow!("cannot open {}: {e}", args.file.display()))?;
    let digest = compute_digest(file)
        .map_err(|e| anyhow!("cannot hash {}: {e}", args.file.display()))?;
    println!("{}", digest.to_hex());
    Ok(0)
}

/// Execute the verify subcommand.
pub fn run_verify(args: &VerifyArgs) -> Result<u8> {
    // A malformed --digest is a usage error, not a failed verification.
    let expected =
        ContentDigest::from_hex(&args.digest).map_err(|e| anyhow!("invalid digest: {e}"))?;

    let file = match File::open(&args.file) {
        Ok(file) => file,
        Err(e) => {
            println!("FAIL: cannot read {}: {e}", args.file.display());
            return Ok(2);
        }
    };

    match evault_crypto::verify(&expected.to_hex(), file) {
        Ok(true) => {
            println!("OK: digest verified {}", expected.to_hex());
            Ok(0)
        }
        Ok(false) => {
            println!(
                "FAIL: digest mismatch for {} (expected {})",
                args.file.display(),
                expected.to_hex()
            );
            Ok(1)
        }
        Err(IntegrityError::StorageUnavailable(e)) => {
            println!("FAIL: cannot read {}: {e}", args.file.display());
            Ok(2)
        }
    }
}
