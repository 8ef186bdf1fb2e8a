//! # Fingerprint CLI: imprint a record.
//!
//! Reads a schema and a JSON record, fingerprints the record with fresh
//! salts, prints the imprint, and writes the full fingerprint (values and
//! salts) to `--out`. The fingerprint file is private: anyone holding it
//! can disclose any field.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use imprint_crypto::{imprint, Fingerprint};
use imprint_schema::AssetRecord;

use crate::{load_schema, read_json};

/// Fingerprint subcommand arguments.
#[derive(Args, Debug)]
pub struct FingerprintArgs {
    /// Schema file (JSON or YAML).
    #[arg(long)]
    pub schema: PathBuf,

    /// Record file (JSON object matching the schema).
    #[arg(long)]
    pub record: PathBuf,

    /// Where to write the private fingerprint.
    #[arg(long)]
    pub out: PathBuf,
}

/// Execute the fingerprint subcommand.
pub fn run_fingerprint(args: &FingerprintArgs) -> Result<u8> {
    let schema = load_schema(&args.schema)?;
    let raw: serde_json::Value = read_json(&args.record)?;
    let record = AssetRecord::from_json(&schema, &raw)
        .with_context(|| format!("record {} does not match schema", args.record.display()))?;
    let fingerprint = imprint(&record, &schema).context("fingerprinting failed")?;

    write_fingerprint(&fingerprint, &args.out)?;
    tracing::info!(
        schema_id = %fingerprint.schema_id,
        leaves = fingerprint.leaves.len(),
        "record fingerprinted"
    );
    println!("{}", fingerprint.imprint.to_prefixed_hex());
    Ok(0)
}

fn write_fingerprint(fingerprint: &Fingerprint, out: &std::path::Path) -> Result<()> {
    let json = serde_json::to_string_pretty(fingerprint).context("failed to encode fingerprint")?;
    std::fs::write(out, json)
        .with_context(|| format!("failed to write fingerprint: {}", out.display()))
}
