//! # imprint-cli: Command-Line Interface
//!
//! Provides the `imprint` binary.
//!
//! ## Subcommands
//!
//! - `imprint schema`: schema ids and leaf layouts.
//! - `imprint fingerprint`: fingerprint a record; prints the imprint and
//!   writes the private fingerprint file.
//! - `imprint disclose`: build a disclosure proof from a fingerprint file.
//! - `imprint verify`: check a disclosure proof against an imprint.
//! - `imprint simulate`: run a deploy-and-mint scenario on the mock network.
//! - `imprint relay`: read-only probes against an HTTP relay.
//!
//! ```bash
//! imprint fingerprint --schema artwork.yaml --record lighthouse.json --out lighthouse.fp.json
//! imprint disclose --fingerprint lighthouse.fp.json --reveal name --reveal image
//! imprint verify --schema artwork.yaml --proof proof.json --imprint 0x5c50...
//! ```

pub mod fingerprint;
pub mod proof;
pub mod relay;
pub mod schema;
pub mod simulate;

use std::path::Path;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;

use imprint_schema::Schema;

/// Load a schema from a JSON or YAML file, chosen by extension.
pub fn load_schema(path: &Path) -> Result<Schema> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read schema: {}", path.display()))?;
    let schema = match path.extension().and_then(|e| e.to_str()) {
        Some("yaml" | "yml") => Schema::from_yaml_str(&content),
        _ => Schema::from_json_str(&content),
    }
    .with_context(|| format!("invalid schema: {}", path.display()))?;
    Ok(schema)
}

/// Read and deserialize a JSON file.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("failed to parse {}", path.display()))
}

/// Write `content` to `out`, or print it when `out` is `None`.
pub fn emit(content: &str, out: Option<&Path>) -> Result<()> {
    match out {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("failed to write {}", path.display()))?;
            tracing::info!(path = %path.display(), "wrote output");
        }
        None => println!("{content}"),
    }
    Ok(())
}
