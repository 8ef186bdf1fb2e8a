//! # Schema CLI: ids and leaf layouts.
//!
//! ```bash
//! imprint schema id artwork.yaml
//! imprint schema leaves artwork.yaml
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};

use crate::load_schema;

/// Schema subcommand arguments.
#[derive(Args, Debug)]
pub struct SchemaArgs {
    #[command(subcommand)]
    pub command: SchemaCommand,
}

/// Available schema subcommands.
#[derive(Subcommand, Debug)]
pub enum SchemaCommand {
    /// Validate a schema and print its content-derived id.
    Id {
        /// Schema file (JSON or YAML).
        path: PathBuf,
    },

    /// Print the flattened leaf layout in tree order.
    Leaves {
        /// Schema file (JSON or YAML).
        path: PathBuf,
    },
}

/// Execute the schema subcommand.
pub fn run_schema(args: &SchemaArgs) -> Result<u8> {
    match &args.command {
        SchemaCommand::Id { path } => {
            let schema = load_schema(path)?;
            let id = schema
                .id()
                .with_context(|| format!("schema {} is not valid", path.display()))?;
            println!("{id}");
            Ok(0)
        }
        SchemaCommand::Leaves { path } => {
            let schema = load_schema(path)?;
            schema
                .validate()
                .with_context(|| format!("schema {} is not valid", path.display()))?;
            println!("{} v{} ({} leaves)", schema.name, schema.version, schema.leaf_count());
            for slot in schema.leaf_slots() {
                println!("  {:>3}  {:<32} {}", slot.index, slot.path, slot.kind);
            }
            Ok(0)
        }
    }
}
