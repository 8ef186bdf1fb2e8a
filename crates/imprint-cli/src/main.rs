//! # imprint CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use imprint_cli::fingerprint::{run_fingerprint, FingerprintArgs};
use imprint_cli::proof::{run_disclose, run_verify, DiscloseArgs, VerifyArgs};
use imprint_cli::relay::{run_relay, RelayArgs};
use imprint_cli::schema::{run_schema, SchemaArgs};
use imprint_cli::simulate::{run_simulate, SimulateArgs};

/// Asset imprint toolkit.
///
/// Fingerprints asset records into a single published imprint, discloses
/// chosen fields with a compact proof, verifies proofs, and drives ledger
/// mutations against a simulated or relayed network.
#[derive(Parser, Debug)]
#[command(name = "imprint", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Schema ids and leaf layouts.
    Schema(SchemaArgs),

    /// Fingerprint a record and write its private fingerprint.
    Fingerprint(FingerprintArgs),

    /// Build a disclosure proof from a fingerprint.
    Disclose(DiscloseArgs),

    /// Verify a disclosure proof against an imprint.
    Verify(VerifyArgs),

    /// Deploy and mint on an in-memory mock network.
    Simulate(SimulateArgs),

    /// Read-only probes against an HTTP relay.
    Relay(RelayArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // RUST_LOG wins over -v when set.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    });

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if cli.json_logs {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "imprint CLI starting");

    let result = match &cli.command {
        Commands::Schema(args) => run_schema(args),
        Commands::Fingerprint(args) => run_fingerprint(args),
        Commands::Disclose(args) => run_disclose(args),
        Commands::Verify(args) => run_verify(args),
        Commands::Simulate(args) => run_simulate(args),
        Commands::Relay(args) => run_relay(args),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            eprintln!("error: {e:#}");
            ExitCode::from(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use imprint_core::Capability;
    use imprint_cli::relay::RelayCommand;
    use imprint_cli::schema::SchemaCommand;
    use std::path::PathBuf;

    #[test]
    fn parse_verbosity_is_global() {
        let cli = Cli::try_parse_from(["imprint", "schema", "id", "s.yaml", "-vv"]).unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Schema(SchemaArgs {
                command: SchemaCommand::Id { path },
            }) => assert_eq!(path, PathBuf::from("s.yaml")),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn parse_disclose_repeated_reveal() {
        let cli = Cli::try_parse_from([
            "imprint",
            "disclose",
            "--fingerprint",
            "fp.json",
            "--reveal",
            "name",
            "--reveal",
            "image",
        ])
        .unwrap();
        match cli.command {
            Commands::Disclose(args) => {
                assert_eq!(args.reveal, vec!["name", "image"]);
                assert!(args.out.is_none());
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn parse_simulate_capabilities() {
        let cli = Cli::try_parse_from([
            "imprint",
            "simulate",
            "--capability",
            "update_asset",
            "--capability",
            "destroy_asset",
        ])
        .unwrap();
        match cli.command {
            Commands::Simulate(args) => {
                assert_eq!(
                    args.capabilities,
                    vec![Capability::UpdateAsset, Capability::DestroyAsset]
                );
                assert_eq!(args.mints, 2);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(Cli::try_parse_from(["imprint", "simulate", "--capability", "mint"]).is_err());
        assert!(Cli::try_parse_from(["imprint", "simulate", "--poll-ms", "0"]).is_err());
    }

    #[test]
    fn parse_relay_receipt() {
        let cli =
            Cli::try_parse_from(["imprint", "relay", "--url", "http://x", "receipt", "0xab"]).unwrap();
        match cli.command {
            Commands::Relay(args) => {
                assert_eq!(args.url.as_deref(), Some("http://x"));
                assert!(matches!(args.command, RelayCommand::Receipt { ref tx } if tx == "0xab"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn verify_requires_imprint() {
        assert!(
            Cli::try_parse_from(["imprint", "verify", "--schema", "s", "--proof", "p"]).is_err()
        );
    }
}
