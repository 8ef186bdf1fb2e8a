//! # Relay CLI: read-only probes against an HTTP relay.
//!
//! Connection settings come from `IMPRINT_RELAY_URL`, `IMPRINT_RELAY_TOKEN`
//! and `IMPRINT_RELAY_TIMEOUT_SECS`, or `--url` for the address.
//!
//! ```bash
//! IMPRINT_RELAY_URL=https://relay.example imprint relay account
//! imprint relay --url http://127.0.0.1:8545 receipt 0x5c50...
//! ```

use anyhow::{Context, Result};
use clap::{Args, Subcommand};

use imprint_core::{AccountId, AssetId, TransactionHandle};
use imprint_ledger::{HttpNetworkProvider, HttpProviderConfig, LedgerQuery, NetworkProvider};

/// Relay subcommand arguments.
#[derive(Args, Debug)]
pub struct RelayArgs {
    /// Relay base URL; overrides `IMPRINT_RELAY_URL`.
    #[arg(long, global = true)]
    pub url: Option<String>,

    #[command(subcommand)]
    pub command: RelayCommand,
}

/// Available relay subcommands.
#[derive(Subcommand, Debug)]
pub enum RelayCommand {
    /// Print the relay's signing account.
    Account,

    /// Print the receipt status of a transaction.
    Receipt {
        /// Transaction hash.
        tx: String,
    },

    /// Print an owner's asset count on a ledger.
    Balance {
        /// Ledger contract address.
        ledger: String,
        /// Owner account.
        owner: String,
    },

    /// Print an asset's on-ledger view.
    Asset {
        /// Ledger contract address.
        ledger: String,
        /// Asset id.
        id: u64,
    },
}

fn config(args: &RelayArgs) -> Result<HttpProviderConfig> {
    let token = std::env::var("IMPRINT_RELAY_TOKEN").ok();
    match &args.url {
        Some(url) => {
            let cfg = HttpProviderConfig::parse(url)?;
            Ok(match token.filter(|t| !t.trim().is_empty()) {
                Some(t) => cfg.with_token(t),
                None => cfg,
            })
        }
        None => Ok(HttpProviderConfig::from_env()?),
    }
}

/// Execute the relay subcommand.
pub fn run_relay(args: &RelayArgs) -> Result<u8> {
    let cfg = config(args)?;
    tracing::debug!(config = ?cfg, "relay configuration");
    let provider = HttpNetworkProvider::new(cfg)?;
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    runtime.block_on(probe(&provider, &args.command))
}

async fn probe(provider: &HttpNetworkProvider, command: &RelayCommand) -> Result<u8> {
    let output = match command {
        RelayCommand::Account => provider.account().await?.to_string(),
        RelayCommand::Receipt { tx } => {
            let handle = TransactionHandle::new(tx.as_str())?;
            serde_json::to_string_pretty(&provider.receipt(&handle).await?)?
        }
        RelayCommand::Balance { ledger, owner } => {
            let query = LedgerQuery::Balance {
                owner: AccountId::new(owner.as_str())?,
            };
            let ledger = AccountId::new(ledger.as_str())?;
            serde_json::to_string_pretty(&provider.query(&ledger, &query).await?)?
        }
        RelayCommand::Asset { ledger, id } => {
            let query = LedgerQuery::Asset {
                asset_id: AssetId::new(*id)?,
            };
            let ledger = AccountId::new(ledger.as_str())?;
            serde_json::to_string_pretty(&provider.query(&ledger, &query).await?)?
        }
    };
    println!("{output}");
    Ok(0)
}
