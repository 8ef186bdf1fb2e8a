//! # Simulate CLI: deploy and mint on the mock network.
//!
//! Runs a full ledger scenario against [`MockNetwork`]: register a schema,
//! deploy a ledger, fingerprint and mint a batch of records through a
//! [`MintQueue`], then read the assets back. Every mutation's transitions
//! are printed, which makes the tracker's behavior visible without a live
//! network.
//!
//! ```bash
//! imprint -v simulate --mints 3 --confirmations 2 --capability update_asset
//! ```

use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Args;

use imprint_core::{Capability, LedgerRecipe, LeafValue, MutationResult};
use imprint_crypto::imprint;
use imprint_ledger::{
    LedgerClient, MintQueue, MockNetwork, MutationTracker, TrackedMutation, TrackerConfig,
};
use imprint_schema::{AssetRecord, Property, Schema, SchemaRegistry};
use imprint_state::MutationState;

/// Simulate subcommand arguments.
#[derive(Args, Debug)]
pub struct SimulateArgs {
    /// Number of assets to mint.
    #[arg(long, default_value_t = 2)]
    pub mints: u32,

    /// Receipt polls that report pending before each confirmation.
    #[arg(long, default_value_t = 2)]
    pub confirmations: u32,

    /// Capability to grant the ledger (repeatable).
    #[arg(long = "capability", value_name = "NAME", value_parser = parse_capability)]
    pub capabilities: Vec<Capability>,

    /// Receipt poll interval in milliseconds.
    #[arg(long, default_value_t = 50, value_parser = clap::value_parser!(u64).range(1..))]
    pub poll_ms: u64,

    /// Confirmation timeout in seconds.
    #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout_secs: u64,
}

/// Parse a capability by its snake_case name.
pub fn parse_capability(s: &str) -> Result<Capability, String> {
    Capability::ALL
        .into_iter()
        .find(|c| c.as_str() == s)
        .ok_or_else(|| {
            let names: Vec<_> = Capability::ALL.iter().map(|c| c.as_str()).collect();
            format!("unknown capability {s:?}; expected one of {}", names.join(", "))
        })
}

/// Execute the simulate subcommand.
pub fn run_simulate(args: &SimulateArgs) -> Result<u8> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    runtime.block_on(simulate(args))
}

fn artwork_schema() -> Schema {
    Schema::new(
        "artwork",
        1,
        vec![
            Property::string("name"),
            Property::bytes("image"),
            Property::string("description"),
        ],
    )
}

async fn simulate(args: &SimulateArgs) -> Result<u8> {
    let net = Arc::new(MockNetwork::new());
    net.set_confirmations(args.confirmations);
    let tracker = MutationTracker::new(
        Arc::clone(&net),
        TrackerConfig {
            poll_interval: Duration::from_millis(args.poll_ms),
            timeout: Duration::from_secs(args.timeout_secs),
        },
    );

    let schemas = SchemaRegistry::new();
    let schema = artwork_schema();
    let schema_id = schemas.register(schema.clone())?;
    let client = LedgerClient::new(tracker, schemas);
    let owner = client.account().await?;
    println!("account:  {owner}");
    println!("schema:   {schema_id}");

    let deploy = client
        .deploy_ledger(LedgerRecipe {
            name: "Simulated Gallery".into(),
            symbol: "SIM".into(),
            uri_base: "imprint://sim/".into(),
            schema_id,
            capabilities: args.capabilities.clone(),
        })
        .await?;
    client.tracker().await_completion(&deploy).await?;
    print_mutation(&deploy);
    if deploy.state() != MutationState::Completed {
        bail!("ledger deployment did not complete");
    }
    let ledger = client.ledger_from_deployment(&deploy)?;
    println!("ledger:   {}", ledger.address());

    let queue = MintQueue::spawn(client.clone(), args.mints.max(1) as usize);
    let mut failed = 0u32;
    for i in 1..=args.mints {
        let record = AssetRecord::new()
            .with("name", LeafValue::String(format!("Simulated Asset #{i}")))
            .with("image", LeafValue::Bytes(vec![0x89, 0x50, 0x4e, 0x47, i as u8]))
            .with("description", LeafValue::String("generated by imprint simulate".into()));
        let fingerprint = imprint(&record, &schema)?;
        let minted = queue
            .mint(ledger.clone(), fingerprint.imprint, owner.clone())
            .await?;
        print_mutation(&minted);
        if minted.state() != MutationState::Completed {
            failed += 1;
        }
    }
    queue.shutdown().await;

    let balance = client.balance_of(&ledger, &owner).await?;
    println!("balance:  {balance}");
    for id in 1..=balance {
        let asset_id = imprint_core::AssetId::new(id)?;
        if let Some(asset) = client.asset(&ledger, asset_id).await? {
            println!("  #{:<3} {}  {}", asset.asset_id, asset.imprint, asset.uri);
        }
    }
    println!("provider calls: {}", net.call_count());

    Ok(if failed == 0 { 0 } else { 1 })
}

fn print_mutation(m: &TrackedMutation) {
    let snapshot = m.snapshot();
    let path: Vec<&str> = std::iter::once(MutationState::Created.as_str())
        .chain(snapshot.transitions().iter().map(|t| t.to_state.as_str()))
        .collect();
    println!("{} {}: {}", snapshot.kind(), snapshot.id(), path.join(" -> "));
    match (snapshot.result(), snapshot.failure()) {
        (Some(MutationResult::AssetCreated { asset_id }), _) => println!("  asset id {asset_id}"),
        (Some(MutationResult::LedgerDeployed { address }), _) => println!("  deployed at {address}"),
        (Some(_), _) => {}
        (None, Some(failure)) => println!("  failed: {failure}"),
        (None, None) => {}
    }
}
