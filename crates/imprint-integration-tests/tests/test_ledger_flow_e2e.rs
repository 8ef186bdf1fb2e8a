//! # Ledger Flow End-to-End
//!
//! Drives the full producer path against the in-memory network: register
//! a schema, deploy a ledger, fingerprint records, mint them, update and
//! revoke assets, and confirm the verifier still accepts disclosures
//! against whatever imprint the ledger currently holds.

use std::sync::Arc;
use std::time::Duration;

use imprint_core::{
    AssetId, Capability, LedgerRecipe, LeafValue, MutationKind, MutationResult, SchemaId,
};
use imprint_crypto::{disclose, imprint, verify, Fingerprint};
use imprint_ledger::{
    LedgerClient, LedgerError, LedgerHandle, MintQueue, MockNetwork, MutationTracker,
    ProviderCall, TrackerConfig,
};
use imprint_schema::{AssetRecord, Property, PropertyPath, Schema, SchemaRegistry};
use imprint_state::{FailureReason, MutationState};

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

fn artwork(name: &str) -> AssetRecord {
    AssetRecord::new()
        .with("name", LeafValue::String(name.into()))
        .with("image", LeafValue::Bytes(name.as_bytes().to_vec()))
        .with("description", LeafValue::String(format!("{name}, framed")))
}

struct Harness {
    net: Arc<MockNetwork>,
    client: LedgerClient<MockNetwork>,
    schema: Schema,
    schema_id: SchemaId,
}

fn harness() -> Harness {
    let net = Arc::new(MockNetwork::new());
    net.set_confirmations(1);
    let tracker = MutationTracker::new(
        Arc::clone(&net),
        TrackerConfig {
            poll_interval: Duration::from_millis(100),
            timeout: Duration::from_secs(30),
        },
    );
    let schemas = SchemaRegistry::new();
    let schema = artwork_schema();
    let schema_id = schemas.register(schema.clone()).unwrap();
    Harness {
        net,
        client: LedgerClient::new(tracker, schemas),
        schema,
        schema_id,
    }
}

fn recipe(schema_id: SchemaId, capabilities: Vec<Capability>) -> LedgerRecipe {
    LedgerRecipe {
        name: "Harbor Gallery".into(),
        symbol: "HRBR".into(),
        uri_base: "https://gallery.example/assets/".into(),
        schema_id,
        capabilities,
    }
}

async fn deploy(h: &Harness, capabilities: Vec<Capability>) -> LedgerHandle {
    let deployment = h
        .client
        .deploy_ledger(recipe(h.schema_id, capabilities))
        .await
        .unwrap();
    h.client.tracker().await_completion(&deployment).await.unwrap();
    assert_eq!(deployment.state(), MutationState::Completed);
    h.client.ledger_from_deployment(&deployment).unwrap()
}

async fn mint(h: &Harness, ledger: &LedgerHandle, fp: &Fingerprint) -> AssetId {
    let owner = h.client.account().await.unwrap();
    let m = h.client.mint_asset(ledger, fp.imprint, &owner).await.unwrap();
    let outcome = h.client.tracker().await_completion(&m).await.unwrap();
    match outcome.result() {
        Some(MutationResult::AssetCreated { asset_id }) => *asset_id,
        other => panic!("mint did not complete: {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn mint_then_disclose_against_on_ledger_imprint() {
    let h = harness();
    let ledger = deploy(&h, vec![]).await;
    assert!(h.net.ledger_exists(ledger.address()));

    let fp = imprint(&artwork("Lighthouse Watercolor"), &h.schema).unwrap();
    let id = mint(&h, &ledger, &fp).await;
    assert_eq!(id.value(), 1);

    let on_ledger = h.client.asset(&ledger, id).await.unwrap().unwrap();
    assert_eq!(on_ledger.imprint, fp.imprint);
    assert_eq!(on_ledger.uri, "https://gallery.example/assets/1");

    let proof = disclose(&fp, &[PropertyPath::from_dotted("name")]).unwrap();
    assert!(verify(&proof, &on_ledger.imprint, &h.schema).unwrap());
}

#[tokio::test(start_paused = true)]
async fn sequential_mints_take_consecutive_ids() {
    let h = harness();
    let ledger = deploy(&h, vec![]).await;
    let owner = h.client.account().await.unwrap();

    let first = imprint(&artwork("First Light"), &h.schema).unwrap();
    let second = imprint(&artwork("Second Tide"), &h.schema).unwrap();
    assert_eq!(mint(&h, &ledger, &first).await.value(), 1);
    assert_eq!(mint(&h, &ledger, &second).await.value(), 2);
    assert_eq!(h.client.balance_of(&ledger, &owner).await.unwrap(), 2);
}

#[tokio::test(start_paused = true)]
async fn mint_queue_serializes_concurrent_mints() {
    let h = harness();
    let ledger = deploy(&h, vec![]).await;
    let owner = h.client.account().await.unwrap();
    let queue = MintQueue::spawn(h.client.clone(), 8);

    let fps: Vec<Fingerprint> = ["North", "South", "East", "West"]
        .iter()
        .map(|n| imprint(&artwork(n), &h.schema).unwrap())
        .collect();
    let (a, b, c, d) = tokio::join!(
        queue.mint(ledger.clone(), fps[0].imprint, owner.clone()),
        queue.mint(ledger.clone(), fps[1].imprint, owner.clone()),
        queue.mint(ledger.clone(), fps[2].imprint, owner.clone()),
        queue.mint(ledger.clone(), fps[3].imprint, owner.clone()),
    );
    let mut ids: Vec<u64> = [a, b, c, d]
        .into_iter()
        .map(|m| {
            let m = m.unwrap();
            assert_eq!(m.state(), MutationState::Completed);
            match m.outcome().and_then(|o| o.result().cloned()) {
                Some(MutationResult::AssetCreated { asset_id }) => asset_id.value(),
                other => panic!("unexpected {other:?}"),
            }
        })
        .collect();
    ids.sort_unstable();
    assert_eq!(ids, vec![1, 2, 3, 4]);
    queue.shutdown().await;

    assert_eq!(h.client.balance_of(&ledger, &owner).await.unwrap(), 4);
}

#[tokio::test(start_paused = true)]
async fn update_swaps_the_imprint_verifiers_accept() {
    let h = harness();
    let ledger = deploy(&h, vec![Capability::UpdateAsset]).await;
    let original = imprint(&artwork("Harbor"), &h.schema).unwrap();
    let id = mint(&h, &ledger, &original).await;

    let restored = imprint(&artwork("Harbor (restored)"), &h.schema).unwrap();
    let update = h
        .client
        .update_asset(&ledger, id, restored.imprint)
        .await
        .unwrap();
    h.client.tracker().await_completion(&update).await.unwrap();
    assert_eq!(update.state(), MutationState::Completed);

    let current = h.client.asset(&ledger, id).await.unwrap().unwrap().imprint;
    let name = [PropertyPath::from_dotted("name")];
    assert!(verify(&disclose(&restored, &name).unwrap(), &current, &h.schema).unwrap());
    assert!(!verify(&disclose(&original, &name).unwrap(), &current, &h.schema).unwrap());
}

#[tokio::test(start_paused = true)]
async fn gated_operations_respect_capabilities() {
    let h = harness();
    let ledger = deploy(&h, vec![Capability::RevokeAsset]).await;
    let fp = imprint(&artwork("Gated"), &h.schema).unwrap();
    let id = mint(&h, &ledger, &fp).await;
    let before = h.net.submission_count();

    let err = h.client.destroy_asset(&ledger, id).await.unwrap_err();
    assert!(matches!(err, LedgerError::CapabilityDenied(_)));
    let err = h.client.toggle_transfers(&ledger, false).await.unwrap_err();
    assert!(matches!(err, LedgerError::CapabilityDenied(_)));
    assert_eq!(h.net.submission_count(), before);

    let revoke = h.client.revoke_asset(&ledger, id).await.unwrap();
    h.client.tracker().await_completion(&revoke).await.unwrap();
    assert_eq!(revoke.state(), MutationState::Completed);
    assert!(h.client.asset(&ledger, id).await.unwrap().is_none());
}

#[tokio::test(start_paused = true)]
async fn transfers_toggle_on_a_seeded_ledger() {
    let h = harness();
    let address = h.net.seed_ledger(&[Capability::ToggleTransfers]);
    let ledger = LedgerHandle::existing(address.clone(), &[Capability::ToggleTransfers]);

    let toggle = h.client.toggle_transfers(&ledger, false).await.unwrap();
    let outcome = h.client.tracker().await_completion(&toggle).await.unwrap();
    assert_eq!(
        outcome.result(),
        Some(&MutationResult::TransfersToggled { enabled: false })
    );
    assert_eq!(h.net.transfers_enabled(&address), Some(false));
}

#[tokio::test(start_paused = true)]
async fn rejected_mint_leaves_the_ledger_untouched() {
    let h = harness();
    let ledger = deploy(&h, vec![]).await;
    let owner = h.client.account().await.unwrap();
    let fp = imprint(&artwork("Refused"), &h.schema).unwrap();

    h.net.reject_next("insufficient funds for gas");
    let m = h.client.mint_asset(&ledger, fp.imprint, &owner).await.unwrap();
    assert_eq!(m.state(), MutationState::Failed);
    let failure = m.outcome().and_then(|o| o.failure().cloned()).unwrap();
    assert_eq!(failure.reason, FailureReason::Rejected);
    assert!(failure.detail.contains("insufficient funds"));
    assert_eq!(h.client.balance_of(&ledger, &owner).await.unwrap(), 0);

    // The next attempt reuses id 1.
    assert_eq!(mint(&h, &ledger, &fp).await.value(), 1);
}

#[tokio::test(start_paused = true)]
async fn unconfirmed_mint_times_out() {
    let h = harness();
    let ledger = deploy(&h, vec![]).await;
    let owner = h.client.account().await.unwrap();
    let fp = imprint(&artwork("Lost"), &h.schema).unwrap();

    h.net.set_silent(true);
    let m = h.client.mint_asset(&ledger, fp.imprint, &owner).await.unwrap();
    let outcome = h
        .client
        .tracker()
        .await_completion_with(&m, Duration::from_millis(100), Duration::from_secs(2))
        .await
        .unwrap();
    assert_eq!(outcome.failure().map(|f| f.reason), Some(FailureReason::Timeout));
    assert_eq!(m.kind(), MutationKind::CreateAsset);
}

#[tokio::test(start_paused = true)]
async fn provider_sees_the_expected_call_sequence() {
    let h = harness();
    let ledger = deploy(&h, vec![]).await;
    let fp = imprint(&artwork("Traced"), &h.schema).unwrap();
    mint(&h, &ledger, &fp).await;

    let submissions: Vec<MutationKind> = h
        .net
        .calls()
        .into_iter()
        .filter_map(|c| match c {
            ProviderCall::Submit(kind) => Some(kind),
            _ => None,
        })
        .collect();
    assert_eq!(
        submissions,
        vec![MutationKind::DeployLedger, MutationKind::CreateAsset]
    );
}
