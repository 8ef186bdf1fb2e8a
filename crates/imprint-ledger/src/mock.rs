//! # In-Memory Mock Network
//!
//! [`MockNetwork`] simulates the execution network and the deployed
//! ledgers behind it. It records every provider invocation and can be
//! scripted to reject, revert, stay silent, or lose transport, which makes
//! the tracker's timing and failure paths deterministic in tests and in the
//! CLI simulation.
//!
//! ## Ledger semantics
//!
//! Effects apply when a transaction is confirmed, not when it is
//! submitted. A confirmed call that violates ledger rules reverts: minting
//! an existing id, touching a missing asset, destroying another holder's
//! asset, or invoking an operation the ledger was not deployed with.

use std::collections::{BTreeMap, HashMap};

use parking_lot::Mutex;

use imprint_core::{
    AccountId, AssetId, AssetReference, Capability, CapabilitySet, ContractCall, Hash256, Imprint,
    MutationKind, TransactionHandle,
};

use crate::provider::{
    LedgerQuery, NetworkProvider, ProviderError, QueryResponse, ReceiptStatus,
};

/// The mock's signing account.
const DEFAULT_ACCOUNT: [u8; 20] = [
    0xa1, 0x1c, 0xe0, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x01,
];

/// One recorded provider invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderCall {
    /// `account()`.
    Account,
    /// `submit_transaction()` of a call of this kind.
    Submit(MutationKind),
    /// `receipt()` for this handle.
    Receipt(TransactionHandle),
    /// `query()` against a ledger.
    Query(AccountId, LedgerQuery),
}

#[derive(Debug)]
struct MockAsset {
    imprint: Imprint,
    owner: AccountId,
}

#[derive(Debug)]
struct MockLedger {
    uri_base: String,
    capabilities: CapabilitySet,
    transfers_enabled: bool,
    assets: BTreeMap<AssetId, MockAsset>,
}

impl MockLedger {
    fn new(uri_base: String, capabilities: CapabilitySet) -> Self {
        Self {
            uri_base,
            capabilities,
            transfers_enabled: true,
            assets: BTreeMap::new(),
        }
    }

    fn reference(&self, asset_id: AssetId) -> Option<AssetReference> {
        self.assets.get(&asset_id).map(|a| AssetReference {
            asset_id,
            imprint: a.imprint,
            owner: a.owner.clone(),
            uri: if self.uri_base.is_empty() {
                String::new()
            } else {
                format!("{}{}", self.uri_base, asset_id)
            },
        })
    }
}

#[derive(Debug)]
struct MockTransaction {
    call: ContractCall,
    polls_remaining: u32,
    forced_revert: Option<String>,
    receipt: Option<ReceiptStatus>,
}

#[derive(Debug, Default)]
struct MockState {
    account: Option<AccountId>,
    ledgers: HashMap<AccountId, MockLedger>,
    transactions: HashMap<TransactionHandle, MockTransaction>,
    calls: Vec<ProviderCall>,
    next_tx: u64,
    next_address: u64,
    confirmations: u32,
    reject_next: Option<String>,
    revert_next: Option<String>,
    failing_receipts: u32,
    silent: bool,
    unavailable: bool,
}

impl MockState {
    fn account(&self) -> AccountId {
        self.account
            .clone()
            .unwrap_or_else(|| AccountId::from_bytes(DEFAULT_ACCOUNT))
    }

    fn fresh_address(&mut self) -> AccountId {
        self.next_address += 1;
        let mut bytes = [0u8; 20];
        bytes[0] = 0x1e;
        bytes[12..].copy_from_slice(&self.next_address.to_be_bytes());
        AccountId::from_bytes(bytes)
    }

    fn fresh_handle(&mut self) -> TransactionHandle {
        self.next_tx += 1;
        let mut raw = [0u8; 32];
        raw[0] = 0x7e;
        raw[24..].copy_from_slice(&self.next_tx.to_be_bytes());
        TransactionHandle::from_hash(&Hash256::new(raw))
    }

    /// Apply a confirmed call to ledger state.
    fn execute(&mut self, call: &ContractCall) -> ReceiptStatus {
        let sender = self.account();
        if let ContractCall::DeployLedger { recipe } = call {
            let address = self.fresh_address();
            self.ledgers.insert(
                address.clone(),
                MockLedger::new(recipe.uri_base.clone(), recipe.capability_set()),
            );
            return ReceiptStatus::Success {
                contract_address: Some(address),
            };
        }

        let Some(ledger) = call.ledger().and_then(|a| self.ledgers.get_mut(a)) else {
            return revert("no ledger at target address");
        };
        if let Some(cap) = call.kind().required_capability() {
            if !ledger.capabilities.contains(&cap) {
                return revert(format!("ledger lacks capability {cap}"));
            }
        }

        match call {
            // Handled above.
            ContractCall::DeployLedger { .. } => {}
            ContractCall::CreateAsset {
                asset_id,
                imprint,
                receiver,
                ..
            } => {
                if ledger.assets.contains_key(asset_id) {
                    return revert(format!("asset {asset_id} already exists"));
                }
                ledger.assets.insert(
                    *asset_id,
                    MockAsset {
                        imprint: *imprint,
                        owner: receiver.clone(),
                    },
                );
            }
            ContractCall::UpdateAsset {
                asset_id, imprint, ..
            } => match ledger.assets.get_mut(asset_id) {
                Some(asset) => asset.imprint = *imprint,
                None => return revert(format!("asset {asset_id} does not exist")),
            },
            ContractCall::RevokeAsset { asset_id, .. } => {
                if ledger.assets.remove(asset_id).is_none() {
                    return revert(format!("asset {asset_id} does not exist"));
                }
            }
            ContractCall::ToggleTransfers { enabled, .. } => {
                ledger.transfers_enabled = *enabled;
            }
            ContractCall::DestroyAsset { asset_id, .. } => match ledger.assets.get(asset_id) {
                None => return revert(format!("asset {asset_id} does not exist")),
                Some(asset) if asset.owner != sender => {
                    return revert(format!("asset {asset_id} is not held by {sender}"));
                }
                Some(_) => {
                    ledger.assets.remove(asset_id);
                }
            },
        }
        ReceiptStatus::Success {
            contract_address: None,
        }
    }
}

fn revert(reason: impl Into<String>) -> ReceiptStatus {
    ReceiptStatus::Reverted {
        reason: reason.into(),
    }
}

/// Simulated network with scriptable behavior.
///
/// All methods take `&self`; state sits behind a `parking_lot` mutex so a
/// test can script the mock while a tracker holds it in an `Arc`.
#[derive(Debug, Default)]
pub struct MockNetwork {
    state: Mutex<MockState>,
}

impl MockNetwork {
    /// A network with no ledgers that confirms on the first poll.
    pub fn new() -> Self {
        Self::default()
    }

    /// A network signing with `account`.
    pub fn with_account(account: AccountId) -> Self {
        let net = Self::new();
        net.state.lock().account = Some(account);
        net
    }

    /// The account `account()` returns.
    pub fn default_account(&self) -> AccountId {
        self.state.lock().account()
    }

    // -- Scripting ------------------------------------------------------------

    /// Receipts report `Pending` for `polls` polls before confirming.
    pub fn set_confirmations(&self, polls: u32) {
        self.state.lock().confirmations = polls;
    }

    /// Reject the next submission with `reason`.
    pub fn reject_next(&self, reason: impl Into<String>) {
        self.state.lock().reject_next = Some(reason.into());
    }

    /// Revert the next submitted transaction with `reason` at confirmation.
    pub fn revert_next(&self, reason: impl Into<String>) {
        self.state.lock().revert_next = Some(reason.into());
    }

    /// The next `count` receipt polls fail with `Unavailable`.
    pub fn fail_receipts(&self, count: u32) {
        self.state.lock().failing_receipts = count;
    }

    /// While silent, every receipt is `NotFound`.
    pub fn set_silent(&self, silent: bool) {
        self.state.lock().silent = silent;
    }

    /// While unavailable, every call fails with `Unavailable`.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.state.lock().unavailable = unavailable;
    }

    /// Create a ledger directly, bypassing deployment.
    pub fn seed_ledger(&self, capabilities: &[Capability]) -> AccountId {
        let mut state = self.state.lock();
        let address = state.fresh_address();
        state.ledgers.insert(
            address.clone(),
            MockLedger::new(String::new(), capabilities.iter().copied().collect()),
        );
        address
    }

    // -- Inspection -----------------------------------------------------------

    /// Whether a ledger lives at `address`.
    pub fn ledger_exists(&self, address: &AccountId) -> bool {
        self.state.lock().ledgers.contains_key(address)
    }

    /// Whether transfers are enabled on `ledger`.
    pub fn transfers_enabled(&self, ledger: &AccountId) -> Option<bool> {
        self.state
            .lock()
            .ledgers
            .get(ledger)
            .map(|l| l.transfers_enabled)
    }

    /// Every provider invocation so far, oldest first.
    pub fn calls(&self) -> Vec<ProviderCall> {
        self.state.lock().calls.clone()
    }

    /// Total provider invocations.
    pub fn call_count(&self) -> usize {
        self.state.lock().calls.len()
    }

    /// Number of `submit_transaction` invocations.
    pub fn submission_count(&self) -> usize {
        self.state
            .lock()
            .calls
            .iter()
            .filter(|c| matches!(c, ProviderCall::Submit(_)))
            .count()
    }
}

#[async_trait::async_trait]
impl NetworkProvider for MockNetwork {
    async fn account(&self) -> Result<AccountId, ProviderError> {
        let mut state = self.state.lock();
        state.calls.push(ProviderCall::Account);
        if state.unavailable {
            return Err(ProviderError::unavailable("mock network offline"));
        }
        Ok(state.account())
    }

    async fn submit_transaction(
        &self,
        call: &ContractCall,
    ) -> Result<TransactionHandle, ProviderError> {
        let mut state = self.state.lock();
        state.calls.push(ProviderCall::Submit(call.kind()));
        if state.unavailable {
            return Err(ProviderError::unavailable("mock network offline"));
        }
        if let Some(reason) = state.reject_next.take() {
            return Err(ProviderError::rejected(reason));
        }
        let handle = state.fresh_handle();
        let tx = MockTransaction {
            call: call.clone(),
            polls_remaining: state.confirmations,
            forced_revert: state.revert_next.take(),
            receipt: None,
        };
        state.transactions.insert(handle.clone(), tx);
        Ok(handle)
    }

    async fn receipt(&self, handle: &TransactionHandle) -> Result<ReceiptStatus, ProviderError> {
        let mut state = self.state.lock();
        state.calls.push(ProviderCall::Receipt(handle.clone()));
        if state.unavailable {
            return Err(ProviderError::unavailable("mock network offline"));
        }
        if state.failing_receipts > 0 {
            state.failing_receipts -= 1;
            return Err(ProviderError::unavailable("mock receipt endpoint failed"));
        }
        if state.silent {
            return Ok(ReceiptStatus::NotFound);
        }
        let Some(tx) = state.transactions.get_mut(handle) else {
            return Ok(ReceiptStatus::NotFound);
        };
        if let Some(receipt) = &tx.receipt {
            return Ok(receipt.clone());
        }
        if tx.polls_remaining > 0 {
            tx.polls_remaining -= 1;
            return Ok(ReceiptStatus::Pending);
        }
        let call = tx.call.clone();
        let forced = tx.forced_revert.take();
        let receipt = match forced {
            Some(reason) => revert(reason),
            None => state.execute(&call),
        };
        if let Some(tx) = state.transactions.get_mut(handle) {
            tx.receipt = Some(receipt.clone());
        }
        Ok(receipt)
    }

    async fn query(
        &self,
        ledger: &AccountId,
        query: &LedgerQuery,
    ) -> Result<QueryResponse, ProviderError> {
        let mut state = self.state.lock();
        state
            .calls
            .push(ProviderCall::Query(ledger.clone(), query.clone()));
        if state.unavailable {
            return Err(ProviderError::unavailable("mock network offline"));
        }
        let Some(l) = state.ledgers.get(ledger) else {
            return Err(ProviderError::rejected(format!("no ledger at {ledger}")));
        };
        Ok(match query {
            LedgerQuery::Balance { owner } => QueryResponse::Balance {
                balance: l.assets.values().filter(|a| &a.owner == owner).count() as u64,
            },
            LedgerQuery::Asset { asset_id } => QueryResponse::Asset {
                asset: l.reference(*asset_id),
            },
        })
    }

    fn provider_name(&self) -> &str {
        "MockNetwork"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create(ledger: &AccountId, id: u64, owner: AccountId) -> ContractCall {
        ContractCall::CreateAsset {
            ledger: ledger.clone(),
            asset_id: AssetId::new(id).unwrap(),
            imprint: Imprint::new(Hash256::new([id as u8; 32])),
            receiver: owner,
        }
    }

    #[tokio::test]
    async fn effects_apply_at_confirmation() {
        let net = MockNetwork::new();
        let ledger = net.seed_ledger(&[]);
        let owner = net.default_account();
        let tx = net
            .submit_transaction(&create(&ledger, 1, owner.clone()))
            .await
            .unwrap();
        let balance = |r: QueryResponse| match r {
            QueryResponse::Balance { balance } => balance,
            other => panic!("unexpected {other:?}"),
        };
        let q = LedgerQuery::Balance { owner };
        assert_eq!(balance(net.query(&ledger, &q).await.unwrap()), 0);
        assert!(matches!(
            net.receipt(&tx).await.unwrap(),
            ReceiptStatus::Success { .. }
        ));
        assert_eq!(balance(net.query(&ledger, &q).await.unwrap()), 1);
        // Receipts are stable once settled.
        assert_eq!(
            net.receipt(&tx).await.unwrap(),
            ReceiptStatus::Success {
                contract_address: None
            }
        );
    }

    #[tokio::test]
    async fn confirmations_report_pending_first() {
        let net = MockNetwork::new();
        net.set_confirmations(2);
        let ledger = net.seed_ledger(&[Capability::ToggleTransfers]);
        let tx = net
            .submit_transaction(&ContractCall::ToggleTransfers {
                ledger: ledger.clone(),
                enabled: false,
            })
            .await
            .unwrap();
        assert_eq!(net.receipt(&tx).await.unwrap(), ReceiptStatus::Pending);
        assert_eq!(net.receipt(&tx).await.unwrap(), ReceiptStatus::Pending);
        assert_eq!(net.transfers_enabled(&ledger), Some(true));
        assert!(matches!(
            net.receipt(&tx).await.unwrap(),
            ReceiptStatus::Success { .. }
        ));
        assert_eq!(net.transfers_enabled(&ledger), Some(false));
    }

    #[tokio::test]
    async fn ledger_rules_revert() {
        let net = MockNetwork::new();
        let ledger = net.seed_ledger(&[]);
        let other = AccountId::from_bytes([7; 20]);

        let denied = net
            .submit_transaction(&ContractCall::RevokeAsset {
                ledger: ledger.clone(),
                asset_id: AssetId::after_balance(0),
            })
            .await
            .unwrap();
        assert!(matches!(
            net.receipt(&denied).await.unwrap(),
            ReceiptStatus::Reverted { reason } if reason.contains("revoke_asset")
        ));

        let first = net.submit_transaction(&create(&ledger, 1, other.clone())).await.unwrap();
        let dup = net.submit_transaction(&create(&ledger, 1, other)).await.unwrap();
        assert!(matches!(net.receipt(&first).await.unwrap(), ReceiptStatus::Success { .. }));
        assert!(matches!(
            net.receipt(&dup).await.unwrap(),
            ReceiptStatus::Reverted { reason } if reason.contains("already exists")
        ));
    }

    #[tokio::test]
    async fn destroy_requires_holder() {
        let net = MockNetwork::new();
        let ledger = net.seed_ledger(&[Capability::DestroyAsset]);
        let stranger = AccountId::from_bytes([7; 20]);
        let mint = net.submit_transaction(&create(&ledger, 1, stranger)).await.unwrap();
        net.receipt(&mint).await.unwrap();

        let destroy = net
            .submit_transaction(&ContractCall::DestroyAsset {
                ledger: ledger.clone(),
                asset_id: AssetId::after_balance(0),
            })
            .await
            .unwrap();
        assert!(matches!(
            net.receipt(&destroy).await.unwrap(),
            ReceiptStatus::Reverted { .. }
        ));
    }

    #[tokio::test]
    async fn scripting_and_call_log() {
        let net = MockNetwork::new();
        let ledger = net.seed_ledger(&[]);
        net.reject_next("nonce too low");
        let call = create(&ledger, 1, net.default_account());
        assert_eq!(
            net.submit_transaction(&call).await,
            Err(ProviderError::rejected("nonce too low"))
        );
        // One-shot: the next submission goes through.
        let tx = net.submit_transaction(&call).await.unwrap();

        net.set_silent(true);
        assert_eq!(net.receipt(&tx).await.unwrap(), ReceiptStatus::NotFound);
        net.set_silent(false);

        net.set_unavailable(true);
        assert!(net.account().await.unwrap_err().is_transient());
        net.set_unavailable(false);

        assert_eq!(net.submission_count(), 2);
        assert_eq!(
            net.calls(),
            vec![
                ProviderCall::Submit(MutationKind::CreateAsset),
                ProviderCall::Submit(MutationKind::CreateAsset),
                ProviderCall::Receipt(tx),
                ProviderCall::Account,
            ]
        );
    }

    #[tokio::test]
    async fn unknown_ledger_query_is_rejected() {
        let net = MockNetwork::new();
        let err = net
            .query(
                &AccountId::from_bytes([3; 20]),
                &LedgerQuery::Asset {
                    asset_id: AssetId::after_balance(0),
                },
            )
            .await
            .unwrap_err();
        assert!(!err.is_transient());
    }
}
