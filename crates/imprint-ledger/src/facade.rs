//! # Registry Facade
//!
//! Typed, capability-checked entry points for ledger operations. Each
//! state-changing operation validates locally, builds a [`ContractCall`],
//! and hands it to the [`MutationTracker`]. The returned
//! [`TrackedMutation`] is already submitted; callers await it when they
//! need the outcome.
//!
//! ## Security Invariant
//!
//! Capability checks and recipe validation run before the provider is
//! touched. A denied operation makes zero network calls.
//!
//! ## Asset ids
//!
//! `mint_asset` assigns `balance(owner) + 1`. The read and the write are
//! separate network round trips, so two concurrent mints for the same owner
//! can collide. Callers serialize them, or route mints through
//! [`MintQueue`](crate::mint_queue::MintQueue).

use std::collections::BTreeSet;
use std::sync::Arc;

use thiserror::Error;

use imprint_core::{
    AccountId, AssetId, AssetReference, Capability, CapabilitySet, ContractCall, Imprint,
    LedgerRecipe, MutationKind, MutationResult, SchemaId,
};
use imprint_schema::SchemaRegistry;
use imprint_state::{MutationError, MutationState};

use crate::provider::{LedgerQuery, NetworkProvider, ProviderError, QueryResponse};
use crate::tracker::{MutationTracker, TrackedMutation};

// ── Errors ───────────────────────────────────────────────────────────

/// A deployment recipe failed local validation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidRecipeError {
    /// Name is empty after trimming.
    #[error("ledger name must not be empty")]
    EmptyName,

    /// Symbol is empty after trimming.
    #[error("ledger symbol must not be empty")]
    EmptySymbol,

    /// The schema is not registered.
    #[error("schema {0} is not registered")]
    UnknownSchema(SchemaId),

    /// A capability is listed more than once.
    #[error("capability {0} listed more than once")]
    DuplicateCapability(Capability),
}

/// The target ledger lacks the capability an operation requires.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("ledger {ledger} lacks capability {capability} required by {kind}")]
pub struct CapabilityDeniedError {
    /// Target ledger.
    pub ledger: AccountId,
    /// Missing capability.
    pub capability: Capability,
    /// Refused operation.
    pub kind: MutationKind,
}

/// Errors from the registry facade.
#[derive(Error, Debug)]
pub enum LedgerError {
    /// Recipe validation failed.
    #[error(transparent)]
    InvalidRecipe(#[from] InvalidRecipeError),

    /// Capability check failed.
    #[error(transparent)]
    CapabilityDenied(#[from] CapabilityDeniedError),

    /// Lifecycle operation refused.
    #[error(transparent)]
    Mutation(#[from] MutationError),

    /// A read query failed.
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// The provider answered a query with the wrong response shape.
    #[error("unexpected query response, expected {expected}")]
    UnexpectedResponse {
        /// Expected response kind.
        expected: &'static str,
    },

    /// A handle was requested from a mutation that is not a deployment.
    #[error("mutation is a {kind}, not a ledger deployment")]
    NotADeployment {
        /// Actual kind.
        kind: MutationKind,
    },

    /// A handle was requested from a deployment that has not completed.
    #[error("ledger deployment has not completed (state {state})")]
    DeploymentNotCompleted {
        /// Current state.
        state: MutationState,
    },

    /// The mint queue worker has stopped.
    #[error("mint queue is closed")]
    QueueClosed,
}

// ── Ledger Handle ────────────────────────────────────────────────────

/// A deployed ledger and the capabilities it was deployed with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerHandle {
    address: AccountId,
    capabilities: CapabilitySet,
}

impl LedgerHandle {
    /// Handle for a ledger deployed elsewhere.
    pub fn existing(address: AccountId, capabilities: &[Capability]) -> Self {
        Self {
            address,
            capabilities: capabilities.iter().copied().collect(),
        }
    }

    /// Contract address.
    pub fn address(&self) -> &AccountId {
        &self.address
    }

    /// Granted capabilities.
    pub fn capabilities(&self) -> &CapabilitySet {
        &self.capabilities
    }

    /// Whether `capability` was granted.
    pub fn has(&self, capability: Capability) -> bool {
        self.capabilities.contains(&capability)
    }

    fn require(&self, kind: MutationKind) -> Result<(), CapabilityDeniedError> {
        match kind.required_capability() {
            Some(capability) if !self.has(capability) => Err(CapabilityDeniedError {
                ledger: self.address.clone(),
                capability,
                kind,
            }),
            _ => Ok(()),
        }
    }
}

// ── Client ───────────────────────────────────────────────────────────

/// Capability-checked ledger operations over a [`MutationTracker`].
#[derive(Debug)]
pub struct LedgerClient<P> {
    tracker: MutationTracker<P>,
    schemas: SchemaRegistry,
}

impl<P> Clone for LedgerClient<P> {
    fn clone(&self) -> Self {
        Self {
            tracker: self.tracker.clone(),
            schemas: self.schemas.clone(),
        }
    }
}

impl<P: NetworkProvider> LedgerClient<P> {
    /// A client resolving recipe schemas against `schemas`.
    pub fn new(tracker: MutationTracker<P>, schemas: SchemaRegistry) -> Self {
        Self { tracker, schemas }
    }

    /// The tracker used to submit and await mutations.
    pub fn tracker(&self) -> &MutationTracker<P> {
        &self.tracker
    }

    /// The provider's signing account.
    pub async fn account(&self) -> Result<AccountId, LedgerError> {
        Ok(self.tracker.provider().account().await?)
    }

    /// Validate a recipe and submit its deployment.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InvalidRecipe`] without contacting the
    /// network if the recipe is malformed or its schema is unknown.
    pub async fn deploy_ledger(
        &self,
        recipe: LedgerRecipe,
    ) -> Result<Arc<TrackedMutation>, LedgerError> {
        self.validate_recipe(&recipe)?;
        tracing::info!(
            name = %recipe.name,
            symbol = %recipe.symbol,
            schema_id = %recipe.schema_id,
            "deploying ledger"
        );
        Ok(self.tracker.submit(ContractCall::DeployLedger { recipe }).await?)
    }

    fn validate_recipe(&self, recipe: &LedgerRecipe) -> Result<(), InvalidRecipeError> {
        if recipe.name.trim().is_empty() {
            return Err(InvalidRecipeError::EmptyName);
        }
        if recipe.symbol.trim().is_empty() {
            return Err(InvalidRecipeError::EmptySymbol);
        }
        if !self.schemas.contains(&recipe.schema_id) {
            return Err(InvalidRecipeError::UnknownSchema(recipe.schema_id));
        }
        let mut seen = BTreeSet::new();
        for capability in &recipe.capabilities {
            if !seen.insert(*capability) {
                return Err(InvalidRecipeError::DuplicateCapability(*capability));
            }
        }
        Ok(())
    }

    /// Build a handle from a completed deployment.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::NotADeployment`] or
    /// [`LedgerError::DeploymentNotCompleted`].
    pub fn ledger_from_deployment(
        &self,
        mutation: &TrackedMutation,
    ) -> Result<LedgerHandle, LedgerError> {
        let snapshot = mutation.snapshot();
        let ContractCall::DeployLedger { recipe } = snapshot.call() else {
            return Err(LedgerError::NotADeployment {
                kind: snapshot.kind(),
            });
        };
        match snapshot.result() {
            Some(MutationResult::LedgerDeployed { address }) => Ok(LedgerHandle {
                address: address.clone(),
                capabilities: recipe.capability_set(),
            }),
            _ => Err(LedgerError::DeploymentNotCompleted {
                state: snapshot.state(),
            }),
        }
    }

    /// Mint an asset carrying `imprint` to `owner`.
    ///
    /// The id is `balance_of(owner) + 1`, read immediately before
    /// submission. Concurrent mints for one owner must be serialized.
    ///
    /// Ids are not unique across owners or over time. Two owners with the
    /// same balance are handed the same id, and the ledger reverts the
    /// second mint. An id freed by [`Self::revoke_asset`] or
    /// [`Self::destroy_asset`] is handed out again once the balance drops.
    /// Callers needing a stable key should use the mutation id or the
    /// imprint.
    pub async fn mint_asset(
        &self,
        ledger: &LedgerHandle,
        imprint: Imprint,
        owner: &AccountId,
    ) -> Result<Arc<TrackedMutation>, LedgerError> {
        let balance = self.balance_of(ledger, owner).await?;
        let asset_id = AssetId::after_balance(balance);
        tracing::debug!(ledger = %ledger.address, owner = %owner, asset_id = %asset_id, "minting asset");
        let call = ContractCall::CreateAsset {
            ledger: ledger.address.clone(),
            asset_id,
            imprint,
            receiver: owner.clone(),
        };
        Ok(self.tracker.submit(call).await?)
    }

    /// Replace the imprint of an asset. Requires [`Capability::UpdateAsset`].
    pub async fn update_asset(
        &self,
        ledger: &LedgerHandle,
        asset_id: AssetId,
        imprint: Imprint,
    ) -> Result<Arc<TrackedMutation>, LedgerError> {
        self.gated(
            ledger,
            ContractCall::UpdateAsset {
                ledger: ledger.address.clone(),
                asset_id,
                imprint,
            },
        )
        .await
    }

    /// Revoke an asset. Requires [`Capability::RevokeAsset`].
    pub async fn revoke_asset(
        &self,
        ledger: &LedgerHandle,
        asset_id: AssetId,
    ) -> Result<Arc<TrackedMutation>, LedgerError> {
        self.gated(
            ledger,
            ContractCall::RevokeAsset {
                ledger: ledger.address.clone(),
                asset_id,
            },
        )
        .await
    }

    /// Enable or disable transfers. Requires [`Capability::ToggleTransfers`].
    pub async fn toggle_transfers(
        &self,
        ledger: &LedgerHandle,
        enabled: bool,
    ) -> Result<Arc<TrackedMutation>, LedgerError> {
        self.gated(
            ledger,
            ContractCall::ToggleTransfers {
                ledger: ledger.address.clone(),
                enabled,
            },
        )
        .await
    }

    /// Destroy an asset. Requires [`Capability::DestroyAsset`].
    pub async fn destroy_asset(
        &self,
        ledger: &LedgerHandle,
        asset_id: AssetId,
    ) -> Result<Arc<TrackedMutation>, LedgerError> {
        self.gated(
            ledger,
            ContractCall::DestroyAsset {
                ledger: ledger.address.clone(),
                asset_id,
            },
        )
        .await
    }

    async fn gated(
        &self,
        ledger: &LedgerHandle,
        call: ContractCall,
    ) -> Result<Arc<TrackedMutation>, LedgerError> {
        if let Err(denied) = ledger.require(call.kind()) {
            tracing::warn!(
                ledger = %denied.ledger,
                capability = %denied.capability,
                kind = %denied.kind,
                "capability denied"
            );
            return Err(denied.into());
        }
        Ok(self.tracker.submit(call).await?)
    }

    /// Number of assets `owner` holds on `ledger`.
    pub async fn balance_of(
        &self,
        ledger: &LedgerHandle,
        owner: &AccountId,
    ) -> Result<u64, LedgerError> {
        let query = LedgerQuery::Balance {
            owner: owner.clone(),
        };
        match self.tracker.provider().query(&ledger.address, &query).await? {
            QueryResponse::Balance { balance } => Ok(balance),
            _ => Err(LedgerError::UnexpectedResponse {
                expected: "balance",
            }),
        }
    }

    /// On-ledger view of an asset, or `None` if it does not exist.
    pub async fn asset(
        &self,
        ledger: &LedgerHandle,
        asset_id: AssetId,
    ) -> Result<Option<AssetReference>, LedgerError> {
        let query = LedgerQuery::Asset { asset_id };
        match self.tracker.provider().query(&ledger.address, &query).await? {
            QueryResponse::Asset { asset } => Ok(asset),
            _ => Err(LedgerError::UnexpectedResponse { expected: "asset" }),
        }
    }
}
