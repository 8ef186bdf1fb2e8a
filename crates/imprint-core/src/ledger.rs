//! # Ledger Call Vocabulary
//!
//! The payloads a client hands to the network for ledger-altering
//! operations, the capabilities that gate them, and the results a
//! confirmed call produces.
//!
//! A [`ContractCall`] is the payload of a mutation. Its [`MutationKind`] is
//! derived, never stored separately, so kind and payload cannot disagree.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::digest::Imprint;
use crate::identity::{AccountId, AssetId, SchemaId};

/// Administrator-granted permission on a ledger, fixed at deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Holders may destroy their assets.
    DestroyAsset,
    /// Administrators may replace an asset's imprint.
    UpdateAsset,
    /// Administrators may revoke an asset.
    RevokeAsset,
    /// Administrators may enable or disable transfers ledger-wide.
    ToggleTransfers,
}

impl Capability {
    /// All capabilities, in declaration order.
    pub const ALL: [Capability; 4] = [
        Capability::DestroyAsset,
        Capability::UpdateAsset,
        Capability::RevokeAsset,
        Capability::ToggleTransfers,
    ];

    /// Canonical snake_case name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DestroyAsset => "destroy_asset",
            Self::UpdateAsset => "update_asset",
            Self::RevokeAsset => "revoke_asset",
            Self::ToggleTransfers => "toggle_transfers",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The set of capabilities a ledger was deployed with.
pub type CapabilitySet = BTreeSet<Capability>;

/// Parameters of a ledger deployment.
///
/// `capabilities` is a list rather than a set so duplicate entries can be
/// detected and rejected during recipe validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerRecipe {
    /// Human-readable ledger name.
    pub name: String,
    /// Short ticker symbol.
    pub symbol: String,
    /// Base URI for asset metadata; may be empty.
    #[serde(default)]
    pub uri_base: String,
    /// Schema every asset imprint on this ledger is built against.
    pub schema_id: SchemaId,
    /// Capabilities granted at deployment.
    #[serde(default)]
    pub capabilities: Vec<Capability>,
}

impl LedgerRecipe {
    /// The capabilities as a set.
    pub fn capability_set(&self) -> CapabilitySet {
        self.capabilities.iter().copied().collect()
    }
}

/// The kind of a ledger-altering operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationKind {
    /// Deploy a new ledger.
    DeployLedger,
    /// Mint an asset.
    CreateAsset,
    /// Replace an asset's imprint.
    UpdateAsset,
    /// Revoke an asset.
    RevokeAsset,
    /// Enable or disable transfers.
    ToggleTransfers,
    /// Destroy an asset.
    DestroyAsset,
}

impl MutationKind {
    /// Canonical snake_case name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DeployLedger => "deploy_ledger",
            Self::CreateAsset => "create_asset",
            Self::UpdateAsset => "update_asset",
            Self::RevokeAsset => "revoke_asset",
            Self::ToggleTransfers => "toggle_transfers",
            Self::DestroyAsset => "destroy_asset",
        }
    }

    /// The capability the target ledger must hold for this kind, if any.
    ///
    /// Deployment and minting are base administrator operations.
    pub fn required_capability(&self) -> Option<Capability> {
        match self {
            Self::DeployLedger | Self::CreateAsset => None,
            Self::UpdateAsset => Some(Capability::UpdateAsset),
            Self::RevokeAsset => Some(Capability::RevokeAsset),
            Self::ToggleTransfers => Some(Capability::ToggleTransfers),
            Self::DestroyAsset => Some(Capability::DestroyAsset),
        }
    }
}

impl fmt::Display for MutationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A ledger-altering call submitted through the network provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "call", rename_all = "snake_case")]
pub enum ContractCall {
    /// Deploy a ledger from a recipe.
    DeployLedger {
        /// Deployment parameters.
        recipe: LedgerRecipe,
    },
    /// `createAsset(id, imprint, receiver)`.
    CreateAsset {
        /// Target ledger address.
        ledger: AccountId,
        /// Asset id assigned by the client.
        asset_id: AssetId,
        /// Imprint of the asset record.
        imprint: Imprint,
        /// Receiving account.
        receiver: AccountId,
    },
    /// `updateAsset(id, imprint)`.
    UpdateAsset {
        /// Target ledger address.
        ledger: AccountId,
        /// Asset to update.
        asset_id: AssetId,
        /// Replacement imprint.
        imprint: Imprint,
    },
    /// `revokeAsset(id)`.
    RevokeAsset {
        /// Target ledger address.
        ledger: AccountId,
        /// Asset to revoke.
        asset_id: AssetId,
    },
    /// `toggleTransfers(enabled)`.
    ToggleTransfers {
        /// Target ledger address.
        ledger: AccountId,
        /// Whether transfers are enabled after the call.
        enabled: bool,
    },
    /// `destroyAsset(id)`.
    DestroyAsset {
        /// Target ledger address.
        ledger: AccountId,
        /// Asset to destroy.
        asset_id: AssetId,
    },
}

impl ContractCall {
    /// The mutation kind of this call.
    pub fn kind(&self) -> MutationKind {
        match self {
            Self::DeployLedger { .. } => MutationKind::DeployLedger,
            Self::CreateAsset { .. } => MutationKind::CreateAsset,
            Self::UpdateAsset { .. } => MutationKind::UpdateAsset,
            Self::RevokeAsset { .. } => MutationKind::RevokeAsset,
            Self::ToggleTransfers { .. } => MutationKind::ToggleTransfers,
            Self::DestroyAsset { .. } => MutationKind::DestroyAsset,
        }
    }

    /// The ledger this call targets; `None` for deployments.
    pub fn ledger(&self) -> Option<&AccountId> {
        match self {
            Self::DeployLedger { .. } => None,
            Self::CreateAsset { ledger, .. }
            | Self::UpdateAsset { ledger, .. }
            | Self::RevokeAsset { ledger, .. }
            | Self::ToggleTransfers { ledger, .. }
            | Self::DestroyAsset { ledger, .. } => Some(ledger),
        }
    }

    /// Derive the result of a successfully confirmed call.
    ///
    /// A deployment needs the created contract address from the receipt;
    /// `None` is returned when it is missing.
    pub fn settle(&self, contract_address: Option<&AccountId>) -> Option<MutationResult> {
        let result = match self {
            Self::DeployLedger { .. } => MutationResult::LedgerDeployed {
                address: contract_address?.clone(),
            },
            Self::CreateAsset { asset_id, .. } => MutationResult::AssetCreated {
                asset_id: *asset_id,
            },
            Self::UpdateAsset { asset_id, .. } => MutationResult::AssetUpdated {
                asset_id: *asset_id,
            },
            Self::RevokeAsset { asset_id, .. } => MutationResult::AssetRevoked {
                asset_id: *asset_id,
            },
            Self::ToggleTransfers { enabled, .. } => {
                MutationResult::TransfersToggled { enabled: *enabled }
            }
            Self::DestroyAsset { asset_id, .. } => MutationResult::AssetDestroyed {
                asset_id: *asset_id,
            },
        };
        Some(result)
    }
}

/// The outcome payload of a completed mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum MutationResult {
    /// A ledger now lives at `address`.
    LedgerDeployed {
        /// Address of the deployed ledger.
        address: AccountId,
    },
    /// An asset was minted.
    AssetCreated {
        /// The minted asset.
        asset_id: AssetId,
    },
    /// An asset's imprint was replaced.
    AssetUpdated {
        /// The updated asset.
        asset_id: AssetId,
    },
    /// An asset was revoked.
    AssetRevoked {
        /// The revoked asset.
        asset_id: AssetId,
    },
    /// Transfers were toggled.
    TransfersToggled {
        /// New transfer state.
        enabled: bool,
    },
    /// An asset was destroyed.
    AssetDestroyed {
        /// The destroyed asset.
        asset_id: AssetId,
    },
}

/// On-ledger view of an asset, as returned by `getAsset`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetReference {
    /// The asset id.
    pub asset_id: AssetId,
    /// Current imprint of the asset.
    pub imprint: Imprint,
    /// Current owner.
    pub owner: AccountId,
    /// Metadata URI (`uri_base` + id), possibly empty.
    #[serde(default)]
    pub uri: String,
}
