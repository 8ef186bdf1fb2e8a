//! # Network Provider Seam
//!
//! The [`NetworkProvider`] trait abstracts the execution network. The
//! tracker and facade only ever talk to the network through it, so a live
//! relay ([`HttpNetworkProvider`](crate::http::HttpNetworkProvider)) and
//! the in-memory [`MockNetwork`](crate::mock::MockNetwork) are
//! interchangeable.
//!
//! ## Error split
//!
//! [`ProviderError::Rejected`] means the network answered and said no.
//! [`ProviderError::Unavailable`] means no usable answer arrived. The
//! tracker maps the first to `Failed(Rejected)` and the second to
//! `Failed(NetworkUnavailable)` on submission; while polling, either is
//! logged and polling continues.
//!
//! A submission whose request left but whose answer was lost (a timeout,
//! or an accepted response that cannot be read) is still `Unavailable`,
//! but its reason starts with [`SUBMISSION_OUTCOME_UNKNOWN`]. The
//! transaction may have reached the network in that case.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use imprint_core::{AccountId, AssetId, AssetReference, ContractCall, TransactionHandle};

/// Reason prefix for submissions the network may have accepted.
pub const SUBMISSION_OUTCOME_UNKNOWN: &str = "submission outcome unknown";

/// Errors returned by a network provider.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// The network refused the request.
    #[error("request rejected: {reason}")]
    Rejected {
        /// Provider-supplied reason.
        reason: String,
    },

    /// The network could not be reached or answered unusably.
    #[error("network unavailable: {reason}")]
    Unavailable {
        /// Transport or server detail.
        reason: String,
    },
}

impl ProviderError {
    /// Shorthand for [`ProviderError::Rejected`].
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self::Rejected {
            reason: reason.into(),
        }
    }

    /// Shorthand for [`ProviderError::Unavailable`].
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable {
            reason: reason.into(),
        }
    }

    /// An `Unavailable` submission that may still have been accepted.
    pub fn submission_unknown(reason: impl std::fmt::Display) -> Self {
        Self::unavailable(format!("{SUBMISSION_OUTCOME_UNKNOWN}: {reason}"))
    }

    /// Whether a submission may have reached the network despite the error.
    pub fn is_outcome_unknown(&self) -> bool {
        matches!(self, Self::Unavailable { reason } if reason.starts_with(SUBMISSION_OUTCOME_UNKNOWN))
    }

    /// Whether a retry might succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Unavailable { .. })
    }
}

/// Confirmation status of a submitted transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ReceiptStatus {
    /// Known to the network but not yet mined.
    Pending,
    /// Not yet visible to the network.
    NotFound,
    /// Mined and succeeded.
    Success {
        /// Address of a contract created by the transaction.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        contract_address: Option<AccountId>,
    },
    /// Mined and reverted.
    Reverted {
        /// Revert reason, possibly empty.
        #[serde(default)]
        reason: String,
    },
}

/// A read-only query against a deployed ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "query", rename_all = "snake_case")]
pub enum LedgerQuery {
    /// `getBalance(owner)`.
    Balance {
        /// Account whose holdings are counted.
        owner: AccountId,
    },
    /// `getAsset(id)`.
    Asset {
        /// Asset to look up.
        asset_id: AssetId,
    },
}

/// Answer to a [`LedgerQuery`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "response", rename_all = "snake_case")]
pub enum QueryResponse {
    /// Number of assets held.
    Balance {
        /// Asset count.
        balance: u64,
    },
    /// The asset, if it exists.
    Asset {
        /// On-ledger view of the asset.
        #[serde(default)]
        asset: Option<AssetReference>,
    },
}

/// Execution network seen by the ledger client.
///
/// Implementations must be `Send + Sync` so one provider can be shared
/// across tasks behind an `Arc`.
#[async_trait::async_trait]
pub trait NetworkProvider: Send + Sync {
    /// The account operations are signed with.
    async fn account(&self) -> Result<AccountId, ProviderError>;

    /// Hand a call to the network. Returns once the network has accepted
    /// the payload; confirmation is observed through [`Self::receipt`].
    ///
    /// An `Unavailable` error does not always mean the payload was never
    /// sent. When the request went out but no usable answer came back,
    /// implementations return [`ProviderError::submission_unknown`] and
    /// the transaction may still confirm.
    async fn submit_transaction(
        &self,
        call: &ContractCall,
    ) -> Result<TransactionHandle, ProviderError>;

    /// Current confirmation status of a submitted transaction.
    async fn receipt(&self, tx: &TransactionHandle) -> Result<ReceiptStatus, ProviderError>;

    /// Read ledger state.
    async fn query(
        &self,
        ledger: &AccountId,
        query: &LedgerQuery,
    ) -> Result<QueryResponse, ProviderError>;

    /// Human-readable name of the implementation.
    fn provider_name(&self) -> &str;
}
