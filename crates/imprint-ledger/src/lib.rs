//! # imprint-ledger: Asynchronous Ledger Client
//!
//! Everything that talks to the execution network:
//!
//! - [`NetworkProvider`]: the async seam to the network, with a live
//!   [`HttpNetworkProvider`] and an in-memory [`MockNetwork`].
//! - [`MutationTracker`]: submits calls and follows each
//!   [`TrackedMutation`] through `Created -> Submitted -> Pending ->
//!   {Completed | Failed}`, with timeout and observable transitions.
//! - [`LedgerClient`]: capability-checked deploy, mint, update, revoke,
//!   toggle, destroy, and read operations.
//! - [`MintQueue`]: in-process serialization of balance-derived asset ids.
//!
//! ## Crate Policy
//!
//! - Local validation happens before any network call.
//! - Network failures surface as terminal `Failed` mutations, never as
//!   panics. State-changing calls are never retried automatically.

pub mod config;
pub mod facade;
pub mod http;
pub mod mint_queue;
pub mod mock;
pub mod provider;
pub mod retry;
pub mod tracker;

pub use config::{ConfigError, HttpProviderConfig, TrackerConfig, MIN_POLL_INTERVAL};
pub use facade::{
    CapabilityDeniedError, InvalidRecipeError, LedgerClient, LedgerError, LedgerHandle,
};
pub use http::HttpNetworkProvider;
pub use mint_queue::MintQueue;
pub use mock::{MockNetwork, ProviderCall};
pub use provider::{
    LedgerQuery, NetworkProvider, ProviderError, QueryResponse, ReceiptStatus,
    SUBMISSION_OUTCOME_UNKNOWN,
};
pub use retry::RetryPolicy;
pub use tracker::{MutationTracker, TrackedMutation};
