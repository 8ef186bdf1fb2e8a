//! # imprint-core: Foundational Types
//!
//! The leaf of the workspace dependency graph. Defines the primitives every
//! other crate builds on:
//!
//! - **Digests.** [`Hash256`] for tree nodes and [`Imprint`] for the published
//!   root. Hex on the wire, `0x`-prefixed for display.
//! - **Identifiers.** [`SchemaId`], [`AccountId`], [`AssetId`], [`MutationId`],
//!   [`TransactionHandle`]; no bare strings or integers for identifiers.
//! - **Canonical bytes.** [`CanonicalBytes`] (RFC 8785) is the only input to
//!   [`sha256_digest`], used for content-derived identifiers.
//! - **Leaf values.** [`LeafValue`] and its fixed binary encoding, the input
//!   to every salted leaf hash.
//! - **Ledger vocabulary.** [`Capability`], [`ContractCall`], [`MutationKind`],
//!   [`MutationResult`].
//!
//! ## Crate Policy
//!
//! - No dependencies on other `imprint-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod canonical;
pub mod digest;
pub mod error;
pub mod identity;
pub mod ledger;
pub mod value;

pub use canonical::{sha256_digest, CanonicalBytes};
pub use digest::{Hash256, Imprint};
pub use error::{CanonicalizationError, ValidationError};
pub use identity::{AccountId, AssetId, MutationId, SchemaId, TransactionHandle};
pub use ledger::{
    AssetReference, Capability, CapabilitySet, ContractCall, LedgerRecipe, MutationKind,
    MutationResult,
};
pub use value::{LeafKind, LeafValue};
