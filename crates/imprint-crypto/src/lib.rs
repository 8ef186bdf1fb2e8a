//! # imprint-crypto: Fingerprinting and Selective Disclosure
//!
//! - **Leaf hashing.** [`leaf_hash`] salts and hashes one canonical leaf
//!   encoding; [`node_hash`] joins two children.
//! - **Imprint tree.** [`ImprintTree`] is a binary Merkle tree in schema
//!   order, odd levels padded with the zero hash.
//! - **Fingerprint engine.** [`imprint`] / [`imprint_with_salts`] turn a
//!   record into a [`Fingerprint`].
//! - **Disclosure engine.** [`disclose`] builds a compact
//!   [`DisclosureProof`]; [`verify`] checks it in constant time.
//!
//! Everything here is synchronous, pure, `Send + Sync`, and safe to run in
//! parallel.

pub mod disclosure;
pub mod error;
pub mod fingerprint;
pub mod salt;
pub mod sha256;
pub mod tree;

pub use disclosure::{disclose, verify, DisclosureProof, RevealedLeaf};
pub use error::{DisclosureError, FingerprintError, MalformedProofError};
pub use fingerprint::{imprint, imprint_with_salts, Fingerprint, Leaf};
pub use salt::Salt;
pub use sha256::{leaf_hash, node_hash};
pub use tree::ImprintTree;
