//! # imprint-state: Mutation Lifecycle
//!
//! The pure, synchronous state machine behind every ledger-altering
//! operation. The async tracker in `imprint-ledger` drives it; nothing here
//! touches the network or the clock beyond transition timestamps.
//!
//! - [`Mutation`]: payload, state, transaction handle, outcome, and the
//!   transition log.
//! - [`MutationState`]: `Created -> Submitted -> Pending -> Completed`,
//!   with `Failed` reachable from `Created` and `Pending`.
//! - [`FailureReason`]: rejected, reverted, timeout, network unavailable,
//!   cancelled.

pub mod mutation;

pub use mutation::{
    FailureReason, Mutation, MutationError, MutationFailure, MutationOutcome, MutationState,
    TransitionRecord,
};
