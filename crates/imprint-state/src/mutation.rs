//! # Mutation Lifecycle State Machine
//!
//! Tracks one asynchronous ledger-altering operation from construction to
//! its terminal outcome.
//!
//! ```text
//! Created ──submit──▶ Submitted ──await──▶ Pending ──receipt ok──▶ Completed
//!    │                                        │
//!    │ rejected / unreachable / cancelled     │ reverted / timed out
//!    ▼                                        ▼
//!  Failed ◀───────────────────────────────────┘
//! ```
//!
//! ## Security Invariant
//!
//! Terminal states are never left. Every transition is checked against the
//! edge table above and appended to the transition log; a refused
//! transition leaves the mutation untouched.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use imprint_core::{ContractCall, MutationId, MutationKind, MutationResult, TransactionHandle};

// ── Mutation State ───────────────────────────────────────────────────

/// Lifecycle state of a mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MutationState {
    /// Built locally, not yet handed to the network.
    Created,
    /// Accepted by the provider; a transaction handle exists.
    Submitted,
    /// Awaiting confirmation.
    Pending,
    /// Confirmed successfully. Terminal state.
    Completed,
    /// Failed with a [`FailureReason`]. Terminal state.
    Failed,
}

impl MutationState {
    /// Whether this is a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Canonical string name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "CREATED",
            Self::Submitted => "SUBMITTED",
            Self::Pending => "PENDING",
            Self::Completed => "COMPLETED",
            Self::Failed => "FAILED",
        }
    }
}

impl fmt::Display for MutationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Failure ──────────────────────────────────────────────────────────

/// Why a mutation failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    /// The provider refused the submission.
    Rejected,
    /// The transaction was mined but reverted.
    Reverted,
    /// No confirmation arrived before the deadline.
    Timeout,
    /// The provider could not be reached to submit, or its answer was
    /// lost. In the second case the transaction may still confirm; the
    /// failure detail then starts with "submission outcome unknown".
    NetworkUnavailable,
    /// Cancelled before submission.
    Cancelled,
}

impl FailureReason {
    /// Canonical snake_case name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rejected => "rejected",
            Self::Reverted => "reverted",
            Self::Timeout => "timeout",
            Self::NetworkUnavailable => "network_unavailable",
            Self::Cancelled => "cancelled",
        }
    }

    /// The only state a mutation may fail from with this reason.
    ///
    /// No wildcard so that a new reason forces a decision here.
    fn source_state(&self) -> MutationState {
        match self {
            Self::Rejected | Self::NetworkUnavailable | Self::Cancelled => MutationState::Created,
            Self::Reverted | Self::Timeout => MutationState::Pending,
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure reason plus diagnostic detail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutationFailure {
    /// Failure category.
    pub reason: FailureReason,
    /// Provider or tracker detail; never swallowed.
    pub detail: String,
}

impl fmt::Display for MutationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.detail.is_empty() {
            write!(f, "{}", self.reason)
        } else {
            write!(f, "{}: {}", self.reason, self.detail)
        }
    }
}

/// Terminal outcome of a mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum MutationOutcome {
    /// The mutation completed.
    Completed {
        /// Result derived from the confirmed call.
        result: MutationResult,
    },
    /// The mutation failed.
    Failed {
        /// Why it failed.
        failure: MutationFailure,
    },
}

impl MutationOutcome {
    /// The result, if completed.
    pub fn result(&self) -> Option<&MutationResult> {
        match self {
            Self::Completed { result } => Some(result),
            Self::Failed { .. } => None,
        }
    }

    /// The failure, if failed.
    pub fn failure(&self) -> Option<&MutationFailure> {
        match self {
            Self::Completed { .. } => None,
            Self::Failed { failure } => Some(failure),
        }
    }
}

// ── Error Types ──────────────────────────────────────────────────────

/// Refused lifecycle operation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MutationError {
    /// The edge is not in the state machine.
    #[error("invalid mutation transition for {id} from {from} to {to}: {reason}")]
    InvalidTransition {
        /// The mutation.
        id: MutationId,
        /// Current state.
        from: MutationState,
        /// Attempted target state.
        to: MutationState,
        /// Why the edge was refused.
        reason: String,
    },

    /// The mutation already reached a terminal state.
    #[error("mutation {id} is in terminal state {state}")]
    AlreadyTerminal {
        /// The mutation.
        id: MutationId,
        /// Its terminal state.
        state: MutationState,
    },

    /// The mutation was awaited before it was submitted.
    #[error("mutation {id} has not been submitted")]
    NotSubmitted {
        /// The mutation.
        id: MutationId,
    },

    /// An outcome was requested before the mutation reached a terminal state.
    #[error("mutation {id} has no outcome yet (state {state})")]
    NotTerminal {
        /// The mutation.
        id: MutationId,
        /// Its current state.
        state: MutationState,
    },
}

// ── Transition Log ───────────────────────────────────────────────────

/// One recorded state change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionRecord {
    /// State before the transition.
    pub from_state: MutationState,
    /// State after the transition.
    pub to_state: MutationState,
    /// When the transition occurred (UTC).
    pub timestamp: DateTime<Utc>,
}

// ── Mutation ─────────────────────────────────────────────────────────

/// A tracked ledger-altering operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mutation {
    id: MutationId,
    call: ContractCall,
    state: MutationState,
    transaction: Option<TransactionHandle>,
    result: Option<MutationResult>,
    failure: Option<MutationFailure>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    transitions: Vec<TransitionRecord>,
}

impl Mutation {
    /// A new mutation in `Created`.
    pub fn new(call: ContractCall) -> Self {
        let now = Utc::now();
        Self {
            id: MutationId::new(),
            call,
            state: MutationState::Created,
            transaction: None,
            result: None,
            failure: None,
            created_at: now,
            updated_at: now,
            transitions: Vec::new(),
        }
    }

    /// Unique id.
    pub fn id(&self) -> &MutationId {
        &self.id
    }

    /// The call payload.
    pub fn call(&self) -> &ContractCall {
        &self.call
    }

    /// Kind derived from the payload.
    pub fn kind(&self) -> MutationKind {
        self.call.kind()
    }

    /// Current state.
    pub fn state(&self) -> MutationState {
        self.state
    }

    /// Whether the mutation reached a terminal state.
    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    /// Transaction handle, once submitted.
    pub fn transaction(&self) -> Option<&TransactionHandle> {
        self.transaction.as_ref()
    }

    /// Result, once completed.
    pub fn result(&self) -> Option<&MutationResult> {
        self.result.as_ref()
    }

    /// Failure, once failed.
    pub fn failure(&self) -> Option<&MutationFailure> {
        self.failure.as_ref()
    }

    /// Terminal outcome, if any.
    pub fn outcome(&self) -> Option<MutationOutcome> {
        match self.state {
            MutationState::Completed => self
                .result
                .clone()
                .map(|result| MutationOutcome::Completed { result }),
            MutationState::Failed => self
                .failure
                .clone()
                .map(|failure| MutationOutcome::Failed { failure }),
            _ => None,
        }
    }

    /// Terminal outcome, or [`MutationError::NotTerminal`].
    pub fn require_outcome(&self) -> Result<MutationOutcome, MutationError> {
        self.outcome().ok_or(MutationError::NotTerminal {
            id: self.id,
            state: self.state,
        })
    }

    /// Creation time.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Time of the last transition.
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Every transition so far, oldest first.
    pub fn transitions(&self) -> &[TransitionRecord] {
        &self.transitions
    }

    /// `Created -> Submitted`, recording the transaction handle.
    pub fn mark_submitted(&mut self, handle: TransactionHandle) -> Result<(), MutationError> {
        self.require(MutationState::Created, MutationState::Submitted)?;
        self.transaction = Some(handle);
        self.transition(MutationState::Submitted);
        Ok(())
    }

    /// `Submitted -> Pending`.
    pub fn mark_pending(&mut self) -> Result<(), MutationError> {
        self.require(MutationState::Submitted, MutationState::Pending)?;
        self.transition(MutationState::Pending);
        Ok(())
    }

    /// `Pending -> Completed`.
    pub fn complete(&mut self, result: MutationResult) -> Result<(), MutationError> {
        self.require(MutationState::Pending, MutationState::Completed)?;
        self.result = Some(result);
        self.transition(MutationState::Completed);
        Ok(())
    }

    /// `-> Failed`. Rejected, network-unavailable and cancelled failures
    /// leave `Created`; reverted and timed-out failures leave `Pending`.
    pub fn fail(
        &mut self,
        reason: FailureReason,
        detail: impl Into<String>,
    ) -> Result<(), MutationError> {
        self.require(reason.source_state(), MutationState::Failed)?;
        self.failure = Some(MutationFailure {
            reason,
            detail: detail.into(),
        });
        self.transition(MutationState::Failed);
        Ok(())
    }

    /// Downgrade a `Created` mutation to `Failed(Cancelled)`.
    ///
    /// Submitted and pending mutations cannot be cancelled.
    pub fn cancel(&mut self) -> Result<(), MutationError> {
        self.fail(FailureReason::Cancelled, "cancelled before submission")
    }

    fn require(&self, from: MutationState, to: MutationState) -> Result<(), MutationError> {
        if self.state.is_terminal() {
            return Err(MutationError::AlreadyTerminal {
                id: self.id,
                state: self.state,
            });
        }
        if self.state != from {
            return Err(MutationError::InvalidTransition {
                id: self.id,
                from: self.state,
                to,
                reason: format!("{to} is only reachable from {from}"),
            });
        }
        Ok(())
    }

    fn transition(&mut self, to: MutationState) {
        let now = Utc::now();
        self.transitions.push(TransitionRecord {
            from_state: self.state,
            to_state: to,
            timestamp: now,
        });
        self.state = to;
        self.updated_at = now;
    }
}
