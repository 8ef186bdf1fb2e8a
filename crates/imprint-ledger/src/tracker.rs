//! # Mutation Tracker
//!
//! Drives [`Mutation`]s through their lifecycle against a
//! [`NetworkProvider`]: hands the payload to the network, then polls for a
//! receipt until the mutation completes, fails, or times out.
//!
//! ## Observation
//!
//! A [`TrackedMutation`] is shared (`Arc`) between the caller, the tracker,
//! and any observer. Every transition is published on a `watch` channel;
//! [`TrackedMutation::subscribe`] gives a presentation layer a stream of
//! states without polling.
//!
//! ## Concurrency
//!
//! The mutation itself sits behind a `parking_lot` mutex that is never held
//! across an `.await`; each transition is published on the watch channel
//! before that mutex is released, so observers see states in order. Do
//! not hold a `watch::Ref` while calling accessors.
//!
//! Awaits are serialized per mutation by an async mutex, so concurrent or
//! repeated `await_completion` calls poll once and all observe the same
//! terminal outcome.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::time::Instant;

use imprint_core::{ContractCall, MutationId, MutationKind, TransactionHandle};
use imprint_state::{
    FailureReason, Mutation, MutationError, MutationOutcome, MutationState,
};

use crate::config::{TrackerConfig, MIN_POLL_INTERVAL};
use crate::provider::{NetworkProvider, ProviderError, ReceiptStatus};

// ── Tracked Mutation ─────────────────────────────────────────────────

#[derive(Debug)]
struct Slot {
    mutation: Mutation,
    dispatching: bool,
}

/// A mutation shared between its owner, the tracker, and observers.
#[derive(Debug)]
pub struct TrackedMutation {
    slot: Mutex<Slot>,
    events: watch::Sender<MutationState>,
    await_lock: tokio::sync::Mutex<()>,
}

impl TrackedMutation {
    fn new(call: ContractCall) -> Self {
        let mutation = Mutation::new(call);
        let (events, _) = watch::channel(mutation.state());
        Self {
            slot: Mutex::new(Slot {
                mutation,
                dispatching: false,
            }),
            events,
            await_lock: tokio::sync::Mutex::new(()),
        }
    }

    /// Mutation id.
    pub fn id(&self) -> MutationId {
        *self.slot.lock().mutation.id()
    }

    /// Mutation kind.
    pub fn kind(&self) -> MutationKind {
        self.slot.lock().mutation.kind()
    }

    /// Current state.
    pub fn state(&self) -> MutationState {
        self.slot.lock().mutation.state()
    }

    /// Transaction handle, once submitted.
    pub fn transaction(&self) -> Option<TransactionHandle> {
        self.slot.lock().mutation.transaction().cloned()
    }

    /// Terminal outcome, if reached.
    pub fn outcome(&self) -> Option<MutationOutcome> {
        self.slot.lock().mutation.outcome()
    }

    /// A copy of the full mutation record.
    pub fn snapshot(&self) -> Mutation {
        self.slot.lock().mutation.clone()
    }

    /// Receive every subsequent state change.
    pub fn subscribe(&self) -> watch::Receiver<MutationState> {
        self.events.subscribe()
    }

    /// Downgrade a `Created` mutation to `Failed(Cancelled)`.
    ///
    /// Refused once submission has started. The check and the transition
    /// happen under one lock, so a cancel can never land while a dispatch
    /// is handing the payload to the network.
    pub fn cancel(&self) -> Result<(), MutationError> {
        self.transition(|slot| {
            if slot.dispatching {
                return Err(MutationError::InvalidTransition {
                    id: *slot.mutation.id(),
                    from: slot.mutation.state(),
                    to: MutationState::Failed,
                    reason: "submission already in flight".to_string(),
                });
            }
            slot.mutation.cancel()
        })
    }

    fn call(&self) -> ContractCall {
        self.slot.lock().mutation.call().clone()
    }

    /// Apply a lifecycle operation and publish the resulting state.
    fn apply(
        &self,
        op: impl FnOnce(&mut Mutation) -> Result<(), MutationError>,
    ) -> Result<(), MutationError> {
        self.transition(|slot| op(&mut slot.mutation))
    }

    /// Run `op` against the slot and publish the new state without
    /// releasing the lock in between, so watchers see states in order.
    fn transition(
        &self,
        op: impl FnOnce(&mut Slot) -> Result<(), MutationError>,
    ) -> Result<(), MutationError> {
        let mut slot = self.slot.lock();
        op(&mut slot)?;
        let m = &slot.mutation;
        let state = m.state();
        let tx = m.transaction().map(|t| t.as_str());
        match m.failure() {
            Some(failure) if state == MutationState::Failed => tracing::warn!(
                mutation_id = %m.id(),
                kind = %m.kind(),
                state = %state,
                tx,
                %failure,
                "mutation failed"
            ),
            _ => tracing::info!(
                mutation_id = %m.id(),
                kind = %m.kind(),
                state = %state,
                tx,
                "mutation transition"
            ),
        }
        self.events.send_replace(state);
        Ok(())
    }

    /// Apply a terminal operation and return the resulting outcome.
    fn finish(
        &self,
        op: impl FnOnce(&mut Mutation) -> Result<(), MutationError>,
    ) -> Result<MutationOutcome, MutationError> {
        self.apply(op)?;
        self.slot.lock().mutation.require_outcome()
    }

    fn begin_dispatch(&self) -> Result<ContractCall, MutationError> {
        let mut slot = self.slot.lock();
        let m = &slot.mutation;
        if m.is_terminal() {
            return Err(MutationError::AlreadyTerminal {
                id: *m.id(),
                state: m.state(),
            });
        }
        if m.state() != MutationState::Created || slot.dispatching {
            return Err(MutationError::InvalidTransition {
                id: *m.id(),
                from: m.state(),
                to: MutationState::Submitted,
                reason: "only created mutations can be dispatched".to_string(),
            });
        }
        let call = m.call().clone();
        slot.dispatching = true;
        Ok(call)
    }
}

/// Clears the dispatching flag when a dispatch ends, including when its
/// future is dropped mid-submission.
struct DispatchGuard<'a>(&'a TrackedMutation);

impl Drop for DispatchGuard<'_> {
    fn drop(&mut self) {
        self.0.slot.lock().dispatching = false;
    }
}

// ── Tracker ──────────────────────────────────────────────────────────

/// Submits mutations and follows them to a terminal state.
#[derive(Debug)]
pub struct MutationTracker<P> {
    provider: Arc<P>,
    config: TrackerConfig,
}

impl<P> Clone for MutationTracker<P> {
    fn clone(&self) -> Self {
        Self {
            provider: Arc::clone(&self.provider),
            config: self.config,
        }
    }
}

impl<P: NetworkProvider> MutationTracker<P> {
    /// A tracker over `provider`.
    pub fn new(provider: Arc<P>, config: TrackerConfig) -> Self {
        Self { provider, config }
    }

    /// The underlying provider.
    pub fn provider(&self) -> &Arc<P> {
        &self.provider
    }

    /// Polling configuration.
    pub fn config(&self) -> TrackerConfig {
        self.config
    }

    /// Build a mutation in `Created` without touching the network.
    pub fn prepare(&self, call: ContractCall) -> Arc<TrackedMutation> {
        let m = Arc::new(TrackedMutation::new(call));
        tracing::debug!(mutation_id = %m.id(), kind = %m.kind(), "mutation created");
        m
    }

    /// Hand a `Created` mutation to the network.
    ///
    /// Returns as soon as the provider answers. A rejection moves the
    /// mutation to `Failed(Rejected)`, a transport failure to
    /// `Failed(NetworkUnavailable)`; neither is an `Err` here.
    ///
    /// If the returned future is dropped before the provider answers, the
    /// mutation stays `Created` and may be dispatched or cancelled again,
    /// although the payload may already have reached the network.
    ///
    /// # Errors
    ///
    /// Returns [`MutationError`] if the mutation is not in `Created`.
    pub async fn dispatch(&self, mutation: &TrackedMutation) -> Result<(), MutationError> {
        let call = mutation.begin_dispatch()?;
        let _guard = DispatchGuard(mutation);
        let submitted = self.provider.submit_transaction(&call).await;
        // The flag is cleared in the same critical section as the
        // transition; a cancel in between would otherwise win.
        mutation.transition(|slot| {
            slot.dispatching = false;
            match submitted {
                Ok(handle) => slot.mutation.mark_submitted(handle),
                Err(ProviderError::Rejected { reason }) => {
                    slot.mutation.fail(FailureReason::Rejected, reason)
                }
                Err(ProviderError::Unavailable { reason }) => {
                    slot.mutation.fail(FailureReason::NetworkUnavailable, reason)
                }
            }
        })
    }

    /// Prepare and dispatch in one step.
    ///
    /// # Errors
    ///
    /// Only fails if the fresh mutation cannot be dispatched, which the
    /// state machine rules out.
    pub async fn submit(&self, call: ContractCall) -> Result<Arc<TrackedMutation>, MutationError> {
        let m = self.prepare(call);
        self.dispatch(&m).await?;
        Ok(m)
    }

    /// Cancel a `Created` mutation.
    ///
    /// # Errors
    ///
    /// Returns [`MutationError`] in every state other than `Created`.
    pub fn cancel(&self, mutation: &TrackedMutation) -> Result<(), MutationError> {
        mutation.cancel()
    }

    /// Await the terminal outcome using the configured interval and timeout.
    ///
    /// # Errors
    ///
    /// See [`Self::await_completion_with`].
    pub async fn await_completion(
        &self,
        mutation: &TrackedMutation,
    ) -> Result<MutationOutcome, MutationError> {
        self.await_completion_with(mutation, self.config.poll_interval, self.config.timeout)
            .await
    }

    /// Poll for a receipt until the mutation reaches a terminal state.
    ///
    /// `Pending` and `NotFound` receipts keep polling; transient provider
    /// errors are logged and polling continues. When `timeout` elapses the
    /// mutation is forced to `Failed(Timeout)`. A mutation that is already
    /// terminal returns its outcome immediately. Intervals below
    /// [`MIN_POLL_INTERVAL`] are raised to it.
    ///
    /// # Errors
    ///
    /// Returns [`MutationError::NotSubmitted`] for a mutation still in
    /// `Created`.
    pub async fn await_completion_with(
        &self,
        mutation: &TrackedMutation,
        poll_interval: Duration,
        timeout: Duration,
    ) -> Result<MutationOutcome, MutationError> {
        let _serialized = mutation.await_lock.lock().await;

        if let Some(outcome) = mutation.outcome() {
            return Ok(outcome);
        }
        let handle = match (mutation.state(), mutation.transaction()) {
            (MutationState::Created, _) | (_, None) => {
                return Err(MutationError::NotSubmitted { id: mutation.id() });
            }
            (MutationState::Submitted, Some(handle)) => {
                mutation.apply(Mutation::mark_pending)?;
                handle
            }
            (_, Some(handle)) => handle,
        };

        let call = mutation.call();
        let poll_interval = poll_interval.max(MIN_POLL_INTERVAL);
        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match tokio::time::timeout(remaining, self.provider.receipt(&handle)).await {
                Ok(Ok(ReceiptStatus::Pending | ReceiptStatus::NotFound)) => {
                    tracing::debug!(mutation_id = %mutation.id(), tx = %handle, "receipt pending");
                }
                Ok(Ok(ReceiptStatus::Success { contract_address })) => {
                    return match call.settle(contract_address.as_ref()) {
                        Some(result) => mutation.finish(|m| m.complete(result)),
                        None => mutation.finish(|m| {
                            m.fail(
                                FailureReason::Reverted,
                                "deployment receipt carries no contract address",
                            )
                        }),
                    };
                }
                Ok(Ok(ReceiptStatus::Reverted { reason })) => {
                    return mutation.finish(|m| m.fail(FailureReason::Reverted, reason));
                }
                Ok(Err(e)) => {
                    tracing::warn!(
                        mutation_id = %mutation.id(),
                        tx = %handle,
                        error = %e,
                        "receipt poll failed, will retry"
                    );
                }
                Err(_elapsed) => {}
            }

            let now = Instant::now();
            if now >= deadline {
                tracing::warn!(
                    mutation_id = %mutation.id(),
                    tx = %handle,
                    timeout_secs = timeout.as_secs_f64(),
                    "confirmation timed out"
                );
                return mutation.finish(|m| {
                    m.fail(
                        FailureReason::Timeout,
                        format!("no confirmation within {timeout:?}"),
                    )
                });
            }
            tokio::time::sleep(poll_interval.min(deadline - now)).await;
        }
    }
}
