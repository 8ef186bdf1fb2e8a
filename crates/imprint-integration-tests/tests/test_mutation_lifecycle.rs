//! # Mutation Lifecycle Invariants
//!
//! Applies arbitrary sequences of lifecycle operations to a mutation and
//! checks that the transition log stays contiguous, terminal states are
//! absorbing, and result and failure are populated exactly when the state
//! says so.

use imprint_core::{AccountId, ContractCall, Hash256, MutationResult, TransactionHandle};
use imprint_state::{FailureReason, Mutation, MutationError, MutationState};
use proptest::prelude::*;

#[derive(Debug, Clone, Copy)]
enum Op {
    Submit,
    Pend,
    Complete,
    Fail(FailureReason),
    Cancel,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        Just(Op::Submit),
        Just(Op::Pend),
        Just(Op::Complete),
        Just(Op::Cancel),
        prop_oneof![
            Just(FailureReason::Rejected),
            Just(FailureReason::Reverted),
            Just(FailureReason::Timeout),
            Just(FailureReason::NetworkUnavailable),
            Just(FailureReason::Cancelled),
        ]
        .prop_map(Op::Fail),
    ]
}

fn toggle_call() -> ContractCall {
    ContractCall::ToggleTransfers {
        ledger: AccountId::from_bytes([0x1e; 20]),
        enabled: true,
    }
}

fn apply(m: &mut Mutation, op: Op) -> Result<(), MutationError> {
    match op {
        Op::Submit => m.mark_submitted(TransactionHandle::from_hash(&Hash256::new([7; 32]))),
        Op::Pend => m.mark_pending(),
        Op::Complete => m.complete(MutationResult::TransfersToggled { enabled: true }),
        Op::Fail(reason) => m.fail(reason, "injected"),
        Op::Cancel => m.cancel(),
    }
}

#[test]
fn happy_path_logs_three_transitions() {
    let mut m = Mutation::new(toggle_call());
    for op in [Op::Submit, Op::Pend, Op::Complete] {
        apply(&mut m, op).unwrap();
    }
    let path: Vec<MutationState> = m.transitions().iter().map(|t| t.to_state).collect();
    assert_eq!(
        path,
        vec![
            MutationState::Submitted,
            MutationState::Pending,
            MutationState::Completed
        ]
    );
    assert!(m.require_outcome().is_ok());
}

#[test]
fn reverted_cannot_leave_created() {
    let mut m = Mutation::new(toggle_call());
    let err = apply(&mut m, Op::Fail(FailureReason::Reverted)).unwrap_err();
    assert!(matches!(err, MutationError::InvalidTransition { .. }));
    assert_eq!(m.state(), MutationState::Created);
    assert!(m.transitions().is_empty());
}

proptest! {
    #[test]
    fn arbitrary_operation_sequences_keep_invariants(ops in proptest::collection::vec(op(), 0..16)) {
        let mut m = Mutation::new(toggle_call());
        for op in ops {
            let before = m.state();
            let applied = apply(&mut m, op);
            if before.is_terminal() {
                let is_already_terminal = matches!(applied, Err(MutationError::AlreadyTerminal { .. }));
                prop_assert!(is_already_terminal);
                prop_assert_eq!(m.state(), before);
            }
            if applied.is_err() {
                prop_assert_eq!(m.state(), before);
            }
        }

        let mut current = MutationState::Created;
        for t in m.transitions() {
            prop_assert_eq!(t.from_state, current);
            current = t.to_state;
        }
        prop_assert_eq!(current, m.state());

        prop_assert_eq!(m.result().is_some(), m.state() == MutationState::Completed);
        prop_assert_eq!(m.failure().is_some(), m.state() == MutationState::Failed);
        prop_assert_eq!(m.transaction().is_some(), m.transitions().iter().any(|t| t.to_state == MutationState::Submitted));
    }
}
