//! Single-writer mint queue.
//!
//! [`LedgerClient::mint_asset`] derives the new id from the owner's
//! balance, so two in-flight mints for one owner read the same balance and
//! collide. The queue funnels mints through one worker task that awaits
//! each mint to a terminal state before reading the next balance.
//!
//! This serializes mints issued through one queue in one process. Mints
//! submitted by other processes or other queues are not covered.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use imprint_core::{AccountId, Imprint};

use crate::facade::{LedgerClient, LedgerError, LedgerHandle};
use crate::provider::NetworkProvider;
use crate::tracker::TrackedMutation;

/// Default number of mints that may wait in the queue.
pub const DEFAULT_QUEUE_CAPACITY: usize = 64;

struct MintRequest {
    ledger: LedgerHandle,
    imprint: Imprint,
    owner: AccountId,
    reply: oneshot::Sender<Result<Arc<TrackedMutation>, LedgerError>>,
}

/// Handle to a mint worker task.
#[derive(Debug)]
pub struct MintQueue {
    requests: mpsc::Sender<MintRequest>,
    worker: JoinHandle<()>,
}

impl MintQueue {
    /// Start a worker minting through `client`.
    pub fn spawn<P>(client: LedgerClient<P>, capacity: usize) -> Self
    where
        P: NetworkProvider + 'static,
    {
        let (requests, rx) = mpsc::channel(capacity.max(1));
        let worker = tokio::spawn(mint_worker(client, rx));
        Self { requests, worker }
    }

    /// Queue a mint and wait for it to reach a terminal state.
    ///
    /// The returned mutation is terminal; inspect its outcome for the
    /// assigned id or the failure.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::QueueClosed`] if the worker has stopped, or
    /// the error [`LedgerClient::mint_asset`] reported.
    pub async fn mint(
        &self,
        ledger: LedgerHandle,
        imprint: Imprint,
        owner: AccountId,
    ) -> Result<Arc<TrackedMutation>, LedgerError> {
        let (reply, response) = oneshot::channel();
        self.requests
            .send(MintRequest {
                ledger,
                imprint,
                owner,
                reply,
            })
            .await
            .map_err(|_| LedgerError::QueueClosed)?;
        response.await.map_err(|_| LedgerError::QueueClosed)?
    }

    /// Stop accepting mints, drain the queue, and wait for the worker.
    pub async fn shutdown(self) {
        drop(self.requests);
        if let Err(e) = self.worker.await {
            tracing::error!(error = %e, "mint worker terminated abnormally");
        }
    }
}

impl std::fmt::Debug for MintRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MintRequest")
            .field("ledger", self.ledger.address())
            .field("owner", &self.owner)
            .finish_non_exhaustive()
    }
}

async fn mint_worker<P: NetworkProvider>(
    client: LedgerClient<P>,
    mut rx: mpsc::Receiver<MintRequest>,
) {
    tracing::debug!("mint worker started");
    while let Some(req) = rx.recv().await {
        let result = mint_to_completion(&client, &req).await;
        if req.reply.send(result).is_err() {
            tracing::debug!(owner = %req.owner, "mint requester went away");
        }
    }
    tracing::debug!("mint worker stopped");
}

async fn mint_to_completion<P: NetworkProvider>(
    client: &LedgerClient<P>,
    req: &MintRequest,
) -> Result<Arc<TrackedMutation>, LedgerError> {
    let mutation = client
        .mint_asset(&req.ledger, req.imprint, &req.owner)
        .await?;
    client.tracker().await_completion(&mutation).await?;
    Ok(mutation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TrackerConfig;
    use crate::mock::MockNetwork;
    use crate::tracker::MutationTracker;
    use imprint_core::{Hash256, MutationResult};
    use imprint_schema::SchemaRegistry;
    use std::time::Duration;

    fn client(net: &Arc<MockNetwork>) -> LedgerClient<MockNetwork> {
        let tracker = MutationTracker::new(
            Arc::clone(net),
            TrackerConfig {
                poll_interval: Duration::from_millis(10),
                timeout: Duration::from_secs(1),
            },
        );
        LedgerClient::new(tracker, SchemaRegistry::new())
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_mints_get_distinct_ids() {
        let net = Arc::new(MockNetwork::new());
        net.set_confirmations(2);
        let ledger = LedgerHandle::existing(net.seed_ledger(&[]), &[]);
        let owner = net.default_account();
        let queue = MintQueue::spawn(client(&net), DEFAULT_QUEUE_CAPACITY);

        let imprint = |b: u8| Imprint::new(Hash256::new([b; 32]));
        let (a, b, c) = tokio::join!(
            queue.mint(ledger.clone(), imprint(1), owner.clone()),
            queue.mint(ledger.clone(), imprint(2), owner.clone()),
            queue.mint(ledger.clone(), imprint(3), owner.clone()),
        );
        let done = [a, b, c];

        let mut ids: Vec<u64> = done
            .into_iter()
            .map(|m| match m.unwrap().outcome().and_then(|o| o.result().cloned()) {
                Some(MutationResult::AssetCreated { asset_id }) => asset_id.value(),
                other => panic!("unexpected {other:?}"),
            })
            .collect();
        ids.sort_unstable();
        assert_eq!(ids, vec![1, 2, 3]);
        queue.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn query_failure_is_reported_to_caller() {
        let net = Arc::new(MockNetwork::new());
        let queue = MintQueue::spawn(client(&net), 1);
        let missing = LedgerHandle::existing(AccountId::from_bytes([5; 20]), &[]);
        let err = queue
            .mint(missing, Imprint::new(Hash256::ZERO), net.default_account())
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::Provider(_)));
        queue.shutdown().await;
    }
}
