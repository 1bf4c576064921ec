//! Node-level flows: mine and broadcast, accept a foreign block, resolve
//! conflicts, and spread peer lists.
//!
//! The ledger sits behind a single mutex and the registry behind a single
//! rwlock; every mutation goes through the methods below. Neither lock is held
//! across a peer RPC or during the nonce search.

use crate::consensus::{fetch_chains, PeerClient};
use crate::{mine, Block, Ledger, LedgerError, PeerRegistry};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

/// What became of a block offered by a peer.
#[derive(Clone, Debug, PartialEq)]
pub enum ReceiveOutcome {
    /// It extended our tip directly.
    Appended(Block),
    /// It was out of reach, but resolving against peers replaced our chain.
    ChainUpdated,
    /// Stale, or neither path changed anything.
    NotBehind,
}

pub struct Node<C> {
    ledger: Mutex<Ledger>,
    peers: RwLock<PeerRegistry>,
    client: C,
    shutdown: Arc<AtomicBool>,
}

impl<C: PeerClient> Node<C> {
    pub fn new(ledger: Ledger, client: C) -> Self {
        Self {
            ledger: Mutex::new(ledger),
            peers: RwLock::new(PeerRegistry::new()),
            client,
            shutdown: Arc::new(AtomicBool::new(false)),
        }
    }

    #[cfg(test)]
    pub(crate) fn client(&self) -> &C {
        &self.client
    }

    pub async fn blocks(&self) -> Vec<Block> {
        self.ledger.lock().await.blocks().to_vec()
    }

    pub async fn latest(&self) -> Block {
        self.ledger.lock().await.latest().clone()
    }

    pub async fn peers(&self) -> Vec<String> {
        self.peers.read().await.list_peers()
    }

    /// Stops any in-flight nonce search. Searches started afterwards are
    /// cancelled on their first pass.
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
    }

    /// Mines a block carrying `data`, appends it, then pushes it to every peer.
    ///
    /// The search runs on a blocking worker without the ledger lock. If
    /// another block lands on the tip meanwhile, the result is discarded with
    /// [`LedgerError::StaleTip`].
    pub async fn mine(&self, data: String) -> Result<Block, LedgerError> {
        let candidate = self.candidate(data).await?;
        let block = self.search(candidate).await?;
        self.commit_mined(block).await
    }

    async fn candidate(&self, data: String) -> Result<Block, LedgerError> {
        let ledger = self.ledger.lock().await;
        mine::candidate(&ledger, data)
    }

    async fn search(&self, candidate: Block) -> Result<Block, LedgerError> {
        let shutdown = Arc::clone(&self.shutdown);
        tokio::task::spawn_blocking(move || {
            let mut block = candidate;
            mine::search_until(&mut block, || shutdown.load(Ordering::Relaxed)).map(|()| block)
        })
        .await
        .map_err(|e| LedgerError::Worker(e.to_string()))?
    }

    /// Appends a freshly mined block and broadcasts it. Fails with
    /// [`LedgerError::StaleTip`] if the tip it was mined against has moved.
    async fn commit_mined(&self, block: Block) -> Result<Block, LedgerError> {
        let index = block.index;
        self.ledger
            .lock()
            .await
            .append(block.clone())
            .map_err(|_| LedgerError::StaleTip { index })?;
        info!(
            "Mined block {} with nonce {} and hash {}",
            block.index, block.nonce, block.hash
        );

        self.broadcast_block(&block).await;
        Ok(block)
    }

    /// Best-effort push of `block` to every known peer.
    pub async fn broadcast_block(&self, block: &Block) {
        for peer in self.peers().await {
            if let Err(err) = self.client.push_block(&peer, block).await {
                warn!(peer = %peer, error = %err, "block push failed");
            }
        }
    }

    pub async fn receive_block(&self, block: Block) -> ReceiveOutcome {
        {
            let mut ledger = self.ledger.lock().await;
            let latest = ledger.latest();
            if block.index <= latest.index {
                debug!(index = block.index, tip = latest.index, "stale block");
                return ReceiveOutcome::NotBehind;
            }
            if block.previous_hash == latest.hash && ledger.append(block.clone()).is_ok() {
                info!(index = block.index, "accepted block from peer");
                return ReceiveOutcome::Appended(block);
            }
        }
        if self.resolve_conflicts().await {
            ReceiveOutcome::ChainUpdated
        } else {
            ReceiveOutcome::NotBehind
        }
    }

    /// Adopts the longest valid peer chain that beats ours. Returns whether
    /// the local chain was replaced.
    pub async fn resolve_conflicts(&self) -> bool {
        let peers = self.peers().await;
        let chains = fetch_chains(&self.client, &peers).await;
        self.ledger.lock().await.resolve_with(chains)
    }

    /// Merges `incoming` and forwards it to every previously known peer that
    /// is not itself in `incoming`. One hop only. Returns the merged registry.
    pub async fn add_peers(&self, incoming: &[String]) -> Vec<String> {
        let announced: HashSet<String> = incoming
            .iter()
            .filter_map(|a| crate::peers::normalize_address(a))
            .collect();
        let (targets, merged) = {
            let mut registry = self.peers.write().await;
            registry.merge(incoming);
            let merged = registry.list_peers();
            let targets: Vec<String> = merged
                .iter()
                .filter(|p| !announced.contains(*p))
                .cloned()
                .collect();
            (targets, merged)
        };
        info!(added = incoming.len(), known = merged.len(), "peers added");
        for peer in targets {
            if let Err(err) = self.client.push_peers(&peer, incoming).await {
                warn!(peer = %peer, error = %err, "peer list push failed");
            }
        }
        merged
    }

    /// Merges `incoming` without forwarding it.
    pub async fn update_peers(&self, incoming: &[String]) -> Vec<String> {
        let mut registry = self.peers.write().await;
        registry.merge(incoming);
        debug!(known = registry.len(), "peers updated");
        registry.list_peers()
    }
}
