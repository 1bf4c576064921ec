use crate::{Block, PeerError};
use async_trait::async_trait;
use tracing::{debug, warn};

/// Outbound RPCs to other nodes. Implementations live with the transport;
/// `ledger-core` only needs these three calls.
#[async_trait]
pub trait PeerClient: Send + Sync {
    /// Full chain served by `peer`, with the hashes exactly as the peer asserts them.
    async fn fetch_chain(&self, peer: &str) -> Result<Vec<Block>, PeerError>;

    /// Offers `block` to `peer` as its possible next block.
    async fn push_block(&self, peer: &str, block: &Block) -> Result<(), PeerError>;

    /// Forwards a peer list for `peer` to merge into its registry.
    async fn push_peers(&self, peer: &str, peers: &[String]) -> Result<(), PeerError>;
}

/// Fetches every peer's chain in turn. Peers that fail are skipped.
pub async fn fetch_chains<C>(client: &C, peers: &[String]) -> Vec<Vec<Block>>
where
    C: PeerClient + ?Sized,
{
    let mut chains = Vec::with_capacity(peers.len());
    for peer in peers {
        match client.fetch_chain(peer).await {
            Ok(chain) => {
                debug!(peer = %peer, length = chain.len(), "fetched chain");
                chains.push(chain);
            }
            Err(err) => warn!(peer = %peer, error = %err, "skipping peer"),
        }
    }
    chains
}
