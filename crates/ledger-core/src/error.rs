use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("previous hash {0:?} is not a base-16 integer")]
    InvalidHex(String),
    #[error("block {index} does not extend the current tip")]
    Rejected { index: u64 },
    #[error("chain tip moved while block {index} was being mined")]
    StaleTip { index: u64 },
    #[error("mining search cancelled")]
    Cancelled,
    #[error("mining worker failed: {0}")]
    Worker(String),
}

/// A peer RPC failed. Callers log it and move on to the next peer.
#[derive(Debug, Error)]
pub enum PeerError {
    #[error("peer {peer} unreachable: {reason}")]
    Unreachable { peer: String, reason: String },
    #[error("peer {peer} answered with status {status}")]
    Status { peer: String, status: u16 },
    #[error("peer {peer} sent an unreadable body: {reason}")]
    Decode { peer: String, reason: String },
}
