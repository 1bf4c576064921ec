use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::time::{SystemTime, UNIX_EPOCH};

pub mod chain;
pub mod consensus;
pub mod constants;
pub mod error;
pub mod mine;
pub mod peers;
pub mod propagation;

pub use chain::Ledger;
pub use consensus::PeerClient;
pub use error::{LedgerError, PeerError};
pub use peers::PeerRegistry;
pub use propagation::{Node, ReceiveOutcome};

use constants::*;

/// Hex-encoded SHA-256 digest.
pub type HexHash = String;

/// Content hash linking a block to its predecessor:
/// `sha256(decimal(int(previous_hash, 16) * nonce))`, lowercase hex.
///
/// Only the previous hash and the nonce take part. Index, timestamp, data and
/// difficulty are not covered, so tampering with them is invisible to
/// validation.
pub fn hash_link(previous_hash: &str, nonce: u64) -> Result<HexHash, LedgerError> {
    let previous = BigUint::parse_bytes(previous_hash.as_bytes(), 16)
        .ok_or_else(|| LedgerError::InvalidHex(previous_hash.to_string()))?;
    Ok(digest_decimal(&(previous * nonce)))
}

fn digest_decimal(value: &BigUint) -> HexHash {
    hex::encode(Sha256::digest(value.to_string().as_bytes()))
}

/// Seconds since the epoch, with sub-second precision.
pub fn now_secs() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or_default()
}

/// A ledger entry. The wire form carries all seven fields, with the hash
/// under `our_hash`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub index: u64,
    pub previous_hash: HexHash,
    pub timestamp: f64,
    pub data: String,
    pub difficulty: u32,
    pub nonce: u64,
    #[serde(rename = "our_hash")]
    pub hash: HexHash,
}

impl Block {
    /// Builds a block and computes its hash from `previous_hash` and `nonce`.
    pub fn new(
        index: u64,
        previous_hash: impl Into<HexHash>,
        timestamp: f64,
        data: impl Into<String>,
        difficulty: u32,
        nonce: u64,
    ) -> Result<Self, LedgerError> {
        let previous_hash = previous_hash.into();
        let hash = hash_link(&previous_hash, nonce)?;
        Ok(Self {
            index,
            previous_hash,
            timestamp,
            data: data.into(),
            difficulty,
            nonce,
            hash,
        })
    }

    /// The fixed first block every node starts from.
    pub fn genesis() -> Self {
        // int("0", 16) * nonce is always zero.
        let hash = digest_decimal(&(BigUint::from(0u8) * GENESIS_NONCE));
        Self {
            index: GENESIS_INDEX,
            previous_hash: GENESIS_PREVIOUS_HASH.to_string(),
            timestamp: GENESIS_TIMESTAMP,
            data: GENESIS_DATA.to_string(),
            difficulty: GENESIS_DIFFICULTY,
            nonce: GENESIS_NONCE,
            hash,
        }
    }

    pub fn calculate_hash(&self) -> Result<HexHash, LedgerError> {
        hash_link(&self.previous_hash, self.nonce)
    }

    /// True when the stored hash matches a fresh recomputation.
    pub fn has_valid_hash(&self) -> bool {
        self.calculate_hash()
            .map(|h| h == self.hash)
            .unwrap_or(false)
    }

    /// Record equality used for the genesis check. Difficulty and nonce are
    /// deliberately left out; the stored hash is compared as-is.
    pub fn same_record(&self, other: &Block) -> bool {
        self.index == other.index
            && self.previous_hash == other.previous_hash
            && self.timestamp == other.timestamp
            && self.data == other.data
            && self.hash == other.hash
    }
}
