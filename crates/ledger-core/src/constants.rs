pub const GENESIS_INDEX: u64 = 0;
pub const GENESIS_PREVIOUS_HASH: &str = "0";
pub const GENESIS_TIMESTAMP: f64 = 1_714_946_885.0;
pub const GENESIS_DATA: &str = "First block";
pub const GENESIS_DIFFICULTY: u32 = 0;
pub const GENESIS_NONCE: u64 = 3;

pub const DEFAULT_DIFFICULTY: u32 = 7;
/// Leading hex characters beyond this no longer fit the `u64` the miner tests for primality.
pub const MAX_DIFFICULTY: u32 = 16;
