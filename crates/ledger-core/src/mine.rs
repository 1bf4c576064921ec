use crate::{hash_link, now_secs, Block, Ledger, LedgerError};
use tracing::info;

/// Trial division by every integer in `2..=n/2`. The range is empty for
/// `n <= 3`, so 0 and 1 count as prime here too.
pub fn is_prime(n: u64) -> bool {
    (2..=n / 2).all(|d| n % d != 0)
}

/// Integer value of the first `difficulty` hex characters of `hash`. An empty
/// prefix reads as zero.
fn leading_value(hash: &str, difficulty: u32) -> Result<u64, LedgerError> {
    let prefix = hash.get(..difficulty as usize).unwrap_or(hash);
    if prefix.is_empty() {
        return Ok(0);
    }
    u64::from_str_radix(prefix, 16).map_err(|_| LedgerError::InvalidHex(hash.to_string()))
}

/// The unmined block that would extend `ledger`: next index, tip hash,
/// current time and difficulty, nonce 0.
pub fn candidate(ledger: &Ledger, data: impl Into<String>) -> Result<Block, LedgerError> {
    Block::new(
        ledger.len() as u64,
        ledger.latest().hash.clone(),
        now_secs(),
        data,
        ledger.difficulty(),
        0,
    )
}

/// Nonce search. Runs until a nonce is accepted, with no upper bound.
pub fn search(block: &mut Block) -> Result<(), LedgerError> {
    search_until(block, || false)
}

/// Same search as [`search`], polling `stop` before every pass.
///
/// A pass is accepted when the nonce is prime, the leading-hex value of the
/// hash stored *before* the pass is prime, and the fresh hash does not start
/// with `'0'`. When both primality tests pass but the hash starts with `'0'`
/// the nonce is not advanced, so the pass repeats forever.
pub fn search_until<F>(block: &mut Block, mut stop: F) -> Result<(), LedgerError>
where
    F: FnMut() -> bool,
{
    let mut nonce: u64 = 1;
    loop {
        if stop() {
            return Err(LedgerError::Cancelled);
        }
        if !is_prime(nonce) {
            nonce += 1;
            continue;
        }
        let num = leading_value(&block.hash, block.difficulty)?;
        block.nonce = nonce;
        block.hash = hash_link(&block.previous_hash, nonce)?;
        if !is_prime(num) {
            nonce += 1;
            continue;
        }
        if !block.hash.starts_with('0') {
            return Ok(());
        }
    }
}

/// Builds, mines and appends a block in one go.
pub fn mine_block(ledger: &mut Ledger, data: impl Into<String>) -> Result<Block, LedgerError> {
    let mut block = candidate(ledger, data)?;
    search(&mut block)?;
    ledger.append(block.clone())?;
    info!(
        "Mined block {} with nonce {} and hash {}",
        block.index, block.nonce, block.hash
    );
    Ok(block)
}
