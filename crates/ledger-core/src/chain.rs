use crate::constants::MAX_DIFFICULTY;
use crate::{Block, LedgerError};
use rayon::prelude::*;
use tracing::{debug, info};

/// In-memory chain plus the difficulty new blocks are mined at.
///
/// The chain is never empty: it starts as `[genesis]`, grows one block at a
/// time through [`Ledger::append`], and is otherwise only swapped wholesale by
/// [`Ledger::resolve_with`].
#[derive(Clone, Debug)]
pub struct Ledger {
    chain: Vec<Block>,
    difficulty: u32,
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new(crate::constants::DEFAULT_DIFFICULTY)
    }
}

impl Ledger {
    /// Difficulties above [`MAX_DIFFICULTY`] are clamped.
    pub fn new(difficulty: u32) -> Self {
        Self {
            chain: vec![Block::genesis()],
            difficulty: difficulty.min(MAX_DIFFICULTY),
        }
    }

    pub fn blocks(&self) -> &[Block] {
        &self.chain
    }

    pub fn len(&self) -> usize {
        self.chain.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }

    pub fn difficulty(&self) -> u32 {
        self.difficulty
    }

    pub fn latest(&self) -> &Block {
        // The constructor seeds genesis and nothing ever empties the chain.
        &self.chain[self.chain.len() - 1]
    }

    /// `candidate` directly follows `predecessor` and carries its own correct hash.
    pub fn is_valid_block(candidate: &Block, predecessor: &Block) -> bool {
        predecessor.index.checked_add(1) == Some(candidate.index)
            && candidate.previous_hash == predecessor.hash
            && candidate.has_valid_hash()
    }

    /// Starts with genesis (see [`Block::same_record`]) and links pairwise.
    /// An empty sequence is trivially valid.
    pub fn is_valid_chain(chain: &[Block]) -> bool {
        let Some(first) = chain.first() else {
            return true;
        };
        if !first.same_record(&Block::genesis()) {
            return false;
        }
        chain
            .par_windows(2)
            .all(|pair| Self::is_valid_block(&pair[1], &pair[0]))
    }

    /// Appends `candidate` if it extends the current tip. Nothing changes on failure.
    pub fn append(&mut self, candidate: Block) -> Result<(), LedgerError> {
        if !Self::is_valid_block(&candidate, self.latest()) {
            debug!(index = candidate.index, "block rejected");
            return Err(LedgerError::Rejected {
                index: candidate.index,
            });
        }
        debug!(index = candidate.index, hash = %candidate.hash, "block appended");
        self.chain.push(candidate);
        Ok(())
    }

    /// Longest-chain rule. Adopts the longest candidate that is strictly longer
    /// than the local chain and validates; ties keep the first one seen.
    /// Returns whether the chain was replaced.
    pub fn resolve_with<I>(&mut self, candidates: I) -> bool
    where
        I: IntoIterator<Item = Vec<Block>>,
    {
        let mut best: Option<Vec<Block>> = None;
        let mut max_length = self.chain.len();
        for candidate in candidates {
            if candidate.len() > max_length && Self::is_valid_chain(&candidate) {
                max_length = candidate.len();
                best = Some(candidate);
            }
        }
        match best {
            Some(chain) => {
                info!(old = self.chain.len(), new = chain.len(), "chain replaced");
                self.chain = chain;
                true
            }
            None => false,
        }
    }
}
