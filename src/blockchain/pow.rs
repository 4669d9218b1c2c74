use log::{info, trace};
use sha2::{Digest, Sha512};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use super::{Block, LEADING_ZEROS, PROOF_DELIMITER};

/// How many candidate proofs are tried between cancellation checks.
const CANCEL_CHECK_INTERVAL: u64 = 1024;

/// Shared cancellation signal for a proof search. A child flag also reports
/// cancelled once any of its ancestors is cancelled.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag {
    flag: Arc<AtomicBool>,
    ancestors: Vec<Arc<AtomicBool>>,
}

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn child(&self) -> Self {
        let mut ancestors = self.ancestors.clone();
        ancestors.push(self.flag.clone());
        Self {
            flag: Arc::new(AtomicBool::new(false)),
            ancestors,
        }
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
            || self.ancestors.iter().any(|a| a.load(Ordering::Relaxed))
    }
}

/// Check whether `proof` is admissible after a block with `last_proof` and
/// hash `last_hash`.
pub fn valid_proof(last_proof: u64, proof: u64, last_hash: &str) -> bool {
    let guess = format!("{last_proof}{PROOF_DELIMITER}{proof}{PROOF_DELIMITER}{last_hash}");
    let digest = hex::encode(Sha512::digest(guess.as_bytes()));
    trace!("testing whether this is valid proof: {digest}");
    digest.starts_with(LEADING_ZEROS)
}

/// Search upward from 0 for a proof admissible after `last_block`.
/// Returns `None` only when `cancel` fires before one is found.
pub fn find_proof(last_block: &Block, cancel: &CancelFlag) -> Option<u64> {
    let last_proof = last_block.proof;
    let last_hash = last_block.hash();

    let mut proof: u64 = 0;
    while !valid_proof(last_proof, proof, &last_hash) {
        proof = proof.wrapping_add(1);
        if proof % CANCEL_CHECK_INTERVAL == 0 && cancel.is_cancelled() {
            info!(
                "proof search after block #{} cancelled at {proof}",
                last_block.height
            );
            return None;
        }
    }
    info!("Found proof {proof} after block #{}", last_block.height);
    Some(proof)
}
