use log::debug;

use super::{Block, valid_proof};

/// Validate a candidate chain pair by pair. Index 0 is taken as genesis and
/// only its height is checked. Every later block must sit exactly one above
/// its predecessor, link to its hash and carry a proof admissible after it.
/// The first failing pair rejects the whole chain.
pub fn is_valid_chain(chain: &[Block]) -> bool {
    if let Some(genesis) = chain.first() {
        if genesis.height != 0 {
            debug!("chain starts at height {} instead of 0", genesis.height);
            return false;
        }
    }

    for pair in chain.windows(2) {
        let (previous, current) = (&pair[0], &pair[1]);
        if current.height != previous.height + 1 {
            debug!(
                "block #{} does not follow block #{}",
                current.height, previous.height
            );
            return false;
        }

        let previous_hash = previous.hash();

        if current.previous_hash != previous_hash {
            debug!(
                "block #{} does not link to block #{}",
                current.height, previous.height
            );
            return false;
        }

        if !valid_proof(previous.proof, current.proof, &previous_hash) {
            debug!("block #{} carries an invalid proof", current.height);
            return false;
        }
    }
    true
}
