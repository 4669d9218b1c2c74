pub mod block;
pub mod model;
pub mod pow;
pub mod validation;

pub use block::Block;
pub use model::Ledger;
pub use pow::{CancelFlag, find_proof, valid_proof};
pub use validation::is_valid_chain;

/// Required prefix of a valid proof digest. Fixed; never adjusted.
pub const LEADING_ZEROS: &str = "0000";

/// Separator between the fields of a proof preimage.
pub const PROOF_DELIMITER: char = ':';

/// Proof carried by the genesis block.
pub const GENESIS_PROOF: u64 = 100;

/// Previous-hash sentinel carried by the genesis block.
pub const GENESIS_PREVIOUS_HASH: &str = "1";

/// Sender recorded on mining reward transactions.
pub const MINING_SENDER: &str = "0";

/// Amount credited to the node that mines a block.
pub const MINING_REWARD: u64 = 1;
