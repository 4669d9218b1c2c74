pub mod memory;
pub mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use crate::blockchain::Block;
use crate::error::{LedgerError, Result};
use crate::network::PeerNode;

/// Durable home for blocks (with their transactions) and registered peers.
/// The ledger keeps its own ordered copy and writes through on every change.
pub trait Store: Send {
    /// Persist one block together with its transactions.
    fn insert_block(&mut self, block: &Block) -> Result<()>;

    /// All blocks ordered by height.
    fn load_chain(&self) -> Result<Vec<Block>>;

    fn last_block(&self) -> Result<Option<Block>>;

    /// Delete every block and store `chain` in its place, all or nothing.
    fn replace_chain(&mut self, chain: &[Block]) -> Result<()>;

    /// Insert unless already present. Returns whether a row was added.
    fn insert_peer(&mut self, peer: &PeerNode) -> Result<bool>;

    fn load_peers(&self) -> Result<Vec<PeerNode>>;
}

/// Open the store named by `engine` (`sqlite` or `memory`).
pub fn open(engine: &str, name: &str) -> Result<Box<dyn Store>> {
    match engine {
        e if e.contains("sqlite") => Ok(Box::new(SqliteStore::open(name)?)),
        "memory" => Ok(Box::new(MemoryStore::new())),
        other => Err(LedgerError::UnsupportedEngine(other.to_string())),
    }
}
