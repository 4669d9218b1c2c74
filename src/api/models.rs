use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use uuid::Uuid;

use crate::blockchain::{Block, CancelFlag, Ledger};
use crate::network::{ChainFetcher, PeerNode};
use crate::transaction::Transaction;

/// Shared application state: the ledger behind one lock, the peer transport
/// and the node's identity.
pub struct AppState {
    pub ledger: Mutex<Ledger>,
    pub fetcher: Arc<dyn ChainFetcher>,
    /// Recipient of this node's mining rewards.
    pub node_id: String,
    /// Cancelled on shutdown; parent of every proof search.
    pub shutdown: CancelFlag,
    pub mining_timeout: Option<Duration>,
}

impl AppState {
    pub fn new(
        ledger: Ledger,
        fetcher: Arc<dyn ChainFetcher>,
        mining_timeout: Option<Duration>,
    ) -> Self {
        Self {
            ledger: Mutex::new(ledger),
            fetcher,
            node_id: Uuid::new_v4().simple().to_string(),
            shutdown: CancelFlag::new(),
            mining_timeout,
        }
    }

    pub fn ledger(&self) -> MutexGuard<'_, Ledger> {
        Ledger::lock(&self.ledger)
    }
}

/* ---------- Chain API Models ---------- */

/// External form of a block: its fields plus the derived hash.
#[derive(Debug, Serialize)]
pub struct BlockView {
    pub height: u64,
    pub proof: u64,
    pub previous_hash: String,
    pub timestamp: i64,
    pub transactions: Vec<Transaction>,
    pub hash: String,
}

impl From<&Block> for BlockView {
    fn from(block: &Block) -> Self {
        Self {
            height: block.height,
            proof: block.proof,
            previous_hash: block.previous_hash.clone(),
            timestamp: block.timestamp,
            transactions: block.transactions.clone(),
            hash: block.hash(),
        }
    }
}

pub fn block_views(chain: &[Block]) -> Vec<BlockView> {
    chain.iter().map(BlockView::from).collect()
}

#[derive(Serialize)]
pub struct ChainResponse {
    pub chain: Vec<BlockView>,
    pub length: usize,
}

#[derive(Serialize)]
pub struct ValidateResponse {
    pub valid: bool,
    pub length: usize,
}

#[derive(Serialize)]
pub struct MineResponse {
    pub message: &'static str,
    pub index: u64,
    pub transactions: Vec<Transaction>,
    pub proof: u64,
    pub previous_hash: String,
    pub hash: String,
}

/* ---------- TX API Models ---------- */

#[derive(Deserialize)]
pub struct NewTxRequest {
    pub sender: String,
    pub recipient: String,
    pub amount: u64,
}

#[derive(Serialize)]
pub struct NewTxResponse {
    pub message: String,
    pub index: u64,
}

#[derive(Serialize)]
pub struct PendingResponse {
    pub size: usize,
    pub transactions: Vec<Transaction>,
}

/* ---------- Node API Models ---------- */

#[derive(Deserialize)]
pub struct RegisterNodesRequest {
    pub nodes: Vec<String>,
}

#[derive(Serialize)]
pub struct NodesResponse {
    pub message: &'static str,
    pub total_nodes: Vec<PeerNode>,
}

#[derive(Serialize)]
pub struct ResolveResponse {
    pub message: &'static str,
    pub replaced: bool,
    pub chain: Vec<BlockView>,
}

#[derive(Serialize)]
pub struct StatsResponse {
    pub height: u64,
    pub length: usize,
    pub pending_size: usize,
    pub peers: usize,
    pub leading_zeros: &'static str,
    pub node_id: String,
}
