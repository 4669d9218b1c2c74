use log::{debug, info, warn};
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::{Block, GENESIS_PREVIOUS_HASH, GENESIS_PROOF};
use crate::error::{LedgerError, Result};
use crate::network::PeerNode;
use crate::store::Store;
use crate::transaction::{PendingPool, Transaction};

/// The authoritative chain, the pending-transaction pool and the set of
/// known peers. Blocks live in a `Vec` indexed by height; every mutation is
/// written through to the backing store.
pub struct Ledger {
    chain: Vec<Block>,
    pending: PendingPool,
    peers: Vec<PeerNode>,
    store: Box<dyn Store>,
}

impl Ledger {
    /// Load chain and peers from `store`, sealing the genesis block when the
    /// store holds no blocks yet.
    pub fn open(store: Box<dyn Store>) -> Result<Self> {
        let chain = match store.last_block()? {
            Some(tip) => {
                let chain = store.load_chain()?;
                info!("loaded {} blocks from store, tip #{}", chain.len(), tip.height);
                chain
            }
            None => Vec::new(),
        };
        let peers = store.load_peers()?;
        let mut ledger = Self {
            chain,
            pending: PendingPool::new(),
            peers,
            store,
        };
        if ledger.last_block().is_none() {
            ledger.append_block(GENESIS_PROOF, Some(GENESIS_PREVIOUS_HASH))?;
            debug!("new ledger instantiated with genesis block");
        }
        Ok(ledger)
    }

    /// Lock a shared ledger. Mutations end in a single push or swap, so a
    /// poisoned lock still guards a consistent ledger.
    pub fn lock(shared: &Mutex<Ledger>) -> MutexGuard<'_, Ledger> {
        shared.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn last_block(&self) -> Option<&Block> {
        self.chain.last()
    }

    /// Like `last_block`, for callers that need a tip to exist.
    pub fn tip(&self) -> Result<&Block> {
        self.last_block().ok_or(LedgerError::EmptyChain)
    }

    pub fn chain(&self) -> &[Block] {
        &self.chain
    }

    pub fn len(&self) -> usize {
        self.chain.len()
    }

    pub fn pending(&self) -> &PendingPool {
        &self.pending
    }

    pub fn peers(&self) -> &[PeerNode] {
        &self.peers
    }

    /// Seal every pending transaction into a new block on top of the tip.
    /// Without a `previous_hash` the block links to the hash of the tip.
    pub fn append_block(&mut self, proof: u64, previous_hash: Option<&str>) -> Result<Block> {
        let height = self.last_block().map_or(0, |b| b.height + 1);
        let previous_hash = match previous_hash.filter(|h| !h.is_empty()) {
            Some(h) => h.to_string(),
            None => self.tip()?.hash(),
        };

        let transactions = self.pending.take();
        let block = Block::new(height, proof, previous_hash, transactions);
        if let Err(e) = self.store.insert_block(&block) {
            self.pending.restore(block.transactions);
            return Err(e);
        }
        debug!(
            "appended block #{} with proof {} and {} transactions",
            block.height,
            block.proof,
            block.transactions.len()
        );
        self.chain.push(block.clone());
        Ok(block)
    }

    /// Queue a transaction and return the height of the block that will
    /// carry it.
    pub fn submit_transaction(
        &mut self,
        sender: impl Into<String>,
        recipient: impl Into<String>,
        amount: u64,
    ) -> Result<u64> {
        let next_height = self.tip()?.height + 1;
        self.pending
            .push(Transaction::new(sender, recipient, amount));
        Ok(next_height)
    }

    /// Remember a peer given as a URL. Addresses without a network location
    /// are skipped with a warning, as are peers already known.
    pub fn register_peer(&mut self, address: &str) -> Result<()> {
        let Some(peer) = PeerNode::parse(address) else {
            return Ok(());
        };
        if self.peers.contains(&peer) {
            return Ok(());
        }
        if self.store.insert_peer(&peer)? {
            info!("registered peer {peer}");
        }
        self.peers.push(peer);
        Ok(())
    }

    /// Discard the whole chain and rebuild it from `candidate`. Each block is
    /// replayed with its own proof, previous hash, timestamp and
    /// transactions; heights are renumbered from 0. The local pending pool is
    /// left alone. Nothing changes unless the store accepts the new chain.
    pub fn replace_chain(&mut self, candidate: &[Block]) -> Result<()> {
        let mut rebuilt: Vec<Block> = Vec::with_capacity(candidate.len());
        for block in candidate {
            let mut pool = PendingPool::new();
            for tx in &block.transactions {
                pool.push(tx.clone());
            }
            let height = rebuilt.last().map_or(0, |b| b.height + 1);
            let previous_hash = if block.previous_hash.is_empty() {
                match rebuilt.last() {
                    Some(last) => last.hash(),
                    None => {
                        warn!("candidate genesis carries no previous hash");
                        GENESIS_PREVIOUS_HASH.to_string()
                    }
                }
            } else {
                block.previous_hash.clone()
            };
            rebuilt.push(Block::with_timestamp(
                height,
                block.proof,
                previous_hash,
                block.timestamp,
                pool.take(),
            ));
        }

        self.store.replace_chain(&rebuilt)?;
        info!(
            "replaced chain of {} blocks with {} blocks",
            self.chain.len(),
            rebuilt.len()
        );
        self.chain = rebuilt;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::{CancelFlag, find_proof, is_valid_chain, valid_proof};
    use crate::store::{MemoryStore, SqliteStore};

    fn ledger() -> Ledger {
        Ledger::open(Box::new(MemoryStore::new())).unwrap()
    }

    fn mine(ledger: &mut Ledger) -> Block {
        let last = ledger.tip().unwrap().clone();
        let proof = find_proof(&last, &CancelFlag::new()).unwrap();
        ledger.append_block(proof, Some(&last.hash())).unwrap()
    }

    #[test]
    fn opens_with_genesis() {
        let ledger = ledger();
        assert_eq!(ledger.len(), 1);
        let genesis = ledger.last_block().unwrap();
        assert_eq!(genesis.height, 0);
        assert_eq!(genesis.proof, GENESIS_PROOF);
        assert_eq!(genesis.previous_hash, GENESIS_PREVIOUS_HASH);
    }

    #[test]
    fn block_creation() {
        let mut ledger = ledger();
        ledger.append_block(123, Some("abc")).unwrap();

        let last = ledger.last_block().unwrap();
        assert_eq!(last.height as usize, ledger.chain().len() - 1);
        assert_eq!(last.proof, 123);
        assert_eq!(last.previous_hash, "abc");
        assert!(last.timestamp > 0);
        assert_eq!(ledger.last_block(), ledger.chain().last());
    }

    #[test]
    fn missing_previous_hash_links_to_tip() {
        let mut ledger = ledger();
        let tip_hash = ledger.tip().unwrap().hash();
        let block = ledger.append_block(7, None).unwrap();
        assert_eq!(block.previous_hash, tip_hash);

        let tip_hash = block.hash();
        let block = ledger.append_block(8, Some("")).unwrap();
        assert_eq!(block.previous_hash, tip_hash);
    }

    #[test]
    fn submit_returns_next_height() {
        let mut ledger = ledger();
        assert_eq!(ledger.submit_transaction("a", "b", 1).unwrap(), 1);
        assert_eq!(ledger.pending().len(), 1);
        let tx = ledger.pending().iter().next().unwrap();
        assert_eq!(tx, &Transaction::new("a", "b", 1));
    }

    #[test]
    fn sealing_moves_pending_transactions_in_order() {
        let mut ledger = ledger();
        for i in 0..3 {
            ledger.submit_transaction(format!("s{i}"), "r", i).unwrap();
        }
        let block = ledger.append_block(1, None).unwrap();

        let senders: Vec<_> = block.transactions.iter().map(|t| t.sender.as_str()).collect();
        assert_eq!(senders, vec!["s0", "s1", "s2"]);
        assert!(ledger.pending().is_empty());
    }

    #[test]
    fn mined_transaction_lands_in_last_block() {
        let mut ledger = ledger();
        ledger.submit_transaction("a", "b", 1).unwrap();
        mine(&mut ledger);

        let last = ledger.last_block().unwrap();
        assert_eq!(last.transactions, vec![Transaction::new("a", "b", 1)]);
        assert!(ledger.pending().is_empty());
    }

    #[test]
    fn mined_chain_links_and_validates() {
        let mut ledger = ledger();
        mine(&mut ledger);
        mine(&mut ledger);

        let chain = ledger.chain();
        for pair in chain.windows(2) {
            assert_eq!(pair[1].previous_hash, pair[0].hash());
            assert!(valid_proof(pair[0].proof, pair[1].proof, &pair[0].hash()));
        }
        assert!(is_valid_chain(chain));
    }

    #[test]
    fn register_peer_is_idempotent() {
        let mut ledger = ledger();
        ledger.register_peer("http://127.0.0.1:5000").unwrap();
        ledger.register_peer("http://127.0.0.1:5000").unwrap();
        assert_eq!(ledger.peers(), &[PeerNode::from_location("127.0.0.1:5000")]);
    }

    #[test]
    fn malformed_peer_is_ignored() {
        let mut ledger = ledger();
        ledger.register_peer("http//127.0.0.1:5000").unwrap();
        assert!(ledger.peers().is_empty());
    }

    #[test]
    fn replace_chain_replays_candidate() {
        let mut source = ledger();
        source.submit_transaction("a", "b", 3).unwrap();
        mine(&mut source);
        mine(&mut source);
        let candidate = source.chain().to_vec();

        let mut local = ledger();
        local.submit_transaction("local", "b", 1).unwrap();
        local.replace_chain(&candidate).unwrap();

        assert_eq!(local.chain(), candidate.as_slice());
        assert!(is_valid_chain(local.chain()));
        assert_eq!(local.pending().len(), 1);
    }

    #[test]
    fn opening_seeded_store_reuses_its_tip() {
        let mut store = MemoryStore::new();
        let genesis = Block::with_timestamp(0, GENESIS_PROOF, GENESIS_PREVIOUS_HASH.into(), 10, vec![]);
        let next = Block::with_timestamp(1, 7, genesis.hash(), 11, vec![]);
        store.insert_block(&genesis).unwrap();
        store.insert_block(&next).unwrap();

        let ledger = Ledger::open(Box::new(store)).unwrap();
        assert_eq!(ledger.len(), 2);
        assert_eq!(ledger.last_block(), Some(&next));
    }

    #[test]
    fn reopening_sqlite_store_keeps_chain() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chain.db");
        let path = path.to_str().unwrap();

        let sealed = {
            let mut ledger = Ledger::open(Box::new(SqliteStore::open(path).unwrap())).unwrap();
            ledger.submit_transaction("a", "b", 1).unwrap();
            mine(&mut ledger);
            ledger.register_peer("http://10.0.0.3:5000").unwrap();
            ledger.chain().to_vec()
        };

        let ledger = Ledger::open(Box::new(SqliteStore::open(path).unwrap())).unwrap();
        assert_eq!(ledger.chain(), sealed.as_slice());
        assert_eq!(ledger.peers().len(), 1);
    }
}
