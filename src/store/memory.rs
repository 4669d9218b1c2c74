use super::Store;
use crate::blockchain::Block;
use crate::error::Result;
use crate::network::PeerNode;

/// Volatile store; everything is lost when the process exits.
#[derive(Debug, Default)]
pub struct MemoryStore {
    blocks: Vec<Block>,
    peers: Vec<PeerNode>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Store for MemoryStore {
    fn insert_block(&mut self, block: &Block) -> Result<()> {
        self.blocks.push(block.clone());
        Ok(())
    }

    fn load_chain(&self) -> Result<Vec<Block>> {
        let mut chain = self.blocks.clone();
        chain.sort_by_key(|b| b.height);
        Ok(chain)
    }

    fn last_block(&self) -> Result<Option<Block>> {
        Ok(self.blocks.iter().max_by_key(|b| b.height).cloned())
    }

    fn replace_chain(&mut self, chain: &[Block]) -> Result<()> {
        self.blocks = chain.to_vec();
        Ok(())
    }

    fn insert_peer(&mut self, peer: &PeerNode) -> Result<bool> {
        if self.peers.contains(peer) {
            return Ok(false);
        }
        self.peers.push(peer.clone());
        Ok(true)
    }

    fn load_peers(&self) -> Result<Vec<PeerNode>> {
        Ok(self.peers.clone())
    }
}
