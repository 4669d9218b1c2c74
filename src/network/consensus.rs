use log::{debug, info, warn};
use std::sync::Mutex;

use super::ChainFetcher;
use crate::blockchain::{Block, Ledger, is_valid_chain};
use crate::error::Result;

/// Replace the local chain with the longest valid chain held by any known
/// peer. Peers that cannot be reached, answer badly or hold an invalid chain
/// are skipped. A chain only wins when it is strictly longer. Returns whether
/// the local chain was replaced.
///
/// No lock is held while peers are queried. If local mining grew the chain
/// past the winner in the meantime, the local chain is kept.
pub async fn resolve_conflicts(ledger: &Mutex<Ledger>, fetcher: &dyn ChainFetcher) -> Result<bool> {
    let (peers, local_length) = {
        let ledger = Ledger::lock(ledger);
        (ledger.peers().to_vec(), ledger.len())
    };

    let mut max_length = local_length;
    let mut new_chain: Option<Vec<Block>> = None;

    for peer in &peers {
        let snapshot = match fetcher.fetch_chain(peer).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!("skipping peer {peer}: {e}");
                continue;
            }
        };

        if snapshot.length <= max_length {
            debug!(
                "peer {peer} holds {} blocks, best so far {max_length}",
                snapshot.length
            );
            continue;
        }
        if !is_valid_chain(&snapshot.chain) {
            warn!("skipping peer {peer}: chain failed validation");
            continue;
        }
        max_length = snapshot.length;
        new_chain = Some(snapshot.chain);
    }

    let Some(new_chain) = new_chain else {
        debug!("local chain of {local_length} blocks is authoritative");
        return Ok(false);
    };

    let mut ledger = Ledger::lock(ledger);
    if new_chain.len() <= ledger.len() {
        info!(
            "local chain grew to {} blocks during resolution, keeping it",
            ledger.len()
        );
        return Ok(false);
    }
    ledger.replace_chain(&new_chain)?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::{CancelFlag, find_proof};
    use crate::network::{ChainSnapshot, PeerError, PeerNode};
    use crate::store::MemoryStore;
    use async_trait::async_trait;
    use std::collections::HashMap;

    /// Serves canned snapshots keyed by peer address; unknown peers fail.
    #[derive(Default)]
    struct StubFetcher {
        snapshots: HashMap<String, ChainSnapshot>,
    }

    impl StubFetcher {
        fn serve(mut self, address: &str, chain: Vec<Block>) -> Self {
            let length = chain.len();
            self.snapshots
                .insert(address.to_string(), ChainSnapshot { chain, length });
            self
        }
    }

    #[async_trait]
    impl ChainFetcher for StubFetcher {
        async fn fetch_chain(&self, peer: &PeerNode) -> std::result::Result<ChainSnapshot, PeerError> {
            self.snapshots
                .get(&peer.address)
                .cloned()
                .ok_or(PeerError::BadStatus(503))
        }
    }

    fn ledger_with_blocks(len: usize) -> Ledger {
        let mut ledger = Ledger::open(Box::new(MemoryStore::new())).unwrap();
        while ledger.len() < len {
            let last = ledger.tip().unwrap().clone();
            let proof = find_proof(&last, &CancelFlag::new()).unwrap();
            ledger.submit_transaction("0", "peer", 1).unwrap();
            ledger.append_block(proof, Some(&last.hash())).unwrap();
        }
        ledger
    }

    fn local_with_peers(len: usize, peers: &[&str]) -> Mutex<Ledger> {
        let mut ledger = ledger_with_blocks(len);
        for peer in peers {
            ledger.register_peer(&format!("http://{peer}")).unwrap();
        }
        Mutex::new(ledger)
    }

    #[actix_web::test]
    async fn longer_valid_chain_replaces_local() {
        let remote = ledger_with_blocks(5).chain().to_vec();
        let fetcher = StubFetcher::default().serve("10.0.0.1:5000", remote.clone());
        let local = local_with_peers(2, &["10.0.0.1:5000"]);

        assert!(resolve_conflicts(&local, &fetcher).await.unwrap());
        let ledger = Ledger::lock(&local);
        assert_eq!(ledger.len(), 5);
        assert_eq!(ledger.chain(), remote.as_slice());
    }

    #[actix_web::test]
    async fn equal_length_chain_does_not_replace() {
        let remote = ledger_with_blocks(2).chain().to_vec();
        let fetcher = StubFetcher::default().serve("10.0.0.1:5000", remote);
        let local = local_with_peers(2, &["10.0.0.1:5000"]);
        let before = Ledger::lock(&local).chain().to_vec();

        assert!(!resolve_conflicts(&local, &fetcher).await.unwrap());
        assert_eq!(Ledger::lock(&local).chain(), before.as_slice());
    }

    #[actix_web::test]
    async fn invalid_longer_chain_is_skipped() {
        let mut remote = ledger_with_blocks(4).chain().to_vec();
        remote[2].previous_hash = "tampered".into();
        let fetcher = StubFetcher::default().serve("10.0.0.1:5000", remote);
        let local = local_with_peers(2, &["10.0.0.1:5000"]);

        assert!(!resolve_conflicts(&local, &fetcher).await.unwrap());
        assert_eq!(Ledger::lock(&local).len(), 2);
    }

    #[actix_web::test]
    async fn chain_with_height_gaps_is_skipped() {
        let mut remote = ledger_with_blocks(3).chain().to_vec();
        remote[1].height = 5;
        remote[2].height = 9;
        // Keep it hash-linked and PoW-valid under the bogus heights.
        for i in 1..remote.len() {
            let last = remote[i - 1].clone();
            remote[i].previous_hash = last.hash();
            remote[i].proof = find_proof(&last, &CancelFlag::new()).unwrap();
        }
        let fetcher = StubFetcher::default().serve("10.0.0.1:5000", remote);
        let local = local_with_peers(2, &["10.0.0.1:5000"]);

        assert!(!resolve_conflicts(&local, &fetcher).await.unwrap());
        let ledger = Ledger::lock(&local);
        assert_eq!(ledger.len(), 2);
        assert!(crate::blockchain::is_valid_chain(ledger.chain()));
    }

    #[actix_web::test]
    async fn unreachable_peers_are_skipped() {
        let remote = ledger_with_blocks(3).chain().to_vec();
        let fetcher = StubFetcher::default().serve("10.0.0.2:5000", remote);
        let local = local_with_peers(1, &["10.0.0.1:5000", "10.0.0.2:5000"]);

        assert!(resolve_conflicts(&local, &fetcher).await.unwrap());
        assert_eq!(Ledger::lock(&local).len(), 3);
    }

    #[actix_web::test]
    async fn longest_of_several_peers_wins() {
        let shorter = ledger_with_blocks(3).chain().to_vec();
        let longest = ledger_with_blocks(4).chain().to_vec();
        let fetcher = StubFetcher::default()
            .serve("10.0.0.1:5000", shorter)
            .serve("10.0.0.2:5000", longest.clone());
        let local = local_with_peers(1, &["10.0.0.1:5000", "10.0.0.2:5000"]);

        assert!(resolve_conflicts(&local, &fetcher).await.unwrap());
        assert_eq!(Ledger::lock(&local).chain(), longest.as_slice());
    }

    #[actix_web::test]
    async fn no_peers_means_no_change() {
        let local = local_with_peers(2, &[]);
        assert!(!resolve_conflicts(&local, &StubFetcher::default()).await.unwrap());
    }
}
