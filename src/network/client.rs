use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use super::PeerNode;
use crate::blockchain::Block;

/// Path of the chain endpoint on every node.
pub const CHAIN_PATH: &str = "/api/v1/chain/";

#[derive(Debug, Error)]
pub enum PeerError {
    #[error("peer unreachable: {0}")]
    Unreachable(#[from] reqwest::Error),

    #[error("peer answered with status {0}")]
    BadStatus(u16),

    #[error("peer reported length {reported} but sent {actual} blocks")]
    InconsistentLength { reported: usize, actual: usize },
}

/// A peer's chain as it reported it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainSnapshot {
    pub chain: Vec<Block>,
    pub length: usize,
}

/// Fetches the full chain held by a peer.
#[async_trait]
pub trait ChainFetcher: Send + Sync {
    async fn fetch_chain(&self, peer: &PeerNode) -> Result<ChainSnapshot, PeerError>;
}

/// HTTP fetcher hitting `<peer base url>/api/v1/chain/`.
pub struct HttpChainFetcher {
    client: Client,
}

impl HttpChainFetcher {
    pub fn new(timeout: Duration) -> Result<Self, PeerError> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl ChainFetcher for HttpChainFetcher {
    async fn fetch_chain(&self, peer: &PeerNode) -> Result<ChainSnapshot, PeerError> {
        let url = format!("{}{}", peer.base_url(), CHAIN_PATH);
        debug!("fetching chain from {url}");

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(PeerError::BadStatus(status.as_u16()));
        }

        let snapshot: ChainSnapshot = response.json().await?;
        if snapshot.length != snapshot.chain.len() {
            return Err(PeerError::InconsistentLength {
                reported: snapshot.length,
                actual: snapshot.chain.len(),
            });
        }
        Ok(snapshot)
    }
}
