pub mod client;
pub mod consensus;
pub mod peer;

pub use client::{ChainFetcher, ChainSnapshot, HttpChainFetcher, PeerError};
pub use consensus::resolve_conflicts;
pub use peer::PeerNode;
