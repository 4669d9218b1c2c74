use thiserror::Error;

pub type Result<T> = std::result::Result<T, LedgerError>;

#[derive(Debug, Error)]
pub enum LedgerError {
    /// The ledger has no genesis block. Never expected after `Ledger::open`.
    #[error("ledger has no blocks")]
    EmptyChain,

    #[error("persistence failure: {0}")]
    Persistence(#[from] rusqlite::Error),

    #[error("unsupported database engine: {0}")]
    UnsupportedEngine(String),

    #[error("proof-of-work search was cancelled")]
    MiningCancelled,

    #[error("worker failure: {0}")]
    Worker(String),
}
