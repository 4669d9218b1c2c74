use clap::Parser;
use log::LevelFilter;
use std::time::Duration;

/// Ledger node settings. Every option can also come from the environment
/// (or a `.env` file).
#[derive(Debug, Clone, Parser)]
#[command(name = "nocoin", version, about = "Minimal proof-of-work ledger node")]
pub struct Config {
    /// Address to bind the HTTP API to
    #[arg(long, env = "HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value_t = 5000)]
    pub port: u16,

    /// Be verbose (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Storage engine: sqlite or memory
    #[arg(long, env = "NOCOIN_DATABASE_ENGINE", default_value = "sqlite")]
    pub db_engine: String,

    /// Database name or path (":memory:" keeps SQLite in memory)
    #[arg(long, env = "NOCOIN_DATABASE_NAME", default_value = ":memory:")]
    pub db_name: String,

    /// Timeout for fetching a peer's chain, in seconds
    #[arg(long, env = "NOCOIN_PEER_TIMEOUT_SECS", default_value_t = 5)]
    pub peer_timeout_secs: u64,

    /// Give up on a proof search after this many seconds (0 = never)
    #[arg(long, env = "NOCOIN_MINING_TIMEOUT_SECS", default_value_t = 120)]
    pub mining_timeout_secs: u64,

    /// Run conflict resolution every N seconds (0 = only on request)
    #[arg(long, env = "NOCOIN_RESOLVE_INTERVAL_SECS", default_value_t = 0)]
    pub resolve_interval_secs: u64,

    /// Peer to register at startup, e.g. http://10.0.0.2:5000
    #[arg(long = "peer", env = "NOCOIN_PEERS", value_delimiter = ',')]
    pub peers: Vec<String>,
}

impl Config {
    /// Level used when `RUST_LOG` is not set.
    pub fn log_level(&self) -> LevelFilter {
        match self.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            _ => LevelFilter::Debug,
        }
    }

    pub fn peer_timeout(&self) -> Duration {
        Duration::from_secs(self.peer_timeout_secs)
    }

    pub fn mining_timeout(&self) -> Option<Duration> {
        (self.mining_timeout_secs > 0).then(|| Duration::from_secs(self.mining_timeout_secs))
    }

    pub fn resolve_interval(&self) -> Option<Duration> {
        (self.resolve_interval_secs > 0).then(|| Duration::from_secs(self.resolve_interval_secs))
    }
}
