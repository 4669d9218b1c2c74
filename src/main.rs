mod api;
mod blockchain;
mod config;
mod error;
mod network;
mod store;
mod transaction;

use actix_web::{App, HttpServer, rt, web};
use clap::Parser;
use dotenvy::dotenv;
use log::{info, warn};
use std::io;
use std::sync::Arc;
use std::time::Duration;

use api::AppState;
use blockchain::Ledger;
use config::Config;
use network::{HttpChainFetcher, resolve_conflicts};

#[actix_web::main]
async fn main() -> io::Result<()> {
    let _ = dotenv();
    let config = Config::parse();
    env_logger::Builder::new()
        .filter_level(config.log_level())
        .parse_default_env()
        .init();

    let store = store::open(&config.db_engine, &config.db_name).map_err(io::Error::other)?;
    let mut ledger = Ledger::open(store).map_err(io::Error::other)?;
    for peer in &config.peers {
        ledger.register_peer(peer).map_err(io::Error::other)?;
    }
    let fetcher = HttpChainFetcher::new(config.peer_timeout()).map_err(io::Error::other)?;

    let state = web::Data::new(AppState::new(
        ledger,
        Arc::new(fetcher),
        config.mining_timeout(),
    ));
    info!("node identifier {}", state.node_id);

    if let Some(every) = config.resolve_interval() {
        spawn_resolver(state.clone(), every);
    }

    let shutdown = state.shutdown.clone();
    rt::spawn({
        let shutdown = shutdown.clone();
        async move {
            if rt::signal::ctrl_c().await.is_ok() {
                shutdown.cancel();
            }
        }
    });

    println!(
        "⛓️ Starting ledger node at http://{}:{}",
        config.host, config.port
    );

    let result = HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .configure(api::init_routes)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await;

    shutdown.cancel();
    result
}

/// Periodically adopt the longest valid chain among known peers.
fn spawn_resolver(state: web::Data<AppState>, every: Duration) {
    rt::spawn(async move {
        let mut ticker = rt::time::interval(every);
        loop {
            ticker.tick().await;
            match resolve_conflicts(&state.ledger, state.fetcher.as_ref()).await {
                Ok(true) => info!("scheduled resolution replaced the local chain"),
                Ok(false) => {}
                Err(e) => warn!("scheduled resolution failed: {e}"),
            }
        }
    });
}
