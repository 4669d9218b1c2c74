use actix_web::{HttpResponse, rt, route, web};
use log::{debug, info};

use super::models::{AppState, MineResponse};
use crate::blockchain::{Block, MINING_REWARD, MINING_SENDER, find_proof};
use crate::error::{LedgerError, Result};

/// Mine one block on top of the current tip:
/// - search for a proof on the blocking pool (cancellable)
/// - if the tip moved during the search, start over against the new tip
/// - under the ledger lock, queue the reward and seal the pending pool
pub async fn mine_next_block(state: &AppState) -> Result<Block> {
    loop {
        let last_block = state.ledger().tip()?.clone();
        let last_hash = last_block.hash();

        let cancel = state.shutdown.child();
        let timer = state.mining_timeout.map(|timeout| {
            let cancel = cancel.clone();
            rt::spawn(async move {
                rt::time::sleep(timeout).await;
                cancel.cancel();
            })
        });

        let search = web::block(move || find_proof(&last_block, &cancel)).await;
        if let Some(timer) = timer {
            timer.abort();
        }
        let proof = search
            .map_err(|e| LedgerError::Worker(e.to_string()))?
            .ok_or(LedgerError::MiningCancelled)?;

        let mut ledger = state.ledger();
        let tip_hash = ledger.tip()?.hash();
        if tip_hash != last_hash {
            debug!("MINER - tip moved during proof search, restarting");
            continue;
        }

        ledger.submit_transaction(MINING_SENDER, state.node_id.as_str(), MINING_REWARD)?;
        let block = ledger.append_block(proof, Some(&last_hash))?;
        info!(
            "MINER - sealed block #{} (proof={}, txs={})",
            block.height,
            block.proof,
            block.transactions.len()
        );
        return Ok(block);
    }
}

/// Mine a new block from the pending pool, rewarding this node.
#[route("/mine/", method = "GET", method = "POST")]
pub async fn mine_block(state: web::Data<AppState>) -> Result<HttpResponse> {
    let block = mine_next_block(&state).await?;
    let hash = block.hash();
    Ok(HttpResponse::Ok().json(MineResponse {
        message: "New block forged",
        index: block.height,
        transactions: block.transactions,
        proof: block.proof,
        previous_hash: block.previous_hash,
        hash,
    }))
}
