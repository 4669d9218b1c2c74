use actix_web::{HttpResponse, get, web};

use super::models::{AppState, StatsResponse};
use crate::blockchain::LEADING_ZEROS;

#[get("/stats/")]
pub async fn get_stats(state: web::Data<AppState>) -> HttpResponse {
    let ledger = state.ledger();
    HttpResponse::Ok().json(StatsResponse {
        height: ledger.last_block().map_or(0, |b| b.height),
        length: ledger.len(),
        pending_size: ledger.pending().len(),
        peers: ledger.peers().len(),
        leading_zeros: LEADING_ZEROS,
        node_id: state.node_id.clone(),
    })
}
