use actix_web::{HttpResponse, get, post, web};
use log::debug;

use super::models::{AppState, NewTxRequest, NewTxResponse, PendingResponse};
use crate::error::Result;

/// Queue a transaction for the next block.
#[post("/transactions/new/")]
pub async fn post_transaction(
    state: web::Data<AppState>,
    body: web::Json<NewTxRequest>,
) -> Result<HttpResponse> {
    let NewTxRequest {
        sender,
        recipient,
        amount,
    } = body.into_inner();
    debug!("POST /transactions/new/ - {sender} -> {recipient}: {amount}");

    let index = state.ledger().submit_transaction(sender, recipient, amount)?;
    Ok(HttpResponse::Created().json(NewTxResponse {
        message: format!("Transaction will be added to Block {index}"),
        index,
    }))
}

/// List transactions waiting for the next block.
#[get("/transactions/pending/")]
pub async fn get_pending(state: web::Data<AppState>) -> HttpResponse {
    let ledger = state.ledger();
    HttpResponse::Ok().json(PendingResponse {
        size: ledger.pending().len(),
        transactions: ledger.pending().iter().cloned().collect(),
    })
}
