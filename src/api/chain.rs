use actix_web::{HttpResponse, Responder, get, web};

use super::models::{AppState, ChainResponse, ValidateResponse, block_views};
use crate::blockchain::is_valid_chain;

/// Get the full chain.
#[get("/chain/")]
pub async fn get_chain(state: web::Data<AppState>) -> impl Responder {
    let ledger = state.ledger();
    HttpResponse::Ok().json(ChainResponse {
        chain: block_views(ledger.chain()),
        length: ledger.len(),
    })
}

/// Validate the local chain.
#[get("/validate/")]
pub async fn validate_chain(state: web::Data<AppState>) -> impl Responder {
    let ledger = state.ledger();
    HttpResponse::Ok().json(ValidateResponse {
        valid: is_valid_chain(ledger.chain()),
        length: ledger.len(),
    })
}
