use actix_web::{HttpResponse, get, post, web};

use super::models::{AppState, NodesResponse, RegisterNodesRequest, ResolveResponse, block_views};
use crate::error::Result;
use crate::network::resolve_conflicts;

/// Register one or more peers, e.g. `{"nodes": ["http://10.0.0.2:5000"]}`.
/// Addresses without a network location are skipped.
#[post("/nodes/register/")]
pub async fn register_nodes(
    state: web::Data<AppState>,
    body: web::Json<RegisterNodesRequest>,
) -> Result<HttpResponse> {
    if body.nodes.is_empty() {
        return Ok(HttpResponse::BadRequest().body("Please supply a valid list of nodes"));
    }

    let mut ledger = state.ledger();
    for address in &body.nodes {
        ledger.register_peer(address)?;
    }
    Ok(HttpResponse::Created().json(NodesResponse {
        message: "New nodes have been added",
        total_nodes: ledger.peers().to_vec(),
    }))
}

#[get("/nodes/")]
pub async fn list_nodes(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(NodesResponse {
        message: "Known nodes",
        total_nodes: state.ledger().peers().to_vec(),
    })
}

/// Adopt the longest valid chain among known peers.
#[get("/nodes/resolve/")]
pub async fn resolve(state: web::Data<AppState>) -> Result<HttpResponse> {
    let replaced = resolve_conflicts(&state.ledger, state.fetcher.as_ref()).await?;
    let message = if replaced {
        "Our chain was replaced"
    } else {
        "Our chain is authoritative"
    };
    Ok(HttpResponse::Ok().json(ResolveResponse {
        message,
        replaced,
        chain: block_views(state.ledger().chain()),
    }))
}
