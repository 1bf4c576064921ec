use crate::client::HttpPeerClient;
use crate::constants::*;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use ledger_core::{Block, LedgerError, Node, ReceiveOutcome};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tower_http::trace::TraceLayer;
use tracing::warn;

pub type SharedNode = Arc<Node<HttpPeerClient>>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Ledger(LedgerError::InvalidHex(_)) => StatusCode::BAD_REQUEST,
            ApiError::Ledger(LedgerError::StaleTip { .. }) => StatusCode::CONFLICT,
            ApiError::Ledger(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        warn!(status = status.as_u16(), error = %self, "request failed");
        (status, Json(MessageOut { message: self.to_string() })).into_response()
    }
}

#[derive(Deserialize)]
pub struct MineIn {
    #[serde(default)]
    pub data: String,
}

/// A block offered by a peer. Any hash it carries is ignored and recomputed.
#[derive(Deserialize)]
pub struct IncomingBlock {
    pub index: u64,
    pub previous_hash: String,
    pub timestamp: f64,
    pub data: String,
    pub difficulty: u32,
    pub nonce: u64,
}

#[derive(Deserialize)]
pub struct UpdateChainIn {
    pub block: IncomingBlock,
}

#[derive(Deserialize)]
pub struct PeersIn {
    pub peers: Vec<String>,
}

#[derive(Serialize)]
struct MessageOut {
    message: String,
}

#[derive(Serialize)]
struct BlockMessageOut {
    message: &'static str,
    block: Block,
}

#[derive(Serialize)]
struct PeersMessageOut {
    message: &'static str,
    peers: Vec<String>,
}

fn message(status: StatusCode, text: &str) -> Response {
    (
        status,
        Json(MessageOut {
            message: text.to_string(),
        }),
    )
        .into_response()
}

pub fn router(node: SharedNode) -> Router {
    Router::new()
        .route("/blocks", get(get_blocks))
        .route("/mineBlock", post(mine_block))
        .route("/updateChain", post(update_chain))
        .route("/peers", get(get_peers))
        .route("/addPeer", post(add_peer))
        .route("/updatePeers", post(update_peers))
        .route("/resolve", get(resolve))
        .with_state(node)
        .layer(TraceLayer::new_for_http())
}

async fn get_blocks(State(node): State<SharedNode>) -> Json<Vec<Block>> {
    Json(node.blocks().await)
}

async fn mine_block(
    State(node): State<SharedNode>,
    Json(body): Json<MineIn>,
) -> Result<Response, ApiError> {
    let block = node.mine(body.data).await?;
    Ok((
        StatusCode::CREATED,
        Json(BlockMessageOut {
            message: MSG_BLOCK_MINED,
            block,
        }),
    )
        .into_response())
}

async fn update_chain(
    State(node): State<SharedNode>,
    Json(body): Json<UpdateChainIn>,
) -> Result<Response, ApiError> {
    let b = body.block;
    let block = Block::new(b.index, b.previous_hash, b.timestamp, b.data, b.difficulty, b.nonce)?;
    Ok(match node.receive_block(block).await {
        ReceiveOutcome::Appended(block) => (
            StatusCode::CREATED,
            Json(BlockMessageOut {
                message: MSG_BLOCK_ADDED,
                block,
            }),
        )
            .into_response(),
        ReceiveOutcome::ChainUpdated => message(StatusCode::OK, MSG_CHAIN_UPDATED),
        ReceiveOutcome::NotBehind => message(StatusCode::CREATED, MSG_NOT_BEHIND),
    })
}

async fn get_peers(State(node): State<SharedNode>) -> Json<Vec<String>> {
    Json(node.peers().await)
}

async fn add_peer(State(node): State<SharedNode>, Json(body): Json<PeersIn>) -> Response {
    let peers = node.add_peers(&body.peers).await;
    (
        StatusCode::CREATED,
        Json(PeersMessageOut {
            message: MSG_PEERS_ADDED,
            peers,
        }),
    )
        .into_response()
}

async fn update_peers(State(node): State<SharedNode>, Json(body): Json<PeersIn>) -> Response {
    let peers = node.update_peers(&body.peers).await;
    (
        StatusCode::CREATED,
        Json(PeersMessageOut {
            message: MSG_PEERS_UPDATED,
            peers,
        }),
    )
        .into_response()
}

async fn resolve(State(node): State<SharedNode>) -> Response {
    if node.resolve_conflicts().await {
        message(StatusCode::OK, MSG_CHAIN_UPDATED)
    } else {
        message(StatusCode::CREATED, MSG_NOT_BEHIND)
    }
}
