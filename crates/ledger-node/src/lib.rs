//! HTTP face of a ledger node: the JSON routes other nodes and clients call,
//! and the reqwest client this node uses to call them back.

pub mod api;
pub mod client;
pub mod config;
mod constants;

use anyhow::Result;
use api::SharedNode;
use client::HttpPeerClient;
use config::Args;
use ledger_core::{Ledger, Node};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

/// Builds the node described by `args`, including its bootstrap peers.
pub async fn build_node(args: &Args) -> Result<SharedNode> {
    let client = HttpPeerClient::new(args.peer_timeout())?;
    let node = Arc::new(Node::new(Ledger::new(args.difficulty), client));
    if !args.peers.is_empty() {
        let peers = node.update_peers(&args.peers).await;
        info!(?peers, "bootstrap peers registered");
    }
    Ok(node)
}

/// Serves `node` on `listener` until Ctrl-C.
pub async fn serve(listener: TcpListener, node: SharedNode) -> Result<()> {
    let app = api::router(node.clone());
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(node))
        .await?;
    Ok(())
}

async fn shutdown_signal(node: SharedNode) {
    if tokio::signal::ctrl_c().await.is_err() {
        // No signal handler; run until killed.
        std::future::pending::<()>().await;
    }
    info!("shutting down");
    node.shutdown();
}
