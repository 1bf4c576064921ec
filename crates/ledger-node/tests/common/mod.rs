use ledger_core::{Ledger, Node};
use ledger_node::api::{router, SharedNode};
use ledger_node::client::HttpPeerClient;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

pub struct TestNode {
    pub addr: String,
    pub node: SharedNode,
}

impl TestNode {
    pub fn url(&self, route: &str) -> String {
        format!("http://{}/{}", self.addr, route)
    }
}

/// Starts a node on an ephemeral loopback port. Difficulty 2 keeps mining fast
/// and deterministic.
pub async fn spawn_node() -> TestNode {
    let client = HttpPeerClient::new(Some(Duration::from_secs(10))).expect("http client");
    let node = Arc::new(Node::new(Ledger::new(2), client));
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    let app = router(node.clone());
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("server");
    });
    TestNode {
        addr: format!("127.0.0.1:{}", addr.port()),
        node,
    }
}
