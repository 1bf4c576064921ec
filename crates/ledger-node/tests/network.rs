mod common;

use common::spawn_node;
use ledger_core::{mine, Block, Ledger};
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};

const GENESIS_HASH: &str = "5feceb66ffc86f38d952786c6d696c79c2dbc239dd4e91b46729d73a27fb57e9";

async fn get(client: &Client, url: String) -> (StatusCode, Value) {
    let res = client.get(url).send().await.unwrap();
    let status = res.status();
    (status, res.json().await.unwrap())
}

async fn post(client: &Client, url: String, body: Value) -> (StatusCode, Value) {
    let res = client.post(url).json(&body).send().await.unwrap();
    let status = res.status();
    (status, res.json().await.unwrap())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn blocks_route_serves_genesis_with_wire_fields() {
    let a = spawn_node().await;
    let http = Client::new();

    let (status, body) = get(&http, a.url("blocks")).await;
    assert_eq!(status, StatusCode::OK);
    let blocks = body.as_array().unwrap();
    assert_eq!(blocks.len(), 1);
    let genesis = blocks[0].as_object().unwrap();
    assert_eq!(genesis.len(), 7);
    assert_eq!(genesis["index"], 0);
    assert_eq!(genesis["previous_hash"], "0");
    assert_eq!(genesis["data"], "First block");
    assert_eq!(genesis["difficulty"], 0);
    assert_eq!(genesis["nonce"], 3);
    assert_eq!(genesis["our_hash"], GENESIS_HASH);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn mined_block_reaches_peers() {
    let a = spawn_node().await;
    let b = spawn_node().await;
    let http = Client::new();

    let (status, body) = post(
        &http,
        a.url("addPeer"),
        json!({ "peers": [format!("http://{}", b.addr)] }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Peers added");
    assert_eq!(body["peers"], json!([&b.addr]));

    let (status, body) = post(&http, a.url("mineBlock"), json!({ "data": "x" })).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Block mined");
    assert_eq!(body["block"]["index"], 1);
    assert_eq!(body["block"]["previous_hash"], GENESIS_HASH);
    assert_eq!(body["block"]["nonce"], 5);
    assert_eq!(body["block"]["data"], "x");

    assert_eq!(b.node.blocks().await, a.node.blocks().await);
    assert_eq!(b.node.blocks().await.len(), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn stale_block_is_not_behind() {
    let a = spawn_node().await;
    let http = Client::new();

    let genesis = serde_json::to_value(Block::genesis()).unwrap();
    let (status, body) = post(&http, a.url("updateChain"), json!({ "block": genesis })).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Chain is not behind");
    assert_eq!(a.node.blocks().await.len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn next_block_is_appended_with_recomputed_hash() {
    let a = spawn_node().await;
    let http = Client::new();

    let mut ledger = Ledger::new(2);
    let block = mine::mine_block(&mut ledger, "from afar").unwrap();
    let mut wire = serde_json::to_value(&block).unwrap();
    wire["our_hash"] = json!("not-the-real-hash");

    let (status, body) = post(&http, a.url("updateChain"), json!({ "block": wire })).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Block added");
    assert_eq!(body["block"]["our_hash"], block.hash.as_str());
    assert_eq!(a.node.latest().await, block);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn malformed_previous_hash_is_rejected() {
    let a = spawn_node().await;
    let http = Client::new();

    let block = json!({
        "index": 1, "previous_hash": "zz", "timestamp": 1.5,
        "data": "x", "difficulty": 2, "nonce": 5
    });
    let (status, _) = post(&http, a.url("updateChain"), json!({ "block": block })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(a.node.blocks().await.len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn resolve_adopts_longer_peer_chain() {
    let a = spawn_node().await;
    let b = spawn_node().await;
    let http = Client::new();

    a.node.mine("one".into()).await.unwrap();
    a.node.mine("two".into()).await.unwrap();

    let (status, body) = post(&http, b.url("updatePeers"), json!({ "peers": [&a.addr] })).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Peers updated");

    let (status, body) = get(&http, b.url("resolve")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Chain updated");
    assert_eq!(b.node.blocks().await, a.node.blocks().await);

    let (status, body) = get(&http, b.url("resolve")).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Chain is not behind");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn block_beyond_tip_triggers_resolution() {
    let a = spawn_node().await;
    let b = spawn_node().await;
    let http = Client::new();

    a.node.mine("one".into()).await.unwrap();
    let tip = a.node.mine("two".into()).await.unwrap();
    b.node.update_peers(&[a.addr.clone()]).await;

    let wire = serde_json::to_value(&tip).unwrap();
    let (status, body) = post(&http, b.url("updateChain"), json!({ "block": wire })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Chain updated");
    assert_eq!(b.node.blocks().await.len(), 3);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn add_peer_fans_out_to_existing_peers() {
    let a = spawn_node().await;
    let b = spawn_node().await;
    let http = Client::new();

    a.node.update_peers(&[b.addr.clone()]).await;
    let (status, body) = post(
        &http,
        a.url("addPeer"),
        json!({ "peers": ["http://10.0.0.9:7000/x"] }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let peers: Vec<String> = serde_json::from_value(body["peers"].clone()).unwrap();
    assert!(peers.contains(&"10.0.0.9:7000".to_string()));
    assert!(peers.contains(&b.addr));

    let (_, body) = get(&http, b.url("peers")).await;
    assert_eq!(body, json!(["10.0.0.9:7000"]));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn unreachable_peers_do_not_fail_requests() {
    let a = spawn_node().await;
    let http = Client::new();
    a.node.update_peers(&["127.0.0.1:1".to_string()]).await;

    let (status, _) = post(&http, a.url("mineBlock"), json!({ "data": "x" })).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = get(&http, a.url("resolve")).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Chain is not behind");
    assert_eq!(a.node.blocks().await.len(), 2);
}
