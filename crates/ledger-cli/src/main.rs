use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use reqwest::{Client, RequestBuilder};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "ledger-cli")]
#[command(about = "CLI client for the peer-to-peer ledger node")]
struct Cli {
    /// Node base URL
    #[arg(long, global = true, default_value = "http://127.0.0.1:5000")]
    node: String,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the node's chain
    Blocks,
    /// Mine a block carrying DATA
    Mine { data: String },
    /// Print the node's peers
    Peers,
    /// Register peers and let the node forward them to the peers it knows
    AddPeers {
        #[arg(required = true)]
        peers: Vec<String>,
    },
    /// Register peers without forwarding
    UpdatePeers {
        #[arg(required = true)]
        peers: Vec<String>,
    },
    /// Ask the node to adopt the longest valid chain among its peers
    Resolve,
    /// Offer a block (JSON object with the wire fields) to the node
    PushBlock { block: String },
}

#[derive(Serialize)]
struct MineIn {
    data: String,
}

#[derive(Serialize)]
struct PeersIn {
    peers: Vec<String>,
}

#[derive(Serialize)]
struct BlockIn {
    block: Value,
}

fn request(http: &Client, node: &str, cmd: Command) -> Result<RequestBuilder> {
    let node = node.trim_end_matches('/');
    Ok(match cmd {
        Command::Blocks => http.get(format!("{node}/blocks")),
        Command::Mine { data } => http
            .post(format!("{node}/mineBlock"))
            .json(&MineIn { data }),
        Command::Peers => http.get(format!("{node}/peers")),
        Command::AddPeers { peers } => http
            .post(format!("{node}/addPeer"))
            .json(&PeersIn { peers }),
        Command::UpdatePeers { peers } => http
            .post(format!("{node}/updatePeers"))
            .json(&PeersIn { peers }),
        Command::Resolve => http.get(format!("{node}/resolve")),
        Command::PushBlock { block } => {
            let block: Value = serde_json::from_str(&block).context("block is not valid JSON")?;
            http.post(format!("{node}/updateChain"))
                .json(&BlockIn { block })
        }
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let cli = Cli::parse();
    let http = Client::new();
    let req = request(&http, &cli.node, cli.cmd)?.build()?;
    debug!(method = %req.method(), url = %req.url(), "sending");

    let res = http.execute(req).await?;
    let status = res.status();
    let body = res.text().await?;
    println!("status: {}", status);
    match serde_json::from_str::<Value>(&body) {
        Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
        Err(_) => println!("{body}"),
    }
    Ok(())
}
