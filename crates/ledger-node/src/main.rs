use clap::Parser;
use ledger_node::config::Args;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let node = ledger_node::build_node(&args).await?;

    let addr = args.listen_addr();
    let listener = TcpListener::bind(addr).await?;
    info!(
        difficulty = args.difficulty,
        "ledger-node listening on http://{addr}"
    );
    ledger_node::serve(listener, node).await
}
