use clap::Parser;
use ledger_core::constants::{DEFAULT_DIFFICULTY, MAX_DIFFICULTY};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

#[derive(Parser, Debug, Clone)]
#[command(name = "ledger-node", about = "Peer-to-peer ledger node")]
pub struct Args {
    /// HTTP port
    #[arg(short, long)]
    pub port: u16,

    /// Address to bind
    #[arg(long, default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    pub host: IpAddr,

    /// Peers to know about at startup, e.g. http://127.0.0.1:5001
    #[arg(short = 'e', long, num_args = 0..)]
    pub peers: Vec<String>,

    /// Leading hash characters fed into the mining predicate
    #[arg(
        short,
        long,
        default_value_t = DEFAULT_DIFFICULTY,
        value_parser = clap::value_parser!(u32).range(0..=MAX_DIFFICULTY as i64)
    )]
    pub difficulty: u32,

    /// Give up on a peer RPC after this many seconds (default: wait indefinitely)
    #[arg(long)]
    pub peer_timeout_secs: Option<u64>,
}

impl Args {
    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    pub fn peer_timeout(&self) -> Option<Duration> {
        self.peer_timeout_secs.map(Duration::from_secs)
    }
}
