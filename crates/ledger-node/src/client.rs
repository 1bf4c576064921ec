use async_trait::async_trait;
use ledger_core::{Block, PeerClient, PeerError};
use reqwest::{Client, Response};
use serde::Serialize;
use std::time::Duration;

/// Talks to other nodes over their HTTP API. Peers are `host:port` strings.
#[derive(Clone, Debug)]
pub struct HttpPeerClient {
    http: Client,
}

#[derive(Serialize)]
struct BlockOut<'a> {
    block: &'a Block,
}

#[derive(Serialize)]
struct PeersOut<'a> {
    peers: &'a [String],
}

impl HttpPeerClient {
    /// `timeout` bounds each RPC end to end; `None` leaves it unbounded.
    pub fn new(timeout: Option<Duration>) -> Result<Self, reqwest::Error> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            http: builder.build()?,
        })
    }

    fn unreachable(peer: &str, err: reqwest::Error) -> PeerError {
        PeerError::Unreachable {
            peer: peer.to_string(),
            reason: err.to_string(),
        }
    }

    fn check_status(peer: &str, res: Response) -> Result<Response, PeerError> {
        let status = res.status();
        if status.is_success() {
            Ok(res)
        } else {
            Err(PeerError::Status {
                peer: peer.to_string(),
                status: status.as_u16(),
            })
        }
    }

    async fn post<T: Serialize + Sync>(&self, peer: &str, route: &str, body: &T) -> Result<(), PeerError> {
        let res = self
            .http
            .post(format!("http://{peer}/{route}"))
            .json(body)
            .send()
            .await
            .map_err(|e| Self::unreachable(peer, e))?;
        Self::check_status(peer, res).map(|_| ())
    }
}

#[async_trait]
impl PeerClient for HttpPeerClient {
    async fn fetch_chain(&self, peer: &str) -> Result<Vec<Block>, PeerError> {
        let res = self
            .http
            .get(format!("http://{peer}/blocks"))
            .send()
            .await
            .map_err(|e| Self::unreachable(peer, e))?;
        Self::check_status(peer, res)?
            .json::<Vec<Block>>()
            .await
            .map_err(|e| PeerError::Decode {
                peer: peer.to_string(),
                reason: e.to_string(),
            })
    }

    async fn push_block(&self, peer: &str, block: &Block) -> Result<(), PeerError> {
        self.post(peer, "updateChain", &BlockOut { block }).await
    }

    async fn push_peers(&self, peer: &str, peers: &[String]) -> Result<(), PeerError> {
        self.post(peer, "updatePeers", &PeersOut { peers }).await
    }
}
