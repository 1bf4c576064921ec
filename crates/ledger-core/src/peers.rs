use std::collections::BTreeSet;
use tracing::warn;
use url::Url;

/// Reduces a peer address to `host:port`. Scheme, credentials and path are
/// dropped; a bare `host:port` is read as an `http://` URL.
pub fn normalize_address(address: &str) -> Option<String> {
    let address = address.trim();
    let url = if address.contains("://") {
        Url::parse(address)
    } else {
        Url::parse(&format!("http://{address}"))
    }
    .ok()?;
    let host = url.host_str().filter(|h| !h.is_empty())?;
    Some(match url.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    })
}

/// Known peers. Only ever grows.
#[derive(Clone, Debug, Default)]
pub struct PeerRegistry {
    peers: BTreeSet<String>,
}

impl PeerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores the normalised form of `address` and returns it. Unparseable
    /// addresses are logged and ignored.
    pub fn add_peer(&mut self, address: &str) -> Option<String> {
        let Some(peer) = normalize_address(address) else {
            warn!(address, "ignoring unparseable peer address");
            return None;
        };
        self.peers.insert(peer.clone());
        Some(peer)
    }

    pub fn merge<'a, I>(&mut self, addresses: I)
    where
        I: IntoIterator<Item = &'a String>,
    {
        for address in addresses {
            self.add_peer(address);
        }
    }

    #[cfg(test)]
    pub(crate) fn contains(&self, peer: &str) -> bool {
        self.peers.contains(peer)
    }

    pub fn list_peers(&self) -> Vec<String> {
        self.peers.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.peers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_peer_keeps_host_and_port() {
        let mut registry = PeerRegistry::new();
        assert_eq!(
            registry.add_peer("http://1.2.3.4:9000/x"),
            Some("1.2.3.4:9000".to_string())
        );
        assert_eq!(registry.list_peers(), vec!["1.2.3.4:9000".to_string()]);
    }

    #[test]
    fn add_peer_is_idempotent() {
        let mut registry = PeerRegistry::new();
        registry.add_peer("http://node-a:5000");
        registry.add_peer("http://node-a:5000/blocks");
        registry.add_peer("node-a:5000");
        assert_eq!(registry.len(), 1);
        assert!(registry.contains("node-a:5000"));
    }

    #[test]
    fn normalize_examples() {
        assert_eq!(normalize_address("127.0.0.1:5001").as_deref(), Some("127.0.0.1:5001"));
        assert_eq!(normalize_address("localhost:5001").as_deref(), Some("localhost:5001"));
        assert_eq!(
            normalize_address("https://user:pw@example.org:8443/path?q=1").as_deref(),
            Some("example.org:8443")
        );
        assert_eq!(normalize_address("http://[::1]:7000").as_deref(), Some("[::1]:7000"));
        assert_eq!(normalize_address("").as_deref(), None);
        assert_eq!(normalize_address("http://").as_deref(), None);
    }

    #[test]
    fn bad_addresses_are_ignored() {
        let mut registry = PeerRegistry::new();
        assert_eq!(registry.add_peer("http://"), None);
        assert!(registry.is_empty());
    }

    #[test]
    fn merge_adds_every_address() {
        let mut registry = PeerRegistry::new();
        let incoming = vec![
            "http://a:1".to_string(),
            "b:2".to_string(),
            "http://a:1/".to_string(),
        ];
        registry.merge(&incoming);
        assert_eq!(registry.list_peers(), vec!["a:1".to_string(), "b:2".to_string()]);
    }
}
