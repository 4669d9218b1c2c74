use log::warn;
use reqwest::Url;
use serde::{Deserialize, Serialize};

/// A remote node, identified by its `host:port` network location.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PeerNode {
    pub address: String,
}

impl PeerNode {
    /// Extract the network location from a URL such as
    /// `http://192.168.2.42:5000`. Returns `None` when there is none. The
    /// port is always spelled out, so `https://host` becomes `host:443`.
    pub fn parse(address: &str) -> Option<Self> {
        let url = match Url::parse(address.trim()) {
            Ok(url) => url,
            Err(e) => {
                warn!("unable to parse a network location from {address:?}: {e}");
                return None;
            }
        };
        let Some(host) = url.host_str().filter(|h| !h.is_empty()) else {
            warn!("unable to parse a network location from {address:?}");
            return None;
        };
        let address = match url.port_or_known_default() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_string(),
        };
        Some(Self { address })
    }

    /// Base URL for requests to this peer. Port 443 is spoken to over TLS,
    /// everything else over plain HTTP.
    pub fn base_url(&self) -> String {
        let scheme = if self.address.ends_with(":443") {
            "https"
        } else {
            "http"
        };
        format!("{scheme}://{}", self.address)
    }

    /// Build from an already canonical location, e.g. one loaded from storage.
    pub fn from_location(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
        }
    }
}

impl std::fmt::Display for PeerNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.address)
    }
}

#[cfg(test)]
mod tests {
    use super::PeerNode;

    #[test]
    fn parses_host_and_port() {
        let peer = PeerNode::parse("http://127.0.0.1:5000").unwrap();
        assert_eq!(peer.address, "127.0.0.1:5000");
    }

    #[test]
    fn default_port_is_kept() {
        let peer = PeerNode::parse("https://node.example.org/").unwrap();
        assert_eq!(peer.address, "node.example.org:443");
        let peer = PeerNode::parse("https://node.example.org:443").unwrap();
        assert_eq!(peer.address, "node.example.org:443");
        let peer = PeerNode::parse("http://node.example.org").unwrap();
        assert_eq!(peer.address, "node.example.org:80");
    }

    #[test]
    fn base_url_follows_port() {
        let tls = PeerNode::parse("https://node.example.org").unwrap();
        assert_eq!(tls.base_url(), "https://node.example.org:443");
        let plain = PeerNode::parse("http://127.0.0.1:5000").unwrap();
        assert_eq!(plain.base_url(), "http://127.0.0.1:5000");
    }

    #[test]
    fn rejects_missing_scheme_separator() {
        assert!(PeerNode::parse("http//127.0.0.1:5000").is_none());
    }

    #[test]
    fn rejects_addresses_without_location() {
        assert!(PeerNode::parse("").is_none());
        assert!(PeerNode::parse("127.0.0.1:5000").is_none());
        assert!(PeerNode::parse("file:///tmp/chain").is_none());
    }

    #[test]
    fn serializes_as_plain_string() {
        let peer = PeerNode::from_location("10.0.0.1:5000");
        assert_eq!(serde_json::to_string(&peer).unwrap(), r#""10.0.0.1:5000""#);
    }
}
