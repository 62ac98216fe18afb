//! STUN peer query adapter
//!
//! Implements the [`PeerQuery`] port with a single STUN Binding
//! round-trip over UDP. There is no retransmission: a lost datagram
//! shows up as a timeout, and the quorum absorbs it.

use super::codec::{self, BindingRequest, DEFAULT_PORT};
use super::error::StunError;
use async_trait::async_trait;
use extip_application::PeerQuery;
use extip_domain::{AddressFamily, PeerError};
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

/// Largest datagram we expect back from a Binding request
const RECV_BUFFER: usize = 1500;

/// Queries one STUN server per call
#[derive(Debug, Clone, Default)]
pub struct StunPeerQuery {
    response_timeout: Option<Duration>,
}

impl StunPeerQuery {
    /// Create a client that waits until cancelled
    pub fn new() -> Self {
        Self::default()
    }

    /// Give up on a peer that has not answered within `timeout`
    pub fn with_response_timeout(mut self, timeout: Duration) -> Self {
        self.response_timeout = Some(timeout);
        self
    }

    async fn round_trip(&self, peer: &str, family: AddressFamily) -> Result<IpAddr, PeerError> {
        match self.response_timeout {
            Some(limit) => tokio::time::timeout(limit, exchange(peer, family))
                .await
                .map_err(|_| PeerError::TimedOut)?,
            None => exchange(peer, family).await,
        }
    }
}

#[async_trait]
impl PeerQuery for StunPeerQuery {
    async fn query(
        &self,
        peer: &str,
        family: AddressFamily,
        cancel: CancellationToken,
    ) -> Result<IpAddr, PeerError> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                trace!("STUN query to {} cancelled", peer);
                Err(PeerError::Cancelled)
            }
            result = self.round_trip(peer, family) => result,
        }
    }
}

async fn exchange(peer: &str, family: AddressFamily) -> Result<IpAddr, PeerError> {
    let server = resolve_peer(peer, family).await?;
    let socket = UdpSocket::bind(family.unspecified_bind_addr()).await?;
    socket.connect(server).await?;

    let request = BindingRequest::new();
    socket.send(&request.encode()).await?;
    debug!("Sent Binding request to {} ({})", peer, server);

    let mut buf = [0u8; RECV_BUFFER];
    loop {
        let len = socket.recv(&mut buf).await?;
        match codec::parse_binding_response(&buf[..len], request.transaction_id()) {
            Ok(mapped) => {
                debug!("{} reports {}", peer, mapped.ip());
                return Ok(mapped.ip());
            }
            Err(StunError::TransactionMismatch) => {
                trace!("Ignoring reply for another transaction from {}", peer);
            }
            Err(e) => return Err(e.into()),
        }
    }
}

/// Resolve a peer entry to a server address of the requested family
async fn resolve_peer(peer: &str, family: AddressFamily) -> Result<SocketAddr, PeerError> {
    let target = with_default_port(peer);
    let candidates = tokio::net::lookup_host(target.as_str())
        .await
        .map_err(|e| PeerError::Resolve(format!("{}: {}", peer, e)))?;

    candidates
        .into_iter()
        .find(|addr| family.matches(addr))
        .ok_or_else(|| PeerError::Resolve(format!("{}: no {} address", peer, family)))
}

/// Append the standard STUN port to entries given without one
fn with_default_port(peer: &str) -> String {
    if peer.parse::<SocketAddr>().is_ok() {
        return peer.to_string();
    }
    if let Ok(ip) = peer.parse::<IpAddr>() {
        return SocketAddr::new(ip, DEFAULT_PORT).to_string();
    }
    match peer.rsplit_once(':') {
        Some((_, port)) if port.parse::<u16>().is_ok() => peer.to_string(),
        _ => format!("{}:{}", peer, DEFAULT_PORT),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stun::codec::{peek_transaction_id, server, TransactionId};

    /// How the local fake STUN server answers a single request
    enum Reply {
        Mapped(SocketAddr),
        ForeignThenMapped(SocketAddr),
        Garbage,
        Error(u16, &'static str),
        Silent,
    }

    async fn spawn_server(reply: Reply) -> String {
        let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let addr = socket.local_addr().unwrap();
        tokio::spawn(async move {
            let mut buf = [0u8; 1500];
            let (len, from) = socket.recv_from(&mut buf).await.unwrap();
            let id = peek_transaction_id(&buf[..len]).unwrap();
            match reply {
                Reply::Mapped(mapped) => {
                    let out = server::xor_mapped_success(&id, mapped);
                    socket.send_to(&out, from).await.unwrap();
                }
                Reply::ForeignThenMapped(mapped) => {
                    let other = TransactionId::from_bytes([0xAA; 12]);
                    let decoy = server::xor_mapped_success(&other, "192.0.2.99:1".parse().unwrap());
                    socket.send_to(&decoy, from).await.unwrap();
                    let out = server::xor_mapped_success(&id, mapped);
                    socket.send_to(&out, from).await.unwrap();
                }
                Reply::Garbage => {
                    socket.send_to(b"not a stun message at all", from).await.unwrap();
                }
                Reply::Error(code, reason) => {
                    let out = server::error_response(&id, code, reason);
                    socket.send_to(&out, from).await.unwrap();
                }
                Reply::Silent => {
                    // Keep the socket open so the client is left waiting
                    tokio::time::sleep(Duration::from_secs(30)).await;
                }
            }
        });
        addr.to_string()
    }

    fn mapped() -> SocketAddr {
        "203.0.113.7:40000".parse().unwrap()
    }

    #[tokio::test]
    async fn test_query_returns_mapped_address() {
        let peer = spawn_server(Reply::Mapped(mapped())).await;
        let client = StunPeerQuery::new().with_response_timeout(Duration::from_secs(5));

        let ip = client
            .query(&peer, AddressFamily::V4, CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(ip, mapped().ip());
    }

    #[tokio::test]
    async fn test_query_ignores_foreign_transactions() {
        let peer = spawn_server(Reply::ForeignThenMapped(mapped())).await;
        let client = StunPeerQuery::new().with_response_timeout(Duration::from_secs(5));

        let ip = client
            .query(&peer, AddressFamily::V4, CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(ip, mapped().ip());
    }

    #[tokio::test]
    async fn test_garbage_reply_is_malformed() {
        let peer = spawn_server(Reply::Garbage).await;
        let client = StunPeerQuery::new().with_response_timeout(Duration::from_secs(5));

        let err = client
            .query(&peer, AddressFamily::V4, CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, PeerError::Malformed(_)));
    }

    #[tokio::test]
    async fn test_error_response_is_rejected() {
        let peer = spawn_server(Reply::Error(500, "Server Error")).await;
        let client = StunPeerQuery::new().with_response_timeout(Duration::from_secs(5));

        let err = client
            .query(&peer, AddressFamily::V4, CancellationToken::new())
            .await
            .unwrap_err();
        assert_eq!(
            err,
            PeerError::Rejected {
                code: 500,
                reason: "Server Error".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_silent_peer_times_out() {
        let peer = spawn_server(Reply::Silent).await;
        let client = StunPeerQuery::new().with_response_timeout(Duration::from_millis(50));

        let err = client
            .query(&peer, AddressFamily::V4, CancellationToken::new())
            .await
            .unwrap_err();
        assert_eq!(err, PeerError::TimedOut);
    }

    #[tokio::test]
    async fn test_cancel_releases_pending_query() {
        let peer = spawn_server(Reply::Silent).await;
        let client = StunPeerQuery::new();
        let cancel = CancellationToken::new();

        let canceller = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            canceller.cancel();
        });

        let err = client
            .query(&peer, AddressFamily::V4, cancel)
            .await
            .unwrap_err();
        assert_eq!(err, PeerError::Cancelled);
    }

    #[tokio::test]
    async fn test_family_mismatch_is_resolve_error() {
        let client = StunPeerQuery::new();
        let err = client
            .query("127.0.0.1:3478", AddressFamily::V6, CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, PeerError::Resolve(_)));
    }

    #[test]
    fn test_with_default_port() {
        assert_eq!(with_default_port("stun.example.org"), "stun.example.org:3478");
        assert_eq!(with_default_port("stun.example.org:19302"), "stun.example.org:19302");
        assert_eq!(with_default_port("192.0.2.1"), "192.0.2.1:3478");
        assert_eq!(with_default_port("2001:db8::1"), "[2001:db8::1]:3478");
        assert_eq!(with_default_port("[2001:db8::1]:5349"), "[2001:db8::1]:5349");
    }
}
