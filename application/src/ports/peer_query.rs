//! Peer Query port
//!
//! Defines the interface for asking a single peer for the local host's
//! public address.

use async_trait::async_trait;
use extip_domain::{AddressFamily, PeerError};
use std::net::IpAddr;
use tokio_util::sync::CancellationToken;

/// One round-trip to one address-identification peer
///
/// This port defines how the resolver talks to peers. Implementations
/// (adapters) live in the infrastructure layer.
///
/// Implementations must stop waiting as soon as `cancel` fires and return
/// [`PeerError::Cancelled`]. The resolver relies on this to release every
/// query still in flight once a run has been decided.
#[async_trait]
pub trait PeerQuery: Send + Sync {
    /// Ask `peer` for the address it sees us connecting from
    async fn query(
        &self,
        peer: &str,
        family: AddressFamily,
        cancel: CancellationToken,
    ) -> Result<IpAddr, PeerError>;
}
