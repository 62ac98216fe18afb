//! STUN adapter for the Peer Query port
//!
//! - [`codec`] - sans-IO Binding request/response encoding (RFC 5389)
//! - [`client`] - UDP round-trip implementing [`PeerQuery`](extip_application::PeerQuery)
//! - [`error`] - codec and transport errors

pub mod client;
pub mod codec;
pub mod error;
