//! Core domain concepts shared across all subdomains.
//!
//! - [`family::AddressFamily`] - IPv4 or IPv6, fixed for one run
//! - [`peer::PeerSet`] - the peers contacted during one run
//! - [`error::DomainError`] / [`error::PeerError`] - configuration and per-peer errors

pub mod error;
pub mod family;
pub mod peer;
