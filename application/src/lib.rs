//! Application layer for extip-quorum
//!
//! This crate contains the resolver use case and the port definitions
//! implemented by infrastructure adapters. It depends only on the domain layer.

pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use ports::{
    peer_query::PeerQuery,
    progress::{NoProgress, ResolveProgress},
    run_logger::{NoRunLogger, RunEvent, RunLogger},
};
pub use use_cases::resolve_address::{ResolveAddressUseCase, ResolveError, ResolveInput};
