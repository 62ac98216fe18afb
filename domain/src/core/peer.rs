//! Peer set value objects

use serde::{Deserialize, Serialize};

/// Well-known public STUN servers used when no explicit peers are given
pub const WELL_KNOWN_PEERS: &[&str] = &[
    "stun.l.google.com:19302",
    "stun.ekiga.net:3478",
    "stun.ideasip.com:3478",
    "stun.schlund.de:3478",
    "stun.voiparound.com:3478",
    "stun.voipbuster.com:3478",
    "stun.voipstunt.com:3478",
];

/// Ordered set of peer addresses contacted during one run (Value Object)
///
/// Entries are `host:port` strings. Blank entries are dropped and a peer
/// listed twice is kept once, so every peer counts once toward quorum.
/// The set may be empty; the resolver rejects an empty set before any
/// query is launched.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PeerSet {
    peers: Vec<String>,
}

impl PeerSet {
    /// Create a peer set from caller-supplied addresses
    pub fn new<I, S>(peers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut unique: Vec<String> = Vec::new();
        for peer in peers {
            let peer = peer.into().trim().to_string();
            if !peer.is_empty() && !unique.contains(&peer) {
                unique.push(peer);
            }
        }
        Self { peers: unique }
    }

    /// The built-in list of public peers
    pub fn well_known() -> Self {
        Self::new(WELL_KNOWN_PEERS.iter().copied())
    }

    pub fn len(&self) -> usize {
        self.peers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.peers.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.peers
    }
}

impl<'a> IntoIterator for &'a PeerSet {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.peers.iter()
    }
}

/// Where the peers for a run come from
///
/// The built-in list is only used when selected explicitly. An explicit
/// but empty list stays empty, which keeps runs reproducible.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PeerSelection {
    /// Use [`WELL_KNOWN_PEERS`]
    #[default]
    WellKnown,
    /// Use exactly these peers
    Explicit(Vec<String>),
}

impl PeerSelection {
    /// Resolve the selection into a concrete peer set
    pub fn resolve(&self) -> PeerSet {
        match self {
            PeerSelection::WellKnown => PeerSet::well_known(),
            PeerSelection::Explicit(peers) => PeerSet::new(peers.iter().map(String::as_str)),
        }
    }
}
