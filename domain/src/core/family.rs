//! Address family value object

use super::error::DomainError;
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};

/// IP address family used for one run
///
/// A run never mixes families: every peer is queried over the same one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AddressFamily {
    #[default]
    #[serde(rename = "ipv4")]
    V4,
    #[serde(rename = "ipv6")]
    V6,
}

impl AddressFamily {
    /// Select the family from an "is IPv6" flag
    pub fn from_ipv6_flag(ipv6: bool) -> Self {
        if ipv6 { Self::V6 } else { Self::V4 }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AddressFamily::V4 => "ipv4",
            AddressFamily::V6 => "ipv6",
        }
    }

    /// Whether an IP address belongs to this family
    pub fn matches_ip(&self, ip: &IpAddr) -> bool {
        matches!(
            (self, ip),
            (AddressFamily::V4, IpAddr::V4(_)) | (AddressFamily::V6, IpAddr::V6(_))
        )
    }

    /// Whether a socket address belongs to this family
    pub fn matches(&self, addr: &SocketAddr) -> bool {
        self.matches_ip(&addr.ip())
    }

    /// Wildcard local address for binding a socket of this family
    pub fn unspecified_bind_addr(&self) -> SocketAddr {
        match self {
            AddressFamily::V4 => SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 0),
            AddressFamily::V6 => SocketAddr::new(IpAddr::V6(Ipv6Addr::UNSPECIFIED), 0),
        }
    }
}

impl std::fmt::Display for AddressFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for AddressFamily {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ipv4" | "v4" | "4" | "udp4" => Ok(AddressFamily::V4),
            "ipv6" | "v6" | "6" | "udp6" => Ok(AddressFamily::V6),
            other => Err(DomainError::InvalidAddressFamily(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_family() {
        assert_eq!("ipv4".parse::<AddressFamily>().ok(), Some(AddressFamily::V4));
        assert_eq!("UDP6".parse::<AddressFamily>().ok(), Some(AddressFamily::V6));
        assert_eq!("6".parse::<AddressFamily>().ok(), Some(AddressFamily::V6));
        assert!(matches!(
            "ipx".parse::<AddressFamily>(),
            Err(DomainError::InvalidAddressFamily(_))
        ));
    }

    #[test]
    fn test_matches() {
        let v4: SocketAddr = "1.2.3.4:3478".parse().unwrap();
        let v6: SocketAddr = "[2001:db8::1]:3478".parse().unwrap();
        assert!(AddressFamily::V4.matches(&v4));
        assert!(!AddressFamily::V4.matches(&v6));
        assert!(AddressFamily::V6.matches(&v6));
    }

    #[test]
    fn test_bind_addr_family() {
        assert!(AddressFamily::V4.unspecified_bind_addr().is_ipv4());
        assert!(AddressFamily::V6.unspecified_bind_addr().is_ipv6());
    }

    #[test]
    fn test_serde_names() {
        assert_eq!(serde_json::to_string(&AddressFamily::V6).unwrap(), "\"ipv6\"");
        let family: AddressFamily = serde_json::from_str("\"ipv4\"").unwrap();
        assert_eq!(family, AddressFamily::V4);
        assert_eq!(AddressFamily::from_ipv6_flag(true), AddressFamily::V6);
        assert_eq!(AddressFamily::default(), AddressFamily::V4);
    }
}
