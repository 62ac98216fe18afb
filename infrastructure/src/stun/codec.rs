//! STUN Binding codec (RFC 5389), sans-IO.
//!
//! Only what address discovery needs: building a Binding request and
//! reading the mapped address (or error code) out of the reply.
//!
//! ```text
//!  0                   1                   2                   3
//!  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |0 0|     STUN Message Type     |         Message Length        |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |                         Magic Cookie                          |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |                     Transaction ID (96 bits)                  |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! ```

use super::error::{Result, StunError};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};

pub const MAGIC_COOKIE: u32 = 0x2112_A442;
pub const HEADER_LEN: usize = 20;

/// Default STUN port when a peer is given without one
pub const DEFAULT_PORT: u16 = 3478;

const BINDING_REQUEST: u16 = 0x0001;
const BINDING_SUCCESS: u16 = 0x0101;
const BINDING_ERROR: u16 = 0x0111;

const ATTR_MAPPED_ADDRESS: u16 = 0x0001;
const ATTR_ERROR_CODE: u16 = 0x0009;
const ATTR_XOR_MAPPED_ADDRESS: u16 = 0x0020;
// Pre-RFC 5389 servers still use the experimental code point
const ATTR_XOR_MAPPED_ADDRESS_LEGACY: u16 = 0x8020;

const FAMILY_IPV4: u8 = 0x01;
const FAMILY_IPV6: u8 = 0x02;

/// 96-bit transaction id shared by a request and its response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransactionId([u8; 12]);

impl TransactionId {
    pub fn random() -> Self {
        Self(rand::random())
    }

    pub fn from_bytes(bytes: [u8; 12]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 12] {
        &self.0
    }
}

/// A Binding request with no attributes
#[derive(Debug, Clone, Copy)]
pub struct BindingRequest {
    transaction_id: TransactionId,
}

impl BindingRequest {
    pub fn new() -> Self {
        Self {
            transaction_id: TransactionId::random(),
        }
    }

    pub fn transaction_id(&self) -> &TransactionId {
        &self.transaction_id
    }

    pub fn encode(&self) -> [u8; HEADER_LEN] {
        encode_header(BINDING_REQUEST, 0, &self.transaction_id)
    }
}

impl Default for BindingRequest {
    fn default() -> Self {
        Self::new()
    }
}

fn encode_header(message_type: u16, length: u16, id: &TransactionId) -> [u8; HEADER_LEN] {
    let mut header = [0u8; HEADER_LEN];
    header[0..2].copy_from_slice(&message_type.to_be_bytes());
    header[2..4].copy_from_slice(&length.to_be_bytes());
    header[4..8].copy_from_slice(&MAGIC_COOKIE.to_be_bytes());
    header[8..20].copy_from_slice(id.as_bytes());
    header
}

/// Read the transaction id of a datagram without validating the rest
pub fn peek_transaction_id(buf: &[u8]) -> Option<TransactionId> {
    let bytes: [u8; 12] = buf.get(8..HEADER_LEN)?.try_into().ok()?;
    Some(TransactionId(bytes))
}

/// Parse a Binding response to the request identified by `expected`
///
/// Returns the reflexive address the server saw. XOR-MAPPED-ADDRESS is
/// preferred; MAPPED-ADDRESS is accepted from servers that only send that.
/// A well-formed reply to some other transaction yields
/// [`StunError::TransactionMismatch`] so the caller can keep waiting.
pub fn parse_binding_response(buf: &[u8], expected: &TransactionId) -> Result<SocketAddr> {
    if buf.len() < HEADER_LEN {
        return Err(StunError::TooShort(buf.len()));
    }

    let message_type = u16::from_be_bytes([buf[0], buf[1]]);
    let length = u16::from_be_bytes([buf[2], buf[3]]) as usize;
    let cookie = u32::from_be_bytes([buf[4], buf[5], buf[6], buf[7]]);

    if message_type & 0xC000 != 0 || cookie != MAGIC_COOKIE {
        return Err(StunError::NotStun);
    }
    if length % 4 != 0 || HEADER_LEN + length > buf.len() {
        return Err(StunError::LengthMismatch {
            declared: length,
            available: buf.len() - HEADER_LEN,
        });
    }
    if buf[8..HEADER_LEN] != expected.as_bytes()[..] {
        return Err(StunError::TransactionMismatch);
    }

    let body = &buf[HEADER_LEN..HEADER_LEN + length];

    match message_type {
        BINDING_SUCCESS => {
            let mut xor_mapped = None;
            let mut mapped = None;
            for attr in Attributes::new(body) {
                let (attr_type, value) = attr?;
                match attr_type {
                    ATTR_XOR_MAPPED_ADDRESS | ATTR_XOR_MAPPED_ADDRESS_LEGACY
                        if xor_mapped.is_none() =>
                    {
                        xor_mapped = Some(decode_xor_address(attr_type, value, expected)?);
                    }
                    ATTR_MAPPED_ADDRESS if mapped.is_none() => {
                        mapped = Some(decode_address(attr_type, value)?);
                    }
                    _ => {}
                }
            }
            xor_mapped.or(mapped).ok_or(StunError::NoMappedAddress)
        }
        BINDING_ERROR => {
            for attr in Attributes::new(body) {
                let (attr_type, value) = attr?;
                if attr_type == ATTR_ERROR_CODE {
                    return Err(decode_error_code(value)?);
                }
            }
            Err(StunError::ErrorResponse {
                code: 0,
                reason: "unspecified".to_string(),
            })
        }
        other => Err(StunError::UnexpectedType(other)),
    }
}

/// Iterator over `(type, value)` pairs of a message body
struct Attributes<'a> {
    body: &'a [u8],
    offset: usize,
}

impl<'a> Attributes<'a> {
    fn new(body: &'a [u8]) -> Self {
        Self { body, offset: 0 }
    }
}

impl<'a> Iterator for Attributes<'a> {
    type Item = Result<(u16, &'a [u8])>;

    fn next(&mut self) -> Option<Self::Item> {
        let rest = &self.body[self.offset..];
        if rest.is_empty() {
            return None;
        }
        if rest.len() < 4 {
            self.offset = self.body.len();
            return Some(Err(StunError::TruncatedAttribute(0)));
        }

        let attr_type = u16::from_be_bytes([rest[0], rest[1]]);
        let attr_len = u16::from_be_bytes([rest[2], rest[3]]) as usize;
        let Some(value) = rest.get(4..4 + attr_len) else {
            self.offset = self.body.len();
            return Some(Err(StunError::TruncatedAttribute(attr_type)));
        };

        // Values are padded to a multiple of 4 bytes
        let padded = (attr_len + 3) & !3;
        self.offset = (self.offset + 4 + padded).min(self.body.len());
        Some(Ok((attr_type, value)))
    }
}

fn decode_address(attr_type: u16, value: &[u8]) -> Result<SocketAddr> {
    if value.len() < 4 {
        return Err(StunError::TruncatedAttribute(attr_type));
    }
    let port = u16::from_be_bytes([value[2], value[3]]);
    let ip = match value[1] {
        FAMILY_IPV4 => {
            let octets: [u8; 4] = value
                .get(4..8)
                .and_then(|b| b.try_into().ok())
                .ok_or(StunError::TruncatedAttribute(attr_type))?;
            IpAddr::V4(Ipv4Addr::from(octets))
        }
        FAMILY_IPV6 => {
            let octets: [u8; 16] = value
                .get(4..20)
                .and_then(|b| b.try_into().ok())
                .ok_or(StunError::TruncatedAttribute(attr_type))?;
            IpAddr::V6(Ipv6Addr::from(octets))
        }
        other => return Err(StunError::UnknownFamily(other)),
    };
    Ok(SocketAddr::new(ip, port))
}

fn decode_xor_address(attr_type: u16, value: &[u8], id: &TransactionId) -> Result<SocketAddr> {
    let masked = decode_address(attr_type, value)?;
    Ok(xor_socket_addr(masked, id))
}

/// XOR an address with the cookie (and transaction id for IPv6)
///
/// The operation is its own inverse, so it both encodes and decodes.
fn xor_socket_addr(addr: SocketAddr, id: &TransactionId) -> SocketAddr {
    let cookie = MAGIC_COOKIE.to_be_bytes();
    let port = addr.port() ^ (MAGIC_COOKIE >> 16) as u16;
    let ip = match addr.ip() {
        IpAddr::V4(v4) => {
            let mut octets = v4.octets();
            for (byte, mask) in octets.iter_mut().zip(cookie.iter()) {
                *byte ^= mask;
            }
            IpAddr::V4(Ipv4Addr::from(octets))
        }
        IpAddr::V6(v6) => {
            let mut octets = v6.octets();
            let mask = cookie.iter().chain(id.as_bytes().iter());
            for (byte, mask) in octets.iter_mut().zip(mask) {
                *byte ^= mask;
            }
            IpAddr::V6(Ipv6Addr::from(octets))
        }
    };
    SocketAddr::new(ip, port)
}

fn decode_error_code(value: &[u8]) -> Result<StunError> {
    if value.len() < 4 {
        return Err(StunError::TruncatedAttribute(ATTR_ERROR_CODE));
    }
    let class = (value[2] & 0x07) as u16;
    let number = value[3] as u16;
    let reason = String::from_utf8_lossy(&value[4..]).trim().to_string();
    Ok(StunError::ErrorResponse {
        code: class * 100 + number,
        reason,
    })
}

/// Encoders for server-side messages, used by tests to play the peer
#[cfg(test)]
pub(crate) mod server {
    use super::*;

    fn address_value(addr: SocketAddr) -> Vec<u8> {
        let mut value = vec![0u8];
        match addr.ip() {
            IpAddr::V4(v4) => {
                value.push(FAMILY_IPV4);
                value.extend_from_slice(&addr.port().to_be_bytes());
                value.extend_from_slice(&v4.octets());
            }
            IpAddr::V6(v6) => {
                value.push(FAMILY_IPV6);
                value.extend_from_slice(&addr.port().to_be_bytes());
                value.extend_from_slice(&v6.octets());
            }
        }
        value
    }

    fn message(message_type: u16, id: &TransactionId, attrs: &[(u16, Vec<u8>)]) -> Vec<u8> {
        let mut body = Vec::new();
        for (attr_type, value) in attrs {
            body.extend_from_slice(&attr_type.to_be_bytes());
            body.extend_from_slice(&(value.len() as u16).to_be_bytes());
            body.extend_from_slice(value);
            while body.len() % 4 != 0 {
                body.push(0);
            }
        }
        let mut out = encode_header(message_type, body.len() as u16, id).to_vec();
        out.extend_from_slice(&body);
        out
    }

    pub(crate) fn xor_mapped_success(id: &TransactionId, addr: SocketAddr) -> Vec<u8> {
        let value = address_value(xor_socket_addr(addr, id));
        message(BINDING_SUCCESS, id, &[(ATTR_XOR_MAPPED_ADDRESS, value)])
    }

    pub(crate) fn mapped_success(id: &TransactionId, addr: SocketAddr) -> Vec<u8> {
        message(BINDING_SUCCESS, id, &[(ATTR_MAPPED_ADDRESS, address_value(addr))])
    }

    pub(crate) fn both_success(id: &TransactionId, mapped: SocketAddr, xor: SocketAddr) -> Vec<u8> {
        message(
            BINDING_SUCCESS,
            id,
            &[
                (ATTR_MAPPED_ADDRESS, address_value(mapped)),
                (ATTR_XOR_MAPPED_ADDRESS, address_value(xor_socket_addr(xor, id))),
            ],
        )
    }

    pub(crate) fn error_response(id: &TransactionId, code: u16, reason: &str) -> Vec<u8> {
        let mut value = vec![0u8, 0u8, (code / 100) as u8, (code % 100) as u8];
        value.extend_from_slice(reason.as_bytes());
        message(BINDING_ERROR, id, &[(ATTR_ERROR_CODE, value)])
    }

    pub(crate) fn empty_success(id: &TransactionId) -> Vec<u8> {
        message(BINDING_SUCCESS, id, &[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id() -> TransactionId {
        TransactionId::from_bytes([1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12])
    }

    #[test]
    fn test_binding_request_layout() {
        let request = BindingRequest::new();
        let bytes = request.encode();
        assert_eq!(&bytes[0..2], &[0x00, 0x01]);
        assert_eq!(&bytes[2..4], &[0x00, 0x00]);
        assert_eq!(&bytes[4..8], &[0x21, 0x12, 0xA4, 0x42]);
        assert_eq!(&bytes[8..20], request.transaction_id().as_bytes());
        assert_eq!(peek_transaction_id(&bytes), Some(*request.transaction_id()));
    }

    #[test]
    fn test_random_ids_differ() {
        assert_ne!(TransactionId::random(), TransactionId::random());
    }

    #[test]
    fn test_parse_xor_mapped_ipv4() {
        let addr: SocketAddr = "203.0.113.7:54321".parse().unwrap();
        let reply = server::xor_mapped_success(&id(), addr);
        assert_eq!(parse_binding_response(&reply, &id()).unwrap(), addr);
    }

    #[test]
    fn test_parse_xor_mapped_ipv6() {
        let addr: SocketAddr = "[2001:db8::42]:3478".parse().unwrap();
        let reply = server::xor_mapped_success(&id(), addr);
        assert_eq!(parse_binding_response(&reply, &id()).unwrap(), addr);
    }

    #[test]
    fn test_rfc5769_ipv4_vector() {
        // RFC 5769 section 2.2, stripped of SOFTWARE/FINGERPRINT/INTEGRITY
        let id = TransactionId::from_bytes([
            0xb7, 0xe7, 0xa7, 0x01, 0xbc, 0x34, 0xd6, 0x86, 0xfa, 0x87, 0xdf, 0xae,
        ]);
        let mut reply = vec![0x01, 0x01, 0x00, 0x0c, 0x21, 0x12, 0xa4, 0x42];
        reply.extend_from_slice(id.as_bytes());
        reply.extend_from_slice(&[
            0x00, 0x20, 0x00, 0x08, 0x00, 0x01, 0xa1, 0x47, 0xe1, 0x12, 0xa6, 0x43,
        ]);
        let addr = parse_binding_response(&reply, &id).unwrap();
        assert_eq!(addr, "192.0.2.1:32853".parse().unwrap());
    }

    #[test]
    fn test_falls_back_to_mapped_address() {
        let addr: SocketAddr = "198.51.100.9:1000".parse().unwrap();
        let reply = server::mapped_success(&id(), addr);
        assert_eq!(parse_binding_response(&reply, &id()).unwrap(), addr);
    }

    #[test]
    fn test_prefers_xor_mapped_address() {
        let mapped: SocketAddr = "10.0.0.1:1000".parse().unwrap();
        let xor: SocketAddr = "198.51.100.9:1000".parse().unwrap();
        let reply = server::both_success(&id(), mapped, xor);
        assert_eq!(parse_binding_response(&reply, &id()).unwrap(), xor);
    }

    #[test]
    fn test_error_response() {
        let reply = server::error_response(&id(), 420, "Unknown Attribute");
        match parse_binding_response(&reply, &id()) {
            Err(StunError::ErrorResponse { code, reason }) => {
                assert_eq!(code, 420);
                assert_eq!(reason, "Unknown Attribute");
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_transaction_mismatch() {
        let addr: SocketAddr = "203.0.113.7:1".parse().unwrap();
        let reply = server::xor_mapped_success(&id(), addr);
        let other = TransactionId::from_bytes([0; 12]);
        assert!(matches!(
            parse_binding_response(&reply, &other),
            Err(StunError::TransactionMismatch)
        ));
    }

    #[test]
    fn test_rejects_malformed_input() {
        assert!(matches!(
            parse_binding_response(&[0u8; 4], &id()),
            Err(StunError::TooShort(4))
        ));

        let addr: SocketAddr = "203.0.113.7:1".parse().unwrap();
        let mut reply = server::xor_mapped_success(&id(), addr);
        reply[4] = 0;
        assert!(matches!(
            parse_binding_response(&reply, &id()),
            Err(StunError::NotStun)
        ));

        let mut reply = server::xor_mapped_success(&id(), addr);
        reply.truncate(HEADER_LEN + 4);
        assert!(matches!(
            parse_binding_response(&reply, &id()),
            Err(StunError::LengthMismatch { .. })
        ));

        let reply = server::empty_success(&id());
        assert!(matches!(
            parse_binding_response(&reply, &id()),
            Err(StunError::NoMappedAddress)
        ));

        // A request is not a valid reply
        let mut request = encode_header(BINDING_REQUEST, 0, &id()).to_vec();
        assert!(matches!(
            parse_binding_response(&request, &id()),
            Err(StunError::UnexpectedType(BINDING_REQUEST))
        ));
        request[0] = 0xC0;
        assert!(matches!(
            parse_binding_response(&request, &id()),
            Err(StunError::NotStun)
        ));
    }

    #[test]
    fn test_truncated_attribute() {
        let mut reply = encode_header(BINDING_SUCCESS, 8, &id()).to_vec();
        // XOR-MAPPED-ADDRESS claiming 8 bytes, only 4 present
        reply.extend_from_slice(&[0x00, 0x20, 0x00, 0x08, 0x00, 0x01, 0x00, 0x00]);
        assert!(matches!(
            parse_binding_response(&reply, &id()),
            Err(StunError::TruncatedAttribute(ATTR_XOR_MAPPED_ADDRESS))
        ));
    }
}
