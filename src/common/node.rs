//! Struct and implementation of a remote node known to the routing table.
use std::{
    convert::TryInto,
    net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr},
    time::Instant,
};

use crate::common::{Id, ID_SIZE};
use crate::health::NodeActivity;
use crate::{Error, Result};

const COMPACT_V4_SIZE: usize = ID_SIZE + 6;
const COMPACT_V6_SIZE: usize = ID_SIZE + 18;

#[derive(Debug, Clone, PartialEq)]
/// A remote node and what we observed from it.
pub struct Node {
    id: Id,
    address: SocketAddr,

    /// Write token this node issued to us for later `put` requests.
    token: Option<Box<[u8]>>,
    /// [BEP_0043](https://www.bittorrent.org/beps/bep_0043.html) read-only node.
    read_only: bool,

    last_query_received_at: Option<Instant>,
    last_response_received_at: Option<Instant>,

    messages_received: u64,
    consecutive_failures: u32,
}

impl Node {
    /// Creates a new Node from an id and socket address.
    pub fn new(id: Id, address: SocketAddr) -> Node {
        Node {
            id,
            address,
            token: None,
            read_only: false,
            last_query_received_at: None,
            last_response_received_at: None,
            messages_received: 0,
            consecutive_failures: 0,
        }
    }

    // === Options ===

    pub fn with_read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    // === Getters ===

    pub fn id(&self) -> &Id {
        &self.id
    }

    pub fn address(&self) -> SocketAddr {
        self.address
    }

    pub fn token(&self) -> Option<&[u8]> {
        self.token.as_deref()
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    pub fn messages_received(&self) -> u64 {
        self.messages_received
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    // === Public Methods ===

    /// Record a query received from this node.
    pub fn received_query(&mut self, at: Instant) {
        advance(&mut self.last_query_received_at, at);
        self.received();
    }

    /// Record a response received from this node.
    pub fn received_response(&mut self, at: Instant) {
        advance(&mut self.last_response_received_at, at);
        self.received();
    }

    /// Record a request to this node that timed out.
    pub fn failed_to_respond(&mut self) {
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
    }

    pub fn set_token(&mut self, token: &[u8]) {
        self.token = Some(token.into());
    }

    /// Returns `true` if both the id and the address match.
    pub fn same_identity(&self, id: &Id, address: SocketAddr) -> bool {
        &self.id == id && self.address == address
    }

    /// Returns `true` if this node's id is valid for its IP, as defined in
    /// [BEP_0042](https://www.bittorrent.org/beps/bep_0042.html).
    pub fn is_secure(&self) -> bool {
        self.id.is_valid_for_ip(self.address.ip())
    }

    /// Snapshot of the liveness fields used by [crate::health].
    pub fn activity(&self) -> NodeActivity {
        NodeActivity {
            last_query_received_at: self.last_query_received_at,
            last_response_received_at: self.last_response_received_at,
            consecutive_failures: self.consecutive_failures,
            secure: self.is_secure(),
        }
    }

    /// Id and address, as sent in `nodes` fields.
    pub fn to_wire_info(&self) -> NodeInfo {
        NodeInfo {
            id: self.id,
            address: self.address,
        }
    }

    // === Private Methods ===

    fn received(&mut self) {
        self.messages_received = self.messages_received.saturating_add(1);
        self.consecutive_failures = 0;
    }
}

/// Timestamps only move forward.
fn advance(field: &mut Option<Instant>, at: Instant) {
    if field.map_or(true, |current| at > current) {
        *field = Some(at);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// A node's id and address in compact form.
pub struct NodeInfo {
    pub id: Id,
    pub address: SocketAddr,
}

impl NodeInfo {
    /// Encode as `id ‖ ip ‖ port` (26 bytes for IPv4, 38 bytes for IPv6).
    pub fn to_compact(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(COMPACT_V6_SIZE);

        bytes.extend_from_slice(self.id.as_bytes());

        match self.address.ip() {
            IpAddr::V4(ip) => bytes.extend_from_slice(&ip.octets()),
            IpAddr::V6(ip) => bytes.extend_from_slice(&ip.octets()),
        }

        bytes.extend_from_slice(&self.address.port().to_be_bytes());

        bytes
    }

    /// Decode a compact node info, failing on any width other than 26 or 38 bytes.
    pub fn from_compact<T: AsRef<[u8]>>(bytes: T) -> Result<NodeInfo> {
        let bytes = bytes.as_ref();

        let ip = match bytes.len() {
            COMPACT_V4_SIZE => {
                let octets: [u8; 4] = bytes[ID_SIZE..ID_SIZE + 4]
                    .try_into()
                    .map_err(|_| Error::InvalidNodeInfoSize(bytes.len()))?;
                IpAddr::V4(Ipv4Addr::from(octets))
            }
            COMPACT_V6_SIZE => {
                let octets: [u8; 16] = bytes[ID_SIZE..ID_SIZE + 16]
                    .try_into()
                    .map_err(|_| Error::InvalidNodeInfoSize(bytes.len()))?;
                IpAddr::V6(Ipv6Addr::from(octets))
            }
            _ => return Err(Error::InvalidNodeInfoSize(bytes.len())),
        };

        let port_bytes: [u8; 2] = bytes[bytes.len() - 2..]
            .try_into()
            .map_err(|_| Error::InvalidNodeInfoSize(bytes.len()))?;

        Ok(NodeInfo {
            id: Id::from_bytes(&bytes[..ID_SIZE])?,
            address: SocketAddr::new(ip, u16::from_be_bytes(port_bytes)),
        })
    }
}
