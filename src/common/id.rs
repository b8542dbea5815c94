//! Kademlia node Id or a lookup target
use crc::{Crc, CRC_32_ISCSI};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::{
    fmt::{self, Debug, Display, Formatter},
    net::IpAddr,
    str::FromStr,
};

use crate::{Error, Result};

/// The size of node IDs in bytes.
pub const ID_SIZE: usize = 20;

const CASTAGNOLI: Crc<u32> = Crc::<u32>::new(&CRC_32_ISCSI);

const IPV4_MASK: [u8; 4] = [0x03, 0x0f, 0x3f, 0xff];
const IPV6_MASK: [u8; 8] = [0x01, 0x03, 0x07, 0x0f, 0x1f, 0x3f, 0x7f, 0xff];

#[derive(Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
/// Kademlia node Id or a lookup target
pub struct Id(pub [u8; ID_SIZE]);

impl Id {
    pub fn random() -> Id {
        let mut rng = rand::thread_rng();
        let random_bytes: [u8; ID_SIZE] = rng.gen();

        Id(random_bytes)
    }

    /// Create a new Id from some bytes. Returns Err if `bytes` is not of length
    /// [ID_SIZE].
    pub fn from_bytes<T: AsRef<[u8]>>(bytes: T) -> Result<Id> {
        let bytes = bytes.as_ref();
        if bytes.len() != ID_SIZE {
            return Err(Error::InvalidIdSize(bytes.len()));
        }

        let mut tmp: [u8; ID_SIZE] = [0; ID_SIZE];
        tmp.copy_from_slice(bytes);

        Ok(Id(tmp))
    }

    /// Create a random secure Id for the given IP address, as described in
    /// [BEP_0042](https://www.bittorrent.org/beps/bep_0042.html).
    pub fn from_ip(ip: IpAddr) -> Id {
        let mut rng = rand::thread_rng();
        let mut bytes: [u8; ID_SIZE] = rng.gen();

        let crc = secure_prefix(ip, bytes[19]);

        bytes[0] = (crc >> 24) as u8;
        bytes[1] = (crc >> 16) as u8;
        bytes[2] = ((crc >> 8) as u8 & 0xf8) | (bytes[2] & 0x7);

        Id(bytes)
    }

    /// Returns `true` if the first 21 bits of this Id match the
    /// [BEP_0042](https://www.bittorrent.org/beps/bep_0042.html) prefix for `ip`.
    ///
    /// Loopback, private and link-local addresses are exempt.
    pub fn is_valid_for_ip(&self, ip: IpAddr) -> bool {
        if is_local(ip) {
            return true;
        }

        let crc = secure_prefix(ip, self.0[19]);

        self.0[0] == (crc >> 24) as u8
            && self.0[1] == (crc >> 16) as u8
            && self.0[2] & 0xf8 == (crc >> 8) as u8 & 0xf8
    }

    pub fn as_bytes(&self) -> &[u8; ID_SIZE] {
        &self.0
    }
}

/// crc32c of the masked IP octets, with `r` in the top 3 bits of the first octet.
fn secure_prefix(ip: IpAddr, r: u8) -> u32 {
    let mut octets = match ip {
        IpAddr::V4(ip) => {
            let mut octets = ip.octets();
            for (octet, mask) in octets.iter_mut().zip(IPV4_MASK.iter()) {
                *octet &= mask;
            }
            octets.to_vec()
        }
        IpAddr::V6(ip) => {
            let mut octets = [0_u8; 8];
            octets.copy_from_slice(&ip.octets()[..8]);
            for (octet, mask) in octets.iter_mut().zip(IPV6_MASK.iter()) {
                *octet &= mask;
            }
            octets.to_vec()
        }
    };

    octets[0] |= (r & 0x7) << 5;

    CASTAGNOLI.checksum(&octets)
}

fn is_local(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(ip) => ip.is_loopback() || ip.is_private() || ip.is_link_local(),
        IpAddr::V6(ip) => {
            let first = ip.segments()[0];

            ip.is_loopback()
                // fc00::/7
                || first & 0xfe00 == 0xfc00
                // fe80::/10
                || first & 0xffc0 == 0xfe80
        }
    }
}

impl Display for Id {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{:02x}", byte)?;
        }

        Ok(())
    }
}

impl Debug for Id {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Id({})", self)
    }
}

impl FromStr for Id {
    type Err = Error;

    fn from_str(s: &str) -> Result<Id> {
        if s.len() != ID_SIZE * 2 {
            return Err(Error::InvalidIdHex);
        }

        let mut bytes = [0_u8; ID_SIZE];

        for (i, byte) in bytes.iter_mut().enumerate() {
            let pair = s.get(i * 2..i * 2 + 2).ok_or(Error::InvalidIdHex)?;
            *byte = u8::from_str_radix(pair, 16).map_err(|_| Error::InvalidIdHex)?;
        }

        Ok(Id(bytes))
    }
}

impl From<[u8; ID_SIZE]> for Id {
    fn from(bytes: [u8; ID_SIZE]) -> Id {
        Id(bytes)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn from_bytes_wrong_size() {
        assert!(matches!(
            Id::from_bytes([0_u8; 19]),
            Err(Error::InvalidIdSize(19))
        ));
        assert!(Id::from_bytes([7_u8; 20]).is_ok());
    }

    #[test]
    fn hex_roundtrip() {
        let id = Id::random();
        let parsed: Id = id.to_string().parse().unwrap();

        assert_eq!(parsed, id);
        assert!(Id::from_str("zz").is_err());
        assert!(Id::from_str("zzbfbff10c5d6a4ec8a88e4c6ab4c28b95eee401").is_err());
    }

    #[test]
    fn bep42_vectors() {
        let vectors = [
            ("124.31.75.21", "5fbfbff10c5d6a4ec8a88e4c6ab4c28b95eee401"),
            ("21.75.31.124", "5a3ce9c14e7a08645677bbd1cfe7d8f956d53256"),
            ("65.23.51.170", "a5d43220bc8f112a3d426c84764f8c2a1150e616"),
            ("84.124.73.14", "1b0321dd1bb1fe518101ceef99462b947a01ff41"),
            ("43.213.53.83", "e56f6cbf5b7c4be0237986d5243b87aa6d51305a"),
        ];

        for (ip, id) in vectors.iter() {
            let ip: IpAddr = ip.parse().unwrap();
            let id = Id::from_str(id).unwrap();

            assert!(id.is_valid_for_ip(ip), "{} should be valid for {}", id, ip);
        }

        let id = Id::from_str(vectors[0].1).unwrap();
        assert!(!id.is_valid_for_ip(vectors[1].0.parse().unwrap()));
    }

    #[test]
    fn secure_id_from_ip() {
        let ipv4: IpAddr = "84.124.73.14".parse().unwrap();
        let ipv6: IpAddr = "2001:db8:85a3::8a2e:370:7334".parse().unwrap();

        for _ in 0..32 {
            assert!(Id::from_ip(ipv4).is_valid_for_ip(ipv4));
            assert!(Id::from_ip(ipv6).is_valid_for_ip(ipv6));
        }
    }

    #[test]
    fn local_ips_are_exempt() {
        let id = Id::random();

        assert!(id.is_valid_for_ip("127.0.0.1".parse().unwrap()));
        assert!(id.is_valid_for_ip("192.168.1.10".parse().unwrap()));
        assert!(id.is_valid_for_ip("fe80::1".parse().unwrap()));
    }
}
