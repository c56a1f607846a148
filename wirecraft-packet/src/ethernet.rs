//! Ethernet II frame unit

use crate::ipv6::Ipv6;
use crate::pdu::{Pdu, PduKind};
use crate::raw::RawPdu;
use crate::snap::Snap;
use std::fmt;
use wirecraft_core::{Error, HwAddr, Result, SliceReader, SliceWriter};

/// Common EtherType values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EtherType {
    /// IPv4 (0x0800)
    IPv4,
    /// ARP (0x0806)
    ARP,
    /// VLAN-tagged frame (0x8100)
    VLAN,
    /// IPv6 (0x86DD)
    IPv6,
    /// LLC/SNAP encapsulation - the length field is used instead
    LLC,
    /// Custom EtherType
    Custom(u16),
}

impl EtherType {
    /// Convert to the on-wire u16 value
    pub fn to_u16(self) -> u16 {
        match self {
            EtherType::IPv4 => 0x0800,
            EtherType::ARP => 0x0806,
            EtherType::VLAN => 0x8100,
            EtherType::IPv6 => 0x86DD,
            EtherType::LLC => 0,
            EtherType::Custom(val) => val,
        }
    }

    /// Create from the on-wire u16 value
    pub fn from_u16(value: u16) -> Self {
        match value {
            0x0800 => EtherType::IPv4,
            0x0806 => EtherType::ARP,
            0x8100 => EtherType::VLAN,
            0x86DD => EtherType::IPv6,
            val => EtherType::Custom(val),
        }
    }
}

impl fmt::Display for EtherType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EtherType::IPv4 => write!(f, "IPv4"),
            EtherType::ARP => write!(f, "ARP"),
            EtherType::VLAN => write!(f, "VLAN"),
            EtherType::IPv6 => write!(f, "IPv6"),
            EtherType::LLC => write!(f, "LLC"),
            EtherType::Custom(val) => write!(f, "0x{:04X}", val),
        }
    }
}

/// Ethernet II frame
#[derive(Debug, Clone)]
pub struct EthernetII {
    /// Destination hardware address
    pub dst: HwAddr,
    /// Source hardware address
    pub src: HwAddr,
    /// EtherType or length field
    pub ethertype: EtherType,
    pub(crate) inner: Option<Box<Pdu>>,
}

impl EthernetII {
    /// Ethernet header size (dst + src + type/length)
    pub const HEADER_SIZE: usize = 14;

    /// Create a new frame shell
    pub fn new(dst: HwAddr, src: HwAddr) -> Self {
        EthernetII {
            dst,
            src,
            ethertype: EtherType::Custom(0),
            inner: None,
        }
    }

    /// Parse a frame, dissecting the payload by EtherType
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let mut r = SliceReader::new(data);
        let dst = HwAddr::from_slice(r.read_slice(6)?)
            .ok_or_else(|| Error::malformed("bad destination address"))?;
        let src = HwAddr::from_slice(r.read_slice(6)?)
            .ok_or_else(|| Error::malformed("bad source address"))?;
        let type_or_length = r.read_u16_be()?;
        let rest = r.rest();

        // Values up to 1500 are an 802.3 length field announcing LLC
        let (ethertype, inner) = if type_or_length <= 1500 {
            (EtherType::LLC, Pdu::Snap(Snap::from_bytes(rest)?))
        } else {
            match EtherType::from_u16(type_or_length) {
                EtherType::IPv6 => (EtherType::IPv6, Pdu::Ipv6(Ipv6::from_bytes(rest)?)),
                other => (other, Pdu::Raw(RawPdu::from_bytes(rest))),
            }
        };

        Ok(EthernetII {
            dst,
            src,
            ethertype,
            inner: Some(Box::new(inner)),
        })
    }

    /// Exact serialized size of this header
    pub fn header_size(&self) -> u32 {
        Self::HEADER_SIZE as u32
    }

    /// A reply must come from where the frame was sent (unless that was
    /// broadcast) and be addressed to the frame's source.
    pub fn matches_response(&self, bytes: &[u8]) -> bool {
        if bytes.len() < Self::HEADER_SIZE {
            return false;
        }
        let reply_dst = &bytes[0..6];
        let reply_src = &bytes[6..12];
        if !self.dst.is_broadcast() && self.dst.as_bytes() != reply_src {
            return false;
        }
        if self.src.as_bytes() != reply_dst {
            return false;
        }
        match &self.inner {
            Some(inner) => inner.matches_response(&bytes[Self::HEADER_SIZE..]),
            None => true,
        }
    }

    pub(crate) fn write_header(&mut self, buf: &mut [u8], _parent: Option<&Pdu>) {
        // The type/length slot follows the inner unit's identity
        if let Some(inner) = &self.inner {
            match inner.kind() {
                PduKind::Ipv6 => self.ethertype = EtherType::IPv6,
                PduKind::Snap => self.ethertype = EtherType::LLC,
                _ => {}
            }
        }
        let payload_len = buf.len() - Self::HEADER_SIZE;
        let mut w = SliceWriter::new(&mut buf[..Self::HEADER_SIZE]);
        w.put_slice(self.dst.as_bytes());
        w.put_slice(self.src.as_bytes());
        if self.ethertype == EtherType::LLC {
            w.put_u16_be(payload_len as u16);
        } else {
            w.put_u16_be(self.ethertype.to_u16());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DST: HwAddr = HwAddr([0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff]);
    const SRC: HwAddr = HwAddr([0x00, 0x11, 0x22, 0x33, 0x44, 0x55]);

    #[test]
    fn test_parse_unknown_ethertype_wraps_raw() {
        let mut data = Vec::new();
        data.extend_from_slice(DST.as_bytes());
        data.extend_from_slice(SRC.as_bytes());
        data.extend_from_slice(&0x0806u16.to_be_bytes());
        data.extend_from_slice(&[1, 2, 3, 4]);

        let frame = EthernetII::from_bytes(&data).unwrap();
        assert_eq!(frame.ethertype, EtherType::ARP);
        let inner = frame.inner.as_ref().unwrap();
        assert_eq!(inner.kind(), PduKind::Raw);
        assert_eq!(inner.header_size(), 4);
    }

    #[test]
    fn test_parse_truncated_header() {
        assert!(EthernetII::from_bytes(&[0u8; 13]).is_err());
    }

    #[test]
    fn test_serialize_rewrites_ethertype_for_ipv6() {
        let mut frame = Pdu::from(EthernetII::new(DST, SRC))
            / Pdu::from(Ipv6::new("::2".parse().unwrap(), "::1".parse().unwrap()));
        let wire = frame.serialize();
        assert_eq!(u16::from_be_bytes([wire[12], wire[13]]), 0x86DD);
        assert_eq!(wire.len(), 14 + 40);
    }

    #[test]
    fn test_llc_length_field() {
        let mut frame =
            Pdu::from(EthernetII::new(DST, SRC)) / Pdu::from(Snap::new(crate::snap::Oui::RFC_1042, 0x2000));
        let wire = frame.serialize();
        // Length covers LLC/SNAP header
        assert_eq!(u16::from_be_bytes([wire[12], wire[13]]), 8);
    }

    #[test]
    fn test_matches_response_addresses() {
        let mut data = Vec::new();
        data.extend_from_slice(SRC.as_bytes()); // reply dst = our src
        data.extend_from_slice(DST.as_bytes()); // reply src = our dst
        data.extend_from_slice(&0x0806u16.to_be_bytes());

        let frame = EthernetII::new(DST, SRC);
        assert!(frame.matches_response(&data));

        let mut wrong = data.clone();
        wrong[6] ^= 0xff;
        assert!(!frame.matches_response(&wrong));
    }
}
