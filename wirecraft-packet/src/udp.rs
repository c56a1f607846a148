//! UDP datagram unit

use crate::checksum::transport_checksum_v6;
use crate::dns::Dns;
use crate::pdu::Pdu;
use crate::raw::RawPdu;
use crate::registry::ip_proto;
use tracing::trace;
use wirecraft_core::{Result, SliceReader, SliceWriter};

/// Well-known UDP ports
pub mod ports {
    pub const DNS: u16 = 53;
    pub const DHCP_SERVER: u16 = 67;
    pub const DHCP_CLIENT: u16 = 68;
    pub const NTP: u16 = 123;
}

/// UDP datagram
#[derive(Debug, Clone)]
pub struct Udp {
    /// Source port
    pub src_port: u16,
    /// Destination port
    pub dst_port: u16,
    /// Length field (header + payload, recomputed on serialize)
    pub length: u16,
    /// Checksum (recomputed on serialize under an IPv6 parent)
    pub checksum: u16,
    pub(crate) inner: Option<Box<Pdu>>,
}

impl Udp {
    /// UDP header size
    pub const HEADER_SIZE: usize = 8;

    /// Create a new datagram shell
    pub fn new(src_port: u16, dst_port: u16) -> Self {
        Udp {
            src_port,
            dst_port,
            length: Self::HEADER_SIZE as u16,
            checksum: 0,
            inner: None,
        }
    }

    /// Parse a datagram. A payload on the DNS port is dissected as DNS
    /// (falling back to an opaque unit when that fails); anything else is
    /// carried opaque.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let mut r = SliceReader::new(data);
        let src_port = r.read_u16_be()?;
        let dst_port = r.read_u16_be()?;
        let length = r.read_u16_be()?;
        let checksum = r.read_u16_be()?;

        let payload = r.rest();
        let inner = if payload.is_empty() {
            None
        } else if src_port == ports::DNS || dst_port == ports::DNS {
            match Dns::from_bytes(payload) {
                Ok(dns) => Some(Box::new(Pdu::Dns(dns))),
                Err(err) => {
                    trace!(%err, "payload on DNS port failed to dissect, keeping opaque");
                    Some(Box::new(Pdu::Raw(RawPdu::from_bytes(payload))))
                }
            }
        } else {
            Some(Box::new(Pdu::Raw(RawPdu::from_bytes(payload))))
        };

        Ok(Udp {
            src_port,
            dst_port,
            length,
            checksum,
            inner,
        })
    }

    /// Exact serialized size of this header
    pub fn header_size(&self) -> u32 {
        Self::HEADER_SIZE as u32
    }

    /// Port symmetry decides a candidate reply
    pub fn matches_response(&self, bytes: &[u8]) -> bool {
        if bytes.len() < 4 {
            return false;
        }
        let reply_src = u16::from_be_bytes([bytes[0], bytes[1]]);
        let reply_dst = u16::from_be_bytes([bytes[2], bytes[3]]);
        reply_src == self.dst_port && reply_dst == self.src_port
    }

    pub(crate) fn write_header(&mut self, buf: &mut [u8], parent: Option<&Pdu>) {
        self.length = buf.len() as u16;
        {
            let mut w = SliceWriter::new(&mut buf[..Self::HEADER_SIZE]);
            w.put_u16_be(self.src_port);
            w.put_u16_be(self.dst_port);
            w.put_u16_be(self.length);
            w.put_u16_be(0); // checksum patched below
        }
        // Mandatory checksum under IPv6; zero means "none", so an all-zero
        // result is transmitted as 0xffff
        if let Some(Pdu::Ipv6(ip)) = parent {
            let mut checksum = transport_checksum_v6(ip.src, ip.dst, ip_proto::UDP, buf);
            if checksum == 0 {
                checksum = 0xffff;
            }
            self.checksum = checksum;
        }
        buf[6..8].copy_from_slice(&self.checksum.to_be_bytes());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdu::PduKind;

    #[test]
    fn test_parse_opaque_payload() {
        let mut data = Vec::new();
        data.extend_from_slice(&1234u16.to_be_bytes());
        data.extend_from_slice(&5678u16.to_be_bytes());
        data.extend_from_slice(&12u16.to_be_bytes());
        data.extend_from_slice(&0u16.to_be_bytes());
        data.extend_from_slice(&[1, 2, 3, 4]);

        let udp = Udp::from_bytes(&data).unwrap();
        assert_eq!(udp.src_port, 1234);
        assert_eq!(udp.dst_port, 5678);
        assert_eq!(udp.length, 12);
        assert_eq!(
            udp.inner.as_ref().map(|p| p.kind()),
            Some(PduKind::Raw)
        );
    }

    #[test]
    fn test_port_53_dispatches_dns() {
        let mut dns = Dns::new();
        dns.set_id(0xbeef);
        let mut chain = Pdu::from(Udp::new(40000, ports::DNS)) / Pdu::from(dns);
        let wire = chain.serialize();

        let parsed = Udp::from_bytes(&wire).unwrap();
        let inner = parsed.inner.as_ref().unwrap();
        assert_eq!(inner.kind(), PduKind::Dns);
        match inner.as_ref() {
            Pdu::Dns(dns) => assert_eq!(dns.id(), 0xbeef),
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_length_field_recomputed() {
        let mut chain =
            Pdu::from(Udp::new(1, 2)) / Pdu::from(RawPdu::new(vec![0u8; 16]));
        let wire = chain.serialize();
        assert_eq!(u16::from_be_bytes([wire[4], wire[5]]), 24);
    }

    #[test]
    fn test_truncated_header() {
        assert!(Udp::from_bytes(&[0u8; 7]).is_err());
    }
}
