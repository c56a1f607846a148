//! LLC/SNAP encapsulation unit
//!
//! An 802.2 LLC header in unnumbered-information mode followed by the SNAP
//! extension: DSAP/SSAP 0xAA, control 0x03, a 3-byte OUI and a 2-byte
//! protocol id. 802.11 data frames and 802.3 frames carry their payload in
//! this unit.

use crate::ipv6::Ipv6;
use crate::pdu::{Pdu, PduKind};
use crate::raw::RawPdu;
use wirecraft_core::{Result, SliceReader, SliceWriter};

/// OUI (Organizationally Unique Identifier) - 3 bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Oui(pub [u8; 3]);

impl Oui {
    /// RFC 1042 OUI (0x000000) - encapsulated Ethernet protocols
    pub const RFC_1042: Oui = Oui([0x00, 0x00, 0x00]);

    /// Create a new OUI
    pub fn new(bytes: [u8; 3]) -> Self {
        Oui(bytes)
    }
}

/// LLC/SNAP frame
#[derive(Debug, Clone)]
pub struct Snap {
    /// Organizationally Unique Identifier
    pub oui: Oui,
    /// SNAP protocol id (EtherType space for the RFC 1042 OUI)
    pub protocol_id: u16,
    pub(crate) inner: Option<Box<Pdu>>,
}

impl Snap {
    /// LLC + SNAP header size
    pub const HEADER_SIZE: usize = 8;

    const DSAP_SNAP: u8 = 0xAA;
    const SSAP_SNAP: u8 = 0xAA;
    const CONTROL_UI: u8 = 0x03;

    /// Create a new frame shell
    pub fn new(oui: Oui, protocol_id: u16) -> Self {
        Snap {
            oui,
            protocol_id,
            inner: None,
        }
    }

    /// Parse a frame, dissecting the payload by protocol id
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let mut r = SliceReader::new(data);
        r.skip(3)?; // dsap, ssap, control
        let mut oui = [0u8; 3];
        r.copy_into(&mut oui)?;
        let protocol_id = r.read_u16_be()?;
        let rest = r.rest();

        let inner = match protocol_id {
            0x86DD => Pdu::Ipv6(Ipv6::from_bytes(rest)?),
            _ => Pdu::Raw(RawPdu::from_bytes(rest)),
        };

        Ok(Snap {
            oui: Oui(oui),
            protocol_id,
            inner: Some(Box::new(inner)),
        })
    }

    /// Exact serialized size of this header
    pub fn header_size(&self) -> u32 {
        Self::HEADER_SIZE as u32
    }

    /// LLC has no addressing; defer to the inner unit
    pub fn matches_response(&self, bytes: &[u8]) -> bool {
        if bytes.len() < Self::HEADER_SIZE {
            return false;
        }
        match &self.inner {
            Some(inner) => inner.matches_response(&bytes[Self::HEADER_SIZE..]),
            None => true,
        }
    }

    pub(crate) fn write_header(&mut self, buf: &mut [u8], _parent: Option<&Pdu>) {
        if let Some(inner) = &self.inner {
            if inner.kind() == PduKind::Ipv6 {
                self.protocol_id = 0x86DD;
            }
        }
        let mut w = SliceWriter::new(&mut buf[..Self::HEADER_SIZE]);
        w.put_u8(Self::DSAP_SNAP);
        w.put_u8(Self::SSAP_SNAP);
        w.put_u8(Self::CONTROL_UI);
        w.put_slice(&self.oui.0);
        w.put_u16_be(self.protocol_id);
    }
}
