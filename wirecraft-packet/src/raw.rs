//! Opaque payload unit.
//!
//! `RawPdu` is the fallback at the end of every dispatch chain: whatever no
//! registered parser claims is carried verbatim. It never owns an inner
//! unit.

use crate::pdu::Pdu;

/// Opaque payload bytes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawPdu {
    /// Payload data
    pub payload: Vec<u8>,
}

impl RawPdu {
    /// Create a raw unit from owned bytes
    pub fn new(payload: Vec<u8>) -> Self {
        RawPdu { payload }
    }

    /// Create a raw unit copying from a buffer; never fails
    pub fn from_bytes(data: &[u8]) -> Self {
        RawPdu {
            payload: data.to_vec(),
        }
    }

    /// Exact serialized size
    pub fn header_size(&self) -> u32 {
        self.payload.len() as u32
    }

    /// An opaque payload cannot reject a reply
    pub fn matches_response(&self, _bytes: &[u8]) -> bool {
        true
    }

    pub(crate) fn write_header(&mut self, buf: &mut [u8], _parent: Option<&Pdu>) {
        buf[..self.payload.len()].copy_from_slice(&self.payload);
    }
}
