//! TCP segment unit

use crate::checksum::transport_checksum_v6;
use crate::pdu::Pdu;
use crate::raw::RawPdu;
use crate::registry::ip_proto;
use wirecraft_core::{Error, Result, SliceReader, SliceWriter};

/// TCP flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TcpFlags {
    pub fin: bool,
    pub syn: bool,
    pub rst: bool,
    pub psh: bool,
    pub ack: bool,
    pub urg: bool,
    pub ece: bool,
    pub cwr: bool,
}

impl TcpFlags {
    /// No flags set
    pub const NONE: TcpFlags = TcpFlags {
        fin: false,
        syn: false,
        rst: false,
        psh: false,
        ack: false,
        urg: false,
        ece: false,
        cwr: false,
    };

    /// SYN flag (connection initiation)
    pub const SYN: TcpFlags = TcpFlags {
        syn: true,
        ..Self::NONE
    };

    /// SYN+ACK flags
    pub const SYN_ACK: TcpFlags = TcpFlags {
        syn: true,
        ack: true,
        ..Self::NONE
    };

    /// ACK flag
    pub const ACK: TcpFlags = TcpFlags {
        ack: true,
        ..Self::NONE
    };

    /// RST flag
    pub const RST: TcpFlags = TcpFlags {
        rst: true,
        ..Self::NONE
    };

    /// Convert flags to the wire byte
    pub fn to_u8(self) -> u8 {
        let mut flags = 0u8;
        if self.fin {
            flags |= 0x01;
        }
        if self.syn {
            flags |= 0x02;
        }
        if self.rst {
            flags |= 0x04;
        }
        if self.psh {
            flags |= 0x08;
        }
        if self.ack {
            flags |= 0x10;
        }
        if self.urg {
            flags |= 0x20;
        }
        if self.ece {
            flags |= 0x40;
        }
        if self.cwr {
            flags |= 0x80;
        }
        flags
    }

    /// Parse flags from the wire byte
    pub fn from_u8(value: u8) -> Self {
        TcpFlags {
            fin: value & 0x01 != 0,
            syn: value & 0x02 != 0,
            rst: value & 0x04 != 0,
            psh: value & 0x08 != 0,
            ack: value & 0x10 != 0,
            urg: value & 0x20 != 0,
            ece: value & 0x40 != 0,
            cwr: value & 0x80 != 0,
        }
    }
}

/// TCP segment
#[derive(Debug, Clone)]
pub struct Tcp {
    /// Source port
    pub src_port: u16,
    /// Destination port
    pub dst_port: u16,
    /// Sequence number
    pub seq: u32,
    /// Acknowledgment number
    pub ack: u32,
    /// TCP flags
    pub flags: TcpFlags,
    /// Window size
    pub window: u16,
    /// Checksum (recomputed on serialize under an IPv6 parent)
    pub checksum: u16,
    /// Urgent pointer
    pub urgent_pointer: u16,
    /// Raw option bytes, padded to a 4-byte boundary
    pub options: Vec<u8>,
    pub(crate) inner: Option<Box<Pdu>>,
}

impl Tcp {
    /// Minimum TCP header size (without options)
    pub const MIN_HEADER_SIZE: usize = 20;

    /// Create a new segment shell
    pub fn new(src_port: u16, dst_port: u16) -> Self {
        Tcp {
            src_port,
            dst_port,
            seq: 0,
            ack: 0,
            flags: TcpFlags::NONE,
            window: 65535,
            checksum: 0,
            urgent_pointer: 0,
            options: Vec::new(),
            inner: None,
        }
    }

    /// Set option bytes, padding to a 4-byte boundary
    pub fn set_options(&mut self, options: Vec<u8>) {
        let padded_len = (options.len() + 3) & !3;
        let mut padded = options;
        padded.resize(padded_len, 0);
        self.options = padded;
    }

    /// Parse a segment; the payload becomes an opaque inner unit
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let mut r = SliceReader::new(data);
        let src_port = r.read_u16_be()?;
        let dst_port = r.read_u16_be()?;
        let seq = r.read_u32_be()?;
        let ack = r.read_u32_be()?;
        let offset_and_reserved = r.read_u8()?;
        let flags = TcpFlags::from_u8(r.read_u8()?);
        let window = r.read_u16_be()?;
        let checksum = r.read_u16_be()?;
        let urgent_pointer = r.read_u16_be()?;

        let header_len = ((offset_and_reserved >> 4) as usize) * 4;
        if header_len < Self::MIN_HEADER_SIZE {
            return Err(Error::malformed("TCP data offset below minimum"));
        }
        let options = r.read_slice(header_len - Self::MIN_HEADER_SIZE)?.to_vec();

        let payload = r.rest();
        let inner = if payload.is_empty() {
            None
        } else {
            Some(Box::new(Pdu::Raw(RawPdu::from_bytes(payload))))
        };

        Ok(Tcp {
            src_port,
            dst_port,
            seq,
            ack,
            flags,
            window,
            checksum,
            urgent_pointer,
            options,
            inner,
        })
    }

    /// Exact serialized size of this header
    pub fn header_size(&self) -> u32 {
        (Self::MIN_HEADER_SIZE + self.options.len()) as u32
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
        let hs = self.header_size() as usize;
        let data_offset = (hs / 4) as u8;
        {
            let mut w = SliceWriter::new(&mut buf[..hs]);
            w.put_u16_be(self.src_port);
            w.put_u16_be(self.dst_port);
            w.put_u32_be(self.seq);
            w.put_u32_be(self.ack);
            w.put_u8(data_offset << 4);
            w.put_u8(self.flags.to_u8());
            w.put_u16_be(self.window);
            w.put_u16_be(0); // checksum patched below
            w.put_u16_be(self.urgent_pointer);
            w.put_slice(&self.options);
        }
        // Pseudo-header checksum over the whole segment, peeking at the
        // parent for its addresses
        if let Some(Pdu::Ipv6(ip)) = parent {
            self.checksum = transport_checksum_v6(ip.src, ip.dst, ip_proto::TCP, buf);
        }
        buf[16..18].copy_from_slice(&self.checksum.to_be_bytes());
    }
}
