//! IEEE 802.11 frame family
//!
//! One unit covers the family: the fixed MAC header is shared, a body enum
//! carries the subtype-specific fixed fields (beacon, association
//! request/response, disassociation, QoS data), and management frames
//! append a tagged-parameter list. All multi-byte fields are little-endian
//! on the wire.

use crate::pdu::Pdu;
use crate::raw::RawPdu;
use crate::snap::Snap;
use wirecraft_core::{Error, HwAddr, Result, SliceReader, SliceWriter};

pub mod rsn;
#[cfg(test)]
mod tests;

pub use rsn::{AkmSuite, CipherSuite, RsnInformation};

/// Frame types (frame control bits 2-3)
pub const TYPE_MANAGEMENT: u8 = 0;
pub const TYPE_CONTROL: u8 = 1;
pub const TYPE_DATA: u8 = 2;

/// Frame subtypes (frame control bits 4-7)
pub mod subtype {
    pub const ASSOC_REQUEST: u8 = 0;
    pub const ASSOC_RESPONSE: u8 = 1;
    pub const PROBE_REQUEST: u8 = 4;
    pub const PROBE_RESPONSE: u8 = 5;
    pub const BEACON: u8 = 8;
    pub const DISASSOC: u8 = 10;
    pub const AUTH: u8 = 11;
    pub const DEAUTH: u8 = 12;
    /// Data-frame subtype carrying a QoS control word
    pub const QOS_DATA: u8 = 8;
}

/// Tagged parameter ids
pub mod tags {
    pub const SSID: u8 = 0;
    pub const SUPPORTED_RATES: u8 = 1;
    pub const DS_SET: u8 = 3;
    pub const TIM: u8 = 5;
    pub const COUNTRY: u8 = 7;
    pub const POWER_CAPABILITY: u8 = 33;
    pub const SUPPORTED_CHANNELS: u8 = 36;
    pub const QOS_CAPABILITY: u8 = 46;
    pub const RSN: u8 = 48;
    pub const EXT_SUPPORTED_RATES: u8 = 50;
}

/// Decoded frame-control field
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameControl {
    /// Protocol version, 0 in every published standard
    pub protocol: u8,
    pub frame_type: u8,
    pub subtype: u8,
    pub to_ds: bool,
    pub from_ds: bool,
    pub more_frag: bool,
    pub retry: bool,
    pub power_mgmt: bool,
    pub more_data: bool,
    pub wep: bool,
    pub order: bool,
}

impl FrameControl {
    /// Decode from the little-endian wire value
    pub fn from_u16(value: u16) -> Self {
        let b0 = (value & 0xff) as u8;
        let b1 = (value >> 8) as u8;
        FrameControl {
            protocol: b0 & 0x03,
            frame_type: (b0 >> 2) & 0x03,
            subtype: b0 >> 4,
            to_ds: b1 & 0x01 != 0,
            from_ds: b1 & 0x02 != 0,
            more_frag: b1 & 0x04 != 0,
            retry: b1 & 0x08 != 0,
            power_mgmt: b1 & 0x10 != 0,
            more_data: b1 & 0x20 != 0,
            wep: b1 & 0x40 != 0,
            order: b1 & 0x80 != 0,
        }
    }

    /// Encode to the little-endian wire value
    pub fn to_u16(self) -> u16 {
        let b0 = (self.protocol & 0x03)
            | ((self.frame_type & 0x03) << 2)
            | ((self.subtype & 0x0f) << 4);
        let mut b1 = 0u8;
        if self.to_ds {
            b1 |= 0x01;
        }
        if self.from_ds {
            b1 |= 0x02;
        }
        if self.more_frag {
            b1 |= 0x04;
        }
        if self.retry {
            b1 |= 0x08;
        }
        if self.power_mgmt {
            b1 |= 0x10;
        }
        if self.more_data {
            b1 |= 0x20;
        }
        if self.wep {
            b1 |= 0x40;
        }
        if self.order {
            b1 |= 0x80;
        }
        (b0 as u16) | ((b1 as u16) << 8)
    }
}

/// A tagged parameter: {tag, length, value} with the length implied by the
/// value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dot11Option {
    pub tag: u8,
    pub value: Vec<u8>,
}

impl Dot11Option {
    /// Create a new tagged parameter
    pub fn new(tag: u8, value: Vec<u8>) -> Self {
        Dot11Option { tag, value }
    }
}

/// Fixed beacon body
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BeaconBody {
    pub timestamp: u64,
    pub interval: u16,
    pub capability: u16,
}

/// Fixed association-request body
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AssocRequestBody {
    pub capability: u16,
    pub listen_interval: u16,
}

/// Fixed association-response body
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AssocResponseBody {
    pub capability: u16,
    pub status_code: u16,
    pub aid: u16,
}

/// Fixed disassociation body
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DisassocBody {
    pub reason_code: u16,
}

/// Subtype-specific fixed fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dot11Body {
    /// Header-only frame of any type
    Generic,
    Beacon(BeaconBody),
    AssocRequest(AssocRequestBody),
    AssocResponse(AssocResponseBody),
    Disassoc(DisassocBody),
    /// Plain data frame
    Data,
    QosData {
        qos_control: u16,
    },
}

impl Dot11Body {
    fn fixed_size(&self) -> u32 {
        match self {
            Dot11Body::Generic | Dot11Body::Data => 0,
            Dot11Body::Beacon(_) => 12,
            Dot11Body::AssocRequest(_) => 4,
            Dot11Body::AssocResponse(_) => 6,
            Dot11Body::Disassoc(_) => 2,
            Dot11Body::QosData { .. } => 2,
        }
    }
}

/// IEEE 802.11 frame
#[derive(Debug, Clone)]
pub struct Dot11 {
    pub frame_control: FrameControl,
    pub duration_id: u16,
    pub addr1: HwAddr,
    pub addr2: HwAddr,
    pub addr3: HwAddr,
    /// Fragment number, 4 bits
    pub frag_number: u8,
    /// Sequence number, 12 bits
    pub seq_number: u16,
    /// Fourth address, on the wire iff both DS flags are set
    pub addr4: Option<HwAddr>,
    /// Subtype-specific fixed fields
    pub body: Dot11Body,
    options: Vec<Dot11Option>,
    options_size: u32,
    pub(crate) inner: Option<Box<Pdu>>,
}

impl Dot11 {
    /// Fixed MAC header size (without addr4)
    pub const HEADER_SIZE: usize = 24;

    fn shell(dst: HwAddr, src: HwAddr, frame_type: u8, subtype: u8, body: Dot11Body) -> Self {
        Dot11 {
            frame_control: FrameControl {
                frame_type,
                subtype,
                ..FrameControl::default()
            },
            duration_id: 0,
            addr1: dst,
            addr2: src,
            addr3: HwAddr::ZERO,
            frag_number: 0,
            seq_number: 0,
            addr4: None,
            body,
            options: Vec::new(),
            options_size: 0,
            inner: None,
        }
    }

    /// Create a generic frame shell
    pub fn new(dst: HwAddr, src: HwAddr) -> Self {
        Self::shell(dst, src, TYPE_MANAGEMENT, 0, Dot11Body::Generic)
    }

    /// Create a beacon shell
    pub fn beacon(dst: HwAddr, src: HwAddr) -> Self {
        Self::shell(
            dst,
            src,
            TYPE_MANAGEMENT,
            subtype::BEACON,
            Dot11Body::Beacon(BeaconBody::default()),
        )
    }

    /// Create an association-request shell
    pub fn assoc_request(dst: HwAddr, src: HwAddr) -> Self {
        Self::shell(
            dst,
            src,
            TYPE_MANAGEMENT,
            subtype::ASSOC_REQUEST,
            Dot11Body::AssocRequest(AssocRequestBody::default()),
        )
    }

    /// Create an association-response shell
    pub fn assoc_response(dst: HwAddr, src: HwAddr) -> Self {
        Self::shell(
            dst,
            src,
            TYPE_MANAGEMENT,
            subtype::ASSOC_RESPONSE,
            Dot11Body::AssocResponse(AssocResponseBody::default()),
        )
    }

    /// Create a disassociation shell
    pub fn disassoc(dst: HwAddr, src: HwAddr) -> Self {
        Self::shell(
            dst,
            src,
            TYPE_MANAGEMENT,
            subtype::DISASSOC,
            Dot11Body::Disassoc(DisassocBody::default()),
        )
    }

    /// Create a QoS data frame shell
    pub fn qos_data(dst: HwAddr, src: HwAddr) -> Self {
        Self::shell(
            dst,
            src,
            TYPE_DATA,
            subtype::QOS_DATA,
            Dot11Body::QosData { qos_control: 0 },
        )
    }

    /// Parse a frame, dispatching on the frame-control type and subtype
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() < 2 {
            return Err(Error::malformed("buffer too small for a frame control"));
        }
        let fc = FrameControl::from_u16(u16::from_le_bytes([data[0], data[1]]));
        match (fc.frame_type, fc.subtype) {
            (TYPE_MANAGEMENT, subtype::ASSOC_REQUEST) => Self::parse_assoc_request(data),
            (TYPE_MANAGEMENT, subtype::ASSOC_RESPONSE) => Self::parse_assoc_response(data),
            (TYPE_MANAGEMENT, subtype::BEACON) => Self::parse_beacon(data),
            (TYPE_MANAGEMENT, subtype::DISASSOC) => Self::parse_disassoc(data),
            (TYPE_DATA, subtype::QOS_DATA) => Self::parse_qos_data(data),
            _ => Self::parse_base(data),
        }
    }

    /// Read the fixed MAC header; a short buffer yields a truncated frame
    /// with the missing fields zeroed.
    fn parse_header(data: &[u8]) -> Result<(Self, usize)> {
        if data.len() < 2 {
            return Err(Error::malformed("buffer too small for a frame control"));
        }
        let mut hdr = [0u8; Self::HEADER_SIZE];
        let copied = data.len().min(Self::HEADER_SIZE);
        hdr[..copied].copy_from_slice(&data[..copied]);

        let frame_control = FrameControl::from_u16(u16::from_le_bytes([hdr[0], hdr[1]]));
        let seq_control = u16::from_le_bytes([hdr[22], hdr[23]]);
        let mut unit = Dot11 {
            frame_control,
            duration_id: u16::from_le_bytes([hdr[2], hdr[3]]),
            addr1: HwAddr::from_slice(&hdr[4..10]).unwrap_or(HwAddr::ZERO),
            addr2: HwAddr::from_slice(&hdr[10..16]).unwrap_or(HwAddr::ZERO),
            addr3: HwAddr::from_slice(&hdr[16..22]).unwrap_or(HwAddr::ZERO),
            frag_number: (seq_control & 0x0f) as u8,
            seq_number: seq_control >> 4,
            addr4: None,
            body: Dot11Body::Generic,
            options: Vec::new(),
            options_size: 0,
            inner: None,
        };

        let mut consumed = copied;
        if frame_control.to_ds && frame_control.from_ds && data.len() >= Self::HEADER_SIZE + 6 {
            unit.addr4 = HwAddr::from_slice(&data[24..30]);
            consumed = Self::HEADER_SIZE + 6;
        }
        Ok((unit, consumed))
    }

    fn parse_base(data: &[u8]) -> Result<Self> {
        let (mut unit, offset) = Self::parse_header(data)?;
        if unit.frame_control.frame_type == TYPE_DATA {
            unit.body = Dot11Body::Data;
            if unit.frame_control.subtype < 4 && data.len() > offset {
                let snap = Snap::from_bytes(&data[offset..])?;
                unit.inner = Some(Box::new(Pdu::Snap(snap)));
            }
        }
        Ok(unit)
    }

    fn parse_beacon(data: &[u8]) -> Result<Self> {
        let (mut unit, offset) = Self::parse_header(data)?;
        let mut r = SliceReader::new(&data[offset..]);
        let timestamp = r.read_u64_le()?;
        let interval = r.read_u16_le()?;
        let capability = r.read_u16_le()?;
        unit.body = Dot11Body::Beacon(BeaconBody {
            timestamp,
            interval,
            capability,
        });
        unit.parse_tagged_parameters(r.rest());
        Ok(unit)
    }

    fn parse_assoc_request(data: &[u8]) -> Result<Self> {
        let (mut unit, offset) = Self::parse_header(data)?;
        let mut r = SliceReader::new(&data[offset..]);
        let capability = r.read_u16_le()?;
        let listen_interval = r.read_u16_le()?;
        unit.body = Dot11Body::AssocRequest(AssocRequestBody {
            capability,
            listen_interval,
        });
        unit.parse_tagged_parameters(r.rest());
        Ok(unit)
    }

    fn parse_assoc_response(data: &[u8]) -> Result<Self> {
        let (mut unit, offset) = Self::parse_header(data)?;
        let mut r = SliceReader::new(&data[offset..]);
        let capability = r.read_u16_le()?;
        let status_code = r.read_u16_le()?;
        let aid = r.read_u16_le()?;
        unit.body = Dot11Body::AssocResponse(AssocResponseBody {
            capability,
            status_code,
            aid,
        });
        unit.parse_tagged_parameters(r.rest());
        Ok(unit)
    }

    fn parse_disassoc(data: &[u8]) -> Result<Self> {
        let (mut unit, offset) = Self::parse_header(data)?;
        let mut r = SliceReader::new(&data[offset..]);
        let reason_code = r.read_u16_le()?;
        unit.body = Dot11Body::Disassoc(DisassocBody { reason_code });
        unit.parse_tagged_parameters(r.rest());
        Ok(unit)
    }

    fn parse_qos_data(data: &[u8]) -> Result<Self> {
        let (mut unit, offset) = Self::parse_header(data)?;
        let mut r = SliceReader::new(&data[offset..]);
        let qos_control = r.read_u16_le()?;
        unit.body = Dot11Body::QosData { qos_control };
        let rest = r.rest();
        if !rest.is_empty() {
            let inner = match Snap::from_bytes(rest) {
                Ok(snap) => Pdu::Snap(snap),
                Err(_) => Pdu::Raw(RawPdu::from_bytes(rest)),
            };
            unit.inner = Some(Box::new(inner));
        }
        Ok(unit)
    }

    /// Decode tagged parameters greedily; a declared length overrunning the
    /// buffer ends the scan silently (malformed tails are tolerated).
    fn parse_tagged_parameters(&mut self, mut data: &[u8]) {
        while data.len() >= 2 {
            let tag = data[0];
            let length = data[1] as usize;
            data = &data[2..];
            if length > data.len() {
                return;
            }
            self.add_option(Dot11Option::new(tag, data[..length].to_vec()));
            data = &data[length..];
        }
    }

    /// Append a tagged parameter
    pub fn add_option(&mut self, option: Dot11Option) {
        self.options_size += option.value.len() as u32 + 2;
        self.options.push(option);
    }

    /// First tagged parameter with a matching tag
    pub fn search_option(&self, tag: u8) -> Option<&Dot11Option> {
        self.options.iter().find(|opt| opt.tag == tag)
    }

    /// All tagged parameters in insertion order
    pub fn options(&self) -> &[Dot11Option] {
        &self.options
    }

    /// The SSID tag as a string, for management frames that carry one
    pub fn essid(&self) -> Option<String> {
        self.search_option(tags::SSID)
            .map(|opt| String::from_utf8_lossy(&opt.value).into_owned())
    }

    /// Append an SSID tag
    pub fn set_essid(&mut self, essid: &str) {
        self.add_option(Dot11Option::new(tags::SSID, essid.as_bytes().to_vec()));
    }

    /// Append a DS-parameter-set tag carrying the channel number
    pub fn set_channel(&mut self, channel: u8) {
        self.add_option(Dot11Option::new(tags::DS_SET, vec![channel]));
    }

    /// Append a supported-rates tag. Rates are in Mbit/s, encoded in
    /// 500 kbit/s units rounded up, with the basic-rate bit set.
    pub fn set_supported_rates(&mut self, rates: &[f32]) {
        let encoded = rates
            .iter()
            .map(|rate| 0x80 | ((rate / 0.5).ceil() as u8))
            .collect();
        self.add_option(Dot11Option::new(tags::SUPPORTED_RATES, encoded));
    }

    /// Decode the supported-rates tag, stripping the basic-rate bit
    pub fn supported_rates(&self) -> Option<Vec<f32>> {
        self.search_option(tags::SUPPORTED_RATES).map(|opt| {
            opt.value
                .iter()
                .map(|byte| (byte & 0x7f) as f32 * 0.5)
                .collect()
        })
    }

    /// Append an RSN information tag
    pub fn set_rsn_information(&mut self, info: &RsnInformation) {
        self.add_option(Dot11Option::new(tags::RSN, info.serialize()));
    }

    /// Decode the RSN information tag if present
    pub fn rsn_information(&self) -> Result<Option<RsnInformation>> {
        match self.search_option(tags::RSN) {
            Some(opt) => RsnInformation::parse(&opt.value).map(Some),
            None => Ok(None),
        }
    }

    /// Fixed header, addr4 when both DS flags are set, the subtype body and
    /// the tagged parameters
    pub fn header_size(&self) -> u32 {
        let mut size = Self::HEADER_SIZE as u32 + self.options_size + self.body.fixed_size();
        if self.frame_control.to_ds && self.frame_control.from_ds {
            size += 6;
        }
        size
    }

    /// 802.11 alone carries no request/reply correlation
    pub fn matches_response(&self, _bytes: &[u8]) -> bool {
        false
    }

    pub(crate) fn write_header(&mut self, buf: &mut [u8], _parent: Option<&Pdu>) {
        let hs = self.header_size() as usize;
        let mut w = SliceWriter::new(&mut buf[..hs]);
        w.put_u16_le(self.frame_control.to_u16());
        w.put_u16_le(self.duration_id);
        w.put_slice(self.addr1.as_bytes());
        w.put_slice(self.addr2.as_bytes());
        w.put_slice(self.addr3.as_bytes());
        w.put_u16_le((self.seq_number << 4) | (self.frag_number & 0x0f) as u16);
        if self.frame_control.to_ds && self.frame_control.from_ds {
            w.put_slice(self.addr4.unwrap_or(HwAddr::ZERO).as_bytes());
        }
        match &self.body {
            Dot11Body::Generic | Dot11Body::Data => {}
            Dot11Body::Beacon(body) => {
                w.put_u64_le(body.timestamp);
                w.put_u16_le(body.interval);
                w.put_u16_le(body.capability);
            }
            Dot11Body::AssocRequest(body) => {
                w.put_u16_le(body.capability);
                w.put_u16_le(body.listen_interval);
            }
            Dot11Body::AssocResponse(body) => {
                w.put_u16_le(body.capability);
                w.put_u16_le(body.status_code);
                w.put_u16_le(body.aid);
            }
            Dot11Body::Disassoc(body) => {
                w.put_u16_le(body.reason_code);
            }
            Dot11Body::QosData { qos_control } => {
                w.put_u16_le(*qos_control);
            }
        }
        for option in &self.options {
            w.put_u8(option.tag);
            w.put_u8(option.value.len() as u8);
            w.put_slice(&option.value);
        }
    }
}
