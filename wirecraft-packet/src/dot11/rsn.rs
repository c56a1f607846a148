//! RSN (Robust Security Network) information element
//!
//! The suite selectors are 4-byte values whose little-endian integer form
//! puts the 00-0F-AC OUI first on the wire.

use bytes::{BufMut, BytesMut};
use wirecraft_core::{Error, Result, SliceReader};

/// Cipher suite selectors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CipherSuite {
    Wep40,
    Tkip,
    Ccmp,
    Wep104,
    Custom(u32),
}

impl CipherSuite {
    /// Convert to the integer serialized little-endian
    pub fn to_u32(self) -> u32 {
        match self {
            CipherSuite::Wep40 => 0x01ac0f00,
            CipherSuite::Tkip => 0x02ac0f00,
            CipherSuite::Ccmp => 0x04ac0f00,
            CipherSuite::Wep104 => 0x05ac0f00,
            CipherSuite::Custom(val) => val,
        }
    }

    /// Create from the integer deserialized little-endian
    pub fn from_u32(value: u32) -> Self {
        match value {
            0x01ac0f00 => CipherSuite::Wep40,
            0x02ac0f00 => CipherSuite::Tkip,
            0x04ac0f00 => CipherSuite::Ccmp,
            0x05ac0f00 => CipherSuite::Wep104,
            val => CipherSuite::Custom(val),
        }
    }
}

/// Authentication and key management suite selectors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AkmSuite {
    /// 802.1X / EAP authentication
    Ieee8021X,
    /// Pre-shared key
    Psk,
    Custom(u32),
}

impl AkmSuite {
    /// Convert to the integer serialized little-endian
    pub fn to_u32(self) -> u32 {
        match self {
            AkmSuite::Ieee8021X => 0x01ac0f00,
            AkmSuite::Psk => 0x02ac0f00,
            AkmSuite::Custom(val) => val,
        }
    }

    /// Create from the integer deserialized little-endian
    pub fn from_u32(value: u32) -> Self {
        match value {
            0x01ac0f00 => AkmSuite::Ieee8021X,
            0x02ac0f00 => AkmSuite::Psk,
            val => AkmSuite::Custom(val),
        }
    }
}

/// RSN information element payload
#[derive(Debug, Clone, PartialEq)]
pub struct RsnInformation {
    pub version: u16,
    pub group_suite: CipherSuite,
    pub capabilities: u16,
    pairwise_cyphers: Vec<CipherSuite>,
    akm_cyphers: Vec<AkmSuite>,
}

impl RsnInformation {
    /// Create an element with version 1 and no suites
    pub fn new() -> Self {
        RsnInformation {
            version: 1,
            group_suite: CipherSuite::Ccmp,
            capabilities: 0,
            pairwise_cyphers: Vec::new(),
            akm_cyphers: Vec::new(),
        }
    }

    /// The usual WPA2-PSK configuration
    pub fn wpa2_psk() -> Self {
        let mut info = Self::new();
        info.group_suite = CipherSuite::Ccmp;
        info.add_pairwise_cypher(CipherSuite::Ccmp);
        info.add_akm_cypher(AkmSuite::Psk);
        info
    }

    /// Append a pairwise cipher suite
    pub fn add_pairwise_cypher(&mut self, cypher: CipherSuite) {
        self.pairwise_cyphers.push(cypher);
    }

    /// Append an AKM suite
    pub fn add_akm_cypher(&mut self, akm: AkmSuite) {
        self.akm_cyphers.push(akm);
    }

    /// Registered pairwise cipher suites
    pub fn pairwise_cyphers(&self) -> &[CipherSuite] {
        &self.pairwise_cyphers
    }

    /// Registered AKM suites
    pub fn akm_cyphers(&self) -> &[AkmSuite] {
        &self.akm_cyphers
    }

    /// Produce the contiguous element payload, all fields little-endian
    pub fn serialize(&self) -> Vec<u8> {
        let mut buf = BytesMut::with_capacity(
            8 + 4 * (self.pairwise_cyphers.len() + self.akm_cyphers.len()) + 2,
        );
        buf.put_u16_le(self.version);
        buf.put_u32_le(self.group_suite.to_u32());
        buf.put_u16_le(self.pairwise_cyphers.len() as u16);
        for cypher in &self.pairwise_cyphers {
            buf.put_u32_le(cypher.to_u32());
        }
        buf.put_u16_le(self.akm_cyphers.len() as u16);
        for akm in &self.akm_cyphers {
            buf.put_u32_le(akm.to_u32());
        }
        buf.put_u16_le(self.capabilities);
        buf.to_vec()
    }

    /// Parse an element payload; any length inconsistency is malformed
    pub fn parse(data: &[u8]) -> Result<Self> {
        let mut r = SliceReader::new(data);
        let version = r.read_u16_le()?;
        let group_suite = CipherSuite::from_u32(r.read_u32_le()?);

        let pairwise_count = r.read_u16_le()? as usize;
        if !r.can_read(pairwise_count * 4) {
            return Err(Error::malformed("RSN pairwise suite list overruns element"));
        }
        let mut pairwise_cyphers = Vec::with_capacity(pairwise_count);
        for _ in 0..pairwise_count {
            pairwise_cyphers.push(CipherSuite::from_u32(r.read_u32_le()?));
        }

        let akm_count = r.read_u16_le()? as usize;
        if !r.can_read(akm_count * 4) {
            return Err(Error::malformed("RSN AKM suite list overruns element"));
        }
        let mut akm_cyphers = Vec::with_capacity(akm_count);
        for _ in 0..akm_count {
            akm_cyphers.push(AkmSuite::from_u32(r.read_u32_le()?));
        }

        let capabilities = r.read_u16_le()?;
        Ok(RsnInformation {
            version,
            group_suite,
            capabilities,
            pairwise_cyphers,
            akm_cyphers,
        })
    }
}

impl Default for RsnInformation {
    fn default() -> Self {
        Self::new()
    }
}
