//! Common value types used throughout wirecraft

use std::fmt;
use std::str::FromStr;

/// Hardware (MAC-48) address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HwAddr(pub [u8; 6]);

impl HwAddr {
    /// Broadcast address (ff:ff:ff:ff:ff:ff)
    pub const BROADCAST: HwAddr = HwAddr([0xff, 0xff, 0xff, 0xff, 0xff, 0xff]);

    /// Zero address (00:00:00:00:00:00)
    pub const ZERO: HwAddr = HwAddr([0x00, 0x00, 0x00, 0x00, 0x00, 0x00]);

    /// Create a new hardware address
    pub const fn new(bytes: [u8; 6]) -> Self {
        Self(bytes)
    }

    /// Create a hardware address from a slice, failing on length mismatch
    pub fn from_slice(slice: &[u8]) -> Option<Self> {
        if slice.len() == 6 {
            let mut bytes = [0u8; 6];
            bytes.copy_from_slice(slice);
            Some(HwAddr(bytes))
        } else {
            None
        }
    }

    /// Get bytes as slice
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Convert to array
    pub fn octets(&self) -> [u8; 6] {
        self.0
    }

    /// Check if this is the broadcast address
    pub fn is_broadcast(&self) -> bool {
        self.0 == [0xff, 0xff, 0xff, 0xff, 0xff, 0xff]
    }

    /// Check if this is a multicast address (bit 0 of first octet set)
    pub fn is_multicast(&self) -> bool {
        self.0[0] & 0x01 == 0x01
    }

    /// Check if this is a unicast address
    pub fn is_unicast(&self) -> bool {
        !self.is_multicast() && !self.is_broadcast()
    }
}

impl fmt::Display for HwAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
            self.0[0], self.0[1], self.0[2], self.0[3], self.0[4], self.0[5]
        )
    }
}

impl FromStr for HwAddr {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(':').collect();
        if parts.len() != 6 {
            return Err(crate::Error::malformed("invalid hardware address format"));
        }

        let mut bytes = [0u8; 6];
        for (i, part) in parts.iter().enumerate() {
            bytes[i] = u8::from_str_radix(part, 16)
                .map_err(|_| crate::Error::malformed("invalid hardware address hex"))?;
        }

        Ok(HwAddr(bytes))
    }
}

impl From<[u8; 6]> for HwAddr {
    fn from(bytes: [u8; 6]) -> Self {
        HwAddr(bytes)
    }
}

impl From<HwAddr> for [u8; 6] {
    fn from(addr: HwAddr) -> Self {
        addr.0
    }
}
