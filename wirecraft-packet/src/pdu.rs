//! The protocol unit model.
//!
//! [`Pdu`] is a tagged sum over all protocol kinds. Every unit owns at most
//! one inner unit, forming a singly-linked chain from the outermost layer to
//! the payload; dropping a unit drops its whole chain. Dispatch is by
//! `match` on the tag.
//!
//! Serialization walks the chain once: the inner unit is written into
//! `buf[header_size()..]` *before* the unit writes its own header, so units
//! with payload-dependent fields (transport checksums, the IPv6 payload
//! length) can read the already-written bytes. The parent reference handed
//! to the child is valid only for the duration of that call.

use crate::dns::Dns;
use crate::dot11::Dot11;
use crate::ethernet::EthernetII;
use crate::ipv6::Ipv6;
use crate::raw::RawPdu;
use crate::snap::Snap;
use crate::tcp::Tcp;
use crate::udp::Udp;
use tracing::debug;

/// Tagged identity of a protocol unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PduKind {
    Ethernet,
    Snap,
    Ipv6,
    Tcp,
    Udp,
    Dns,
    Dot11,
    Raw,
}

/// One layer in a stacked packet representation
#[derive(Debug, Clone)]
pub enum Pdu {
    Ethernet(EthernetII),
    Snap(Snap),
    Ipv6(Ipv6),
    Tcp(Tcp),
    Udp(Udp),
    Dns(Dns),
    Dot11(Dot11),
    Raw(RawPdu),
}

impl Pdu {
    /// The tagged kind of this unit
    pub fn kind(&self) -> PduKind {
        match self {
            Pdu::Ethernet(_) => PduKind::Ethernet,
            Pdu::Snap(_) => PduKind::Snap,
            Pdu::Ipv6(_) => PduKind::Ipv6,
            Pdu::Tcp(_) => PduKind::Tcp,
            Pdu::Udp(_) => PduKind::Udp,
            Pdu::Dns(_) => PduKind::Dns,
            Pdu::Dot11(_) => PduKind::Dot11,
            Pdu::Raw(_) => PduKind::Raw,
        }
    }

    /// Exact bytes this unit contributes to serialization, excluding inner
    pub fn header_size(&self) -> u32 {
        match self {
            Pdu::Ethernet(u) => u.header_size(),
            Pdu::Snap(u) => u.header_size(),
            Pdu::Ipv6(u) => u.header_size(),
            Pdu::Tcp(u) => u.header_size(),
            Pdu::Udp(u) => u.header_size(),
            Pdu::Dns(u) => u.header_size(),
            Pdu::Dot11(u) => u.header_size(),
            Pdu::Raw(u) => u.header_size(),
        }
    }

    /// Serialized size of the whole chain
    pub fn total_size(&self) -> usize {
        self.header_size() as usize + self.inner().map_or(0, |inner| inner.total_size())
    }

    /// The owned inner unit, if any
    pub fn inner(&self) -> Option<&Pdu> {
        match self {
            Pdu::Ethernet(u) => u.inner.as_deref(),
            Pdu::Snap(u) => u.inner.as_deref(),
            Pdu::Ipv6(u) => u.inner.as_deref(),
            Pdu::Tcp(u) => u.inner.as_deref(),
            Pdu::Udp(u) => u.inner.as_deref(),
            Pdu::Dns(u) => u.inner.as_deref(),
            Pdu::Dot11(u) => u.inner.as_deref(),
            Pdu::Raw(_) => None,
        }
    }

    /// Mutable access to the owned inner unit
    pub fn inner_mut(&mut self) -> Option<&mut Pdu> {
        match self {
            Pdu::Ethernet(u) => u.inner.as_deref_mut(),
            Pdu::Snap(u) => u.inner.as_deref_mut(),
            Pdu::Ipv6(u) => u.inner.as_deref_mut(),
            Pdu::Tcp(u) => u.inner.as_deref_mut(),
            Pdu::Udp(u) => u.inner.as_deref_mut(),
            Pdu::Dns(u) => u.inner.as_deref_mut(),
            Pdu::Dot11(u) => u.inner.as_deref_mut(),
            Pdu::Raw(_) => None,
        }
    }

    /// Replace the owned inner unit, dropping the prior chain.
    ///
    /// Raw units never own an inner; setting one is a no-op (the given unit
    /// is dropped).
    pub fn set_inner(&mut self, unit: Option<Pdu>) {
        let slot = match self {
            Pdu::Ethernet(u) => &mut u.inner,
            Pdu::Snap(u) => &mut u.inner,
            Pdu::Ipv6(u) => &mut u.inner,
            Pdu::Tcp(u) => &mut u.inner,
            Pdu::Udp(u) => &mut u.inner,
            Pdu::Dns(u) => &mut u.inner,
            Pdu::Dot11(u) => &mut u.inner,
            Pdu::Raw(_) => {
                if unit.is_some() {
                    debug!("raw unit cannot own an inner; dropping");
                }
                return;
            }
        };
        *slot = unit.map(Box::new);
    }

    fn take_inner(&mut self) -> Option<Box<Pdu>> {
        match self {
            Pdu::Ethernet(u) => u.inner.take(),
            Pdu::Snap(u) => u.inner.take(),
            Pdu::Ipv6(u) => u.inner.take(),
            Pdu::Tcp(u) => u.inner.take(),
            Pdu::Udp(u) => u.inner.take(),
            Pdu::Dns(u) => u.inner.take(),
            Pdu::Dot11(u) => u.inner.take(),
            Pdu::Raw(_) => None,
        }
    }

    fn put_inner(&mut self, unit: Box<Pdu>) {
        match self {
            Pdu::Ethernet(u) => u.inner = Some(unit),
            Pdu::Snap(u) => u.inner = Some(unit),
            Pdu::Ipv6(u) => u.inner = Some(unit),
            Pdu::Tcp(u) => u.inner = Some(unit),
            Pdu::Udp(u) => u.inner = Some(unit),
            Pdu::Dns(u) => u.inner = Some(unit),
            Pdu::Dot11(u) => u.inner = Some(unit),
            Pdu::Raw(_) => {}
        }
    }

    /// Append a unit at the deep end of the chain
    pub fn stack(mut self, unit: Pdu) -> Self {
        self.push_inner(unit);
        self
    }

    fn push_inner(&mut self, unit: Pdu) {
        match self.inner_mut() {
            Some(existing) => existing.push_inner(unit),
            None => self.set_inner(Some(unit)),
        }
    }

    /// First unit of the given kind in the chain, this one included
    pub fn find(&self, kind: PduKind) -> Option<&Pdu> {
        if self.kind() == kind {
            Some(self)
        } else {
            self.inner().and_then(|inner| inner.find(kind))
        }
    }

    /// Serialize the whole chain into a fresh buffer
    pub fn serialize(&mut self) -> Vec<u8> {
        let total = self.total_size();
        let mut buf = vec![0u8; total];
        self.serialize_into(&mut buf, None);
        buf
    }

    /// Serialize this unit at the start of `buf`, which must span from this
    /// unit's offset to the end of the packet (`total_size()` bytes).
    ///
    /// Writes exactly `header_size()` bytes of header; the inner chain lands
    /// at `buf[header_size()..]`. Self-referential fields (length fields,
    /// next-protocol discriminators, checksums) are adjusted before the
    /// header is written.
    pub fn serialize_into(&mut self, buf: &mut [u8], parent: Option<&Pdu>) {
        let hs = self.header_size() as usize;
        if let Some(mut inner) = self.take_inner() {
            inner.serialize_into(&mut buf[hs..], Some(&*self));
            self.put_inner(inner);
        }
        match self {
            Pdu::Ethernet(u) => u.write_header(buf, parent),
            Pdu::Snap(u) => u.write_header(buf, parent),
            Pdu::Ipv6(u) => u.write_header(buf, parent),
            Pdu::Tcp(u) => u.write_header(buf, parent),
            Pdu::Udp(u) => u.write_header(buf, parent),
            Pdu::Dns(u) => u.write_header(buf, parent),
            Pdu::Dot11(u) => u.write_header(buf, parent),
            Pdu::Raw(u) => u.write_header(buf, parent),
        }
    }

    /// Decide whether an inbound buffer starting at this layer could be the
    /// reply to this instance.
    pub fn matches_response(&self, bytes: &[u8]) -> bool {
        match self {
            Pdu::Ethernet(u) => u.matches_response(bytes),
            Pdu::Snap(u) => u.matches_response(bytes),
            Pdu::Ipv6(u) => u.matches_response(bytes),
            Pdu::Tcp(u) => u.matches_response(bytes),
            Pdu::Udp(u) => u.matches_response(bytes),
            Pdu::Dns(u) => u.matches_response(bytes),
            Pdu::Dot11(u) => u.matches_response(bytes),
            Pdu::Raw(u) => u.matches_response(bytes),
        }
    }
}

impl std::ops::Div for Pdu {
    type Output = Pdu;

    /// Chain two units: `outer / inner` appends `inner` at the deep end of
    /// `outer`'s chain.
    fn div(self, rhs: Pdu) -> Pdu {
        self.stack(rhs)
    }
}

impl From<EthernetII> for Pdu {
    fn from(unit: EthernetII) -> Self {
        Pdu::Ethernet(unit)
    }
}

impl From<Snap> for Pdu {
    fn from(unit: Snap) -> Self {
        Pdu::Snap(unit)
    }
}

impl From<Ipv6> for Pdu {
    fn from(unit: Ipv6) -> Self {
        Pdu::Ipv6(unit)
    }
}

impl From<Tcp> for Pdu {
    fn from(unit: Tcp) -> Self {
        Pdu::Tcp(unit)
    }
}

impl From<Udp> for Pdu {
    fn from(unit: Udp) -> Self {
        Pdu::Udp(unit)
    }
}

impl From<Dns> for Pdu {
    fn from(unit: Dns) -> Self {
        Pdu::Dns(unit)
    }
}

impl From<Dot11> for Pdu {
    fn from(unit: Dot11) -> Self {
        Pdu::Dot11(unit)
    }
}

impl From<RawPdu> for Pdu {
    fn from(unit: RawPdu) -> Self {
        Pdu::Raw(unit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stack_and_div_equivalent() {
        let chained = Pdu::from(RawPdu::new(vec![1]));
        assert_eq!(chained.kind(), PduKind::Raw);

        let a = Pdu::from(Udp::new(1000, 2000)).stack(Pdu::from(RawPdu::new(vec![1, 2])));
        let b = Pdu::from(Udp::new(1000, 2000)) / Pdu::from(RawPdu::new(vec![1, 2]));
        assert_eq!(a.total_size(), b.total_size());
        assert_eq!(a.inner().map(Pdu::kind), Some(PduKind::Raw));
    }

    #[test]
    fn test_div_appends_at_chain_end() {
        let chain = Pdu::from(Udp::new(1, 2))
            / Pdu::from(Dns::new());
        let deep = chain.find(PduKind::Dns).unwrap();
        assert_eq!(deep.kind(), PduKind::Dns);
        assert!(chain.find(PduKind::Ipv6).is_none());
    }

    #[test]
    fn test_set_inner_replaces_prior() {
        let mut pdu = Pdu::from(Udp::new(1, 2));
        pdu.set_inner(Some(Pdu::from(RawPdu::new(vec![0; 10]))));
        assert_eq!(pdu.total_size(), 8 + 10);
        pdu.set_inner(Some(Pdu::from(RawPdu::new(vec![0; 3]))));
        assert_eq!(pdu.total_size(), 8 + 3);
        pdu.set_inner(None);
        assert_eq!(pdu.total_size(), 8);
    }

    #[test]
    fn test_raw_never_owns_inner() {
        let mut raw = Pdu::from(RawPdu::new(vec![1, 2, 3]));
        raw.set_inner(Some(Pdu::from(RawPdu::new(vec![4]))));
        assert!(raw.inner().is_none());
        assert_eq!(raw.total_size(), 3);
    }

    #[test]
    fn test_serialize_writes_exact_sizes() {
        let mut chain = Pdu::from(Udp::new(1111, 2222)) / Pdu::from(RawPdu::new(vec![0xab; 5]));
        let wire = chain.serialize();
        assert_eq!(wire.len(), chain.total_size());
        assert_eq!(&wire[8..], &[0xab; 5]);
    }
}
