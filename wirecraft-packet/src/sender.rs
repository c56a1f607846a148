//! The packet send interface.
//!
//! The library performs no I/O itself: [`PacketSender`] is the collaborator
//! contract a capture/injection backend implements. [`Pdu::send`] picks the
//! layer-2 or layer-3 path from the outermost unit's identity.

use crate::pdu::Pdu;
use crate::registry::{self, ip_proto};
use std::net::{IpAddr, SocketAddr};
use tracing::trace;
use wirecraft_core::{Error, HwAddr, Result};

/// Socket family a layer-3 send goes through
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SocketKind {
    Ipv4,
    Ipv6,
    Icmp,
    Icmpv6,
}

/// A backend able to inject frames and packets
pub trait PacketSender {
    /// Send a serialized link-layer frame on an interface
    fn send_l2(&mut self, frame: &[u8], iface_index: u32, dst: HwAddr) -> Result<()>;

    /// Send a serialized network-layer packet to a destination
    fn send_l3(&mut self, packet: &[u8], dst: SocketAddr, kind: SocketKind) -> Result<()>;
}

impl Pdu {
    /// Serialize the chain and hand it to a sender.
    ///
    /// IPv6 goes out layer-3 with a zero port and its destination address,
    /// through the ICMP-flavored socket kind when the inner unit's
    /// registered discriminator says so. 802.11 and Ethernet go out layer-2
    /// on the given interface.
    pub fn send(&mut self, sender: &mut dyn PacketSender, iface_index: u32) -> Result<()> {
        let bytes = self.serialize();
        match self {
            Pdu::Ipv6(ip) => {
                let inner_disc = ip
                    .inner
                    .as_ref()
                    .and_then(|inner| registry::discriminator_for(inner.kind()));
                let kind = match inner_disc {
                    Some(ip_proto::ICMP) => SocketKind::Icmp,
                    Some(ip_proto::ICMPV6) => SocketKind::Icmpv6,
                    _ => SocketKind::Ipv6,
                };
                let dst = SocketAddr::new(IpAddr::V6(ip.dst), 0);
                trace!(%dst, ?kind, "sending layer-3 packet");
                sender.send_l3(&bytes, dst, kind)
            }
            Pdu::Dot11(frame) => {
                trace!(iface_index, "sending 802.11 frame");
                sender.send_l2(&bytes, iface_index, frame.addr1)
            }
            Pdu::Ethernet(frame) => {
                trace!(iface_index, "sending Ethernet frame");
                sender.send_l2(&bytes, iface_index, frame.dst)
            }
            other => Err(Error::NotImplemented(format!(
                "no send path for {:?} units",
                other.kind()
            ))),
        }
    }
}
