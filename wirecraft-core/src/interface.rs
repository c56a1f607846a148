//! Network interface resolution.
//!
//! Resolves a textual interface name (or a destination IPv4 address) to the
//! addressing information the send path needs. Enumeration is backed by
//! `pnet_datalink`; the backend does not expose routing metrics, so
//! destination lookup selects the longest directly-connected prefix.

use crate::{Error, HwAddr, Result};
use ipnetwork::IpNetwork;
use std::fmt;
use std::net::Ipv4Addr;

/// Addressing information for a resolved interface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterfaceInfo {
    /// OS interface index
    pub index: u32,
    /// Hardware address
    pub hw_addr: HwAddr,
    /// Primary IPv4 address
    pub ipv4: Ipv4Addr,
    /// Netmask of the primary IPv4 address
    pub netmask: Ipv4Addr,
    /// Broadcast address, or zero for point-to-point links
    pub broadcast: Ipv4Addr,
    /// Whether the interface is up
    pub is_up: bool,
}

/// A named network interface
#[derive(Debug, Clone)]
pub struct NetworkInterface {
    name: String,
    index: u32,
}

impl NetworkInterface {
    /// Resolve an interface by name
    pub fn by_name(name: &str) -> Result<Self> {
        let iface = pnet_datalink::interfaces()
            .into_iter()
            .find(|i| i.name == name)
            .ok_or_else(|| Error::invalid_interface(name))?;
        Ok(NetworkInterface {
            name: iface.name,
            index: iface.index,
        })
    }

    /// Resolve the interface used to reach an IPv4 destination.
    ///
    /// The loopback address maps to the loopback device; everything else
    /// picks the interface whose directly-connected prefix has the longest
    /// match on the destination.
    pub fn for_destination(dst: Ipv4Addr) -> Result<Self> {
        let interfaces = pnet_datalink::interfaces();
        if dst.is_loopback() {
            let lo = interfaces
                .into_iter()
                .find(|i| i.is_loopback())
                .ok_or_else(|| Error::invalid_interface("no loopback device"))?;
            return Ok(NetworkInterface {
                name: lo.name,
                index: lo.index,
            });
        }

        let mut best: Option<(u8, &pnet_datalink::NetworkInterface)> = None;
        for iface in &interfaces {
            for net in &iface.ips {
                if let IpNetwork::V4(v4) = net {
                    if v4.contains(dst) {
                        match best {
                            Some((prefix, _)) if prefix >= v4.prefix() => {}
                            _ => best = Some((v4.prefix(), iface)),
                        }
                    }
                }
            }
        }
        let (_, iface) = best
            .ok_or_else(|| Error::invalid_interface(format!("no route to {}", dst)))?;
        Ok(NetworkInterface {
            name: iface.name.clone(),
            index: iface.index,
        })
    }

    /// Interface name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// OS interface index
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Query the interface's addressing information
    pub fn info(&self) -> Result<InterfaceInfo> {
        let iface = pnet_datalink::interfaces()
            .into_iter()
            .find(|i| i.name == self.name)
            .ok_or_else(|| Error::invalid_interface(&*self.name))?;

        let hw_addr = match iface.mac {
            Some(mac) => HwAddr([mac.0, mac.1, mac.2, mac.3, mac.4, mac.5]),
            None => HwAddr::ZERO,
        };

        let mut ipv4 = Ipv4Addr::UNSPECIFIED;
        let mut netmask = Ipv4Addr::UNSPECIFIED;
        let mut broadcast = Ipv4Addr::UNSPECIFIED;
        let mut found_ip = false;
        for net in &iface.ips {
            if let IpNetwork::V4(v4) = net {
                ipv4 = v4.ip();
                netmask = v4.mask();
                broadcast = if iface.is_point_to_point() {
                    Ipv4Addr::UNSPECIFIED
                } else {
                    v4.broadcast()
                };
                found_ip = true;
                break;
            }
        }
        if !found_ip && iface.mac.is_none() {
            return Err(Error::invalid_interface(format!(
                "{} has neither a hardware nor an IPv4 address",
                self.name
            )));
        }

        Ok(InterfaceInfo {
            index: iface.index,
            hw_addr,
            ipv4,
            netmask,
            broadcast,
            is_up: iface.is_up(),
        })
    }
}

impl fmt::Display for NetworkInterface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (#{})", self.name, self.index)
    }
}
