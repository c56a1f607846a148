//! Packet crafting and dissection for wirecraft
//!
//! This crate implements the protocol unit model: raw byte buffers from the
//! wire are parsed into a chain of structured protocol units, the units can
//! be mutated in memory, and the chain serializes back into a wire-format
//! buffer.
//!
//! # Architecture
//!
//! - [`pdu`] - The [`Pdu`] tagged sum over protocol kinds and the
//!   chain-walking serializer
//! - [`registry`] - Dispatch tables translating numeric next-protocol
//!   identifiers to parsers and back
//! - [`ipv6`] - IPv6 with extension-header chains
//! - [`dns`] - DNS with compressed names and section-offset maintenance
//! - [`dot11`] - IEEE 802.11 frame family
//! - [`ethernet`], [`snap`], [`tcp`], [`udp`] - peer units obeying the same
//!   contract
//! - [`raw`] - opaque payload fallback
//! - [`sender`] - the layer-2/layer-3 send interface
//!
//! # Quick start
//!
//! ```rust
//! use wirecraft_packet::{Pdu, ipv6::Ipv6, udp::Udp, dns::{Dns, Query, rtype, qclass}};
//!
//! let mut dns = Dns::new();
//! dns.set_id(0x1234);
//! dns.set_recursion_desired(true);
//! dns.add_query(&Query {
//!     dname: "www.example.com".into(),
//!     qtype: rtype::A,
//!     qclass: qclass::IN,
//! }).unwrap();
//!
//! let mut chain = Pdu::from(Ipv6::new("::1".parse().unwrap(), "::1".parse().unwrap()))
//!     / Pdu::from(Udp::new(1337, 53))
//!     / Pdu::from(dns);
//! let wire = chain.serialize();
//! let parsed = Ipv6::from_bytes(&wire).unwrap();
//! assert_eq!(parsed.hop_limit, 64);
//! ```

pub mod checksum;
pub mod dns;
pub mod dot11;
pub mod ethernet;
pub mod ipv6;
pub mod pdu;
pub mod raw;
pub mod registry;
pub mod sender;
pub mod snap;
pub mod tcp;
pub mod udp;

// Re-export commonly used types
pub use dns::Dns;
pub use dot11::Dot11;
pub use ethernet::EthernetII;
pub use ipv6::Ipv6;
pub use pdu::{Pdu, PduKind};
pub use raw::RawPdu;
pub use registry::{register_ipv6_ext, register_pdu, DispatchRegistry};
pub use sender::{PacketSender, SocketKind};
pub use snap::Snap;
pub use tcp::Tcp;
pub use udp::Udp;
