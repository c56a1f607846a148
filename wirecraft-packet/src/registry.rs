//! Protocol dispatch tables.
//!
//! Two process-wide tables translate between numeric next-protocol
//! discriminators and unit parsers: the main dispatch table keyed by IP
//! protocol numbers, and the IPv6 allocator table for next-header ids that
//! only exist inside an IPv6 chain. Both are plain [`DispatchRegistry`]
//! values and can be built standalone for tests; the process-wide instances
//! are registered at startup and read-only while parsing.

use crate::pdu::{Pdu, PduKind};
use crate::tcp::Tcp;
use crate::udp::Udp;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::OnceLock;
use tracing::debug;
use wirecraft_core::{Error, Result};

/// IP protocol numbers used by the send path and the default table
pub mod ip_proto {
    pub const ICMP: u8 = 1;
    pub const TCP: u8 = 6;
    pub const UDP: u8 = 17;
    pub const ICMPV6: u8 = 58;
}

/// A parser capable of constructing a unit chain from a payload buffer
pub type PduConstructor = fn(&[u8]) -> Result<Pdu>;

/// Bidirectional mapping between numeric discriminators and unit parsers
#[derive(Default)]
pub struct DispatchRegistry {
    parsers: HashMap<u8, (PduKind, PduConstructor)>,
    ids: HashMap<PduKind, u8>,
}

impl DispatchRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding the built-in IP protocol entries
    pub fn with_ip_defaults() -> Self {
        let mut registry = Self::new();
        // Built-in ids cannot conflict in an empty table
        let _ = registry.register(ip_proto::TCP, PduKind::Tcp, parse_tcp);
        let _ = registry.register(ip_proto::UDP, PduKind::Udp, parse_udp);
        registry
    }

    /// Register a parser for a discriminator.
    ///
    /// Idempotent when the same (kind, constructor) pair is registered for
    /// the same id; a different pair for an already-claimed id (or a second
    /// id for an already-mapped kind) is rejected.
    pub fn register(&mut self, id: u8, kind: PduKind, ctor: PduConstructor) -> Result<()> {
        match self.parsers.get(&id) {
            Some((existing_kind, existing_ctor))
                if *existing_kind == kind && *existing_ctor == ctor =>
            {
                return Ok(());
            }
            Some(_) => return Err(Error::RegistryConflict(id)),
            None => {}
        }
        if let Some(existing_id) = self.ids.get(&kind) {
            if *existing_id != id {
                return Err(Error::RegistryConflict(id));
            }
        }
        self.parsers.insert(id, (kind, ctor));
        self.ids.insert(kind, id);
        debug!(id, ?kind, "registered protocol dispatcher");
        Ok(())
    }

    /// Look up the parser for a discriminator
    pub fn parser(&self, id: u8) -> Option<PduConstructor> {
        self.parsers.get(&id).map(|(_, ctor)| *ctor)
    }

    /// Look up the wire discriminator for a unit kind
    pub fn id_of(&self, kind: PduKind) -> Option<u8> {
        self.ids.get(&kind).copied()
    }
}

fn parse_tcp(buf: &[u8]) -> Result<Pdu> {
    Tcp::from_bytes(buf).map(Pdu::Tcp)
}

fn parse_udp(buf: &[u8]) -> Result<Pdu> {
    Udp::from_bytes(buf).map(Pdu::Udp)
}

fn dispatch_table() -> &'static RwLock<DispatchRegistry> {
    static TABLE: OnceLock<RwLock<DispatchRegistry>> = OnceLock::new();
    TABLE.get_or_init(|| RwLock::new(DispatchRegistry::with_ip_defaults()))
}

fn ipv6_ext_table() -> &'static RwLock<DispatchRegistry> {
    static TABLE: OnceLock<RwLock<DispatchRegistry>> = OnceLock::new();
    TABLE.get_or_init(|| RwLock::new(DispatchRegistry::new()))
}

/// Register a parser in the process-wide dispatch table
pub fn register_pdu(id: u8, kind: PduKind, ctor: PduConstructor) -> Result<()> {
    dispatch_table().write().register(id, kind, ctor)
}

/// Register a parser in the process-wide IPv6 allocator table
pub fn register_ipv6_ext(id: u8, kind: PduKind, ctor: PduConstructor) -> Result<()> {
    ipv6_ext_table().write().register(id, kind, ctor)
}

pub(crate) fn parser_for(id: u8) -> Option<PduConstructor> {
    dispatch_table().read().parser(id)
}

pub(crate) fn ipv6_ext_parser_for(id: u8) -> Option<PduConstructor> {
    ipv6_ext_table().read().parser(id)
}

/// Wire discriminator for a kind: the dispatch table first, then the IPv6
/// allocator table. `None` for kinds with no numeric identity (e.g. raw
/// payloads).
pub(crate) fn discriminator_for(kind: PduKind) -> Option<u8> {
    dispatch_table()
        .read()
        .id_of(kind)
        .or_else(|| ipv6_ext_table().read().id_of(kind))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raw::RawPdu;

    fn parse_opaque(buf: &[u8]) -> Result<Pdu> {
        Ok(Pdu::Raw(RawPdu::from_bytes(buf)))
    }

    #[test]
    fn test_defaults_present() {
        let registry = DispatchRegistry::with_ip_defaults();
        assert!(registry.parser(ip_proto::TCP).is_some());
        assert!(registry.parser(ip_proto::UDP).is_some());
        assert_eq!(registry.id_of(PduKind::Tcp), Some(6));
        assert_eq!(registry.id_of(PduKind::Udp), Some(17));
        assert!(registry.parser(99).is_none());
    }

    #[test]
    fn test_registration_idempotent() {
        let mut registry = DispatchRegistry::new();
        registry.register(200, PduKind::Raw, parse_opaque).unwrap();
        registry.register(200, PduKind::Raw, parse_opaque).unwrap();
        assert!(registry.parser(200).is_some());
    }

    #[test]
    fn test_conflicting_registration_rejected() {
        let mut registry = DispatchRegistry::with_ip_defaults();
        let err = registry
            .register(ip_proto::TCP, PduKind::Raw, parse_opaque)
            .unwrap_err();
        assert!(matches!(err, Error::RegistryConflict(6)));

        // Same kind under a second id is also a conflict
        let err = registry
            .register(99, PduKind::Tcp, parse_tcp)
            .unwrap_err();
        assert!(matches!(err, Error::RegistryConflict(99)));
    }
}
