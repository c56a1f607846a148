//! Wirecraft core library
//!
//! This crate provides the fundamental types shared by the wirecraft packet
//! crafting and dissection library: the error model, the hardware-address
//! value type, bounded byte cursors, and network interface resolution.

pub mod error;
pub mod interface;
pub mod stream;
pub mod types;

// Re-export commonly used types
pub use error::{Error, Result};
pub use interface::{InterfaceInfo, NetworkInterface};
pub use stream::{SliceReader, SliceWriter};
pub use types::HwAddr;
