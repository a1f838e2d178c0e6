//! Ports module for the Encryption Channel
//!
//! Defines inbound (API) and outbound (SPI) port traits.

pub mod inbound;
pub mod outbound;

pub use inbound::EncryptionChannelApi;
pub use outbound::{ChannelKeyring, HandshakeSource};
