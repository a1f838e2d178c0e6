//! Application layer for the Encryption Channel

pub mod service;

pub use service::EncryptionChannelService;
