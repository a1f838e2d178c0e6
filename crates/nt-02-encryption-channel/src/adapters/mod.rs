//! Adapters for the Encryption Channel

pub mod keyring;

pub use keyring::StaticKeyring;
