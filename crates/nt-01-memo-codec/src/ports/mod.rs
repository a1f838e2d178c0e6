//! Ports module for the Memo Codec
//!
//! The codec is a leaf: it only exposes an inbound API.

pub mod inbound;

pub use inbound::MemoCodecApi;
