//! Application layer for the Memo Codec

pub mod service;

pub use service::MemoCodecService;
