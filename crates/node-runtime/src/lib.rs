//! # Node Runtime Library
//!
//! Configuration loading and the scheduled pass loop. The main entry point
//! is the `main.rs` binary.

#![warn(missing_docs)]

pub mod config;
pub mod runtime;

pub use config::{ConfigError, NodeConfig};
pub use runtime::{NodeOrchestrator, NodeRuntime, OutboundMemo};
