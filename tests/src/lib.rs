//! # NodeTools Test Suite
//!
//! Cross-subsystem tests driving the codec, channel and orchestrator
//! together against the in-memory repository.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── fixtures.rs        # Transaction builders, orchestrator setup
//!     ├── pipeline_flows.rs  # Chunking, ordering, idempotence, task workflow
//!     └── channel_flows.rs   # Handshakes, encrypted messages, arbitration
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p nt-tests
//! cargo test -p nt-tests integration::channel_flows
//! ```

pub mod integration;
