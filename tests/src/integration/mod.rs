//! Cross-subsystem integration tests.

pub mod channel_flows;
#[cfg(test)]
pub mod fixtures;
pub mod pipeline_flows;
