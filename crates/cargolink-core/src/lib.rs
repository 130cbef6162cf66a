//! Plumbing shared by every cargolink service: tracing setup, probes,
//! request ids and timestamp serialization.

pub mod health;
pub mod middleware;
pub mod serde;
pub mod tracing;
