//! Test utilities for cargolink services.
//!
//! Inbound message builders and phone fixtures. Use from `dev-dependencies` only.

pub mod phone;
pub mod webhook;
