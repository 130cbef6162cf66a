//! Domain types shared across all Cargolink services.
//!
//! This crate contains only pure types with no framework dependencies.
//! Import in `usecase/` and `domain/` layers; never in `infra/` or `handlers/`.

pub mod gst;
pub mod id;
pub mod phone;
pub mod role;
pub mod status;
pub mod vehicle;
