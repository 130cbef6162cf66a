pub mod config;
pub mod domain;
pub mod error;
pub mod flow;
pub mod handlers;
pub mod infra;
pub mod jobs;
pub mod legacy;
pub mod router;
pub mod session;
pub mod state;
pub mod usecase;
