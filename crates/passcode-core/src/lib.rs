//! Shared plumbing for Passcode services: env-driven config, the common error
//! envelope, health probes, request-id propagation and tracing setup.

pub mod config;
pub mod error;
pub mod health;
pub mod middleware;
pub mod serde;
pub mod tracing;
