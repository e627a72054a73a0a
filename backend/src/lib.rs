//! Identity provisioning core for congregation membership administration.

pub mod config;
pub mod domain;
pub mod outbound;
pub mod telemetry;
