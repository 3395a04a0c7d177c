//! Mortgage application intake and financial-derivation service.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
