//! Core domain types and logic.

pub mod aligner;
pub mod config_validation;
pub mod dashboard;
pub mod error;
pub mod fallback;
pub mod forecast;
pub mod ingest;
pub mod series;
pub mod signal;
