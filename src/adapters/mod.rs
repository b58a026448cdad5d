//! Concrete adapter implementations for ports.

pub mod csv_series_adapter;
pub mod file_config_adapter;
#[cfg(feature = "fred")]
pub mod fred_adapter;
pub mod report;
