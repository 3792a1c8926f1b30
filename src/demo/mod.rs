//! Synthetic counters for running without a ZFS host (DEMO_MODE=true)

pub mod data;

pub use data::DemoCounterSource;
