//! ZFS dataset counters: collection, selection and rate computation

pub mod error;
pub mod kstat;
pub mod rate_calculator;
pub mod selector;
pub mod stats;
pub mod sysctl;
pub mod types;


// Re-export commonly used items
pub use error::{ZfsError, ZfsResult};
pub use rate_calculator::RateCalculator;
pub use selector::Selector;
pub use stats::{CounterSource, platform_source};
pub use types::{CounterRecord, RateRecord, Snapshot};
