//! Display module for ordering, laying out and printing rate tables

pub mod formatter;
pub mod sort;
pub mod terminal;
pub mod tree;

// Re-export commonly used items
pub use formatter::{Report, TimestampFormat, UnitPrefix, format_timestamp, render_table};
pub use sort::{SortKey, sort_rates};
pub use terminal::Terminal;
