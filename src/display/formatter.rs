use super::tree::{Row, full_name_rows, tree_rows};
use crate::zfs::RateRecord;
use chrono::{DateTime, Local};

const NAME_HEADER: &str = "dataset";
const COLUMN_WIDTH: usize = 10;

/// Decimal (kB, MB) or binary (KiB, MiB) prefixes for byte columns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnitPrefix {
    #[default]
    Decimal,
    Binary,
}

impl UnitPrefix {
    pub fn multiplier(self) -> f64 {
        match self {
            UnitPrefix::Decimal => 1000.0,
            UnitPrefix::Binary => 1024.0,
        }
    }

    fn mega(self) -> &'static str {
        match self {
            UnitPrefix::Decimal => "MB",
            UnitPrefix::Binary => "MiB",
        }
    }
}

/// Timestamp line printed above each report
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum TimestampFormat {
    /// Seconds since the Unix epoch
    #[value(name = "u")]
    Unix,
    /// Local date and time
    #[value(name = "d")]
    Date,
}

pub fn format_timestamp(format: TimestampFormat, now: DateTime<Local>) -> String {
    match format {
        TimestampFormat::Unix => now.timestamp().to_string(),
        TimestampFormat::Date => now.format("%a %b %e %H:%M:%S %Y").to_string(),
    }
}

/// One displayed tick: optional timestamp line, column header, rows
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub timestamp: Option<String>,
    pub header: String,
    pub rows: Vec<String>,
}

impl Report {
    pub fn line_count(&self) -> usize {
        usize::from(self.timestamp.is_some()) + 1 + self.rows.len()
    }
}

/// Header line with the name column padded to `width`
pub fn format_header(width: usize, unit: UnitPrefix) -> String {
    let columns = [
        "w/s".to_string(),
        format!("w{}/s", unit.mega()),
        "r/s".to_string(),
        format!("r{}/s", unit.mega()),
        "wareq-sz".to_string(),
        "rareq-sz".to_string(),
    ];
    let mut line = format!("{:<width$}", NAME_HEADER, width = width);
    for column in &columns {
        line.push_str(&format!(" {:>w$}", column, w = COLUMN_WIDTH));
    }
    line
}

/// One table line; ancestor headers carry only their label
pub fn format_row(row: &Row, width: usize, unit: UnitPrefix) -> String {
    let Some(rate) = row.rates else {
        return row.label.clone();
    };
    let k = unit.multiplier();
    let values = [
        rate.write_ops_per_sec,
        rate.write_bytes_per_sec / (k * k),
        rate.read_ops_per_sec,
        rate.read_bytes_per_sec / (k * k),
        rate.avg_write_req_size / k,
        rate.avg_read_req_size / k,
    ];
    let mut line = format!("{:<width$}", row.label, width = width);
    for value in values {
        line.push_str(&format!(" {:>w$.2}", value, w = COLUMN_WIDTH));
    }
    line
}

/// Header plus one line per row, in either full-name or tree layout.
///
/// Tree layout expects `rates` to be name-ordered.
pub fn render_table(rates: &[RateRecord], tree: bool, unit: UnitPrefix) -> (String, Vec<String>) {
    let rows = if tree {
        tree_rows(rates)
    } else {
        full_name_rows(rates)
    };
    let width = rows
        .iter()
        .map(|row| row.label.chars().count())
        .chain(std::iter::once(NAME_HEADER.len()))
        .max()
        .unwrap_or(NAME_HEADER.len());

    let lines = rows.iter().map(|row| format_row(row, width, unit)).collect();
    (format_header(width, unit), lines)
}
