mod demo;
mod display;
mod monitor;
mod system;
mod zfs;

use clap::{
    Parser,
    error::{Error as ClapError, ErrorKind as ClapErrorKind},
};
use display::{SortKey, TimestampFormat, UnitPrefix};
use env_logger::{Builder, Env};
use monitor::Settings;
use std::env;
use std::process;
use std::time::Duration;

/// iostat-style I/O throughput for ZFS datasets
#[derive(Debug, Parser)]
#[command(name = "zfs-iostat", version)]
struct Cli {
    /// Datasets to monitor; children are included unless -e is given
    #[arg(required = true)]
    datasets: Vec<String>,
    /// Sort rows by this column
    #[arg(short = 's', long = "sort", value_enum, default_value_t = SortKey::Name)]
    sort: SortKey,
    /// Seconds between reports
    #[arg(short = 'i', long = "interval", default_value = "1", value_parser = interval_parser)]
    interval: Duration,
    /// Stop after this many reports
    #[arg(short = 'c', long = "count", value_parser = clap::value_parser!(u64).range(1..))]
    count: Option<u64>,
    /// Skip the initial since-boot summary
    #[arg(short = 'y')]
    skip_summary: bool,
    /// Use binary (MiB, KiB) instead of decimal prefixes
    #[arg(short = 'b')]
    binary: bool,
    /// Overwrite the previous report instead of scrolling
    #[arg(short = 'o')]
    overwrite: bool,
    /// Exact names only, do not include child datasets
    #[arg(short = 'e')]
    exact: bool,
    /// Only show datasets with I/O activity
    #[arg(short = 'z')]
    nonzero: bool,
    /// Show full dataset names instead of a tree
    #[arg(short = 'p')]
    full_names: bool,
    /// Print a timestamp before each report (u: Unix seconds, d: date)
    #[arg(short = 'T', value_enum)]
    timestamp: Option<TimestampFormat>,
}

fn interval_parser(s: &str) -> Result<Duration, ClapError> {
    let secs = s
        .parse::<f64>()
        .map_err(|e| ClapError::raw(ClapErrorKind::ValueValidation, e))?;
    match Duration::try_from_secs_f64(secs) {
        Ok(interval) if !interval.is_zero() => Ok(interval),
        _ => Err(ClapError::raw(
            ClapErrorKind::ValueValidation,
            "interval must be a positive number of seconds",
        )),
    }
}

impl Cli {
    fn into_settings(self) -> Settings {
        Settings {
            datasets: self.datasets,
            sort: self.sort,
            interval: self.interval,
            count: self.count,
            skip_summary: self.skip_summary,
            unit: if self.binary {
                UnitPrefix::Binary
            } else {
                UnitPrefix::Decimal
            },
            overwrite: self.overwrite,
            recursive: !self.exact,
            nonzero_only: self.nonzero,
            full_names: self.full_names,
            timestamp: self.timestamp,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    Builder::from_env(Env::default().default_filter_or("warn")).init();

    // Check for demo mode
    let demo_mode = env::var("DEMO_MODE").unwrap_or_else(|_| "false".to_string()) == "true";

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };
    if let Err(e) = rt.block_on(monitor::run(cli.into_settings(), demo_mode)) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
