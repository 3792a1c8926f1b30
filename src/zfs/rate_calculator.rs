use super::types::{CounterRecord, RateRecord, Snapshot};
use log::warn;

const NANOS_PER_SEC: f64 = 1e9;

/// Turns pairs of absolute counter records into per-second rates
#[derive(Debug)]
pub struct RateCalculator {
    baseline: CounterRecord,
}

impl RateCalculator {
    pub fn new() -> Self {
        Self {
            baseline: CounterRecord::zero(""),
        }
    }

    /// Rates between two records of the same dataset.
    ///
    /// Counter or clock regressions are not corrected; they surface as
    /// negative rates.
    pub fn diff(&self, old: &CounterRecord, new: &CounterRecord) -> RateRecord {
        debug_assert_eq!(old.name, new.name);
        if new.timestamp < old.timestamp {
            warn!(
                "Clock went backwards for {}: {} -> {}",
                new.name, old.timestamp, new.timestamp
            );
        }
        compute(old, new)
    }

    /// Rates of `new` against the all-zero baseline (since-boot averages)
    pub fn diff_from_zero(&self, new: &CounterRecord) -> RateRecord {
        compute(&self.baseline, new)
    }

    /// Rates for every dataset in `current`.
    ///
    /// Without a previous snapshot, or for datasets that were not present in
    /// it, the zero baseline is used.
    pub fn diff_snapshots(&self, previous: Option<&Snapshot>, current: &Snapshot) -> Vec<RateRecord> {
        current
            .iter()
            .map(|new| match previous.and_then(|p| p.get(&new.name)) {
                Some(old) => self.diff(old, new),
                None => self.diff_from_zero(new),
            })
            .collect()
    }
}

impl Default for RateCalculator {
    fn default() -> Self {
        Self::new()
    }
}

/// True if any of the four per-second rates is non-zero
pub fn nonzero(rate: &RateRecord) -> bool {
    rate.write_ops_per_sec != 0.0
        || rate.write_bytes_per_sec != 0.0
        || rate.read_ops_per_sec != 0.0
        || rate.read_bytes_per_sec != 0.0
}

fn delta(old: u64, new: u64) -> f64 {
    (i128::from(new) - i128::from(old)) as f64
}

fn per_sec(value_delta: f64, interval_seconds: f64) -> f64 {
    if interval_seconds != 0.0 {
        value_delta / interval_seconds
    } else {
        // Time hasn't changed, return 0 rate
        0.0
    }
}

fn avg_size(bytes_delta: f64, ops_delta: f64) -> f64 {
    if ops_delta != 0.0 {
        bytes_delta / ops_delta
    } else {
        0.0
    }
}

fn compute(old: &CounterRecord, new: &CounterRecord) -> RateRecord {
    let interval_seconds = delta(old.timestamp, new.timestamp) / NANOS_PER_SEC;

    let write_ops = delta(old.write_ops, new.write_ops);
    let write_bytes = delta(old.write_bytes, new.write_bytes);
    let read_ops = delta(old.read_ops, new.read_ops);
    let read_bytes = delta(old.read_bytes, new.read_bytes);

    RateRecord {
        name: new.name.clone(),
        interval_seconds,
        write_ops_per_sec: per_sec(write_ops, interval_seconds),
        write_bytes_per_sec: per_sec(write_bytes, interval_seconds),
        read_ops_per_sec: per_sec(read_ops, interval_seconds),
        read_bytes_per_sec: per_sec(read_bytes, interval_seconds),
        avg_write_req_size: avg_size(write_bytes, write_ops),
        avg_read_req_size: avg_size(read_bytes, read_ops),
    }
}
