use crate::zfs::stats::monotonic_ns;
use crate::zfs::{CounterRecord, CounterSource, Snapshot, ZfsResult};
use async_trait::async_trait;

/// Datasets created under every requested pool, with (writes/s, write
/// request size, reads/s, read request size). `ROOT` itself is never listed,
/// so tree mode shows it as an ancestor header.
const DEMO_DATASETS: &[(&str, u64, u64, u64, u64)] = &[
    ("", 2, 4_096, 1, 4_096),
    ("/home", 35, 16_384, 120, 8_192),
    ("/home/alice", 12, 32_768, 80, 65_536),
    ("/ROOT/default", 4, 8_192, 9, 4_096),
    ("/vm/disk0", 210, 131_072, 40, 131_072),
    ("/archive", 0, 0, 0, 0),
];

/// Counter source whose counters grow at fixed rates along the monotonic
/// clock
pub struct DemoCounterSource;

impl DemoCounterSource {
    fn snapshot_at(pool: &str, timestamp: u64) -> Snapshot {
        DEMO_DATASETS
            .iter()
            .map(|&(suffix, wps, wsize, rps, rsize)| {
                let write_ops = ops_since_boot(wps, timestamp);
                let read_ops = ops_since_boot(rps, timestamp);
                CounterRecord {
                    timestamp,
                    name: format!("{}{}", pool, suffix),
                    write_ops,
                    write_bytes: write_ops.saturating_mul(wsize),
                    read_ops,
                    read_bytes: read_ops.saturating_mul(rsize),
                }
            })
            .collect()
    }
}

/// Operations completed at `per_sec` after `timestamp` nanoseconds
fn ops_since_boot(per_sec: u64, timestamp: u64) -> u64 {
    let ops = u128::from(per_sec) * u128::from(timestamp) / 1_000_000_000;
    u64::try_from(ops).unwrap_or(u64::MAX)
}

#[async_trait]
impl CounterSource for DemoCounterSource {
    async fn fetch(&self, pool: &str) -> ZfsResult<Snapshot> {
        Ok(Self::snapshot_at(pool, monotonic_ns()?))
    }
}
