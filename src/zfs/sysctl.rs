//! FreeBSD counter source: the kstat.zfs.<pool>.dataset sysctl tree

use super::error::{ZfsError, ZfsResult};
use super::stats::{CounterSource, RecordBuilder, monotonic_ns};
use super::types::Snapshot;
use crate::system::CommandExecutor;
use async_trait::async_trait;
use log::debug;
use std::collections::BTreeMap;
use std::time::Duration;

const SYSCTL_TIMEOUT: Duration = Duration::from_secs(5);

pub struct SysctlSource<E: CommandExecutor> {
    command_executor: E,
    clock: fn() -> ZfsResult<u64>,
}

impl<E: CommandExecutor> SysctlSource<E> {
    pub fn new(command_executor: E) -> Self {
        Self::with_clock(command_executor, monotonic_ns)
    }

    /// Use `clock` instead of CLOCK_MONOTONIC for record timestamps
    pub fn with_clock(command_executor: E, clock: fn() -> ZfsResult<u64>) -> Self {
        Self {
            command_executor,
            clock,
        }
    }
}

#[async_trait]
impl<E: CommandExecutor> CounterSource for SysctlSource<E> {
    async fn fetch(&self, pool: &str) -> ZfsResult<Snapshot> {
        let oid = format!("kstat.zfs.{}.dataset", pool);
        let output = self
            .command_executor
            .execute_with_timeout("sysctl", &["-q", oid.as_str()], SYSCTL_TIMEOUT)
            .await
            .map_err(|e| ZfsError::collection(pool, &e.to_string()))?;
        // sysctl carries no sample time of its own
        let timestamp = (self.clock)()?;

        if output.trim().is_empty() {
            return Err(ZfsError::collection(pool, "no dataset kstats (pool not imported?)"));
        }
        let snapshot = parse_sysctl(&oid, &output, timestamp);
        debug!("Fetched {} datasets from {}", snapshot.len(), oid);
        Ok(snapshot)
    }
}

/// Parse `sysctl` output lines of the form
/// `kstat.zfs.tank.dataset.objset-0x36.nread: 4096`, grouped by objset.
pub fn parse_sysctl(oid: &str, output: &str, timestamp: u64) -> Snapshot {
    let prefix = format!("{}.", oid);
    let mut objsets: BTreeMap<&str, RecordBuilder> = BTreeMap::new();

    for line in output.lines() {
        let Some(rest) = line.strip_prefix(&prefix) else {
            continue;
        };
        let Some((path, value)) = rest.split_once(':') else {
            continue;
        };
        let Some((objset, key)) = path.split_once('.') else {
            continue;
        };
        objsets.entry(objset).or_default().field(key, value.trim());
    }

    objsets
        .into_iter()
        .filter_map(|(objset, builder)| {
            let record = builder.build(timestamp);
            if record.is_none() {
                debug!("Skipping malformed objset {}{}", prefix, objset);
            }
            record
        })
        .collect()
}
