use super::error::{ZfsError, ZfsResult};
use super::kstat::KstatSource;
use super::sysctl::SysctlSource;
use super::types::{CounterRecord, Snapshot};
use crate::system::commands::RealCommandExecutor;
use crate::system::filesystem::RealFilesystemReader;
use async_trait::async_trait;
use nix::time::{ClockId, clock_gettime};

/// Source of absolute per-dataset counters for one pool
#[async_trait]
pub trait CounterSource: Send + Sync {
    /// Current counters for every dataset under `pool`.
    ///
    /// Fails only at pool level; datasets with malformed counters are left
    /// out of the snapshot.
    async fn fetch(&self, pool: &str) -> ZfsResult<Snapshot>;
}

/// Pick the counter source for the host OS
pub fn platform_source() -> ZfsResult<Box<dyn CounterSource>> {
    source_for_os(std::env::consts::OS)
}

fn source_for_os(os: &str) -> ZfsResult<Box<dyn CounterSource>> {
    match os {
        "linux" => Ok(Box::new(KstatSource::new(RealFilesystemReader))),
        "freebsd" => Ok(Box::new(SysctlSource::new(RealCommandExecutor))),
        other => Err(ZfsError::unsupported_platform(other)),
    }
}

/// CLOCK_MONOTONIC in nanoseconds, the same clock kstat snaptime uses
pub fn monotonic_ns() -> ZfsResult<u64> {
    let now = clock_gettime(ClockId::CLOCK_MONOTONIC).map_err(std::io::Error::from)?;
    Ok(now.tv_sec() as u64 * 1_000_000_000 + now.tv_nsec() as u64)
}

/// Collects the named fields of one raw dataset record.
///
/// A record only becomes a [`CounterRecord`] when all five fields are
/// present and numeric.
#[derive(Debug, Default)]
pub(crate) struct RecordBuilder {
    name: Option<String>,
    write_ops: Option<u64>,
    write_bytes: Option<u64>,
    read_ops: Option<u64>,
    read_bytes: Option<u64>,
    malformed: bool,
}

impl RecordBuilder {
    /// Feed one `key = value` pair; unknown keys are ignored
    pub(crate) fn field(&mut self, key: &str, value: &str) {
        let slot = match key {
            "dataset_name" => {
                self.name = Some(value.to_string());
                return;
            }
            "writes" => &mut self.write_ops,
            "nwritten" => &mut self.write_bytes,
            "reads" => &mut self.read_ops,
            "nread" => &mut self.read_bytes,
            _ => return,
        };
        match value.parse::<u64>() {
            Ok(v) => *slot = Some(v),
            Err(_) => self.malformed = true,
        }
    }

    pub(crate) fn build(self, timestamp: u64) -> Option<CounterRecord> {
        if self.malformed {
            return None;
        }
        Some(CounterRecord {
            timestamp,
            name: self.name.filter(|n| !n.is_empty())?,
            write_ops: self.write_ops?,
            write_bytes: self.write_bytes?,
            read_ops: self.read_ops?,
            read_bytes: self.read_bytes?,
        })
    }
}
