//! Linux counter source: OpenZFS objset kstats under /proc/spl/kstat/zfs

use super::error::{ZfsError, ZfsResult};
use super::stats::{CounterSource, RecordBuilder};
use super::types::{CounterRecord, Snapshot};
use crate::system::FilesystemReader;
use async_trait::async_trait;
use log::debug;

const KSTAT_ROOT: &str = "/proc/spl/kstat/zfs";

pub struct KstatSource<F: FilesystemReader> {
    filesystem_reader: F,
}

impl<F: FilesystemReader> KstatSource<F> {
    pub fn new(filesystem_reader: F) -> Self {
        Self { filesystem_reader }
    }
}

#[async_trait]
impl<F: FilesystemReader> CounterSource for KstatSource<F> {
    async fn fetch(&self, pool: &str) -> ZfsResult<Snapshot> {
        let pool_dir = format!("{}/{}", KSTAT_ROOT, pool);
        let entries = self.filesystem_reader.read_dir(&pool_dir).map_err(|e| {
            ZfsError::collection(pool, &ZfsError::filesystem_error(&pool_dir, "list", e).to_string())
        })?;

        let mut snapshot = Snapshot::new();
        for entry in entries.iter().filter(|e| e.starts_with("objset-")) {
            let path = format!("{}/{}", pool_dir, entry);
            // Datasets can vanish between listing and reading
            let content = match self.filesystem_reader.read_to_string(&path) {
                Ok(content) => content,
                Err(e) => {
                    debug!("Skipping {}: {}", path, e);
                    continue;
                }
            };
            match parse_objset(&content) {
                Some(record) => snapshot.insert(record),
                None => debug!("Skipping malformed objset kstat {}", path),
            }
        }
        debug!("Fetched {} datasets from {}", snapshot.len(), pool_dir);
        Ok(snapshot)
    }
}

/// Parse one objset kstat file.
///
/// ```text
/// 52 1 0x01 7 2160 5523398062 105964379254
/// name                            type data
/// dataset_name                    7    tank/data
/// writes                          4    12
/// ```
///
/// The last header field (snaptime) is the sample timestamp.
pub fn parse_objset(content: &str) -> Option<CounterRecord> {
    let mut lines = content.lines();
    let timestamp = lines
        .next()?
        .split_whitespace()
        .nth(6)?
        .parse::<u64>()
        .ok()?;
    if !lines.next()?.trim_start().starts_with("name") {
        return None;
    }

    let mut builder = RecordBuilder::default();
    for line in lines {
        let line = line.trim();
        let Some((key, rest)) = line.split_once(char::is_whitespace) else {
            continue;
        };
        let Some((_kind, value)) = rest.trim_start().split_once(char::is_whitespace) else {
            continue;
        };
        builder.field(key, value.trim());
    }
    builder.build(timestamp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::filesystem::FakeFilesystemReader;

    fn objset(snaptime: u64, name: &str, counters: [u64; 4]) -> String {
        format!(
            "52 1 0x01 7 2160 5523398062 {}\n\
             name                            type data\n\
             dataset_name                    7    {}\n\
             writes                          4    {}\n\
             nwritten                        4    {}\n\
             reads                           4    {}\n\
             nread                           4    {}\n\
             nunlinks                        4    0\n\
             nunlinked                       4    0\n",
            snaptime, name, counters[0], counters[1], counters[2], counters[3]
        )
    }

    #[test]
    fn test_parse_objset() {
        let record = parse_objset(&objset(105964379254, "tank/data", [150, 1_500_000, 7, 4096])).unwrap();

        assert_eq!(record.timestamp, 105964379254);
        assert_eq!(record.name, "tank/data");
        assert_eq!(record.write_ops, 150);
        assert_eq!(record.write_bytes, 1_500_000);
        assert_eq!(record.read_ops, 7);
        assert_eq!(record.read_bytes, 4096);
    }

    #[test]
    fn test_parse_objset_name_with_space() {
        let record = parse_objset(&objset(1, "tank/my data", [0, 0, 0, 0])).unwrap();
        assert_eq!(record.name, "tank/my data");
    }

    #[test]
    fn test_parse_objset_rejects_bad_header() {
        assert!(parse_objset("").is_none());
        assert!(parse_objset("52 1 0x01\nname type data\n").is_none());
        let content = objset(1, "tank", [0, 0, 0, 0]).replacen("name ", "nome ", 1);
        assert!(parse_objset(&content).is_none());
    }

    #[test]
    fn test_parse_objset_rejects_missing_counter() {
        let content: String = objset(1, "tank", [1, 2, 3, 4])
            .lines()
            .filter(|l| !l.starts_with("nread"))
            .map(|l| format!("{}\n", l))
            .collect();
        assert!(parse_objset(&content).is_none());
    }

    #[tokio::test]
    async fn test_fetch_skips_malformed_and_other_entries() {
        let fs = FakeFilesystemReader::new()
            .with_file("/proc/spl/kstat/zfs/tank/objset-0x36", &objset(10, "tank", [1, 2, 3, 4]))
            .with_file("/proc/spl/kstat/zfs/tank/objset-0x85", &objset(10, "tank/a", [5, 6, 7, 8]))
            .with_file("/proc/spl/kstat/zfs/tank/objset-0x99", "garbage")
            .with_file("/proc/spl/kstat/zfs/tank/io", "not an objset");
        let source = KstatSource::new(fs);

        let snapshot = source.fetch("tank").await.unwrap();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.get("tank/a").unwrap().read_bytes, 8);
    }

    #[tokio::test]
    async fn test_fetch_missing_pool_fails() {
        let source = KstatSource::new(FakeFilesystemReader::new());
        let result = source.fetch("nopool").await;
        assert!(matches!(result, Err(ZfsError::Collection { ref pool, .. }) if pool == "nopool"));
    }
}
