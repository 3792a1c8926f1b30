use crate::zfs::RateRecord;
use std::cmp::Ordering;

/// Column a report is ordered by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum SortKey {
    /// Dataset name, ascending
    #[default]
    Name,
    /// Reads per second, descending
    Rps,
    /// Writes per second, descending
    Wps,
    /// Bytes read per second, descending
    #[value(name = "rMBps")]
    RMbps,
    /// Bytes written per second, descending
    #[value(name = "wMBps")]
    WMbps,
}

impl SortKey {
    pub fn compare(self, a: &RateRecord, b: &RateRecord) -> Ordering {
        match self {
            SortKey::Name => by_name(a, b),
            SortKey::Rps => b.read_ops_per_sec.total_cmp(&a.read_ops_per_sec),
            SortKey::Wps => b.write_ops_per_sec.total_cmp(&a.write_ops_per_sec),
            SortKey::RMbps => b.read_bytes_per_sec.total_cmp(&a.read_bytes_per_sec),
            SortKey::WMbps => b.write_bytes_per_sec.total_cmp(&a.write_bytes_per_sec),
        }
    }
}

/// Compare names segment by segment, so `a/b` sorts before `a-b`
pub fn by_name(a: &RateRecord, b: &RateRecord) -> Ordering {
    a.name.split('/').cmp(b.name.split('/'))
}

/// Order by name, then (stably) by `key`, so ties stay name-ordered
pub fn sort_rates(rates: &mut [RateRecord], key: SortKey) {
    rates.sort_by(by_name);
    if key != SortKey::Name {
        rates.sort_by(|a, b| key.compare(a, b));
    }
}
