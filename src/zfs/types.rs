use std::collections::BTreeMap;

/// Absolute, cumulative I/O counters for one dataset at one instant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CounterRecord {
    pub timestamp: u64, // Monotonic nanoseconds
    pub name: String,
    pub write_ops: u64,
    pub write_bytes: u64,
    pub read_ops: u64,
    pub read_bytes: u64,
}

impl CounterRecord {
    /// All-zero baseline on the monotonic-since-boot clock.
    ///
    /// Diffing against this yields averages since the counters were
    /// instantiated, which is what the first report shows.
    pub fn zero(name: &str) -> Self {
        Self {
            timestamp: 0,
            name: name.to_string(),
            write_ops: 0,
            write_bytes: 0,
            read_ops: 0,
            read_bytes: 0,
        }
    }
}

/// Counters for a set of datasets, keyed by dataset name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    records: BTreeMap<String, CounterRecord>,
}

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, record: CounterRecord) {
        self.records.insert(record.name.clone(), record);
    }

    /// Fold another pool's snapshot into this one
    pub fn merge(&mut self, other: Snapshot) {
        self.records.extend(other.records);
    }

    pub fn get(&self, name: &str) -> Option<&CounterRecord> {
        self.records.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CounterRecord> {
        self.records.values()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Keep only the records whose name satisfies `predicate`
    pub fn retain_names<P>(self, mut predicate: P) -> Snapshot
    where
        P: FnMut(&str) -> bool,
    {
        Snapshot {
            records: self
                .records
                .into_iter()
                .filter(|(name, _)| predicate(name))
                .collect(),
        }
    }
}

impl FromIterator<CounterRecord> for Snapshot {
    fn from_iter<I: IntoIterator<Item = CounterRecord>>(iter: I) -> Self {
        let mut snapshot = Snapshot::new();
        for record in iter {
            snapshot.insert(record);
        }
        snapshot
    }
}

/// Per-second rates for one dataset between two snapshots
#[derive(Debug, Clone, PartialEq)]
pub struct RateRecord {
    pub name: String,
    pub interval_seconds: f64,
    pub write_ops_per_sec: f64,
    pub write_bytes_per_sec: f64,
    pub read_ops_per_sec: f64,
    pub read_bytes_per_sec: f64,
    pub avg_write_req_size: f64, // Bytes
    pub avg_read_req_size: f64,  // Bytes
}
