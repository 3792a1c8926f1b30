use super::error::{ZfsError, ZfsResult};
use super::types::{RateRecord, Snapshot};
use super::rate_calculator::nonzero;
use regex::Regex;
use std::collections::BTreeSet;

/// Decides which datasets of a snapshot are reported
#[derive(Debug, Clone)]
pub struct Selector {
    pools: BTreeSet<String>,
    pattern: Regex,
}

impl Selector {
    /// Compile the requested dataset names into one anchored matcher.
    ///
    /// In recursive mode a name also matches all of its descendants.
    /// Names without a leading pool segment (`/tank`, `/`) are rejected.
    pub fn new<S: AsRef<str>>(datasets: &[S], recursive: bool) -> ZfsResult<Self> {
        let mut names = Vec::with_capacity(datasets.len());
        let mut pools = BTreeSet::new();
        for dataset in datasets {
            let name = dataset.as_ref().trim_end_matches('/');
            let pool = name.split_once('/').map_or(name, |(pool, _)| pool);
            if pool.is_empty() {
                return Err(ZfsError::invalid_dataset(dataset.as_ref()));
            }
            pools.insert(pool.to_string());
            names.push(name);
        }

        let alternatives = names
            .iter()
            .map(|name| regex::escape(name))
            .collect::<Vec<_>>()
            .join("|");
        let suffix = if recursive { "(?:/[^/]+)*" } else { "" };
        let pattern = Regex::new(&format!("^(?:{}){}$", alternatives, suffix))?;

        Ok(Self { pools, pattern })
    }

    /// Pools that have to be fetched to cover every requested dataset
    pub fn pools(&self) -> impl Iterator<Item = &str> {
        self.pools.iter().map(String::as_str)
    }

    pub fn is_match(&self, name: &str) -> bool {
        self.pattern.is_match(name)
    }

    pub fn select(&self, snapshot: Snapshot) -> Snapshot {
        snapshot.retain_names(|name| self.is_match(name))
    }
}

/// Drop rows with no I/O activity
pub fn retain_nonzero(rates: &mut Vec<RateRecord>) {
    rates.retain(nonzero);
}
