use crate::zfs::RateRecord;

const INDENT: &str = "  ";

/// One printed line of a report: a label and, unless it is a synthetic
/// ancestor header, the rates shown next to it
#[derive(Debug, PartialEq)]
pub struct Row<'a> {
    pub label: String,
    pub rates: Option<&'a RateRecord>,
}

/// One row per record, labelled with the full dataset name
pub fn full_name_rows(rates: &[RateRecord]) -> Vec<Row<'_>> {
    rates
        .iter()
        .map(|rate| Row {
            label: rate.name.clone(),
            rates: Some(rate),
        })
        .collect()
}

/// Indented hierarchy with shared path prefixes compressed.
///
/// `rates` must already be in name order. Ancestors that were not selected
/// themselves get a header row without rates.
pub fn tree_rows(rates: &[RateRecord]) -> Vec<Row<'_>> {
    let mut rows = Vec::with_capacity(rates.len());
    let mut previous: Vec<&str> = Vec::new();

    for rate in rates {
        let path: Vec<&str> = rate.name.split('/').collect();
        let leaf = path.len() - 1;
        let common = previous
            .iter()
            .zip(&path)
            .take_while(|(a, b)| a == b)
            .count();

        for (depth, segment) in path.iter().enumerate().take(leaf).skip(common) {
            rows.push(Row {
                label: indented(depth, segment),
                rates: None,
            });
        }
        rows.push(Row {
            label: indented(leaf, path[leaf]),
            rates: Some(rate),
        });
        previous = path;
    }
    rows
}

fn indented(depth: usize, segment: &str) -> String {
    format!("{}{}", INDENT.repeat(depth), segment)
}
