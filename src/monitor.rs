use crate::demo::DemoCounterSource;
use crate::display::terminal::Output;
use crate::display::{
    Report, SortKey, Terminal, TimestampFormat, UnitPrefix, format_timestamp, render_table,
    sort_rates,
};
use crate::zfs::selector::retain_nonzero;
use crate::zfs::{CounterSource, RateCalculator, Selector, Snapshot, ZfsResult, platform_source};
use log::{debug, info, warn};
use std::mem;
use std::time::Duration;
use tokio::sync::mpsc;

/// Everything the sampling loop needs from the command line
#[derive(Debug, Clone)]
pub struct Settings {
    pub datasets: Vec<String>,
    pub sort: SortKey,
    pub interval: Duration,
    pub count: Option<u64>,
    pub skip_summary: bool,
    pub unit: UnitPrefix,
    pub overwrite: bool,
    pub recursive: bool,
    pub nonzero_only: bool,
    pub full_names: bool,
    pub timestamp: Option<TimestampFormat>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            datasets: Vec::new(),
            sort: SortKey::Name,
            interval: Duration::from_secs(1),
            count: None,
            skip_summary: false,
            unit: UnitPrefix::Decimal,
            overwrite: false,
            recursive: true,
            nonzero_only: false,
            full_names: false,
            timestamp: None,
        }
    }
}

impl Settings {
    /// Tree layout needs every row in name order with no gaps, so it is only
    /// used when sorting by name without dropping idle rows.
    pub fn tree_view(&self) -> bool {
        !self.full_names && self.sort == SortKey::Name && !self.nonzero_only
    }

    /// Number of ticks to run. A skipped summary still uses a tick, so `N`
    /// requested reports take `N + 1` ticks.
    pub fn tick_budget(&self) -> Option<u64> {
        self.count.map(|count| {
            if self.skip_summary {
                count.saturating_add(1)
            } else {
                count
            }
        })
    }
}

#[derive(Debug)]
enum Phase {
    FirstTick,
    SteadyTick { previous: Snapshot },
    Terminated,
}

/// Sampling loop state: fetch, select, diff, sort and render once per tick
pub struct Monitor {
    settings: Settings,
    source: Box<dyn CounterSource>,
    selector: Selector,
    calculator: RateCalculator,
    phase: Phase,
    ticks: u64,
}

impl Monitor {
    pub fn new(settings: Settings, source: Box<dyn CounterSource>) -> ZfsResult<Self> {
        let selector = Selector::new(settings.datasets.as_slice(), settings.recursive)?;
        Ok(Self {
            settings,
            source,
            selector,
            calculator: RateCalculator::new(),
            phase: Phase::FirstTick,
            ticks: 0,
        })
    }

    pub fn is_terminated(&self) -> bool {
        matches!(self.phase, Phase::Terminated)
    }

    /// Run one tick. Returns the report to display, or `None` when this
    /// tick's output is suppressed.
    pub async fn tick(&mut self) -> ZfsResult<Option<Report>> {
        let previous = match mem::replace(&mut self.phase, Phase::Terminated) {
            Phase::FirstTick => None,
            Phase::SteadyTick { previous } => Some(previous),
            Phase::Terminated => return Ok(None),
        };

        let pools: Vec<String> = self.selector.pools().map(str::to_string).collect();
        let mut current = Snapshot::new();
        for pool in &pools {
            current.merge(self.source.fetch(pool).await?);
        }
        let current = self.selector.select(current);
        if current.is_empty() {
            warn!("No datasets matched {:?}", self.settings.datasets);
        }

        let mut rates = self.calculator.diff_snapshots(previous.as_ref(), &current);
        if self.settings.nonzero_only {
            retain_nonzero(&mut rates);
        }
        sort_rates(&mut rates, self.settings.sort);
        debug!(
            "Tick {}: {} datasets selected, {} rows",
            self.ticks,
            current.len(),
            rates.len()
        );

        let display = !(self.settings.skip_summary && self.ticks == 0);
        self.ticks += 1;
        self.phase = match self.settings.tick_budget() {
            Some(budget) if self.ticks >= budget => Phase::Terminated,
            _ => Phase::SteadyTick { previous: current },
        };

        if !display {
            return Ok(None);
        }
        let (header, rows) = render_table(&rates, self.settings.tree_view(), self.settings.unit);
        Ok(Some(Report {
            timestamp: self
                .settings
                .timestamp
                .map(|format| format_timestamp(format, chrono::Local::now())),
            header,
            rows,
        }))
    }
}

/// Main monitoring loop
pub async fn run(settings: Settings, demo_mode: bool) -> ZfsResult<()> {
    let source: Box<dyn CounterSource> = if demo_mode {
        Box::new(DemoCounterSource)
    } else {
        platform_source()?
    };
    let interval = settings.interval;
    let overwrite = settings.overwrite;
    let mut monitor = Monitor::new(settings, source)?;
    let mut terminal = Terminal::new();

    // Set up signal handler for Ctrl+C
    let (tx, mut rx) = mpsc::channel(1);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = tx.send(()).await;
        }
    });

    if overwrite {
        terminal.hide_cursor()?;
    }
    info!("Sampling every {:?}", interval);

    let result = sample(&mut monitor, &mut terminal, &mut rx, interval, overwrite).await;
    terminal.finish()?;
    result
}

async fn sample<O: Output>(
    monitor: &mut Monitor,
    terminal: &mut Terminal<O>,
    interrupts: &mut mpsc::Receiver<()>,
    interval: Duration,
    overwrite: bool,
) -> ZfsResult<()> {
    loop {
        if let Some(report) = monitor.tick().await? {
            terminal.print_report(&report, overwrite)?;
        }
        if monitor.is_terminated() {
            info!("Report count reached");
            return Ok(());
        }

        tokio::select! {
            Some(()) = interrupts.recv() => {
                // Ctrl+C received, exit gracefully
                info!("Interrupted");
                return Ok(());
            }
            _ = tokio::time::sleep(interval) => {
                // Time to refresh
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::terminal::{Recorded, RecordingOutput};
    use crate::zfs::{CounterRecord, ZfsError};
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Hands out prepared snapshots per pool, one per fetch
    struct ScriptedSource {
        snapshots: Mutex<VecDeque<Snapshot>>,
    }

    impl ScriptedSource {
        fn new(snapshots: Vec<Snapshot>) -> Box<Self> {
            Box::new(Self {
                snapshots: Mutex::new(snapshots.into()),
            })
        }
    }

    #[async_trait]
    impl CounterSource for ScriptedSource {
        async fn fetch(&self, pool: &str) -> ZfsResult<Snapshot> {
            self.snapshots
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| ZfsError::collection(pool, "no more snapshots"))
        }
    }

    fn record(name: &str, secs: u64, write_ops: u64, write_bytes: u64) -> CounterRecord {
        CounterRecord {
            timestamp: secs * 1_000_000_000,
            name: name.to_string(),
            write_ops,
            write_bytes,
            read_ops: 0,
            read_bytes: 0,
        }
    }

    fn snapshot(records: Vec<CounterRecord>) -> Snapshot {
        records.into_iter().collect()
    }

    fn settings(datasets: &[&str]) -> Settings {
        Settings {
            datasets: datasets.iter().map(|d| d.to_string()).collect(),
            ..Settings::default()
        }
    }

    fn columns(line: &str) -> Vec<&str> {
        line.split_whitespace().collect()
    }

    #[tokio::test]
    async fn test_two_ticks_one_second_apart() {
        let source = ScriptedSource::new(vec![
            snapshot(vec![record("tank/data", 10, 100, 1_000_000)]),
            snapshot(vec![record("tank/data", 11, 150, 1_500_000)]),
        ]);
        let mut monitor = Monitor::new(
            Settings {
                full_names: true,
                ..settings(&["tank/data"])
            },
            source,
        )
        .unwrap();

        let first = monitor.tick().await.unwrap().unwrap();
        // since-boot average: 100 ops over 10 seconds
        assert_eq!(columns(&first.rows[0])[1], "10.00");

        let second = monitor.tick().await.unwrap().unwrap();
        assert_eq!(
            columns(&second.rows[0]),
            vec!["tank/data", "50.00", "0.50", "0.00", "0.00", "10.00", "0.00"]
        );
    }

    #[tokio::test]
    async fn test_count_terminates() {
        let source = ScriptedSource::new(vec![
            snapshot(vec![record("tank", 1, 0, 0)]),
            snapshot(vec![record("tank", 2, 0, 0)]),
        ]);
        let mut monitor = Monitor::new(
            Settings {
                count: Some(2),
                ..settings(&["tank"])
            },
            source,
        )
        .unwrap();

        assert!(monitor.tick().await.unwrap().is_some());
        assert!(!monitor.is_terminated());
        assert!(monitor.tick().await.unwrap().is_some());
        assert!(monitor.is_terminated());
        assert!(monitor.tick().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_skip_summary_still_displays_count_reports() {
        let source = ScriptedSource::new(
            (1..=3)
                .map(|s| snapshot(vec![record("tank", s, s * 10, 0)]))
                .collect(),
        );
        let mut monitor = Monitor::new(
            Settings {
                count: Some(2),
                skip_summary: true,
                ..settings(&["tank"])
            },
            source,
        )
        .unwrap();

        assert!(monitor.tick().await.unwrap().is_none());
        let mut displayed = 0;
        while !monitor.is_terminated() {
            let report = monitor.tick().await.unwrap().unwrap();
            assert_eq!(columns(&report.rows[0])[1], "10.00");
            displayed += 1;
        }
        assert_eq!(displayed, 2);
    }

    #[tokio::test]
    async fn test_selection_and_tree_layout() {
        let source = ScriptedSource::new(vec![snapshot(vec![
            record("pool", 1, 0, 0),
            record("pool/a", 1, 0, 0),
            record("pool/a/x", 1, 0, 0),
            record("pool/b/y", 1, 0, 0),
            record("pool/ab", 1, 0, 0),
        ])]);
        let mut monitor = Monitor::new(settings(&["pool/a", "pool/b/y"]), source).unwrap();

        let report = monitor.tick().await.unwrap().unwrap();
        let labels: Vec<&str> = report.rows.iter().map(|r| columns(r)[0]).collect();
        assert_eq!(labels, vec!["pool", "a", "x", "b", "y"]);
        assert_eq!(report.rows[0], "pool");
        assert!(report.rows[3].starts_with("  b"));
    }

    #[tokio::test]
    async fn test_nonzero_only_drops_idle_rows() {
        let source = ScriptedSource::new(vec![
            snapshot(vec![record("tank/busy", 1, 10, 100), record("tank/idle", 1, 5, 50)]),
            snapshot(vec![record("tank/busy", 2, 20, 200), record("tank/idle", 2, 5, 50)]),
        ]);
        let mut monitor = Monitor::new(
            Settings {
                nonzero_only: true,
                ..settings(&["tank"])
            },
            source,
        )
        .unwrap();

        let first = monitor.tick().await.unwrap().unwrap();
        assert_eq!(first.rows.len(), 2);
        let second = monitor.tick().await.unwrap().unwrap();
        assert_eq!(second.rows.len(), 1);
        assert!(second.rows[0].starts_with("tank/busy"));
    }

    #[tokio::test]
    async fn test_collection_error_propagates() {
        let mut monitor = Monitor::new(settings(&["tank"]), ScriptedSource::new(vec![])).unwrap();
        let result = monitor.tick().await;
        assert!(matches!(result, Err(ZfsError::Collection { .. })));
    }

    #[tokio::test]
    async fn test_timestamp_line() {
        let source = ScriptedSource::new(vec![snapshot(vec![record("tank", 1, 0, 0)])]);
        let mut monitor = Monitor::new(
            Settings {
                timestamp: Some(TimestampFormat::Unix),
                ..settings(&["tank"])
            },
            source,
        )
        .unwrap();

        let report = monitor.tick().await.unwrap().unwrap();
        let timestamp = report.timestamp.as_deref().unwrap();
        assert!(timestamp.parse::<i64>().is_ok());
        assert_eq!(report.line_count(), 3);
    }

    #[tokio::test]
    async fn test_sample_overwrites_each_report_in_place() {
        let source = ScriptedSource::new(
            (1..=3)
                .map(|s| snapshot(vec![record("tank", s, s * 10, 0), record("tank/a", s, 0, 0)]))
                .collect(),
        );
        let mut monitor = Monitor::new(
            Settings {
                count: Some(3),
                timestamp: Some(TimestampFormat::Unix),
                ..settings(&["tank"])
            },
            source,
        )
        .unwrap();
        let output = RecordingOutput::default();
        let mut terminal = Terminal::with_output(output.clone());
        let (_tx, mut rx) = mpsc::channel(1);

        sample(&mut monitor, &mut terminal, &mut rx, Duration::from_millis(1), true)
            .await
            .unwrap();
        terminal.finish().unwrap();

        // timestamp, header and two rows per report
        assert_eq!(output.clears(), vec![4, 4]);
        assert_eq!(output.recorded().last(), Some(&Recorded::Line(String::new())));
    }

    #[tokio::test]
    async fn test_sample_stops_on_interrupt() {
        let source = ScriptedSource::new(vec![snapshot(vec![record("tank", 1, 0, 0)])]);
        let mut monitor = Monitor::new(settings(&["tank"]), source).unwrap();
        let output = RecordingOutput::default();
        let mut terminal = Terminal::with_output(output.clone());
        let (tx, mut rx) = mpsc::channel(1);
        tx.send(()).await.unwrap();

        sample(&mut monitor, &mut terminal, &mut rx, Duration::from_secs(3600), false)
            .await
            .unwrap();
        terminal.finish().unwrap();

        let recorded = output.recorded();
        assert_eq!(recorded.len(), 3);
        assert_eq!(recorded[2], Recorded::Line(String::new()));
        assert!(!monitor.is_terminated());
    }

    #[test]
    fn test_tree_view_auto_selection() {
        assert!(settings(&["tank"]).tree_view());
        assert!(
            !Settings {
                sort: SortKey::Rps,
                ..settings(&["tank"])
            }
            .tree_view()
        );
        assert!(
            !Settings {
                nonzero_only: true,
                ..settings(&["tank"])
            }
            .tree_view()
        );
    }

    #[test]
    fn test_tick_budget() {
        assert_eq!(settings(&["tank"]).tick_budget(), None);
        let counted = Settings {
            count: Some(3),
            ..settings(&["tank"])
        };
        assert_eq!(counted.tick_budget(), Some(3));
        assert_eq!(
            Settings {
                skip_summary: true,
                ..counted
            }
            .tick_budget(),
            Some(4)
        );
        assert_eq!(
            Settings {
                count: Some(u64::MAX),
                skip_summary: true,
                ..settings(&["tank"])
            }
            .tick_budget(),
            Some(u64::MAX)
        );
    }
}
