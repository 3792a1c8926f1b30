use super::formatter::Report;
use console::{Style, Term};
use std::io;

/// Line-level terminal operations the report printer relies on
pub trait Output {
    fn write_line(&self, line: &str) -> io::Result<()>;
    fn clear_last_lines(&self, n: usize) -> io::Result<()>;
    fn hide_cursor(&self) -> io::Result<()>;
    fn show_cursor(&self) -> io::Result<()>;
    fn flush(&self) -> io::Result<()>;
}

impl Output for Term {
    fn write_line(&self, line: &str) -> io::Result<()> {
        Term::write_line(self, line)
    }

    fn clear_last_lines(&self, n: usize) -> io::Result<()> {
        Term::clear_last_lines(self, n)
    }

    fn hide_cursor(&self) -> io::Result<()> {
        Term::hide_cursor(self)
    }

    fn show_cursor(&self) -> io::Result<()> {
        Term::show_cursor(self)
    }

    fn flush(&self) -> io::Result<()> {
        Term::flush(self)
    }
}

/// Terminal output with optional overwrite-in-place of the previous report
pub struct Terminal<O: Output = Term> {
    pub supports_color: bool,
    output: O,
    printed_lines: usize,
    cursor_hidden: bool,
}

impl Terminal<Term> {
    pub fn new() -> Self {
        Self {
            supports_color: console::colors_enabled(),
            ..Terminal::with_output(Term::stdout())
        }
    }
}

impl<O: Output> Terminal<O> {
    pub fn with_output(output: O) -> Self {
        Self {
            supports_color: false,
            output,
            printed_lines: 0,
            cursor_hidden: false,
        }
    }

    /// Print one report.
    ///
    /// With `overwrite`, the previously printed report is erased first.
    pub fn print_report(&mut self, report: &Report, overwrite: bool) -> io::Result<()> {
        if overwrite && self.printed_lines > 0 {
            self.output.clear_last_lines(self.printed_lines)?;
        }
        if let Some(timestamp) = &report.timestamp {
            self.output.write_line(timestamp)?;
        }
        let header = self.header_style().apply_to(&report.header).to_string();
        self.output.write_line(&header)?;
        for row in &report.rows {
            self.output.write_line(row)?;
        }
        self.printed_lines = report.line_count();
        self.output.flush()
    }

    /// Hide cursor during updates to prevent flicker
    pub fn hide_cursor(&mut self) -> io::Result<()> {
        self.cursor_hidden = true;
        self.output.hide_cursor()
    }

    /// Restore the cursor and leave a trailing blank line
    pub fn finish(&mut self) -> io::Result<()> {
        if self.cursor_hidden {
            self.output.show_cursor()?;
            self.cursor_hidden = false;
        }
        self.output.write_line("")
    }

    fn header_style(&self) -> Style {
        let style = Style::new();
        if self.supports_color {
            style.bold()
        } else {
            style
        }
    }
}

impl Default for Terminal<Term> {
    fn default() -> Self {
        Self::new()
    }
}

/// Terminal operation captured by [`RecordingOutput`]
#[cfg(test)]
#[derive(Debug, Clone, PartialEq)]
pub enum Recorded {
    Line(String),
    Clear(usize),
    HideCursor,
    ShowCursor,
}

/// Output that remembers every operation instead of touching a terminal.
/// Clones share the same log.
#[cfg(test)]
#[derive(Debug, Clone, Default)]
pub struct RecordingOutput {
    log: std::sync::Arc<std::sync::Mutex<Vec<Recorded>>>,
}

#[cfg(test)]
impl RecordingOutput {
    pub fn recorded(&self) -> Vec<Recorded> {
        self.log.lock().unwrap().clone()
    }

    /// Line counts passed to every `clear_last_lines` call
    pub fn clears(&self) -> Vec<usize> {
        self.recorded()
            .into_iter()
            .filter_map(|op| match op {
                Recorded::Clear(n) => Some(n),
                _ => None,
            })
            .collect()
    }

    fn push(&self, op: Recorded) -> io::Result<()> {
        self.log.lock().unwrap().push(op);
        Ok(())
    }
}

#[cfg(test)]
impl Output for RecordingOutput {
    fn write_line(&self, line: &str) -> io::Result<()> {
        self.push(Recorded::Line(line.to_string()))
    }

    fn clear_last_lines(&self, n: usize) -> io::Result<()> {
        self.push(Recorded::Clear(n))
    }

    fn hide_cursor(&self) -> io::Result<()> {
        self.push(Recorded::HideCursor)
    }

    fn show_cursor(&self) -> io::Result<()> {
        self.push(Recorded::ShowCursor)
    }

    fn flush(&self) -> io::Result<()> {
        Ok(())
    }
}
