//! Status reporting for on-device display and log output

use crate::error::Result;
use std::time::{Duration, Instant};

/// A small ordered set of label→text lines describing the robot's state.
/// Line order is insertion order, matching the fixed layout of a small
/// display.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StatusReport {
    lines: Vec<(String, String)>,
}

impl StatusReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a line by label, updating in place if the label already
    /// exists, otherwise appending.
    pub fn set(&mut self, label: &str, text: impl Into<String>) {
        let text = text.into();
        match self.lines.iter_mut().find(|(l, _)| l == label) {
            Some((_, existing)) => *existing = text,
            None => self.lines.push((label.to_string(), text)),
        }
    }

    pub fn lines(&self) -> &[(String, String)] {
        &self.lines
    }

    /// Single-line rendering for log output
    pub fn render(&self) -> String {
        self.lines
            .iter()
            .map(|(label, text)| format!("{}: {}", label, text))
            .collect::<Vec<_>>()
            .join(" | ")
    }
}

/// Status display collaborator
pub trait StatusSink: Send {
    fn publish(&mut self, report: &StatusReport) -> Result<()>;
}

/// Status sink that writes to the log, throttled to 1 Hz so the
/// per-cycle publishing does not flood the output.
pub struct LogStatusSink {
    last_log: Option<Instant>,
}

impl LogStatusSink {
    pub fn new() -> Self {
        Self { last_log: None }
    }
}

impl Default for LogStatusSink {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusSink for LogStatusSink {
    fn publish(&mut self, report: &StatusReport) -> Result<()> {
        let should_log = match self.last_log {
            Some(last) => last.elapsed() >= Duration::from_secs(1),
            None => true,
        };

        if should_log {
            log::info!("Status: {}", report.render());
            self.last_log = Some(Instant::now());
        }

        Ok(())
    }
}
