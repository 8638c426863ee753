//! Operation counting profiler
//!
//! Counts how often labelled operations happen across a run and how many
//! ticks the run lasted.

use std::collections::BTreeMap;

/// Counts labelled operations per run
#[derive(Debug, Clone)]
pub struct Profiler {
    label: String,
    counts: BTreeMap<String, u64>,
    total_ticks: u64,
}

impl Profiler {
    /// Create a profiler whose report is headed by `label`
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            counts: BTreeMap::new(),
            total_ticks: 0,
        }
    }

    /// Record one occurrence of `label`
    pub fn track(&mut self, label: &str) {
        *self.counts.entry(label.to_string()).or_insert(0) += 1;
    }

    /// Finish a tick, returning the tick count before this call
    pub fn end_tick(&mut self) -> u64 {
        let previous = self.total_ticks;
        self.total_ticks += 1;
        previous
    }

    /// Ticks recorded so far
    pub fn total_ticks(&self) -> u64 {
        self.total_ticks
    }

    /// Occurrences of `label`
    pub fn count(&self, label: &str) -> u64 {
        self.counts.get(label).copied().unwrap_or(0)
    }

    /// Build the report lines and log them at info level
    pub fn report(&self) -> Vec<String> {
        let mut lines = Vec::with_capacity(self.counts.len() + 1);
        lines.push(format!("[{}] Total ticks: {}", self.label, self.total_ticks));
        for (label, count) in &self.counts {
            let plural = if *count == 1 { "" } else { "s" };
            lines.push(format!("\t{label}: {count} operation{plural}"));
        }
        for line in &lines {
            log::info!("{}", line);
        }
        lines
    }
}

impl Default for Profiler {
    fn default() -> Self {
        Self::new("Profiler Report")
    }
}
