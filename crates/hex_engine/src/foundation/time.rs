//! Time management utilities

use crate::error::{ErrorDomain, HexError, HexResult};
use std::collections::HashMap;
use std::time::Instant;

/// Wall-clock lap timer
///
/// Reads zero until the first restart.
#[derive(Debug, Default)]
pub struct Stopwatch {
    lap_start: Option<Instant>,
}

impl Stopwatch {
    /// Create a stopwatch that has not been started
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin a new lap now
    pub fn restart(&mut self) {
        self.lap_start = Some(Instant::now());
    }

    /// Seconds since the last restart
    pub fn elapsed_secs(&self) -> f64 {
        self.lap_start.map_or(0.0, |start| start.elapsed().as_secs_f64())
    }
}

/// Label-keyed timers measured in simulation ticks rather than wall time
#[derive(Debug, Default)]
pub struct TickTimer {
    start_ticks: HashMap<String, u64>,
}

impl TickTimer {
    /// Create an empty timer set
    pub fn new() -> Self {
        Self::default()
    }

    /// Start (or restart) the timer `label` at tick `now`
    pub fn start(&mut self, label: impl Into<String>, now: u64) {
        self.start_ticks.insert(label.into(), now);
    }

    /// Stop the timer `label` and return the ticks elapsed since it started
    pub fn end(&mut self, label: &str, now: u64) -> HexResult<u64> {
        let start = self.start_ticks.remove(label).ok_or_else(|| {
            HexError::not_found(ErrorDomain::System, format!("timer not started: {label}"))
        })?;
        let elapsed = now.saturating_sub(start);
        log::debug!("[PERF] {}: {} ticks", label, elapsed);
        Ok(elapsed)
    }
}
