//! Tick and frame pacing
//!
//! The engine never decides on its own when a tick or a frame happens; it
//! hands callbacks to an [`IntervalScheduler`] and a [`FrameScheduler`].
//! Swapping in [`ManualInterval`] and [`FixedFrames`] makes a run fully
//! deterministic.

use crate::engine::{DriverState, EngineError};
use crate::foundation::time::Stopwatch;
use std::time::Duration;

/// Tick callback: receives the delta in seconds, reports the driver state
pub type TickCallback<'a> = dyn FnMut(f64) -> Result<DriverState, EngineError> + 'a;

/// Frame callback: receives the wall time in seconds since the previous frame
pub type FrameCallback<'a> = dyn FnMut(f64) -> Result<(), EngineError> + 'a;

/// Invokes the tick callback repeatedly
pub trait IntervalScheduler {
    /// Drive `next` every `interval` seconds
    ///
    /// Returns once the scheduler is done or `next` fails.
    fn schedule(&mut self, interval: f64, next: &mut TickCallback<'_>) -> Result<(), EngineError>;
}

/// One-shot "call me on the next frame" primitive
pub trait FrameScheduler {
    /// Invoke `render` once, for the next frame
    fn request_frame(&mut self, render: &mut FrameCallback<'_>) -> Result<(), EngineError>;
}

/// Sleeps `interval` seconds on the calling thread between ticks until the
/// driver stops
#[derive(Debug, Default, Clone, Copy)]
pub struct FixedInterval;

impl IntervalScheduler for FixedInterval {
    fn schedule(&mut self, interval: f64, next: &mut TickCallback<'_>) -> Result<(), EngineError> {
        let period = Duration::from_secs_f64(interval);
        loop {
            std::thread::sleep(period);
            if next(interval)? == DriverState::Stopped {
                return Ok(());
            }
        }
    }
}

/// Invokes the tick callback a fixed number of times without sleeping
#[derive(Debug, Clone, Copy)]
pub struct ManualInterval {
    calls: u64,
}

impl ManualInterval {
    /// Scheduler that ticks exactly `calls` times per `schedule`
    pub fn new(calls: u64) -> Self {
        Self { calls }
    }
}

impl IntervalScheduler for ManualInterval {
    fn schedule(&mut self, interval: f64, next: &mut TickCallback<'_>) -> Result<(), EngineError> {
        for _ in 0..self.calls {
            next(interval)?;
        }
        Ok(())
    }
}

/// Reports the wall time elapsed since the previous frame
#[derive(Default)]
pub struct WallClockFrames {
    stopwatch: Stopwatch,
}

impl WallClockFrames {
    /// Create a frame scheduler; the first frame reports zero elapsed time
    pub fn new() -> Self {
        Self::default()
    }
}

impl FrameScheduler for WallClockFrames {
    fn request_frame(&mut self, render: &mut FrameCallback<'_>) -> Result<(), EngineError> {
        let elapsed = self.stopwatch.elapsed_secs();
        self.stopwatch.restart();
        render(elapsed)
    }
}

/// Reports the same elapsed time for every frame
#[derive(Debug, Clone, Copy)]
pub struct FixedFrames(pub f64);

impl FrameScheduler for FixedFrames {
    fn request_frame(&mut self, render: &mut FrameCallback<'_>) -> Result<(), EngineError> {
        render(self.0)
    }
}
