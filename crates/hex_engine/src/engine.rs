//! Core engine implementation

use crate::clock::{FixedInterval, FrameScheduler, IntervalScheduler, WallClockFrames};
use crate::config::{ConfigError, HexConfig};
use crate::ecs::{Context, DriverRequest, Hook, Kind, Scheduler, System, SystemId, World};
use crate::error::{BoxError, HexError, HexResult};
use crate::events::EventQueue;
use crate::foundation::logging;
use crate::foundation::profiler::Profiler;
use crate::foundation::time::TickTimer;
use thiserror::Error;

/// Lifecycle state of the tick driver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DriverState {
    /// Not ticking (initial state)
    #[default]
    Stopped,
    /// Ticking on every interval callback
    Running,
}

/// Main engine struct
///
/// Owns the world, the event queue and the systems, and drives them one
/// tick at a time. A tick runs every system in scheduler order, then drains
/// the event queue, then advances the tick counter.
pub struct Engine {
    /// Entity-component store
    pub world: World,

    /// Deferred event queue
    pub events: EventQueue,

    /// Registered systems
    pub systems: Scheduler,

    /// Engine configuration
    config: HexConfig,

    /// Tick-based timers
    timers: TickTimer,

    /// Operation counts, present when profiling is enabled
    profiler: Option<Profiler>,

    interval: Option<Box<dyn IntervalScheduler>>,
    frames: Option<Box<dyn FrameScheduler>>,

    state: DriverState,
    paused: bool,
    count: u64,

    /// Frame time accumulated since the last tick, in seconds
    time_since_tick: f64,
}

impl Engine {
    /// Create a new engine instance
    pub fn new(config: HexConfig) -> Result<Self, EngineError> {
        config.validate()?;
        logging::init(&config.log);
        log::debug!("Initializing engine...");

        let profiler = config.enable_profiling.then(Profiler::default);
        Ok(Self {
            world: World::new(),
            events: EventQueue::new(),
            systems: Scheduler::new(),
            config,
            timers: TickTimer::new(),
            profiler,
            interval: Some(Box::new(FixedInterval)),
            frames: Some(Box::new(WallClockFrames::new())),
            state: DriverState::Stopped,
            paused: false,
            count: 0,
            time_since_tick: 0.0,
        })
    }

    /// Replace the collaborator that paces ticks
    pub fn with_interval_scheduler(mut self, scheduler: impl IntervalScheduler + 'static) -> Self {
        self.interval = Some(Box::new(scheduler));
        self
    }

    /// Replace the collaborator that paces frames
    pub fn with_frame_scheduler(mut self, scheduler: impl FrameScheduler + 'static) -> Self {
        self.frames = Some(Box::new(scheduler));
        self
    }

    /// Build a system with access to the engine and register it as a
    /// dependency graph node
    ///
    /// The kind is checked before `factory` runs, so a duplicate is never
    /// constructed.
    pub fn add_system<S, F>(&mut self, factory: F) -> HexResult<SystemId>
    where
        S: System,
        F: FnOnce(&mut Context<'_>) -> S,
    {
        let system = self.build(factory)?;
        self.systems.add(system)
    }

    /// Build a system and register it as a pre or post hook
    pub fn add_hook<S, F>(&mut self, hook: Hook, factory: F) -> HexResult<SystemId>
    where
        S: System,
        F: FnOnce(&mut Context<'_>) -> S,
    {
        let system = self.build(factory)?;
        self.systems.add_hook(hook, system)
    }

    /// Declare that `consumer` runs after `dependency`
    pub fn use_system(&mut self, consumer: Kind, dependency: Kind) -> HexResult<()> {
        self.systems.add_dependency(consumer, dependency)
    }

    /// Reset the tick counter, switch to running and hand the tick callback
    /// to the interval scheduler
    ///
    /// Returns when the interval scheduler returns. A failing system or
    /// listener aborts the run with its error.
    pub fn start(&mut self) -> Result<(), EngineError> {
        self.count = 0;
        self.time_since_tick = 0.0;
        self.state = DriverState::Running;
        log::debug!("[HEX] Engine started.");

        let Some(mut ticks) = self.interval.take() else {
            return Ok(());
        };
        let mut frames = self.frames.take();
        let interval = self.config.tick_interval;

        let result = ticks.schedule(interval, &mut |delta| {
            let state = self.tick(delta)?;
            if let Some(frames) = frames.as_mut() {
                if self.config.enable_rendering && self.is_running() {
                    frames.request_frame(&mut |elapsed| self.frame(elapsed).map(|_| ()))?;
                }
            }
            Ok(state)
        });

        self.interval = Some(ticks);
        self.frames = frames;
        result
    }

    /// Stop the driver
    pub fn stop(&mut self) {
        if self.state == DriverState::Stopped {
            return;
        }
        self.state = DriverState::Stopped;
        log::debug!("[HEX] Engine stopped after {} ticks.", self.count);
        if let Some(profiler) = &self.profiler {
            profiler.report();
        }
    }

    /// Toggle the paused flag
    pub fn pause(&mut self) {
        self.paused = !self.paused;
        log::debug!("[HEX] Engine {}.", if self.paused { "paused" } else { "unpaused" });
    }

    /// Clear the paused flag
    pub fn resume(&mut self) {
        if self.paused {
            self.paused = false;
            log::debug!("[HEX] Engine resumed.");
        }
    }

    /// Tick callback
    ///
    /// Does nothing while stopped or paused. Stops the driver instead of
    /// ticking once `max_ticks` ticks have run. Stop and pause requests
    /// made by systems through their [`Context`] take effect once the
    /// tick is over; the tick itself still completes.
    pub fn tick(&mut self, delta: f64) -> Result<DriverState, EngineError> {
        if self.state == DriverState::Stopped || self.paused {
            return Ok(self.state);
        }
        if self.config.max_ticks.is_some_and(|max| self.count >= max) {
            self.stop();
            return Ok(self.state);
        }

        let mut ctx = Context::new(&self.config, &mut self.world, &mut self.events, self.count);
        let result = self.systems.run(&mut ctx, delta, self.profiler.as_mut());
        let requests = ctx.take_requests();
        let result = result.and_then(|()| self.events.process_events());

        if result.is_ok() {
            self.count += 1;
            self.time_since_tick = 0.0;
            if let Some(profiler) = self.profiler.as_mut() {
                profiler.end_tick();
            }
        }
        self.apply(requests);
        result.map(|()| self.state)
    }

    /// Frame callback
    ///
    /// Adds `elapsed` seconds to the time since the last tick and calls
    /// every system's render hook with the resulting fraction of a tick,
    /// clamped to `[0, 1]`. Returns the fraction, or `None` when rendering
    /// is disabled or the driver is stopped.
    pub fn frame(&mut self, elapsed: f64) -> Result<Option<f64>, EngineError> {
        if !self.config.enable_rendering || !self.is_running() {
            return Ok(None);
        }
        self.time_since_tick += elapsed;
        let interpolation = (self.time_since_tick / self.config.tick_interval).clamp(0.0, 1.0);
        self.systems.render(interpolation)?;
        Ok(Some(interpolation))
    }

    /// Ticks completed since the last start
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Current driver state
    pub fn state(&self) -> DriverState {
        self.state
    }

    /// Whether the driver is running
    pub fn is_running(&self) -> bool {
        self.state == DriverState::Running
    }

    /// Whether ticks are currently skipped
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Engine configuration
    pub fn config(&self) -> &HexConfig {
        &self.config
    }

    /// Start a tick-based timer at the current tick
    pub fn start_timer(&mut self, label: impl Into<String>) {
        self.timers.start(label, self.count);
    }

    /// Stop a timer and return the ticks elapsed since it was started
    pub fn end_timer(&mut self, label: &str) -> HexResult<u64> {
        self.timers.end(label, self.count)
    }

    /// Operation counts, when profiling is enabled
    pub fn profiler(&self) -> Option<&Profiler> {
        self.profiler.as_ref()
    }

    fn build<S, F>(&mut self, factory: F) -> HexResult<S>
    where
        S: System,
        F: FnOnce(&mut Context<'_>) -> S,
    {
        self.systems.ensure_vacant(S::KIND)?;
        let mut ctx = Context::new(&self.config, &mut self.world, &mut self.events, self.count);
        let system = factory(&mut ctx);
        let requests = ctx.take_requests();
        self.apply(requests);
        Ok(system)
    }

    fn apply(&mut self, requests: Vec<DriverRequest>) {
        for request in requests {
            match request {
                DriverRequest::Stop => self.stop(),
                DriverRequest::Pause => self.pause(),
                DriverRequest::Resume => self.resume(),
            }
        }
    }
}

/// Engine errors
#[derive(Error, Debug)]
pub enum EngineError {
    /// Error raised by the entity store, scheduler or event queue
    #[error(transparent)]
    Hex(#[from] HexError),

    /// A system's run failed
    #[error("System {kind} failed: {source}")]
    System {
        /// Kind of the failing system
        kind: Kind,
        /// Error returned by the system
        #[source]
        source: BoxError,
    },

    /// An event listener failed
    #[error("Listener for {kind} failed: {source}")]
    Listener {
        /// Kind of the event being delivered
        kind: Kind,
        /// Error returned by the listener
        #[source]
        source: BoxError,
    },

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}
