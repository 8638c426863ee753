//! System trait and implementations

use super::component::Kind;
use super::World;
use crate::config::HexConfig;
use crate::error::BoxError;
use crate::events::EventQueue;
use std::any::Any;

/// Change to the tick driver asked for from inside a system
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverRequest {
    /// Stop the driver
    Stop,
    /// Toggle the paused flag
    Pause,
    /// Clear the paused flag
    Resume,
}

/// Engine state a system sees while it is constructed or run
pub struct Context<'a> {
    /// Engine configuration
    pub config: &'a HexConfig,
    /// Entity-component store
    pub world: &'a mut World,
    /// Event queue; emitted events are delivered after every system ran
    pub events: &'a mut EventQueue,
    /// Ticks completed so far
    pub tick: u64,
    requests: Vec<DriverRequest>,
}

impl<'a> Context<'a> {
    /// Create a context with no pending driver requests
    pub fn new(
        config: &'a HexConfig,
        world: &'a mut World,
        events: &'a mut EventQueue,
        tick: u64,
    ) -> Self {
        Self {
            config,
            world,
            events,
            tick,
            requests: Vec::new(),
        }
    }

    /// Stop the driver once the current pass is over
    ///
    /// The remaining systems still run and events are still drained.
    pub fn stop(&mut self) {
        self.requests.push(DriverRequest::Stop);
    }

    /// Toggle the paused flag once the current pass is over
    pub fn pause(&mut self) {
        self.requests.push(DriverRequest::Pause);
    }

    /// Clear the paused flag once the current pass is over
    pub fn resume(&mut self) {
        self.requests.push(DriverRequest::Resume);
    }

    /// Take the pending driver requests, oldest first
    pub(crate) fn take_requests(&mut self) -> Vec<DriverRequest> {
        std::mem::take(&mut self.requests)
    }
}

/// Stateful per-tick behavior
///
/// At most one system per `KIND` can be registered with a scheduler.
pub trait System: Any {
    /// Discriminant of this system type
    const KIND: Kind;

    /// Advance the system by `delta` seconds
    fn run(&mut self, ctx: &mut Context<'_>, delta: f64) -> Result<(), BoxError>;

    /// Draw the system's state, `interpolation` being the fraction of a
    /// tick elapsed since the last update
    fn render(&mut self, _interpolation: f64) {}

    /// Kinds of the systems that must run before this one
    ///
    /// Applied once, when the system is registered.
    fn dependencies(&self) -> Vec<Kind> {
        Vec::new()
    }
}

/// Object-safe view of a [`System`]
pub trait AnySystem: Any {
    /// Discriminant of the stored system
    fn kind(&self) -> Kind;
    /// Forward to [`System::run`]
    fn run(&mut self, ctx: &mut Context<'_>, delta: f64) -> Result<(), BoxError>;
    /// Forward to [`System::render`]
    fn render(&mut self, interpolation: f64);
    /// Upcast for downcasting to the concrete type
    fn as_any(&self) -> &dyn Any;
    /// Mutable upcast for downcasting to the concrete type
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<S: System> AnySystem for S {
    fn kind(&self) -> Kind {
        S::KIND
    }

    fn run(&mut self, ctx: &mut Context<'_>, delta: f64) -> Result<(), BoxError> {
        System::run(self, ctx, delta)
    }

    fn render(&mut self, interpolation: f64) {
        System::render(self, interpolation);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requests_are_queued_in_order() {
        let config = HexConfig::new();
        let mut world = World::new();
        let mut events = EventQueue::new();
        let mut ctx = Context::new(&config, &mut world, &mut events, 0);

        ctx.pause();
        ctx.stop();
        ctx.resume();
        assert_eq!(
            ctx.take_requests(),
            vec![DriverRequest::Pause, DriverRequest::Stop, DriverRequest::Resume]
        );
        assert!(ctx.take_requests().is_empty());
    }
}
