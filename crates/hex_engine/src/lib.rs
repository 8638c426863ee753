//! # Hex Engine
//!
//! A small, single-threaded simulation core built around an
//! Entity-Component-System.
//!
//! ## Features
//!
//! - **Entity-Component Store**: kind-tagged components with per-kind indices
//! - **System Scheduler**: dependency-ordered systems with pre/post hooks
//! - **Event Queue**: prioritized listeners, events delivered once per tick
//! - **Tick Driver**: fixed-interval ticks with an optional interpolated render pass
//!
//! ## Quick Start
//!
//! ```rust
//! use hex_engine::prelude::*;
//! use hex_engine::clock::ManualInterval;
//!
//! #[derive(Debug)]
//! struct Velocity(f64);
//!
//! impl Component for Velocity {
//!     const KIND: Kind = "Velocity";
//! }
//!
//! struct Movement;
//!
//! impl System for Movement {
//!     const KIND: Kind = "Movement";
//!
//!     fn run(&mut self, ctx: &mut Context<'_>, delta: f64) -> Result<(), BoxError> {
//!         ctx.world.for_each_mut::<Velocity, _>(|_, velocity| velocity.0 *= 1.0 - delta)?;
//!         Ok(())
//!     }
//! }
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = HexConfig::new().with_max_ticks(10).with_log_level("warn");
//!     let mut engine = Engine::new(config)?.with_interval_scheduler(ManualInterval::new(11));
//!
//!     let ship = engine.world.create();
//!     engine.world.add(ship, Velocity(1.0))?;
//!     engine.add_system(|_| Movement)?;
//!
//!     engine.start()?;
//!     assert_eq!(engine.count(), 10);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod error;
pub mod config;
pub mod foundation;
pub mod ecs;
pub mod events;
pub mod clock;

mod engine;

pub use engine::{DriverState, Engine, EngineError};
pub use error::{BoxError, ErrorDomain, ErrorKind, HexError, HexResult};

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        BoxError, DriverState, Engine, EngineError, HexError, HexResult,
        clock::{FrameScheduler, IntervalScheduler},
        config::{Config, HexConfig},
        ecs::{Component, Context, Entity, Hook, Kind, System, World},
        events::{Event, EventQueue, ListenerId},
    };
}
