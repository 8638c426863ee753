//! Entity-Component-System implementation
//!
//! Entities are bundles of kind-tagged components held by a [`World`];
//! systems are kind-tagged behaviors ordered by a [`Scheduler`].

pub mod world;
pub mod entity;
pub mod component;
pub mod system;
pub mod query;
pub mod scheduler;

pub use world::{ComponentList, World};
pub use entity::Entity;
pub use component::{AnyComponent, Component, Kind};
pub use system::{AnySystem, Context, DriverRequest, System};
pub use scheduler::{Hook, Scheduler, SystemId};

#[cfg(test)]
mod tests;
