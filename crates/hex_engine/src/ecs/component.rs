//! Component trait and type-erased component storage

use std::any::Any;
use std::fmt;

/// Discriminant tag identifying a component, system or event variant
pub type Kind = &'static str;

/// Data attached to an entity
///
/// An entity carries at most one component per `KIND`.
///
/// ```
/// use hex_engine::ecs::Component;
///
/// #[derive(Debug)]
/// struct Position { x: f32, y: f32 }
///
/// impl Component for Position {
///     const KIND: &'static str = "Position";
/// }
/// ```
pub trait Component: Any + fmt::Debug {
    /// Discriminant of this component type
    const KIND: Kind;
}

/// Object-safe view of a [`Component`]
pub trait AnyComponent: Any + fmt::Debug {
    /// Discriminant of the stored value
    fn kind(&self) -> Kind;
    /// Upcast for downcasting to the concrete type
    fn as_any(&self) -> &dyn Any;
    /// Mutable upcast for downcasting to the concrete type
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Component> AnyComponent for T {
    fn kind(&self) -> Kind {
        T::KIND
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

impl dyn AnyComponent {
    /// Downcast to a concrete component type
    pub fn downcast_ref<T: Component>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    /// Mutably downcast to a concrete component type
    pub fn downcast_mut<T: Component>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut::<T>()
    }
}
