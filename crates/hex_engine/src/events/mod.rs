//! Deferred event queue
//!
//! Key principles:
//! - Registration system (only kinds with listeners accept events)
//! - Events are queued on emit and delivered only when the queue is drained
//! - Listeners run by descending priority, ties in registration order
//!
//! Emitting an event of a kind nobody listens to drops it on the spot; a
//! listener registered afterwards never sees it.

use crate::ecs::Kind;
use crate::engine::EngineError;
use crate::error::{BoxError, ErrorDomain, HexError};
use crate::foundation::collections::{new_key_type, SlotMap};
use std::any::Any;
use std::collections::{HashMap, VecDeque};

/// A value delivered to listeners registered for its `KIND`
pub trait Event: Any {
    /// Discriminant of this event type
    const KIND: Kind;
}

/// Object-safe view of an [`Event`]
trait AnyEvent: Any {
    fn kind(&self) -> Kind;
    fn as_any(&self) -> &dyn Any;
}

impl<E: Event> AnyEvent for E {
    fn kind(&self) -> Kind {
        E::KIND
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

new_key_type! {
    /// Handle identifying a registered listener
    pub struct ListenerId;
}

type Callback = Box<dyn FnMut(&dyn Any) -> Result<(), BoxError>>;

struct Listener {
    kind: Kind,
    priority: i32,
    once: bool,
    callback: Callback,
}

/// Listener registry plus a single FIFO of pending events
#[derive(Default)]
pub struct EventQueue {
    listeners: SlotMap<ListenerId, Listener>,
    by_kind: HashMap<Kind, Vec<ListenerId>>,
    queue: VecDeque<Box<dyn AnyEvent>>,
}

impl EventQueue {
    /// Create an empty queue
    pub fn new() -> Self {
        log::debug!("[HEX] Events Initialized.");
        Self::default()
    }

    /// Register a listener for `E` with priority 0
    pub fn on<E, F>(&mut self, listener: F) -> ListenerId
    where
        E: Event,
        F: FnMut(&E) -> Result<(), BoxError> + 'static,
    {
        self.register(listener, 0, false)
    }

    /// Register a listener for `E`; higher priorities run first
    pub fn on_priority<E, F>(&mut self, priority: i32, listener: F) -> ListenerId
    where
        E: Event,
        F: FnMut(&E) -> Result<(), BoxError> + 'static,
    {
        self.register(listener, priority, false)
    }

    /// Register a listener that unregisters itself after its first
    /// successful invocation
    pub fn once<E, F>(&mut self, priority: i32, listener: F) -> ListenerId
    where
        E: Event,
        F: FnMut(&E) -> Result<(), BoxError> + 'static,
    {
        self.register(listener, priority, true)
    }

    /// Unregister a listener, returning whether it was registered
    pub fn off(&mut self, id: ListenerId) -> bool {
        let Some(listener) = self.listeners.remove(id) else {
            return false;
        };
        if let Some(ids) = self.by_kind.get_mut(listener.kind) {
            ids.retain(|&other| other != id);
        }
        true
    }

    /// Queue an event for the next drain
    ///
    /// Returns `false` when no listener is registered for the event's kind,
    /// in which case the event is dropped.
    pub fn emit<E: Event>(&mut self, event: E) -> bool {
        if self.listener_count(E::KIND) == 0 {
            log::debug!("Dropping {} event: no listeners", E::KIND);
            return false;
        }
        self.queue.push_back(Box::new(event));
        true
    }

    /// Deliver every queued event, in emit order, to the listeners
    /// currently registered for its kind
    ///
    /// A failing listener stops the drain; events still queued behind it
    /// stay queued.
    pub fn process_events(&mut self) -> Result<(), EngineError> {
        while let Some(event) = self.queue.pop_front() {
            let kind = event.kind();
            let Some(ids) = self.by_kind.get(kind).cloned() else {
                continue;
            };

            for id in ids {
                let Some(listener) = self.listeners.get_mut(id) else {
                    continue;
                };
                (listener.callback)(event.as_any())
                    .map_err(|source| EngineError::Listener { kind, source })?;
                if listener.once {
                    self.off(id);
                }
            }
        }
        Ok(())
    }

    /// Number of listeners registered for `kind`
    pub fn listener_count(&self, kind: Kind) -> usize {
        self.by_kind.get(kind).map_or(0, Vec::len)
    }

    /// Number of queued events
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Drop every queued event
    pub fn clear(&mut self) {
        self.queue.clear();
    }

    fn register<E, F>(&mut self, mut listener: F, priority: i32, once: bool) -> ListenerId
    where
        E: Event,
        F: FnMut(&E) -> Result<(), BoxError> + 'static,
    {
        let callback: Callback = Box::new(move |event: &dyn Any| {
            let event = event.downcast_ref::<E>().ok_or_else(|| {
                HexError::type_mismatch(ErrorDomain::Event, format!("event is not a {}", E::KIND))
            })?;
            listener(event)
        });
        let id = self.listeners.insert(Listener {
            kind: E::KIND,
            priority,
            once,
            callback,
        });

        let listeners = &self.listeners;
        let ids = self.by_kind.entry(E::KIND).or_default();
        let position = ids
            .iter()
            .position(|&other| listeners[other].priority < priority)
            .unwrap_or(ids.len());
        ids.insert(position, id);
        id
    }
}
