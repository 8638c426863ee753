//! System Scheduling and Dependency Management
//!
//! Systems live in an arena addressed by [`SystemId`]. Systems added with
//! [`Scheduler::add`] are nodes of a dependency graph whose edges are stored
//! as "system -> the systems it depends on". Hook systems bypass the graph
//! and always run first (`Pre`) or last (`Post`).
//!
//! The graph is acyclic at all times: an edge that would close a cycle is
//! rejected before it is stored. The execution order is cached and only
//! recomputed after a structural change.

use super::component::Kind;
use super::system::{AnySystem, Context, System};
use crate::engine::EngineError;
use crate::error::{ErrorDomain, HexError, HexResult};
use crate::foundation::profiler::Profiler;
use std::collections::{HashMap, HashSet, VecDeque};

/// Arena index of a registered system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SystemId(usize);

/// Fixed execution slots outside the dependency graph
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hook {
    /// Runs before every graph system
    Pre,
    /// Runs after every graph system
    Post,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Placement {
    Graph,
    Hook(Hook),
}

struct SystemSlot {
    system: Box<dyn AnySystem>,
    placement: Placement,
    /// Systems this one depends on (graph systems only)
    dependencies: Vec<SystemId>,
}

/// Registry of systems ordered by declared dependencies
#[derive(Default)]
pub struct Scheduler {
    slots: Vec<SystemSlot>,
    lookup: HashMap<Kind, SystemId>,
    nodes: Vec<SystemId>,
    pre: Vec<SystemId>,
    post: Vec<SystemId>,
    order: Vec<SystemId>,
    dirty: bool,
}

impl Scheduler {
    /// Create an empty scheduler
    pub fn new() -> Self {
        log::debug!("[HEX] Systems Initialized.");
        Self::default()
    }

    /// Number of registered systems, hooks included
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether no system is registered
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Whether a system of `kind` is registered
    pub fn contains(&self, kind: Kind) -> bool {
        self.lookup.contains_key(kind)
    }

    /// Fail with `Exists` if a system of `kind` is registered
    pub fn ensure_vacant(&self, kind: Kind) -> HexResult<()> {
        if self.contains(kind) {
            return Err(HexError::exists(
                ErrorDomain::System,
                format!("System ({kind}) already exists."),
            ));
        }
        Ok(())
    }

    /// Register a system as a new graph node
    ///
    /// The dependencies the system declares are applied right away; if one
    /// of them is unknown or would close a cycle the registration is undone
    /// and the error returned.
    pub fn add<S: System>(&mut self, system: S) -> HexResult<SystemId> {
        self.ensure_vacant(S::KIND)?;
        log::debug!("Adding system: {}", S::KIND);

        let declared = system.dependencies();
        let id = self.insert(Box::new(system), Placement::Graph);
        self.nodes.push(id);
        self.dirty = true;

        for dependency in declared {
            if let Err(error) = self.add_dependency(S::KIND, dependency) {
                self.rollback_last(S::KIND);
                return Err(error);
            }
        }
        Ok(id)
    }

    /// Register a system in the fixed pre or post list
    pub fn add_hook<S: System>(&mut self, hook: Hook, system: S) -> HexResult<SystemId> {
        self.ensure_vacant(S::KIND)?;
        log::debug!("Adding {:?} hook system: {}", hook, S::KIND);

        let id = self.insert(Box::new(system), Placement::Hook(hook));
        match hook {
            Hook::Pre => self.pre.push(id),
            Hook::Post => self.post.push(id),
        }
        self.dirty = true;
        Ok(id)
    }

    /// Arena id of the system of `kind`
    pub fn id_of(&self, kind: Kind) -> HexResult<SystemId> {
        self.lookup.get(kind).copied().ok_or_else(|| {
            HexError::not_found(ErrorDomain::System, format!("System ({kind}) not found."))
        })
    }

    /// Look up a system by type
    pub fn get<S: System>(&self) -> HexResult<&S> {
        let id = self.id_of(S::KIND)?;
        self.slots[id.0]
            .system
            .as_any()
            .downcast_ref::<S>()
            .ok_or_else(type_mismatch::<S>)
    }

    /// Look up a system by type, mutably
    pub fn get_mut<S: System>(&mut self) -> HexResult<&mut S> {
        let id = self.id_of(S::KIND)?;
        self.slots[id.0]
            .system
            .as_any_mut()
            .downcast_mut::<S>()
            .ok_or_else(type_mismatch::<S>)
    }

    /// Look up `S` and declare that it runs after `dependency`
    pub fn get_with_dependency<S: System>(&mut self, dependency: Kind) -> HexResult<&mut S> {
        self.add_dependency(S::KIND, dependency)?;
        self.get_mut::<S>()
    }

    /// Look up a system by kind
    pub fn get_kind(&self, kind: Kind) -> HexResult<&dyn AnySystem> {
        let id = self.id_of(kind)?;
        Ok(self.slots[id.0].system.as_ref())
    }

    /// Declare that `consumer` runs after `dependency`
    ///
    /// Fails with `NotFound` when either kind is not a graph system and with
    /// `Cycle` when `dependency` already runs after `consumer`. Declaring an
    /// existing edge again is a no-op.
    pub fn add_dependency(&mut self, consumer: Kind, dependency: Kind) -> HexResult<()> {
        let consumer_id = self.node_id(consumer)?;
        let dependency_id = self.node_id(dependency)?;

        if consumer_id == dependency_id || self.depends_on(dependency_id, consumer_id) {
            return Err(HexError::cycle(
                ErrorDomain::System,
                format!("{consumer} -> {dependency}"),
            ));
        }

        let dependencies = &mut self.slots[consumer_id.0].dependencies;
        if !dependencies.contains(&dependency_id) {
            log::debug!("System {} now runs after {}", consumer, dependency);
            dependencies.push(dependency_id);
            self.dirty = true;
        }
        Ok(())
    }

    /// Execution order: pre hooks, graph systems in dependency order, post hooks
    pub fn all(&mut self) -> HexResult<&[SystemId]> {
        if self.dirty {
            let sorted = self.sort()?;
            self.order.clear();
            self.order.extend_from_slice(&self.pre);
            self.order.extend(sorted);
            self.order.extend_from_slice(&self.post);
            self.dirty = false;
        }
        Ok(&self.order)
    }

    /// Kinds of the systems in execution order
    pub fn kinds(&mut self) -> HexResult<Vec<Kind>> {
        self.all()?;
        Ok(self
            .order
            .iter()
            .map(|id| self.slots[id.0].system.kind())
            .collect())
    }

    /// Run every system once, in execution order
    ///
    /// The first failing system aborts the pass.
    pub fn run(
        &mut self,
        ctx: &mut Context<'_>,
        delta: f64,
        mut profiler: Option<&mut Profiler>,
    ) -> Result<(), EngineError> {
        self.all()?;
        for id in &self.order {
            let system = &mut self.slots[id.0].system;
            if let Some(profiler) = profiler.as_deref_mut() {
                profiler.track(system.kind());
            }
            system
                .run(ctx, delta)
                .map_err(|source| EngineError::System {
                    kind: system.kind(),
                    source,
                })?;
        }
        Ok(())
    }

    /// Call every system's render hook, in execution order
    pub fn render(&mut self, interpolation: f64) -> HexResult<()> {
        self.all()?;
        for id in &self.order {
            self.slots[id.0].system.render(interpolation);
        }
        Ok(())
    }

    fn insert(&mut self, system: Box<dyn AnySystem>, placement: Placement) -> SystemId {
        let id = SystemId(self.slots.len());
        self.lookup.insert(system.kind(), id);
        self.slots.push(SystemSlot {
            system,
            placement,
            dependencies: Vec::new(),
        });
        id
    }

    /// Undo the registration of the most recently added graph system
    fn rollback_last(&mut self, kind: Kind) {
        self.slots.pop();
        self.nodes.pop();
        self.lookup.remove(kind);
        self.dirty = true;
    }

    fn node_id(&self, kind: Kind) -> HexResult<SystemId> {
        let id = self.id_of(kind)?;
        match self.slots[id.0].placement {
            Placement::Graph => Ok(id),
            Placement::Hook(hook) => Err(HexError::not_found(
                ErrorDomain::System,
                format!("System ({kind}) is a {hook:?} hook, not part of the dependency graph"),
            )),
        }
    }

    /// Whether `from` reaches `target` by following dependency edges
    fn depends_on(&self, from: SystemId, target: SystemId) -> bool {
        let mut visited = HashSet::new();
        let mut stack = vec![from];
        while let Some(id) = stack.pop() {
            if id == target {
                return true;
            }
            if visited.insert(id) {
                stack.extend(self.slots[id.0].dependencies.iter().copied());
            }
        }
        false
    }

    /// Kahn's method over "system -> dependencies" edges, reversed so that
    /// dependencies come before their dependents
    fn sort(&self) -> HexResult<Vec<SystemId>> {
        let mut claims = vec![0usize; self.slots.len()];
        for id in &self.nodes {
            for dependency in &self.slots[id.0].dependencies {
                claims[dependency.0] += 1;
            }
        }

        let mut queue: VecDeque<SystemId> = self
            .nodes
            .iter()
            .copied()
            .filter(|id| claims[id.0] == 0)
            .collect();
        let mut sorted = Vec::with_capacity(self.nodes.len());

        while let Some(id) = queue.pop_front() {
            sorted.push(id);
            for dependency in &self.slots[id.0].dependencies {
                claims[dependency.0] -= 1;
                if claims[dependency.0] == 0 {
                    queue.push_back(*dependency);
                }
            }
        }

        if sorted.len() < self.nodes.len() {
            return Err(HexError::cycle(
                ErrorDomain::System,
                format!(
                    "only {} of {} systems could be ordered",
                    sorted.len(),
                    self.nodes.len()
                ),
            ));
        }

        sorted.reverse();
        Ok(sorted)
    }
}

fn type_mismatch<S: System>() -> HexError {
    HexError::type_mismatch(
        ErrorDomain::System,
        format!("{} is not a {}", S::KIND, std::any::type_name::<S>()),
    )
}
