//! ECS World implementation
//!
//! Entities index a dense slot array of per-entity component lists. A
//! second map from component kind to the entities carrying it answers
//! queries. Both structures are updated together: every fallible check runs
//! before the first mutation, so an error never leaves them out of step.

use super::component::{AnyComponent, Component, Kind};
use super::query::intersect;
use super::Entity;
use crate::error::{ErrorDomain, HexError, HexResult};
use crate::foundation::collections::FreeList;
use std::collections::HashMap;

/// Components attached to one entity
pub type ComponentList = Vec<Box<dyn AnyComponent>>;

/// ECS World containing all entities and components
#[derive(Debug, Default)]
pub struct World {
    entities: FreeList<ComponentList>,
    index: HashMap<Kind, Vec<Entity>>,
}

impl World {
    /// Create a new world
    pub fn new() -> Self {
        log::debug!("[HEX] Components Initialized.");
        Self::default()
    }

    /// Create a new entity
    ///
    /// Reuses the most recently deleted id when one is available.
    pub fn create(&mut self) -> Entity {
        Entity::new(self.entities.insert(Vec::new()))
    }

    /// Delete an entity and every component attached to it
    pub fn delete(&mut self, entity: Entity) -> HexResult<()> {
        let components = self
            .entities
            .get(entity.index())
            .ok_or_else(|| entity_not_found(entity))?;

        let mut positions = Vec::with_capacity(components.len());
        for component in components {
            let kind = component.kind();
            positions.push((kind, self.index_position(entity, kind)?));
        }

        for (kind, position) in positions {
            if let Some(list) = self.index.get_mut(kind) {
                list.remove(position);
            }
        }
        self.entities.remove(entity.index());
        Ok(())
    }

    /// Whether `entity` is live
    pub fn is_alive(&self, entity: Entity) -> bool {
        self.entities.contains(entity.index())
    }

    /// Number of live entities
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Whether there are no live entities
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Add a component to an entity
    pub fn add<T: Component>(&mut self, entity: Entity, component: T) -> HexResult<()> {
        self.add_boxed(entity, Box::new(component))
    }

    /// Add a type-erased component to an entity
    pub fn add_boxed(
        &mut self,
        entity: Entity,
        component: Box<dyn AnyComponent>,
    ) -> HexResult<()> {
        let kind = component.kind();
        let components = self
            .entities
            .get_mut(entity.index())
            .ok_or_else(|| entity_not_found(entity))?;
        if components.iter().any(|c| c.kind() == kind) {
            return Err(HexError::exists(
                ErrorDomain::Entity,
                format!("{entity} already has component {kind}"),
            ));
        }

        components.push(component);
        self.index.entry(kind).or_default().push(entity);
        Ok(())
    }

    /// Add several components to an entity
    ///
    /// Not atomic: components added before a failing one stay attached.
    pub fn add_many(&mut self, entity: Entity, components: ComponentList) -> HexResult<()> {
        if !self.is_alive(entity) {
            return Err(entity_not_found(entity));
        }
        for component in components {
            self.add_boxed(entity, component)?;
        }
        Ok(())
    }

    /// Remove the component of `kind` from an entity, returning it
    pub fn remove(&mut self, entity: Entity, kind: Kind) -> HexResult<Box<dyn AnyComponent>> {
        let components = self
            .entities
            .get(entity.index())
            .ok_or_else(|| entity_not_found(entity))?;
        let position = components
            .iter()
            .position(|c| c.kind() == kind)
            .ok_or_else(|| component_not_found(entity, kind))?;
        let index_position = self.index_position(entity, kind)?;

        if let Some(list) = self.index.get_mut(kind) {
            list.remove(index_position);
        }
        let components = self
            .entities
            .get_mut(entity.index())
            .ok_or_else(|| entity_not_found(entity))?;
        Ok(components.remove(position))
    }

    /// Remove several components from an entity
    ///
    /// Not atomic: components removed before a failing kind stay removed.
    pub fn remove_many(&mut self, entity: Entity, kinds: &[Kind]) -> HexResult<()> {
        if !self.is_alive(entity) {
            return Err(entity_not_found(entity));
        }
        for &kind in kinds {
            self.remove(entity, kind)?;
        }
        Ok(())
    }

    /// Whether `entity` carries a component of `kind`
    pub fn has(&self, entity: Entity, kind: Kind) -> bool {
        self.entities
            .get(entity.index())
            .is_some_and(|components| components.iter().any(|c| c.kind() == kind))
    }

    /// Get a component from an entity
    pub fn get<T: Component>(&self, entity: Entity) -> HexResult<&T> {
        self.get_kind(entity, T::KIND)?
            .downcast_ref::<T>()
            .ok_or_else(|| type_mismatch::<T>(entity))
    }

    /// Get a mutable component from an entity
    pub fn get_mut<T: Component>(&mut self, entity: Entity) -> HexResult<&mut T> {
        let component = find_mut(&mut self.entities, entity, T::KIND)?;
        component
            .downcast_mut::<T>()
            .ok_or_else(|| type_mismatch::<T>(entity))
    }

    /// Get the type-erased component of `kind` from an entity
    pub fn get_kind(&self, entity: Entity, kind: Kind) -> HexResult<&dyn AnyComponent> {
        let components = self
            .entities
            .get(entity.index())
            .ok_or_else(|| entity_not_found(entity))?;
        let component = components
            .iter()
            .find(|c| c.kind() == kind)
            .ok_or_else(|| component_not_found(entity, kind))?;
        Ok(component.as_ref())
    }

    /// Get several components from an entity, in the order of `kinds`
    pub fn get_many(&self, entity: Entity, kinds: &[Kind]) -> HexResult<Vec<&dyn AnyComponent>> {
        kinds.iter().map(|&kind| self.get_kind(entity, kind)).collect()
    }

    /// Entities carrying a component of `kind`
    pub fn with(&self, kind: Kind) -> &[Entity] {
        self.index.get(kind).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Entities carrying a component of every kind in `kinds`
    pub fn with_all(&self, kinds: &[Kind]) -> Vec<Entity> {
        intersect(kinds.iter().map(|&kind| self.with(kind)).collect())
    }

    /// Every entity carrying `T`, paired with its component
    pub fn get_with<T: Component>(&self) -> HexResult<Vec<(Entity, &T)>> {
        self.with(T::KIND)
            .iter()
            .map(|&entity| Ok((entity, self.get::<T>(entity)?)))
            .collect()
    }

    /// Every entity carrying all of `kinds`, paired with those components
    pub fn get_with_all(
        &self,
        kinds: &[Kind],
    ) -> HexResult<Vec<(Entity, Vec<&dyn AnyComponent>)>> {
        self.with_all(kinds)
            .into_iter()
            .map(|entity| Ok((entity, self.get_many(entity, kinds)?)))
            .collect()
    }

    /// Visit every component of type `T` mutably, in index order
    pub fn for_each_mut<T, F>(&mut self, mut f: F) -> HexResult<()>
    where
        T: Component,
        F: FnMut(Entity, &mut T),
    {
        let Some(entities) = self.index.get(T::KIND) else {
            return Ok(());
        };
        for &entity in entities {
            let component = find_mut(&mut self.entities, entity, T::KIND)?
                .downcast_mut::<T>()
                .ok_or_else(|| type_mismatch::<T>(entity))?;
            f(entity, component);
        }
        Ok(())
    }

    /// Dense per-entity component lists, with `None` holes for deleted ids
    pub fn all(&self) -> &[Option<ComponentList>] {
        self.entities.slots()
    }

    fn index_position(&self, entity: Entity, kind: Kind) -> HexResult<usize> {
        let list = self.index.get(kind).ok_or_else(|| {
            HexError::not_found(
                ErrorDomain::Entity,
                format!("{kind} in component entity map"),
            )
        })?;
        list.iter()
            .position(|&e| e == entity)
            .ok_or_else(|| {
                HexError::not_found(ErrorDomain::Entity, format!("{entity} in {kind} index"))
            })
    }
}

fn find_mut<'a>(
    entities: &'a mut FreeList<ComponentList>,
    entity: Entity,
    kind: Kind,
) -> HexResult<&'a mut dyn AnyComponent> {
    let components = entities
        .get_mut(entity.index())
        .ok_or_else(|| entity_not_found(entity))?;
    let component = components
        .iter_mut()
        .find(|c| c.kind() == kind)
        .ok_or_else(|| component_not_found(entity, kind))?;
    Ok(component.as_mut())
}

fn entity_not_found(entity: Entity) -> HexError {
    HexError::not_found(ErrorDomain::Entity, format!("entity {entity}"))
}

fn component_not_found(entity: Entity, kind: Kind) -> HexError {
    HexError::not_found(ErrorDomain::Entity, format!("{entity} does not have {kind}"))
}

fn type_mismatch<T: Component>(entity: Entity) -> HexError {
    HexError::type_mismatch(
        ErrorDomain::Entity,
        format!(
            "{} on {entity} is not a {}",
            T::KIND,
            std::any::type_name::<T>()
        ),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[derive(Debug, PartialEq)]
    struct Position(i32, i32);
    impl Component for Position {
        const KIND: Kind = "Position";
    }

    #[derive(Debug, PartialEq)]
    struct Velocity(i32, i32);
    impl Component for Velocity {
        const KIND: Kind = "Velocity";
    }

    #[derive(Debug)]
    struct Health(u32);
    impl Component for Health {
        const KIND: Kind = "Health";
    }

    /// Shares a kind tag with `Position` but is a different type
    #[derive(Debug)]
    struct FakePosition;
    impl Component for FakePosition {
        const KIND: Kind = "Position";
    }

    #[test]
    fn test_create_assigns_sequential_ids() {
        let mut world = World::new();
        assert_eq!(world.create().id(), 0);
        assert_eq!(world.create().id(), 1);
        assert_eq!(world.len(), 2);
    }

    #[test]
    fn test_deleted_id_is_reused() {
        let mut world = World::new();
        let first = world.create();
        let _second = world.create();
        world.delete(first).unwrap();
        assert_eq!(world.create(), first);
    }

    #[test]
    fn test_most_recently_freed_wins() {
        let mut world = World::new();
        let a = world.create();
        let b = world.create();
        world.delete(a).unwrap();
        world.delete(b).unwrap();
        assert_eq!(world.create(), b);
        assert_eq!(world.create(), a);
        assert_eq!(world.create().id(), 2);
    }

    #[test]
    fn test_reused_entity_is_empty() {
        let mut world = World::new();
        let e = world.create();
        world.add(e, Position(1, 2)).unwrap();
        world.delete(e).unwrap();

        let reused = world.create();
        assert_eq!(reused, e);
        assert!(!world.has(reused, Position::KIND));
        assert!(world.with(Position::KIND).is_empty());
        assert_eq!(world.all()[reused.index()].as_ref().map(Vec::len), Some(0));
    }

    #[test]
    fn test_delete_unknown_entity() {
        let mut world = World::new();
        let e = world.create();
        world.delete(e).unwrap();
        let err = world.delete(e).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.domain(), ErrorDomain::Entity);
    }

    #[test]
    fn test_add_and_get() {
        let mut world = World::new();
        let e = world.create();
        world.add(e, Position(3, 4)).unwrap();
        assert_eq!(world.get::<Position>(e).unwrap(), &Position(3, 4));

        world.get_mut::<Position>(e).unwrap().0 = 10;
        assert_eq!(world.get::<Position>(e).unwrap().0, 10);
    }

    #[test]
    fn test_duplicate_component_kind() {
        let mut world = World::new();
        let e = world.create();
        world.add(e, Position(0, 0)).unwrap();
        let err = world.add(e, Position(1, 1)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Exists);
        assert_eq!(world.with(Position::KIND), &[e]);
        assert_eq!(world.get::<Position>(e).unwrap(), &Position(0, 0));
    }

    #[test]
    fn test_add_to_missing_entity() {
        let mut world = World::new();
        let e = world.create();
        world.delete(e).unwrap();
        assert_eq!(world.add(e, Health(1)).unwrap_err().kind(), ErrorKind::NotFound);
        assert!(world.with(Health::KIND).is_empty());
    }

    #[test]
    fn test_batch_add_is_not_atomic() {
        let mut world = World::new();
        let e = world.create();
        world.add(e, Health(5)).unwrap();

        let batch: ComponentList = vec![
            Box::new(Position(0, 0)),
            Box::new(Health(9)),
            Box::new(Velocity(1, 1)),
        ];
        let err = world.add_many(e, batch).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Exists);
        assert!(world.has(e, Position::KIND));
        assert!(!world.has(e, Velocity::KIND));
        assert_eq!(world.get::<Health>(e).unwrap().0, 5);
    }

    #[test]
    fn test_remove() {
        let mut world = World::new();
        let e = world.create();
        world.add(e, Position(1, 1)).unwrap();
        world.add(e, Velocity(2, 2)).unwrap();

        let removed = world.remove(e, Position::KIND).unwrap();
        assert_eq!(removed.kind(), Position::KIND);
        assert!(!world.has(e, Position::KIND));
        assert!(world.with(Position::KIND).is_empty());
        assert_eq!(world.with(Velocity::KIND), &[e]);
    }

    #[test]
    fn test_remove_absent_kind() {
        let mut world = World::new();
        let e = world.create();
        world.add(e, Velocity(0, 0)).unwrap();
        let err = world.remove(e, Position::KIND).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(world.with(Velocity::KIND), &[e]);
    }

    #[test]
    fn test_batch_remove_is_not_atomic() {
        let mut world = World::new();
        let e = world.create();
        world.add(e, Position(0, 0)).unwrap();
        world.add(e, Health(1)).unwrap();

        let err = world
            .remove_many(e, &[Position::KIND, Velocity::KIND, Health::KIND])
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert!(!world.has(e, Position::KIND));
        assert!(world.has(e, Health::KIND));
    }

    #[test]
    fn test_get_missing() {
        let mut world = World::new();
        let e = world.create();
        assert_eq!(world.get::<Position>(e).unwrap_err().kind(), ErrorKind::NotFound);
        let ghost = Entity::new(42);
        assert_eq!(world.get::<Position>(ghost).unwrap_err().kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_get_type_mismatch() {
        let mut world = World::new();
        let e = world.create();
        world.add(e, FakePosition).unwrap();
        let err = world.get::<Position>(e).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TypeMismatch);
    }

    #[test]
    fn test_get_many_is_positional() {
        let mut world = World::new();
        let e = world.create();
        world.add(e, Position(1, 2)).unwrap();
        world.add(e, Velocity(3, 4)).unwrap();

        let components = world.get_many(e, &[Velocity::KIND, Position::KIND]).unwrap();
        assert_eq!(components[0].downcast_ref::<Velocity>(), Some(&Velocity(3, 4)));
        assert_eq!(components[1].downcast_ref::<Position>(), Some(&Position(1, 2)));

        let err = world.get_many(e, &[Position::KIND, Health::KIND]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_with_intersection() {
        let mut world = World::new();
        let a = world.create();
        let b = world.create();
        world.add(a, Position(0, 0)).unwrap();
        world.add(b, Position(0, 0)).unwrap();
        world.add(a, Velocity(0, 0)).unwrap();

        assert_eq!(world.with(Position::KIND), &[a, b]);
        assert_eq!(world.with_all(&[Position::KIND, Velocity::KIND]), vec![a]);
        assert!(world.with("Unregistered").is_empty());
        assert!(world.with_all(&[Position::KIND, Health::KIND]).is_empty());
    }

    #[test]
    fn test_get_with() {
        let mut world = World::new();
        let a = world.create();
        let b = world.create();
        world.add(a, Health(3)).unwrap();
        world.add(b, Health(7)).unwrap();
        world.add(b, Position(1, 1)).unwrap();

        let healths: Vec<u32> = world
            .get_with::<Health>()
            .unwrap()
            .into_iter()
            .map(|(_, h)| h.0)
            .collect();
        assert_eq!(healths, vec![3, 7]);

        let rows = world.get_with_all(&[Position::KIND, Health::KIND]).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].0, b);
        assert_eq!(rows[0].1[1].downcast_ref::<Health>().map(|h| h.0), Some(7));
    }

    #[test]
    fn test_for_each_mut() {
        let mut world = World::new();
        for i in 0..3 {
            let e = world.create();
            world.add(e, Position(i, 0)).unwrap();
            world.add(e, Velocity(1, 2)).unwrap();
        }

        world
            .for_each_mut::<Position, _>(|_, p| {
                p.0 += 1;
                p.1 += 2;
            })
            .unwrap();

        let xs: Vec<i32> = world
            .get_with::<Position>()
            .unwrap()
            .into_iter()
            .map(|(_, p)| p.0)
            .collect();
        assert_eq!(xs, vec![1, 2, 3]);
    }

    #[test]
    fn test_index_stays_consistent_under_churn() {
        let mut world = World::new();
        let mut live = Vec::new();
        for round in 0..20 {
            let e = world.create();
            world.add(e, Position(round, round)).unwrap();
            if round % 2 == 0 {
                world.add(e, Velocity(0, 0)).unwrap();
            }
            live.push(e);
            if round % 3 == 0 {
                let victim = live.remove(0);
                world.delete(victim).unwrap();
            }
        }

        for (id, slot) in world.all().iter().enumerate() {
            let entity = Entity::new(id);
            for kind in [Position::KIND, Velocity::KIND] {
                let in_list = slot
                    .as_ref()
                    .is_some_and(|components| components.iter().any(|c| c.kind() == kind));
                assert_eq!(in_list, world.with(kind).contains(&entity));
            }
        }
        assert_eq!(world.len(), live.len());
    }
}
