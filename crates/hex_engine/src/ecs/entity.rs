//! Entity implementation

use std::fmt;

/// Entity identifier
///
/// An index into the world's dense slot array, so every slot the array can
/// address has its own id. Ids of deleted entities are handed out again, so
/// a stale `Entity` may refer to a newer entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Entity {
    id: usize,
}

impl Entity {
    /// Create a new entity with the given ID
    pub(crate) fn new(id: usize) -> Self {
        Self { id }
    }

    /// Get the entity ID
    pub fn id(&self) -> usize {
        self.id
    }

    pub(crate) fn index(self) -> usize {
        self.id
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}
