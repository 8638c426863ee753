//! Multi-kind entity queries

use super::Entity;

/// Entities present in every one of `lists`
///
/// Lists are ordered by ascending length and the shortest one is filtered
/// against the others, so the cost is bounded by the smallest set. The
/// result keeps the order of the shortest list.
pub fn intersect(mut lists: Vec<&[Entity]>) -> Vec<Entity> {
    lists.sort_by_key(|list| list.len());
    let Some((smallest, rest)) = lists.split_first() else {
        return Vec::new();
    };

    smallest
        .iter()
        .copied()
        .filter(|entity| rest.iter().all(|list| list.contains(entity)))
        .collect()
}
