//! Cell grid and the entity arena behind it.
//!
//! Cells hold ordered stacks of [`EntityId`]s with the topmost entry last.
//! Entities themselves live once in an append-only arena; moving an object
//! rewires stack membership without cloning it.

use std::collections::{BTreeMap, HashMap};

use lockdown_core::{Mover, ObjectTag, Vec2};
use serde::{Deserialize, Serialize};

use crate::entities::Entity;

/// Handle into the board's entity arena.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct EntityId(u32);

impl EntityId {
    #[must_use]
    pub(crate) const fn new(raw: u32) -> Self {
        Self(raw)
    }

    fn index(self) -> usize {
        self.0 as usize
    }
}

/// The authoritative cell grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameBoard {
    map_size: Vec2,
    cells: HashMap<Vec2, Vec<EntityId>>,
    entities: Vec<Entity>,
}

impl GameBoard {
    pub(crate) fn new(map_size: Vec2) -> Self {
        Self {
            map_size,
            cells: HashMap::new(),
            entities: Vec::new(),
        }
    }

    /// Width and height of the coordinate space.
    #[must_use]
    pub fn map_size(&self) -> Vec2 {
        self.map_size
    }

    pub(crate) fn insert(&mut self, entity: Entity) -> EntityId {
        let id = EntityId::new(self.entities.len() as u32);
        self.entities.push(entity);
        id
    }

    /// Resolves an id to its entity.
    #[must_use]
    pub fn entity(&self, id: EntityId) -> &Entity {
        &self.entities[id.index()]
    }

    pub(crate) fn entity_mut(&mut self, id: EntityId) -> &mut Entity {
        &mut self.entities[id.index()]
    }

    /// Whether `at` falls inside the board rectangle.
    #[must_use]
    pub fn is_valid_coords(&self, at: Vec2) -> bool {
        at.x >= 0 && at.y >= 0 && at.x < self.map_size.x && at.y < self.map_size.y
    }

    /// The stack of ids at `at`, bottom first. Empty for untouched cells.
    #[must_use]
    pub fn stack(&self, at: Vec2) -> &[EntityId] {
        self.cells.get(&at).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The topmost entity at `at`, if any.
    #[must_use]
    pub fn top(&self, at: Vec2) -> Option<&Entity> {
        self.stack(at).last().map(|&id| self.entity(id))
    }

    /// Pushes `id` onto the stack at `at`.
    ///
    /// Fails without mutating when `at` is outside the board or the cell
    /// refuses this kind of object on kind-level grounds.
    pub(crate) fn place(&mut self, at: Vec2, id: EntityId) -> bool {
        if !self.is_valid_coords(at) {
            return false;
        }
        if let Some(top) = self.top(at) {
            if !top.is_occupiable_kind() {
                return false;
            }
        }
        self.cells.entry(at).or_default().push(id);
        true
    }

    /// Removes the topmost entity with `tag` from the stack at `at`.
    ///
    /// Cleans the cell entry up entirely when the stack empties so
    /// serialization never carries dead cells.
    pub(crate) fn remove(&mut self, at: Vec2, tag: ObjectTag) -> Option<EntityId> {
        let stack = self.cells.get_mut(&at)?;
        let index = stack
            .iter()
            .rposition(|&id| self.entities[id.index()].tag() == tag)?;
        let id = stack.remove(index);
        if stack.is_empty() {
            let _ = self.cells.remove(&at);
        }
        Some(id)
    }

    /// Detaches `id` from the cell its entity records, re-attaches it at
    /// `to`, and updates the entity's own position field.
    ///
    /// The destination is not re-validated here; callers gate the move
    /// through [`can_object_occupy`](Self::can_object_occupy) first.
    pub(crate) fn update_position(&mut self, id: EntityId, to: Vec2) {
        let tag = self.entities[id.index()].tag();
        if let Some(from) = self.entities[id.index()].position() {
            let _ = self.remove(from, tag);
        }
        self.entities[id.index()].set_position(to);
        self.cells.entry(to).or_default().push(id);
    }

    /// Whether any mover kind could stand at `at`.
    #[must_use]
    pub fn is_occupiable(&self, at: Vec2) -> bool {
        if !self.is_valid_coords(at) {
            return false;
        }
        match self.top(at) {
            None => true,
            Some(top) => top.is_occupiable_kind(),
        }
    }

    /// Whether the specific `mover` may step onto `at` right now.
    #[must_use]
    pub fn can_object_occupy(&self, at: Vec2, mover: Mover) -> bool {
        if !self.is_valid_coords(at) {
            return false;
        }
        match self.top(at) {
            None => true,
            Some(top) => top.can_host(mover),
        }
    }

    /// Every cell holding at least one entity with `tag`, with the matching
    /// ids per cell bottom first. Ordered by coordinate for determinism.
    #[must_use]
    pub fn objects_of(&self, tag: ObjectTag) -> BTreeMap<Vec2, Vec<EntityId>> {
        let mut found: BTreeMap<Vec2, Vec<EntityId>> = BTreeMap::new();
        for (&at, stack) in &self.cells {
            for &id in stack {
                if self.entity(id).tag() == tag {
                    found.entry(at).or_default().push(id);
                }
            }
        }
        found
    }

    /// Non-empty cells ordered by coordinate.
    pub fn cells_ordered(&self) -> impl Iterator<Item = (Vec2, &[EntityId])> {
        let mut ordered: Vec<(Vec2, &[EntityId])> = self
            .cells
            .iter()
            .map(|(&at, stack)| (at, stack.as_slice()))
            .collect();
        ordered.sort_by_key(|&(at, _)| at);
        ordered.into_iter()
    }
}
