//! Generational arena that owns every object on the board.
//!
//! Cells and the in-flight shell list store [`ObjectId`] handles rather than
//! references, so purging an object can never leave a dangling pointer: a
//! handle whose generation no longer matches simply resolves to nothing.

use crate::objects::GameObject;

/// Stable handle to an object stored in the [`Arena`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) struct ObjectId {
    index: u32,
    generation: u32,
}

#[derive(Debug)]
struct Slot {
    generation: u32,
    occupant: Option<GameObject>,
}

/// Owner of every [`GameObject`] alive on the board.
#[derive(Debug, Default)]
pub(crate) struct Arena {
    slots: Vec<Slot>,
    free: Vec<u32>,
}

impl Arena {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, object: GameObject) -> ObjectId {
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.occupant = Some(object);
            ObjectId {
                index,
                generation: slot.generation,
            }
        } else {
            let index = u32::try_from(self.slots.len())
                .unwrap_or_else(|_| panic!("object arena exhausted"));
            self.slots.push(Slot {
                generation: 0,
                occupant: Some(object),
            });
            ObjectId {
                index,
                generation: 0,
            }
        }
    }

    pub(crate) fn get(&self, id: ObjectId) -> Option<&GameObject> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.occupant.as_ref())
    }

    pub(crate) fn get_mut(&mut self, id: ObjectId) -> Option<&mut GameObject> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.occupant.as_mut())
    }

    /// Resolves a handle that the board guarantees to be live.
    ///
    /// # Panics
    ///
    /// Panics on a stale handle; that indicates a bookkeeping bug, not a
    /// recoverable condition.
    pub(crate) fn object(&self, id: ObjectId) -> &GameObject {
        self.get(id)
            .unwrap_or_else(|| panic!("stale object handle {id:?}"))
    }

    /// Mutable counterpart of [`Arena::object`] with the same panic contract.
    pub(crate) fn object_mut(&mut self, id: ObjectId) -> &mut GameObject {
        self.get_mut(id)
            .unwrap_or_else(|| panic!("stale object handle {id:?}"))
    }

    pub(crate) fn remove(&mut self, id: ObjectId) -> Option<GameObject> {
        let slot = self
            .slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)?;
        let occupant = slot.occupant.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        Some(occupant)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objects::{GameObject, Mine};
    use tank_clash_core::Position;

    #[test]
    fn removed_handles_go_stale() {
        let mut arena = Arena::new();
        let id = arena.insert(GameObject::Mine(Mine::new(Position::new(0, 0))));
        assert!(arena.get(id).is_some());
        assert!(arena.remove(id).is_some());
        assert!(arena.get(id).is_none());

        let replacement = arena.insert(GameObject::Mine(Mine::new(Position::new(1, 1))));
        assert_ne!(id, replacement);
        assert!(arena.get(id).is_none(), "recycled slot must not resurrect");
    }
}
