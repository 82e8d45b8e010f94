//! Generation-tagged handle registry for the embedding boundary
//!
//! The embedder addresses clients and streams through opaque handles rather
//! than references. Each handle names an arena slot together with the
//! generation the slot had when the value was inserted; removing a value
//! bumps the generation, so a handle issued before the removal resolves to
//! [`HandleError::Stale`] instead of aliasing whatever occupies the slot
//! next. Handles are typed: a client handle cannot name a stream slot.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::sync::Arc;

use crate::error::HandleError;

/// Typed, copyable handle naming one live slot in a [`HandleMap`].
pub struct Handle<T> {
    index: u32,
    generation: u32,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Handle<T> {
    fn new(index: u32, generation: u32) -> Self {
        Self {
            index,
            generation,
            _marker: PhantomData,
        }
    }

    /// The arena slot this handle names.
    pub fn index(&self) -> u32 {
        self.index
    }

    /// The slot generation this handle was issued against.
    pub fn generation(&self) -> u32 {
        self.generation
    }

    fn stale(&self) -> HandleError {
        HandleError::Stale {
            index: self.index,
            generation: self.generation,
        }
    }
}

// Manual impls: `T` is only a marker, so the usual derive bounds on `T`
// would be wrong here.
impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Handle<T> {}

impl<T> PartialEq for Handle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index && self.generation == other.generation
    }
}

impl<T> Eq for Handle<T> {}

impl<T> Hash for Handle<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.index.hash(state);
        self.generation.hash(state);
    }
}

impl<T> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handle({}v{})", self.index, self.generation)
    }
}

struct Slot<T> {
    generation: u32,
    value: Option<Arc<T>>,
}

/// Arena of `Arc`-stored values addressed by generation-tagged handles.
///
/// Values resolve by cloning the `Arc` out, so no borrow into the arena
/// escapes: a caller can keep using a resolved context (even blocking on
/// it) without holding any registry lock, and `remove` only drops the
/// arena's reference, leaving in-flight tasks holding their own `Arc`
/// undisturbed.
pub struct HandleMap<T> {
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
    len: usize,
}

impl<T> HandleMap<T> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            len: 0,
        }
    }

    /// Store a value and issue the handle naming it.
    pub fn insert(&mut self, value: T) -> Handle<T> {
        let value = Arc::new(value);
        self.len += 1;
        match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.value = Some(value);
                Handle::new(index, slot.generation)
            }
            None => {
                let index = self.slots.len() as u32;
                self.slots.push(Slot {
                    generation: 0,
                    value: Some(value),
                });
                Handle::new(index, 0)
            }
        }
    }

    /// Resolve a handle to its value.
    pub fn get(&self, handle: Handle<T>) -> Result<Arc<T>, HandleError> {
        self.slots
            .get(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.value.clone())
            .ok_or_else(|| handle.stale())
    }

    /// Remove a value, invalidating every copy of its handle.
    pub fn remove(&mut self, handle: Handle<T>) -> Result<Arc<T>, HandleError> {
        let slot = self
            .slots
            .get_mut(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation)
            .ok_or_else(|| handle.stale())?;
        let value = slot.value.take().ok_or_else(|| handle.stale())?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(handle.index);
        self.len -= 1;
        Ok(value)
    }

    pub fn contains(&self, handle: Handle<T>) -> bool {
        self.get(handle).is_ok()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl<T> Default for HandleMap<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_then_get() {
        let mut map = HandleMap::new();
        let handle = map.insert("alpha");
        assert_eq!(*map.get(handle).expect("live handle"), "alpha");
        assert!(map.contains(handle));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_removed_handle_is_stale() {
        let mut map = HandleMap::new();
        let handle = map.insert("alpha");
        map.remove(handle).expect("first removal succeeds");

        assert!(matches!(map.get(handle), Err(HandleError::Stale { .. })));
        assert!(matches!(map.remove(handle), Err(HandleError::Stale { .. })));
        assert!(map.is_empty());
    }

    #[test]
    fn test_recycled_slot_does_not_alias_old_handle() {
        let mut map = HandleMap::new();
        let old = map.insert("alpha");
        map.remove(old).expect("removal");

        let new = map.insert("beta");
        assert_eq!(new.index(), old.index());
        assert_ne!(new.generation(), old.generation());

        assert!(map.get(old).is_err());
        assert_eq!(*map.get(new).expect("new handle"), "beta");
    }

    #[test]
    fn test_resolved_value_outlives_removal() {
        let mut map = HandleMap::new();
        let handle = map.insert(vec![1u8, 2, 3]);
        let resolved = map.get(handle).expect("live handle");
        map.remove(handle).expect("removal");

        // The clone handed out earlier keeps the value alive.
        assert_eq!(*resolved, vec![1, 2, 3]);
    }
}
