//! Fixed-capacity entity pool (arena + active flag).
//!
//! Slots are allocated once and never destroyed; a slot is either free or
//! active, and the `active` flag on the slot is the only source of truth.
//!
//! ```text
//!   acquire(): linear scan, first free slot by index (deterministic)
//!              none free -> PoolError::Exhausted (caller logs + drops)
//!   release(): slot owner clears its own flag
//! ```
//!
//! Capacity is a hard ceiling. Running out is a capacity decision, not a
//! correctness failure, so nothing here reallocates.

use crate::common::error::PoolError;

/// A slot type that can live in a [`Pool`].
pub trait Poolable {
    fn is_active(&self) -> bool;
}

#[derive(Debug, Clone)]
pub struct Pool<T> {
    label: &'static str,
    slots: Vec<T>,
}

impl<T: Poolable> Pool<T> {
    /// Pre-build `capacity` inert slots.
    pub fn new(label: &'static str, capacity: usize, make: impl FnMut(usize) -> T) -> Self {
        Self {
            label,
            slots: (0..capacity).map(make).collect(),
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Index of the first free slot.
    ///
    /// The caller activates the slot; until it does, the slot still counts as free.
    pub fn acquire(&mut self) -> Result<(usize, &mut T), PoolError> {
        let capacity = self.slots.len();
        self.slots
            .iter_mut()
            .enumerate()
            .find(|(_, slot)| !slot.is_active())
            .ok_or(PoolError::Exhausted {
                pool: self.label,
                capacity,
            })
    }

    #[inline]
    pub fn active_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_active()).count()
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&T> {
        self.slots.get(index)
    }

    #[inline]
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.slots.get_mut(index)
    }

    /// All slots in index order, free ones included.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.slots.iter()
    }

    #[inline]
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.slots.iter_mut()
    }

    /// Active slots with their indices, in index order.
    pub fn iter_active_mut(&mut self) -> impl Iterator<Item = (usize, &mut T)> {
        self.slots
            .iter_mut()
            .enumerate()
            .filter(|(_, slot)| slot.is_active())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct Slot {
        active: bool,
    }

    impl Poolable for Slot {
        fn is_active(&self) -> bool {
            self.active
        }
    }

    #[test]
    fn acquire_picks_lowest_free_index() {
        let mut pool = Pool::new("test", 3, |_| Slot::default());
        pool.get_mut(0).unwrap().active = true;

        let (idx, slot) = pool.acquire().unwrap();
        assert_eq!(idx, 1);
        slot.active = true;

        let (idx, _) = pool.acquire().unwrap();
        assert_eq!(idx, 2);
    }

    #[test]
    fn exhausted_pool_reports_label_and_capacity() {
        let mut pool = Pool::new("enemy", 2, |_| Slot { active: true });
        assert_eq!(
            pool.acquire().unwrap_err(),
            PoolError::Exhausted {
                pool: "enemy",
                capacity: 2
            }
        );
        assert_eq!(pool.active_count(), 2);
        assert_eq!(pool.capacity(), 2);
    }

    #[test]
    fn released_slot_is_reused() {
        let mut pool = Pool::new("test", 2, |_| Slot { active: true });
        pool.get_mut(1).unwrap().active = false;
        let (idx, _) = pool.acquire().unwrap();
        assert_eq!(idx, 1);
    }

    #[test]
    fn iter_active_skips_free_slots() {
        let mut pool = Pool::new("test", 4, |i| Slot { active: i % 2 == 0 });
        let active: Vec<usize> = pool.iter_active_mut().map(|(i, _)| i).collect();
        assert_eq!(active, vec![0, 2]);
    }
}
