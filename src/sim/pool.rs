//! Stop-and-copy entity pool
//!
//! Entities are never removed in place. Destruction only sets a flag, and once
//! per frame `collect` copies the survivors into a second buffer and swaps the
//! two. Both buffers keep their capacity, so steady-state frames do not allocate.

use serde::{Deserialize, Serialize};

/// Anything that can be marked for reclamation
pub trait Reclaim {
    fn is_destroyed(&self) -> bool;
}

/// Live entities plus an empty scratch buffer of the same element type
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pool<T> {
    live: Vec<T>,
    /// Always empty outside `collect`
    #[serde(skip)]
    backing: Vec<T>,
}

impl<T> Default for Pool<T> {
    fn default() -> Self {
        Self {
            live: Vec::new(),
            backing: Vec::new(),
        }
    }
}

impl<T> Pool<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            live: Vec::with_capacity(capacity),
            backing: Vec::with_capacity(capacity),
        }
    }

    #[inline]
    pub fn push(&mut self, item: T) {
        self.live.push(item);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.live.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.live.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.live.iter_mut()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.live
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.live
    }

    /// Drop everything (session reset)
    pub fn clear(&mut self) {
        self.live.clear();
        self.backing.clear();
    }

    /// Number of elements parked in the scratch buffer (zero between collections)
    pub fn backing_len(&self) -> usize {
        self.backing.len()
    }
}

impl<T: Reclaim> Pool<T> {
    /// Keep exactly the non-destroyed entities, in their original order.
    ///
    /// Returns how many entities were reclaimed.
    pub fn collect(&mut self) -> usize {
        debug_assert!(self.backing.is_empty());
        let before = self.live.len();
        self.backing.extend(self.live.drain(..).filter(|item| !item.is_destroyed()));
        std::mem::swap(&mut self.live, &mut self.backing);
        before - self.live.len()
    }

    /// Entities not yet marked destroyed
    pub fn live_count(&self) -> usize {
        self.live.iter().filter(|item| !item.is_destroyed()).count()
    }
}

impl<'a, T> IntoIterator for &'a Pool<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.live.iter()
    }
}

impl<'a, T> IntoIterator for &'a mut Pool<T> {
    type Item = &'a mut T;
    type IntoIter = std::slice::IterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.live.iter_mut()
    }
}

impl<T> std::ops::Index<usize> for Pool<T> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        &self.live[index]
    }
}

impl<T> std::ops::IndexMut<usize> for Pool<T> {
    fn index_mut(&mut self, index: usize) -> &mut T {
        &mut self.live[index]
    }
}
