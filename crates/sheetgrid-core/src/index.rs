//! Ordered sparse index
//!
//! Rows within a sheet and cells within a row are stored sparsely, keyed
//! by their 1-based number, and must appear in ascending order in the
//! backing document. [`SparseIndex`] keeps the in-memory map and tells the
//! caller where a new entry belongs: immediately before the first entry
//! with a strictly greater key, or at the end.

use std::collections::btree_map::{self, BTreeMap};
use std::ops::Bound::{Excluded, Unbounded};

use crate::error::{Axis, Error, Result};

/// Where a newly materialized entry goes in the backing document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement<N> {
    /// Insert before this existing node
    Before(N),
    /// Append after every existing node
    Append,
}

/// An ordered map from 1-based key to entry, with lazy materialization
#[derive(Debug, Clone)]
pub struct SparseIndex<T> {
    axis: Axis,
    max: u32,
    entries: BTreeMap<u32, T>,
}

impl<T> SparseIndex<T> {
    /// Create an empty index whose keys must fall in `1..=max`
    pub fn new(axis: Axis, max: u32) -> Self {
        Self {
            axis,
            max,
            entries: BTreeMap::new(),
        }
    }

    /// Reject keys outside `1..=max`
    pub fn check_key(&self, key: u32) -> Result<u32> {
        if key == 0 || key > self.max {
            return Err(Error::InvalidCoordinate {
                axis: self.axis,
                index: key,
                max: self.max,
            });
        }
        Ok(key)
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the index has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Check if an entry exists for `key`
    pub fn contains(&self, key: u32) -> bool {
        self.entries.contains_key(&key)
    }

    /// Get an existing entry
    pub fn get(&self, key: u32) -> Option<&T> {
        self.entries.get(&key)
    }

    /// Get an existing entry mutably
    pub fn get_mut(&mut self, key: u32) -> Option<&mut T> {
        self.entries.get_mut(&key)
    }

    /// Remove an entry, returning it if present
    pub fn remove(&mut self, key: u32) -> Option<T> {
        self.entries.remove(&key)
    }

    /// Largest key in use
    pub fn last_key(&self) -> Option<u32> {
        self.entries.keys().next_back().copied()
    }

    /// Entries in ascending key order
    pub fn iter(&self) -> btree_map::Iter<'_, u32, T> {
        self.entries.iter()
    }

    /// Entries in ascending key order, mutably
    pub fn iter_mut(&mut self) -> btree_map::IterMut<'_, u32, T> {
        self.entries.iter_mut()
    }

    /// Keys in ascending order
    pub fn keys(&self) -> impl Iterator<Item = u32> + '_ {
        self.entries.keys().copied()
    }

    /// Values in ascending key order
    pub fn values(&self) -> btree_map::Values<'_, u32, T> {
        self.entries.values()
    }

    /// Where an entry for `key` would be placed
    ///
    /// `anchor` maps an entry to the backing node it is attached to.
    pub fn placement<N>(&self, key: u32, anchor: impl Fn(&T) -> N) -> Placement<N> {
        match self.entries.range((Excluded(key), Unbounded)).next() {
            Some((_, next)) => Placement::Before(anchor(next)),
            None => Placement::Append,
        }
    }

    /// Record an entry discovered in an existing document
    ///
    /// Returns the entry back if the key is already taken.
    pub fn insert_loaded(&mut self, key: u32, entry: T) -> Result<std::result::Result<(), T>> {
        self.check_key(key)?;
        if self.entries.contains_key(&key) {
            return Ok(Err(entry));
        }
        self.entries.insert(key, entry);
        Ok(Ok(()))
    }

    /// Get the entry for `key`, materializing it first if absent
    ///
    /// `build` receives the placement of the new entry and must attach its
    /// backing node there before returning it.
    pub fn get_or_materialize<N, E>(
        &mut self,
        key: u32,
        anchor: impl Fn(&T) -> N,
        build: impl FnOnce(Placement<N>) -> std::result::Result<T, E>,
    ) -> std::result::Result<&mut T, E>
    where
        E: From<Error>,
    {
        let axis = self.axis;
        self.check_key(key)?;
        if !self.entries.contains_key(&key) {
            let placement = self.placement(key, anchor);
            let entry = build(placement)?;
            self.entries.insert(key, entry);
        }
        self.entries
            .get_mut(&key)
            .ok_or_else(|| E::from(Error::invalid_coordinate(axis, key)))
    }
}
