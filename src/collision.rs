//! Duplicate-hash tracking during encoding.
//!
//! Hash collisions between distinct metric names are rare but must never be
//! silent data corruption. When names are known the encoder accepts the
//! collision and pays for a name table in the blob; when only precomputed
//! ids are known a repeat is irrecoverable and the encode fails.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use crate::blob::types::EncodeError;
use crate::hash::MetricId;

/// Records every metric identity seen while a blob is being built.
///
/// Names are kept in insertion order so the name table can be materialized
/// positionally aligned with the index.
#[derive(Debug, Default)]
pub struct CollisionTracker {
    /// hash → insertion positions of every name that produced it.
    /// Id-mode entries carry an empty position list.
    seen: HashMap<MetricId, Vec<usize>>,
    names: Vec<String>,
    has_collision: bool,
}

impl CollisionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track a caller-supplied precomputed id.
    ///
    /// A repeated hash cannot be disambiguated without names, so it fails
    /// with [`EncodeError::HashCollision`].
    pub fn track_id(&mut self, hash: MetricId) -> Result<(), EncodeError> {
        if self.seen.contains_key(&hash) {
            return Err(EncodeError::HashCollision);
        }
        self.seen.insert(hash, Vec::new());
        Ok(())
    }

    /// Track a named metric and its hash.
    ///
    /// An empty name fails with [`EncodeError::InvalidMetricName`]; an exact
    /// `(name, hash)` repeat fails with [`EncodeError::MetricAlreadyStarted`].
    /// A repeated hash under a *different* name is accepted and raises the
    /// internal collision flag, which obliges the blob to carry a name table.
    pub fn track_name(&mut self, name: &str, hash: MetricId) -> Result<(), EncodeError> {
        if name.is_empty() {
            return Err(EncodeError::InvalidMetricName);
        }
        let pos = self.names.len();
        let names = &self.names;
        match self.seen.entry(hash) {
            Entry::Occupied(mut entry) => {
                let positions = entry.get_mut();
                if positions.iter().any(|&p| names[p] == name) {
                    return Err(EncodeError::MetricAlreadyStarted);
                }
                self.has_collision = true;
                positions.push(pos);
            }
            Entry::Vacant(entry) => {
                entry.insert(vec![pos]);
            }
        }
        self.names.push(name.to_owned());
        Ok(())
    }

    /// `true` once two distinct names have hashed to the same id.
    #[inline]
    pub fn has_collision(&self) -> bool {
        self.has_collision
    }

    /// Tracked names in insertion order (empty in id-mode).
    #[inline]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Zero all state, preserving allocations for the next blob.
    pub fn reset(&mut self) {
        self.seen.clear();
        self.names.clear();
        self.has_collision = false;
    }
}
