//! Uniform-grid spatial hash used as the broad-phase.
//!
//! World space is cut into square cells. Each cell hashes into one of
//! `cell_count` buckets, and every element is listed in each bucket its
//! bounding box touches. Distinct cells may share a bucket; queries re-check
//! bounding boxes, so a collision only costs time, never correctness.

use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::core::config::DEFAULT_CELL_SIZE;
use crate::math::{Aabb, Vector2};

const HASH_X: u64 = 1_640_531_513;
const HASH_Y: u64 = 2_654_435_789;

#[derive(Debug, Clone, Copy)]
struct HashEntry {
    /// Bounding box the element is currently filed under
    bb: Aabb,

    /// Last query that visited this element
    stamp: u64,
}

/// Spatial hash over elements identified by `T`
#[derive(Debug, Clone)]
pub struct SpaceHash<T: Copy + Ord> {
    /// Edge length of a grid cell
    cell_size: f32,

    /// Buckets of element ids
    table: Vec<Vec<T>>,

    /// Bounding box and query stamp per element, ordered for reproducible queries
    entries: BTreeMap<T, HashEntry>,

    /// Current query stamp
    stamp: u64,
}

/// Smallest prime greater than or equal to `n`
pub fn next_prime(n: usize) -> usize {
    let mut candidate = n.max(2);
    loop {
        let is_prime = (2..)
            .take_while(|d| d * d <= candidate)
            .all(|d| candidate % d != 0);
        if is_prime {
            return candidate;
        }
        candidate += 1;
    }
}

#[inline]
fn hash_cell(x: i32, y: i32, n: usize) -> usize {
    let h = (x as i64 as u64).wrapping_mul(HASH_X) ^ (y as i64 as u64).wrapping_mul(HASH_Y);
    (h % n as u64) as usize
}

/// Returns true if `cell_size` can be used as a grid cell edge
#[inline]
pub fn is_valid_cell_size(cell_size: f32) -> bool {
    cell_size.is_finite() && cell_size > 0.0
}

#[inline]
fn is_finite_bb(bb: &Aabb) -> bool {
    bb.min.x.is_finite() && bb.min.y.is_finite() && bb.max.x.is_finite() && bb.max.y.is_finite()
}

impl<T: Copy + Ord + std::fmt::Debug> SpaceHash<T> {
    /// Creates a hash with the given cell size and (rounded up to prime) bucket count.
    ///
    /// A cell size that is not positive and finite is replaced by
    /// [`DEFAULT_CELL_SIZE`].
    pub fn new(cell_size: f32, cell_count: usize) -> Self {
        let cell_size = if is_valid_cell_size(cell_size) {
            cell_size
        } else {
            warn!(cell_size, "invalid spatial hash cell size, using the default");
            DEFAULT_CELL_SIZE
        };

        Self {
            cell_size,
            table: vec![Vec::new(); next_prime(cell_count)],
            entries: BTreeMap::new(),
            stamp: 1,
        }
    }

    /// Returns the cell size
    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Returns the number of buckets
    pub fn cell_count(&self) -> usize {
        self.table.len()
    }

    /// Returns the number of elements
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the hash holds no elements
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns true if the element is in the hash
    pub fn contains(&self, id: T) -> bool {
        self.entries.contains_key(&id)
    }

    /// Returns the bounding box an element is filed under
    pub fn get_bb(&self, id: T) -> Option<Aabb> {
        self.entries.get(&id).map(|entry| entry.bb)
    }

    /// Changes the grid and rebuilds the table. A cell size that is not
    /// positive and finite is ignored and the current one kept.
    pub fn resize(&mut self, cell_size: f32, cell_count: usize) {
        debug!(cell_size, cell_count, "resizing spatial hash");
        if is_valid_cell_size(cell_size) {
            self.cell_size = cell_size;
        } else {
            warn!(cell_size, kept = self.cell_size, "invalid spatial hash cell size ignored");
        }
        self.table = vec![Vec::new(); next_prime(cell_count)];
        self.rehash();
    }

    /// Inclusive cell range covered by a bounding box
    fn cell_range(&self, bb: &Aabb) -> (i32, i32, i32, i32) {
        let dim = self.cell_size;
        (
            (bb.min.x / dim).floor() as i32,
            (bb.max.x / dim).floor() as i32,
            (bb.min.y / dim).floor() as i32,
            (bb.max.y / dim).floor() as i32,
        )
    }

    /// Bucket indices covered by a bounding box, one per cell
    fn buckets_for(&self, bb: &Aabb) -> Vec<usize> {
        if !is_finite_bb(bb) {
            return Vec::new();
        }

        let n = self.table.len();
        let (l, r, b, t) = self.cell_range(bb);
        let mut buckets = Vec::new();
        for x in l..=r {
            for y in b..=t {
                buckets.push(hash_cell(x, y, n));
            }
        }
        buckets
    }

    fn file(&mut self, id: T, bb: &Aabb) {
        for idx in self.buckets_for(bb) {
            let bucket = &mut self.table[idx];
            if !bucket.contains(&id) {
                bucket.push(id);
            }
        }
    }

    fn unfile(&mut self, id: T, bb: &Aabb) {
        for idx in self.buckets_for(bb) {
            self.table[idx].retain(|other| *other != id);
        }
    }

    /// Adds an element. Replaces the entry if the id is already present.
    pub fn insert(&mut self, id: T, bb: Aabb) {
        if !is_finite_bb(&bb) {
            warn!(?id, "inserting element with non-finite bounding box; it will not be queried");
        }

        if let Some(old) = self.entries.insert(id, HashEntry { bb, stamp: 0 }) {
            self.unfile(id, &old.bb);
        }
        self.file(id, &bb);
    }

    /// Removes an element, returning true if it was present
    pub fn remove(&mut self, id: T) -> bool {
        match self.entries.remove(&id) {
            Some(entry) => {
                self.unfile(id, &entry.bb);
                true
            }
            None => false,
        }
    }

    /// Records a new bounding box without refiling. Call [`SpaceHash::rehash`]
    /// or [`SpaceHash::query_rehash`] afterwards.
    pub fn set_bb(&mut self, id: T, bb: Aabb) {
        if let Some(entry) = self.entries.get_mut(&id) {
            entry.bb = bb;
        }
    }

    /// Moves one element to the cells of its new bounding box
    pub fn rehash_object(&mut self, id: T, bb: Aabb) {
        if let Some(entry) = self.entries.get_mut(&id) {
            let old = std::mem::replace(&mut entry.bb, bb);
            self.unfile(id, &old);
            self.file(id, &bb);
        }
    }

    /// Refiles every element under its stored bounding box
    pub fn rehash(&mut self) {
        for bucket in &mut self.table {
            bucket.clear();
        }

        let filed: Vec<(T, Aabb)> = self.entries.iter().map(|(id, e)| (*id, e.bb)).collect();
        for (id, bb) in filed {
            self.file(id, &bb);
        }
    }

    /// Calls `f` for each element
    pub fn each(&self, mut f: impl FnMut(T, &Aabb)) {
        for (id, entry) in &self.entries {
            f(*id, &entry.bb);
        }
    }

    /// Calls `f` once for every element whose bounding box intersects `bb`
    pub fn query(&mut self, bb: Aabb, mut f: impl FnMut(T)) {
        self.stamp += 1;
        let stamp = self.stamp;

        let buckets = self.buckets_for(&bb);
        let Self { table, entries, .. } = &mut *self;
        for idx in buckets {
            for other in &table[idx] {
                let Some(entry) = entries.get_mut(other) else {
                    continue;
                };
                if entry.stamp == stamp {
                    continue;
                }
                entry.stamp = stamp;

                if entry.bb.intersects(&bb) {
                    f(*other);
                }
            }
        }
    }

    /// Calls `f` for every element whose bounding box contains `point`
    pub fn point_query(&self, point: Vector2, mut f: impl FnMut(T)) {
        if !(point.x.is_finite() && point.y.is_finite()) {
            return;
        }

        let dim = self.cell_size;
        let idx = hash_cell(
            (point.x / dim).floor() as i32,
            (point.y / dim).floor() as i32,
            self.table.len(),
        );

        for other in &self.table[idx] {
            if let Some(entry) = self.entries.get(other) {
                if entry.bb.contains_point(point) {
                    f(*other);
                }
            }
        }
    }

    /// Rebuilds the table from the stored bounding boxes while reporting
    /// every overlapping pair exactly once, as `f(later, earlier)`.
    pub fn query_rehash(&mut self, mut f: impl FnMut(T, T)) {
        for bucket in &mut self.table {
            bucket.clear();
        }

        let filed: Vec<(T, Aabb)> = self.entries.iter().map(|(id, e)| (*id, e.bb)).collect();
        for (id, bb) in filed {
            self.stamp += 1;
            let stamp = self.stamp;

            let buckets = self.buckets_for(&bb);
            let Self { table, entries, .. } = &mut *self;
            for idx in buckets {
                for other in &table[idx] {
                    if *other == id {
                        continue;
                    }
                    let Some(entry) = entries.get_mut(other) else {
                        continue;
                    };
                    if entry.stamp == stamp {
                        continue;
                    }
                    entry.stamp = stamp;

                    if entry.bb.intersects(&bb) {
                        f(id, *other);
                    }
                }

                let bucket = &mut table[idx];
                if !bucket.contains(&id) {
                    bucket.push(id);
                }
            }
        }
    }
}
