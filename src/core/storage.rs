use std::collections::BTreeMap;
use crate::core::{BodyHandle, ShapeHandle};
use crate::error::PhysicsError;
use crate::Result;

/// A handle type that can be stored as a key in a [`Storage`]
pub trait Handle: Copy + Ord + std::fmt::Debug {
    /// Name used in error messages
    const KIND: &'static str;

    /// Builds a handle from its raw id
    fn from_raw(id: u32) -> Self;

    /// Returns the raw id of the handle
    fn raw(self) -> u32;
}

impl Handle for BodyHandle {
    const KIND: &'static str = "Body";

    fn from_raw(id: u32) -> Self {
        BodyHandle(id)
    }

    fn raw(self) -> u32 {
        self.0
    }
}

impl Handle for ShapeHandle {
    const KIND: &'static str = "Shape";

    fn from_raw(id: u32) -> Self {
        ShapeHandle(id)
    }

    fn raw(self) -> u32 {
        self.0
    }
}

/// Handle-keyed arena for physics objects.
///
/// Iteration follows handle order so a simulation replays identically.
#[derive(Debug)]
pub struct Storage<H: Handle, T> {
    items: BTreeMap<H, T>,
    next_id: u32,
}

/// Storage for physics bodies
pub type BodyStorage<T> = Storage<BodyHandle, T>;

/// Storage for collision shapes
pub type ShapeStorage<T> = Storage<ShapeHandle, T>;

impl<H: Handle, T> Default for Storage<H, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: Handle, T> Storage<H, T> {
    /// Creates a new empty storage
    pub fn new() -> Self {
        Self {
            items: BTreeMap::new(),
            next_id: 1, // Start at 1, so 0 can represent invalid handle
        }
    }

    /// Adds an item to the storage and returns a freshly allocated handle
    pub fn add(&mut self, item: T) -> H {
        let handle = H::from_raw(self.next_id);
        self.next_id += 1;
        self.items.insert(handle, item);
        handle
    }

    /// Adds an item under a handle chosen by the caller
    pub fn insert(&mut self, handle: H, item: T) -> Result<()> {
        if self.items.contains_key(&handle) {
            return Err(PhysicsError::InvalidParameter(format!(
                "{} with handle {:?} already exists",
                H::KIND,
                handle
            )));
        }
        self.next_id = self.next_id.max(handle.raw().saturating_add(1));
        self.items.insert(handle, item);
        Ok(())
    }

    /// Gets a reference to an item by its handle
    pub fn get(&self, handle: H) -> Option<&T> {
        self.items.get(&handle)
    }

    /// Gets a mutable reference to an item by its handle
    pub fn get_mut(&mut self, handle: H) -> Option<&mut T> {
        self.items.get_mut(&handle)
    }

    /// Gets an item by its handle, returning an error if not found
    pub fn get_or_err(&self, handle: H) -> Result<&T> {
        self.get(handle).ok_or_else(|| Self::not_found(handle))
    }

    /// Gets a mutable reference to an item, returning an error if not found
    pub fn get_mut_or_err(&mut self, handle: H) -> Result<&mut T> {
        self.items.get_mut(&handle).ok_or_else(|| Self::not_found(handle))
    }

    /// Gets mutable references to two distinct items at once, in argument order
    pub fn get_pair_mut(&mut self, a: H, b: H) -> Option<(&mut T, &mut T)> {
        if a == b {
            return None;
        }

        let (lo, hi) = if a < b { (a, b) } else { (b, a) };
        let mut range = self.items.range_mut(lo..=hi);
        let (lo_key, lo_item) = range.next()?;
        let (hi_key, hi_item) = range.next_back()?;
        if *lo_key != lo || *hi_key != hi {
            return None;
        }

        if a < b {
            Some((lo_item, hi_item))
        } else {
            Some((hi_item, lo_item))
        }
    }

    /// Removes an item from the storage
    pub fn remove(&mut self, handle: H) -> Option<T> {
        self.items.remove(&handle)
    }

    /// Returns whether the handle refers to a stored item
    pub fn contains(&self, handle: H) -> bool {
        self.items.contains_key(&handle)
    }

    /// Returns the number of items in the storage
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns whether the storage is empty
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Clears all items from the storage
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Returns all handles in iteration order
    pub fn handles(&self) -> Vec<H> {
        self.items.keys().copied().collect()
    }

    /// Returns an iterator over all items
    pub fn iter(&self) -> impl Iterator<Item = (H, &T)> + '_ {
        self.items.iter().map(|(h, item)| (*h, item))
    }

    /// Returns a mutable iterator over all items
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (H, &mut T)> + '_ {
        self.items.iter_mut().map(|(h, item)| (*h, item))
    }

    fn not_found(handle: H) -> PhysicsError {
        PhysicsError::ResourceNotFound(format!("{} with handle {:?} not found", H::KIND, handle))
    }
}
