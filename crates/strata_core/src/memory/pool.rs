//! # Generational Pool
//!
//! Dense, swap-compacting storage for a single payload type, addressed by
//! generational handles.
//!
//! ```text
//! slot_to_dense: [ 0 | 2 | - | 1 ]      indexed by Handle::index
//!                  |   |       |
//! values:        [ A | D | B ]          dense, iterated front to back
//! owners:        [h0 |h3 |h1 ]          back-reference to the owning handle
//! ```
//!
//! Removing a payload moves the last dense payload into the hole and
//! rewrites that payload's `slot_to_dense` entry. Its handle, generation
//! included, is untouched.

use bytemuck::Zeroable;

use super::allocator::{Handle, HandleAllocator};
use crate::config::DEFAULT_BUCKET_WIDTH;
use crate::error::HandleResult;

/// Handle-addressed storage for payloads of type `T`.
///
/// # Thread Safety
///
/// Not internally synchronized. One owner mutates a pool per tick.
///
/// # Example
///
/// ```rust
/// use strata_core::Pool;
///
/// let mut pool: Pool<u32> = Pool::new();
/// let (handle, value) = pool.create();
/// *value = 7;
///
/// assert_eq!(pool.get(handle), Some(&7));
/// assert_eq!(pool.remove(handle), 7);
/// assert!(pool.get(handle).is_none());
/// ```
#[derive(Debug)]
pub struct Pool<T> {
    handles: HandleAllocator,
    /// Dense position of each slot's payload. Meaningless for vacant slots.
    slot_to_dense: Vec<u32>,
    values: Vec<T>,
    owners: Vec<Handle>,
    bucket_width: usize,
    capacity: usize,
}

impl<T> Default for Pool<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Pool<T> {
    /// Creates an empty pool with the default bucket width.
    #[must_use]
    pub fn new() -> Self {
        Self::with_bucket_width(DEFAULT_BUCKET_WIDTH)
    }

    /// Creates an empty pool whose first allocation holds `bucket_width` payloads.
    ///
    /// No memory is allocated until the first insert.
    ///
    /// # Panics
    ///
    /// Panics if `bucket_width` is zero.
    #[must_use]
    pub fn with_bucket_width(bucket_width: usize) -> Self {
        assert!(bucket_width > 0, "Bucket width must be greater than zero");

        Self {
            handles: HandleAllocator::new(),
            slot_to_dense: Vec::new(),
            values: Vec::new(),
            owners: Vec::new(),
            bucket_width,
            capacity: 0,
        }
    }

    /// Number of live payloads.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True if the pool holds no payloads.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Payloads the pool can hold before growing.
    #[inline]
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Size of the first allocation.
    #[inline]
    #[must_use]
    pub const fn bucket_width(&self) -> usize {
        self.bucket_width
    }

    /// Creates a default-constructed payload.
    ///
    /// The returned reference lives until the next mutation of the pool.
    pub fn create(&mut self) -> (Handle, &mut T)
    where
        T: Default,
    {
        self.insert(T::default())
    }

    /// Creates an all-zero payload.
    pub fn create_zeroed(&mut self) -> (Handle, &mut T)
    where
        T: Zeroable,
    {
        self.insert(T::zeroed())
    }

    /// Stores `value`, returning its handle and a reference for further setup.
    ///
    /// This is **O(1)** amortized; it allocates only when the pool is full.
    pub fn insert(&mut self, value: T) -> (Handle, &mut T) {
        self.grow_if_full();

        let handle = self.handles.borrow_handle();
        let slot = handle.index() as usize;
        let position = self.values.len();

        if slot >= self.slot_to_dense.len() {
            self.slot_to_dense.resize(slot + 1, 0);
        }
        // Bounded by capacity, which never exceeds the handle index space.
        self.slot_to_dense[slot] = position as u32;
        self.values.push(value);
        self.owners.push(handle);

        (handle, &mut self.values[position])
    }

    /// True if `handle` refers to a live payload in this pool.
    #[inline]
    #[must_use]
    pub fn contains(&self, handle: Handle) -> bool {
        self.handles.is_valid(handle)
    }

    /// Validates `handle`, returning its current dense position.
    pub fn position_of(&self, handle: Handle) -> HandleResult<usize> {
        let slot = self.handles.check(handle)?;
        Ok(self.slot_to_dense[slot] as usize)
    }

    /// Gets the payload for `handle`, or `None` if the handle is not valid.
    #[inline]
    #[must_use]
    pub fn get(&self, handle: Handle) -> Option<&T> {
        let position = self.position_of(handle).ok()?;
        self.values.get(position)
    }

    /// Gets the payload for `handle` mutably, or `None` if the handle is not valid.
    #[inline]
    pub fn get_mut(&mut self, handle: Handle) -> Option<&mut T> {
        let position = self.position_of(handle).ok()?;
        self.values.get_mut(position)
    }

    /// Removes the payload for `handle`.
    ///
    /// # Panics
    ///
    /// Panics if `handle` is not valid. Removing through a stale handle is a
    /// programming error.
    pub fn remove(&mut self, handle: Handle) -> T {
        match self.try_remove(handle) {
            Ok(value) => value,
            Err(err) => panic!("Pool::remove called with invalid handle: {err}"),
        }
    }

    /// Removes the payload for `handle`, reporting why the handle was rejected.
    pub fn try_remove(&mut self, handle: Handle) -> HandleResult<T> {
        let position = self.position_of(handle)?;
        let (_, value) = self.remove_dense(position);
        Ok(value)
    }

    /// Removes the payload at dense `position`.
    ///
    /// The last payload moves into `position`, so a loop removing while
    /// walking the dense slice must look at `position` again afterwards.
    pub fn remove_by_dense_position(&mut self, position: usize) -> Option<(Handle, T)> {
        if position >= self.values.len() {
            return None;
        }
        Some(self.remove_dense(position))
    }

    /// Keeps only the payloads for which `keep` returns `true`.
    ///
    /// Visits every payload exactly once, including ones swapped backwards
    /// by an earlier removal.
    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(Handle, &mut T) -> bool,
    {
        let mut position = 0;
        while position < self.values.len() {
            if keep(self.owners[position], &mut self.values[position]) {
                position += 1;
            } else {
                self.remove_dense(position);
            }
        }
    }

    /// Removes every payload and invalidates every handle.
    ///
    /// Capacity is kept.
    pub fn clear(&mut self) {
        for handle in self.owners.drain(..) {
            self.handles.return_handle(handle);
        }
        self.values.clear();
    }

    /// Handle owning the payload at dense `position`.
    #[inline]
    #[must_use]
    pub fn handle_at(&self, position: usize) -> Option<Handle> {
        self.owners.get(position).copied()
    }

    /// Dense payloads, in storage order.
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.values
    }

    /// Dense payloads, mutably. Handles are unaffected by writes through this slice.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.values
    }

    /// Owning handles, parallel to [`Pool::as_slice`].
    #[inline]
    #[must_use]
    pub fn handles(&self) -> &[Handle] {
        &self.owners
    }

    /// Iterates over `(handle, payload)` in dense order.
    pub fn iter(&self) -> impl Iterator<Item = (Handle, &T)> {
        self.owners.iter().copied().zip(self.values.iter())
    }

    /// Iterates mutably over `(handle, payload)` in dense order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Handle, &mut T)> {
        self.owners.iter().copied().zip(self.values.iter_mut())
    }

    fn remove_dense(&mut self, position: usize) -> (Handle, T) {
        let value = self.values.swap_remove(position);
        let owner = self.owners.swap_remove(position);

        if let Some(&moved) = self.owners.get(position) {
            self.slot_to_dense[moved.index() as usize] = position as u32;
        }

        self.handles.return_handle(owner);
        (owner, value)
    }

    fn grow_if_full(&mut self) {
        if self.values.len() < self.capacity {
            return;
        }

        let new_capacity = if self.capacity == 0 {
            self.bucket_width
        } else {
            self.capacity * 2
        };
        let additional = new_capacity - self.values.len();
        self.values.reserve_exact(additional);
        self.owners.reserve_exact(additional);

        tracing::debug!(
            "Pool<{}> grew from {} to {}",
            std::any::type_name::<T>(),
            self.capacity,
            new_capacity
        );
        self.capacity = new_capacity;
    }
}
