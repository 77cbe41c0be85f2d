//! # Handle Allocator
//!
//! Issues and reclaims generational handles. Holds no payload; pools and
//! the entity directory pair it with their own storage.

use std::fmt;

use bytemuck::{Pod, Zeroable};

use crate::error::{HandleError, HandleResult};

/// Opaque reference to a slot: index plus the generation it was issued at.
///
/// `#[repr(C)]` and `Pod` so renderers and physics can copy handle arrays
/// straight into their own buffers.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Pod, Zeroable)]
#[repr(C)]
pub struct Handle {
    index: u32,
    generation: u32,
}

impl Handle {
    /// Handle that no allocator ever issues.
    pub const NULL: Self = Self {
        index: u32::MAX,
        generation: u32::MAX,
    };

    /// Builds a handle from raw parts.
    #[inline]
    #[must_use]
    pub const fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Slot index.
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.index
    }

    /// Generation the slot had when this handle was issued.
    #[inline]
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.generation
    }

    /// Checks for the null handle.
    #[inline]
    #[must_use]
    pub const fn is_null(self) -> bool {
        self.index == u32::MAX && self.generation == u32::MAX
    }
}

impl Default for Handle {
    fn default() -> Self {
        Self::NULL
    }
}

impl fmt::Debug for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            f.write_str("Handle(null)")
        } else {
            write!(f, "Handle({}v{})", self.index, self.generation)
        }
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.index, self.generation)
    }
}

#[derive(Clone, Copy, Debug)]
struct SlotState {
    generation: u32,
    occupied: bool,
}

/// Free-list allocator of generational handles.
///
/// The free list is a stack: the most recently returned index is the next
/// one handed out.
#[derive(Debug, Default)]
pub struct HandleAllocator {
    slots: Vec<SlotState>,
    free_list: Vec<u32>,
    live_count: usize,
}

impl HandleAllocator {
    /// Creates an empty allocator.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_list: Vec::new(),
            live_count: 0,
        }
    }

    /// Creates an allocator with room for `capacity` slots before reallocating.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free_list: Vec::new(),
            live_count: 0,
        }
    }

    /// Reserves room for `additional` more slots.
    pub fn reserve(&mut self, additional: usize) {
        self.slots.reserve(additional);
    }

    /// Issues a handle, reusing the most recently freed slot when one exists.
    ///
    /// # Panics
    ///
    /// Panics if the index space (`u32::MAX` slots) is exhausted.
    pub fn borrow_handle(&mut self) -> Handle {
        self.live_count += 1;

        if let Some(index) = self.free_list.pop() {
            let slot = &mut self.slots[index as usize];
            slot.occupied = true;
            return Handle::new(index, slot.generation);
        }

        let index = u32::try_from(self.slots.len())
            .ok()
            .filter(|&index| index != u32::MAX)
            .unwrap_or_else(|| panic!("handle index space exhausted"));
        self.slots.push(SlotState {
            generation: 0,
            occupied: true,
        });
        Handle::new(index, 0)
    }

    /// Reclaims a handle, invalidating every copy of it.
    ///
    /// # Panics
    ///
    /// Panics if `handle` is not currently valid.
    pub fn return_handle(&mut self, handle: Handle) {
        let index = match self.check(handle) {
            Ok(index) => index,
            Err(err) => panic!("return_handle called with invalid handle: {err}"),
        };

        let slot = &mut self.slots[index];
        slot.generation = slot.generation.wrapping_add(1);
        slot.occupied = false;
        self.free_list.push(handle.index);
        self.live_count -= 1;
    }

    /// Validates a handle, returning its slot index.
    pub fn check(&self, handle: Handle) -> HandleResult<usize> {
        let index = handle.index as usize;
        let Some(slot) = self.slots.get(index) else {
            return Err(HandleError::OutOfRange {
                handle,
                slot_count: self.slots.len(),
            });
        };

        if slot.generation != handle.generation {
            return Err(HandleError::Stale {
                handle,
                current: slot.generation,
            });
        }

        if !slot.occupied {
            return Err(HandleError::Vacant { handle });
        }

        Ok(index)
    }

    /// True if `handle` refers to an occupied slot at its current generation.
    #[inline]
    #[must_use]
    pub fn is_valid(&self, handle: Handle) -> bool {
        self.check(handle).is_ok()
    }

    /// Number of handles currently out.
    #[inline]
    #[must_use]
    pub const fn live_count(&self) -> usize {
        self.live_count
    }

    /// Number of slots ever issued.
    #[inline]
    #[must_use]
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Number of slots waiting on the free list.
    #[inline]
    #[must_use]
    pub fn free_count(&self) -> usize {
        self.free_list.len()
    }

    /// Iterates over every live handle in slot order.
    pub fn iter_live(&self) -> impl Iterator<Item = Handle> + '_ {
        self.slots
            .iter()
            .zip(0u32..)
            .filter(|(slot, _)| slot.occupied)
            .map(|(slot, index)| Handle::new(index, slot.generation))
    }
}
