//! Raw slot storage for the bounded queue.
//!
//! A single contiguous allocation of `capacity` uninitialized slots,
//! addressed by index. The arena hands out no references and tracks no
//! occupancy itself; the queue drives which slots are live through its
//! occupancy window and must balance every `write` against exactly one
//! `take` or `drop_at`. Dropping the arena releases the allocation without
//! running any element destructor.

use std::mem::ManuallyDrop;
use std::ptr;

pub(crate) struct SlotArena<T> {
    slots: *mut T,
    capacity: usize,
}

impl<T> SlotArena<T> {
    /// Allocates `capacity` slots. No slot is initialized.
    pub(crate) fn new(capacity: usize) -> Self {
        debug_assert!(capacity > 0);

        // Vec guarantees alignment; ManuallyDrop keeps the allocation alive
        // until our own Drop reconstructs it.
        let slots = ManuallyDrop::new(Vec::<T>::with_capacity(capacity)).as_mut_ptr();
        Self { slots, capacity }
    }

    #[inline]
    pub(crate) fn capacity(&self) -> usize {
        self.capacity
    }

    /// Constructs `value` in place in the slot at `index`.
    ///
    /// # Safety
    ///
    /// `index` must be in bounds and the slot must be vacant, otherwise a
    /// live element is overwritten without being dropped.
    #[inline]
    pub(crate) unsafe fn write(&self, index: usize, value: T) {
        debug_assert!(index < self.capacity);
        unsafe { self.slots.add(index).write(value) };
    }

    /// Moves the value out of the slot at `index`, leaving it vacant.
    ///
    /// # Safety
    ///
    /// `index` must be in bounds and the slot must be live, and no other
    /// `take`/`drop_at` may target the same occupancy of that slot.
    #[inline]
    pub(crate) unsafe fn take(&self, index: usize) -> T {
        debug_assert!(index < self.capacity);
        unsafe { self.slots.add(index).read() }
    }

    /// Runs the destructor of the value at `index` in place, leaving the
    /// slot vacant.
    ///
    /// # Safety
    ///
    /// Same contract as [`take`](Self::take).
    #[inline]
    pub(crate) unsafe fn drop_at(&self, index: usize) {
        debug_assert!(index < self.capacity);
        unsafe { ptr::drop_in_place(self.slots.add(index)) };
    }
}

impl<T> Drop for SlotArena<T> {
    fn drop(&mut self) {
        // Live elements were already destroyed by the occupancy-window
        // owner; only the raw allocation remains to be freed.
        unsafe {
            let _ = Vec::from_raw_parts(self.slots, 0, self.capacity);
        }
    }
}
