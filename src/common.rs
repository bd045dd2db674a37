//! Common functionality for the SPSC fifo variants
//!
//! This module provides the shared leaves used by the queue variants:
//! memory ordering aliases, the full-queue error type, and the raw
//! fixed-capacity slot storage every variant is built on.

use std::alloc::{self, Layout};
use std::fmt;
use std::mem;
use std::ptr::NonNull;

/// Memory ordering constants for atomic operations
///
/// Short aliases for the `std::sync::atomic::Ordering` modes used
/// throughout the queue variants.
pub mod ordering {
    pub use std::sync::atomic::Ordering::Acquire as A;
    pub use std::sync::atomic::Ordering::Release as R;
    pub use std::sync::atomic::Ordering::Relaxed as X;
    pub use std::sync::atomic::Ordering::SeqCst as S;
}

/// Error returned by `push` when the queue is at capacity.
///
/// The rejected element rides back inside the error, so a caller that wants
/// to retry gets its value back without a copy.
pub struct FifoFull<T>(pub(crate) T);

impl<T> FifoFull<T> {
    /// Recovers the element that did not fit.
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> fmt::Debug for FifoFull<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FifoFull(..)")
    }
}

impl<T> fmt::Display for FifoFull<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("fifo is full")
    }
}

impl<T> std::error::Error for FifoFull<T> {}

/// Raw fixed-capacity slot block shared by all queue variants.
///
/// Holds `capacity` uninitialized slots of `T`. Which slots hold live
/// elements is tracked entirely by the owning queue's cursors; the storage
/// itself only releases the block on drop, it never runs element
/// destructors.
pub struct RingStorage<T> {
    slots: *mut T,
    capacity: usize,
}

impl<T> RingStorage<T> {
    /// Allocates an uninitialized block of `capacity` slots.
    ///
    /// Aborts via `handle_alloc_error` if the allocator cannot provide the
    /// block. Panics if `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "fifo capacity must be at least 1");
        let slots = if mem::size_of::<T>() == 0 {
            NonNull::dangling().as_ptr()
        } else {
            let layout = Layout::array::<T>(capacity).expect("slot layout overflows usize");
            // SAFETY: the layout has non-zero size, checked just above.
            let ptr = unsafe { alloc::alloc(layout) } as *mut T;
            if ptr.is_null() {
                alloc::handle_alloc_error(layout);
            }
            ptr
        };
        Self { slots, capacity }
    }

    /// Number of slots in the block.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Pointer to the slot a cursor value maps to.
    ///
    /// The index is the cursor taken modulo capacity, so callers pass raw
    /// monotonic cursors and never reduce them. Whether the slot may be
    /// read, written, or dropped is governed by the owning queue's cursor
    /// protocol, not by this accessor.
    #[inline]
    pub fn slot(&self, pos: usize) -> *mut T {
        // SAFETY: pos % capacity is always inside the allocated block.
        unsafe { self.slots.add(pos % self.capacity) }
    }
}

impl<T> Drop for RingStorage<T> {
    fn drop(&mut self) {
        // Live elements have already been drained by the owning queue;
        // only the block itself is released here.
        if mem::size_of::<T>() != 0 {
            let layout = Layout::array::<T>(self.capacity).expect("slot layout overflows usize");
            // SAFETY: slots was allocated with this exact layout in new().
            unsafe { alloc::dealloc(self.slots as *mut u8, layout) };
        }
    }
}

// SAFETY: the block is a plain array of T slots behind a raw pointer.
// Sending or sharing it across threads is sound whenever T itself may move
// between threads; all aliasing discipline lives in the cursor protocol of
// the owning queue.
unsafe impl<T: Send> Send for RingStorage<T> {}
unsafe impl<T: Send> Sync for RingStorage<T> {}
