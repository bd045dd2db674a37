//! SPSC fifo with privately cached opposite cursors
//!
//! Builds on [`crate::acqrel`]: same storage, same release/acquire
//! publication, same padding. The addition is a plain, non-atomic snapshot
//! of the opposite cursor kept inside each endpoint. An endpoint trusts
//! its snapshot until the snapshot itself reports the boundary (full for
//! the producer, empty for the consumer); only then does it take one fresh
//! acquire load, store it back into the snapshot, and re-check.
//!
//! The snapshot can only be stale in the safe direction: a producer's view
//! of the read cursor lags reality, so it may see "full" spuriously but
//! never sees a slot as vacant before the consumer has left it, and
//! symmetrically for the consumer. A boundary verdict becomes final only
//! after a fresh load confirms it.
//!
//! Between boundary encounters the hot path touches no cache line the
//! other core writes, which is where the gain over [`crate::acqrel`]
//! comes from.

use std::ptr;
use std::sync::atomic::AtomicUsize;
use std::sync::Arc;

use crossbeam_utils::CachePadded;

use crate::common::{ordering, FifoFull, RingStorage};

/// State shared by the two endpoints.
///
/// Identical to the acqrel variant; the cursor snapshots live in the
/// endpoints, not here, so each snapshot sits in memory only its own
/// thread touches.
struct Shared<T> {
    write: CachePadded<AtomicUsize>,
    read: CachePadded<AtomicUsize>,
    storage: RingStorage<T>,
}

impl<T> Shared<T> {
    #[inline]
    fn len(&self) -> usize {
        // Advisory snapshot from the real cursors; the endpoint caches
        // play no part here. Underflow-free for the same reason as the
        // other variants.
        let write = self.write.load(ordering::X);
        let read = self.read.load(ordering::X);
        write - read
    }
}

impl<T> Drop for Shared<T> {
    fn drop(&mut self) {
        // Last endpoint gone; single-threaded from here.
        let write = self.write.load(ordering::X);
        let mut read = self.read.load(ordering::X);
        while read != write {
            // SAFETY: slots in [read, write) are exactly the live ones.
            unsafe { ptr::drop_in_place(self.storage.slot(read)) };
            read += 1;
        }
    }
}

/// Push endpoint of a [`fifo`]. Move it to the producer thread.
pub struct Producer<T> {
    shared: Arc<Shared<T>>,
    /// Snapshot of the consumer's cursor; lags reality, never leads it.
    cached_read: usize,
}

/// Pop endpoint of a [`fifo`]. Move it to the consumer thread.
pub struct Consumer<T> {
    shared: Arc<Shared<T>>,
    /// Snapshot of the producer's cursor; lags reality, never leads it.
    cached_write: usize,
}

/// Creates a fifo with room for `capacity` elements and returns its two
/// endpoints.
///
/// The storage is allocated up front and never resized. Panics if
/// `capacity` is zero; aborts through `handle_alloc_error` if the block
/// cannot be allocated.
pub fn fifo<T>(capacity: usize) -> (Producer<T>, Consumer<T>) {
    let shared = Arc::new(Shared {
        write: CachePadded::new(AtomicUsize::new(0)),
        read: CachePadded::new(AtomicUsize::new(0)),
        storage: RingStorage::new(capacity),
    });
    (
        Producer {
            shared: Arc::clone(&shared),
            cached_read: 0,
        },
        Consumer {
            shared,
            cached_write: 0,
        },
    )
}

impl<T> Producer<T> {
    /// Appends `value` at the back of the queue.
    ///
    /// Fails without blocking when the queue is full; the rejected value
    /// comes back inside the error. The full verdict is only ever given
    /// after a fresh look at the consumer's cursor.
    pub fn push(&mut self, value: T) -> Result<(), FifoFull<T>> {
        let capacity = self.shared.storage.capacity();
        let write = self.shared.write.load(ordering::X);
        // Trust the snapshot first; only a "looks full" answer is worth a
        // trip to the consumer's cache line.
        if write - self.cached_read == capacity && write - self.refresh_read() == capacity {
            return Err(FifoFull(value));
        }
        // SAFETY: write - cached_read < capacity, and the snapshot never
        // exceeds the consumer's real cursor, so the slot at `write` is
        // vacant and owned by this role until the store below.
        unsafe { ptr::write(self.shared.storage.slot(write), value) };
        // Release publishes the element constructed above.
        self.shared.write.store(write + 1, ordering::R);
        Ok(())
    }

    /// Takes a fresh acquire look at the consumer's cursor and updates the
    /// snapshot. Out of line: the fast path never loads from the shared
    /// cache line this touches.
    #[cold]
    fn refresh_read(&mut self) -> usize {
        // Acquire pairs with the consumer's release store; slots vacated
        // up to the loaded cursor are reusable.
        self.cached_read = self.shared.read.load(ordering::A);
        self.cached_read
    }

    /// Fixed capacity of the queue.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.shared.storage.capacity()
    }

    /// Number of queued elements, read from the real cursors.
    ///
    /// A transient snapshot under concurrency: the consumer may move its
    /// cursor between the two loads.
    #[inline]
    pub fn len(&self) -> usize {
        self.shared.len()
    }

    /// Whether the queue looked empty during this call. Same advisory
    /// caveat as [`len`](Self::len).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the queue looked full during this call. Same advisory
    /// caveat as [`len`](Self::len).
    #[inline]
    pub fn is_full(&self) -> bool {
        self.len() == self.capacity()
    }
}

impl<T> Consumer<T> {
    /// Removes and returns the element at the front of the queue.
    ///
    /// Returns `None` without blocking when the queue is empty. The empty
    /// verdict is only ever given after a fresh look at the producer's
    /// cursor.
    pub fn pop(&mut self) -> Option<T> {
        let read = self.shared.read.load(ordering::X);
        // Trust the snapshot first; only a "looks empty" answer is worth
        // a trip to the producer's cache line.
        if read == self.cached_write && read == self.refresh_write() {
            return None;
        }
        // SAFETY: read < cached_write, and the snapshot never exceeds the
        // producer's real cursor, so the slot at `read` holds a live,
        // fully published element owned by this role until the store
        // below.
        let value = unsafe { ptr::read(self.shared.storage.slot(read)) };
        // Release returns the vacated slot to the producer.
        self.shared.read.store(read + 1, ordering::R);
        Some(value)
    }

    /// Takes a fresh acquire look at the producer's cursor and updates the
    /// snapshot. Out of line: the fast path never loads from the shared
    /// cache line this touches.
    #[cold]
    fn refresh_write(&mut self) -> usize {
        // Acquire pairs with the producer's release store; elements below
        // the loaded cursor are fully visible.
        self.cached_write = self.shared.write.load(ordering::A);
        self.cached_write
    }

    /// Fixed capacity of the queue.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.shared.storage.capacity()
    }

    /// Number of queued elements, read from the real cursors.
    ///
    /// A transient snapshot under concurrency: the producer may move its
    /// cursor between the two loads.
    #[inline]
    pub fn len(&self) -> usize {
        self.shared.len()
    }

    /// Whether the queue looked empty during this call. Same advisory
    /// caveat as [`len`](Self::len).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the queue looked full during this call. Same advisory
    /// caveat as [`len`](Self::len).
    #[inline]
    pub fn is_full(&self) -> bool {
        self.len() == self.capacity()
    }
}
