//! SPSC fifo with ownership-aware orderings and cache-line isolation
//!
//! Each cursor has exactly one writing role, which admits a cheaper
//! discipline than the [`crate::seqcst`] baseline:
//!
//! - a role loads its own cursor `Relaxed` (it is the only writer),
//! - loads the opposite cursor `Acquire` (pairs with the other role's
//!   publish),
//! - publishes its own advance with a `Release` store after touching the
//!   slot.
//!
//! The release/acquire pairing is what hands slot ownership across
//! threads: an element is fully constructed before the write cursor
//! advance becomes visible, and fully moved out before the read cursor
//! advance does. `CachePadded` keeps the two cursors on separate cache
//! lines so one role's cursor stores do not invalidate the line the other
//! role keeps its own cursor on.

use std::ptr;
use std::sync::atomic::AtomicUsize;
use std::sync::Arc;

use crossbeam_utils::CachePadded;

use crate::common::{ordering, FifoFull, RingStorage};

/// State shared by the two endpoints.
///
/// Same cursor-range liveness rule as the baseline variant; only the
/// orderings and the padding differ.
struct Shared<T> {
    write: CachePadded<AtomicUsize>,
    read: CachePadded<AtomicUsize>,
    storage: RingStorage<T>,
}

impl<T> Shared<T> {
    #[inline]
    fn len(&self) -> usize {
        // Advisory snapshot; relaxed is enough. The calling endpoint's own
        // cursor is stable during the call and the opposite cursor never
        // passes it, so the subtraction cannot underflow.
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
}

/// Pop endpoint of a [`fifo`]. Move it to the consumer thread.
pub struct Consumer<T> {
    shared: Arc<Shared<T>>,
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
        },
        Consumer { shared },
    )
}

impl<T> Producer<T> {
    /// Appends `value` at the back of the queue.
    ///
    /// Fails without blocking when the queue is full; the rejected value
    /// comes back inside the error.
    pub fn push(&mut self, value: T) -> Result<(), FifoFull<T>> {
        let shared = &*self.shared;
        let write = shared.write.load(ordering::X);
        // Acquire pairs with the consumer's release store: slots the
        // consumer vacated up to `read` are reusable from here on.
        let read = shared.read.load(ordering::A);
        if write - read == shared.storage.capacity() {
            return Err(FifoFull(value));
        }
        // SAFETY: `write - read < capacity`, so the slot at `write` is
        // vacant and owned by this role until the store below.
        unsafe { ptr::write(shared.storage.slot(write), value) };
        // Release publishes the element constructed above; the consumer's
        // acquire load of the write cursor sees it fully initialized.
        shared.write.store(write + 1, ordering::R);
        Ok(())
    }

    /// Fixed capacity of the queue.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.shared.storage.capacity()
    }

    /// Number of queued elements.
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
    /// Returns `None` without blocking when the queue is empty.
    pub fn pop(&mut self) -> Option<T> {
        let shared = &*self.shared;
        // Acquire pairs with the producer's release store, making the
        // element at `read` fully visible before it is moved out.
        let write = shared.write.load(ordering::A);
        let read = shared.read.load(ordering::X);
        if write == read {
            return None;
        }
        // SAFETY: `read < write`, so the slot at `read` holds a live
        // element and is owned by this role until the store below.
        let value = unsafe { ptr::read(shared.storage.slot(read)) };
        // Release returns the vacated slot to the producer.
        shared.read.store(read + 1, ordering::R);
        Some(value)
    }

    /// Fixed capacity of the queue.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.shared.storage.capacity()
    }

    /// Number of queued elements.
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
