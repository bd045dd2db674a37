//! Baseline SPSC fifo with sequentially consistent cursors
//!
//! Both cursors are atomic and every access uses `SeqCst`, the strongest
//! ordering. Nothing more is needed for correctness, and nothing here is
//! tuned: each operation pays a full cross-core synchronization even though
//! every cursor has exactly one writer. The [`crate::acqrel`] variant keeps
//! this structure and weakens the orderings to what the two roles actually
//! require; [`crate::cached`] then removes most cross-thread loads entirely.

use std::ptr;
use std::sync::atomic::AtomicUsize;
use std::sync::Arc;

use crate::common::{ordering, FifoFull, RingStorage};

/// State shared by the two endpoints: monotonic cursors plus the slot block.
///
/// A slot is live exactly while its position lies in `[read, write)`; the
/// cursors themselves are the only liveness record.
struct Shared<T> {
    write: AtomicUsize,
    read: AtomicUsize,
    storage: RingStorage<T>,
}

impl<T> Shared<T> {
    #[inline]
    fn len(&self) -> usize {
        // The calling endpoint's own cursor cannot move during this call
        // and the opposite cursor never passes it, so the subtraction
        // cannot underflow.
        let write = self.write.load(ordering::S);
        let read = self.read.load(ordering::S);
        write - read
    }
}

impl<T> Drop for Shared<T> {
    fn drop(&mut self) {
        // Runs when the last endpoint is dropped, so no concurrent access
        // remains. Every still-live element is destructed exactly once;
        // RingStorage then releases the block.
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
        write: AtomicUsize::new(0),
        read: AtomicUsize::new(0),
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
        let write = shared.write.load(ordering::S);
        let read = shared.read.load(ordering::S);
        if write - read == shared.storage.capacity() {
            return Err(FifoFull(value));
        }
        // SAFETY: the slot at `write` is vacant. Only this endpoint ever
        // advances the write cursor, and the consumer stays below it.
        unsafe { ptr::write(shared.storage.slot(write), value) };
        shared.write.fetch_add(1, ordering::S);
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
        let write = shared.write.load(ordering::S);
        let read = shared.read.load(ordering::S);
        if write == read {
            return None;
        }
        // SAFETY: the slot at `read` holds a live element published by the
        // producer. Moving it out vacates the slot before the cursor bump
        // lets the producer reuse it.
        let value = unsafe { ptr::read(shared.storage.slot(read)) };
        shared.read.fetch_add(1, ordering::S);
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

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn push_pop_preserves_order() {
        let (mut p, mut c) = fifo(8);
        for i in 0..5 {
            assert!(p.push(i).is_ok());
        }
        assert_eq!(p.len(), 5);
        for i in 0..5 {
            assert_eq!(c.pop(), Some(i));
        }
        assert_eq!(c.pop(), None);
        assert!(c.is_empty());
    }

    #[test]
    fn full_queue_rejects_and_recovers() {
        let (mut p, mut c) = fifo(2);
        assert!(p.push('a').is_ok());
        assert!(p.push('b').is_ok());
        assert!(p.is_full());
        let rejected = p.push('c').unwrap_err().into_inner();
        assert_eq!(rejected, 'c');
        assert_eq!(c.pop(), Some('a'));
        assert!(p.push('c').is_ok());
        assert_eq!(c.pop(), Some('b'));
        assert_eq!(c.pop(), Some('c'));
    }

    #[test]
    fn cursors_wrap_over_many_rounds() {
        let (mut p, mut c) = fifo(3);
        for round in 0..10u64 {
            for k in 0..3 {
                assert!(p.push(round * 3 + k).is_ok());
            }
            assert!(p.is_full());
            for k in 0..3 {
                assert_eq!(c.pop(), Some(round * 3 + k));
            }
        }
        assert!(c.is_empty());
    }

    #[test]
    fn two_threads_hand_off_every_value_in_order() {
        const N: u64 = 100_000;
        let (mut p, mut c) = fifo(64);
        let producer = thread::spawn(move || {
            for i in 0..N {
                let mut item = i;
                while let Err(back) = p.push(item) {
                    item = back.into_inner();
                    crate::arch::spin_loop_pause();
                }
            }
        });
        for expected in 0..N {
            let got = loop {
                if let Some(v) = c.pop() {
                    break v;
                }
                crate::arch::spin_loop_pause();
            };
            assert_eq!(got, expected);
        }
        producer.join().unwrap();
        assert_eq!(c.pop(), None);
    }
}
