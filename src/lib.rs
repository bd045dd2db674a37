//! # spsc_fifo_rs
//!
//! Lock-free single-producer single-consumer FIFO queues based on circular
//! buffers and atomic operations.
//!
//! Three variants of the same queue, in increasing order of
//! synchronization sophistication and throughput:
//!
//! - [`seqcst`]: every cursor access sequentially consistent; the
//!   baseline.
//! - [`acqrel`]: relaxed/acquire/release orderings matched to which role
//!   owns each cursor, plus cache-line isolation between the cursors.
//! - [`cached`]: acqrel plus a private snapshot of the opposite cursor in
//!   each endpoint, so the hot path stays off the other core's cache line.
//!
//! All three share one contract: fixed capacity chosen at construction,
//! modulo slot indexing (capacities need not be powers of two), push that
//! reports full and pop that reports empty instead of ever blocking, and
//! teardown that destructs whatever is still queued. Construction returns
//! a `Producer`/`Consumer` endpoint pair; each endpoint moves to its
//! role's thread and the type system keeps any third participant out.
//!
//! ```
//! use spsc_fifo_rs::cached;
//!
//! let (mut tx, mut rx) = cached::fifo(4);
//! for i in 0..4 {
//!     assert!(tx.push(i).is_ok());
//! }
//! assert!(tx.push(99).is_err()); // full, value handed back
//! assert_eq!(rx.pop(), Some(0));
//! assert!(tx.push(99).is_ok());
//! ```

// Cursors must be genuinely lock-free atomics; a mutex fallback would
// defeat the point of the crate.
#[cfg(not(target_has_atomic = "ptr"))]
compile_error!("spsc_fifo_rs requires lock-free pointer-width atomics");

pub mod arch;
mod common;

pub mod acqrel;
pub mod cached;
pub mod seqcst;

pub use common::FifoFull;

// The cached variant is the one to reach for; the others are the same
// queue with stronger orderings.
pub use cached::{fifo, Consumer, Producer};

#[cfg(test)]
mod tests {
    use super::*;

    fn requires_send<T: Send>() {}

    #[test]
    fn endpoints_move_between_threads() {
        requires_send::<seqcst::Producer<u64>>();
        requires_send::<seqcst::Consumer<u64>>();
        requires_send::<acqrel::Producer<String>>();
        requires_send::<acqrel::Consumer<String>>();
        requires_send::<cached::Producer<Vec<u8>>>();
        requires_send::<cached::Consumer<Vec<u8>>>();
    }

    #[test]
    fn full_error_is_a_std_error() {
        fn requires_error<E: std::error::Error>() {}
        requires_error::<FifoFull<u32>>();
    }
}
