//! Plumbing shared by the integration suites.
//!
//! The three variants expose the same inherent surface but distinct types;
//! one adapter trait per endpoint role lets every suite run identically
//! against all of them through a `fn(usize) -> (P, C)` constructor
//! parameter. `DropTally` is the payload used for teardown accounting.

// Each integration suite compiles its own copy; not every suite calls
// every adapter method.
#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use spsc_fifo_rs::{acqrel, cached, seqcst, FifoFull};

pub trait PushApi: Send + 'static {
    type Item;
    fn push(&mut self, value: Self::Item) -> Result<(), FifoFull<Self::Item>>;
    fn capacity(&self) -> usize;
    fn len(&self) -> usize;
    fn is_empty(&self) -> bool;
    fn is_full(&self) -> bool;
}

pub trait PopApi: Send + 'static {
    type Item;
    fn pop(&mut self) -> Option<Self::Item>;
    fn len(&self) -> usize;
    fn is_empty(&self) -> bool;
    fn is_full(&self) -> bool;
}

impl<T: Send + 'static> PushApi for seqcst::Producer<T> {
    type Item = T;
    fn push(&mut self, value: T) -> Result<(), FifoFull<T>> {
        seqcst::Producer::push(self, value)
    }
    fn capacity(&self) -> usize {
        seqcst::Producer::capacity(self)
    }
    fn len(&self) -> usize {
        seqcst::Producer::len(self)
    }
    fn is_empty(&self) -> bool {
        seqcst::Producer::is_empty(self)
    }
    fn is_full(&self) -> bool {
        seqcst::Producer::is_full(self)
    }
}

impl<T: Send + 'static> PopApi for seqcst::Consumer<T> {
    type Item = T;
    fn pop(&mut self) -> Option<T> {
        seqcst::Consumer::pop(self)
    }
    fn len(&self) -> usize {
        seqcst::Consumer::len(self)
    }
    fn is_empty(&self) -> bool {
        seqcst::Consumer::is_empty(self)
    }
    fn is_full(&self) -> bool {
        seqcst::Consumer::is_full(self)
    }
}

impl<T: Send + 'static> PushApi for acqrel::Producer<T> {
    type Item = T;
    fn push(&mut self, value: T) -> Result<(), FifoFull<T>> {
        acqrel::Producer::push(self, value)
    }
    fn capacity(&self) -> usize {
        acqrel::Producer::capacity(self)
    }
    fn len(&self) -> usize {
        acqrel::Producer::len(self)
    }
    fn is_empty(&self) -> bool {
        acqrel::Producer::is_empty(self)
    }
    fn is_full(&self) -> bool {
        acqrel::Producer::is_full(self)
    }
}

impl<T: Send + 'static> PopApi for acqrel::Consumer<T> {
    type Item = T;
    fn pop(&mut self) -> Option<T> {
        acqrel::Consumer::pop(self)
    }
    fn len(&self) -> usize {
        acqrel::Consumer::len(self)
    }
    fn is_empty(&self) -> bool {
        acqrel::Consumer::is_empty(self)
    }
    fn is_full(&self) -> bool {
        acqrel::Consumer::is_full(self)
    }
}

impl<T: Send + 'static> PushApi for cached::Producer<T> {
    type Item = T;
    fn push(&mut self, value: T) -> Result<(), FifoFull<T>> {
        cached::Producer::push(self, value)
    }
    fn capacity(&self) -> usize {
        cached::Producer::capacity(self)
    }
    fn len(&self) -> usize {
        cached::Producer::len(self)
    }
    fn is_empty(&self) -> bool {
        cached::Producer::is_empty(self)
    }
    fn is_full(&self) -> bool {
        cached::Producer::is_full(self)
    }
}

impl<T: Send + 'static> PopApi for cached::Consumer<T> {
    type Item = T;
    fn pop(&mut self) -> Option<T> {
        cached::Consumer::pop(self)
    }
    fn len(&self) -> usize {
        cached::Consumer::len(self)
    }
    fn is_empty(&self) -> bool {
        cached::Consumer::is_empty(self)
    }
    fn is_full(&self) -> bool {
        cached::Consumer::is_full(self)
    }
}

/// Payload that bumps a shared counter when dropped, wherever the drop
/// happens: on pop, or inside the queue's teardown drain.
pub struct DropTally {
    pub value: u64,
    drops: Arc<AtomicUsize>,
}

impl DropTally {
    pub fn new(value: u64, drops: &Arc<AtomicUsize>) -> Self {
        Self {
            value,
            drops: Arc::clone(drops),
        }
    }
}

impl Drop for DropTally {
    fn drop(&mut self) {
        self.drops.fetch_add(1, Ordering::SeqCst);
    }
}
