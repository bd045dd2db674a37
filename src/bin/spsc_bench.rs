//! Throughput harness for the three fifo variants.
//!
//! One producer (this thread) and one consumer thread stream a known
//! sequence through a single queue: a warmup pass the size of the queue,
//! then a timed pass of `ITERS` values. The consumer validates every value
//! against its expected counter; the reported figure is timed pushes per
//! second. Both sides spin on a full or empty verdict, since the queue
//! itself never waits.

use std::hint::black_box;
use std::thread;
use std::time::Instant;

use spsc_fifo_rs::arch::spin_loop_pause;
use spsc_fifo_rs::{acqrel, cached, seqcst, FifoFull};

const FIFO_CAPACITY: usize = 131_072;
const ITERS: i64 = 20_000_000;

/// Producer-side surface the harness needs, implemented for every
/// variant's push endpoint.
trait PushEnd: Send + 'static {
    fn push(&mut self, value: i64) -> Result<(), FifoFull<i64>>;
    fn is_empty(&self) -> bool;
}

/// Consumer-side surface the harness needs.
trait PopEnd: Send + 'static {
    fn pop(&mut self) -> Option<i64>;
}

impl PushEnd for seqcst::Producer<i64> {
    fn push(&mut self, value: i64) -> Result<(), FifoFull<i64>> {
        seqcst::Producer::push(self, value)
    }
    fn is_empty(&self) -> bool {
        seqcst::Producer::is_empty(self)
    }
}

impl PopEnd for seqcst::Consumer<i64> {
    fn pop(&mut self) -> Option<i64> {
        seqcst::Consumer::pop(self)
    }
}

impl PushEnd for acqrel::Producer<i64> {
    fn push(&mut self, value: i64) -> Result<(), FifoFull<i64>> {
        acqrel::Producer::push(self, value)
    }
    fn is_empty(&self) -> bool {
        acqrel::Producer::is_empty(self)
    }
}

impl PopEnd for acqrel::Consumer<i64> {
    fn pop(&mut self) -> Option<i64> {
        acqrel::Consumer::pop(self)
    }
}

impl PushEnd for cached::Producer<i64> {
    fn push(&mut self, value: i64) -> Result<(), FifoFull<i64>> {
        cached::Producer::push(self, value)
    }
    fn is_empty(&self) -> bool {
        cached::Producer::is_empty(self)
    }
}

impl PopEnd for cached::Consumer<i64> {
    fn pop(&mut self) -> Option<i64> {
        cached::Consumer::pop(self)
    }
}

fn push_all<P: PushEnd>(producer: &mut P, count: i64) {
    for i in 0..count {
        let mut item = i;
        while let Err(back) = producer.push(black_box(item)) {
            item = back.into_inner();
            spin_loop_pause();
        }
    }
}

fn wait_for_empty<P: PushEnd>(producer: &P) {
    while !producer.is_empty() {
        spin_loop_pause();
    }
}

fn run<P: PushEnd, C: PopEnd>(name: &'static str, make: fn(usize) -> (P, C)) {
    let (mut producer, mut consumer) = make(FIFO_CAPACITY);

    let consumer_thread = thread::spawn(move || {
        // Warmup pass, then the timed pass; the expected counter restarts
        // at zero for each.
        for pass in [FIFO_CAPACITY as i64, ITERS] {
            for expected in 0..pass {
                let value = loop {
                    if let Some(v) = consumer.pop() {
                        break black_box(v);
                    }
                    spin_loop_pause();
                };
                assert_eq!(value, expected, "{}: fifo delivered a wrong value", name);
            }
        }
    });

    push_all(&mut producer, FIFO_CAPACITY as i64);
    wait_for_empty(&producer);

    let start = Instant::now();
    push_all(&mut producer, ITERS);
    wait_for_empty(&producer);
    let elapsed = start.elapsed();

    consumer_thread.join().expect("consumer thread panicked");

    println!(
        "{}: {:.0} ops/s",
        name,
        ITERS as f64 / elapsed.as_secs_f64()
    );
}

fn main() {
    println!(
        "capacity {}, {} timed pushes per variant",
        FIFO_CAPACITY, ITERS
    );
    run("seqcst", seqcst::fifo::<i64>);
    run("acqrel", acqrel::fifo::<i64>);
    run("cached", cached::fifo::<i64>);
}
