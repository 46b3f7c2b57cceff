//! Two-stage interrupt cascade
//!
//! Stage 0 runs in interrupt context. It never blocks and never takes the
//! device mutex: it checks that the deferred task is runnable and pushes the
//! pre-built [`GATE`] transaction onto a lock-free queue, or counts a lost
//! event.
//!
//! Stage 1 runs in task context once the gate read has refreshed
//! `CTRL3..=CTRL6`. It branches on the cached routing bits of both lines,
//! queues one status read per routed source and counts the pass-through
//! sources (inactivity, boot) directly. An interrupt that matches no routed
//! source counts exactly one lost event.
//!
//! ```text
//! IRQ ──► stage 0 ──► [GATE] ──► service() ──► stage 1 ──► [STATUS]   ──► data-ready decoder
//!                                                        ├► [FIFO_SRC] ──► FIFO decoder
//!                                                        ├► [IG_SRC1]  ──► IG1 decoder
//!                                                        ├► [IG_SRC2]  ──► IG2 decoder
//!                                                        └► inactivity / boot counted
//! ```

use core::sync::atomic::{AtomicBool, Ordering};

use heapless::mpmc::MpMcQueue;

use crate::bus::{Completion, Transaction};
use crate::counters::{Counters, EventSource};
use crate::interrupt::InterruptGenerator;
use crate::registers::{Register, field_sets};

/// Capacity of the interrupt-to-task queue
pub const QUEUE_DEPTH: usize = 16;

/// Gate read issued by stage 0: `CTRL3..=CTRL6`, covering both lines'
/// routing bits and the pin polarity in between
pub const GATE: Transaction = Transaction::read(Register::Ctrl3, 4).with_completion(Completion::Cascade);

/// Set of event sources
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SourceSet(u8);

impl SourceSet {
    /// No sources
    #[must_use]
    pub const fn empty() -> Self {
        Self(0)
    }

    /// This set plus `source`
    #[must_use]
    pub const fn with(self, source: EventSource) -> Self {
        Self(self.0 | (1 << source as u8))
    }

    /// Check membership
    #[must_use]
    pub const fn contains(self, source: EventSource) -> bool {
        self.0 & (1 << source as u8) != 0
    }

    /// Number of sources in the set
    #[must_use]
    pub const fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Check if the set is empty
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Members in dispatch order
    pub fn iter(self) -> impl Iterator<Item = EventSource> {
        EventSource::ALL
            .into_iter()
            .filter(move |source| self.contains(*source))
    }
}

/// Sources routed to either line according to cached `CTRL3` and `CTRL6`
#[must_use]
pub fn routed_sources(ctrl3: u8, ctrl6: u8) -> SourceSet {
    let int1 = field_sets::Ctrl3::from([ctrl3]);
    let int2 = field_sets::Ctrl6::from([ctrl6]);
    let mut set = SourceSet::empty();

    if int1.int_1_drdy() || int2.p_2_drdy() {
        set = set.with(EventSource::DataReady);
    }
    let fifo_int1 = int1.int_1_fth() || int1.int_1_ovr();
    let fifo_int2 = int2.p_2_wtm() || int2.p_2_ovr() || int2.p_2_empty();
    if fifo_int1 || fifo_int2 {
        set = set.with(EventSource::Fifo);
    }
    if int1.int_1_ig_1() || int2.p_2_ig_1() {
        set = set.with(EventSource::Ig1);
    }
    if int1.int_1_ig_2() || int2.p_2_ig_2() {
        set = set.with(EventSource::Ig2);
    }
    if int1.int_1_inact() {
        set = set.with(EventSource::Inactivity);
    }
    if int2.boot_i_2() {
        set = set.with(EventSource::Boot);
    }
    set
}

/// Status read servicing `source`, `None` for pass-through sources
#[must_use]
pub const fn source_read(source: EventSource) -> Option<Transaction> {
    match source {
        EventSource::DataReady => {
            Some(Transaction::read(Register::Status, 1).with_completion(Completion::DataReady))
        }
        EventSource::Fifo => {
            Some(Transaction::read(Register::FifoSrc, 1).with_completion(Completion::Fifo))
        }
        EventSource::Ig1 => Some(
            Transaction::read_then_clear(InterruptGenerator::Ig1.src_register(), 1)
                .with_completion(Completion::Ig1),
        ),
        EventSource::Ig2 => Some(
            Transaction::read_then_clear(InterruptGenerator::Ig2.src_register(), 1)
                .with_completion(Completion::Ig2),
        ),
        EventSource::Inactivity | EventSource::Boot => None,
    }
}

/// Interrupt-to-task hand-off
pub struct Cascade {
    queue: MpMcQueue<Transaction, QUEUE_DEPTH>,
    task_ready: AtomicBool,
}

impl Default for Cascade {
    fn default() -> Self {
        Self::new()
    }
}

impl Cascade {
    /// Empty queue, task not yet runnable
    #[must_use]
    pub const fn new() -> Self {
        Self {
            queue: MpMcQueue::new(),
            task_ready: AtomicBool::new(false),
        }
    }

    /// Mark the deferred task runnable or not
    pub fn set_task_ready(&self, ready: bool) {
        self.task_ready.store(ready, Ordering::Release);
    }

    /// Whether stage 0 will hand work to the task
    pub fn task_ready(&self) -> bool {
        self.task_ready.load(Ordering::Acquire)
    }

    /// Stage 0, interrupt context
    ///
    /// Returns `true` if the gate read was queued.
    pub fn stage0(&self, counters: &Counters) -> bool {
        if !self.task_ready() {
            counters.record_lost();
            return false;
        }
        if self.queue.enqueue(GATE).is_err() {
            counters.record_lost();
            return false;
        }
        true
    }

    /// Stage 1, task context, with freshly gated `CTRL3` and `CTRL6`
    ///
    /// Returns the sources that were dispatched or counted.
    pub fn stage1(&self, ctrl3: u8, ctrl6: u8, counters: &Counters) -> SourceSet {
        let sources = routed_sources(ctrl3, ctrl6);
        if sources.is_empty() {
            #[cfg(feature = "defmt")]
            defmt::warn!("interrupt with no routed source (CTRL3={=u8:#x} CTRL6={=u8:#x})", ctrl3, ctrl6);

            counters.record_lost();
            return sources;
        }

        #[cfg(feature = "defmt")]
        defmt::debug!("cascade dispatch {}", sources);

        let mut dropped = false;
        for source in sources.iter() {
            match source_read(source) {
                Some(txn) => {
                    if self.queue.enqueue(txn).is_err() {
                        dropped = true;
                    }
                }
                None => counters.record_ok(source),
            }
        }
        if dropped {
            #[cfg(feature = "defmt")]
            defmt::warn!("cascade queue full, source reads dropped");

            counters.record_lost();
        }
        sources
    }

    /// Next queued transaction
    pub fn pop(&self) -> Option<Transaction> {
        self.queue.dequeue()
    }
}
