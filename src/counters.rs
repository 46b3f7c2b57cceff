//! Diagnostic event counters
//!
//! Monotonic per-source tallies plus a lost-event tally. Counters are plain
//! atomics so stage 0 can bump the lost tally from interrupt context without
//! taking the device mutex. There is no reset; a snapshot is the only way to
//! read them from outside the driver.

use core::sync::atomic::{AtomicU32, Ordering};

/// Interrupt event sources recognized by the cascade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EventSource {
    /// New sample in `OUT_X..OUT_Z`
    DataReady,
    /// FIFO threshold, overrun or empty
    Fifo,
    /// Interrupt generator 1
    Ig1,
    /// Interrupt generator 2
    Ig2,
    /// Inactivity detection
    Inactivity,
    /// Boot sequence complete
    Boot,
}

impl EventSource {
    /// Every source, in dispatch order
    pub const ALL: [Self; 6] = [
        Self::DataReady,
        Self::Fifo,
        Self::Ig1,
        Self::Ig2,
        Self::Inactivity,
        Self::Boot,
    ];

    const fn index(self) -> usize {
        self as usize
    }
}

/// Success and error tallies of one source
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SourceCounts {
    /// Events serviced normally
    pub ok: u32,
    /// Events whose decoder hit a bus error or an inconsistent status
    pub err: u32,
}

/// Point-in-time copy of all counters
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CounterSnapshot {
    sources: [SourceCounts; 6],
    /// Interrupts that matched no enabled source or could not be serviced
    pub lost: u32,
}

impl CounterSnapshot {
    /// Tallies of one source
    #[must_use]
    pub const fn source(&self, source: EventSource) -> SourceCounts {
        self.sources[source.index()]
    }

    /// Sum of all OK tallies
    #[must_use]
    pub fn total_ok(&self) -> u32 {
        self.sources.iter().map(|counts| counts.ok).sum()
    }

    /// Sum of all error tallies
    #[must_use]
    pub fn total_err(&self) -> u32 {
        self.sources.iter().map(|counts| counts.err).sum()
    }
}

/// Live counters owned by the device handle
#[derive(Debug)]
pub struct Counters {
    ok: [AtomicU32; 6],
    err: [AtomicU32; 6],
    lost: AtomicU32,
}

impl Default for Counters {
    fn default() -> Self {
        Self::new()
    }
}

impl Counters {
    /// All counters at zero
    #[must_use]
    pub const fn new() -> Self {
        Self {
            ok: [const { AtomicU32::new(0) }; 6],
            err: [const { AtomicU32::new(0) }; 6],
            lost: AtomicU32::new(0),
        }
    }

    pub(crate) fn record_ok(&self, source: EventSource) {
        self.ok[source.index()].fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_err(&self, source: EventSource) {
        self.err[source.index()].fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_lost(&self) {
        self.lost.fetch_add(1, Ordering::Relaxed);
    }

    /// Read every counter
    pub fn snapshot(&self) -> CounterSnapshot {
        let mut snapshot = CounterSnapshot {
            lost: self.lost.load(Ordering::Relaxed),
            ..CounterSnapshot::default()
        };
        for source in EventSource::ALL {
            snapshot.sources[source.index()] = SourceCounts {
                ok: self.ok[source.index()].load(Ordering::Relaxed),
                err: self.err[source.index()].load(Ordering::Relaxed),
            };
        }
        snapshot
    }
}
