//! Per-source completion handlers
//!
//! Each decoder consumes the status byte its cascade read produced and is the
//! only writer of its source's counters. Decoders run in task context after
//! the bus transaction has released the device mutex; any follow-up reads
//! they issue take the mutex again per transaction.

use crate::Error;
use crate::bus::{Bus, Completion};
use crate::counters::{Counters, EventSource};
use crate::fifo::{FIFO_DEPTH, FifoStatus};
use crate::interrupt::IgSource;
use crate::registers::{Register, field_sets};

use device_driver::RegisterInterface;

/// Decoded `STATUS`
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[allow(clippy::struct_excessive_bools)]
pub struct Status {
    /// New X sample
    pub x_available: bool,
    /// New Y sample
    pub y_available: bool,
    /// New Z sample
    pub z_available: bool,
    /// New sample on all three axes
    pub xyz_available: bool,
    /// A sample was overwritten before it was read
    pub overrun: bool,
}

impl Status {
    /// Decode a raw `STATUS` byte
    #[must_use]
    pub fn from_raw(raw: u8) -> Self {
        let status = field_sets::Status::from([raw]);
        Self {
            x_available: status.x_da(),
            y_available: status.y_da(),
            z_available: status.z_da(),
            xyz_available: status.zyx_da(),
            overrun: status.zyx_or() || status.x_or() || status.y_or() || status.z_or(),
        }
    }

    /// Any axis has new data
    #[must_use]
    pub const fn data_available(&self) -> bool {
        self.xyz_available || self.x_available || self.y_available || self.z_available
    }
}

/// Decoder outcome when the bus itself succeeded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Outcome {
    Serviced,
    /// Status said nothing happened; a soft inconsistency
    Spurious,
}

/// Counter slot fed by a completion tag
pub(crate) const fn completion_source(completion: Completion) -> Option<EventSource> {
    match completion {
        Completion::Cascade => None,
        Completion::DataReady => Some(EventSource::DataReady),
        Completion::Fifo => Some(EventSource::Fifo),
        Completion::Ig1 => Some(EventSource::Ig1),
        Completion::Ig2 => Some(EventSource::Ig2),
    }
}

/// Run the decoder for `source` on the result of its status read
pub(crate) fn complete<I>(
    bus: &Bus<I>,
    counters: &Counters,
    source: EventSource,
    result: Result<u8, Error<I::Error>>,
) where
    I: RegisterInterface<AddressType = u8>,
{
    let outcome = result.and_then(|status| match source {
        EventSource::DataReady => data_ready(bus, status),
        EventSource::Fifo => drain_fifo(bus, status).map(|_| Outcome::Serviced),
        EventSource::Ig1 | EventSource::Ig2 => Ok(interrupt_generator(source, status)),
        // Counted in stage 1, never queued
        EventSource::Inactivity | EventSource::Boot => Ok(Outcome::Serviced),
    });

    match outcome {
        Ok(Outcome::Serviced) => counters.record_ok(source),
        Ok(Outcome::Spurious) => {
            #[cfg(feature = "defmt")]
            defmt::debug!("{}: status reports no event", source);

            counters.record_err(source);
        }
        Err(_error) => {
            #[cfg(feature = "defmt")]
            defmt::warn!("{}: decoder failed", source);

            counters.record_err(source);
        }
    }
}

/// Data-ready decoder: fetch the new sample if `STATUS` announces one
pub(crate) fn data_ready<I>(bus: &Bus<I>, status: u8) -> Result<Outcome, Error<I::Error>>
where
    I: RegisterInterface<AddressType = u8>,
{
    if !Status::from_raw(status).data_available() {
        return Ok(Outcome::Spurious);
    }
    bus.read_registers(Register::OutXl, 6)?;
    Ok(Outcome::Serviced)
}

/// FIFO decoder: pop one output block per stored sample until empty
///
/// Returns the number of blocks read. Draining stops after [`FIFO_DEPTH`]
/// blocks even if the device still reports samples, so a stuck status
/// cannot keep the task busy.
///
/// # Errors
///
/// Returns `Error::FifoFraming` if a `FIFO_SRC` byte is inconsistent and
/// `Error::Bus` if a transfer fails. Blocks read before the failure stay
/// mirrored.
pub(crate) fn drain_fifo<I>(bus: &Bus<I>, fifo_src: u8) -> Result<u8, Error<I::Error>>
where
    I: RegisterInterface<AddressType = u8>,
{
    let mut remaining = FifoStatus::from_raw(fifo_src).level().map_err(Error::<()>::lift)?;
    let mut blocks = 0u8;

    while remaining > 0 {
        if blocks >= FIFO_DEPTH {
            #[cfg(feature = "defmt")]
            defmt::warn!("FIFO still reports {} samples after a full drain", remaining);
            break;
        }
        bus.read_registers(Register::OutXl, 6)?;
        blocks += 1;

        let raw = bus.read_register(Register::FifoSrc)?;
        remaining = FifoStatus::from_raw(raw).level().map_err(Error::<()>::lift)?;
    }

    #[cfg(feature = "defmt")]
    defmt::debug!("FIFO drained {} blocks", blocks);

    Ok(blocks)
}

/// IG1/IG2 decoder: reading `IG_SRCx` already cleared the latch
#[cfg_attr(not(feature = "defmt"), allow(unused_variables))]
fn interrupt_generator(source: EventSource, ig_src: u8) -> Outcome {
    let decoded = IgSource::from_raw(ig_src);

    #[cfg(feature = "defmt")]
    defmt::debug!("{}: {}", source, decoded);

    Outcome::Serviced
}
