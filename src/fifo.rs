//! FIFO configuration and status decoding
//!
//! The LIS2HH12 buffers up to 32 acceleration samples. Each FIFO slot is one
//! 6-byte `OUT_X..OUT_Z` block; reading a block pops it. The driver only
//! drains the FIFO by count, it does not interpret the samples beyond
//! mirroring the last one.
//!
//! # Example
//!
//! ```ignore
//! # use lis2hh12::{Lis2hh12, FifoConfig, FifoMode};
//! # let accel: Lis2hh12<_> = todo!();
//! // Stream mode, threshold interrupt at 16 samples
//! accel.configure_fifo(FifoMode::Stream as u8, 16)?;
//! ```

use crate::Error;
use crate::registers::{Field, byte, field_sets};

/// FIFO depth in samples
pub const FIFO_DEPTH: u8 = 32;

/// FIFO operating mode (`FIFO_CTRL.FMODE`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FifoMode {
    /// FIFO disabled, output registers updated directly
    #[default]
    Bypass = 0,
    /// Collect until full, then stop
    Fifo = 1,
    /// Collect continuously, oldest samples overwritten
    Stream = 2,
    /// Stream until a trigger event, then FIFO
    StreamToFifo = 3,
    /// Bypass until a trigger event, then stream
    BypassToStream = 4,
    /// Bypass until a trigger event, then FIFO
    BypassToFifo = 7,
}

impl TryFrom<u8> for FifoMode {
    type Error = Error<()>;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Bypass),
            1 => Ok(Self::Fifo),
            2 => Ok(Self::Stream),
            3 => Ok(Self::StreamToFifo),
            4 => Ok(Self::BypassToStream),
            7 => Ok(Self::BypassToFifo),
            // 5 and 6 are reserved
            _ => Err(Error::InvalidConfig),
        }
    }
}

/// FIFO configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FifoConfig {
    /// Operating mode
    pub mode: FifoMode,
    /// Threshold level in samples (0..=31)
    pub threshold: u8,
    /// Limit FIFO depth to the threshold level
    pub stop_on_threshold: bool,
}

impl FifoConfig {
    /// Stream mode with a threshold
    #[must_use]
    pub const fn stream(threshold: u8) -> Self {
        Self {
            mode: FifoMode::Stream,
            threshold,
            stop_on_threshold: false,
        }
    }

    /// Validate ranges
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidConfig` if the threshold does not fit `FTH`.
    pub fn validate(&self) -> Result<(), Error<()>> {
        if self.threshold > Field::FifoCtrlFth.max_value() {
            return Err(Error::InvalidConfig);
        }
        Ok(())
    }

    /// Fill `FIFO_CTRL` for this configuration
    pub fn encode(&self, fifo_ctrl: &mut field_sets::FifoCtrl) {
        fifo_ctrl.set_fmode(self.mode as u8);
        fifo_ctrl.set_fth(self.threshold);
    }

    /// FIFO is buffering in this mode
    #[must_use]
    pub const fn enabled(&self) -> bool {
        !matches!(self.mode, FifoMode::Bypass)
    }
}

/// Decoded `FIFO_SRC`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FifoStatus {
    /// Level at or above threshold
    pub threshold_reached: bool,
    /// FIFO full, at least one sample overwritten or dropped
    pub overrun: bool,
    /// No samples stored
    pub empty: bool,
    /// Stored sample field (`FSS`)
    pub stored: u8,
}

impl FifoStatus {
    /// Decode a raw `FIFO_SRC` byte
    #[must_use]
    pub fn from_raw(raw: u8) -> Self {
        let fifo_src = field_sets::FifoSrc::from([raw]);
        Self {
            threshold_reached: fifo_src.fth(),
            overrun: fifo_src.ovr(),
            empty: fifo_src.empty(),
            stored: fifo_src.fss(),
        }
    }

    /// Encode back to a raw `FIFO_SRC` byte
    #[must_use]
    pub fn to_raw(&self) -> u8 {
        let mut fifo_src = field_sets::FifoSrc::new_zero();
        fifo_src.set_fth(self.threshold_reached);
        fifo_src.set_ovr(self.overrun);
        fifo_src.set_empty(self.empty);
        fifo_src.set_fss(self.stored);
        byte(fifo_src)
    }

    /// Number of samples waiting, 0..=32
    ///
    /// `FSS` is five bits wide; a full FIFO reports through `OVR`.
    ///
    /// # Errors
    ///
    /// Returns `Error::FifoFraming` carrying the raw byte when the flags
    /// contradict each other: empty with a non-zero level, empty and
    /// overrun at once, or neither empty nor full with a zero level.
    pub fn level(&self) -> Result<u8, Error<()>> {
        if self.empty {
            if self.stored != 0 || self.overrun {
                return Err(Error::FifoFraming(self.to_raw()));
            }
            return Ok(0);
        }
        if self.overrun {
            return Ok(FIFO_DEPTH);
        }
        if self.stored == 0 {
            return Err(Error::FifoFraming(self.to_raw()));
        }
        Ok(self.stored)
    }
}
