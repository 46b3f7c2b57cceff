#![no_std]
#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

pub mod bus;
pub mod cascade;
pub mod counters;
pub mod decoder;
pub mod device;
pub mod fifo;
pub mod interface;
pub mod interrupt;
pub mod registers;
pub mod sensors;

// Re-export main types
pub use bus::{Completion, Opcode, Transaction};
pub use counters::{CounterSnapshot, EventSource, SourceCounts};
pub use device::{DeviceDescriptor, Lis2hh12};
pub use interface::I2cInterface;
pub use registers::{Field, IMAGE_SIZE, Mirrored, Register, RegisterImage};
pub use sensors::{AccelConfig, AccelData, AccelDataMg, Axes, FullScale, OutputDataRate};

pub use cascade::SourceSet;
pub use decoder::Status;
pub use fifo::{FIFO_DEPTH, FifoConfig, FifoMode, FifoStatus};
pub use interrupt::{
    CombinationMode, IgEvents, IgSource, InterruptGenerator, InterruptGeneratorConfig,
    InterruptLine, InterruptPinConfig, InterruptRouting, Threshold, Trigger,
};

/// LIS2HH12 default I2C address (0x1E)
///
/// The SA0 strap selects between this address and
/// [`I2C_ADDRESS_ALTERNATE`]. Use [`I2cInterface::default()`] for this
/// configuration.
pub const I2C_ADDRESS_DEFAULT: u8 = 0x1E;

/// LIS2HH12 alternate I2C address (0x1D)
///
/// Use [`I2cInterface::alternative()`] for this configuration.
pub const I2C_ADDRESS_ALTERNATE: u8 = 0x1D;

/// Expected value of `WHO_AM_I` register
pub const WHO_AM_I_VALUE: u8 = 0x41;

/// Driver errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    /// Communication error with the device (no acknowledge, timeout, arbitration loss)
    Bus(E),
    /// Invalid `WHO_AM_I` register value (contains the actual value read)
    InvalidDevice(u8),
    /// Invalid configuration parameter
    InvalidConfig,
    /// Operation requires a successfully identified device
    InvalidState,
    /// FIFO status inconsistent with the FIFO depth (contains the raw `FIFO_SRC` byte)
    FifoFraming(u8),
}

impl<E> From<E> for Error<E> {
    fn from(error: E) -> Self {
        Self::Bus(error)
    }
}

impl Error<()> {
    /// Carry a bus-independent error into a bus-specific error type
    ///
    /// Validation helpers never touch the bus and report `Error<()>`; this
    /// lifts their result into the caller's error type.
    ///
    /// `Bus(())` holds no transport error that could be carried over. No
    /// validation helper returns it, and it lifts to `InvalidConfig` since
    /// only a rejected parameter can produce an `Error<()>`.
    #[must_use]
    pub const fn lift<E>(self) -> Error<E> {
        match self {
            Self::InvalidConfig => Error::InvalidConfig,
            Self::Bus(()) => Error::InvalidConfig,
            Self::InvalidDevice(id) => Error::InvalidDevice(id),
            Self::InvalidState => Error::InvalidState,
            Self::FifoFraming(raw) => Error::FifoFraming(raw),
        }
    }
}
