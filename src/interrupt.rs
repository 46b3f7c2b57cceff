//! Interrupt configuration
//!
//! The LIS2HH12 has two interrupt pins. Each event source can be routed to
//! either line:
//! - INT1 (`CTRL3`): data ready, FIFO threshold, FIFO overrun, IG1, IG2, inactivity
//! - INT2 (`CTRL6`): data ready, FIFO threshold, FIFO overrun, FIFO empty, IG1, IG2, boot
//!
//! Pin polarity and drive live in `CTRL5`; latching of the two interrupt
//! generators lives in `CTRL7`. The cascade decoder reads the routing bits
//! back from the register image, so whatever is routed here is exactly what
//! gets serviced.
//!
//! # Example
//!
//! ```ignore
//! # use lis2hh12::{Lis2hh12, InterruptLine, InterruptPinConfig, InterruptRouting};
//! # let accel: Lis2hh12<_> = todo!();
//! // Active-low, open-drain, generators latched
//! accel.configure_interrupt_pin(&InterruptPinConfig::i2c_default())?;
//!
//! // Data ready on INT1
//! accel.route_interrupts(InterruptLine::Int1, &InterruptRouting::data_ready_only())?;
//! ```

use crate::Error;
use crate::registers::{Field, Register, field_sets};

/// Physical interrupt line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InterruptLine {
    /// INT1, routed through `CTRL3`
    Int1,
    /// INT2, routed through `CTRL6`
    Int2,
}

impl InterruptLine {
    /// Register holding this line's routing bits
    #[must_use]
    pub const fn register(self) -> Register {
        match self {
            Self::Int1 => Register::Ctrl3,
            Self::Int2 => Register::Ctrl6,
        }
    }
}

/// Interrupt pin electrical configuration
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[allow(clippy::struct_excessive_bools)]
pub struct InterruptPinConfig {
    /// Active low (true) or active high (false)
    pub active_low: bool,
    /// Open-drain (true) or push-pull (false)
    pub open_drain: bool,
    /// Latch interrupt generator 1 until `IG_SRC1` is read
    pub latch_ig1: bool,
    /// Latch interrupt generator 2 until `IG_SRC2` is read
    pub latch_ig2: bool,
}

impl InterruptPinConfig {
    /// Active-low, open-drain, both generators latched (shared I2C line)
    #[must_use]
    pub const fn i2c_default() -> Self {
        Self {
            active_low: true,
            open_drain: true,
            latch_ig1: true,
            latch_ig2: true,
        }
    }

    /// Store polarity and drive into `CTRL5`, leaving the other bits alone
    pub fn encode_ctrl5(&self, ctrl5: &mut field_sets::Ctrl5) {
        ctrl5.set_h_lactive(self.active_low);
        ctrl5.set_pp_od(self.open_drain);
    }

    /// Store the latch bits into `CTRL7`, leaving the other bits alone
    pub fn encode_ctrl7(&self, ctrl7: &mut field_sets::Ctrl7) {
        ctrl7.set_lir_1(self.latch_ig1);
        ctrl7.set_lir_2(self.latch_ig2);
    }

    /// Decode from cached `CTRL5` and `CTRL7`
    #[must_use]
    pub fn from_registers(ctrl5: u8, ctrl7: u8) -> Self {
        let ctrl5 = field_sets::Ctrl5::from([ctrl5]);
        let ctrl7 = field_sets::Ctrl7::from([ctrl7]);
        Self {
            active_low: ctrl5.h_lactive(),
            open_drain: ctrl5.pp_od(),
            latch_ig1: ctrl7.lir_1(),
            latch_ig2: ctrl7.lir_2(),
        }
    }

    /// Trigger the interrupt-line collaborator should be armed with
    ///
    /// Latched sources hold the line until serviced, so a level trigger
    /// cannot miss them; unlatched sources pulse and need an edge.
    #[must_use]
    pub const fn trigger(&self) -> Trigger {
        match (self.latch_ig1 || self.latch_ig2, self.active_low) {
            (true, true) => Trigger::LowLevel,
            (true, false) => Trigger::HighLevel,
            (false, true) => Trigger::FallingEdge,
            (false, false) => Trigger::RisingEdge,
        }
    }
}

/// Input trigger for the host interrupt pin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Trigger {
    /// Rising edge (active-high, pulsed)
    RisingEdge,
    /// Falling edge (active-low, pulsed)
    FallingEdge,
    /// High level (active-high, latched)
    HighLevel,
    /// Low level (active-low, latched)
    LowLevel,
}

/// Event sources routed to one interrupt line
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[allow(clippy::struct_excessive_bools)]
pub struct InterruptRouting {
    /// New sample available
    pub data_ready: bool,
    /// FIFO level reached threshold
    pub fifo_threshold: bool,
    /// FIFO overrun
    pub fifo_overrun: bool,
    /// FIFO empty (INT2 only)
    pub fifo_empty: bool,
    /// Interrupt generator 1
    pub ig1: bool,
    /// Interrupt generator 2
    pub ig2: bool,
    /// Inactivity (INT1 only)
    pub inactivity: bool,
    /// Boot complete (INT2 only)
    pub boot: bool,
}

impl InterruptRouting {
    /// Nothing routed
    #[must_use]
    pub const fn none() -> Self {
        Self {
            data_ready: false,
            fifo_threshold: false,
            fifo_overrun: false,
            fifo_empty: false,
            ig1: false,
            ig2: false,
            inactivity: false,
            boot: false,
        }
    }

    /// Data ready only
    #[must_use]
    pub const fn data_ready_only() -> Self {
        Self {
            data_ready: true,
            ..Self::none()
        }
    }

    /// FIFO threshold and overrun, for batch reading
    #[must_use]
    pub const fn fifo_batch() -> Self {
        Self {
            fifo_threshold: true,
            fifo_overrun: true,
            ..Self::none()
        }
    }

    /// Both interrupt generators
    #[must_use]
    pub const fn motion() -> Self {
        Self {
            ig1: true,
            ig2: true,
            ..Self::none()
        }
    }

    /// Check that every requested source can use `line`
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidConfig` if a source is requested on a line
    /// that cannot carry it.
    pub const fn validate(&self, line: InterruptLine) -> Result<(), Error<()>> {
        let unsupported = match line {
            InterruptLine::Int1 => self.fifo_empty || self.boot,
            InterruptLine::Int2 => self.inactivity,
        };
        if unsupported {
            Err(Error::InvalidConfig)
        } else {
            Ok(())
        }
    }

    /// Store the INT1 routing bits into `CTRL3`, leaving `FIFO_EN` and
    /// `STOP_FTH` alone
    pub fn encode_int1(&self, ctrl3: &mut field_sets::Ctrl3) {
        ctrl3.set_int_1_drdy(self.data_ready);
        ctrl3.set_int_1_fth(self.fifo_threshold);
        ctrl3.set_int_1_ovr(self.fifo_overrun);
        ctrl3.set_int_1_ig_1(self.ig1);
        ctrl3.set_int_1_ig_2(self.ig2);
        ctrl3.set_int_1_inact(self.inactivity);
    }

    /// Store the INT2 routing bits into `CTRL6`, leaving `BOOT` alone
    pub fn encode_int2(&self, ctrl6: &mut field_sets::Ctrl6) {
        ctrl6.set_p_2_drdy(self.data_ready);
        ctrl6.set_p_2_wtm(self.fifo_threshold);
        ctrl6.set_p_2_ovr(self.fifo_overrun);
        ctrl6.set_p_2_empty(self.fifo_empty);
        ctrl6.set_p_2_ig_1(self.ig1);
        ctrl6.set_p_2_ig_2(self.ig2);
        ctrl6.set_boot_i_2(self.boot);
    }

    /// Decode the routing of `line` from its register
    #[must_use]
    pub fn from_bits(line: InterruptLine, raw: u8) -> Self {
        match line {
            InterruptLine::Int1 => {
                let ctrl3 = field_sets::Ctrl3::from([raw]);
                Self {
                    data_ready: ctrl3.int_1_drdy(),
                    fifo_threshold: ctrl3.int_1_fth(),
                    fifo_overrun: ctrl3.int_1_ovr(),
                    ig1: ctrl3.int_1_ig_1(),
                    ig2: ctrl3.int_1_ig_2(),
                    inactivity: ctrl3.int_1_inact(),
                    ..Self::none()
                }
            }
            InterruptLine::Int2 => {
                let ctrl6 = field_sets::Ctrl6::from([raw]);
                Self {
                    data_ready: ctrl6.p_2_drdy(),
                    fifo_threshold: ctrl6.p_2_wtm(),
                    fifo_overrun: ctrl6.p_2_ovr(),
                    fifo_empty: ctrl6.p_2_empty(),
                    ig1: ctrl6.p_2_ig_1(),
                    ig2: ctrl6.p_2_ig_2(),
                    boot: ctrl6.boot_i_2(),
                    ..Self::none()
                }
            }
        }
    }
}

/// Programmable interrupt generator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InterruptGenerator {
    /// IG1, per-axis thresholds
    Ig1,
    /// IG2, one shared threshold
    Ig2,
}

impl InterruptGenerator {
    /// `IG_SRCx`, read to clear a latched event
    #[must_use]
    pub const fn src_register(self) -> Register {
        match self {
            Self::Ig1 => Register::IgSrc1,
            Self::Ig2 => Register::IgSrc2,
        }
    }
}

/// Per-axis high/low events (`IG_CFGx` enables, `IG_SRCx` flags)
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[allow(clippy::struct_excessive_bools)]
pub struct IgEvents {
    /// X below threshold
    pub x_low: bool,
    /// X above threshold
    pub x_high: bool,
    /// Y below threshold
    pub y_low: bool,
    /// Y above threshold
    pub y_high: bool,
    /// Z below threshold
    pub z_low: bool,
    /// Z above threshold
    pub z_high: bool,
}

impl IgEvents {
    /// All high events (wake-up)
    #[must_use]
    pub const fn all_high() -> Self {
        Self {
            x_low: false,
            x_high: true,
            y_low: false,
            y_high: true,
            z_low: false,
            z_high: true,
        }
    }

    /// All low events (free-fall)
    #[must_use]
    pub const fn all_low() -> Self {
        Self {
            x_low: true,
            x_high: false,
            y_low: true,
            y_high: false,
            z_low: true,
            z_high: false,
        }
    }

    /// Six-bit event mask, bit 0 = X low
    #[must_use]
    pub const fn bits(&self) -> u8 {
        (self.x_low as u8)
            | ((self.x_high as u8) << 1)
            | ((self.y_low as u8) << 2)
            | ((self.y_high as u8) << 3)
            | ((self.z_low as u8) << 4)
            | ((self.z_high as u8) << 5)
    }

    /// Decode a six-bit event mask
    #[must_use]
    pub const fn from_bits(bits: u8) -> Self {
        Self {
            x_low: bits & 0x01 != 0,
            x_high: bits & 0x02 != 0,
            y_low: bits & 0x04 != 0,
            y_high: bits & 0x08 != 0,
            z_low: bits & 0x10 != 0,
            z_high: bits & 0x20 != 0,
        }
    }
}

/// How the enabled events combine (`IG_CFGx.AOI` and `6D`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CombinationMode {
    /// Any enabled event
    #[default]
    Or,
    /// All enabled events
    And,
    /// 6-direction movement recognition
    Movement6D,
    /// 6-direction position recognition
    Position6D,
}

impl CombinationMode {
    /// `(AOI, 6D)` flag pair
    #[must_use]
    pub const fn flags(self) -> (bool, bool) {
        match self {
            Self::Or => (false, false),
            Self::And => (true, false),
            Self::Movement6D => (false, true),
            Self::Position6D => (true, true),
        }
    }
}

/// Generator threshold in `IG_THS` units (full-scale / 256)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Threshold {
    /// One threshold for all axes
    Common(u8),
    /// Separate thresholds (IG1 only)
    PerAxis {
        /// X threshold
        x: u8,
        /// Y threshold
        y: u8,
        /// Z threshold
        z: u8,
    },
}

impl Default for Threshold {
    fn default() -> Self {
        Self::Common(0)
    }
}

/// Interrupt generator configuration
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InterruptGeneratorConfig {
    /// Enabled events
    pub events: IgEvents,
    /// Event combination
    pub mode: CombinationMode,
    /// Threshold
    pub threshold: Threshold,
    /// Minimum event duration in ODR cycles (0..=127)
    pub duration: u8,
    /// Hold the event for `duration` after it ends
    pub wait: bool,
}

impl InterruptGeneratorConfig {
    /// Wake-up: any axis above `threshold` for `duration` samples
    #[must_use]
    pub const fn wake_up(threshold: u8, duration: u8) -> Self {
        Self {
            events: IgEvents::all_high(),
            mode: CombinationMode::Or,
            threshold: Threshold::Common(threshold),
            duration,
            wait: false,
        }
    }

    /// Free-fall: every axis below `threshold` for `duration` samples
    #[must_use]
    pub const fn free_fall(threshold: u8, duration: u8) -> Self {
        Self {
            events: IgEvents::all_low(),
            mode: CombinationMode::And,
            threshold: Threshold::Common(threshold),
            duration,
            wait: false,
        }
    }

    /// Validate ranges for `generator`
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidConfig` if the duration exceeds 127 or a
    /// per-axis threshold is requested for IG2.
    pub fn validate(&self, generator: InterruptGenerator) -> Result<(), Error<()>> {
        if self.duration > Field::IgDur1Dur.max_value() {
            return Err(Error::InvalidConfig);
        }
        if matches!(
            (generator, self.threshold),
            (InterruptGenerator::Ig2, Threshold::PerAxis { .. })
        ) {
            return Err(Error::InvalidConfig);
        }
        Ok(())
    }

    /// `IG_CFGx` contents; `IG_CFG2` shares the `IG_CFG1` layout
    #[must_use]
    pub fn ig_cfg(&self) -> field_sets::IgCfg1 {
        let (aoi, six_d) = self.mode.flags();
        let mut cfg = field_sets::IgCfg1::new_zero();
        cfg.set_aoi(aoi);
        cfg.set_six_d(six_d);
        cfg.set_events(self.events.bits());
        cfg
    }

    /// `IG_DURx` contents; `IG_DUR2` shares the `IG_DUR1` layout
    #[must_use]
    pub fn ig_dur(&self) -> field_sets::IgDur1 {
        let mut dur = field_sets::IgDur1::new_zero();
        dur.set_wait(self.wait);
        dur.set_dur(self.duration);
        dur
    }


    /// `(x, y, z)` threshold bytes
    #[must_use]
    pub const fn thresholds(&self) -> (u8, u8, u8) {
        match self.threshold {
            Threshold::Common(ths) => (ths, ths, ths),
            Threshold::PerAxis { x, y, z } => (x, y, z),
        }
    }
}

/// Decoded `IG_SRCx`
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct IgSource {
    /// One or more events active
    pub active: bool,
    /// Which events fired
    pub events: IgEvents,
}

impl IgSource {
    /// Decode a raw `IG_SRCx` byte
    #[must_use]
    pub fn from_raw(raw: u8) -> Self {
        let src = field_sets::IgSrc1::from([raw]);
        Self {
            active: src.ia(),
            events: IgEvents::from_bits(src.events()),
        }
    }
}
