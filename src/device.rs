//! High-level driver API for the LIS2HH12
//!
//! [`Lis2hh12`] is the device handle. It owns the bus (transport, device
//! mutex and register image), the interrupt-to-task queue and the diagnostic
//! counters. All methods take `&self`, so one handle can be shared between
//! the interrupt handler, the deferred task and application code, for
//! example through a `static`.
//!
//! # Example
//!
//! ```ignore
//! use lis2hh12::{I2cInterface, InterruptLine, InterruptRouting, Lis2hh12};
//!
//! static ACCEL: Lis2hh12<I2cInterface<Bus>> = Lis2hh12::new(I2cInterface::default(bus));
//!
//! ACCEL.identify(&mut delay)?;
//! ACCEL.set_output_data_rate(3)?; // 100 Hz
//! ACCEL.route_interrupts(InterruptLine::Int1, &InterruptRouting::data_ready_only())?;
//! ACCEL.set_task_ready(true);
//!
//! // In the interrupt handler
//! ACCEL.on_interrupt();
//!
//! // In the deferred task
//! ACCEL.service();
//! ```

use core::sync::atomic::{AtomicBool, Ordering};

use crate::Error;
use crate::bus::{Bus, Completion};
use crate::cascade::Cascade;
use crate::counters::{CounterSnapshot, Counters};
use crate::decoder;
use crate::fifo::{FifoConfig, FifoMode};
use crate::interrupt::{
    InterruptGenerator, InterruptGeneratorConfig, InterruptLine, InterruptPinConfig,
    InterruptRouting, Trigger,
};
use crate::registers::{Field, Register, RegisterImage, field_sets};
use crate::sensors::{AccelConfig, AccelData, AccelDataMg, Axes, FullScale, OutputDataRate};

use device_driver::RegisterInterface;

/// Settle time after a soft reset
const RESET_SETTLE_MS: u32 = 5;

/// Bus clock announced to the transport
const BUS_SPEED_KHZ: u16 = 400;

/// Per-transaction timeout announced to the transport
const TRANSACTION_TIMEOUT_MS: u16 = 50;

/// Identification result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeviceDescriptor {
    /// Identity byte read from `WHO_AM_I`
    pub who_am_i: u8,
    /// Bus clock the device supports
    pub bus_speed_khz: u16,
    /// Transaction timeout the transport should apply
    pub transaction_timeout_ms: u16,
}

/// Main driver for the LIS2HH12
pub struct Lis2hh12<I> {
    bus: Bus<I>,
    cascade: Cascade,
    counters: Counters,
    identified: AtomicBool,
}

impl<I> Lis2hh12<I> {
    /// Create a driver around a transport
    ///
    /// No bus traffic happens here. Call [`identify`](Self::identify) before
    /// any configuration.
    pub const fn new(interface: I) -> Self {
        Self {
            bus: Bus::new(interface),
            cascade: Cascade::new(),
            counters: Counters::new(),
            identified: AtomicBool::new(false),
        }
    }

    /// Whether the last identification succeeded
    pub fn is_identified(&self) -> bool {
        self.identified.load(Ordering::Acquire)
    }

    /// Interrupt entry point (stage 0)
    ///
    /// Safe to call from interrupt context: it never blocks and never takes
    /// the device mutex. Returns `true` if work was queued for
    /// [`service`](Self::service); otherwise a lost event was counted.
    pub fn on_interrupt(&self) -> bool {
        self.cascade.stage0(&self.counters)
    }

    /// Mark the deferred task runnable
    ///
    /// While not runnable, every interrupt is counted as lost.
    pub fn set_task_ready(&self, ready: bool) {
        self.cascade.set_task_ready(ready);
    }

    /// Snapshot of the diagnostic counters
    pub fn counters(&self) -> CounterSnapshot {
        self.counters.snapshot()
    }

    /// Snapshot of the register image for reporting
    pub fn registers(&self) -> RegisterImage {
        self.bus.snapshot()
    }

    /// Read a field from the register image, without bus traffic
    pub fn read_field(&self, field: Field) -> u8 {
        self.bus.with_image(|image| image.field(field))
    }

    /// Most recent sample mirrored by a decoder or an application read
    pub fn last_sample(&self) -> AccelData {
        self.bus.with_image(RegisterImage::acceleration)
    }

    /// Trigger the interrupt pin should be armed with, from cached `CTRL5`/`CTRL7`
    pub fn interrupt_trigger(&self) -> Trigger {
        self.bus
            .with_image(|image| {
                InterruptPinConfig::from_registers(image.raw(Register::Ctrl5), image.raw(Register::Ctrl7))
            })
            .trigger()
    }

    /// Sources currently routed to `line`, from the cached routing register
    pub fn interrupt_routing(&self, line: InterruptLine) -> InterruptRouting {
        let raw = self.bus.with_image(|image| image.raw(line.register()));
        InterruptRouting::from_bits(line, raw)
    }

    /// Release the transport
    pub fn release(self) -> I {
        self.bus.release()
    }
}

impl<I> Lis2hh12<I>
where
    I: RegisterInterface<AddressType = u8>,
{
    fn ensure_identified(&self) -> Result<(), Error<I::Error>> {
        if self.is_identified() {
            Ok(())
        } else {
            Err(Error::InvalidState)
        }
    }

    /// Write a field in the register image only, without bus traffic
    ///
    /// Use [`flush_register`](Self::flush_register) to push the result to the
    /// device.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidConfig` if `value` does not fit the field.
    pub fn write_field(&self, field: Field, value: u8) -> Result<(), Error<I::Error>> {
        self.bus
            .with_image_mut(|image| image.set_field(field, value))
            .map_err(Error::<()>::lift)
    }

    /// Reset and identify the device
    ///
    /// Issues a soft reset, waits for the device to settle, checks
    /// `WHO_AM_I` and refreshes the whole register image. Configuration
    /// calls fail with `Error::InvalidState` until this succeeds.
    ///
    /// # Errors
    ///
    /// Returns `Error::Bus` if communication fails or
    /// `Error::InvalidDevice` carrying the identity byte on mismatch.
    pub fn identify<D>(&self, delay: &mut D) -> Result<DeviceDescriptor, Error<I::Error>>
    where
        D: embedded_hal::delay::DelayNs,
    {
        self.identified.store(false, Ordering::Release);

        // Self-clearing, so the image keeps the pre-reset byte until the refresh
        self.bus
            .transact(|regs| regs.ctrl_5().write(|w| w.set_soft_reset(true)))?;
        delay.delay_ms(RESET_SETTLE_MS);

        let who_am_i = self.bus.verify_identity()?;
        self.refresh_registers()?;
        self.identified.store(true, Ordering::Release);

        #[cfg(feature = "defmt")]
        defmt::debug!("LIS2HH12 identified ({=u8:#x})", who_am_i);

        Ok(DeviceDescriptor {
            who_am_i,
            bus_speed_khz: BUS_SPEED_KHZ,
            transaction_timeout_ms: TRANSACTION_TIMEOUT_MS,
        })
    }

    /// Re-read every mirrored register
    ///
    /// Reading the block pops one FIFO sample and clears latched generator
    /// sources, like any read of those registers.
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub fn refresh_registers(&self) -> Result<(), Error<I::Error>> {
        self.bus.read_registers(Register::TempL, 2)?;
        self.bus.read_registers(Register::ActThs, 34)
    }

    /// Burst read `count` registers into the image
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    ///
    /// # Panics
    ///
    /// Panics if the burst leaves its mirrored segment.
    pub fn read_registers(&self, base: Register, count: usize) -> Result<(), Error<I::Error>> {
        self.bus.read_registers(base, count)
    }

    /// Write one register and mirror it
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub fn write_register(&self, register: Register, value: u8) -> Result<(), Error<I::Error>> {
        self.bus.write_register(register, value, true)
    }

    /// Read-modify-write one register, returning the byte written
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub fn update_register(&self, register: Register, and_mask: u8, or_mask: u8) -> Result<u8, Error<I::Error>> {
        self.bus.update_register(register, and_mask, or_mask)
    }

    /// Write the cached byte of `register` to the device
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub fn flush_register(&self, register: Register) -> Result<(), Error<I::Error>> {
        let value = self.bus.with_image(|image| image.raw(register));
        self.bus.write_register(register, value, false)
    }

    /// Set the output data rate (`CTRL1.ODR`, 0..=6)
    ///
    /// The field is three bits wide but 0b111 (rate 7) selects no rate on
    /// this device and is rejected like any other out-of-range value.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidState` before identification,
    /// `Error::InvalidConfig` for an unsupported rate (no bus traffic), or a
    /// bus error.
    pub fn set_output_data_rate(&self, rate: u8) -> Result<(), Error<I::Error>> {
        self.ensure_identified()?;
        let rate = OutputDataRate::try_from(rate).map_err(Error::<()>::lift)?;

        #[cfg(feature = "defmt")]
        defmt::debug!("ODR -> {} Hz", rate.hz());

        self.bus
            .apply(|regs| regs.ctrl_1().modify(|w| {
                w.set_odr(rate as u8);
                *w
            }))?;
        Ok(())
    }

    /// Enable or disable individual axes (`CTRL1.XEN/YEN/ZEN`)
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidState` before identification or a bus error.
    pub fn enable_axes(&self, axes: Axes) -> Result<(), Error<I::Error>> {
        self.ensure_identified()?;
        self.bus
            .apply(|regs| regs.ctrl_1().modify(|w| {
                axes.encode(w);
                *w
            }))?;
        Ok(())
    }

    /// Set the full-scale range (`CTRL4.FS`: 0 = ±2g, 2 = ±4g, 3 = ±8g)
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidState` before identification,
    /// `Error::InvalidConfig` for a reserved encoding (no bus traffic), or a
    /// bus error.
    pub fn set_full_scale(&self, scale: u8) -> Result<(), Error<I::Error>> {
        self.ensure_identified()?;
        let scale = FullScale::try_from(scale).map_err(Error::<()>::lift)?;

        #[cfg(feature = "defmt")]
        defmt::debug!("full scale -> ±{}g", scale.max_value());

        self.bus
            .apply(|regs| regs.ctrl_4().modify(|w| {
                w.set_fs(scale as u8);
                *w
            }))?;
        Ok(())
    }

    /// Program inactivity detection and route it to INT1
    ///
    /// * `threshold` - `ACT_THS`, 0..=127
    /// * `duration` - `ACT_DUR`, 0..=255
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidState` before identification,
    /// `Error::InvalidConfig` if `threshold` exceeds 127 (no bus traffic), or
    /// a bus error. A bus error stops at the failing step.
    pub fn set_inactivity_threshold(&self, threshold: u8, duration: u8) -> Result<(), Error<I::Error>> {
        self.ensure_identified()?;
        if threshold > Field::ActThsThs.max_value() {
            return Err(Error::InvalidConfig);
        }

        #[cfg(feature = "defmt")]
        defmt::debug!("inactivity threshold {} duration {}", threshold, duration);

        self.bus
            .apply(|regs| regs.act_ths().write(|w| {
                w.set_ths(threshold);
                *w
            }))?;
        self.bus
            .apply(|regs| regs.act_dur().write(|w| {
                w.set_dur(duration);
                *w
            }))?;
        self.bus
            .apply(|regs| regs.ctrl_3().modify(|w| {
                w.set_int_1_inact(true);
                *w
            }))?;
        Ok(())
    }

    /// Configure the FIFO from raw numbers
    ///
    /// * `mode` - `FIFO_CTRL.FMODE` (0..=4 or 7)
    /// * `threshold` - `FIFO_CTRL.FTH` (0..=31)
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidState` before identification,
    /// `Error::InvalidConfig` for an out-of-range value (no bus traffic), or
    /// a bus error.
    pub fn configure_fifo(&self, mode: u8, threshold: u8) -> Result<(), Error<I::Error>> {
        self.ensure_identified()?;
        let mode = FifoMode::try_from(mode).map_err(Error::<()>::lift)?;
        self.set_fifo(&FifoConfig {
            mode,
            threshold,
            stop_on_threshold: false,
        })
    }

    /// Configure the FIFO
    ///
    /// Writes `FIFO_CTRL`, then sets `CTRL3.FIFO_EN` for any buffering mode.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidState` before identification,
    /// `Error::InvalidConfig` for an out-of-range threshold (no bus traffic),
    /// or a bus error.
    pub fn set_fifo(&self, config: &FifoConfig) -> Result<(), Error<I::Error>> {
        self.ensure_identified()?;
        config.validate().map_err(Error::<()>::lift)?;

        #[cfg(feature = "defmt")]
        defmt::debug!("FIFO {} threshold {}", config.mode, config.threshold);

        self.bus
            .apply(|regs| regs.fifo_ctrl().write(|w| {
                config.encode(w);
                *w
            }))?;
        self.bus
            .apply(|regs| regs.ctrl_3().modify(|w| {
                w.set_fifo_en(config.enabled());
                w.set_stop_fth(config.stop_on_threshold);
                *w
            }))?;
        Ok(())
    }

    /// Apply a complete accelerometer configuration (`CTRL1`, `CTRL4.FS`)
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidState` before identification or a bus error.
    pub fn configure(&self, config: &AccelConfig) -> Result<(), Error<I::Error>> {
        self.ensure_identified()?;

        #[cfg(feature = "defmt")]
        defmt::debug!("configure {}", config);

        self.bus
            .apply(|regs| regs.ctrl_1().write(|w| {
                config.encode_ctrl1(w);
                *w
            }))?;
        self.bus
            .apply(|regs| regs.ctrl_4().modify(|w| {
                w.set_fs(config.full_scale as u8);
                *w
            }))?;
        Ok(())
    }

    /// Configure interrupt pin polarity, drive and generator latching
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidState` before identification or a bus error.
    pub fn configure_interrupt_pin(&self, config: &InterruptPinConfig) -> Result<(), Error<I::Error>> {
        self.ensure_identified()?;
        self.bus
            .apply(|regs| regs.ctrl_5().modify(|w| {
                config.encode_ctrl5(w);
                *w
            }))?;
        self.bus
            .apply(|regs| regs.ctrl_7().modify(|w| {
                config.encode_ctrl7(w);
                *w
            }))?;
        Ok(())
    }

    /// Route event sources to an interrupt line
    ///
    /// Replaces every routing bit of `line`; other bits of the routing
    /// register are preserved.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidState` before identification,
    /// `Error::InvalidConfig` if a source cannot use `line` (no bus traffic),
    /// or a bus error.
    pub fn route_interrupts(&self, line: InterruptLine, routing: &InterruptRouting) -> Result<(), Error<I::Error>> {
        self.ensure_identified()?;
        routing.validate(line).map_err(Error::<()>::lift)?;

        #[cfg(feature = "defmt")]
        defmt::debug!("{} routing -> {}", line, routing);

        match line {
            InterruptLine::Int1 => {
                self.bus
                    .apply(|regs| regs.ctrl_3().modify(|w| {
                        routing.encode_int1(w);
                        *w
                    }))?;
            }
            InterruptLine::Int2 => {
                self.bus
                    .apply(|regs| regs.ctrl_6().modify(|w| {
                        routing.encode_int2(w);
                        *w
                    }))?;
            }
        }
        Ok(())
    }

    /// Program an interrupt generator
    ///
    /// Thresholds and duration are written before `IG_CFGx`, so the events
    /// are enabled only once their limits are in place.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidState` before identification,
    /// `Error::InvalidConfig` for an invalid configuration (no bus traffic),
    /// or a bus error.
    pub fn configure_interrupt_generator(
        &self,
        generator: InterruptGenerator,
        config: &InterruptGeneratorConfig,
    ) -> Result<(), Error<I::Error>> {
        self.ensure_identified()?;
        config.validate(generator).map_err(Error::<()>::lift)?;

        #[cfg(feature = "defmt")]
        defmt::debug!("{} -> {}", generator, config);

        let (x, y, z) = config.thresholds();
        let (dur, cfg) = (config.ig_dur(), config.ig_cfg());
        match generator {
            InterruptGenerator::Ig1 => {
                self.bus.apply(|regs| regs.ig_ths_x_1().write(|w| {
                    w.set_ths(x);
                    *w
                }))?;
                self.bus.apply(|regs| regs.ig_ths_y_1().write(|w| {
                    w.set_ths(y);
                    *w
                }))?;
                self.bus.apply(|regs| regs.ig_ths_z_1().write(|w| {
                    w.set_ths(z);
                    *w
                }))?;
                self.bus.apply(|regs| regs.ig_dur_1().write(|w| {
                    *w = dur;
                    dur
                }))?;
                self.bus.apply(|regs| regs.ig_cfg_1().write(|w| {
                    *w = cfg;
                    cfg
                }))?;
            }
            InterruptGenerator::Ig2 => {
                // Same layout as the IG1 registers
                let dur = field_sets::IgDur2::from(<[u8; 1]>::from(dur));
                let cfg = field_sets::IgCfg2::from(<[u8; 1]>::from(cfg));
                self.bus.apply(|regs| regs.ig_ths_2().write(|w| {
                    w.set_ths(x);
                    *w
                }))?;
                self.bus.apply(|regs| regs.ig_dur_2().write(|w| {
                    *w = dur;
                    dur
                }))?;
                self.bus.apply(|regs| regs.ig_cfg_2().write(|w| {
                    *w = cfg;
                    cfg
                }))?;
            }
        }
        Ok(())
    }

    /// Deferred task entry point
    ///
    /// Executes every queued transaction in order, each under its own
    /// device-mutex acquisition, and hands results to the cascade or the
    /// matching decoder. Returns the number of transactions executed.
    pub fn service(&self) -> usize {
        let mut executed = 0;
        while let Some(txn) = self.cascade.pop() {
            executed += 1;
            let result = self.bus.execute(&txn);

            match txn.completion() {
                Some(Completion::Cascade) => self.dispatch(result),
                Some(completion) => {
                    if let Some(source) = decoder::completion_source(completion) {
                        decoder::complete(&self.bus, &self.counters, source, result);
                    }
                }
                None => {}
            }
        }
        executed
    }

    /// Stage 1 once the gate read completed
    fn dispatch(&self, gate: Result<u8, Error<I::Error>>) {
        if gate.is_err() {
            #[cfg(feature = "defmt")]
            defmt::warn!("gate read failed, interrupt lost");

            self.counters.record_lost();
            return;
        }
        let (ctrl3, ctrl6) = self.bus.with_image(|image| {
            (
                image.raw(InterruptLine::Int1.register()),
                image.raw(InterruptLine::Int2.register()),
            )
        });
        self.cascade.stage1(ctrl3, ctrl6, &self.counters);
    }

    /// Read the current acceleration sample
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidState` before identification or a bus error.
    pub fn read_acceleration(&self) -> Result<AccelData, Error<I::Error>> {
        self.ensure_identified()?;
        self.bus.read_registers(Register::OutXl, 6)?;
        Ok(self.last_sample())
    }

    /// Read the current acceleration sample in milli-g
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidState` before identification or when the
    /// cached range is the reserved encoding, or a bus error.
    pub fn read_acceleration_mg(&self) -> Result<AccelDataMg, Error<I::Error>> {
        let data = self.read_acceleration()?;
        let scale = self
            .bus
            .with_image(RegisterImage::full_scale)
            .ok_or(Error::InvalidState)?;
        Ok(data.to_mg(scale))
    }

    /// Read the raw temperature output
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidState` before identification or a bus error.
    pub fn read_temperature(&self) -> Result<i16, Error<I::Error>> {
        self.ensure_identified()?;
        self.bus.read_registers(Register::TempL, 2)?;
        Ok(self.bus.with_image(RegisterImage::temperature_raw))
    }

    /// Drain the FIFO from task context, outside the interrupt cascade
    ///
    /// Returns the number of 6-byte blocks read.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidState` before identification,
    /// `Error::FifoFraming` for an inconsistent `FIFO_SRC`, or a bus error.
    pub fn drain_fifo(&self) -> Result<u8, Error<I::Error>> {
        self.ensure_identified()?;
        let fifo_src = self.bus.read_register(Register::FifoSrc)?;
        decoder::drain_fifo(&self.bus, fifo_src)
    }
}
