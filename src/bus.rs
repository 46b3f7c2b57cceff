//! Serialized register access
//!
//! Every transaction the driver issues passes through [`Bus`], which owns the
//! transport and the register image behind a single `spin::Mutex`. The lock
//! is taken per transaction and released before the call returns, on error
//! paths included. Interrupt context never touches this type; it hands
//! [`Transaction`] descriptors to the deferred path instead.
//!
//! Configuration goes through the generated register operations
//! (`.read()`, `.write()`, `.modify()`) via [`Bus::apply`], which mirrors the
//! field set the operation produced. Queued transactions and burst reads
//! address the transport directly.

use crate::registers::{
    IMAGE_SIZE, Lis2hh12Registers as RegisterDevice, Mirrored, Register, RegisterImage, byte,
};
use crate::{Error, WHO_AM_I_VALUE};

use device_driver::RegisterInterface;
use spin::Mutex;

/// Operation kinds handed to the bus collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Opcode {
    /// Register write
    Write,
    /// Address write followed by a burst read
    WriteThenRead,
    /// Burst read whose side effect clears a latched source
    ReadThenClear,
    /// Read, apply AND/OR masks, write back
    ReadModifyWrite,
}

/// Completion tag carried by a deferred transaction
///
/// Each tag names the routine that consumes the transaction result once the
/// deferred task has executed it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Completion {
    /// Gate read finished; plan the per-source reads
    Cascade,
    /// `STATUS` read for the data-ready decoder
    DataReady,
    /// `FIFO_SRC` read for the FIFO decoder
    Fifo,
    /// `IG_SRC1` read for interrupt generator 1
    Ig1,
    /// `IG_SRC2` read for interrupt generator 2
    Ig2,
}

/// A pending bus request
///
/// Transactions are plain values: they can be built in `const` context,
/// validated once and queued from interrupt context without allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Transaction {
    opcode: Opcode,
    register: Register,
    len: u8,
    value: u8,
    and_mask: u8,
    or_mask: u8,
    completion: Option<Completion>,
}

impl Transaction {
    const fn base(opcode: Opcode, register: Register, len: u8) -> Self {
        Self {
            opcode,
            register,
            len,
            value: 0,
            and_mask: 0xFF,
            or_mask: 0,
            completion: None,
        }
    }

    /// Burst read of `len` bytes starting at `register`
    ///
    /// # Panics
    ///
    /// Panics if the burst leaves the register image.
    #[must_use]
    pub const fn read(register: Register, len: u8) -> Self {
        assert!(register.burst_fits(len as usize), "burst outside register image");
        Self::base(Opcode::WriteThenRead, register, len)
    }

    /// Burst read that clears a latched interrupt source
    ///
    /// # Panics
    ///
    /// Panics if the burst leaves the register image.
    #[must_use]
    pub const fn read_then_clear(register: Register, len: u8) -> Self {
        assert!(register.burst_fits(len as usize), "burst outside register image");
        Self::base(Opcode::ReadThenClear, register, len)
    }

    /// Single register write, mirrored on success
    ///
    /// # Panics
    ///
    /// Panics if `register` is not part of the register image.
    #[must_use]
    pub const fn write(register: Register, value: u8) -> Self {
        assert!(register.burst_fits(1), "burst outside register image");
        let mut txn = Self::base(Opcode::Write, register, 1);
        txn.value = value;
        txn
    }

    /// Read-modify-write with `(prior & and_mask) | or_mask`
    ///
    /// # Panics
    ///
    /// Panics if `register` is not part of the register image.
    #[must_use]
    pub const fn update(register: Register, and_mask: u8, or_mask: u8) -> Self {
        assert!(register.burst_fits(1), "burst outside register image");
        let mut txn = Self::base(Opcode::ReadModifyWrite, register, 1);
        txn.and_mask = and_mask;
        txn.or_mask = or_mask;
        txn
    }

    /// Attach a completion tag
    #[must_use]
    pub const fn with_completion(mut self, completion: Completion) -> Self {
        self.completion = Some(completion);
        self
    }

    /// Operation kind
    #[must_use]
    pub const fn opcode(&self) -> Opcode {
        self.opcode
    }

    /// First register touched
    #[must_use]
    pub const fn register(&self) -> Register {
        self.register
    }

    /// Number of bytes transferred
    #[must_use]
    pub const fn count(&self) -> u8 {
        self.len
    }

    /// Completion tag, if any
    #[must_use]
    pub const fn completion(&self) -> Option<Completion> {
        self.completion
    }
}

/// Result byte of a read-modify-write
#[must_use]
pub const fn apply_masks(prior: u8, and_mask: u8, or_mask: u8) -> u8 {
    (prior & and_mask) | or_mask
}

struct Inner<I> {
    device: RegisterDevice<I>,
    image: RegisterImage,
}

impl<I> Inner<I>
where
    I: RegisterInterface<AddressType = u8>,
{
    fn read_into_image(&mut self, base: Register, count: usize) -> Result<u8, Error<I::Error>> {
        assert!(base.burst_fits(count), "burst outside register image");
        let mut buffer = [0u8; IMAGE_SIZE];
        let data = &mut buffer[..count];
        self.device
            .interface
            .read_register(base.addr(), bits(count), data)?;
        // Image is touched only once the transport reported success
        self.image.refresh(base, data);
        Ok(data[0])
    }

    fn write(&mut self, register: Register, value: u8, mirror: bool) -> Result<(), Error<I::Error>> {
        assert!(register.burst_fits(1), "burst outside register image");
        self.device
            .interface
            .write_register(register.addr(), bits(1), &[value])?;
        if mirror {
            self.image.set_raw(register, value);
        }
        Ok(())
    }

    fn update(&mut self, register: Register, and_mask: u8, or_mask: u8) -> Result<u8, Error<I::Error>> {
        assert!(register.burst_fits(1), "burst outside register image");
        let mut prior = [0u8; 1];
        self.device
            .interface
            .read_register(register.addr(), bits(1), &mut prior)?;
        let value = apply_masks(prior[0], and_mask, or_mask);
        self.device
            .interface
            .write_register(register.addr(), bits(1), &[value])?;
        self.image.set_raw(register, value);
        Ok(value)
    }
}

#[allow(clippy::cast_possible_truncation)]
const fn bits(count: usize) -> u32 {
    (count * 8) as u32
}

/// Mutex-guarded transport plus register image
pub struct Bus<I> {
    inner: Mutex<Inner<I>>,
}

impl<I> Bus<I> {
    /// Wrap a transport; the image starts zeroed until the first refresh
    pub const fn new(interface: I) -> Self {
        Self {
            inner: Mutex::new(Inner {
                device: RegisterDevice::new(interface),
                image: RegisterImage::new(),
            }),
        }
    }

    /// Run `f` against the cached image while holding the device mutex
    pub fn with_image<R>(&self, f: impl FnOnce(&RegisterImage) -> R) -> R {
        let inner = self.inner.lock();
        f(&inner.image)
    }

    /// Run `f` against the cached image mutably while holding the device mutex
    pub(crate) fn with_image_mut<R>(&self, f: impl FnOnce(&mut RegisterImage) -> R) -> R {
        let mut inner = self.inner.lock();
        f(&mut inner.image)
    }

    /// Copy of the cached image
    pub fn snapshot(&self) -> RegisterImage {
        self.with_image(|image| *image)
    }

    /// Consume the bus and return the transport
    pub fn release(self) -> I {
        self.inner.into_inner().device.interface
    }
}

impl<I> Bus<I>
where
    I: RegisterInterface<AddressType = u8>,
{
    /// Burst read `count` bytes starting at `base` into the image
    ///
    /// # Errors
    ///
    /// Returns `Error::Bus` if the transport fails; the image is unchanged.
    ///
    /// # Panics
    ///
    /// Panics if the burst leaves its mirrored segment.
    pub fn read_registers(&self, base: Register, count: usize) -> Result<(), Error<I::Error>> {
        #[cfg(feature = "defmt")]
        defmt::trace!("read {} x{}", base.name(), count);

        self.inner.lock().read_into_image(base, count).map(|_| ())
    }

    /// Read a single mirrored register and return its value
    ///
    /// # Errors
    ///
    /// Returns `Error::Bus` if the transport fails.
    pub fn read_register(&self, register: Register) -> Result<u8, Error<I::Error>> {
        #[cfg(feature = "defmt")]
        defmt::trace!("read {}", register.name());

        self.inner.lock().read_into_image(register, 1)
    }

    /// Write one register, mirroring `value` locally when `mirror` is set
    ///
    /// # Errors
    ///
    /// Returns `Error::Bus` if the transport fails; the image is unchanged.
    pub fn write_register(&self, register: Register, value: u8, mirror: bool) -> Result<(), Error<I::Error>> {
        #[cfg(feature = "defmt")]
        defmt::trace!("write {} = {=u8:#x}", register.name(), value);

        self.inner.lock().write(register, value, mirror)
    }

    /// Read-modify-write one register and mirror the resulting byte
    ///
    /// The read, the write and the mirror update happen under one lock
    /// acquisition, so no other transaction can interleave.
    ///
    /// # Errors
    ///
    /// Returns `Error::Bus` if either transfer fails; the image is unchanged.
    pub fn update_register(&self, register: Register, and_mask: u8, or_mask: u8) -> Result<u8, Error<I::Error>> {
        #[cfg(feature = "defmt")]
        defmt::trace!(
            "update {} & {=u8:#x} | {=u8:#x}",
            register.name(),
            and_mask,
            or_mask
        );

        self.inner.lock().update(register, and_mask, or_mask)
    }

    /// Run generated register operations under the device mutex
    ///
    /// Nothing is mirrored; use [`apply`](Self::apply) for registers held in
    /// the image.
    ///
    /// # Errors
    ///
    /// Returns `Error::Bus` if the transport fails.
    pub fn transact<R>(
        &self,
        op: impl FnOnce(&mut RegisterDevice<I>) -> Result<R, I::Error>,
    ) -> Result<R, Error<I::Error>> {
        op(&mut self.inner.lock().device).map_err(Error::Bus)
    }

    /// Run a generated register operation and mirror the field set it returns
    ///
    /// The operation, the transfer and the mirror update happen under one
    /// lock acquisition. The closure returns the value it wrote, for example
    /// `|regs| regs.ctrl_1().modify(|w| { w.set_odr(3); *w })`.
    ///
    /// # Errors
    ///
    /// Returns `Error::Bus` if the transport fails; the image is unchanged.
    pub fn apply<F: Mirrored>(
        &self,
        op: impl FnOnce(&mut RegisterDevice<I>) -> Result<F, I::Error>,
    ) -> Result<F, Error<I::Error>> {
        let mut inner = self.inner.lock();
        let value = op(&mut inner.device)?;

        #[cfg(feature = "defmt")]
        defmt::trace!("{} <- {=u8:#x}", F::REGISTER.name(), byte(value));

        inner.image.set_raw(F::REGISTER, byte(value));
        Ok(value)
    }

    /// Read the identity register, which is not part of the image
    ///
    /// # Errors
    ///
    /// Returns `Error::Bus` if the transport fails.
    pub fn read_identity(&self) -> Result<u8, Error<I::Error>> {
        let id = self.transact(|regs| regs.who_am_i().read())?.who_am_i();

        #[cfg(feature = "defmt")]
        defmt::trace!("WHO_AM_I = {=u8:#x} (expected {=u8:#x})", id, WHO_AM_I_VALUE);

        Ok(id)
    }

    /// Check whether the identity register matches [`WHO_AM_I_VALUE`]
    ///
    /// # Errors
    ///
    /// Returns `Error::Bus` on transport failure or `Error::InvalidDevice`
    /// carrying the byte read on mismatch.
    pub fn verify_identity(&self) -> Result<u8, Error<I::Error>> {
        let id = self.read_identity()?;
        if id == WHO_AM_I_VALUE {
            Ok(id)
        } else {
            Err(Error::InvalidDevice(id))
        }
    }

    /// Execute a queued transaction
    ///
    /// Returns the first byte the transaction produced: the first byte read
    /// for reads, the byte written for writes and updates.
    ///
    /// # Errors
    ///
    /// Returns `Error::Bus` if the transport fails.
    pub fn execute(&self, txn: &Transaction) -> Result<u8, Error<I::Error>> {
        match txn.opcode {
            Opcode::WriteThenRead | Opcode::ReadThenClear => {
                #[cfg(feature = "defmt")]
                defmt::trace!("{} {} x{}", txn.opcode, txn.register.name(), txn.len);

                self.inner
                    .lock()
                    .read_into_image(txn.register, usize::from(txn.len))
            }
            Opcode::Write => self
                .write_register(txn.register, txn.value, true)
                .map(|()| txn.value),
            Opcode::ReadModifyWrite => {
                self.update_register(txn.register, txn.and_mask, txn.or_mask)
            }
        }
    }
}
