//! Mock interface implementation for testing the LIS2HH12 driver
//!
//! Simulates the register file of the device, including the side effects
//! the driver depends on: soft reset, FIFO pops on output reads, `FIFO_SRC`
//! computed from the simulated FIFO, and read-to-clear `IG_SRCx`.

use device_driver::RegisterInterface;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

const WHO_AM_I: u8 = 0x0F;
const CTRL1: u8 = 0x20;
const CTRL4: u8 = 0x23;
const CTRL5: u8 = 0x24;
const OUT_X_L: u8 = 0x28;
const FIFO_CTRL: u8 = 0x2E;
const FIFO_SRC: u8 = 0x2F;
const IG_SRC1: u8 = 0x31;
const IG_SRC2: u8 = 0x37;

const SOFT_RESET: u8 = 0x40;
const FIFO_DEPTH: usize = 32;

/// Records operations performed on the mock interface
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// Burst read transaction
    Read {
        /// First register address
        address: u8,
        /// Number of bytes
        len: usize,
    },
    /// Write transaction
    Write {
        /// Register address
        address: u8,
        /// Value written
        value: u8,
    },
}

/// Shared state for mock interface
#[derive(Debug)]
struct MockState {
    /// Simulated register file, indexed by address
    registers: [u8; 0x40],

    /// Operations log for verification, failed attempts included
    operations: Vec<Operation>,

    /// Failure injection flags
    fail_next_read: bool,
    fail_next_write: bool,
    /// Every read starting at this address fails
    fail_reads_at: Option<u8>,

    /// Samples waiting in the simulated FIFO, oldest first
    fifo: VecDeque<[i16; 3]>,
    /// Forced `FIFO_SRC` value, bypassing the simulation
    fifo_src_override: Option<u8>,
}

impl MockState {
    fn new() -> Self {
        let mut state = Self {
            registers: [0; 0x40],
            operations: Vec::new(),
            fail_next_read: false,
            fail_next_write: false,
            fail_reads_at: None,
            fifo: VecDeque::new(),
            fifo_src_override: None,
        };
        state.registers[usize::from(WHO_AM_I)] = 0x41;
        state.reset();
        state
    }

    /// Power-on defaults of the control block
    fn reset(&mut self) {
        for address in 0x1E..0x40 {
            self.registers[address] = 0;
        }
        // Axes enabled, address auto-increment on
        self.registers[usize::from(CTRL1)] = 0x07;
        self.registers[usize::from(CTRL4)] = 0x04;
        self.fifo.clear();
    }

    fn set_output(&mut self, sample: [i16; 3]) {
        for (axis, value) in sample.iter().enumerate() {
            let [low, high] = value.to_le_bytes();
            let base = usize::from(OUT_X_L) + axis * 2;
            self.registers[base] = low;
            self.registers[base + 1] = high;
        }
    }

    fn fifo_src(&self) -> u8 {
        if let Some(raw) = self.fifo_src_override {
            return raw;
        }
        let stored = self.fifo.len().min(FIFO_DEPTH);
        let threshold = usize::from(self.registers[usize::from(FIFO_CTRL)] & 0x1F);
        let mut raw = match stored {
            0 => 0x20,
            FIFO_DEPTH => 0x40,
            n => u8::try_from(n).unwrap(),
        };
        if threshold > 0 && stored >= threshold {
            raw |= 0x80;
        }
        raw
    }

    fn covers(address: u8, len: usize, target: u8) -> bool {
        let start = usize::from(address);
        let target = usize::from(target);
        target >= start && target < start + len
    }
}

/// Mock interface for testing
///
/// Clones share state, so a test can keep one handle while the driver owns
/// another. The state is behind `Arc<Mutex<_>>`, so the interface is `Send`
/// and drivers built on it can be shared across threads.
#[derive(Clone)]
pub struct MockInterface {
    state: Arc<Mutex<MockState>>,
}

impl Default for MockInterface {
    fn default() -> Self {
        Self::new()
    }
}

impl MockInterface {
    /// Create a new mock interface with power-on register values
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(MockState::new())),
        }
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap()
    }

    /// Set a register value
    pub fn set_register(&self, address: u8, value: u8) {
        self.state().registers[usize::from(address)] = value;
    }

    /// Get a register value
    pub fn get_register(&self, address: u8) -> u8 {
        self.state().registers[usize::from(address)]
    }

    /// Set `WHO_AM_I` register value
    pub fn set_who_am_i(&self, value: u8) {
        self.set_register(WHO_AM_I, value);
    }

    /// Set accelerometer output registers
    pub fn set_accel_data(&self, x: i16, y: i16, z: i16) {
        self.state().set_output([x, y, z]);
    }

    /// Set temperature output registers
    pub fn set_temperature_data(&self, raw: i16) {
        let [low, high] = raw.to_le_bytes();
        let mut state = self.state();
        state.registers[0x0B] = low;
        state.registers[0x0C] = high;
    }

    /// Queue samples in the simulated FIFO
    pub fn push_fifo_samples(&self, samples: &[[i16; 3]]) {
        self.state().fifo.extend(samples.iter().copied());
    }

    /// Fill the simulated FIFO with `count` distinct samples
    pub fn fill_fifo(&self, count: usize) {
        let samples: Vec<[i16; 3]> = (0..count)
            .map(|i| {
                let i = i16::try_from(i).unwrap();
                [i, -i, 1000 + i]
            })
            .collect();
        self.push_fifo_samples(&samples);
    }

    /// Samples still in the simulated FIFO
    pub fn fifo_len(&self) -> usize {
        self.state().fifo.len()
    }

    /// Force every `FIFO_SRC` read to return `raw`
    pub fn set_fifo_src_override(&self, raw: Option<u8>) {
        self.state().fifo_src_override = raw;
    }

    /// Inject a read failure on the next read operation
    pub fn fail_next_read(&self) {
        self.state().fail_next_read = true;
    }

    /// Inject a write failure on the next write operation
    pub fn fail_next_write(&self) {
        self.state().fail_next_write = true;
    }

    /// Fail every read starting at `address`
    pub fn fail_reads_at(&self, address: Option<u8>) {
        self.state().fail_reads_at = address;
    }

    /// Get the operations log
    pub fn operations(&self) -> Vec<Operation> {
        self.state().operations.clone()
    }

    /// Clear the operations log
    pub fn clear_operations(&self) {
        self.state().operations.clear();
    }

    /// Number of transactions issued since the log was last cleared
    pub fn transaction_count(&self) -> usize {
        self.state().operations.len()
    }

    /// Number of reads starting at `address`
    pub fn reads_at(&self, address: u8) -> usize {
        self.state()
            .operations
            .iter()
            .filter(|op| matches!(op, Operation::Read { address: a, .. } if *a == address))
            .count()
    }

    /// Values written to `address`, in order
    pub fn writes_to(&self, address: u8) -> Vec<u8> {
        self.state()
            .operations
            .iter()
            .filter_map(|op| match op {
                Operation::Write { address: a, value } if *a == address => Some(*value),
                _ => None,
            })
            .collect()
    }
}

/// Mock error type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockError {
    /// Simulated communication error (no acknowledge)
    Communication,
}

impl RegisterInterface for MockInterface {
    type Error = MockError;
    type AddressType = u8;

    fn read_register(
        &mut self,
        address: Self::AddressType,
        _size_bits: u32,
        read_data: &mut [u8],
    ) -> Result<(), Self::Error> {
        let mut state = self.state();
        state.operations.push(Operation::Read {
            address,
            len: read_data.len(),
        });

        // Check for injected failure
        if state.fail_next_read {
            state.fail_next_read = false;
            return Err(MockError::Communication);
        }
        if state.fail_reads_at == Some(address) {
            return Err(MockError::Communication);
        }

        // Reading the output block pops the oldest FIFO sample
        if MockState::covers(address, read_data.len(), OUT_X_L) {
            if let Some(sample) = state.fifo.pop_front() {
                state.set_output(sample);
            }
        }

        for (i, byte) in read_data.iter_mut().enumerate() {
            let reg_addr = address.wrapping_add(u8::try_from(i).unwrap());
            *byte = if reg_addr == FIFO_SRC {
                state.fifo_src()
            } else {
                state.registers[usize::from(reg_addr)]
            };
        }

        // Latched generator sources clear on read
        for src in [IG_SRC1, IG_SRC2] {
            if MockState::covers(address, read_data.len(), src) {
                state.registers[usize::from(src)] = 0;
            }
        }

        Ok(())
    }

    fn write_register(
        &mut self,
        address: Self::AddressType,
        _size_bits: u32,
        write_data: &[u8],
    ) -> Result<(), Self::Error> {
        let mut state = self.state();
        for (i, &value) in write_data.iter().enumerate() {
            state.operations.push(Operation::Write {
                address: address.wrapping_add(u8::try_from(i).unwrap()),
                value,
            });
        }

        // Check for injected failure
        if state.fail_next_write {
            state.fail_next_write = false;
            return Err(MockError::Communication);
        }

        for (i, &value) in write_data.iter().enumerate() {
            let reg_addr = address.wrapping_add(u8::try_from(i).unwrap());
            if reg_addr == CTRL5 && value & SOFT_RESET != 0 {
                // Reset completes immediately and the bit self-clears
                state.reset();
                continue;
            }
            state.registers[usize::from(reg_addr)] = value;
        }

        Ok(())
    }
}
