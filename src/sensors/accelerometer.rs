//! Accelerometer types and configuration
//!
//! Provides the rate, range and axis selections of the LIS2HH12 together with
//! the sample types the decoders and application reads produce.

use crate::Error;
use crate::registers::field_sets;

/// Output data rate (`CTRL1.ODR`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OutputDataRate {
    /// Power-down mode
    PowerDown = 0,
    /// 10 Hz
    Hz10 = 1,
    /// 50 Hz
    Hz50 = 2,
    /// 100 Hz
    Hz100 = 3,
    /// 200 Hz
    Hz200 = 4,
    /// 400 Hz
    Hz400 = 5,
    /// 800 Hz
    Hz800 = 6,
}

impl OutputDataRate {
    /// Output data rate in Hz (0 in power-down)
    #[must_use]
    pub const fn hz(self) -> u16 {
        match self {
            Self::PowerDown => 0,
            Self::Hz10 => 10,
            Self::Hz50 => 50,
            Self::Hz100 => 100,
            Self::Hz200 => 200,
            Self::Hz400 => 400,
            Self::Hz800 => 800,
        }
    }
}

impl TryFrom<u8> for OutputDataRate {
    type Error = Error<()>;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::PowerDown),
            1 => Ok(Self::Hz10),
            2 => Ok(Self::Hz50),
            3 => Ok(Self::Hz100),
            4 => Ok(Self::Hz200),
            5 => Ok(Self::Hz400),
            6 => Ok(Self::Hz800),
            // 0b111 is not available on this device
            _ => Err(Error::InvalidConfig),
        }
    }
}

/// Accelerometer full-scale range (`CTRL4.FS`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FullScale {
    /// ±2g range
    G2 = 0,
    /// ±4g range
    G4 = 2,
    /// ±8g range
    G8 = 3,
}

impl FullScale {
    /// Sensitivity in milli-g per LSB
    #[must_use]
    pub const fn sensitivity_mg(self) -> f32 {
        match self {
            Self::G2 => 0.061,
            Self::G4 => 0.122,
            Self::G8 => 0.244,
        }
    }

    /// Get the maximum value in g
    #[must_use]
    pub const fn max_value(self) -> u8 {
        match self {
            Self::G2 => 2,
            Self::G4 => 4,
            Self::G8 => 8,
        }
    }
}

impl TryFrom<u8> for FullScale {
    type Error = Error<()>;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::G2),
            2 => Ok(Self::G4),
            3 => Ok(Self::G8),
            _ => Err(Error::InvalidConfig),
        }
    }
}

/// Per-axis enable bits (`CTRL1.XEN/YEN/ZEN`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Axes {
    /// X axis enabled
    pub x: bool,
    /// Y axis enabled
    pub y: bool,
    /// Z axis enabled
    pub z: bool,
}

impl Default for Axes {
    fn default() -> Self {
        Self::all()
    }
}

impl Axes {
    /// All three axes enabled
    #[must_use]
    pub const fn all() -> Self {
        Self {
            x: true,
            y: true,
            z: true,
        }
    }

    /// All axes disabled
    #[must_use]
    pub const fn none() -> Self {
        Self {
            x: false,
            y: false,
            z: false,
        }
    }

    /// Store the enable bits into `CTRL1`
    pub fn encode(self, ctrl1: &mut field_sets::Ctrl1) {
        ctrl1.set_xen(self.x);
        ctrl1.set_yen(self.y);
        ctrl1.set_zen(self.z);
    }

    /// Decode from `CTRL1`
    #[must_use]
    pub fn from_ctrl1(ctrl1: field_sets::Ctrl1) -> Self {
        Self {
            x: ctrl1.xen(),
            y: ctrl1.yen(),
            z: ctrl1.zen(),
        }
    }
}

/// Accelerometer configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[allow(clippy::struct_excessive_bools)]
pub struct AccelConfig {
    /// Output data rate
    pub odr: OutputDataRate,
    /// Full-scale range
    pub full_scale: FullScale,
    /// Enabled axes
    pub axes: Axes,
    /// Block data update (output registers not updated until both bytes are read)
    pub block_data_update: bool,
    /// High-resolution mode
    pub high_resolution: bool,
}

impl Default for AccelConfig {
    fn default() -> Self {
        Self {
            odr: OutputDataRate::Hz100,
            full_scale: FullScale::G2,
            axes: Axes::all(),
            block_data_update: true,
            high_resolution: false,
        }
    }
}

impl AccelConfig {
    /// Fill `CTRL1` for this configuration; `FS` lives in `CTRL4`
    pub fn encode_ctrl1(&self, ctrl1: &mut field_sets::Ctrl1) {
        ctrl1.set_hr(self.high_resolution);
        ctrl1.set_odr(self.odr as u8);
        ctrl1.set_bdu(self.block_data_update);
        self.axes.encode(ctrl1);
    }

    /// Low-power preset: 10 Hz, all axes, block data update
    #[must_use]
    pub const fn low_power() -> Self {
        Self {
            odr: OutputDataRate::Hz10,
            full_scale: FullScale::G2,
            axes: Axes::all(),
            block_data_update: true,
            high_resolution: false,
        }
    }

    /// Motion preset: 400 Hz, ±8g, high resolution
    #[must_use]
    pub const fn motion() -> Self {
        Self {
            odr: OutputDataRate::Hz400,
            full_scale: FullScale::G8,
            axes: Axes::all(),
            block_data_update: true,
            high_resolution: true,
        }
    }
}

/// Accelerometer data (raw 16-bit values)
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AccelData {
    /// X-axis acceleration (raw)
    pub x: i16,
    /// Y-axis acceleration (raw)
    pub y: i16,
    /// Z-axis acceleration (raw)
    pub z: i16,
}

impl AccelData {
    /// Decode one 6-byte output block (`OUT_X_L` first)
    ///
    /// # Panics
    ///
    /// Panics if `bytes` is shorter than six bytes.
    #[must_use]
    pub fn from_le_bytes(bytes: &[u8]) -> Self {
        Self {
            x: i16::from_le_bytes([bytes[0], bytes[1]]),
            y: i16::from_le_bytes([bytes[2], bytes[3]]),
            z: i16::from_le_bytes([bytes[4], bytes[5]]),
        }
    }

    /// Convert to milli-g for the given range
    #[must_use]
    pub fn to_mg(self, full_scale: FullScale) -> AccelDataMg {
        AccelDataMg::from_raw(self.x, self.y, self.z, full_scale.sensitivity_mg())
    }
}

/// Accelerometer data in milli-g
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AccelDataMg {
    /// X-axis acceleration in mg
    pub x: f32,
    /// Y-axis acceleration in mg
    pub y: f32,
    /// Z-axis acceleration in mg
    pub z: f32,
}

impl AccelDataMg {
    /// Create from raw sensor values
    ///
    /// * `sensitivity` - Sensitivity in mg/LSB (from `FullScale::sensitivity_mg()`)
    #[must_use]
    pub fn from_raw(raw_x: i16, raw_y: i16, raw_z: i16, sensitivity: f32) -> Self {
        Self {
            x: f32::from(raw_x) * sensitivity,
            y: f32::from(raw_y) * sensitivity,
            z: f32::from(raw_z) * sensitivity,
        }
    }

    /// Get the magnitude of the acceleration vector
    #[must_use]
    pub fn magnitude(&self) -> f32 {
        libm::sqrtf(self.x * self.x + self.y * self.y + self.z * self.z)
    }
}
