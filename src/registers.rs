//! Register map and in-memory register image for the LIS2HH12
//!
//! The register map and every bit-field view are generated by
//! `device_driver::create_device!`. The driver keeps a byte-exact mirror of
//! the device register block: burst reads copy raw bytes straight into the
//! mirror, and typed views are built from those bytes on demand through the
//! generated field sets (`field_sets::Ctrl1::from([raw])`), so the field view
//! and the raw view can never disagree.
//!
//! ## Image layout
//! - Offsets 0..=1: `TEMP_L`, `TEMP_H` (0x0B..=0x0C)
//! - Offsets 2..=35: `ACT_THS` (0x1E) through `ZH_REF` (0x3F), contiguous
//!
//! `WHO_AM_I` (0x0F) is only read during identification and is not mirrored.
//!
//! ## Wire contract
//! Every register is one byte. Multi-byte values (`TEMP`, `OUT_X..OUT_Z`)
//! are little-endian pairs. Field bit positions are LSB0 and every register
//! declares all eight bits, reserved bits included.

use crate::Error;
use crate::sensors::{AccelData, FullScale};

device_driver::create_device!(
    device_name: Lis2hh12Registers,
    dsl: {
        config {
            type RegisterAddressType = u8;
            type DefaultByteOrder = LE;
        }

        /// TEMP_L - Temperature output, low byte (0x0B)
        register TempL {
            const ADDRESS = 0x0B;
            const SIZE_BITS = 8;

            value: uint = 0..8,
        },

        /// TEMP_H - Temperature output, high byte (0x0C)
        register TempH {
            const ADDRESS = 0x0C;
            const SIZE_BITS = 8;

            value: uint = 0..8,
        },

        /// WHO_AM_I - Device ID Register (0x0F)
        /// Expected value: 0x41
        register WhoAmI {
            const ADDRESS = 0x0F;
            const SIZE_BITS = 8;

            /// Device ID (should read 0x41)
            who_am_i: uint = 0..8,
        },

        /// ACT_THS - Inactivity threshold (0x1E)
        register ActThs {
            const ADDRESS = 0x1E;
            const SIZE_BITS = 8;

            /// Threshold, 1 LSB = full scale / 128
            ths: uint = 0..7,
            reserved: uint = 7..8,
        },

        /// ACT_DUR - Inactivity duration (0x1F)
        register ActDur {
            const ADDRESS = 0x1F;
            const SIZE_BITS = 8;

            /// Duration, 1 LSB = 8 / ODR
            dur: uint = 0..8,
        },

        /// CTRL1 - Rate and axis control (0x20)
        register Ctrl1 {
            const ADDRESS = 0x20;
            const SIZE_BITS = 8;

            /// X axis enable
            xen: bool = 0,
            /// Y axis enable
            yen: bool = 1,
            /// Z axis enable
            zen: bool = 2,
            /// Block data update
            bdu: bool = 3,
            /// Output data rate (0 = power-down, 1..=6 = 10..800 Hz)
            odr: uint = 4..7,
            /// High resolution
            hr: bool = 7,
        },

        /// CTRL2 - Filter control (0x21)
        register Ctrl2 {
            const ADDRESS = 0x21;
            const SIZE_BITS = 8;

            /// High-pass filter on interrupt generator 2
            hpis_2: bool = 0,
            /// High-pass filter on interrupt generator 1
            hpis_1: bool = 1,
            /// Filtered data selection
            fds: bool = 2,
            /// High-pass filter mode
            hpm: uint = 3..5,
            /// High-pass cutoff selection
            dfc: uint = 5..7,
            reserved: uint = 7..8,
        },

        /// CTRL3 - INT1 routing and FIFO enable (0x22)
        register Ctrl3 {
            const ADDRESS = 0x22;
            const SIZE_BITS = 8;

            /// Data ready on INT1
            int_1_drdy: bool = 0,
            /// FIFO threshold on INT1
            int_1_fth: bool = 1,
            /// FIFO overrun on INT1
            int_1_ovr: bool = 2,
            /// Interrupt generator 1 on INT1
            int_1_ig_1: bool = 3,
            /// Interrupt generator 2 on INT1
            int_1_ig_2: bool = 4,
            /// Inactivity on INT1
            int_1_inact: bool = 5,
            /// Limit FIFO depth to the threshold
            stop_fth: bool = 6,
            /// FIFO enable
            fifo_en: bool = 7,
        },

        /// CTRL4 - Range and interface control (0x23)
        register Ctrl4 {
            const ADDRESS = 0x23;
            const SIZE_BITS = 8;

            /// SPI 3-wire mode
            sim: bool = 0,
            /// Disable the I2C interface
            i_2_c_disable: bool = 1,
            /// Register address auto-increment on multi-byte access
            if_add_inc: bool = 2,
            /// Anti-aliasing bandwidth follows ODR
            bw_scale_odr: bool = 3,
            /// Full-scale selection (0 = ±2g, 2 = ±4g, 3 = ±8g)
            fs: uint = 4..6,
            /// Anti-aliasing bandwidth
            bw: uint = 6..8,
        },

        /// CTRL5 - Reset, self test and interrupt pin electrical configuration (0x24)
        register Ctrl5 {
            const ADDRESS = 0x24;
            const SIZE_BITS = 8;

            /// Open-drain interrupt pins
            pp_od: bool = 0,
            /// Active-low interrupt pins
            h_lactive: bool = 1,
            /// Self-test mode
            st: uint = 2..4,
            /// Decimation in update mode
            dec: uint = 4..6,
            /// Soft reset, self-clearing
            soft_reset: bool = 6,
            /// Debug mode
            debug: bool = 7,
        },

        /// CTRL6 - INT2 routing and boot (0x25)
        register Ctrl6 {
            const ADDRESS = 0x25;
            const SIZE_BITS = 8;

            /// Data ready on INT2
            p_2_drdy: bool = 0,
            /// FIFO overrun on INT2
            p_2_ovr: bool = 1,
            /// Interrupt generator 1 on INT2
            p_2_ig_1: bool = 2,
            /// Interrupt generator 2 on INT2
            p_2_ig_2: bool = 3,
            /// FIFO empty on INT2
            p_2_empty: bool = 4,
            /// FIFO threshold on INT2
            p_2_wtm: bool = 5,
            /// Boot status on INT2
            boot_i_2: bool = 6,
            /// Reload calibration, self-clearing
            boot: bool = 7,
        },

        /// CTRL7 - Latching and 4D configuration (0x26)
        register Ctrl7 {
            const ADDRESS = 0x26;
            const SIZE_BITS = 8;

            /// 4D detection on interrupt generator 1
            four_d_ig_1: bool = 0,
            /// 4D detection on interrupt generator 2
            four_d_ig_2: bool = 1,
            /// Latch interrupt generator 1 until `IG_SRC1` is read
            lir_1: bool = 2,
            /// Latch interrupt generator 2 until `IG_SRC2` is read
            lir_2: bool = 3,
            /// Duration counter mode for generator 1
            dcrm_1: bool = 4,
            /// Duration counter mode for generator 2
            dcrm_2: bool = 5,
            reserved: uint = 6..8,
        },

        /// STATUS - Data status (0x27)
        register Status {
            const ADDRESS = 0x27;
            const SIZE_BITS = 8;

            x_da: bool = 0,
            y_da: bool = 1,
            z_da: bool = 2,
            zyx_da: bool = 3,
            x_or: bool = 4,
            y_or: bool = 5,
            z_or: bool = 6,
            zyx_or: bool = 7,
        },

        /// OUT_X_L - X output, low byte (0x28)
        register OutXl {
            const ADDRESS = 0x28;
            const SIZE_BITS = 8;

            value: uint = 0..8,
        },

        /// OUT_X_H - X output, high byte (0x29)
        register OutXh {
            const ADDRESS = 0x29;
            const SIZE_BITS = 8;

            value: uint = 0..8,
        },

        /// OUT_Y_L - Y output, low byte (0x2A)
        register OutYl {
            const ADDRESS = 0x2A;
            const SIZE_BITS = 8;

            value: uint = 0..8,
        },

        /// OUT_Y_H - Y output, high byte (0x2B)
        register OutYh {
            const ADDRESS = 0x2B;
            const SIZE_BITS = 8;

            value: uint = 0..8,
        },

        /// OUT_Z_L - Z output, low byte (0x2C)
        register OutZl {
            const ADDRESS = 0x2C;
            const SIZE_BITS = 8;

            value: uint = 0..8,
        },

        /// OUT_Z_H - Z output, high byte (0x2D)
        register OutZh {
            const ADDRESS = 0x2D;
            const SIZE_BITS = 8;

            value: uint = 0..8,
        },

        /// FIFO_CTRL - FIFO mode and threshold (0x2E)
        register FifoCtrl {
            const ADDRESS = 0x2E;
            const SIZE_BITS = 8;

            /// Threshold level
            fth: uint = 0..5,
            /// FIFO mode
            fmode: uint = 5..8,
        },

        /// FIFO_SRC - FIFO status (0x2F)
        register FifoSrc {
            const ADDRESS = 0x2F;
            const SIZE_BITS = 8;

            /// Stored samples (five bits, a full FIFO reports through `ovr`)
            fss: uint = 0..5,
            /// FIFO empty
            empty: bool = 5,
            /// FIFO overrun
            ovr: bool = 6,
            /// Level at or above threshold
            fth: bool = 7,
        },

        /// IG_CFG1 - Interrupt generator 1 configuration (0x30)
        register IgCfg1 {
            const ADDRESS = 0x30;
            const SIZE_BITS = 8;

            /// Event enables, bit 0 = X low through bit 5 = Z high
            events: uint = 0..6,
            /// 6-direction detection
            six_d: bool = 6,
            /// AND (true) or OR (false) combination
            aoi: bool = 7,
        },

        /// IG_SRC1 - Interrupt generator 1 source, read clears the latch (0x31)
        register IgSrc1 {
            const ADDRESS = 0x31;
            const SIZE_BITS = 8;

            /// Event flags, bit 0 = X low through bit 5 = Z high
            events: uint = 0..6,
            /// Interrupt active
            ia: bool = 6,
            reserved: uint = 7..8,
        },

        /// IG_THS_X1 - Interrupt generator 1 X threshold (0x32)
        register IgThsX1 {
            const ADDRESS = 0x32;
            const SIZE_BITS = 8;

            ths: uint = 0..8,
        },

        /// IG_THS_Y1 - Interrupt generator 1 Y threshold (0x33)
        register IgThsY1 {
            const ADDRESS = 0x33;
            const SIZE_BITS = 8;

            ths: uint = 0..8,
        },

        /// IG_THS_Z1 - Interrupt generator 1 Z threshold (0x34)
        register IgThsZ1 {
            const ADDRESS = 0x34;
            const SIZE_BITS = 8;

            ths: uint = 0..8,
        },

        /// IG_DUR1 - Interrupt generator 1 duration (0x35)
        register IgDur1 {
            const ADDRESS = 0x35;
            const SIZE_BITS = 8;

            /// Minimum event duration in ODR cycles
            dur: uint = 0..7,
            /// Hold the event for `dur` after it ends
            wait: bool = 7,
        },

        /// IG_CFG2 - Interrupt generator 2 configuration (0x36)
        register IgCfg2 {
            const ADDRESS = 0x36;
            const SIZE_BITS = 8;

            /// Event enables, bit 0 = X low through bit 5 = Z high
            events: uint = 0..6,
            /// 6-direction detection
            six_d: bool = 6,
            /// AND (true) or OR (false) combination
            aoi: bool = 7,
        },

        /// IG_SRC2 - Interrupt generator 2 source, read clears the latch (0x37)
        register IgSrc2 {
            const ADDRESS = 0x37;
            const SIZE_BITS = 8;

            /// Event flags, bit 0 = X low through bit 5 = Z high
            events: uint = 0..6,
            /// Interrupt active
            ia: bool = 6,
            reserved: uint = 7..8,
        },

        /// IG_THS2 - Interrupt generator 2 threshold (0x38)
        register IgThs2 {
            const ADDRESS = 0x38;
            const SIZE_BITS = 8;

            ths: uint = 0..8,
        },

        /// IG_DUR2 - Interrupt generator 2 duration (0x39)
        register IgDur2 {
            const ADDRESS = 0x39;
            const SIZE_BITS = 8;

            /// Minimum event duration in ODR cycles
            dur: uint = 0..7,
            /// Hold the event for `dur` after it ends
            wait: bool = 7,
        },

        /// XL_REF - X reference, low byte (0x3A)
        register XlRef {
            const ADDRESS = 0x3A;
            const SIZE_BITS = 8;

            value: uint = 0..8,
        },

        /// XH_REF - X reference, high byte (0x3B)
        register XhRef {
            const ADDRESS = 0x3B;
            const SIZE_BITS = 8;

            value: uint = 0..8,
        },

        /// YL_REF - Y reference, low byte (0x3C)
        register YlRef {
            const ADDRESS = 0x3C;
            const SIZE_BITS = 8;

            value: uint = 0..8,
        },

        /// YH_REF - Y reference, high byte (0x3D)
        register YhRef {
            const ADDRESS = 0x3D;
            const SIZE_BITS = 8;

            value: uint = 0..8,
        },

        /// ZL_REF - Z reference, low byte (0x3E)
        register ZlRef {
            const ADDRESS = 0x3E;
            const SIZE_BITS = 8;

            value: uint = 0..8,
        },

        /// ZH_REF - Z reference, high byte (0x3F)
        register ZhRef {
            const ADDRESS = 0x3F;
            const SIZE_BITS = 8;

            value: uint = 0..8,
        },
    }
);

/// Size of the register image in bytes
pub const IMAGE_SIZE: usize = 36;

/// First address of the contiguous control/data block
const BLOCK_BASE: u8 = 0x1E;

/// Last address of the contiguous control/data block
const BLOCK_END: u8 = 0x3F;

/// Image offset where the contiguous block starts
const BLOCK_OFFSET: usize = 2;

/// LIS2HH12 register addresses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
#[allow(missing_docs)]
pub enum Register {
    TempL = 0x0B,
    TempH = 0x0C,
    /// Identity register, expected value 0x41
    WhoAmI = 0x0F,
    /// Inactivity threshold
    ActThs = 0x1E,
    /// Inactivity duration
    ActDur = 0x1F,
    Ctrl1 = 0x20,
    Ctrl2 = 0x21,
    /// INT1 routing and FIFO enable
    Ctrl3 = 0x22,
    Ctrl4 = 0x23,
    /// Reset, self test and interrupt pin electrical configuration
    Ctrl5 = 0x24,
    /// INT2 routing and boot
    Ctrl6 = 0x25,
    /// Latching and 4D configuration
    Ctrl7 = 0x26,
    Status = 0x27,
    OutXl = 0x28,
    OutXh = 0x29,
    OutYl = 0x2A,
    OutYh = 0x2B,
    OutZl = 0x2C,
    OutZh = 0x2D,
    FifoCtrl = 0x2E,
    FifoSrc = 0x2F,
    IgCfg1 = 0x30,
    IgSrc1 = 0x31,
    IgThsX1 = 0x32,
    IgThsY1 = 0x33,
    IgThsZ1 = 0x34,
    IgDur1 = 0x35,
    IgCfg2 = 0x36,
    IgSrc2 = 0x37,
    IgThs2 = 0x38,
    IgDur2 = 0x39,
    XlRef = 0x3A,
    XhRef = 0x3B,
    YlRef = 0x3C,
    YhRef = 0x3D,
    ZlRef = 0x3E,
    ZhRef = 0x3F,
}

impl Register {
    /// Every register mirrored in the image, in image order
    pub const MIRRORED: [Self; IMAGE_SIZE] = [
        Self::TempL,
        Self::TempH,
        Self::ActThs,
        Self::ActDur,
        Self::Ctrl1,
        Self::Ctrl2,
        Self::Ctrl3,
        Self::Ctrl4,
        Self::Ctrl5,
        Self::Ctrl6,
        Self::Ctrl7,
        Self::Status,
        Self::OutXl,
        Self::OutXh,
        Self::OutYl,
        Self::OutYh,
        Self::OutZl,
        Self::OutZh,
        Self::FifoCtrl,
        Self::FifoSrc,
        Self::IgCfg1,
        Self::IgSrc1,
        Self::IgThsX1,
        Self::IgThsY1,
        Self::IgThsZ1,
        Self::IgDur1,
        Self::IgCfg2,
        Self::IgSrc2,
        Self::IgThs2,
        Self::IgDur2,
        Self::XlRef,
        Self::XhRef,
        Self::YlRef,
        Self::YhRef,
        Self::ZlRef,
        Self::ZhRef,
    ];

    /// Control registers (configuration bits the cascade and config operations touch)
    pub const CONTROL: [Self; 14] = [
        Self::ActThs,
        Self::ActDur,
        Self::Ctrl1,
        Self::Ctrl2,
        Self::Ctrl3,
        Self::Ctrl4,
        Self::Ctrl5,
        Self::Ctrl6,
        Self::Ctrl7,
        Self::FifoCtrl,
        Self::IgCfg1,
        Self::IgCfg2,
        Self::IgDur1,
        Self::IgDur2,
    ];

    /// Bus address of the register
    #[must_use]
    pub const fn addr(self) -> u8 {
        self as u8
    }

    /// Look up a register by bus address
    #[must_use]
    pub fn from_addr(addr: u8) -> Option<Self> {
        if addr == Self::WhoAmI.addr() {
            return Some(Self::WhoAmI);
        }
        Self::MIRRORED.iter().copied().find(|reg| reg.addr() == addr)
    }

    /// Offset of the register inside the image, `None` if it is not mirrored
    #[must_use]
    pub const fn image_offset(self) -> Option<usize> {
        let addr = self.addr();
        match addr {
            0x0B | 0x0C => Some((addr - 0x0B) as usize),
            BLOCK_BASE..=BLOCK_END => Some((addr - BLOCK_BASE) as usize + BLOCK_OFFSET),
            _ => None,
        }
    }

    /// Check that a burst of `len` bytes starting here stays inside one
    /// contiguous mirrored segment
    #[must_use]
    pub const fn burst_fits(self, len: usize) -> bool {
        if len == 0 {
            return false;
        }
        let start = self.addr() as usize;
        let end = start + len - 1;
        match self.addr() {
            0x0B | 0x0C => end <= 0x0C,
            BLOCK_BASE..=BLOCK_END => end <= BLOCK_END as usize,
            _ => false,
        }
    }

    /// Register name as printed in the datasheet
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::TempL => "TEMP_L",
            Self::TempH => "TEMP_H",
            Self::WhoAmI => "WHO_AM_I",
            Self::ActThs => "ACT_THS",
            Self::ActDur => "ACT_DUR",
            Self::Ctrl1 => "CTRL1",
            Self::Ctrl2 => "CTRL2",
            Self::Ctrl3 => "CTRL3",
            Self::Ctrl4 => "CTRL4",
            Self::Ctrl5 => "CTRL5",
            Self::Ctrl6 => "CTRL6",
            Self::Ctrl7 => "CTRL7",
            Self::Status => "STATUS",
            Self::OutXl => "OUT_X_L",
            Self::OutXh => "OUT_X_H",
            Self::OutYl => "OUT_Y_L",
            Self::OutYh => "OUT_Y_H",
            Self::OutZl => "OUT_Z_L",
            Self::OutZh => "OUT_Z_H",
            Self::FifoCtrl => "FIFO_CTRL",
            Self::FifoSrc => "FIFO_SRC",
            Self::IgCfg1 => "IG_CFG1",
            Self::IgSrc1 => "IG_SRC1",
            Self::IgThsX1 => "IG_THS_X1",
            Self::IgThsY1 => "IG_THS_Y1",
            Self::IgThsZ1 => "IG_THS_Z1",
            Self::IgDur1 => "IG_DUR1",
            Self::IgCfg2 => "IG_CFG2",
            Self::IgSrc2 => "IG_SRC2",
            Self::IgThs2 => "IG_THS2",
            Self::IgDur2 => "IG_DUR2",
            Self::XlRef => "XL_REF",
            Self::XhRef => "XH_REF",
            Self::YlRef => "YL_REF",
            Self::YhRef => "YH_REF",
            Self::ZlRef => "ZL_REF",
            Self::ZhRef => "ZH_REF",
        }
    }

}

/// A generated field set that mirrors exactly one image byte
pub trait Mirrored: Copy + From<[u8; 1]> + Into<[u8; 1]> {
    /// Register the field set describes
    const REGISTER: Register;
}

/// Raw byte behind a one-byte field set
#[must_use]
pub fn byte<F: Into<[u8; 1]>>(set: F) -> u8 {
    let [raw] = set.into();
    raw
}

/// Conversion from a raw field value into a generated setter argument
trait FromRaw {
    fn from_raw(value: u8) -> Self;
}

impl FromRaw for u8 {
    fn from_raw(value: u8) -> Self {
        value
    }
}

impl FromRaw for bool {
    fn from_raw(value: u8) -> Self {
        value != 0
    }
}

macro_rules! field_table {
    ($( $reg:ident { $( $variant:ident($name:literal) => $get:ident / $set:ident ),+ $(,)? } )+) => {
        /// Named bit field of a mirrored register
        ///
        /// Tables are listed MSB first. Packing and unpacking go through the
        /// generated field sets.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[cfg_attr(feature = "defmt", derive(defmt::Format))]
        #[allow(missing_docs)]
        pub enum Field {
            $( $( $variant, )+ )+
        }

        impl Field {
            /// Register holding the field
            #[must_use]
            pub const fn register(self) -> Register {
                match self {
                    $( $( Self::$variant => Register::$reg, )+ )+
                }
            }

            /// Field name as printed in the datasheet
            #[must_use]
            pub const fn name(self) -> &'static str {
                match self {
                    $( $( Self::$variant => $name, )+ )+
                }
            }

            /// Extract the field from a raw register byte
            #[must_use]
            #[allow(clippy::useless_conversion)]
            pub fn extract(self, raw: u8) -> u8 {
                match self {
                    $( $( Self::$variant => u8::from(field_sets::$reg::from([raw]).$get()), )+ )+
                }
            }

            /// Store `value` into the field, truncated to its width
            fn pack(self, raw: u8, value: u8) -> u8 {
                match self {
                    $( $(
                        Self::$variant => {
                            let mut set = field_sets::$reg::from([raw]);
                            set.$set(FromRaw::from_raw(value));
                            byte(set)
                        }
                    )+ )+
                }
            }
        }

        impl Register {
            /// Field table of a mirrored register, covering all eight bits
            ///
            /// `WHO_AM_I` is not mirrored and has an empty table.
            #[must_use]
            pub const fn fields(self) -> &'static [Field] {
                match self {
                    $( Self::$reg => &[ $( Field::$variant ),+ ], )+
                    Self::WhoAmI => &[],
                }
            }
        }

        $(
            impl Mirrored for field_sets::$reg {
                const REGISTER: Register = Register::$reg;
            }
        )+
    };
}

field_table! {
    TempL { TempL("TEMP_L") => value / set_value }
    TempH { TempH("TEMP_H") => value / set_value }
    ActThs {
        ActThsReserved("RESERVED") => reserved / set_reserved,
        ActThsThs("THS") => ths / set_ths,
    }
    ActDur { ActDurDur("DUR") => dur / set_dur }
    Ctrl1 {
        Ctrl1Hr("HR") => hr / set_hr,
        Ctrl1Odr("ODR") => odr / set_odr,
        Ctrl1Bdu("BDU") => bdu / set_bdu,
        Ctrl1Zen("ZEN") => zen / set_zen,
        Ctrl1Yen("YEN") => yen / set_yen,
        Ctrl1Xen("XEN") => xen / set_xen,
    }
    Ctrl2 {
        Ctrl2Reserved("RESERVED") => reserved / set_reserved,
        Ctrl2Dfc("DFC") => dfc / set_dfc,
        Ctrl2Hpm("HPM") => hpm / set_hpm,
        Ctrl2Fds("FDS") => fds / set_fds,
        Ctrl2Hpis1("HPIS1") => hpis_1 / set_hpis_1,
        Ctrl2Hpis2("HPIS2") => hpis_2 / set_hpis_2,
    }
    Ctrl3 {
        Ctrl3FifoEn("FIFO_EN") => fifo_en / set_fifo_en,
        Ctrl3StopFth("STOP_FTH") => stop_fth / set_stop_fth,
        Ctrl3Int1Inact("INT1_INACT") => int_1_inact / set_int_1_inact,
        Ctrl3Int1Ig2("INT1_IG2") => int_1_ig_2 / set_int_1_ig_2,
        Ctrl3Int1Ig1("INT1_IG1") => int_1_ig_1 / set_int_1_ig_1,
        Ctrl3Int1Ovr("INT1_OVR") => int_1_ovr / set_int_1_ovr,
        Ctrl3Int1Fth("INT1_FTH") => int_1_fth / set_int_1_fth,
        Ctrl3Int1Drdy("INT1_DRDY") => int_1_drdy / set_int_1_drdy,
    }
    Ctrl4 {
        Ctrl4Bw("BW") => bw / set_bw,
        Ctrl4Fs("FS") => fs / set_fs,
        Ctrl4BwScaleOdr("BW_SCALE_ODR") => bw_scale_odr / set_bw_scale_odr,
        Ctrl4IfAddInc("IF_ADD_INC") => if_add_inc / set_if_add_inc,
        Ctrl4I2cDisable("I2C_DISABLE") => i_2_c_disable / set_i_2_c_disable,
        Ctrl4Sim("SIM") => sim / set_sim,
    }
    Ctrl5 {
        Ctrl5Debug("DEBUG") => debug / set_debug,
        Ctrl5SoftReset("SOFT_RESET") => soft_reset / set_soft_reset,
        Ctrl5Dec("DEC") => dec / set_dec,
        Ctrl5St("ST") => st / set_st,
        Ctrl5HLactive("H_LACTIVE") => h_lactive / set_h_lactive,
        Ctrl5PpOd("PP_OD") => pp_od / set_pp_od,
    }
    Ctrl6 {
        Ctrl6Boot("BOOT") => boot / set_boot,
        Ctrl6BootI2("BOOT_I2") => boot_i_2 / set_boot_i_2,
        Ctrl6P2Wtm("P2_WTM") => p_2_wtm / set_p_2_wtm,
        Ctrl6P2Empty("P2_EMPTY") => p_2_empty / set_p_2_empty,
        Ctrl6P2Ig2("P2_IG2") => p_2_ig_2 / set_p_2_ig_2,
        Ctrl6P2Ig1("P2_IG1") => p_2_ig_1 / set_p_2_ig_1,
        Ctrl6P2Ovr("P2_OVR") => p_2_ovr / set_p_2_ovr,
        Ctrl6P2Drdy("P2_DRDY") => p_2_drdy / set_p_2_drdy,
    }
    Ctrl7 {
        Ctrl7Reserved("RESERVED") => reserved / set_reserved,
        Ctrl7Dcrm2("DCRM2") => dcrm_2 / set_dcrm_2,
        Ctrl7Dcrm1("DCRM1") => dcrm_1 / set_dcrm_1,
        Ctrl7Lir2("LIR2") => lir_2 / set_lir_2,
        Ctrl7Lir1("LIR1") => lir_1 / set_lir_1,
        Ctrl74dIg2("4D_IG2") => four_d_ig_2 / set_four_d_ig_2,
        Ctrl74dIg1("4D_IG1") => four_d_ig_1 / set_four_d_ig_1,
    }
    Status {
        StatusZyxor("ZYXOR") => zyx_or / set_zyx_or,
        StatusZor("ZOR") => z_or / set_z_or,
        StatusYor("YOR") => y_or / set_y_or,
        StatusXor("XOR") => x_or / set_x_or,
        StatusZyxda("ZYXDA") => zyx_da / set_zyx_da,
        StatusZda("ZDA") => z_da / set_z_da,
        StatusYda("YDA") => y_da / set_y_da,
        StatusXda("XDA") => x_da / set_x_da,
    }
    OutXl { OutXl("OUT_X_L") => value / set_value }
    OutXh { OutXh("OUT_X_H") => value / set_value }
    OutYl { OutYl("OUT_Y_L") => value / set_value }
    OutYh { OutYh("OUT_Y_H") => value / set_value }
    OutZl { OutZl("OUT_Z_L") => value / set_value }
    OutZh { OutZh("OUT_Z_H") => value / set_value }
    FifoCtrl {
        FifoCtrlFmode("FMODE") => fmode / set_fmode,
        FifoCtrlFth("FTH") => fth / set_fth,
    }
    FifoSrc {
        FifoSrcFth("FTH") => fth / set_fth,
        FifoSrcOvr("OVR") => ovr / set_ovr,
        FifoSrcEmpty("EMPTY") => empty / set_empty,
        FifoSrcFss("FSS") => fss / set_fss,
    }
    IgCfg1 {
        IgCfg1Aoi("AOI") => aoi / set_aoi,
        IgCfg16d("6D") => six_d / set_six_d,
        IgCfg1Events("ZHIE..XLIE") => events / set_events,
    }
    IgSrc1 {
        IgSrc1Reserved("RESERVED") => reserved / set_reserved,
        IgSrc1Ia("IA") => ia / set_ia,
        IgSrc1Events("ZH..XL") => events / set_events,
    }
    IgThsX1 { IgThsX1("THS_X1") => ths / set_ths }
    IgThsY1 { IgThsY1("THS_Y1") => ths / set_ths }
    IgThsZ1 { IgThsZ1("THS_Z1") => ths / set_ths }
    IgDur1 {
        IgDur1Wait("WAIT1") => wait / set_wait,
        IgDur1Dur("DUR1") => dur / set_dur,
    }
    IgCfg2 {
        IgCfg2Aoi("AOI") => aoi / set_aoi,
        IgCfg26d("6D") => six_d / set_six_d,
        IgCfg2Events("ZHIE..XLIE") => events / set_events,
    }
    IgSrc2 {
        IgSrc2Reserved("RESERVED") => reserved / set_reserved,
        IgSrc2Ia("IA") => ia / set_ia,
        IgSrc2Events("ZH..XL") => events / set_events,
    }
    IgThs2 { IgThs2("THS2") => ths / set_ths }
    IgDur2 {
        IgDur2Wait("WAIT2") => wait / set_wait,
        IgDur2Dur("DUR2") => dur / set_dur,
    }
    XlRef { XlRef("XL_REF") => value / set_value }
    XhRef { XhRef("XH_REF") => value / set_value }
    YlRef { YlRef("YL_REF") => value / set_value }
    YhRef { YhRef("YH_REF") => value / set_value }
    ZlRef { ZlRef("ZL_REF") => value / set_value }
    ZhRef { ZhRef("ZH_REF") => value / set_value }
}

impl Field {
    /// Largest value the field can hold
    #[must_use]
    pub fn max_value(self) -> u8 {
        self.extract(0xFF)
    }

    /// Bits of the register byte the field occupies
    #[must_use]
    pub fn mask(self) -> u8 {
        self.pack(0, 0xFF)
    }

    /// Replace the field in a raw register byte, leaving other bits alone
    ///
    /// Returns `None` if `value` does not fit the field width.
    #[must_use]
    pub fn insert(self, raw: u8, value: u8) -> Option<u8> {
        let packed = self.pack(raw, value);
        (self.extract(packed) == value).then_some(packed)
    }
}

/// Byte-exact mirror of the device register block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RegisterImage {
    bytes: [u8; IMAGE_SIZE],
}

impl Default for RegisterImage {
    fn default() -> Self {
        Self::new()
    }
}

impl RegisterImage {
    /// Create an all-zero image
    #[must_use]
    pub const fn new() -> Self {
        Self {
            bytes: [0; IMAGE_SIZE],
        }
    }

    /// Create an image from raw bytes in image order
    #[must_use]
    pub const fn from_bytes(bytes: [u8; IMAGE_SIZE]) -> Self {
        Self { bytes }
    }

    /// Raw bytes in image order
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; IMAGE_SIZE] {
        &self.bytes
    }

    fn offset(register: Register) -> usize {
        match register.image_offset() {
            Some(offset) => offset,
            None => panic!("register is not mirrored in the image"),
        }
    }

    /// Raw byte of a mirrored register
    ///
    /// # Panics
    ///
    /// Panics if `register` is not part of the image (`WHO_AM_I`).
    #[must_use]
    pub fn raw(&self, register: Register) -> u8 {
        self.bytes[Self::offset(register)]
    }

    /// Overwrite the raw byte of a mirrored register
    ///
    /// # Panics
    ///
    /// Panics if `register` is not part of the image (`WHO_AM_I`).
    pub fn set_raw(&mut self, register: Register, value: u8) {
        self.bytes[Self::offset(register)] = value;
    }

    /// Typed view of a mirrored register
    #[must_use]
    pub fn view<F: Mirrored>(&self) -> F {
        F::from([self.raw(F::REGISTER)])
    }

    /// Raw bytes of a contiguous register range
    ///
    /// # Panics
    ///
    /// Panics if the range leaves its mirrored segment.
    #[must_use]
    pub fn slice(&self, base: Register, len: usize) -> &[u8] {
        assert!(base.burst_fits(len), "burst outside register image");
        let start = Self::offset(base);
        &self.bytes[start..start + len]
    }

    /// Copy burst-read bytes into the image starting at `base`
    ///
    /// The only path that mutates the image from bus data; callers hold the
    /// device mutex.
    ///
    /// # Panics
    ///
    /// Panics if the burst leaves its mirrored segment.
    pub fn refresh(&mut self, base: Register, data: &[u8]) {
        assert!(base.burst_fits(data.len()), "burst outside register image");
        let start = Self::offset(base);
        self.bytes[start..start + data.len()].copy_from_slice(data);
    }

    /// Read a named field
    #[must_use]
    pub fn field(&self, field: Field) -> u8 {
        field.extract(self.raw(field.register()))
    }

    /// Write a named field, preserving every other bit of the register
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidConfig` if `value` does not fit the field width.
    pub fn set_field(&mut self, field: Field, value: u8) -> Result<(), Error<()>> {
        let register = field.register();
        let raw = field
            .insert(self.raw(register), value)
            .ok_or(Error::InvalidConfig)?;
        self.set_raw(register, raw);
        Ok(())
    }

    /// Decoded fields of one register as `(field, value)` pairs
    ///
    /// Empty for `WHO_AM_I`, which is not mirrored.
    pub fn decoded(&self, register: Register) -> impl Iterator<Item = (Field, u8)> + '_ {
        register
            .fields()
            .iter()
            .map(move |field| (*field, self.field(*field)))
    }

    /// Most recent acceleration sample held in `OUT_X..OUT_Z`
    #[must_use]
    pub fn acceleration(&self) -> AccelData {
        AccelData::from_le_bytes(self.slice(Register::OutXl, 6))
    }

    /// Raw temperature output
    #[must_use]
    pub fn temperature_raw(&self) -> i16 {
        i16::from_le_bytes([self.raw(Register::TempL), self.raw(Register::TempH)])
    }

    /// Cached full-scale selection, `None` for the reserved encoding
    #[must_use]
    pub fn full_scale(&self) -> Option<FullScale> {
        FullScale::try_from(self.view::<field_sets::Ctrl4>().fs()).ok()
    }
}
