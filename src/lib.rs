//! BMP280 driver with support for I2C and SPI buses.
//!
//! # Example
//!
//! ```
//! # let mut transactions: Vec<ehm::eh1::i2c::Transaction> = (0u8..12)
//! #     .map(|i| ehm::eh1::i2c::Transaction::write_read(0x76, vec![0x88 + 2 * i], vec![0, 0]))
//! #     .collect();
//! # transactions.push(ehm::eh1::i2c::Transaction::write(0x76, vec![0xF5, 0b10110000]));
//! # transactions.push(ehm::eh1::i2c::Transaction::write(0x76, vec![0xF4, 0b10110111]));
//! # transactions.extend([
//! #     ehm::eh1::i2c::Transaction::write_read(0x76, vec![0xFA], vec![0x80]),
//! #     ehm::eh1::i2c::Transaction::write_read(0x76, vec![0xFB], vec![0x00]),
//! #     ehm::eh1::i2c::Transaction::write_read(0x76, vec![0xFC], vec![0x00]),
//! #     ehm::eh1::i2c::Transaction::write_read(0x76, vec![0xF7], vec![0x80]),
//! #     ehm::eh1::i2c::Transaction::write_read(0x76, vec![0xF8], vec![0x00]),
//! #     ehm::eh1::i2c::Transaction::write_read(0x76, vec![0xF9], vec![0x00]),
//! # ]);
//! # let i2c = ehm::eh1::i2c::Mock::new(&transactions);
//! use bmp280_multibus::{i2c1::Address, Bmp280, Sample, Standby};
//!
//! const SETTINGS: bmp280_multibus::Settings = bmp280_multibus::Settings {
//!     config: bmp280_multibus::Config::RESET
//!         .set_standby_time(bmp280_multibus::Standby::Millis1000)
//!         .set_filter(bmp280_multibus::Filter::X16),
//!     ctrl_meas: bmp280_multibus::CtrlMeas::RESET
//!         .set_osrs_t(bmp280_multibus::Oversampling::X16)
//!         .set_osrs_p(bmp280_multibus::Oversampling::X16)
//!         .set_mode(bmp280_multibus::Mode::Normal),
//! };
//!
//! let mut bmp: Bmp280<_> = Bmp280::from_i2c1(i2c, Address::SdoGnd).unwrap();
//! bmp.settings(&SETTINGS).unwrap();
//! let sample: Sample = bmp.sample().unwrap();
//! # bmp.free().free().done();
//! ```
//!
//! # Features
//!
//! * `serde`: Implement `Serialize` and `Deserialize` for `Sample`.
#![no_std]
#![cfg_attr(docsrs, feature(doc_cfg), feature(doc_auto_cfg))]
#![forbid(unsafe_code)]
#![warn(missing_docs)]

use core::time::Duration;

pub use eh0;
pub use eh1;

/// BMP280 I2C bus implementation with embedded-hal version 0.2
pub mod i2c0;
/// BMP280 I2C bus implementation with embedded-hal version 1
pub mod i2c1;
/// BMP280 SPI bus implementation with embedded-hal version 0.2
pub mod spi0;
/// BMP280 SPI bus implementation with embedded-hal version 1
pub mod spi1;

/// BMP280 chip ID.
pub const CHIP_ID: u8 = 0x58;

const NUM_CALIB_WORDS: usize = 12;

/// Maximum SPI bus frequency in hertz.
pub const SPI_MAX_FREQ: u32 = 10_000_000;

/// BMP280 calibration data.
///
/// Read once from the chip when the driver is created, immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Calibration {
    t1: u16, // 0x88..0x89
    t2: i16, // 0x8A..0x8B
    t3: i16, // 0x8C..0x8D
    p1: u16, // 0x8E..0x8F
    p2: i16, // 0x90..0x91
    p3: i16, // 0x92..0x93
    p4: i16, // 0x94..0x95
    p5: i16, // 0x96..0x97
    p6: i16, // 0x98..0x99
    p7: i16, // 0x9A..0x9B
    p8: i16, // 0x9C..0x9D
    p9: i16, // 0x9E..0x9F
}

impl From<[u16; NUM_CALIB_WORDS]> for Calibration {
    fn from(words: [u16; NUM_CALIB_WORDS]) -> Self {
        // dig_T1 and dig_P1 are unsigned, everything else is the
        // two's-complement reinterpretation of the raw word
        Calibration {
            t1: words[0],
            t2: words[1] as i16,
            t3: words[2] as i16,
            p1: words[3],
            p2: words[4] as i16,
            p3: words[5] as i16,
            p4: words[6] as i16,
            p5: words[7] as i16,
            p6: words[8] as i16,
            p7: words[9] as i16,
            p8: words[10] as i16,
            p9: words[11] as i16,
        }
    }
}

impl Calibration {
    /// Temperature compensation.
    ///
    /// The magical math and magical numbers come from the datasheet.
    ///
    /// Returns the temperature in degrees celsius together with the `t_fine`
    /// carry value consumed by
    /// [`compensate_pressure`](Self::compensate_pressure).
    fn compensate_temperature(&self, adc_t: u32) -> (f32, i32) {
        let adc_t: i32 = adc_t as i32;

        let var1: i32 = (((adc_t >> 3) - ((self.t1 as i32) << 1)) * (self.t2 as i32)) >> 11;
        let var2: i32 = (((((adc_t >> 4) - (self.t1 as i32)) * ((adc_t >> 4) - (self.t1 as i32)))
            >> 12)
            * (self.t3 as i32))
            >> 14;

        let t_fine: i32 = var1 + var2;

        let centidegrees: i32 = (t_fine * 5 + 128) >> 8;
        ((centidegrees as f32) / 100.0, t_fine)
    }

    /// Pressure compensation.
    ///
    /// `t_fine` must come from the temperature stage of the same sampling
    /// instant. Returns the pressure in hectopascal, or `0.0` while the
    /// sensor has not yet produced a valid measurement window.
    fn compensate_pressure(&self, adc_p: u32, t_fine: i32) -> f32 {
        let var1: i64 = (t_fine as i64) - 128000;
        let var2: i64 = var1 * var1 * (self.p6 as i64);
        let var2: i64 = var2 + ((var1 * (self.p5 as i64)) << 17);
        let var2: i64 = var2 + ((self.p4 as i64) << 35);
        let var1: i64 = ((var1 * var1 * (self.p3 as i64)) >> 8) + ((var1 * (self.p2 as i64)) << 12);
        let var1: i64 = (((1i64 << 47) + var1) * (self.p1 as i64)) >> 33;

        if var1 == 0 {
            // avoids dividing by zero below
            return 0.0;
        }

        let p: i64 = 1048576 - (adc_p as i64);
        let p: i64 = (((p << 31) - var2) * 3125) / var1;
        let var1: i64 = ((self.p9 as i64) * (p >> 13) * (p >> 13)) >> 25;
        let var2: i64 = ((self.p8 as i64) * p) >> 19;
        let p: i64 = ((p + var1 + var2) >> 8) + ((self.p7 as i64) << 4);

        (p as f32) / 25600.0
    }
}

const RESET_MAGIC: u8 = 0xB6;

/// Register addresses.
///
/// from Table 18: Memory map
#[allow(dead_code)]
mod reg {
    pub const TEMP_XLSB: u8 = 0xFC;
    pub const TEMP_LSB: u8 = 0xFB;
    pub const TEMP_MSB: u8 = 0xFA;
    pub const PRESS_XLSB: u8 = 0xF9;
    pub const PRESS_LSB: u8 = 0xF8;
    pub const PRESS_MSB: u8 = 0xF7;
    pub const CONFIG: u8 = 0xF5;
    pub const CTRL_MEAS: u8 = 0xF4;
    pub const STATUS: u8 = 0xF3;
    pub const RESET: u8 = 0xE0;
    pub const ID: u8 = 0xD0;
    pub const DIG_P9: u8 = 0x9E;
    pub const DIG_P8: u8 = 0x9C;
    pub const DIG_P7: u8 = 0x9A;
    pub const DIG_P6: u8 = 0x98;
    pub const DIG_P5: u8 = 0x96;
    pub const DIG_P4: u8 = 0x94;
    pub const DIG_P3: u8 = 0x92;
    pub const DIG_P2: u8 = 0x90;
    pub const DIG_P1: u8 = 0x8E;
    pub const DIG_T3: u8 = 0x8C;
    pub const DIG_T2: u8 = 0x8A;
    pub const DIG_T1: u8 = 0x88;
}

/// Oversampling settings for temperature and pressure data.
#[derive(Debug, PartialEq, Eq, Clone, Copy, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Oversampling {
    /// Skipped, output set to `0x80000`.
    Skip = 0b000,
    /// Oversampling × 1
    X1 = 0b001,
    /// Oversampling × 2
    X2 = 0b010,
    /// Oversampling × 4
    X4 = 0b011,
    /// Oversampling × 8
    X8 = 0b100,
    /// Oversampling × 16
    X16 = 0b101,
}

impl From<Oversampling> for u8 {
    fn from(x: Oversampling) -> Self {
        x as u8
    }
}

impl Oversampling {
    /// Reset value of the osrs fields.
    ///
    /// # Example
    ///
    /// ```
    /// use bmp280_multibus::Oversampling;
    ///
    /// assert_eq!(Oversampling::RESET, Oversampling::Skip);
    /// ```
    pub const RESET: Self = Self::Skip;
}

impl Default for Oversampling {
    fn default() -> Self {
        Oversampling::RESET
    }
}

/// Sensor mode.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
#[repr(u8)]
pub enum Mode {
    /// Sleep mode.
    Sleep = 0b00,
    /// Forced mode.
    Forced = 0b01,
    /// Normal mode.
    Normal = 0b11,
}

impl From<Mode> for u8 {
    fn from(x: Mode) -> Self {
        x as u8
    }
}

impl Mode {
    /// Reset value of the mode field in the [`CtrlMeas`] register.
    ///
    /// # Example
    ///
    /// ```
    /// use bmp280_multibus::Mode;
    ///
    /// assert_eq!(Mode::RESET, Mode::Sleep);
    /// ```
    pub const RESET: Self = Mode::Sleep;
}

impl Default for Mode {
    fn default() -> Self {
        Mode::RESET
    }
}

/// t<sub>standby</sub> settings.
///
/// Unlike the BME280 the field encoding is monotonic in duration.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Hash)]
#[repr(u8)]
pub enum Standby {
    /// 0.5 ms
    Micros500 = 0b000,
    /// 62.5 ms
    Micros62500 = 0b001,
    /// 125 ms
    Millis125 = 0b010,
    /// 250 ms
    Millis250 = 0b011,
    /// 500 ms
    Millis500 = 0b100,
    /// 1000 ms
    Millis1000 = 0b101,
    /// 2000 ms
    Millis2000 = 0b110,
    /// 4000 ms
    Millis4000 = 0b111,
}

impl Standby {
    /// Reset value of the standby field in the [`Config`] register.
    ///
    /// # Example
    ///
    /// ```
    /// use bmp280_multibus::Standby;
    ///
    /// assert_eq!(Standby::RESET, Standby::Micros500);
    /// ```
    pub const RESET: Self = Standby::Micros500;

    /// Convert the standby enumeration to a duration.
    ///
    /// # Example
    ///
    /// ```
    /// use bmp280_multibus::Standby;
    /// use core::time::Duration;
    ///
    /// assert_eq!(Standby::Micros500.duration(), Duration::from_micros(500));
    /// assert_eq!(
    ///     Standby::Micros62500.duration(),
    ///     Duration::from_micros(62500)
    /// );
    /// assert_eq!(Standby::Millis4000.duration(), Duration::from_millis(4000));
    /// ```
    pub const fn duration(&self) -> Duration {
        match self {
            Standby::Micros500 => Duration::from_micros(500),
            Standby::Micros62500 => Duration::from_micros(62500),
            Standby::Millis125 => Duration::from_millis(125),
            Standby::Millis250 => Duration::from_millis(250),
            Standby::Millis500 => Duration::from_millis(500),
            Standby::Millis1000 => Duration::from_millis(1000),
            Standby::Millis2000 => Duration::from_millis(2000),
            Standby::Millis4000 => Duration::from_millis(4000),
        }
    }
}

impl From<&Standby> for Duration {
    fn from(s: &Standby) -> Self {
        s.duration()
    }
}

impl From<Standby> for Duration {
    fn from(s: Standby) -> Self {
        s.duration()
    }
}

impl Default for Standby {
    fn default() -> Self {
        Standby::RESET
    }
}

/// Filter settings.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Hash)]
#[repr(u8)]
pub enum Filter {
    /// Filter off.
    Off = 0b000,
    /// Filter coefficient of 2.
    X2 = 0b001,
    /// Filter coefficient of 4.
    X4 = 0b010,
    /// Filter coefficient of 8.
    X8 = 0b011,
    /// Filter coefficient of 16.
    X16 = 0b100,
}

impl Filter {
    /// Reset value of the filter field in the [`Config`] register.
    ///
    /// # Example
    ///
    /// ```
    /// use bmp280_multibus::Filter;
    ///
    /// assert_eq!(Filter::RESET, Filter::Off);
    /// ```
    pub const RESET: Self = Filter::Off;
}

impl Default for Filter {
    fn default() -> Self {
        Filter::RESET
    }
}

impl From<Filter> for u8 {
    fn from(x: Filter) -> Self {
        x as u8
    }
}

/// Config register.
///
/// This register sets the rate, filter, and interface options of the device.
/// Writes to the config register in normal mode may be ignored.
/// In sleep mode writes are not ignored.
///
/// All methods on this struct are constant so that you can create a
/// configuration value at compile time.
///
/// # Example
///
/// ```
/// use bmp280_multibus::{Config, Filter, Standby};
///
/// const CONFIG: Config = Config::RESET
///     .set_standby_time(Standby::Millis1000)
///     .set_filter(Filter::X16)
///     .set_spi3w_en(false);
/// ```
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub struct Config(u8);

impl Config {
    /// Get the reset value of the config register.
    ///
    /// # Example
    ///
    /// ```
    /// use bmp280_multibus::Config;
    ///
    /// assert_eq!(Config::RESET, Config::default());
    /// ```
    pub const RESET: Self = Config(0x00);

    /// Set the inactive duration t<sub>standby</sub> in normal mode.
    ///
    /// See [`Standby`] for settings.
    ///
    /// # Example
    ///
    /// ```
    /// use bmp280_multibus::{Config, Standby};
    ///
    /// let mut cfg: Config = Config::default();
    /// assert_eq!(cfg.standby_time(), Standby::default());
    /// cfg = cfg.set_standby_time(Standby::Millis1000);
    /// assert_eq!(cfg.standby_time(), Standby::Millis1000);
    /// cfg = cfg.set_standby_time(Standby::Millis4000);
    /// assert_eq!(cfg.standby_time(), Standby::Millis4000);
    /// ```
    #[must_use = "set_standby_time returns a modified Config"]
    pub const fn set_standby_time(self, s: Standby) -> Config {
        Config((self.0 & 0x1F) | ((s as u8) << 5))
    }

    /// Get the standby time.
    pub const fn standby_time(&self) -> Standby {
        match self.0 >> 5 {
            0b000 => Standby::Micros500,
            0b001 => Standby::Micros62500,
            0b010 => Standby::Millis125,
            0b011 => Standby::Millis250,
            0b100 => Standby::Millis500,
            0b101 => Standby::Millis1000,
            0b110 => Standby::Millis2000,
            _ => Standby::Millis4000,
        }
    }

    /// Set the time constant of the IIR filter.
    ///
    /// See [`Filter`] for settings.
    #[must_use = "set_filter returns a modified Config"]
    pub const fn set_filter(self, f: Filter) -> Config {
        Config((self.0 & 0b11100011) | ((f as u8) << 2))
    }

    /// Get the filter coefficient.
    pub const fn filter(&self) -> Filter {
        match (self.0 >> 2) & 0b111 {
            0b000 => Filter::Off,
            0b001 => Filter::X2,
            0b010 => Filter::X4,
            0b011 => Filter::X8,
            _ => Filter::X16,
        }
    }

    /// Enables the 3-wire SPI interface when enabled.
    ///
    /// # Example
    ///
    /// ```
    /// use bmp280_multibus::Config;
    ///
    /// let mut cfg: Config = Config::default();
    /// assert_eq!(cfg.spi3w_en(), false);
    /// cfg = cfg.set_spi3w_en(true);
    /// assert_eq!(cfg.spi3w_en(), true);
    /// ```
    #[must_use = "set_spi3w_en returns a modified Config"]
    pub const fn set_spi3w_en(self, en: bool) -> Config {
        if en {
            Config(self.0 | 0b1)
        } else {
            Config(self.0 & !0b1)
        }
    }

    /// Returns `true` if 3-wire SPI is enabled.
    pub const fn spi3w_en(&self) -> bool {
        self.0 & 0b1 == 0b1
    }
}

impl Default for Config {
    fn default() -> Self {
        Config::RESET
    }
}

/// Measurement control register.
///
/// This configures the pressure and temperature data acquisition options of
/// the device.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub struct CtrlMeas(u8);

impl CtrlMeas {
    /// Get the reset value of the ctrl_meas register.
    ///
    /// # Example
    ///
    /// ```
    /// use bmp280_multibus::CtrlMeas;
    ///
    /// assert_eq!(CtrlMeas::RESET, CtrlMeas::default());
    /// ```
    pub const RESET: Self = CtrlMeas(0x00);

    /// Set the oversampling for temperature data.
    ///
    /// See [`Oversampling`] for settings.
    ///
    /// # Example
    ///
    /// ```
    /// use bmp280_multibus::{CtrlMeas, Oversampling};
    ///
    /// let mut ctrl_meas: CtrlMeas = CtrlMeas::default();
    /// assert_eq!(ctrl_meas.osrs_t(), Oversampling::default());
    /// ctrl_meas = ctrl_meas.set_osrs_t(Oversampling::X16);
    /// assert_eq!(ctrl_meas.osrs_t(), Oversampling::X16);
    /// ```
    #[must_use = "set_osrs_t returns a modified CtrlMeas"]
    pub const fn set_osrs_t(self, os: Oversampling) -> CtrlMeas {
        CtrlMeas((self.0 & 0b00011111) | ((os as u8) << 5))
    }

    /// Get the temperature data oversampling.
    pub const fn osrs_t(&self) -> Oversampling {
        match (self.0 >> 5) & 0b111 {
            0b000 => Oversampling::Skip,
            0b001 => Oversampling::X1,
            0b010 => Oversampling::X2,
            0b011 => Oversampling::X4,
            0b100 => Oversampling::X8,
            _ => Oversampling::X16,
        }
    }

    /// Set the oversampling for pressure data.
    ///
    /// See [`Oversampling`] for settings.
    #[must_use = "set_osrs_p returns a modified CtrlMeas"]
    pub const fn set_osrs_p(self, os: Oversampling) -> CtrlMeas {
        CtrlMeas((self.0 & 0b11100011) | ((os as u8) << 2))
    }

    /// Get the pressure data oversampling.
    pub const fn osrs_p(&self) -> Oversampling {
        match (self.0 >> 2) & 0b111 {
            0b000 => Oversampling::Skip,
            0b001 => Oversampling::X1,
            0b010 => Oversampling::X2,
            0b011 => Oversampling::X4,
            0b100 => Oversampling::X8,
            _ => Oversampling::X16,
        }
    }

    /// Set the sensor mode for the device.
    ///
    /// See [`Mode`] for settings.
    ///
    /// # Example
    ///
    /// ```
    /// use bmp280_multibus::{CtrlMeas, Mode};
    ///
    /// let mut ctrl_meas: CtrlMeas = CtrlMeas::default();
    /// assert_eq!(ctrl_meas.mode(), Mode::default());
    /// ctrl_meas = ctrl_meas.set_mode(Mode::Forced);
    /// assert_eq!(ctrl_meas.mode(), Mode::Forced);
    /// ctrl_meas = ctrl_meas.set_mode(Mode::Normal);
    /// assert_eq!(ctrl_meas.mode(), Mode::Normal);
    /// ```
    #[must_use = "set_mode returns a modified CtrlMeas"]
    pub const fn set_mode(self, m: Mode) -> CtrlMeas {
        CtrlMeas((self.0 & 0xFC) | (m as u8))
    }

    /// Get the mode.
    pub const fn mode(&self) -> Mode {
        match self.0 & 0b11 {
            0b00 => Mode::Sleep,
            0b11 => Mode::Normal,
            _ => Mode::Forced,
        }
    }
}

impl Default for CtrlMeas {
    fn default() -> Self {
        CtrlMeas::RESET
    }
}

/// Status register
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub struct Status(u8);

impl Status {
    /// Get the reset value of the status register.
    ///
    /// # Example
    ///
    /// ```
    /// use bmp280_multibus::Status;
    ///
    /// assert_eq!(Status::RESET, Status::default());
    /// ```
    pub const RESET: Self = Status(0x00);

    /// Measuring field.
    ///
    /// Automatically set to `true` whenever a conversion is running and back
    /// to `false` when the results have been transferred to the data
    /// registers.
    ///
    /// # Example
    ///
    /// ```
    /// assert!(!bmp280_multibus::Status::RESET.measuring());
    /// ```
    pub const fn measuring(&self) -> bool {
        self.0 & (1 << 3) != 0
    }

    /// im_update field.
    ///
    /// Automatically set to `true` when the NVM data are being copied to
    /// image registers and back to `false` when the copying is done.
    /// The data is copied at power-on-reset and before every conversion.
    ///
    /// # Example
    ///
    /// ```
    /// assert!(!bmp280_multibus::Status::RESET.im_update());
    /// ```
    pub const fn im_update(&self) -> bool {
        self.0 & 1 != 0
    }
}

impl core::fmt::Display for Status {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Status")
            .field("measuring", &self.measuring())
            .field("im_update", &self.im_update())
            .finish()
    }
}

impl Default for Status {
    fn default() -> Self {
        Status::RESET
    }
}

/// BMP280 initialization settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Settings {
    /// `config` register value.
    pub config: Config,
    /// `ctrl_meas` register value.
    pub ctrl_meas: CtrlMeas,
}

impl Settings {
    /// Create a new settings structure.
    ///
    /// # Example
    ///
    /// ```
    /// use bmp280_multibus::{Config, CtrlMeas, Filter, Mode, Oversampling, Settings, Standby};
    ///
    /// const SETTINGS: Settings = Settings {
    ///     config: Config::RESET
    ///         .set_standby_time(Standby::Millis1000)
    ///         .set_filter(Filter::X16),
    ///     ctrl_meas: CtrlMeas::RESET
    ///         .set_osrs_t(Oversampling::X16)
    ///         .set_osrs_p(Oversampling::X16)
    ///         .set_mode(Mode::Normal),
    /// };
    /// ```
    pub const fn new() -> Settings {
        Settings {
            config: Config::RESET,
            ctrl_meas: CtrlMeas::RESET,
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Settings::new()
    }
}

/// A sensor sample from the BMP280.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Sample {
    /// Temperature reading in celsius.
    pub temperature: f32,
    /// Pressure reading in hectopascal.
    ///
    /// Exactly `0.0` while the sensor has not produced a valid measurement
    /// window yet, for example directly after power-on.
    pub pressure: f32,
}

/// BMP280 bus.
///
/// All register access is byte or word sized and addressed to a single
/// device; implementations must not retry failed transfers.
pub trait Bmp280Bus {
    /// BMP280 bus error.
    type Error;

    /// Read a single register from the BMP280.
    ///
    /// # I2C
    ///
    /// ```text
    /// Read example (BMP280 Datasheet Figure 8: I2C read)
    /// +-------+---------------+----+------+------------------+------+
    /// | Start | Slave Address | RW | ACKS | Register Address | ACKS |
    /// +-------+---------------+----+------+------------------+------+
    /// | S     | 111011x       |  0 |      | xxxxxxxx         |      |
    /// +-------+---------------+----+------+------------------+------+
    ///
    ///     +-------+---------------+----+------+---------------+--------+------+
    /// ... | Start | Slave Address | RW | ACKS | Register Data | NOACKM | Stop |
    ///     +-------+---------------+----+------+---------------+--------+------+
    /// ... | S     | 111011x       |  1 |      | xxxxxxxx      |        | P    |
    ///     +-------+---------------+----+------+---------------+--------+------+
    /// ```
    ///
    /// # SPI
    ///
    /// ```text
    /// Read example (BMP280 Datasheet Figure 10: SPI read)
    /// +-------+----+------------------+---------------+-------+
    /// | Start | RW | Register Address | Register Data | Stop  |
    /// +-------+----+------------------+---------------+-------+
    /// | CSB=0 |  1 | xxxxxxx          | xxxxxxxx      | CSB=1 |
    /// +-------+----+------------------+---------------+-------+
    /// ```
    fn read_reg(&mut self, reg: u8) -> Result<u8, Self::Error>;

    /// Write a single register to the BMP280.
    fn write_reg(&mut self, reg: u8, data: u8) -> Result<(), Self::Error>;

    /// Read a 16-bit word from two consecutive registers.
    ///
    /// The calibration area stores each coefficient least-significant byte
    /// first; implementations combine the two bytes little-endian.
    fn read_word(&mut self, reg: u8) -> Result<u16, Self::Error>;

    /// Read the calibration coefficients from the chip.
    ///
    /// Reads the 12 calibration words at `0x88..=0x9E` in ascending address
    /// order. A failed transfer aborts the load; there is no partially
    /// populated calibration.
    fn calibration(&mut self) -> Result<Calibration, Self::Error> {
        debug_assert_eq!(reg::DIG_P9, reg::DIG_T1 + 2 * (NUM_CALIB_WORDS as u8 - 1));

        let mut words: [u16; NUM_CALIB_WORDS] = [0; NUM_CALIB_WORDS];
        for (idx, word) in words.iter_mut().enumerate() {
            *word = self.read_word(reg::DIG_T1 + 2 * (idx as u8))?;
        }

        Ok(words.into())
    }
}

/// BMP280 driver.
///
/// The driver exclusively owns its bus handle; wrap the bus in a
/// mutual-exclusion mechanism externally if other devices share it.
#[derive(Debug)]
pub struct Bmp280<B> {
    bus: B,
    cal: Calibration,
}

impl<I2C, E> Bmp280<crate::i2c0::Bmp280Bus<I2C>>
where
    I2C: eh0::blocking::i2c::Write<Error = E> + eh0::blocking::i2c::WriteRead<Error = E>,
{
    /// Creates a new `Bmp280` driver from an embedded-hal version 0.2 I2C
    /// peripheral, and an I2C device address.
    ///
    /// # Example
    ///
    /// ```
    /// # let transactions: Vec<ehm::eh0::i2c::Transaction> = (0u8..12)
    /// #     .map(|i| ehm::eh0::i2c::Transaction::write_read(0x76, vec![0x88 + 2 * i], vec![0, 0]))
    /// #     .collect();
    /// # let i2c = ehm::eh0::i2c::Mock::new(&transactions);
    /// use bmp280_multibus::{i2c0::Address, Bmp280};
    ///
    /// let mut bmp: Bmp280<_> = Bmp280::from_i2c0(i2c, Address::SdoGnd)?;
    /// # bmp.free().free().done();
    /// # Ok::<(), ehm::eh0::MockError>(())
    /// ```
    pub fn from_i2c0(i2c: I2C, address: crate::i2c0::Address) -> Result<Self, E> {
        let bus = crate::i2c0::Bmp280Bus::new(i2c, address);
        Self::new(bus)
    }
}

impl<I2C, E> Bmp280<crate::i2c1::Bmp280Bus<I2C>>
where
    I2C: eh1::i2c::I2c<Error = E>,
{
    /// Creates a new `Bmp280` driver from an embedded-hal version 1 I2C
    /// peripheral, and an I2C device address.
    ///
    /// # Example
    ///
    /// ```
    /// # let transactions: Vec<ehm::eh1::i2c::Transaction> = (0u8..12)
    /// #     .map(|i| ehm::eh1::i2c::Transaction::write_read(0x76, vec![0x88 + 2 * i], vec![0, 0]))
    /// #     .collect();
    /// # let i2c = ehm::eh1::i2c::Mock::new(&transactions);
    /// use bmp280_multibus::{i2c1::Address, Bmp280};
    ///
    /// let mut bmp: Bmp280<_> = Bmp280::from_i2c1(i2c, Address::SdoGnd).unwrap();
    /// # bmp.free().free().done();
    /// ```
    pub fn from_i2c1(i2c: I2C, address: crate::i2c1::Address) -> Result<Self, E> {
        let bus = crate::i2c1::Bmp280Bus::new(i2c, address);
        Self::new(bus)
    }
}

impl<SPI, CS, SpiError, PinError> Bmp280<crate::spi0::Bmp280Bus<SPI, CS>>
where
    SPI: eh0::blocking::spi::Transfer<u8, Error = SpiError>
        + eh0::blocking::spi::Write<u8, Error = SpiError>,
    CS: eh0::digital::v2::OutputPin<Error = PinError>,
{
    /// Creates a new `Bmp280` driver from an embedded-hal version 0.2 SPI
    /// peripheral and a chip select digital I/O pin.
    ///
    /// # Safety
    ///
    /// The chip select pin must be high before being passed to this function.
    #[allow(clippy::unnecessary_safety_doc)]
    pub fn from_spi0(spi: SPI, cs: CS) -> Result<Self, crate::spi0::Error<SpiError, PinError>> {
        let bus = crate::spi0::Bmp280Bus::new(spi, cs);
        Self::new(bus)
    }
}

impl<SPI, E> Bmp280<crate::spi1::Bmp280Bus<SPI>>
where
    SPI: eh1::spi::SpiDevice<Error = E>,
{
    /// Creates a new `Bmp280` driver from an embedded-hal version 1 SPI
    /// device.
    ///
    /// # Example
    ///
    /// ```
    /// # let mut transactions: Vec<ehm::eh1::spi::Transaction<u8>> = Vec::new();
    /// # for i in 0u8..12 {
    /// #     transactions.extend([
    /// #         ehm::eh1::spi::Transaction::transaction_start(),
    /// #         ehm::eh1::spi::Transaction::write((0x88 + 2 * i) | 0x80),
    /// #         ehm::eh1::spi::Transaction::read_vec(vec![0, 0]),
    /// #         ehm::eh1::spi::Transaction::transaction_end(),
    /// #     ]);
    /// # }
    /// # let spi = ehm::eh1::spi::Mock::new(&transactions);
    /// use bmp280_multibus::Bmp280;
    ///
    /// let mut bmp: Bmp280<_> = Bmp280::from_spi1(spi).unwrap();
    /// # bmp.free().free().done();
    /// ```
    pub fn from_spi1(spi: SPI) -> Result<Self, E> {
        let bus: crate::spi1::Bmp280Bus<SPI> = crate::spi1::Bmp280Bus::new(spi);
        Self::new(bus)
    }
}

impl<B, E> Bmp280<B>
where
    B: Bmp280Bus<Error = E>,
{
    /// Create a new BMP280 from a [`Bmp280Bus`].
    ///
    /// Reads the calibration coefficients from the chip; a driver instance
    /// always holds a fully loaded calibration.
    ///
    /// # Example
    ///
    /// ```
    /// # let transactions: Vec<ehm::eh1::i2c::Transaction> = (0u8..12)
    /// #     .map(|i| ehm::eh1::i2c::Transaction::write_read(0x76, vec![0x88 + 2 * i], vec![0, 0]))
    /// #     .collect();
    /// # let i2c = ehm::eh1::i2c::Mock::new(&transactions);
    /// use bmp280_multibus::{
    ///     i2c1::{Address, Bmp280Bus},
    ///     Bmp280,
    /// };
    ///
    /// let bus: Bmp280Bus<_> = Bmp280Bus::new(i2c, Address::SdoGnd);
    /// let bmp: Bmp280<_> = Bmp280::new(bus).unwrap();
    /// # bmp.free().free().done();
    /// ```
    pub fn new(mut bus: B) -> Result<Self, E> {
        let cal: Calibration = bus.calibration()?;
        Ok(Self { bus, cal })
    }

    /// Free the bus from the BMP280.
    #[inline]
    pub fn free(self) -> B {
        self.bus
    }

    /// BMP280 chip ID.
    ///
    /// The return value is a constant, [`CHIP_ID`].
    ///
    /// This register is useful as a sanity check to ensure communications
    /// are working with the BMP280.
    ///
    /// # Example
    ///
    /// ```
    /// # let mut transactions: Vec<ehm::eh1::i2c::Transaction> = (0u8..12)
    /// #     .map(|i| ehm::eh1::i2c::Transaction::write_read(0x76, vec![0x88 + 2 * i], vec![0, 0]))
    /// #     .collect();
    /// # transactions.push(ehm::eh1::i2c::Transaction::write_read(0x76, vec![0xD0], vec![0x58]));
    /// # let i2c = ehm::eh1::i2c::Mock::new(&transactions);
    /// use bmp280_multibus::{i2c1::Address, Bmp280, CHIP_ID};
    ///
    /// let mut bmp: Bmp280<_> = Bmp280::from_i2c1(i2c, Address::SdoGnd).unwrap();
    /// let chip_id: u8 = bmp.chip_id().unwrap();
    /// assert_eq!(chip_id, CHIP_ID);
    /// # bmp.free().free().done();
    /// ```
    pub fn chip_id(&mut self) -> Result<u8, E> {
        self.bus.read_reg(reg::ID)
    }

    /// Reset the BMP280.
    ///
    /// The calibration coefficients survive a reset; the configuration
    /// registers return to their reset values and must be written again.
    ///
    /// # Example
    ///
    /// ```
    /// # let mut transactions: Vec<ehm::eh1::i2c::Transaction> = (0u8..12)
    /// #     .map(|i| ehm::eh1::i2c::Transaction::write_read(0x76, vec![0x88 + 2 * i], vec![0, 0]))
    /// #     .collect();
    /// # transactions.push(ehm::eh1::i2c::Transaction::write(0x76, vec![0xE0, 0xB6]));
    /// # let i2c = ehm::eh1::i2c::Mock::new(&transactions);
    /// use bmp280_multibus::{i2c1::Address, Bmp280};
    ///
    /// let mut bmp: Bmp280<_> = Bmp280::from_i2c1(i2c, Address::SdoGnd).unwrap();
    /// bmp.reset().unwrap();
    /// # bmp.free().free().done();
    /// ```
    pub fn reset(&mut self) -> Result<(), E> {
        self.bus.write_reg(reg::RESET, RESET_MAGIC)
    }

    /// Get the status of the device.
    pub fn status(&mut self) -> Result<Status, E> {
        Ok(Status(self.bus.read_reg(reg::STATUS)?))
    }

    /// Write the config register.
    ///
    /// A single register write; calling this twice with the same value
    /// writes the same byte twice.
    ///
    /// # Example
    ///
    /// ```
    /// # let mut transactions: Vec<ehm::eh1::i2c::Transaction> = (0u8..12)
    /// #     .map(|i| ehm::eh1::i2c::Transaction::write_read(0x76, vec![0x88 + 2 * i], vec![0, 0]))
    /// #     .collect();
    /// # transactions.push(ehm::eh1::i2c::Transaction::write(0x76, vec![0xF5, 0b10110000]));
    /// # let i2c = ehm::eh1::i2c::Mock::new(&transactions);
    /// use bmp280_multibus::{i2c1::Address, Bmp280, Config, Filter, Standby};
    ///
    /// let mut bmp: Bmp280<_> = Bmp280::from_i2c1(i2c, Address::SdoGnd).unwrap();
    /// bmp.set_config(
    ///     Config::RESET
    ///         .set_standby_time(Standby::Millis1000)
    ///         .set_filter(Filter::X16),
    /// )
    /// .unwrap();
    /// # bmp.free().free().done();
    /// ```
    pub fn set_config(&mut self, config: Config) -> Result<(), E> {
        self.bus.write_reg(reg::CONFIG, config.0)
    }

    /// Write the ctrl_meas register.
    ///
    /// A single register write; see [`CtrlMeas`].
    pub fn set_ctrl_meas(&mut self, ctrl_meas: CtrlMeas) -> Result<(), E> {
        self.bus.write_reg(reg::CTRL_MEAS, ctrl_meas.0)
    }

    /// Configure the BMP280 settings.
    ///
    /// The config register is written before ctrl_meas so that the rate and
    /// filter options are in place before a power mode is selected.
    ///
    /// # Example
    ///
    /// ```
    /// # let mut transactions: Vec<ehm::eh1::i2c::Transaction> = (0u8..12)
    /// #     .map(|i| ehm::eh1::i2c::Transaction::write_read(0x76, vec![0x88 + 2 * i], vec![0, 0]))
    /// #     .collect();
    /// # transactions.push(ehm::eh1::i2c::Transaction::write(0x76, vec![0xF5, 0b10110000]));
    /// # transactions.push(ehm::eh1::i2c::Transaction::write(0x76, vec![0xF4, 0b10110111]));
    /// # let i2c = ehm::eh1::i2c::Mock::new(&transactions);
    /// use bmp280_multibus::{
    ///     i2c1::Address, Bmp280, Config, CtrlMeas, Filter, Mode, Oversampling, Settings, Standby,
    /// };
    ///
    /// const SETTINGS: Settings = Settings {
    ///     config: Config::RESET
    ///         .set_standby_time(Standby::Millis1000)
    ///         .set_filter(Filter::X16),
    ///     ctrl_meas: CtrlMeas::RESET
    ///         .set_osrs_t(Oversampling::X16)
    ///         .set_osrs_p(Oversampling::X16)
    ///         .set_mode(Mode::Normal),
    /// };
    ///
    /// let mut bmp: Bmp280<_> = Bmp280::from_i2c1(i2c, Address::SdoGnd).unwrap();
    /// bmp.settings(&SETTINGS).unwrap();
    /// # bmp.free().free().done();
    /// ```
    pub fn settings(&mut self, settings: &Settings) -> Result<(), E> {
        self.set_config(settings.config)?;
        self.set_ctrl_meas(settings.ctrl_meas)
    }

    /// Read the raw temperature ADC value.
    ///
    /// Three single-byte reads of `0xFA`, `0xFB`, `0xFC` assembled into a
    /// 20-bit value; the low nibble of the xlsb byte is discarded.
    ///
    /// The bytes are read in separate bus transactions. If the sensor
    /// updates its output registers between them the sample can tear; this
    /// driver does not attempt burst-read mitigation.
    pub fn read_raw_temperature(&mut self) -> Result<u32, E> {
        let msb: u8 = self.bus.read_reg(reg::TEMP_MSB)?;
        let lsb: u8 = self.bus.read_reg(reg::TEMP_LSB)?;
        let xlsb: u8 = self.bus.read_reg(reg::TEMP_XLSB)?;
        Ok(((msb as u32) << 12) | ((lsb as u32) << 4) | ((xlsb as u32) >> 4))
    }

    /// Read the raw pressure ADC value.
    ///
    /// Same register layout as [`read_raw_temperature`] at `0xF7`..`0xF9`,
    /// with the same torn-sample caveat.
    ///
    /// [`read_raw_temperature`]: Self::read_raw_temperature
    pub fn read_raw_pressure(&mut self) -> Result<u32, E> {
        let msb: u8 = self.bus.read_reg(reg::PRESS_MSB)?;
        let lsb: u8 = self.bus.read_reg(reg::PRESS_LSB)?;
        let xlsb: u8 = self.bus.read_reg(reg::PRESS_XLSB)?;
        Ok(((msb as u32) << 12) | ((lsb as u32) << 4) | ((xlsb as u32) >> 4))
    }

    /// Read the temperature in degrees celsius.
    ///
    /// # Example
    ///
    /// ```
    /// # let mut transactions: Vec<ehm::eh1::i2c::Transaction> = (0u8..12)
    /// #     .map(|i| ehm::eh1::i2c::Transaction::write_read(0x76, vec![0x88 + 2 * i], vec![0, 0]))
    /// #     .collect();
    /// # transactions.extend([
    /// #     ehm::eh1::i2c::Transaction::write_read(0x76, vec![0xFA], vec![0x80]),
    /// #     ehm::eh1::i2c::Transaction::write_read(0x76, vec![0xFB], vec![0x00]),
    /// #     ehm::eh1::i2c::Transaction::write_read(0x76, vec![0xFC], vec![0x00]),
    /// # ]);
    /// # let i2c = ehm::eh1::i2c::Mock::new(&transactions);
    /// use bmp280_multibus::{i2c1::Address, Bmp280};
    ///
    /// let mut bmp: Bmp280<_> = Bmp280::from_i2c1(i2c, Address::SdoGnd).unwrap();
    /// let celsius: f32 = bmp.read_temperature().unwrap();
    /// # bmp.free().free().done();
    /// ```
    pub fn read_temperature(&mut self) -> Result<f32, E> {
        let adc_t: u32 = self.read_raw_temperature()?;
        let (celsius, _t_fine) = self.cal.compensate_temperature(adc_t);
        Ok(celsius)
    }

    /// Read the pressure in hectopascal.
    ///
    /// Pressure compensation consumes the `t_fine` output of the temperature
    /// stage, so this samples both data register groups and runs both
    /// stages. Returns exactly `0.0` while the sensor has not produced a
    /// valid measurement window yet.
    pub fn read_pressure(&mut self) -> Result<f32, E> {
        let adc_t: u32 = self.read_raw_temperature()?;
        let adc_p: u32 = self.read_raw_pressure()?;
        let (_celsius, t_fine) = self.cal.compensate_temperature(adc_t);
        Ok(self.cal.compensate_pressure(adc_p, t_fine))
    }

    /// Read a sample from the BMP280.
    ///
    /// Temperature and pressure are compensated from one shared raw pair,
    /// reusing the same `t_fine` for both outputs.
    ///
    /// # Example
    ///
    /// ```
    /// # let mut transactions: Vec<ehm::eh1::i2c::Transaction> = (0u8..12)
    /// #     .map(|i| ehm::eh1::i2c::Transaction::write_read(0x76, vec![0x88 + 2 * i], vec![0, 0]))
    /// #     .collect();
    /// # transactions.extend([
    /// #     ehm::eh1::i2c::Transaction::write_read(0x76, vec![0xFA], vec![0x80]),
    /// #     ehm::eh1::i2c::Transaction::write_read(0x76, vec![0xFB], vec![0x00]),
    /// #     ehm::eh1::i2c::Transaction::write_read(0x76, vec![0xFC], vec![0x00]),
    /// #     ehm::eh1::i2c::Transaction::write_read(0x76, vec![0xF7], vec![0x80]),
    /// #     ehm::eh1::i2c::Transaction::write_read(0x76, vec![0xF8], vec![0x00]),
    /// #     ehm::eh1::i2c::Transaction::write_read(0x76, vec![0xF9], vec![0x00]),
    /// # ]);
    /// # let i2c = ehm::eh1::i2c::Mock::new(&transactions);
    /// use bmp280_multibus::{i2c1::Address, Bmp280, Sample};
    ///
    /// let mut bmp: Bmp280<_> = Bmp280::from_i2c1(i2c, Address::SdoGnd).unwrap();
    /// let sample: Sample = bmp.sample().unwrap();
    /// # bmp.free().free().done();
    /// ```
    pub fn sample(&mut self) -> Result<Sample, E> {
        let adc_t: u32 = self.read_raw_temperature()?;
        let adc_p: u32 = self.read_raw_pressure()?;
        let (temperature, t_fine) = self.cal.compensate_temperature(adc_t);
        let pressure: f32 = self.cal.compensate_pressure(adc_p, t_fine);
        Ok(Sample {
            temperature,
            pressure,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // BMP280 datasheet section 3.12 worked example
    const DATASHEET_WORDS: [u16; NUM_CALIB_WORDS] = [
        27504, // dig_T1
        26435, // dig_T2
        64536, // dig_T3 = -1000
        36477, // dig_P1
        54851, // dig_P2 = -10685
        3024,  // dig_P3
        2855,  // dig_P4
        140,   // dig_P5
        65529, // dig_P6 = -7
        15500, // dig_P7
        50936, // dig_P8 = -14600
        6000,  // dig_P9
    ];

    #[test]
    fn sign_conversion() {
        let cal: Calibration =
            Calibration::from([0, 32767, 32768, 65535, 65535, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(cal.t2, 32767);
        assert_eq!(cal.t3, -32768);
        assert_eq!(cal.p2, -1);
        // dig_T1 and dig_P1 stay unsigned
        assert_eq!(cal.t1, 0);
        assert_eq!(cal.p1, 65535);
    }

    #[test]
    fn datasheet_temperature() {
        let cal: Calibration = Calibration::from(DATASHEET_WORDS);
        let (celsius, t_fine) = cal.compensate_temperature(519888);
        assert_eq!(t_fine, 128422);
        assert!((celsius - 25.08).abs() < 0.001, "celsius = {celsius}");
    }

    #[test]
    fn datasheet_pressure() {
        let cal: Calibration = Calibration::from(DATASHEET_WORDS);
        let (_, t_fine) = cal.compensate_temperature(519888);
        let hpa: f32 = cal.compensate_pressure(415148, t_fine);
        // all intermediate dividends are non-negative here, so truncating
        // division and floor division agree
        assert!((hpa - 1006.5329).abs() < 0.01, "hpa = {hpa}");
    }

    #[test]
    fn pressure_divide_guard() {
        let mut words: [u16; NUM_CALIB_WORDS] = DATASHEET_WORDS;
        words[3] = 0; // dig_P1 = 0 forces var1 == 0
        let cal: Calibration = Calibration::from(words);
        assert_eq!(cal.compensate_pressure(415148, 128422), 0.0);
    }

    #[test]
    fn config_packing() {
        let config: Config = Config::RESET
            .set_standby_time(Standby::Millis1000)
            .set_filter(Filter::X16);
        assert_eq!(config.0, 0b10110000);
        assert_eq!(config.set_spi3w_en(true).0, 0b10110001);
    }

    #[test]
    fn ctrl_meas_packing() {
        let ctrl_meas: CtrlMeas = CtrlMeas::RESET
            .set_osrs_t(Oversampling::X16)
            .set_osrs_p(Oversampling::X16)
            .set_mode(Mode::Normal);
        assert_eq!(ctrl_meas.0, 0b10110111);
    }

    #[test]
    fn mode_bits() {
        assert_eq!(CtrlMeas::RESET.set_mode(Mode::Sleep).0 & 0b11, 0b00);
        assert_eq!(CtrlMeas::RESET.set_mode(Mode::Forced).0 & 0b11, 0b01);
        assert_eq!(CtrlMeas::RESET.set_mode(Mode::Normal).0 & 0b11, 0b11);
    }

    #[test]
    fn standby_ordering() {
        assert!(Standby::Micros500 < Standby::Micros62500);
        assert!(Standby::Millis2000 < Standby::Millis4000);
    }
}
