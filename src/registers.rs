#![allow(missing_docs)]
use bilge::prelude::*;

/// Register addresses
#[derive(Debug, PartialEq, PartialOrd)]
pub enum Register {
    /// Temperature result register address.
    Temperature,

    /// Configuration register address.
    Configuration,

    /// Temperature low limit register address.
    LowLimit,

    /// Temperature high limit register address.
    HighLimit,
}

impl From<Register> for u8 {
    fn from(reg: Register) -> Self {
        match reg {
            Register::Temperature => 0,
            Register::Configuration => 1,
            Register::LowLimit => 2,
            Register::HighLimit => 3,
        }
    }
}

/// General-call address accepting the software reset command.
pub(crate) const GENERAL_CALL: u8 = 0x00;

/// Software reset command byte, sent to the general-call address.
pub(crate) const RESET_COMMAND: u8 = 0x06;

/// Alert-cause pseudo-register (alert response address).
pub(crate) const ALERT_CAUSE: u8 = 0x19;

/// One temperature LSB in degrees Celsius.
pub const CELSIUS_PER_BIT: f32 = 0.0625;

/// Configuration register.
#[bitsize(16)]
#[derive(DebugBits, FromBits, PartialEq)]
pub struct Configuration {
    reserved0_3: u4,

    /// Extended mode
    pub em: ExtendedMode,

    /// Alert flag (read-only)
    pub al: bool,

    /// Conversion rate
    pub cr: ConversionRate,

    /// Shutdown mode
    pub sd: bool,

    /// Alert/comparator mode
    pub tm: AlertMode,

    /// Alert polarity
    pub pol: Polarity,

    /// Fault queue depth
    pub fq: FaultQueue,

    reserved13_14: u2,

    /// One-shot trigger
    pub os: bool,
}

impl Default for Configuration {
    fn default() -> Self {
        Self::from(0b0110_0000_1010_0000)
    }
}

impl Configuration {
    /// Configure extended mode.
    #[must_use]
    pub fn with_em(mut self, mode: ExtendedMode) -> Self {
        self.set_em(mode);
        Self::from(self.value)
    }

    /// Configure conversion rate.
    #[must_use]
    pub fn with_cr(mut self, rate: ConversionRate) -> Self {
        self.set_cr(rate);
        Self::from(self.value)
    }

    /// Configure shutdown mode.
    #[must_use]
    pub fn with_sd(mut self, shutdown: bool) -> Self {
        self.set_sd(shutdown);
        Self::from(self.value)
    }

    /// Configure alert/comparator mode.
    #[must_use]
    pub fn with_tm(mut self, mode: AlertMode) -> Self {
        self.set_tm(mode);
        Self::from(self.value)
    }

    /// Configure alert polarity.
    #[must_use]
    pub fn with_pol(mut self, polarity: Polarity) -> Self {
        self.set_pol(polarity);
        Self::from(self.value)
    }

    /// Configure fault queue depth.
    #[must_use]
    pub fn with_fq(mut self, faults: FaultQueue) -> Self {
        self.set_fq(faults);
        Self::from(self.value)
    }

    /// Configure the one-shot trigger.
    #[must_use]
    pub fn with_os(mut self, trigger: bool) -> Self {
        self.set_os(trigger);
        Self::from(self.value)
    }
}

/// Temperature representation width.
#[bitsize(1)]
#[derive(Debug, FromBits, PartialEq, PartialOrd)]
pub enum ExtendedMode {
    /// Normal mode, 12-bit temperature fields.
    Normal,

    /// Extended mode, 13-bit temperature fields.
    Extended,
}

/// Conversion rate.
#[bitsize(2)]
#[derive(Debug, FromBits, PartialEq, PartialOrd)]
pub enum ConversionRate {
    /// 0.25Hz conversion rate.
    Hertz025,

    /// 1Hz conversion rate.
    Hertz1,

    /// 4Hz conversion rate (default).
    Hertz4,

    /// 8Hz conversion rate.
    Hertz8,
}

/// Alert subsystem behavior.
#[bitsize(1)]
#[derive(Debug, FromBits, PartialEq, PartialOrd)]
pub enum AlertMode {
    /// Comparator mode: the alert asserts while the temperature is outside
    /// the limits (default).
    Comparator,

    /// Interrupt mode: the alert asserts per exceeding conversion.
    Interrupt,
}

/// Alert polarity.
#[bitsize(1)]
#[derive(Debug, FromBits, PartialEq, PartialOrd)]
pub enum Polarity {
    /// Alert is active low (default).
    ActiveLow,

    /// Alert is active high.
    ActiveHigh,
}

/// Fault queue depth: consecutive out-of-limit conversions required before
/// the alert condition asserts.
#[bitsize(2)]
#[derive(Debug, FromBits, PartialEq, PartialOrd)]
pub enum FaultQueue {
    /// 1 fault (default).
    One,

    /// 2 faults.
    Two,

    /// 4 faults.
    Four,

    /// 6 faults.
    Six,
}

/// Cause of the most recent alert, as reported through the alert response
/// address.
#[derive(Debug, PartialEq, Eq)]
pub enum AlertCause {
    /// Temperature fell below the low limit.
    LowLimit,

    /// Temperature exceeded the high limit.
    HighLimit,
}

/// Decode a temperature result or limit register into degrees Celsius.
///
/// The significant field occupies the top 12 bits (normal mode) or 13 bits
/// (extended mode) and is a two's-complement value in 0.0625 degree steps.
pub fn to_celsius(raw: u16, mode: ExtendedMode) -> f32 {
    let (field, sign_bit, mask) = match mode {
        ExtendedMode::Normal => (raw >> 4, 0x800, 0xfff),
        ExtendedMode::Extended => (raw >> 3, 0x1000, 0x1fff),
    };

    if field & sign_bit == 0 {
        f32::from(field) * CELSIUS_PER_BIT
    } else {
        -f32::from(field.wrapping_neg() & mask) * CELSIUS_PER_BIT
    }
}

/// Encode degrees Celsius into a left-justified limit register value.
///
/// The value is rounded to the nearest 0.0625 degree step, truncated to the
/// field width of the given mode and shifted into place; the reserved low
/// bits of the register are cleared.
pub fn to_raw(celsius: f32, mode: ExtendedMode) -> u16 {
    let scaled = celsius / CELSIUS_PER_BIT;
    let ticks = (if scaled < 0.0 { scaled - 0.5 } else { scaled + 0.5 }) as i16;

    match mode {
        ExtendedMode::Normal => ((ticks as u16) & 0xfff) << 4,
        ExtendedMode::Extended => ((ticks as u16) & 0x1fff) << 3,
    }
}
