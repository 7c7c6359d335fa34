//! This is a platform-agnostic Rust driver for the TMP110 temperature sensor
//! based on the [`embedded-hal`] traits.
//!
//! [`embedded-hal`]: https://docs.rs/embedded-hal
//!
//! The TMP110 exposes four 16-bit registers over I2C: the temperature result,
//! the configuration register and the two alert limit registers. Every driver
//! operation is a read or a read-modify-write of those registers; no register
//! contents are cached between calls, so the device itself is the single
//! source of truth.
//!
//! Read-modify-write sequences are not atomic at the bus level. Callers must
//! not issue operations against the same device from multiple execution
//! contexts; keep one owner per device handle.

#![doc(html_root_url = "https://docs.rs/tmp110/latest")]
#![doc = include_str!("../README.md")]
#![cfg_attr(not(test), no_std)]

mod registers;
pub use registers::*;

#[cfg(feature = "async")]
pub mod asynchronous;

pub mod blocking;

/// Driver errors.
#[derive(Debug, PartialEq, Eq)]
pub enum Error<E> {
    /// I2C bus error.
    Bus(E),

    /// Pin-strap code outside the `0..=7` range.
    InvalidAddress,

    /// The device did not acknowledge the probe transaction.
    DeviceUnreachable,

    /// Field value outside its documented legal range. Reported before any
    /// bus transaction is issued.
    InvalidParameter,
}

/// ADD0 pin strapping representation.
///
/// TMP110D parts resolve their bus address from the net the ADD0 pin is tied
/// to; TMP110D0 through TMP110D3 carry a factory-fixed address instead.
#[derive(Debug, Clone, Copy)]
pub enum PinStrap {
    /// TMP110D with ADD0 tied to GND (default), address `0x44`.
    Gnd,
    /// TMP110D with ADD0 tied to V+, address `0x45`.
    Vplus,
    /// TMP110D with ADD0 tied to SDA, address `0x46`.
    Sda,
    /// TMP110D with ADD0 tied to SCL, address `0x47`.
    Scl,
    /// TMP110D0, address `0x44`.
    D0,
    /// TMP110D1, address `0x45`.
    D1,
    /// TMP110D2, address `0x46`.
    D2,
    /// TMP110D3, address `0x47`.
    D3,
}

impl Default for PinStrap {
    fn default() -> Self {
        Self::Gnd
    }
}

impl From<PinStrap> for u8 {
    fn from(strap: PinStrap) -> Self {
        match strap {
            PinStrap::Gnd => 0,
            PinStrap::Vplus => 1,
            PinStrap::Sda => 2,
            PinStrap::Scl => 3,
            PinStrap::D0 => 4,
            PinStrap::D1 => 5,
            PinStrap::D2 => 6,
            PinStrap::D3 => 7,
        }
    }
}

/// Resolve a pin-strap code to a 7-bit bus address.
///
/// Codes 4 through 7 alias the same addresses as 0 through 3; both branches
/// come straight from the datasheet address table.
pub(crate) fn bus_address(code: u8) -> Option<u8> {
    match code {
        0..=3 => Some(0x44 + code),
        4..=7 => Some(0x40 + code),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bus_address_table() {
        let expected: [u8; 8] = [0x44, 0x45, 0x46, 0x47, 0x44, 0x45, 0x46, 0x47];
        for (code, addr) in expected.iter().enumerate() {
            assert_eq!(bus_address(code as u8), Some(*addr));
        }
    }

    #[test]
    fn bus_address_out_of_range() {
        assert_eq!(bus_address(8), None);
        assert_eq!(bus_address(0xff), None);
    }

    #[test]
    fn pin_strap_codes() {
        assert_eq!(u8::from(PinStrap::Gnd), 0);
        assert_eq!(u8::from(PinStrap::Scl), 3);
        assert_eq!(u8::from(PinStrap::D0), 4);
        assert_eq!(u8::from(PinStrap::D3), 7);
    }
}
