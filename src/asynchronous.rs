//! Tmp110 Async API

use bilge::prelude::*;

use super::registers::{ALERT_CAUSE, GENERAL_CALL, RESET_COMMAND};
use super::{
    bus_address, to_celsius, to_raw, AlertCause, AlertMode, Configuration, ConversionRate, Error,
    ExtendedMode, FaultQueue, Polarity, Register,
};

/// TMP110 asynchronous device driver
pub struct Tmp110<I2C: embedded_hal_async::i2c::I2c> {
    /// The concrete I2C bus implementation
    i2c: I2C,

    /// The resolved 7-bit I2C address.
    pub(crate) addr: u8,
}

impl<I2C: embedded_hal_async::i2c::I2c> Tmp110<I2C> {
    /// Open a TMP110 identified by its pin-strap code.
    ///
    /// `pin` is either a raw strap code in `0..=7` or a [`PinStrap`] value.
    /// The device is probed with a zero-length transmission before the
    /// handle is returned.
    ///
    /// [`PinStrap`]: crate::PinStrap
    ///
    /// # Errors
    ///
    /// `Error::InvalidAddress` when the code lies outside `0..=7` (checked
    /// before any bus traffic), `Error::DeviceUnreachable` when the probe is
    /// not acknowledged.
    pub async fn open(mut i2c: I2C, pin: impl Into<u8>) -> Result<Self, Error<I2C::Error>> {
        let addr = bus_address(pin.into()).ok_or(Error::InvalidAddress)?;
        i2c.write(addr, &[]).await.map_err(|_| Error::DeviceUnreachable)?;

        Ok(Self { i2c, addr })
    }

    /// Destroy the driver instance, return the I2C bus instance.
    pub fn destroy(self) -> I2C {
        self.i2c
    }

    /// Read configuration register
    ///
    /// # Errors
    ///
    /// `Error::Bus` when the I2C transaction fails
    pub async fn configuration(&mut self) -> Result<Configuration, Error<I2C::Error>> {
        let raw = self.read(Register::Configuration).await?;
        Ok(Configuration::from(raw))
    }

    /// Set configuration register
    ///
    /// # Errors
    ///
    /// `Error::Bus` when the I2C transaction fails
    pub async fn set_configuration(&mut self, config: Configuration) -> Result<(), Error<I2C::Error>> {
        self.write(Register::Configuration, config.into()).await
    }

    /// Read the latest conversion result in degrees Celsius.
    ///
    /// The configuration register is consulted first so the result is decoded
    /// with the width of the currently active mode.
    ///
    /// # Errors
    ///
    /// `Error::Bus` when an I2C transaction fails
    pub async fn read_temperature(&mut self) -> Result<f32, Error<I2C::Error>> {
        let mode = self.configuration().await?.em();
        let raw = self.read(Register::Temperature).await?;
        Ok(to_celsius(raw, mode))
    }

    /// Trigger a single conversion: enter shutdown, then set the one-shot
    /// bit. The device returns to shutdown by itself once the conversion
    /// completes.
    ///
    /// # Errors
    ///
    /// `Error::Bus` when an I2C transaction fails. A failure after the
    /// shutdown step leaves the device shut down; nothing is rolled back.
    pub async fn one_shot(&mut self) -> Result<(), Error<I2C::Error>> {
        self.shutdown().await?;
        let config = self.configuration().await?.with_os(true);
        self.set_configuration(config).await
    }

    /// Place device in shutdown mode.
    ///
    /// # Errors
    ///
    /// `Error::Bus` when an I2C transaction fails
    pub async fn shutdown(&mut self) -> Result<(), Error<I2C::Error>> {
        let config = self.configuration().await?.with_sd(true);
        self.set_configuration(config).await
    }

    /// Resume continuous conversions.
    ///
    /// # Errors
    ///
    /// `Error::Bus` when an I2C transaction fails
    pub async fn continuous_conversion(&mut self) -> Result<(), Error<I2C::Error>> {
        let config = self.configuration().await?.with_sd(false);
        self.set_configuration(config).await
    }

    /// Reset all registers to their power-on defaults by issuing the
    /// general-call reset command. The device comes back up in continuous
    /// conversion mode.
    ///
    /// # Errors
    ///
    /// `Error::Bus` when the I2C transaction fails
    pub async fn reset(&mut self) -> Result<(), Error<I2C::Error>> {
        self.i2c
            .write(GENERAL_CALL, &[RESET_COMMAND])
            .await
            .map_err(Error::Bus)
    }

    /// Set the conversion rate (0 = 0.25Hz, 1 = 1Hz, 2 = 4Hz, 3 = 8Hz).
    ///
    /// # Errors
    ///
    /// `Error::InvalidParameter` when `rate` exceeds 3 (no write is issued),
    /// `Error::Bus` when an I2C transaction fails
    pub async fn set_conversion_rate(&mut self, rate: u8) -> Result<(), Error<I2C::Error>> {
        if rate > 3 {
            return Err(Error::InvalidParameter);
        }

        let config = self.configuration().await?.with_cr(ConversionRate::from(u2::new(rate)));
        self.set_configuration(config).await
    }

    /// Set the fault queue depth (0 = 1 fault, 1 = 2, 2 = 4, 3 = 6).
    ///
    /// # Errors
    ///
    /// `Error::InvalidParameter` when `faults` exceeds 3 (no write is
    /// issued), `Error::Bus` when an I2C transaction fails
    pub async fn set_fault(&mut self, faults: u8) -> Result<(), Error<I2C::Error>> {
        if faults > 3 {
            return Err(Error::InvalidParameter);
        }

        let config = self.configuration().await?.with_fq(FaultQueue::from(u2::new(faults)));
        self.set_configuration(config).await
    }

    /// Set the alert polarity (0 = active low, 1 = active high).
    ///
    /// # Errors
    ///
    /// `Error::InvalidParameter` when `polarity` exceeds 1 (no write is
    /// issued), `Error::Bus` when an I2C transaction fails
    pub async fn set_polarity(&mut self, polarity: u8) -> Result<(), Error<I2C::Error>> {
        if polarity > 1 {
            return Err(Error::InvalidParameter);
        }

        let config = self.configuration().await?.with_pol(Polarity::from(u1::new(polarity)));
        self.set_configuration(config).await
    }

    /// Set the alert mode (0 = comparator, 1 = interrupt).
    ///
    /// # Errors
    ///
    /// `Error::InvalidParameter` when `mode` exceeds 1 (no write is issued),
    /// `Error::Bus` when an I2C transaction fails
    pub async fn set_alert_mode(&mut self, mode: u8) -> Result<(), Error<I2C::Error>> {
        if mode > 1 {
            return Err(Error::InvalidParameter);
        }

        let config = self.configuration().await?.with_tm(AlertMode::from(u1::new(mode)));
        self.set_configuration(config).await
    }

    /// Switch between the 12-bit and 13-bit temperature representations
    /// (0 = normal, 1 = extended).
    ///
    /// The limit registers are encoded with the width of the active mode, so
    /// both limits must be supplied and are rewritten after the switch. All
    /// three writes are attempted even when an earlier one fails; the first
    /// failure is reported and applied steps are not rolled back.
    ///
    /// # Errors
    ///
    /// `Error::InvalidParameter` when `mode` exceeds 1 (no write is issued),
    /// `Error::Bus` when an I2C transaction fails
    pub async fn set_extended_mode(&mut self, mode: u8, high: f32, low: f32) -> Result<(), Error<I2C::Error>> {
        if mode > 1 {
            return Err(Error::InvalidParameter);
        }

        let switched = match self.configuration().await {
            Ok(config) => {
                self.set_configuration(config.with_em(ExtendedMode::from(u1::new(mode))))
                    .await
            }
            Err(e) => Err(e),
        };
        let high = self.set_high_limit(high).await;
        let low = self.set_low_limit(low).await;

        switched.and(high).and(low)
    }

    /// Read the temperature high limit in degrees Celsius.
    ///
    /// # Errors
    ///
    /// `Error::Bus` when an I2C transaction fails
    pub async fn high_limit(&mut self) -> Result<f32, Error<I2C::Error>> {
        let mode = self.configuration().await?.em();
        let raw = self.read(Register::HighLimit).await?;
        Ok(to_celsius(raw, mode))
    }

    /// Set the temperature high limit in degrees Celsius.
    ///
    /// # Errors
    ///
    /// `Error::Bus` when an I2C transaction fails
    pub async fn set_high_limit(&mut self, limit: f32) -> Result<(), Error<I2C::Error>> {
        let mode = self.configuration().await?.em();
        self.write(Register::HighLimit, to_raw(limit, mode)).await
    }

    /// Read the temperature low limit in degrees Celsius.
    ///
    /// # Errors
    ///
    /// `Error::Bus` when an I2C transaction fails
    pub async fn low_limit(&mut self) -> Result<f32, Error<I2C::Error>> {
        let mode = self.configuration().await?.em();
        let raw = self.read(Register::LowLimit).await?;
        Ok(to_celsius(raw, mode))
    }

    /// Set the temperature low limit in degrees Celsius.
    ///
    /// # Errors
    ///
    /// `Error::Bus` when an I2C transaction fails
    pub async fn set_low_limit(&mut self, limit: f32) -> Result<(), Error<I2C::Error>> {
        let mode = self.configuration().await?.em();
        self.write(Register::LowLimit, to_raw(limit, mode)).await
    }

    /// Whether the alert condition is currently asserted.
    ///
    /// The raw alert flag is qualified by the configured polarity; the flag
    /// bit alone does not indicate an excursion.
    ///
    /// # Errors
    ///
    /// `Error::Bus` when the I2C transaction fails
    pub async fn check_alert(&mut self) -> Result<bool, Error<I2C::Error>> {
        let config = self.configuration().await?;
        Ok(config.al() && config.pol() == Polarity::ActiveHigh)
    }

    /// Which limit triggered the most recent alert.
    ///
    /// Reads the alert response pseudo-register and normalizes the returned
    /// bit against the configured polarity, so the reported cause does not
    /// depend on the alert line configuration.
    ///
    /// # Errors
    ///
    /// `Error::Bus` when an I2C transaction fails
    pub async fn alert_cause(&mut self) -> Result<AlertCause, Error<I2C::Error>> {
        let mut byte = [0];
        self.i2c
            .write_read(self.addr, &[ALERT_CAUSE], &mut byte)
            .await
            .map_err(Error::Bus)?;

        let flag = byte[0] & 0x01 != 0;
        let polarity = self.configuration().await?.pol() == Polarity::ActiveHigh;

        if polarity == flag {
            Ok(AlertCause::HighLimit)
        } else {
            Ok(AlertCause::LowLimit)
        }
    }

    async fn read(&mut self, reg: Register) -> Result<u16, Error<I2C::Error>> {
        let mut bytes = [0; 2];
        self.i2c
            .write_read(self.addr, &[reg.into()], &mut bytes)
            .await
            .map_err(Error::Bus)?;
        Ok(u16::from_be_bytes(bytes))
    }

    async fn write(&mut self, reg: Register, value: u16) -> Result<(), Error<I2C::Error>> {
        let mut data = [0; 3];

        data[0] = reg.into();
        data[1..].copy_from_slice(&value.to_be_bytes());

        self.i2c.write(self.addr, &data).await.map_err(Error::Bus)
    }
}

#[cfg(test)]
mod tests {
    use assert_approx_eq::assert_approx_eq;
    use embedded_hal_mock::eh1::i2c::{Mock, Transaction};

    use super::*;
    use crate::PinStrap;

    async fn probed(expectations: &[Transaction]) -> Tmp110<Mock> {
        let mut all = vec![Transaction::write(0x44, vec![])];
        all.extend_from_slice(expectations);
        Tmp110::open(Mock::new(&all), 0u8).await.unwrap()
    }

    fn finish(tmp: Tmp110<Mock>) {
        let mut mock = tmp.destroy();
        mock.done();
    }

    #[tokio::test]
    async fn open_resolves_strap_code_addresses() {
        let expected: [u8; 8] = [0x44, 0x45, 0x46, 0x47, 0x44, 0x45, 0x46, 0x47];

        for (code, addr) in expected.iter().enumerate() {
            let expectations = [Transaction::write(*addr, vec![])];
            let mock = Mock::new(&expectations);
            let tmp = Tmp110::open(mock, code as u8).await.unwrap();
            assert_eq!(tmp.addr, *addr);
            finish(tmp);
        }
    }

    #[tokio::test]
    async fn open_accepts_pin_straps() {
        let expectations = [Transaction::write(0x45, vec![])];
        let mock = Mock::new(&expectations);
        let tmp = Tmp110::open(mock, PinStrap::Vplus).await.unwrap();
        assert_eq!(tmp.addr, 0x45);
        finish(tmp);
    }

    #[tokio::test]
    async fn read_temperature_in_both_modes() {
        let mut tmp = probed(&[
            Transaction::write_read(0x44, vec![0x01], vec![0x60, 0xa0]),
            Transaction::write_read(0x44, vec![0x00], vec![0x7f, 0xf0]),
            Transaction::write_read(0x44, vec![0x01], vec![0x60, 0xb0]),
            Transaction::write_read(0x44, vec![0x00], vec![0x4b, 0x00]),
        ])
        .await;

        assert_approx_eq!(tmp.read_temperature().await.unwrap(), 127.9375, 1e-4);
        assert_approx_eq!(tmp.read_temperature().await.unwrap(), 150.0, 1e-4);
        finish(tmp);
    }

    #[tokio::test]
    async fn one_shot_sequences_shutdown_then_trigger() {
        let mut tmp = probed(&[
            Transaction::write_read(0x44, vec![0x01], vec![0x60, 0xa0]),
            Transaction::write(0x44, vec![0x01, 0x61, 0xa0]),
            Transaction::write_read(0x44, vec![0x01], vec![0x61, 0xa0]),
            Transaction::write(0x44, vec![0x01, 0xe1, 0xa0]),
        ])
        .await;

        tmp.one_shot().await.unwrap();
        finish(tmp);
    }

    #[tokio::test]
    async fn set_extended_mode_rewrites_both_limits_with_new_width() {
        let mut tmp = probed(&[
            Transaction::write_read(0x44, vec![0x01], vec![0x60, 0xa0]),
            Transaction::write(0x44, vec![0x01, 0x60, 0xb0]),
            Transaction::write_read(0x44, vec![0x01], vec![0x60, 0xb0]),
            Transaction::write(0x44, vec![0x03, 0x28, 0x00]),
            Transaction::write_read(0x44, vec![0x01], vec![0x60, 0xb0]),
            Transaction::write(0x44, vec![0x02, 0x0c, 0x80]),
        ])
        .await;

        tmp.set_extended_mode(1, 80.0, 25.0).await.unwrap();
        finish(tmp);
    }

    #[tokio::test]
    async fn set_conversion_rate_rejects_out_of_range_without_write() {
        let mut tmp = probed(&[]).await;

        let result = tmp.set_conversion_rate(5).await;
        assert!(matches!(result, Err(Error::InvalidParameter)));
        finish(tmp);
    }

    #[tokio::test]
    async fn alert_cause_is_normalized_against_polarity() {
        let mut tmp = probed(&[
            Transaction::write_read(0x44, vec![0x19], vec![0x01]),
            Transaction::write_read(0x44, vec![0x01], vec![0x64, 0xa0]),
        ])
        .await;

        assert_eq!(tmp.alert_cause().await.unwrap(), AlertCause::HighLimit);
        finish(tmp);
    }

    #[tokio::test]
    async fn reset_issues_general_call_command() {
        let mut tmp = probed(&[Transaction::write(0x00, vec![0x06])]).await;

        tmp.reset().await.unwrap();
        finish(tmp);
    }
}
