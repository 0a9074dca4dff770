use crate::calibration::{Calibration, RawCalibration};
use crate::hw_def::*;
use crate::types::*;

use embedded_hal_async::{delay::DelayNs, i2c::I2c};

impl<I2C, Delay, E> Hts221Async<I2C, Delay>
where
    I2C: I2c<Error = E>,
    Delay: DelayNs,
{
    /// Create a new async HTS221 driver instance
    pub fn new(i2c: I2C, delay: Delay) -> Self {
        Self { i2c, delay }
    }

    /// Destroy the driver and return the bus and delay
    pub fn release(self) -> (I2C, Delay) {
        (self.i2c, self.delay)
    }

    async fn read_register(&mut self, reg: Register) -> Result<u8, E> {
        let mut buf = [0u8; 1];
        self.i2c.write_read(I2C_ADDRESS, &[reg.addr()], &mut buf).await?;
        trace!("hts221: read {:#x} = {:#x}", reg.addr(), buf[0]);
        Ok(buf[0])
    }

    async fn read_pair(&mut self, reg: Register) -> Result<[u8; 2], E> {
        let mut buf = [0u8; 2];
        self.i2c
            .write_read(I2C_ADDRESS, &[reg.addr_auto_increment()], &mut buf)
            .await?;
        Ok(buf)
    }

    async fn write_register(&mut self, reg: Register, value: u8) -> Result<(), E> {
        trace!("hts221: write {:#x} = {:#x}", reg.addr(), value);
        self.i2c.write(I2C_ADDRESS, &[reg.addr(), value]).await
    }

    /// Wait without blocking the executor, e.g. for a heater dwell
    pub async fn delay_ms(&mut self, ms: u32) {
        self.delay.delay_ms(ms).await;
    }

    /// Read the WHO_AM_I register, 0xBC on a genuine HTS221
    pub async fn who_am_i(&mut self) -> Result<u8, Error<E>> {
        self.read_register(Register::WhoAmI).await.map_err(Error::Configuration)
    }

    /// Write the averaging and control registers
    pub async fn configure(&mut self, config: &Configuration) -> Result<(), Error<E>> {
        self.write_register(Register::AvConf, config.av_conf())
            .await
            .map_err(Error::Configuration)?;
        self.write_register(Register::CtrlReg1, config.ctrl_reg1())
            .await
            .map_err(Error::Configuration)
    }

    /// Read the factory calibration and check it can be used for conversion
    pub async fn load_calibration(&mut self) -> Result<Calibration, Error<E>> {
        let raw = self.read_calibration_registers().await.map_err(Error::Calibration)?;
        raw.decode()
    }

    async fn read_calibration_registers(&mut self) -> Result<RawCalibration, E> {
        Ok(RawCalibration {
            h0_rh_x2: self.read_register(Register::H0RhX2).await?,
            h1_rh_x2: self.read_register(Register::H1RhX2).await?,
            h0_t0_out: self.read_pair(Register::H0T0Out).await?,
            h1_t0_out: self.read_pair(Register::H1T0Out).await?,
            t0_degc_x8: self.read_register(Register::T0DegCX8).await?,
            t1_degc_x8: self.read_register(Register::T1DegCX8).await?,
            t1_t0_msb: self.read_register(Register::T1T0Msb).await?,
            t0_out: self.read_pair(Register::T0Out).await?,
            t1_out: self.read_pair(Register::T1Out).await?,
        })
    }

    /// Read the raw humidity output
    pub async fn read_raw_humidity(&mut self) -> Result<u16, Error<E>> {
        let bytes = self
            .read_pair(Register::HumidityOut)
            .await
            .map_err(|e| Error::Bus(Register::HumidityOut, e))?;
        Ok(u16::from_le_bytes(bytes))
    }

    /// Read the raw temperature output
    pub async fn read_raw_temperature(&mut self) -> Result<u16, Error<E>> {
        let bytes = self
            .read_pair(Register::TempOut)
            .await
            .map_err(|e| Error::Bus(Register::TempOut, e))?;
        Ok(u16::from_le_bytes(bytes))
    }

    /// Read humidity then temperature
    pub async fn read_sample(&mut self) -> Result<RawSample, Error<E>> {
        Ok(RawSample {
            raw_humidity: self.read_raw_humidity().await?,
            raw_temperature: self.read_raw_temperature().await?,
        })
    }

    /// Whether the heater bit is set
    pub async fn heater_enabled(&mut self) -> Result<bool, Error<E>> {
        let ctrl = self.read_register(Register::CtrlReg2).await.map_err(Error::Heater)?;
        Ok(ctrl & HEATER_BIT != 0)
    }

    /// Set or clear the heater bit, leaving the rest of CTRL_REG2 untouched
    pub async fn set_heater(&mut self, enable: bool) -> Result<(), Error<E>> {
        let ctrl = self.read_register(Register::CtrlReg2).await.map_err(Error::Heater)?;
        let ctrl = if enable { ctrl | HEATER_BIT } else { ctrl & !HEATER_BIT };
        self.write_register(Register::CtrlReg2, ctrl).await.map_err(Error::Heater)
    }
}
