use crate::calibration::{Calibration, RawCalibration};
use crate::hw_def::*;
use crate::types::*;

use embedded_hal::{delay::DelayNs, i2c::I2c};

impl<I2C, Delay, E> Hts221<I2C, Delay>
where
    I2C: I2c<Error = E>,
    Delay: DelayNs,
{
    /// Create a new HTS221 driver instance
    pub fn new(i2c: I2C, delay: Delay) -> Self {
        Self { i2c, delay }
    }

    /// Destroy the driver and return the bus and delay
    pub fn release(self) -> (I2C, Delay) {
        (self.i2c, self.delay)
    }

    pub(crate) fn read_register(&mut self, reg: Register) -> Result<u8, E> {
        let mut buf = [0u8; 1];
        self.i2c.write_read(I2C_ADDRESS, &[reg.addr()], &mut buf)?;
        trace!("hts221: read {:#x} = {:#x}", reg.addr(), buf[0]);
        Ok(buf[0])
    }

    /// Two consecutive registers in one auto-increment read, low byte first
    pub(crate) fn read_pair(&mut self, reg: Register) -> Result<[u8; 2], E> {
        let mut buf = [0u8; 2];
        self.i2c.write_read(I2C_ADDRESS, &[reg.addr_auto_increment()], &mut buf)?;
        trace!("hts221: read {:#x} = [{:#x}, {:#x}]", reg.addr(), buf[0], buf[1]);
        Ok(buf)
    }

    pub(crate) fn write_register(&mut self, reg: Register, value: u8) -> Result<(), E> {
        trace!("hts221: write {:#x} = {:#x}", reg.addr(), value);
        self.i2c.write(I2C_ADDRESS, &[reg.addr(), value])
    }

    pub(crate) fn delay_ms(&mut self, ms: u32) {
        self.delay.delay_ms(ms);
    }

    /// Read the WHO_AM_I register, 0xBC on a genuine HTS221
    pub fn who_am_i(&mut self) -> Result<u8, Error<E>> {
        self.read_register(Register::WhoAmI).map_err(Error::Configuration)
    }

    /// Write the averaging and control registers
    pub fn configure(&mut self, config: &Configuration) -> Result<(), Error<E>> {
        self.write_register(Register::AvConf, config.av_conf())
            .map_err(Error::Configuration)?;
        self.write_register(Register::CtrlReg1, config.ctrl_reg1())
            .map_err(Error::Configuration)?;
        debug!("hts221: configured av_conf={:#x} ctrl_reg1={:#x}", config.av_conf(), config.ctrl_reg1());
        Ok(())
    }

    /// Read the factory calibration and check it can be used for conversion
    pub fn load_calibration(&mut self) -> Result<Calibration, Error<E>> {
        let raw = self.read_calibration_registers().map_err(Error::Calibration)?;
        let calibration = raw.decode()?;
        debug!(
            "hts221: calibration h0={} h1={} h2={} h3={} t0={} t1={} t2={} t3={}",
            calibration.h0, calibration.h1, calibration.h2, calibration.h3,
            calibration.t0, calibration.t1, calibration.t2, calibration.t3
        );
        Ok(calibration)
    }

    fn read_calibration_registers(&mut self) -> Result<RawCalibration, E> {
        Ok(RawCalibration {
            h0_rh_x2: self.read_register(Register::H0RhX2)?,
            h1_rh_x2: self.read_register(Register::H1RhX2)?,
            h0_t0_out: self.read_pair(Register::H0T0Out)?,
            h1_t0_out: self.read_pair(Register::H1T0Out)?,
            t0_degc_x8: self.read_register(Register::T0DegCX8)?,
            t1_degc_x8: self.read_register(Register::T1DegCX8)?,
            t1_t0_msb: self.read_register(Register::T1T0Msb)?,
            t0_out: self.read_pair(Register::T0Out)?,
            t1_out: self.read_pair(Register::T1Out)?,
        })
    }

    /// Read the raw humidity output
    pub fn read_raw_humidity(&mut self) -> Result<u16, Error<E>> {
        let bytes = self
            .read_pair(Register::HumidityOut)
            .map_err(|e| Error::Bus(Register::HumidityOut, e))?;
        Ok(u16::from_le_bytes(bytes))
    }

    /// Read the raw temperature output
    pub fn read_raw_temperature(&mut self) -> Result<u16, Error<E>> {
        let bytes = self
            .read_pair(Register::TempOut)
            .map_err(|e| Error::Bus(Register::TempOut, e))?;
        Ok(u16::from_le_bytes(bytes))
    }

    /// Read humidity then temperature
    pub fn read_sample(&mut self) -> Result<RawSample, Error<E>> {
        Ok(RawSample {
            raw_humidity: self.read_raw_humidity()?,
            raw_temperature: self.read_raw_temperature()?,
        })
    }

    /// Whether the heater bit is set
    pub fn heater_enabled(&mut self) -> Result<bool, Error<E>> {
        let ctrl = self.read_register(Register::CtrlReg2).map_err(Error::Heater)?;
        Ok(ctrl & HEATER_BIT != 0)
    }

    /// Set or clear the heater bit, leaving the rest of CTRL_REG2 untouched
    pub fn set_heater(&mut self, enable: bool) -> Result<(), Error<E>> {
        let ctrl = self.read_register(Register::CtrlReg2).map_err(Error::Heater)?;
        let ctrl = if enable { ctrl | HEATER_BIT } else { ctrl & !HEATER_BIT };
        self.write_register(Register::CtrlReg2, ctrl).map_err(Error::Heater)
    }
}
