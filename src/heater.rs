//! Humidity element de-saturation.
//!
//! Prolonged exposure to high humidity degrades the accuracy of the capacitive element. While
//! the unclamped humidity stays above the saturation threshold, the controller pulses the
//! built-in heater for a fixed dwell, switches it off, and measures again.

use embedded_hal::{delay::DelayNs, i2c::I2c};

use crate::calibration::Calibration;
use crate::convert;
use crate::hw_def::*;
use crate::types::*;

/// Humidity above which the element is considered saturated, %RH
pub const SATURATION_THRESHOLD_PCT: f32 = 95.0;

/// How long the heater stays on per intervention cycle
pub const HEATER_DWELL_MS: u32 = 15_000;

/// Heater cycles attempted per poll before giving up
pub const MAX_HEATER_CYCLES: u8 = 8;

/// Heater intervention tunables
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HeaterConfig {
    pub(crate) threshold_pct: f32,
    pub(crate) dwell_ms: u32,
    pub(crate) max_cycles: u8,
}

impl Default for HeaterConfig {
    fn default() -> Self {
        Self {
            threshold_pct: SATURATION_THRESHOLD_PCT,
            dwell_ms: HEATER_DWELL_MS,
            max_cycles: MAX_HEATER_CYCLES,
        }
    }
}

impl HeaterConfig {
    /// Saturation threshold in %RH
    pub fn threshold_pct(mut self, threshold_pct: f32) -> Self {
        self.threshold_pct = threshold_pct;

        self
    }

    /// Heater on-time per cycle
    pub fn dwell_ms(mut self, dwell_ms: u32) -> Self {
        self.dwell_ms = dwell_ms;

        self
    }

    /// Upper bound on heater cycles per poll
    pub fn max_cycles(mut self, max_cycles: u8) -> Self {
        self.max_cycles = max_cycles;

        self
    }
}

/// Owns the heater bit of CTRL_REG2 and the intervention state
#[derive(Debug)]
pub struct HeaterController {
    state: HeaterState,
    config: HeaterConfig,
    // CTRL_REG2 as last read, so the disable can proceed when the read fails
    last_ctrl: Option<u8>,
}

impl HeaterController {
    /// New controller in `Idle`
    pub fn new(config: HeaterConfig) -> Self {
        Self { state: HeaterState::Idle, config, last_ctrl: None }
    }

    /// Current state
    pub fn state(&self) -> HeaterState {
        self.state
    }

    /// Active tunables
    pub fn config(&self) -> &HeaterConfig {
        &self.config
    }

    /// Whether an unclamped humidity calls for the heater
    pub fn is_saturated(&self, humidity_pct: f32) -> bool {
        humidity_pct > self.config.threshold_pct
    }

    /// Cycle the heater until humidity drops to the threshold or the cycle budget runs out.
    ///
    /// Returns the last unclamped humidity. The heater is off whenever this returns, except on
    /// `Error::HeaterStuck`, where the state stays `Heating` so the disable is retried by
    /// [`HeaterController::force_off`].
    pub fn desaturate<I2C, Delay, E>(
        &mut self,
        sensor: &mut Hts221<I2C, Delay>,
        calibration: &Calibration,
        humidity_pct: f32,
    ) -> Result<f32, Error<E>>
    where
        I2C: I2c<Error = E>,
        Delay: DelayNs,
    {
        let mut humidity_pct = humidity_pct;
        let mut cycles = 0u8;

        while self.is_saturated(humidity_pct) {
            if cycles == self.config.max_cycles {
                warn!("hts221: humidity {} %RH still saturated after {} heater cycles", humidity_pct, cycles);
                self.state = HeaterState::Idle;
                return Err(Error::SaturationUnresolved(humidity_pct));
            }
            cycles += 1;
            info!("hts221: humidity {} %RH above threshold, heater cycle {}", humidity_pct, cycles);

            self.heat(sensor);
            sensor.delay_ms(self.config.dwell_ms);
            self.cool(sensor)?;

            let raw = match sensor.read_raw_humidity() {
                Ok(raw) => raw,
                Err(e) => {
                    self.state = HeaterState::Idle;
                    return Err(e);
                }
            };
            humidity_pct = convert::humidity(raw, calibration);
        }

        self.state = HeaterState::Idle;
        Ok(humidity_pct)
    }

    /// Clear the heater bit and return to `Idle`
    pub fn force_off<I2C, Delay, E>(&mut self, sensor: &mut Hts221<I2C, Delay>) -> Result<(), Error<E>>
    where
        I2C: I2c<Error = E>,
        Delay: DelayNs,
    {
        self.state = HeaterState::Heating;
        self.cool(sensor)?;
        self.state = HeaterState::Idle;
        Ok(())
    }

    // Idle/Cooldown -> Heating. Failures are only logged, the disable must still follow.
    fn heat<I2C, Delay, E>(&mut self, sensor: &mut Hts221<I2C, Delay>)
    where
        I2C: I2c<Error = E>,
        Delay: DelayNs,
    {
        self.state = HeaterState::Heating;
        let ctrl = match sensor.read_register(Register::CtrlReg2) {
            Ok(ctrl) => ctrl,
            Err(_) => {
                warn!("hts221: heater enable failed: CTRL_REG2 read failed");
                return;
            }
        };
        self.last_ctrl = Some(ctrl);
        if sensor.write_register(Register::CtrlReg2, ctrl | HEATER_BIT).is_err() {
            warn!("hts221: heater enable failed: CTRL_REG2 write failed");
        }
    }

    // Heating -> Cooldown. Falls back to the last known CTRL_REG2 when it cannot be read.
    fn cool<I2C, Delay, E>(&mut self, sensor: &mut Hts221<I2C, Delay>) -> Result<(), Error<E>>
    where
        I2C: I2c<Error = E>,
        Delay: DelayNs,
    {
        let ctrl = match sensor.read_register(Register::CtrlReg2) {
            Ok(ctrl) => ctrl,
            Err(_) => {
                let fallback = self.last_ctrl.unwrap_or(CTRL_REG2_RESET);
                warn!("hts221: CTRL_REG2 read failed, disabling heater from {:#x}", fallback);
                fallback
            }
        };
        let ctrl = ctrl & !HEATER_BIT;
        match sensor.write_register(Register::CtrlReg2, ctrl) {
            Ok(()) => {
                self.last_ctrl = Some(ctrl);
                self.state = HeaterState::Cooldown;
                Ok(())
            }
            Err(e) => {
                error!("hts221: heater disable failed, heater may still be on");
                Err(Error::HeaterStuck(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::vec;
    use std::vec::Vec;

    use embedded_hal::i2c::ErrorKind;
    use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction};

    use super::*;
    use crate::testing::RecordingDelay;

    // humidity = raw / 100
    const CAL: Calibration = Calibration { h0: 0, h1: 100, h2: 0, h3: 10000, t0: 0, t1: 160, t2: 0, t3: 1000 };

    fn heater_cycle(ctrl: u8, humidity_raw: u16) -> Vec<Transaction> {
        vec![
            Transaction::write_read(I2C_ADDRESS, vec![0x21], vec![ctrl]),
            Transaction::write(I2C_ADDRESS, vec![0x21, ctrl | HEATER_BIT]),
            Transaction::write_read(I2C_ADDRESS, vec![0x21], vec![ctrl | HEATER_BIT]),
            Transaction::write(I2C_ADDRESS, vec![0x21, ctrl]),
            Transaction::write_read(I2C_ADDRESS, vec![0xA8], humidity_raw.to_le_bytes().to_vec()),
        ]
    }

    #[test]
    fn heats_until_humidity_drops() {
        let mut expectations = heater_cycle(0x00, 9700);
        expectations.extend(heater_cycle(0x00, 9400));
        let mut i2c = I2cMock::new(&expectations);
        let delay = RecordingDelay::default();
        let mut sensor = Hts221::new(i2c.clone(), delay.clone());
        let mut heater = HeaterController::new(HeaterConfig::default());

        let humidity = heater.desaturate(&mut sensor, &CAL, 96.0).unwrap();

        assert_eq!(humidity, 94.0);
        assert_eq!(heater.state(), HeaterState::Idle);
        assert!(!heater.state().heater_on());
        assert_eq!(delay.recorded(), vec![HEATER_DWELL_MS, HEATER_DWELL_MS]);
        i2c.done();
    }

    #[test]
    fn threshold_is_exclusive() {
        let expectations: [Transaction; 0] = [];
        let mut i2c = I2cMock::new(&expectations);
        let mut sensor = Hts221::new(i2c.clone(), RecordingDelay::default());
        let mut heater = HeaterController::new(HeaterConfig::default());

        assert_eq!(heater.desaturate(&mut sensor, &CAL, 95.0).unwrap(), 95.0);
        assert_eq!(heater.state(), HeaterState::Idle);
        i2c.done();
    }

    #[test]
    fn preserves_other_ctrl_reg2_bits() {
        let expectations = heater_cycle(0x81, 5000);
        let mut i2c = I2cMock::new(&expectations);
        let mut sensor = Hts221::new(i2c.clone(), RecordingDelay::default());
        let mut heater = HeaterController::new(HeaterConfig::default());

        assert_eq!(heater.desaturate(&mut sensor, &CAL, 99.5).unwrap(), 50.0);
        i2c.done();
    }

    #[test]
    fn enable_failure_still_dwells_and_disables() {
        let expectations = [
            Transaction::write_read(I2C_ADDRESS, vec![0x21], vec![0x00]).with_error(ErrorKind::Other),
            Transaction::write_read(I2C_ADDRESS, vec![0x21], vec![0x00]),
            Transaction::write(I2C_ADDRESS, vec![0x21, 0x00]),
            Transaction::write_read(I2C_ADDRESS, vec![0xA8], 9000u16.to_le_bytes().to_vec()),
        ];
        let mut i2c = I2cMock::new(&expectations);
        let delay = RecordingDelay::default();
        let mut sensor = Hts221::new(i2c.clone(), delay.clone());
        let mut heater = HeaterController::new(HeaterConfig::default());

        assert_eq!(heater.desaturate(&mut sensor, &CAL, 97.0).unwrap(), 90.0);
        assert_eq!(delay.recorded(), vec![HEATER_DWELL_MS]);
        assert_eq!(heater.state(), HeaterState::Idle);
        i2c.done();
    }

    #[test]
    fn disable_falls_back_to_last_known_ctrl_reg2() {
        let expectations = [
            Transaction::write_read(I2C_ADDRESS, vec![0x21], vec![0x81]),
            Transaction::write(I2C_ADDRESS, vec![0x21, 0x83]),
            Transaction::write_read(I2C_ADDRESS, vec![0x21], vec![0x83]).with_error(ErrorKind::Other),
            Transaction::write(I2C_ADDRESS, vec![0x21, 0x81]),
            Transaction::write_read(I2C_ADDRESS, vec![0xA8], 9000u16.to_le_bytes().to_vec()),
        ];
        let mut i2c = I2cMock::new(&expectations);
        let mut sensor = Hts221::new(i2c.clone(), RecordingDelay::default());
        let mut heater = HeaterController::new(HeaterConfig::default());

        assert_eq!(heater.desaturate(&mut sensor, &CAL, 97.0).unwrap(), 90.0);
        i2c.done();
    }

    #[test]
    fn stuck_heater_is_surfaced_and_retried() {
        let expectations = [
            Transaction::write_read(I2C_ADDRESS, vec![0x21], vec![0x00]),
            Transaction::write(I2C_ADDRESS, vec![0x21, 0x02]),
            Transaction::write_read(I2C_ADDRESS, vec![0x21], vec![0x02]),
            Transaction::write(I2C_ADDRESS, vec![0x21, 0x00]).with_error(ErrorKind::Other),
            // force_off
            Transaction::write_read(I2C_ADDRESS, vec![0x21], vec![0x02]),
            Transaction::write(I2C_ADDRESS, vec![0x21, 0x00]),
        ];
        let mut i2c = I2cMock::new(&expectations);
        let mut sensor = Hts221::new(i2c.clone(), RecordingDelay::default());
        let mut heater = HeaterController::new(HeaterConfig::default());

        assert!(matches!(
            heater.desaturate(&mut sensor, &CAL, 97.0),
            Err(Error::HeaterStuck(ErrorKind::Other))
        ));
        assert_eq!(heater.state(), HeaterState::Heating);

        heater.force_off(&mut sensor).unwrap();
        assert_eq!(heater.state(), HeaterState::Idle);
        i2c.done();
    }

    #[test]
    fn gives_up_after_cycle_budget() {
        let mut expectations = heater_cycle(0x00, 9900);
        expectations.extend(heater_cycle(0x00, 9900));
        let mut i2c = I2cMock::new(&expectations);
        let delay = RecordingDelay::default();
        let mut sensor = Hts221::new(i2c.clone(), delay.clone());
        let mut heater = HeaterController::new(HeaterConfig::default().max_cycles(2).dwell_ms(30_000));

        let result = heater.desaturate(&mut sensor, &CAL, 99.0);
        assert!(matches!(result, Err(Error::SaturationUnresolved(h)) if h == 99.0));
        assert_eq!(heater.state(), HeaterState::Idle);
        assert_eq!(delay.recorded(), vec![30_000, 30_000]);
        i2c.done();
    }

    #[test]
    fn humidity_read_failure_leaves_heater_idle() {
        let mut expectations = heater_cycle(0x00, 0);
        let last = expectations.pop().unwrap();
        expectations.push(last.with_error(ErrorKind::Other));
        let mut i2c = I2cMock::new(&expectations);
        let mut sensor = Hts221::new(i2c.clone(), RecordingDelay::default());
        let mut heater = HeaterController::new(HeaterConfig::default());

        assert!(matches!(
            heater.desaturate(&mut sensor, &CAL, 97.0),
            Err(Error::Bus(Register::HumidityOut, ErrorKind::Other))
        ));
        assert_eq!(heater.state(), HeaterState::Idle);
        i2c.done();
    }
}
