//! Polling monitor.
//!
//! One cycle reads humidity, runs the heater intervention when the element is saturated,
//! reads temperature, and emits the converted reading. Start-up failures are returned to the
//! caller. Failures inside a cycle are logged and the next cycle runs on schedule.

use core::fmt;
use core::sync::atomic::{AtomicBool, Ordering};

use embedded_hal::{delay::DelayNs, i2c::I2c};

use crate::calibration::Calibration;
use crate::convert;
use crate::heater::{HeaterConfig, HeaterController};
use crate::hw_def::*;
use crate::sink::ReadingSink;
use crate::types::*;

/// Time between the end of one poll and the start of the next
pub const POLL_INTERVAL_MS: u32 = 10_000;

/// Monitor tunables
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MonitorConfig {
    pub(crate) sensor: Configuration,
    pub(crate) heater: HeaterConfig,
    pub(crate) poll_interval_ms: u32,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            sensor: Configuration::default(),
            heater: HeaterConfig::default(),
            poll_interval_ms: POLL_INTERVAL_MS,
        }
    }
}

impl MonitorConfig {
    /// Register settings written at start-up
    pub fn sensor(mut self, sensor: Configuration) -> Self {
        self.sensor = sensor;

        self
    }

    /// Heater intervention settings
    pub fn heater(mut self, heater: HeaterConfig) -> Self {
        self.heater = heater;

        self
    }

    /// Sleep between polls
    pub fn poll_interval_ms(mut self, poll_interval_ms: u32) -> Self {
        self.poll_interval_ms = poll_interval_ms;

        self
    }
}

/// Why a poll cycle produced no reading
#[derive(Debug)]
pub enum CycleError<E, S> {
    /// The sensor or the heater failed
    Sensor(Error<E>),
    /// The sink rejected the reading
    Output(S),
}

impl<E, S> CycleError<E, S> {
    /// Short description of the error kind
    pub fn as_str(&self) -> &'static str {
        match self {
            CycleError::Sensor(e) => e.as_str(),
            CycleError::Output(_) => "output sink failed",
        }
    }
}

impl<E, S> From<Error<E>> for CycleError<E, S> {
    fn from(e: Error<E>) -> Self {
        CycleError::Sensor(e)
    }
}

impl<E: fmt::Debug, S: fmt::Debug> fmt::Display for CycleError<E, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CycleError::Sensor(e) => write!(f, "{}", e),
            CycleError::Output(e) => write!(f, "{}: {:?}", self.as_str(), e),
        }
    }
}

/// Sensor, calibration, heater and sink for one HTS221
pub struct Monitor<I2C, Delay, S> {
    sensor: Hts221<I2C, Delay>,
    calibration: Calibration,
    heater: HeaterController,
    sink: S,
    config: MonitorConfig,
}

impl<I2C, Delay, E, S> Monitor<I2C, Delay, S>
where
    I2C: I2c<Error = E>,
    Delay: DelayNs,
    S: ReadingSink,
{
    /// Identify, configure and calibrate the sensor.
    ///
    /// The heater bit is cleared as part of start-up, in case a previous process was stopped
    /// while heating.
    pub fn start(mut sensor: Hts221<I2C, Delay>, sink: S, config: MonitorConfig) -> Result<Self, Error<E>> {
        let id = sensor.who_am_i()?;
        if id != WHO_AM_I_VALUE {
            error!("hts221: WHO_AM_I {:#x}, expected {:#x}", id, WHO_AM_I_VALUE);
            return Err(Error::UnexpectedDevice(id));
        }

        sensor.configure(&config.sensor)?;

        let mut heater = HeaterController::new(config.heater);
        heater.force_off(&mut sensor).map_err(|e| match e {
            Error::HeaterStuck(e) => Error::Configuration(e),
            other => other,
        })?;

        let calibration = sensor.load_calibration()?;
        info!("hts221: monitor started, polling every {} ms", config.poll_interval_ms);

        Ok(Self { sensor, calibration, heater, sink, config })
    }

    /// Calibration loaded at start-up
    pub fn calibration(&self) -> &Calibration {
        &self.calibration
    }

    /// Heater intervention state
    pub fn heater_state(&self) -> HeaterState {
        self.heater.state()
    }

    /// Active configuration
    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Sink receiving readings
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Run one measurement cycle and emit its reading
    pub fn poll_once(&mut self) -> Result<PhysicalReading, CycleError<E, S::Error>> {
        if self.heater.state() != HeaterState::Idle {
            warn!("hts221: heater not idle at start of cycle, disabling");
            self.heater.force_off(&mut self.sensor)?;
        }

        let raw_humidity = self.sensor.read_raw_humidity()?;
        let mut humidity_pct = convert::humidity(raw_humidity, &self.calibration);
        if self.heater.is_saturated(humidity_pct) {
            humidity_pct = match self.heater.desaturate(&mut self.sensor, &self.calibration, humidity_pct) {
                Ok(humidity_pct) => humidity_pct,
                // the heater is off, report what the element reads
                Err(Error::SaturationUnresolved(humidity_pct)) => {
                    warn!("hts221: {} %RH, reporting without de-saturation", humidity_pct);
                    humidity_pct
                }
                Err(e) => return Err(e.into()),
            };
        }

        let raw_temperature = self.sensor.read_raw_temperature()?;
        let temp_c = convert::temperature_celsius(raw_temperature, &self.calibration);
        let reading = PhysicalReading {
            humidity_pct,
            temp_c,
            temp_f: convert::temperature_fahrenheit(temp_c),
        };

        self.sink.emit(&reading).map_err(CycleError::Output)?;
        debug!("hts221: {} %RH, {} C", reading.reported_humidity(), reading.temp_c);
        Ok(reading)
    }

    /// Poll forever
    pub fn run(&mut self) -> ! {
        loop {
            self.cycle();
        }
    }

    /// Poll until `stop` is set, checked once per cycle
    pub fn run_until(&mut self, stop: &AtomicBool) {
        while !stop.load(Ordering::Relaxed) {
            self.cycle();
        }
        info!("hts221: monitor stopped");
    }

    fn cycle(&mut self) {
        if let Err(err) = self.poll_once() {
            match &err {
                CycleError::Sensor(e) => match e.register() {
                    Some(register) => warn!("hts221: poll skipped: {} ({})", e.as_str(), register.name()),
                    None => warn!("hts221: poll skipped: {}", e.as_str()),
                },
                CycleError::Output(_) => warn!("hts221: poll skipped: {}", err.as_str()),
            }
        }
        self.sensor.delay_ms(self.config.poll_interval_ms);
    }

    /// Make sure the heater is off before the process exits
    pub fn shutdown(&mut self) -> Result<(), Error<E>> {
        self.heater.force_off(&mut self.sensor)
    }

    /// Destroy the monitor and return the driver and sink
    pub fn release(self) -> (Hts221<I2C, Delay>, S) {
        (self.sensor, self.sink)
    }
}
