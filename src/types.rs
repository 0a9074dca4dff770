use crate::hw_def::*;

use core::fmt;

#[cfg(feature="defmt")]
use defmt::Format;

/// HTS221 blocking device driver
#[cfg(feature = "blocking")]
#[derive(Debug)]
pub struct Hts221<I2C, Delay> {
    pub(crate) i2c: I2C,
    pub(crate) delay: Delay,
}

/// HTS221 async device driver
#[cfg(feature = "async")]
#[derive(Debug)]
pub struct Hts221Async<I2C, Delay> {
    pub(crate) i2c: I2C,
    pub(crate) delay: Delay,
}

/// All possible errors in this crate
#[cfg_attr(feature = "defmt", derive(Format))]
#[derive(Debug)]
pub enum Error<E> {
    /// Writing the averaging or control register failed
    Configuration(E),
    /// WHO_AM_I returned something other than an HTS221
    UnexpectedDevice(u8),
    /// A calibration register could not be read
    Calibration(E),
    /// Calibration anchors coincide (h2 == h3 or t2 == t3), conversion would divide by zero
    ConversionDomain,
    /// A register access failed while polling
    Bus(Register, E),
    /// Enabling the heater failed
    Heater(E),
    /// Disabling the heater failed, the heater may still be on
    HeaterStuck(E),
    /// Humidity stayed above the saturation threshold after every heater cycle
    SaturationUnresolved(f32),
}

impl<E> Error<E> {
    /// Short description of the error kind
    pub fn as_str(&self) -> &'static str {
        match self {
            Error::Configuration(_) => "sensor configuration failed",
            Error::UnexpectedDevice(_) => "unexpected WHO_AM_I",
            Error::Calibration(_) => "calibration register unreadable",
            Error::ConversionDomain => "degenerate calibration",
            Error::Bus(..) => "bus access failed",
            Error::Heater(_) => "heater enable failed",
            Error::HeaterStuck(_) => "heater disable failed",
            Error::SaturationUnresolved(_) => "humidity saturation unresolved",
        }
    }

    /// Register involved in a polling bus failure
    pub fn register(&self) -> Option<Register> {
        match self {
            Error::Bus(register, _) => Some(*register),
            Error::Heater(_) | Error::HeaterStuck(_) => Some(Register::CtrlReg2),
            _ => None,
        }
    }

    /// Startup errors leave the sensor unusable
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::Configuration(_)
                | Error::UnexpectedDevice(_)
                | Error::Calibration(_)
                | Error::ConversionDomain
        )
    }
}

impl<E: fmt::Debug> fmt::Display for Error<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::UnexpectedDevice(id) => write!(f, "{} (0x{:02X})", self.as_str(), id),
            Error::ConversionDomain => write!(f, "{}", self.as_str()),
            Error::Bus(register, e) => write!(f, "{} on {}: {:?}", self.as_str(), register.name(), e),
            Error::SaturationUnresolved(humidity) => write!(f, "{} at {:.2} %RH", self.as_str(), humidity),
            Error::Configuration(e)
            | Error::Calibration(e)
            | Error::Heater(e)
            | Error::HeaterStuck(e) => write!(f, "{}: {:?}", self.as_str(), e),
        }
    }
}

/// Raw humidity and temperature output registers from one poll
#[cfg_attr(feature = "defmt", derive(Format))]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RawSample {
    /// unprocessed humidity
    pub raw_humidity: u16,
    /// unprocessed temperature, two's complement
    pub raw_temperature: u16,
}

/// Humidity and temperature after conversion
#[cfg_attr(feature = "defmt", derive(Format))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PhysicalReading {
    /// relative humidity in percent, unclamped
    pub humidity_pct: f32,
    /// degrees centigrade
    pub temp_c: f32,
    /// degrees fahrenheit
    pub temp_f: f32,
}

impl PhysicalReading {
    /// Relative humidity clamped to 0..=100 for reporting
    pub fn reported_humidity(&self) -> f32 {
        self.humidity_pct.clamp(0.0, 100.0)
    }
}

/// Three-line text report, humidity clamped
impl fmt::Display for PhysicalReading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Relative Humidity : {:.2} %", self.reported_humidity())?;
        writeln!(f, "Temperature in C: {:.2} C", self.temp_c)?;
        writeln!(f, "Temperature in F: {:.2} F", self.temp_f)
    }
}

/// Heater intervention state
#[cfg_attr(feature = "defmt", derive(Format))]
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum HeaterState {
    /// heater bit clear, not intervening
    #[default]
    Idle,
    /// heater bit set
    Heating,
    /// heater bit just cleared, humidity about to be re-measured
    Cooldown,
}

impl HeaterState {
    /// Whether the heater bit is expected to be set
    pub fn heater_on(self) -> bool {
        self == HeaterState::Heating
    }
}
