//! This is a platform-agnostic Rust driver and monitor for the ST HTS221 capacitive humidity and
//! temperature sensor using the [`embedded-hal`] or [`embedded-hal-async`] traits.
//!
//! [`embedded-hal`]: https://github.com/rust-embedded/embedded-hal/tree/master/embedded-hal
//! [`embedded-hal-async`]: https://github.com/rust-embedded/embedded-hal/tree/master/embedded-hal-async
//!
//! This crate allows you to:
//! - Check the device identity (WHO_AM_I).
//! - Configure humidity/temperature averaging, output data rate and block data update.
//! - Load and validate the factory calibration constants.
//! - Read raw humidity and temperature samples and convert them to %RH, °C and °F.
//! - Enable/disable the heater while preserving the rest of CTRL_REG2.
//! - Run a polling monitor that de-saturates the humidity element with the heater when relative
//!   humidity climbs above 95 %, and emits each reading to a sink.
//! - blocking API support.
//! - async API support (driver only, the monitor is blocking).
//!
//! ## Features
//!
//! - `async`: Enables the async driver.
//! - `blocking`: Enables the blocking driver, the heater controller and the monitor.
//! - `std`: Enables [`FileSink`], which atomically rewrites a text file with each reading.
//! - `defmt`: Enables logging using the `defmt` framework.
//! - `log`: Enables logging using the `log` framework.
//! - `daemon`: Builds the `hts221d` Linux binary.
//!
//! ## Calibration
//!
//! Every HTS221 is trimmed at the factory with two anchor points for humidity and two for
//! temperature. The driver reads these once and converts with two-point linear interpolation:
//!
//! ```text
//! rh = (h1 - h0) * (raw - h2) / (h3 - h2) + h0
//! t  = ((t1 - t0) / 8) * (raw - t2) / (t3 - t2) + t0 / 8
//! ```
//!
//! Datasheet: [HTS221](https://www.st.com/resource/en/datasheet/hts221.pdf)
//!
//! ## Blocking Example:
//!
//! ```ignore
//! use hts221::{Configuration, Hts221, Monitor, MonitorConfig};
//!
//! // Platform-specific
//! let i2c = /* embedded_hal::i2c::I2c instance */;
//! let delay = /* embedded_hal::delay::DelayNs instance */;
//! let sink = /* hts221::ReadingSink instance */;
//!
//! let mut monitor = Monitor::start(Hts221::new(i2c, delay), sink, MonitorConfig::default()).unwrap();
//! monitor.run();
//! ```
//!
//! ## Async Example:
//!
//! ```ignore
//! use hts221::{Configuration, Hts221Async, convert};
//!
//! let mut hts221 = Hts221Async::new(i2c, delay);
//! hts221.configure(&Configuration::default()).await.unwrap();
//! let calibration = hts221.load_calibration().await.unwrap();
//!
//! let sample = hts221.read_sample().await.unwrap();
//! let reading = convert::convert(&sample, &calibration);
//! println!("{:.1} %RH, {:.1} °C", reading.reported_humidity(), reading.temp_c);
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![no_std]

#[cfg(any(test, feature = "std"))]
extern crate std;

#[cfg(not(any(feature = "async", feature = "blocking")))]
compile_error!("At least one of \"async\" and \"blocking\" features must be enabled");

#[cfg(all(feature = "defmt", feature = "log"))]
compile_error!("Features \"defmt\" and \"log\" are mutually exclusive and cannot be enabled together");

#[macro_use]
mod fmt;

pub mod calibration;
pub mod convert;
mod hw_def;
mod types;

#[cfg(feature = "blocking")]
mod device_impl;
#[cfg(feature = "async")]
mod device_impl_async;
#[cfg(feature = "blocking")]
mod heater;
#[cfg(feature = "blocking")]
mod monitor;
mod sink;
#[cfg(test)]
mod testing;

pub use crate::{calibration::Calibration, hw_def::*, types::*};
#[cfg(feature = "blocking")]
pub use crate::heater::{HeaterConfig, HeaterController, HEATER_DWELL_MS, MAX_HEATER_CYCLES, SATURATION_THRESHOLD_PCT};
#[cfg(feature = "blocking")]
pub use crate::monitor::{CycleError, Monitor, MonitorConfig, POLL_INTERVAL_MS};
pub use crate::sink::ReadingSink;
#[cfg(feature = "std")]
pub use crate::sink::FileSink;
