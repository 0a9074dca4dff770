//! Two-point linear interpolation from raw output registers to physical units.

use crate::calibration::Calibration;
use crate::types::{PhysicalReading, RawSample};

/// Reinterpret a 16-bit register pair as two's complement
pub fn sign_extend(raw: u16) -> i16 {
    raw as i16
}

/// Relative humidity in percent, unclamped
pub fn humidity(raw_humidity: u16, cal: &Calibration) -> f32 {
    let h0 = cal.h0 as f32;
    let h1 = cal.h1 as f32;
    let h2 = cal.h2 as f32;
    let h3 = cal.h3 as f32;
    (h1 - h0) * (raw_humidity as f32 - h2) / (h3 - h2) + h0
}

/// Temperature in degrees centigrade
pub fn temperature_celsius(raw_temperature: u16, cal: &Calibration) -> f32 {
    let raw = sign_extend(raw_temperature) as f32;
    let t0 = cal.t0 as f32 / 8.0;
    let t1 = cal.t1 as f32 / 8.0;
    let t2 = cal.t2 as f32;
    let t3 = cal.t3 as f32;
    (t1 - t0) * (raw - t2) / (t3 - t2) + t0
}

/// Degrees centigrade to degrees fahrenheit
pub fn temperature_fahrenheit(celsius: f32) -> f32 {
    celsius * 1.8 + 32.0
}

/// Convert a whole sample
pub fn convert(sample: &RawSample, cal: &Calibration) -> PhysicalReading {
    let temp_c = temperature_celsius(sample.raw_temperature, cal);
    PhysicalReading {
        humidity_pct: humidity(sample.raw_humidity, cal),
        temp_c,
        temp_f: temperature_fahrenheit(temp_c),
    }
}
