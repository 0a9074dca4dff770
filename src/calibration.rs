//! Factory calibration constants.
//!
//! Each HTS221 is trimmed with two anchor points per quantity. The humidity
//! anchors are stored as %RH x2 with their ADC counts. The temperature
//! anchors are 10-bit degC x8 values, split across a base register and a
//! shared msb register, with their ADC counts.

use crate::types::Error;

#[cfg(feature = "defmt")]
use defmt::Format;

/// Calibration constants, loaded once and read-only afterwards
#[cfg_attr(feature = "defmt", derive(Format))]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Calibration {
    /// humidity low anchor, %RH
    pub h0: u8,
    /// humidity high anchor, %RH
    pub h1: u8,
    /// ADC count at `h0`
    pub h2: i16,
    /// ADC count at `h1`
    pub h3: i16,
    /// temperature low anchor, degC x8
    pub t0: u16,
    /// temperature high anchor, degC x8
    pub t1: u16,
    /// ADC count at `t0`
    pub t2: i16,
    /// ADC count at `t1`
    pub t3: i16,
}

impl Calibration {
    /// Reject calibrations whose ADC anchors coincide
    pub fn validate<E>(self) -> Result<Self, Error<E>> {
        if self.h3 == self.h2 || self.t3 == self.t2 {
            return Err(Error::ConversionDomain);
        }
        Ok(self)
    }
}

/// Calibration register contents as read from the device, before decoding
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct RawCalibration {
    pub(crate) h0_rh_x2: u8,
    pub(crate) h1_rh_x2: u8,
    pub(crate) h0_t0_out: [u8; 2],
    pub(crate) h1_t0_out: [u8; 2],
    pub(crate) t0_degc_x8: u8,
    pub(crate) t1_degc_x8: u8,
    pub(crate) t1_t0_msb: u8,
    pub(crate) t0_out: [u8; 2],
    pub(crate) t1_out: [u8; 2],
}

impl RawCalibration {
    pub(crate) fn decode<E>(&self) -> Result<Calibration, Error<E>> {
        let (t0, t1) = unpack_temperature_anchors(self.t0_degc_x8, self.t1_degc_x8, self.t1_t0_msb);
        Calibration {
            h0: self.h0_rh_x2 / 2,
            h1: self.h1_rh_x2 / 2,
            h2: i16::from_le_bytes(self.h0_t0_out),
            h3: i16::from_le_bytes(self.h1_t0_out),
            t0,
            t1,
            t2: i16::from_le_bytes(self.t0_out),
            t3: i16::from_le_bytes(self.t1_out),
        }
        .validate()
    }
}

/// Rebuild the two 10-bit temperature anchors.
///
/// T1/T0_msb carries T0[9:8] in bits 1:0 and T1[9:8] in bits 3:2.
pub fn unpack_temperature_anchors(t0_low: u8, t1_low: u8, msb: u8) -> (u16, u16) {
    let msb = msb as u16;
    let t0 = (msb & 0x03) * 256 + t0_low as u16;
    let t1 = (msb & 0x0C) * 64 + t1_low as u16;
    (t0, t1)
}
