//! Register map and configuration encodings, from the HTS221 datasheet (DocID026142).

#[cfg(feature = "defmt")]
use defmt::Format;

/// Fixed 7-bit I²C address of the HTS221
pub const I2C_ADDRESS: u8 = 0x5F;

/// Expected content of the WHO_AM_I register
pub const WHO_AM_I_VALUE: u8 = 0xBC;

/// Setting the MSb of the register address auto-increments it across a multi-byte read
pub const AUTO_INCREMENT: u8 = 0x80;

/// Heater enable bit in CTRL_REG2
pub const HEATER_BIT: u8 = 0x02;

/// CTRL_REG2 content after power-on (boot, heater and one-shot all clear)
pub const CTRL_REG2_RESET: u8 = 0x00;

/// Registers used by this driver
#[cfg_attr(feature = "defmt", derive(Format))]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u8)]
pub enum Register {
    /// device identification
    WhoAmI = 0x0F,
    /// humidity and temperature averaging
    AvConf = 0x10,
    /// power-down, block data update, output data rate
    CtrlReg1 = 0x20,
    /// boot, heater, one-shot
    CtrlReg2 = 0x21,
    /// humidity output, low byte first
    HumidityOut = 0x28,
    /// temperature output, low byte first
    TempOut = 0x2A,
    /// calibration: humidity low anchor, %RH x2
    H0RhX2 = 0x30,
    /// calibration: humidity high anchor, %RH x2
    H1RhX2 = 0x31,
    /// calibration: temperature low anchor, low 8 bits of degC x8
    T0DegCX8 = 0x32,
    /// calibration: temperature high anchor, low 8 bits of degC x8
    T1DegCX8 = 0x33,
    /// calibration: two high bits of each temperature anchor
    T1T0Msb = 0x35,
    /// calibration: humidity ADC count at H0
    H0T0Out = 0x36,
    /// calibration: humidity ADC count at H1
    H1T0Out = 0x3A,
    /// calibration: temperature ADC count at T0
    T0Out = 0x3C,
    /// calibration: temperature ADC count at T1
    T1Out = 0x3E,
}

impl Register {
    /// Register address
    pub const fn addr(self) -> u8 {
        self as u8
    }

    /// Register address with the auto-increment flag set
    pub const fn addr_auto_increment(self) -> u8 {
        self as u8 | AUTO_INCREMENT
    }

    /// Datasheet name of the register
    pub const fn name(self) -> &'static str {
        match self {
            Register::WhoAmI => "WHO_AM_I",
            Register::AvConf => "AV_CONF",
            Register::CtrlReg1 => "CTRL_REG1",
            Register::CtrlReg2 => "CTRL_REG2",
            Register::HumidityOut => "HUMIDITY_OUT",
            Register::TempOut => "TEMP_OUT",
            Register::H0RhX2 => "H0_rH_x2",
            Register::H1RhX2 => "H1_rH_x2",
            Register::T0DegCX8 => "T0_degC_x8",
            Register::T1DegCX8 => "T1_degC_x8",
            Register::T1T0Msb => "T1/T0_msb",
            Register::H0T0Out => "H0_T0_OUT",
            Register::H1T0Out => "H1_T0_OUT",
            Register::T0Out => "T0_OUT",
            Register::T1Out => "T1_OUT",
        }
    }
}

/// Number of internal temperature samples averaged into one output sample (AV_CONF[5:3])
#[cfg_attr(feature = "defmt", derive(Format))]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AvgT {
    /// 2 samples
    Avg2,
    /// 4 samples
    Avg4,
    /// 8 samples
    Avg8,
    /// 16 samples
    Avg16,
    /// 32 samples
    Avg32,
    /// 64 samples
    Avg64,
    /// 128 samples
    Avg128,
    /// 256 samples
    Avg256,
}
impl AvgT {
    const fn bits(self) -> u8 {
        (self as u8) << 3
    }
}

/// Number of internal humidity samples averaged into one output sample (AV_CONF[2:0])
#[cfg_attr(feature = "defmt", derive(Format))]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AvgH {
    /// 4 samples
    Avg4,
    /// 8 samples
    Avg8,
    /// 16 samples
    Avg16,
    /// 32 samples
    Avg32,
    /// 64 samples
    Avg64,
    /// 128 samples
    Avg128,
    /// 256 samples
    Avg256,
    /// 512 samples
    Avg512,
}
impl AvgH {
    const fn bits(self) -> u8 {
        self as u8
    }
}

/// Output data rate (CTRL_REG1[1:0])
#[cfg_attr(feature = "defmt", derive(Format))]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DataRate {
    /// conversion only on a one-shot request
    OneShot,
    /// 1 Hz
    Hz1,
    /// 7 Hz
    Hz7,
    /// 12.5 Hz
    Hz12_5,
}
impl DataRate {
    const fn bits(self) -> u8 {
        self as u8
    }
}

const CTRL_REG1_PD: u8 = 1 << 7;
const CTRL_REG1_BDU: u8 = 1 << 2;

/// Averaging and control register settings written at start-up
#[cfg_attr(feature = "defmt", derive(Format))]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Configuration {
    pub(crate) avg_t: AvgT,
    pub(crate) avg_h: AvgH,
    pub(crate) data_rate: DataRate,
    pub(crate) block_update: bool,
    pub(crate) powered_up: bool,
}

impl Default for Configuration {
    /// AV_CONF = 0x1b, CTRL_REG1 = 0x85
    fn default() -> Self {
        Self {
            avg_t: AvgT::Avg16,
            avg_h: AvgH::Avg32,
            data_rate: DataRate::Hz1,
            block_update: true,
            powered_up: true,
        }
    }
}

impl Configuration {
    /// Temperature oversampling
    pub fn avg_t(mut self, avg_t: AvgT) -> Self {
        self.avg_t = avg_t;

        self
    }

    /// Humidity oversampling
    pub fn avg_h(mut self, avg_h: AvgH) -> Self {
        self.avg_h = avg_h;

        self
    }

    /// Output data rate
    pub fn data_rate(mut self, data_rate: DataRate) -> Self {
        self.data_rate = data_rate;

        self
    }

    /// Hold the output registers until both bytes of a sample have been read
    pub fn block_update(mut self, enable: bool) -> Self {
        self.block_update = enable;

        self
    }

    /// Leave the device in power-down mode when `false`
    pub fn powered_up(mut self, enable: bool) -> Self {
        self.powered_up = enable;

        self
    }

    /// Value for the AV_CONF register
    pub const fn av_conf(&self) -> u8 {
        self.avg_t.bits() | self.avg_h.bits()
    }

    /// Value for the CTRL_REG1 register
    pub const fn ctrl_reg1(&self) -> u8 {
        let mut value = self.data_rate.bits();
        if self.block_update {
            value |= CTRL_REG1_BDU;
        }
        if self.powered_up {
            value |= CTRL_REG1_PD;
        }
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_configuration_encodes_legacy_values() {
        let config = Configuration::default();
        assert_eq!(config.av_conf(), 0x1b);
        assert_eq!(config.ctrl_reg1(), 0x85);
    }

    #[test]
    fn configuration_setters() {
        let config = Configuration::default()
            .avg_t(AvgT::Avg256)
            .avg_h(AvgH::Avg512)
            .data_rate(DataRate::OneShot)
            .block_update(false);
        assert_eq!(config.av_conf(), 0x3f);
        assert_eq!(config.ctrl_reg1(), 0x80);
        assert_eq!(config.powered_up(false).ctrl_reg1(), 0x00);
    }

    #[test]
    fn auto_increment_sets_msb() {
        assert_eq!(Register::HumidityOut.addr_auto_increment(), 0xA8);
        assert_eq!(Register::T1Out.addr_auto_increment(), 0xBE);
        assert_eq!(Register::CtrlReg2.addr(), 0x21);
    }
}
