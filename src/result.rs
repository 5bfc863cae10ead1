//! Conversion result decoding.
//!
//! A result register holds a fault byte in bits 31..24 and a 24-bit two's
//! complement temperature in 1/1024 degree below it.

use crate::registers::*;

/// Channel was never measured, cannot produce a temperature, or the result
/// was read before the conversion finished.
pub const TEMPERATURE_ERROR: f32 = -300.0;
/// Chip supply is known to be switched off. Never produced by the driver.
pub const POWERED_OFF: f32 = -888.0;
/// The chip flagged a fault on the conversion.
pub const SENSOR_ERROR: f32 = -999.0;

/// Fault byte of a conversion result.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Faults(u8);

impl Faults {
    pub const SENSOR_HARD: u8 = FAULT_SENSOR_HARD;
    pub const ADC_HARD: u8 = FAULT_ADC_HARD;
    pub const CJ_HARD: u8 = FAULT_CJ_HARD;
    pub const CJ_SOFT: u8 = FAULT_CJ_SOFT;
    pub const SENSOR_ABOVE: u8 = FAULT_SENSOR_ABOVE;
    pub const SENSOR_BELOW: u8 = FAULT_SENSOR_BELOW;
    pub const ADC_RANGE: u8 = FAULT_ADC_RANGE;

    pub fn from_raw(raw: u32) -> Self {
        Faults((raw >> RESULT_FAULT_LSB) as u8)
    }

    pub fn bits(self) -> u8 {
        self.0
    }

    pub fn contains(self, fault: u8) -> bool {
        self.0 & fault != 0
    }

    /// The valid bit is set.
    pub fn is_valid(self) -> bool {
        self.0 & RESULT_VALID != 0
    }

    /// Open sensor, broken ADC or cold junction. The reading is meaningless.
    pub fn is_hard(self) -> bool {
        self.contains(FAULT_SENSOR_HARD | FAULT_ADC_HARD | FAULT_CJ_HARD)
    }

    /// Any fault bit set, or the result not marked valid.
    pub fn has_fault(self) -> bool {
        self.0 & !RESULT_VALID != 0 || !self.is_valid()
    }
}

/// A decoded conversion result.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Conversion {
    /// Temperature in the unit set in the global configuration.
    Temperature(f32),
    Fault(Faults),
}

impl Conversion {
    pub fn decode(raw: u32) -> Self {
        let faults = Faults::from_raw(raw);
        if faults.has_fault() {
            #[cfg(feature = "defmt")]
            defmt::warn!("conversion fault: {=u8:#x}", faults.bits());
            return Conversion::Fault(faults);
        }

        // sign-extend the 24-bit field
        let data = (((raw & RESULT_DATA_MASK) << 8) as i32) >> 8;
        Conversion::Temperature(data as f32 / RESULT_TEMPERATURE_SCALE)
    }

    /// Collapses into a plain value, faults become [`SENSOR_ERROR`].
    pub fn to_value(self) -> f32 {
        match self {
            Conversion::Temperature(t) => t,
            Conversion::Fault(_) => SENSOR_ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positive_temperature() {
        // 25.5 * 1024 = 0x6600
        assert_eq!(Conversion::decode(0x0100_6600), Conversion::Temperature(25.5));
    }

    #[test]
    fn negative_temperature() {
        // -10.25 * 1024 = -10496 = 0xFFD700 in 24 bits
        assert_eq!(Conversion::decode(0x01FF_D700), Conversion::Temperature(-10.25));
        assert_eq!(Conversion::decode(0x01FF_FFFF).to_value(), -1.0 / 1024.0);
    }

    #[test]
    fn fault_wins_over_data() {
        for fault in [
            Faults::SENSOR_HARD,
            Faults::ADC_HARD,
            Faults::CJ_HARD,
            Faults::CJ_SOFT,
            Faults::SENSOR_ABOVE,
            Faults::SENSOR_BELOW,
            Faults::ADC_RANGE,
        ]
        .iter()
        {
            for data in [0x00_0000u32, 0x00_6600, 0xFF_D700, 0x7F_FFFF].iter() {
                let raw = ((*fault as u32 | 1) << 24) | data;
                let decoded = Conversion::decode(raw);
                assert!(matches!(decoded, Conversion::Fault(f) if f.contains(*fault)));
                assert_eq!(decoded.to_value(), SENSOR_ERROR);
            }
        }
    }

    #[test]
    fn invalid_result_is_a_fault() {
        assert_eq!(Conversion::decode(0x0000_6600), Conversion::Fault(Faults(0)));
    }

    #[test]
    fn hard_faults() {
        assert!(Faults::from_raw(0x8100_0000).is_hard());
        assert!(!Faults::from_raw(0x0900_0000).is_hard());
        assert!(Faults::from_raw(0x0900_0000).has_fault());
        assert!(!Faults::from_raw(0x0100_0000).has_fault());
    }

    #[test]
    fn sentinels_are_distinct() {
        assert_ne!(TEMPERATURE_ERROR, SENSOR_ERROR);
        assert_ne!(TEMPERATURE_ERROR, POWERED_OFF);
        assert_ne!(SENSOR_ERROR, POWERED_OFF);
    }
}
