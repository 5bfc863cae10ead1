//! Channels, sensor assignments and the 32-bit channel assignment word.

use core::convert::TryFrom;
use core::ops::{Index, IndexMut};

use crate::registers::*;

/// Number of measurement channels on the LTC2983.
pub const NUM_CHANNELS: usize = 20;

/// A measurement channel, `1..=20`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Channel(u8);

impl Channel {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = NUM_CHANNELS as u8;

    /// Returns `None` for 0 and anything above 20.
    pub const fn new(number: u8) -> Option<Self> {
        if number >= Self::MIN && number <= Self::MAX {
            Some(Channel(number))
        } else {
            None
        }
    }

    /// Channel number as printed on the datasheet.
    pub const fn number(self) -> u8 {
        self.0
    }

    /// All channels in ascending order.
    pub fn all() -> impl Iterator<Item = Channel> {
        (Self::MIN..=Self::MAX).map(Channel)
    }

    pub(crate) const fn assignment_address(self) -> u16 {
        channel_address(CHANNEL_ASSIGNMENT_BASE, self.0)
    }

    pub(crate) const fn result_address(self) -> u16 {
        channel_address(CONVERSION_RESULT_MEMORY_BASE, self.0)
    }

    fn index(self) -> usize {
        (self.0 - Self::MIN) as usize
    }
}

impl TryFrom<u8> for Channel {
    type Error = u8;

    fn try_from(number: u8) -> Result<Self, Self::Error> {
        Channel::new(number).ok_or(number)
    }
}

impl From<Channel> for u8 {
    fn from(channel: Channel) -> u8 {
        channel.0
    }
}

/// One value per channel, indexed by [`Channel`].
#[derive(Clone, Debug, PartialEq)]
pub struct ChannelTable<T> {
    entries: [T; NUM_CHANNELS],
}

impl<T: Copy> ChannelTable<T> {
    pub const fn filled(value: T) -> Self {
        ChannelTable {
            entries: [value; NUM_CHANNELS],
        }
    }
}

impl<T> ChannelTable<T> {
    pub fn iter(&self) -> impl Iterator<Item = (Channel, &T)> {
        Channel::all().zip(self.entries.iter())
    }
}

impl<T> Index<Channel> for ChannelTable<T> {
    type Output = T;

    fn index(&self, channel: Channel) -> &T {
        &self.entries[channel.index()]
    }
}

impl<T> IndexMut<Channel> for ChannelTable<T> {
    fn index_mut(&mut self, channel: Channel) -> &mut T {
        &mut self.entries[channel.index()]
    }
}

/// Sensors this driver knows how to wire up.
///
/// Adding a sensor means adding a variant here and its word layout in
/// [`ChannelAssignment::word`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SensorType {
    /// Nothing connected, the assignment register is left alone.
    Unused,
    /// 1000 Ω precision sense resistor.
    SenseResistor1k,
    /// 44006 thermistor, 10 kΩ @ 25 °C.
    Thermistor44006,
    /// 2-wire PT-100 RTD.
    RtdPt100,
}

impl Default for SensorType {
    fn default() -> Self {
        SensorType::Unused
    }
}

impl SensorType {
    /// Whether a conversion on this channel yields a temperature.
    pub fn produces_temperature(self) -> bool {
        matches!(self, SensorType::Thermistor44006 | SensorType::RtdPt100)
    }

    /// Type tag in bits 31..27 of the assignment word.
    pub fn tag(self) -> u8 {
        match self {
            SensorType::Unused => SENSOR_TYPE_UNASSIGNED,
            SensorType::SenseResistor1k => SENSOR_TYPE_SENSE_RESISTOR,
            SensorType::Thermistor44006 => SENSOR_TYPE_THERMISTOR_44006_10K_25C,
            SensorType::RtdPt100 => SENSOR_TYPE_RTD_PT_100,
        }
    }

    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            SENSOR_TYPE_UNASSIGNED => Some(SensorType::Unused),
            SENSOR_TYPE_SENSE_RESISTOR => Some(SensorType::SenseResistor1k),
            SENSOR_TYPE_THERMISTOR_44006_10K_25C => Some(SensorType::Thermistor44006),
            SENSOR_TYPE_RTD_PT_100 => Some(SensorType::RtdPt100),
            _ => None,
        }
    }
}

/// Content of a channel assignment register.
///
/// The sense channel is only meaningful for thermistors and RTDs. `None`
/// encodes as 0, which the chip reads as "no sense resistor". The referenced
/// channel is not checked to actually hold a sense resistor, that is up to
/// the board wiring.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChannelAssignment {
    pub sensor: SensorType,
    pub sense_channel: Option<Channel>,
}

impl ChannelAssignment {
    pub fn new(sensor: SensorType, sense_channel: Option<Channel>) -> Self {
        let sense_channel = match sensor {
            SensorType::Thermistor44006 | SensorType::RtdPt100 => sense_channel,
            SensorType::Unused | SensorType::SenseResistor1k => None,
        };
        ChannelAssignment { sensor, sense_channel }
    }

    /// Encodes the 32-bit register word.
    pub fn word(&self) -> u32 {
        let tag = (self.sensor.tag() as u32) << SENSOR_TYPE_LSB;
        let rsense = self.sense_channel.map(|ch| ch.number() as u32).unwrap_or(0);

        match self.sensor {
            SensorType::Unused => 0,
            SensorType::SenseResistor1k => tag | (SENSE_RESISTOR_1K << SENSE_RESISTOR_VALUE_LSB),
            SensorType::Thermistor44006 => {
                tag | (rsense << THERMISTOR_RSENSE_CHANNEL_LSB)
                    | THERMISTOR_DIFFERENTIAL
                    | THERMISTOR_EXCITATION_MODE_SHARING_NO_ROTATION
                    | THERMISTOR_EXCITATION_CURRENT_AUTORANGE
            }
            SensorType::RtdPt100 => {
                tag | (rsense << RTD_RSENSE_CHANNEL_LSB)
                    | RTD_NUM_WIRES_2_WIRE
                    | RTD_EXCITATION_MODE_NO_ROTATION_SHARING
                    | RTD_EXCITATION_CURRENT_50UA
                    | RTD_STANDARD_AMERICAN
            }
        }
    }

    /// Decodes a word read back from the chip. Unknown type tags are
    /// returned as the error value.
    pub fn from_word(word: u32) -> Result<Self, u8> {
        let tag = ((word & SENSOR_TYPE_MASK) >> SENSOR_TYPE_LSB) as u8;
        let sensor = SensorType::from_tag(tag).ok_or(tag)?;

        let sense_channel = match sensor {
            SensorType::Thermistor44006 => {
                Channel::new(((word >> THERMISTOR_RSENSE_CHANNEL_LSB) & RSENSE_CHANNEL_MASK) as u8)
            }
            SensorType::RtdPt100 => Channel::new(((word >> RTD_RSENSE_CHANNEL_LSB) & RSENSE_CHANNEL_MASK) as u8),
            _ => None,
        };

        Ok(ChannelAssignment { sensor, sense_channel })
    }
}
