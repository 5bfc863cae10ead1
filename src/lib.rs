//! LTC2983 multi-sensor temperature measurement chip.
//!
//! 20 channels over SPI. Each channel is given a [`SensorType`], the driver
//! writes the matching assignment words to the chip and then runs single
//! channel conversions, either blocking or in the start / poll / read style.
//!
//! ```ignore
//! let wiring = Wiring::new(5, 0); // 1k sense resistor for thermistors on channel 5
//! let mut ltc = LTC2983::new(spi, reset, wiring, Config::default());
//! ltc.set_assignment(Channel::new(7).unwrap(), SensorType::Thermistor44006);
//! ltc.init(&mut delay)?;
//! let t = ltc.measure_channel(Channel::new(7).unwrap(), &mut delay)?;
//! ```
//!
//! Measurement outcomes are plain `f32` values with sentinels, see
//! [`TEMPERATURE_ERROR`] and [`SENSOR_ERROR`]. `Err` is only returned when the
//! bus or the reset pin fails.
//!
//! The chip only runs one conversion at a time and the bus is owned by the
//! driver, so it must not be shared between execution contexts.
#![cfg_attr(not(test), no_std)]

use embedded_hal_1::delay::DelayNs;
use embedded_hal_1::digital::OutputPin;
use embedded_hal_1::spi::{Operation, SpiDevice};

pub mod channel;
pub mod registers;
pub mod result;

pub use channel::{Channel, ChannelAssignment, ChannelTable, SensorType, NUM_CHANNELS};
pub use result::{Conversion, Faults, POWERED_OFF, SENSOR_ERROR, TEMPERATURE_ERROR};

use registers::*;

/// Reset pulse width and the time the chip needs to boot afterwards.
const RESET_LOW_MS: u32 = 100;
const RESET_RECOVERY_MS: u32 = 200;
/// Settle time after the reset line is released at power-up.
const RESET_RELEASE_MS: u32 = 100;
/// Settle time before the first SPI transaction.
const BUS_START_MS: u32 = 100;

/// LTC2983 errors
#[derive(Debug)]
pub enum Error<SpiE, PinE> {
    /// SPI bus error
    Spi(SpiE),
    /// Reset pin error
    Pin(PinE),
    /// An assignment register read back with a sensor type the driver does not know
    UnknownSensorType(u8),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TemperatureUnit {
    Celsius,
    Fahrenheit,
}

impl Default for TemperatureUnit {
    fn default() -> Self {
        TemperatureUnit::Celsius
    }
}

/// Line frequency rejection of the digital filter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Rejection {
    /// 50 and 60 Hz
    Both,
    Hz60,
    Hz50,
}

impl Default for Rejection {
    fn default() -> Self {
        Rejection::Both
    }
}

/// Device-wide settings, written ahead of the channel assignments.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    pub unit: TemperatureUnit,
    pub rejection: Rejection,
    /// Extra delay between conversion cycles, in 100 µs steps.
    pub mux_delay: u8,
}

impl Config {
    fn global_config_byte(&self) -> u8 {
        let unit = match self.unit {
            TemperatureUnit::Celsius => TEMP_UNIT_C,
            TemperatureUnit::Fahrenheit => TEMP_UNIT_F,
        };
        let rejection = match self.rejection {
            Rejection::Both => REJECTION_50_60_HZ,
            Rejection::Hz60 => REJECTION_60_HZ,
            Rejection::Hz50 => REJECTION_50_HZ,
        };
        unit | rejection
    }
}

/// Where the board's sense resistors sit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Wiring {
    thermistor_sense: Option<Channel>,
    rtd_sense: Option<Channel>,
}

impl Wiring {
    /// Channel numbers of the 1k sense resistors. 0, or anything outside
    /// 1..=20, means the board has none.
    pub fn new(thermistor_sense: u8, rtd_sense: u8) -> Self {
        Wiring {
            thermistor_sense: Channel::new(thermistor_sense),
            rtd_sense: Channel::new(rtd_sense),
        }
    }

    pub fn thermistor_sense(&self) -> Option<Channel> {
        self.thermistor_sense
    }

    pub fn rtd_sense(&self) -> Option<Channel> {
        self.rtd_sense
    }
}

/// Representation of an LTC2983
pub struct LTC2983<SPI, RST> {
    spi: SPI,
    reset: RST,
    config: Config,
    wiring: Wiring,
    assignments: ChannelTable<SensorType>,
    temperatures: ChannelTable<f32>,
    asleep: bool,
    /// Channel of the last started conversion.
    in_flight: Option<Channel>,
    /// Set once a status read saw `in_flight` done.
    completed: Option<Channel>,
    /// Set from the INTERRUPT pin handler. Advisory only.
    interrupt_flag: bool,
}

impl<SPI, RST> LTC2983<SPI, RST>
where
    SPI: SpiDevice,
    RST: OutputPin,
{
    /// Sense resistor channels from `wiring` are assigned right away, every
    /// other channel starts out unused and unmeasured.
    pub fn new(spi: SPI, reset: RST, wiring: Wiring, config: Config) -> Self {
        let mut assignments = ChannelTable::filled(SensorType::Unused);
        if let Some(ch) = wiring.thermistor_sense {
            assignments[ch] = SensorType::SenseResistor1k;
        }
        if let Some(ch) = wiring.rtd_sense {
            assignments[ch] = SensorType::SenseResistor1k;
        }

        LTC2983 {
            spi,
            reset,
            config,
            wiring,
            assignments,
            temperatures: ChannelTable::filled(TEMPERATURE_ERROR),
            asleep: false,
            in_flight: None,
            completed: None,
            interrupt_flag: false,
        }
    }

    /// Releases the reset line, waits for the chip and writes the full
    /// configuration.
    ///
    /// The SPI device must already be set up; the chip is happy with
    /// anything up to 2 MHz, mode 0.
    pub fn init<D: DelayNs>(&mut self, delay: &mut D) -> Result<(), Error<SPI::Error, RST::Error>> {
        self.reset.set_high().map_err(Error::Pin)?;
        delay.delay_ms(RESET_RELEASE_MS);
        delay.delay_ms(BUS_START_MS);
        self.asleep = false;
        self.forget_conversion();
        self.configure(delay)
    }

    pub fn release(self) -> (SPI, RST) {
        (self.spi, self.reset)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn wiring(&self) -> &Wiring {
        &self.wiring
    }

    pub fn assignment(&self, channel: Channel) -> SensorType {
        self.assignments[channel]
    }

    /// Takes effect on the next [`configure`](Self::configure), wake-up or init.
    pub fn set_assignment(&mut self, channel: Channel, sensor: SensorType) {
        self.assignments[channel] = sensor;
    }

    pub fn assignments(&self) -> &ChannelTable<SensorType> {
        &self.assignments
    }

    /// Last result for `channel`, [`TEMPERATURE_ERROR`] if never measured.
    pub fn temperature(&self, channel: Channel) -> f32 {
        self.temperatures[channel]
    }

    pub fn temperatures(&self) -> &ChannelTable<f32> {
        &self.temperatures
    }

    pub fn is_asleep(&self) -> bool {
        self.asleep
    }

    /// Writes global settings, then every used channel's assignment word.
    /// Wakes the chip first if it is asleep, which configures as well.
    pub fn configure<D: DelayNs>(&mut self, delay: &mut D) -> Result<(), Error<SPI::Error, RST::Error>> {
        if self.asleep {
            return self.wake_up(delay);
        }

        self.write_u8(GLOBAL_CONFIG_REGISTER, self.config.global_config_byte())?;
        self.write_u8(MUX_CONFIG_DELAY_REGISTER, self.config.mux_delay)?;

        for channel in Channel::all() {
            let sense_channel = match self.assignments[channel] {
                SensorType::Unused => continue,
                SensorType::SenseResistor1k => None,
                SensorType::Thermistor44006 => self.wiring.thermistor_sense,
                SensorType::RtdPt100 => self.wiring.rtd_sense,
            };
            let assignment = ChannelAssignment::new(self.assignments[channel], sense_channel);
            self.assign_channel(channel, &assignment)?;
        }
        Ok(())
    }

    fn assign_channel(
        &mut self,
        channel: Channel,
        assignment: &ChannelAssignment,
    ) -> Result<(), Error<SPI::Error, RST::Error>> {
        let word = assignment.word();

        #[cfg(feature = "defmt")]
        defmt::debug!("ch{=u8}: {} -> {=u32:#x}", channel.number(), assignment.sensor, word);

        self.write_u32(channel.assignment_address(), word)
    }

    /// Reads back and decodes a channel's assignment register.
    pub fn read_channel_assignment(
        &mut self,
        channel: Channel,
    ) -> Result<ChannelAssignment, Error<SPI::Error, RST::Error>> {
        let word = self.read_u32(channel.assignment_address())?;
        ChannelAssignment::from_word(word).map_err(|tag| {
            #[cfg(feature = "defmt")]
            defmt::warn!("ch{=u8}: unknown sensor type {=u8}", channel.number(), tag);
            Error::UnknownSensorType(tag)
        })
    }

    /// Puts the chip to sleep. Only a reset wakes it again.
    pub fn sleep(&mut self) -> Result<(), Error<SPI::Error, RST::Error>> {
        self.write_u8(COMMAND_STATUS_REGISTER, SLEEP_BYTE)?;
        self.asleep = true;
        self.forget_conversion();

        #[cfg(feature = "defmt")]
        defmt::info!("ltc2983 asleep");

        Ok(())
    }

    /// Pulses reset and writes the whole configuration again, the reset
    /// clears all channel assignments.
    pub fn wake_up<D: DelayNs>(&mut self, delay: &mut D) -> Result<(), Error<SPI::Error, RST::Error>> {
        self.reset.set_low().map_err(Error::Pin)?;
        delay.delay_ms(RESET_LOW_MS);
        self.reset.set_high().map_err(Error::Pin)?;
        delay.delay_ms(RESET_RECOVERY_MS);
        self.asleep = false;
        // result memory is gone after a reset
        self.forget_conversion();

        #[cfg(feature = "defmt")]
        defmt::info!("ltc2983 awake");

        self.configure(delay)
    }

    /// Measures every channel in turn, see [`measure_channel`](Self::measure_channel).
    pub fn measure_all_channels<D: DelayNs>(&mut self, delay: &mut D) -> Result<(), Error<SPI::Error, RST::Error>> {
        for channel in Channel::all() {
            self.measure_channel(channel, delay)?;
        }
        Ok(())
    }

    /// Runs one conversion and waits for it. The result is stored and
    /// returned.
    ///
    /// Channels that do not produce a temperature get [`TEMPERATURE_ERROR`]
    /// without touching the bus. Wakes the chip first if needed.
    ///
    /// Busy-polls the status register with no upper bound, a chip that
    /// never finishes hangs here.
    pub fn measure_channel<D: DelayNs>(
        &mut self,
        channel: Channel,
        delay: &mut D,
    ) -> Result<f32, Error<SPI::Error, RST::Error>> {
        let temperature = if self.assignments[channel].produces_temperature() {
            if self.asleep {
                self.wake_up(delay)?;
            }
            let raw = self.convert_channel(channel)?;
            Conversion::decode(raw).to_value()
        } else {
            TEMPERATURE_ERROR
        };

        self.temperatures[channel] = temperature;
        Ok(temperature)
    }

    fn convert_channel(&mut self, channel: Channel) -> Result<u32, Error<SPI::Error, RST::Error>> {
        self.start_measurement(channel)?;
        nb::block!(self.conversion_done())?;
        self.forget_conversion();
        self.read_u32(channel.result_address())
    }

    /// Starts a conversion on `channel` and returns immediately.
    ///
    /// Does not wake the chip.
    pub fn start_measurement(&mut self, channel: Channel) -> Result<(), Error<SPI::Error, RST::Error>> {
        self.in_flight = Some(channel);
        self.completed = None;
        self.interrupt_flag = false;
        self.write_u8(COMMAND_STATUS_REGISTER, CONVERSION_CONTROL_BYTE | channel.number())
    }

    /// One status read; true once the running conversion is done.
    pub fn finished_measurement(&mut self) -> Result<bool, Error<SPI::Error, RST::Error>> {
        match self.conversion_done() {
            Ok(()) => Ok(true),
            Err(nb::Error::WouldBlock) => Ok(false),
            Err(nb::Error::Other(e)) => Err(e),
        }
    }

    /// Status poll in `nb` style.
    ///
    /// Done means the done bit is set, the start bit is clear and, if a
    /// conversion was started through this driver, the status channel bits
    /// name that channel.
    pub fn conversion_done(&mut self) -> nb::Result<(), Error<SPI::Error, RST::Error>> {
        let status = self.check_status_reg()?;
        let channel_matches = self
            .in_flight
            .map_or(true, |ch| status & STATUS_CHANNEL_MASK == ch.number());
        if status & STATUS_DONE != 0 && status & STATUS_START == 0 && channel_matches {
            self.completed = self.in_flight;
            Ok(())
        } else {
            Err(nb::Error::WouldBlock)
        }
    }

    /// Reads the result of a conversion started with
    /// [`start_measurement`](Self::start_measurement).
    ///
    /// Unless [`finished_measurement`](Self::finished_measurement) has
    /// reported completion of a conversion started on this same `channel`,
    /// with no sleep or reset since, returns [`TEMPERATURE_ERROR`] without
    /// any bus access. The interrupt flag is not consulted.
    pub fn read_measurement_result(&mut self, channel: Channel) -> Result<f32, Error<SPI::Error, RST::Error>> {
        if self.completed != Some(channel) || !self.assignments[channel].produces_temperature() {
            return Ok(TEMPERATURE_ERROR);
        }

        let raw = self.read_u32(channel.result_address())?;
        self.forget_conversion();
        self.interrupt_flag = false;

        let temperature = Conversion::decode(raw).to_value();
        self.temperatures[channel] = temperature;
        Ok(temperature)
    }

    fn forget_conversion(&mut self) {
        self.in_flight = None;
        self.completed = None;
    }

    /// Call from the INTERRUPT pin's rising edge handler.
    pub fn on_conversion_interrupt(&mut self) {
        self.interrupt_flag = true;
    }

    /// Set by [`on_conversion_interrupt`](Self::on_conversion_interrupt),
    /// cleared on start and on a successful result read.
    pub fn conversion_flagged(&self) -> bool {
        self.interrupt_flag
    }

    /// Raw command/status byte.
    pub fn check_status_reg(&mut self) -> Result<u8, Error<SPI::Error, RST::Error>> {
        self.read_u8(COMMAND_STATUS_REGISTER)
    }

    /// Converts `channel` and returns the raw result word, fault byte included.
    pub fn read_full_channel_data(&mut self, channel: Channel) -> Result<u32, Error<SPI::Error, RST::Error>> {
        self.convert_channel(channel)
    }

    fn read_u8(&mut self, address: u16) -> Result<u8, Error<SPI::Error, RST::Error>> {
        let mut data = [0u8; 1];
        self.read_ram(address, &mut data)?;
        Ok(data[0])
    }

    fn read_u32(&mut self, address: u16) -> Result<u32, Error<SPI::Error, RST::Error>> {
        let mut data = [0u8; 4];
        self.read_ram(address, &mut data)?;
        Ok(u32::from_be_bytes(data))
    }

    fn write_u8(&mut self, address: u16, value: u8) -> Result<(), Error<SPI::Error, RST::Error>> {
        let [hi, lo] = address.to_be_bytes();
        self.spi
            .write(&[INSTRUCTION_WRITE, hi, lo, value])
            .map_err(Error::Spi)
    }

    fn write_u32(&mut self, address: u16, value: u32) -> Result<(), Error<SPI::Error, RST::Error>> {
        let [hi, lo] = address.to_be_bytes();
        let [b3, b2, b1, b0] = value.to_be_bytes();
        self.spi
            .write(&[INSTRUCTION_WRITE, hi, lo, b3, b2, b1, b0])
            .map_err(Error::Spi)
    }

    fn read_ram(&mut self, address: u16, buf: &mut [u8]) -> Result<(), Error<SPI::Error, RST::Error>> {
        let [hi, lo] = address.to_be_bytes();
        self.spi
            .transaction(&mut [Operation::Write(&[INSTRUCTION_READ, hi, lo]), Operation::Read(buf)])
            .map_err(Error::Spi)
    }
}
