//! LTC2983 memory map and bit layout.
//!
//! Every access is a RAM transaction: `[instruction, addr_hi, addr_lo, data...]`,
//! multi-byte data is big-endian.

pub const INSTRUCTION_WRITE: u8 = 0x02;
pub const INSTRUCTION_READ: u8 = 0x03;

// Command / status register (0x000)
pub const COMMAND_STATUS_REGISTER: u16 = 0x0000;
pub const CONVERSION_CONTROL_BYTE: u8 = 0x80; // OR'd with the channel number
pub const SLEEP_BYTE: u8 = 0x97;

pub const STATUS_START: u8 = 1 << 7; // conversion in progress
pub const STATUS_DONE: u8 = 1 << 6; // conversion complete
pub const STATUS_CHANNEL_MASK: u8 = 0x1F;

// Per-channel memory, base + 4 * (channel - 1)
pub const CONVERSION_RESULT_MEMORY_BASE: u16 = 0x0010;
pub const CHANNEL_ASSIGNMENT_BASE: u16 = 0x0200;
pub const CHANNEL_STRIDE: u16 = 4;

// Device-wide registers
pub const GLOBAL_CONFIG_REGISTER: u16 = 0x00F0;
pub const MUX_CONFIG_DELAY_REGISTER: u16 = 0x00FF;

pub const TEMP_UNIT_C: u8 = 0 << 2;
pub const TEMP_UNIT_F: u8 = 1 << 2;
pub const REJECTION_50_60_HZ: u8 = 0;
pub const REJECTION_60_HZ: u8 = 1;
pub const REJECTION_50_HZ: u8 = 2;

// Channel assignment word, common fields
pub const SENSOR_TYPE_LSB: u32 = 27;
pub const SENSOR_TYPE_MASK: u32 = 0x1F << SENSOR_TYPE_LSB;

pub const SENSOR_TYPE_UNASSIGNED: u8 = 0;
pub const SENSOR_TYPE_RTD_PT_100: u8 = 12;
pub const SENSOR_TYPE_THERMISTOR_44006_10K_25C: u8 = 22;
pub const SENSOR_TYPE_SENSE_RESISTOR: u8 = 29;

// Sense resistor: value in 1/1024 ohm
pub const SENSE_RESISTOR_VALUE_LSB: u32 = 0;
pub const SENSE_RESISTOR_VALUE_MASK: u32 = 0x07FF_FFFF;
pub const SENSE_RESISTOR_1K: u32 = 1000 * 1024;

// Thermistor fields
pub const THERMISTOR_RSENSE_CHANNEL_LSB: u32 = 22;
pub const THERMISTOR_SINGLE_ENDED_LSB: u32 = 21;
pub const THERMISTOR_EXCITATION_MODE_LSB: u32 = 19;
pub const THERMISTOR_EXCITATION_CURRENT_LSB: u32 = 15;

pub const THERMISTOR_DIFFERENTIAL: u32 = 0 << THERMISTOR_SINGLE_ENDED_LSB;
pub const THERMISTOR_SINGLE_ENDED: u32 = 1 << THERMISTOR_SINGLE_ENDED_LSB;
pub const THERMISTOR_EXCITATION_MODE_NO_SHARING_NO_ROTATION: u32 = 0 << THERMISTOR_EXCITATION_MODE_LSB;
pub const THERMISTOR_EXCITATION_MODE_SHARING_ROTATION: u32 = 1 << THERMISTOR_EXCITATION_MODE_LSB;
pub const THERMISTOR_EXCITATION_MODE_SHARING_NO_ROTATION: u32 = 2 << THERMISTOR_EXCITATION_MODE_LSB;
pub const THERMISTOR_EXCITATION_CURRENT_AUTORANGE: u32 = 0xC << THERMISTOR_EXCITATION_CURRENT_LSB;

// RTD fields
pub const RTD_RSENSE_CHANNEL_LSB: u32 = 22;
pub const RTD_NUM_WIRES_LSB: u32 = 20;
pub const RTD_EXCITATION_MODE_LSB: u32 = 18;
pub const RTD_EXCITATION_CURRENT_LSB: u32 = 14;
pub const RTD_STANDARD_LSB: u32 = 12;

pub const RTD_NUM_WIRES_2_WIRE: u32 = 0 << RTD_NUM_WIRES_LSB;
pub const RTD_NUM_WIRES_3_WIRE: u32 = 1 << RTD_NUM_WIRES_LSB;
pub const RTD_NUM_WIRES_4_WIRE: u32 = 2 << RTD_NUM_WIRES_LSB;
pub const RTD_EXCITATION_MODE_NO_ROTATION_SHARING: u32 = 0 << RTD_EXCITATION_MODE_LSB;
pub const RTD_EXCITATION_MODE_ROTATION_SHARING: u32 = 1 << RTD_EXCITATION_MODE_LSB;
pub const RTD_EXCITATION_CURRENT_50UA: u32 = 4 << RTD_EXCITATION_CURRENT_LSB;
pub const RTD_STANDARD_EUROPEAN: u32 = 0 << RTD_STANDARD_LSB;
pub const RTD_STANDARD_AMERICAN: u32 = 1 << RTD_STANDARD_LSB;

pub const RSENSE_CHANNEL_MASK: u32 = 0x1F;

// Conversion result word
pub const RESULT_FAULT_LSB: u32 = 24;
pub const RESULT_DATA_MASK: u32 = 0x00FF_FFFF;
pub const RESULT_TEMPERATURE_SCALE: f32 = 1024.0;

pub const FAULT_SENSOR_HARD: u8 = 1 << 7;
pub const FAULT_ADC_HARD: u8 = 1 << 6;
pub const FAULT_CJ_HARD: u8 = 1 << 5;
pub const FAULT_CJ_SOFT: u8 = 1 << 4;
pub const FAULT_SENSOR_ABOVE: u8 = 1 << 3;
pub const FAULT_SENSOR_BELOW: u8 = 1 << 2;
pub const FAULT_ADC_RANGE: u8 = 1 << 1;
pub const RESULT_VALID: u8 = 1 << 0;

/// Start address of a per-channel block, `channel` in 1..=20.
#[inline]
pub const fn channel_address(base: u16, channel: u8) -> u16 {
    base + CHANNEL_STRIDE * (channel as u16 - 1)
}
