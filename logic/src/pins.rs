//! The chip as seen from its two 8-bit pin banks.
//!
//! Input bank: bit 0 `clk`, bit 1 `rst`, bits 2..=3 channels, bit 4 force X2, bit 5 `cs`,
//! bit 6 `sck`, bit 7 `sdi`.
//! Output bank: bit 0 serial tx, bit 1 PWM, bit 2 direction, bits 3..=7 the low counter bits.
use crate::{Clocked, Device, DeviceInputs, DeviceOutputs, Direction, Edge, config::max_for_bits};

const CLK: u8 = 1 << 0;
const RST: u8 = 1 << 1;
const CHANNELS_SHIFT: u8 = 2;
const FORCE_X2: u8 = 1 << 4;
const CS: u8 = 1 << 5;
const SCK: u8 = 1 << 6;
const SDI: u8 = 1 << 7;

const TX: u8 = 1 << 0;
const PWM: u8 = 1 << 1;
const DIRECTION: u8 = 1 << 2;
const COUNTER_SHIFT: u8 = 3;
const COUNTER_PINS: u32 = 5;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InputPins {
    pub clk: bool,
    pub rst: bool,
    pub device: DeviceInputs,
}

impl InputPins {
    pub fn unpack(bank: u8) -> Self {
        Self {
            clk: bank & CLK != 0,
            rst: bank & RST != 0,
            device: DeviceInputs {
                channels: (bank >> CHANNELS_SHIFT) & 0b11,
                force_x2: bank & FORCE_X2 != 0,
                cs: bank & CS != 0,
                sck: bank & SCK != 0,
                sdi: bank & SDI != 0,
            },
        }
    }

    pub fn pack(&self) -> u8 {
        let flag = |set: bool, bit: u8| if set { bit } else { 0 };
        flag(self.clk, CLK)
            | flag(self.rst, RST)
            | (self.device.channels & 0b11) << CHANNELS_SHIFT
            | flag(self.device.force_x2, FORCE_X2)
            | flag(self.device.cs, CS)
            | flag(self.device.sck, SCK)
            | flag(self.device.sdi, SDI)
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct OutputPins {
    pub serial_tx: bool,
    pub pwm: bool,
    pub direction: Direction,
    /// Only the counter bits that reach a pin.
    pub counter: u8,
}

impl OutputPins {
    /// Route `outputs` to the pins, keeping `output_width` counter bits.
    pub fn route(outputs: &DeviceOutputs, output_width: u32) -> Self {
        #[allow(clippy::cast_possible_truncation, reason = "Masked to at most 8 bits")]
        let mask = max_for_bits(output_width.min(u8::BITS)) as u8;
        Self {
            serial_tx: outputs.serial_tx,
            pwm: outputs.pwm,
            direction: outputs.direction,
            counter: outputs.counter & mask,
        }
    }

    pub fn unpack(bank: u8) -> Self {
        Self {
            serial_tx: bank & TX != 0,
            pwm: bank & PWM != 0,
            direction: Direction::from_bit(bank & DIRECTION != 0),
            counter: bank >> COUNTER_SHIFT,
        }
    }

    pub fn pack(&self) -> u8 {
        let flag = |set: bool, bit: u8| if set { bit } else { 0 };
        flag(self.serial_tx, TX)
            | flag(self.pwm, PWM)
            | flag(self.direction.bit(), DIRECTION)
            | self.counter << COUNTER_SHIFT
    }
}

/// A [`Device`] clocked by its own `clk` pin.
///
/// The device advances on each rising edge of `clk`, with a reset edge instead when `rst` is
/// high at that moment.
#[derive(Clone, Debug)]
pub struct Top {
    device: Device,
    clk: bool,
}

impl Top {
    /// # Panics
    /// If the device routes more than 5 counter bits, they would not fit the output bank.
    pub fn new(device: Device) -> Self {
        assert!(
            device.parameters().output_width <= COUNTER_PINS,
            "counter output does not fit the pin bank"
        );
        Self { device, clk: false }
    }

    pub fn device(&self) -> &Device {
        &self.device
    }

    /// Sample the input bank and return the output bank.
    pub fn step(&mut self, bank: u8) -> u8 {
        let pins = InputPins::unpack(bank);
        if pins.clk && !self.clk {
            let edge = if pins.rst { Edge::Reset } else { Edge::Clock };
            self.device.tick(&pins.device, edge);
        }
        self.clk = pins.clk;
        let outputs = self.device.outputs(&pins.device);
        OutputPins::route(&outputs, self.device.parameters().output_width).pack()
    }
}
