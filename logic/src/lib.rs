//! Cycle-accurate model of the quadrature encoder interface chip.
//!
//! Every block of the chip is a small clocked state machine implementing [`Clocked`]:
//! its outputs are a function of its registers and current inputs, and [`Clocked::tick`]
//! advances it by one edge of the single `sync` clock domain. [`device::Device`] wires the
//! blocks together the same way the synthesized design does.
//!
//! This crate specifically does **not** depend on embassy-rp so the whole design can be
//! exercised by unit tests on the host. The acceptance rig firmware reuses the
//! configuration word codec, the Gray-code tables and the console language from here.
#![cfg_attr(not(test), no_std)]
#![warn(clippy::pedantic)]
#![allow(clippy::must_use_candidate)]

pub mod command;
pub mod config;
pub mod config_word;
pub mod counter;
pub mod decoder;
pub mod device;
pub mod gearbox;
pub mod pins;
pub mod pwm;
pub mod quadrature;
pub mod spi;
pub mod uart;

pub use config_word::ConfigWord;
pub use device::{Device, DeviceInputs, DeviceOutputs};
pub use gearbox::Gear;

/// Direction of rotation as seen by the decoder.
///
/// Clockwise follows the reference table `00 -> 01 -> 11 -> 10 -> 00` and makes the counter
/// increment. In the hardware this is the single `direction` bit, 1 for clockwise.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    Clockwise,
    /// Reset value of the direction register.
    #[default]
    CounterClockwise,
}
impl Direction {
    pub fn invert(&self) -> Self {
        match self {
            Direction::Clockwise => Direction::CounterClockwise,
            Direction::CounterClockwise => Direction::Clockwise,
        }
    }
    pub fn from_bit(bit: bool) -> Self {
        if bit {
            Direction::Clockwise
        } else {
            Direction::CounterClockwise
        }
    }
    /// Value of the `direction` output pin.
    pub fn bit(self) -> bool {
        self == Direction::Clockwise
    }
}

/// The kind of clock edge delivered to a component.
///
/// Reset is synchronous: it is applied at a clock edge instead of the normal transition.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Edge {
    Clock,
    Reset,
}

/// A clocked block with a fixed set of ports.
///
/// This trait is the seam used by [`device::Device`] to compose the blocks: all outputs are
/// evaluated from the pre-edge state first, then every block is ticked with the inputs that
/// were visible before the edge.
pub trait Clocked {
    type Inputs;
    type Outputs;

    /// Combinational view of the outputs for the current register state and inputs.
    fn outputs(&self, inputs: &Self::Inputs) -> Self::Outputs;

    /// Advance the registers by one clock edge.
    fn tick(&mut self, inputs: &Self::Inputs, edge: Edge);
}

#[cfg(test)]
mod tests {
    use super::Direction;

    #[test]
    fn direction_bits() {
        assert_eq!(Direction::from_bit(true), Direction::Clockwise);
        assert_eq!(Direction::from_bit(false), Direction::CounterClockwise);
        assert!(Direction::Clockwise.bit());
        assert_eq!(Direction::default(), Direction::CounterClockwise);
        assert_eq!(Direction::Clockwise.invert(), Direction::CounterClockwise);
    }
}
