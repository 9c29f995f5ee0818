//! Gray-code decoder: direction and X1/X2/X4 strobes from the two encoder phases.
use crate::{Clocked, Direction, Edge};

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DecoderInputs {
    /// Bit 0 is phase A, bit 1 is phase B.
    pub channels: u8,
    pub debounce: bool,
    /// Channel value on which the X1 strobe fires.
    pub x1_value: u8,
    pub force_x2: bool,
}

/// Single cycle pulses at the three resolutions.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Strobes {
    pub x1: bool,
    pub x2: bool,
    pub x4: bool,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DecoderOutputs {
    pub direction: Direction,
    pub strobes: Strobes,
}

#[derive(Clone, Debug, Default)]
pub struct GrayCodeDecoder {
    /// Not affected by the reset value, reset loads the current channels instead.
    prev_channels: u8,
    direction: Direction,
    strobe_x4: bool,
}

impl GrayCodeDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Direction implied by moving from the latched channels to `channels`.
    fn transition_direction(&self, channels: u8) -> Direction {
        let a = channels & 1;
        let prev_b = (self.prev_channels >> 1) & 1;
        Direction::from_bit(a ^ prev_b != 0)
    }
}

impl Clocked for GrayCodeDecoder {
    type Inputs = DecoderInputs;
    type Outputs = DecoderOutputs;

    fn outputs(&self, inputs: &DecoderInputs) -> DecoderOutputs {
        let channels = inputs.channels & 0b11;
        let x1_value = inputs.x1_value & 0b11;
        let x4 = self.strobe_x4;
        let x2 = x4 && (channels == x1_value || channels == !x1_value & 0b11);
        let x1 = if inputs.force_x2 {
            x2
        } else {
            x4 && channels == x1_value
        };
        DecoderOutputs {
            direction: self.direction,
            strobes: Strobes { x1, x2, x4 },
        }
    }

    fn tick(&mut self, inputs: &DecoderInputs, edge: Edge) {
        let channels = inputs.channels & 0b11;
        match edge {
            Edge::Reset => {
                // No phantom strobe for whatever the channels were before reset.
                self.prev_channels = channels;
                self.direction = Direction::default();
                self.strobe_x4 = false;
            }
            Edge::Clock => {
                self.strobe_x4 = false;
                if channels != self.prev_channels {
                    let direction = self.transition_direction(channels);
                    // Debouncing just discards the first change of direction.
                    self.strobe_x4 = direction == self.direction || !inputs.debounce;
                    self.direction = direction;
                    self.prev_channels = channels;
                }
            }
        }
    }
}
