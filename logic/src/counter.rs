//! Bounded up/down position counter with saturate or wrap-around at the edges.
use crate::{Clocked, Direction, Edge, config::max_for_bits};

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CounterInputs {
    pub init_value: u8,
    pub max_value: u8,
    pub wrap: bool,
    /// Clockwise increments.
    pub direction: Direction,
    pub strobe: bool,
    /// Synchronous load of `init_value`, takes priority over `strobe`.
    pub reset: bool,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CounterOutputs {
    pub value: u8,
    /// Value will change on the next edge. A `reset` load does not assert it.
    pub updating_strobe: bool,
}

#[derive(Clone, Debug)]
pub struct Counter {
    mask: u8,
    default_value: u8,
    value: u8,
}

impl Counter {
    /// A counter of `width` bits starting (and globally resetting) at `default_value`.
    ///
    /// # Panics
    /// If `width` is larger than 8 or `default_value` does not fit in it.
    pub fn new(width: u32, default_value: u8) -> Self {
        assert!(width <= u8::BITS, "counter wider than 8 bits");
        #[allow(clippy::cast_possible_truncation, reason = "Width checked above")]
        let mask = max_for_bits(width) as u8;
        assert!(default_value <= mask, "default value does not fit");
        Self {
            mask,
            default_value,
            value: default_value,
        }
    }

    pub fn value(&self) -> u8 {
        self.value
    }

    fn can_update(&self, inputs: &CounterInputs) -> bool {
        match inputs.direction {
            Direction::Clockwise => self.value != inputs.max_value,
            Direction::CounterClockwise => self.value != 0,
        }
    }
}

impl Clocked for Counter {
    type Inputs = CounterInputs;
    type Outputs = CounterOutputs;

    fn outputs(&self, inputs: &CounterInputs) -> CounterOutputs {
        CounterOutputs {
            value: self.value,
            updating_strobe: inputs.strobe && (inputs.wrap || self.can_update(inputs)),
        }
    }

    fn tick(&mut self, inputs: &CounterInputs, edge: Edge) {
        if edge == Edge::Reset {
            self.value = self.default_value;
            return;
        }
        if inputs.reset {
            self.value = inputs.init_value & self.mask;
        } else if self.outputs(inputs).updating_strobe {
            // A max_value lowered under the current value is not clamped here, the counter
            // keeps moving from where it is.
            self.value = match (self.can_update(inputs), inputs.direction) {
                (true, Direction::Clockwise) => self.value.wrapping_add(1) & self.mask,
                (true, Direction::CounterClockwise) => self.value.wrapping_sub(1) & self.mask,
                (false, Direction::Clockwise) => 0,
                (false, Direction::CounterClockwise) => inputs.max_value & self.mask,
            };
        }
    }
}
