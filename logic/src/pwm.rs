//! PWM generator driven by the counter value.
use crate::{Clocked, Edge, config::max_for_bits};

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PwmInputs {
    pub duty: u8,
    /// Roll-over point of the period counter.
    pub max_duty: u8,
}

/// PWM signal generator.
///
/// The output is high for `duty + 1` out of every `max_duty + 1` cycles, and constantly low
/// when `duty` is 0. There is no glitch protection when the inputs change mid period.
#[derive(Clone, Debug)]
pub struct PwmSignal {
    mask: u8,
    counter: u8,
    signal: bool,
}

impl PwmSignal {
    /// # Panics
    /// If `width` is larger than 8.
    pub fn new(width: u32) -> Self {
        assert!(width <= u8::BITS, "pwm wider than 8 bits");
        #[allow(clippy::cast_possible_truncation, reason = "Width checked above")]
        let mask = max_for_bits(width) as u8;
        Self {
            mask,
            counter: 0,
            signal: false,
        }
    }
}

impl Clocked for PwmSignal {
    type Inputs = PwmInputs;
    type Outputs = bool;

    fn outputs(&self, _inputs: &PwmInputs) -> bool {
        self.signal
    }

    fn tick(&mut self, inputs: &PwmInputs, edge: Edge) {
        if edge == Edge::Reset {
            self.counter = 0;
            self.signal = false;
            return;
        }
        if self.counter == inputs.max_duty {
            self.signal = inputs.duty != 0;
            self.counter = 0;
        } else {
            if self.counter == inputs.duty {
                self.signal = false;
            }
            self.counter = self.counter.wrapping_add(1) & self.mask;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PERIODS: usize = 3;

    /// Check the signal against the expected duty law after the first roll-over.
    fn check(max_duty: u8, duty: u8) {
        let width = 8 - max_duty.leading_zeros();
        let mut pwm = PwmSignal::new(width);
        let inputs = PwmInputs { duty, max_duty };

        let high = if duty == 0 {
            0
        } else {
            usize::from(duty) + 1
        };
        let period = usize::from(max_duty) + 1;
        let expected: Vec<bool> = (0..period * PERIODS)
            .map(|i| i % period < high)
            .collect();

        // The signal switches on during the first roll-over.
        for _ in 0..period {
            pwm.tick(&inputs, Edge::Clock);
        }
        for (cycle, &expected) in expected.iter().enumerate() {
            assert_eq!(
                pwm.outputs(&inputs),
                expected,
                "duty {duty}/{max_duty} at cycle {cycle}"
            );
            pwm.tick(&inputs, Edge::Clock);
        }
    }

    #[test]
    fn zero_is_always_low() {
        for max_duty in [27, 31, 255] {
            check(max_duty, 0);
        }
    }

    #[test]
    fn one() {
        for max_duty in [27, 31, 255] {
            check(max_duty, 1);
        }
    }

    #[test]
    fn full_is_always_high() {
        for max_duty in [27, 31, 255] {
            check(max_duty, max_duty);
        }
    }

    #[test]
    fn value_below_half() {
        for max_duty in [27, 31, 255] {
            check(max_duty, 11);
        }
    }

    #[test]
    fn value_above_max_is_always_high() {
        check(27, 30);
    }

    #[test]
    fn reset_clears_signal() {
        let mut pwm = PwmSignal::new(5);
        let inputs = PwmInputs {
            duty: 31,
            max_duty: 31,
        };
        for _ in 0..40 {
            pwm.tick(&inputs, Edge::Clock);
        }
        assert!(pwm.outputs(&inputs));
        pwm.tick(&inputs, Edge::Reset);
        assert!(!pwm.outputs(&inputs));
    }
}
