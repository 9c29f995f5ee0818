//! Velocity-adaptive strobe selection.
//!
//! A threshold register is pushed up by every X4 transition and pulled down by a free
//! running timer. Its top bits select which decoder resolution feeds the counter, so a
//! quickly spun encoder moves the counter by more steps per detent.
use crate::{
    Clocked, Edge,
    config::max_for_bits,
    decoder::Strobes,
};
use embassy_time::Duration;

pub const TIMER_CYCLES_WIDTH: u32 = 8;
/// Shift dividing the threshold to find the gear.
pub const SHIFT: u32 = 3;
pub const THRESHOLD_WIDTH: u32 = SHIFT + 2;

#[allow(
    clippy::cast_possible_truncation,
    reason = "THRESHOLD_WIDTH is 5 bits"
)]
const THRESHOLD_MAX: u8 = max_for_bits(THRESHOLD_WIDTH) as u8;

/// Timer period used when none is configured.
#[allow(
    clippy::cast_possible_truncation,
    reason = "Seven bits always fit in a u8"
)]
pub const DEFAULT_TIMER_CYCLES: u8 = max_for_bits(TIMER_CYCLES_WIDTH - 1) as u8;

/// Gear the tuning formula aims for after one second of steady rotation.
const TARGET_GEAR: u32 = 2;

/// Resolution feeding the counter.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Gear {
    #[default]
    X1 = 0,
    X2 = 1,
    X4 = 2,
}

impl Gear {
    fn from_threshold(threshold: u8) -> Self {
        match threshold >> SHIFT {
            0 => Gear::X1,
            1 => Gear::X2,
            _ => Gear::X4,
        }
    }

    fn select(self, strobes: Strobes) -> bool {
        match self {
            Gear::X1 => strobes.x1,
            Gear::X2 => strobes.x2,
            Gear::X4 => strobes.x4,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GearboxInputs {
    pub enable: bool,
    /// The threshold decays once every `timer_cycles + 1` cycles.
    pub timer_cycles: u8,
    pub strobes: Strobes,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GearboxOutputs {
    pub strobe: bool,
    pub gear: Gear,
}

#[derive(Clone, Debug, Default)]
pub struct Gearbox {
    threshold: u8,
    period: u8,
}

impl Gearbox {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Clocked for Gearbox {
    type Inputs = GearboxInputs;
    type Outputs = GearboxOutputs;

    fn outputs(&self, inputs: &GearboxInputs) -> GearboxOutputs {
        let gear = Gear::from_threshold(self.threshold);
        let strobe = if inputs.enable {
            gear.select(inputs.strobes)
        } else {
            inputs.strobes.x1
        };
        GearboxOutputs { strobe, gear }
    }

    fn tick(&mut self, inputs: &GearboxInputs, edge: Edge) {
        if edge == Edge::Reset {
            *self = Self::default();
            return;
        }
        let mut threshold = self.threshold;
        if self.period == inputs.timer_cycles {
            self.period = 0;
            if self.threshold != 0 {
                threshold = self.threshold - 1;
            }
        } else {
            self.period = self.period.wrapping_add(1);
        }
        // A transition in the same cycle as the decay wins over it.
        if inputs.strobes.x4 && self.threshold != THRESHOLD_MAX {
            threshold = self.threshold + 1;
        }
        self.threshold = threshold;
    }
}

/// Mechanical description of an encoder, used to tune the gearbox timer.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EncoderGeometry {
    pub detents: u32,
    /// Gray-code transitions per detent.
    pub transitions: u32,
}

/// Gearbox timer period, as a duration and in clock cycles.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimerPeriod {
    pub period: Duration,
    pub cycles: u32,
}

impl TimerPeriod {
    /// The cycle count if it fits the timer register.
    pub fn timer_cycles(&self) -> Option<u8> {
        u8::try_from(self.cycles).ok()
    }
}

impl EncoderGeometry {
    /// Timer period reaching gear 2 after one second at one turn per second.
    ///
    /// Solves `(detents * transitions - 1 / period) / 2^SHIFT = 2` for the period. This is a
    /// tuning heuristic for one encoder, not a property of the logic.
    /// Returns `None` when the encoder is too slow for that target.
    ///
    /// ```rust
    /// use encoder_chip_logic::gearbox::EncoderGeometry;
    /// use embassy_time::Duration;
    ///
    /// let encoder = EncoderGeometry { detents: 24, transitions: 4 };
    /// let period = encoder.timer_period(5_000).unwrap();
    /// assert_eq!(period.period, Duration::from_hz(80));
    /// // 62.5 cycles, ties round to even.
    /// assert_eq!(period.cycles, 62);
    /// ```
    pub fn timer_period(&self, clock_hz: u32) -> Option<TimerPeriod> {
        let rate = self
            .detents
            .checked_mul(self.transitions)?
            .checked_sub(TARGET_GEAR << SHIFT)
            .filter(|&rate| rate != 0)?;
        Some(TimerPeriod {
            period: Duration::from_hz(u64::from(rate)),
            cycles: div_round_half_even(clock_hz, rate),
        })
    }
}

fn div_round_half_even(numerator: u32, denominator: u32) -> u32 {
    let quotient = numerator / denominator;
    let twice_remainder = u64::from(numerator % denominator) * 2;
    let denominator = u64::from(denominator);
    if twice_remainder > denominator || (twice_remainder == denominator && quotient % 2 == 1) {
        quotient + 1
    } else {
        quotient
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs(enable: bool, timer_cycles: u8, x4: bool) -> GearboxInputs {
        GearboxInputs {
            enable,
            timer_cycles,
            strobes: Strobes {
                x1: false,
                x2: false,
                x4,
            },
        }
    }

    #[test]
    fn gear_bands() {
        assert_eq!(Gear::from_threshold(0), Gear::X1);
        assert_eq!(Gear::from_threshold(7), Gear::X1);
        assert_eq!(Gear::from_threshold(8), Gear::X2);
        assert_eq!(Gear::from_threshold(15), Gear::X2);
        assert_eq!(Gear::from_threshold(16), Gear::X4);
        assert_eq!(Gear::from_threshold(THRESHOLD_MAX), Gear::X4);
    }

    #[test]
    fn threshold_saturates() {
        let mut gearbox = Gearbox::new();
        // Timer never fires within the test.
        for _ in 0..100 {
            gearbox.tick(&inputs(true, 255, true), Edge::Clock);
        }
        assert_eq!(gearbox.threshold, THRESHOLD_MAX);
    }

    #[test]
    fn timer_decays_threshold() {
        let mut gearbox = Gearbox {
            threshold: 3,
            period: 0,
        };
        // Period 0 fires every cycle.
        for expected in [2, 1, 0, 0] {
            gearbox.tick(&inputs(true, 0, false), Edge::Clock);
            assert_eq!(gearbox.threshold, expected);
        }

        let mut gearbox = Gearbox {
            threshold: 3,
            period: 0,
        };
        for _ in 0..4 {
            gearbox.tick(&inputs(true, 4, false), Edge::Clock);
        }
        assert_eq!(gearbox.threshold, 3);
        gearbox.tick(&inputs(true, 4, false), Edge::Clock);
        assert_eq!(gearbox.threshold, 2);
    }

    #[test]
    fn increment_wins_over_decay() {
        let mut gearbox = Gearbox {
            threshold: 5,
            period: 0,
        };
        gearbox.tick(&inputs(true, 0, true), Edge::Clock);
        assert_eq!(gearbox.threshold, 6);
    }

    #[test]
    fn selects_strobe_by_gear() {
        let strobes = Strobes {
            x1: false,
            x2: true,
            x4: true,
        };
        let enabled = GearboxInputs {
            enable: true,
            timer_cycles: 255,
            strobes,
        };
        let gearbox = Gearbox {
            threshold: 0,
            period: 0,
        };
        assert!(!gearbox.outputs(&enabled).strobe);
        let gearbox = Gearbox {
            threshold: 9,
            period: 0,
        };
        assert_eq!(
            gearbox.outputs(&enabled),
            GearboxOutputs {
                strobe: true,
                gear: Gear::X2
            }
        );
        // Disabled always uses X1.
        let disabled = GearboxInputs {
            enable: false,
            ..enabled
        };
        assert!(!gearbox.outputs(&disabled).strobe);
    }

    #[test]
    fn fast_rotation_shifts_up_then_decays() {
        let mut gearbox = Gearbox::new();
        let timer_cycles = 62;
        // One transition every 8 cycles outpaces one decay every 63 cycles.
        for cycle in 0..1_000 {
            gearbox.tick(&inputs(true, timer_cycles, cycle % 8 == 0), Edge::Clock);
        }
        assert_eq!(gearbox.outputs(&inputs(true, timer_cycles, false)).gear, Gear::X4);

        for _ in 0..(u32::from(THRESHOLD_MAX) * 63) {
            gearbox.tick(&inputs(true, timer_cycles, false), Edge::Clock);
        }
        assert_eq!(gearbox.outputs(&inputs(true, timer_cycles, false)).gear, Gear::X1);

        gearbox.tick(&inputs(true, timer_cycles, true), Edge::Reset);
        assert_eq!(gearbox.threshold, 0);
    }

    #[test]
    fn timer_period_formula() {
        let encoder = EncoderGeometry {
            detents: 24,
            transitions: 4,
        };
        let period = encoder.timer_period(5_000).unwrap();
        assert_eq!(period.cycles, 62);
        assert_eq!(period.timer_cycles(), Some(62));
        assert_eq!(encoder.timer_period(2_500).unwrap().cycles, 31);
        assert_eq!(encoder.timer_period(100_000).unwrap().timer_cycles(), None);

        let too_slow = EncoderGeometry {
            detents: 4,
            transitions: 4,
        };
        assert_eq!(too_slow.timer_period(5_000), None);
    }

    #[test]
    fn rounding_ties_to_even() {
        assert_eq!(div_round_half_even(125, 2), 62);
        assert_eq!(div_round_half_even(127, 2), 64);
        assert_eq!(div_round_half_even(10, 4), 2);
        assert_eq!(div_round_half_even(11, 4), 3);
    }
}
