//! The 32-bit configuration word shifted in over the serial port.
//!
//! | bits    | field                |
//! |---------|----------------------|
//! | 0       | gearbox enable       |
//! | 1       | wrap                 |
//! | 2       | debounce             |
//! | 3..=4   | x1 target value      |
//! | 5       | force X2             |
//! | 8..=15  | gearbox timer cycles |
//! | 16..=23 | counter init value   |
//! | 24..=31 | counter max value    |
//!
//! Bits 6 and 7 are reserved and always encoded as 0.
use crate::{
    config::{Parameters, SPI_WORD_LEN},
    gearbox::DEFAULT_TIMER_CYCLES,
};
use core::fmt;

const GEARBOX_BIT: u32 = 0;
const WRAP_BIT: u32 = 1;
const DEBOUNCE_BIT: u32 = 2;
const X1_VALUE_SHIFT: u32 = 3;
const FORCE_X2_BIT: u32 = 5;
const TIMER_SHIFT: u32 = SPI_WORD_LEN;
const INIT_SHIFT: u32 = SPI_WORD_LEN * 2;
const MAX_SHIFT: u32 = SPI_WORD_LEN * 3;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ConfigWord {
    pub gearbox: bool,
    pub wrap: bool,
    pub debounce: bool,
    /// Only the two low bits are used.
    pub x1_value: u8,
    pub force_x2: bool,
    pub gearbox_timer_cycles: u8,
    pub init_value: u8,
    pub max_value: u8,
}

impl ConfigWord {
    /// The word a device holds after reset.
    ///
    /// The gearbox timer comes from the tuning formula for the configured encoder, falling
    /// back to [`DEFAULT_TIMER_CYCLES`] when the formula has no answer that fits the register.
    ///
    /// ```rust
    /// use encoder_chip_logic::{ConfigWord, config::Parameters};
    ///
    /// let word = ConfigWord::default_for(&Parameters::default());
    /// assert_eq!(word.gearbox_timer_cycles, 62);
    /// assert_eq!(word.encode(), 0x1F00_3E04);
    /// ```
    pub fn default_for(parameters: &Parameters) -> Self {
        let gearbox_timer_cycles = parameters
            .gearbox_encoder
            .timer_period(parameters.clock_hz)
            .and_then(|period| period.timer_cycles())
            .unwrap_or(DEFAULT_TIMER_CYCLES);
        Self {
            gearbox: parameters.gearbox_enabled,
            wrap: parameters.wrap,
            debounce: parameters.debounce,
            x1_value: parameters.x1_value & 0b11,
            force_x2: parameters.force_x2,
            gearbox_timer_cycles,
            init_value: parameters.counter_default_value,
            max_value: parameters.counter_default_max_value,
        }
    }

    pub fn encode(&self) -> u32 {
        u32::from(self.gearbox) << GEARBOX_BIT
            | u32::from(self.wrap) << WRAP_BIT
            | u32::from(self.debounce) << DEBOUNCE_BIT
            | u32::from(self.x1_value & 0b11) << X1_VALUE_SHIFT
            | u32::from(self.force_x2) << FORCE_X2_BIT
            | u32::from(self.gearbox_timer_cycles) << TIMER_SHIFT
            | u32::from(self.init_value) << INIT_SHIFT
            | u32::from(self.max_value) << MAX_SHIFT
    }

    /// Slice the fields out of a raw word. Reserved bits are ignored.
    pub fn decode(word: u32) -> Self {
        let bit = |n: u32| word >> n & 1 != 0;
        #[allow(clippy::cast_possible_truncation, reason = "Every field is masked to 8 bits")]
        let byte = |shift: u32| (word >> shift & 0xFF) as u8;
        Self {
            gearbox: bit(GEARBOX_BIT),
            wrap: bit(WRAP_BIT),
            debounce: bit(DEBOUNCE_BIT),
            x1_value: byte(X1_VALUE_SHIFT) & 0b11,
            force_x2: bit(FORCE_X2_BIT),
            gearbox_timer_cycles: byte(TIMER_SHIFT),
            init_value: byte(INIT_SHIFT),
            max_value: byte(MAX_SHIFT),
        }
    }
}

impl Default for ConfigWord {
    fn default() -> Self {
        Self::default_for(&Parameters::default())
    }
}

fn title_case(value: bool) -> &'static str {
    if value { "True" } else { "False" }
}

/// `init,max,debounce,wrap,x1,x2,gearbox,timer`, the field order of the console `c:` command.
#[mutants::skip]
impl fmt::Display for ConfigWord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{},{},{},{},{},{},{}",
            self.init_value,
            self.max_value,
            title_case(self.debounce),
            title_case(self.wrap),
            self.x1_value,
            title_case(self.force_x2),
            title_case(self.gearbox),
            self.gearbox_timer_cycles
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario() -> ConfigWord {
        ConfigWord {
            gearbox: true,
            wrap: false,
            debounce: true,
            x1_value: 0,
            force_x2: false,
            gearbox_timer_cycles: 137,
            init_value: 17,
            max_value: 110,
        }
    }

    #[test]
    fn layout() {
        assert_eq!(scenario().encode(), 110 << 24 | 17 << 16 | 137 << 8 | 0b101);
        let word = ConfigWord {
            x1_value: 0b10,
            force_x2: true,
            wrap: true,
            ..scenario()
        };
        assert_eq!(word.encode() & 0xFF, 0b0011_0111);
    }

    #[test]
    fn decode_matches_encode() {
        let word = scenario();
        assert_eq!(ConfigWord::decode(word.encode()), word);
        // Reserved bits do not leak into any field.
        assert_eq!(ConfigWord::decode(word.encode() | 0b1100_0000), word);
    }

    #[test]
    fn x1_value_is_two_bits() {
        let word = ConfigWord {
            x1_value: 0b111,
            ..scenario()
        };
        assert_eq!(ConfigWord::decode(word.encode()).x1_value, 0b11);
        assert!(!ConfigWord::decode(word.encode()).force_x2);
    }

    #[test]
    fn default_word() {
        let word = ConfigWord::default();
        assert!(word.debounce);
        assert!(!word.wrap);
        assert!(!word.gearbox);
        assert!(!word.force_x2);
        assert_eq!(word.x1_value, 0);
        assert_eq!(word.init_value, 0);
        assert_eq!(word.max_value, 31);
        assert_eq!(word.gearbox_timer_cycles, 62);
    }

    #[test]
    fn default_timer_fallback() {
        let slow = Parameters {
            clock_hz: 1_000_000,
            ..Parameters::default()
        };
        assert_eq!(
            ConfigWord::default_for(&slow).gearbox_timer_cycles,
            DEFAULT_TIMER_CYCLES
        );
        let rig = Parameters {
            clock_hz: 2_500,
            ..Parameters::default()
        };
        assert_eq!(ConfigWord::default_for(&rig).gearbox_timer_cycles, 31);
    }

    #[test]
    fn console_listing() {
        assert_eq!(scenario().to_string(), "17,110,True,False,0,False,True,137");
    }
}
