//! Build-time parameters of the chip.
//!
//! Widths are fixed at synthesis, so they live here as constants rather than in the
//! configuration word. [`Parameters`] gathers the ones a [`crate::Device`] is built from.
use crate::gearbox::{self, EncoderGeometry};

/// Frequency of the `sync` clock the design is tuned for.
pub const CLOCK_FREQ_HZ: u32 = 5_000;

pub const COUNTER_WIDTH: u32 = 8;
/// Number of counter bits routed to output pins.
pub const OUTPUT_WIDTH: u32 = 5;

#[allow(
    clippy::cast_possible_truncation,
    reason = "OUTPUT_WIDTH is checked against the counter width below"
)]
pub const COUNTER_DEFAULT_MAX_VALUE: u8 = max_for_bits(OUTPUT_WIDTH) as u8;
pub const COUNTER_DEFAULT_VALUE: u8 = 0;

pub const DECODER_DEFAULT_DEBOUNCE: bool = true;
pub const DECODER_DEFAULT_WRAP: bool = false;
pub const DECODER_DEFAULT_X1_VALUE: u8 = 0b00;
pub const DECODER_DEFAULT_FORCE_X2: bool = false;

pub const GEARBOX_DEFAULT_ENABLED: bool = false;
/// 24 detents, 4 transitions per detent.
pub const GEARBOX_DEFAULT_ENCODER: EncoderGeometry = EncoderGeometry {
    detents: 24,
    transitions: 4,
};

pub const UART_WORD_LEN: u32 = COUNTER_WIDTH;
/// Transmitter stays idle this many cycles after the stop bit.
pub const UART_IDLE_CYCLES: u32 = 4;

/// This cannot be smaller than 8 to accommodate the gearbox timer.
pub const SPI_WORD_LEN: u32 = 8;
pub const SPI_WORDS: u32 = 4;

const _: () = assert!(UART_WORD_LEN >= COUNTER_WIDTH);
const _: () = assert!(COUNTER_WIDTH <= 8);
const _: () = assert!(OUTPUT_WIDTH <= COUNTER_WIDTH);
const _: () = assert!(SPI_WORD_LEN >= gearbox::TIMER_CYCLES_WIDTH);

/// All ones for the given number of bits, up to 32.
pub const fn max_for_bits(bits: u32) -> u32 {
    if bits >= u32::BITS {
        u32::MAX
    } else {
        (1 << bits) - 1
    }
}

/// Round `bits` up to a multiple of `multiple_of`.
pub const fn bits_multiple(bits: u32, multiple_of: u32) -> u32 {
    bits.div_ceil(multiple_of) * multiple_of
}

/// Parameters fixed when a device is built.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Parameters {
    pub clock_hz: u32,
    pub counter_width: u32,
    pub output_width: u32,
    pub counter_default_value: u8,
    pub counter_default_max_value: u8,
    pub debounce: bool,
    pub wrap: bool,
    pub x1_value: u8,
    pub force_x2: bool,
    pub gearbox_enabled: bool,
    pub gearbox_encoder: EncoderGeometry,
    pub uart_word_len: u32,
    pub uart_idle_cycles: u32,
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            clock_hz: CLOCK_FREQ_HZ,
            counter_width: COUNTER_WIDTH,
            output_width: OUTPUT_WIDTH,
            counter_default_value: COUNTER_DEFAULT_VALUE,
            counter_default_max_value: COUNTER_DEFAULT_MAX_VALUE,
            debounce: DECODER_DEFAULT_DEBOUNCE,
            wrap: DECODER_DEFAULT_WRAP,
            x1_value: DECODER_DEFAULT_X1_VALUE,
            force_x2: DECODER_DEFAULT_FORCE_X2,
            gearbox_enabled: GEARBOX_DEFAULT_ENABLED,
            gearbox_encoder: GEARBOX_DEFAULT_ENCODER,
            uart_word_len: UART_WORD_LEN,
            uart_idle_cycles: UART_IDLE_CYCLES,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bit_helpers() {
        assert_eq!(max_for_bits(0), 0);
        assert_eq!(max_for_bits(5), 31);
        assert_eq!(max_for_bits(32), u32::MAX);
        assert_eq!(bits_multiple(29, 8), 32);
        assert_eq!(bits_multiple(32, 8), 32);
        assert_eq!(bits_multiple(1, 8), 8);
    }

    #[test]
    fn defaults_match_output_width() {
        assert_eq!(COUNTER_DEFAULT_MAX_VALUE, 31);
        assert_eq!(Parameters::default().uart_word_len, 8);
    }
}
