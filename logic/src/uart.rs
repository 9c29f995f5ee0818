//! Transmit-only UART, N-1 framing followed by a configurable number of idle bits.
use crate::{Clocked, Edge, config::max_for_bits};

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UartInputs {
    /// Sampled when the frame is loaded, not when the strobe is seen.
    pub word: u8,
    pub strobe: bool,
}

#[derive(Clone, Debug)]
pub struct UartOutput {
    word_len: u32,
    idle_cycles: u32,
    /// Shift register, `tx` is its LSB.
    data: u32,
    remaining: u32,
    start: bool,
}

impl UartOutput {
    /// # Panics
    /// If a frame of `word_len + 2 + idle_cycles` bits does not fit in 32 bits.
    pub fn new(word_len: u32, idle_cycles: u32) -> Self {
        assert!(
            word_len + 2 + idle_cycles <= u32::BITS,
            "uart frame wider than 32 bits"
        );
        Self {
            word_len,
            idle_cycles,
            data: 1,
            remaining: 0,
            start: false,
        }
    }

    /// Bits per frame, start and stop bits included.
    pub fn frame_len(&self) -> u32 {
        self.word_len + 2 + self.idle_cycles
    }

    /// Start bit, word LSB first, then stop and idle bits (all high).
    fn frame(&self, word: u8) -> u32 {
        let word = u32::from(word) & max_for_bits(self.word_len);
        let high = max_for_bits(1 + self.idle_cycles) << (self.word_len + 1);
        (word << 1) | high
    }
}

impl Clocked for UartOutput {
    type Inputs = UartInputs;
    type Outputs = bool;

    fn outputs(&self, _inputs: &UartInputs) -> bool {
        self.data & 1 != 0
    }

    fn tick(&mut self, inputs: &UartInputs, edge: Edge) {
        if edge == Edge::Reset {
            self.data = 1;
            self.remaining = 0;
            self.start = false;
            return;
        }
        if self.remaining != 0 {
            self.data >>= 1;
            self.remaining -= 1;
        } else if self.start {
            self.start = false;
            self.data = self.frame(inputs.word);
            self.remaining = self.frame_len() - 1;
        }
        // A strobe during a frame is remembered, several of them only send one more frame.
        if inputs.strobe {
            self.start = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const IDLE_CYCLES: u32 = 4;

    /// Strobe once and collect the line for the following frame, plus one idle sample before.
    fn push_word(uart: &mut UartOutput, word: u8) -> u32 {
        assert!(uart.outputs(&UartInputs::default()), "line must idle high");
        uart.tick(&UartInputs { word, strobe: true }, Edge::Clock);

        let inputs = UartInputs {
            word,
            strobe: false,
        };
        let mut line = 0;
        for i in 0..=uart.frame_len() {
            line |= u32::from(uart.outputs(&inputs)) << i;
            uart.tick(&inputs, Edge::Clock);
        }
        line
    }

    fn expected(word_len: u32, word: u8) -> u32 {
        (max_for_bits(IDLE_CYCLES) << (word_len + 3))
            | (1 << (word_len + 2))
            | (u32::from(word) << 2)
            | 0b01
    }

    #[test]
    fn frame_eight_bits() {
        let mut uart = UartOutput::new(8, IDLE_CYCLES);
        let word = 0b1010_0101;
        assert_eq!(push_word(&mut uart, word), expected(8, word));
        assert_eq!(
            expected(8, word),
            ((1 << 4) - 1) << 11 | 1 << 10 | u32::from(word) << 2 | 0b01
        );
        for word in [0b11111, 0b10001, 0b11011, 0b10011] {
            assert_eq!(push_word(&mut uart, word), expected(8, word));
        }
    }

    #[test]
    fn frame_five_bits() {
        let mut uart = UartOutput::new(5, IDLE_CYCLES);
        for word in [0b11111, 0b10001, 0b11011, 0b10011] {
            assert_eq!(push_word(&mut uart, word), expected(5, word));
        }
    }

    #[test]
    fn word_wider_than_frame_is_truncated() {
        let mut uart = UartOutput::new(5, IDLE_CYCLES);
        assert_eq!(push_word(&mut uart, 0b1110_0001), expected(5, 0b0_0001));
    }

    #[test]
    fn strobes_during_frame_coalesce() {
        let mut uart = UartOutput::new(8, IDLE_CYCLES);
        let strobe = UartInputs {
            word: 0x55,
            strobe: true,
        };
        let idle = UartInputs {
            strobe: false,
            ..strobe
        };
        uart.tick(&strobe, Edge::Clock);
        // Strobe on every cycle of the first frame.
        for _ in 0..uart.frame_len() {
            uart.tick(&strobe, Edge::Clock);
        }
        // Exactly one more frame follows, then the line stays idle.
        let mut low_bits = 0;
        for _ in 0..(uart.frame_len() * 3) {
            low_bits += u32::from(!uart.outputs(&idle));
            uart.tick(&idle, Edge::Clock);
        }
        assert_eq!(low_bits, 0x55u8.count_zeros() + 1);
    }

    #[test]
    fn reset_returns_to_idle() {
        let mut uart = UartOutput::new(8, IDLE_CYCLES);
        let inputs = UartInputs {
            word: 0,
            strobe: true,
        };
        uart.tick(&inputs, Edge::Clock);
        uart.tick(&inputs, Edge::Clock);
        assert!(!uart.outputs(&inputs));
        uart.tick(&inputs, Edge::Reset);
        assert!(uart.outputs(&inputs));
    }
}
