//! Bit-banged configuration port.
//!
//! The chip samples its serial lines with its own (slow) clock, so every edge is placed right
//! after a falling edge of the slow clock output to give the chip a full cycle to see it.
use defmt::info;
use embassy_rp::gpio::{Input, Level, Output};
use embassy_time::Timer;
use encoder_chip_logic::{
    ConfigWord,
    command::Line,
    config::{SPI_WORD_LEN, SPI_WORDS},
};

const WORD_BITS: u32 = SPI_WORD_LEN * SPI_WORDS;

pub struct ConfigPort<'d> {
    cs: Output<'d>,
    sck: Output<'d>,
    sdi: Output<'d>,
    slow_clk: Input<'d>,
}

impl<'d> ConfigPort<'d> {
    pub fn new(
        mut cs: Output<'d>,
        mut sck: Output<'d>,
        mut sdi: Output<'d>,
        slow_clk: Input<'d>,
    ) -> Self {
        cs.set_low();
        sck.set_low();
        sdi.set_low();
        Self {
            cs,
            sck,
            sdi,
            slow_clk,
        }
    }

    fn line(&mut self, line: Line) -> &mut Output<'d> {
        match line {
            Line::Cs => &mut self.cs,
            Line::Sck => &mut self.sck,
            Line::Sdi => &mut self.sdi,
        }
    }

    /// Wait for a falling edge of the slow clock, then drive `line`.
    async fn sync_set(&mut self, line: Line, level: Level) {
        self.slow_clk.wait_for_high().await;
        self.slow_clk.wait_for_low().await;
        self.line(line).set_level(level);
    }

    /// Give chip select a clean high, low, high sequence so the chip starts idle.
    pub async fn enable(&mut self) {
        self.cs.set_high();
        self.sync_set(Line::Cs, Level::Low).await;
        self.sync_set(Line::Cs, Level::High).await;
        self.sck.set_low();
        self.sdi.set_low();
    }

    pub async fn toggle(&mut self, line: Line) {
        let level = Level::from(self.line(line).is_set_low());
        self.sync_set(line, level).await;
    }

    /// One full clock pulse on `sck`.
    pub async fn tick(&mut self) {
        self.sync_set(Line::Sck, Level::High).await;
        self.sync_set(Line::Sck, Level::Low).await;
    }

    /// Shift a whole word out, MSB first.
    pub async fn send(&mut self, word: u32) {
        info!("sending configuration {:#010x}", word);
        self.sck.set_low();
        self.sync_set(Line::Cs, Level::Low).await;
        Timer::after_millis(1).await;
        for bit in (0..WORD_BITS).rev() {
            self.sdi.set_level(Level::from((word >> bit) & 1 != 0));
            self.tick().await;
        }
        self.sync_set(Line::Cs, Level::High).await;
    }

    pub async fn send_config(&mut self, config: &ConfigWord) {
        self.send(config.encode()).await;
    }

    /// Current levels of `cs`, `sck` and `sdi`.
    pub fn levels(&self) -> [Level; 3] {
        [
            self.cs.get_output_level(),
            self.sck.get_output_level(),
            self.sdi.get_output_level(),
        ]
    }

    /// Drive all three lines at once, without waiting for the slow clock.
    pub fn set_levels(&mut self, [cs, sck, sdi]: [Level; 3]) {
        self.cs.set_level(cs);
        self.sck.set_level(sck);
        self.sdi.set_level(sdi);
    }
}
