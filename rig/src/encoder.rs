//! Simulated rotary encoder driving the chip's channel inputs.
use embassy_rp::gpio::{Level, Output};
use embassy_time::{Duration, Timer};
use encoder_chip_logic::{Direction, quadrature};

const BOUNCE: Duration = Duration::from_micros(800);
const BOUNCE_COUNT: usize = 2;

pub struct GrayOutput<'d> {
    a: Output<'d>,
    b: Output<'d>,
    value: u8,
}

impl<'d> GrayOutput<'d> {
    pub fn new(a: Output<'d>, b: Output<'d>) -> Self {
        let mut output = Self { a, b, value: 0 };
        output.set(0);
        output
    }

    pub fn value(&self) -> u8 {
        self.value
    }

    /// Drive the pins without changing the tracked position.
    pub fn write(&mut self, channels: u8) {
        self.a.set_level(Level::from(channels & 1 != 0));
        self.b.set_level(Level::from(channels & 0b10 != 0));
    }

    pub fn set(&mut self, channels: u8) {
        self.value = channels & 0b11;
        self.write(self.value);
    }

    /// Make `transitions` Gray-code steps, `step` apart.
    ///
    /// With `bounce`, each step first flickers between the old and new value.
    pub async fn turn(&mut self, transitions: u32, direction: Direction, bounce: bool, step: Duration) {
        for _ in 0..transitions {
            Timer::after(step).await;
            let next = quadrature::next(self.value, direction);
            if bounce {
                for _ in 0..BOUNCE_COUNT {
                    self.write(next);
                    Timer::after(BOUNCE).await;
                    self.write(self.value);
                    Timer::after(BOUNCE).await;
                }
            }
            self.set(next);
        }
    }
}
