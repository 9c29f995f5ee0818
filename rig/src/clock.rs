//! Chip clock generation and the slow clock frequency seen by the chip.
use core::fmt;
use embassy_futures::select::{Either, select};
use embassy_rp::gpio::{Level, Output};
use embassy_sync::{blocking_mutex::raw::CriticalSectionRawMutex, signal::Signal};
use embassy_time::{Duration, Ticker};

/// Frequency of the square wave on the chip clock pin.
pub const MAX_CLOCK_HZ: u32 = 2_500;

#[derive(Clone, Copy)]
pub enum ClockMode {
    Running,
    /// Stop toggling and drive the pin to a fixed level.
    Hold(Level),
}

static MODE: Signal<CriticalSectionRawMutex, ClockMode> = Signal::new();

pub fn set_mode(mode: ClockMode) {
    MODE.signal(mode);
}

/// Drives the chip clock pin forever, following [`set_mode`].
pub async fn run(mut pin: Output<'_>) {
    let mut ticker = Ticker::every(Duration::from_hz(u64::from(MAX_CLOCK_HZ) * 2));
    let mut mode = ClockMode::Running;
    loop {
        match mode {
            ClockMode::Running => match select(ticker.next(), MODE.wait()).await {
                Either::First(()) => pin.toggle(),
                Either::Second(next) => mode = next,
            },
            ClockMode::Hold(level) => {
                pin.set_level(level);
                mode = MODE.wait().await;
                ticker.reset();
            }
        }
    }
}

/// Effective frequency of the chip's internal clock after the slow clock divider.
#[derive(Clone, Copy, PartialEq, Eq, Debug, defmt::Format)]
pub struct Frequency {
    hz: u32,
}

impl Frequency {
    pub fn divided(divider: u8) -> Self {
        Self {
            hz: MAX_CLOCK_HZ / (u32::from(divider) + 1),
        }
    }

    pub fn hz(&self) -> u32 {
        self.hz
    }

    /// Time taken by `cycles` chip clock cycles, at least one millisecond.
    pub fn cycles(&self, cycles: u32) -> Duration {
        let millis = u64::from(cycles) * 1_000 / u64::from(self.hz.max(1));
        Duration::from_millis(millis.max(1))
    }
}

/// `hz,khz`
impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{}.{:03}",
            self.hz,
            self.hz / 1_000,
            self.hz % 1_000
        )
    }
}
