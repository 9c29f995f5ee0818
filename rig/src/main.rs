//! Acceptance rig for the encoder chip, running on a Raspberry Pi Pico.
//!
//! The Pico clocks the chip, plays the part of the rotary encoder and of the configuration
//! master, and forwards the chip's serial telemetry to a line based console on UART0.
#![no_std]
#![no_main]

mod clock;
mod config_port;
mod console;
mod encoder;

use clock::MAX_CLOCK_HZ;
use config_port::ConfigPort;
use console::{Console, Pins, Rig};
use defmt::*;
use embassy_executor::Spawner;
use embassy_futures::join::join3;
use embassy_rp::{
    bind_interrupts,
    gpio::{Input, Level, Output, Pull},
    peripherals::{UART0, UART1},
    uart::{self, Uart, UartRx},
};
use embassy_sync::mutex::Mutex;
use encoder::GrayOutput;
use encoder_chip_logic::{ConfigWord, config::Parameters};
use {defmt_rtt as _, panic_probe as _};

const CONSOLE_BAUD: u32 = 115_200;

bind_interrupts!(struct Irqs {
    UART0_IRQ => uart::InterruptHandler<UART0>;
    UART1_IRQ => uart::InterruptHandler<UART1>;
});

#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    let p = embassy_rp::init(Default::default());

    let mut console_config = uart::Config::default();
    console_config.baudrate = CONSOLE_BAUD;
    let (console_tx, console_rx) = Uart::new(
        p.UART0,
        p.PIN_0,
        p.PIN_1,
        Irqs,
        p.DMA_CH0,
        p.DMA_CH1,
        console_config,
    )
    .split();

    // The chip sends one bit per cycle of its clock.
    let mut telemetry_config = uart::Config::default();
    telemetry_config.baudrate = MAX_CLOCK_HZ;
    let telemetry_rx = UartRx::new(p.UART1, p.PIN_9, Irqs, p.DMA_CH2, telemetry_config);

    let slow_clk = Input::new(p.PIN_12, Pull::None);
    let chip_clk = Output::new(p.PIN_14, Level::Low);
    let port = ConfigPort::new(
        Output::new(p.PIN_19, Level::Low),
        Output::new(p.PIN_20, Level::Low),
        Output::new(p.PIN_21, Level::Low),
        slow_clk,
    );
    let gray = GrayOutput::new(
        Output::new(p.PIN_16, Level::Low),
        Output::new(p.PIN_17, Level::Low),
    );
    let pins = Pins {
        rst: Output::new(p.PIN_15, Level::Low),
        x2: Output::new(p.PIN_18, Level::Low),
        div: Output::new(p.PIN_13, Level::Low),
        led: Output::new(p.PIN_25, Level::High),
    };

    let parameters = Parameters {
        clock_hz: MAX_CLOCK_HZ,
        ..Parameters::default()
    };
    let default_config = ConfigWord::default_for(&parameters);
    info!("default configuration {}", default_config);
    let mut rig = Rig::new(port, gray, pins, default_config);

    let console = Mutex::new(Console::new(console_tx));
    let commands = async {
        rig.start(&console).await;
        console::serve(console_rx, &console, &mut rig).await
    };
    join3(
        clock::run(chip_clk),
        console::telemetry(telemetry_rx, &console),
        commands,
    )
    .await;
}
