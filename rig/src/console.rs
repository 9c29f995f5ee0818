//! Command console on UART0 and the rig state it drives.
use crate::{
    clock::{self, ClockMode, Frequency},
    config_port::ConfigPort,
    encoder::GrayOutput,
};
use core::fmt::{self, Write as _};
use defmt::{info, warn};
use embassy_rp::{
    gpio::{Level, Output},
    uart::{Async, UartRx, UartTx},
};
use embassy_sync::{blocking_mutex::raw::NoopRawMutex, mutex::Mutex};
use embassy_time::Timer;
use encoder_chip_logic::{
    ConfigWord,
    command::{Command, expand_script, parse_line},
};
use heapless::String;

const LINE_LEN: usize = 128;
const REPLY_LEN: usize = 96;
/// Chip cycles between two Gray-code transitions.
const ENCODER_CYCLES: u32 = 4;
/// Chip cycles the reset line is held for.
const RESET_CYCLES: u32 = 4;
const COMMAND_DELAY_MS: u64 = 4;

pub struct Console<'d> {
    tx: UartTx<'d, Async>,
}

impl<'d> Console<'d> {
    pub fn new(tx: UartTx<'d, Async>) -> Self {
        Self { tx }
    }

    /// Write one reply line.
    pub async fn reply(&mut self, args: fmt::Arguments<'_>) {
        let mut line: String<REPLY_LEN> = String::new();
        if line.write_fmt(args).is_err() {
            warn!("reply truncated");
        }
        for part in [line.as_bytes(), b"\r\n"] {
            if let Err(e) = self.tx.write(part).await {
                warn!("console write failed: {}", e);
            }
        }
    }
}

pub type SharedConsole<'d> = Mutex<NoopRawMutex, Console<'d>>;

macro_rules! reply {
    ($console:expr, $($arg:tt)*) => {
        $console.lock().await.reply(format_args!($($arg)*)).await
    };
}

/// Output pins of the rig besides the chip clock.
pub struct Pins<'d> {
    pub rst: Output<'d>,
    pub x2: Output<'d>,
    pub div: Output<'d>,
    pub led: Output<'d>,
}

pub struct Rig<'d> {
    port: ConfigPort<'d>,
    gray: GrayOutput<'d>,
    pins: Pins<'d>,
    frequency: Frequency,
    enabled: bool,
    default_config: ConfigWord,
    config: ConfigWord,
}

impl<'d> Rig<'d> {
    pub fn new(
        port: ConfigPort<'d>,
        gray: GrayOutput<'d>,
        pins: Pins<'d>,
        default_config: ConfigWord,
    ) -> Self {
        Self {
            port,
            gray,
            pins,
            frequency: Frequency::divided(0),
            enabled: false,
            default_config,
            config: default_config,
        }
    }

    /// Latch the default divider and announce the configuration format.
    pub async fn start(&mut self, console: &SharedConsole<'_>) {
        reply!(console, "clk:{}", clock::MAX_CLOCK_HZ);
        self.program_divider(0, console).await;
        reply!(console, "cfg:h:ctr_init,ctr_max,dbnc,wrap,x1,x2,gbx_en,gbx_parm");
        self.announce_config(console).await;
    }

    pub async fn run_line(&mut self, line: &str, console: &SharedConsole<'_>) {
        let line = match expand_script(line) {
            Ok(line) => line,
            Err(e) => {
                reply!(console, "err:{}", e);
                return;
            }
        };
        for (text, command) in parse_line(line) {
            match command {
                Ok(Command::Enable) => {
                    self.enable(console).await;
                    continue;
                }
                _ if !self.enabled => {
                    reply!(console, "enb:False");
                    continue;
                }
                Ok(command) => {
                    reply!(console, "cmd:{}", text);
                    info!("command {}", command);
                    self.execute(command, console).await;
                }
                Err(e) => {
                    reply!(console, "cmd:{}", text);
                    warn!("invalid command: {}", e);
                    reply!(console, "err:{}", e);
                    continue;
                }
            }
            self.pins.led.toggle();
            Timer::after_millis(COMMAND_DELAY_MS).await;
        }
    }

    async fn enable(&mut self, console: &SharedConsole<'_>) {
        self.port.enable().await;
        self.gray.set(0);
        self.pins.x2.set_low();
        self.enabled = true;
        reply!(console, "enb:True");
    }

    async fn execute(&mut self, command: Command, console: &SharedConsole<'_>) {
        match command {
            Command::Enable => self.enable(console).await,
            Command::Reset => {
                self.pins.rst.set_high();
                Timer::after(self.frequency.cycles(RESET_CYCLES)).await;
                self.pins.rst.set_low();
            }
            Command::ClockDivider(divider) => self.program_divider(divider, console).await,
            Command::ToggleForceX2 => {
                self.pins.x2.toggle();
                reply!(console, "x2:{}", u8::from(self.pins.x2.is_set_high()));
            }
            Command::ToggleLine(line) => self.port.toggle(line).await,
            Command::TickSck => self.port.tick().await,
            Command::Turn {
                transitions,
                direction,
                bounce,
            } => {
                let step = self.frequency.cycles(ENCODER_CYCLES);
                self.gray.turn(transitions, direction, bounce, step).await;
            }
            Command::Set(param) => {
                param.apply(&mut self.config);
                self.send_config(console).await;
            }
            Command::SendDefault => {
                self.config = self.default_config;
                self.send_config(console).await;
            }
            Command::SendConfig(config) => {
                self.config = config;
                self.send_config(console).await;
            }
            // The tracked configuration is left alone.
            Command::SendRaw(word) => self.port.send(word).await,
        }
    }

    async fn announce_config(&self, console: &SharedConsole<'_>) {
        reply!(console, "cfg:p:{}", self.config);
        reply!(console, "cfg:x:0x{:x}", self.config.encode());
    }

    async fn send_config(&mut self, console: &SharedConsole<'_>) {
        self.announce_config(console).await;
        self.port.send_config(&self.config).await;
    }

    /// Present the divider on the chip inputs and pulse the divider latch.
    ///
    /// The input pins are restored afterwards.
    async fn program_divider(&mut self, divider: u8, console: &SharedConsole<'_>) {
        let bit = |n: u8| Level::from((divider >> n) & 1 != 0);
        self.pins.div.set_low();
        self.frequency = Frequency::divided(divider);
        info!("slow clock divider {}, {} Hz", divider, self.frequency.hz());
        reply!(console, "frq:{}", self.frequency);

        let rst = self.pins.rst.get_output_level();
        let x2 = self.pins.x2.get_output_level();
        let port = self.port.levels();

        clock::set_mode(ClockMode::Hold(bit(0)));
        self.pins.rst.set_level(bit(1));
        self.gray.write((divider >> 2) & 0b11);
        self.pins.x2.set_level(bit(4));
        self.port.set_levels([bit(5), bit(6), bit(7)]);
        Timer::after_millis(1).await;
        self.pins.div.set_high();
        Timer::after_millis(1).await;

        clock::set_mode(ClockMode::Running);
        self.pins.rst.set_level(rst);
        self.gray.write(self.gray.value());
        self.pins.x2.set_level(x2);
        self.port.set_levels(port);
    }
}

/// Read command lines forever.
pub async fn serve(
    mut rx: UartRx<'_, Async>,
    console: &SharedConsole<'_>,
    rig: &mut Rig<'_>,
) {
    let mut line: String<LINE_LEN> = String::new();
    let mut byte = [0u8; 1];
    loop {
        if let Err(e) = rx.read(&mut byte).await {
            warn!("console read failed: {}", e);
            continue;
        }
        match byte[0] {
            b'\r' | b'\n' => {
                if !line.is_empty() {
                    rig.run_line(&line, console).await;
                    line.clear();
                }
            }
            c => {
                if line.push(char::from(c)).is_err() {
                    warn!("command line longer than {} bytes, dropped", LINE_LEN);
                    line.clear();
                }
            }
        }
    }
}

/// Forward every byte sent by the chip's serial output.
pub async fn telemetry(mut rx: UartRx<'_, Async>, console: &SharedConsole<'_>) {
    let mut byte = [0u8; 1];
    loop {
        match rx.read(&mut byte).await {
            Ok(()) => reply!(console, "ser:{}", byte[0]),
            Err(e) => warn!("telemetry read failed: {}", e),
        }
    }
}
