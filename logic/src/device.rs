//! The whole chip: decoder, gearbox, counter, PWM, UART and configuration receiver.
use crate::{
    Clocked, ConfigWord, Direction, Edge,
    config::{Parameters, SPI_WORD_LEN, bits_multiple},
    counter::{Counter, CounterInputs, CounterOutputs},
    decoder::{DecoderInputs, DecoderOutputs, GrayCodeDecoder},
    gearbox::{Gear, Gearbox, GearboxInputs, GearboxOutputs},
    pwm::{PwmInputs, PwmSignal},
    spi::{SpiInputChunked, SpiInputs, SpiOutputs},
    uart::{UartInputs, UartOutput},
};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeviceInputs {
    /// Bit 0 is phase A, bit 1 is phase B.
    pub channels: u8,
    /// Forces X2 resolution on the X1 strobe, on top of the configuration word.
    pub force_x2: bool,
    pub cs: bool,
    pub sck: bool,
    pub sdi: bool,
}

impl Default for DeviceInputs {
    /// Chip select released, everything else low.
    fn default() -> Self {
        Self {
            channels: 0,
            force_x2: false,
            cs: true,
            sck: false,
            sdi: false,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeviceOutputs {
    /// Full counter register, the pins only carry its low bits.
    pub counter: u8,
    pub direction: Direction,
    pub pwm: bool,
    pub serial_tx: bool,
    pub gear: Gear,
    pub spi_busy: bool,
}

/// Every block input, derived from the state before an edge.
struct Signals {
    spi: SpiInputs,
    spi_out: SpiOutputs,
    decoder: DecoderInputs,
    decoder_out: DecoderOutputs,
    gearbox: GearboxInputs,
    gearbox_out: GearboxOutputs,
    counter: CounterInputs,
    counter_out: CounterOutputs,
    pwm: PwmInputs,
    uart: UartInputs,
}

#[derive(Clone, Debug)]
pub struct Device {
    parameters: Parameters,
    decoder: GrayCodeDecoder,
    gearbox: Gearbox,
    counter: Counter,
    pwm: PwmSignal,
    uart: UartOutput,
    spi: SpiInputChunked,
}

impl Device {
    /// # Panics
    /// If the parameters describe a counter wider than 8 bits, or one that cannot hold the
    /// default values.
    pub fn new(parameters: Parameters) -> Self {
        assert!(
            parameters.output_width <= parameters.counter_width,
            "more output pins than counter bits"
        );
        let default_word = ConfigWord::default_for(&parameters);
        // Flag, timer and init chunks, then the max value at the counter width.
        let spi_width = bits_multiple(
            3 * SPI_WORD_LEN + parameters.counter_width,
            SPI_WORD_LEN,
        );
        Self {
            parameters,
            decoder: GrayCodeDecoder::new(),
            gearbox: Gearbox::new(),
            counter: Counter::new(parameters.counter_width, parameters.counter_default_value),
            pwm: PwmSignal::new(parameters.counter_width),
            uart: UartOutput::new(parameters.uart_word_len, parameters.uart_idle_cycles),
            spi: SpiInputChunked::new(spi_width, default_word.encode()),
        }
    }

    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    /// The configuration currently in effect.
    pub fn config(&self) -> ConfigWord {
        ConfigWord::decode(self.spi.data())
    }

    fn signals(&self, inputs: &DeviceInputs) -> Signals {
        let spi = SpiInputs {
            cs: inputs.cs,
            sck: inputs.sck,
            sdi: inputs.sdi,
        };
        let spi_out = self.spi.outputs(&spi);
        // The fields are live slices of the receiver's data register.
        let config = ConfigWord::decode(spi_out.data);

        let decoder = DecoderInputs {
            channels: inputs.channels,
            debounce: config.debounce,
            x1_value: config.x1_value,
            force_x2: inputs.force_x2 || config.force_x2,
        };
        let decoder_out = self.decoder.outputs(&decoder);

        let gearbox = GearboxInputs {
            enable: config.gearbox,
            timer_cycles: config.gearbox_timer_cycles,
            strobes: decoder_out.strobes,
        };
        let gearbox_out = self.gearbox.outputs(&gearbox);

        let counter = CounterInputs {
            init_value: config.init_value,
            max_value: config.max_value,
            wrap: config.wrap,
            direction: decoder_out.direction,
            // Counting pauses while a new configuration is being shifted in.
            strobe: gearbox_out.strobe && !spi_out.busy,
            reset: spi_out.strobe,
        };
        let counter_out = self.counter.outputs(&counter);

        let pwm = PwmInputs {
            duty: counter_out.value,
            max_duty: config.max_value,
        };
        let uart = UartInputs {
            word: counter_out.value,
            strobe: counter_out.updating_strobe,
        };

        Signals {
            spi,
            spi_out,
            decoder,
            decoder_out,
            gearbox,
            gearbox_out,
            counter,
            counter_out,
            pwm,
            uart,
        }
    }
}

impl Default for Device {
    fn default() -> Self {
        Self::new(Parameters::default())
    }
}

impl Clocked for Device {
    type Inputs = DeviceInputs;
    type Outputs = DeviceOutputs;

    fn outputs(&self, inputs: &DeviceInputs) -> DeviceOutputs {
        let signals = self.signals(inputs);
        DeviceOutputs {
            counter: signals.counter_out.value,
            direction: signals.decoder_out.direction,
            pwm: self.pwm.outputs(&signals.pwm),
            serial_tx: self.uart.outputs(&signals.uart),
            gear: signals.gearbox_out.gear,
            spi_busy: signals.spi_out.busy,
        }
    }

    fn tick(&mut self, inputs: &DeviceInputs, edge: Edge) {
        let signals = self.signals(inputs);
        self.spi.tick(&signals.spi, edge);
        self.decoder.tick(&signals.decoder, edge);
        self.gearbox.tick(&signals.gearbox, edge);
        self.counter.tick(&signals.counter, edge);
        self.pwm.tick(&signals.pwm, edge);
        self.uart.tick(&signals.uart, edge);
    }
}
