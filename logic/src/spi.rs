//! Write-only synchronous serial receiver for the configuration word.
//!
//! The bus is sampled with the device clock, so `sck` and `cs` must each stay stable for at
//! least one clock cycle. Bits arrive MSB first on rising `sck` while `cs` is low. A transfer
//! only takes effect when exactly `width` bits were clocked in before `cs` rises again.
use crate::{Clocked, Edge, config::max_for_bits};

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SpiInputs {
    /// Active low chip select.
    pub cs: bool,
    pub sck: bool,
    pub sdi: bool,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SpiOutputs {
    /// A transfer is in progress.
    pub busy: bool,
    /// High for one cycle after `data` was replaced.
    pub strobe: bool,
    pub data: u32,
}

#[derive(Clone, Debug)]
pub struct SpiInputChunked {
    width: u32,
    init: u32,
    data: u32,
    shift: u32,
    /// Saturates, so an overlong transfer never counts as a complete one.
    count: u8,
    busy: bool,
    strobe: bool,
    prev_cs: bool,
    prev_sck: bool,
}

impl SpiInputChunked {
    /// A receiver for `width` bit transfers holding `init` until the first one completes.
    ///
    /// # Panics
    /// If `width` is 0 or more than 32 bits, or `init` does not fit in it.
    pub fn new(width: u32, init: u32) -> Self {
        assert!(
            width != 0 && width <= u32::BITS,
            "spi buffer must hold 1 to 32 bits"
        );
        assert!(init <= max_for_bits(width), "initial data does not fit");
        Self {
            width,
            init,
            data: init,
            shift: 0,
            count: 0,
            busy: false,
            strobe: false,
            prev_cs: false,
            prev_sck: false,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn data(&self) -> u32 {
        self.data
    }

    fn complete(&self) -> bool {
        u32::from(self.count) == self.width
    }
}

impl Clocked for SpiInputChunked {
    type Inputs = SpiInputs;
    type Outputs = SpiOutputs;

    fn outputs(&self, _inputs: &SpiInputs) -> SpiOutputs {
        SpiOutputs {
            busy: self.busy,
            strobe: self.strobe,
            data: self.data,
        }
    }

    fn tick(&mut self, inputs: &SpiInputs, edge: Edge) {
        if edge == Edge::Reset {
            *self = Self::new(self.width, self.init);
            return;
        }
        let cs_fell = self.prev_cs && !inputs.cs;
        let cs_rose = !self.prev_cs && inputs.cs;
        let sck_rose = !self.prev_sck && inputs.sck;
        self.prev_cs = inputs.cs;
        self.prev_sck = inputs.sck;

        self.strobe = false;
        if cs_fell {
            self.count = 0;
            self.busy = true;
        } else if self.busy {
            if cs_rose {
                self.busy = false;
                if self.complete() {
                    self.data = self.shift;
                    self.strobe = true;
                }
            } else if sck_rose {
                self.shift = ((self.shift << 1) | u32::from(inputs.sdi)) & max_for_bits(self.width);
                self.count = self.count.saturating_add(1);
            }
        }
    }
}
