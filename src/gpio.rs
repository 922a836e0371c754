//! GPIO types and the F75111 register model.
//!
//! The chip has two 8-bit register sets (SET1, SET2), each with a direction,
//! an output-data and an input-data register. Eight logical pins are spread
//! over them; bits 3 and 5 of SET1 and everything above bit 1 of SET2 are
//! not wired to a pin.

use crate::consts::f75111;
use crate::error::{Error, Result};
use crate::port::PortIo;
use crate::smbus::SmbusDriver;
use log::{debug, trace};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GpioDirection {
    Input,
    Output,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GpioLevel {
    Low,
    High,
}

impl GpioLevel {
    #[inline]
    pub fn is_high(&self) -> bool {
        *self == GpioLevel::High
    }
}

impl From<bool> for GpioLevel {
    fn from(high: bool) -> Self {
        if high {
            GpioLevel::High
        } else {
            GpioLevel::Low
        }
    }
}

impl fmt::Display for GpioLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            GpioLevel::High => "H",
            GpioLevel::Low => "L",
        })
    }
}

/// Global GPIO mode of the chip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Pins are sampled by the polling loop; pin writes are rejected.
    #[default]
    Input,
    /// Pins are driven from the output shadow.
    Output,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Mode::Input => "input",
            Mode::Output => "output",
        })
    }
}

/// One of the two 8-bit GPIO register sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegisterSet {
    Set1,
    Set2,
}

impl RegisterSet {
    pub const ALL: [RegisterSet; 2] = [RegisterSet::Set1, RegisterSet::Set2];

    /// Chip register offset of the given register within this set.
    pub fn offset(&self, kind: RegisterKind) -> u8 {
        match (self, kind) {
            (RegisterSet::Set1, RegisterKind::Direction) => f75111::REG_SET1_DIR,
            (RegisterSet::Set1, RegisterKind::OutputData) => f75111::REG_SET1_OUTPUT,
            (RegisterSet::Set1, RegisterKind::InputData) => f75111::REG_SET1_INPUT,
            (RegisterSet::Set2, RegisterKind::Direction) => f75111::REG_SET2_DIR,
            (RegisterSet::Set2, RegisterKind::OutputData) => f75111::REG_SET2_OUTPUT,
            (RegisterSet::Set2, RegisterKind::InputData) => f75111::REG_SET2_INPUT,
        }
    }
}

/// Register kinds present in each set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterKind {
    Direction,
    OutputData,
    InputData,
}

// (set, bit) for pins 1-8
const PIN_MAP: [(RegisterSet, u8); GpioPin::COUNT] = [
    (RegisterSet::Set1, 0),
    (RegisterSet::Set1, 1),
    (RegisterSet::Set1, 2),
    (RegisterSet::Set1, 4),
    (RegisterSet::Set1, 6),
    (RegisterSet::Set1, 7),
    (RegisterSet::Set2, 0),
    (RegisterSet::Set2, 1),
];

/// Represents a valid logical GPIO pin (1-8).
/// Use `GpioPin::new(num)` to create.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GpioPin(u8);

impl GpioPin {
    /// Number of logical pins.
    pub const COUNT: usize = 8;

    /// Creates a new GpioPin, returning an error if the number is out of range (1-8).
    pub fn new(pin_num: u8) -> Result<Self> {
        if (1..=Self::COUNT as u8).contains(&pin_num) {
            Ok(GpioPin(pin_num))
        } else {
            Err(Error::PinArgumentOutOfRange {
                pin: pin_num,
                message: "Pin number must be 1-8".to_string(),
            })
        }
    }

    /// All logical pins in order.
    pub fn all() -> impl Iterator<Item = GpioPin> {
        (1..=Self::COUNT as u8).map(GpioPin)
    }

    /// Returns the logical pin number (1-8).
    #[inline]
    pub fn number(&self) -> u8 {
        self.0
    }

    /// Register set the pin belongs to.
    #[inline]
    pub fn register_set(&self) -> RegisterSet {
        PIN_MAP[self.index()].0
    }

    /// Bit index within the set's registers. Never 3 or 5.
    #[inline]
    pub fn bit_index(&self) -> u8 {
        PIN_MAP[self.index()].1
    }

    /// Returns the bit mask (1 << bit_index) for register operations.
    #[inline]
    pub fn mask(&self) -> u8 {
        1u8 << self.bit_index()
    }

    #[inline]
    fn index(&self) -> usize {
        usize::from(self.0 - 1)
    }
}

impl fmt::Display for GpioPin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GPIO{}", self.0)
    }
}

/// True iff bit `bit` of `value` is set.
#[inline]
pub fn is_bit_high(value: u8, bit: u8) -> bool {
    (value >> bit) & 1 == 1
}

/// Last byte written to each output-data register.
///
/// Output registers are never read back; this is the only record of which
/// bits are driven. It is updated only after a write succeeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OutputShadow {
    pub set1: u8,
    pub set2: u8,
}

impl OutputShadow {
    pub fn get(&self, set: RegisterSet) -> u8 {
        match set {
            RegisterSet::Set1 => self.set1,
            RegisterSet::Set2 => self.set2,
        }
    }

    /// Level last written for the pin.
    pub fn level(&self, pin: GpioPin) -> GpioLevel {
        is_bit_high(self.get(pin.register_set()), pin.bit_index()).into()
    }

    fn set(&mut self, set: RegisterSet, value: u8) {
        match set {
            RegisterSet::Set1 => self.set1 = value,
            RegisterSet::Set2 => self.set2 = value,
        }
    }
}

/// Input-data bytes sampled in one polling cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InputSnapshot {
    pub set1: u8,
    pub set2: u8,
}

impl InputSnapshot {
    pub fn level(&self, pin: GpioPin) -> GpioLevel {
        let value = match pin.register_set() {
            RegisterSet::Set1 => self.set1,
            RegisterSet::Set2 => self.set2,
        };
        is_bit_high(value, pin.bit_index()).into()
    }

    /// Levels of all eight pins in pin order.
    pub fn levels(&self) -> [(GpioPin, GpioLevel); GpioPin::COUNT] {
        let mut out = [(GpioPin(1), GpioLevel::Low); GpioPin::COUNT];
        for (slot, pin) in out.iter_mut().zip(GpioPin::all()) {
            *slot = (pin, self.level(pin));
        }
        out
    }
}

/// Typed access to the F75111 GPIO registers over SMBus, plus the output
/// shadow. Every write goes to the hardware.
#[derive(Debug)]
pub(crate) struct GpioRegisters<P: PortIo> {
    bus: SmbusDriver<P>,
    shadow: OutputShadow,
}

impl<P: PortIo> GpioRegisters<P> {
    pub(crate) fn new(bus: SmbusDriver<P>) -> Self {
        Self {
            bus,
            shadow: OutputShadow::default(),
        }
    }

    pub(crate) fn shadow(&self) -> OutputShadow {
        self.shadow
    }

    pub(crate) fn bus(&self) -> &SmbusDriver<P> {
        &self.bus
    }

    pub(crate) fn bus_mut(&mut self) -> &mut SmbusDriver<P> {
        &mut self.bus
    }

    /// Configures every bit of a set as input (0x00) or output (0xFF).
    pub(crate) fn set_direction(
        &mut self,
        set: RegisterSet,
        direction: GpioDirection,
    ) -> Result<()> {
        let value = match direction {
            GpioDirection::Output => f75111::DIR_ALL_OUTPUT,
            GpioDirection::Input => f75111::DIR_ALL_INPUT,
        };
        debug!("Setting {:?} direction: {:?} (0x{:02X})", set, direction, value);
        self.bus
            .write_register(set.offset(RegisterKind::Direction), value)
    }

    /// Sets or clears one pin's bit and writes the whole output byte of its set.
    pub(crate) fn write_output_bit(&mut self, pin: GpioPin, level: GpioLevel) -> Result<()> {
        let set = pin.register_set();
        let current = self.shadow.get(set);
        let new_val = match level {
            GpioLevel::High => current | pin.mask(),
            GpioLevel::Low => current & !pin.mask(),
        };
        trace!(
            "Setting {} {:?}: {:?} 0x{:02X} -> 0x{:02X}",
            pin,
            level,
            set,
            current,
            new_val
        );
        self.write_output_byte(set, new_val)
    }

    /// Writes a full output byte to a set; the shadow follows on success.
    pub(crate) fn write_output_byte(&mut self, set: RegisterSet, value: u8) -> Result<()> {
        self.bus
            .write_register(set.offset(RegisterKind::OutputData), value)?;
        self.shadow.set(set, value);
        Ok(())
    }

    /// Reads a set's input-data register. Not cached.
    pub(crate) fn read_input_byte(&mut self, set: RegisterSet) -> Result<u8> {
        let value = self
            .bus
            .read_register(set.offset(RegisterKind::InputData))?;
        trace!("Read {:?} input: 0x{:02X}", set, value);
        Ok(value)
    }

    /// Reads SET1 then SET2 input bytes.
    pub(crate) fn read_inputs(&mut self) -> Result<InputSnapshot> {
        let set1 = self.read_input_byte(RegisterSet::Set1)?;
        let set2 = self.read_input_byte(RegisterSet::Set2)?;
        Ok(InputSnapshot { set1, set2 })
    }
}
