//! The F75111 device handle: owned driver context and mode state machine.

use crate::config::BusConfig;
use crate::error::{self, Error, Result};
use crate::gpio::{
    GpioDirection, GpioLevel, GpioPin, GpioRegisters, InputSnapshot, Mode, OutputShadow,
    RegisterSet,
};
use crate::port::PortIo;
use crate::smbus::SmbusDriver;
use crate::ui::{DisplayUpdate, Intent};
use log::{debug, info, warn};
use parking_lot::Mutex;

struct Inner<P: PortIo> {
    regs: GpioRegisters<P>,
    mode: Mode,
    released: bool,
}

impl<P: PortIo> Inner<P> {
    fn set_all_directions(&mut self, direction: GpioDirection) -> Result<()> {
        for set in RegisterSet::ALL {
            self.regs.set_direction(set, direction)?;
        }
        Ok(())
    }

    fn write_all_outputs(&mut self, value: u8) -> Result<()> {
        for set in RegisterSet::ALL {
            self.regs.write_output_byte(set, value)?;
        }
        Ok(())
    }

    fn switch_to_output(&mut self) -> Result<()> {
        debug!("Switching to output mode (from {})", self.mode);
        self.set_all_directions(GpioDirection::Output)?;
        self.mode = Mode::Output;
        Ok(())
    }

    fn switch_to_input(&mut self) -> Result<()> {
        debug!("Switching to input mode (from {})", self.mode);
        self.set_all_directions(GpioDirection::Input)?;
        self.mode = Mode::Input;
        self.set_all_directions(GpioDirection::Output)?;
        self.write_all_outputs(0x00)?;
        debug!("Input mode set; pins forced low, direction registers left at 0xFF");
        Ok(())
    }

    fn set_pin(&mut self, pin: GpioPin, level: GpioLevel) -> Result<()> {
        self.ensure_output_mode(&pin.to_string())?;
        debug!("Setting {} {:?}", pin, level);
        self.regs.write_output_bit(pin, level)
    }

    fn set_all(&mut self, level: GpioLevel) -> Result<()> {
        self.ensure_output_mode("all pins")?;
        let value = match level {
            GpioLevel::High => 0xFF,
            GpioLevel::Low => 0x00,
        };
        debug!("Setting all pins {:?}", level);
        self.write_all_outputs(value)
    }

    fn driven_levels(&self) -> impl Iterator<Item = DisplayUpdate> {
        let shadow = self.regs.shadow();
        GpioPin::all().map(move |pin| DisplayUpdate::Driven {
            pin,
            level: shadow.level(pin),
        })
    }

    fn ensure_output_mode(&self, what: &str) -> Result<()> {
        if self.mode == Mode::Input {
            warn!("Rejected write to {} in input mode", what);
            return Err(error::pin_write_in_input_mode(what));
        }
        Ok(())
    }

    fn release(&mut self) {
        if !self.released {
            self.released = true;
            self.regs.bus_mut().port_mut().deinitialize();
            debug!("Port driver released");
        }
    }
}

/// A handle to the F75111 GPIO lines.
///
/// Owns the SMBus driver, the output shadow and the global [`Mode`] behind a
/// single mutex. Every operation holds the lock for its whole duration, so
/// port sequences of two transactions never interleave, whether they come
/// from user intents or from the polling loop. Share it between threads with
/// an `Arc`.
///
/// The port driver is deinitialized exactly once, by [`F75111::close`] or on
/// drop.
pub struct F75111<P: PortIo> {
    inner: Mutex<Inner<P>>,
}

impl<P: PortIo> F75111<P> {
    /// Opens the device with default bus timing.
    pub fn open(port: P) -> Result<Self> {
        Self::open_with_config(port, BusConfig::default())
    }

    /// Checks the port driver load status, then puts both register sets in
    /// input direction. The handle starts in [`Mode::Input`] with a zero
    /// output shadow.
    pub fn open_with_config(mut port: P, config: BusConfig) -> Result<Self> {
        let status = port.load_status();
        if !status.is_ok() {
            warn!("Port driver not loaded: {}", status);
            port.deinitialize();
            return Err(Error::DriverLoad { status });
        }
        debug!("Opening F75111 (bus config: {:?})", config);

        let device = Self {
            inner: Mutex::new(Inner {
                regs: GpioRegisters::new(SmbusDriver::new(port, config)),
                mode: Mode::Input,
                released: false,
            }),
        };
        device.inner.lock().set_all_directions(GpioDirection::Input)?;
        info!("F75111 GPIO initialized in input mode");
        Ok(device)
    }

    /// Current recorded mode.
    pub fn mode(&self) -> Mode {
        self.inner.lock().mode
    }

    /// Snapshot of the output shadow.
    pub fn shadow(&self) -> OutputShadow {
        self.inner.lock().regs.shadow()
    }

    pub fn config(&self) -> BusConfig {
        self.inner.lock().regs.bus().config().clone()
    }

    /// Switches both register sets to output.
    ///
    /// Output-data registers are not rewritten: pins come up at the levels
    /// held in the shadow.
    pub fn switch_to_output(&self) -> Result<()> {
        self.inner.lock().switch_to_output()
    }

    /// Switches to input mode using the chip's power-up-high workaround.
    ///
    /// Once direction goes to input, undriven pins float high. The sequence
    /// below is the one the hardware vendor uses to force them low once:
    ///
    /// 1. both direction registers to 0x00, with the previous mode still
    ///    recorded;
    /// 2. mode recorded as Input;
    /// 3. both direction registers to 0xFF;
    /// 4. both output registers (and the shadow) to 0x00.
    ///
    /// **Note:** the direction registers are left at 0xFF (output) while
    /// [`F75111::mode`] reports [`Mode::Input`]. This mismatch is part of the
    /// workaround and is intentional. Input sampling and the pin-write guard
    /// follow the recorded mode only.
    pub fn switch_to_input(&self) -> Result<()> {
        self.inner.lock().switch_to_input()
    }

    /// Drives one pin. Rejected with [`Error::InvalidOperation`] in input
    /// mode, without touching the bus or the shadow.
    pub fn set_pin(&self, pin: GpioPin, level: GpioLevel) -> Result<()> {
        self.inner.lock().set_pin(pin, level)
    }

    /// Drives every bit of both sets high (0xFF) or low (0x00), SET1 first.
    /// Rejected in input mode like [`F75111::set_pin`].
    pub fn set_all(&self, level: GpioLevel) -> Result<()> {
        self.inner.lock().set_all(level)
    }

    /// Reads both input registers if the recorded mode is Input.
    /// Returns `None` in output mode without any bus access.
    pub fn sample_inputs(&self) -> Result<Option<InputSnapshot>> {
        let mut inner = self.inner.lock();
        if inner.mode != Mode::Input {
            return Ok(None);
        }
        inner.regs.read_inputs().map(Some)
    }

    /// Executes a front-end intent and returns the display changes it causes.
    ///
    /// The intent and the reported levels are taken under one lock, so the
    /// updates always match the state the intent left behind.
    pub fn apply(&self, intent: Intent) -> Result<Vec<DisplayUpdate>> {
        let mut inner = self.inner.lock();
        let mut updates = Vec::new();
        match intent {
            Intent::SwitchToInput => {
                inner.switch_to_input()?;
                updates.push(DisplayUpdate::ModeChanged(Mode::Input));
                updates.extend(inner.driven_levels());
            }
            Intent::SwitchToOutput => {
                inner.switch_to_output()?;
                updates.push(DisplayUpdate::ModeChanged(Mode::Output));
                updates.extend(DisplayUpdate::blank_all());
                updates.extend(inner.driven_levels());
            }
            Intent::SetAllHigh => {
                inner.set_all(GpioLevel::High)?;
                updates.extend(inner.driven_levels());
            }
            Intent::SetAllLow => {
                inner.set_all(GpioLevel::Low)?;
                updates.extend(inner.driven_levels());
            }
            Intent::SetPin { pin, level } => {
                inner.set_pin(pin, level)?;
                updates.push(DisplayUpdate::Driven {
                    pin,
                    level: inner.regs.shadow().level(pin),
                });
            }
        }
        Ok(updates)
    }

    /// Releases the port driver. Stop any [`crate::Poller`] first.
    pub fn close(self) {
        self.inner.lock().release();
    }
}

impl<P: PortIo> Drop for F75111<P> {
    fn drop(&mut self) {
        self.inner.get_mut().release();
    }
}

impl<P: PortIo> std::fmt::Debug for F75111<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("F75111")
            .field("mode", &inner.mode)
            .field("shadow", &inner.regs.shadow())
            .finish()
    }
}
