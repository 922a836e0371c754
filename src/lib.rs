//! # f75111-gpio
//!
//! A Rust crate for controlling the eight digital I/O lines of a Fintek
//! F75111 DIO companion chip. The chip sits on the host chipset's SMBus and is
//! reached by writing the SMBus host controller's I/O ports directly.
//!
//! ## Features
//!
//! *   Port I/O abstraction (`PortIo`) with load status and a one-shot
//!     deinitialize, plus a Linux `/dev/port` backend (`DevPort`).
//! *   Single-byte SMBus write/read transactions (`SmbusDriver`) with fixed
//!     settle delays and optional host status verification.
//! *   Typed GPIO access:
//!     *   Strongly-typed `GpioPin` (logical pins 1-8).
//!     *   Driving single pins or all pins at once.
//!     *   Sampling both input registers (`InputSnapshot`).
//! *   Input/Output mode switching, including the chip's power-up-high
//!     workaround when entering input mode.
//! *   A background input `Poller` that shares the device lock with user
//!     operations.
//! *   A front-end event interface (`Intent`, `DisplayUpdate`,
//!     `DisplaySink`) and the `f75111-gpio` terminal tool (`cli` feature).
//!
//! ## Chip Support & Limitations
//!
//! *   Exactly one F75111 at SMBus address 0x9C behind a host controller at
//!     I/O base 0x400.
//! *   Only byte-data transactions. No block transfers, no arbitration or
//!     clock-stretching handling.
//! *   **Completion is not verified by default.** Each transaction waits a
//!     fixed delay (1 ms write, 2 ms read) and a read returns whatever byte is
//!     in the DATA port. Enable `BusConfig::verify_status` to check the host
//!     status register once after the delay.
//! *   Output registers are never read back. The handle keeps an output
//!     shadow; a failed write can leave it out of sync with the chip.
//!
//! ## Basic Usage
//!
//! ```no_run
//! use f75111_gpio::{DevPort, F75111, GpioLevel, GpioPin, Result};
//!
//! fn main() -> Result<()> {
//!     // Optional: Initialize logging
//!     // env_logger::init();
//!
//!     // Needs CAP_SYS_RAWIO (usually root)
//!     let device = F75111::open(DevPort::load_default())?;
//!
//!     // Sample inputs (the handle starts in input mode)
//!     if let Some(inputs) = device.sample_inputs()? {
//!         for (pin, level) in inputs.levels() {
//!             println!("{}: {}", pin, level);
//!         }
//!     }
//!
//!     // Drive pin 3 high
//!     device.switch_to_output()?;
//!     device.set_pin(GpioPin::new(3)?, GpioLevel::High)?;
//!
//!     // Back to input: pins are forced low once
//!     device.switch_to_input()?;
//!     device.close();
//!     Ok(())
//! }
//! ```
//!
//! ## Input Mode Quirk
//!
//! When the direction registers switch to input, the F75111 pulls the pins
//! high. `F75111::switch_to_input` therefore writes the direction registers
//! to input, records input mode, sets them back to output and writes 0x00 to
//! both output registers. The direction registers stay at 0xFF afterwards
//! while the handle reports `Mode::Input`. This is intentional.
//!
//! ## Pin Mapping
//!
//! | Pin | Register set | Bit |
//! |-----|--------------|-----|
//! | 1-3 | SET1 | 0, 1, 2 |
//! | 4   | SET1 | 4 |
//! | 5-6 | SET1 | 6, 7 |
//! | 7-8 | SET2 | 0, 1 |
//!
//! Bits 3 and 5 of SET1 are not used.
//!
//! ## License
//!
//! This project is licensed under the WTFPL.

mod consts;
pub mod config;
pub mod device;
mod error;
pub mod gpio;
pub mod poll;
pub mod port;
pub mod smbus;
pub mod ui;

#[cfg(test)]
mod testing;

pub use config::{BusConfig, PollConfig};
pub use device::F75111;
pub use error::{Error, Result};
pub use gpio::{
    GpioDirection, GpioLevel, GpioPin, InputSnapshot, Mode, OutputShadow, RegisterSet,
};
pub use poll::{poll_once, Poller};
#[cfg(unix)]
pub use port::DevPort;
pub use port::{DriverStatus, PortIo};
pub use smbus::{SmbusDriver, SmbusTransaction};
pub use ui::{DisplaySink, DisplayUpdate, Intent};

/// Fixed I/O ports and F75111 register offsets.
pub mod registers {
    pub use crate::consts::f75111::*;
    pub use crate::consts::smbus::{
        status, CTRL_START_BYTE_DATA, PORT_CMD, PORT_CTRL, PORT_DATA, PORT_SLV, PORT_STATUS,
        SLAVE_READ_BIT, STATUS_CLEAR,
    };
    pub use crate::consts::DEFAULT_PORT_DEVICE;
}
