//! Shared test fixture: an in-memory SMBus host with an F75111 behind it.
//!
//! `src/testing.rs` has a similar emulator for unit tests, but `#[cfg(test)]`
//! items are invisible here. This one only uses the public `PortIo` trait.

#![allow(dead_code)]

use f75111_gpio::registers::{
    CTRL_START_BYTE_DATA, PORT_CMD, PORT_CTRL, PORT_DATA, PORT_SLV, PORT_STATUS, SLAVE_ADDR,
    SLAVE_READ_BIT,
};
use f75111_gpio::{BusConfig, DriverStatus, F75111, PortIo};
use parking_lot::Mutex;
use std::io;
use std::sync::Arc;

/// A register-level transaction seen by the emulated chip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChipOp {
    Write(u8, u8),
    Read(u8),
}

#[derive(Debug)]
struct Chip {
    registers: [u8; 256],
    ops: Vec<ChipOp>,
    cmd: u8,
    slv: u8,
    data: u8,
    status: u8,
    deinit_calls: usize,
}

/// Port driver double. Clones share the same chip, so a test can keep one
/// while the device owns another.
#[derive(Debug, Clone)]
pub struct EmulatedPort {
    chip: Arc<Mutex<Chip>>,
    load_status: DriverStatus,
}

impl EmulatedPort {
    pub fn new() -> Self {
        Self::with_status(DriverStatus::Ok)
    }

    pub fn with_status(load_status: DriverStatus) -> Self {
        Self {
            chip: Arc::new(Mutex::new(Chip {
                registers: [0; 256],
                ops: Vec::new(),
                cmd: 0,
                slv: 0,
                data: 0,
                status: 0,
                deinit_calls: 0,
            })),
            load_status,
        }
    }

    pub fn ops(&self) -> Vec<ChipOp> {
        self.chip.lock().ops.clone()
    }

    pub fn clear_ops(&self) {
        self.chip.lock().ops.clear();
    }

    pub fn register(&self, offset: u8) -> u8 {
        self.chip.lock().registers[usize::from(offset)]
    }

    pub fn set_register(&self, offset: u8, value: u8) {
        self.chip.lock().registers[usize::from(offset)] = value;
    }

    /// Host status reported after the next transactions.
    pub fn set_status(&self, status: u8) {
        self.chip.lock().status = status;
    }

    pub fn deinit_calls(&self) -> usize {
        self.chip.lock().deinit_calls
    }
}

impl PortIo for EmulatedPort {
    fn load_status(&self) -> DriverStatus {
        self.load_status
    }

    fn write_io_port_byte(&mut self, port: u16, value: u8) -> io::Result<()> {
        let mut chip = self.chip.lock();
        match port {
            PORT_STATUS => {}
            PORT_CMD => chip.cmd = value,
            PORT_SLV => chip.slv = value,
            PORT_DATA => chip.data = value,
            PORT_CTRL if value == CTRL_START_BYTE_DATA => {
                let cmd = chip.cmd;
                if chip.slv == SLAVE_ADDR {
                    let data = chip.data;
                    chip.registers[usize::from(cmd)] = data;
                    chip.ops.push(ChipOp::Write(cmd, data));
                } else if chip.slv == SLAVE_ADDR | SLAVE_READ_BIT {
                    chip.data = chip.registers[usize::from(cmd)];
                    chip.ops.push(ChipOp::Read(cmd));
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn read_io_port_byte(&mut self, port: u16) -> io::Result<u8> {
        let chip = self.chip.lock();
        Ok(match port {
            PORT_STATUS => chip.status,
            PORT_DATA => chip.data,
            _ => 0,
        })
    }

    fn deinitialize(&mut self) {
        self.chip.lock().deinit_calls += 1;
    }
}

/// Opens a device with zero settle delays and clears the initialization
/// writes from the log.
pub fn open_device() -> (EmulatedPort, F75111<EmulatedPort>) {
    let port = EmulatedPort::new();
    let device = F75111::open_with_config(port.clone(), BusConfig::immediate())
        .expect("emulated device should open");
    port.clear_ops();
    (port, device)
}
