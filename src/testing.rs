//! Recording port double that emulates the SMBus host and the F75111
//! register file.
//!
//! Only visible to unit tests. Integration tests cannot reach `#[cfg(test)]`
//! items, so `tests/common/mod.rs` carries its own emulator built on the
//! public `PortIo` trait. Keep the two separate.

use crate::consts::smbus;
use crate::port::{DriverStatus, PortIo};
use parking_lot::{Mutex, MutexGuard};
use std::collections::HashMap;
use std::io;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PortOp {
    Write(u16, u8),
    Read(u16, u8),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BusOp {
    Write(u8, u8),
    Read(u8),
}

#[derive(Debug, Default)]
struct State {
    ops: Vec<PortOp>,
    bus: Vec<BusOp>,
    registers: HashMap<u8, u8>,
    cmd: u8,
    slv: u8,
    data: u8,
    status: u8,
    fail_writes: bool,
    fail_after: Option<usize>,
    deinit_count: usize,
}

/// Cloning shares the recorded state, so a test can keep one copy while the
/// device owns the other.
#[derive(Debug, Clone)]
pub(crate) struct FakePort {
    state: Arc<Mutex<State>>,
    load_status: DriverStatus,
}

impl FakePort {
    pub(crate) fn new() -> Self {
        Self::with_status(DriverStatus::Ok)
    }

    pub(crate) fn with_status(load_status: DriverStatus) -> Self {
        Self {
            state: Arc::new(Mutex::new(State::default())),
            load_status,
        }
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock()
    }

    pub(crate) fn ops(&self) -> Vec<PortOp> {
        self.state().ops.clone()
    }

    pub(crate) fn bus_ops(&self) -> Vec<BusOp> {
        self.state().bus.clone()
    }

    pub(crate) fn clear(&self) {
        let mut state = self.state();
        state.ops.clear();
        state.bus.clear();
    }

    pub(crate) fn set_register(&self, offset: u8, value: u8) {
        self.state().registers.insert(offset, value);
    }

    pub(crate) fn register(&self, offset: u8) -> u8 {
        self.state().registers.get(&offset).copied().unwrap_or(0)
    }

    pub(crate) fn set_status(&self, status: u8) {
        self.state().status = status;
    }

    pub(crate) fn fail_writes(&self, fail: bool) {
        self.state().fail_writes = fail;
    }

    /// Fails every port write once `transactions` bus transactions have
    /// completed since the last [`FakePort::clear`].
    pub(crate) fn fail_after(&self, transactions: usize) {
        self.state().fail_after = Some(transactions);
    }

    pub(crate) fn deinit_count(&self) -> usize {
        self.state().deinit_count
    }
}

impl PortIo for FakePort {
    fn load_status(&self) -> DriverStatus {
        self.load_status
    }

    fn write_io_port_byte(&mut self, port: u16, value: u8) -> io::Result<()> {
        let mut state = self.state();
        let exhausted = state.fail_after.is_some_and(|n| state.bus.len() >= n);
        if state.fail_writes || exhausted {
            return Err(io::Error::other("simulated port failure"));
        }
        state.ops.push(PortOp::Write(port, value));
        match port {
            smbus::PORT_CMD => state.cmd = value,
            smbus::PORT_SLV => state.slv = value,
            smbus::PORT_DATA => state.data = value,
            smbus::PORT_CTRL if value == smbus::CTRL_START_BYTE_DATA => {
                let cmd = state.cmd;
                if state.slv & smbus::SLAVE_READ_BIT == 0 {
                    let data = state.data;
                    state.registers.insert(cmd, data);
                    state.bus.push(BusOp::Write(cmd, data));
                } else {
                    state.data = state.registers.get(&cmd).copied().unwrap_or(0);
                    state.bus.push(BusOp::Read(cmd));
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn read_io_port_byte(&mut self, port: u16) -> io::Result<u8> {
        let mut state = self.state();
        let value = match port {
            smbus::PORT_STATUS => state.status,
            smbus::PORT_DATA => state.data,
            _ => 0xFF,
        };
        state.ops.push(PortOp::Read(port, value));
        Ok(value)
    }

    fn deinitialize(&mut self) {
        self.state().deinit_count += 1;
    }
}
