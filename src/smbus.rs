//! Single-byte SMBus transactions driven through the chipset host controller
//! ports.

use crate::config::BusConfig;
use crate::consts::{f75111, smbus};
use crate::error::{Error, Result};
use crate::port::PortIo;
use log::{trace, warn};
use std::fmt;
use std::thread;

/// Direction and payload of one bus operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Read one byte from the register.
    Read,
    /// Write the given byte to the register.
    Write(u8),
}

/// One single-byte SMBus operation against an F75111 register offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SmbusTransaction {
    pub offset: u8,
    pub access: Access,
}

impl SmbusTransaction {
    pub fn read(offset: u8) -> Self {
        Self {
            offset,
            access: Access::Read,
        }
    }

    pub fn write(offset: u8, value: u8) -> Self {
        Self {
            offset,
            access: Access::Write(value),
        }
    }

    /// Slave address byte sent for this transaction (0x9C write, 0x9D read).
    pub fn slave_address(&self) -> u8 {
        match self.access {
            Access::Read => f75111::SLAVE_ADDR | smbus::SLAVE_READ_BIT,
            Access::Write(_) => f75111::SLAVE_ADDR,
        }
    }
}

impl fmt::Display for SmbusTransaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.access {
            Access::Read => write!(f, "read reg 0x{:02X}", self.offset),
            Access::Write(v) => write!(f, "write reg 0x{:02X} = 0x{:02X}", self.offset, v),
        }
    }
}

/// Sequences port accesses into SMBus byte transactions.
///
/// Completion is a fixed settle delay: no retry, and unless
/// [`BusConfig::verify_status`] is set, no status check. An unacknowledged
/// read returns whatever byte sits in the DATA port.
#[derive(Debug)]
pub struct SmbusDriver<P: PortIo> {
    port: P,
    config: BusConfig,
}

impl<P: PortIo> SmbusDriver<P> {
    pub fn new(port: P, config: BusConfig) -> Self {
        Self { port, config }
    }

    pub fn config(&self) -> &BusConfig {
        &self.config
    }

    pub fn port(&self) -> &P {
        &self.port
    }

    pub(crate) fn port_mut(&mut self) -> &mut P {
        &mut self.port
    }

    /// Writes one byte to a chip register.
    pub fn write_register(&mut self, offset: u8, value: u8) -> Result<()> {
        self.execute(SmbusTransaction::write(offset, value))
            .map(|_| ())
    }

    /// Reads one byte from a chip register.
    pub fn read_register(&mut self, offset: u8) -> Result<u8> {
        let value = self.execute(SmbusTransaction::read(offset))?;
        Ok(value.unwrap_or_default())
    }

    /// Runs one transaction to completion. Returns the DATA byte for reads.
    pub fn execute(&mut self, txn: SmbusTransaction) -> Result<Option<u8>> {
        trace!("SMBus {}", txn);
        self.port
            .write_io_port_byte(smbus::PORT_STATUS, smbus::STATUS_CLEAR)?;
        self.port.write_io_port_byte(smbus::PORT_CMD, txn.offset)?;
        self.port
            .write_io_port_byte(smbus::PORT_SLV, txn.slave_address())?;
        let settle = match txn.access {
            Access::Write(value) => {
                self.port.write_io_port_byte(smbus::PORT_DATA, value)?;
                self.config.write_settle
            }
            Access::Read => self.config.read_settle,
        };
        self.port
            .write_io_port_byte(smbus::PORT_CTRL, smbus::CTRL_START_BYTE_DATA)?;
        if !settle.is_zero() {
            thread::sleep(settle);
        }

        if self.config.verify_status {
            self.check_status(txn.offset)?;
        }

        match txn.access {
            Access::Read => {
                let value = self.port.read_io_port_byte(smbus::PORT_DATA)?;
                trace!("SMBus reg 0x{:02X} -> 0x{:02X}", txn.offset, value);
                Ok(Some(value))
            }
            Access::Write(_) => Ok(None),
        }
    }

    fn check_status(&mut self, offset: u8) -> Result<()> {
        let status = self.port.read_io_port_byte(smbus::PORT_STATUS)?;
        if status & smbus::status::ERROR_MASK != 0 || status & smbus::status::INTR == 0 {
            warn!(
                "SMBus transaction at reg 0x{:02X} not completed: status=0x{:02X}",
                offset, status
            );
            return Err(Error::BusTransaction { offset, status });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakePort, PortOp};

    fn driver(port: FakePort) -> SmbusDriver<FakePort> {
        SmbusDriver::new(port, BusConfig::immediate())
    }

    #[test]
    fn test_write_sequence() {
        let mut bus = driver(FakePort::new());
        bus.write_register(0x11, 0x04).unwrap();
        assert_eq!(
            bus.port().ops(),
            vec![
                PortOp::Write(0x400, 0x42),
                PortOp::Write(0x403, 0x11),
                PortOp::Write(0x404, 0x9C),
                PortOp::Write(0x405, 0x04),
                PortOp::Write(0x402, 0x48),
            ]
        );
    }

    #[test]
    fn test_read_sequence() {
        let port = FakePort::new();
        port.set_register(0x12, 0xA5);
        let mut bus = driver(port);
        assert_eq!(bus.read_register(0x12).unwrap(), 0xA5);
        assert_eq!(
            bus.port().ops(),
            vec![
                PortOp::Write(0x400, 0x42),
                PortOp::Write(0x403, 0x12),
                PortOp::Write(0x404, 0x9D),
                PortOp::Write(0x402, 0x48),
                PortOp::Read(0x405, 0xA5),
            ]
        );
    }

    #[test]
    fn test_slave_address() {
        assert_eq!(SmbusTransaction::write(0x10, 0).slave_address(), 0x9C);
        assert_eq!(SmbusTransaction::read(0x10).slave_address(), 0x9D);
    }

    #[test]
    fn test_transaction_display() {
        assert_eq!(
            SmbusTransaction::write(0x21, 0xFF).to_string(),
            "write reg 0x21 = 0xFF"
        );
        assert_eq!(SmbusTransaction::read(0x22).to_string(), "read reg 0x22");
    }

    #[test]
    fn test_status_not_read_by_default() {
        let port = FakePort::new();
        port.set_status(smbus::status::DEV_ERR);
        let mut bus = driver(port);
        bus.write_register(0x10, 0xFF).unwrap();
        assert!(!bus.port().ops().contains(&PortOp::Read(0x400, smbus::status::DEV_ERR)));
    }

    #[test]
    fn test_status_verification_reports_device_error() {
        let port = FakePort::new();
        port.set_status(smbus::status::INTR | smbus::status::DEV_ERR);
        let mut bus = SmbusDriver::new(
            port,
            BusConfig {
                verify_status: true,
                ..BusConfig::immediate()
            },
        );
        match bus.read_register(0x12) {
            Err(Error::BusTransaction { offset, status }) => {
                assert_eq!(offset, 0x12);
                assert_eq!(status, 0x06);
            }
            other => panic!("expected bus transaction error, got {:?}", other),
        }
        // DATA is never sampled after a failed status check
        assert!(!bus
            .port()
            .ops()
            .iter()
            .any(|op| matches!(op, PortOp::Read(0x405, _))));
    }

    #[test]
    fn test_status_verification_passes_on_completion() {
        let port = FakePort::new();
        port.set_status(smbus::status::INTR);
        port.set_register(0x22, 0x03);
        let mut bus = SmbusDriver::new(
            port,
            BusConfig {
                verify_status: true,
                ..BusConfig::immediate()
            },
        );
        assert_eq!(bus.read_register(0x22).unwrap(), 0x03);
    }

    #[test]
    fn test_status_verification_requires_completion_bit() {
        let port = FakePort::new();
        port.set_status(0x00);
        let mut bus = SmbusDriver::new(
            port,
            BusConfig {
                verify_status: true,
                ..BusConfig::immediate()
            },
        );
        assert!(matches!(
            bus.write_register(0x11, 0x01),
            Err(Error::BusTransaction { offset: 0x11, status: 0x00 })
        ));
    }

    #[test]
    fn test_port_error_propagates() {
        let port = FakePort::new();
        port.fail_writes(true);
        let mut bus = driver(port);
        assert!(matches!(bus.write_register(0x11, 0x01), Err(Error::Io(_))));
    }
}
