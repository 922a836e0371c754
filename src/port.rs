//! Byte-granular access to x86 I/O ports.
//!
//! The privileged port driver is an external collaborator. The rest of the
//! crate only needs the [`PortIo`] trait: a load status checked once at
//! startup, single-byte reads and writes, and a one-shot deinitialize.
//! [`DevPort`] implements it on top of the Linux `/dev/port` device.

use log::{debug, trace, warn};
use std::fmt;
use std::io;

/// Load status reported by a port I/O driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverStatus {
    /// Driver loaded and usable.
    Ok,
    /// Driver (or its device node/library) could not be found.
    DriverNotFound,
    /// Driver found but of an unsupported version.
    IncorrectVersion,
    /// Driver found but failed to initialize (missing privileges or no
    /// matching hardware interface on this host).
    InitializeError,
    /// Any other failure, with the raw code reported by the driver.
    Unknown(u32),
}

impl DriverStatus {
    /// Returns true if the driver can be used.
    pub fn is_ok(&self) -> bool {
        *self == DriverStatus::Ok
    }

    /// Human-readable explanation of the status.
    pub fn description(&self) -> &'static str {
        match self {
            DriverStatus::Ok => "driver loaded",
            DriverStatus::DriverNotFound => "port I/O driver not found",
            DriverStatus::IncorrectVersion => {
                "port I/O driver has an incorrect version; check that the expected build is installed"
            }
            DriverStatus::InitializeError => {
                "port I/O driver could not initialize; check privileges and that this host carries the F75111 DIO module"
            }
            DriverStatus::Unknown(_) => "unknown error",
        }
    }

    /// Maps the error from opening a port device node to a load status.
    pub fn from_open_error(err: &io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => DriverStatus::DriverNotFound,
            io::ErrorKind::PermissionDenied => DriverStatus::InitializeError,
            _ => DriverStatus::Unknown(err.raw_os_error().unwrap_or(0) as u32),
        }
    }
}

impl fmt::Display for DriverStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DriverStatus::Unknown(code) => write!(f, "{} (code {})", self.description(), code),
            _ => f.write_str(self.description()),
        }
    }
}

/// Primitive port I/O operations consumed by the SMBus driver.
///
/// Implementations are owned by exactly one [`crate::F75111`] handle, which
/// calls [`PortIo::deinitialize`] exactly once when it is closed.
pub trait PortIo {
    /// Reports whether the driver loaded. Checked once when the handle opens.
    fn load_status(&self) -> DriverStatus;

    /// Writes one byte to an I/O port.
    fn write_io_port_byte(&mut self, port: u16, value: u8) -> io::Result<()>;

    /// Reads one byte from an I/O port.
    fn read_io_port_byte(&mut self, port: u16) -> io::Result<u8>;

    /// Releases the driver. No port access happens afterwards.
    fn deinitialize(&mut self);
}

/// Port I/O through the Linux `/dev/port` character device.
///
/// Each access is a positioned one-byte read or write at file offset `port`.
/// Opening the device requires `CAP_SYS_RAWIO` (usually root).
#[cfg(unix)]
#[derive(Debug)]
pub struct DevPort {
    file: Option<std::fs::File>,
    status: DriverStatus,
}

#[cfg(unix)]
impl DevPort {
    /// Opens the given port device. Failure is not returned here; it is
    /// reported through [`PortIo::load_status`] like any other driver.
    pub fn load<P: AsRef<std::path::Path>>(path: P) -> Self {
        let path = path.as_ref();
        match std::fs::OpenOptions::new()
            .read(true)
            .write(true)
            .open(path)
        {
            Ok(file) => {
                debug!("Opened port device {}", path.display());
                DevPort {
                    file: Some(file),
                    status: DriverStatus::Ok,
                }
            }
            Err(e) => {
                let status = DriverStatus::from_open_error(&e);
                warn!("Failed to open port device {}: {}", path.display(), e);
                DevPort { file: None, status }
            }
        }
    }

    /// Opens `/dev/port`.
    pub fn load_default() -> Self {
        Self::load(crate::consts::DEFAULT_PORT_DEVICE)
    }

    fn file(&self) -> io::Result<&std::fs::File> {
        self.file
            .as_ref()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotConnected, "port device is not open"))
    }
}

#[cfg(unix)]
impl PortIo for DevPort {
    fn load_status(&self) -> DriverStatus {
        self.status
    }

    fn write_io_port_byte(&mut self, port: u16, value: u8) -> io::Result<()> {
        use std::os::unix::fs::FileExt;
        trace!("outb 0x{:03X} <- 0x{:02X}", port, value);
        self.file()?.write_all_at(&[value], u64::from(port))
    }

    fn read_io_port_byte(&mut self, port: u16) -> io::Result<u8> {
        use std::os::unix::fs::FileExt;
        let mut buf = [0u8; 1];
        self.file()?.read_exact_at(&mut buf, u64::from(port))?;
        trace!("inb 0x{:03X} -> 0x{:02X}", port, buf[0]);
        Ok(buf[0])
    }

    fn deinitialize(&mut self) {
        if self.file.take().is_some() {
            debug!("Closed port device");
        }
    }
}
