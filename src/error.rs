use crate::port::DriverStatus;
use thiserror::Error;

/// Errors that can occur when controlling the F75111 GPIO lines.
///
/// Failures are terminal for the attempted operation. Nothing is retried and
/// partially applied output state is not rolled back.
#[derive(Error, Debug)]
pub enum Error {
    /// The port I/O driver did not load. Fatal for the whole session.
    #[error("Port I/O driver failed to load: {status}")]
    DriverLoad {
        /// Status reported by the port I/O driver.
        status: DriverStatus,
    },
    /// I/O error reported by the port I/O primitive.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// The SMBus host controller reported a failed or incomplete transaction.
    /// Only produced when status verification is enabled.
    #[error(
        "SMBus transaction at register 0x{offset:02X} failed: host status 0x{status:02X}"
    )]
    BusTransaction {
        /// The chip register offset targeted by the transaction.
        offset: u8,
        /// Raw host status byte read after the settle delay.
        status: u8,
    },
    /// The operation is not allowed in the current GPIO mode.
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
    /// Logical pin number outside 1-8.
    #[error("GPIO pin {pin} argument out of range (1-8): {message}")]
    PinArgumentOutOfRange {
        /// The invalid pin number that was specified.
        pin: u8,
        /// Detailed error message explaining the constraint.
        message: String,
    },
    /// Function argument is outside the valid range.
    #[error("Argument out of range: {0}")]
    ArgumentOutOfRange(String),
}

/// Result type alias for F75111 operations.
pub type Result<T> = std::result::Result<T, Error>;

pub(crate) fn pin_write_in_input_mode(pin_label: &str) -> Error {
    Error::InvalidOperation(format!(
        "cannot drive {} while the GPIO lines are in input mode",
        pin_label
    ))
}
