//! Internal constants, port addresses, register offsets and control bytes.

// --- SMBus host controller (chipset) I/O ports ---
pub mod smbus {
    /// Base I/O address of the chipset SMBus host controller.
    pub const BASE: u16 = 0x400;

    pub const PORT_STATUS: u16 = BASE; // Host status
    pub const PORT_CTRL: u16 = BASE + 2; // Host control
    pub const PORT_CMD: u16 = BASE + 3; // Host command (target register offset)
    pub const PORT_SLV: u16 = BASE + 4; // Transmit slave address
    pub const PORT_DATA: u16 = BASE + 5; // Host data 0

    /// Written to STATUS before each transaction to clear stale flags.
    pub const STATUS_CLEAR: u8 = 0x42;
    /// Written to CTRL to start a byte-data transaction (START | BYTE_DATA).
    pub const CTRL_START_BYTE_DATA: u8 = 0x48;

    /// Read/write bit OR-ed into the slave address byte for reads.
    pub const SLAVE_READ_BIT: u8 = 0x01;

    // Host status bits, only consulted when status verification is enabled
    pub mod status {
        /// Transaction completed.
        pub const INTR: u8 = 1 << 1;
        /// Device error (no acknowledge, illegal command).
        pub const DEV_ERR: u8 = 1 << 2;
        /// Bus collision.
        pub const BUS_ERR: u8 = 1 << 3;
        /// Transaction killed.
        pub const FAILED: u8 = 1 << 4;

        pub const ERROR_MASK: u8 = DEV_ERR | BUS_ERR | FAILED;
    }
}

// --- F75111 chip ---
pub mod f75111 {
    /// 8-bit SMBus slave address of the F75111 (write form).
    pub const SLAVE_ADDR: u8 = 0x9C;

    // GPIO register offsets
    pub const REG_SET1_DIR: u8 = 0x10;
    pub const REG_SET1_OUTPUT: u8 = 0x11;
    pub const REG_SET1_INPUT: u8 = 0x12;
    pub const REG_SET2_DIR: u8 = 0x20;
    pub const REG_SET2_OUTPUT: u8 = 0x21;
    pub const REG_SET2_INPUT: u8 = 0x22;

    /// Direction register value with every bit configured as input.
    pub const DIR_ALL_INPUT: u8 = 0x00;
    /// Direction register value with every bit configured as output.
    pub const DIR_ALL_OUTPUT: u8 = 0xFF;
}

/// Path of the Linux port I/O character device.
pub const DEFAULT_PORT_DEVICE: &str = "/dev/port";
