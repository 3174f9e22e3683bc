//! Protocol constants for the Elgato HD60 S+ and HD60 X.
//!
//! All magic numbers, report IDs, and register addresses are defined here
//! so the rest of the codebase references named constants instead of raw hex.

// ---------------------------------------------------------------------------
// USB device identifiers
// ---------------------------------------------------------------------------

/// Elgato vendor ID (Corsair).
pub const VENDOR_ID: u16 = 0x0fd9;

/// HD60 S+ product ID (original device generation).
pub const PID_HD60_S_PLUS: u16 = 0x006a;

/// HD60 X product ID (new device generation).
pub const PID_HD60_X: u16 = 0x0082;

// ---------------------------------------------------------------------------
// MCU I2C endpoints
// ---------------------------------------------------------------------------

/// I2C address of the onboard microcontroller.
pub const I2C_ADDR_MCU: u8 = 0x55;

/// MCU register: latest HDMI Dynamic-Range InfoFrame (HDR metadata packet).
pub const REG_GET_HDR_PACKET: u8 = 0x09;

/// MCU register: hardware HDR tonemapping enable; write a single 0/1 byte.
pub const REG_HDR_TONEMAPPING: u8 = 0x0a;

// ---------------------------------------------------------------------------
// I2C-over-HID framing — new generation (HD60 X)
//
// Every transaction is a self-describing envelope:
//   [report_len, op_code, i2c_addr, write_len, register, ...]
// The report IDs below can also be queried from the HID value caps.
// ---------------------------------------------------------------------------

/// Input report ID carrying I2C read responses.
pub const REPORT_ID_NEW_I2C_READ: u8 = 5;

/// Output report ID for I2C transactions (both reads and writes go out here).
pub const REPORT_ID_NEW_I2C_WRITE: u8 = 6;

/// Envelope operation code: I2C register write.
pub const OP_I2C_WRITE: u8 = 6;

/// Envelope operation code: I2C register read.
pub const OP_I2C_READ: u8 = 7;

/// Envelope header size: report_len + op_code + i2c_addr + write_len.
pub const I2C_ENVELOPE_HEADER_SIZE: usize = 4;

/// Read-response buffer size passed to the transport as an explicit
/// override.  The read op code is encoded into the high byte of the
/// 16-bit report length (`0xFF | OP_I2C_READ << 8`).
pub const NEW_READ_REPLY_LEN: usize = 0xff | ((OP_I2C_READ as usize) << 8);

// ---------------------------------------------------------------------------
// I2C-over-HID framing — original generation (HD60 S+)
//
// Reads are split across two report IDs: the request goes out on the
// "read set" ID and the register contents come back on the "read get" ID.
// ---------------------------------------------------------------------------

/// Output report ID announcing an I2C read (`[addr, register, len]`).
pub const REPORT_ID_I2C_READ_SET: u8 = 9;

/// Input report ID carrying the announced read's register contents.
pub const REPORT_ID_I2C_READ_GET: u8 = 10;

/// Output report ID for I2C writes (`[addr, register, len, data...]`).
pub const REPORT_ID_I2C_WRITE: u8 = 11;

/// Leading header bytes in front of a "read get" response buffer.
pub const I2C_BUFFER_HEADER_SIZE: usize = 4;

// ---------------------------------------------------------------------------
// Shared I2C limits
// ---------------------------------------------------------------------------

/// Largest register read the MCU serves in one transaction.
pub const MAX_COMM_READ_BUFFER_SIZE: usize = 32;

// ---------------------------------------------------------------------------
// HID class-request plumbing (SET_REPORT / GET_REPORT transport)
// ---------------------------------------------------------------------------

/// bmRequestType for host-to-device class request.
pub const HID_REQUEST_TYPE_OUT: u8 = 0x21;
/// bmRequestType for device-to-host class request.
pub const HID_REQUEST_TYPE_IN: u8 = 0xa1;
/// HID SET_REPORT bRequest.
pub const HID_SET_REPORT: u8 = 0x09;
/// HID GET_REPORT bRequest.
pub const HID_GET_REPORT: u8 = 0x01;
/// wValue high byte for Output reports.
pub const HID_REPORT_TYPE_OUTPUT: u16 = 0x02;
/// wValue high byte for Input reports.
pub const HID_REPORT_TYPE_INPUT: u16 = 0x01;
/// USB interface class code for HID.
pub const USB_CLASS_HID: u8 = 0x03;

/// Output report size on the HD60 family, report ID byte included.
pub const HID_OUTPUT_REPORT_LEN: usize = 64;
/// Default input report size, report ID byte included.  Reads may pass an
/// explicit override instead (see [`NEW_READ_REPLY_LEN`]).
pub const HID_INPUT_REPORT_LEN: usize = 64;

/// Default USB control transfer timeout.
pub const USB_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(1);
