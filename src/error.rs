//! Custom error types for the elgato-hd60-linux tool.
//!
//! Provides structured errors instead of `Box<dyn Error>`, so callers can
//! programmatically distinguish device-not-found, transport failures,
//! bad parameters, and corrupt HDMI metadata.  Callers should match on the
//! variant; message text is for diagnostics only.

use thiserror::Error;

/// Top-level error type for all elgato-hd60 operations.
#[derive(Debug, Error)]
pub enum Hd60Error {
    /// No supported Elgato device was found on the USB bus.
    #[error("Elgato HD60 S+ or HD60 X not found. Make sure it's connected.\n\
             Known PIDs: HD60 S+ (006a), HD60 X (0082)")]
    DeviceNotFound,

    /// A USB/libusb error occurred while opening or claiming the device.
    #[error("USB error: {0}")]
    Usb(#[from] rusb::Error),

    /// A HID SET_REPORT or GET_REPORT transfer failed.
    #[error("HID transfer failed: {0}")]
    Transport(String),

    /// A caller-supplied length exceeds what the wire format can carry.
    #[error("{what} of {got} bytes exceeds the {max}-byte limit")]
    InvalidParameter {
        what: &'static str,
        got: usize,
        max: usize,
    },

    /// The HDMI InfoFrame read from the device failed checksum validation.
    #[error("HDMI InfoFrame checksum mismatch")]
    ChecksumMismatch,

    /// The device returned a valid InfoFrame of a type the HDR logic
    /// cannot interpret.
    #[error("unexpected HDMI InfoFrame type 0x{0:02x}")]
    UnexpectedFrameType(u8),

    /// Invalid CLI argument value.
    #[error("Invalid value '{value}' for {arg}.\nValid values: {valid}")]
    InvalidArgument {
        arg: &'static str,
        value: String,
        valid: &'static str,
    },

    /// A required CLI argument value is missing.
    #[error("{0} requires a value")]
    MissingArgumentValue(String),
}
