//! Elgato HD60 S+ / HD60 X HDR controller library.
//!
//! Detects whether the HDMI source feeding an Elgato HD60 S+ or HD60 X
//! capture card is HDR, and toggles the card's hardware HDR-to-SDR
//! tonemapping.  Communication runs over an I2C-over-HID protocol to the
//! card's microcontroller; the HDR status itself is a CEA-861 HDMI
//! Dynamic-Range InfoFrame mirrored in an MCU register.
//!
//! # Quick Start
//!
//! ```no_run
//! use elgato_hd60_linux::{Hd60Device, HdrMode};
//!
//! let device = Hd60Device::open()?;
//!
//! if device.video_hdr_mode()? == HdrMode::Hdr {
//!     device.set_hdr_tonemapping(true)?;
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod device;
mod error;
mod hdr;
pub mod i2c;
pub mod infoframe;
mod protocol;
mod transport;

pub use device::{DeviceGeneration, DeviceModel, Hd60Device};
pub use error::Hd60Error;
pub use hdr::HdrMode;
pub use infoframe::{DynamicRangePayload, Eotf, InfoFrame};
pub use transport::{HidTransport, UsbHidTransport};
