//! USB device discovery, opening, and session lifecycle.
//!
//! [`Hd60Device::open`] scans the USB bus for a HD60 S+ or HD60 X, claims
//! the card's HID interface, and returns a session ready for I2C register
//! traffic.  The wire format generation is fixed here, at construction,
//! and never re-selected afterwards.  Sessions over distinct physical
//! devices are fully independent.

use std::fmt;
use std::sync::{Mutex, PoisonError};

use rusb::{Context, Device, UsbContext};

use crate::error::Hd60Error;
use crate::i2c::I2cCodec;
use crate::protocol::*;
use crate::transport::{HidTransport, UsbHidTransport};

/// Capture card model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceModel {
    Hd60SPlus,
    Hd60X,
}

impl DeviceModel {
    /// Which I2C-over-HID wire format the model speaks.
    pub fn generation(self) -> DeviceGeneration {
        match self {
            Self::Hd60SPlus => DeviceGeneration::Legacy,
            Self::Hd60X => DeviceGeneration::New,
        }
    }
}

impl fmt::Display for DeviceModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hd60SPlus => write!(f, "HD60 S+"),
            Self::Hd60X => write!(f, "HD60 X"),
        }
    }
}

/// I2C-over-HID wire format variant, fixed per session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceGeneration {
    /// Original framing (HD60 S+): bare triplets, split read report IDs.
    Legacy,
    /// Self-describing envelopes (HD60 X).
    New,
}

/// Result of device discovery (internal).
struct FoundDevice {
    device: Device<Context>,
    model: DeviceModel,
    pid: u16,
}

/// An open session to a capture card.
///
/// All I2C traffic on a session is serialized by an internal lock held
/// for each complete transaction (request plus response), released on
/// every exit path.  Calls block on the caller's thread; no timeouts or
/// retries happen at this layer.
pub struct Hd60Device<T: HidTransport = UsbHidTransport> {
    transport: T,
    codec: I2cCodec,
    generation: DeviceGeneration,
    bus: Mutex<()>,
}

impl Hd60Device<UsbHidTransport> {
    /// Scan the USB bus, open the first supported device, and claim its
    /// HID interface.
    pub fn open() -> Result<Self, Hd60Error> {
        let context = Context::new()?;

        let found = Self::find_device(&context)?;
        let handle = found.device.open()?;
        let interface = Self::find_hid_interface(&found.device)?;

        if handle.kernel_driver_active(interface)? {
            handle.detach_kernel_driver(interface)?;
            log::debug!("temporarily detached kernel driver from interface {interface}");
        }

        handle.claim_interface(interface)?;
        log::info!("opened {} (0fd9:{:04x}), HID interface {}", found.model, found.pid, interface);

        Ok(Self::with_transport(
            UsbHidTransport::new(handle, interface),
            found.model.generation(),
        ))
    }

    fn find_device(context: &Context) -> Result<FoundDevice, Hd60Error> {
        for device in context.devices()?.iter() {
            let desc = match device.device_descriptor() {
                Ok(d) => d,
                Err(_) => continue,
            };
            if desc.vendor_id() != VENDOR_ID {
                continue;
            }

            let pid = desc.product_id();
            let model = match pid {
                PID_HD60_S_PLUS => DeviceModel::Hd60SPlus,
                PID_HD60_X => DeviceModel::Hd60X,
                _ => continue,
            };

            return Ok(FoundDevice { device, model, pid });
        }

        Err(Hd60Error::DeviceNotFound)
    }

    /// Locate the card's HID-class interface in the active configuration.
    ///
    /// The interface number differs between models, so it is discovered
    /// from the descriptors rather than hardcoded.
    fn find_hid_interface(device: &Device<Context>) -> Result<u8, Hd60Error> {
        let config = device.active_config_descriptor()?;
        for interface in config.interfaces() {
            for desc in interface.descriptors() {
                if desc.class_code() == USB_CLASS_HID {
                    return Ok(desc.interface_number());
                }
            }
        }
        Err(Hd60Error::DeviceNotFound)
    }
}

impl<T: HidTransport> Hd60Device<T> {
    /// Build a session over a caller-supplied transport.
    ///
    /// The transport is typically [`UsbHidTransport`] (see
    /// [`Hd60Device::open`]), but anything implementing [`HidTransport`]
    /// works; tests drive sessions over scripted fakes.
    pub fn with_transport(transport: T, generation: DeviceGeneration) -> Self {
        Self {
            transport,
            codec: I2cCodec::new(generation),
            generation,
            bus: Mutex::new(()),
        }
    }

    /// The wire format generation fixed at construction.
    pub fn generation(&self) -> DeviceGeneration {
        self.generation
    }

    /// Read `len` bytes from an I2C register on the MCU.
    ///
    /// One logical transaction: the request report and the response fetch
    /// happen back to back under the session lock.  A short response
    /// yields fewer bytes than requested.
    pub fn read_register(
        &self,
        address: u8,
        register: u8,
        len: usize,
    ) -> Result<Vec<u8>, Hd60Error> {
        let request = self.codec.read_request(address, register, len)?;
        let reply = self.codec.read_reply();

        let _bus = self.bus.lock().unwrap_or_else(PoisonError::into_inner);

        self.transport
            .write(request.report_id, &request.message)
            .inspect_err(|_| {
                log::error!(
                    "I2C read request failed for address 0x{address:02x}, register 0x{register:02x}"
                );
            })?;

        let raw = self
            .transport
            .read(reply.report_id, reply.read_len)
            .inspect_err(|_| {
                log::error!(
                    "I2C read response failed for address 0x{address:02x}, register 0x{register:02x}"
                );
            })?;

        Ok(self.codec.read_data(&raw, len))
    }

    /// Write `data` to an I2C register on the MCU.
    pub fn write_register(
        &self,
        address: u8,
        register: u8,
        data: &[u8],
    ) -> Result<(), Hd60Error> {
        let request = self.codec.write_request(address, register, data)?;

        let _bus = self.bus.lock().unwrap_or_else(PoisonError::into_inner);

        self.transport
            .write(request.report_id, &request.message)
            .inspect_err(|_| {
                log::error!(
                    "I2C write failed for address 0x{address:02x}, register 0x{register:02x}"
                );
            })
    }
}
