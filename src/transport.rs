//! HID report transport for the HD60 family.
//!
//! The I2C layer only needs two operations: send an output report and
//! fetch an input report, both addressed by report ID.  [`HidTransport`]
//! captures that boundary so the session logic can run against real
//! hardware or a scripted fake.  [`UsbHidTransport`] is the hardware
//! implementation: HID SET_REPORT / GET_REPORT class control transfers
//! via libusb, 64-byte zero-padded reports.

use rusb::{Context, DeviceHandle};

use crate::error::Hd60Error;
use crate::protocol::*;

/// Blocking, report-ID addressed HID report exchange.
///
/// Implementations own the physical connection and may block the calling
/// thread indefinitely; no timeout or retry policy lives at this layer.
pub trait HidTransport {
    /// Fetch an input report.
    ///
    /// `read_len` is the buffer size handed to the HID stack: 0 means
    /// "use the transport's default input-report size", any other value
    /// is an explicit override that must be honored (some report IDs
    /// encode their response size out-of-band, see
    /// [`crate::i2c`]).  The returned buffer is exactly what the HID
    /// stack delivered, report ID byte first.
    fn read(&self, report_id: u8, read_len: usize) -> Result<Vec<u8>, Hd60Error>;

    /// Send `message` as an output report with the given report ID.
    ///
    /// The transport frames the message itself: report ID byte first,
    /// then the message, zero-padded to the device's output-report size.
    fn write(&self, report_id: u8, message: &[u8]) -> Result<(), Hd60Error>;
}

/// A session only invokes the transport, so a shared borrow works too:
/// the caller keeps ownership and hands the session a reference.
impl<T: HidTransport + ?Sized> HidTransport for &T {
    fn read(&self, report_id: u8, read_len: usize) -> Result<Vec<u8>, Hd60Error> {
        (**self).read(report_id, read_len)
    }

    fn write(&self, report_id: u8, message: &[u8]) -> Result<(), Hd60Error> {
        (**self).write(report_id, message)
    }
}

/// SET_REPORT / GET_REPORT transport over a claimed USB HID interface.
pub struct UsbHidTransport {
    handle: DeviceHandle<Context>,
    interface: u8,
}

impl UsbHidTransport {
    /// Wrap an opened handle whose HID interface is already claimed.
    ///
    /// The transport releases the interface and reattaches the kernel
    /// driver on drop.
    pub(crate) fn new(handle: DeviceHandle<Context>, interface: u8) -> Self {
        Self { handle, interface }
    }
}

impl HidTransport for UsbHidTransport {
    fn read(&self, report_id: u8, read_len: usize) -> Result<Vec<u8>, Hd60Error> {
        let buf_len = if read_len > 0 { read_len } else { HID_INPUT_REPORT_LEN };
        let mut buf = vec![0u8; buf_len];

        let len = self.handle.read_control(
            HID_REQUEST_TYPE_IN,
            HID_GET_REPORT,
            (HID_REPORT_TYPE_INPUT << 8) | report_id as u16,
            self.interface as u16,
            &mut buf,
            USB_TIMEOUT,
        ).map_err(|e| Hd60Error::Transport(format!("GET_REPORT {report_id} failed: {e}")))?;

        buf.truncate(len);
        Ok(buf)
    }

    fn write(&self, report_id: u8, message: &[u8]) -> Result<(), Hd60Error> {
        if message.len() > HID_OUTPUT_REPORT_LEN - 1 {
            return Err(Hd60Error::InvalidParameter {
                what: "HID output report message",
                got: message.len(),
                max: HID_OUTPUT_REPORT_LEN - 1,
            });
        }

        let mut report = vec![0u8; HID_OUTPUT_REPORT_LEN];
        report[0] = report_id;
        report[1..1 + message.len()].copy_from_slice(message);

        self.handle.write_control(
            HID_REQUEST_TYPE_OUT,
            HID_SET_REPORT,
            (HID_REPORT_TYPE_OUTPUT << 8) | report_id as u16,
            self.interface as u16,
            &report,
            USB_TIMEOUT,
        ).map_err(|e| Hd60Error::Transport(format!("SET_REPORT {report_id} failed: {e}")))?;

        Ok(())
    }
}

impl Drop for UsbHidTransport {
    fn drop(&mut self) {
        if let Err(e) = self.handle.release_interface(self.interface) {
            log::warn!("failed to release interface {}: {}", self.interface, e);
        }

        // Best-effort reattach — will fail on platforms without kernel drivers
        let _ = self.handle.attach_kernel_driver(self.interface);
    }
}
