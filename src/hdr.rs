//! HDMI HDR detection and tonemapping control.
//!
//! HDR-capable cards mirror the most recent HDMI Dynamic-Range InfoFrame
//! in an MCU register.  A query reads that register, repairs the known
//! firmware payload-length defect, validates the checksum, and keys the
//! HDR/SDR decision on the frame type and the EOTF field.

use std::fmt;

use crate::device::{DeviceGeneration, Hd60Device};
use crate::error::Hd60Error;
use crate::infoframe::{
    Eotf, InfoFrame, INFOFRAME_TYPE_DR, INFOFRAME_TYPE_RESERVED, type_name,
};
use crate::protocol::*;
use crate::transport::HidTransport;

/// Dynamic range of the incoming HDMI signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HdrMode {
    Hdr,
    Sdr,
}

impl fmt::Display for HdrMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hdr => write!(f, "HDR"),
            Self::Sdr => write!(f, "SDR"),
        }
    }
}

impl<T: HidTransport> Hd60Device<T> {
    /// Fetch the current HDMI Dynamic-Range InfoFrame from the MCU.
    ///
    /// The firmware payload-length workaround has already been applied to
    /// the returned frame; callers still need
    /// [`is_valid`](InfoFrame::is_valid) before trusting payload fields.
    pub fn hdmi_hdr_status_frame(&self) -> Result<InfoFrame, Hd60Error> {
        // Original-generation responses carry one extra leading byte
        // ahead of the InfoFrame.
        let read_len = match self.generation() {
            DeviceGeneration::New => MAX_COMM_READ_BUFFER_SIZE,
            DeviceGeneration::Legacy => MAX_COMM_READ_BUFFER_SIZE + 1,
        };

        let raw = self.read_register(I2C_ADDR_MCU, REG_GET_HDR_PACKET, read_len)?;
        let frame_bytes = match self.generation() {
            DeviceGeneration::New => raw.as_slice(),
            DeviceGeneration::Legacy => raw.get(1..).unwrap_or(&[]),
        };

        let mut frame = InfoFrame::parse(frame_bytes);
        frame.fix_oversized_payload_length();
        Ok(frame)
    }

    /// Classify the incoming HDMI signal as HDR or SDR.
    ///
    /// Recomputed from the device on every call; nothing is cached.
    pub fn video_hdr_mode(&self) -> Result<HdrMode, Hd60Error> {
        classify(&self.hdmi_hdr_status_frame()?)
    }

    /// Enable or disable hardware HDR-to-SDR tonemapping.
    ///
    /// Writes the control register and returns; there is no read-back
    /// verification.
    pub fn set_hdr_tonemapping(&self, enable: bool) -> Result<(), Hd60Error> {
        self.write_register(I2C_ADDR_MCU, REG_HDR_TONEMAPPING, &[enable as u8])
    }
}

/// Decide HDR/SDR from a status frame.
fn classify(frame: &InfoFrame) -> Result<HdrMode, Hd60Error> {
    if !frame.is_valid() {
        log::warn!("HDMI metadata failed checksum validation");
        return Err(Hd60Error::ChecksumMismatch);
    }

    match frame.header().type_code {
        INFOFRAME_TYPE_DR => {
            if frame.dynamic_range().eotf == Eotf::SdrGamma {
                // HD60 X firmware keeps transmitting valid SDR metadata
                Ok(HdrMode::Sdr)
            } else {
                Ok(HdrMode::Hdr)
            }
        }
        // All-zero frame: no active metadata, the HD60 S+ idle state
        INFOFRAME_TYPE_RESERVED if frame.is_all_zero() => Ok(HdrMode::Sdr),
        other => {
            log::warn!("HDMI metadata: unexpected header type {other} ({})", type_name(other));
            Err(Hd60Error::UnexpectedFrameType(other))
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    /// Valid ST 2084 Dynamic-Range frame (see infoframe tests).
    const DR_FRAME: [u8; 30] = [
        0x87, 0x01, 0x1a, 0x8d,
        0x02, 0x00, 0xfa, 0x00, 0xae, 0x02, 0x85, 0x00,
        0x29, 0x00, 0xa3, 0x02, 0x5c, 0x01, 0x40, 0x01,
        0x51, 0x01, 0xdb, 0x05, 0x00, 0x00, 0xdb, 0x05,
        0x1f, 0x03,
    ];

    #[test]
    fn st2084_frame_classifies_as_hdr() {
        let frame = InfoFrame::parse(&DR_FRAME);
        assert_eq!(classify(&frame).unwrap(), HdrMode::Hdr);
    }

    #[test]
    fn sdr_gamma_frame_classifies_as_sdr() {
        let mut raw = DR_FRAME;
        raw[4] = 0x00; // EOTF byte: ST 2084 -> SDR gamma
        raw[3] = raw[3].wrapping_add(0x02); // rebalance the checksum
        let frame = InfoFrame::parse(&raw);
        assert!(frame.is_valid());
        assert_eq!(classify(&frame).unwrap(), HdrMode::Sdr);
    }

    #[test]
    fn hlg_frame_classifies_as_hdr() {
        let mut raw = DR_FRAME;
        raw[4] = 0x03;
        raw[3] = raw[3].wrapping_sub(0x01);
        assert_eq!(classify(&InfoFrame::parse(&raw)).unwrap(), HdrMode::Hdr);
    }

    #[test]
    fn all_zero_frame_classifies_as_sdr() {
        let frame = InfoFrame::parse(&[0u8; 32]);
        assert_eq!(classify(&frame).unwrap(), HdrMode::Sdr);
    }

    #[test]
    fn corrupt_frame_is_a_checksum_error() {
        let mut raw = DR_FRAME;
        raw[10] ^= 0x40;
        assert!(matches!(
            classify(&InfoFrame::parse(&raw)),
            Err(Hd60Error::ChecksumMismatch)
        ));
    }

    #[test]
    fn avi_frame_is_an_unexpected_type() {
        // AVI header with a balancing checksum: valid frame, wrong type
        let mut raw = [0u8; 17];
        raw[0] = 0x82;
        raw[1] = 0x02;
        raw[2] = 13;
        raw[3] = 0u8.wrapping_sub(0x82 + 0x02 + 13);
        let frame = InfoFrame::parse(&raw);
        assert!(frame.is_valid());
        assert!(matches!(
            classify(&frame),
            Err(Hd60Error::UnexpectedFrameType(0x02))
        ));
    }

    #[test]
    fn nonzero_reserved_frame_is_an_unexpected_type() {
        // Type 0 but not the all-zero idle pattern
        let mut raw = [0u8; 8];
        raw[2] = 2;
        raw[3] = 0u8.wrapping_sub(2 + 0x11 + 0x22);
        raw[4] = 0x11;
        raw[5] = 0x22;
        let frame = InfoFrame::parse(&raw);
        assert!(frame.is_valid());
        assert!(matches!(
            classify(&frame),
            Err(Hd60Error::UnexpectedFrameType(0x00))
        ));
    }
}
