//! CEA-861 HDMI InfoFrame codec.
//!
//! An InfoFrame is a 3-byte header (type, version, payload length), a
//! checksum byte, and up to 27 payload bytes.  The sum of every byte from
//! the header through the last payload byte must be zero mod 256 for the
//! frame to be valid.
//!
//! [`InfoFrame::parse`] is a pure reinterpretation of device bytes and
//! never fails; callers must check [`InfoFrame::is_valid`] before trusting
//! any payload field.  Only the Dynamic-Range frame (type 0x07) is decoded
//! semantically; the remaining payload layouts from CEA-861 are carried
//! as passive byte structures.
//!
//! Layouts follow CEA-861-G chapter 6 and CEA-861.3-A chapter 3.2.

use std::fmt;

// ---------------------------------------------------------------------------
// InfoFrame type codes (CEA-861-G chapter 6, table 5)
// ---------------------------------------------------------------------------

pub const INFOFRAME_TYPE_RESERVED: u8 = 0x00;
/// Vendor Specific
pub const INFOFRAME_TYPE_VS: u8 = 0x01;
/// Auxiliary Video Information
pub const INFOFRAME_TYPE_AVI: u8 = 0x02;
/// Source Product Description
pub const INFOFRAME_TYPE_SPD: u8 = 0x03;
/// Audio
pub const INFOFRAME_TYPE_AUDIO: u8 = 0x04;
/// MPEG Source
pub const INFOFRAME_TYPE_MS: u8 = 0x05;
/// NTSC VBI
pub const INFOFRAME_TYPE_VBI: u8 = 0x06;
/// Dynamic Range and Mastering
pub const INFOFRAME_TYPE_DR: u8 = 0x07;

// ---------------------------------------------------------------------------
// Sizes (CEA-861-G Annex D.1)
// ---------------------------------------------------------------------------

/// 3 bytes header + 1 byte checksum + 27 bytes payload.
pub const MAX_INFOFRAME_SIZE: usize = 31;
/// Largest legal payload length.
pub const MAX_INFOFRAME_PAYLOAD: usize = 27;
/// Header bytes in front of the checksum.
pub const INFOFRAME_HEADER_SIZE: usize = 3;
/// Size of the Dynamic-Range payload (static metadata type 1).
pub const DR_PAYLOAD_SIZE: usize = 26;

// ---------------------------------------------------------------------------
// EOTF codes (CEA-861.3-A chapter 3.2, table 3)
// ---------------------------------------------------------------------------

/// Electro-optical transfer function signaled by a Dynamic-Range frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Eotf {
    /// Traditional gamma, SDR luminance range.
    SdrGamma,
    /// Traditional gamma, HDR luminance range.
    HdrGamma,
    /// SMPTE ST 2084 (PQ).
    St2084,
    /// BT.2100 hybrid log-gamma.
    Hlg,
    /// Reserved 3-bit code.
    Reserved(u8),
}

impl Eotf {
    /// Decode the 3-bit EOTF field.
    pub fn from_code(code: u8) -> Self {
        match code & 0x07 {
            0x00 => Self::SdrGamma,
            0x01 => Self::HdrGamma,
            0x02 => Self::St2084,
            0x03 => Self::Hlg,
            other => Self::Reserved(other),
        }
    }
}

impl fmt::Display for Eotf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SdrGamma => write!(f, "traditional gamma (SDR)"),
            Self::HdrGamma => write!(f, "traditional gamma (HDR)"),
            Self::St2084 => write!(f, "ST 2084 (PQ)"),
            Self::Hlg => write!(f, "BT.2100 HLG"),
            Self::Reserved(c) => write!(f, "reserved ({c})"),
        }
    }
}

// ---------------------------------------------------------------------------
// Header
// ---------------------------------------------------------------------------

/// Decoded InfoFrame header (CEA-861-E chapter 6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InfoFrameHeader {
    /// InfoFrame type code, 7 bits.
    pub type_code: u8,
    /// Set when the byte carries the HDMI packet type (0x80 + type).
    pub packet_type_flag: bool,
    /// InfoFrame version number, 7 bits, starting at 1.
    pub version: u8,
    /// InfoFrame change bit (Vendor Specific frames only).
    pub change_flag: bool,
    /// Payload size, not counting type, version, length, or checksum.
    pub payload_length: u8,
}

/// Chromaticity coordinate pair, encoded in units of 0.00002 (ST 2086).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChromaticityXy {
    pub x: u16,
    pub y: u16,
}

// ---------------------------------------------------------------------------
// Payload layouts
// ---------------------------------------------------------------------------

/// Dynamic-Range and Mastering payload, static metadata type 1
/// (CEA-861.3-A chapter 3.2, tables 3–5).  Type 0x07, version 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DynamicRangePayload {
    pub eotf: Eotf,
    /// Static metadata descriptor ID, 3 bits.
    pub metadata_id: u8,
    /// Chromaticity of the red, green, and blue display primaries.
    pub display_primaries: [ChromaticityXy; 3],
    pub white_point: ChromaticityXy,
    /// Maximum display mastering luminance, nit.
    pub max_display_luminance: u16,
    /// Minimum display mastering luminance, 0.0001 nit.
    pub min_display_luminance: u16,
    /// Maximum content light level, nit.
    pub max_content_light_level: u16,
    /// Maximum frame-average light level, nit.
    pub max_frame_average_light_level: u16,
}

impl DynamicRangePayload {
    /// Reinterpret payload bytes as a DR1 layout.  All multi-byte fields
    /// are little-endian as stored by the device.
    pub fn from_bytes(payload: &[u8]) -> Self {
        let byte = |i: usize| payload.get(i).copied().unwrap_or(0);
        let word = |i: usize| u16::from_le_bytes([byte(i), byte(i + 1)]);
        let xy = |i: usize| ChromaticityXy { x: word(i), y: word(i + 2) };

        Self {
            eotf: Eotf::from_code(byte(0)),
            metadata_id: byte(1) & 0x07,
            display_primaries: [xy(2), xy(6), xy(10)],
            white_point: xy(14),
            max_display_luminance: word(18),
            min_display_luminance: word(20),
            max_content_light_level: word(22),
            max_frame_average_light_level: word(24),
        }
    }
}

/// Vendor Specific payload (type 0x01, versions 1 and 2).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VendorSpecificPayload {
    /// IEEE OUI of the defining vendor.
    pub ieee_oui: [u8; 3],
    pub data: [u8; MAX_INFOFRAME_PAYLOAD - 3],
}

/// Source Product Description payload (type 0x03, version 1, 25 bytes).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceProductPayload {
    pub vendor_name: [u8; 8],
    pub product_description: [u8; 16],
    pub source_information: u8,
}

/// Payload bytes keyed by `(type, version)`.
///
/// Only [`Payload::DynamicRange`] is interpreted by the HDR logic; the
/// other variants are structural carriers so traffic dumps stay readable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Payload {
    VendorSpecific(VendorSpecificPayload),
    /// AVI payload, versions 1–4 (13 bytes, 14 for version 4).
    Avi([u8; 14]),
    SourceProduct(SourceProductPayload),
    /// Audio payload, version 1 (10 bytes).
    Audio([u8; 10]),
    /// MPEG Source payload, version 1 (10 bytes).
    MpegSource([u8; 10]),
    /// NTSC VBI PES data field.
    NtscVbi([u8; MAX_INFOFRAME_PAYLOAD]),
    DynamicRange(DynamicRangePayload),
    /// Unrecognized `(type, version)` combination.
    Unknown,
}

// ---------------------------------------------------------------------------
// InfoFrame
// ---------------------------------------------------------------------------

/// One HDMI InfoFrame exactly as captured from the device.
///
/// The internal buffer is zero-filled past the received length, matching
/// how the hardware pads idle frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InfoFrame {
    bytes: [u8; MAX_INFOFRAME_SIZE],
    len: usize,
}

impl InfoFrame {
    /// Reinterpret raw device bytes as an InfoFrame.
    ///
    /// Never fails: excess input is ignored, short input is zero-padded.
    /// No field is trustworthy until [`is_valid`](Self::is_valid) passes.
    pub fn parse(raw: &[u8]) -> Self {
        let len = raw.len().min(MAX_INFOFRAME_SIZE);
        let mut bytes = [0u8; MAX_INFOFRAME_SIZE];
        bytes[..len].copy_from_slice(&raw[..len]);
        Self { bytes, len }
    }

    pub fn header(&self) -> InfoFrameHeader {
        InfoFrameHeader {
            type_code: self.bytes[0] & 0x7f,
            packet_type_flag: self.bytes[0] & 0x80 != 0,
            version: self.bytes[1] & 0x7f,
            change_flag: self.bytes[1] & 0x80 != 0,
            payload_length: self.bytes[2],
        }
    }

    pub fn checksum(&self) -> u8 {
        self.bytes[INFOFRAME_HEADER_SIZE]
    }

    /// The 27 payload bytes following the checksum (zero-padded).
    pub fn payload_bytes(&self) -> &[u8] {
        &self.bytes[INFOFRAME_HEADER_SIZE + 1..]
    }

    /// Whether the frame buffer is entirely zero: the idle state some
    /// firmware reports when no metadata is being transmitted.
    pub fn is_all_zero(&self) -> bool {
        self.bytes.iter().all(|&b| b == 0)
    }

    /// Verify the byte-sum checksum.
    ///
    /// Sums header, checksum byte, and exactly `payload_length` payload
    /// bytes (clamped to the captured buffer) and requires zero mod 256.
    /// Anything shorter than header + checksum is invalid.
    pub fn is_valid(&self) -> bool {
        if self.len < INFOFRAME_HEADER_SIZE + 1 {
            return false;
        }
        let span = (INFOFRAME_HEADER_SIZE + 1 + self.bytes[2] as usize).min(MAX_INFOFRAME_SIZE);
        let sum = self.bytes[..span].iter().fold(0u8, |acc, &b| acc.wrapping_add(b));
        sum == 0
    }

    /// Clamp an out-of-spec payload length on Dynamic-Range frames.
    ///
    /// HD60 S+ firmware (and HD60 X FW 22.03.24, MCU 22.03.16) reports an
    /// invalid payload length on some HDR and SPD frames.  When the
    /// length exceeds the 27-byte maximum on a Dynamic-Range frame, it is
    /// clamped to the DR1 payload size and the checksum byte adjusted by
    /// the removed difference, keeping [`is_valid`](Self::is_valid)
    /// intact.  A second application is a no-op; other frame types are
    /// never touched.
    pub fn fix_oversized_payload_length(&mut self) {
        if self.bytes[2] as usize > MAX_INFOFRAME_PAYLOAD
            && self.bytes[0] & 0x7f == INFOFRAME_TYPE_DR
        {
            let diff = self.bytes[2].wrapping_sub(DR_PAYLOAD_SIZE as u8);
            self.bytes[2] = DR_PAYLOAD_SIZE as u8;
            self.bytes[INFOFRAME_HEADER_SIZE] =
                self.bytes[INFOFRAME_HEADER_SIZE].wrapping_add(diff);
        }
    }

    /// Decode the payload according to `(type, version)`.
    pub fn payload(&self) -> Payload {
        let header = self.header();
        let p = self.payload_bytes();

        match (header.type_code, header.version) {
            (INFOFRAME_TYPE_VS, 1 | 2) => Payload::VendorSpecific(VendorSpecificPayload {
                ieee_oui: [p[0], p[1], p[2]],
                data: p[3..].try_into().unwrap(),
            }),
            (INFOFRAME_TYPE_AVI, 1..=4) => Payload::Avi(p[..14].try_into().unwrap()),
            (INFOFRAME_TYPE_SPD, 1) => Payload::SourceProduct(SourceProductPayload {
                vendor_name: p[..8].try_into().unwrap(),
                product_description: p[8..24].try_into().unwrap(),
                source_information: p[24],
            }),
            (INFOFRAME_TYPE_AUDIO, 1) => Payload::Audio(p[..10].try_into().unwrap()),
            (INFOFRAME_TYPE_MS, 1) => Payload::MpegSource(p[..10].try_into().unwrap()),
            (INFOFRAME_TYPE_VBI, 1) => Payload::NtscVbi(p.try_into().unwrap()),
            (INFOFRAME_TYPE_DR, 1) => Payload::DynamicRange(self.dynamic_range()),
            _ => Payload::Unknown,
        }
    }

    /// Reinterpret the payload as a Dynamic-Range layout regardless of the
    /// version field.  The HDR classification keys on the type code only,
    /// matching device behavior in the wild.
    pub fn dynamic_range(&self) -> DynamicRangePayload {
        DynamicRangePayload::from_bytes(self.payload_bytes())
    }
}

/// Human-readable name for an InfoFrame type code.
pub fn type_name(type_code: u8) -> &'static str {
    match type_code {
        INFOFRAME_TYPE_RESERVED => "Reserved",
        INFOFRAME_TYPE_VS => "Vendor Specific",
        INFOFRAME_TYPE_AVI => "Auxiliary Video Information",
        INFOFRAME_TYPE_SPD => "Source Product Description",
        INFOFRAME_TYPE_AUDIO => "Audio",
        INFOFRAME_TYPE_MS => "MPEG Source",
        INFOFRAME_TYPE_VBI => "NTSC VBI",
        INFOFRAME_TYPE_DR => "Dynamic Range and Mastering",
        _ => "Unknown",
    }
}

impl fmt::Display for InfoFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let header = self.header();
        writeln!(
            f,
            "InfoFrame type 0x{:02x} ({}), version {}, payload {} bytes",
            header.type_code,
            type_name(header.type_code),
            header.version,
            header.payload_length
        )?;
        writeln!(
            f,
            "Checksum: 0x{:02x} ({})",
            self.checksum(),
            if self.is_valid() { "valid" } else { "INVALID" }
        )?;

        if header.type_code == INFOFRAME_TYPE_DR {
            let dr = self.dynamic_range();
            writeln!(f, "EOTF: {}", dr.eotf)?;
            writeln!(f, "Metadata descriptor: {}", dr.metadata_id)?;
            for (name, xy) in ["Primary 1", "Primary 2", "Primary 3"]
                .iter()
                .zip(dr.display_primaries)
            {
                writeln!(f, "{}: x={} y={}", name, xy.x, xy.y)?;
            }
            writeln!(f, "White point: x={} y={}", dr.white_point.x, dr.white_point.y)?;
            writeln!(f, "Mastering luminance: max {} nit, min {} (0.0001 nit)",
                dr.max_display_luminance, dr.min_display_luminance)?;
            writeln!(f, "MaxCLL: {} nit", dr.max_content_light_level)?;
            writeln!(f, "MaxFALL: {} nit", dr.max_frame_average_light_level)?;
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
