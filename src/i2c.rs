//! I2C-over-HID transaction codec.
//!
//! Register reads and writes to the MCU travel inside HID reports, and the
//! two device generations frame them differently:
//!
//! **Original (HD60 S+):** bare `[addr, register, len]` triplets.  A read
//! is announced on the "read set" report ID and its register contents
//! fetched from the "read get" ID as a header-prefixed buffer; writes go
//! out on a third ID with the data appended.
//!
//! **New (HD60 X):** every transaction is one self-describing envelope
//! `[report_len, op_code, addr, write_len, register, ...]` on the write
//! report ID.  Read responses come back on a dedicated input ID whose
//! buffer size is signaled out-of-band by encoding the read op code into
//! the high byte of the report length (`0xFF | op << 8`).
//!
//! The codec is pure: it builds and parses byte sequences but never
//! touches the transport.  [`crate::device::Hd60Device`] drives it.

use crate::device::DeviceGeneration;
use crate::error::Hd60Error;
use crate::protocol::*;

/// Header bytes of a new-generation write envelope, register included.
const NEW_WRITE_HEADER_SIZE: usize = I2C_ENVELOPE_HEADER_SIZE + 1;

/// Header bytes of an original-generation write (`addr, register, len`).
const LEGACY_WRITE_HEADER_SIZE: usize = 3;

/// An outbound HID message produced by the codec, ready for the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct I2cRequest {
    /// Report ID the message must be sent on.
    pub report_id: u8,
    /// Message bytes (the transport adds report framing and padding).
    pub message: Vec<u8>,
}

/// Where to fetch a read transaction's response and how to size the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct I2cReadReply {
    /// Input report ID carrying the register contents.
    pub report_id: u8,
    /// Buffer size to hand to the transport; an explicit override the
    /// transport must honor instead of its default input-report size.
    pub read_len: usize,
}

/// A decoded write envelope (address, register, and payload recovered
/// from the raw message bytes).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct I2cWrite {
    pub address: u8,
    pub register: u8,
    pub data: Vec<u8>,
}

/// Builds and parses I2C transactions in one of the two wire formats.
///
/// The format is fixed when the codec is created and never re-selected
/// per call; a session holds exactly one codec for its whole lifetime.
#[derive(Debug, Clone, Copy)]
pub struct I2cCodec {
    generation: DeviceGeneration,
}

impl I2cCodec {
    pub fn new(generation: DeviceGeneration) -> Self {
        Self { generation }
    }

    /// Largest read a single transaction can request.
    ///
    /// The MCU serves at most [`MAX_COMM_READ_BUFFER_SIZE`] register
    /// bytes.  Original-generation responses carry one extra leading echo
    /// byte in front of the register contents, so one more byte is
    /// readable there.
    pub fn max_read_len(&self) -> usize {
        match self.generation {
            DeviceGeneration::New => MAX_COMM_READ_BUFFER_SIZE,
            DeviceGeneration::Legacy => MAX_COMM_READ_BUFFER_SIZE + 1,
        }
    }

    /// Largest data payload a single write transaction can carry.
    pub fn max_write_len(&self) -> usize {
        match self.generation {
            DeviceGeneration::New => HID_OUTPUT_REPORT_LEN - 1 - NEW_WRITE_HEADER_SIZE,
            DeviceGeneration::Legacy => HID_OUTPUT_REPORT_LEN - 1 - LEGACY_WRITE_HEADER_SIZE,
        }
    }

    /// Build the outbound message announcing a register read.
    pub fn read_request(
        &self,
        address: u8,
        register: u8,
        len: usize,
    ) -> Result<I2cRequest, Hd60Error> {
        if len > self.max_read_len() {
            return Err(Hd60Error::InvalidParameter {
                what: "I2C read",
                got: len,
                max: self.max_read_len(),
            });
        }

        match self.generation {
            DeviceGeneration::New => {
                // write_len counts only the register address byte
                let write_len = 1u8;
                let report_len = (I2C_ENVELOPE_HEADER_SIZE as u8) + write_len + 1;
                Ok(I2cRequest {
                    report_id: REPORT_ID_NEW_I2C_WRITE,
                    message: vec![report_len, OP_I2C_READ, address, write_len, register, len as u8],
                })
            }
            DeviceGeneration::Legacy => Ok(I2cRequest {
                report_id: REPORT_ID_I2C_READ_SET,
                message: vec![address, register, len as u8],
            }),
        }
    }

    /// Where the response to a read request is fetched from.
    pub fn read_reply(&self) -> I2cReadReply {
        match self.generation {
            DeviceGeneration::New => I2cReadReply {
                report_id: REPORT_ID_NEW_I2C_READ,
                read_len: NEW_READ_REPLY_LEN,
            },
            DeviceGeneration::Legacy => I2cReadReply {
                report_id: REPORT_ID_I2C_READ_GET,
                read_len: I2C_BUFFER_HEADER_SIZE + MAX_COMM_READ_BUFFER_SIZE,
            },
        }
    }

    /// Extract up to `len` register bytes from a raw read response.
    ///
    /// New-generation responses prefix the data with the report ID byte,
    /// which is skipped; original-generation responses are taken verbatim
    /// from the front of the buffer (their leading echo byte is part of
    /// what the caller asked for).  A short response yields fewer bytes
    /// than requested; the caller must not assume full length.
    pub fn read_data(&self, reply: &[u8], len: usize) -> Vec<u8> {
        let offset = match self.generation {
            DeviceGeneration::New => 1,
            DeviceGeneration::Legacy => 0,
        };
        let start = offset.min(reply.len());
        let end = (offset + len).min(reply.len());
        reply[start..end].to_vec()
    }

    /// Build the outbound message for a register write.
    pub fn write_request(
        &self,
        address: u8,
        register: u8,
        data: &[u8],
    ) -> Result<I2cRequest, Hd60Error> {
        if data.len() > self.max_write_len() {
            return Err(Hd60Error::InvalidParameter {
                what: "I2C write",
                got: data.len(),
                max: self.max_write_len(),
            });
        }

        match self.generation {
            DeviceGeneration::New => {
                // write_len counts the register address byte plus the data
                let write_len = 1 + data.len() as u8;
                let report_len = (I2C_ENVELOPE_HEADER_SIZE as u8) + write_len;
                let mut message = vec![report_len, OP_I2C_WRITE, address, write_len, register];
                message.extend_from_slice(data);
                Ok(I2cRequest {
                    report_id: REPORT_ID_NEW_I2C_WRITE,
                    message,
                })
            }
            DeviceGeneration::Legacy => {
                let mut message = vec![address, register, data.len() as u8];
                message.extend_from_slice(data);
                Ok(I2cRequest {
                    report_id: REPORT_ID_I2C_WRITE,
                    message,
                })
            }
        }
    }

    /// Decode a write message back into its parts.
    ///
    /// Returns `None` when the bytes are not a well-formed write in this
    /// codec's format.  Useful for traffic dissection and for verifying
    /// encoder output in tests.
    pub fn parse_write_request(&self, message: &[u8]) -> Option<I2cWrite> {
        match self.generation {
            DeviceGeneration::New => {
                if message.len() < NEW_WRITE_HEADER_SIZE || message[1] != OP_I2C_WRITE {
                    return None;
                }
                let report_len = message[0] as usize;
                let write_len = message[3] as usize;
                if write_len < 1
                    || report_len != I2C_ENVELOPE_HEADER_SIZE + write_len
                    || message.len() != report_len
                {
                    return None;
                }
                Some(I2cWrite {
                    address: message[2],
                    register: message[4],
                    data: message[NEW_WRITE_HEADER_SIZE..].to_vec(),
                })
            }
            DeviceGeneration::Legacy => {
                if message.len() < LEGACY_WRITE_HEADER_SIZE {
                    return None;
                }
                let data_len = message[2] as usize;
                if message.len() != LEGACY_WRITE_HEADER_SIZE + data_len {
                    return None;
                }
                Some(I2cWrite {
                    address: message[0],
                    register: message[1],
                    data: message[LEGACY_WRITE_HEADER_SIZE..].to_vec(),
                })
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn new_codec() -> I2cCodec {
        I2cCodec::new(DeviceGeneration::New)
    }

    fn legacy_codec() -> I2cCodec {
        I2cCodec::new(DeviceGeneration::Legacy)
    }

    // --- Read request encoding ---

    #[test]
    fn new_read_request_envelope() {
        let req = new_codec().read_request(0x55, 0x09, 32).unwrap();
        assert_eq!(req.report_id, REPORT_ID_NEW_I2C_WRITE);
        assert_eq!(req.message, vec![0x06, 0x07, 0x55, 0x01, 0x09, 0x20]);
    }

    #[test]
    fn legacy_read_request_triplet() {
        let req = legacy_codec().read_request(0x55, 0x09, 33).unwrap();
        assert_eq!(req.report_id, REPORT_ID_I2C_READ_SET);
        assert_eq!(req.message, vec![0x55, 0x09, 33]);
    }

    #[test]
    fn read_formats_differ_for_same_register() {
        let new = new_codec().read_request(0x55, 0x09, 32).unwrap();
        let legacy = legacy_codec().read_request(0x55, 0x09, 32).unwrap();
        assert_ne!(new.message, legacy.message);
        assert_ne!(new.report_id, legacy.report_id);
    }

    #[test]
    fn read_length_cap_is_enforced() {
        assert!(matches!(
            new_codec().read_request(0x55, 0x09, 33),
            Err(Hd60Error::InvalidParameter { got: 33, max: 32, .. })
        ));
        // Legacy responses carry one extra leading byte
        assert!(legacy_codec().read_request(0x55, 0x09, 33).is_ok());
        assert!(legacy_codec().read_request(0x55, 0x09, 34).is_err());
    }

    // --- Read reply routing ---

    #[test]
    fn new_read_reply_encodes_op_in_length() {
        let reply = new_codec().read_reply();
        assert_eq!(reply.report_id, REPORT_ID_NEW_I2C_READ);
        assert_eq!(reply.read_len, 0x07ff);
    }

    #[test]
    fn legacy_read_reply_uses_header_prefixed_buffer() {
        let reply = legacy_codec().read_reply();
        assert_eq!(reply.report_id, REPORT_ID_I2C_READ_GET);
        assert_eq!(reply.read_len, 36);
    }

    // --- Response data extraction ---

    #[test]
    fn new_read_data_skips_report_id_byte() {
        let raw = [0x05, 0xaa, 0xbb, 0xcc];
        assert_eq!(new_codec().read_data(&raw, 2), vec![0xaa, 0xbb]);
    }

    #[test]
    fn legacy_read_data_is_taken_verbatim() {
        let raw = [0x0a, 0xaa, 0xbb, 0xcc];
        assert_eq!(legacy_codec().read_data(&raw, 2), vec![0x0a, 0xaa]);
    }

    #[test]
    fn short_response_yields_fewer_bytes() {
        let raw = [0x05, 0xaa];
        assert_eq!(new_codec().read_data(&raw, 8), vec![0xaa]);
        assert_eq!(new_codec().read_data(&[], 8), Vec::<u8>::new());
    }

    // --- Write encoding / round-trip ---

    #[test]
    fn new_write_request_envelope() {
        let req = new_codec().write_request(0x55, 0x0a, &[0x01]).unwrap();
        assert_eq!(req.report_id, REPORT_ID_NEW_I2C_WRITE);
        assert_eq!(req.message, vec![0x06, 0x06, 0x55, 0x02, 0x0a, 0x01]);
    }

    #[test]
    fn legacy_write_request_layout() {
        let req = legacy_codec().write_request(0x55, 0x0a, &[0x01]).unwrap();
        assert_eq!(req.report_id, REPORT_ID_I2C_WRITE);
        assert_eq!(req.message, vec![0x55, 0x0a, 0x01, 0x01]);
    }

    #[test]
    fn new_write_round_trips() {
        let codec = new_codec();
        let req = codec.write_request(0x55, 0x0a, &[0x01]).unwrap();
        let decoded = codec.parse_write_request(&req.message).unwrap();
        assert_eq!(
            decoded,
            I2cWrite { address: 0x55, register: 0x0a, data: vec![0x01] }
        );
    }

    #[test]
    fn legacy_write_round_trips() {
        let codec = legacy_codec();
        let req = codec.write_request(0x23, 0x10, &[0xde, 0xad]).unwrap();
        let decoded = codec.parse_write_request(&req.message).unwrap();
        assert_eq!(
            decoded,
            I2cWrite { address: 0x23, register: 0x10, data: vec![0xde, 0xad] }
        );
    }

    #[test]
    fn parse_rejects_read_envelope_as_write() {
        let codec = new_codec();
        let req = codec.read_request(0x55, 0x09, 8).unwrap();
        assert!(codec.parse_write_request(&req.message).is_none());
    }

    #[test]
    fn parse_rejects_truncated_envelope() {
        let codec = new_codec();
        let req = codec.write_request(0x55, 0x0a, &[0x01, 0x02]).unwrap();
        assert!(codec.parse_write_request(&req.message[..4]).is_none());
    }

    #[test]
    fn write_length_cap_is_enforced() {
        let big = vec![0u8; 61];
        assert!(matches!(
            new_codec().write_request(0x55, 0x0a, &big),
            Err(Hd60Error::InvalidParameter { .. })
        ));
        assert!(matches!(
            legacy_codec().write_request(0x55, 0x0a, &big),
            Err(Hd60Error::InvalidParameter { .. })
        ));
        // just under the cap is fine
        assert!(new_codec().write_request(0x55, 0x0a, &big[..58]).is_ok());
        assert!(legacy_codec().write_request(0x55, 0x0a, &big[..60]).is_ok());
    }
}
