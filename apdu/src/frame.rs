// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Validated APDU frames
//!
//! A [Frame] can only be constructed from bytes that pass every framing check, and
//! transports accept only [Frame]s, so malformed requests never reach the device.

use core::fmt;

use encdec::Encode;

#[cfg(feature = "log")]
use log::debug;

use crate::{
    ApduError, ApduStatic, Instruction, APDU_HEADER_LEN, APDU_MAX_PAYLOAD, MINA_APDU_CLA,
};

/// Frame validation errors, raised before anything is sent to a device
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// No frame data provided
    #[error("Empty frame")]
    Empty,

    /// Hex input with an odd number of characters
    #[error("Odd-length hex frame")]
    OddLength,

    /// Hex input containing a non-hex character
    #[error("Invalid hex character {c:?} at index {index}")]
    InvalidHex { c: char, index: usize },

    /// Frame shorter than the APDU header
    #[error("Frame too short for APDU header ({0} bytes)")]
    Truncated(usize),

    /// Length byte does not match the payload actually supplied
    #[error("Length field {declared} does not match payload length {actual}")]
    LengthMismatch { declared: usize, actual: usize },

    /// Payload length outside the bounds of the instruction
    #[error("Payload length {len} outside bounds for {ins} ({min}..={max})")]
    PayloadBounds {
        ins: Instruction,
        len: usize,
        min: usize,
        max: usize,
    },

    /// Frame addressed to another application class
    #[error("Unrecognised class 0x{0:02x}")]
    UnknownClass(u8),

    /// Instruction not supported by the Mina app
    #[error("Unrecognised instruction 0x{0:02x}")]
    UnknownInstruction(u8),

    /// Typed request could not be encoded
    #[error("Request encoding failed: {0:?}")]
    Encode(ApduError),
}

impl From<ApduError> for FrameError {
    fn from(e: ApduError) -> Self {
        FrameError::Encode(e)
    }
}

impl From<hex::FromHexError> for FrameError {
    fn from(e: hex::FromHexError) -> Self {
        match e {
            hex::FromHexError::InvalidHexCharacter { c, index } => FrameError::InvalidHex { c, index },
            hex::FromHexError::OddLength | hex::FromHexError::InvalidStringLength => {
                FrameError::OddLength
            }
        }
    }
}

/// Validated outgoing APDU frame (`CLA INS P1 P2 LC DATA[LC]`)
#[derive(Clone, PartialEq, Eq)]
pub struct Frame {
    data: Vec<u8>,
    ins: Instruction,
}

impl Frame {
    /// Build a frame from a typed request
    pub fn encode<REQ>(req: &REQ) -> Result<Self, FrameError>
    where
        REQ: ApduStatic + Encode<Error = ApduError>,
    {
        let n = req.encode_len()?;
        if n > APDU_MAX_PAYLOAD {
            return Err(ApduError::InvalidLength.into());
        }

        let mut data = vec![0u8; APDU_HEADER_LEN + n];
        data[0] = REQ::CLA;
        data[1] = REQ::INS;
        // P1 / P2 unused by the Mina app
        data[2] = 0x00;
        data[3] = 0x00;
        data[4] = n as u8;

        let written = req.encode(&mut data[APDU_HEADER_LEN..])?;
        data.truncate(APDU_HEADER_LEN + written);
        data[4] = written as u8;

        // Typed requests pass through the same checks as raw frames
        Self::parse(data)
    }

    /// Parse and validate a raw hex frame
    pub fn from_hex(s: &str) -> Result<Self, FrameError> {
        let s = s.trim();

        if s.is_empty() {
            return Err(FrameError::Empty);
        }
        if s.len() % 2 != 0 {
            return Err(FrameError::OddLength);
        }

        let data = hex::decode(s)?;
        Self::parse(data)
    }

    /// Validate raw frame bytes
    pub fn parse(data: Vec<u8>) -> Result<Self, FrameError> {
        if data.is_empty() {
            return Err(FrameError::Empty);
        }
        if data.len() < APDU_HEADER_LEN {
            return Err(FrameError::Truncated(data.len()));
        }

        if data[0] != MINA_APDU_CLA {
            return Err(FrameError::UnknownClass(data[0]));
        }

        let ins = Instruction::try_from(data[1]).map_err(|_| FrameError::UnknownInstruction(data[1]))?;

        let declared = data[4] as usize;
        let actual = data.len() - APDU_HEADER_LEN;
        if declared != actual {
            return Err(FrameError::LengthMismatch { declared, actual });
        }

        let (min, max) = ins.payload_bounds();
        if actual < min || actual > max {
            return Err(FrameError::PayloadBounds {
                ins,
                len: actual,
                min,
                max,
            });
        }

        #[cfg(feature = "log")]
        debug!("frame ok: {} ({} byte payload)", ins, actual);

        Ok(Self { data, ins })
    }

    pub fn cla(&self) -> u8 {
        self.data[0]
    }

    pub fn instruction(&self) -> Instruction {
        self.ins
    }

    /// Request payload (after the header)
    pub fn payload(&self) -> &[u8] {
        &self.data[APDU_HEADER_LEN..]
    }

    /// Full frame bytes, as written to a transport
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn to_hex(&self) -> String {
        hex::encode(&self.data)
    }
}

impl AsRef<[u8]> for Frame {
    fn as_ref(&self) -> &[u8] {
        &self.data
    }
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Frame({}, {})", self.ins, self.to_hex())
    }
}
