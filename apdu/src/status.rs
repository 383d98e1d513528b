// Copyright (c) 2022-2023 The MobileCoin Foundation

//! APDU response status words

use byteorder::{BigEndian, ByteOrder};
use num_enum::TryFromPrimitive;
use strum::Display;

/// Status word length, appended to every response
pub const STATUS_WORD_LEN: usize = 2;

/// Known APDU status words
#[derive(Copy, Clone, Debug, PartialEq, Eq, TryFromPrimitive, Display)]
#[repr(u16)]
pub enum StatusWord {
    /// Request completed
    Ok = 0x9000,

    /// User rejected the request on the device
    ConditionsNotSatisfied = 0x6985,

    /// Wrong length (returned by the dashboard when the app is not running)
    WrongLength = 0x6700,

    /// Class not supported
    ClaNotSupported = 0x6e00,

    /// Class not supported by the dashboard
    ClaNotSupportedDashboard = 0x6e01,

    /// Application not open
    AppNotOpen = 0x6511,

    /// Invalid data in request
    InvalidData = 0x6a80,

    /// Invalid P1 / P2 parameters
    WrongParameters = 0x6b00,

    /// Instruction not supported
    InsNotSupported = 0x6d00,

    /// Internal error during request handling
    InternalError = 0x6802,
}

impl StatusWord {
    /// Device is not running the Mina application
    pub fn is_app_not_open(&self) -> bool {
        matches!(
            self,
            StatusWord::WrongLength
                | StatusWord::ClaNotSupported
                | StatusWord::ClaNotSupportedDashboard
                | StatusWord::AppNotOpen
        )
    }

    /// Device rejected the request as malformed
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            StatusWord::InvalidData
                | StatusWord::WrongParameters
                | StatusWord::InsNotSupported
                | StatusWord::InternalError
        )
    }
}

/// Split a raw response into data and the trailing status word
///
/// Returns `None` if the response is too short to contain a status word.
pub fn split_status(resp: &[u8]) -> Option<(&[u8], u16)> {
    if resp.len() < STATUS_WORD_LEN {
        return None;
    }

    let (data, sw) = resp.split_at(resp.len() - STATUS_WORD_LEN);
    Some((data, BigEndian::read_u16(sw)))
}
