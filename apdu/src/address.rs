// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Address APDUs, for deriving the account address on the device

use encdec::{DecodeOwned, Encode};

use super::{ApduError, ApduStatic, Instruction, MINA_APDU_CLA};
use crate::{
    helpers::{Reader, Writer},
    types::{Address, ADDRESS_LEN},
};

/// Encoded [AddressReq] length
pub const ADDRESS_REQ_LEN: usize = 4;

/// Encoded [AddressResp] length (address plus NUL terminator)
pub const ADDRESS_RESP_LEN: usize = ADDRESS_LEN + 1;

/// Address request APDU.
///
/// Requests the address for the `44'/12586'/ACCOUNT_INDEX'/0/0` derivation path,
/// the device displays the path and requires user confirmation.
///
/// ## Encoding:
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                  ACCOUNT_INDEX (big-endian)                   |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct AddressReq {
    /// BIP44 account index
    pub account_index: u32,
}

impl AddressReq {
    /// Create a new [AddressReq] APDU
    pub fn new(account_index: u32) -> Self {
        Self { account_index }
    }
}

impl ApduStatic for AddressReq {
    const CLA: u8 = MINA_APDU_CLA;
    const INS: u8 = Instruction::GetAddress as u8;
}

impl Encode for AddressReq {
    type Error = ApduError;

    fn encode_len(&self) -> Result<usize, Self::Error> {
        Ok(ADDRESS_REQ_LEN)
    }

    fn encode(&self, buff: &mut [u8]) -> Result<usize, Self::Error> {
        let mut w = Writer::new(buff);
        w.put_u32(self.account_index)?;
        Ok(w.finish())
    }
}

impl DecodeOwned for AddressReq {
    type Output = Self;

    type Error = ApduError;

    fn decode_owned(buff: &[u8]) -> Result<(Self::Output, usize), Self::Error> {
        if buff.len() != ADDRESS_REQ_LEN {
            return Err(ApduError::InvalidLength);
        }

        let mut r = Reader::new(buff);
        let account_index = r.u32()?;

        Ok((Self { account_index }, r.index()))
    }
}

/// Address response APDU
///
/// ## Encoding:
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                                                               |
/// /                           ADDRESS                             /
/// /                (55-byte base58 string + NUL)                  /
/// |                                                               |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct AddressResp {
    /// Derived address
    pub address: Address,
}

impl AddressResp {
    /// Create a new [AddressResp] APDU
    pub fn new(address: Address) -> Self {
        Self { address }
    }
}

impl Encode for AddressResp {
    type Error = ApduError;

    fn encode_len(&self) -> Result<usize, Self::Error> {
        Ok(ADDRESS_RESP_LEN)
    }

    fn encode(&self, buff: &mut [u8]) -> Result<usize, Self::Error> {
        let mut w = Writer::new(buff);
        w.put(self.address.as_bytes())?;
        w.put_u8(0)?;
        Ok(w.finish())
    }
}

impl DecodeOwned for AddressResp {
    type Output = Self;

    type Error = ApduError;

    fn decode_owned(buff: &[u8]) -> Result<(Self::Output, usize), Self::Error> {
        if buff.len() != ADDRESS_RESP_LEN {
            return Err(ApduError::InvalidLength);
        }

        // Strip trailing NUL bytes
        let n = buff.iter().rposition(|c| *c != 0).map(|i| i + 1).unwrap_or(0);

        let s = core::str::from_utf8(&buff[..n]).map_err(|_| ApduError::InvalidEncoding)?;
        let address = s.parse::<Address>()?;

        Ok((Self { address }, buff.len()))
    }
}
