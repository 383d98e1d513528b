// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Transaction signing APDUs
//!
//! A single request carries the complete payment or delegation, which the device
//! displays for approval before returning a signature over the transaction.

use core::{fmt, str::FromStr};

use encdec::{DecodeOwned, Encode};

use super::{ApduError, ApduStatic, Instruction, MINA_APDU_CLA};
use crate::{
    helpers::{Reader, Writer},
    types::{Address, Memo, NetworkId, TxKind, ADDRESS_LEN, MEMO_LEN},
};

/// Encoded [SignTxReq] length
pub const SIGN_TX_REQ_LEN: usize = 4 + ADDRESS_LEN * 2 + 8 + 8 + 4 + 4 + MEMO_LEN + 1 + 1;

/// Signature length (field element followed by scalar)
pub const SIGNATURE_LEN: usize = 64;

/// Sign transaction request APDU
///
/// ## Encoding:
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                         ACCOUNT_INDEX                         |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// /                     SENDER_ADDRESS (55 bytes)                 /
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// /                    RECEIVER_ADDRESS (55 bytes)                /
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                            AMOUNT                             |
/// +                         (u64, nanomina)                       +
/// |                                                               |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                              FEE                              |
/// +                         (u64, nanomina)                       +
/// |                                                               |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                             NONCE                             |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                          VALID_UNTIL                          |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// /                 MEMO (32 bytes, zero padded)                  /
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |    TX_KIND    |  NETWORK_ID   |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
///
/// All integers are big-endian.
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct SignTxReq {
    /// BIP44 account index of the signing key
    pub account_index: u32,
    /// Sender (or delegator) address
    pub sender: Address,
    /// Receiver (or new delegate) address
    pub receiver: Address,
    /// Amount in nanomina, zero for delegations
    pub amount: u64,
    /// Fee in nanomina
    pub fee: u64,
    pub nonce: u32,
    /// Slot after which the transaction is invalid
    pub valid_until: u32,
    pub memo: Memo,
    pub kind: TxKind,
    pub network_id: NetworkId,
}

impl ApduStatic for SignTxReq {
    const CLA: u8 = MINA_APDU_CLA;
    const INS: u8 = Instruction::SignTx as u8;
}

impl Encode for SignTxReq {
    type Error = ApduError;

    fn encode_len(&self) -> Result<usize, Self::Error> {
        Ok(SIGN_TX_REQ_LEN)
    }

    fn encode(&self, buff: &mut [u8]) -> Result<usize, Self::Error> {
        let mut w = Writer::new(buff);

        w.put_u32(self.account_index)?;
        w.put(self.sender.as_bytes())?;
        w.put(self.receiver.as_bytes())?;
        w.put_u64(self.amount)?;
        w.put_u64(self.fee)?;
        w.put_u32(self.nonce)?;
        w.put_u32(self.valid_until)?;
        w.put(&self.memo.to_padded())?;
        w.put_u8(self.kind as u8)?;
        w.put_u8(self.network_id as u8)?;

        Ok(w.finish())
    }
}

impl DecodeOwned for SignTxReq {
    type Output = Self;

    type Error = ApduError;

    fn decode_owned(buff: &[u8]) -> Result<(Self::Output, usize), Self::Error> {
        if buff.len() != SIGN_TX_REQ_LEN {
            return Err(ApduError::InvalidLength);
        }

        let mut r = Reader::new(buff);

        let account_index = r.u32()?;
        let sender = Address::from_bytes(r.take(ADDRESS_LEN)?)?;
        let receiver = Address::from_bytes(r.take(ADDRESS_LEN)?)?;
        let amount = r.u64()?;
        let fee = r.u64()?;
        let nonce = r.u32()?;
        let valid_until = r.u32()?;
        let memo = Memo::from_padded(&r.array::<MEMO_LEN>()?)?;
        let kind = TxKind::try_from(r.u8()?).map_err(|_| ApduError::InvalidEncoding)?;
        let network_id = NetworkId::try_from(r.u8()?).map_err(|_| ApduError::InvalidEncoding)?;

        Ok((
            Self {
                account_index,
                sender,
                receiver,
                amount,
                fee,
                nonce,
                valid_until,
                memo,
                kind,
                network_id,
            },
            r.index(),
        ))
    }
}

/// Transaction signature as returned by the device
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct Signature([u8; SIGNATURE_LEN]);

impl Signature {
    pub fn new(b: [u8; SIGNATURE_LEN]) -> Self {
        Self(b)
    }

    pub fn as_bytes(&self) -> &[u8; SIGNATURE_LEN] {
        &self.0
    }

    /// Lowercase hex encoding, as consumed by the construction service
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Field element half of the signature
    pub fn field(&self) -> &[u8] {
        &self.0[..32]
    }

    /// Scalar half of the signature
    pub fn scalar(&self) -> &[u8] {
        &self.0[32..]
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({})", self.to_hex())
    }
}

impl FromStr for Signature {
    type Err = ApduError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut b = [0u8; SIGNATURE_LEN];
        hex::decode_to_slice(s, &mut b).map_err(|_| ApduError::InvalidEncoding)?;
        Ok(Self(b))
    }
}

/// Sign transaction response APDU
///
/// ## Encoding:
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// /                    FIELD ELEMENT (32 bytes)                   /
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// /                        SCALAR (32 bytes)                      /
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct SignTxResp {
    pub signature: Signature,
}

impl SignTxResp {
    pub fn new(signature: Signature) -> Self {
        Self { signature }
    }
}

impl Encode for SignTxResp {
    type Error = ApduError;

    fn encode_len(&self) -> Result<usize, Self::Error> {
        Ok(SIGNATURE_LEN)
    }

    fn encode(&self, buff: &mut [u8]) -> Result<usize, Self::Error> {
        let mut w = Writer::new(buff);
        w.put(self.signature.as_bytes())?;
        Ok(w.finish())
    }
}

impl DecodeOwned for SignTxResp {
    type Output = Self;

    type Error = ApduError;

    fn decode_owned(buff: &[u8]) -> Result<(Self::Output, usize), Self::Error> {
        if buff.len() != SIGNATURE_LEN {
            return Err(ApduError::InvalidLength);
        }

        let mut r = Reader::new(buff);
        let signature = Signature(r.array::<SIGNATURE_LEN>()?);

        Ok((Self { signature }, r.index()))
    }
}
