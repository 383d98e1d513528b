// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Protocol value types shared between requests and responses

use core::{fmt, str::FromStr};

use num_enum::TryFromPrimitive;
use strum::{Display, EnumString};

use crate::ApduError;

/// Encoded address length (base58check public key)
pub const ADDRESS_LEN: usize = 55;

/// Wire memo length, shorter memos are zero padded
pub const MEMO_LEN: usize = 32;

/// `valid_until` sentinel indicating a transaction never expires
pub const VALID_UNTIL_NEVER: u32 = u32::MAX;

/// Base58 alphabet used by address encoding
const BASE58_ALPHABET: &[u8] = b"123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

/// Mina address, exactly [`ADDRESS_LEN`] base58 characters
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct Address([u8; ADDRESS_LEN]);

impl Address {
    /// Create an address from raw string bytes
    pub fn from_bytes(b: &[u8]) -> Result<Self, ApduError> {
        if b.len() != ADDRESS_LEN {
            return Err(ApduError::InvalidLength);
        }

        if !b.iter().all(|c| BASE58_ALPHABET.contains(c)) {
            return Err(ApduError::InvalidEncoding);
        }

        let mut d = [0u8; ADDRESS_LEN];
        d.copy_from_slice(b);

        Ok(Self(d))
    }

    /// Fetch raw address bytes as sent on the wire
    pub fn as_bytes(&self) -> &[u8; ADDRESS_LEN] {
        &self.0
    }

    /// Fetch address as a string
    pub fn as_str(&self) -> &str {
        // Always ASCII, checked on construction
        core::str::from_utf8(&self.0).unwrap_or_default()
    }
}

impl FromStr for Address {
    type Err = ApduError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_bytes(s.as_bytes())
    }
}

impl TryFrom<&[u8]> for Address {
    type Error = ApduError;

    fn try_from(b: &[u8]) -> Result<Self, Self::Error> {
        Self::from_bytes(b)
    }
}

impl AsRef<str> for Address {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.as_str())
    }
}

/// Transaction memo, up to [`MEMO_LEN`] bytes of UTF-8 text
///
/// Memos are NUL-padded on the wire so may not themselves contain NUL characters.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Default)]
pub struct Memo {
    buff: [u8; MEMO_LEN],
    len: usize,
}

impl Memo {
    /// Create a new memo, checking the UTF-8 byte length
    pub fn new(s: &str) -> Result<Self, ApduError> {
        let b = s.as_bytes();

        if b.len() > MEMO_LEN {
            return Err(ApduError::InvalidLength);
        }
        if b.contains(&0) {
            return Err(ApduError::InvalidEncoding);
        }

        let mut buff = [0u8; MEMO_LEN];
        buff[..b.len()].copy_from_slice(b);

        Ok(Self {
            buff,
            len: b.len(),
        })
    }

    /// Empty memo
    pub const fn empty() -> Self {
        Self {
            buff: [0u8; MEMO_LEN],
            len: 0,
        }
    }

    /// Decode a memo from its zero padded wire form
    pub fn from_padded(b: &[u8; MEMO_LEN]) -> Result<Self, ApduError> {
        let len = b.iter().rposition(|c| *c != 0).map(|i| i + 1).unwrap_or(0);
        let s = core::str::from_utf8(&b[..len]).map_err(|_| ApduError::InvalidEncoding)?;
        Self::new(s)
    }

    /// Zero padded wire form
    pub fn to_padded(&self) -> [u8; MEMO_LEN] {
        self.buff
    }

    pub fn as_str(&self) -> &str {
        // Built from a &str so always valid
        core::str::from_utf8(&self.buff[..self.len]).unwrap_or_default()
    }

    /// Memo length in bytes
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl FromStr for Memo {
    type Err = ApduError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl fmt::Display for Memo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl fmt::Debug for Memo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Memo({:?})", self.as_str())
    }
}

/// Transaction kind, carried as the transaction tag byte
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, TryFromPrimitive, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
#[repr(u8)]
pub enum TxKind {
    Payment = 0x00,
    Delegation = 0x04,
}

/// Network identifier, selects the signature domain on the device
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, TryFromPrimitive, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
#[repr(u8)]
pub enum NetworkId {
    Testnet = 0x00,
    Mainnet = 0x01,
}

impl NetworkId {
    /// Resolve a network id from a network name (`mainnet*` is mainnet, all else testnet)
    pub fn from_name(name: &str) -> Self {
        match name.starts_with("mainnet") {
            true => NetworkId::Mainnet,
            false => NetworkId::Testnet,
        }
    }
}
