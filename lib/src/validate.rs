// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Field validators for user supplied transaction values
//!
//! Each validator returns the bounded value or a [ValidationError] naming the field,
//! values are never clamped. Validators are also usable as `clap` value parsers.

use ledger_mina_apdu::types::{Address, Memo, ADDRESS_LEN, MEMO_LEN};

use crate::error::ValidationError;

/// Smallest currency units per whole unit
pub const COIN: u64 = 1_000_000_000;

/// Currency decimal places
pub const DECIMALS: usize = 9;

fn parse_u64(field: &'static str, s: &str, max: u64) -> Result<u64, ValidationError> {
    let s = s.trim();

    // Reject signs and anything non-decimal up front so overflow is the only parse failure
    if s.is_empty() || !s.bytes().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::NotANumber {
            field,
            value: s.to_string(),
        });
    }

    let out_of_range = ValidationError::OutOfRange { field, min: 0, max };

    match s.parse::<u64>() {
        Ok(v) if v <= max => Ok(v),
        _ => Err(out_of_range),
    }
}

/// Account index in [0, 2³²−1]
pub fn account_index(s: &str) -> Result<u32, ValidationError> {
    parse_u64("account", s, u32::MAX as u64).map(|v| v as u32)
}

/// Nonce in [0, 2³²−1]
pub fn nonce(s: &str) -> Result<u32, ValidationError> {
    parse_u64("nonce", s, u32::MAX as u64).map(|v| v as u32)
}

/// Valid-until slot in [0, 2³²−1]
pub fn valid_until(s: &str) -> Result<u32, ValidationError> {
    parse_u64("valid_until", s, u32::MAX as u64).map(|v| v as u32)
}

/// Raw amount in smallest units, [0, 2⁶⁴−1]
pub fn amount(s: &str) -> Result<u64, ValidationError> {
    parse_u64("amount", s, u64::MAX)
}

/// Raw fee in smallest units, [0, 2⁶⁴−1]
pub fn fee(s: &str) -> Result<u64, ValidationError> {
    parse_u64("fee", s, u64::MAX)
}

/// Whole-currency decimal amount (eg. `1.5`), converted exactly to smallest units
pub fn currency(field: &'static str, s: &str) -> Result<u64, ValidationError> {
    let s = s.trim();

    let (whole, frac) = match s.split_once('.') {
        Some((w, f)) => (w, f),
        None => (s, ""),
    };

    let not_a_number = || ValidationError::NotANumber {
        field,
        value: s.to_string(),
    };

    if (whole.is_empty() && frac.is_empty())
        || !whole.bytes().all(|c| c.is_ascii_digit())
        || !frac.bytes().all(|c| c.is_ascii_digit())
    {
        return Err(not_a_number());
    }

    if frac.len() > DECIMALS {
        return Err(ValidationError::Precision {
            field,
            max: DECIMALS,
        });
    }

    let out_of_range = || ValidationError::OutOfRange {
        field,
        min: 0,
        max: u64::MAX,
    };

    let w = match whole.is_empty() {
        true => 0,
        false => whole.parse::<u64>().map_err(|_| out_of_range())?,
    };

    let f = match frac.is_empty() {
        true => 0,
        false => {
            let f = frac.parse::<u64>().map_err(|_| not_a_number())?;
            f * 10u64.pow((DECIMALS - frac.len()) as u32)
        }
    };

    w.checked_mul(COIN)
        .and_then(|v| v.checked_add(f))
        .ok_or_else(out_of_range)
}

/// Amount in whole-currency notation
pub fn currency_amount(s: &str) -> Result<u64, ValidationError> {
    currency("amount", s)
}

/// Fee in whole-currency notation
pub fn currency_fee(s: &str) -> Result<u64, ValidationError> {
    currency("fee", s)
}

/// Format smallest units as a whole-currency decimal string
pub fn format_currency(v: u64) -> String {
    format!("{}.{:09}", v / COIN, v % COIN)
}

/// Memo of at most 32 bytes (UTF-8 byte length)
pub fn memo(s: &str) -> Result<Memo, ValidationError> {
    if s.len() > MEMO_LEN {
        return Err(ValidationError::TooLong {
            field: "memo",
            len: s.len(),
            max: MEMO_LEN,
        });
    }

    if s.contains('\0') {
        return Err(ValidationError::InvalidCharacter {
            field: "memo",
            c: '\0',
        });
    }

    Memo::new(s).map_err(|_| ValidationError::TooLong {
        field: "memo",
        len: s.len(),
        max: MEMO_LEN,
    })
}

/// Address of exactly 55 characters
pub fn address(s: &str) -> Result<Address, ValidationError> {
    let s = s.trim();
    let len = s.chars().count();

    if len != ADDRESS_LEN {
        return Err(ValidationError::WrongLength {
            field: "address",
            len,
            expected: ADDRESS_LEN,
        });
    }

    s.parse::<Address>().map_err(|_| {
        // Locate the offending character for reporting
        let c = s
            .chars()
            .find(|c| !c.is_ascii_alphanumeric() || matches!(c, '0' | 'O' | 'I' | 'l'))
            .unwrap_or('?');
        ValidationError::InvalidCharacter { field: "address", c }
    })
}
