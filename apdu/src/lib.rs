// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Protocol / APDU definitions for Mina app communication
//!
//! This module provides a protocol specification and reference implementation for communication
//! with the Mina ledger application.
//!
//! Requests are framed as `CLA INS P1 P2 LC DATA[LC]`, where `LC` is a single byte so payloads
//! are limited to 255 bytes. Unlike most ledger apps, all integer fields are big-endian
//! (matching the on-device parser), and addresses / memos are carried as raw string bytes.
//!
//! Every outgoing frame passes through [`frame::Frame`], which is the only way to obtain bytes
//! for a transport. The device's own parsing is not relied upon to reject malformed frames.
//!

use core::fmt::Debug;

pub use ledger_proto::{ApduError, ApduReq, ApduStatic};

pub mod address;
pub mod frame;
pub mod prelude;
pub mod sign_tx;
pub mod status;
pub mod types;

mod helpers;

/// Mina APDU Class
pub const MINA_APDU_CLA: u8 = 0xe0;

/// APDU header length (CLA, INS, P1, P2, LC)
pub const APDU_HEADER_LEN: usize = 5;

/// Maximum APDU payload length (LC is a single byte)
pub const APDU_MAX_PAYLOAD: usize = u8::MAX as usize;

/// Mina APDU instruction codes
#[derive(Copy, Clone, Debug, PartialEq, Eq, num_enum::TryFromPrimitive, strum::Display)]
#[repr(u8)]
pub enum Instruction {
    /// Derive and display the address for an account index
    GetAddress = 0x02,

    /// Verify, display and sign a payment or delegation transaction
    SignTx = 0x03,
}

impl Instruction {
    /// Inclusive (min, max) payload length accepted for this instruction
    pub const fn payload_bounds(&self) -> (usize, usize) {
        match self {
            Instruction::GetAddress => (address::ADDRESS_REQ_LEN, address::ADDRESS_REQ_LEN),
            Instruction::SignTx => (sign_tx::SIGN_TX_REQ_LEN, sign_tx::SIGN_TX_REQ_LEN),
        }
    }
}
