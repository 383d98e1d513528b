// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Tests for Mina wallet integration.
//!
//! Known answer vectors for the test seed, generic over [ledger_mina::Exchange]
//! for reuse against physical devices and the simulator.
//!

pub mod address;

pub mod sign;
