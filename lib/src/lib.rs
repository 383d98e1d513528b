// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Ledger Mina API Library (and CLI)
//!
//! Provides typed device requests ([DeviceHandle]) over any [ledger_lib::Exchange]
//! transport, user input validation ([validate]), and the construction service
//! signing flows ([flow]). Device discovery and connection use [ledger_lib::LedgerProvider].

/// Re-export `ledger-lib` for device discovery and transports
pub use ledger_lib::{self, Exchange};

/// Re-export `ledger-mina-apdu` for consumers
pub use ledger_mina_apdu::{self as apdu};

mod handle;
pub use handle::DeviceHandle;

mod error;
pub use error::{ConsistencyError, DeviceError, Error, ServiceError, TransportError, ValidationError};

pub mod check;
pub mod flow;
pub mod intent;
pub mod service;
pub mod validate;
