// Copyright (c) 2022-2023 The MobileCoin Foundation

use tokio::time::error::Elapsed;

use ledger_mina_apdu::{frame::FrameError, status::StatusWord, ApduError};

/// Ledger Mina API Error Type
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid user input
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Frame rejected before transmission
    #[error("Invalid APDU: {0}")]
    Frame(#[from] FrameError),

    /// Value could not be encoded or decoded
    #[error("APDU encoding error: {0:?}")]
    Apdu(ApduError),

    /// Device reported a failure
    #[error(transparent)]
    Device(#[from] DeviceError),

    /// Construction service failure
    #[error(transparent)]
    Service(#[from] ServiceError),

    /// Service transaction does not match the approved intent
    #[error(transparent)]
    Consistency(#[from] ConsistencyError),

    /// Amount and fee exceed the available balance
    #[error("Total {required} exceeds account balance {balance}")]
    InsufficientBalance { required: u64, balance: u64 },

    /// Amount and fee overflow a u64
    #[error("Amount plus fee overflows")]
    Overflow,

    /// User declined at a confirmation prompt
    #[error("Operation cancelled by user")]
    Cancelled,

    /// Required option not provided
    #[error("Missing required option: {0}")]
    MissingOption(&'static str),
}

impl From<ApduError> for Error {
    fn from(e: ApduError) -> Self {
        Error::Apdu(e)
    }
}

impl From<TransportError> for Error {
    fn from(e: TransportError) -> Self {
        Error::Device(DeviceError::Communication(e))
    }
}

/// Failures reported by (or while talking to) the device
#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    /// User rejected the request on the device
    #[error("Request rejected by user")]
    UserRejected,

    /// Device reachable but the Mina app is not running
    #[error("Ledger app not open (status 0x{0:04x})")]
    AppNotOpen(u16),

    /// Device rejected the request as malformed
    #[error("Malformed request rejected by device (status 0x{0:04x})")]
    MalformedRequest(u16),

    /// Other device status
    #[error("Device returned status 0x{0:04x}")]
    Status(u16),

    /// Response could not be decoded
    #[error("Invalid device response: {0:?}")]
    InvalidResponse(ApduError),

    /// Transport level failure
    #[error("Failed to communicate with ledger device: {0}")]
    Communication(#[from] TransportError),
}

impl DeviceError {
    /// Map a status word to an error, `None` for success
    pub fn from_status(sw: u16) -> Option<Self> {
        let s = match StatusWord::try_from(sw) {
            Ok(StatusWord::Ok) => return None,
            Ok(s) => s,
            Err(_) => return Some(DeviceError::Status(sw)),
        };

        let e = if s == StatusWord::ConditionsNotSatisfied {
            DeviceError::UserRejected
        } else if s.is_app_not_open() {
            DeviceError::AppNotOpen(sw)
        } else if s.is_malformed() {
            DeviceError::MalformedRequest(sw)
        } else {
            DeviceError::Status(sw)
        };

        Some(e)
    }
}

/// Transport errors
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Ledger transport failure (USB, TCP or BLE)
    #[error("Transport error: {0}")]
    Ledger(#[from] ledger_lib::Error),

    /// Request timed out
    #[error("Timeout waiting for device response")]
    Timeout,

    /// Response too short to contain a status word
    #[error("Response truncated ({0} bytes)")]
    Truncated(usize),

    /// Response longer than any valid reply
    #[error("Response oversized ({0} bytes)")]
    Oversized(usize),
}

impl From<Elapsed> for TransportError {
    fn from(_: Elapsed) -> Self {
        TransportError::Timeout
    }
}

/// Input validation errors, naming the field and its legal bounds
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ValidationError {
    /// Value is not a number
    #[error("{field}: '{value}' is not a valid number")]
    NotANumber { field: &'static str, value: String },

    /// Value outside numeric range
    #[error("{field}: must be in [{min},{max}]")]
    OutOfRange {
        field: &'static str,
        min: u64,
        max: u64,
    },

    /// Too many fractional digits for currency precision
    #[error("{field}: at most {max} decimal places")]
    Precision { field: &'static str, max: usize },

    /// String longer than permitted (in bytes)
    #[error("{field}: length must be at most {max} bytes (got {len})")]
    TooLong {
        field: &'static str,
        len: usize,
        max: usize,
    },

    /// String not of the exact required length
    #[error("{field}: length must be {expected} (got {len})")]
    WrongLength {
        field: &'static str,
        len: usize,
        expected: usize,
    },

    /// Invalid character in string
    #[error("{field}: invalid character {c:?}")]
    InvalidCharacter { field: &'static str, c: char },
}

/// Construction service errors
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response not valid JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Required key missing from a response
    #[error("Response missing required key '{0}'")]
    MissingKey(&'static str),

    /// Key present but with an unusable value
    #[error("Invalid value for '{key}': {value}")]
    InvalidValue { key: &'static str, value: String },

    /// Network list empty
    #[error("Empty network identifiers")]
    NoNetworks,

    /// Network list not for a Mina chain
    #[error("Invalid blockchain {0}")]
    UnsupportedBlockchain(String),

    /// Service rejected a request with a structured error
    #[error("Request rejected ({code}): {message}")]
    Rejected { code: i64, message: String },

    /// Non-success HTTP status without a structured error body
    #[error("HTTP status {status}: {body}")]
    Status { status: u16, body: String },
}

/// Divergence between a service transaction and the approved intent
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ConsistencyError {
    /// Field differs from (or is missing relative to) the intent
    #[error("Transaction field '{field}' diverges (expected: {expected}, actual: {actual:?})")]
    Divergence {
        field: &'static str,
        expected: String,
        actual: Option<String>,
    },

    /// Signature in the combined transaction differs from the device signature
    #[error("Transaction signature diverges (expected: {expected}, actual: {actual:?})")]
    SignatureMismatch {
        expected: String,
        actual: Option<String>,
    },
}
