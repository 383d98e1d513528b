// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Consistency checks for construction service transactions
//!
//! Transactions returned by the service are compared field by field against
//! the approved [TransactionIntent]. Any difference is a [ConsistencyError].

use log::debug;
use serde_json::{Map, Value};

use ledger_mina_apdu::{
    sign_tx::Signature,
    types::{TxKind, VALID_UNTIL_NEVER},
};

use crate::{error::ConsistencyError, intent::TransactionIntent};

/// Render a service value for error reporting, absent and null map to `None`
fn render(v: Option<&Value>) -> Option<String> {
    match v {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(v) => Some(v.to_string()),
    }
}

fn expect_str(
    tx: &Map<String, Value>,
    field: &'static str,
    expected: &str,
) -> Result<(), ConsistencyError> {
    match tx.get(field) {
        Some(Value::String(s)) if s == expected => Ok(()),
        v => Err(ConsistencyError::Divergence {
            field,
            expected: expected.to_string(),
            actual: render(v),
        }),
    }
}

/// Check a service transaction object against the approved intent
pub fn check_tx(intent: &TransactionIntent, tx: &Map<String, Value>) -> Result<(), ConsistencyError> {
    match intent.kind {
        TxKind::Payment => {
            expect_str(tx, "from", intent.sender.as_str())?;
            expect_str(tx, "to", intent.receiver.as_str())?;
            expect_str(tx, "amount", &intent.amount.to_string())?;
        }
        TxKind::Delegation => {
            expect_str(tx, "delegator", intent.sender.as_str())?;
            expect_str(tx, "new_delegate", intent.receiver.as_str())?;
        }
    }

    expect_str(tx, "fee", &intent.fee.to_string())?;
    expect_str(tx, "nonce", &intent.nonce.to_string())?;

    // Absent valid_until is only acceptable for the never-expires sentinel
    let valid_until = intent.valid_until.to_string();
    match tx.get("valid_until") {
        Some(Value::String(s)) if *s == valid_until => (),
        None | Some(Value::Null) if intent.valid_until == VALID_UNTIL_NEVER => (),
        v => {
            return Err(ConsistencyError::Divergence {
                field: "valid_until",
                expected: valid_until,
                actual: render(v),
            })
        }
    }

    // Absent memo is only acceptable for an empty memo
    match tx.get("memo") {
        Some(Value::String(s)) if s == intent.memo.as_str() => (),
        None | Some(Value::Null) if intent.memo.is_empty() => (),
        v => {
            return Err(ConsistencyError::Divergence {
                field: "memo",
                expected: intent.memo.to_string(),
                actual: render(v),
            })
        }
    }

    debug!("Transaction matches approved {}", intent.kind);

    Ok(())
}

/// Check the signature embedded in a signed transaction matches the device signature
pub fn check_signature(
    signature: &Signature,
    signed: &Map<String, Value>,
) -> Result<(), ConsistencyError> {
    let expected = signature.to_hex();

    match signed.get("signature") {
        Some(Value::String(s)) if *s == expected => Ok(()),
        v => Err(ConsistencyError::SignatureMismatch {
            expected,
            actual: render(v),
        }),
    }
}
