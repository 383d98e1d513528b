// Copyright (c) 2022-2023 The MobileCoin Foundation

//! User approved transaction intents
//!
//! A [TransactionIntent] is built once from validated user parameters and the
//! service suggested fee / nonce, then only ever read: the device request is encoded
//! from it and every service transaction is checked against it.

use log::debug;
use serde_json::{Map, Value};

use ledger_mina_apdu::{
    sign_tx::SignTxReq,
    types::{Address, Memo, NetworkId, TxKind, VALID_UNTIL_NEVER},
};

/// Token ID for the default Mina token
pub const DEFAULT_TOKEN_ID: &str = "1";

/// User supplied transaction parameters, prior to fee / nonce resolution
#[derive(Clone, PartialEq, Debug)]
pub struct TxParams {
    pub kind: TxKind,
    /// BIP44 account index for the signing key
    pub account_index: u32,
    /// Sender (payment) or delegator (delegation) address
    pub sender: Address,
    /// Receiver (payment) or new delegate (delegation) address
    pub receiver: Address,
    /// Amount in nanomina, ignored for delegations
    pub amount: u64,
    /// Fee override
    pub fee: Option<u64>,
    /// Nonce override
    pub nonce: Option<u32>,
    /// Valid-until slot, omitted for "never expires"
    pub valid_until: Option<u32>,
    pub memo: Option<Memo>,
}

impl TxParams {
    /// Resolve parameters into an immutable intent, user overrides win over service suggestions
    pub fn resolve(
        &self,
        suggested_fee: u64,
        service_nonce: u32,
        network_id: NetworkId,
    ) -> TransactionIntent {
        if let Some(f) = self.fee {
            debug!("Using fee override: {}", f);
        }
        if let Some(n) = self.nonce {
            debug!("Using nonce override: {}", n);
        }

        TransactionIntent {
            kind: self.kind,
            account_index: self.account_index,
            sender: self.sender,
            receiver: self.receiver,
            amount: match self.kind {
                TxKind::Payment => self.amount,
                TxKind::Delegation => 0,
            },
            fee: self.fee.unwrap_or(suggested_fee),
            nonce: self.nonce.unwrap_or(service_nonce),
            valid_until: self.valid_until.unwrap_or(VALID_UNTIL_NEVER),
            memo: self.memo.unwrap_or_default(),
            network_id,
        }
    }
}

/// Immutable, user approved transaction
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct TransactionIntent {
    pub kind: TxKind,
    pub account_index: u32,
    pub sender: Address,
    pub receiver: Address,
    pub amount: u64,
    pub fee: u64,
    pub nonce: u32,
    pub valid_until: u32,
    pub memo: Memo,
    pub network_id: NetworkId,
}

impl TransactionIntent {
    /// Build the device signing request
    pub fn sign_request(&self) -> SignTxReq {
        SignTxReq {
            account_index: self.account_index,
            sender: self.sender,
            receiver: self.receiver,
            amount: self.amount,
            fee: self.fee,
            nonce: self.nonce,
            valid_until: self.valid_until,
            memo: self.memo,
            kind: self.kind,
            network_id: self.network_id,
        }
    }

    /// Total cost to the sender
    pub fn total(&self) -> Option<u64> {
        self.amount.checked_add(self.fee)
    }

    /// Explicit user valid-until (`None` for the never-expires sentinel)
    pub fn valid_until_override(&self) -> Option<u32> {
        match self.valid_until {
            VALID_UNTIL_NEVER => None,
            v => Some(v),
        }
    }

    /// Explicit user memo (`None` when empty)
    pub fn memo_override(&self) -> Option<&str> {
        match self.memo.is_empty() {
            true => None,
            false => Some(self.memo.as_str()),
        }
    }

    /// Write user valid-until / memo into a service transaction that omitted them.
    ///
    /// Values the service did echo are left untouched so that any difference
    /// is reported by the consistency check.
    pub fn apply_overrides(&self, tx: &mut Map<String, Value>) {
        if let Some(v) = self.valid_until_override() {
            if tx.get("valid_until").map_or(true, Value::is_null) {
                debug!("Applying valid_until override: {}", v);
                tx.insert("valid_until".to_string(), Value::String(v.to_string()));
            }
        }

        if let Some(m) = self.memo_override() {
            if tx.get("memo").map_or(true, Value::is_null) {
                debug!("Applying memo override: {}", m);
                tx.insert("memo".to_string(), Value::String(m.to_string()));
            }
        }
    }

    /// Render the transaction body in the construction service layout
    pub fn to_json(&self) -> Map<String, Value> {
        let mut m = Map::new();

        match self.kind {
            TxKind::Payment => {
                m.insert("to".into(), self.receiver.to_string().into());
                m.insert("from".into(), self.sender.to_string().into());
                m.insert("fee".into(), self.fee.to_string().into());
                m.insert("token".into(), DEFAULT_TOKEN_ID.into());
                m.insert("nonce".into(), self.nonce.to_string().into());
                m.insert("memo".into(), self.memo_json());
                m.insert("amount".into(), self.amount.to_string().into());
                m.insert("valid_until".into(), self.valid_until.to_string().into());
            }
            TxKind::Delegation => {
                m.insert("delegator".into(), self.sender.to_string().into());
                m.insert("new_delegate".into(), self.receiver.to_string().into());
                m.insert("fee".into(), self.fee.to_string().into());
                m.insert("nonce".into(), self.nonce.to_string().into());
                m.insert("memo".into(), self.memo_json());
                m.insert("valid_until".into(), self.valid_until.to_string().into());
            }
        }

        m
    }

    fn memo_json(&self) -> Value {
        match self.memo_override() {
            Some(m) => Value::String(m.to_string()),
            None => Value::Null,
        }
    }
}
