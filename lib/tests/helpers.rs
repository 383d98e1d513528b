// Copyright (c) 2022-2023 The MobileCoin Foundation

#![allow(dead_code)]

use std::{
    collections::VecDeque,
    io::{Error as IoError, ErrorKind},
    str::FromStr,
    sync::Mutex,
    time::Duration,
};

use async_trait::async_trait;
use log::{debug, LevelFilter};
use serde_json::{json, Map, Value};
use simplelog::SimpleLogger;

use ledger_mina::{
    apdu::{
        sign_tx::Signature,
        types::{Address, TxKind},
    },
    flow::{Approver, Prompt},
    intent::TransactionIntent,
    service::{Construction, Metadata, NetworkIdentifier, SignedTx, UnsignedTx},
    Exchange, ServiceError,
};

pub const A: &str = "B62qnzbXmRNo9q32n4SNu2mpB8e7FYYLH8NmaX6oFCBYjjQ8SbD7uzV";
pub const B: &str = "B62qicipYxyEHu7QjUqS7QvBipTs5CzgkYZZZkPoKVYBu6tnDUcE9Zt";

pub const TX_HASH: &str = "CkpYcKc4dkYBt3hnwkPTHKLXkP2KqTLgSZtaEdtJzhk4FrVFjGKZy";

/// Setup logging for tests
pub fn setup_logging() {
    let log_level = match std::env::var("LOG_LEVEL").map(|v| LevelFilter::from_str(&v)) {
        Ok(Ok(l)) => l,
        _ => LevelFilter::Debug,
    };

    let log_cfg = simplelog::ConfigBuilder::new()
        .add_filter_ignore_str("reqwest")
        .add_filter_ignore_str("hyper")
        .build();

    let _ = SimpleLogger::init(log_level, log_cfg);
}

/// Append a status word to response data
pub fn with_status(data: &[u8], sw: u16) -> Vec<u8> {
    let mut r = data.to_vec();
    r.extend_from_slice(&sw.to_be_bytes());
    r
}

/// Scripted device, replies to each request with the next queued response
#[derive(Default)]
pub struct MockDevice {
    pub responses: VecDeque<Vec<u8>>,
    pub requests: Vec<Vec<u8>>,
}

impl MockDevice {
    pub fn new(responses: impl IntoIterator<Item = Vec<u8>>) -> Self {
        Self {
            responses: responses.into_iter().collect(),
            requests: vec![],
        }
    }

    /// Device returning a single signature
    pub fn signing(s: &Signature) -> Self {
        Self::new([with_status(s.as_bytes(), 0x9000)])
    }
}

#[async_trait]
impl Exchange for MockDevice {
    async fn exchange(
        &mut self,
        command: &[u8],
        _timeout: Duration,
    ) -> Result<Vec<u8>, ledger_lib::Error> {
        debug!("Mock device RX: {}", hex::encode(command));

        self.requests.push(command.to_vec());

        // Unscripted requests look like a disconnected device
        self.responses
            .pop_front()
            .ok_or_else(|| IoError::new(ErrorKind::NotConnected, "no scripted response").into())
    }
}

/// Scripted approver, declines once answers are exhausted
pub struct Answers(pub VecDeque<bool>);

impl Answers {
    pub fn new(a: &[bool]) -> Self {
        Self(a.iter().copied().collect())
    }

    pub fn always() -> Self {
        Self::new(&[true, true])
    }
}

impl Approver for Answers {
    fn approve(&mut self, prompt: &Prompt<'_>) -> bool {
        debug!("Prompt: {:?}", prompt);
        self.0.pop_front().unwrap_or(false)
    }
}

/// Hook for modifying service responses
pub type Hook = fn(&mut Map<String, Value>);

/// In-memory construction service
pub struct MockService {
    pub networks: Vec<NetworkIdentifier>,
    pub metadata: Metadata,
    pub balance: u64,
    /// Echo valid_until and memo as null, as older services do
    pub omit_overrides: bool,
    /// Modify the unsigned payload before it is returned
    pub unsigned_hook: Option<Hook>,
    /// Modify the signed payload before it is returned
    pub signed_hook: Option<Hook>,
    pub calls: Mutex<Vec<&'static str>>,
    pub submitted: Mutex<Vec<String>>,
}

impl Default for MockService {
    fn default() -> Self {
        Self {
            networks: vec![NetworkIdentifier {
                blockchain: "mina".to_string(),
                network: "testnet".to_string(),
            }],
            metadata: Metadata {
                nonce: 16,
                suggested_fee: 10_000_000,
            },
            balance: 10_000_000_000_000,
            omit_overrides: false,
            unsigned_hook: None,
            signed_hook: None,
            calls: Mutex::new(vec![]),
            submitted: Mutex::new(vec![]),
        }
    }
}

impl MockService {
    fn call(&self, name: &'static str) {
        debug!("Mock service call: {}", name);
        if let Ok(mut c) = self.calls.lock() {
            c.push(name);
        }
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn submitted(&self) -> Vec<String> {
        self.submitted.lock().map(|s| s.clone()).unwrap_or_default()
    }

    fn body(&self, intent: &TransactionIntent) -> Map<String, Value> {
        let mut b = intent.to_json();
        if self.omit_overrides {
            b.insert("valid_until".into(), Value::Null);
            b.insert("memo".into(), Value::Null);
        }
        b
    }
}

#[async_trait]
impl Construction for MockService {
    async fn network_list(&self) -> Result<Vec<NetworkIdentifier>, ServiceError> {
        self.call("network_list");
        Ok(self.networks.clone())
    }

    async fn metadata(
        &self,
        _network: &NetworkIdentifier,
        _sender: &Address,
    ) -> Result<Metadata, ServiceError> {
        self.call("metadata");
        Ok(self.metadata)
    }

    async fn balance(
        &self,
        _network: &NetworkIdentifier,
        _address: &Address,
    ) -> Result<u64, ServiceError> {
        self.call("balance");
        Ok(self.balance)
    }

    async fn payloads(
        &self,
        _network: &NetworkIdentifier,
        intent: &TransactionIntent,
    ) -> Result<UnsignedTx, ServiceError> {
        self.call("payloads");

        let mut p = Map::new();
        p.insert("randomOracleInput".into(), json!("000000033769356015"));
        p.insert(
            UnsignedTx::body_key(intent.kind).into(),
            Value::Object(self.body(intent)),
        );

        if let Some(h) = self.unsigned_hook {
            h(&mut p);
        }

        UnsignedTx::from_payload(intent.kind, p)
    }

    async fn combine(
        &self,
        _network: &NetworkIdentifier,
        unsigned: &UnsignedTx,
        signature: &Signature,
    ) -> Result<SignedTx, ServiceError> {
        self.call("combine");

        let kind = unsigned.kind();
        let mut body = unsigned.tx().clone();
        if self.omit_overrides {
            body.insert("valid_until".into(), Value::Null);
            body.insert("memo".into(), Value::Null);
        }

        let (payment, delegation) = match kind {
            TxKind::Payment => (Value::Object(body), Value::Null),
            TxKind::Delegation => (Value::Null, Value::Object(body)),
        };

        let mut p = json!({
            "signature": signature.to_hex(),
            "payment": payment,
            "stake_delegation": delegation,
            "create_token": null,
            "create_token_account": null,
            "mint_tokens": null,
        })
        .as_object()
        .cloned()
        .unwrap_or_default();

        if let Some(h) = self.signed_hook {
            h(&mut p);
        }

        SignedTx::from_payload(kind, p)
    }

    async fn submit(
        &self,
        _network: &NetworkIdentifier,
        signed: &SignedTx,
    ) -> Result<String, ServiceError> {
        self.call("submit");

        if let Ok(mut s) = self.submitted.lock() {
            s.push(signed.to_json_string());
        }

        Ok(TX_HASH.to_string())
    }
}
