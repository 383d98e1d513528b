// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Construction service abstraction
//!
//! Unsigned and signed transactions are assembled by an untrusted service,
//! objects returned here are only ever compared against the approved intent.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use ledger_mina_apdu::{
    sign_tx::Signature,
    types::{Address, TxKind},
};

use crate::{error::ServiceError, intent::TransactionIntent};

mod rosetta;
pub use rosetta::RosettaClient;

/// Blockchain names accepted from the network list
pub const MINA_BLOCKCHAINS: &[&str] = &["coda", "mina"];

/// Network identifier as used in every service request
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct NetworkIdentifier {
    pub blockchain: String,
    pub network: String,
}

/// Account metadata for transaction construction
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct Metadata {
    /// Next account nonce
    pub nonce: u32,
    /// Suggested fee in nanomina
    pub suggested_fee: u64,
}

/// Construction service operations consumed by the signing flow
#[async_trait]
pub trait Construction {
    /// List available networks
    async fn network_list(&self) -> Result<Vec<NetworkIdentifier>, ServiceError>;

    /// Fetch nonce and suggested fee for a sender
    async fn metadata(
        &self,
        network: &NetworkIdentifier,
        sender: &Address,
    ) -> Result<Metadata, ServiceError>;

    /// Fetch an account balance in nanomina
    async fn balance(
        &self,
        network: &NetworkIdentifier,
        address: &Address,
    ) -> Result<u64, ServiceError>;

    /// Construct an unsigned transaction for an intent
    async fn payloads(
        &self,
        network: &NetworkIdentifier,
        intent: &TransactionIntent,
    ) -> Result<UnsignedTx, ServiceError>;

    /// Combine an unsigned transaction and signature
    async fn combine(
        &self,
        network: &NetworkIdentifier,
        unsigned: &UnsignedTx,
        signature: &Signature,
    ) -> Result<SignedTx, ServiceError>;

    /// Submit a signed transaction, returning the transaction hash
    async fn submit(
        &self,
        network: &NetworkIdentifier,
        signed: &SignedTx,
    ) -> Result<String, ServiceError>;
}

/// Pick the network from a service network list, applying any user override
pub fn resolve_network(
    networks: &[NetworkIdentifier],
    network_override: Option<&str>,
) -> Result<NetworkIdentifier, ServiceError> {
    let mut n = networks.first().cloned().ok_or(ServiceError::NoNetworks)?;

    if !MINA_BLOCKCHAINS.contains(&n.blockchain.as_str()) {
        return Err(ServiceError::UnsupportedBlockchain(n.blockchain));
    }

    if let Some(o) = network_override {
        n.network = o.to_string();
    }

    Ok(n)
}

/// Split a transaction body object out of a payload, rejecting absent or null entries
fn take_body(
    payload: &mut Map<String, Value>,
    key: &'static str,
) -> Result<Map<String, Value>, ServiceError> {
    match payload.remove(key) {
        Some(Value::Object(o)) => Ok(o),
        None | Some(Value::Null) => Err(ServiceError::MissingKey(key)),
        Some(v) => Err(ServiceError::InvalidValue {
            key,
            value: v.to_string(),
        }),
    }
}

fn parse_object(s: &str) -> Result<Map<String, Value>, ServiceError> {
    match serde_json::from_str::<Value>(s)? {
        Value::Object(o) => Ok(o),
        v => Err(ServiceError::InvalidValue {
            key: "transaction",
            value: v.to_string(),
        }),
    }
}

/// Unsigned transaction payload returned by the service
#[derive(Clone, PartialEq, Debug)]
pub struct UnsignedTx {
    kind: TxKind,
    body: Map<String, Value>,
    rest: Map<String, Value>,
}

impl UnsignedTx {
    /// Transaction body key in unsigned payloads
    pub fn body_key(kind: TxKind) -> &'static str {
        match kind {
            TxKind::Payment => "payment",
            TxKind::Delegation => "stakeDelegation",
        }
    }

    /// Parse an `unsigned_transaction` string, requiring a body for the expected kind
    pub fn parse(kind: TxKind, s: &str) -> Result<Self, ServiceError> {
        Self::from_payload(kind, parse_object(s)?)
    }

    pub fn from_payload(kind: TxKind, mut rest: Map<String, Value>) -> Result<Self, ServiceError> {
        let body = take_body(&mut rest, Self::body_key(kind))?;
        Ok(Self { kind, body, rest })
    }

    pub fn kind(&self) -> TxKind {
        self.kind
    }

    /// Transaction body for consistency checks
    pub fn tx(&self) -> &Map<String, Value> {
        &self.body
    }

    /// Mutable transaction body for applying overrides
    pub fn tx_mut(&mut self) -> &mut Map<String, Value> {
        &mut self.body
    }

    /// Full payload, as passed back to the service
    pub fn payload(&self) -> Map<String, Value> {
        let mut p = self.rest.clone();
        p.insert(Self::body_key(self.kind).to_string(), Value::Object(self.body.clone()));
        p
    }

    pub fn to_json_string(&self) -> String {
        Value::Object(self.payload()).to_string()
    }
}

/// Signed transaction returned by the service
#[derive(Clone, PartialEq, Debug)]
pub struct SignedTx {
    kind: TxKind,
    body: Map<String, Value>,
    rest: Map<String, Value>,
}

impl SignedTx {
    /// Transaction body key in signed payloads
    pub fn body_key(kind: TxKind) -> &'static str {
        match kind {
            TxKind::Payment => "payment",
            TxKind::Delegation => "stake_delegation",
        }
    }

    /// Parse a `signed_transaction` string, requiring a body for the expected kind
    pub fn parse(kind: TxKind, s: &str) -> Result<Self, ServiceError> {
        Self::from_payload(kind, parse_object(s)?)
    }

    pub fn from_payload(kind: TxKind, mut rest: Map<String, Value>) -> Result<Self, ServiceError> {
        let body = take_body(&mut rest, Self::body_key(kind))?;
        Ok(Self { kind, body, rest })
    }

    pub fn kind(&self) -> TxKind {
        self.kind
    }

    pub fn tx(&self) -> &Map<String, Value> {
        &self.body
    }

    pub fn tx_mut(&mut self) -> &mut Map<String, Value> {
        &mut self.body
    }

    /// Signature embedded by the service, if any
    pub fn signature(&self) -> Option<&str> {
        self.rest.get("signature").and_then(Value::as_str)
    }

    /// Payload fields other than the transaction body
    pub fn envelope(&self) -> &Map<String, Value> {
        &self.rest
    }

    pub fn payload(&self) -> Map<String, Value> {
        let mut p = self.rest.clone();
        p.insert(Self::body_key(self.kind).to_string(), Value::Object(self.body.clone()));
        p
    }

    pub fn to_json_string(&self) -> String {
        Value::Object(self.payload()).to_string()
    }
}

#[cfg(test)]
mod test {
    use serde_json::json;

    use super::*;

    fn net(blockchain: &str, network: &str) -> NetworkIdentifier {
        NetworkIdentifier {
            blockchain: blockchain.to_string(),
            network: network.to_string(),
        }
    }

    #[test]
    fn network_resolution() {
        assert!(matches!(
            resolve_network(&[], None),
            Err(ServiceError::NoNetworks)
        ));

        assert!(matches!(
            resolve_network(&[net("bitcoin", "mainnet")], None),
            Err(ServiceError::UnsupportedBlockchain(b)) if b == "bitcoin"
        ));

        let n = resolve_network(&[net("coda", "debug"), net("coda", "other")], None).unwrap();
        assert_eq!(n, net("coda", "debug"));

        let n = resolve_network(&[net("mina", "devnet")], Some("mainnet")).unwrap();
        assert_eq!(n, net("mina", "mainnet"));
    }

    #[test]
    fn unsigned_body_required() {
        let s = json!({ "randomOracleInput": "00", "payment": { "fee": "1" } }).to_string();
        let u = UnsignedTx::parse(TxKind::Payment, &s).unwrap();
        assert_eq!(u.tx()["fee"], json!("1"));

        // Wrong kind for the payload
        assert!(matches!(
            UnsignedTx::parse(TxKind::Delegation, &s),
            Err(ServiceError::MissingKey("stakeDelegation"))
        ));

        let s = json!({ "payment": null }).to_string();
        assert!(matches!(
            UnsignedTx::parse(TxKind::Payment, &s),
            Err(ServiceError::MissingKey("payment"))
        ));

        assert!(matches!(
            UnsignedTx::parse(TxKind::Payment, "[]"),
            Err(ServiceError::InvalidValue { .. })
        ));
        assert!(matches!(
            UnsignedTx::parse(TxKind::Payment, "{"),
            Err(ServiceError::Json(_))
        ));
    }

    #[test]
    fn signed_body_and_signature() {
        let s = json!({
            "signature": "abcd",
            "payment": null,
            "stake_delegation": { "fee": "1" },
        })
        .to_string();

        let mut t = SignedTx::parse(TxKind::Delegation, &s).unwrap();
        assert_eq!(t.signature(), Some("abcd"));

        t.tx_mut().insert("memo".into(), json!("m"));
        assert_eq!(t.payload()["stake_delegation"]["memo"], json!("m"));

        assert!(SignedTx::parse(TxKind::Payment, &s).is_err());
    }
}
