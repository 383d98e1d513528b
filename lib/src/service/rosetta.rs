// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Rosetta construction API client
//!
//! Every request is built as a fresh typed value per call.

use async_trait::async_trait;
use log::{debug, trace};
use serde::Serialize;
use serde_json::{Map, Value};

use ledger_mina_apdu::{
    sign_tx::Signature,
    types::{Address, TxKind},
};

use super::{Construction, Metadata, NetworkIdentifier, SignedTx, UnsignedTx};
use crate::{
    error::ServiceError,
    intent::{TransactionIntent, DEFAULT_TOKEN_ID},
};

/// Default local rosetta endpoint
pub const DEFAULT_URL: &str = "http://localhost:3087";

/// Signature scheme reported to the combine endpoint
const SIGNATURE_TYPE: &str = "schnorr_poseidon";

#[derive(Clone, Debug, Serialize)]
struct Currency {
    symbol: &'static str,
    decimals: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    metadata: Option<Map<String, Value>>,
}

impl Currency {
    fn mina() -> Self {
        Self {
            symbol: "CODA",
            decimals: 9,
            metadata: None,
        }
    }
}

#[derive(Clone, Debug, Serialize)]
struct TokenMetadata {
    token_id: &'static str,
}

#[derive(Clone, Debug, Serialize)]
struct AccountIdentifier {
    address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    metadata: Option<TokenMetadata>,
}

#[derive(Clone, Debug, Serialize)]
struct OperationIdentifier {
    index: u32,
}

#[derive(Clone, Debug, Serialize)]
struct Amount {
    value: String,
    currency: Currency,
}

#[derive(Clone, Debug, Serialize)]
struct DelegateMetadata {
    delegate_change_target: String,
}

#[derive(Clone, Debug, Serialize)]
struct Operation {
    operation_identifier: OperationIdentifier,
    related_operations: Vec<OperationIdentifier>,
    #[serde(rename = "type")]
    kind: &'static str,
    status: &'static str,
    account: AccountIdentifier,
    #[serde(skip_serializing_if = "Option::is_none")]
    amount: Option<Amount>,
    #[serde(skip_serializing_if = "Option::is_none")]
    metadata: Option<DelegateMetadata>,
}

impl Operation {
    fn new(index: u32, kind: &'static str, address: &Address) -> Self {
        Self {
            operation_identifier: OperationIdentifier { index },
            related_operations: vec![],
            kind,
            status: "Pending",
            account: AccountIdentifier {
                address: address.to_string(),
                metadata: Some(TokenMetadata {
                    token_id: DEFAULT_TOKEN_ID,
                }),
            },
            amount: None,
            metadata: None,
        }
    }

    fn amount(mut self, value: String) -> Self {
        self.amount = Some(Amount {
            value,
            currency: Currency::mina(),
        });
        self
    }
}

#[derive(Clone, Debug, Serialize)]
struct NetworkListReq {
    metadata: Map<String, Value>,
}

#[derive(Clone, Debug, Serialize)]
struct MetadataOptions<'a> {
    sender: &'a str,
    token_id: &'static str,
}

#[derive(Clone, Debug, Serialize)]
struct MetadataReq<'a> {
    network_identifier: &'a NetworkIdentifier,
    options: MetadataOptions<'a>,
    public_keys: Vec<Value>,
}

#[derive(Clone, Debug, Serialize)]
struct BalanceReq<'a> {
    network_identifier: &'a NetworkIdentifier,
    account_identifier: AccountIdentifier,
    currencies: Vec<Currency>,
}

#[derive(Clone, Debug, Serialize)]
struct PayloadsMetadata {
    sender: String,
    nonce: String,
    token_id: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    valid_until: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    memo: Option<String>,
}

#[derive(Clone, Debug, Serialize)]
struct PayloadsReq<'a> {
    network_identifier: &'a NetworkIdentifier,
    operations: Vec<Operation>,
    metadata: PayloadsMetadata,
    public_keys: Vec<Value>,
}

#[derive(Clone, Debug, Serialize)]
struct SigningPayload {
    address: String,
    hex_bytes: String,
    signature_type: &'static str,
}

#[derive(Clone, Debug, Serialize)]
struct PublicKey {
    hex_bytes: String,
    curve_type: &'static str,
}

#[derive(Clone, Debug, Serialize)]
struct SignatureEntry {
    signing_payload: SigningPayload,
    signature_type: &'static str,
    public_key: PublicKey,
    hex_bytes: String,
}

#[derive(Clone, Debug, Serialize)]
struct CombineReq<'a> {
    network_identifier: &'a NetworkIdentifier,
    unsigned_transaction: String,
    signatures: Vec<SignatureEntry>,
}

#[derive(Clone, Debug, Serialize)]
struct SubmitReq<'a> {
    network_identifier: &'a NetworkIdentifier,
    signed_transaction: String,
}

/// Build the operations for an intent
fn operations(intent: &TransactionIntent) -> Vec<Operation> {
    let fee_payer =
        Operation::new(0, "fee_payer_dec", &intent.sender).amount(format!("-{}", intent.fee));

    match intent.kind {
        TxKind::Payment => {
            let source = Operation::new(1, "payment_source_dec", &intent.sender)
                .amount(format!("-{}", intent.amount));

            let mut receiver = Operation::new(2, "payment_receiver_inc", &intent.receiver)
                .amount(intent.amount.to_string());
            receiver.related_operations = vec![OperationIdentifier { index: 1 }];

            vec![fee_payer, source, receiver]
        }
        TxKind::Delegation => {
            let mut change = Operation::new(1, "delegate_change", &intent.sender);
            change.account.metadata = None;
            change.metadata = Some(DelegateMetadata {
                delegate_change_target: intent.receiver.to_string(),
            });

            vec![fee_payer, change]
        }
    }
}

/// Look up a nested key, reporting the first missing segment
fn lookup<'a>(v: &'a Value, path: &[&'static str]) -> Result<&'a Value, ServiceError> {
    let mut c = v;

    for k in path {
        c = match c {
            Value::Array(a) => k.parse::<usize>().ok().and_then(|i| a.get(i)),
            Value::Object(o) => o.get(*k),
            _ => None,
        }
        .filter(|v| !v.is_null())
        .ok_or_else(|| rejection(v).unwrap_or(ServiceError::MissingKey(*k)))?;
    }

    Ok(c)
}

/// Decimal number (string or JSON number) at a response path
fn number<T: std::str::FromStr>(v: &Value, path: &[&'static str]) -> Result<T, ServiceError> {
    let key = path.last().copied().unwrap_or("value");
    let n = lookup(v, path)?;

    let s = match n {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => {
            return Err(ServiceError::InvalidValue {
                key,
                value: n.to_string(),
            })
        }
    };

    s.parse::<T>().map_err(|_| ServiceError::InvalidValue { key, value: s })
}

fn string<'a>(v: &'a Value, path: &[&'static str]) -> Result<&'a str, ServiceError> {
    let key = path.last().copied().unwrap_or("value");
    let s = lookup(v, path)?;

    s.as_str().ok_or_else(|| ServiceError::InvalidValue {
        key,
        value: s.to_string(),
    })
}

/// Convert a rosetta error object to a [ServiceError::Rejected]
fn rejection(v: &Value) -> Option<ServiceError> {
    let code = v.get("code")?.as_i64()?;

    // Detailed reasons arrive as `details.body[1]`
    let message = v
        .pointer("/details/body/1")
        .and_then(Value::as_str)
        .or_else(|| v.get("message").and_then(Value::as_str))
        .unwrap_or("unknown error")
        .to_string();

    Some(ServiceError::Rejected { code, message })
}

/// Parse a response body, mapping non-success statuses to errors
fn parse_response(status: u16, body: String) -> Result<Value, ServiceError> {
    if !(200..300).contains(&status) {
        let e = serde_json::from_str::<Value>(&body)
            .ok()
            .as_ref()
            .and_then(rejection)
            .unwrap_or(ServiceError::Status { status, body });

        return Err(e);
    }

    Ok(serde_json::from_str(&body)?)
}

/// Rosetta HTTP client
#[derive(Clone, Debug)]
pub struct RosettaClient {
    client: reqwest::Client,
    url: String,
}

impl RosettaClient {
    /// Create a new client for the provided base URL
    pub fn new(url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.trim_end_matches('/').to_string(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn post<REQ: Serialize + Sync>(&self, path: &str, req: &REQ) -> Result<Value, ServiceError> {
        let url = format!("{}{}", self.url, path);

        debug!("POST {}", url);
        trace!("Request: {}", serde_json::to_string(req)?);

        let resp = self.client.post(&url).json(req).send().await?;
        let status = resp.status();
        let body = resp.text().await?;

        trace!("Response ({}): {}", status, body);

        parse_response(status.as_u16(), body)
    }
}

impl Default for RosettaClient {
    fn default() -> Self {
        Self::new(DEFAULT_URL)
    }
}

#[async_trait]
impl Construction for RosettaClient {
    async fn network_list(&self) -> Result<Vec<NetworkIdentifier>, ServiceError> {
        let req = NetworkListReq {
            metadata: Map::new(),
        };

        let v = self.post("/network/list", &req).await?;
        let ids = lookup(&v, &["network_identifiers"])?;

        let networks: Vec<NetworkIdentifier> = serde_json::from_value(ids.clone())?;

        Ok(networks)
    }

    async fn metadata(
        &self,
        network: &NetworkIdentifier,
        sender: &Address,
    ) -> Result<Metadata, ServiceError> {
        let req = MetadataReq {
            network_identifier: network,
            options: MetadataOptions {
                sender: sender.as_str(),
                token_id: DEFAULT_TOKEN_ID,
            },
            public_keys: vec![],
        };

        let v = self.post("/construction/metadata", &req).await?;

        Ok(Metadata {
            nonce: number(&v, &["metadata", "nonce"])?,
            suggested_fee: number(&v, &["suggested_fee", "0", "value"])?,
        })
    }

    async fn balance(
        &self,
        network: &NetworkIdentifier,
        address: &Address,
    ) -> Result<u64, ServiceError> {
        let req = BalanceReq {
            network_identifier: network,
            account_identifier: AccountIdentifier {
                address: address.to_string(),
                metadata: None,
            },
            currencies: vec![Currency {
                metadata: Some(Map::new()),
                ..Currency::mina()
            }],
        };

        let v = self.post("/account/balance", &req).await?;

        number(&v, &["balances", "0", "value"])
    }

    async fn payloads(
        &self,
        network: &NetworkIdentifier,
        intent: &TransactionIntent,
    ) -> Result<UnsignedTx, ServiceError> {
        let req = PayloadsReq {
            network_identifier: network,
            operations: operations(intent),
            metadata: PayloadsMetadata {
                sender: intent.sender.to_string(),
                nonce: intent.nonce.to_string(),
                token_id: DEFAULT_TOKEN_ID,
                valid_until: intent.valid_until_override().map(|v| v.to_string()),
                memo: intent.memo_override().map(|m| m.to_string()),
            },
            public_keys: vec![],
        };

        let v = self.post("/construction/payloads", &req).await?;
        let s = string(&v, &["unsigned_transaction"])?;

        UnsignedTx::parse(intent.kind, s)
    }

    async fn combine(
        &self,
        network: &NetworkIdentifier,
        unsigned: &UnsignedTx,
        signature: &Signature,
    ) -> Result<SignedTx, ServiceError> {
        let req = CombineReq {
            network_identifier: network,
            unsigned_transaction: unsigned.to_json_string(),
            signatures: vec![SignatureEntry {
                signing_payload: SigningPayload {
                    address: String::new(),
                    hex_bytes: String::new(),
                    signature_type: SIGNATURE_TYPE,
                },
                signature_type: SIGNATURE_TYPE,
                public_key: PublicKey {
                    hex_bytes: String::new(),
                    curve_type: "pallas",
                },
                hex_bytes: signature.to_hex(),
            }],
        };

        let v = self.post("/construction/combine", &req).await?;
        let s = string(&v, &["signed_transaction"])?;

        SignedTx::parse(unsigned.kind(), s)
    }

    async fn submit(
        &self,
        network: &NetworkIdentifier,
        signed: &SignedTx,
    ) -> Result<String, ServiceError> {
        let req = SubmitReq {
            network_identifier: network,
            signed_transaction: signed.to_json_string(),
        };

        let v = self.post("/construction/submit", &req).await?;
        let hash = string(&v, &["transaction_identifier", "hash"])?;

        Ok(hash.to_string())
    }
}
