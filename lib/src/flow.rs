// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Transaction signing flows
//!
//! [send_transaction] runs the full online pipeline, checking every service
//! transaction against the approved intent before signing and before submission.
//! Each failure is terminal and reported with the [Step] at which it occurred.

use ledger_lib::Exchange;
use log::{debug, info};
use serde::Serialize;
use serde_json::{Map, Value};
use strum::Display;

use ledger_mina_apdu::{
    sign_tx::Signature,
    types::{Address, Memo, NetworkId, TxKind},
};

use crate::{
    check::{check_signature, check_tx},
    intent::{TransactionIntent, TxParams},
    service::{resolve_network, Construction, NetworkIdentifier, SignedTx},
    DeviceHandle, Error,
};

/// Network assumed for offline signing when none is specified
pub const OFFLINE_DEFAULT_NETWORK: &str = "mainnet";

/// Signing flow steps
#[derive(Copy, Clone, Debug, PartialEq, Eq, Display)]
pub enum Step {
    ResolveNetwork,
    FetchMetadata,
    ApplyOverrides,
    FetchBalance,
    ConfirmSign,
    BuildUnsigned,
    CheckUnsigned,
    DeviceSign,
    Combine,
    CheckSigned,
    VerifySignature,
    ConfirmSubmit,
    Submit,
}

/// Flow failure, with the step at which it occurred
#[derive(Debug, thiserror::Error)]
#[error("{step} failed: {error}")]
pub struct FlowError {
    pub step: Step,
    #[source]
    pub error: Error,
}

/// Helper to tag errors with the current [Step]
trait AtStep<T> {
    fn at(self, step: Step) -> Result<T, FlowError>;
}

impl<T, E: Into<Error>> AtStep<T> for Result<T, E> {
    fn at(self, step: Step) -> Result<T, FlowError> {
        self.map_err(|e| FlowError {
            step,
            error: e.into(),
        })
    }
}

/// Confirmation prompts presented to the user
#[derive(Debug)]
pub enum Prompt<'a> {
    /// Approve the intent before requesting a device signature
    Sign {
        intent: &'a TransactionIntent,
        network: &'a str,
        balance: Option<u64>,
    },
    /// Approve the signed transaction before broadcast
    Submit {
        intent: &'a TransactionIntent,
        network: &'a str,
        signed: &'a SignedTx,
    },
}

/// User confirmation gate, returning `false` cancels the flow
pub trait Approver {
    fn approve(&mut self, prompt: &Prompt<'_>) -> bool;
}

/// Approve every prompt (non-interactive use)
#[derive(Copy, Clone, Debug, Default)]
pub struct AutoApprove;

impl Approver for AutoApprove {
    fn approve(&mut self, _prompt: &Prompt<'_>) -> bool {
        true
    }
}

/// Options for online flows
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FlowOptions {
    /// Network name override, replacing the service reported network
    pub network: Option<String>,
}

/// Result of a submitted transaction
#[derive(Clone, Debug, PartialEq)]
pub struct Receipt {
    pub intent: TransactionIntent,
    pub signature: Signature,
    pub signed: SignedTx,
    /// Transaction hash returned on submission
    pub tx_hash: String,
}

/// Signed transaction in the construction service layout, for offline use
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SignedTransactionJson {
    pub signature: String,
    pub payment: Option<Map<String, Value>>,
    pub stake_delegation: Option<Map<String, Value>>,
    pub create_token: Option<Value>,
    pub create_token_account: Option<Value>,
    pub mint_tokens: Option<Value>,
}

impl SignedTransactionJson {
    /// Build from an intent and its device signature
    pub fn new(intent: &TransactionIntent, signature: &Signature) -> Self {
        let body = intent.to_json();
        let (payment, stake_delegation) = match intent.kind {
            TxKind::Payment => (Some(body), None),
            TxKind::Delegation => (None, Some(body)),
        };

        Self {
            signature: signature.to_hex(),
            payment,
            stake_delegation,
            create_token: None,
            create_token_account: None,
            mint_tokens: None,
        }
    }
}

/// Resolve the service network, applying any override
async fn network<S: Construction + Sync>(
    service: &S,
    opts: &FlowOptions,
) -> Result<NetworkIdentifier, FlowError> {
    let networks = service.network_list().await.at(Step::ResolveNetwork)?;
    let n = resolve_network(&networks, opts.network.as_deref()).at(Step::ResolveNetwork)?;

    info!("Using network: {}", n.network);

    Ok(n)
}

/// Fetch the balance of an address
pub async fn get_balance<S: Construction + Sync>(
    service: &S,
    address: &Address,
    opts: &FlowOptions,
) -> Result<u64, FlowError> {
    let n = network(service, opts).await?;

    service.balance(&n, address).await.at(Step::FetchBalance)
}

/// Sign and submit a payment or delegation via the construction service
pub async fn send_transaction<T, S, A>(
    device: &mut DeviceHandle<T>,
    service: &S,
    approver: &mut A,
    params: &TxParams,
    opts: &FlowOptions,
) -> Result<Receipt, FlowError>
where
    T: Exchange + Send,
    S: Construction + Sync,
    A: Approver,
{
    let n = network(service, opts).await?;

    // Nonce and suggested fee
    let meta = service
        .metadata(&n, &params.sender)
        .await
        .at(Step::FetchMetadata)?;
    debug!("Account metadata: {:?}", meta);

    let intent = params.resolve(
        meta.suggested_fee,
        meta.nonce,
        NetworkId::from_name(&n.network),
    );
    debug!("Resolved intent: {:?}", intent);

    let balance = service
        .balance(&n, &intent.sender)
        .await
        .at(Step::FetchBalance)?;

    let required = intent.total().ok_or(Error::Overflow).at(Step::FetchBalance)?;
    if required > balance {
        return Err(Error::InsufficientBalance { required, balance }).at(Step::FetchBalance);
    }

    let p = Prompt::Sign {
        intent: &intent,
        network: &n.network,
        balance: Some(balance),
    };
    if !approver.approve(&p) {
        return Err(Error::Cancelled).at(Step::ConfirmSign);
    }

    // Build and check the unsigned transaction before anything is signed
    let mut unsigned = service.payloads(&n, &intent).await.at(Step::BuildUnsigned)?;
    intent.apply_overrides(unsigned.tx_mut());

    check_tx(&intent, unsigned.tx()).at(Step::CheckUnsigned)?;

    info!("Signing transaction (please confirm on Ledger device)");
    let signature = device
        .sign_tx(&intent.sign_request())
        .await
        .at(Step::DeviceSign)?;
    debug!("Received signature: {}", signature);

    let mut signed = service
        .combine(&n, &unsigned, &signature)
        .await
        .at(Step::Combine)?;
    intent.apply_overrides(signed.tx_mut());

    check_tx(&intent, signed.tx()).at(Step::CheckSigned)?;
    check_signature(&signature, signed.envelope()).at(Step::VerifySignature)?;

    let p = Prompt::Submit {
        intent: &intent,
        network: &n.network,
        signed: &signed,
    };
    if !approver.approve(&p) {
        return Err(Error::Cancelled).at(Step::ConfirmSubmit);
    }

    let tx_hash = service.submit(&n, &signed).await.at(Step::Submit)?;
    info!("Transaction id: {}", tx_hash);

    Ok(Receipt {
        intent,
        signature,
        signed,
        tx_hash,
    })
}

/// Sign a transaction without a construction service.
///
/// Fee and nonce must be supplied, the network name defaults to `mainnet`.
pub async fn sign_offline<T, A>(
    device: &mut DeviceHandle<T>,
    approver: &mut A,
    params: &TxParams,
    network: Option<&str>,
) -> Result<SignedTransactionJson, FlowError>
where
    T: Exchange + Send,
    A: Approver,
{
    let fee = params
        .fee
        .ok_or(Error::MissingOption("fee"))
        .at(Step::ApplyOverrides)?;
    let nonce = params
        .nonce
        .ok_or(Error::MissingOption("nonce"))
        .at(Step::ApplyOverrides)?;

    let network = network.unwrap_or(OFFLINE_DEFAULT_NETWORK);
    let intent = params.resolve(fee, nonce, NetworkId::from_name(network));

    let p = Prompt::Sign {
        intent: &intent,
        network,
        balance: None,
    };
    if !approver.approve(&p) {
        return Err(Error::Cancelled).at(Step::ConfirmSign);
    }

    info!("Signing transaction (please confirm on Ledger device)");
    let signature = device
        .sign_tx(&intent.sign_request())
        .await
        .at(Step::DeviceSign)?;

    Ok(SignedTransactionJson::new(&intent, &signature))
}

/// Sign a zero value self-payment with a random memo, for checking device operation
pub async fn test_transaction<T, A>(
    device: &mut DeviceHandle<T>,
    approver: &mut A,
    account_index: u32,
    address: &Address,
    network: Option<&str>,
) -> Result<SignedTransactionJson, FlowError>
where
    T: Exchange + Send,
    A: Approver,
{
    let entropy: [u8; 16] = rand::random();
    let memo = Memo::new(&hex::encode(entropy))
        .map_err(Error::from)
        .at(Step::ApplyOverrides)?;

    let network = network.unwrap_or_default();

    let intent = TransactionIntent {
        kind: TxKind::Payment,
        account_index,
        sender: *address,
        receiver: *address,
        amount: 0,
        fee: 0,
        nonce: 0,
        valid_until: 0,
        memo,
        network_id: NetworkId::from_name(network),
    };

    let p = Prompt::Sign {
        intent: &intent,
        network,
        balance: None,
    };
    if !approver.approve(&p) {
        return Err(Error::Cancelled).at(Step::ConfirmSign);
    }

    let signature = device
        .sign_tx(&intent.sign_request())
        .await
        .at(Step::DeviceSign)?;

    Ok(SignedTransactionJson::new(&intent, &signature))
}
