// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Command line utility for interacting with the Ledger Mina NanoApp

use clap::Parser;
use log::{debug, error, info, LevelFilter};
use simplelog::{ConfigBuilder, SimpleLogger};

use ledger_lib::{Filters, LedgerProvider, Transport};
use ledger_mina::{
    apdu::types::{Address, Memo, TxKind},
    flow::{self, AutoApprove, FlowOptions},
    intent::TxParams,
    service::RosettaClient,
    validate, DeviceHandle, Exchange,
};

mod helpers;
use helpers::*;

/// Ledger command line utility
#[derive(Clone, PartialEq, Debug, Parser)]
struct Options {
    /// Supported transports for ledger discovery
    #[clap(long, value_enum, default_value = "any")]
    target: Target,

    /// Device index (where more than one device is available)
    #[clap(long, default_value = "0")]
    device_index: usize,

    /// Subcommand to execute
    #[clap(subcommand)]
    cmd: Actions,

    /// Enable verbose logging
    #[clap(long, env = "LOG_LEVEL", default_value = "info")]
    log_level: LevelFilter,
}

/// Device discovery target
#[derive(Copy, Clone, PartialEq, Debug, clap::ValueEnum)]
enum Target {
    /// Any connected device
    Any,
    /// USB HID devices only
    Hid,
    /// Speculos simulator over TCP only
    Tcp,
}

impl From<Target> for Filters {
    fn from(t: Target) -> Self {
        match t {
            Target::Any => Filters::Any,
            Target::Hid => Filters::Hid,
            Target::Tcp => Filters::Tcp,
        }
    }
}

/// Construction service options
#[derive(Clone, PartialEq, Debug, Parser)]
struct ServiceOptions {
    /// Rosetta construction service URL
    #[clap(long, env = "MINA_URL", default_value = "http://localhost:3087")]
    url: String,

    /// Network name override
    #[clap(long, env = "MINA_NETWORK")]
    network: Option<String>,
}

impl ServiceOptions {
    fn client(&self) -> RosettaClient {
        debug!("Using construction service: {}", self.url);
        RosettaClient::new(&self.url)
    }

    fn flow_options(&self) -> FlowOptions {
        FlowOptions {
            network: self.network.clone(),
        }
    }
}

/// Optional transaction fields
#[derive(Clone, PartialEq, Debug, Parser)]
struct TxOptions {
    /// Fee override (in MINA)
    #[clap(long, value_parser = validate::currency_fee)]
    fee: Option<u64>,

    /// Nonce override
    #[clap(long, value_parser = validate::nonce)]
    nonce: Option<u32>,

    /// Global slot after which the transaction expires
    #[clap(long, value_parser = validate::valid_until)]
    valid_until: Option<u32>,

    /// Transaction memo (publicly visible)
    #[clap(long, value_parser = validate::memo)]
    memo: Option<Memo>,

    /// Sign without a construction service, requires --fee and --nonce
    #[clap(long)]
    offline: bool,
}

#[derive(Clone, PartialEq, Debug, Parser)]
#[non_exhaustive]
enum Actions {
    /// List available devices
    List,

    /// Fetch the address for an account
    GetAddress {
        /// BIP44 account index
        #[clap(long, default_value = "0", value_parser = validate::account_index)]
        account: u32,

        /// Skip confirmation prompt
        #[clap(long)]
        yes: bool,
    },

    /// Fetch the balance for an address
    GetBalance {
        /// Mina address
        #[clap(long, value_parser = validate::address)]
        address: Address,

        #[command(flatten)]
        service: ServiceOptions,
    },

    /// Sign and submit a payment
    SendPayment {
        /// BIP44 account index of the sender
        #[clap(long, value_parser = validate::account_index)]
        account: u32,

        /// Sender address
        #[clap(long, value_parser = validate::address)]
        sender: Address,

        /// Receiver address
        #[clap(long, value_parser = validate::address)]
        receiver: Address,

        /// Amount to send (in MINA)
        #[clap(long, value_parser = validate::currency_amount)]
        amount: u64,

        #[command(flatten)]
        tx: TxOptions,

        #[command(flatten)]
        service: ServiceOptions,
    },

    /// Sign and submit a stake delegation
    Delegate {
        /// BIP44 account index of the delegator
        #[clap(long, value_parser = validate::account_index)]
        account: u32,

        /// Delegator address
        #[clap(long, value_parser = validate::address)]
        delegator: Address,

        /// New delegate address
        #[clap(long, value_parser = validate::address)]
        delegate: Address,

        #[command(flatten)]
        tx: TxOptions,

        #[command(flatten)]
        service: ServiceOptions,
    },

    /// Sign a zero value test transaction
    TestTransaction {
        /// BIP44 account index
        #[clap(long, value_parser = validate::account_index)]
        account: u32,

        /// Address corresponding to the account
        #[clap(long, value_parser = validate::address)]
        address: Address,

        /// Network name
        #[clap(long, env = "MINA_NETWORK")]
        network: Option<String>,

        /// Review the transaction and confirm before signing
        #[clap(long)]
        interactive: bool,
    },

    /// Send a raw hex encoded APDU
    RawApdu {
        /// Hex encoded frame (eg. `e00200000400000000`)
        apdu: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command line arguments
    let args = Options::parse();

    // Setup logging, suppressing HTTP client internals
    let log_config = ConfigBuilder::new()
        .add_filter_ignore_str("reqwest")
        .add_filter_ignore_str("hyper")
        .add_filter_ignore_str("rustls")
        .build();
    let _ = SimpleLogger::init(args.log_level, log_config);

    // Balance queries do not need a device
    if let Actions::GetBalance { address, service } = &args.cmd {
        let c = service.client();

        let b = flow::get_balance(&c, address, &service.flow_options()).await?;
        info!("Balance: {} MINA", validate::format_currency(b));

        return Ok(());
    }

    // Connect to ledger device
    let mut p = LedgerProvider::init().await;

    debug!("Using transport: {:?}", args.target);

    // List available devices
    let devices = p.list(args.target.into()).await?;
    if devices.is_empty() {
        return Err(anyhow::anyhow!("No devices found"));
    }

    // Handle list command
    if args.cmd == Actions::List {
        info!("Devices:");
        for (i, d) in devices.iter().enumerate() {
            info!("  {}: {:?}", i, d);
        }

        return Ok(());
    }

    // Select device by index
    let n = devices.len();
    let info = match devices.into_iter().nth(args.device_index) {
        Some(d) => d,
        None => {
            return Err(anyhow::anyhow!(
                "Invalid device index: {} (max: {})",
                args.device_index,
                n - 1
            ))
        }
    };

    debug!("Using device {}: {:?}", args.device_index, info);

    // Connect to device
    let t = match p.connect(info).await {
        Ok(d) => DeviceHandle::from(d),
        Err(e) => {
            error!("Failed to connect to device {}", args.device_index);
            return Err(e.into());
        }
    };

    // Execute command
    execute(t, args.cmd).await?;

    Ok(())
}

/// Execute a command with the provided transport
async fn execute<T>(mut t: DeviceHandle<T>, cmd: Actions) -> anyhow::Result<()>
where
    T: Exchange + Send,
{
    debug!("Executing command: {:?}", cmd);

    let mut approver = StdinApprover;

    match cmd {
        Actions::GetAddress { account, yes } => {
            println!("Get address for account {} (path {})", account, path(account));
            if !yes && !confirm("Continue?") {
                return Err(anyhow::anyhow!("Operation cancelled by user"));
            }

            info!("Generating address (please confirm on Ledger device)");
            let a = t.address(account).await?;

            info!("Received address: {}", a);
        }
        Actions::SendPayment {
            account,
            sender,
            receiver,
            amount,
            tx,
            service,
        } => {
            let params = tx.params(TxKind::Payment, account, sender, receiver, amount);
            send(&mut t, &mut approver, params, &tx, &service).await?;
        }
        Actions::Delegate {
            account,
            delegator,
            delegate,
            tx,
            service,
        } => {
            let params = tx.params(TxKind::Delegation, account, delegator, delegate, 0);
            send(&mut t, &mut approver, params, &tx, &service).await?;
        }
        Actions::TestTransaction {
            account,
            address,
            network,
            interactive,
        } => {
            let network = network.as_deref();

            let s = match interactive {
                true => {
                    flow::test_transaction(&mut t, &mut approver, account, &address, network)
                        .await?
                }
                false => {
                    info!("Signing test transaction (please confirm on Ledger device)");
                    flow::test_transaction(&mut t, &mut AutoApprove, account, &address, network)
                        .await?
                }
            };

            println!("{}", serde_json::to_string_pretty(&s)?);
        }
        Actions::RawApdu { apdu } => {
            let r = t.send_hex(&apdu).await?;

            info!("Response: {}", hex::encode(r));
        }
        _ => return Err(anyhow::anyhow!("Unsupported command")),
    }

    Ok(())
}

impl TxOptions {
    fn params(
        &self,
        kind: TxKind,
        account_index: u32,
        sender: Address,
        receiver: Address,
        amount: u64,
    ) -> TxParams {
        TxParams {
            kind,
            account_index,
            sender,
            receiver,
            amount,
            fee: self.fee,
            nonce: self.nonce,
            valid_until: self.valid_until,
            memo: self.memo,
        }
    }
}

/// Sign a transaction, either online via the construction service or offline
async fn send<T: Exchange + Send>(
    t: &mut DeviceHandle<T>,
    approver: &mut StdinApprover,
    params: TxParams,
    tx: &TxOptions,
    service: &ServiceOptions,
) -> anyhow::Result<()> {
    if tx.offline {
        let s = flow::sign_offline(t, approver, &params, service.network.as_deref()).await?;

        println!("{}", serde_json::to_string_pretty(&s)?);
        return Ok(());
    }

    let c = service.client();
    let r = flow::send_transaction(t, &c, approver, &params, &service.flow_options()).await?;

    info!("Transaction id: {}", r.tx_hash);

    Ok(())
}
