// Copyright (c) 2022-2023 The MobileCoin Foundation

use std::net::{Ipv4Addr, SocketAddr};

use clap::Parser;
use log::{debug, info, LevelFilter};
use strum::{Display, EnumString, EnumVariantNames};

use ledger_lib::{
    transport::{GenericDevice, TcpInfo, TcpTransport},
    Filters, LedgerProvider, Transport,
};

use ledger_mina::{DeviceHandle, Exchange};

/// Test CLI arguments
#[derive(Clone, Debug, Parser)]
pub struct Opts {
    #[clap(subcommand)]
    pub test: Tests,

    /// Target for test execution
    #[clap(long, value_enum, default_value = "tcp", env)]
    pub target: Target,

    /// Log level
    #[clap(long, default_value = "debug", env)]
    pub log_level: LevelFilter,

    /// Simulator APDU port
    #[clap(long, default_value = "1237", env)]
    pub apdu_port: u16,

    /// Enable logging for transports
    #[clap(long)]
    pub log_transports: bool,
}

/// Test modes
#[derive(Clone, PartialEq, Debug, Parser, Display, EnumString, EnumVariantNames)]
pub enum Tests {
    /// Test address derivation
    Address,
    /// Test transaction signing
    Sign,
    /// Run all tests
    All,
}

/// Test target connection
#[derive(Clone, PartialEq, Debug, clap::ValueEnum, Display, EnumString, EnumVariantNames)]
#[strum(serialize_all = "snake_case")]
#[non_exhaustive]
pub enum Target {
    /// USB-HID connection for physical ledger devices
    Hid,
    /// TCP connection for speculos simulator
    Tcp,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load command line options
    let opts = Opts::parse();

    // Setup logging
    let mut c = simplelog::ConfigBuilder::new();
    if !opts.log_transports {
        c.add_filter_ignore_str("ledger_lib");
    }

    let _ = simplelog::SimpleLogger::init(opts.log_level, c.build());

    debug!("options: {:?}", opts);

    info!("Running test '{}' via {}", opts.test, opts.target);

    // Connect to target and execute test
    match opts.target {
        Target::Tcp => {
            let info = TcpInfo {
                addr: SocketAddr::new(Ipv4Addr::LOCALHOST.into(), opts.apdu_port),
            };

            let mut t = TcpTransport::new()?;
            let d: GenericDevice = t.connect(info).await?.into();

            execute(d, opts).await?;
        }
        Target::Hid => {
            let mut p = LedgerProvider::init().await;

            let devices = p.list(Filters::Hid).await?;
            debug!("Found devices: {:?}", devices);

            let info = devices
                .into_iter()
                .next()
                .ok_or_else(|| anyhow::anyhow!("No HID devices found"))?;
            let d = p.connect(info).await?;

            execute(d, opts).await?;
        }
    };

    log::info!("Test OK!");

    Ok(())
}

/// Execute a test with the provided transport
async fn execute<T>(target: T, opts: Opts) -> anyhow::Result<()>
where
    T: Exchange + Send,
{
    use ledger_mina_tests::*;

    let mut d = DeviceHandle::from(target);

    match opts.test {
        Tests::Address => address::test(&mut d).await?,
        Tests::Sign => sign::test(&mut d).await?,
        Tests::All => {
            address::test(&mut d).await?;
            sign::test(&mut d).await?;
        }
    }

    Ok(())
}
