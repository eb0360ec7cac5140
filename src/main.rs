use clap::Parser;
use miette::{IntoDiagnostic, Result};
use payout_dispatcher::application::dispatcher::PayoutDispatcher;
use payout_dispatcher::application::gateway::WalletProviderGateway;
use payout_dispatcher::config::DispatcherConfig;
use payout_dispatcher::domain::payout::{PayoutRecord, TransactionResult, TxStatus};
use payout_dispatcher::domain::ports::PayoutLedger;
use payout_dispatcher::infrastructure::in_memory::InMemoryPayoutLedger;
use payout_dispatcher::infrastructure::simulated::{SimulatedEvmWallet, SimulatedTronWallet};
use payout_dispatcher::interfaces::csv::payout_reader::PayoutReader;
use payout_dispatcher::interfaces::csv::record_writer::RecordWriter;
use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Dry-runs a payout batch against simulated wallets.
///
/// Every row goes through the real validation, network enforcement, unit
/// conversion and call-data construction; only the wallet is simulated.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input payouts CSV file
    input: PathBuf,

    /// JSON dispatcher config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Account the simulated EVM wallet authorizes
    #[arg(long, default_value = "0x52908400098527886E0F7030069857D2E4169EE7")]
    evm_account: String,

    /// Network the simulated EVM wallet starts on
    #[arg(long, default_value = "0x1")]
    evm_network: String,

    /// Extra network the simulated EVM wallet can switch to (repeatable)
    #[arg(long = "evm-known-network")]
    evm_known_networks: Vec<String>,

    /// Account the simulated TRON wallet exposes
    #[arg(long, default_value = "TEkxiTehnzSmSe2XqrBj4w32RUN966rdz8")]
    tron_account: String,

    /// Network every EVM payout must run on when its row names none
    #[arg(long)]
    require_evm_network: Option<String>,

    /// Fee ceiling for TRC-20 transfers, in sun
    #[arg(long)]
    tron_fee_limit: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => DispatcherConfig::from_file(path).into_diagnostic()?,
        None => DispatcherConfig::default(),
    };
    if let Some(network) = cli.require_evm_network {
        config.default_evm_network = Some(network);
    }
    if let Some(fee_limit) = cli.tron_fee_limit {
        config.tron_fee_limit_sun = fee_limit;
    }

    let known_networks = std::iter::once(cli.evm_network.clone()).chain(cli.evm_known_networks);
    let evm = SimulatedEvmWallet::new(cli.evm_account, cli.evm_network)
        .with_known_chains(known_networks);
    let tron = SimulatedTronWallet::new(cli.tron_account);
    let gateway = WalletProviderGateway::new(config)
        .with_evm_provider(Arc::new(evm))
        .with_tron_provider(Arc::new(tron));
    let dispatcher = PayoutDispatcher::new(Arc::new(gateway));
    let ledger = InMemoryPayoutLedger::new();

    // Dispatch payouts one by one; a failed payout is recorded, never retried
    let file = File::open(cli.input).into_diagnostic()?;
    let reader = PayoutReader::new(file);
    for request_result in reader.payouts() {
        match request_result {
            Ok(request) => {
                let result = match dispatcher.dispatch(request.clone()).await {
                    Ok(result) => result,
                    Err(e) => {
                        error!(recipient = %request.recipient, "Error dispatching payout: {}", e);
                        TransactionResult::from_error(&e)
                    }
                };
                ledger
                    .record(PayoutRecord::new(&request, &result))
                    .await
                    .into_diagnostic()?;
            }
            Err(e) => {
                error!("Error reading payout: {}", e);
            }
        }
    }

    let records = ledger.records().await.into_diagnostic()?;
    let submitted = records
        .iter()
        .filter(|r| r.status == TxStatus::Submitted)
        .count();
    info!(submitted, total = records.len(), "batch finished");

    let stdout = io::stdout();
    let mut writer = RecordWriter::new(stdout.lock());
    writer.write_records(records).into_diagnostic()?;

    Ok(())
}
