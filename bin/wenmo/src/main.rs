mod cli;
mod commands;
mod config_loader;
mod keys;

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use wenmo_common::utils::logging::init_logging;
use wenmo_common::WalletAdapter;
use wenmo_faucet::{FaucetConfig, FaucetController};
use wenmo_rpc::{derive_address, LocalWallet, RestClient, RestClientConfig, TransactionOptions, WatchOnlyWallet};

const DEFAULT_KEY_FILE: &str = "wenmo.key";

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Parse CLI
    let args = cli::Cli::parse();

    // 2. Load Config
    let config = config_loader::load_faucet_config(&args)?;

    // 3. Setup Logging (guard keeps the file writer alive)
    let _log_guard = init_logging(&config.logging).context("Failed to initialize logging")?;

    if let cli::Commands::GenerateKey { out } = &args.command {
        let path = out
            .clone()
            .or_else(|| config.wallet.key_file.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_KEY_FILE));
        let key = keys::load_or_generate_key(&path)?;
        info!("Key stored at {:?}", path);
        println!("{}", derive_address(&key));
        return Ok(());
    }

    config.validate().context("Invalid configuration")?;
    info!(node = %config.network.node_url, network = %config.network.network_name, "Starting faucet client");

    // 4. Wire collaborators
    let controller = Arc::new(build_controller(config)?);
    commands::auto_connect(&controller).await;

    // 5. Run
    match args.command {
        cli::Commands::Status => commands::status(&controller).await,
        cli::Commands::Claim => commands::claim(&controller).await,
        cli::Commands::Watch => commands::watch(controller).await,
        cli::Commands::GenerateKey { .. } => Ok(()),
    }
}

fn build_controller(config: FaucetConfig) -> Result<FaucetController> {
    let client = Arc::new(
        RestClient::new(RestClientConfig {
            node_url: config.network.node_url.clone(),
            request_timeout: config.request_timeout(),
            wait_timeout: config.wait_timeout(),
            poll_interval: config.poll_interval(),
        })
        .context("Failed to create node client")?,
    );

    let wallet: Arc<dyn WalletAdapter> = match &config.wallet.key_file {
        Some(path) => {
            let key = keys::load_signing_key(path)?;
            let options = TransactionOptions {
                max_gas_amount: config.wallet.max_gas_amount,
                gas_unit_price: config.wallet.gas_unit_price,
                expiration_secs: config.wallet.expiration_secs,
            };
            Arc::new(LocalWallet::new(client.clone(), key, options))
        }
        None => {
            info!("No key file configured, running watch-only");
            Arc::new(WatchOnlyWallet::new())
        }
    };

    Ok(FaucetController::new(config, client, wallet))
}
