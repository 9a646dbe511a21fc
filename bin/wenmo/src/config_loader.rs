use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use wenmo_faucet::FaucetConfig;

use crate::cli::Cli;

const DEFAULT_CONFIG_FILE: &str = "wenmo.toml";

/// File (if any), then `WENMO__*` environment, then command-line overrides.
pub fn load_faucet_config(args: &Cli) -> Result<FaucetConfig> {
    let path = config_path(args.config.as_deref());
    let mut config = FaucetConfig::load(path.as_deref())
        .with_context(|| format!("Failed to load configuration from {:?}", path))?;

    apply_overrides(&mut config, args);
    Ok(config)
}

fn config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => {
            let default = PathBuf::from(DEFAULT_CONFIG_FILE);
            default.exists().then_some(default)
        }
    }
}

fn apply_overrides(config: &mut FaucetConfig, args: &Cli) {
    if let Some(url) = &args.node_url {
        config.network.node_url = url.clone();
    }
    if let Some(key_file) = &args.key_file {
        config.wallet.key_file = Some(key_file.clone());
    }
    if args.debug {
        config.logging.level = "debug".to_string();
    }
}
