//! Faucet client configuration

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use wenmo_common::utils::config::load_layered;
use wenmo_common::utils::logging::LoggingConfig;
use wenmo_common::{AccountAddress, EntryFunctionPayload, ViewRequest};

use crate::error::{FaucetError, FaucetResult};

/// Prefix for environment overrides, e.g. `WENMO__NETWORK__NODE_URL`
pub const ENV_PREFIX: &str = "WENMO";

/// Faucet client configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FaucetConfig {
    #[serde(default)]
    pub network: NetworkConfig,

    #[serde(default)]
    pub contract: ContractConfig,

    #[serde(default)]
    pub limits: LimitsConfig,

    #[serde(default)]
    pub schedule: ScheduleConfig,

    #[serde(default)]
    pub wallet: WalletConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Node REST endpoint, including the `/v1` suffix
    pub node_url: String,

    /// Shown in the header
    pub network_name: String,

    pub request_timeout_secs: u64,

    /// How long a claim waits for its transaction to commit
    pub wait_timeout_secs: u64,

    pub poll_interval_ms: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            node_url: "https://mainnet.movementnetwork.xyz/v1".to_string(),
            network_name: "Movement Mainnet".to_string(),
            request_timeout_secs: 30,
            wait_timeout_secs: 60,
            poll_interval_ms: 500,
        }
    }
}

/// Where the faucet and token live on chain
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContractConfig {
    /// Publisher of both modules; no default, must be configured
    pub address: String,
    pub faucet_module: String,
    pub token_module: String,
    pub token_struct: String,
    pub balance_function: String,
    pub can_claim_function: String,
    pub claim_function: String,
}

impl Default for ContractConfig {
    fn default() -> Self {
        Self {
            address: String::new(),
            faucet_module: "wenmo_faucet".to_string(),
            token_module: "wenmo_coin".to_string(),
            token_struct: "WenmoToken".to_string(),
            balance_function: "get_faucet_balance".to_string(),
            can_claim_function: "can_claim".to_string(),
            claim_function: "claim_wenmo".to_string(),
        }
    }
}

/// Amounts are in the token's smallest unit unless noted
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Claiming is disabled below this faucet balance
    pub min_claim_balance: u64,

    /// Smallest units per displayed token
    pub display_divisor: u64,

    /// Whole tokens dispensed per claim (display only)
    pub claim_amount: u64,

    pub token_symbol: String,

    /// Contract cooldown in hours (display only)
    pub cooldown_hours: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            min_claim_balance: 10_000_000_000, // 100 WENMO
            display_divisor: 100_000_000,
            claim_amount: 100,
            token_symbol: "WENMO".to_string(),
            cooldown_hours: 24,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    pub refresh_interval_secs: u64,
    pub countdown_interval_ms: u64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            refresh_interval_secs: 10,
            countdown_interval_ms: 1000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WalletConfig {
    /// File holding the hex-encoded Ed25519 private key
    pub key_file: Option<PathBuf>,

    /// Connect on startup when a key is available
    pub auto_connect: bool,

    pub max_gas_amount: u64,
    pub gas_unit_price: u64,
    pub expiration_secs: u64,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            key_file: None,
            auto_connect: true,
            max_gas_amount: 200_000,
            gas_unit_price: 100,
            expiration_secs: 60,
        }
    }
}

impl FaucetConfig {
    /// Optional file, then `WENMO__*` environment variables on top
    pub fn load(path: Option<&Path>) -> FaucetResult<Self> {
        let config: FaucetConfig = load_layered(path, Some(ENV_PREFIX))?;
        Ok(config)
    }

    pub fn validate(&self) -> FaucetResult<()> {
        self.contract_address()?;

        if self.limits.display_divisor == 0 {
            return Err(FaucetError::Config("limits.display_divisor must be greater than zero".to_string()));
        }
        if self.schedule.refresh_interval_secs == 0 || self.schedule.countdown_interval_ms == 0 {
            return Err(FaucetError::Config("schedule intervals must be greater than zero".to_string()));
        }
        if self.network.node_url.trim().is_empty() {
            return Err(FaucetError::Config("network.node_url must be set".to_string()));
        }
        Ok(())
    }

    pub fn contract_address(&self) -> FaucetResult<AccountAddress> {
        if self.contract.address.trim().is_empty() {
            return Err(FaucetError::Config("contract.address must be set".to_string()));
        }
        self.contract
            .address
            .parse()
            .map_err(|_| FaucetError::InvalidAddress(self.contract.address.clone()))
    }

    fn faucet_function(&self, name: &str) -> String {
        format!("{}::{}::{}", self.contract.address, self.contract.faucet_module, name)
    }

    pub fn balance_view(&self) -> ViewRequest {
        ViewRequest::new(self.faucet_function(&self.contract.balance_function))
    }

    pub fn can_claim_view(&self, account: &AccountAddress) -> ViewRequest {
        ViewRequest::new(self.faucet_function(&self.contract.can_claim_function))
            .with_argument(account.to_hex_literal())
    }

    pub fn claim_payload(&self) -> EntryFunctionPayload {
        EntryFunctionPayload::new(self.faucet_function(&self.contract.claim_function))
    }

    /// `0x1::coin::CoinStore<{address}::{token_module}::{token_struct}>`
    pub fn coin_store_type(&self) -> String {
        format!(
            "0x1::coin::CoinStore<{}::{}::{}>",
            self.contract.address, self.contract.token_module, self.contract.token_struct
        )
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.schedule.refresh_interval_secs)
    }

    pub fn countdown_interval(&self) -> Duration {
        Duration::from_millis(self.schedule.countdown_interval_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.network.request_timeout_secs)
    }

    pub fn wait_timeout(&self) -> Duration {
        Duration::from_secs(self.network.wait_timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.network.poll_interval_ms)
    }
}
