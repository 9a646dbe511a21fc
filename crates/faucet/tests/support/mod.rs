//! Scriptable chain and wallet fakes shared by the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;

use wenmo_common::utils::logging::init_test_logging;
use wenmo_common::{
    AccountAddress, ChainClient, ClientError, ConnectionState, EntryFunctionPayload, PendingTransaction,
    RemoteError, ViewRequest, WalletAdapter,
};
use wenmo_faucet::FaucetConfig;

pub const CONTRACT: &str = "0xcafe";
pub const COIN_STORE: &str = "0x1::coin::CoinStore<0xcafe::wenmo_coin::WenmoToken>";
pub const DAY_SECS: u64 = 86_400;
/// 100 WENMO in smallest units
pub const CLAIM_UNITS: u64 = 10_000_000_000;

pub fn test_config() -> FaucetConfig {
    init_test_logging();
    let mut config = FaucetConfig::default();
    config.contract.address = CONTRACT.to_string();
    config
}

pub fn account(byte: u8) -> AccountAddress {
    AccountAddress([byte; 32])
}

pub fn remote_not_found(code: &str, message: &str) -> ClientError {
    ClientError::NotFound(RemoteError::from_response(
        404,
        json!({ "message": message, "error_code": code, "vm_error_code": null }),
    ))
}

/// What the fake node answers
pub struct ChainScript {
    pub faucet_balance: Result<u64, ClientError>,
    /// Overrides `faucet_balance` with a raw view result
    pub faucet_raw: Option<Vec<Value>>,
    /// Accounts without an entry have no coin store
    pub balances: HashMap<AccountAddress, u64>,
    pub balance_error: Option<ClientError>,
    /// `(can_claim, remaining_secs)`
    pub can_claim: Result<(bool, u64), ClientError>,
    pub wait_result: Result<(), ClientError>,
    pub wait_delay: Duration,
    /// Views answer with the state at call time, then stall this long
    pub view_delay: Duration,
}

impl Default for ChainScript {
    fn default() -> Self {
        Self {
            faucet_balance: Ok(15_000_000_000),
            faucet_raw: None,
            balances: HashMap::new(),
            balance_error: None,
            can_claim: Ok((true, 0)),
            wait_result: Ok(()),
            wait_delay: Duration::ZERO,
            view_delay: Duration::ZERO,
        }
    }
}

#[derive(Default)]
pub struct FakeChain {
    pub script: Mutex<ChainScript>,
    pub balance_views: AtomicUsize,
    pub resource_reads: AtomicUsize,
    pub can_claim_views: AtomicUsize,
    pub waits: AtomicUsize,
}

impl FakeChain {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn script(&self, edit: impl FnOnce(&mut ChainScript)) {
        edit(&mut self.script.lock().unwrap());
    }

    pub fn balance_views(&self) -> usize {
        self.balance_views.load(Ordering::SeqCst)
    }

    pub fn can_claim_views(&self) -> usize {
        self.can_claim_views.load(Ordering::SeqCst)
    }

    fn answer_view(&self, script: &ChainScript, request: &ViewRequest) -> Result<Vec<Value>, ClientError> {
        if request.function == format!("{}::wenmo_faucet::get_faucet_balance", CONTRACT) {
            self.balance_views.fetch_add(1, Ordering::SeqCst);
            if let Some(raw) = &script.faucet_raw {
                return Ok(raw.clone());
            }
            script
                .faucet_balance
                .clone()
                .map(|balance| vec![json!(balance.to_string())])
        } else if request.function == format!("{}::wenmo_faucet::can_claim", CONTRACT) {
            self.can_claim_views.fetch_add(1, Ordering::SeqCst);
            script
                .can_claim
                .clone()
                .map(|(allowed, remaining)| vec![json!(allowed), json!(remaining.to_string())])
        } else {
            Err(ClientError::Remote(RemoteError::new(format!("unknown function {}", request.function))))
        }
    }
}

#[async_trait]
impl ChainClient for FakeChain {
    async fn view(&self, request: &ViewRequest) -> Result<Vec<Value>, ClientError> {
        let (answer, delay) = {
            let script = self.script.lock().unwrap();
            (self.answer_view(&script, request), script.view_delay)
        };
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        answer
    }

    async fn account_resource(&self, address: &AccountAddress, resource_type: &str) -> Result<Value, ClientError> {
        self.resource_reads.fetch_add(1, Ordering::SeqCst);
        assert_eq!(resource_type, COIN_STORE);

        let script = self.script.lock().unwrap();
        if let Some(err) = &script.balance_error {
            return Err(err.clone());
        }
        match script.balances.get(address) {
            Some(balance) => Ok(json!({ "coin": { "value": balance.to_string() } })),
            None => Err(remote_not_found("resource_not_found", "Resource not found")),
        }
    }

    async fn wait_for_transaction(&self, hash: &str) -> Result<(), ClientError> {
        self.waits.fetch_add(1, Ordering::SeqCst);
        let delay = self.script.lock().unwrap().wait_delay;
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let mut script = self.script.lock().unwrap();
        script.wait_result.clone()?;

        // A committed claim moves tokens and starts the cooldown
        let claimer = hash
            .strip_prefix("0xclaim-")
            .and_then(|address| address.parse::<AccountAddress>().ok());
        if let Some(claimer) = claimer {
            *script.balances.entry(claimer).or_insert(0) += CLAIM_UNITS;
            if let Ok(balance) = script.faucet_balance.as_mut() {
                *balance = balance.saturating_sub(CLAIM_UNITS);
            }
            script.can_claim = Ok((false, DAY_SECS));
        }
        Ok(())
    }
}

pub struct FakeWallet {
    account: AccountAddress,
    state: watch::Sender<ConnectionState>,
    pub submit_error: Mutex<Option<ClientError>>,
    pub submissions: Mutex<Vec<EntryFunctionPayload>>,
}

impl FakeWallet {
    pub fn new(account: AccountAddress) -> Arc<Self> {
        let (state, _) = watch::channel(ConnectionState::Disconnected);
        Arc::new(Self {
            account,
            state,
            submit_error: Mutex::new(None),
            submissions: Mutex::new(Vec::new()),
        })
    }

    /// Simulate the user switching accounts inside the wallet
    pub fn switch_account(&self, account: AccountAddress) {
        self.state.send_replace(ConnectionState::Connected(account));
    }

    pub fn fail_submissions_with(&self, err: ClientError) {
        *self.submit_error.lock().unwrap() = Some(err);
    }

    pub fn submissions(&self) -> usize {
        self.submissions.lock().unwrap().len()
    }
}

#[async_trait]
impl WalletAdapter for FakeWallet {
    fn name(&self) -> &str {
        "Fake Wallet"
    }

    fn subscribe(&self) -> watch::Receiver<ConnectionState> {
        self.state.subscribe()
    }

    fn connection(&self) -> ConnectionState {
        *self.state.borrow()
    }

    async fn connect(&self) -> Result<AccountAddress, ClientError> {
        self.state.send_replace(ConnectionState::Connected(self.account));
        Ok(self.account)
    }

    async fn disconnect(&self) -> Result<(), ClientError> {
        self.state.send_replace(ConnectionState::Disconnected);
        Ok(())
    }

    async fn sign_and_submit(&self, payload: &EntryFunctionPayload) -> Result<PendingTransaction, ClientError> {
        let account = self.connection().account().ok_or(ClientError::NotConnected)?;
        self.submissions.lock().unwrap().push(payload.clone());

        if let Some(err) = self.submit_error.lock().unwrap().clone() {
            return Err(err);
        }
        Ok(PendingTransaction {
            hash: format!("0xclaim-{}", account.to_hex_literal()),
        })
    }
}
