//! Snapshot refresh: faucet balance, user balance and cooldown, queried together.

use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};
use wenmo_common::types::parse_u64;
use wenmo_common::{AccountAddress, ChainClient, ClientError, WalletAdapter};

use crate::config::FaucetConfig;
use crate::state::SharedState;

/// Result of one query within a refresh
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutcome {
    Updated,
    /// Not queried or discarded: no account connected, the account changed
    /// while in flight, or a newer refresh already landed
    Skipped,
    Failed(ClientError),
}

impl QueryOutcome {
    pub fn is_updated(&self) -> bool {
        matches!(self, QueryOutcome::Updated)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, QueryOutcome::Failed(_))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RefreshReport {
    /// Account the refresh was issued for
    pub account: Option<AccountAddress>,
    pub faucet_balance: QueryOutcome,
    pub user_balance: QueryOutcome,
    pub cooldown: QueryOutcome,
}

impl RefreshReport {
    pub fn failures(&self) -> usize {
        [&self.faucet_balance, &self.user_balance, &self.cooldown]
            .iter()
            .filter(|outcome| outcome.is_failed())
            .count()
    }
}

/// Queries the chain and folds the answers into the shared view state.
pub struct SnapshotRefresher {
    config: Arc<FaucetConfig>,
    chain: Arc<dyn ChainClient>,
    wallet: Arc<dyn WalletAdapter>,
    state: SharedState,
}

impl SnapshotRefresher {
    pub fn new(
        config: Arc<FaucetConfig>,
        chain: Arc<dyn ChainClient>,
        wallet: Arc<dyn WalletAdapter>,
        state: SharedState,
    ) -> Self {
        Self {
            config,
            chain,
            wallet,
            state,
        }
    }

    /// Run the three queries concurrently. Each failure is logged and leaves its
    /// field at the previous value; it never affects the other two.
    ///
    /// Overlapping refreshes are ordered by the ticket taken here: answers from
    /// a refresh overtaken by a newer one are dropped whole.
    pub async fn refresh(&self) -> RefreshReport {
        let account = self.wallet.connection().account();
        let ticket = {
            let mut state = self.state.write().await;
            if state.snapshot.retarget(account) {
                debug!(account = ?account, "Account changed, user fields reset");
            }
            state.refresh.issue()
        };

        let (faucet, user, cooldown) = tokio::join!(
            self.fetch_faucet_balance(),
            self.fetch_user_balance(account),
            self.fetch_cooldown(account),
        );

        let mut guard = self.state.write().await;
        let state = &mut *guard;
        if !state.refresh.commit(ticket) {
            debug!(ticket, "Newer refresh already landed, discarding answers");
            return RefreshReport {
                account,
                faucet_balance: QueryOutcome::Skipped,
                user_balance: QueryOutcome::Skipped,
                cooldown: QueryOutcome::Skipped,
            };
        }
        let snapshot = &mut state.snapshot;

        let faucet_balance = settle(Some(faucet), &mut snapshot.faucet_balance, "faucet balance");

        // Answers for an account that is no longer current are dropped
        let (user_balance, cooldown) = if snapshot.account == account {
            (
                settle(user, &mut snapshot.user_balance, "user balance"),
                settle(cooldown, &mut snapshot.cooldown_remaining_secs, "cooldown"),
            )
        } else {
            debug!(account = ?account, "Account changed during refresh, discarding user fields");
            (QueryOutcome::Skipped, QueryOutcome::Skipped)
        };

        let report = RefreshReport {
            account,
            faucet_balance,
            user_balance,
            cooldown,
        };
        debug!(
            faucet_balance = snapshot.faucet_balance,
            user_balance = snapshot.user_balance,
            cooldown = snapshot.cooldown_remaining_secs,
            failures = report.failures(),
            "Snapshot refreshed"
        );
        report
    }

    async fn fetch_faucet_balance(&self) -> Result<u64, ClientError> {
        let result = self.chain.view(&self.config.balance_view()).await?;
        result
            .first()
            .and_then(parse_u64)
            .ok_or_else(|| ClientError::InvalidResponse(format!("unexpected faucet balance result: {:?}", result)))
    }

    async fn fetch_user_balance(&self, account: Option<AccountAddress>) -> Option<Result<u64, ClientError>> {
        let account = account?;
        let result = match self.chain.account_resource(&account, &self.config.coin_store_type()).await {
            Ok(data) => data
                .pointer("/coin/value")
                .and_then(parse_u64)
                .ok_or_else(|| ClientError::InvalidResponse(format!("coin store without a numeric coin.value: {}", data))),
            // No coin store (or no account) yet means nothing was ever received
            Err(err) if err.is_not_found() => Ok(0),
            Err(err) => Err(err),
        };
        Some(result)
    }

    async fn fetch_cooldown(&self, account: Option<AccountAddress>) -> Option<Result<u64, ClientError>> {
        let account = account?;
        let result = match self.chain.view(&self.config.can_claim_view(&account)).await {
            Ok(result) => match (result.first().and_then(Value::as_bool), result.get(1).and_then(parse_u64)) {
                (Some(true), _) => Ok(0),
                (Some(false), Some(remaining)) => Ok(remaining),
                _ => Err(ClientError::InvalidResponse(format!("unexpected can_claim result: {:?}", result))),
            },
            Err(err) => Err(err),
        };
        Some(result)
    }
}

fn settle(result: Option<Result<u64, ClientError>>, slot: &mut u64, what: &str) -> QueryOutcome {
    match result {
        Some(Ok(value)) => {
            *slot = value;
            QueryOutcome::Updated
        }
        Some(Err(err)) => {
            warn!(error = %err, "Failed to fetch {}, keeping previous value", what);
            QueryOutcome::Failed(err)
        }
        None => QueryOutcome::Skipped,
    }
}
