//! Claim orchestration: submit, wait for commit, reconcile.

use std::sync::Arc;
use tracing::{debug, error, info, warn};
use wenmo_common::{ChainClient, ClientError, WalletAdapter};

use crate::classify::classify;
use crate::config::FaucetConfig;
use crate::error::{FaucetError, FaucetResult};
use crate::refresher::SnapshotRefresher;
use crate::state::{ClaimAttempt, SharedState};

pub struct ClaimOrchestrator {
    config: Arc<FaucetConfig>,
    chain: Arc<dyn ChainClient>,
    wallet: Arc<dyn WalletAdapter>,
    state: SharedState,
    refresher: Arc<SnapshotRefresher>,
}

impl ClaimOrchestrator {
    pub fn new(
        config: Arc<FaucetConfig>,
        chain: Arc<dyn ChainClient>,
        wallet: Arc<dyn WalletAdapter>,
        state: SharedState,
        refresher: Arc<SnapshotRefresher>,
    ) -> Self {
        Self {
            config,
            chain,
            wallet,
            state,
            refresher,
        }
    }

    /// Claim once and return the settled attempt.
    ///
    /// Only a second concurrent claim is refused here; the remaining
    /// preconditions belong to the caller. A failed claim is not an `Err`:
    /// it settles as [`ClaimAttempt::Failed`] with a user-facing message.
    pub async fn claim(&self) -> FaucetResult<ClaimAttempt> {
        {
            let mut state = self.state.write().await;
            if state.claim.is_pending() {
                return Err(FaucetError::ClaimInFlight);
            }
            state.claim = ClaimAttempt::Pending;
        }
        let pending = PendingClaim::new(self.state.clone());

        info!("Submitting claim");
        let attempt = match self.submit_and_wait().await {
            Ok(hash) => {
                info!(hash = %hash, "Claim committed");
                ClaimAttempt::Succeeded(hash)
            }
            Err(err) => {
                let message = classify(&err).message();
                error!(error = %err, "Claim failed: {}", message);
                ClaimAttempt::Failed(message)
            }
        };

        self.state.write().await.claim = attempt.clone();
        pending.settled();

        if matches!(attempt, ClaimAttempt::Succeeded(_)) {
            self.refresher.refresh().await;
        }
        Ok(attempt)
    }

    async fn submit_and_wait(&self) -> Result<String, ClientError> {
        let pending = self.wallet.sign_and_submit(&self.config.claim_payload()).await?;
        debug!(hash = %pending.hash, "Claim submitted, waiting for commit");
        self.chain.wait_for_transaction(&pending.hash).await?;
        Ok(pending.hash)
    }
}

/// Puts a `Pending` claim back to `Idle` if the claim future is dropped
/// before it settles.
struct PendingClaim {
    state: Option<SharedState>,
}

impl PendingClaim {
    fn new(state: SharedState) -> Self {
        Self { state: Some(state) }
    }

    fn settled(mut self) {
        self.state = None;
    }
}

impl Drop for PendingClaim {
    fn drop(&mut self) {
        let Some(state) = self.state.take() else {
            return;
        };
        warn!("Claim cancelled before it settled");

        let reset_now = match state.try_write() {
            Ok(mut guard) => {
                reset_pending(&mut guard.claim);
                true
            }
            Err(_) => false,
        };
        if !reset_now {
            if let Ok(handle) = tokio::runtime::Handle::try_current() {
                handle.spawn(async move {
                    reset_pending(&mut state.write().await.claim);
                });
            }
        }
    }
}

fn reset_pending(claim: &mut ClaimAttempt) {
    if claim.is_pending() {
        *claim = ClaimAttempt::Idle;
    }
}
