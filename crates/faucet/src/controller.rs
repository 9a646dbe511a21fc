//! The faucet controller and its mounted timers.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info};
use wenmo_common::{AccountAddress, ChainClient, ConnectionState, WalletAdapter};

use crate::claim::ClaimOrchestrator;
use crate::config::FaucetConfig;
use crate::error::{FaucetError, FaucetResult};
use crate::refresher::{RefreshReport, SnapshotRefresher};
use crate::state::{ClaimAttempt, SharedState, ViewState};
use crate::view::{FaucetView, ViewInput};

/// Owns the view state and wires the collaborators to it.
///
/// Nothing runs in the background until [`FaucetController::mount`] is called;
/// the returned guard owns the refresh and countdown tasks.
pub struct FaucetController {
    config: Arc<FaucetConfig>,
    wallet: Arc<dyn WalletAdapter>,
    state: SharedState,
    refresher: Arc<SnapshotRefresher>,
    orchestrator: ClaimOrchestrator,
}

impl FaucetController {
    pub fn new(config: FaucetConfig, chain: Arc<dyn ChainClient>, wallet: Arc<dyn WalletAdapter>) -> Self {
        let config = Arc::new(config);
        let state = SharedState::default();
        let refresher = Arc::new(SnapshotRefresher::new(
            config.clone(),
            chain.clone(),
            wallet.clone(),
            state.clone(),
        ));
        let orchestrator = ClaimOrchestrator::new(
            config.clone(),
            chain,
            wallet.clone(),
            state.clone(),
            refresher.clone(),
        );

        Self {
            config,
            wallet,
            state,
            refresher,
            orchestrator,
        }
    }

    pub fn config(&self) -> &FaucetConfig {
        &self.config
    }

    pub fn wallet_name(&self) -> &str {
        self.wallet.name()
    }

    pub fn connection(&self) -> ConnectionState {
        self.wallet.connection()
    }

    pub async fn connect(&self) -> FaucetResult<AccountAddress> {
        let account = self.wallet.connect().await?;
        info!(wallet = self.wallet.name(), account = %account, "Wallet connected");
        Ok(account)
    }

    pub async fn disconnect(&self) -> FaucetResult<()> {
        self.wallet.disconnect().await?;
        info!(wallet = self.wallet.name(), "Wallet disconnected");
        Ok(())
    }

    /// Out-of-cycle refresh
    pub async fn refresh(&self) -> RefreshReport {
        self.refresher.refresh().await
    }

    /// Claim if the claim control is enabled.
    pub async fn claim(&self) -> FaucetResult<ClaimAttempt> {
        let connection = self.wallet.connection();
        let blocker = self
            .state
            .read()
            .await
            .claim_blocker(&connection, self.config.limits.min_claim_balance);
        if let Some(blocker) = blocker {
            debug!(reason = %blocker, "Claim refused");
            return Err(FaucetError::ClaimUnavailable(blocker));
        }
        self.orchestrator.claim().await
    }

    pub async fn state(&self) -> ViewState {
        self.state.read().await.clone()
    }

    pub async fn view(&self) -> FaucetView {
        let connection = self.wallet.connection();
        let state = self.state.read().await;
        FaucetView::render(&ViewInput {
            state: &state,
            connection: &connection,
            config: &self.config,
        })
    }

    /// Start polling: refresh now, on every connection change and on the
    /// refresh interval; tick the cooldown down on the countdown interval.
    pub fn mount(&self) -> MountedController {
        let (shutdown, shutdown_rx) = watch::channel(false);

        let refresh_task = tokio::spawn(refresh_loop(
            self.refresher.clone(),
            self.wallet.subscribe(),
            self.config.refresh_interval(),
            shutdown_rx.clone(),
        ));
        let countdown_task = tokio::spawn(countdown_loop(
            self.state.clone(),
            self.config.countdown_interval(),
            shutdown_rx,
        ));

        info!(
            refresh_secs = self.config.schedule.refresh_interval_secs,
            countdown_ms = self.config.schedule.countdown_interval_ms,
            "Faucet controller mounted"
        );

        MountedController {
            shutdown,
            tasks: vec![refresh_task, countdown_task],
        }
    }
}

/// Guard over the mounted timers. Dropping it cancels them.
pub struct MountedController {
    shutdown: watch::Sender<bool>,
    tasks: Vec<JoinHandle<()>>,
}

impl MountedController {
    /// Cancel both timers and wait for them to finish.
    pub async fn unmount(mut self) {
        let _ = self.shutdown.send(true);
        for task in self.tasks.drain(..) {
            task.abort();
            let _ = task.await;
        }
        info!("Faucet controller unmounted");
    }

    pub fn is_running(&self) -> bool {
        self.tasks.iter().any(|task| !task.is_finished())
    }
}

impl Drop for MountedController {
    fn drop(&mut self) {
        let _ = self.shutdown.send(true);
        for task in &self.tasks {
            task.abort();
        }
    }
}

async fn refresh_loop(
    refresher: Arc<SnapshotRefresher>,
    mut connection: watch::Receiver<ConnectionState>,
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    // First tick completes immediately
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut wallet_open = true;

    loop {
        tokio::select! {
            _ = shutdown.changed() => {
                debug!("Refresh loop shutdown");
                break;
            }
            changed = connection.changed(), if wallet_open => {
                if changed.is_err() {
                    // Wallet dropped its sender; keep polling on the interval
                    wallet_open = false;
                    continue;
                }
                let current = *connection.borrow_and_update();
                debug!(connection = ?current, "Connection changed, refreshing");
                ticker.reset();
                refresher.refresh().await;
            }
            _ = ticker.tick() => {
                refresher.refresh().await;
            }
        }
    }
}

async fn countdown_loop(state: SharedState, period: Duration, mut shutdown: watch::Receiver<bool>) {
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = shutdown.changed() => {
                debug!("Countdown loop shutdown");
                break;
            }
            _ = ticker.tick() => {
                state.write().await.snapshot.tick_cooldown();
            }
        }
    }
}
