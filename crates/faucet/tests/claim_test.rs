//! Claim flow through the controller with a fake wallet and chain.

mod support;

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use support::{account, remote_not_found, test_config, FakeChain, FakeWallet, CLAIM_UNITS, DAY_SECS};
use wenmo_common::{ClientError, RemoteError, WalletAdapter};
use wenmo_faucet::classify::ACCOUNT_NOT_INITIALIZED_MESSAGE;
use wenmo_faucet::{
    ClaimAttempt, ClaimBlocker, ClaimOrchestrator, FaucetController, FaucetError, QueryOutcome, SharedState,
    SnapshotRefresher,
};

async fn connected_controller(chain: &Arc<FakeChain>, wallet: &Arc<FakeWallet>) -> FaucetController {
    let controller = FaucetController::new(test_config(), chain.clone(), wallet.clone());
    controller.connect().await.unwrap();
    controller.refresh().await;
    controller
}

#[tokio::test]
async fn test_successful_claim_refreshes_snapshot() {
    let chain = FakeChain::new();
    let wallet = FakeWallet::new(account(1));
    let controller = connected_controller(&chain, &wallet).await;
    let views_before = chain.balance_views();

    let attempt = controller.claim().await.unwrap();

    let hash = format!("0xclaim-{}", account(1).to_hex_literal());
    assert_eq!(attempt, ClaimAttempt::Succeeded(hash.clone()));
    assert_eq!(wallet.submissions(), 1);
    assert_eq!(
        wallet.submissions.lock().unwrap()[0].function,
        "0xcafe::wenmo_faucet::claim_wenmo"
    );
    assert!(wallet.submissions.lock().unwrap()[0].arguments.is_empty());
    assert_eq!(chain.waits.load(Ordering::SeqCst), 1);

    // Out-of-cycle refresh picked up the committed claim
    assert_eq!(chain.balance_views(), views_before + 1);
    let state = controller.state().await;
    assert_eq!(state.claim, ClaimAttempt::Succeeded(hash));
    assert_eq!(state.snapshot.user_balance, CLAIM_UNITS);
    assert_eq!(state.snapshot.faucet_balance, 15_000_000_000 - CLAIM_UNITS);
    assert_eq!(state.snapshot.cooldown_remaining_secs, DAY_SECS);

    let view = controller.view().await;
    assert_eq!(view.success_tx.as_deref(), Some(format!("0xclaim-{}", account(1).to_hex_literal()).as_str()));
    assert_eq!(view.claim_button.unwrap().label, "Wait 24h 0m 0s");
}

#[tokio::test]
async fn test_second_claim_is_refused_by_cooldown() {
    let chain = FakeChain::new();
    let wallet = FakeWallet::new(account(1));
    let controller = connected_controller(&chain, &wallet).await;
    controller.claim().await.unwrap();

    let err = controller.claim().await.unwrap_err();
    assert!(matches!(err, FaucetError::ClaimUnavailable(ClaimBlocker::CoolingDown(DAY_SECS))));
    assert_eq!(wallet.submissions(), 1);
}

#[tokio::test]
async fn test_claim_gate() {
    let chain = FakeChain::new();
    let wallet = FakeWallet::new(account(1));
    let controller = FaucetController::new(test_config(), chain.clone(), wallet.clone());
    controller.refresh().await;

    let err = controller.claim().await.unwrap_err();
    assert!(matches!(err, FaucetError::ClaimUnavailable(ClaimBlocker::NotConnected)));

    chain.script(|s| s.faucet_balance = Ok(CLAIM_UNITS - 1));
    controller.connect().await.unwrap();
    controller.refresh().await;
    let err = controller.claim().await.unwrap_err();
    assert!(matches!(err, FaucetError::ClaimUnavailable(ClaimBlocker::FaucetEmpty)));

    assert_eq!(wallet.submissions(), 0);
    assert_eq!(controller.state().await.claim, ClaimAttempt::Idle);
}

#[tokio::test]
async fn test_unfunded_account_gets_initialization_hint() {
    let chain = FakeChain::new();
    let wallet = FakeWallet::new(account(1));
    let controller = connected_controller(&chain, &wallet).await;

    // Shape produced by the local wallet when the sender account does not exist
    let node = match remote_not_found("account_not_found", "Account not found by Address(0x1)") {
        ClientError::NotFound(remote) => remote,
        other => panic!("unexpected error: {:?}", other),
    };
    wallet.fail_submissions_with(ClientError::Remote(
        RemoteError::new("Failed to fetch sender account").with_cause(node),
    ));

    let attempt = controller.claim().await.unwrap();
    assert_eq!(attempt, ClaimAttempt::Failed(ACCOUNT_NOT_INITIALIZED_MESSAGE.to_string()));
    assert_eq!(chain.waits.load(Ordering::SeqCst), 0);

    let view = controller.view().await;
    assert_eq!(view.error.as_deref(), Some(ACCOUNT_NOT_INITIALIZED_MESSAGE));
    assert!(view.claim_button.unwrap().enabled);
}

#[tokio::test]
async fn test_failed_transaction_surfaces_message_and_allows_retry() {
    let chain = FakeChain::new();
    let wallet = FakeWallet::new(account(1));
    let controller = connected_controller(&chain, &wallet).await;
    chain.script(|s| s.wait_result = Err(ClientError::Transport("network timeout".to_string())));

    let attempt = controller.claim().await.unwrap();
    assert_eq!(attempt, ClaimAttempt::Failed("network timeout".to_string()));
    assert_eq!(wallet.submissions(), 1);

    // No automatic retry, but the user may try again
    chain.script(|s| s.wait_result = Ok(()));
    let attempt = controller.claim().await.unwrap();
    assert!(matches!(attempt, ClaimAttempt::Succeeded(_)));
    assert_eq!(wallet.submissions(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_failure_message_is_cleared_by_next_claim() {
    let chain = FakeChain::new();
    let wallet = FakeWallet::new(account(1));
    let controller = connected_controller(&chain, &wallet).await;
    wallet.fail_submissions_with(ClientError::Signing("User rejected the request".to_string()));
    controller.claim().await.unwrap();
    assert_eq!(
        controller.view().await.error.as_deref(),
        Some("User rejected the request")
    );

    *wallet.submit_error.lock().unwrap() = None;
    chain.script(|s| s.wait_delay = Duration::from_secs(5));
    let claim = {
        let controller = Arc::new(controller);
        let handle = {
            let controller = controller.clone();
            tokio::spawn(async move { controller.claim().await })
        };
        while !controller.state().await.claim.is_pending() {
            tokio::task::yield_now().await;
        }
        let view = controller.view().await;
        assert_eq!(view.error, None);
        assert_eq!(view.claim_button.unwrap().label, "Processing...");
        handle
    };
    assert!(matches!(claim.await.unwrap(), Ok(ClaimAttempt::Succeeded(_))));
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_claim_is_refused() {
    let chain = FakeChain::new();
    let wallet = FakeWallet::new(account(1));
    let controller = Arc::new(connected_controller(&chain, &wallet).await);
    chain.script(|s| s.wait_delay = Duration::from_secs(3));

    let first = {
        let controller = controller.clone();
        tokio::spawn(async move { controller.claim().await })
    };
    while !controller.state().await.claim.is_pending() {
        tokio::task::yield_now().await;
    }

    let err = controller.claim().await.unwrap_err();
    assert!(matches!(err, FaucetError::ClaimUnavailable(ClaimBlocker::ClaimPending)));

    assert!(matches!(first.await.unwrap(), Ok(ClaimAttempt::Succeeded(_))));
    assert_eq!(wallet.submissions(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_orchestrator_refuses_second_claim_in_flight() {
    let config = Arc::new(test_config());
    let state = SharedState::default();
    let chain = FakeChain::new();
    let wallet = FakeWallet::new(account(1));
    wallet.connect().await.unwrap();
    chain.script(|s| s.wait_delay = Duration::from_secs(2));

    let refresher = Arc::new(SnapshotRefresher::new(
        config.clone(),
        chain.clone(),
        wallet.clone(),
        state.clone(),
    ));
    let orchestrator = Arc::new(ClaimOrchestrator::new(
        config,
        chain.clone(),
        wallet.clone(),
        state.clone(),
        refresher,
    ));

    let first = {
        let orchestrator = orchestrator.clone();
        tokio::spawn(async move { orchestrator.claim().await })
    };
    while !state.read().await.claim.is_pending() {
        tokio::task::yield_now().await;
    }

    assert!(matches!(orchestrator.claim().await, Err(FaucetError::ClaimInFlight)));
    assert!(matches!(first.await.unwrap(), Ok(ClaimAttempt::Succeeded(_))));
    assert_eq!(wallet.submissions(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_slow_refresh_cannot_undo_claim_reconcile() {
    let chain = FakeChain::new();
    let wallet = FakeWallet::new(account(1));
    let controller = Arc::new(connected_controller(&chain, &wallet).await);

    // A periodic refresh answers with pre-claim state, then stalls
    chain.script(|s| s.view_delay = Duration::from_secs(5));
    let slow = {
        let controller = controller.clone();
        tokio::spawn(async move { controller.refresh().await })
    };
    while chain.can_claim_views() < 2 {
        tokio::task::yield_now().await;
    }
    chain.script(|s| s.view_delay = Duration::ZERO);

    assert!(matches!(controller.claim().await.unwrap(), ClaimAttempt::Succeeded(_)));
    assert_eq!(controller.state().await.snapshot.cooldown_remaining_secs, DAY_SECS);

    let report = slow.await.unwrap();
    assert_eq!(report.cooldown, QueryOutcome::Skipped);
    assert_eq!(report.faucet_balance, QueryOutcome::Skipped);

    let state = controller.state().await;
    assert_eq!(state.snapshot.cooldown_remaining_secs, DAY_SECS);
    assert_eq!(state.snapshot.faucet_balance, 15_000_000_000 - CLAIM_UNITS);
    let button = controller.view().await.claim_button.unwrap();
    assert!(!button.enabled);
    assert_eq!(button.label, "Wait 24h 0m 0s");
}

#[tokio::test(start_paused = true)]
async fn test_cancelled_claim_releases_pending() {
    let chain = FakeChain::new();
    let wallet = FakeWallet::new(account(1));
    let controller = Arc::new(connected_controller(&chain, &wallet).await);
    chain.script(|s| s.wait_delay = Duration::from_secs(10));

    let cancelled = {
        let controller = controller.clone();
        tokio::spawn(async move { controller.claim().await })
    };
    while !controller.state().await.claim.is_pending() {
        tokio::task::yield_now().await;
    }
    cancelled.abort();
    assert!(cancelled.await.unwrap_err().is_cancelled());

    assert_eq!(controller.state().await.claim, ClaimAttempt::Idle);
    assert!(controller.view().await.claim_button.unwrap().enabled);

    chain.script(|s| s.wait_delay = Duration::ZERO);
    assert!(matches!(controller.claim().await.unwrap(), ClaimAttempt::Succeeded(_)));
    assert_eq!(wallet.submissions(), 2);
}
