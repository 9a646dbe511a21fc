//! View controller for the WENMO token faucet.
//!
//! The controller keeps a [`FaucetSnapshot`] of the faucet balance, the
//! connected account's balance and its claim cooldown up to date, runs a local
//! one-second countdown between refreshes, and drives a single claim at a time
//! through the injected [`WalletAdapter`](wenmo_common::WalletAdapter) and
//! [`ChainClient`](wenmo_common::ChainClient).

pub mod claim;
pub mod classify;
pub mod config;
pub mod controller;
pub mod error;
pub mod refresher;
pub mod state;
pub mod view;

pub use claim::ClaimOrchestrator;
pub use classify::{classify, ClaimFailure};
pub use config::FaucetConfig;
pub use controller::{FaucetController, MountedController};
pub use error::{FaucetError, FaucetResult};
pub use refresher::{QueryOutcome, RefreshReport, SnapshotRefresher};
pub use state::{ClaimAttempt, ClaimBlocker, FaucetSnapshot, RefreshSequence, SharedState, ViewState};
pub use view::{ClaimButton, FaucetView, StatusLine, ViewInput};
