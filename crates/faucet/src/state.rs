//! View state shared between the timers, the claim flow and the renderer.

use std::fmt;
use std::sync::Arc;
use tokio::sync::RwLock;
use wenmo_common::{AccountAddress, ConnectionState};

/// Latest known on-chain values, in smallest token units.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FaucetSnapshot {
    pub faucet_balance: u64,
    pub user_balance: u64,
    pub cooldown_remaining_secs: u64,
    /// Account the user fields were fetched for
    pub account: Option<AccountAddress>,
}

impl FaucetSnapshot {
    /// Point the per-account fields at `account`, zeroing them if it changed.
    pub fn retarget(&mut self, account: Option<AccountAddress>) -> bool {
        if self.account == account {
            return false;
        }
        self.account = account;
        self.user_balance = 0;
        self.cooldown_remaining_secs = 0;
        true
    }

    /// One step of the local countdown. Returns whether anything changed.
    pub fn tick_cooldown(&mut self) -> bool {
        if self.cooldown_remaining_secs == 0 {
            return false;
        }
        self.cooldown_remaining_secs -= 1;
        true
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ClaimAttempt {
    #[default]
    Idle,
    Pending,
    Succeeded(String),
    Failed(String),
}

impl ClaimAttempt {
    pub fn is_pending(&self) -> bool {
        matches!(self, ClaimAttempt::Pending)
    }
}

/// Why the claim control is disabled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimBlocker {
    NotConnected,
    CoolingDown(u64),
    FaucetEmpty,
    ClaimPending,
}

impl fmt::Display for ClaimBlocker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClaimBlocker::NotConnected => write!(f, "wallet not connected"),
            ClaimBlocker::CoolingDown(secs) => write!(f, "cooldown active for another {}s", secs),
            ClaimBlocker::FaucetEmpty => write!(f, "faucet balance below the claim threshold"),
            ClaimBlocker::ClaimPending => write!(f, "a claim is already in flight"),
        }
    }
}

/// Orders overlapping refreshes: only answers from the newest issued refresh
/// that has not been overtaken may land.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefreshSequence {
    issued: u64,
    committed: u64,
}

impl RefreshSequence {
    /// Ticket for a refresh about to query the chain.
    pub fn issue(&mut self) -> u64 {
        self.issued += 1;
        self.issued
    }

    /// Record `ticket` as committed. Returns false when a newer refresh
    /// already committed, in which case the answers are stale.
    pub fn commit(&mut self, ticket: u64) -> bool {
        if ticket < self.committed {
            return false;
        }
        self.committed = ticket;
        true
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewState {
    pub snapshot: FaucetSnapshot,
    pub claim: ClaimAttempt,
    pub refresh: RefreshSequence,
}

impl ViewState {
    /// First reason the claim control is disabled, or `None` when it is enabled.
    pub fn claim_blocker(&self, connection: &ConnectionState, min_claim_balance: u64) -> Option<ClaimBlocker> {
        if !connection.is_connected() {
            Some(ClaimBlocker::NotConnected)
        } else if self.claim.is_pending() {
            Some(ClaimBlocker::ClaimPending)
        } else if self.snapshot.cooldown_remaining_secs > 0 {
            Some(ClaimBlocker::CoolingDown(self.snapshot.cooldown_remaining_secs))
        } else if self.snapshot.faucet_balance < min_claim_balance {
            Some(ClaimBlocker::FaucetEmpty)
        } else {
            None
        }
    }
}

pub type SharedState = Arc<RwLock<ViewState>>;
