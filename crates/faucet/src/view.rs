//! Presentation model derived from the view state.

use std::fmt;
use wenmo_common::ConnectionState;

use crate::config::FaucetConfig;
use crate::state::{ClaimAttempt, ViewState};

/// Everything [`FaucetView::render`] reads
pub struct ViewInput<'a> {
    pub state: &'a ViewState,
    pub connection: &'a ConnectionState,
    pub config: &'a FaucetConfig,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimButton {
    pub label: String,
    pub enabled: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLine {
    ConnectWallet,
    CooldownActive,
    AvailableToClaim,
    FaucetEmpty,
}

impl fmt::Display for StatusLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            StatusLine::ConnectWallet => "Please connect wallet to claim.",
            StatusLine::CooldownActive => "Cooldown active.",
            StatusLine::AvailableToClaim => "Available to claim!",
            StatusLine::FaucetEmpty => "Faucet Empty",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FaucetView {
    pub title: String,
    pub network: String,
    /// Short form of the connected account
    pub account: Option<String>,
    pub faucet_balance: String,
    pub user_balance: String,
    /// Not rendered at all while disconnected
    pub claim_button: Option<ClaimButton>,
    pub status: Vec<StatusLine>,
    pub success_tx: Option<String>,
    pub error: Option<String>,
    pub footer: String,
}

impl FaucetView {
    pub fn render(input: &ViewInput<'_>) -> FaucetView {
        let ViewInput {
            state,
            connection,
            config,
        } = *input;
        let limits = &config.limits;
        let snapshot = &state.snapshot;
        let symbol = &limits.token_symbol;

        let title = format!("WEN MOVED Coin (${}) Faucet", symbol);
        let footer = format!(
            "Daily Limit: {} {} | Cooldown: {} Hours",
            limits.claim_amount, symbol, limits.cooldown_hours
        );
        let faucet_balance = format!("{} {}", format_balance(snapshot.faucet_balance, limits.display_divisor), symbol);

        let account = match connection.account() {
            Some(account) => account,
            None => {
                return FaucetView {
                    title,
                    network: config.network.network_name.clone(),
                    account: None,
                    faucet_balance,
                    user_balance: "-".to_string(),
                    claim_button: None,
                    status: vec![StatusLine::ConnectWallet],
                    success_tx: None,
                    error: None,
                    footer,
                };
            }
        };

        let label = if state.claim.is_pending() {
            "Processing...".to_string()
        } else if snapshot.cooldown_remaining_secs > 0 {
            format!("Wait {}", format_duration(snapshot.cooldown_remaining_secs))
        } else {
            format!("CLAIM {} ${}", limits.claim_amount, symbol)
        };
        let enabled = state.claim_blocker(connection, limits.min_claim_balance).is_none();

        let mut status = Vec::new();
        let has_funds = snapshot.faucet_balance >= limits.min_claim_balance;
        if snapshot.cooldown_remaining_secs > 0 {
            status.push(StatusLine::CooldownActive);
        } else if has_funds {
            status.push(StatusLine::AvailableToClaim);
        }
        if !has_funds {
            status.push(StatusLine::FaucetEmpty);
        }

        let (success_tx, error) = match &state.claim {
            ClaimAttempt::Succeeded(hash) => (Some(hash.clone()), None),
            ClaimAttempt::Failed(message) => (None, Some(message.clone())),
            ClaimAttempt::Idle | ClaimAttempt::Pending => (None, None),
        };

        FaucetView {
            title,
            network: config.network.network_name.clone(),
            account: Some(account.short()),
            faucet_balance,
            user_balance: format!("{} {}", format_balance(snapshot.user_balance, limits.display_divisor), symbol),
            claim_button: Some(ClaimButton { label, enabled }),
            status,
            success_tx,
            error,
            footer,
        }
    }
}

impl fmt::Display for FaucetView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.title)?;
        writeln!(f, "{}", self.network)?;
        writeln!(f)?;
        match &self.account {
            Some(account) => writeln!(f, "Connected:      {}", account)?,
            None => writeln!(f, "Connect Wallet")?,
        }
        writeln!(f, "Faucet Balance: {}", self.faucet_balance)?;
        writeln!(f, "Your Balance:   {}", self.user_balance)?;
        writeln!(f)?;

        if let Some(button) = &self.claim_button {
            let state = if button.enabled { "" } else { " (disabled)" };
            writeln!(f, "[ {} ]{}", button.label, state)?;
        }
        for line in &self.status {
            writeln!(f, "{}", line)?;
        }
        if let Some(hash) = &self.success_tx {
            writeln!(f, "Success!")?;
            writeln!(f, "Tx: {}", hash)?;
        }
        if let Some(error) = &self.error {
            writeln!(f, "Error: {}", error)?;
        }

        writeln!(f)?;
        write!(f, "{}", self.footer)
    }
}

/// `value / divisor` to two decimals, rounding half up.
pub fn format_balance(value: u64, divisor: u64) -> String {
    let divisor = u128::from(divisor.max(1));
    let hundredths = (u128::from(value) * 100 + divisor / 2) / divisor;
    format!("{}.{:02}", hundredths / 100, hundredths % 100)
}

/// `{h}h {m}m {s}s`, hours unbounded
pub fn format_duration(secs: u64) -> String {
    format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
}
