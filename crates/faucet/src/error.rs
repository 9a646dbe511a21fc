//! Error types for the faucet client

use thiserror::Error;
use wenmo_common::{ClientError, CommonError};

use crate::state::ClaimBlocker;

/// Faucet client errors
#[derive(Error, Debug)]
pub enum FaucetError {
    #[error("Chain error: {0}")]
    Client(#[from] ClientError),

    #[error("A claim is already in flight")]
    ClaimInFlight,

    #[error("Claim unavailable: {0}")]
    ClaimUnavailable(ClaimBlocker),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),
}

impl From<CommonError> for FaucetError {
    fn from(err: CommonError) -> Self {
        match err {
            CommonError::InvalidAddress(addr) => FaucetError::InvalidAddress(addr),
            other => FaucetError::Config(other.to_string()),
        }
    }
}

pub type FaucetResult<T> = Result<T, FaucetError>;
