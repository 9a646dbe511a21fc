//! Shared types, collaborator traits and utilities for the WENMO faucet client.

pub mod error;
pub mod traits;
pub mod types;
pub mod utils;

pub use error::{ClientError, CommonError, RemoteError};
pub use traits::{ChainClient, WalletAdapter};
pub use types::{AccountAddress, ConnectionState, EntryFunctionPayload, PendingTransaction, ViewRequest};
