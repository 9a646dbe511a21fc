use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::watch;

use crate::error::ClientError;
use crate::types::{AccountAddress, ConnectionState, EntryFunctionPayload, PendingTransaction, ViewRequest};

/// Read access to the chain plus transaction finalization.
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Evaluate a view function and return its result tuple.
    async fn view(&self, request: &ViewRequest) -> Result<Vec<Value>, ClientError>;

    /// Fetch the `data` of a resource stored under `address`.
    ///
    /// Fails with [`ClientError::NotFound`] when the account or the resource does not exist.
    async fn account_resource(&self, address: &AccountAddress, resource_type: &str) -> Result<Value, ClientError>;

    /// Block until the transaction is committed; a committed but aborted transaction is an error.
    async fn wait_for_transaction(&self, hash: &str) -> Result<(), ClientError>;
}

/// Connection lifecycle and signing, owned by the wallet.
#[async_trait]
pub trait WalletAdapter: Send + Sync {
    fn name(&self) -> &str;

    /// Receiver that observes every connection change.
    fn subscribe(&self) -> watch::Receiver<ConnectionState>;

    fn connection(&self) -> ConnectionState;

    async fn connect(&self) -> Result<AccountAddress, ClientError>;

    async fn disconnect(&self) -> Result<(), ClientError>;

    async fn sign_and_submit(&self, payload: &EntryFunctionPayload) -> Result<PendingTransaction, ClientError>;
}
