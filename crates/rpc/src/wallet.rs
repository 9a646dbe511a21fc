//! Wallet backed by an Ed25519 key held in process memory.

use async_trait::async_trait;
use ed25519_dalek::{Signer, SigningKey};
use sha3::{Digest, Sha3_256};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info};

use wenmo_common::{
    AccountAddress, ClientError, ConnectionState, EntryFunctionPayload, PendingTransaction, RemoteError,
    WalletAdapter,
};

use crate::client::RestClient;
use crate::models::{SubmitTransactionRequest, TransactionPayload, TransactionSignature, UserTransactionRequest};

/// Scheme byte appended to the public key when deriving a single-key Ed25519 address.
const ED25519_SCHEME: u8 = 0x00;

/// Gas and expiry settings for transactions built by [`LocalWallet`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransactionOptions {
    pub max_gas_amount: u64,
    pub gas_unit_price: u64,
    /// Seconds from now until the transaction expires
    pub expiration_secs: u64,
}

impl Default for TransactionOptions {
    fn default() -> Self {
        Self {
            max_gas_amount: 200_000,
            gas_unit_price: 100,
            expiration_secs: 60,
        }
    }
}

pub struct LocalWallet {
    name: String,
    client: Arc<RestClient>,
    signing_key: SigningKey,
    address: AccountAddress,
    options: TransactionOptions,
    state: watch::Sender<ConnectionState>,
}

impl LocalWallet {
    pub fn new(client: Arc<RestClient>, signing_key: SigningKey, options: TransactionOptions) -> Self {
        let address = derive_address(&signing_key);
        let (state, _) = watch::channel(ConnectionState::Disconnected);

        Self {
            name: "Local Key".to_string(),
            client,
            signing_key,
            address,
            options,
            state,
        }
    }

    fn connected_account(&self) -> Result<AccountAddress, ClientError> {
        self.connection().account().ok_or(ClientError::NotConnected)
    }

    async fn build_transaction(
        &self,
        sender: AccountAddress,
        payload: &EntryFunctionPayload,
    ) -> Result<UserTransactionRequest, ClientError> {
        let account = self.client.get_account(&sender).await.map_err(|e| {
            // Keep the node's answer reachable for error classification.
            let mut wrapped = RemoteError::new(format!("Failed to fetch sender account {}", sender.short()));
            wrapped.cause = Some(Box::new(match e {
                ClientError::NotFound(remote) | ClientError::Remote(remote) => remote,
                other => RemoteError::new(other.to_string()),
            }));
            ClientError::Remote(wrapped)
        })?;

        let expiration = chrono::Utc::now().timestamp().max(0) as u64 + self.options.expiration_secs;

        Ok(UserTransactionRequest {
            sender: sender.to_hex_literal(),
            sequence_number: account.sequence_number.to_string(),
            max_gas_amount: self.options.max_gas_amount.to_string(),
            gas_unit_price: self.options.gas_unit_price.to_string(),
            expiration_timestamp_secs: expiration.to_string(),
            payload: TransactionPayload::from(payload),
        })
    }
}

#[async_trait]
impl WalletAdapter for LocalWallet {
    fn name(&self) -> &str {
        &self.name
    }

    fn subscribe(&self) -> watch::Receiver<ConnectionState> {
        self.state.subscribe()
    }

    fn connection(&self) -> ConnectionState {
        *self.state.borrow()
    }

    async fn connect(&self) -> Result<AccountAddress, ClientError> {
        self.state.send_replace(ConnectionState::Connected(self.address));
        info!(account = %self.address.short(), wallet = %self.name, "Wallet connected");
        Ok(self.address)
    }

    async fn disconnect(&self) -> Result<(), ClientError> {
        self.state.send_replace(ConnectionState::Disconnected);
        info!(wallet = %self.name, "Wallet disconnected");
        Ok(())
    }

    async fn sign_and_submit(&self, payload: &EntryFunctionPayload) -> Result<PendingTransaction, ClientError> {
        let sender = self.connected_account()?;
        let transaction = self.build_transaction(sender, payload).await?;

        let message = self.client.encode_submission(&transaction).await?;
        let signature = self.signing_key.sign(&message);
        debug!(function = %payload.function, sequence_number = %transaction.sequence_number, "Signed transaction");

        let request = SubmitTransactionRequest {
            transaction,
            signature: TransactionSignature::Ed25519Signature {
                public_key: format!("0x{}", hex::encode(self.signing_key.verifying_key().to_bytes())),
                signature: format!("0x{}", hex::encode(signature.to_bytes())),
            },
        };

        let response = self.client.submit_transaction(&request).await?;
        Ok(PendingTransaction { hash: response.hash })
    }
}

/// Wallet with no key: never connects, so only faucet-wide values are shown.
pub struct WatchOnlyWallet {
    state: watch::Sender<ConnectionState>,
}

impl WatchOnlyWallet {
    pub fn new() -> Self {
        let (state, _) = watch::channel(ConnectionState::Disconnected);
        Self { state }
    }
}

impl Default for WatchOnlyWallet {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WalletAdapter for WatchOnlyWallet {
    fn name(&self) -> &str {
        "Watch Only"
    }

    fn subscribe(&self) -> watch::Receiver<ConnectionState> {
        self.state.subscribe()
    }

    fn connection(&self) -> ConnectionState {
        ConnectionState::Disconnected
    }

    async fn connect(&self) -> Result<AccountAddress, ClientError> {
        Err(ClientError::Signing("no signing key configured".to_string()))
    }

    async fn disconnect(&self) -> Result<(), ClientError> {
        Ok(())
    }

    async fn sign_and_submit(&self, _payload: &EntryFunctionPayload) -> Result<PendingTransaction, ClientError> {
        Err(ClientError::NotConnected)
    }
}

/// `sha3_256(public_key || 0x00)`
pub fn derive_address(signing_key: &SigningKey) -> AccountAddress {
    let mut hasher = Sha3_256::new();
    hasher.update(signing_key.verifying_key().as_bytes());
    hasher.update([ED25519_SCHEME]);
    AccountAddress::from_slice(&hasher.finalize())
}

/// Parse a 32-byte private key seed given as hex, with or without `0x`.
pub fn signing_key_from_hex(encoded: &str) -> Result<SigningKey, ClientError> {
    let trimmed = encoded.trim();
    let digits = trimmed.strip_prefix("0x").unwrap_or(trimmed);
    let bytes = hex::decode(digits).map_err(|e| ClientError::Signing(format!("Invalid private key: {}", e)))?;
    let seed: [u8; 32] = bytes
        .as_slice()
        .try_into()
        .map_err(|_| ClientError::Signing(format!("Private key must be 32 bytes, got {}", bytes.len())))?;
    Ok(SigningKey::from_bytes(&seed))
}

pub fn generate_signing_key() -> SigningKey {
    SigningKey::from_bytes(&rand::random::<[u8; 32]>())
}
