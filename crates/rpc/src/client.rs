//! REST client for the node API (`/v1`).

use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use wenmo_common::{AccountAddress, ChainClient, ClientError, RemoteError, ViewRequest};

use crate::models::{
    AccountData, MoveResource, SubmitResponse, SubmitTransactionRequest, TransactionInfo, UserTransactionRequest,
};

/// Connection settings for [`RestClient`]
#[derive(Debug, Clone)]
pub struct RestClientConfig {
    /// Base URL including the API version, e.g. `https://node.example/v1`
    pub node_url: String,
    pub request_timeout: Duration,
    /// Upper bound for [`ChainClient::wait_for_transaction`]
    pub wait_timeout: Duration,
    pub poll_interval: Duration,
}

impl Default for RestClientConfig {
    fn default() -> Self {
        Self {
            node_url: "http://127.0.0.1:8080/v1".to_string(),
            request_timeout: Duration::from_secs(30),
            wait_timeout: Duration::from_secs(60),
            poll_interval: Duration::from_millis(500),
        }
    }
}

pub struct RestClient {
    base_url: Url,
    config: RestClientConfig,
    client: reqwest::Client,
}

impl RestClient {
    pub fn new(config: RestClientConfig) -> Result<Self, ClientError> {
        let base_url = Url::parse(&config.node_url)
            .map_err(|e| ClientError::Transport(format!("Invalid node URL {}: {}", config.node_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::Transport(format!("Invalid node URL {}", config.node_url)));
        }

        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        Ok(Self {
            base_url,
            config,
            client,
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // cannot_be_a_base was rejected in new()
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<Value, ClientError> {
        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                ClientError::Timeout(e.to_string())
            } else {
                ClientError::Transport(e.to_string())
            }
        })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ClientError::Transport(format!("Failed to read response: {}", e)))?;

        let body = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).unwrap_or(Value::String(text))
        };

        if status.is_success() {
            return Ok(body);
        }

        let remote = RemoteError::from_response(status.as_u16(), body);
        debug!(status = status.as_u16(), error_code = ?remote.error_code, "Node request failed");
        if status == StatusCode::NOT_FOUND {
            Err(ClientError::NotFound(remote))
        } else {
            Err(ClientError::Remote(remote))
        }
    }

    async fn get<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, ClientError> {
        let body = self.send(self.client.get(self.endpoint(segments))).await?;
        decode(body)
    }

    async fn post<T: DeserializeOwned>(&self, segments: &[&str], payload: &impl serde::Serialize) -> Result<T, ClientError> {
        let body = self
            .send(self.client.post(self.endpoint(segments)).json(payload))
            .await?;
        decode(body)
    }

    pub async fn get_account(&self, address: &AccountAddress) -> Result<AccountData, ClientError> {
        self.get(&["accounts", &address.to_hex_literal()]).await
    }

    /// Signing message (BCS bytes with the domain-separating prefix) for a transaction.
    pub async fn encode_submission(&self, transaction: &UserTransactionRequest) -> Result<Vec<u8>, ClientError> {
        let encoded: String = self
            .post(&["transactions", "encode_submission"], transaction)
            .await?;
        let digits = encoded.strip_prefix("0x").unwrap_or(&encoded);
        hex::decode(digits).map_err(|e| ClientError::InvalidResponse(format!("Invalid signing message: {}", e)))
    }

    pub async fn submit_transaction(&self, request: &SubmitTransactionRequest) -> Result<SubmitResponse, ClientError> {
        let response: SubmitResponse = self.post(&["transactions"], request).await?;
        info!(hash = %response.hash, "Transaction submitted");
        Ok(response)
    }

    async fn transaction_by_hash(&self, hash: &str, long_poll: bool) -> Result<TransactionInfo, ClientError> {
        if long_poll {
            self.get(&["transactions", "wait_by_hash", hash]).await
        } else {
            self.get(&["transactions", "by_hash", hash]).await
        }
    }
}

#[async_trait]
impl ChainClient for RestClient {
    async fn view(&self, request: &ViewRequest) -> Result<Vec<Value>, ClientError> {
        debug!(function = %request.function, "View call");
        self.post(&["view"], request).await
    }

    async fn account_resource(&self, address: &AccountAddress, resource_type: &str) -> Result<Value, ClientError> {
        let resource: MoveResource = self
            .get(&["accounts", &address.to_hex_literal(), "resource", resource_type])
            .await?;
        Ok(resource.data)
    }

    async fn wait_for_transaction(&self, hash: &str) -> Result<(), ClientError> {
        let deadline = Instant::now() + self.config.wait_timeout;
        let mut long_poll = true;

        loop {
            match self.transaction_by_hash(hash, long_poll).await {
                Ok(txn) if !txn.is_pending() => {
                    return match txn.success {
                        Some(true) => {
                            info!(hash, "Transaction committed");
                            Ok(())
                        }
                        _ => {
                            let vm_status = txn.vm_status.unwrap_or_else(|| "unknown VM status".to_string());
                            warn!(hash, %vm_status, "Transaction aborted");
                            Err(ClientError::TransactionFailed {
                                hash: hash.to_string(),
                                vm_status,
                            })
                        }
                    };
                }
                // Still pending, or not yet indexed by this node.
                Ok(_) | Err(ClientError::NotFound(_)) => {}
                // A long poll outliving the request timeout; the deadline decides
                Err(ClientError::Timeout(e)) => debug!(hash, error = %e, "Transaction poll timed out"),
                Err(e) => return Err(e),
            }

            if Instant::now() >= deadline {
                return Err(ClientError::Timeout(format!("transaction {} not committed", hash)));
            }
            long_poll = false;
            tokio::time::sleep(self.config.poll_interval).await;
        }
    }
}

fn decode<T: DeserializeOwned>(body: Value) -> Result<T, ClientError> {
    serde_json::from_value(body).map_err(|e| ClientError::InvalidResponse(e.to_string()))
}
