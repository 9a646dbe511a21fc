//! JSON shapes of the node REST API.
//!
//! The node encodes `u64` values as decimal strings.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use wenmo_common::types::parse_u64;
use wenmo_common::EntryFunctionPayload;

/// `GET /accounts/{address}`
#[derive(Debug, Clone, Deserialize)]
pub struct AccountData {
    #[serde(deserialize_with = "u64_from_string")]
    pub sequence_number: u64,
    pub authentication_key: String,
}

/// `GET /accounts/{address}/resource/{type}`
#[derive(Debug, Clone, Deserialize)]
pub struct MoveResource {
    #[serde(rename = "type")]
    pub resource_type: String,
    pub data: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TransactionPayload {
    EntryFunctionPayload {
        function: String,
        type_arguments: Vec<String>,
        arguments: Vec<Value>,
    },
}

impl From<&EntryFunctionPayload> for TransactionPayload {
    fn from(payload: &EntryFunctionPayload) -> Self {
        TransactionPayload::EntryFunctionPayload {
            function: payload.function.clone(),
            type_arguments: payload.type_arguments.clone(),
            arguments: payload.arguments.clone(),
        }
    }
}

/// Body of `POST /transactions/encode_submission`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserTransactionRequest {
    pub sender: String,
    pub sequence_number: String,
    pub max_gas_amount: String,
    pub gas_unit_price: String,
    pub expiration_timestamp_secs: String,
    pub payload: TransactionPayload,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TransactionSignature {
    Ed25519Signature { public_key: String, signature: String },
}

/// Body of `POST /transactions`
#[derive(Debug, Clone, Serialize)]
pub struct SubmitTransactionRequest {
    #[serde(flatten)]
    pub transaction: UserTransactionRequest,
    pub signature: TransactionSignature,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubmitResponse {
    pub hash: String,
}

/// Enough of a transaction to tell pending from committed.
#[derive(Debug, Clone, Deserialize)]
pub struct TransactionInfo {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub hash: Option<String>,
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub vm_status: Option<String>,
}

impl TransactionInfo {
    pub fn is_pending(&self) -> bool {
        self.kind == "pending_transaction"
    }
}

fn u64_from_string<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    parse_u64(&value).ok_or_else(|| serde::de::Error::custom(format!("expected u64, got {}", value)))
}
