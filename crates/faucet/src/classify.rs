//! Turns claim failures into the message shown to the user.
//!
//! The node reports a sender that has never received a transaction as
//! `account_not_found`. Depending on the wallet, that answer arrives at the top
//! level, inside the response body, attached as extra data, as the cause of a
//! wrapping error, or JSON-encoded into the message text.

use serde_json::Value;
use wenmo_common::{ClientError, RemoteError};

pub const ACCOUNT_NOT_INITIALIZED_MESSAGE: &str = "Your account may not be initialized on-chain. \
Please transfer some gas tokens from another account to initialize your account.";

pub const FALLBACK_MESSAGE: &str = "Transaction failed";

const ACCOUNT_NOT_FOUND_CODE: &str = "account_not_found";
const ACCOUNT_NOT_FOUND_TEXT: &str = "Account not found";
const MAX_DEPTH: usize = 8;

/// Nested members of a JSON error object that may hold the node's answer
const NESTED_KEYS: [&str; 4] = ["body", "data", "cause", "response"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClaimFailure {
    AccountNotInitialized,
    Other(String),
}

impl ClaimFailure {
    pub fn message(&self) -> String {
        match self {
            ClaimFailure::AccountNotInitialized => ACCOUNT_NOT_INITIALIZED_MESSAGE.to_string(),
            ClaimFailure::Other(message) => message.clone(),
        }
    }
}

pub fn classify(error: &ClientError) -> ClaimFailure {
    let raw = error.raw_message();

    let uninitialized = error.remote().map_or(false, |remote| remote_has_marker(remote, 0))
        || raw.as_deref().map_or(false, |text| text_has_marker(text, 0));

    if uninitialized {
        ClaimFailure::AccountNotInitialized
    } else {
        ClaimFailure::Other(
            raw.filter(|message| !message.trim().is_empty())
                .unwrap_or_else(|| FALLBACK_MESSAGE.to_string()),
        )
    }
}

fn remote_has_marker(remote: &RemoteError, depth: usize) -> bool {
    if depth > MAX_DEPTH {
        return false;
    }

    remote.error_code.as_deref() == Some(ACCOUNT_NOT_FOUND_CODE)
        || remote.message.as_deref().map_or(false, |text| text_has_marker(text, depth + 1))
        || remote.body.as_ref().map_or(false, |body| value_has_marker(body, depth + 1))
        || remote.data.as_ref().map_or(false, |data| value_has_marker(data, depth + 1))
        || remote.cause.as_deref().map_or(false, |cause| remote_has_marker(cause, depth + 1))
}

fn text_has_marker(text: &str, depth: usize) -> bool {
    if text.contains(ACCOUNT_NOT_FOUND_TEXT) {
        return true;
    }
    if !text.trim_start().starts_with('{') {
        return false;
    }
    serde_json::from_str::<Value>(text)
        .map(|parsed| value_has_marker(&parsed, depth + 1))
        .unwrap_or(false)
}

fn value_has_marker(value: &Value, depth: usize) -> bool {
    if depth > MAX_DEPTH {
        return false;
    }

    match value {
        Value::String(text) => text_has_marker(text, depth),
        Value::Object(map) => {
            map.get("error_code").and_then(Value::as_str) == Some(ACCOUNT_NOT_FOUND_CODE)
                || map
                    .get("message")
                    .and_then(Value::as_str)
                    .map_or(false, |text| text_has_marker(text, depth + 1))
                || NESTED_KEYS
                    .iter()
                    .filter_map(|key| map.get(*key))
                    .any(|nested| value_has_marker(nested, depth + 1))
        }
        _ => false,
    }
}
