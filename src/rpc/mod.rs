//! JSON-RPC 2.0 Protocol
//!
//! Wire envelope and the parameter/result unions exchanged with the
//! browser extension. Parameters are decoded by the envelope's `method`
//! name rather than by structural trial decoding: several payload shapes
//! overlap (sign and send-transaction results are identical), so the
//! method string is the only unambiguous discriminant.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::error::{WalletError, WalletResult};

/// The protocol version literal every envelope must carry.
pub const JSONRPC_VERSION: &str = "2.0";

// =============================================================================
// Request envelope
// =============================================================================

/// Inbound request envelope. `params` stays raw until the method is known.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcRequest {
    pub jsonrpc: String,
    pub id: u64,
    pub method: String,
    pub params: serde_json::Value,
}

/// The recognized request methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestMethod {
    Connect,
    SignTransaction,
    SignMessage,
    SendTransaction,
    SignTransactions,
    SignMessages,
    SignAllTransactions,
    SignAllMessages,
}

impl RequestMethod {
    pub fn parse(method: &str) -> Option<Self> {
        match method {
            "connect" => Some(Self::Connect),
            "signTransaction" => Some(Self::SignTransaction),
            "signMessage" => Some(Self::SignMessage),
            "sendTransaction" => Some(Self::SendTransaction),
            "signTransactions" => Some(Self::SignTransactions),
            "signMessages" => Some(Self::SignMessages),
            "signAllTransactions" => Some(Self::SignAllTransactions),
            "signAllMessages" => Some(Self::SignAllMessages),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Connect => "connect",
            Self::SignTransaction => "signTransaction",
            Self::SignMessage => "signMessage",
            Self::SendTransaction => "sendTransaction",
            Self::SignTransactions => "signTransactions",
            Self::SignMessages => "signMessages",
            Self::SignAllTransactions => "signAllTransactions",
            Self::SignAllMessages => "signAllMessages",
        }
    }
}

// =============================================================================
// Request parameters
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectParams {
    pub origin: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cluster: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignTransactionParams {
    pub origin: String,
    /// Base64-encoded transaction bytes.
    pub tx: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignMessageParams {
    pub origin: String,
    /// Base64-encoded message bytes.
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendTransactionParams {
    pub origin: String,
    /// Transaction signature produced by a prior signing step.
    pub tx_hash: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignTransactionsParams {
    pub origin: String,
    /// Base64-encoded transactions.
    pub transactions: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignMessagesParams {
    pub origin: String,
    /// Base64-encoded messages.
    pub messages: Vec<String>,
}

/// Decoded request parameters, one variant per method.
#[derive(Debug, Clone)]
pub enum RequestParams {
    Connect(ConnectParams),
    SignTransaction(SignTransactionParams),
    SignMessage(SignMessageParams),
    SendTransaction(SendTransactionParams),
    SignTransactions(SignTransactionsParams),
    SignMessages(SignMessagesParams),
    SignAllTransactions(SignTransactionsParams),
    SignAllMessages(SignMessagesParams),
}

impl RequestParams {
    /// Decode `params` against the shape the method prescribes.
    pub fn decode(method: RequestMethod, params: &serde_json::Value) -> WalletResult<Self> {
        fn shaped<T: serde::de::DeserializeOwned>(value: &serde_json::Value) -> WalletResult<T> {
            serde_json::from_value(value.clone())
                .map_err(|e| WalletError::InvalidParams(e.to_string()))
        }

        Ok(match method {
            RequestMethod::Connect => Self::Connect(shaped(params)?),
            RequestMethod::SignTransaction => Self::SignTransaction(shaped(params)?),
            RequestMethod::SignMessage => Self::SignMessage(shaped(params)?),
            RequestMethod::SendTransaction => Self::SendTransaction(shaped(params)?),
            RequestMethod::SignTransactions => Self::SignTransactions(shaped(params)?),
            RequestMethod::SignMessages => Self::SignMessages(shaped(params)?),
            RequestMethod::SignAllTransactions => Self::SignAllTransactions(shaped(params)?),
            RequestMethod::SignAllMessages => Self::SignAllMessages(shaped(params)?),
        })
    }

    /// Every request carries the caller's origin.
    pub fn origin(&self) -> &str {
        match self {
            Self::Connect(p) => &p.origin,
            Self::SignTransaction(p) => &p.origin,
            Self::SignMessage(p) => &p.origin,
            Self::SendTransaction(p) => &p.origin,
            Self::SignTransactions(p) => &p.origin,
            Self::SignMessages(p) => &p.origin,
            Self::SignAllTransactions(p) => &p.origin,
            Self::SignAllMessages(p) => &p.origin,
        }
    }
}

/// Decode one base64 payload field, reporting failures as invalid params.
pub fn decode_payload(payload: &str) -> WalletResult<Vec<u8>> {
    BASE64
        .decode(payload)
        .map_err(|e| WalletError::InvalidParams(format!("invalid base64 payload: {e}")))
}

/// Encode bytes for the wire.
pub fn encode_payload(bytes: &[u8]) -> String {
    BASE64.encode(bytes)
}

// =============================================================================
// Response envelope
// =============================================================================

/// Outbound response envelope. Exactly one of `result`/`error` is present.
#[derive(Debug, Clone, Serialize)]
pub struct RpcResponse {
    pub jsonrpc: &'static str,
    pub id: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<RpcResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
}

impl RpcResponse {
    pub fn success(id: u64, result: RpcResult) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn failure(id: u64, error: RpcError) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id,
            result: None,
            error: Some(error),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectResult {
    /// Base58-encoded wallet public key.
    pub public_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_label: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignResult {
    /// Base64-encoded 64-byte signature.
    pub signature: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignAllResult {
    /// One base64-encoded signature per input, in input order.
    pub signatures: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendTransactionResult {
    /// Transaction signature string.
    pub signature: String,
}

/// Result union. Serialized as the bare variant shape with no wrapper tag.
///
/// Deliberately `Serialize`-only: `SignResult` and `SendTransactionResult`
/// share a field shape, so untagged deserialization could not tell them
/// apart. Consumers know which shape to expect from the method they called.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum RpcResult {
    Connect(ConnectResult),
    Sign(SignResult),
    SignAll(SignAllResult),
    SendTransaction(SendTransactionResult),
}

// =============================================================================
// Errors
// =============================================================================

/// Wire-level error object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
}

impl RpcError {
    pub fn user_rejected() -> Self {
        Self {
            code: 4001,
            message: "User rejected the request".into(),
            data: None,
        }
    }

    pub fn unauthorized() -> Self {
        Self {
            code: 4100,
            message: "Unauthorized".into(),
            data: None,
        }
    }

    pub fn session_locked() -> Self {
        Self {
            code: 4101,
            message: "Session is locked. Authentication required.".into(),
            data: None,
        }
    }

    pub fn method_not_found() -> Self {
        Self {
            code: -32601,
            message: "Method not found".into(),
            data: None,
        }
    }

    pub fn invalid_params(detail: impl Into<String>) -> Self {
        Self {
            code: -32602,
            message: "Invalid params".into(),
            data: Some(detail.into()),
        }
    }

    pub fn internal(detail: impl Into<String>) -> Self {
        Self {
            code: -32603,
            message: "Internal error".into(),
            data: Some(detail.into()),
        }
    }
}

impl From<&WalletError> for RpcError {
    fn from(err: &WalletError) -> Self {
        match err {
            WalletError::UserRejected => Self::user_rejected(),
            WalletError::NotConnected(_) => Self::unauthorized(),
            WalletError::Locked => Self::session_locked(),
            WalletError::MethodNotFound(_) => Self::method_not_found(),
            _ => match err.rpc_code() {
                -32602 => Self::invalid_params(err.to_string()),
                _ => Self::internal(err.to_string()),
            },
        }
    }
}
