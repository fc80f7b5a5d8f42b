//! JSON-RPC wire types, errors and the node capability trait.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Node error code: invalid address or key (includes "Block not found").
pub const RPC_INVALID_ADDRESS_OR_KEY: i64 = -5;

/// Node error code: invalid parameter (includes "Block height out of range").
pub const RPC_INVALID_PARAMETER: i64 = -8;

/// JSON-RPC error code for unknown methods.
pub const RPC_METHOD_NOT_FOUND: i64 = -32601;

/// Errors that can occur while talking to the node.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RpcError {
    /// The request never produced a usable JSON-RPC response.
    #[error("{method}: transport error: {reason}")]
    Transport { method: String, reason: String },

    /// The node answered with a JSON-RPC error object.
    #[error("{method}: node error {code}: {message}")]
    Protocol {
        method: String,
        code: i64,
        message: String,
    },

    /// The endpoint URL cannot be used to build requests.
    #[error("invalid RPC endpoint: {0}")]
    InvalidEndpoint(String),
}

impl RpcError {
    pub fn transport(method: &str, reason: impl Into<String>) -> Self {
        Self::Transport {
            method: method.to_string(),
            reason: reason.into(),
        }
    }

    pub fn protocol(method: &str, code: i64, message: impl Into<String>) -> Self {
        Self::Protocol {
            method: method.to_string(),
            code,
            message: message.into(),
        }
    }

    /// Whether this failure happened below the JSON-RPC layer.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }

    /// Node error code, when the node produced one.
    pub fn code(&self) -> Option<i64> {
        match self {
            Self::Protocol { code, .. } => Some(*code),
            _ => None,
        }
    }
}

/// Result type for RPC operations.
pub type RpcResult<T> = Result<T, RpcError>;

/// Request body sent to the node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcRequest {
    pub jsonrpc: String,
    pub id: u64,
    pub method: String,
    pub params: Vec<Value>,
}

impl RpcRequest {
    pub fn new(id: u64, method: &str, params: Vec<Value>) -> Self {
        Self {
            jsonrpc: "1.0".to_string(),
            id,
            method: method.to_string(),
            params,
        }
    }
}

/// Response envelope returned by the node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcResponse {
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<RpcErrorObject>,
    #[serde(default)]
    pub id: Option<Value>,
}

/// JSON-RPC error object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcErrorObject {
    pub code: i64,
    pub message: String,
}

/// Capability for issuing JSON-RPC calls against a node.
///
/// Implementations send exactly one request per call and never retry;
/// which calls are safe to repeat is decided by the caller.
#[async_trait]
pub trait NodeRpc: Send + Sync {
    async fn call(&self, method: &str, params: Vec<Value>) -> RpcResult<Value>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_shape() {
        let request = RpcRequest::new(7, "getblockhash", vec![json!(100)]);
        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(
            body,
            json!({"jsonrpc": "1.0", "id": 7, "method": "getblockhash", "params": [100]})
        );
    }

    #[test]
    fn test_error_display_names_method() {
        let err = RpcError::protocol("invalidateblock", -5, "Block not found");
        assert_eq!(err.to_string(), "invalidateblock: node error -5: Block not found");
        assert_eq!(err.code(), Some(-5));
        assert!(!err.is_transport());

        let err = RpcError::transport("getrawmempool", "connection refused");
        assert!(err.is_transport());
        assert_eq!(err.code(), None);
    }

    #[test]
    fn test_response_with_null_error() {
        let response: RpcResponse =
            serde_json::from_str(r#"{"result":["a","b"],"error":null,"id":1}"#).unwrap();
        assert!(response.error.is_none());
        assert_eq!(response.result, Some(json!(["a", "b"])));
    }
}
