//! Error kinds surfaced by the adapter.
//!
//! Everything a handler can fail with is a variant of [`RpcError`]. The
//! dispatcher decides at the boundary whether an error rejects the request
//! outright (malformed envelope, unknown method) or is reported inside a
//! JSON-RPC error object.

use thiserror::Error;

/// Failure to read a typed record out of a Dynamic Ledger Value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("expected Map value")]
    ExpectedMap,

    #[error("invalid {field} field: expected {expected}, found {found}")]
    InvalidField {
        field: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("missing {field} field")]
    MissingField { field: String },

    #[error("{field} field does not fit in 64 bits")]
    Overflow { field: String },
}

/// Failure to read the block height out of a tip certificate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CertificateError {
    #[error("failed to read byte: certificate ended before the height was terminated")]
    UnexpectedEof,

    #[error("ULEB128 encoding is too large")]
    Overflow,
}

#[derive(Debug, Error)]
pub enum RpcError {
    #[error("failed to decode request: {0}")]
    Parse(#[source] serde_json::Error),

    #[error("empty request array")]
    EmptyBatch,

    #[error("unsupported method: {method}")]
    MethodNotFound { method: String },

    #[error("invalid params for {method}: {reason}")]
    InvalidParams { method: &'static str, reason: String },

    #[error("failed to decode ledger value: {0}")]
    Decode(#[from] DecodeError),

    #[error("failed to decode tip certificate: {0}")]
    Certificate(#[from] CertificateError),

    #[error("failed to decode address: {0}")]
    AddressDecode(String),

    #[error("failed to parse amount: {0}")]
    AmountParse(String),

    #[error("fromBlock ({from}) is greater than toBlock ({to})")]
    Range { from: u64, to: u64 },

    #[error("{0}")]
    NotFound(String),

    #[error("failed to encode result: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("failed to {operation}: {source}")]
    Collaborator {
        operation: &'static str,
        #[source]
        source: anyhow::Error,
    },
}

impl RpcError {
    pub fn invalid_params(method: &'static str, reason: impl Into<String>) -> Self {
        RpcError::InvalidParams {
            method,
            reason: reason.into(),
        }
    }

    pub fn collaborator(operation: &'static str, source: anyhow::Error) -> Self {
        RpcError::Collaborator { operation, source }
    }

    /// Envelope-level failures reject the HTTP request instead of producing a
    /// JSON-RPC error object.
    pub fn is_envelope_error(&self) -> bool {
        matches!(
            self,
            RpcError::Parse(_) | RpcError::EmptyBatch | RpcError::MethodNotFound { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_errors() {
        assert!(RpcError::EmptyBatch.is_envelope_error());
        assert!(RpcError::MethodNotFound {
            method: "eth_foo".to_string()
        }
        .is_envelope_error());
        assert!(!RpcError::Range { from: 2, to: 1 }.is_envelope_error());
        assert!(!RpcError::NotFound("block not found".to_string()).is_envelope_error());
    }

    #[test]
    fn test_messages_carry_context() {
        let err = RpcError::MethodNotFound {
            method: "eth_foo".to_string(),
        };
        assert!(err.to_string().contains("eth_foo"));

        let err = RpcError::Range { from: 5, to: 3 };
        assert_eq!(err.to_string(), "fromBlock (5) is greater than toBlock (3)");

        let err: RpcError = DecodeError::InvalidField {
            field: "hash".to_string(),
            expected: "Blob",
            found: "Text",
        }
        .into();
        assert!(err.to_string().contains("hash"));
    }
}
