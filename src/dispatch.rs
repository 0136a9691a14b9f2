//! JSON-RPC envelope handling and method routing.

use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error};

use crate::error::RpcError;
use crate::ledger::client::LedgerClient;
use crate::methods::params::{
    BlockByHashParams, BlockByNumberParams, BurnRequest, LogFilter, MintRequest, Sha3Params,
};
use crate::methods::{dex, eth, net, web3};

/// Code carried by every JSON-RPC error object this adapter emits.
pub const ERROR_CODE: i32 = 1;

pub const DEFAULT_LOGS_BATCH_SIZE: u64 = 10;

#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcRequest {
    #[serde(default)]
    pub jsonrpc: String,
    #[serde(default)]
    pub method: String,
    #[serde(default)]
    pub params: Value,
    #[serde(default)]
    pub id: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
    pub id: Value,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
}

impl JsonRpcResponse {
    pub fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            result: Some(result),
            error: None,
            id,
        }
    }

    pub fn failure(id: Value, err: &RpcError) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            result: None,
            error: Some(JsonRpcError {
                code: ERROR_CODE,
                message: err.to_string(),
            }),
            id,
        }
    }
}

/// What goes back on the wire: a bare response object, or the same object
/// wrapped in a one-element array for methods configured that way.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Reply {
    Single(JsonRpcResponse),
    Wrapped(Vec<JsonRpcResponse>),
}

/// Every method the adapter serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RpcMethod {
    ChainId,
    NetVersion,
    GetBlockByNumber,
    GetBlockByHash,
    GetLogs,
    BlockNumber,
    Accounts,
    ClientVersion,
    Sha3,
    NetListening,
    NetPeerCount,
    GetCurrencyPairs,
    MintTokens,
    BurnTokens,
}

impl RpcMethod {
    pub const ALL: [RpcMethod; 14] = [
        RpcMethod::ChainId,
        RpcMethod::NetVersion,
        RpcMethod::GetBlockByNumber,
        RpcMethod::GetBlockByHash,
        RpcMethod::GetLogs,
        RpcMethod::BlockNumber,
        RpcMethod::Accounts,
        RpcMethod::ClientVersion,
        RpcMethod::Sha3,
        RpcMethod::NetListening,
        RpcMethod::NetPeerCount,
        RpcMethod::GetCurrencyPairs,
        RpcMethod::MintTokens,
        RpcMethod::BurnTokens,
    ];

    pub fn name(self) -> &'static str {
        match self {
            RpcMethod::ChainId => "eth_chainId",
            RpcMethod::NetVersion => "net_version",
            RpcMethod::GetBlockByNumber => "eth_getBlockByNumber",
            RpcMethod::GetBlockByHash => "eth_getBlockByHash",
            RpcMethod::GetLogs => "eth_getLogs",
            RpcMethod::BlockNumber => "eth_blockNumber",
            RpcMethod::Accounts => "eth_accounts",
            RpcMethod::ClientVersion => "web3_clientVersion",
            RpcMethod::Sha3 => "web3_sha3",
            RpcMethod::NetListening => "net_listening",
            RpcMethod::NetPeerCount => "net_peerCount",
            RpcMethod::GetCurrencyPairs => "eth_getCurrencyPairs",
            RpcMethod::MintTokens => "eth_mintTokens",
            RpcMethod::BurnTokens => "eth_burnTokens",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.name() == name)
    }
}

/// Dispatcher settings that are not part of the ledger client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchOptions {
    pub array_response_methods: HashSet<RpcMethod>,
    pub logs_batch_size: u64,
}

impl Default for DispatchOptions {
    fn default() -> Self {
        Self {
            array_response_methods: HashSet::from([RpcMethod::NetVersion]),
            logs_batch_size: DEFAULT_LOGS_BATCH_SIZE,
        }
    }
}

/// Routes one JSON-RPC request to its handler.
///
/// Holds no per-request state; the ledger client is shared read-only by all
/// requests.
#[derive(Clone)]
pub struct Dispatcher {
    client: Arc<dyn LedgerClient>,
    options: DispatchOptions,
}

impl Dispatcher {
    pub fn new(client: Arc<dyn LedgerClient>, options: DispatchOptions) -> Self {
        Self { client, options }
    }

    /// Handle a raw request body.
    ///
    /// `Err` means the request was rejected before any method ran (bad
    /// envelope or unknown method). Handler failures come back as `Ok` with
    /// a JSON-RPC error object inside.
    pub async fn handle_body(&self, body: &[u8]) -> Result<Reply, RpcError> {
        let request = parse_envelope(body)?;
        let method = RpcMethod::from_name(&request.method).ok_or_else(|| {
            RpcError::MethodNotFound {
                method: request.method.clone(),
            }
        })?;

        debug!("Dispatching {} (id={})", method.name(), request.id);

        let response = match self.call(method, &request.params).await {
            Ok(result) => JsonRpcResponse::success(request.id, result),
            Err(e) => {
                error!("error with method {}: {}", method.name(), e);
                return Ok(Reply::Single(JsonRpcResponse::failure(request.id, &e)));
            }
        };

        if self.options.array_response_methods.contains(&method) {
            Ok(Reply::Wrapped(vec![response]))
        } else {
            Ok(Reply::Single(response))
        }
    }

    async fn call(&self, method: RpcMethod, params: &Value) -> Result<Value, RpcError> {
        let client = self.client.as_ref();
        match method {
            RpcMethod::ChainId => eth::chain_id(client).await,
            RpcMethod::NetVersion => net::version(client).await,
            RpcMethod::GetBlockByNumber => {
                eth::get_block_by_number(client, BlockByNumberParams::parse(params)?).await
            }
            RpcMethod::GetBlockByHash => {
                eth::get_block_by_hash(client, BlockByHashParams::parse(params)?).await
            }
            RpcMethod::GetLogs => {
                eth::get_logs(client, LogFilter::parse(params)?, self.options.logs_batch_size).await
            }
            RpcMethod::BlockNumber => eth::block_number(client).await,
            RpcMethod::Accounts => eth::accounts().await,
            RpcMethod::ClientVersion => web3::client_version().await,
            RpcMethod::Sha3 => web3::sha3(Sha3Params::parse(params)?).await,
            RpcMethod::NetListening => net::listening().await,
            RpcMethod::NetPeerCount => net::peer_count().await,
            RpcMethod::GetCurrencyPairs => dex::get_currency_pairs(client).await,
            RpcMethod::MintTokens => dex::mint_tokens(client, MintRequest::parse(params)?).await,
            RpcMethod::BurnTokens => dex::burn_tokens(client, BurnRequest::parse(params)?).await,
        }
    }
}

/// Read a single request object, or the first element of a request array.
/// Later array elements are ignored.
fn parse_envelope(body: &[u8]) -> Result<JsonRpcRequest, RpcError> {
    let request = match serde_json::from_slice::<Value>(body).map_err(RpcError::Parse)? {
        Value::Array(batch) => batch.into_iter().next().ok_or(RpcError::EmptyBatch)?,
        object @ Value::Object(_) => object,
        other => {
            return Err(RpcError::Parse(serde::de::Error::custom(format!(
                "expected a request object or array, found {}",
                other
            ))))
        }
    };
    serde_json::from_value(request).map_err(RpcError::Parse)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::mock::MockLedgerClient;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn dispatcher() -> Dispatcher {
        Dispatcher::new(
            Arc::new(MockLedgerClient::with_blocks(3)),
            DispatchOptions::default(),
        )
    }

    async fn reply_json(dispatcher: &Dispatcher, body: Value) -> Value {
        let reply = dispatcher
            .handle_body(body.to_string().as_bytes())
            .await
            .unwrap();
        serde_json::to_value(reply).unwrap()
    }

    #[test]
    fn test_method_names_round_trip() {
        for method in RpcMethod::ALL {
            assert_eq!(RpcMethod::from_name(method.name()), Some(method));
        }
        assert_eq!(RpcMethod::from_name("eth_sendRawTransaction"), None);
    }

    #[tokio::test]
    async fn test_array_request_services_first_element_only() {
        let reply = reply_json(
            &dispatcher(),
            json!([
                {"jsonrpc": "2.0", "id": 1, "method": "eth_chainId"},
                {"jsonrpc": "2.0", "id": 2, "method": "net_version"}
            ]),
        )
        .await;

        assert_eq!(reply, json!({"jsonrpc": "2.0", "id": 1, "result": "0x7a69"}));
    }

    #[tokio::test]
    async fn test_array_tail_is_not_validated() {
        let reply = reply_json(
            &dispatcher(),
            json!([{"jsonrpc": "2.0", "id": 1, "method": "net_listening"}, 42]),
        )
        .await;
        assert_eq!(reply["result"], json!(true));
    }

    #[tokio::test]
    async fn test_net_version_is_wrapped() {
        let reply = reply_json(
            &dispatcher(),
            json!({"jsonrpc": "2.0", "id": 7, "method": "net_version"}),
        )
        .await;
        assert_eq!(reply, json!([{"jsonrpc": "2.0", "id": 7, "result": "1"}]));

        let reply = reply_json(
            &dispatcher(),
            json!({"jsonrpc": "2.0", "id": 8, "method": "eth_chainId"}),
        )
        .await;
        assert!(reply.is_object());
    }

    #[tokio::test]
    async fn test_wrapping_is_configurable() {
        let options = DispatchOptions {
            array_response_methods: HashSet::from([RpcMethod::ChainId]),
            ..Default::default()
        };
        let dispatcher = Dispatcher::new(Arc::new(MockLedgerClient::with_blocks(1)), options);

        let reply = reply_json(&dispatcher, json!({"id": 1, "method": "eth_chainId"})).await;
        assert!(reply.is_array());
        let reply = reply_json(&dispatcher, json!({"id": 2, "method": "net_version"})).await;
        assert!(reply.is_object());
    }

    #[tokio::test]
    async fn test_unknown_method_is_rejected() {
        let err = dispatcher()
            .handle_body(br#"{"jsonrpc":"2.0","id":1,"method":"eth_sendTransaction"}"#)
            .await
            .unwrap_err();
        assert!(err.is_envelope_error());
        assert!(err.to_string().contains("eth_sendTransaction"));
    }

    #[tokio::test]
    async fn test_malformed_envelopes() {
        let dispatcher = dispatcher();

        let err = dispatcher.handle_body(b"not json").await.unwrap_err();
        assert!(matches!(err, RpcError::Parse(_)));

        let err = dispatcher.handle_body(b"[]").await.unwrap_err();
        assert!(matches!(err, RpcError::EmptyBatch));

        let err = dispatcher.handle_body(b"[42]").await.unwrap_err();
        assert!(matches!(err, RpcError::Parse(_)));

        let err = dispatcher.handle_body(b"\"eth_chainId\"").await.unwrap_err();
        assert!(matches!(err, RpcError::Parse(_)));
    }

    #[tokio::test]
    async fn test_handler_error_uses_code_one() {
        let reply = reply_json(
            &dispatcher(),
            json!({"jsonrpc": "2.0", "id": "abc", "method": "eth_getLogs",
                   "params": [{"fromBlock": "0x2", "toBlock": "0x1"}]}),
        )
        .await;

        assert_eq!(
            reply,
            json!({
                "jsonrpc": "2.0",
                "id": "abc",
                "error": {"code": 1, "message": "fromBlock (2) is greater than toBlock (1)"}
            })
        );
    }

    #[tokio::test]
    async fn test_invalid_params_use_code_one() {
        let reply = reply_json(
            &dispatcher(),
            json!({"id": 3, "method": "eth_getBlockByNumber", "params": []}),
        )
        .await;
        assert_eq!(reply["error"]["code"], json!(1));
        assert!(reply["error"]["message"]
            .as_str()
            .unwrap()
            .contains("eth_getBlockByNumber"));
    }

    #[tokio::test]
    async fn test_errors_are_never_wrapped() {
        let mut client = MockLedgerClient::with_blocks(1);
        client.unavailable = true;
        let dispatcher = Dispatcher::new(Arc::new(client), DispatchOptions::default());

        let reply = reply_json(&dispatcher, json!({"id": 1, "method": "net_version"})).await;
        assert!(reply.is_object());
        assert_eq!(reply["error"]["code"], json!(1));
    }
}
