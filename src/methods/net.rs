use serde_json::Value;
use tracing::debug;

use crate::error::RpcError;
use crate::ledger::client::LedgerClient;

/// Handler for net_version
/// Returns the ledger's network version unchanged.
pub async fn version(client: &dyn LedgerClient) -> Result<Value, RpcError> {
    let version = client
        .net_version()
        .await
        .map_err(|e| RpcError::collaborator("get net version", e))?;
    debug!("net_version -> {}", version);
    Ok(Value::String(version))
}

/// Handler for net_listening
pub async fn listening() -> Result<Value, RpcError> {
    Ok(Value::Bool(true))
}

/// Handler for net_peerCount
/// The only peer is the ledger gateway.
pub async fn peer_count() -> Result<Value, RpcError> {
    Ok(Value::String("0x1".to_string()))
}
