use serde_json::Value;
use tracing::debug;

use super::params::Sha3Params;
use crate::emulator::hash::keccak_hex;
use crate::error::RpcError;

/// Handler for web3_clientVersion
pub async fn client_version() -> Result<Value, RpcError> {
    let version = format!("EVM-Adapter/v{}", env!("CARGO_PKG_VERSION"));
    debug!("web3_clientVersion -> {}", version);
    Ok(Value::String(version))
}

/// Handler for web3_sha3
/// Returns the Keccak-256 hash of the given data.
pub async fn sha3(params: Sha3Params) -> Result<Value, RpcError> {
    let result = keccak_hex(&params.data);
    debug!("web3_sha3: input_len={} -> {}", params.data.len(), result);
    Ok(Value::String(result))
}
