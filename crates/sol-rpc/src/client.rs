//! Solana JSON-RPC client
//!
//! Talks JSON-RPC 2.0 over HTTP to a Solana RPC node (a Helius devnet
//! endpoint by default). Only the handful of methods the token page needs
//! are implemented.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use chain_sol::Signature;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::commitment::{CommitmentLevel, SignatureStatus};
use crate::connection::{Connection, LatestBlockhash};
use crate::error::RpcError;

static REQUEST_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Clone)]
pub struct RpcClient {
    rpc_endpoint: String,
    commitment: CommitmentLevel,
    client: Client,
}

/// JSON-RPC 2.0 request
#[derive(Debug, Serialize)]
struct JsonRpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: serde_json::Value,
}

/// JSON-RPC 2.0 response
#[derive(Debug, Deserialize)]
struct JsonRpcResponse {
    result: Option<serde_json::Value>,
    error: Option<JsonRpcError>,
}

#[derive(Debug, Deserialize)]
struct JsonRpcError {
    code: i64,
    message: String,
}

/// The `{ context, value }` envelope most Solana methods return.
#[derive(Debug, Deserialize)]
struct WithContext<T> {
    value: T,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RpcBlockhash {
    blockhash: String,
    last_valid_block_height: u64,
}

impl RpcClient {
    pub fn new(endpoint: impl Into<String>, commitment: CommitmentLevel) -> Result<Self, RpcError> {
        let rpc_endpoint = endpoint.into();

        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        log::info!("Solana RPC client initialized: {}", redact_api_key(&rpc_endpoint));

        Ok(Self {
            rpc_endpoint,
            commitment,
            client,
        })
    }

    pub fn commitment(&self) -> CommitmentLevel {
        self.commitment
    }

    /// Send a JSON-RPC 2.0 request and return the result
    async fn rpc_call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<T, RpcError> {
        let request = JsonRpcRequest {
            jsonrpc: "2.0",
            id: REQUEST_ID.fetch_add(1, Ordering::Relaxed),
            method,
            params,
        };

        log::debug!("→ RPC {}: {}", method, request.params);

        let response = self
            .client
            .post(&self.rpc_endpoint)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(RpcError::http(response.status().as_u16()));
        }

        let body: JsonRpcResponse = response.json().await.map_err(|e| {
            RpcError::InvalidResponse(format!(
                "Failed to parse JSON-RPC response: {}",
                e.without_url()
            ))
        })?;

        parse_result(body)
    }
}

#[async_trait]
impl Connection for RpcClient {
    async fn get_latest_blockhash(&self) -> Result<LatestBlockhash, RpcError> {
        let response: WithContext<RpcBlockhash> = self
            .rpc_call(
                "getLatestBlockhash",
                serde_json::json!([{ "commitment": self.commitment }]),
            )
            .await?;

        Ok(LatestBlockhash {
            blockhash: decode_blockhash(&response.value.blockhash)?,
            last_valid_block_height: response.value.last_valid_block_height,
        })
    }

    async fn get_minimum_balance_for_rent_exemption(&self, data_len: u64) -> Result<u64, RpcError> {
        self.rpc_call(
            "getMinimumBalanceForRentExemption",
            serde_json::json!([data_len]),
        )
        .await
    }

    async fn send_transaction(&self, wire: &[u8]) -> Result<Signature, RpcError> {
        let encoded = general_purpose::STANDARD.encode(wire);
        let signature: String = self
            .rpc_call(
                "sendTransaction",
                serde_json::json!([
                    encoded,
                    {
                        "encoding": "base64",
                        "skipPreflight": false,
                        "preflightCommitment": self.commitment,
                    }
                ]),
            )
            .await?;

        decode_signature(&signature)
    }

    async fn get_signature_status(
        &self,
        signature: &Signature,
    ) -> Result<Option<SignatureStatus>, RpcError> {
        let response: WithContext<Vec<Option<SignatureStatus>>> = self
            .rpc_call(
                "getSignatureStatuses",
                serde_json::json!([[signature.to_string()], { "searchTransactionHistory": false }]),
            )
            .await?;

        Ok(response.value.into_iter().next().flatten())
    }
}

fn parse_result<T: DeserializeOwned>(body: JsonRpcResponse) -> Result<T, RpcError> {
    if let Some(error) = body.error {
        return Err(RpcError::Rpc(error.code, error.message));
    }

    let result = body
        .result
        .ok_or_else(|| RpcError::InvalidResponse("No result in JSON-RPC response".into()))?;

    Ok(serde_json::from_value(result)?)
}

fn decode_blockhash(encoded: &str) -> Result<[u8; 32], RpcError> {
    let bytes = bs58::decode(encoded)
        .into_vec()
        .map_err(|e| RpcError::InvalidResponse(format!("blockhash is not base58: {e}")))?;
    bytes
        .try_into()
        .map_err(|v: Vec<u8>| RpcError::InvalidResponse(format!("blockhash is {} bytes", v.len())))
}

fn decode_signature(encoded: &str) -> Result<Signature, RpcError> {
    let bytes = bs58::decode(encoded)
        .into_vec()
        .map_err(|e| RpcError::InvalidResponse(format!("signature is not base58: {e}")))?;
    let arr: [u8; 64] = bytes
        .try_into()
        .map_err(|v: Vec<u8>| RpcError::InvalidResponse(format!("signature is {} bytes", v.len())))?;
    Ok(Signature::new(arr))
}

/// Hide the `api-key` query value when logging an endpoint.
pub fn redact_api_key(endpoint: &str) -> String {
    match endpoint.find("api-key=") {
        Some(pos) => {
            let start = pos + "api-key=".len();
            let end = endpoint[start..]
                .find('&')
                .map_or(endpoint.len(), |i| start + i);
            if start == end {
                endpoint.to_string()
            } else {
                format!("{}***{}", &endpoint[..start], &endpoint[end..])
            }
        }
        None => endpoint.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(json: serde_json::Value) -> JsonRpcResponse {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn parse_result_returns_value() {
        let rent: u64 = parse_result(body(serde_json::json!({
            "jsonrpc": "2.0", "id": 1, "result": 1_461_600
        })))
        .unwrap();
        assert_eq!(rent, 1_461_600);
    }

    #[test]
    fn parse_result_surfaces_rpc_error() {
        let err = parse_result::<u64>(body(serde_json::json!({
            "jsonrpc": "2.0", "id": 1,
            "error": { "code": -32002, "message": "Transaction simulation failed" }
        })))
        .unwrap_err();
        assert!(matches!(err, RpcError::Rpc(-32002, _)));
    }

    #[test]
    fn parse_result_requires_result() {
        let err = parse_result::<u64>(body(serde_json::json!({ "jsonrpc": "2.0", "id": 1 })))
            .unwrap_err();
        assert!(matches!(err, RpcError::InvalidResponse(_)));
    }

    #[test]
    fn parse_latest_blockhash_envelope() {
        let parsed: WithContext<RpcBlockhash> = parse_result(body(serde_json::json!({
            "jsonrpc": "2.0", "id": 1,
            "result": {
                "context": { "slot": 2792 },
                "value": {
                    "blockhash": "EkSnNWid2cvwEVnVx9aBqawnmiCNiDgp3gUdkDPTKN1N",
                    "lastValidBlockHeight": 3090
                }
            }
        })))
        .unwrap();

        assert_eq!(parsed.value.last_valid_block_height, 3090);
        let hash = decode_blockhash(&parsed.value.blockhash).unwrap();
        assert_eq!(bs58::encode(hash).into_string(), parsed.value.blockhash);
    }

    #[test]
    fn parse_signature_statuses_with_null_entry() {
        let parsed: WithContext<Vec<Option<SignatureStatus>>> = parse_result(body(serde_json::json!({
            "jsonrpc": "2.0", "id": 1,
            "result": { "context": { "slot": 82 }, "value": [null] }
        })))
        .unwrap();
        assert_eq!(parsed.value, vec![None]);
    }

    #[test]
    fn decode_signature_roundtrip() {
        let sig = Signature::new([7u8; 64]);
        assert_eq!(decode_signature(&sig.to_string()).unwrap(), sig);
        assert!(decode_signature("abc").is_err());
    }

    #[test]
    fn decode_blockhash_rejects_wrong_length() {
        assert!(decode_blockhash("1").is_err());
    }

    #[tokio::test]
    async fn request_errors_do_not_carry_the_api_key() {
        // Nothing listens on port 1, so the request fails before any response.
        let client =
            RpcClient::new("http://127.0.0.1:1/?api-key=SECRETKEY", CommitmentLevel::Processed)
                .unwrap();

        let err = client.get_latest_blockhash().await.unwrap_err();
        assert!(matches!(err, RpcError::Request(_)));
        assert!(!err.to_string().contains("SECRETKEY"), "{err}");
        assert!(!format!("{err:?}").contains("SECRETKEY"), "{err:?}");
    }

    #[test]
    fn redacts_api_key() {
        assert_eq!(
            redact_api_key("https://devnet.helius-rpc.com/?api-key=secret"),
            "https://devnet.helius-rpc.com/?api-key=***"
        );
        assert_eq!(
            redact_api_key("https://x/?api-key=secret&foo=1"),
            "https://x/?api-key=***&foo=1"
        );
        assert_eq!(
            redact_api_key("https://devnet.helius-rpc.com/?api-key="),
            "https://devnet.helius-rpc.com/?api-key="
        );
        assert_eq!(redact_api_key("https://api.devnet.solana.com"), "https://api.devnet.solana.com");
    }
}
