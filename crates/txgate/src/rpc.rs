//! JSON-RPC network client.

use std::{str::FromStr, time::Instant};

use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64_STANDARD};
use serde::{Deserialize, de::DeserializeOwned};
use solana_hash::Hash;
use solana_pubkey::Pubkey;
use solana_transaction::versioned::VersionedTransaction;
use tokio::time::{sleep, timeout};

use crate::{
    config::{RpcClientConfig, duration_to_ms_u64},
    network::{
        Commitment, ConfirmationReport, NetworkClient, NetworkError, SimulationReport,
    },
};

/// [`NetworkClient`] backed by a Solana JSON-RPC endpoint.
#[derive(Debug, Clone)]
pub struct JsonRpcClient {
    /// HTTP client used for RPC calls.
    client: reqwest::Client,
    /// Endpoint and timing configuration.
    config: RpcClientConfig,
}

impl JsonRpcClient {
    /// Creates a JSON-RPC client.
    ///
    /// # Errors
    ///
    /// Returns [`NetworkError::Config`] when the configuration is invalid or HTTP client
    /// creation fails.
    pub fn new(config: RpcClientConfig) -> Result<Self, NetworkError> {
        config.validate().map_err(|error| NetworkError::Config {
            message: error.to_string(),
        })?;
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|error| NetworkError::Config {
                message: error.to_string(),
            })?;
        Ok(Self { client, config })
    }

    /// Issues one JSON-RPC request and unwraps its envelope.
    async fn call<T: DeserializeOwned>(
        &self,
        method: &'static str,
        params: serde_json::Value,
    ) -> Result<T, NetworkError> {
        let payload = serde_json::json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });
        let response = self
            .client
            .post(&self.config.rpc_url)
            .json(&payload)
            .send()
            .await
            .map_err(|error| NetworkError::Transport {
                method,
                message: error.to_string(),
            })?;
        let response = response
            .error_for_status()
            .map_err(|error| NetworkError::Transport {
                method,
                message: error.to_string(),
            })?;
        let parsed: JsonRpcResponse<T> =
            response
                .json()
                .await
                .map_err(|error| NetworkError::InvalidResponse {
                    method,
                    message: error.to_string(),
                })?;
        parsed.into_result(method)
    }

    /// Polls signature status until it reaches a terminal state.
    async fn poll_signature(
        &self,
        signature: &str,
        commitment: Commitment,
    ) -> Result<ConfirmationReport, NetworkError> {
        loop {
            let statuses: RpcContextual<Vec<Option<RpcSignatureStatus>>> = self
                .call("getSignatureStatuses", signature_status_params(signature))
                .await?;
            let status = statuses.value.into_iter().next().flatten();
            if let Some(report) = evaluate_status(status.as_ref(), commitment) {
                return Ok(report);
            }
            sleep(self.config.poll_interval).await;
        }
    }
}

/// JSON-RPC envelope.
#[derive(Debug, Deserialize)]
struct JsonRpcResponse<T> {
    /// Result value for successful calls.
    result: Option<T>,
    /// Error payload for failed calls.
    error: Option<JsonRpcError>,
}

impl<T> JsonRpcResponse<T> {
    /// Returns the result, or the error object mapped to [`NetworkError`].
    fn into_result(self, method: &'static str) -> Result<T, NetworkError> {
        if let Some(result) = self.result {
            return Ok(result);
        }
        if let Some(error) = self.error {
            return Err(NetworkError::Rpc {
                method,
                code: error.code,
                message: error.message,
            });
        }
        Err(NetworkError::InvalidResponse {
            method,
            message: "rpc returned neither result nor error".to_owned(),
        })
    }
}

/// JSON-RPC error object.
#[derive(Debug, Deserialize)]
struct JsonRpcError {
    /// JSON-RPC error code.
    code: i64,
    /// Human-readable message.
    message: String,
}

/// `{ context, value }` wrapper used by most account/state methods.
#[derive(Debug, Deserialize)]
struct RpcContextual<T> {
    /// Method payload.
    value: T,
}

/// `getLatestBlockhash` payload.
#[derive(Debug, Deserialize)]
struct RpcBlockhash {
    /// Base58 blockhash.
    blockhash: String,
}

/// `simulateTransaction` payload.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RpcSimulation {
    /// Structured execution error.
    err: Option<serde_json::Value>,
    /// Program logs.
    logs: Option<Vec<String>>,
    /// Consumed compute units.
    units_consumed: Option<u64>,
}

/// One `getSignatureStatuses` entry.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RpcSignatureStatus {
    /// Confirmation count, `None` once rooted.
    confirmations: Option<u64>,
    /// Structured execution error.
    err: Option<serde_json::Value>,
    /// Commitment reached so far.
    confirmation_status: Option<Commitment>,
}

/// Returns a terminal report once `status` failed or reached `commitment`.
fn evaluate_status(
    status: Option<&RpcSignatureStatus>,
    commitment: Commitment,
) -> Option<ConfirmationReport> {
    let status = status?;
    if let Some(error) = &status.err {
        return Some(ConfirmationReport {
            error: Some(error.clone()),
        });
    }
    // Older nodes omit confirmationStatus; a null confirmation count means rooted.
    let reached = status.confirmation_status.or_else(|| {
        status
            .confirmations
            .is_none()
            .then_some(Commitment::Finalized)
    })?;
    reached
        .satisfies(commitment)
        .then(ConfirmationReport::default)
}

/// Bincode-encodes and base64-wraps a signed transaction.
fn encode_transaction(tx: &VersionedTransaction) -> Result<String, NetworkError> {
    let bytes = bincode::serialize(tx).map_err(|error| NetworkError::Encode {
        message: error.to_string(),
    })?;
    Ok(BASE64_STANDARD.encode(bytes))
}

/// `getBalance` params.
fn balance_params(pubkey: &Pubkey, commitment: Commitment) -> serde_json::Value {
    serde_json::json!([pubkey.to_string(), { "commitment": commitment.as_str() }])
}

/// `getLatestBlockhash` params.
fn blockhash_params(commitment: Commitment) -> serde_json::Value {
    serde_json::json!([{ "commitment": commitment.as_str() }])
}

/// `simulateTransaction` params; signatures are verified against the live cluster.
fn simulate_params(encoded_tx: &str, commitment: Commitment) -> serde_json::Value {
    serde_json::json!([
        encoded_tx,
        {
            "encoding": "base64",
            "sigVerify": true,
            "commitment": commitment.as_str(),
        }
    ])
}

/// `sendTransaction` params.
fn send_params(encoded_tx: &str, commitment: Commitment) -> serde_json::Value {
    // Preflight already ran as an explicit simulation.
    serde_json::json!([
        encoded_tx,
        {
            "encoding": "base64",
            "skipPreflight": true,
            "preflightCommitment": commitment.as_str(),
        }
    ])
}

/// `getSignatureStatuses` params for one signature.
fn signature_status_params(signature: &str) -> serde_json::Value {
    serde_json::json!([[signature], { "searchTransactionHistory": false }])
}

/// Parses a base58 blockhash returned by `getLatestBlockhash`.
fn parse_blockhash(raw: &str) -> Result<Hash, NetworkError> {
    Hash::from_str(raw).map_err(|error| NetworkError::InvalidResponse {
        method: "getLatestBlockhash",
        message: format!("blockhash `{raw}`: {error}"),
    })
}

#[async_trait]
impl NetworkClient for JsonRpcClient {
    async fn get_balance(&self, pubkey: &Pubkey) -> Result<u64, NetworkError> {
        let balance: RpcContextual<u64> = self
            .call("getBalance", balance_params(pubkey, self.config.commitment))
            .await?;
        Ok(balance.value)
    }

    async fn latest_blockhash(&self) -> Result<Hash, NetworkError> {
        let latest: RpcContextual<RpcBlockhash> = self
            .call("getLatestBlockhash", blockhash_params(self.config.commitment))
            .await?;
        parse_blockhash(&latest.value.blockhash)
    }

    async fn simulate(&self, tx: &VersionedTransaction) -> Result<SimulationReport, NetworkError> {
        let encoded_tx = encode_transaction(tx)?;
        let simulation: RpcContextual<RpcSimulation> = self
            .call(
                "simulateTransaction",
                simulate_params(&encoded_tx, self.config.commitment),
            )
            .await?;
        Ok(SimulationReport {
            error: simulation.value.err,
            logs: simulation.value.logs.unwrap_or_default(),
            units_consumed: simulation.value.units_consumed,
        })
    }

    async fn send_raw(&self, tx_bytes: &[u8]) -> Result<String, NetworkError> {
        let encoded_tx = BASE64_STANDARD.encode(tx_bytes);
        self.call(
            "sendTransaction",
            send_params(&encoded_tx, self.config.commitment),
        )
        .await
    }

    async fn confirm(
        &self,
        signature: &str,
        commitment: Commitment,
    ) -> Result<ConfirmationReport, NetworkError> {
        let started = Instant::now();
        timeout(
            self.config.confirm_timeout,
            self.poll_signature(signature, commitment),
        )
        .await
        .map_err(|_elapsed| NetworkError::Timeout {
            method: "getSignatureStatuses",
            waited_ms: duration_to_ms_u64(started.elapsed()),
        })?
    }
}
