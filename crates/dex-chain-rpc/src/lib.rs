use alloy_primitives::{Address, B256, Bytes, U256};
use async_trait::async_trait;
use dex_chain_client::{ProviderError, TxReceipt, WalletProvider};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::{debug, warn};

pub const DEFAULT_RPC_URL: &str = "http://localhost:8545";
pub const DEFAULT_RECEIPT_POLL: Duration = Duration::from_millis(1000);

const USER_REJECTED_CODE: i64 = 4001;
const METHOD_NOT_FOUND_CODE: i64 = -32601;

/// Wallet provider over Ethereum JSON-RPC (HTTP).
///
/// Reads `SIMPLE_DEX_RPC_URL` from environment at construction time
/// (default: `http://localhost:8545`). Transactions are signed by the node or
/// wallet behind the endpoint via `eth_sendTransaction`.
pub struct JsonRpcProvider {
    endpoint: String,
    http: reqwest::Client,
    next_id: AtomicU64,
    poll_interval: Duration,
}

impl Default for JsonRpcProvider {
    fn default() -> Self {
        Self::new(None)
    }
}

impl JsonRpcProvider {
    pub fn new(endpoint: Option<String>) -> Self {
        let endpoint = endpoint
            .or_else(|| std::env::var("SIMPLE_DEX_RPC_URL").ok())
            .unwrap_or_else(|| DEFAULT_RPC_URL.to_string());
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
            next_id: AtomicU64::new(1),
            poll_interval: DEFAULT_RECEIPT_POLL,
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn request(&self, method: &str, params: Value) -> Result<Value, ProviderError> {
        let body = RpcRequest {
            jsonrpc: "2.0",
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            method,
            params,
        };

        let response = self
            .http
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|err| ProviderError::Transport(format!("{method}: {err}")))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ProviderError::Transport(format!(
                "{method}: HTTP {status}: {text}"
            )));
        }

        let envelope: RpcResponse = response
            .json()
            .await
            .map_err(|err| ProviderError::Decode(format!("{method}: {err}")))?;

        if let Some(error) = envelope.error {
            return Err(map_rpc_error(method, error));
        }

        Ok(envelope.result.unwrap_or(Value::Null))
    }
}

// ── JSON-RPC envelope types ──

#[derive(Debug, Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: Value,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    #[serde(default)]
    message: String,
}

fn map_rpc_error(method: &str, error: RpcErrorObject) -> ProviderError {
    let lowered = error.message.to_lowercase();
    if error.code == USER_REJECTED_CODE
        || lowered.contains("user rejected")
        || lowered.contains("user denied")
    {
        return ProviderError::UserRejected;
    }
    if error.code == METHOD_NOT_FOUND_CODE {
        return ProviderError::MethodNotFound(method.to_owned());
    }
    ProviderError::Rpc {
        code: error.code,
        message: error.message,
    }
}

fn as_str<'a>(value: &'a Value, what: &str) -> Result<&'a str, ProviderError> {
    value
        .as_str()
        .ok_or_else(|| ProviderError::Decode(format!("{what}: expected hex string, got {value}")))
}

fn strip_hex(raw: &str) -> &str {
    raw.strip_prefix("0x").unwrap_or(raw)
}

fn parse_quantity(value: &Value, what: &str) -> Result<U256, ProviderError> {
    let digits = strip_hex(as_str(value, what)?);
    if digits.is_empty() {
        return Ok(U256::ZERO);
    }
    U256::from_str_radix(digits, 16)
        .map_err(|err| ProviderError::Decode(format!("{what}: {err}")))
}

fn parse_u64(value: &Value, what: &str) -> Result<u64, ProviderError> {
    let digits = strip_hex(as_str(value, what)?);
    if digits.is_empty() {
        return Ok(0);
    }
    u64::from_str_radix(digits, 16).map_err(|err| ProviderError::Decode(format!("{what}: {err}")))
}

fn parse_receipt(tx_hash: B256, value: &Value) -> Result<TxReceipt, ProviderError> {
    let block_number = parse_u64(&value["blockNumber"], "receipt.blockNumber")?;
    // Pre-Byzantium receipts carry no status field.
    let status = match value.get("status") {
        Some(Value::Null) | None => true,
        Some(raw) => parse_u64(raw, "receipt.status")? == 1,
    };
    Ok(TxReceipt {
        tx_hash,
        block_number,
        status,
    })
}

#[async_trait]
impl WalletProvider for JsonRpcProvider {
    async fn request_accounts(&self) -> Result<Vec<Address>, ProviderError> {
        let raw = match self.request("eth_requestAccounts", json!([])).await {
            Ok(raw) => raw,
            Err(ProviderError::MethodNotFound(_)) => {
                debug!("eth_requestAccounts unsupported, falling back to eth_accounts");
                self.request("eth_accounts", json!([])).await?
            }
            Err(err) => return Err(err),
        };

        let Value::Array(entries) = raw else {
            return Err(ProviderError::Decode(format!(
                "eth_requestAccounts: expected array, got {raw}"
            )));
        };

        entries
            .iter()
            .map(|entry| {
                as_str(entry, "account")?
                    .parse::<Address>()
                    .map_err(|err| ProviderError::Decode(format!("account: {err}")))
            })
            .collect()
    }

    async fn chain_id(&self) -> Result<u64, ProviderError> {
        let raw = self.request("eth_chainId", json!([])).await?;
        parse_u64(&raw, "eth_chainId")
    }

    async fn get_balance(&self, account: Address) -> Result<U256, ProviderError> {
        let raw = self
            .request("eth_getBalance", json!([account, "latest"]))
            .await?;
        parse_quantity(&raw, "eth_getBalance")
    }

    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes, ProviderError> {
        let raw = self
            .request("eth_call", json!([{ "to": to, "data": data }, "latest"]))
            .await?;
        as_str(&raw, "eth_call")?
            .parse::<Bytes>()
            .map_err(|err| ProviderError::Decode(format!("eth_call: {err}")))
    }

    async fn send_transaction(
        &self,
        from: Address,
        to: Address,
        data: Bytes,
    ) -> Result<B256, ProviderError> {
        let raw = self
            .request(
                "eth_sendTransaction",
                json!([{ "from": from, "to": to, "data": data }]),
            )
            .await?;
        as_str(&raw, "eth_sendTransaction")?
            .parse::<B256>()
            .map_err(|err| ProviderError::Decode(format!("eth_sendTransaction: {err}")))
    }

    async fn wait_for_receipt(&self, tx_hash: B256) -> Result<TxReceipt, ProviderError> {
        loop {
            let raw = self
                .request("eth_getTransactionReceipt", json!([tx_hash]))
                .await?;
            if raw.is_null() {
                tokio::time::sleep(self.poll_interval).await;
                continue;
            }
            let receipt = parse_receipt(tx_hash, &raw)?;
            if !receipt.status {
                warn!("transaction {tx_hash} mined in block {} but reverted", receipt.block_number);
            }
            return Ok(receipt);
        }
    }
}
