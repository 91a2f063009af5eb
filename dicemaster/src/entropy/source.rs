use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::EntropyError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockInfo {
    pub hash: String,
    pub height: String,
}

/// Where the entropy cache gets its slowly changing seed material from.
pub trait EntropySource: Send + Sync {
    fn fetch_latest_block(&self) -> Result<BlockInfo, EntropyError>;

    /// `false` for sources that can never produce a block; the cache then
    /// skips refreshing altogether.
    fn is_configured(&self) -> bool {
        true
    }
}

impl<S: EntropySource + ?Sized> EntropySource for Box<S> {
    fn fetch_latest_block(&self) -> Result<BlockInfo, EntropyError> {
        (**self).fetch_latest_block()
    }

    fn is_configured(&self) -> bool {
        (**self).is_configured()
    }
}

/// Used when no RPC endpoint is configured. The cache never polls it, so
/// rolls are seeded from the draw counter and the clock alone.
#[derive(Debug, Default, Clone, Copy)]
pub struct OfflineSource;

impl EntropySource for OfflineSource {
    fn fetch_latest_block(&self) -> Result<BlockInfo, EntropyError> {
        Err(EntropyError::NotConfigured)
    }

    fn is_configured(&self) -> bool {
        false
    }
}

/// Fetches the latest Ethereum block hash over JSON-RPC.
#[derive(Debug, Clone)]
pub struct EthRpcSource {
    client: reqwest::blocking::Client,
    url: String,
}

#[derive(Debug, Serialize)]
struct JsonRpcRequest<'a> {
    jsonrpc: &'a str,
    method: &'a str,
    params: (&'a str, bool),
    id: u32,
}

#[derive(Debug, Deserialize)]
struct JsonRpcResponse {
    #[serde(default)]
    result: Option<RpcBlock>,
    #[serde(default)]
    error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
struct RpcBlock {
    #[serde(default)]
    hash: Option<String>,
    #[serde(default)]
    number: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RpcError {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    message: String,
}

impl EthRpcSource {
    pub fn new(url: &str, timeout: Duration) -> Result<Self, EntropyError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            url: url.to_string(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl EntropySource for EthRpcSource {
    fn fetch_latest_block(&self) -> Result<BlockInfo, EntropyError> {
        let request = JsonRpcRequest {
            jsonrpc: "2.0",
            method: "eth_getBlockByNumber",
            // Transaction bodies are not needed, only the header hash.
            params: ("latest", false),
            id: 1,
        };

        let response = self.client.post(&self.url).json(&request).send()?;
        if !response.status().is_success() {
            return Err(EntropyError::Status(response.status().as_u16()));
        }

        let body = response.text()?;
        parse_block_response(&body)
    }
}

/// Pulls `result.hash` and `result.number` out of an `eth_getBlockByNumber`
/// response body.
pub fn parse_block_response(body: &str) -> Result<BlockInfo, EntropyError> {
    let response: JsonRpcResponse =
        serde_json::from_str(body).map_err(|e| EntropyError::MalformedResponse(e.to_string()))?;

    if let Some(error) = response.error {
        return Err(EntropyError::MalformedResponse(format!(
            "RPC error {}: {}",
            error.code, error.message
        )));
    }

    let block = response.result.ok_or(EntropyError::MissingField("result"))?;
    let hash = block.hash.ok_or(EntropyError::MissingField("hash"))?;
    let height = block.number.ok_or(EntropyError::MissingField("number"))?;

    Ok(BlockInfo { hash, height })
}
