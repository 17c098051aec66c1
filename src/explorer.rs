// src/explorer.rs
//
// Etherscan-compatible account API client. One bounded request per endpoint;
// the caller gets fully materialized lists (retry and pagination policy stay
// with the operator, not this layer).
use eyre::{eyre, Result};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

use crate::config::Config;
use crate::models::{Erc20Transfer, InternalTx, NftTransfer, NftTransferFields, NormalTx};

#[derive(Debug, Error)]
pub enum ExplorerError {
    #[error("explorer rejected the request: {0}")]
    Api(String),
}

/// Every explorer response wraps its payload in this envelope. `result` is
/// a list for the account actions and a bare string for `balance`.
#[derive(Debug, Deserialize)]
struct Envelope {
    status: String,
    message: String,
    result: serde_json::Value,
}

pub fn http_client(cfg: &Config) -> Result<Client> {
    let client = Client::builder()
        .timeout(Duration::from_secs(cfg.request_timeout_secs))
        .build()?;
    Ok(client)
}

async fn account_action(
    client: &Client,
    cfg: &Config,
    action: &str,
    address: &str,
) -> Result<Envelope> {
    info!("📡 {} → {} ({})", action, cfg.explorer_url, address);

    let resp = client
        .get(&cfg.explorer_url)
        .query(&[
            ("module", "account"),
            ("action", action),
            ("address", address),
            ("startblock", "0"),
            ("endblock", "99999999"),
            ("page", "1"),
            ("offset", "10000"),
            ("sort", "asc"),
            ("apikey", &cfg.explorer_api_key),
        ])
        .send()
        .await?;

    if resp.status() != StatusCode::OK {
        return Err(eyre!("explorer error: HTTP {}", resp.status()));
    }

    let env: Envelope = resp.json().await?;
    Ok(env)
}

async fn account_list<T: DeserializeOwned>(
    client: &Client,
    cfg: &Config,
    action: &str,
    address: &str,
) -> Result<Vec<T>> {
    let env = account_action(client, cfg, action, address).await?;

    // "No transactions found" comes back with status "0" and an empty result
    // array; that is an empty wallet, not a failure.
    if env.result.is_array() {
        let list = serde_json::from_value(env.result)?;
        return Ok(list);
    }
    Err(ExplorerError::Api(format!("{}: {}", action, env.message)).into())
}

/// Native balance in wei, as the explorer's decimal string.
pub async fn fetch_balance(client: &Client, cfg: &Config, address: &str) -> Result<String> {
    let env = account_action(client, cfg, "balance", address).await?;
    match env.result.as_str() {
        Some(s) if env.status == "1" => Ok(s.to_string()),
        _ => Err(ExplorerError::Api(format!("balance: {}", env.message)).into()),
    }
}

pub async fn fetch_normal_txs(
    client: &Client,
    cfg: &Config,
    address: &str,
) -> Result<Vec<NormalTx>> {
    account_list(client, cfg, "txlist", address).await
}

pub async fn fetch_internal_txs(
    client: &Client,
    cfg: &Config,
    address: &str,
) -> Result<Vec<InternalTx>> {
    account_list(client, cfg, "txlistinternal", address).await
}

/// NFT transfers come from two actions, one per token standard; the lists
/// are tagged into the shared event shape here so the aggregator never cares
/// which standard an event came from.
pub async fn fetch_nft_transfers(
    client: &Client,
    cfg: &Config,
    address: &str,
) -> Result<Vec<NftTransfer>> {
    let erc721: Vec<NftTransferFields> =
        account_list(client, cfg, "tokennfttx", address).await?;
    let erc1155: Vec<NftTransferFields> =
        account_list(client, cfg, "token1155tx", address).await?;

    let mut transfers: Vec<NftTransfer> =
        erc721.into_iter().map(NftTransfer::Erc721).collect();
    transfers.extend(erc1155.into_iter().map(NftTransfer::Erc1155));
    Ok(transfers)
}

pub async fn fetch_erc20_transfers(
    client: &Client,
    cfg: &Config,
    address: &str,
) -> Result<Vec<Erc20Transfer>> {
    account_list(client, cfg, "tokentx", address).await
}
