// src/models.rs
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A top-level transaction submitted by (or to) the wallet, as the explorer
/// returns it. Numeric fields stay as strings (safe for re-serialization;
/// parsed at the point of use).
#[derive(Debug, Clone, Deserialize)]
pub struct NormalTx {
    pub hash: String,
    #[serde(rename = "timeStamp")]
    pub timestamp: String,            // unix seconds, decimal string
    pub value: String,                // wei, decimal string
    #[serde(rename = "contractAddress", default)]
    pub contract_address: String,     // non-empty iff this tx deployed a contract
}

impl NormalTx {
    /// Parsed block timestamp. `None` for a malformed field — callers skip
    /// such rows rather than failing the whole aggregation.
    pub fn time(&self) -> Option<DateTime<Utc>> {
        let secs = self.timestamp.parse::<i64>().ok()?;
        DateTime::from_timestamp(secs, 0)
    }
}

/// A value transfer that happened inside a contract call. Shares the hash of
/// its parent transaction; one hash may carry several of these.
#[derive(Debug, Clone, Deserialize)]
pub struct InternalTx {
    pub hash: String,
    pub value: String,                // wei, decimal string
}

/// An NFT transfer event, tagged by token standard. The two explorer actions
/// (`tokennfttx`, `token1155tx`) return the same relevant fields, so the
/// variants share one payload shape; the tag is resolved at fetch time.
#[derive(Debug, Clone)]
pub enum NftTransfer {
    Erc721(NftTransferFields),
    Erc1155(NftTransferFields),
}

#[derive(Debug, Clone, Deserialize)]
pub struct NftTransferFields {
    pub hash: String,
    pub from: String,
    pub to: String,
    #[serde(rename = "contractAddress")]
    pub contract_address: String,
    #[serde(rename = "tokenID")]
    pub token_id: String,
}

impl NftTransfer {
    fn fields(&self) -> &NftTransferFields {
        match self {
            NftTransfer::Erc721(f) | NftTransfer::Erc1155(f) => f,
        }
    }

    pub fn hash(&self) -> &str {
        &self.fields().hash
    }

    pub fn from(&self) -> &str {
        &self.fields().from
    }

    pub fn to(&self) -> &str {
        &self.fields().to
    }

    /// Composite token identity: contract address + token id. The sole basis
    /// for matching a sold NFT to its bought counterpart.
    pub fn token_uid(&self) -> String {
        let f = self.fields();
        format!("{}:{}", f.contract_address.to_lowercase(), f.token_id)
    }
}

/// An ERC20 transfer event. Only the symbol is read: the core counts how
/// many distinct fungible tokens the wallet has touched.
#[derive(Debug, Clone, Deserialize)]
pub struct Erc20Transfer {
    #[serde(rename = "tokenSymbol")]
    pub token_symbol: String,
}

/// Derived wallet metrics. Money fields are in display units (ether, not
/// wei); time-gap fields are hours; age fields are 30-day months.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WalletStats {
    pub balance: Decimal,
    pub no_data: bool,
    pub wallet_age: i64,
    pub total_transactions: usize,
    pub min_transaction_time: f64,
    pub max_transaction_time: f64,
    pub average_transaction_time: f64,
    pub wallet_turnover: Decimal,
    pub last_month_transactions: usize,
    pub time_from_last_transaction: i64,
    pub nft_holding: i64,
    pub nft_trading: Decimal,
    pub nft_worth: Decimal,
    pub deployed_contracts: usize,
    pub tokens_holding: usize,
}

impl WalletStats {
    /// The "insufficient history" sentinel: `no_data` set, everything else
    /// zeroed. Callers must check `no_data` before reading other fields.
    pub fn no_data() -> Self {
        WalletStats {
            balance: Decimal::ZERO,
            no_data: true,
            wallet_age: 0,
            total_transactions: 0,
            min_transaction_time: 0.0,
            max_transaction_time: 0.0,
            average_transaction_time: 0.0,
            wallet_turnover: Decimal::ZERO,
            last_month_transactions: 0,
            time_from_last_transaction: 0,
            nft_holding: 0,
            nft_trading: Decimal::ZERO,
            nft_worth: Decimal::ZERO,
            deployed_contracts: 0,
            tokens_holding: 0,
        }
    }
}
