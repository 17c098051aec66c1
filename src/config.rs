use dotenvy::dotenv;
use eyre::Result;
use std::env;
use tracing::info;

#[derive(Debug, Clone)]
pub struct Config {
    pub explorer_url: String,     // Etherscan-compatible account API
    pub explorer_api_key: String,
    pub request_timeout_secs: u64,
    pub port: u16,
}

pub fn load() -> Result<Config> {
    dotenv().ok(); // load from .env file when present

    let explorer_url = env::var("EXPLORER_API_URL")
        .or_else(|_| env::var("ETHERSCAN_API_URL")) // alias support
        .unwrap_or_else(|_| "https://api.etherscan.io/api".to_string());

    // Explorers serve unauthenticated requests at a reduced rate,
    // so an empty key is allowed.
    let explorer_api_key = env::var("EXPLORER_API_KEY")
        .or_else(|_| env::var("ETHERSCAN_API_KEY"))
        .unwrap_or_default();

    let request_timeout_secs = env::var("REQUEST_TIMEOUT_SECS")
        .unwrap_or_else(|_| "15".to_string())
        .parse()
        .unwrap_or(15);

    let port = env::var("PORT")
        .unwrap_or_else(|_| "8080".to_string())
        .parse()
        .unwrap_or(8080);

    let cfg = Config {
        explorer_url,
        explorer_api_key,
        request_timeout_secs,
        port,
    };

    info!("Loaded config: {:?}", cfg);

    Ok(cfg)
}
