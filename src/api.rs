use axum::{
    extract::Query,
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

use crate::config::Config;
use crate::models::WalletStats;
use crate::{address, explorer, stats};

#[derive(Deserialize)]
pub struct StatsQuery {
    pub address: String,
}

/// Success/failure envelope returned to callers. The tag lets clients branch
/// on "status" without inspecting HTTP codes.
#[derive(Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum StatsResponse {
    Ok { address: String, stats: WalletStats },
    Error { error: String },
}

pub async fn serve(cfg: Config) -> eyre::Result<()> {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let addr = SocketAddr::from(([127, 0, 0, 1], cfg.port));

    let app = Router::new()
        .route("/", get(|| async { "Wallet Stats API running" }))
        .route("/stats", get({
            let cfg = cfg.clone();
            move |q: Query<StatsQuery>| {
                let cfg = cfg.clone();
                async move { get_stats(cfg, q).await }
            }
        }))
        .layer(cors);

    info!("API listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}

async fn get_stats(
    cfg: Config,
    Query(q): Query<StatsQuery>,
) -> (StatusCode, Json<StatsResponse>) {
    let address = match address::normalize(&q.address) {
        Ok(a) => a,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(StatsResponse::Error { error: e.to_string() }),
            )
        }
    };

    match fetch_and_compute(&cfg, &address).await {
        Ok(stats) => {
            info!("Computed stats for {} (no_data = {})", address, stats.no_data);
            (StatusCode::OK, Json(StatsResponse::Ok { address, stats }))
        }
        Err(e) => {
            error!("Stats request failed for {}: {:?}", address, e);
            (
                StatusCode::BAD_GATEWAY,
                Json(StatsResponse::Error { error: e.to_string() }),
            )
        }
    }
}

/// Pull the five collections for one address and run the aggregator.
/// Requests go out sequentially; explorers rate-limit per key and the lists
/// are independent, so there is nothing to coordinate.
async fn fetch_and_compute(cfg: &Config, address: &str) -> eyre::Result<WalletStats> {
    let client = explorer::http_client(cfg)?;

    let balance = explorer::fetch_balance(&client, cfg, address).await?;
    let normal = explorer::fetch_normal_txs(&client, cfg, address).await?;
    let internal = explorer::fetch_internal_txs(&client, cfg, address).await?;
    let nft = explorer::fetch_nft_transfers(&client, cfg, address).await?;
    let erc20 = explorer::fetch_erc20_transfers(&client, cfg, address).await?;

    info!(
        "Fetched {} txs, {} internal, {} NFT events, {} token transfers for {}",
        normal.len(),
        internal.len(),
        nft.len(),
        erc20.len(),
        address
    );

    Ok(stats::compute(address, &balance, &normal, &internal, &nft, &erc20))
}
