mod app;
mod config;
mod db;
mod errors;
mod external;
mod logging;
mod models;
mod routes;
mod services;
mod state;
mod utils;

use std::net::SocketAddr;
use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;

use crate::config::Config;
use crate::db::{PgHoldingStore, PgTransactionStore};
use crate::external::coingecko::CoinGeckoOracle;
use crate::external::price_oracle::PriceOracle;
use crate::logging::LoggingConfig;
use crate::services::holding_service::HoldingService;
use crate::services::transaction_recorder::TransactionRecorder;
use crate::services::valuation_service::ValuationService;
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    logging::init_logging(LoggingConfig::from_env())
        .map_err(|e| anyhow::anyhow!("failed to initialize logging: {e}"))?;

    let config = Config::from_env().map_err(|e| anyhow::anyhow!(e))?;

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    let oracle: Arc<dyn PriceOracle> = Arc::new(
        CoinGeckoOracle::from_env()
            .map_err(|e| anyhow::anyhow!("failed to build price oracle: {e}"))?,
    );

    let holding_store = Arc::new(PgHoldingStore::new(pool.clone()));
    let transaction_store = Arc::new(PgTransactionStore::new(pool.clone()));
    let valuation = Arc::new(ValuationService::new(Arc::clone(&oracle)));

    let state = AppState {
        holdings: Arc::new(HoldingService::new(holding_store.clone(), valuation)),
        transactions: Arc::new(TransactionRecorder::new(
            transaction_store,
            holding_store,
            config.write_consistency,
        )),
        price_oracle: oracle,
    };

    let app = app::create_app(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("cryptofolio backend running at http://{}/", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
