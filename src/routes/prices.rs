use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use bigdecimal::BigDecimal;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::{error, info};

use crate::errors::AppError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(get_prices))
}

#[derive(Debug, Deserialize)]
pub struct PricesQuery {
    #[serde(default)]
    names: String,
}

// Direct oracle passthrough: ?names=bitcoin,ethereum
pub async fn get_prices(
    State(state): State<AppState>,
    Query(query): Query<PricesQuery>,
) -> Result<Json<HashMap<String, BigDecimal>>, AppError> {
    info!("GET /prices - Quoting names: {}", query.names);

    let names: Vec<String> = query
        .names
        .split(',')
        .map(|n| n.trim().to_lowercase())
        .filter(|n| !n.is_empty())
        .collect();

    if names.is_empty() {
        return Err(AppError::Validation("No names provided".into()));
    }

    let prices = state.price_oracle.fetch_prices(&names).await.map_err(|e| {
        error!("Failed to fetch prices for {}: {}", query.names, e);
        AppError::PriceFetch(e.to_string())
    })?;

    Ok(Json(prices))
}
