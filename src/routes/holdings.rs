use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use tracing::{error, info};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{CreateHolding, Holding, UpdateHolding};
use crate::routes::transactions;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_holding).get(list_holdings))
        .route("/:id", get(get_holding))
        .route("/:id", put(update_holding))
        .route("/:id", delete(delete_holding))
        .nest("/:id/transactions", transactions::router())
}

#[axum::debug_handler]
pub async fn create_holding(
    State(state): State<AppState>,
    Json(data): Json<CreateHolding>,
) -> Result<(StatusCode, Json<Holding>), AppError> {
    info!("POST /cryptocurrencies - Creating new holding");
    let holding = state.holdings.create(data).await.map_err(|e| {
        error!("Failed to create holding: {}", e);
        e
    })?;
    Ok((StatusCode::CREATED, Json(holding)))
}

pub async fn list_holdings(
    State(state): State<AppState>,
) -> Result<Json<Vec<Holding>>, AppError> {
    info!("GET /cryptocurrencies - Listing holdings sorted by profit");
    let holdings = state.holdings.list().await.map_err(|e| {
        error!("Failed to list holdings: {}", e);
        e
    })?;
    Ok(Json(holdings))
}

pub async fn get_holding(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Holding>, AppError> {
    info!("GET /cryptocurrencies/{} - Fetching holding", id);
    let holding = state.holdings.get_one(id).await.map_err(|e| {
        error!("Failed to fetch holding {}: {}", id, e);
        e
    })?;
    Ok(Json(holding))
}

pub async fn update_holding(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(data): Json<UpdateHolding>,
) -> Result<Json<Holding>, AppError> {
    info!("PUT /cryptocurrencies/{} - Updating holding", id);
    let holding = state.holdings.update(id, data).await.map_err(|e| {
        error!("Failed to update holding {}: {}", id, e);
        e
    })?;
    Ok(Json(holding))
}

pub async fn delete_holding(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    info!("DELETE /cryptocurrencies/{} - Deleting holding", id);
    state.holdings.delete(id).await.map_err(|e| {
        error!("Failed to delete holding {}: {}", id, e);
        e
    })?;
    Ok(StatusCode::NO_CONTENT)
}
