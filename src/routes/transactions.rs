use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use tracing::{error, info};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{CreateTransaction, Transaction, UpdateTransaction};
use crate::state::AppState;

// Nested under /cryptocurrencies/:id, so handlers on the /:tx_id routes
// extract both path params.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_transaction).get(list_transactions))
        .route("/:tx_id", get(get_transaction))
        .route("/:tx_id", put(update_transaction))
        .route("/:tx_id", delete(delete_transaction))
}

pub async fn create_transaction(
    State(state): State<AppState>,
    Path(holding_id): Path<Uuid>,
    Json(data): Json<CreateTransaction>,
) -> Result<(StatusCode, Json<Transaction>), AppError> {
    info!("POST /cryptocurrencies/{}/transactions - Recording transaction", holding_id);
    let tx = state.transactions.record(holding_id, data).await.map_err(|e| {
        error!("Failed to record transaction for holding {}: {}", holding_id, e);
        e
    })?;
    Ok((StatusCode::CREATED, Json(tx)))
}

pub async fn list_transactions(
    State(state): State<AppState>,
    Path(holding_id): Path<Uuid>,
) -> Result<Json<Vec<Transaction>>, AppError> {
    info!("GET /cryptocurrencies/{}/transactions - Listing transactions", holding_id);
    let transactions = state.transactions.list(holding_id).await.map_err(|e| {
        error!("Failed to list transactions for holding {}: {}", holding_id, e);
        e
    })?;
    Ok(Json(transactions))
}

pub async fn get_transaction(
    State(state): State<AppState>,
    Path((holding_id, tx_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Transaction>, AppError> {
    info!("GET /cryptocurrencies/{}/transactions/{} - Fetching transaction", holding_id, tx_id);
    let tx = state.transactions.get_one(tx_id).await.map_err(|e| {
        error!("Failed to fetch transaction {}: {}", tx_id, e);
        e
    })?;
    Ok(Json(tx))
}

pub async fn update_transaction(
    State(state): State<AppState>,
    Path((holding_id, tx_id)): Path<(Uuid, Uuid)>,
    Json(data): Json<UpdateTransaction>,
) -> Result<Json<Transaction>, AppError> {
    info!("PUT /cryptocurrencies/{}/transactions/{} - Updating transaction", holding_id, tx_id);
    let tx = state.transactions.update(tx_id, data).await.map_err(|e| {
        error!("Failed to update transaction {}: {}", tx_id, e);
        e
    })?;
    Ok(Json(tx))
}

pub async fn delete_transaction(
    State(state): State<AppState>,
    Path((holding_id, tx_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, AppError> {
    info!("DELETE /cryptocurrencies/{}/transactions/{} - Deleting transaction", holding_id, tx_id);
    state.transactions.delete(tx_id).await.map_err(|e| {
        error!("Failed to delete transaction {}: {}", tx_id, e);
        e
    })?;
    Ok(StatusCode::NO_CONTENT)
}
