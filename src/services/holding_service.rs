use std::sync::Arc;

use uuid::Uuid;

use crate::db::HoldingStore;
use crate::errors::AppError;
use crate::models::{CreateHolding, Holding, UpdateHolding};
use crate::services::valuation_service::ValuationService;

pub struct HoldingService {
    store: Arc<dyn HoldingStore>,
    valuation: Arc<ValuationService>,
}

impl HoldingService {
    pub fn new(store: Arc<dyn HoldingStore>, valuation: Arc<ValuationService>) -> Self {
        Self { store, valuation }
    }

    pub async fn create(&self, input: CreateHolding) -> Result<Holding, AppError> {
        if input.name.trim().is_empty() {
            return Err(AppError::Validation("Name cannot be empty".into()));
        }
        Ok(self.store.create(input).await?)
    }

    /// The store returns rows pre-sorted by the joined profit column; the
    /// engine then recomputes every percentage against live quotes without
    /// disturbing that order. Holdings without a price reference row are
    /// omitted by the store's inner join.
    pub async fn list(&self) -> Result<Vec<Holding>, AppError> {
        let holdings = self.store.fetch_all().await?;
        self.valuation.enrich_many(holdings).await
    }

    pub async fn get_one(&self, id: Uuid) -> Result<Holding, AppError> {
        let holding = self.store.fetch_one(id).await?.ok_or(AppError::NotFound)?;
        self.valuation.enrich_one(holding).await
    }

    pub async fn update(&self, id: Uuid, input: UpdateHolding) -> Result<Holding, AppError> {
        if input.name.trim().is_empty() {
            return Err(AppError::Validation("Name cannot be empty".into()));
        }
        self.store.update(id, input).await?.ok_or(AppError::NotFound)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        match self.store.delete(id).await {
            Ok(0) => Err(AppError::NotFound),
            Ok(_) => Ok(()),
            Err(e) => Err(AppError::from(e)),
        }
    }
}
