use std::sync::Arc;

use tracing::error;
use uuid::Uuid;

use crate::config::WriteConsistency;
use crate::db::{HoldingStore, TransactionStore};
use crate::errors::AppError;
use crate::models::{CreateTransaction, Transaction, UpdateTransaction};
use crate::utils;

/// Records transactions and folds their signed amounts into the owning
/// holding's balance and cost basis.
///
/// Under `BestEffort` (the default) the
/// balance adjustment is a secondary write: if it fails after the
/// transaction row is stored, the failure is logged and the stored
/// transaction is still returned to the caller. Under `Atomic` both writes
/// share one database transaction and the call fails as a whole.
pub struct TransactionRecorder {
    transactions: Arc<dyn TransactionStore>,
    holdings: Arc<dyn HoldingStore>,
    consistency: WriteConsistency,
}

impl TransactionRecorder {
    pub fn new(
        transactions: Arc<dyn TransactionStore>,
        holdings: Arc<dyn HoldingStore>,
        consistency: WriteConsistency,
    ) -> Self {
        Self {
            transactions,
            holdings,
            consistency,
        }
    }

    pub async fn record(
        &self,
        holding_id: Uuid,
        input: CreateTransaction,
    ) -> Result<Transaction, AppError> {
        if self.holdings.fetch_one(holding_id).await?.is_none() {
            return Err(AppError::NotFound);
        }

        let purchase_date = input.purchase_date.unwrap_or_else(utils::now_minute);
        let tx = Transaction::new(holding_id, input.asset_amount, input.fiat_amount, purchase_date);

        match self.consistency {
            WriteConsistency::Atomic => {
                self.transactions.create_and_adjust(&tx).await?;
            }
            WriteConsistency::BestEffort => {
                self.transactions.create(&tx).await?;

                // Secondary write. The store serializes concurrent
                // adjustments via its in-SQL addition; a failure here is
                // logged and deliberately not surfaced to the caller.
                match self
                    .holdings
                    .adjust_balance(holding_id, &tx.asset_amount, &tx.fiat_amount)
                    .await
                {
                    Ok(0) => error!(
                        "Balance adjustment for holding {} matched no row; transaction {} stored without it",
                        holding_id, tx.id
                    ),
                    Ok(_) => {}
                    Err(e) => error!(
                        "Failed to adjust balance for holding {} after storing transaction {}: {}",
                        holding_id, tx.id, e
                    ),
                }
            }
        }

        Ok(tx)
    }

    pub async fn list(&self, holding_id: Uuid) -> Result<Vec<Transaction>, AppError> {
        Ok(self.transactions.fetch_all(holding_id).await?)
    }

    pub async fn get_one(&self, id: Uuid) -> Result<Transaction, AppError> {
        self.transactions
            .fetch_one(id)
            .await?
            .ok_or(AppError::NotFound)
    }

    pub async fn update(
        &self,
        id: Uuid,
        input: UpdateTransaction,
    ) -> Result<Transaction, AppError> {
        self.transactions
            .update(id, input)
            .await?
            .ok_or(AppError::NotFound)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        match self.transactions.delete(id).await {
            Ok(0) => Err(AppError::NotFound),
            Ok(_) => Ok(()),
            Err(e) => Err(AppError::from(e)),
        }
    }
}
