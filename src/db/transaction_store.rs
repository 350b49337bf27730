use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{Transaction, UpdateTransaction};

const SELECT_COLUMNS: &str = "transaction_id AS id, cryptocurrency_id AS holding_id,
                              cryptocurrency_amount AS asset_amount, fiat_amount,
                              purchase_date, created_date";

/// Persistence seam for transactions. `create_and_adjust` is the atomic
/// variant used by the `WriteConsistency::Atomic` policy: the insert and
/// the owning holding's balance adjustment commit or roll back together.
#[async_trait]
pub trait TransactionStore: Send + Sync {
    async fn create(&self, tx: &Transaction) -> Result<(), sqlx::Error>;

    async fn create_and_adjust(&self, tx: &Transaction) -> Result<(), sqlx::Error>;

    async fn fetch_all(&self, holding_id: Uuid) -> Result<Vec<Transaction>, sqlx::Error>;

    async fn fetch_one(&self, id: Uuid) -> Result<Option<Transaction>, sqlx::Error>;

    async fn update(
        &self,
        id: Uuid,
        input: UpdateTransaction,
    ) -> Result<Option<Transaction>, sqlx::Error>;

    async fn delete(&self, id: Uuid) -> Result<u64, sqlx::Error>;
}

pub struct PgTransactionStore {
    pool: PgPool,
}

impl PgTransactionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TransactionStore for PgTransactionStore {
    async fn create(&self, tx: &Transaction) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO crypto_transaction
                 (transaction_id, cryptocurrency_id, cryptocurrency_amount,
                  fiat_amount, purchase_date, created_date)
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(tx.id)
        .bind(tx.holding_id)
        .bind(&tx.asset_amount)
        .bind(&tx.fiat_amount)
        .bind(tx.purchase_date)
        .bind(tx.created_date)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn create_and_adjust(&self, tx: &Transaction) -> Result<(), sqlx::Error> {
        let mut db_tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO crypto_transaction
                 (transaction_id, cryptocurrency_id, cryptocurrency_amount,
                  fiat_amount, purchase_date, created_date)
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(tx.id)
        .bind(tx.holding_id)
        .bind(&tx.asset_amount)
        .bind(&tx.fiat_amount)
        .bind(tx.purchase_date)
        .bind(tx.created_date)
        .execute(&mut *db_tx)
        .await?;

        let adjusted = sqlx::query(
            "UPDATE cryptocurrency
             SET balance = balance + $2, fiat_balance = fiat_balance + $3
             WHERE id = $1",
        )
        .bind(tx.holding_id)
        .bind(&tx.asset_amount)
        .bind(&tx.fiat_amount)
        .execute(&mut *db_tx)
        .await?;

        if adjusted.rows_affected() == 0 {
            return Err(sqlx::Error::RowNotFound);
        }

        db_tx.commit().await?;
        Ok(())
    }

    async fn fetch_all(&self, holding_id: Uuid) -> Result<Vec<Transaction>, sqlx::Error> {
        sqlx::query_as::<_, Transaction>(&format!(
            "SELECT {SELECT_COLUMNS}
             FROM crypto_transaction
             WHERE cryptocurrency_id = $1
             ORDER BY purchase_date DESC"
        ))
        .bind(holding_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn fetch_one(&self, id: Uuid) -> Result<Option<Transaction>, sqlx::Error> {
        sqlx::query_as::<_, Transaction>(&format!(
            "SELECT {SELECT_COLUMNS}
             FROM crypto_transaction
             WHERE transaction_id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn update(
        &self,
        id: Uuid,
        input: UpdateTransaction,
    ) -> Result<Option<Transaction>, sqlx::Error> {
        sqlx::query_as::<_, Transaction>(&format!(
            "UPDATE crypto_transaction
             SET cryptocurrency_amount = $2, fiat_amount = $3, purchase_date = $4
             WHERE transaction_id = $1
             RETURNING {SELECT_COLUMNS}"
        ))
        .bind(id)
        .bind(input.asset_amount)
        .bind(input.fiat_amount)
        .bind(input.purchase_date)
        .fetch_optional(&self.pool)
        .await
    }

    async fn delete(&self, id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM crypto_transaction WHERE transaction_id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
