use async_trait::async_trait;
use bigdecimal::BigDecimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{CreateHolding, Holding, UpdateHolding};
use crate::utils;

/// Persistence seam for holdings. Absent rows surface as `Ok(None)` /
/// zero rows affected, never as an error. `fetch_all` is the profit-sorted
/// listing backed by the `crypto_price` reference table; every other query
/// leaves `profit_percentage` NULL for the valuation engine to fill in.
#[async_trait]
pub trait HoldingStore: Send + Sync {
    async fn create(&self, input: CreateHolding) -> Result<Holding, sqlx::Error>;

    async fn fetch_all(&self) -> Result<Vec<Holding>, sqlx::Error>;

    async fn fetch_one(&self, id: Uuid) -> Result<Option<Holding>, sqlx::Error>;

    async fn update(&self, id: Uuid, input: UpdateHolding) -> Result<Option<Holding>, sqlx::Error>;

    /// Additive in-place update: `balance += delta_balance`,
    /// `fiat_balance += delta_cost`. The addition happens in SQL so that
    /// concurrent adjustments to the same holding serialize on the row and
    /// never lose an update. Returns the number of rows touched.
    async fn adjust_balance(
        &self,
        id: Uuid,
        delta_balance: &BigDecimal,
        delta_cost: &BigDecimal,
    ) -> Result<u64, sqlx::Error>;

    async fn delete(&self, id: Uuid) -> Result<u64, sqlx::Error>;
}

pub struct PgHoldingStore {
    pool: PgPool,
}

impl PgHoldingStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl HoldingStore for PgHoldingStore {
    async fn create(&self, input: CreateHolding) -> Result<Holding, sqlx::Error> {
        sqlx::query_as::<_, Holding>(
            "INSERT INTO cryptocurrency (id, name, balance, fiat_balance, created_date)
             VALUES ($1, LOWER($2), $3, $4, $5)
             RETURNING id, name, balance, fiat_balance, created_date,
                       NULL::real AS profit_percentage",
        )
        .bind(Uuid::new_v4())
        .bind(input.name)
        .bind(input.balance)
        .bind(input.fiat_balance)
        .bind(utils::now_minute())
        .fetch_one(&self.pool)
        .await
    }

    async fn fetch_all(&self) -> Result<Vec<Holding>, sqlx::Error> {
        // Inner join: a holding with no crypto_price row is omitted from the
        // listing. NULLIF keeps a zero cost basis from failing the whole
        // query; the live valuation pass rejects such rows afterwards.
        sqlx::query_as::<_, Holding>(
            "SELECT c.id, c.name, c.balance, c.fiat_balance, c.created_date,
                    (((c.balance * p.price_usd) - c.fiat_balance)
                     / NULLIF(c.fiat_balance, 0) * 100)::real AS profit_percentage
             FROM cryptocurrency c
             INNER JOIN crypto_price p ON c.name = LOWER(p.name)
             ORDER BY profit_percentage DESC",
        )
        .fetch_all(&self.pool)
        .await
    }

    async fn fetch_one(&self, id: Uuid) -> Result<Option<Holding>, sqlx::Error> {
        sqlx::query_as::<_, Holding>(
            "SELECT id, name, balance, fiat_balance, created_date,
                    NULL::real AS profit_percentage
             FROM cryptocurrency
             WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn update(&self, id: Uuid, input: UpdateHolding) -> Result<Option<Holding>, sqlx::Error> {
        sqlx::query_as::<_, Holding>(
            "UPDATE cryptocurrency
             SET name = LOWER($2), balance = $3, fiat_balance = $4
             WHERE id = $1
             RETURNING id, name, balance, fiat_balance, created_date,
                       NULL::real AS profit_percentage",
        )
        .bind(id)
        .bind(input.name)
        .bind(input.balance)
        .bind(input.fiat_balance)
        .fetch_optional(&self.pool)
        .await
    }

    async fn adjust_balance(
        &self,
        id: Uuid,
        delta_balance: &BigDecimal,
        delta_cost: &BigDecimal,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE cryptocurrency
             SET balance = balance + $2, fiat_balance = fiat_balance + $3
             WHERE id = $1",
        )
        .bind(id)
        .bind(delta_balance)
        .bind(delta_cost)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn delete(&self, id: Uuid) -> Result<u64, sqlx::Error> {
        // No cascade: transactions of a deleted holding are left in place.
        let result = sqlx::query("DELETE FROM cryptocurrency WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::valuation_service::apply_profit;
    use bigdecimal::{ToPrimitive, Zero};
    use std::collections::HashMap;
    use std::str::FromStr;

    // Decimal mirror of the profit expression in `fetch_all`, including the
    // NULLIF guard and the ::real narrowing. Kept separate from the engine's
    // arithmetic on purpose: if either side drifts, the agreement assertions
    // below fail.
    fn sql_profit(balance: &BigDecimal, price: &BigDecimal, fiat: &BigDecimal) -> Option<f32> {
        if fiat.is_zero() {
            return None;
        }
        let percentage = ((balance * price) - fiat) / fiat * BigDecimal::from(100);
        percentage.to_f64().map(|v| v as f32)
    }

    fn holding(name: &str, balance: &str, fiat_balance: &str) -> Holding {
        Holding {
            id: Uuid::new_v4(),
            name: name.to_string(),
            balance: BigDecimal::from_str(balance).unwrap(),
            fiat_balance: BigDecimal::from_str(fiat_balance).unwrap(),
            created_date: utils::now_minute(),
            profit_percentage: None,
        }
    }

    #[test]
    fn test_list_sort_expression_agrees_with_live_valuation() {
        // (balance, price, cost) covering gains, losses and fractions
        let fixtures = [
            ("1", "61000", "60000"),
            ("2", "2500", "4000"),
            ("100", "0.05", "50"),
            ("0.3", "1", "0.1"),
            ("0.004", "152000.25", "1000"),
        ];

        for (balance, price, fiat) in fixtures {
            let price = BigDecimal::from_str(price).unwrap();
            let h = holding("bitcoin", balance, fiat);

            let from_sql = sql_profit(&h.balance, &price, &h.fiat_balance);

            let prices: HashMap<String, BigDecimal> =
                [("bitcoin".to_string(), price)].into();
            let from_engine = apply_profit(h, &prices).unwrap().profit_percentage;

            assert_eq!(
                from_sql, from_engine,
                "paths disagree for balance={} fiat={}",
                balance, fiat
            );
        }
    }

    #[test]
    fn test_zero_cost_basis_is_rejected_on_both_paths() {
        // The SQL expression yields NULL via NULLIF; the engine refuses to
        // compute. Neither path reports a fake 0 %.
        let price = BigDecimal::from(61000);
        let h = holding("bitcoin", "1", "0");

        assert_eq!(sql_profit(&h.balance, &price, &h.fiat_balance), None);

        let prices: HashMap<String, BigDecimal> = [("bitcoin".to_string(), price)].into();
        assert!(apply_profit(h, &prices).is_err());
    }
}
