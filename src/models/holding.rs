use bigdecimal::BigDecimal;
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

// A tracked position in one crypto asset: current quantity plus the
// cumulative fiat paid for it. `name` doubles as the pricing key and is
// stored lower-cased. `profit_percentage` is derived at read time (either
// by the valuation engine or by the profit-sorted list query) and is never
// persisted.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Holding {
    pub id: Uuid,
    pub name: String,
    pub balance: BigDecimal,
    pub fiat_balance: BigDecimal,
    pub created_date: DateTime<FixedOffset>,
    pub profit_percentage: Option<f32>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateHolding {
    pub name: String,
    #[serde(default)]
    pub balance: BigDecimal,
    #[serde(default)]
    pub fiat_balance: BigDecimal,
}

// Full field replace; `created_date` stays server-owned.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateHolding {
    pub name: String,
    pub balance: BigDecimal,
    pub fiat_balance: BigDecimal,
}
