use bigdecimal::BigDecimal;
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::utils;

// A single buy/sell event against a holding. Amounts are signed: a sale
// carries a negative `asset_amount` and a negative `fiat_amount` cost.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: Uuid,
    pub holding_id: Uuid,
    pub asset_amount: BigDecimal,
    pub fiat_amount: BigDecimal,
    pub purchase_date: DateTime<FixedOffset>,
    pub created_date: DateTime<FixedOffset>,
}

impl Transaction {
    pub fn new(
        holding_id: Uuid,
        asset_amount: BigDecimal,
        fiat_amount: BigDecimal,
        purchase_date: DateTime<FixedOffset>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            holding_id,
            asset_amount,
            fiat_amount,
            purchase_date,
            created_date: utils::now_minute(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTransaction {
    pub asset_amount: BigDecimal,
    pub fiat_amount: BigDecimal,
    // Defaults to the current minute when omitted
    pub purchase_date: Option<DateTime<FixedOffset>>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTransaction {
    pub asset_amount: BigDecimal,
    pub fiat_amount: BigDecimal,
    pub purchase_date: DateTime<FixedOffset>,
}
