use async_trait::async_trait;
use bigdecimal::BigDecimal;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PriceOracleError {
    #[error("network error: {0}")]
    Network(String),

    #[error("bad response: {0}")]
    BadStatus(String),

    #[error("parse error: {0}")]
    Parse(String),
}

/// Quote source for current USD unit prices. One call covers a whole batch
/// of lower-cased asset names; a name absent from the returned map is not
/// an error at this layer (the valuation engine distinguishes a missing
/// quote from a failed fetch).
#[async_trait]
pub trait PriceOracle: Send + Sync {
    async fn fetch_prices(
        &self,
        names: &[String],
    ) -> Result<HashMap<String, BigDecimal>, PriceOracleError>;
}
