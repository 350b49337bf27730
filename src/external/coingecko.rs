use crate::external::price_oracle::{PriceOracle, PriceOracleError};
use async_trait::async_trait;
use bigdecimal::{BigDecimal, FromPrimitive};
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://api.coingecko.com/api/v3";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

pub struct CoinGeckoOracle {
    client: reqwest::Client,
    base_url: String,
}

impl CoinGeckoOracle {
    pub fn from_env() -> Result<Self, PriceOracleError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| PriceOracleError::Network(e.to_string()))?;

        let base_url = std::env::var("COINGECKO_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());

        Ok(Self { client, base_url })
    }
}

#[derive(Debug, Deserialize)]
struct SimplePriceQuote {
    usd: f64,
}

#[async_trait]
impl PriceOracle for CoinGeckoOracle {
    async fn fetch_prices(
        &self,
        names: &[String],
    ) -> Result<HashMap<String, BigDecimal>, PriceOracleError> {
        let url = format!("{}/simple/price", self.base_url);
        let ids = names.join(",");

        let resp = self
            .client
            .get(&url)
            .query(&[("ids", ids.as_str()), ("vs_currencies", "usd")])
            .send()
            .await
            .map_err(|e| PriceOracleError::Network(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(PriceOracleError::BadStatus(format!(
                "coingecko returned {}",
                resp.status()
            )));
        }

        // Response shape: { "<id>": { "usd": <number> }, ... } — ids the
        // API does not recognize are simply missing from the map.
        let body: HashMap<String, SimplePriceQuote> = resp
            .json()
            .await
            .map_err(|e| PriceOracleError::Parse(e.to_string()))?;

        let mut prices = HashMap::with_capacity(body.len());
        for (name, quote) in body {
            let price = BigDecimal::from_f64(quote.usd).ok_or_else(|| {
                PriceOracleError::Parse(format!("unrepresentable price for {}: {}", name, quote.usd))
            })?;
            prices.insert(name, price);
        }

        Ok(prices)
    }
}
