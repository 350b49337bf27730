use std::collections::HashMap;
use std::sync::Arc;

use bigdecimal::{BigDecimal, ToPrimitive, Zero};
use tokio::task::JoinSet;
use tracing::error;

use crate::errors::AppError;
use crate::external::price_oracle::PriceOracle;
use crate::models::Holding;

/// Derives `profit_percentage` for holdings from live oracle quotes.
///
/// All monetary arithmetic stays in `BigDecimal`; the percentage is
/// narrowed to f32 only at the moment it is attached to the returned
/// holding. A holding with a zero balance or zero cost basis has no
/// defined profit and is rejected rather than reported as 0 %.
pub struct ValuationService {
    oracle: Arc<dyn PriceOracle>,
}

impl ValuationService {
    pub fn new(oracle: Arc<dyn PriceOracle>) -> Self {
        Self { oracle }
    }

    pub async fn enrich_one(&self, holding: Holding) -> Result<Holding, AppError> {
        let name = holding.name.to_lowercase();
        let prices = self
            .oracle
            .fetch_prices(std::slice::from_ref(&name))
            .await
            .map_err(|e| {
                error!("Price fetch for {} failed: {}", name, e);
                AppError::PriceFetch(e.to_string())
            })?;

        apply_profit(holding, &prices)
    }

    /// One batched price fetch over the distinct lower-cased names, then one
    /// computation task per holding. Every task reads the same immutable
    /// price map, so no coordination is needed among them. All tasks are
    /// joined before returning: if any task fails, the whole call fails and
    /// no partially enriched result is surfaced.
    pub async fn enrich_many(&self, holdings: Vec<Holding>) -> Result<Vec<Holding>, AppError> {
        if holdings.is_empty() {
            return Ok(holdings);
        }

        let mut names: Vec<String> = holdings.iter().map(|h| h.name.to_lowercase()).collect();
        names.sort();
        names.dedup();

        let prices = Arc::new(self.oracle.fetch_prices(&names).await.map_err(|e| {
            error!("Batched price fetch for {} names failed: {}", names.len(), e);
            AppError::PriceFetch(e.to_string())
        })?);

        // JoinSet aborts still-running tasks when dropped, so cancelling the
        // enclosing call does not leak detached work. Results are slotted by
        // spawn index so the store's sort order survives the unordered join.
        let count = holdings.len();
        let mut tasks = JoinSet::new();
        for (idx, holding) in holdings.into_iter().enumerate() {
            let prices = Arc::clone(&prices);
            tasks.spawn(async move { (idx, apply_profit(holding, &prices)) });
        }

        let mut enriched: Vec<Option<Holding>> = (0..count).map(|_| None).collect();
        let mut first_err: Option<AppError> = None;
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((idx, Ok(holding))) => enriched[idx] = Some(holding),
                Ok((_, Err(e))) => {
                    first_err.get_or_insert(e);
                }
                Err(e) => {
                    first_err.get_or_insert(AppError::Internal(format!(
                        "valuation task failed: {e}"
                    )));
                }
            }
        }

        if let Some(e) = first_err {
            return Err(e);
        }
        Ok(enriched.into_iter().flatten().collect())
    }
}

/// `((balance * price - cost) / cost) * 100`, exact in decimal until the
/// final narrowing. The same formula backs the store's profit-sorted list
/// query, so both paths agree numerically on identical inputs.
pub(crate) fn apply_profit(
    mut holding: Holding,
    prices: &HashMap<String, BigDecimal>,
) -> Result<Holding, AppError> {
    if holding.fiat_balance.is_zero() || holding.balance.is_zero() {
        return Err(AppError::InvalidCostBasis(holding.name));
    }

    let name = holding.name.to_lowercase();
    let price = prices
        .get(&name)
        .ok_or_else(|| AppError::PriceUnavailable(name.clone()))?;

    let market_value = &holding.balance * price;
    let profit = market_value - &holding.fiat_balance;
    let percentage = profit / &holding.fiat_balance * BigDecimal::from(100);

    let narrowed = percentage.to_f64().ok_or_else(|| {
        AppError::Internal(format!("profit percentage for {} is not representable", name))
    })?;
    holding.profit_percentage = Some(narrowed as f32);
    Ok(holding)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::external::price_oracle::PriceOracleError;
    use crate::utils;
    use async_trait::async_trait;
    use std::str::FromStr;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use uuid::Uuid;

    struct FixedOracle {
        prices: HashMap<String, BigDecimal>,
        calls: AtomicUsize,
    }

    impl FixedOracle {
        fn new(quotes: &[(&str, &str)]) -> Self {
            let prices = quotes
                .iter()
                .map(|(name, price)| {
                    (name.to_string(), BigDecimal::from_str(price).unwrap())
                })
                .collect();
            Self {
                prices,
                calls: AtomicUsize::new(0),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl PriceOracle for FixedOracle {
        async fn fetch_prices(
            &self,
            names: &[String],
        ) -> Result<HashMap<String, BigDecimal>, PriceOracleError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(names
                .iter()
                .filter_map(|n| self.prices.get(n).map(|p| (n.clone(), p.clone())))
                .collect())
        }
    }

    struct UnreachableOracle;

    #[async_trait]
    impl PriceOracle for UnreachableOracle {
        async fn fetch_prices(
            &self,
            _names: &[String],
        ) -> Result<HashMap<String, BigDecimal>, PriceOracleError> {
            Err(PriceOracleError::Network("connection refused".into()))
        }
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

    #[tokio::test]
    async fn test_enrich_one_profit_formula() {
        let oracle = Arc::new(FixedOracle::new(&[("bitcoin", "61000")]));
        let service = ValuationService::new(oracle);

        let enriched = service
            .enrich_one(holding("bitcoin", "1", "60000"))
            .await
            .unwrap();

        let pct = enriched.profit_percentage.unwrap();
        assert!((pct - 1.6667).abs() < 1e-3, "expected ~1.6667, got {}", pct);
    }

    #[tokio::test]
    async fn test_enrich_one_normalizes_name_for_lookup() {
        let oracle = Arc::new(FixedOracle::new(&[("ethereum", "2500")]));
        let service = ValuationService::new(oracle);

        let enriched = service
            .enrich_one(holding("Ethereum", "2", "4000"))
            .await
            .unwrap();

        // 2 * 2500 = 5000 against 4000 cost -> +25 %
        assert_eq!(enriched.profit_percentage, Some(25.0));
    }

    #[tokio::test]
    async fn test_enrich_one_zero_cost_basis_is_rejected() {
        let oracle = Arc::new(FixedOracle::new(&[("bitcoin", "61000")]));
        let service = ValuationService::new(oracle);

        let err = service
            .enrich_one(holding("bitcoin", "1", "0"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidCostBasis(_)));

        let err = service
            .enrich_one(holding("bitcoin", "0", "60000"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidCostBasis(_)));
    }

    #[tokio::test]
    async fn test_enrich_one_missing_quote() {
        let oracle = Arc::new(FixedOracle::new(&[("bitcoin", "61000")]));
        let service = ValuationService::new(oracle);

        let err = service
            .enrich_one(holding("dogecoin", "100", "50"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::PriceUnavailable(name) if name == "dogecoin"));
    }

    #[tokio::test]
    async fn test_enrich_one_oracle_failure() {
        let service = ValuationService::new(Arc::new(UnreachableOracle));

        let err = service
            .enrich_one(holding("bitcoin", "1", "60000"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::PriceFetch(_)));
    }

    #[tokio::test]
    async fn test_enrich_many_issues_one_batched_fetch() {
        let oracle = Arc::new(FixedOracle::new(&[
            ("bitcoin", "61000"),
            ("ethereum", "2500"),
        ]));
        let service = ValuationService::new(Arc::clone(&oracle) as Arc<dyn PriceOracle>);

        let holdings = vec![
            holding("bitcoin", "1", "60000"),
            holding("ethereum", "2", "4000"),
            holding("Bitcoin", "3", "90000"),
        ];
        let enriched = service.enrich_many(holdings).await.unwrap();

        assert_eq!(oracle.call_count(), 1);
        assert_eq!(enriched.len(), 3);
        assert!(enriched.iter().all(|h| h.profit_percentage.is_some()));
    }

    #[tokio::test]
    async fn test_enrich_many_preserves_input_order() {
        let oracle = Arc::new(FixedOracle::new(&[
            ("bitcoin", "61000"),
            ("ethereum", "2500"),
            ("solana", "150"),
        ]));
        let service = ValuationService::new(oracle);

        let holdings = vec![
            holding("solana", "10", "1000"),
            holding("bitcoin", "1", "60000"),
            holding("ethereum", "2", "4000"),
        ];
        let enriched = service.enrich_many(holdings).await.unwrap();

        let names: Vec<&str> = enriched.iter().map(|h| h.name.as_str()).collect();
        assert_eq!(names, vec!["solana", "bitcoin", "ethereum"]);
    }

    #[tokio::test]
    async fn test_enrich_many_fails_whole_call_on_missing_quote() {
        let oracle = Arc::new(FixedOracle::new(&[("bitcoin", "61000")]));
        let service = ValuationService::new(oracle);

        let holdings = vec![
            holding("bitcoin", "1", "60000"),
            holding("dogecoin", "100", "50"),
        ];
        let err = service.enrich_many(holdings).await.unwrap_err();
        assert!(matches!(err, AppError::PriceUnavailable(_)));
    }

    #[tokio::test]
    async fn test_enrich_many_fails_whole_call_on_zero_cost_basis() {
        let oracle = Arc::new(FixedOracle::new(&[("bitcoin", "61000")]));
        let service = ValuationService::new(oracle);

        let holdings = vec![
            holding("bitcoin", "1", "60000"),
            holding("bitcoin", "0", "0"),
        ];
        let err = service.enrich_many(holdings).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidCostBasis(_)));
    }

    #[tokio::test]
    async fn test_enrich_many_empty_skips_fetch() {
        let oracle = Arc::new(FixedOracle::new(&[]));
        let service = ValuationService::new(Arc::clone(&oracle) as Arc<dyn PriceOracle>);

        let enriched = service.enrich_many(Vec::new()).await.unwrap();
        assert!(enriched.is_empty());
        assert_eq!(oracle.call_count(), 0);
    }

    #[tokio::test]
    async fn test_enrich_many_cancels_cleanly_mid_flight() {
        struct StalledOracle;

        #[async_trait]
        impl PriceOracle for StalledOracle {
            async fn fetch_prices(
                &self,
                _names: &[String],
            ) -> Result<HashMap<String, BigDecimal>, PriceOracleError> {
                std::future::pending().await
            }
        }

        let service = ValuationService::new(Arc::new(StalledOracle));
        let holdings = vec![holding("bitcoin", "1", "60000")];

        // Dropping the call at the timeout must not wedge the runtime;
        // any tasks already spawned are aborted with the JoinSet.
        let result = tokio::time::timeout(
            std::time::Duration::from_millis(50),
            service.enrich_many(holdings),
        )
        .await;
        assert!(result.is_err());
    }

    #[test]
    fn test_apply_profit_narrowing_of_extreme_percentage() {
        // A percentage far beyond f32 range narrows to infinity rather
        // than silently collapsing to 0 %.
        let prices: HashMap<String, BigDecimal> = [(
            "token".to_string(),
            BigDecimal::from_str("1e300").unwrap(),
        )]
        .into();
        let enriched = apply_profit(holding("token", "1e300", "1"), &prices).unwrap();
        assert_eq!(enriched.profit_percentage, Some(f32::INFINITY));
    }

    #[test]
    fn test_apply_profit_exact_decimal_arithmetic() {
        // 0.3 of an asset bought for 0.1 at a price of 1: decimal arithmetic
        // must give exactly +200 %, with no float drift before narrowing.
        let prices: HashMap<String, BigDecimal> =
            [("token".to_string(), BigDecimal::from(1))].into();
        let enriched = apply_profit(holding("token", "0.3", "0.1"), &prices).unwrap();
        assert_eq!(enriched.profit_percentage, Some(200.0));
    }
}
