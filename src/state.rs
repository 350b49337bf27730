use std::sync::Arc;

use crate::external::price_oracle::PriceOracle;
use crate::services::holding_service::HoldingService;
use crate::services::transaction_recorder::TransactionRecorder;

#[derive(Clone)]
pub struct AppState {
    pub holdings: Arc<HoldingService>,
    pub transactions: Arc<TransactionRecorder>,
    pub price_oracle: Arc<dyn PriceOracle>,
}
