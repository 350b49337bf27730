pub mod holding_service;
pub mod transaction_recorder;
pub mod valuation_service;
