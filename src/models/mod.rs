mod holding;
mod transaction;

pub use holding::{CreateHolding, Holding, UpdateHolding};
pub use transaction::{CreateTransaction, Transaction, UpdateTransaction};
