pub mod holding_store;
pub mod transaction_store;

pub use holding_store::{HoldingStore, PgHoldingStore};
pub use transaction_store::{PgTransactionStore, TransactionStore};
