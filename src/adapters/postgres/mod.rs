//! PostgreSQL adapters: transaction coordinator, transactional handle,
//! and read side.

mod coordinator;
mod reader;
mod rows;
mod store_tx;

pub use coordinator::PgCoordinator;
pub use reader::PgStoreReader;
pub use store_tx::PgStoreTx;
