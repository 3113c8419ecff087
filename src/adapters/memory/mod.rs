//! In-memory adapters for tests and local development.

mod dispatcher;
mod nonce_cache;
mod store;

pub use dispatcher::MemoryTaskDispatcher;
pub use nonce_cache::MemoryNonceCache;
pub use store::{
    MemoryCoordinator, MemoryState, MemoryStore, MemoryStoreReader, MemoryStoreTx,
};
