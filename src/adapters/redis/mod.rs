//! Redis adapters: single-use token cache and task queue.

mod dispatcher;
mod nonce_cache;

pub use dispatcher::{
    RedisTaskDispatcher, INVITATION_EMAIL_QUEUE, PROVISION_ACCOUNT_QUEUE,
};
pub use nonce_cache::RedisNonceCache;
