//! Store domain: the storefront entity, access levels, and ownership.

mod access;
mod store;

pub use access::{AccessLevel, AccessLevelSet, OwnerRosterEntry, StoreOwnership};
pub use store::{NewStore, Store};
