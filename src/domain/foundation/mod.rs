//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers, and error types that form the
//! vocabulary of the storefront domain.

mod errors;
mod ids;
mod rating;
mod state_machine;
mod timestamp;

pub use errors::{DomainError, ErrorClass, ErrorCode, ValidationError};
pub use ids::{
    AccountId, InvitationId, ItemId, OrderId, ReviewId, SaleId, StoreId, UserId,
};
pub use rating::Rating;
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
