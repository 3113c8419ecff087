//! Signed, time-boxed invitation tokens.

use std::time::Duration;

use crate::domain::foundation::{DomainError, InvitationId, Timestamp, UserId};
use crate::domain::invitation::InvitationClaims;

/// A freshly issued invitation token.
#[derive(Debug, Clone, PartialEq)]
pub struct IssuedToken {
    /// Opaque token value handed to the invitee.
    pub token: String,
    /// Identifier embedded in the token; the single-use nonce key.
    pub token_id: InvitationId,
    pub issued_at: Timestamp,
    pub expires_at: Timestamp,
}

/// Payload recovered from a successfully verified token.
#[derive(Debug, Clone, PartialEq)]
pub struct VerifiedInvitation {
    pub token_id: InvitationId,
    pub inviter_id: UserId,
    pub claims: InvitationClaims,
    pub expires_at: Timestamp,
}

/// Issues and verifies signed, payload-carrying invitation tokens.
///
/// Verification failures are distinguishable: an expired token fails with
/// `ExpiredToken`, anything else (bad signature, malformed payload) with
/// `InvalidToken`. Token operations are pure computation; no I/O.
pub trait InvitationTokens: Send + Sync {
    /// Issues a token for the inviter carrying the grant payload,
    /// expiring after `ttl`.
    fn issue(
        &self,
        inviter_id: UserId,
        claims: InvitationClaims,
        ttl: Duration,
    ) -> Result<IssuedToken, DomainError>;

    /// Verifies signature and expiry, returning the embedded payload.
    fn verify(&self, token: &str) -> Result<VerifiedInvitation, DomainError>;
}
