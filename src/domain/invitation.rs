//! Co-ownership invitation tokens and their persisted sessions.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::foundation::{InvitationId, StoreId, Timestamp, UserId};
use super::store::AccessLevel;

/// Scope tag recorded with every invitation session.
///
/// Lets the session table hold several token families without ambiguity.
pub const ACCESS_INVITATION_SCOPE: &str = "access_invitation";

/// Payload carried inside a signed invitation token.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InvitationClaims {
    pub store_id: StoreId,
    pub invitee_id: UserId,
    pub access_level: AccessLevel,
}

/// Persisted record of an issued invitation token.
///
/// Stores a digest of the opaque token value, never the token itself, so
/// that "token was never issued" is detectable independent of signature
/// validity without the table becoming a credential store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvitationSession {
    pub id: InvitationId,
    pub token_digest: String,
    pub scope: String,
    pub inviter_id: UserId,
    pub client_ip: Option<String>,
    pub expires_at: Timestamp,
    pub created_at: Timestamp,
}

impl InvitationSession {
    /// Builds the session record for a freshly issued token.
    pub fn for_issued_token(
        id: InvitationId,
        token: &str,
        inviter_id: UserId,
        client_ip: Option<String>,
        expires_at: Timestamp,
        now: Timestamp,
    ) -> Self {
        Self {
            id,
            token_digest: digest_token(token),
            scope: ACCESS_INVITATION_SCOPE.to_string(),
            inviter_id,
            client_ip,
            expires_at,
            created_at: now,
        }
    }
}

/// Hex-encoded SHA-256 digest of an opaque token value.
pub fn digest_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    let digest = hasher.finalize();
    digest.iter().map(|b| format!("{:02x}", b)).collect()
}
