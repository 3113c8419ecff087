//! HS256-signed invitation tokens.

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

use crate::config::InvitationConfig;
use crate::domain::foundation::{
    DomainError, ErrorCode, InvitationId, StoreId, Timestamp, UserId,
};
use crate::domain::invitation::InvitationClaims;
use crate::domain::store::AccessLevel;
use crate::ports::{InvitationTokens, IssuedToken, VerifiedInvitation};

/// Registered and private claims carried by an invitation token.
#[derive(Debug, Serialize, Deserialize)]
struct TokenClaims {
    jti: Uuid,
    sub: Uuid,
    iat: i64,
    exp: i64,
    store_id: Uuid,
    invitee_id: Uuid,
    access_level: i32,
}

/// [`InvitationTokens`] implementation over `jsonwebtoken` (HS256).
///
/// The `jti` claim doubles as the single-use nonce key; expiry is
/// enforced by the library with zero leeway so that the cache TTL and the
/// token lifetime agree.
pub struct JwtInvitationTokens {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl JwtInvitationTokens {
    /// Builds the token service from the invitation configuration.
    pub fn new(config: &InvitationConfig) -> Self {
        let secret = config.token_secret.expose_secret().as_bytes();
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
        }
    }
}

impl InvitationTokens for JwtInvitationTokens {
    fn issue(
        &self,
        inviter_id: UserId,
        claims: InvitationClaims,
        ttl: Duration,
    ) -> Result<IssuedToken, DomainError> {
        let token_id = InvitationId::new();
        let issued_at = Timestamp::now();
        let expires_at = issued_at.plus_secs(ttl.as_secs());

        let payload = TokenClaims {
            jti: *token_id.as_uuid(),
            sub: *inviter_id.as_uuid(),
            iat: issued_at.as_unix_secs(),
            exp: expires_at.as_unix_secs(),
            store_id: *claims.store_id.as_uuid(),
            invitee_id: *claims.invitee_id.as_uuid(),
            access_level: claims.access_level.as_i32(),
        };

        let token = encode(&Header::default(), &payload, &self.encoding).map_err(|e| {
            DomainError::new(
                ErrorCode::InternalError,
                format!("Failed to sign invitation token: {}", e),
            )
        })?;

        Ok(IssuedToken {
            token,
            token_id,
            issued_at,
            expires_at,
        })
    }

    fn verify(&self, token: &str) -> Result<VerifiedInvitation, DomainError> {
        let data = decode::<TokenClaims>(token, &self.decoding, &self.validation).map_err(
            |e| {
                use jsonwebtoken::errors::ErrorKind;
                match e.kind() {
                    ErrorKind::ExpiredSignature => {
                        DomainError::new(ErrorCode::ExpiredToken, "Invitation token has expired")
                    }
                    _ => DomainError::new(ErrorCode::InvalidToken, "Invitation token is invalid"),
                }
            },
        )?;

        let claims = data.claims;
        let access_level = AccessLevel::try_from_i32(claims.access_level).map_err(|_| {
            DomainError::new(
                ErrorCode::InvalidToken,
                "Invitation token carries an unknown access level",
            )
        })?;

        Ok(VerifiedInvitation {
            token_id: InvitationId::from_uuid(claims.jti),
            inviter_id: UserId::from_uuid(claims.sub),
            claims: InvitationClaims {
                store_id: StoreId::from_uuid(claims.store_id),
                invitee_id: UserId::from_uuid(claims.invitee_id),
                access_level,
            },
            expires_at: Timestamp::from_unix_secs(claims.exp),
        })
    }
}
