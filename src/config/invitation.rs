//! Invitation token configuration

use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Configuration for signed store-access invitation tokens.
#[derive(Debug, Clone, Deserialize)]
pub struct InvitationConfig {
    /// Symmetric signing key for invitation tokens (HS256).
    pub token_secret: Secret<String>,

    /// Invitation token lifetime in seconds.
    #[serde(default = "default_token_ttl")]
    pub token_ttl_secs: u64,
}

impl InvitationConfig {
    /// Get the token lifetime as a Duration.
    pub fn token_ttl(&self) -> Duration {
        Duration::from_secs(self.token_ttl_secs)
    }

    /// Validate invitation configuration.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.token_secret.expose_secret().is_empty() {
            return Err(ValidationError::MissingRequired(
                "INVITATION_TOKEN_SECRET",
            ));
        }
        if self.token_secret.expose_secret().len() < 32 {
            return Err(ValidationError::TokenSecretTooShort);
        }
        if self.token_ttl_secs == 0 {
            return Err(ValidationError::InvalidTokenTtl);
        }
        Ok(())
    }
}

// Invitations expire after 25 minutes.
fn default_token_ttl() -> u64 {
    1500
}
