//! Store entity.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{StoreId, Timestamp, ValidationError};

/// A merchant storefront. Created once by [`StoreProvisioner`], mutated by
/// profile updates; deletion is not part of the current design.
///
/// [`StoreProvisioner`]: crate::application::StoreProvisioner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Store {
    pub id: StoreId,
    pub name: String,
    pub description: String,
    pub category: String,
    pub profile_image_url: Option<String>,
    pub is_verified: bool,
    pub is_frozen: bool,
    pub created_at: Timestamp,
}

/// Descriptive fields supplied at store creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewStore {
    pub name: String,
    pub description: String,
    pub category: String,
    pub profile_image_url: Option<String>,
}

impl NewStore {
    /// Validates the descriptive fields.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::empty_field("name"));
        }
        if self.name.len() > 128 {
            return Err(ValidationError::out_of_range(
                "name",
                1,
                128,
                self.name.len() as i32,
            ));
        }
        if self.description.trim().is_empty() {
            return Err(ValidationError::empty_field("description"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields() -> NewStore {
        NewStore {
            name: "Igloo Supplies".to_string(),
            description: "Everything for the discerning penguin".to_string(),
            category: "outdoors".to_string(),
            profile_image_url: None,
        }
    }

    #[test]
    fn valid_fields_pass() {
        assert!(fields().validate().is_ok());
    }

    #[test]
    fn blank_name_is_rejected() {
        let mut f = fields();
        f.name = "   ".to_string();
        assert!(f.validate().is_err());
    }

    #[test]
    fn over_long_name_is_rejected() {
        let mut f = fields();
        f.name = "x".repeat(129);
        assert!(f.validate().is_err());
    }

    #[test]
    fn blank_description_is_rejected() {
        let mut f = fields();
        f.description = String::new();
        assert!(f.validate().is_err());
    }
}
