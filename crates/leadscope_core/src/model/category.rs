//! Category record.

use crate::model::identity::OrganizationId;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

pub type CategoryId = Uuid;

const CATEGORY_NAME_MAX_CHARS: usize = 30;

/// Organizer-defined label for leads, owned by one organization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub organization_id: OrganizationId,
    pub created_at: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CategoryValidationError {
    #[error("category name must not be blank")]
    BlankName,
    #[error("category name exceeds {max} characters")]
    NameTooLong { max: usize },
}

/// Trims and validates a category name.
pub fn normalize_category_name(name: &str) -> Result<String, CategoryValidationError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(CategoryValidationError::BlankName);
    }
    if trimmed.chars().count() > CATEGORY_NAME_MAX_CHARS {
        return Err(CategoryValidationError::NameTooLong {
            max: CATEGORY_NAME_MAX_CHARS,
        });
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::{normalize_category_name, CategoryValidationError};

    #[test]
    fn category_name_is_trimmed_and_bounded() {
        assert_eq!(normalize_category_name("  Contacted ").unwrap(), "Contacted");
        assert_eq!(
            normalize_category_name("   "),
            Err(CategoryValidationError::BlankName)
        );
        assert!(matches!(
            normalize_category_name(&"x".repeat(31)),
            Err(CategoryValidationError::NameTooLong { max: 30 })
        ));
    }
}
