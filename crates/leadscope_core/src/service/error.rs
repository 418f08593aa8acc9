//! Public error taxonomy for service callers.

use crate::model::category::CategoryValidationError;
use crate::model::identity::ProfileValidationError;
use crate::model::lead::LeadValidationError;
use crate::repo::RepoError;
use crate::scope::{EntityKind, PermissionDenied};
use thiserror::Error;
use uuid::Uuid;

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug, Error)]
pub enum ServiceError {
    /// Role or organizational-scope violation.
    #[error("permission denied: {0}")]
    PermissionDenied(#[from] PermissionDenied),
    /// Missing or out of scope; both look the same to the caller.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: Uuid },
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),
    #[error("storage failure: {0}")]
    Repo(RepoError),
}

/// Input or cross-reference problems detected before any write.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{entity} {id} belongs to a different organization")]
    CrossOrganization { entity: EntityKind, id: Uuid },
    #[error("username already taken: `{0}`")]
    DuplicateUsername(String),
    #[error(transparent)]
    Lead(#[from] LeadValidationError),
    #[error(transparent)]
    Profile(#[from] ProfileValidationError),
    #[error(transparent)]
    Category(#[from] CategoryValidationError),
}

impl ServiceError {
    pub fn not_found(entity: EntityKind, id: Uuid) -> Self {
        Self::NotFound {
            entity: entity.as_str(),
            id,
        }
    }

    pub fn is_permission_denied(&self) -> bool {
        matches!(self, Self::PermissionDenied(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound { entity, id } => Self::not_found(entity, id),
            RepoError::CrossOrganization { entity, id } => {
                Self::Validation(ValidationError::CrossOrganization { entity, id })
            }
            RepoError::DuplicateUsername(username) => {
                Self::Validation(ValidationError::DuplicateUsername(username))
            }
            other => Self::Repo(other),
        }
    }
}

impl From<LeadValidationError> for ServiceError {
    fn from(value: LeadValidationError) -> Self {
        Self::Validation(value.into())
    }
}

impl From<ProfileValidationError> for ServiceError {
    fn from(value: ProfileValidationError) -> Self {
        Self::Validation(value.into())
    }
}

impl From<CategoryValidationError> for ServiceError {
    fn from(value: CategoryValidationError) -> Self {
        Self::Validation(value.into())
    }
}

#[cfg(test)]
mod tests {
    use super::{ServiceError, ValidationError};
    use crate::repo::RepoError;
    use crate::scope::EntityKind;
    use uuid::Uuid;

    #[test]
    fn repo_errors_map_onto_taxonomy() {
        let id = Uuid::new_v4();
        let not_found: ServiceError = RepoError::NotFound {
            entity: EntityKind::Lead,
            id,
        }
        .into();
        assert!(matches!(not_found, ServiceError::NotFound { entity: "lead", id: found } if found == id));

        let cross: ServiceError = RepoError::CrossOrganization {
            entity: EntityKind::Agent,
            id,
        }
        .into();
        assert!(matches!(
            cross,
            ServiceError::Validation(ValidationError::CrossOrganization {
                entity: EntityKind::Agent,
                ..
            })
        ));

        let data: ServiceError = RepoError::InvalidData("bad".into()).into();
        assert!(matches!(data, ServiceError::Repo(_)));
    }
}
