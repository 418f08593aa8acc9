//! Repository layer abstractions and SQLite implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts per entity.
//! - Apply scope predicates to every read and every scoped write.
//! - Isolate SQL details from the service layer.
//!
//! # Invariants
//! - Scoped writes check the predicate and mutate inside one
//!   `BEGIN IMMEDIATE` transaction.
//! - Read paths reject invalid persisted state instead of masking it.

use crate::db::DbError;
use crate::scope::{EntityKind, Predicate};
use rusqlite::{ErrorCode, Row};
use thiserror::Error;
use uuid::Uuid;

pub mod agent_repo;
pub mod category_repo;
pub mod identity_repo;
pub mod lead_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error shared by every entity repository.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("{0}")]
    Db(#[from] DbError),
    /// Missing, or present but outside the caller's scope.
    #[error("{entity} not found: {id}")]
    NotFound { entity: EntityKind, id: Uuid },
    /// Referenced entity exists but belongs to a different organization.
    #[error("{entity} {id} belongs to a different organization")]
    CrossOrganization { entity: EntityKind, id: Uuid },
    #[error("username already taken: `{0}`")]
    DuplicateUsername(String),
    #[error("scope for {actual} used where {expected} scope is required")]
    ScopeMismatch {
        expected: EntityKind,
        actual: EntityKind,
    },
    #[error("invalid persisted data: {0}")]
    InvalidData(String),
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl RepoError {
    pub(crate) fn not_found(entity: EntityKind, id: Uuid) -> Self {
        Self::NotFound { entity, id }
    }
}

pub(crate) fn ensure_entity(scope: &Predicate, expected: EntityKind) -> RepoResult<()> {
    if scope.entity() != expected {
        return Err(RepoError::ScopeMismatch {
            expected,
            actual: scope.entity(),
        });
    }
    Ok(())
}

pub(crate) fn uuid_column(row: &Row<'_>, column: &str) -> RepoResult<Uuid> {
    let text: String = row.get(column)?;
    Uuid::parse_str(&text)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid `{text}` in column {column}")))
}

pub(crate) fn optional_uuid_column(row: &Row<'_>, column: &str) -> RepoResult<Option<Uuid>> {
    match row.get::<_, Option<String>>(column)? {
        Some(text) => Uuid::parse_str(&text).map(Some).map_err(|_| {
            RepoError::InvalidData(format!("invalid uuid `{text}` in column {column}"))
        }),
        None => Ok(None),
    }
}

/// Maps a unique-constraint failure on `identities.username` to a semantic
/// error; everything else passes through.
pub(crate) fn map_username_conflict(err: rusqlite::Error, username: &str) -> RepoError {
    if let rusqlite::Error::SqliteFailure(failure, Some(message)) = &err {
        if failure.code == ErrorCode::ConstraintViolation
            && message.contains("identities.username")
        {
            return RepoError::DuplicateUsername(username.to_string());
        }
    }
    err.into()
}
