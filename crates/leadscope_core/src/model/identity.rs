//! Identity and organization records.
//!
//! # Responsibility
//! - Represent the acting user with its role tag and organization.
//! - Validate signup and profile input.
//!
//! # Invariants
//! - An organizer identity owns exactly one organization.
//! - An agent identity belongs to its employer's organization and is tied
//!   to exactly one `Agent` row.

use crate::model::agent::AgentId;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

pub type IdentityId = Uuid;
pub type OrganizationId = Uuid;

const USERNAME_MAX_CHARS: usize = 150;
const PERSON_NAME_MAX_CHARS: usize = 150;

/// Role of an identity inside its organization.
///
/// Agents carry the id of their `Agent` row so lead scoping can be derived
/// from the identity alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "agent_id", rename_all = "snake_case")]
pub enum Role {
    Organizer,
    Agent(AgentId),
}

/// Role without payload, used for storage and error reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleTag {
    Organizer,
    Agent,
}

impl Role {
    pub fn tag(&self) -> RoleTag {
        match self {
            Role::Organizer => RoleTag::Organizer,
            Role::Agent(_) => RoleTag::Agent,
        }
    }

    pub fn is_organizer(&self) -> bool {
        matches!(self, Role::Organizer)
    }

    pub fn agent_id(&self) -> Option<AgentId> {
        match self {
            Role::Organizer => None,
            Role::Agent(agent_id) => Some(*agent_id),
        }
    }
}

impl RoleTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoleTag::Organizer => "organizer",
            RoleTag::Agent => "agent",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "organizer" => Some(RoleTag::Organizer),
            "agent" => Some(RoleTag::Agent),
            _ => None,
        }
    }
}

impl std::fmt::Display for RoleTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Authenticated actor. Every core operation takes one explicitly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: IdentityId,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    pub organization_id: OrganizationId,
    /// Unix epoch milliseconds.
    pub created_at: i64,
}

/// Tenant root, created together with its organizer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    pub id: OrganizationId,
    pub owner_identity_id: IdentityId,
    pub created_at: i64,
}

/// Profile fields shared by signup and agent provisioning.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProfileValidationError {
    #[error("username must not be blank")]
    BlankUsername,
    #[error("username exceeds {max} characters")]
    UsernameTooLong { max: usize },
    #[error("invalid email address: `{0}`")]
    InvalidEmail(String),
    #[error("{field} exceeds {max} characters")]
    NameTooLong { field: &'static str, max: usize },
}

impl Profile {
    pub fn new(username: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            email: email.into(),
            ..Self::default()
        }
    }

    /// Returns a copy with surrounding whitespace removed from every field.
    pub fn normalized(&self) -> Self {
        Self {
            username: self.username.trim().to_string(),
            email: self.email.trim().to_string(),
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
        }
    }

    pub fn validate(&self) -> Result<(), ProfileValidationError> {
        let username = self.username.trim();
        if username.is_empty() {
            return Err(ProfileValidationError::BlankUsername);
        }
        if username.chars().count() > USERNAME_MAX_CHARS {
            return Err(ProfileValidationError::UsernameTooLong {
                max: USERNAME_MAX_CHARS,
            });
        }
        if !is_plausible_email(self.email.trim()) {
            return Err(ProfileValidationError::InvalidEmail(self.email.clone()));
        }
        for (field, value) in [("first_name", &self.first_name), ("last_name", &self.last_name)] {
            if value.trim().chars().count() > PERSON_NAME_MAX_CHARS {
                return Err(ProfileValidationError::NameTooLong {
                    field,
                    max: PERSON_NAME_MAX_CHARS,
                });
            }
        }
        Ok(())
    }
}

/// Accepts `local@domain` with non-empty parts and no whitespace.
pub(crate) fn is_plausible_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    match value.split_once('@') {
        Some((local, domain)) => !local.is_empty() && !domain.is_empty() && !domain.contains('@'),
        None => false,
    }
}
