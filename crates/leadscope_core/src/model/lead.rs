//! Lead record and its two independent lifecycle axes.
//!
//! # Responsibility
//! - Define the lead shape and the editable field set.
//! - Validate lead input before it reaches storage.
//!
//! # Invariants
//! - `organization_id` is set at creation and never changes.
//! - Assignment (`agent_id`) and categorization (`category_id`) move
//!   independently; neither has a terminal state.

use crate::model::agent::AgentId;
use crate::model::category::CategoryId;
use crate::model::identity::{is_plausible_email, OrganizationId};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

pub type LeadId = Uuid;

const NAME_MAX_CHARS: usize = 50;
const PHONE_MAX_CHARS: usize = 20;

/// Prospective customer record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lead {
    pub id: LeadId,
    pub first_name: String,
    pub last_name: String,
    pub age: u32,
    pub description: String,
    pub phone_number: String,
    pub email: String,
    pub organization_id: OrganizationId,
    pub agent_id: Option<AgentId>,
    pub category_id: Option<CategoryId>,
    /// Unix epoch milliseconds.
    pub created_at: i64,
    pub updated_at: i64,
}

/// Assignment axis of the lead lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "state", content = "agent_id")]
pub enum Assignment {
    Unassigned,
    Assigned(AgentId),
}

/// Categorization axis of the lead lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "state", content = "category_id")]
pub enum Categorization {
    Uncategorized,
    Categorized(CategoryId),
}

impl Lead {
    pub fn assignment(&self) -> Assignment {
        match self.agent_id {
            Some(agent_id) => Assignment::Assigned(agent_id),
            None => Assignment::Unassigned,
        }
    }

    pub fn categorization(&self) -> Categorization {
        match self.category_id {
            Some(category_id) => Categorization::Categorized(category_id),
            None => Categorization::Uncategorized,
        }
    }
}

/// Editable lead fields. Organization, agent and category are never part of
/// this set; they are owned by dedicated operations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadFields {
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub age: u32,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub phone_number: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LeadValidationError {
    #[error("{field} must not be blank")]
    Blank { field: &'static str },
    #[error("{field} exceeds {max} characters")]
    TooLong { field: &'static str, max: usize },
    #[error("invalid email address: `{0}`")]
    InvalidEmail(String),
}

impl LeadFields {
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            email: email.into(),
            ..Self::default()
        }
    }

    /// Returns a trimmed copy of all text fields.
    pub fn normalized(&self) -> Self {
        Self {
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            age: self.age,
            description: self.description.trim().to_string(),
            phone_number: self.phone_number.trim().to_string(),
            email: self.email.trim().to_string(),
        }
    }

    pub fn validate(&self) -> Result<(), LeadValidationError> {
        check_name("first_name", &self.first_name)?;
        check_name("last_name", &self.last_name)?;
        if self.phone_number.trim().chars().count() > PHONE_MAX_CHARS {
            return Err(LeadValidationError::TooLong {
                field: "phone_number",
                max: PHONE_MAX_CHARS,
            });
        }
        if !is_plausible_email(self.email.trim()) {
            return Err(LeadValidationError::InvalidEmail(self.email.clone()));
        }
        Ok(())
    }
}

fn check_name(field: &'static str, value: &str) -> Result<(), LeadValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(LeadValidationError::Blank { field });
    }
    if trimmed.chars().count() > NAME_MAX_CHARS {
        return Err(LeadValidationError::TooLong {
            field,
            max: NAME_MAX_CHARS,
        });
    }
    Ok(())
}
