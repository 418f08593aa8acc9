//! Agent record.
//!
//! # Invariants
//! - `organization_id` is fixed at creation (enforced again by a schema trigger).
//! - Exactly one identity backs each agent.

use crate::model::identity::{IdentityId, OrganizationId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type AgentId = Uuid;

/// Agent read model joined with its identity profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agent {
    pub id: AgentId,
    pub identity_id: IdentityId,
    pub organization_id: OrganizationId,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    /// Unix epoch milliseconds.
    pub created_at: i64,
}
