//! Scoped query engine.
//!
//! # Responsibility
//! - Derive the visibility predicate for every entity kind from an identity.
//! - Reject organizer-only actions for agent identities before any query runs.
//!
//! # Invariants
//! - Every predicate pins `organization_id` to the acting identity's
//!   organization; no predicate spans organizations.
//! - Agent identities only ever see leads assigned to their own agent row.
//! - Functions here are pure: same identity, same predicate.

mod predicate;

pub use predicate::{Clause, EntityKind, Predicate};

use crate::model::category::CategoryId;
use crate::model::identity::{Identity, Role, RoleTag};
use serde::Serialize;
use thiserror::Error;

/// Mutations and organizer-only reads guarded by role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    ViewLeads,
    ViewCategories,
    CategorizeLead,
    CreateLead,
    UpdateLead,
    DeleteLead,
    AssignAgent,
    ViewUnassignedLeads,
    CreateAgent,
    ViewAgents,
    UpdateAgent,
    DeleteAgent,
    CreateCategory,
    DeleteCategory,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::ViewLeads => "view_leads",
            Action::ViewCategories => "view_categories",
            Action::CategorizeLead => "categorize_lead",
            Action::CreateLead => "create_lead",
            Action::UpdateLead => "update_lead",
            Action::DeleteLead => "delete_lead",
            Action::AssignAgent => "assign_agent",
            Action::ViewUnassignedLeads => "view_unassigned_leads",
            Action::CreateAgent => "create_agent",
            Action::ViewAgents => "view_agents",
            Action::UpdateAgent => "update_agent",
            Action::DeleteAgent => "delete_agent",
            Action::CreateCategory => "create_category",
            Action::DeleteCategory => "delete_category",
        }
    }

    /// Whether only organizers may perform this action.
    pub fn requires_organizer(&self) -> bool {
        !matches!(
            self,
            Action::ViewLeads | Action::ViewCategories | Action::CategorizeLead
        )
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Role violation, raised before any storage access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{role} may not {action}")]
pub struct PermissionDenied {
    pub role: RoleTag,
    pub action: Action,
}

/// Checks the role of `identity` against `action`.
pub fn authorize(identity: &Identity, action: Action) -> Result<(), PermissionDenied> {
    if action.requires_organizer() && !identity.role.is_organizer() {
        return Err(PermissionDenied {
            role: identity.role.tag(),
            action,
        });
    }
    Ok(())
}

/// Single scoping strategy keyed on the role tag.
///
/// Every entity-specific helper below goes through this function.
pub fn scope(identity: &Identity, entity: EntityKind) -> Result<Predicate, PermissionDenied> {
    match entity {
        EntityKind::Lead => Ok(lead_predicate(identity)),
        EntityKind::Category => Ok(Predicate::new(entity, identity.organization_id)),
        EntityKind::Agent => match identity.role {
            Role::Organizer => Ok(Predicate::new(entity, identity.organization_id)),
            Role::Agent(_) => Err(PermissionDenied {
                role: RoleTag::Agent,
                action: Action::ViewAgents,
            }),
        },
    }
}

fn lead_predicate(identity: &Identity) -> Predicate {
    let base = Predicate::new(EntityKind::Lead, identity.organization_id);
    match identity.role {
        Role::Organizer => base,
        Role::Agent(agent_id) => base.and(Clause::AssignedTo(agent_id)),
    }
}

/// Leads visible to `identity`. Never fails: agents get their own leads.
pub fn scope_leads(identity: &Identity) -> Predicate {
    lead_predicate(identity)
}

/// Agents visible to `identity`; organizer only.
pub fn scope_agents(identity: &Identity) -> Result<Predicate, PermissionDenied> {
    scope(identity, EntityKind::Agent)
}

/// Categories visible to `identity`.
pub fn scope_categories(identity: &Identity) -> Result<Predicate, PermissionDenied> {
    scope(identity, EntityKind::Category)
}

/// Leads in the organizer's organization with no agent; organizer only.
pub fn unassigned_leads(identity: &Identity) -> Result<Predicate, PermissionDenied> {
    authorize(identity, Action::ViewUnassignedLeads)?;
    Ok(scope_leads(identity).and(Clause::Unassigned))
}

/// In-scope leads with no category; the basis of `unassigned_lead_count`.
pub fn uncategorized_leads(identity: &Identity) -> Predicate {
    scope_leads(identity).and(Clause::Uncategorized)
}

/// In-scope leads carrying `category_id`.
pub fn category_leads(identity: &Identity, category_id: CategoryId) -> Predicate {
    scope_leads(identity).and(Clause::InCategory(category_id))
}
