//! Lead lifecycle use-cases.
//!
//! # Responsibility
//! - Create, read, update and delete leads under the caller's scope.
//! - Drive the assignment and categorization axes.
//!
//! # Invariants
//! - Role checks run before any repository call.
//! - Every repository call receives `scope_leads(identity)` (or a narrower
//!   predicate derived from it), so reads and writes share one visibility rule.

use crate::model::agent::AgentId;
use crate::model::category::CategoryId;
use crate::model::identity::Identity;
use crate::model::lead::{Lead, LeadFields, LeadId};
use crate::repo::lead_repo::LeadRepository;
use crate::scope::{self, Action, EntityKind};
use crate::service::error::{ServiceError, ServiceResult};
use crate::service::{guard, log_denied};
use log::info;
use serde::Serialize;

/// Lead list split the way the lead board shows it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LeadOverview {
    /// In-scope leads with an agent.
    pub assigned: Vec<Lead>,
    /// In-scope leads without an agent. Always empty for agents.
    pub unassigned: Vec<Lead>,
}

/// Lead use-case service over a repository implementation.
pub struct LeadService<R: LeadRepository> {
    repo: R,
}

impl<R: LeadRepository> LeadService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates a lead in the organizer's organization, unassigned and
    /// uncategorized.
    pub fn create_lead(&self, identity: &Identity, fields: &LeadFields) -> ServiceResult<Lead> {
        guard(identity, Action::CreateLead)?;
        let fields = fields.normalized();
        fields.validate()?;

        let lead = self.repo.create_lead(identity.organization_id, &fields)?;
        info!(
            "event=lead_create module=lead status=ok identity={} organization={} lead={}",
            identity.id, lead.organization_id, lead.id
        );
        Ok(lead)
    }

    /// Every lead visible to `identity`.
    pub fn list_leads(&self, identity: &Identity) -> ServiceResult<Vec<Lead>> {
        Ok(self.repo.list_leads(&scope::scope_leads(identity))?)
    }

    /// Assigned/unassigned split of the visible leads.
    pub fn lead_overview(&self, identity: &Identity) -> ServiceResult<LeadOverview> {
        let (assigned, unassigned) = self
            .list_leads(identity)?
            .into_iter()
            .partition(|lead| lead.agent_id.is_some());
        Ok(LeadOverview {
            assigned,
            unassigned,
        })
    }

    /// Leads of the organizer's organization that have no agent.
    pub fn list_unassigned_leads(&self, identity: &Identity) -> ServiceResult<Vec<Lead>> {
        let predicate =
            scope::unassigned_leads(identity).map_err(|denied| log_denied(identity, denied))?;
        Ok(self.repo.list_leads(&predicate)?)
    }

    pub fn get_lead(&self, identity: &Identity, id: LeadId) -> ServiceResult<Lead> {
        self.repo
            .get_lead(&scope::scope_leads(identity), id)?
            .ok_or_else(|| ServiceError::not_found(EntityKind::Lead, id))
    }

    /// Replaces the editable fields. Organization, agent and category stay.
    pub fn update_lead(
        &self,
        identity: &Identity,
        id: LeadId,
        fields: &LeadFields,
    ) -> ServiceResult<Lead> {
        guard(identity, Action::UpdateLead)?;
        let fields = fields.normalized();
        fields.validate()?;

        let lead = self
            .repo
            .update_lead(&scope::scope_leads(identity), id, &fields)?;
        info!(
            "event=lead_update module=lead status=ok identity={} lead={}",
            identity.id, lead.id
        );
        Ok(lead)
    }

    /// Assigns an agent of the lead's organization.
    ///
    /// # Errors
    /// - `PermissionDenied` for agents.
    /// - `NotFound` when the lead is out of scope or the agent does not exist.
    /// - `Validation` when the agent belongs to another organization.
    pub fn assign_agent(
        &self,
        identity: &Identity,
        lead_id: LeadId,
        agent_id: AgentId,
    ) -> ServiceResult<Lead> {
        guard(identity, Action::AssignAgent)?;
        let lead = self
            .repo
            .assign_agent(&scope::scope_leads(identity), lead_id, agent_id)?;
        info!(
            "event=lead_assign module=lead status=ok identity={} lead={} agent={}",
            identity.id, lead.id, agent_id
        );
        Ok(lead)
    }

    /// Sets (`Some`) or clears (`None`) the category of a visible lead.
    ///
    /// Agents may categorize the leads assigned to them.
    pub fn update_category(
        &self,
        identity: &Identity,
        lead_id: LeadId,
        category_id: Option<CategoryId>,
    ) -> ServiceResult<Lead> {
        guard(identity, Action::CategorizeLead)?;
        let lead = self
            .repo
            .set_category(&scope::scope_leads(identity), lead_id, category_id)?;
        info!(
            "event=lead_categorize module=lead status=ok identity={} lead={} category={}",
            identity.id,
            lead.id,
            category_id.map_or_else(|| "none".to_string(), |id| id.to_string())
        );
        Ok(lead)
    }

    /// Deletes a lead of the organizer's organization. Deleting an unknown
    /// or foreign id fails with `NotFound`.
    pub fn delete_lead(&self, identity: &Identity, id: LeadId) -> ServiceResult<()> {
        guard(identity, Action::DeleteLead)?;
        self.repo.delete_lead(&scope::scope_leads(identity), id)?;
        info!(
            "event=lead_delete module=lead status=ok identity={} lead={}",
            identity.id, id
        );
        Ok(())
    }

    /// Number of visible leads without a category.
    pub fn unassigned_lead_count(&self, identity: &Identity) -> ServiceResult<u64> {
        Ok(self.repo.count_leads(&scope::uncategorized_leads(identity))?)
    }
}
