//! Agent provisioning and management.
//!
//! # Responsibility
//! - Provision agent identities for an organizer's organization.
//! - Send the invitation after the provisioning transaction commits.
//! - Scope agent reads, updates and deletes to the organizer's organization.
//!
//! # Invariants
//! - A new agent always lands in the creator's organization.
//! - The initial credential is random and only its digest is stored.
//! - A failed invitation never undoes a committed agent.

use crate::config::InviteConfig;
use crate::model::agent::{Agent, AgentId};
use crate::model::identity::{Identity, Profile};
use crate::notify::Notifier;
use crate::repo::agent_repo::{AgentRepository, NewAgent};
use crate::scope::{self, Action, EntityKind, Predicate};
use crate::service::error::{ServiceError, ServiceResult};
use crate::service::{guard, log_denied};
use log::{info, warn};
use sha2::{Digest, Sha256};
use uuid::Uuid;

pub struct AgentService<R: AgentRepository, N: Notifier> {
    repo: R,
    notifier: N,
    invite: InviteConfig,
}

impl<R: AgentRepository, N: Notifier> AgentService<R, N> {
    pub fn new(repo: R, notifier: N, invite: InviteConfig) -> Self {
        Self {
            repo,
            notifier,
            invite,
        }
    }

    /// Creates an agent identity in the organizer's organization and sends
    /// the invitation.
    pub fn create_agent(&self, identity: &Identity, profile: &Profile) -> ServiceResult<Agent> {
        guard(identity, Action::CreateAgent)?;
        let profile = profile.normalized();
        profile.validate()?;

        let credential_hash = unusable_credential_hash();
        let agent = self.repo.create_agent(&NewAgent {
            organization_id: identity.organization_id,
            profile: &profile,
            credential_hash: &credential_hash,
        })?;
        info!(
            "event=agent_create module=agent status=ok identity={} organization={} agent={}",
            identity.id, agent.organization_id, agent.id
        );

        if let Err(err) =
            self.notifier
                .notify(&agent.email, &self.invite.subject, &self.invite.message)
        {
            warn!(
                "event=agent_invite module=agent status=error agent={} error={}",
                agent.id, err
            );
        }

        Ok(agent)
    }

    pub fn list_agents(&self, identity: &Identity) -> ServiceResult<Vec<Agent>> {
        let predicate = self.agent_scope(identity, Action::ViewAgents)?;
        Ok(self.repo.list_agents(&predicate)?)
    }

    pub fn get_agent(&self, identity: &Identity, id: AgentId) -> ServiceResult<Agent> {
        let predicate = self.agent_scope(identity, Action::ViewAgents)?;
        self.repo
            .get_agent(&predicate, id)?
            .ok_or_else(|| ServiceError::not_found(EntityKind::Agent, id))
    }

    /// Updates the agent's profile. Agents outside the organizer's
    /// organization are reported as `NotFound`.
    pub fn update_agent(
        &self,
        identity: &Identity,
        id: AgentId,
        profile: &Profile,
    ) -> ServiceResult<Agent> {
        let predicate = self.agent_scope(identity, Action::UpdateAgent)?;
        let profile = profile.normalized();
        profile.validate()?;

        let agent = self.repo.update_agent(&predicate, id, &profile)?;
        info!(
            "event=agent_update module=agent status=ok identity={} agent={}",
            identity.id, agent.id
        );
        Ok(agent)
    }

    /// Removes the agent and its identity; its leads become unassigned.
    pub fn delete_agent(&self, identity: &Identity, id: AgentId) -> ServiceResult<()> {
        let predicate = self.agent_scope(identity, Action::DeleteAgent)?;
        self.repo.delete_agent(&predicate, id)?;
        info!(
            "event=agent_delete module=agent status=ok identity={} agent={}",
            identity.id, id
        );
        Ok(())
    }

    fn agent_scope(&self, identity: &Identity, action: Action) -> ServiceResult<Predicate> {
        guard(identity, action)?;
        Ok(scope::scope_agents(identity).map_err(|denied| log_denied(identity, denied))?)
    }
}

/// SHA-256 hex digest of a throwaway random secret. Nobody learns the
/// secret, so the credential cannot be used until a reset flow replaces it.
fn unusable_credential_hash() -> String {
    let secret = Uuid::new_v4();
    hex::encode(Sha256::digest(secret.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::unusable_credential_hash;

    #[test]
    fn credential_hash_is_random_hex_digest() {
        let first = unusable_credential_hash();
        let second = unusable_credential_hash();
        assert_eq!(first.len(), 64);
        assert!(first.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(first, first.to_ascii_lowercase());
        assert_ne!(first, second);
    }
}
