//! Signup and identity resolution.
//!
//! # Responsibility
//! - Create organizer identities with their organization in one step.
//! - Resolve identities for the session layer.
//!
//! # Invariants
//! - Signup never returns an identity without its organization.
//! - Signup always yields an organizer; agents only come from provisioning.

use crate::model::identity::{Identity, IdentityId, Organization, Profile};
use crate::repo::identity_repo::IdentityRepository;
use crate::service::error::{ServiceError, ServiceResult};
use log::info;

/// Source of the acting identity for a request.
pub trait IdentityProvider {
    fn current_identity(&self) -> ServiceResult<Identity>;
}

impl IdentityProvider for Identity {
    fn current_identity(&self) -> ServiceResult<Identity> {
        Ok(self.clone())
    }
}

/// Organizer identity together with the organization it owns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signup {
    pub identity: Identity,
    pub organization: Organization,
}

pub struct IdentityService<R: IdentityRepository> {
    repo: R,
}

impl<R: IdentityRepository> IdentityService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates an organizer identity and provisions its organization.
    pub fn create_identity(&self, profile: &Profile) -> ServiceResult<Signup> {
        let profile = profile.normalized();
        profile.validate()?;

        let (identity, organization) = self.repo.create_organizer(&profile)?;
        info!(
            "event=identity_create module=identity status=ok identity={} organization={}",
            identity.id, organization.id
        );
        Ok(Signup {
            identity,
            organization,
        })
    }

    pub fn get_identity(&self, id: IdentityId) -> ServiceResult<Identity> {
        self.repo
            .get_identity(id)?
            .ok_or(ServiceError::NotFound {
                entity: "identity",
                id,
            })
    }

    /// Organization the identity belongs to.
    pub fn organization_of(&self, identity: &Identity) -> ServiceResult<Organization> {
        self.repo
            .get_organization(identity.organization_id)?
            .ok_or(ServiceError::NotFound {
                entity: "organization",
                id: identity.organization_id,
            })
    }

    /// Binds a session's identity id to this service.
    pub fn session(&self, identity_id: IdentityId) -> SessionIdentity<'_, R> {
        SessionIdentity {
            service: self,
            identity_id,
        }
    }
}

/// Identity provider backed by the store, for a session that carries only
/// the identity id.
pub struct SessionIdentity<'s, R: IdentityRepository> {
    service: &'s IdentityService<R>,
    identity_id: IdentityId,
}

impl<R: IdentityRepository> IdentityProvider for SessionIdentity<'_, R> {
    fn current_identity(&self) -> ServiceResult<Identity> {
        self.service.get_identity(self.identity_id)
    }
}
