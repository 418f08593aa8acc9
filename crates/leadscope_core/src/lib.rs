//! Access-control core for the LeadScope CRM.
//! This crate is the single source of truth for tenant scoping rules.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod notify;
pub mod repo;
pub mod scope;
pub mod service;

pub use config::{ConfigError, CoreConfig, DatabaseConfig, InviteConfig, LoggingConfig};
pub use logging::{default_log_level, init_from_config, init_logging, logging_status, LoggingError};
pub use model::agent::{Agent, AgentId};
pub use model::category::{Category, CategoryId, CategoryValidationError};
pub use model::identity::{
    Identity, IdentityId, Organization, OrganizationId, Profile, ProfileValidationError, Role,
    RoleTag,
};
pub use model::lead::{Assignment, Categorization, Lead, LeadFields, LeadId, LeadValidationError};
pub use notify::{LogNotifier, Notifier, NotifyError};
pub use repo::agent_repo::{AgentRepository, SqliteAgentRepository};
pub use repo::category_repo::{CategoryRepository, SqliteCategoryRepository};
pub use repo::identity_repo::{IdentityRepository, SqliteIdentityRepository};
pub use repo::lead_repo::{LeadRepository, SqliteLeadRepository};
pub use repo::{RepoError, RepoResult};
pub use scope::{
    authorize, scope, scope_agents, scope_categories, scope_leads, unassigned_leads, Action,
    Clause, EntityKind, PermissionDenied, Predicate,
};
pub use service::agent_service::AgentService;
pub use service::category_service::{CategoryDetail, CategoryOverview, CategoryService};
pub use service::error::{ServiceError, ServiceResult, ValidationError};
pub use service::identity_service::{IdentityProvider, IdentityService, SessionIdentity, Signup};
pub use service::lead_service::{LeadOverview, LeadService};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
