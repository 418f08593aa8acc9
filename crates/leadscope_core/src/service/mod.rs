//! Core use-case services.
//!
//! # Responsibility
//! - Authorize every call against the acting identity before storage access.
//! - Derive scopes through `crate::scope` and hand them to repositories.
//! - Translate repository failures into the public error taxonomy.
//!
//! # Invariants
//! - No service reads ambient session state; the identity is a parameter.
//! - Role denials surface as `PermissionDenied`, never as empty results.

pub mod agent_service;
pub mod category_service;
pub mod error;
pub mod identity_service;
pub mod lead_service;

use crate::model::identity::Identity;
use crate::scope::{authorize, Action, PermissionDenied};
use self::error::ServiceResult;
use log::warn;

/// Role check shared by all services; logs denials.
pub(crate) fn guard(identity: &Identity, action: Action) -> ServiceResult<()> {
    authorize(identity, action).map_err(|denied| log_denied(identity, denied).into())
}

pub(crate) fn log_denied(identity: &Identity, denied: PermissionDenied) -> PermissionDenied {
    warn!(
        "event=access_denied module=service status=denied identity={} role={} action={}",
        identity.id, denied.role, denied.action
    );
    denied
}
