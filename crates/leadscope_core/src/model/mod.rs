//! Tenant-scoped domain model.
//!
//! # Responsibility
//! - Define the records the access-control core reasons about.
//! - Keep field validation next to the types it protects.
//!
//! # Invariants
//! - Every record below an organization carries its `organization_id`.
//! - Organization membership never changes once a record is created.

pub mod agent;
pub mod category;
pub mod identity;
pub mod lead;
