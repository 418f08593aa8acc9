//! Identity and organization persistence.
//!
//! # Responsibility
//! - Provision an organizer identity and its organization as one write.
//! - Load identities with their role tag resolved from the `agents` table.
//!
//! # Invariants
//! - `create_organizer` either stores both rows or neither.
//! - An identity stored with role `agent` must have an `agents` row.

use crate::model::identity::{
    Identity, IdentityId, Organization, OrganizationId, Profile, Role, RoleTag,
};
use crate::repo::{
    map_username_conflict, optional_uuid_column, uuid_column, RepoError, RepoResult,
};
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};
use uuid::Uuid;

pub(crate) const IDENTITY_SELECT_SQL: &str = "SELECT
    i.id,
    i.username,
    i.email,
    i.first_name,
    i.last_name,
    i.role,
    i.organization_id,
    i.created_at,
    ag.id AS agent_id
FROM identities i
LEFT JOIN agents ag ON ag.identity_id = i.id";

/// Repository interface for identities and organizations.
pub trait IdentityRepository {
    /// Stores a new organizer identity together with the organization it owns.
    fn create_organizer(&self, profile: &Profile) -> RepoResult<(Identity, Organization)>;
    fn get_identity(&self, id: IdentityId) -> RepoResult<Option<Identity>>;
    fn get_organization(&self, id: OrganizationId) -> RepoResult<Option<Organization>>;
}

/// SQLite-backed identity repository.
pub struct SqliteIdentityRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteIdentityRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl IdentityRepository for SqliteIdentityRepository<'_> {
    fn create_organizer(&self, profile: &Profile) -> RepoResult<(Identity, Organization)> {
        let identity_id = Uuid::new_v4();
        let organization_id = Uuid::new_v4();

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        tx.execute(
            "INSERT INTO identities (
                id, username, email, first_name, last_name, role, organization_id
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
            params![
                identity_id.to_string(),
                profile.username.as_str(),
                profile.email.as_str(),
                profile.first_name.as_str(),
                profile.last_name.as_str(),
                RoleTag::Organizer.as_str(),
                organization_id.to_string(),
            ],
        )
        .map_err(|err| map_username_conflict(err, &profile.username))?;
        tx.execute(
            "INSERT INTO organizations (id, owner_identity_id) VALUES (?1, ?2);",
            params![organization_id.to_string(), identity_id.to_string()],
        )?;

        let identity = load_identity(&tx, identity_id)?
            .ok_or_else(|| RepoError::InvalidData("organizer missing after insert".into()))?;
        let organization = load_organization(&tx, organization_id)?
            .ok_or_else(|| RepoError::InvalidData("organization missing after insert".into()))?;
        tx.commit()?;

        Ok((identity, organization))
    }

    fn get_identity(&self, id: IdentityId) -> RepoResult<Option<Identity>> {
        load_identity(self.conn, id)
    }

    fn get_organization(&self, id: OrganizationId) -> RepoResult<Option<Organization>> {
        load_organization(self.conn, id)
    }
}

pub(crate) fn load_identity(conn: &Connection, id: IdentityId) -> RepoResult<Option<Identity>> {
    let mut stmt = conn.prepare(&format!("{IDENTITY_SELECT_SQL} WHERE i.id = ?1;"))?;
    let mut rows = stmt.query([id.to_string()])?;
    match rows.next()? {
        Some(row) => Ok(Some(parse_identity_row(row)?)),
        None => Ok(None),
    }
}

fn load_organization(conn: &Connection, id: OrganizationId) -> RepoResult<Option<Organization>> {
    let row = conn
        .query_row(
            "SELECT id, owner_identity_id, created_at FROM organizations WHERE id = ?1;",
            [id.to_string()],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, i64>(2)?,
                ))
            },
        )
        .optional()?;

    let Some((id_text, owner_text, created_at)) = row else {
        return Ok(None);
    };
    let parse = |text: &str, column: &str| {
        Uuid::parse_str(text).map_err(|_| {
            RepoError::InvalidData(format!("invalid uuid `{text}` in organizations.{column}"))
        })
    };
    Ok(Some(Organization {
        id: parse(&id_text, "id")?,
        owner_identity_id: parse(&owner_text, "owner_identity_id")?,
        created_at,
    }))
}

fn parse_identity_row(row: &Row<'_>) -> RepoResult<Identity> {
    let id = uuid_column(row, "id")?;
    let role_text: String = row.get("role")?;
    let tag = RoleTag::parse(&role_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid role `{role_text}` in identities.role"))
    })?;
    let agent_id = optional_uuid_column(row, "agent_id")?;

    let role = match (tag, agent_id) {
        (RoleTag::Organizer, None) => Role::Organizer,
        (RoleTag::Agent, Some(agent_id)) => Role::Agent(agent_id),
        (RoleTag::Organizer, Some(_)) => {
            return Err(RepoError::InvalidData(format!(
                "organizer identity {id} is linked to an agent row"
            )));
        }
        (RoleTag::Agent, None) => {
            return Err(RepoError::InvalidData(format!(
                "agent identity {id} has no agent row"
            )));
        }
    };

    Ok(Identity {
        id,
        username: row.get("username")?,
        email: row.get("email")?,
        first_name: row.get("first_name")?,
        last_name: row.get("last_name")?,
        role,
        organization_id: uuid_column(row, "organization_id")?,
        created_at: row.get("created_at")?,
    })
}
