//! Agent persistence.
//!
//! # Responsibility
//! - Create an agent identity and its agent row in one transaction.
//! - Serve scoped agent reads, profile updates and deletion.
//!
//! # Invariants
//! - Agent and identity share the same `organization_id`.
//! - Deleting an agent removes its identity; its leads become unassigned
//!   through `ON DELETE SET NULL`.

use crate::model::agent::{Agent, AgentId};
use crate::model::identity::{OrganizationId, Profile, RoleTag};
use crate::repo::{ensure_entity, map_username_conflict, uuid_column, RepoError, RepoResult};
use crate::scope::{EntityKind, Predicate};
use rusqlite::{params, params_from_iter, Connection, Row, Transaction, TransactionBehavior};
use uuid::Uuid;

const AGENT_SELECT_SQL: &str = "SELECT
    a.id,
    a.identity_id,
    a.organization_id,
    a.created_at,
    i.username,
    i.email,
    i.first_name,
    i.last_name
FROM agents a
JOIN identities i ON i.id = a.identity_id";

/// New agent identity payload.
#[derive(Debug, Clone)]
pub struct NewAgent<'a> {
    pub organization_id: OrganizationId,
    pub profile: &'a Profile,
    pub credential_hash: &'a str,
}

/// Repository interface for agents.
pub trait AgentRepository {
    fn create_agent(&self, agent: &NewAgent<'_>) -> RepoResult<Agent>;
    fn get_agent(&self, scope: &Predicate, id: AgentId) -> RepoResult<Option<Agent>>;
    fn list_agents(&self, scope: &Predicate) -> RepoResult<Vec<Agent>>;
    fn update_agent(&self, scope: &Predicate, id: AgentId, profile: &Profile) -> RepoResult<Agent>;
    fn delete_agent(&self, scope: &Predicate, id: AgentId) -> RepoResult<()>;
}

/// SQLite-backed agent repository.
pub struct SqliteAgentRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteAgentRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl AgentRepository for SqliteAgentRepository<'_> {
    fn create_agent(&self, agent: &NewAgent<'_>) -> RepoResult<Agent> {
        let identity_id = Uuid::new_v4();
        let agent_id = Uuid::new_v4();

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        tx.execute(
            "INSERT INTO identities (
                id, username, email, first_name, last_name, role, organization_id, credential_hash
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8);",
            params![
                identity_id.to_string(),
                agent.profile.username.as_str(),
                agent.profile.email.as_str(),
                agent.profile.first_name.as_str(),
                agent.profile.last_name.as_str(),
                RoleTag::Agent.as_str(),
                agent.organization_id.to_string(),
                agent.credential_hash,
            ],
        )
        .map_err(|err| map_username_conflict(err, &agent.profile.username))?;
        tx.execute(
            "INSERT INTO agents (id, identity_id, organization_id) VALUES (?1, ?2, ?3);",
            params![
                agent_id.to_string(),
                identity_id.to_string(),
                agent.organization_id.to_string(),
            ],
        )?;

        let created = load_agent_by_id(&tx, agent_id)?
            .ok_or_else(|| RepoError::InvalidData("agent missing after insert".into()))?;
        tx.commit()?;
        Ok(created)
    }

    fn get_agent(&self, scope: &Predicate, id: AgentId) -> RepoResult<Option<Agent>> {
        load_agent_in_scope(self.conn, scope, id)
    }

    fn list_agents(&self, scope: &Predicate) -> RepoResult<Vec<Agent>> {
        ensure_entity(scope, EntityKind::Agent)?;
        let (filter, binds) = scope.to_sql();
        let mut stmt = self.conn.prepare(&format!(
            "{AGENT_SELECT_SQL} WHERE {filter} ORDER BY a.created_at ASC, a.rowid ASC;"
        ))?;
        let mut rows = stmt.query(params_from_iter(binds))?;
        let mut agents = Vec::new();
        while let Some(row) = rows.next()? {
            agents.push(parse_agent_row(row)?);
        }
        Ok(agents)
    }

    fn update_agent(&self, scope: &Predicate, id: AgentId, profile: &Profile) -> RepoResult<Agent> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let existing = load_agent_in_scope(&tx, scope, id)?
            .ok_or_else(|| RepoError::not_found(EntityKind::Agent, id))?;

        tx.execute(
            "UPDATE identities
             SET username = ?2,
                 email = ?3,
                 first_name = ?4,
                 last_name = ?5
             WHERE id = ?1;",
            params![
                existing.identity_id.to_string(),
                profile.username.as_str(),
                profile.email.as_str(),
                profile.first_name.as_str(),
                profile.last_name.as_str(),
            ],
        )
        .map_err(|err| map_username_conflict(err, &profile.username))?;

        let updated = load_agent_by_id(&tx, id)?
            .ok_or_else(|| RepoError::InvalidData("agent missing after update".into()))?;
        tx.commit()?;
        Ok(updated)
    }

    fn delete_agent(&self, scope: &Predicate, id: AgentId) -> RepoResult<()> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let existing = load_agent_in_scope(&tx, scope, id)?
            .ok_or_else(|| RepoError::not_found(EntityKind::Agent, id))?;

        // Cascades to the agent row; leads fall back to unassigned.
        tx.execute(
            "DELETE FROM identities WHERE id = ?1;",
            [existing.identity_id.to_string()],
        )?;
        tx.commit()?;
        Ok(())
    }
}

fn load_agent_in_scope(
    conn: &Connection,
    scope: &Predicate,
    id: AgentId,
) -> RepoResult<Option<Agent>> {
    ensure_entity(scope, EntityKind::Agent)?;
    let (filter, mut binds) = scope.to_sql();
    binds.push(rusqlite::types::Value::Text(id.to_string()));
    let mut stmt = conn.prepare(&format!("{AGENT_SELECT_SQL} WHERE {filter} AND a.id = ?;"))?;
    let mut rows = stmt.query(params_from_iter(binds))?;
    match rows.next()? {
        Some(row) => Ok(Some(parse_agent_row(row)?)),
        None => Ok(None),
    }
}

fn load_agent_by_id(conn: &Connection, id: AgentId) -> RepoResult<Option<Agent>> {
    let mut stmt = conn.prepare(&format!("{AGENT_SELECT_SQL} WHERE a.id = ?1;"))?;
    let mut rows = stmt.query([id.to_string()])?;
    match rows.next()? {
        Some(row) => Ok(Some(parse_agent_row(row)?)),
        None => Ok(None),
    }
}

fn parse_agent_row(row: &Row<'_>) -> RepoResult<Agent> {
    Ok(Agent {
        id: uuid_column(row, "id")?,
        identity_id: uuid_column(row, "identity_id")?,
        organization_id: uuid_column(row, "organization_id")?,
        username: row.get("username")?,
        email: row.get("email")?,
        first_name: row.get("first_name")?,
        last_name: row.get("last_name")?,
        created_at: row.get("created_at")?,
    })
}
