//! Lead persistence and the scoped lifecycle writes.
//!
//! # Responsibility
//! - Store leads under their organization and serve scoped reads.
//! - Perform assignment/categorization with the scope check and the write in
//!   the same immediate transaction.
//!
//! # Invariants
//! - `organization_id` is written once, on insert.
//! - A referenced agent/category must share the lead's organization;
//!   otherwise the write is refused with `CrossOrganization` and nothing
//!   changes.
//! - Lists are ordered by insertion (`created_at`, then `rowid`).

use crate::model::agent::AgentId;
use crate::model::category::CategoryId;
use crate::model::identity::OrganizationId;
use crate::model::lead::{Lead, LeadFields, LeadId};
use crate::repo::{ensure_entity, optional_uuid_column, uuid_column, RepoError, RepoResult};
use crate::scope::{EntityKind, Predicate};
use rusqlite::types::Value;
use rusqlite::{
    params, params_from_iter, Connection, OptionalExtension, Row, Transaction, TransactionBehavior,
};
use uuid::Uuid;

const LEAD_SELECT_SQL: &str = "SELECT
    l.id,
    l.first_name,
    l.last_name,
    l.age,
    l.description,
    l.phone_number,
    l.email,
    l.organization_id,
    l.agent_id,
    l.category_id,
    l.created_at,
    l.updated_at
FROM leads l";

/// Repository interface for leads.
pub trait LeadRepository {
    fn create_lead(&self, organization_id: OrganizationId, fields: &LeadFields) -> RepoResult<Lead>;
    fn get_lead(&self, scope: &Predicate, id: LeadId) -> RepoResult<Option<Lead>>;
    fn list_leads(&self, scope: &Predicate) -> RepoResult<Vec<Lead>>;
    fn count_leads(&self, scope: &Predicate) -> RepoResult<u64>;
    /// Replaces the editable fields of an in-scope lead.
    fn update_lead(&self, scope: &Predicate, id: LeadId, fields: &LeadFields) -> RepoResult<Lead>;
    fn assign_agent(&self, scope: &Predicate, id: LeadId, agent_id: AgentId) -> RepoResult<Lead>;
    /// Sets or clears the category of an in-scope lead.
    fn set_category(
        &self,
        scope: &Predicate,
        id: LeadId,
        category_id: Option<CategoryId>,
    ) -> RepoResult<Lead>;
    fn delete_lead(&self, scope: &Predicate, id: LeadId) -> RepoResult<()>;
}

/// SQLite-backed lead repository.
pub struct SqliteLeadRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteLeadRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl LeadRepository for SqliteLeadRepository<'_> {
    fn create_lead(&self, organization_id: OrganizationId, fields: &LeadFields) -> RepoResult<Lead> {
        let id = Uuid::new_v4();
        self.conn.execute(
            "INSERT INTO leads (
                id,
                first_name,
                last_name,
                age,
                description,
                phone_number,
                email,
                organization_id
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8);",
            params![
                id.to_string(),
                fields.first_name.as_str(),
                fields.last_name.as_str(),
                i64::from(fields.age),
                fields.description.as_str(),
                fields.phone_number.as_str(),
                fields.email.as_str(),
                organization_id.to_string(),
            ],
        )?;

        load_lead_by_id(self.conn, id)?
            .ok_or_else(|| RepoError::InvalidData("lead missing after insert".into()))
    }

    fn get_lead(&self, scope: &Predicate, id: LeadId) -> RepoResult<Option<Lead>> {
        load_lead_in_scope(self.conn, scope, id)
    }

    fn list_leads(&self, scope: &Predicate) -> RepoResult<Vec<Lead>> {
        ensure_entity(scope, EntityKind::Lead)?;
        let (filter, binds) = scope.to_sql();
        let mut stmt = self.conn.prepare(&format!(
            "{LEAD_SELECT_SQL} WHERE {filter} ORDER BY l.created_at ASC, l.rowid ASC;"
        ))?;
        let mut rows = stmt.query(params_from_iter(binds))?;
        let mut leads = Vec::new();
        while let Some(row) = rows.next()? {
            leads.push(parse_lead_row(row)?);
        }
        Ok(leads)
    }

    fn count_leads(&self, scope: &Predicate) -> RepoResult<u64> {
        ensure_entity(scope, EntityKind::Lead)?;
        let (filter, binds) = scope.to_sql();
        let count: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM leads l WHERE {filter};"),
            params_from_iter(binds),
            |row| row.get(0),
        )?;
        u64::try_from(count).map_err(|_| RepoError::InvalidData(format!("negative count {count}")))
    }

    fn update_lead(&self, scope: &Predicate, id: LeadId, fields: &LeadFields) -> RepoResult<Lead> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        require_lead_in_scope(&tx, scope, id)?;

        tx.execute(
            "UPDATE leads
             SET first_name = ?2,
                 last_name = ?3,
                 age = ?4,
                 description = ?5,
                 phone_number = ?6,
                 email = ?7,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1;",
            params![
                id.to_string(),
                fields.first_name.as_str(),
                fields.last_name.as_str(),
                i64::from(fields.age),
                fields.description.as_str(),
                fields.phone_number.as_str(),
                fields.email.as_str(),
            ],
        )?;

        finish(tx, id)
    }

    fn assign_agent(&self, scope: &Predicate, id: LeadId, agent_id: AgentId) -> RepoResult<Lead> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let lead = require_lead_in_scope(&tx, scope, id)?;
        let agent_owner = agent_organization(&tx, agent_id)?
            .ok_or_else(|| RepoError::not_found(EntityKind::Agent, agent_id))?;
        if agent_owner != lead.organization_id {
            return Err(RepoError::CrossOrganization {
                entity: EntityKind::Agent,
                id: agent_id,
            });
        }

        tx.execute(
            "UPDATE leads
             SET agent_id = ?2,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1;",
            params![id.to_string(), agent_id.to_string()],
        )?;

        finish(tx, id)
    }

    fn set_category(
        &self,
        scope: &Predicate,
        id: LeadId,
        category_id: Option<CategoryId>,
    ) -> RepoResult<Lead> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let lead = require_lead_in_scope(&tx, scope, id)?;
        if let Some(category_id) = category_id {
            let category_owner = category_organization(&tx, category_id)?
                .ok_or_else(|| RepoError::not_found(EntityKind::Category, category_id))?;
            if category_owner != lead.organization_id {
                return Err(RepoError::CrossOrganization {
                    entity: EntityKind::Category,
                    id: category_id,
                });
            }
        }

        tx.execute(
            "UPDATE leads
             SET category_id = ?2,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1;",
            params![id.to_string(), category_id.map(|value| value.to_string())],
        )?;

        finish(tx, id)
    }

    fn delete_lead(&self, scope: &Predicate, id: LeadId) -> RepoResult<()> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        require_lead_in_scope(&tx, scope, id)?;
        tx.execute("DELETE FROM leads WHERE id = ?1;", [id.to_string()])?;
        tx.commit()?;
        Ok(())
    }
}

fn finish(tx: Transaction<'_>, id: LeadId) -> RepoResult<Lead> {
    let lead = load_lead_by_id(&tx, id)?
        .ok_or_else(|| RepoError::InvalidData("lead missing after update".into()))?;
    tx.commit()?;
    Ok(lead)
}

fn require_lead_in_scope(conn: &Connection, scope: &Predicate, id: LeadId) -> RepoResult<Lead> {
    load_lead_in_scope(conn, scope, id)?.ok_or_else(|| RepoError::not_found(EntityKind::Lead, id))
}

fn load_lead_in_scope(conn: &Connection, scope: &Predicate, id: LeadId) -> RepoResult<Option<Lead>> {
    ensure_entity(scope, EntityKind::Lead)?;
    let (filter, mut binds) = scope.to_sql();
    binds.push(Value::Text(id.to_string()));
    let mut stmt = conn.prepare(&format!("{LEAD_SELECT_SQL} WHERE {filter} AND l.id = ?;"))?;
    let mut rows = stmt.query(params_from_iter(binds))?;
    match rows.next()? {
        Some(row) => Ok(Some(parse_lead_row(row)?)),
        None => Ok(None),
    }
}

fn load_lead_by_id(conn: &Connection, id: LeadId) -> RepoResult<Option<Lead>> {
    let mut stmt = conn.prepare(&format!("{LEAD_SELECT_SQL} WHERE l.id = ?1;"))?;
    let mut rows = stmt.query([id.to_string()])?;
    match rows.next()? {
        Some(row) => Ok(Some(parse_lead_row(row)?)),
        None => Ok(None),
    }
}

fn agent_organization(conn: &Connection, id: AgentId) -> RepoResult<Option<OrganizationId>> {
    organization_column(
        conn,
        "SELECT organization_id FROM agents WHERE id = ?1;",
        EntityKind::Agent,
        id,
    )
}

fn category_organization(
    conn: &Connection,
    id: CategoryId,
) -> RepoResult<Option<OrganizationId>> {
    organization_column(
        conn,
        "SELECT organization_id FROM categories WHERE id = ?1;",
        EntityKind::Category,
        id,
    )
}

/// Unscoped organization lookup for a referenced row.
fn organization_column(
    conn: &Connection,
    sql: &str,
    entity: EntityKind,
    id: Uuid,
) -> RepoResult<Option<OrganizationId>> {
    let text: Option<String> = conn
        .query_row(sql, [id.to_string()], |row| row.get(0))
        .optional()?;
    text.map(|value| {
        Uuid::parse_str(&value).map_err(|_| {
            RepoError::InvalidData(format!("invalid organization uuid `{value}` on {entity} {id}"))
        })
    })
    .transpose()
}

fn parse_lead_row(row: &Row<'_>) -> RepoResult<Lead> {
    let age: i64 = row.get("age")?;
    let age = u32::try_from(age)
        .map_err(|_| RepoError::InvalidData(format!("invalid age `{age}` in leads.age")))?;

    Ok(Lead {
        id: uuid_column(row, "id")?,
        first_name: row.get("first_name")?,
        last_name: row.get("last_name")?,
        age,
        description: row.get("description")?,
        phone_number: row.get("phone_number")?,
        email: row.get("email")?,
        organization_id: uuid_column(row, "organization_id")?,
        agent_id: optional_uuid_column(row, "agent_id")?,
        category_id: optional_uuid_column(row, "category_id")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}
