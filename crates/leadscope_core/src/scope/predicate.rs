//! Scope predicates and their SQL rendering.

use crate::model::agent::{Agent, AgentId};
use crate::model::category::{Category, CategoryId};
use crate::model::identity::OrganizationId;
use crate::model::lead::Lead;
use rusqlite::types::Value;
use serde::Serialize;

/// Entity kinds the engine scopes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Lead,
    Agent,
    Category,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Lead => "lead",
            EntityKind::Agent => "agent",
            EntityKind::Category => "category",
        }
    }

    /// Table alias the repositories use in their `SELECT` statements.
    pub(crate) fn table_alias(&self) -> &'static str {
        match self {
            EntityKind::Lead => "l",
            EntityKind::Agent => "a",
            EntityKind::Category => "c",
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lead restriction layered on top of the organization pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Clause {
    AssignedTo(AgentId),
    Unassigned,
    Uncategorized,
    InCategory(CategoryId),
}

/// Conjunction of `organization_id = <org>` and zero or more lead clauses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Predicate {
    entity: EntityKind,
    organization_id: OrganizationId,
    clauses: Vec<Clause>,
}

impl Predicate {
    pub(crate) fn new(entity: EntityKind, organization_id: OrganizationId) -> Self {
        Self {
            entity,
            organization_id,
            clauses: Vec::new(),
        }
    }

    /// Adds a clause. Clauses only exist for lead predicates.
    pub(crate) fn and(mut self, clause: Clause) -> Self {
        debug_assert_eq!(self.entity, EntityKind::Lead);
        self.clauses.push(clause);
        self
    }

    pub fn entity(&self) -> EntityKind {
        self.entity
    }

    pub fn organization_id(&self) -> OrganizationId {
        self.organization_id
    }

    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    /// Renders the predicate as a `WHERE` fragment over the entity's table
    /// alias, with positional bind values in order.
    pub fn to_sql(&self) -> (String, Vec<Value>) {
        let alias = self.entity.table_alias();
        let mut sql = format!("{alias}.organization_id = ?");
        let mut binds = vec![Value::Text(self.organization_id.to_string())];

        for clause in &self.clauses {
            match clause {
                Clause::AssignedTo(agent_id) => {
                    sql.push_str(&format!(" AND {alias}.agent_id = ?"));
                    binds.push(Value::Text(agent_id.to_string()));
                }
                Clause::Unassigned => sql.push_str(&format!(" AND {alias}.agent_id IS NULL")),
                Clause::Uncategorized => {
                    sql.push_str(&format!(" AND {alias}.category_id IS NULL"));
                }
                Clause::InCategory(category_id) => {
                    sql.push_str(&format!(" AND {alias}.category_id = ?"));
                    binds.push(Value::Text(category_id.to_string()));
                }
            }
        }

        (sql, binds)
    }

    /// Evaluates the predicate against an in-memory lead.
    pub fn matches_lead(&self, lead: &Lead) -> bool {
        self.entity == EntityKind::Lead
            && lead.organization_id == self.organization_id
            && self.clauses.iter().all(|clause| match clause {
                Clause::AssignedTo(agent_id) => lead.agent_id == Some(*agent_id),
                Clause::Unassigned => lead.agent_id.is_none(),
                Clause::Uncategorized => lead.category_id.is_none(),
                Clause::InCategory(category_id) => lead.category_id == Some(*category_id),
            })
    }

    pub fn matches_agent(&self, agent: &Agent) -> bool {
        self.entity == EntityKind::Agent && agent.organization_id == self.organization_id
    }

    pub fn matches_category(&self, category: &Category) -> bool {
        self.entity == EntityKind::Category && category.organization_id == self.organization_id
    }
}

#[cfg(test)]
mod tests {
    use super::{Clause, EntityKind, Predicate};
    use rusqlite::types::Value;
    use uuid::Uuid;

    #[test]
    fn renders_organization_pin_first() {
        let organization_id = Uuid::new_v4();
        let (sql, binds) = Predicate::new(EntityKind::Category, organization_id).to_sql();
        assert_eq!(sql, "c.organization_id = ?");
        assert_eq!(binds, vec![Value::Text(organization_id.to_string())]);
    }

    #[test]
    fn renders_lead_clauses_in_order() {
        let organization_id = Uuid::new_v4();
        let agent_id = Uuid::new_v4();
        let (sql, binds) = Predicate::new(EntityKind::Lead, organization_id)
            .and(Clause::AssignedTo(agent_id))
            .and(Clause::Uncategorized)
            .to_sql();
        assert_eq!(
            sql,
            "l.organization_id = ? AND l.agent_id = ? AND l.category_id IS NULL"
        );
        assert_eq!(binds.len(), 2);
        assert_eq!(binds[1], Value::Text(agent_id.to_string()));
    }
}
