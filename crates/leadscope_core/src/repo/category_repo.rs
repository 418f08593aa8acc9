//! Category persistence.

use crate::model::category::{Category, CategoryId};
use crate::model::identity::OrganizationId;
use crate::repo::{ensure_entity, uuid_column, RepoError, RepoResult};
use crate::scope::{EntityKind, Predicate};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row, Transaction, TransactionBehavior};
use uuid::Uuid;

const CATEGORY_SELECT_SQL: &str = "SELECT
    c.id,
    c.name,
    c.organization_id,
    c.created_at
FROM categories c";

/// Repository interface for categories.
pub trait CategoryRepository {
    fn create_category(&self, organization_id: OrganizationId, name: &str) -> RepoResult<Category>;
    fn get_category(&self, scope: &Predicate, id: CategoryId) -> RepoResult<Option<Category>>;
    fn list_categories(&self, scope: &Predicate) -> RepoResult<Vec<Category>>;
    /// Removes a category; leads referencing it become uncategorized.
    fn delete_category(&self, scope: &Predicate, id: CategoryId) -> RepoResult<()>;
}

/// SQLite-backed category repository.
pub struct SqliteCategoryRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCategoryRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl CategoryRepository for SqliteCategoryRepository<'_> {
    fn create_category(&self, organization_id: OrganizationId, name: &str) -> RepoResult<Category> {
        let id = Uuid::new_v4();
        self.conn.execute(
            "INSERT INTO categories (id, name, organization_id) VALUES (?1, ?2, ?3);",
            params![id.to_string(), name, organization_id.to_string()],
        )?;

        let scope = Predicate::new(EntityKind::Category, organization_id);
        load_category_in_scope(self.conn, &scope, id)?
            .ok_or_else(|| RepoError::InvalidData("category missing after insert".into()))
    }

    fn get_category(&self, scope: &Predicate, id: CategoryId) -> RepoResult<Option<Category>> {
        load_category_in_scope(self.conn, scope, id)
    }

    fn list_categories(&self, scope: &Predicate) -> RepoResult<Vec<Category>> {
        ensure_entity(scope, EntityKind::Category)?;
        let (filter, binds) = scope.to_sql();
        let mut stmt = self.conn.prepare(&format!(
            "{CATEGORY_SELECT_SQL} WHERE {filter} ORDER BY c.name COLLATE NOCASE ASC, c.id ASC;"
        ))?;
        let mut rows = stmt.query(params_from_iter(binds))?;
        let mut categories = Vec::new();
        while let Some(row) = rows.next()? {
            categories.push(parse_category_row(row)?);
        }
        Ok(categories)
    }

    fn delete_category(&self, scope: &Predicate, id: CategoryId) -> RepoResult<()> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        if load_category_in_scope(&tx, scope, id)?.is_none() {
            return Err(RepoError::not_found(EntityKind::Category, id));
        }
        tx.execute("DELETE FROM categories WHERE id = ?1;", [id.to_string()])?;
        tx.commit()?;
        Ok(())
    }
}

fn load_category_in_scope(
    conn: &Connection,
    scope: &Predicate,
    id: CategoryId,
) -> RepoResult<Option<Category>> {
    ensure_entity(scope, EntityKind::Category)?;
    let (filter, mut binds) = scope.to_sql();
    binds.push(Value::Text(id.to_string()));
    let mut stmt = conn.prepare(&format!("{CATEGORY_SELECT_SQL} WHERE {filter} AND c.id = ?;"))?;
    let mut rows = stmt.query(params_from_iter(binds))?;
    match rows.next()? {
        Some(row) => Ok(Some(parse_category_row(row)?)),
        None => Ok(None),
    }
}

fn parse_category_row(row: &Row<'_>) -> RepoResult<Category> {
    Ok(Category {
        id: uuid_column(row, "id")?,
        name: row.get("name")?,
        organization_id: uuid_column(row, "organization_id")?,
        created_at: row.get("created_at")?,
    })
}
