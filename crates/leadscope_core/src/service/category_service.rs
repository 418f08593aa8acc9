//! Category use-cases.
//!
//! # Invariants
//! - Categories are visible organization-wide to organizers and agents.
//! - Only organizers create or delete categories.
//! - Leads listed under a category are still filtered by `scope_leads`.

use crate::model::category::{normalize_category_name, Category, CategoryId};
use crate::model::identity::Identity;
use crate::model::lead::Lead;
use crate::repo::category_repo::CategoryRepository;
use crate::repo::lead_repo::LeadRepository;
use crate::scope::{self, Action, EntityKind};
use crate::service::error::{ServiceError, ServiceResult};
use crate::service::{guard, log_denied};
use log::info;
use serde::Serialize;

/// Category list plus the count of visible uncategorized leads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryOverview {
    pub categories: Vec<Category>,
    pub unassigned_lead_count: u64,
}

/// One category with the visible leads filed under it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryDetail {
    pub category: Category,
    pub leads: Vec<Lead>,
}

pub struct CategoryService<C: CategoryRepository, L: LeadRepository> {
    categories: C,
    leads: L,
}

impl<C: CategoryRepository, L: LeadRepository> CategoryService<C, L> {
    pub fn new(categories: C, leads: L) -> Self {
        Self { categories, leads }
    }

    pub fn create_category(&self, identity: &Identity, name: &str) -> ServiceResult<Category> {
        guard(identity, Action::CreateCategory)?;
        let name = normalize_category_name(name)?;
        let category = self
            .categories
            .create_category(identity.organization_id, &name)?;
        info!(
            "event=category_create module=category status=ok identity={} category={}",
            identity.id, category.id
        );
        Ok(category)
    }

    pub fn list_categories(&self, identity: &Identity) -> ServiceResult<Vec<Category>> {
        let predicate =
            scope::scope_categories(identity).map_err(|denied| log_denied(identity, denied))?;
        Ok(self.categories.list_categories(&predicate)?)
    }

    pub fn category_overview(&self, identity: &Identity) -> ServiceResult<CategoryOverview> {
        let categories = self.list_categories(identity)?;
        let unassigned_lead_count = self
            .leads
            .count_leads(&scope::uncategorized_leads(identity))?;
        Ok(CategoryOverview {
            categories,
            unassigned_lead_count,
        })
    }

    pub fn get_category(&self, identity: &Identity, id: CategoryId) -> ServiceResult<Category> {
        let predicate =
            scope::scope_categories(identity).map_err(|denied| log_denied(identity, denied))?;
        self.categories
            .get_category(&predicate, id)?
            .ok_or_else(|| ServiceError::not_found(EntityKind::Category, id))
    }

    /// Category plus the leads in it that `identity` may see.
    pub fn category_detail(
        &self,
        identity: &Identity,
        id: CategoryId,
    ) -> ServiceResult<CategoryDetail> {
        let category = self.get_category(identity, id)?;
        let leads = self
            .leads
            .list_leads(&scope::category_leads(identity, category.id))?;
        Ok(CategoryDetail { category, leads })
    }

    /// Deletes a category; its leads become uncategorized.
    pub fn delete_category(&self, identity: &Identity, id: CategoryId) -> ServiceResult<()> {
        guard(identity, Action::DeleteCategory)?;
        let predicate =
            scope::scope_categories(identity).map_err(|denied| log_denied(identity, denied))?;
        self.categories.delete_category(&predicate, id)?;
        info!(
            "event=category_delete module=category status=ok identity={} category={}",
            identity.id, id
        );
        Ok(())
    }
}
