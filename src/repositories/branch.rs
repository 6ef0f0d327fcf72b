//! # Branch Repository
//!
//! Read-side access to branch (tenant) rows in the master schema. Branch
//! creation goes through the tenant provisioner, not this repository.

use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter};

use crate::models::branch::{Column, Entity as Branch, Model as BranchModel};
use crate::repositories::RepositoryError;

pub struct BranchRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> BranchRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn get_branch(&self, id: i32) -> Result<Option<BranchModel>, RepositoryError> {
        Ok(Branch::find_by_id(id).one(self.db).await?)
    }

    pub async fn list_branches(&self) -> Result<Vec<BranchModel>, RepositoryError> {
        Ok(Branch::find().all(self.db).await?)
    }

    /// Domain names identify a branch to its customers and must be unique.
    pub async fn domain_name_exists(&self, domain_name: &str) -> Result<bool, RepositoryError> {
        let count = Branch::find()
            .filter(Column::DomainName.eq(domain_name))
            .count(self.db)
            .await?;
        Ok(count > 0)
    }

    pub async fn city_exists(&self, city: &str) -> Result<bool, RepositoryError> {
        let count = Branch::find()
            .filter(Column::City.eq(city))
            .count(self.db)
            .await?;
        Ok(count > 0)
    }
}
