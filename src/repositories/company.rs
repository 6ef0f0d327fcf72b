//! # Company Repository

use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, IntoActiveModel, ModelTrait, Set};

use crate::models::company::{
    ActiveModel as CompanyActiveModel, Entity as Company, Model as CompanyModel,
};
use crate::repositories::RepositoryError;

/// Request data for creating or updating a company.
#[derive(Debug, Clone)]
pub struct CompanyData {
    pub name: String,
    pub contact_person_name: String,
    pub email: String,
    pub address: String,
    pub phone_number: String,
}

pub struct CompanyRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> CompanyRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn create_company(&self, data: CompanyData) -> Result<CompanyModel, RepositoryError> {
        validate_company(&data)?;

        let company = CompanyActiveModel {
            name: Set(data.name),
            contact_person_name: Set(data.contact_person_name),
            email: Set(data.email),
            address: Set(data.address),
            phone_number: Set(data.phone_number),
            ..Default::default()
        };

        Ok(company.insert(self.db).await?)
    }

    pub async fn get_company(&self, id: i32) -> Result<Option<CompanyModel>, RepositoryError> {
        Ok(Company::find_by_id(id).one(self.db).await?)
    }

    pub async fn list_companies(&self) -> Result<Vec<CompanyModel>, RepositoryError> {
        Ok(Company::find().all(self.db).await?)
    }

    pub async fn update_company(
        &self,
        id: i32,
        data: CompanyData,
    ) -> Result<CompanyModel, RepositoryError> {
        validate_company(&data)?;

        let company = self
            .get_company(id)
            .await?
            .ok_or_else(|| RepositoryError::NotFound("Company not found".to_string()))?;

        let mut active = company.into_active_model();
        active.name = Set(data.name);
        active.contact_person_name = Set(data.contact_person_name);
        active.email = Set(data.email);
        active.address = Set(data.address);
        active.phone_number = Set(data.phone_number);
        active.updated_at = Set(chrono::Utc::now().into());

        Ok(active.update(self.db).await?)
    }

    pub async fn delete_company(&self, id: i32) -> Result<(), RepositoryError> {
        let company = self
            .get_company(id)
            .await?
            .ok_or_else(|| RepositoryError::NotFound("Company not found".to_string()))?;

        company.delete(self.db).await?;
        Ok(())
    }
}

fn validate_company(data: &CompanyData) -> Result<(), RepositoryError> {
    if data.name.trim().is_empty() {
        return Err(RepositoryError::Validation(
            "Company name cannot be empty".to_string(),
        ));
    }
    if !data.email.contains('@') {
        return Err(RepositoryError::Validation(
            "Email address is not valid".to_string(),
        ));
    }
    Ok(())
}
