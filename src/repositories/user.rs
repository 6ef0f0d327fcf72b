//! # User Repository
//!
//! Master-schema user management. Passwords are hashed with argon2 before
//! they reach storage; the clear text is never persisted.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, SaltString};
use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};

use crate::auth::Role;
use crate::models::user::{ActiveModel as UserActiveModel, Column, Entity as User, Model as UserModel};
use crate::repositories::RepositoryError;

/// Request data for creating a new user.
#[derive(Debug, Clone)]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub contact: String,
    pub role: Role,
    pub branch_id: Option<i32>,
}

pub struct UserRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> UserRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn create_user(
        &self,
        request: CreateUserRequest,
    ) -> Result<UserModel, RepositoryError> {
        if request.name.trim().is_empty() {
            return Err(RepositoryError::Validation(
                "User name cannot be empty".to_string(),
            ));
        }
        if !request.email.contains('@') {
            return Err(RepositoryError::Validation(
                "Email address is not valid".to_string(),
            ));
        }
        if request.password.len() < 8 {
            return Err(RepositoryError::Validation(
                "Password must be at least 8 characters long".to_string(),
            ));
        }

        let password_hash = hash_password(&request.password)?;

        let user = UserActiveModel {
            name: Set(request.name),
            email: Set(request.email),
            password_hash: Set(password_hash),
            contact: Set(request.contact),
            role: Set(request.role.as_str().to_string()),
            branch_id: Set(request.branch_id),
            ..Default::default()
        };

        Ok(user.insert(self.db).await?)
    }

    pub async fn find_active_by_email(
        &self,
        email: &str,
    ) -> Result<Option<UserModel>, RepositoryError> {
        Ok(User::find()
            .filter(Column::Email.eq(email))
            .filter(Column::IsActive.eq(true))
            .one(self.db)
            .await?)
    }

    pub async fn email_exists(&self, email: &str) -> Result<bool, RepositoryError> {
        Ok(self.find_active_by_email(email).await?.is_some())
    }
}

pub fn hash_password(password: &str) -> Result<String, RepositoryError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| RepositoryError::Validation(format!("failed to hash password: {err}")))
}

pub fn verify_password(password: &str, password_hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(password_hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify_round_trip() {
        let hash = hash_password("Secret@123").unwrap();

        assert_ne!(hash, "Secret@123");
        assert!(verify_password("Secret@123", &hash));
        assert!(!verify_password("Secret@124", &hash));
    }

    #[test]
    fn verify_rejects_malformed_hashes() {
        assert!(!verify_password("anything", "not-a-phc-string"));
    }

    #[test]
    fn hashes_are_salted() {
        let first = hash_password("Secret@123").unwrap();
        let second = hash_password("Secret@123").unwrap();
        assert_ne!(first, second);
    }
}
