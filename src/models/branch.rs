//! Branch (tenant) entity model.
//!
//! One row per tenant, stored in the master schema. The `schema` column is
//! generated at provisioning time, globally unique, and immutable; it names
//! the physical schema holding the branch's data.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "branches")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub city: String,
    pub domain_name: String,
    /// Name of the tenant's physical schema. Never user-supplied.
    pub schema: String,
    pub logo_path: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
    /// Deactivation flag; branches are never deleted in normal operation.
    pub is_active: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::user::Entity")]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
