//! User accounts.
//!
//! Passwords are stored as argon2id PHC strings, never in clear.

use std::{fmt, str::FromStr};

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::{DateTime, Utc};
use sea_orm::entity::{ActiveValue, prelude::*};
use serde::{Deserialize, Serialize};

use crate::{EngineError, ResultEngine};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    #[default]
    Customer,
    Staff,
    Admin,
}

impl UserRole {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Customer => "customer",
            Self::Staff => "staff",
            Self::Admin => "admin",
        }
    }

    /// Staff and admins can manage every shipment.
    #[must_use]
    pub const fn is_staff(self) -> bool {
        matches!(self, Self::Staff | Self::Admin)
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "customer" => Ok(Self::Customer),
            "staff" => Ok(Self::Staff),
            "admin" => Ok(Self::Admin),
            other => Err(EngineError::InvalidInput(format!("unknown role: {other}"))),
        }
    }
}

/// A registered user, without credentials.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub role: UserRole,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Owners can read their own records, staff can read everything.
    #[must_use]
    pub fn can_access(&self, owner_id: Option<Uuid>) -> bool {
        self.role.is_staff() || owner_id == Some(self.id)
    }
}

impl TryFrom<Model> for User {
    type Error = EngineError;

    fn try_from(value: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: value.id,
            email: value.email,
            full_name: value.full_name,
            phone: value.phone,
            role: value.role.parse()?,
            is_active: value.is_active,
            created_at: value.created_at,
        })
    }
}

pub(crate) fn hash_password(password: &str) -> ResultEngine<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| EngineError::Password(err.to_string()))
}

pub(crate) fn verify_password(password: &str, hash: &str) -> ResultEngine<bool> {
    let parsed = PasswordHash::new(hash).map_err(|err| EngineError::Password(err.to_string()))?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(err) => Err(EngineError::Password(err.to_string())),
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub email: String,
    pub password_hash: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub role: String,
    pub is_active: bool,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::quotes::Entity")]
    Quotes,
    #[sea_orm(has_many = "super::shipments::Entity")]
    Shipments,
}

impl Related<super::quotes::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Quotes.def()
    }
}

impl Related<super::shipments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Shipments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl ActiveModel {
    pub(crate) fn for_new_user(
        email: String,
        password_hash: String,
        full_name: String,
        phone: Option<String>,
        role: UserRole,
    ) -> Self {
        Self {
            id: ActiveValue::Set(Uuid::new_v4()),
            email: ActiveValue::Set(email),
            password_hash: ActiveValue::Set(password_hash),
            full_name: ActiveValue::Set(full_name),
            phone: ActiveValue::Set(phone),
            role: ActiveValue::Set(role.as_str().to_string()),
            is_active: ActiveValue::Set(true),
            created_at: ActiveValue::Set(Utc::now()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashed_password_verifies() {
        let hash = hash_password("Customer123").unwrap();
        assert_ne!(hash, "Customer123");
        assert!(verify_password("Customer123", &hash).unwrap());
        assert!(!verify_password("customer123", &hash).unwrap());
    }

    #[test]
    fn malformed_hash_is_an_error() {
        assert!(verify_password("Customer123", "plain").is_err());
    }

    #[test]
    fn staff_can_access_any_record() {
        let mut user = User {
            id: Uuid::new_v4(),
            email: "customer@test.com".to_string(),
            full_name: "Test Customer".to_string(),
            phone: None,
            role: UserRole::Customer,
            is_active: true,
            created_at: Utc::now(),
        };
        let other = Uuid::new_v4();

        assert!(user.can_access(Some(user.id)));
        assert!(!user.can_access(Some(other)));
        assert!(!user.can_access(None));

        user.role = UserRole::Staff;
        assert!(user.can_access(Some(other)));
        assert!(user.can_access(None));
    }
}
