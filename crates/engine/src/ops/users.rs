use sea_orm::{QueryFilter, TransactionTrait, prelude::*};

use crate::{
    EngineError, ResultEngine, User, UserRole,
    users::{self, hash_password, verify_password},
    validation::{normalize_email, normalize_phone, normalize_required, validate_password},
};

use super::{Engine, with_tx};

impl Engine {
    /// Register a customer account.
    pub async fn register_user(
        &self,
        email: &str,
        password: &str,
        full_name: &str,
        phone: Option<&str>,
    ) -> ResultEngine<User> {
        self.create_user_with_role(email, password, full_name, phone, UserRole::Customer)
            .await
    }

    /// Create an account with an explicit role.
    pub async fn create_user_with_role(
        &self,
        email: &str,
        password: &str,
        full_name: &str,
        phone: Option<&str>,
        role: UserRole,
    ) -> ResultEngine<User> {
        let email = normalize_email(email)?;
        validate_password(password)?;
        let full_name = normalize_required(full_name, "full name")?;
        let phone = normalize_phone(phone)?;
        let password_hash = hash_password(password)?;

        with_tx!(self, |db_tx| {
            let exists = users::Entity::find()
                .filter(users::Column::Email.eq(email.clone()))
                .one(&db_tx)
                .await?
                .is_some();
            if exists {
                return Err(EngineError::ExistingKey(email));
            }

            let model = users::ActiveModel::for_new_user(email, password_hash, full_name, phone, role)
                .insert(&db_tx)
                .await?;
            let user = User::try_from(model)?;
            tracing::info!(user_id = %user.id, role = %user.role, "user created");
            Ok(user)
        })
    }

    /// Check credentials. Unknown e-mails, wrong passwords and disabled
    /// accounts all yield [`EngineError::InvalidCredentials`].
    pub async fn authenticate(&self, email: &str, password: &str) -> ResultEngine<User> {
        let email = email.trim().to_lowercase();
        with_tx!(self, |db_tx| {
            let model = users::Entity::find()
                .filter(users::Column::Email.eq(email))
                .one(&db_tx)
                .await?
                .ok_or(EngineError::InvalidCredentials)?;

            if !verify_password(password, &model.password_hash)? {
                return Err(EngineError::InvalidCredentials);
            }
            if !model.is_active {
                return Err(EngineError::InvalidCredentials);
            }
            User::try_from(model)
        })
    }

    /// Return an active user by id.
    pub async fn user(&self, user_id: Uuid) -> ResultEngine<User> {
        with_tx!(self, |db_tx| {
            let model = users::Entity::find_by_id(user_id)
                .one(&db_tx)
                .await?
                .filter(|model| model.is_active)
                .ok_or_else(|| EngineError::KeyNotFound("user not exists".to_string()))?;
            User::try_from(model)
        })
    }
}
