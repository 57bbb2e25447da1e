//! `SeaORM` implementation of the `AuthService` trait.

use crate::config::SecurityConfig;
use crate::db::Store;
use crate::forms::{PasswordPolicy, RegistrationForm};
use crate::models::User;
use crate::services::auth_service::{AuthError, AuthService, USERNAME_TAKEN};
use async_trait::async_trait;
use tracing::info;

pub struct SeaOrmAuthService {
    store: Store,
    security: SecurityConfig,
}

impl SeaOrmAuthService {
    #[must_use]
    pub const fn new(store: Store, security: SecurityConfig) -> Self {
        Self { store, security }
    }

    const fn policy(&self) -> PasswordPolicy {
        PasswordPolicy {
            min_length: self.security.password_min_length,
        }
    }
}

#[async_trait]
impl AuthService for SeaOrmAuthService {
    async fn register(&self, form: &RegistrationForm) -> Result<User, AuthError> {
        let validated = form.validate(&self.policy());

        let mut errors = validated.as_ref().err().cloned().unwrap_or_default();
        if !errors.has_field("username")
            && self
                .store
                .get_user_by_username(form.username.trim())
                .await?
                .is_some()
        {
            errors.add("username", USERNAME_TAKEN);
        }

        let account = match validated {
            Ok(account) if errors.is_empty() => account,
            _ => return Err(AuthError::Invalid(errors)),
        };

        let user = self
            .store
            .create_user(&account.username, &account.password, &self.security)
            .await?;

        info!("Registered user {} (id {})", user.username, user.id);
        Ok(user)
    }

    async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<User>, AuthError> {
        let Some(user) = self
            .store
            .verify_user_password(username, password, &self.security)
            .await?
        else {
            return Ok(None);
        };

        self.store.touch_last_login(user.id).await?;
        Ok(Some(user))
    }

    async fn user_by_id(&self, id: i32) -> Result<Option<User>, AuthError> {
        Ok(self.store.get_user(id).await?)
    }
}
