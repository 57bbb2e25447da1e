use anyhow::{Context, Result};
use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use tokio::task;

use crate::config::SecurityConfig;
use crate::entities::{prelude::*, users};
use crate::models::User;

pub struct UserRepository {
    conn: DatabaseConnection,
}

impl UserRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Hashes the password off the async runtime and inserts the account.
    pub async fn create(
        &self,
        username: &str,
        password: &str,
        security: &SecurityConfig,
    ) -> Result<User> {
        let password = password.to_string();
        let security = security.clone();
        let password_hash = task::spawn_blocking(move || hash_password(&password, &security))
            .await
            .context("Password hashing task panicked")??;

        let active = users::ActiveModel {
            username: Set(username.to_string()),
            password_hash: Set(password_hash),
            date_joined: Set(chrono::Utc::now()),
            last_login: Set(None),
            ..Default::default()
        };

        let model = active
            .insert(&self.conn)
            .await
            .with_context(|| format!("Failed to insert user {username}"))?;

        Ok(User::from(model))
    }

    pub async fn get_by_id(&self, id: i32) -> Result<Option<User>> {
        let user = Users::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query user by ID")?;

        Ok(user.map(User::from))
    }

    pub async fn get_by_username(&self, username: &str) -> Result<Option<User>> {
        let user = Users::find()
            .filter(users::Column::Username.eq(username))
            .one(&self.conn)
            .await
            .context("Failed to query user by username")?;

        Ok(user.map(User::from))
    }

    pub async fn list_all(&self) -> Result<Vec<User>> {
        let rows = Users::find()
            .order_by_asc(users::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list users")?;

        Ok(rows.into_iter().map(User::from).collect())
    }

    /// Returns the user when the password matches its stored hash.
    /// An unknown username still pays for one Argon2 run so response time
    /// does not reveal which accounts exist.
    pub async fn verify_password(
        &self,
        username: &str,
        password: &str,
        security: &SecurityConfig,
    ) -> Result<Option<User>> {
        let user = Users::find()
            .filter(users::Column::Username.eq(username))
            .one(&self.conn)
            .await
            .context("Failed to query user for password verification")?;

        let stored_hash = user.as_ref().map(|u| u.password_hash.clone());
        let password = password.to_string();
        let security = security.clone();

        let is_valid = task::spawn_blocking(move || {
            check_password(stored_hash.as_deref(), &password, &security)
        })
        .await
        .context("Password verification task panicked")??;

        Ok(user.filter(|_| is_valid).map(User::from))
    }

    pub async fn touch_last_login(&self, id: i32) -> Result<()> {
        Users::update_many()
            .col_expr(
                users::Column::LastLogin,
                sea_orm::sea_query::Expr::value(chrono::Utc::now()),
            )
            .filter(users::Column::Id.eq(id))
            .exec(&self.conn)
            .await
            .context("Failed to update last login")?;

        Ok(())
    }

    /// Deletes the account; topics and entries go with it via ON DELETE CASCADE.
    pub async fn delete(&self, id: i32) -> Result<bool> {
        let result = Users::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("Failed to delete user")?;

        Ok(result.rows_affected > 0)
    }
}

/// Hash a password using Argon2id with the configured cost parameters.
pub fn hash_password(password: &str, config: &SecurityConfig) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);

    let params = Params::new(
        config.argon2_memory_cost_kib,
        config.argon2_time_cost,
        config.argon2_parallelism,
        None,
    )
    .map_err(|e| anyhow::anyhow!("Invalid Argon2 params: {e}"))?;

    let hash = Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {e}"))?;

    Ok(hash.to_string())
}

/// Blocking password check. With no stored hash the password is hashed
/// anyway and the check fails.
fn check_password(
    stored_hash: Option<&str>,
    password: &str,
    security: &SecurityConfig,
) -> Result<bool> {
    let Some(stored_hash) = stored_hash else {
        hash_password(password, security)?;
        return Ok(false);
    };

    let parsed_hash = PasswordHash::new(stored_hash)
        .map_err(|e| anyhow::anyhow!("Invalid password hash format: {e}"))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cheap_params() -> SecurityConfig {
        SecurityConfig {
            argon2_memory_cost_kib: 64,
            argon2_time_cost: 1,
            ..SecurityConfig::default()
        }
    }

    #[test]
    fn hash_is_salted_and_verifiable() {
        let config = cheap_params();
        let first = hash_password("correct horse", &config).unwrap();
        let second = hash_password("correct horse", &config).unwrap();
        assert_ne!(first, second);
        assert!(!first.contains("correct horse"));

        let parsed = PasswordHash::new(&first).unwrap();
        assert!(
            Argon2::default()
                .verify_password(b"correct horse", &parsed)
                .is_ok()
        );
        assert!(
            Argon2::default()
                .verify_password(b"wrong horse", &parsed)
                .is_err()
        );
    }

    #[test]
    fn invalid_params_are_rejected() {
        let config = SecurityConfig {
            argon2_parallelism: 0,
            ..cheap_params()
        };
        assert!(hash_password("whatever", &config).is_err());
    }

    #[test]
    fn missing_user_still_runs_argon2() {
        let config = cheap_params();
        assert!(!check_password(None, "correct horse", &config).unwrap());

        // The hashing step is real: bad params surface even without a user.
        let broken = SecurityConfig {
            argon2_parallelism: 0,
            ..cheap_params()
        };
        assert!(check_password(None, "correct horse", &broken).is_err());
    }

    #[test]
    fn stored_hash_is_checked() {
        let config = cheap_params();
        let hash = hash_password("correct horse", &config).unwrap();
        assert!(check_password(Some(&hash), "correct horse", &config).unwrap());
        assert!(!check_password(Some(&hash), "wrong horse", &config).unwrap());
    }
}
