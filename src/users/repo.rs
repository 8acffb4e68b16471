use axum::async_trait;
use sqlx::{FromRow, Statement};
use thiserror::Error;
use tracing::debug;

use crate::db::Gateway;
use crate::users::dto::{UpdateUser, User};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("there is no user with specified id")]
    NotFound,
    #[error("there are no users")]
    NoUsers,
    #[error("user does not exist")]
    NotExist,
    #[error(transparent)]
    Db(#[from] sqlx::Error),
}

/// Data access for the `users` table.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn create(&self, user: &User) -> Result<(), StoreError>;
    async fn get(&self, id: i64) -> Result<User, StoreError>;
    /// Rows that fail to decode are skipped; an empty result is an error.
    async fn list(&self) -> Result<Vec<User>, StoreError>;
    /// Succeeds even when no row matches `user.id`.
    async fn update(&self, user: &UpdateUser) -> Result<(), StoreError>;
    async fn delete(&self, id: i64) -> Result<(), StoreError>;
}

#[async_trait]
impl UserStore for Gateway {
    async fn create(&self, user: &User) -> Result<(), StoreError> {
        self.create_user
            .query()
            .bind(&user.login)
            .bind(&user.password)
            .bind(&user.name)
            .bind(&user.email)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn get(&self, id: i64) -> Result<User, StoreError> {
        let row = self
            .get_user
            .query()
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound)?;
        Ok(User::from_row(&row)?)
    }

    async fn list(&self) -> Result<Vec<User>, StoreError> {
        let rows = self.get_user_list.query().fetch_all(&self.pool).await?;
        let users: Vec<User> = rows
            .iter()
            .filter_map(|row| match User::from_row(row) {
                Ok(u) => Some(u),
                Err(e) => {
                    debug!(error = %e, "skipping undecodable user row");
                    None
                }
            })
            .collect();
        if users.is_empty() {
            return Err(StoreError::NoUsers);
        }
        Ok(users)
    }

    async fn update(&self, user: &UpdateUser) -> Result<(), StoreError> {
        self.update_user
            .query()
            .bind(user.id)
            .bind(&user.login)
            .bind(&user.name)
            .bind(&user.email)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<(), StoreError> {
        let res = self.delete_user.query().bind(id).execute(&self.pool).await?;
        if res.rows_affected() == 0 {
            return Err(StoreError::NotExist);
        }
        Ok(())
    }
}
