use std::sync::Arc;

use marketplace_auth::{Role, User, UserRepository};
use marketplace_core::{RepositoryError, UserId};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::instrument;

use super::{from_db, map_sqlx_error, run_blocking};

/// Identity store over the `users` table. Usernames are unique.
#[derive(Debug, Clone)]
pub struct PostgresUserRepository {
    pool: Arc<PgPool>,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    #[instrument(skip(self), err)]
    pub async fn find_by_username_async(&self, username: &str) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query("SELECT id, username, password, role FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("users.find_by_username", e))?;
        row.as_ref().map(user_from_row).transpose()
    }

    /// Upsert on username; the stored id is kept for existing accounts.
    #[instrument(skip(self, user), fields(username = %user.username), err)]
    pub async fn save_async(&self, user: User) -> Result<User, RepositoryError> {
        let row = sqlx::query(
            r#"
            INSERT INTO users (username, password, role)
            VALUES ($1, $2, $3)
            ON CONFLICT (username)
            DO UPDATE SET password = EXCLUDED.password, role = EXCLUDED.role
            RETURNING id
            "#,
        )
        .bind(&user.username)
        .bind(user.credential.expose())
        .bind(user.role.as_str())
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("users.save", e))?;

        let raw: i64 = row
            .try_get("id")
            .map_err(|e| map_sqlx_error("users.save", e))?;
        Ok(User {
            id: Some(from_db::<UserId>("users.save", raw)?),
            ..user
        })
    }
}

fn user_from_row(row: &PgRow) -> Result<User, RepositoryError> {
    const OP: &str = "users.find_by_username";
    let text = |column: &str| -> Result<String, RepositoryError> {
        row.try_get::<String, _>(column)
            .map_err(|e| map_sqlx_error(OP, e))
    };

    let id: i64 = row.try_get("id").map_err(|e| map_sqlx_error(OP, e))?;
    let role: Role = text("role")?
        .parse()
        .map_err(|e| RepositoryError::new(OP, e))?;

    let mut user = User::new(text("username")?, text("password")?, role);
    user.id = Some(from_db::<UserId>(OP, id)?);
    Ok(user)
}

impl UserRepository for PostgresUserRepository {
    fn find_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError> {
        run_blocking("users.find_by_username", self.find_by_username_async(username))?
    }

    fn save(&self, user: User) -> Result<User, RepositoryError> {
        run_blocking("users.save", self.save_async(user))?
    }
}
