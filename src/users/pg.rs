use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::{StoreError, User, UserStore};

const USER_COLUMNS: &str = "id, username, email, password_hash, badges, favourites, created_at";

/// Postgres-backed store. Collection updates are single `UPDATE` statements,
/// so concurrent additions for one user never lose each other.
#[derive(Clone)]
pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    async fn update_returning(&self, sql: &str, id: Uuid, code: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(sql)
            .bind(id)
            .bind(code)
            .fetch_optional(&self.db)
            .await
            .context("update user collection")?;
        Ok(user)
    }
}

fn map_insert_error(e: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db) = &e {
        if db.is_unique_violation() {
            let field = match db.constraint() {
                Some(c) if c.contains("username") => "username",
                _ => "email",
            };
            return StoreError::DuplicateKey(field);
        }
    }
    StoreError::Backend(anyhow::Error::new(e).context("insert user"))
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn create_user(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<User, StoreError> {
        sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (username, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .fetch_one(&self.db)
        .await
        .map_err(map_insert_error)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.db)
        .await
        .context("find user by email")?;
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .context("find user by id")?;
        Ok(user)
    }

    async fn save(&self, user: &User) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            UPDATE users
               SET badges = badges || ARRAY(
                       SELECT b FROM unnest($2::text[]) WITH ORDINALITY AS t(b, n)
                        WHERE NOT b = ANY(badges)
                        ORDER BY n),
                   favourites = $3
             WHERE id = $1
            "#,
        )
        .bind(user.id)
        .bind(&user.badges)
        .bind(&user.favourites)
        .execute(&self.db)
        .await
        .context("save user")?;
        Ok(())
    }

    async fn add_badge(&self, id: Uuid, code: &str) -> Result<Option<User>, StoreError> {
        self.update_returning(
            &format!(
                r#"
                UPDATE users
                   SET badges = CASE WHEN $2 = ANY(badges) THEN badges
                                     ELSE array_append(badges, $2) END
                 WHERE id = $1
                RETURNING {USER_COLUMNS}
                "#
            ),
            id,
            code,
        )
        .await
    }

    async fn add_favourite(&self, id: Uuid, code: &str) -> Result<Option<User>, StoreError> {
        self.update_returning(
            &format!(
                r#"
                UPDATE users
                   SET favourites = CASE WHEN $2 = ANY(favourites) THEN favourites
                                         ELSE array_append(favourites, $2) END
                 WHERE id = $1
                RETURNING {USER_COLUMNS}
                "#
            ),
            id,
            code,
        )
        .await
    }

    async fn remove_favourite(&self, id: Uuid, code: &str) -> Result<Option<User>, StoreError> {
        self.update_returning(
            &format!(
                r#"
                UPDATE users
                   SET favourites = array_remove(favourites, $2)
                 WHERE id = $1
                RETURNING {USER_COLUMNS}
                "#
            ),
            id,
            code,
        )
        .await
    }
}
