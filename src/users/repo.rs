use sqlx::PgPool;
use uuid::Uuid;

use super::model::{PublicUser, User};

/// Partial update: `None` fields are left untouched by the merge.
#[derive(Debug, Default)]
pub struct UserChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub age: Option<i32>,
    pub password_hash: Option<String>,
}

/// Full overwrite: every field except `id` and `created_at` is written,
/// so an omitted `age` clears the stored value.
#[derive(Debug)]
pub struct UserReplacement {
    pub name: String,
    pub email: String,
    pub age: Option<i32>,
    pub password_hash: String,
}

/// Postgres signals a lost uniqueness race with SQLSTATE 23505.
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .and_then(|db| db.code())
        .is_some_and(|code| code == "23505")
}

impl User {
    pub async fn find_by_email(db: &PgPool, email: &str) -> sqlx::Result<Option<User>> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, age, password_hash, created_at, updated_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(db)
        .await
    }

    /// Insert a new user. The unique index on `email` is the authoritative
    /// guard against concurrent inserts of the same address.
    pub async fn insert(
        db: &PgPool,
        name: &str,
        email: &str,
        age: Option<i32>,
        password_hash: &str,
    ) -> sqlx::Result<PublicUser> {
        sqlx::query_as::<_, PublicUser>(
            r#"
            INSERT INTO users (name, email, age, password_hash)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, email, age, created_at, updated_at
            "#,
        )
        .bind(name)
        .bind(email)
        .bind(age)
        .bind(password_hash)
        .fetch_one(db)
        .await
    }

    pub async fn delete_by_id(db: &PgPool, id: Uuid) -> sqlx::Result<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

impl PublicUser {
    pub async fn find_by_id(db: &PgPool, id: Uuid) -> sqlx::Result<Option<PublicUser>> {
        sqlx::query_as::<_, PublicUser>(
            r#"
            SELECT id, name, email, age, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await
    }

    pub async fn find_all(db: &PgPool) -> sqlx::Result<Vec<PublicUser>> {
        sqlx::query_as::<_, PublicUser>(
            r#"
            SELECT id, name, email, age, created_at, updated_at
            FROM users
            ORDER BY created_at
            "#,
        )
        .fetch_all(db)
        .await
    }

    pub async fn update_by_id(
        db: &PgPool,
        id: Uuid,
        changes: UserChanges,
    ) -> sqlx::Result<Option<PublicUser>> {
        sqlx::query_as::<_, PublicUser>(
            r#"
            UPDATE users
            SET name          = COALESCE($2, name),
                email         = COALESCE($3, email),
                age           = COALESCE($4, age),
                password_hash = COALESCE($5, password_hash),
                updated_at    = now()
            WHERE id = $1
            RETURNING id, name, email, age, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(changes.name)
        .bind(changes.email)
        .bind(changes.age)
        .bind(changes.password_hash)
        .fetch_optional(db)
        .await
    }

    pub async fn replace_by_id(
        db: &PgPool,
        id: Uuid,
        replacement: UserReplacement,
    ) -> sqlx::Result<Option<PublicUser>> {
        sqlx::query_as::<_, PublicUser>(
            r#"
            UPDATE users
            SET name          = $2,
                email         = $3,
                age           = $4,
                password_hash = $5,
                updated_at    = now()
            WHERE id = $1
            RETURNING id, name, email, age, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(replacement.name)
        .bind(replacement.email)
        .bind(replacement.age)
        .bind(replacement.password_hash)
        .fetch_optional(db)
        .await
    }
}
