use sqlx::PgPool;
use uuid::Uuid;

pub use crate::auth::repo_types::{NewUser, ProfileChanges, User};

const USER_COLUMNS: &str =
    "id, first_name, last_name, user_name, email, password_hash, avatar, date_joined, last_updated";

impl User {
    /// Insert a new user. Duplicate email/user_name surfaces as a unique
    /// violation from the database.
    pub async fn create(db: &PgPool, new: &NewUser<'_>) -> sqlx::Result<User> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (first_name, last_name, user_name, email, password_hash, avatar)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {USER_COLUMNS}
            "#,
        ))
        .bind(new.first_name)
        .bind(new.last_name)
        .bind(new.user_name)
        .bind(new.email)
        .bind(new.password_hash)
        .bind(new.avatar)
        .fetch_one(db)
        .await?;
        Ok(user)
    }

    /// Find a user by email or username (login accepts either).
    pub async fn find_by_identifier(db: &PgPool, identifier: &str) -> sqlx::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            SELECT {USER_COLUMNS}
            FROM users
            WHERE email = $1 OR user_name = $1
            "#,
        ))
        .bind(identifier)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> sqlx::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            SELECT {USER_COLUMNS}
            FROM users
            WHERE id = $1
            "#,
        ))
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    /// Pre-insert uniqueness check, mirrored by the unique constraints.
    pub async fn exists_with_email_or_user_name(
        db: &PgPool,
        email: &str,
        user_name: &str,
    ) -> sqlx::Result<bool> {
        let row: Option<(Uuid,)> = sqlx::query_as(
            r#"
            SELECT id FROM users
            WHERE email = $1 OR user_name = $2
            "#,
        )
        .bind(email)
        .bind(user_name)
        .fetch_optional(db)
        .await?;
        Ok(row.is_some())
    }

    /// Update mutable profile fields. Absent fields keep their current value;
    /// the password hash is never touched here.
    pub async fn update_profile(
        db: &PgPool,
        id: Uuid,
        changes: &ProfileChanges,
    ) -> sqlx::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
            SET first_name = COALESCE($2, first_name),
                last_name = COALESCE($3, last_name),
                user_name = COALESCE($4, user_name),
                email = COALESCE($5, email),
                avatar = COALESCE($6, avatar),
                last_updated = now()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(changes.first_name.as_deref())
        .bind(changes.last_name.as_deref())
        .bind(changes.user_name.as_deref())
        .bind(changes.email.as_deref())
        .bind(changes.avatar.as_deref())
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    /// Replace the stored password hash. The old-secret check happens in the
    /// handler before this is called.
    pub async fn update_password_hash(db: &PgPool, id: Uuid, hash: &str) -> sqlx::Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET password_hash = $2, last_updated = now()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(hash)
        .execute(db)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
