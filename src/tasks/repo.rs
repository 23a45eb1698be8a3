use sqlx::PgPool;
use uuid::Uuid;

pub use crate::tasks::repo_types::{Task, TaskChanges};

const TASK_COLUMNS: &str =
    "id, owner_id, title, description, is_completed, is_deleted, date_created, last_updated";

// Every query below scopes by owner_id; a miss on another user's task is
// indistinguishable from a missing row.
impl Task {
    pub async fn create(
        db: &PgPool,
        owner_id: Uuid,
        title: &str,
        description: &str,
    ) -> sqlx::Result<Task> {
        let task = sqlx::query_as::<_, Task>(&format!(
            r#"
            INSERT INTO tasks (owner_id, title, description)
            VALUES ($1, $2, $3)
            RETURNING {TASK_COLUMNS}
            "#,
        ))
        .bind(owner_id)
        .bind(title)
        .bind(description)
        .fetch_one(db)
        .await?;
        Ok(task)
    }

    /// Full owned set, newest first; active/completed/trash filtering is
    /// done client-side.
    pub async fn list_by_owner(db: &PgPool, owner_id: Uuid) -> sqlx::Result<Vec<Task>> {
        let rows = sqlx::query_as::<_, Task>(&format!(
            r#"
            SELECT {TASK_COLUMNS}
            FROM tasks
            WHERE owner_id = $1
            ORDER BY date_created DESC
            "#,
        ))
        .bind(owner_id)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    /// One owned, non-deleted task.
    pub async fn find_active(db: &PgPool, owner_id: Uuid, id: Uuid) -> sqlx::Result<Option<Task>> {
        let task = sqlx::query_as::<_, Task>(&format!(
            r#"
            SELECT {TASK_COLUMNS}
            FROM tasks
            WHERE id = $1 AND owner_id = $2 AND is_deleted = false
            "#,
        ))
        .bind(id)
        .bind(owner_id)
        .fetch_optional(db)
        .await?;
        Ok(task)
    }

    /// Patch title/description/completion under the ownership + not-deleted
    /// filter; absent fields keep their current value.
    pub async fn update_fields(
        db: &PgPool,
        owner_id: Uuid,
        id: Uuid,
        changes: &TaskChanges,
    ) -> sqlx::Result<Option<Task>> {
        let task = sqlx::query_as::<_, Task>(&format!(
            r#"
            UPDATE tasks
            SET title = COALESCE($3, title),
                description = COALESCE($4, description),
                is_completed = COALESCE($5, is_completed),
                last_updated = now()
            WHERE id = $1 AND owner_id = $2 AND is_deleted = false
            RETURNING {TASK_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(owner_id)
        .bind(changes.title.as_deref())
        .bind(changes.description.as_deref())
        .bind(changes.is_completed)
        .fetch_optional(db)
        .await?;
        Ok(task)
    }

    /// Flip the soft-delete marker. Deleting requires an active row,
    /// restoring requires a trashed one.
    pub async fn set_deleted(
        db: &PgPool,
        owner_id: Uuid,
        id: Uuid,
        deleted: bool,
    ) -> sqlx::Result<Option<Task>> {
        let task = sqlx::query_as::<_, Task>(&format!(
            r#"
            UPDATE tasks
            SET is_deleted = $3, last_updated = now()
            WHERE id = $1 AND owner_id = $2 AND is_deleted = (NOT $3)
            RETURNING {TASK_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(owner_id)
        .bind(deleted)
        .fetch_optional(db)
        .await?;
        Ok(task)
    }

    /// Set the completion flag on an active task. Idempotent: setting an
    /// already-set flag succeeds and still refreshes `last_updated`.
    pub async fn set_completed(
        db: &PgPool,
        owner_id: Uuid,
        id: Uuid,
        completed: bool,
    ) -> sqlx::Result<Option<Task>> {
        let task = sqlx::query_as::<_, Task>(&format!(
            r#"
            UPDATE tasks
            SET is_completed = $3, last_updated = now()
            WHERE id = $1 AND owner_id = $2 AND is_deleted = false
            RETURNING {TASK_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(owner_id)
        .bind(completed)
        .fetch_optional(db)
        .await?;
        Ok(task)
    }
}
