use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// Task record in the database. Owned by exactly one user; soft-deleted
/// rows stay in storage with `is_deleted = true`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub description: String,
    pub is_completed: bool,
    pub is_deleted: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub date_created: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub last_updated: OffsetDateTime,
}

/// Field changes for a task update; `None` leaves the column untouched.
#[derive(Debug, Default)]
pub struct TaskChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub is_completed: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_serializes_with_camel_case_keys() {
        let task = Task {
            id: Uuid::new_v4(),
            owner_id: Uuid::new_v4(),
            title: "Buy milk".into(),
            description: "2% milk, 1 gallon".into(),
            is_completed: false,
            is_deleted: false,
            date_created: OffsetDateTime::UNIX_EPOCH,
            last_updated: OffsetDateTime::UNIX_EPOCH,
        };
        let json = serde_json::to_string(&task).unwrap();
        assert!(json.contains("\"ownerId\""));
        assert!(json.contains("\"isCompleted\":false"));
        assert!(json.contains("\"isDeleted\":false"));
        assert!(json.contains("\"dateCreated\""));
    }
}
