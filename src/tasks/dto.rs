use serde::Deserialize;

/// Request body for task creation.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    pub title: Option<String>,
    pub description: Option<String>,
}

/// Request body for a task update; absent fields stay unchanged.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub is_completed: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_request_accepts_partial_bodies() {
        let req: UpdateTaskRequest = serde_json::from_str(r#"{"isCompleted":true}"#).unwrap();
        assert!(req.title.is_none());
        assert!(req.description.is_none());
        assert_eq!(req.is_completed, Some(true));
    }

    #[test]
    fn create_request_uses_camel_case_keys() {
        let req: CreateTaskRequest =
            serde_json::from_str(r#"{"title":"Buy milk","description":"2% milk"}"#).unwrap();
        assert_eq!(req.title.as_deref(), Some("Buy milk"));
        assert_eq!(req.description.as_deref(), Some("2% milk"));
    }
}
