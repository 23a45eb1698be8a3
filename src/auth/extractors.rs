use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use tracing::warn;

use crate::auth::cookie;
use crate::auth::jwt::{Claims, JwtKeys};
use crate::error::ApiError;

/// Request-scoped access guard: extracts and verifies the bearer token,
/// making the decoded identity available to the handler.
///
/// Per request: no credential -> 401, credential that fails verification
/// -> 403, otherwise the handler runs with the decoded claims.
pub struct CurrentUser(pub Claims);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token =
            cookie::extract_token(&parts.headers).ok_or(ApiError::AuthenticationRequired)?;

        let keys = JwtKeys::from_ref(state);
        let claims = keys.verify(&token).map_err(|e| {
            warn!(error = %e, "invalid or expired token");
            ApiError::InvalidToken
        })?;

        Ok(CurrentUser(claims))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::repo_types::User;
    use crate::state::AppState;
    use axum::http::{header, Request, StatusCode};
    use time::OffsetDateTime;
    use uuid::Uuid;

    fn make_user() -> User {
        User {
            id: Uuid::new_v4(),
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            user_name: "ada".into(),
            email: "ada@example.com".into(),
            password_hash: "$argon2id$irrelevant".into(),
            avatar: None,
            date_joined: OffsetDateTime::UNIX_EPOCH,
            last_updated: OffsetDateTime::UNIX_EPOCH,
        }
    }

    fn parts_with_headers(headers: &[(header::HeaderName, String)]) -> Parts {
        let mut builder = Request::builder().uri("/api/tasks");
        for (name, value) in headers {
            builder = builder.header(name, value.as_str());
        }
        let (parts, ()) = builder.body(()).expect("request").into_parts();
        parts
    }

    #[tokio::test]
    async fn missing_credential_is_unauthorized() {
        let state = AppState::fake();
        let mut parts = parts_with_headers(&[]);
        let err = CurrentUser::from_request_parts(&mut parts, &state)
            .await
            .err()
            .expect("rejection");
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn garbage_token_is_forbidden() {
        let state = AppState::fake();
        let mut parts =
            parts_with_headers(&[(header::COOKIE, "tasky=not-a-real-token".to_string())]);
        let err = CurrentUser::from_request_parts(&mut parts, &state)
            .await
            .err()
            .expect("rejection");
        assert_eq!(err.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn valid_cookie_yields_claims() {
        let state = AppState::fake();
        let user = make_user();
        let token = JwtKeys::from_ref(&state).sign(&user).expect("sign");
        let mut parts = parts_with_headers(&[(header::COOKIE, format!("tasky={token}"))]);
        let CurrentUser(claims) = CurrentUser::from_request_parts(&mut parts, &state)
            .await
            .expect("extraction");
        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.user_name, "ada");
    }

    #[tokio::test]
    async fn valid_bearer_header_yields_claims() {
        let state = AppState::fake();
        let user = make_user();
        let token = JwtKeys::from_ref(&state).sign(&user).expect("sign");
        let mut parts =
            parts_with_headers(&[(header::AUTHORIZATION, format!("Bearer {token}"))]);
        let CurrentUser(claims) = CurrentUser::from_request_parts(&mut parts, &state)
            .await
            .expect("extraction");
        assert_eq!(claims.sub, user.id);
    }
}
