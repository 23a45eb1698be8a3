use axum::{
    extract::{FromRef, State},
    http::{header, HeaderMap, StatusCode},
    routing::{get, patch, post},
    Json, Router,
};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        cookie,
        dto::{
            ChangePasswordRequest, LoginRequest, LoginResponse, MessageResponse, PublicUser,
            RegisterRequest, UpdateProfileRequest,
        },
        extractors::CurrentUser,
        jwt::JwtKeys,
        password,
        repo::{NewUser, ProfileChanges, User},
    },
    error::ApiError,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
        .route("/auth/password", patch(change_password))
}

pub fn user_routes() -> Router<AppState> {
    Router::new().route("/user", get(get_profile).patch(update_profile))
}

fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

fn require<'a>(value: &'a Option<String>, field: &str) -> Result<&'a str, ApiError> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ApiError::Validation(format!("{field} is required"))),
    }
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    let first_name = require(&payload.first_name, "firstName")?;
    let last_name = require(&payload.last_name, "lastName")?;
    let user_name = require(&payload.user_name, "userName")?;
    let email = require(&payload.email, "email")?.to_lowercase();
    let password = require(&payload.password, "password")?;

    if !is_valid_email(&email) {
        warn!(email = %email, "invalid email");
        return Err(ApiError::Validation("invalid email".into()));
    }

    if User::exists_with_email_or_user_name(&state.db, &email, user_name).await? {
        warn!(email = %email, user_name = %user_name, "registration conflict");
        return Err(ApiError::Conflict("email or username already in use".into()));
    }

    // Strength gate applies at account creation only.
    password::check_strength(password)?;

    let hash = password::hash_password(password)?;
    let user = User::create(
        &state.db,
        &NewUser {
            first_name,
            last_name,
            user_name,
            email: &email,
            password_hash: &hash,
            avatar: payload.avatar.as_deref(),
        },
    )
    .await?;

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("user registered successfully")),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<(HeaderMap, Json<LoginResponse>), ApiError> {
    let password = require(&payload.password, "password")?;
    let identifier = match (&payload.email, &payload.user_name) {
        (Some(email), _) if !email.trim().is_empty() => email.trim().to_lowercase(),
        (_, Some(name)) if !name.trim().is_empty() => name.trim().to_string(),
        _ => return Err(ApiError::Validation("email or userName is required".into())),
    };

    let user = User::find_by_identifier(&state.db, &identifier)
        .await?
        .ok_or_else(|| {
            warn!("login unknown identifier");
            ApiError::Auth("invalid credentials".into())
        })?;

    let ok = password::verify_password(password, &user.password_hash)?;
    if !ok {
        warn!(user_id = %user.id, "login invalid password");
        return Err(ApiError::Auth("invalid credentials".into()));
    }

    let keys = JwtKeys::from_ref(&state);
    let token = keys.sign(&user)?;
    let cookie = cookie::session_cookie(&token, keys.ttl, state.config.cookie_secure)
        .map_err(|e| ApiError::Internal(e.into()))?;

    let mut headers = HeaderMap::new();
    headers.insert(header::SET_COOKIE, cookie);

    info!(user_id = %user.id, "user logged in");
    Ok((
        headers,
        Json(LoginResponse {
            user_data: user.into(),
            token,
        }),
    ))
}

#[instrument(skip(state))]
pub async fn logout(
    State(state): State<AppState>,
) -> Result<(HeaderMap, Json<MessageResponse>), ApiError> {
    // Only removes the client's copy; an already-issued token stays valid
    // until it expires.
    let cookie = cookie::clear_session_cookie(state.config.cookie_secure)
        .map_err(|e| ApiError::Internal(e.into()))?;
    let mut headers = HeaderMap::new();
    headers.insert(header::SET_COOKIE, cookie);
    Ok((headers, Json(MessageResponse::new("successfully logged out"))))
}

#[instrument(skip(state, claims, payload))]
pub async fn change_password(
    State(state): State<AppState>,
    CurrentUser(claims): CurrentUser,
    Json(payload): Json<ChangePasswordRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let old_password = require(&payload.old_password, "oldPassword")?;
    let new_password = require(&payload.new_password, "newPassword")?;

    let user = User::find_by_id(&state.db, claims.sub)
        .await?
        .ok_or_else(|| ApiError::NotFound("user not found".into()))?;

    let ok = password::verify_password(old_password, &user.password_hash)?;
    if !ok {
        warn!(user_id = %user.id, "password change secret mismatch");
        return Err(ApiError::Auth("old password does not match".into()));
    }

    let hash = password::hash_password(new_password)?;
    User::update_password_hash(&state.db, user.id, &hash).await?;

    info!(user_id = %user.id, "password updated");
    Ok(Json(MessageResponse::new("successfully updated password")))
}

#[instrument(skip(state, claims))]
pub async fn get_profile(
    State(state): State<AppState>,
    CurrentUser(claims): CurrentUser,
) -> Result<Json<PublicUser>, ApiError> {
    // The token proves identity; profile data is re-read from the store
    // rather than trusted from the embedded snapshot.
    let user = User::find_by_id(&state.db, claims.sub)
        .await?
        .ok_or_else(|| ApiError::NotFound("user not found".into()))?;
    Ok(Json(user.into()))
}

#[instrument(skip(state, claims, payload))]
pub async fn update_profile(
    State(state): State<AppState>,
    CurrentUser(claims): CurrentUser,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<PublicUser>, ApiError> {
    let email = match payload.email.as_deref().map(str::trim) {
        Some(e) if !e.is_empty() => {
            let e = e.to_lowercase();
            if !is_valid_email(&e) {
                return Err(ApiError::Validation("invalid email".into()));
            }
            Some(e)
        }
        _ => None,
    };

    let non_empty = |v: Option<String>| v.filter(|s| !s.trim().is_empty());
    let changes = ProfileChanges {
        first_name: non_empty(payload.first_name),
        last_name: non_empty(payload.last_name),
        user_name: non_empty(payload.user_name),
        email,
        avatar: payload.avatar,
    };

    let user = User::update_profile(&state.db, claims.sub, &changes)
        .await?
        .ok_or_else(|| ApiError::NotFound("user not found".into()))?;

    info!(user_id = %user.id, "profile updated");
    Ok(Json(user.into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn require_rejects_missing_and_blank_fields() {
        let missing: Option<String> = None;
        let err = require(&missing, "firstName").unwrap_err();
        assert_eq!(err.to_string(), "firstName is required");

        let blank = Some("   ".to_string());
        assert!(require(&blank, "firstName").is_err());

        let present = Some(" Ada ".to_string());
        assert_eq!(require(&present, "firstName").unwrap(), "Ada");
    }

    #[test]
    fn email_validation() {
        assert!(is_valid_email("ada@example.com"));
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("missing@domain"));
    }
}
