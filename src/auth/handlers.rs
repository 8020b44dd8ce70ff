use axum::{
    extract::{FromRef, State},
    routing::post,
    Json, Router,
};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{AuthResponse, LoginRequest, SignupRequest},
        jwt::JwtKeys,
        password::{hash_password, verify_password},
        repo::User,
    },
    error::ApiError,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/signup", post(signup))
        .route("/auth/login", post(login))
}

fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

#[instrument(skip(state, payload))]
pub async fn signup(
    State(state): State<AppState>,
    Json(mut payload): Json<SignupRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    payload.email = payload.email.trim().to_lowercase();
    payload.username = payload.username.trim().to_string();

    if payload.username.is_empty() || payload.email.is_empty() || payload.password.is_empty() {
        warn!("signup with missing fields");
        return Err(ApiError::validation("All fields required"));
    }

    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err(ApiError::validation("Invalid email"));
    }

    if payload.password.len() < 8 {
        warn!("password too short");
        return Err(ApiError::validation("Password too short"));
    }

    let hash = hash_password(&payload.password)?;

    // Single atomic insert-if-absent: no existence pre-check, so two
    // concurrent signups with the same email cannot both succeed.
    let user = User::create_if_absent(&state.db, &payload.username, &payload.email, &hash)
        .await?
        .ok_or_else(|| {
            warn!(email = %payload.email, "email already registered");
            ApiError::Conflict("Email already exists".into())
        })?;

    let keys = JwtKeys::from_ref(&state);
    let token = keys.sign(user.id)?;

    info!(user_id = %user.id, email = %user.email, "user signed up");
    Ok(Json(AuthResponse {
        token,
        user_id: user.id,
    }))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(mut payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    payload.email = payload.email.trim().to_lowercase();

    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err(ApiError::validation("Invalid email"));
    }

    // Unknown email and wrong password produce the same response so the two
    // cases cannot be told apart from the outside.
    let user = User::find_by_email(&state.db, &payload.email)
        .await?
        .ok_or_else(|| {
            warn!(email = %payload.email, "login unknown email");
            ApiError::InvalidCredentials
        })?;

    let ok = verify_password(&payload.password, &user.password_hash)?;
    if !ok {
        warn!(email = %payload.email, user_id = %user.id, "login invalid password");
        return Err(ApiError::InvalidCredentials);
    }

    let keys = JwtKeys::from_ref(&state);
    let token = keys.sign(user.id)?;

    info!(user_id = %user.id, email = %user.email, "user logged in");
    Ok(Json(AuthResponse {
        token,
        user_id: user.id,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::test_support::fake_state;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    fn app() -> Router {
        Router::new()
            .nest("/api", auth_routes())
            .with_state(fake_state())
    }

    async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> (StatusCode, serde_json::Value) {
        let req = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let resp = app.oneshot(req).await.expect("request");
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        (status, json)
    }

    #[test]
    fn email_regex_accepts_and_rejects() {
        assert!(is_valid_email("a@x.com"));
        assert!(is_valid_email("first.last@sub.domain.org"));
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("a @x.com"));
        assert!(!is_valid_email("a@x"));
    }

    #[test]
    fn auth_response_uses_camel_case_user_id() {
        let resp = AuthResponse {
            token: "t".into(),
            user_id: uuid::Uuid::new_v4(),
        };
        let json = serde_json::to_value(&resp).unwrap();
        assert!(json.get("userId").is_some());
        assert!(json.get("token").is_some());
    }

    #[tokio::test]
    async fn signup_with_missing_fields_is_rejected_before_any_store_access() {
        // The fake pool never connects; reaching the store would error with a
        // connection failure instead of this 400.
        let (status, json) = post_json(
            app(),
            "/api/auth/signup",
            serde_json::json!({ "username": "alice", "email": "", "password": "secret123" }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["msg"], "All fields required");
    }

    #[tokio::test]
    async fn signup_rejects_malformed_email() {
        let (status, json) = post_json(
            app(),
            "/api/auth/signup",
            serde_json::json!({ "username": "alice", "email": "nope", "password": "secret123" }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["msg"], "Invalid email");
    }

    #[tokio::test]
    async fn signup_rejects_short_password() {
        let (status, json) = post_json(
            app(),
            "/api/auth/signup",
            serde_json::json!({ "username": "alice", "email": "a@x.com", "password": "short" }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["msg"], "Password too short");
    }

    #[tokio::test]
    async fn login_rejects_malformed_email() {
        let (status, json) = post_json(
            app(),
            "/api/auth/login",
            serde_json::json!({ "email": "nope", "password": "whatever" }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["msg"], "Invalid email");
    }
}
