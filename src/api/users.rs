//! Account endpoints: registration, login and the protected admin surface.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use super::error::ApiError;
use crate::db::{LoginRequest, LoginResponse, RegisterRequest, User};
use crate::AppState;

const MIN_PASSWORD_LENGTH: usize = 6;

fn validate_register(req: &RegisterRequest) -> Result<(), ApiError> {
    if req.full_name.trim().is_empty() {
        return Err(ApiError::bad_request("full_name is required"));
    }
    if req.email.is_empty() || !req.email.contains('@') {
        return Err(ApiError::bad_request("a valid email is required"));
    }
    if req.password.len() < MIN_PASSWORD_LENGTH {
        return Err(ApiError::bad_request(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

/// POST /api/v1/auth/register
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    validate_register(&req)?;

    let user = User {
        full_name: req.full_name,
        email: req.email,
        username: req.username,
        phone: req.phone,
        ..Default::default()
    };
    state.users.register(user, &req.password).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({"message": "user created successfully"})),
    ))
}

/// POST /api/v1/auth/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    if req.email.is_empty() || req.password.is_empty() {
        return Err(ApiError::bad_request("email and password are required"));
    }

    let (access_token, user) = state.users.login(&req.email, &req.password).await?;
    Ok(Json(LoginResponse { access_token, user }))
}

/// GET /api/v1/admin/users/:id
pub async fn get_profile(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<User>, ApiError> {
    let user = state.users.get_profile(&id).await?;
    Ok(Json(user))
}

/// PUT /api/v1/admin/users/:id
pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(mut user): Json<User>,
) -> Result<Json<Value>, ApiError> {
    user.id = id;
    state.users.update_profile(&mut user).await?;
    Ok(Json(json!({"message": "profile updated successfully"})))
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    10
}

/// GET /api/v1/admin/users
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<User>>, ApiError> {
    let users = state.users.list_users(params.limit, params.offset).await?;
    Ok(Json(users))
}

/// DELETE /api/v1/admin/users/:id
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    state.users.delete_user(&id).await?;
    Ok(Json(json!({"message": "user deleted successfully"})))
}

#[cfg(test)]
mod tests {
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
        Router,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    async fn app() -> Router {
        let state = crate::test_state().await;
        crate::api::create_router(state)
    }

    async fn send(
        router: &Router,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    fn register_body(email: &str) -> Value {
        json!({
            "full_name": "Jane Doe",
            "email": email,
            "password": "secret123"
        })
    }

    #[tokio::test]
    async fn test_register_validation_failures() {
        let app = app().await;

        let (status, _) = send(
            &app,
            "POST",
            "/api/v1/auth/register",
            None,
            Some(json!({"full_name": "Jane", "email": "jane@example.com", "password": "short"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(
            &app,
            "POST",
            "/api/v1/auth/register",
            None,
            Some(json!({"full_name": "Jane", "email": "not-an-email", "password": "secret123"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(
            &app,
            "POST",
            "/api/v1/auth/register",
            None,
            Some(json!({"full_name": "  ", "email": "jane@example.com", "password": "secret123"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_register_duplicate_email_conflicts() {
        let app = app().await;

        let (status, _) = send(
            &app,
            "POST",
            "/api/v1/auth/register",
            None,
            Some(register_body("dup@example.com")),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = send(
            &app,
            "POST",
            "/api/v1/auth/register",
            None,
            Some(register_body("dup@example.com")),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"]["code"], "conflict");
    }

    #[tokio::test]
    async fn test_login_unknown_and_wrong_password_look_identical() {
        let app = app().await;
        send(
            &app,
            "POST",
            "/api/v1/auth/register",
            None,
            Some(register_body("real@example.com")),
        )
        .await;

        let (unknown_status, unknown_body) = send(
            &app,
            "POST",
            "/api/v1/auth/login",
            None,
            Some(json!({"email": "unknown@example.com", "password": "anything"})),
        )
        .await;
        let (wrong_status, wrong_body) = send(
            &app,
            "POST",
            "/api/v1/auth/login",
            None,
            Some(json!({"email": "real@example.com", "password": "wrongpassword"})),
        )
        .await;

        assert_eq!(unknown_status, StatusCode::UNAUTHORIZED);
        assert_eq!(wrong_status, StatusCode::UNAUTHORIZED);
        assert_eq!(unknown_body, wrong_body);
    }

    #[tokio::test]
    async fn test_admin_routes_require_token() {
        let app = app().await;
        let (status, _) = send(&app, "GET", "/api/v1/admin/users", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_register_login_and_access_flow() {
        let app = app().await;

        // Register
        let (status, _) = send(
            &app,
            "POST",
            "/api/v1/auth/register",
            None,
            Some(json!({
                "full_name": "Jane Doe",
                "email": "a@x.com",
                "password": "secret123"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        // Login
        let (status, body) = send(
            &app,
            "POST",
            "/api/v1/auth/login",
            None,
            Some(json!({"email": "a@x.com", "password": "secret123"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let token = body["access_token"].as_str().unwrap().to_string();
        let user_id = body["user"]["id"].as_str().unwrap().to_string();
        assert_eq!(body["user"]["role"], "user");
        assert_eq!(body["user"]["status"], "active");
        assert!(body["user"].get("password_hash").is_none());

        // The minted token admits the protected profile route.
        let (status, body) = send(
            &app,
            "GET",
            &format!("/api/v1/admin/users/{user_id}"),
            Some(&token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["email"], "a@x.com");
        assert!(body.get("password_hash").is_none());

        // Update profile
        let (status, body) = send(
            &app,
            "PUT",
            &format!("/api/v1/admin/users/{user_id}"),
            Some(&token),
            Some(json!({
                "full_name": "Jane Q. Doe",
                "email": "a@x.com",
                "role": "user",
                "status": "active"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "profile updated successfully");

        // List shows the updated name.
        let (status, body) = send(&app, "GET", "/api/v1/admin/users", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 1);
        assert_eq!(body[0]["full_name"], "Jane Q. Doe");

        // Delete
        let (status, _) = send(
            &app,
            "DELETE",
            &format!("/api/v1/admin/users/{user_id}"),
            Some(&token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = send(
            &app,
            "GET",
            &format!("/api/v1/admin/users/{user_id}"),
            Some(&token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_get_missing_profile_is_404() {
        let app = app().await;
        let state = crate::test_state().await;
        let (token, _) = state
            .token_maker
            .create_token("someone", chrono::Duration::minutes(5))
            .unwrap();

        let (status, _) = send(
            &app,
            "GET",
            "/api/v1/admin/users/no-such-id",
            Some(&token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
