pub mod auth;
pub mod error;
mod persons;
mod users;

use axum::{
    middleware,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // Auth routes (public)
    let auth_routes = Router::new()
        .route("/register", post(users::register))
        .route("/login", post(users::login));

    // Admin routes, protected by the bearer-token gate
    let admin_routes = Router::new()
        .route("/users", get(users::list_users))
        .route("/users/:id", get(users::get_profile))
        .route("/users/:id", put(users::update_profile))
        .route("/users/:id", delete(users::delete_user))
        .route("/person", get(persons::get_default_person))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::auth_middleware,
        ));

    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1/auth", auth_routes)
        .nest("/api/v1/admin", admin_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health_check() -> Json<Value> {
    Json(json!({"status": "ok"}))
}
