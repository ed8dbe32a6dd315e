use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};

use crate::web::{AppState, RequestContext, WebError, WebResult, error::ErrorResponse};

#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct LoginBody {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct LoginResponse {
    pub token: String,
    pub status: String,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route("/login", post(login_handler))
}

async fn root_handler() -> &'static str {
    "Hello World!"
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is alive", body = String),
    ),
    tag = "general"
)]
pub async fn health_handler() -> &'static str {
    "The wall is here"
}

#[utoipa::path(
    post,
    path = "/login",
    request_body = LoginBody,
    description = "Exchanges the configured credentials for the bearer token",
    responses(
        (status = 200, description = "Credentials accepted", body = LoginResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse),
    ),
    tag = "general"
)]
pub async fn login_handler(
    State(state): State<AppState>,
    Json(payload): Json<LoginBody>,
) -> WebResult<impl IntoResponse> {
    let app = state.config().app();
    if payload.email != app.login_email() || payload.password != app.login_password() {
        return Err(WebError::auth_invalid_credentials());
    }

    let body = LoginResponse {
        token: app.token().to_string(),
        status: String::from("success"),
    };
    Ok((StatusCode::OK, Json(body)))
}

#[utoipa::path(
    get,
    path = "/private/data",
    responses(
        (status = 200, description = "Email bound to the token", body = String),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
    ),
    tag = "general",
    security(
        ("bearer" = [])
    )
)]
pub async fn private_data_handler(ctx: RequestContext) -> impl IntoResponse {
    ctx.email().unwrap_or_default().to_string()
}
