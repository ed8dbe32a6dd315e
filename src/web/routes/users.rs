use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    auth::{hash_password, verify_password},
    model::{
        ResourceTyped,
        entity::{Post, User, UserUpdate},
    },
    web::{AppState, WebError, WebResult, error::ErrorResponse, routes::PaginationQuery},
};

#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct UserCreateBody {
    pub username: String,
    pub password: String,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", post(user_create_handler))
        .route("/signin", post(user_signin_handler))
        .route("/by-username/{username}", get(user_by_username_handler))
        .route(
            "/{id}",
            get(user_get_handler)
                .put(user_update_handler)
                .delete(user_delete_handler),
        )
        .route("/{id}/posts", get(user_posts_handler))
}

fn user_error(e: crate::model::DatabaseError) -> WebError {
    WebError::database(User::get_resource_type(), e)
}

#[utoipa::path(
    post,
    path = "/api/v1/users",
    request_body = UserCreateBody,
    description = "Creates new user in database",
    responses(
        (status = 200, description = "User created successfully", body = User),
        (status = 409, description = "User already exists", body = ErrorResponse),
        (status = 503, description = "Database unavailable", body = ErrorResponse),
    ),
    tag = "users",
    security(("bearer" = []))
)]
pub async fn user_create_handler(
    State(state): State<AppState>,
    Json(payload): Json<UserCreateBody>,
) -> WebResult<impl IntoResponse> {
    if payload.username.trim().is_empty() || payload.password.is_empty() {
        return Err(WebError::resource_bad_request(User::get_resource_type()));
    }

    let hash = hash_password(&payload.password).map_err(WebError::server_crypt_error)?;
    let created = state
        .db()
        .create_user(&payload.username, &hash)
        .await
        .map_err(user_error)?;

    Ok((StatusCode::OK, Json(created)))
}

#[utoipa::path(
    post,
    path = "/api/v1/users/signin",
    request_body = UserCreateBody,
    description = "Checks user credentials and records the login time",
    responses(
        (status = 200, description = "User signed in", body = User),
        (status = 401, description = "Credentials invalid", body = ErrorResponse),
    ),
    tag = "users",
    security(("bearer" = []))
)]
pub async fn user_signin_handler(
    State(state): State<AppState>,
    Json(payload): Json<UserCreateBody>,
) -> WebResult<impl IntoResponse> {
    let found = state
        .db()
        .get_user_by_username(&payload.username)
        .await
        .map_err(user_error)?
        .ok_or_else(WebError::auth_invalid_credentials)?;

    let is_verified =
        verify_password(found.hash(), &payload.password).map_err(WebError::server_crypt_error)?;
    if !is_verified {
        return Err(WebError::auth_invalid_credentials());
    }

    state
        .db()
        .update_last_login(found.id())
        .await
        .map_err(user_error)?;

    let refreshed = state
        .db()
        .get_user_by_id(found.id())
        .await
        .map_err(user_error)?
        .unwrap_or(found);

    Ok((StatusCode::OK, Json(refreshed)))
}

#[utoipa::path(
    get,
    path = "/api/v1/users/{id}",
    params(("id" = Uuid, Path, description = "User id")),
    responses(
        (status = 200, description = "Requested user", body = User),
        (status = 404, description = "User not found", body = ErrorResponse),
    ),
    tag = "users",
    security(("bearer" = []))
)]
pub async fn user_get_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> WebResult<impl IntoResponse> {
    let found = state
        .db()
        .get_user_by_id(id)
        .await
        .map_err(user_error)?
        .ok_or_else(|| WebError::resource_not_found(User::get_resource_type()))?;

    Ok((StatusCode::OK, Json(found)))
}

#[utoipa::path(
    get,
    path = "/api/v1/users/by-username/{username}",
    params(("username" = String, Path, description = "Exact username")),
    responses(
        (status = 200, description = "Requested user", body = User),
        (status = 404, description = "User not found", body = ErrorResponse),
    ),
    tag = "users",
    security(("bearer" = []))
)]
pub async fn user_by_username_handler(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> WebResult<impl IntoResponse> {
    let found = state
        .db()
        .get_user_by_username(&username)
        .await
        .map_err(user_error)?
        .ok_or_else(|| WebError::resource_not_found(User::get_resource_type()))?;

    Ok((StatusCode::OK, Json(found)))
}

#[utoipa::path(
    put,
    path = "/api/v1/users/{id}",
    params(("id" = Uuid, Path, description = "User id")),
    request_body = UserUpdate,
    responses(
        (status = 200, description = "User updated successfully", body = User),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 409, description = "Username taken", body = ErrorResponse),
    ),
    tag = "users",
    security(("bearer" = []))
)]
pub async fn user_update_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UserUpdate>,
) -> WebResult<impl IntoResponse> {
    let updated = state
        .db()
        .update_user(id, payload)
        .await
        .map_err(user_error)?
        .ok_or_else(|| WebError::resource_not_found(User::get_resource_type()))?;

    Ok((StatusCode::OK, Json(updated)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/users/{id}",
    params(("id" = Uuid, Path, description = "User id")),
    responses(
        (status = 200, description = "User deleted successfully"),
        (status = 404, description = "User not found", body = ErrorResponse),
    ),
    tag = "users",
    security(("bearer" = []))
)]
pub async fn user_delete_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> WebResult<impl IntoResponse> {
    let deleted = state.db().delete_user(id).await.map_err(user_error)?;
    if !deleted {
        return Err(WebError::resource_not_found(User::get_resource_type()));
    }

    Ok(StatusCode::OK)
}

#[utoipa::path(
    get,
    path = "/api/v1/users/{id}/posts",
    params(("id" = Uuid, Path, description = "Author id"), PaginationQuery),
    responses(
        (status = 200, description = "Author posts, newest first", body = Vec<Post>),
    ),
    tag = "users",
    security(("bearer" = []))
)]
pub async fn user_posts_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(page): Query<PaginationQuery>,
) -> WebResult<impl IntoResponse> {
    let posts = state
        .db()
        .get_user_posts(id, page.limit(), page.offset())
        .await
        .map_err(|e| WebError::database(Post::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(posts)))
}
