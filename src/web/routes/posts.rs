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
    model::{
        DatabaseError, ResourceType, ResourceTyped,
        entity::{Comment, CommentWithAuthor, Post, PostCreate, PostWithAuthor},
    },
    web::{AppState, WebError, WebResult, error::ErrorResponse, routes::PaginationQuery},
};

#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct LikeBody {
    pub user_id: Uuid,
}

#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct CommentBody {
    pub user_id: Uuid,
    pub text: String,
}

/// Whether the call changed anything.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct ChangedResponse {
    pub changed: bool,
}

#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct CountResponse {
    pub count: i64,
}

#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct LikedResponse {
    pub liked: bool,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", post(post_create_handler).get(post_list_handler))
        .route("/{id}", get(post_get_handler).delete(post_delete_handler))
        .route("/{id}/likes", post(post_like_handler).get(post_likes_count_handler))
        .route(
            "/{id}/likes/{user_id}",
            get(post_liked_handler).delete(post_unlike_handler),
        )
        .route(
            "/{id}/comments",
            post(comment_create_handler).get(comment_list_handler),
        )
}

fn post_error(e: DatabaseError) -> WebError {
    WebError::database(Post::get_resource_type(), e)
}

fn like_error(e: DatabaseError) -> WebError {
    WebError::database(ResourceType::Like, e)
}

#[utoipa::path(
    post,
    path = "/api/v1/posts",
    request_body = PostCreate,
    description = "Creates a post. An author may create at most 7 posts within 7 days",
    responses(
        (status = 200, description = "Post created", body = Post),
        (status = 404, description = "Author not found", body = ErrorResponse),
        (status = 429, description = "Post limit reached", body = ErrorResponse),
        (status = 503, description = "Database unavailable", body = ErrorResponse),
    ),
    tag = "posts",
    security(("bearer" = []))
)]
pub async fn post_create_handler(
    State(state): State<AppState>,
    Json(payload): Json<PostCreate>,
) -> WebResult<impl IntoResponse> {
    let created = state.db().create_post(payload).await.map_err(post_error)?;
    Ok((StatusCode::OK, Json(created)))
}

#[utoipa::path(
    get,
    path = "/api/v1/posts",
    params(PaginationQuery),
    responses(
        (status = 200, description = "A random page of posts", body = Vec<PostWithAuthor>),
    ),
    tag = "posts",
    security(("bearer" = []))
)]
pub async fn post_list_handler(
    State(state): State<AppState>,
    Query(page): Query<PaginationQuery>,
) -> WebResult<impl IntoResponse> {
    let posts = state
        .db()
        .get_posts(page.limit(), page.offset())
        .await
        .map_err(post_error)?;

    Ok((StatusCode::OK, Json(posts)))
}

#[utoipa::path(
    get,
    path = "/api/v1/posts/{id}",
    params(("id" = Uuid, Path, description = "Post id")),
    responses(
        (status = 200, description = "Requested post", body = PostWithAuthor),
        (status = 404, description = "Post not found", body = ErrorResponse),
    ),
    tag = "posts",
    security(("bearer" = []))
)]
pub async fn post_get_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> WebResult<impl IntoResponse> {
    let found = state
        .db()
        .get_post_by_id(id)
        .await
        .map_err(post_error)?
        .ok_or_else(|| WebError::resource_not_found(Post::get_resource_type()))?;

    Ok((StatusCode::OK, Json(found)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/posts/{id}",
    params(("id" = Uuid, Path, description = "Post id")),
    responses(
        (status = 200, description = "Post deleted"),
        (status = 404, description = "Post not found", body = ErrorResponse),
    ),
    tag = "posts",
    security(("bearer" = []))
)]
pub async fn post_delete_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> WebResult<impl IntoResponse> {
    if !state.db().delete_post(id).await.map_err(post_error)? {
        return Err(WebError::resource_not_found(Post::get_resource_type()));
    }
    Ok(StatusCode::OK)
}

#[utoipa::path(
    post,
    path = "/api/v1/posts/{id}/likes",
    params(("id" = Uuid, Path, description = "Post id")),
    request_body = LikeBody,
    responses(
        (status = 200, description = "`changed` is false when already liked", body = ChangedResponse),
        (status = 404, description = "User or post not found", body = ErrorResponse),
    ),
    tag = "likes",
    security(("bearer" = []))
)]
pub async fn post_like_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<LikeBody>,
) -> WebResult<impl IntoResponse> {
    let changed = state
        .db()
        .like_post(payload.user_id, id)
        .await
        .map_err(like_error)?;

    Ok((StatusCode::OK, Json(ChangedResponse { changed })))
}

#[utoipa::path(
    delete,
    path = "/api/v1/posts/{id}/likes/{user_id}",
    params(
        ("id" = Uuid, Path, description = "Post id"),
        ("user_id" = Uuid, Path, description = "User id"),
    ),
    responses(
        (status = 200, description = "`changed` is false when there was no like", body = ChangedResponse),
    ),
    tag = "likes",
    security(("bearer" = []))
)]
pub async fn post_unlike_handler(
    State(state): State<AppState>,
    Path((id, user_id)): Path<(Uuid, Uuid)>,
) -> WebResult<impl IntoResponse> {
    let changed = state
        .db()
        .unlike_post(user_id, id)
        .await
        .map_err(like_error)?;

    Ok((StatusCode::OK, Json(ChangedResponse { changed })))
}

#[utoipa::path(
    get,
    path = "/api/v1/posts/{id}/likes",
    params(("id" = Uuid, Path, description = "Post id")),
    responses(
        (status = 200, description = "Number of likes", body = CountResponse),
    ),
    tag = "likes",
    security(("bearer" = []))
)]
pub async fn post_likes_count_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> WebResult<impl IntoResponse> {
    let count = state
        .db()
        .get_post_likes_count(id)
        .await
        .map_err(like_error)?;

    Ok((StatusCode::OK, Json(CountResponse { count })))
}

#[utoipa::path(
    get,
    path = "/api/v1/posts/{id}/likes/{user_id}",
    params(
        ("id" = Uuid, Path, description = "Post id"),
        ("user_id" = Uuid, Path, description = "User id"),
    ),
    responses(
        (status = 200, description = "Whether the user liked the post", body = LikedResponse),
    ),
    tag = "likes",
    security(("bearer" = []))
)]
pub async fn post_liked_handler(
    State(state): State<AppState>,
    Path((id, user_id)): Path<(Uuid, Uuid)>,
) -> WebResult<impl IntoResponse> {
    let liked = state
        .db()
        .is_post_liked_by_user(user_id, id)
        .await
        .map_err(like_error)?;

    Ok((StatusCode::OK, Json(LikedResponse { liked })))
}

#[utoipa::path(
    post,
    path = "/api/v1/posts/{id}/comments",
    params(("id" = Uuid, Path, description = "Post id")),
    request_body = CommentBody,
    responses(
        (status = 200, description = "Comment created", body = Comment),
        (status = 404, description = "User or post not found", body = ErrorResponse),
    ),
    tag = "comments",
    security(("bearer" = []))
)]
pub async fn comment_create_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CommentBody>,
) -> WebResult<impl IntoResponse> {
    if payload.text.trim().is_empty() {
        return Err(WebError::resource_bad_request(Comment::get_resource_type()));
    }

    let created = state
        .db()
        .create_comment(payload.user_id, id, &payload.text)
        .await
        .map_err(|e| WebError::database(Comment::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(created)))
}

#[utoipa::path(
    get,
    path = "/api/v1/posts/{id}/comments",
    params(("id" = Uuid, Path, description = "Post id"), PaginationQuery),
    responses(
        (status = 200, description = "Comments, oldest first", body = Vec<CommentWithAuthor>),
    ),
    tag = "comments",
    security(("bearer" = []))
)]
pub async fn comment_list_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(page): Query<PaginationQuery>,
) -> WebResult<impl IntoResponse> {
    let comments = state
        .db()
        .get_post_comments(id, page.limit(), page.offset())
        .await
        .map_err(|e| WebError::database(Comment::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(comments)))
}
