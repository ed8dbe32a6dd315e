use axum::{
    Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::delete,
};
use uuid::Uuid;

use crate::{
    model::{ResourceTyped, entity::Comment},
    web::{AppState, WebError, WebResult, error::ErrorResponse},
};

pub fn routes() -> Router<AppState> {
    Router::new().route("/{id}", delete(comment_delete_handler))
}

#[utoipa::path(
    delete,
    path = "/api/v1/comments/{id}",
    params(("id" = Uuid, Path, description = "Comment id")),
    responses(
        (status = 200, description = "Comment deleted"),
        (status = 404, description = "Comment not found", body = ErrorResponse),
    ),
    tag = "comments",
    security(("bearer" = []))
)]
pub async fn comment_delete_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> WebResult<impl IntoResponse> {
    let deleted = state
        .db()
        .delete_comment(id)
        .await
        .map_err(|e| WebError::database(Comment::get_resource_type(), e))?;

    if !deleted {
        return Err(WebError::resource_not_found(Comment::get_resource_type()));
    }
    Ok(StatusCode::OK)
}
