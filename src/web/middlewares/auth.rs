use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};

use crate::{
    auth,
    web::{AppState, RequestContext, error::WebError},
};

pub async fn bearer_auth_fn(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, WebError> {
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    auth::check_bearer(header, state.config().app().token()).map_err(WebError::auth_bearer)?;

    let email = state.config().app().login_email().to_string();
    req.extensions_mut()
        .insert(RequestContext::new(Some(email)));

    Ok(next.run(req).await)
}
