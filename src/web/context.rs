//! Request context filled in by the bearer middleware.

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::web::error::WebError;

#[derive(Debug, Clone)]
pub struct RequestContext {
    email: Option<String>,
}

impl RequestContext {
    pub fn new(email: Option<String>) -> Self {
        Self { email }
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }
}

impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = WebError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let ctx = parts.extensions.get::<RequestContext>();
        if let Some(ctx) = ctx {
            Ok(ctx.clone())
        } else {
            Ok(RequestContext::new(None))
        }
    }
}
