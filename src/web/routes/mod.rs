use axum::{Router, middleware, routing::get};
use serde::Deserialize;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::web::{AppState, doc::ApiDoc, middlewares};

pub mod comments;
pub mod general;
pub mod posts;
pub mod users;

const DEFAULT_PAGE_LIMIT: i64 = 20;
const MAX_PAGE_LIMIT: i64 = 100;

#[derive(Debug, Clone, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PaginationQuery {
    limit: Option<i64>,
    offset: Option<i64>,
}

impl PaginationQuery {
    pub fn limit(&self) -> i64 {
        self.limit
            .unwrap_or(DEFAULT_PAGE_LIMIT)
            .clamp(1, MAX_PAGE_LIMIT)
    }

    pub fn offset(&self) -> i64 {
        self.offset.unwrap_or(0).max(0)
    }
}

pub fn build_app(state: AppState) -> Router {
    let protected = Router::new()
        .route("/private/data", get(general::private_data_handler))
        .nest("/api/v1/users", users::routes())
        .nest("/api/v1/posts", posts::routes())
        .nest("/api/v1/comments", comments::routes())
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::bearer_auth_fn,
        ));

    let mut router = Router::new()
        .merge(general::routes())
        .merge(protected)
        .layer(CorsLayer::very_permissive())
        .with_state(state.clone());

    if state.config().app().docs() {
        let openapi = ApiDoc::openapi();

        router = router.merge(SwaggerUi::new("/api/v1/docs").url("/api-doc/openapi.json", openapi));
    }

    router
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn pagination_defaults_and_clamps() {
        let q = PaginationQuery { limit: None, offset: None };
        assert_eq!((q.limit(), q.offset()), (DEFAULT_PAGE_LIMIT, 0));

        let q = PaginationQuery { limit: Some(10_000), offset: Some(-3) };
        assert_eq!((q.limit(), q.offset()), (MAX_PAGE_LIMIT, 0));

        let q = PaginationQuery { limit: Some(0), offset: Some(40) };
        assert_eq!((q.limit(), q.offset()), (1, 40));
    }
}
