use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi};

pub struct BearerAuthModifier;

impl Modify for BearerAuthModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(schema) = openapi.components.as_mut() {
            schema.add_security_scheme(
                "bearer",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::web::routes::general::health_handler,
        crate::web::routes::general::login_handler,
        crate::web::routes::general::private_data_handler,
        crate::web::routes::users::user_create_handler,
        crate::web::routes::users::user_signin_handler,
        crate::web::routes::users::user_get_handler,
        crate::web::routes::users::user_by_username_handler,
        crate::web::routes::users::user_update_handler,
        crate::web::routes::users::user_delete_handler,
        crate::web::routes::users::user_posts_handler,
        crate::web::routes::posts::post_create_handler,
        crate::web::routes::posts::post_list_handler,
        crate::web::routes::posts::post_get_handler,
        crate::web::routes::posts::post_delete_handler,
        crate::web::routes::posts::post_like_handler,
        crate::web::routes::posts::post_unlike_handler,
        crate::web::routes::posts::post_likes_count_handler,
        crate::web::routes::posts::post_liked_handler,
        crate::web::routes::posts::comment_create_handler,
        crate::web::routes::posts::comment_list_handler,
        crate::web::routes::comments::comment_delete_handler,
    ),
    modifiers(&BearerAuthModifier),
)]
pub struct ApiDoc;
