pub mod error;
pub mod handlers;
pub mod state;

pub use state::ApiState;

use axum::{
    Router,
    routing::{get, put},
};

pub fn build_api_router(state: ApiState) -> Router {
    Router::new()
        .route(
            "/api/v1/posts",
            get(handlers::list_posts).post(handlers::create_post),
        )
        .route("/api/v1/posts/featured", get(handlers::featured_posts))
        .route(
            "/api/v1/posts/{id}",
            get(handlers::get_post)
                .put(handlers::edit_post)
                .delete(handlers::delete_post),
        )
        .route(
            "/api/v1/posts/{id}/star",
            put(handlers::star_post).delete(handlers::unstar_post),
        )
        .route(
            "/api/v1/featured",
            put(handlers::set_featured_post).delete(handlers::clear_featured_post),
        )
        .with_state(state)
}
