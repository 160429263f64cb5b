use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

use crate::api::handlers::{create_recipe, get_recipe, health_check, list_recipes};
use crate::api::AppState;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/recipes/", get(list_recipes).post(create_recipe))
        .route("/recipes/:recipe_id", get(get_recipe))
        .route("/health", get(health_check))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
