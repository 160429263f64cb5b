use axum::{
    extract::{rejection::JsonRejection, rejection::PathRejection, Path, State},
    http::StatusCode,
    Json,
};
use tracing::info;

use crate::api::payloads::{validate_recipe_id, CreateRecipeRequest};
use crate::api::AppState;
use crate::database::models::recipe::{Recipe, RecipeDetail, RecipeSummary};
use crate::error::{RecipeError, Result};

/// List every recipe, most viewed first
///
/// GET /recipes/
pub async fn list_recipes(State(state): State<AppState>) -> Result<Json<Vec<RecipeSummary>>> {
    let recipes = state
        .with_connection(|connection| Ok(Recipe::list(connection)?))
        .await?;

    Ok(Json(recipes))
}

/// Full recipe with its ingredients. Counts as a view.
///
/// GET /recipes/:recipe_id
pub async fn get_recipe(
    State(state): State<AppState>,
    recipe_id: std::result::Result<Path<i32>, PathRejection>,
) -> Result<Json<RecipeDetail>> {
    let Path(recipe_id) =
        recipe_id.map_err(|rejection| RecipeError::validation(rejection.body_text()))?;
    let recipe_id = validate_recipe_id(recipe_id)?;

    let detail = state
        .in_transaction(move |connection| Recipe::view(connection, recipe_id))
        .await?;

    Ok(Json(detail))
}

/// Create a recipe, creating its unknown ingredients on the way
///
/// POST /recipes/
///
/// Returns:
/// - 201 Created with the stored recipe
/// - 409 Conflict if a recipe with the same title exists
pub async fn create_recipe(
    State(state): State<AppState>,
    payload: std::result::Result<Json<CreateRecipeRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<RecipeDetail>)> {
    let Json(request) =
        payload.map_err(|rejection| RecipeError::validation(rejection.body_text()))?;
    let draft = request.validate()?;

    let detail = state
        .in_transaction(move |connection| Recipe::create(connection, &draft))
        .await?;

    info!(title = %detail.title, "recipe created");

    Ok((StatusCode::CREATED, Json(detail)))
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "OK"
}
