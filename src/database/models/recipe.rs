use diesel::dsl::exists;
use diesel::prelude::*;
use lombok::AllArgsConstructor;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace_span};

use crate::database::models::{ingredient::Ingredient, recipe_ingredient::RecipeIngredient};
use crate::database::schema::recipes;
use crate::error::{RecipeError, Result};

#[derive(Queryable, Selectable, Identifiable, Debug, Clone, PartialEq, Eq)]
#[diesel(table_name = recipes)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Recipe {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub cooking_time: i32,
    pub views: i32,
}

#[derive(Insertable, AllArgsConstructor, Debug)]
#[diesel(table_name = recipes)]
pub struct NewRecipe {
    pub title: String,
    pub description: Option<String>,
    pub cooking_time: i32,
    pub views: i32,
}

/// Short form used by the listing.
#[derive(Queryable, Selectable, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[diesel(table_name = recipes)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct RecipeSummary {
    pub title: String,
    pub cooking_time: i32,
    pub views: i32,
}

/// Long form: the recipe with its ingredient names, without the view count.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct RecipeDetail {
    pub title: String,
    pub cooking_time: i32,
    pub description: Option<String>,
    pub list_of_ingredients: Vec<String>,
}

/// A validated recipe waiting to be stored.
#[derive(AllArgsConstructor, Debug, Clone)]
pub struct RecipeDraft {
    pub title: String,
    pub description: Option<String>,
    pub cooking_time: i32,
    pub ingredients: Vec<String>,
}

impl Recipe {
    /// Every recipe, most viewed first, quickest first among equals.
    pub fn list(connection: &mut SqliteConnection) -> QueryResult<Vec<RecipeSummary>> {
        recipes::table
            .select(RecipeSummary::as_select())
            .order((
                recipes::views.desc(),
                recipes::cooking_time.asc(),
                recipes::id.asc(),
            ))
            .load(connection)
    }

    pub fn find(connection: &mut SqliteConnection, recipe_id: i32) -> Result<Recipe> {
        recipes::table
            .find(recipe_id)
            .select(Recipe::as_select())
            .first(connection)
            .optional()?
            .ok_or(RecipeError::NotFound)
    }

    pub fn detail(connection: &mut SqliteConnection, recipe_id: i32) -> Result<RecipeDetail> {
        let recipe = Self::find(connection, recipe_id)?;
        let list_of_ingredients = Ingredient::names_for_recipe(connection, recipe.id)?;

        Ok(RecipeDetail {
            title: recipe.title,
            cooking_time: recipe.cooking_time,
            description: recipe.description,
            list_of_ingredients,
        })
    }

    /// Reads a recipe the way a visitor does: the view counter goes up by one
    /// on every successful read.
    pub fn view(connection: &mut SqliteConnection, recipe_id: i32) -> Result<RecipeDetail> {
        let detail = Self::detail(connection, recipe_id)?;
        Self::increment_views(connection, Some(recipe_id))?;

        Ok(detail)
    }

    /// Adds one view to `recipe_id`, or to every recipe when `None`.
    /// Returns the number of recipes touched.
    pub fn increment_views(
        connection: &mut SqliteConnection,
        recipe_id: Option<i32>,
    ) -> Result<usize> {
        match recipe_id {
            Some(recipe_id) => {
                let updated = diesel::update(recipes::table.find(recipe_id))
                    .set(recipes::views.eq(recipes::views + 1))
                    .execute(connection)?;

                if updated == 0 {
                    return Err(RecipeError::NotFound);
                }

                Ok(updated)
            }
            None => Ok(diesel::update(recipes::table)
                .set(recipes::views.eq(recipes::views + 1))
                .execute(connection)?),
        }
    }

    pub fn title_taken(connection: &mut SqliteConnection, title: &str) -> QueryResult<bool> {
        diesel::select(exists(recipes::table.filter(recipes::title.eq(title))))
            .get_result(connection)
    }

    /// Stores a new recipe with zero views and links its ingredients,
    /// creating the ones that don't exist yet. Run it inside a transaction:
    /// a failure halfway leaves partial rows otherwise.
    pub fn create(connection: &mut SqliteConnection, draft: &RecipeDraft) -> Result<RecipeDetail> {
        let span = trace_span!("create recipe", title = %draft.title);
        let _guard = span.enter();

        if Self::title_taken(connection, &draft.title)? {
            debug!("title already taken");
            return Err(RecipeError::AlreadyExists);
        }

        let new_recipe = NewRecipe::new(
            draft.title.clone(),
            draft.description.clone(),
            draft.cooking_time,
            0,
        );

        let recipe_id: i32 = diesel::insert_into(recipes::table)
            .values(&new_recipe)
            .returning(recipes::id)
            .get_result(connection)
            .map_err(RecipeError::from_recipe_insert)?;

        let ingredient_ids = Ingredient::resolve_ids(connection, &draft.ingredients)?;
        RecipeIngredient::link(connection, recipe_id, &ingredient_ids)?;

        debug!(recipe_id, ingredients = ingredient_ids.len(), "recipe created");

        Self::detail(connection, recipe_id)
    }

    pub fn count(connection: &mut SqliteConnection) -> QueryResult<i64> {
        recipes::table.count().get_result(connection)
    }
}
