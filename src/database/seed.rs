use diesel::SqliteConnection;
use serde::Deserialize;
use thiserror::Error;
use tracing::{info, trace_span};

use crate::database::models::recipe::{Recipe, RecipeDraft};
use crate::error::RecipeError;

const SEED_RECIPES: &str = include_str!("../resources/json/seed_recipes.json");

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("can't parse seed recipes: {0}")]
    Parse(#[from] serde_json::Error),

    #[error(transparent)]
    Recipe(#[from] RecipeError),

    #[error("database error: {0}")]
    Database(#[from] diesel::result::Error),
}

#[derive(Deserialize, Debug)]
struct SeedRecipe {
    title: String,
    description: Option<String>,
    cooking_time: i32,
    ingredients: Vec<String>,
}

impl From<SeedRecipe> for RecipeDraft {
    fn from(seed: SeedRecipe) -> Self {
        RecipeDraft::new(seed.title, seed.description, seed.cooking_time, seed.ingredients)
    }
}

pub fn demo_recipes() -> Result<Vec<RecipeDraft>, serde_json::Error> {
    let seeds: Vec<SeedRecipe> = serde_json::from_str(SEED_RECIPES)?;

    Ok(seeds.into_iter().map(RecipeDraft::from).collect())
}

/// Fills an empty catalog with the demo recipes, in one transaction.
/// Returns how many recipes were added; a catalog that already has recipes
/// is left alone.
pub fn populate_if_empty(connection: &mut SqliteConnection) -> Result<usize, SeedError> {
    let span = trace_span!("populating database");
    let _guard = span.enter();

    let drafts = demo_recipes()?;

    connection.immediate_transaction(|connection| {
        if Recipe::count(connection)? > 0 {
            info!("catalog already populated, skipping seed");
            return Ok(0);
        }

        for draft in &drafts {
            Recipe::create(connection, draft)?;
        }

        info!(recipes = drafts.len(), "seeded demo recipes");
        Ok(drafts.len())
    })
}

#[cfg(test)]
mod tests {
    use diesel::prelude::*;

    use super::*;
    use crate::database::establish_in_memory_pool;
    use crate::database::schema::{ingredients, recipe_ingredient};

    #[test]
    fn demo_recipes_parse() {
        let drafts = demo_recipes().unwrap();

        assert_eq!(drafts.len(), 5);
        assert!(drafts.iter().all(|draft| draft.cooking_time >= 1));
        assert!(drafts.iter().all(|draft| !draft.ingredients.is_empty()));
    }

    #[test]
    fn populates_empty_catalog_once() {
        let pool = establish_in_memory_pool().unwrap();
        let mut connection = pool.get().unwrap();

        assert_eq!(populate_if_empty(&mut connection).unwrap(), 5);
        assert_eq!(populate_if_empty(&mut connection).unwrap(), 0);

        assert_eq!(Recipe::count(&mut connection).unwrap(), 5);

        let ingredient_rows: i64 = ingredients::table
            .count()
            .get_result(&mut connection)
            .unwrap();
        assert_eq!(ingredient_rows, 16);

        let link_rows: i64 = recipe_ingredient::table
            .count()
            .get_result(&mut connection)
            .unwrap();
        assert_eq!(link_rows, 16);
    }

    #[test]
    fn seeded_recipes_start_unviewed() {
        let pool = establish_in_memory_pool().unwrap();
        let mut connection = pool.get().unwrap();

        populate_if_empty(&mut connection).unwrap();

        assert!(Recipe::list(&mut connection)
            .unwrap()
            .iter()
            .all(|recipe| recipe.views == 0));
    }
}
