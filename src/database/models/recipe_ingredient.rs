use diesel::prelude::*;
use lombok::AllArgsConstructor;

use crate::database::schema::recipe_ingredient;

#[derive(Insertable, AllArgsConstructor, Debug)]
#[diesel(table_name = recipe_ingredient)]
pub struct RecipeIngredient {
    pub recipe_id: i32,
    pub ingredient_id: i32,
}

impl RecipeIngredient {
    /// Links `recipe_id` to every ingredient in `ingredient_ids`. The recipe
    /// row must already exist.
    pub fn link(
        connection: &mut SqliteConnection,
        recipe_id: i32,
        ingredient_ids: &[i32],
    ) -> QueryResult<usize> {
        if ingredient_ids.is_empty() {
            return Ok(0);
        }

        let links: Vec<RecipeIngredient> = ingredient_ids
            .iter()
            .map(|ingredient_id| RecipeIngredient::new(recipe_id, *ingredient_id))
            .collect();

        diesel::insert_into(recipe_ingredient::table)
            .values(&links)
            .execute(connection)
    }
}
