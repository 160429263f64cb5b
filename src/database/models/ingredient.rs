use std::collections::HashSet;

use diesel::prelude::*;
use itertools::Itertools;
use lombok::AllArgsConstructor;
use tracing::debug;

use crate::database::schema::{ingredients, recipe_ingredient};

#[derive(Queryable, Selectable, Identifiable, Debug, Clone, PartialEq, Eq, Hash)]
#[diesel(table_name = ingredients)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Ingredient {
    pub id: i32,
    pub name: String,
}

#[derive(Insertable, AllArgsConstructor, Debug)]
#[diesel(table_name = ingredients)]
pub struct NewIngredient {
    pub name: String,
}

impl Ingredient {
    /// Makes sure every name in `requested` has a row and returns the ids of
    /// all of them. Duplicate names count once; an empty request touches
    /// nothing.
    pub fn resolve_ids(
        connection: &mut SqliteConnection,
        requested: &[String],
    ) -> QueryResult<Vec<i32>> {
        let names: Vec<String> = requested.iter().unique().cloned().collect();
        if names.is_empty() {
            return Ok(Vec::new());
        }

        let existing: HashSet<String> = ingredients::table
            .filter(ingredients::name.eq_any(&names))
            .select(ingredients::name)
            .load::<String>(connection)?
            .into_iter()
            .collect();

        let missing: Vec<NewIngredient> = names
            .iter()
            .filter(|name| !existing.contains(*name))
            .map(|name| NewIngredient::new(name.clone()))
            .collect();

        if !missing.is_empty() {
            debug!(count = missing.len(), "inserting new ingredients");

            // A concurrent writer may have inserted the same name since the
            // lookup; its row is reused.
            diesel::insert_or_ignore_into(ingredients::table)
                .values(&missing)
                .execute(connection)?;
        }

        ingredients::table
            .filter(ingredients::name.eq_any(&names))
            .select(ingredients::id)
            .order(ingredients::id.asc())
            .load(connection)
    }

    /// Names of the ingredients linked to a recipe, in ingredient id order.
    pub fn names_for_recipe(
        connection: &mut SqliteConnection,
        recipe_id: i32,
    ) -> QueryResult<Vec<String>> {
        recipe_ingredient::table
            .inner_join(ingredients::table)
            .filter(recipe_ingredient::recipe_id.eq(recipe_id))
            .select(ingredients::name)
            .order(ingredients::id.asc())
            .load(connection)
    }
}
