use serde::Deserialize;

use crate::database::models::recipe::RecipeDraft;
use crate::error::{RecipeError, Result};

/// Body of `POST /recipes/`.
#[derive(Deserialize, Debug, Clone)]
pub struct CreateRecipeRequest {
    pub title: String,
    pub cooking_time: i32,
    #[serde(default)]
    pub description: Option<String>,
    pub list_of_ingredients: Vec<String>,
    /// Accepted for compatibility, new recipes always start at zero.
    #[serde(default)]
    pub views: i32,
}

impl CreateRecipeRequest {
    pub fn validate(self) -> Result<RecipeDraft> {
        if self.title.trim().is_empty() {
            return Err(RecipeError::validation("title must not be empty"));
        }

        if self.cooking_time < 1 {
            return Err(RecipeError::validation(
                "cooking_time must be greater than or equal to 1",
            ));
        }

        if self.views != 0 {
            return Err(RecipeError::validation("views must be 0 for a new recipe"));
        }

        if self.list_of_ingredients.iter().any(|name| name.trim().is_empty()) {
            return Err(RecipeError::validation("ingredient names must not be empty"));
        }

        Ok(RecipeDraft::new(
            self.title,
            self.description,
            self.cooking_time,
            self.list_of_ingredients,
        ))
    }
}

pub fn validate_recipe_id(recipe_id: i32) -> Result<i32> {
    if recipe_id < 1 {
        return Err(RecipeError::validation(
            "recipe id must be greater than or equal to 1",
        ));
    }

    Ok(recipe_id)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn request(body: serde_json::Value) -> CreateRecipeRequest {
        serde_json::from_value(body).unwrap()
    }

    fn valid_body() -> serde_json::Value {
        json!({
            "title": "Pancakes",
            "cooking_time": 10,
            "description": "Fluffy",
            "list_of_ingredients": ["Flour", "Milk"],
        })
    }

    #[test]
    fn valid_request_becomes_draft() {
        let draft = request(valid_body()).validate().unwrap();

        assert_eq!(draft.title, "Pancakes");
        assert_eq!(draft.cooking_time, 10);
        assert_eq!(draft.description.as_deref(), Some("Fluffy"));
        assert_eq!(draft.ingredients, vec!["Flour", "Milk"]);
    }

    #[test]
    fn description_is_optional() {
        let mut body = valid_body();
        body.as_object_mut().unwrap().remove("description");

        let draft = request(body).validate().unwrap();

        assert_eq!(draft.description, None);
    }

    #[test]
    fn rejects_short_cooking_time() {
        let mut body = valid_body();
        body["cooking_time"] = json!(0);

        let err = request(body).validate().unwrap_err();

        assert!(matches!(err, RecipeError::Validation(_)));
    }

    #[test]
    fn rejects_blank_title() {
        let mut body = valid_body();
        body["title"] = json!("   ");

        assert!(request(body).validate().is_err());
    }

    #[test]
    fn rejects_preset_views() {
        let mut body = valid_body();
        body["views"] = json!(3);

        assert!(request(body).validate().is_err());
    }

    #[test]
    fn explicit_zero_views_is_fine() {
        let mut body = valid_body();
        body["views"] = json!(0);

        assert!(request(body).validate().is_ok());
    }

    #[test]
    fn rejects_blank_ingredient() {
        let mut body = valid_body();
        body["list_of_ingredients"] = json!(["Flour", ""]);

        assert!(request(body).validate().is_err());
    }

    #[test]
    fn missing_ingredient_list_does_not_parse() {
        let mut body = valid_body();
        body.as_object_mut().unwrap().remove("list_of_ingredients");

        assert!(serde_json::from_value::<CreateRecipeRequest>(body).is_err());
    }

    #[test]
    fn recipe_ids_start_at_one() {
        assert!(validate_recipe_id(0).is_err());
        assert!(validate_recipe_id(-4).is_err());
        assert_eq!(validate_recipe_id(1).unwrap(), 1);
    }
}
