diesel::table! {
    ingredients (id) {
        id -> Integer,
        name -> Text,
    }
}

diesel::table! {
    recipe_ingredient (recipe_id, ingredient_id) {
        recipe_id -> Integer,
        ingredient_id -> Integer,
    }
}

diesel::table! {
    recipes (id) {
        id -> Integer,
        title -> Text,
        description -> Nullable<Text>,
        cooking_time -> Integer,
        views -> Integer,
    }
}

diesel::joinable!(recipe_ingredient -> ingredients (ingredient_id));
diesel::joinable!(recipe_ingredient -> recipes (recipe_id));

diesel::allow_tables_to_appear_in_same_query!(ingredients, recipe_ingredient, recipes,);
