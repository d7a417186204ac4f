// Copyright 2023 Remi Bernotavicius

use super::models::{
    Ingredient, MealIngredient, MealLink, MenuDay, NewIngredient, NewReceiptItem, NewRecipe,
    NewWeekMenuEntry, ReceiptItem, Recipe, RecipeHandle, RecipeId,
};
use super::{Connection, DatabaseError};
use diesel::prelude::Connection as _;
use diesel::prelude::OptionalExtension as _;
use diesel::result::DatabaseErrorKind;
use diesel::BelongingToDsl as _;
use diesel::BoolExpressionMethods as _;
use diesel::ExpressionMethods as _;
use diesel::QueryDsl as _;
use diesel::RunQueryDsl as _;
use diesel::SelectableHelper as _;
use diesel::TextExpressionMethods as _;

type Result<T> = std::result::Result<T, DatabaseError>;

pub fn insert_recipe(conn: &mut Connection, recipe: &NewRecipe) -> Result<RecipeId> {
    use super::schema::recipes::dsl::*;
    use diesel::insert_into;

    log::info!("inserting recipe {:?}", recipe.name);
    let new_id = insert_into(recipes)
        .values(recipe)
        .returning(id)
        .get_result(conn)
        .map_err(|error| match error {
            diesel::result::Error::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                DatabaseError::DuplicateRecipe {
                    name: recipe.name.clone(),
                }
            }
            error => error.into(),
        })?;
    log::info!("recipe {:?} inserted with id {new_id}", recipe.name);
    Ok(new_id)
}

pub fn get_recipe(conn: &mut Connection, recipe_id: RecipeId) -> Result<Recipe> {
    use super::schema::recipes::dsl::*;

    recipes
        .select(Recipe::as_select())
        .filter(id.eq(recipe_id))
        .get_result(conn)
        .optional()?
        .ok_or(DatabaseError::UnknownRecipe { id: recipe_id })
}

pub fn list_recipes(conn: &mut Connection) -> Result<Vec<Recipe>> {
    use super::schema::recipes::dsl::*;

    log::debug!("fetching all recipes");
    Ok(recipes
        .select(Recipe::as_select())
        .order_by(id.asc())
        .load(conn)?)
}

/// Recipes whose name, cuisine or any ingredient contains `term`, ignoring ASCII case.
pub fn search_recipes(conn: &mut Connection, term: &str) -> Result<Vec<Recipe>> {
    use super::schema::{ingredients, recipes};

    let term = term.trim();
    if term.is_empty() {
        return list_recipes(conn);
    }

    log::debug!("searching recipes for {term:?}");
    let pattern = format!("%{}%", term.to_lowercase());
    let with_ingredient = ingredients::table
        .filter(ingredients::name.like(pattern.clone()))
        .select(ingredients::recipe_id);

    Ok(recipes::table
        .select(Recipe::as_select())
        .filter(
            recipes::name
                .like(pattern.clone())
                .or(recipes::cuisine_origin.like(pattern))
                .or(recipes::id.eq_any(with_ingredient)),
        )
        .order_by(recipes::id.asc())
        .load(conn)?)
}

/// Every recipe, newest first, for picking one from a list.
pub fn recipe_choices(conn: &mut Connection) -> Result<Vec<RecipeHandle>> {
    use super::schema::recipes::dsl::*;

    Ok(recipes
        .select(RecipeHandle::as_select())
        .order_by(id.desc())
        .load(conn)?)
}

pub fn latest_recipe_id(conn: &mut Connection) -> Result<Option<RecipeId>> {
    use super::schema::recipes::dsl::*;

    Ok(recipes
        .select(id)
        .order_by(id.desc())
        .first(conn)
        .optional()?)
}

/// Inserts all the usable ingredients in one transaction, returning how many were stored.
/// Ingredients without an amount or a name are skipped.
pub fn insert_ingredients(conn: &mut Connection, new_ingredients: &[NewIngredient]) -> Result<usize> {
    use super::schema::ingredients::dsl::*;
    use diesel::insert_into;

    let usable: Vec<&NewIngredient> = new_ingredients
        .iter()
        .filter(|i| {
            let keep = i.amount != 0.0 && !i.name.trim().is_empty();
            if !keep {
                log::warn!(
                    "skipping ingredient with no amount or name for recipe {}",
                    i.recipe_id
                );
            }
            keep
        })
        .collect();

    conn.transaction(|conn| {
        for ingredient in &usable {
            insert_into(ingredients)
                .values(*ingredient)
                .execute(conn)
                .map_err(|error| match error {
                    diesel::result::Error::DatabaseError(
                        DatabaseErrorKind::ForeignKeyViolation,
                        _,
                    ) => DatabaseError::UnknownRecipe {
                        id: ingredient.recipe_id,
                    },
                    error => error.into(),
                })?;
        }
        log::info!("inserted {} ingredients", usable.len());
        Ok(usable.len())
    })
}

pub fn ingredients_for_recipe(conn: &mut Connection, recipe: &Recipe) -> Result<Vec<Ingredient>> {
    use super::schema::ingredients::dsl::*;

    Ok(Ingredient::belonging_to(recipe)
        .select(Ingredient::as_select())
        .order_by(id.asc())
        .load(conn)?)
}

/// One row per ingredient of each named meal, ordered by meal and then ingredient name.
pub fn ingredient_rows_for_meals(
    conn: &mut Connection,
    meal_names: &[String],
) -> Result<Vec<MealIngredient>> {
    use super::schema::{ingredients, recipes};

    if meal_names.is_empty() {
        return Ok(vec![]);
    }

    log::debug!("fetching ingredients for meals {meal_names:?}");
    Ok(ingredients::table
        .inner_join(recipes::table)
        .select((
            recipes::name,
            ingredients::name,
            ingredients::amount,
            ingredients::unit,
        ))
        .filter(recipes::name.eq_any(meal_names))
        .order_by((recipes::name.asc(), ingredients::name.asc()))
        .load(conn)?)
}

pub fn meals_with_urls(conn: &mut Connection, meal_names: &[String]) -> Result<Vec<MealLink>> {
    use super::schema::recipes::dsl::*;

    if meal_names.is_empty() {
        return Ok(vec![]);
    }

    Ok(recipes
        .select((name, url))
        .filter(name.eq_any(meal_names))
        .order_by(name.asc())
        .load(conn)?)
}

pub fn insert_receipt_items(conn: &mut Connection, items: &[NewReceiptItem]) -> Result<usize> {
    use super::schema::receipt_items::dsl::*;
    use diesel::insert_into;

    log::info!("inserting {} receipt items", items.len());
    conn.transaction(|conn| Ok(insert_into(receipt_items).values(items).execute(conn)?))
}

/// All saved receipt items, the most recent prices first.
pub fn list_receipt_items(conn: &mut Connection) -> Result<Vec<ReceiptItem>> {
    use super::schema::receipt_items::dsl::*;

    Ok(receipt_items
        .select(ReceiptItem::as_select())
        .order_by((price_date.desc(), id.asc()))
        .load(conn)?)
}

pub fn clear_week_menu(conn: &mut Connection) -> Result<usize> {
    use super::schema::week_menu::dsl::*;

    log::info!("clearing the week menu");
    Ok(diesel::delete(week_menu).execute(conn)?)
}

/// Replaces the stored week menu with `entries`.
pub fn save_week_menu(
    conn: &mut Connection,
    entries: &[(MenuDay, RecipeId)],
    now: chrono::NaiveDateTime,
) -> Result<usize> {
    use super::schema::week_menu::dsl::*;
    use diesel::insert_into;

    let rows: Vec<_> = entries
        .iter()
        .map(|&(menu_day, menu_recipe_id)| NewWeekMenuEntry {
            day: menu_day,
            recipe_id: menu_recipe_id,
            created_at: now,
        })
        .collect();

    conn.transaction(|conn| {
        clear_week_menu(conn)?;
        let saved = insert_into(week_menu)
            .values(&rows)
            .execute(conn)?;
        log::info!("saved {saved} week menu entries");
        Ok(saved)
    })
}

/// The stored week menu, one recipe per assigned day.
pub fn load_week_menu(conn: &mut Connection) -> Result<Vec<(MenuDay, RecipeHandle)>> {
    use super::schema::{recipes, week_menu};

    log::debug!("fetching the week menu");
    Ok(week_menu::table
        .inner_join(recipes::table)
        .select((week_menu::day, RecipeHandle::as_select()))
        .order_by((week_menu::created_at.asc(), week_menu::id.asc()))
        .load(conn)?)
}

/// Recipes that have at least one ingredient named like `ingredient_name`, used to tell the
/// user why a search matched.
pub fn recipes_using_ingredient(
    conn: &mut Connection,
    ingredient_name: &str,
) -> Result<Vec<RecipeHandle>> {
    use super::schema::{ingredients, recipes};

    let pattern = format!("%{}%", ingredient_name.trim());
    Ok(recipes::table
        .inner_join(ingredients::table)
        .select(RecipeHandle::as_select())
        .filter(ingredients::name.like(pattern))
        .distinct()
        .order_by(recipes::id.asc())
        .load(conn)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::HealthGrade;
    use crate::database::test_connection;

    fn recipe(conn: &mut Connection, name: &str, cuisine: &str) -> RecipeId {
        let mut new = NewRecipe::named(name);
        new.cuisine_origin = cuisine.into();
        new.health_grade = HealthGrade::new(2);
        insert_recipe(conn, &new).unwrap()
    }

    fn ingredient(recipe_id: RecipeId, amount: f64, unit: &str, name: &str) -> NewIngredient {
        NewIngredient {
            recipe_id,
            amount,
            unit: unit.into(),
            name: name.into(),
            price: 0.0,
            shop: String::new(),
            price_date: None,
        }
    }

    #[test]
    fn duplicate_recipe_rejected() {
        let mut conn = test_connection();
        recipe(&mut conn, "Vol-au-vent", "Belgian");
        let error = insert_recipe(&mut conn, &NewRecipe::named("Vol-au-vent")).unwrap_err();
        assert!(matches!(error, DatabaseError::DuplicateRecipe { .. }));
        assert_eq!(list_recipes(&mut conn).unwrap().len(), 1);
    }

    #[test]
    fn ingredient_for_unknown_recipe_rejected() {
        let mut conn = test_connection();
        let good = recipe(&mut conn, "Waterzooi", "Belgian");
        let error = insert_ingredients(
            &mut conn,
            &[
                ingredient(good, 1.0, "", "kip"),
                ingredient(RecipeId::from_raw(42), 2.0, "", "prei"),
            ],
        )
        .unwrap_err();
        assert!(matches!(error, DatabaseError::UnknownRecipe { .. }));

        // The whole batch is rolled back.
        let waterzooi = get_recipe(&mut conn, good).unwrap();
        assert!(ingredients_for_recipe(&mut conn, &waterzooi)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn ingredients_without_amount_or_name_skipped() {
        let mut conn = test_connection();
        let id = recipe(&mut conn, "Stoemp", "Belgian");
        let stored = insert_ingredients(
            &mut conn,
            &[
                ingredient(id, 1.0, "kg", "aardappelen"),
                ingredient(id, 0.0, "g", "boter"),
                ingredient(id, 2.0, "", " "),
            ],
        )
        .unwrap();
        assert_eq!(stored, 1);
    }

    #[test]
    fn search_matches_name_cuisine_and_ingredient() {
        let mut conn = test_connection();
        let curry = recipe(&mut conn, "Green Curry", "Thai");
        let stew = recipe(&mut conn, "Carbonnade", "Belgian");
        recipe(&mut conn, "Pasta Pesto", "Italian");
        insert_ingredients(&mut conn, &[ingredient(stew, 1.0, "kg", "Rundvlees")]).unwrap();
        insert_ingredients(&mut conn, &[ingredient(curry, 400.0, "ml", "kokosmelk")]).unwrap();

        let names = |found: Vec<Recipe>| found.into_iter().map(|r| r.name).collect::<Vec<_>>();
        assert_eq!(names(search_recipes(&mut conn, "curry").unwrap()), ["Green Curry"]);
        assert_eq!(names(search_recipes(&mut conn, "BELG").unwrap()), ["Carbonnade"]);
        assert_eq!(names(search_recipes(&mut conn, "rundvlees").unwrap()), ["Carbonnade"]);
        assert_eq!(search_recipes(&mut conn, "  ").unwrap().len(), 3);
        assert!(search_recipes(&mut conn, "sushi").unwrap().is_empty());
    }

    #[test]
    fn recipe_choices_newest_first() {
        let mut conn = test_connection();
        assert_eq!(latest_recipe_id(&mut conn).unwrap(), None);
        recipe(&mut conn, "A", "");
        let b = recipe(&mut conn, "B", "");
        let choices = recipe_choices(&mut conn).unwrap();
        assert_eq!(choices[0].name, "B");
        assert_eq!(latest_recipe_id(&mut conn).unwrap(), Some(b));
    }

    #[test]
    fn saving_week_menu_replaces_previous() {
        let mut conn = test_connection();
        let a = recipe(&mut conn, "A", "");
        let b = recipe(&mut conn, "B", "");
        let c = recipe(&mut conn, "C", "");
        let now = chrono::NaiveDate::from_ymd_opt(2024, 6, 3)
            .unwrap()
            .and_hms_opt(18, 0, 0)
            .unwrap();

        save_week_menu(
            &mut conn,
            &[(MenuDay::Monday, a), (MenuDay::Tuesday, b), (MenuDay::Friday, c)],
            now,
        )
        .unwrap();
        save_week_menu(
            &mut conn,
            &[(MenuDay::Wednesday, c), (MenuDay::Sunday, a)],
            now + chrono::Duration::minutes(5),
        )
        .unwrap();

        let menu: Vec<_> = load_week_menu(&mut conn)
            .unwrap()
            .into_iter()
            .map(|(day, r)| (day, r.name))
            .collect();
        assert_eq!(
            menu,
            [
                (MenuDay::Wednesday, "C".to_owned()),
                (MenuDay::Sunday, "A".to_owned())
            ]
        );

        assert_eq!(clear_week_menu(&mut conn).unwrap(), 2);
        assert!(load_week_menu(&mut conn).unwrap().is_empty());
    }

    #[test]
    fn meal_rows_and_links() {
        let mut conn = test_connection();
        let mut new = NewRecipe::named("Croque");
        new.url = "https://example.com/croque".into();
        let croque = insert_recipe(&mut conn, &new).unwrap();
        let soup = recipe(&mut conn, "Soup", "");
        insert_ingredients(
            &mut conn,
            &[
                ingredient(croque, 2.0, "sneden", "brood"),
                ingredient(croque, 1.0, "snede", "ham"),
                ingredient(soup, 1.0, "stuk", "prei"),
            ],
        )
        .unwrap();

        let meals = vec!["Croque".to_owned()];
        let rows = ingredient_rows_for_meals(&mut conn, &meals).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].name, "brood");
        assert_eq!(rows[1].name, "ham");

        let links = meals_with_urls(&mut conn, &meals).unwrap();
        assert_eq!(links[0].url, "https://example.com/croque");
        assert!(ingredient_rows_for_meals(&mut conn, &[]).unwrap().is_empty());

        let users = recipes_using_ingredient(&mut conn, "prei").unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].name, "Soup");
    }

    #[test]
    fn receipt_items_newest_first() {
        let mut conn = test_connection();
        let item = |name: &str, day: u32| NewReceiptItem {
            item_name: name.into(),
            price: 1.5,
            shop: "Lidl".into(),
            price_date: chrono::NaiveDate::from_ymd_opt(2024, 5, day).unwrap(),
            quantity: 1.0,
            unit: String::new(),
            receipt_image_path: String::new(),
        };
        insert_receipt_items(&mut conn, &[item("old", 1), item("new", 20)]).unwrap();
        let items = list_receipt_items(&mut conn).unwrap();
        assert_eq!(items[0].item_name, "new");
        assert_eq!(items[1].item_name, "old");
    }
}
