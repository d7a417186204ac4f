// Copyright 2023 Remi Bernotavicius

use crate::database::models::{MealIngredient, MenuDay, ReceiptItem, RecipeHandle, RecipeId};
use crate::database::{self, query, DatabaseError};
use crate::receipt::find_ingredient_price;
use derive_more::{Display, Error};
use rand::seq::IndexedRandom as _;
use std::collections::BTreeMap;

pub const DAYS_IN_WEEK: usize = 7;

#[derive(Debug, Display, Error)]
pub enum MenuError {
    #[display("not enough recipes to fill a week, need 7 but only {available} exist")]
    NotEnoughRecipes { available: usize },
}

/// One optional recipe per day, Monday through Sunday.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WeekMenu {
    days: [Option<RecipeHandle>; DAYS_IN_WEEK],
}

impl WeekMenu {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a menu from stored entries. A later entry for the same day wins.
    pub fn from_entries(entries: impl IntoIterator<Item = (MenuDay, RecipeHandle)>) -> Self {
        let mut menu = Self::new();
        for (day, recipe) in entries {
            menu.assign(day, recipe);
        }
        menu
    }

    pub fn load(conn: &mut database::Connection) -> Result<Self, DatabaseError> {
        Ok(Self::from_entries(query::load_week_menu(conn)?))
    }

    pub fn save(
        &self,
        conn: &mut database::Connection,
        now: chrono::NaiveDateTime,
    ) -> Result<usize, DatabaseError> {
        query::save_week_menu(conn, &self.to_entries(), now)
    }

    pub fn assign(&mut self, day: MenuDay, recipe: RecipeHandle) {
        self.days[day.index()] = Some(recipe);
    }

    pub fn clear_day(&mut self, day: MenuDay) {
        self.days[day.index()] = None;
    }

    pub fn clear(&mut self) {
        *self = Self::new();
    }

    pub fn get(&self, day: MenuDay) -> Option<&RecipeHandle> {
        self.days[day.index()].as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.days.iter().all(Option::is_none)
    }

    /// Assigned days in week order.
    pub fn entries(&self) -> impl Iterator<Item = (MenuDay, &RecipeHandle)> + '_ {
        MenuDay::iter().filter_map(|day| self.get(day).map(|r| (day, r)))
    }

    pub fn meal_names(&self) -> Vec<String> {
        self.entries().map(|(_, r)| r.name.clone()).collect()
    }

    pub fn to_entries(&self) -> Vec<(MenuDay, RecipeId)> {
        self.entries().map(|(day, r)| (day, r.id)).collect()
    }
}

/// Picks seven different recipes at random and assigns them Monday through Sunday.
pub fn generate_random<R: rand::Rng + ?Sized>(
    recipes: &[RecipeHandle],
    rng: &mut R,
) -> Result<WeekMenu, MenuError> {
    if recipes.len() < DAYS_IN_WEEK {
        return Err(MenuError::NotEnoughRecipes {
            available: recipes.len(),
        });
    }

    let picked = recipes.choose_multiple(rng, DAYS_IN_WEEK);
    let menu = WeekMenu::from_entries(MenuDay::iter().zip(picked.cloned()));
    log::info!("generated random week menu {:?}", menu.meal_names());
    Ok(menu)
}

#[derive(Clone, Debug, PartialEq)]
pub struct AggregatedIngredient {
    pub name: String,
    pub unit: String,
    pub amount: f64,
}

/// Sums amounts of identically named ingredients that share a unit.
pub fn aggregate_ingredients(rows: &[MealIngredient]) -> Vec<AggregatedIngredient> {
    let mut totals: BTreeMap<(&str, &str), f64> = BTreeMap::new();
    for row in rows {
        *totals
            .entry((row.name.as_str(), row.unit.as_str()))
            .or_default() += row.amount;
    }
    totals
        .into_iter()
        .map(|((name, unit), amount)| AggregatedIngredient {
            name: name.into(),
            unit: unit.into(),
            amount,
        })
        .collect()
}

pub fn group_by_meal(rows: &[MealIngredient]) -> BTreeMap<String, Vec<MealIngredient>> {
    let mut grouped: BTreeMap<String, Vec<MealIngredient>> = BTreeMap::new();
    for row in rows {
        grouped.entry(row.meal.clone()).or_default().push(row.clone());
    }
    for ingredients in grouped.values_mut() {
        ingredients.sort_by(|a, b| a.name.cmp(&b.name));
    }
    grouped
}

#[derive(Clone, Debug, PartialEq)]
pub struct ShoppingListItem {
    pub ingredient: AggregatedIngredient,
    pub price: Option<f64>,
    pub shop: Option<String>,
}

pub fn price_shopping_list(
    aggregated: Vec<AggregatedIngredient>,
    receipt_items: &[ReceiptItem],
) -> Vec<ShoppingListItem> {
    aggregated
        .into_iter()
        .map(|ingredient| {
            let found = find_ingredient_price(&ingredient.name, receipt_items);
            ShoppingListItem {
                price: found.map(|item| item.price),
                shop: found.map(|item| item.shop.clone()),
                ingredient,
            }
        })
        .collect()
}

/// Sum of the known prices.
pub fn estimated_total(items: &[ShoppingListItem]) -> f64 {
    items.iter().filter_map(|i| i.price).sum()
}

/// The priced, aggregated shopping list for everything on `menu`.
pub fn shopping_list(
    conn: &mut database::Connection,
    menu: &WeekMenu,
) -> Result<Vec<ShoppingListItem>, DatabaseError> {
    let rows = query::ingredient_rows_for_meals(conn, &menu.meal_names())?;
    let receipt_items = query::list_receipt_items(conn)?;
    Ok(price_shopping_list(
        aggregate_ingredients(&rows),
        &receipt_items,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::NewRecipe;
    use crate::database::test_connection;
    use crate::receipt::receipt_item;
    use maplit::btreemap;
    use rand::SeedableRng as _;

    fn handle(id: i32, name: &str) -> RecipeHandle {
        RecipeHandle {
            id: RecipeId::from_raw(id),
            name: name.into(),
        }
    }

    fn row(meal: &str, name: &str, amount: f64, unit: &str) -> MealIngredient {
        MealIngredient {
            meal: meal.into(),
            name: name.into(),
            amount,
            unit: unit.into(),
        }
    }

    #[test]
    fn random_needs_a_week_of_recipes() {
        let recipes: Vec<_> = (1..=6).map(|i| handle(i, &format!("r{i}"))).collect();
        let mut rng = rand::rngs::StdRng::seed_from_u64(7);
        let error = generate_random(&recipes, &mut rng).unwrap_err();
        assert!(matches!(error, MenuError::NotEnoughRecipes { available: 6 }));
    }

    #[test]
    fn random_picks_distinct_recipes() {
        let recipes: Vec<_> = (1..=12).map(|i| handle(i, &format!("r{i}"))).collect();
        let mut rng = rand::rngs::StdRng::seed_from_u64(7);
        let menu = generate_random(&recipes, &mut rng).unwrap();

        let mut ids: Vec<_> = menu.entries().map(|(_, r)| r.id).collect();
        assert_eq!(ids.len(), DAYS_IN_WEEK);
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), DAYS_IN_WEEK);
    }

    #[test]
    fn week_menu_slots() {
        let mut menu = WeekMenu::new();
        assert!(menu.is_empty());
        menu.assign(MenuDay::Friday, handle(2, "Frieten"));
        menu.assign(MenuDay::Monday, handle(1, "Soep"));
        menu.assign(MenuDay::Monday, handle(3, "Pasta"));
        assert_eq!(menu.meal_names(), ["Pasta", "Frieten"]);

        menu.clear_day(MenuDay::Friday);
        assert_eq!(menu.get(MenuDay::Friday), None);
        assert_eq!(
            menu.to_entries(),
            [(MenuDay::Monday, RecipeId::from_raw(3))]
        );

        menu.clear();
        assert!(menu.is_empty());
    }

    #[test]
    fn aggregate_by_name_and_unit() {
        let rows = [
            row("Soep", "ui", 2.0, "stuk"),
            row("Soep", "wortel", 300.0, "g"),
            row("Stoofvlees", "ui", 1.0, "stuk"),
            row("Stoofvlees", "wortel", 1.0, "stuk"),
            row("Stoofvlees", "bier", 33.0, "cl"),
        ];
        let totals: Vec<_> = aggregate_ingredients(&rows)
            .into_iter()
            .map(|a| (a.name, a.unit, a.amount))
            .collect();
        assert_eq!(
            totals,
            [
                ("bier".into(), "cl".into(), 33.0),
                ("ui".into(), "stuk".into(), 3.0),
                ("wortel".into(), "g".into(), 300.0),
                ("wortel".into(), "stuk".into(), 1.0),
            ]
        );
    }

    #[test]
    fn group_rows_by_meal() {
        let rows = [
            row("Soep", "wortel", 1.0, ""),
            row("Pasta", "tomaat", 2.0, ""),
            row("Soep", "prei", 1.0, ""),
        ];
        assert_eq!(
            group_by_meal(&rows),
            btreemap! {
                "Pasta".to_owned() => vec![row("Pasta", "tomaat", 2.0, "")],
                "Soep".to_owned() => vec![
                    row("Soep", "prei", 1.0, ""),
                    row("Soep", "wortel", 1.0, ""),
                ],
            }
        );
    }

    #[test]
    fn prices_from_receipts() {
        let aggregated = vec![
            AggregatedIngredient {
                name: "melk".into(),
                unit: "l".into(),
                amount: 1.0,
            },
            AggregatedIngredient {
                name: "saffraan".into(),
                unit: "g".into(),
                amount: 1.0,
            },
        ];
        let items = [receipt_item("Halfvolle MELK", 0.99, "Aldi", 3)];
        let priced = price_shopping_list(aggregated, &items);
        assert_eq!(priced[0].price, Some(0.99));
        assert_eq!(priced[0].shop.as_deref(), Some("Aldi"));
        assert_eq!(priced[1].price, None);
        assert_eq!(estimated_total(&priced), 0.99);
    }

    #[test]
    fn shopping_list_counts_repeated_meal_once() {
        let mut conn = test_connection();
        let soup = query::insert_recipe(&mut conn, &NewRecipe::named("Soep")).unwrap();
        query::insert_ingredients(
            &mut conn,
            &[crate::database::models::NewIngredient {
                recipe_id: soup,
                amount: 2.0,
                unit: "stuk".into(),
                name: "prei".into(),
                price: 0.0,
                shop: String::new(),
                price_date: None,
            }],
        )
        .unwrap();

        let mut menu = WeekMenu::new();
        let handle = RecipeHandle {
            id: soup,
            name: "Soep".into(),
        };
        menu.assign(MenuDay::Monday, handle.clone());
        menu.assign(MenuDay::Thursday, handle);

        let list = shopping_list(&mut conn, &menu).unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].ingredient.amount, 2.0);

        menu.save(&mut conn, chrono::Local::now().naive_local()).unwrap();
        assert_eq!(WeekMenu::load(&mut conn).unwrap(), menu);
    }
}
