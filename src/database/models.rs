// Copyright 2023 Remi Bernotavicius

use derive_more::Display;
use diesel::associations::{Associations, Identifiable};
use diesel::deserialize::Queryable;
use diesel::expression::Selectable;
use diesel::prelude::Insertable;
use diesel_derive_enum::DbEnum;
use diesel_derive_newtype::DieselNewType;
use strum::EnumIter;

#[derive(DieselNewType, Debug, Display, Hash, PartialEq, Eq, PartialOrd, Ord, Copy, Clone)]
pub struct RecipeId(i32);

impl RecipeId {
    pub fn from_raw(raw: i32) -> Self {
        Self(raw)
    }
}

#[derive(DieselNewType, Debug, Display, Hash, PartialEq, Eq, Copy, Clone)]
pub struct IngredientId(i32);

#[derive(DieselNewType, Debug, Display, Hash, PartialEq, Eq, Copy, Clone)]
pub struct ReceiptItemId(i32);

impl ReceiptItemId {
    #[cfg(test)]
    pub fn from_raw(raw: i32) -> Self {
        Self(raw)
    }
}

/// How healthy a recipe is, from 1 (healthy) to 3 (indulgent).
#[derive(DieselNewType, Debug, Display, Hash, PartialEq, Eq, PartialOrd, Ord, Copy, Clone)]
pub struct HealthGrade(i32);

impl HealthGrade {
    pub const MIN: i32 = 1;
    pub const MAX: i32 = 3;

    pub fn new(grade: i32) -> Option<Self> {
        (Self::MIN..=Self::MAX)
            .contains(&grade)
            .then_some(Self(grade))
    }
}

#[derive(Queryable, Selectable, Identifiable, Debug, Clone, PartialEq)]
#[diesel(table_name = crate::database::schema::recipes)]
pub struct Recipe {
    pub id: RecipeId,
    pub name: String,
    pub persons: i32,
    /// Minutes.
    pub cooking_time: i32,
    pub cuisine_origin: String,
    pub file_location: String,
    pub url: String,
    pub health_grade: Option<HealthGrade>,
}

#[derive(Insertable, Debug, Clone, PartialEq)]
#[diesel(table_name = crate::database::schema::recipes)]
pub struct NewRecipe {
    pub name: String,
    pub persons: i32,
    pub cooking_time: i32,
    pub cuisine_origin: String,
    pub file_location: String,
    pub url: String,
    pub health_grade: Option<HealthGrade>,
}

#[cfg(test)]
impl NewRecipe {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            persons: 0,
            cooking_time: 0,
            cuisine_origin: String::new(),
            file_location: String::new(),
            url: String::new(),
            health_grade: None,
        }
    }
}

#[derive(Queryable, Selectable, Debug, Clone, PartialEq, Eq)]
#[diesel(table_name = crate::database::schema::recipes)]
pub struct RecipeHandle {
    pub id: RecipeId,
    pub name: String,
}

impl Recipe {
    pub fn to_handle(&self) -> RecipeHandle {
        RecipeHandle {
            id: self.id,
            name: self.name.clone(),
        }
    }
}

#[derive(Associations, Queryable, Selectable, Identifiable, Debug, Clone, PartialEq)]
#[diesel(belongs_to(Recipe))]
#[diesel(table_name = crate::database::schema::ingredients)]
pub struct Ingredient {
    pub id: IngredientId,
    pub recipe_id: RecipeId,
    pub amount: f64,
    pub unit: String,
    pub name: String,
    pub price: f64,
    pub shop: String,
    pub price_date: Option<chrono::NaiveDate>,
}

#[derive(Insertable, Debug, Clone, PartialEq)]
#[diesel(table_name = crate::database::schema::ingredients)]
pub struct NewIngredient {
    pub recipe_id: RecipeId,
    pub amount: f64,
    pub unit: String,
    pub name: String,
    pub price: f64,
    pub shop: String,
    pub price_date: Option<chrono::NaiveDate>,
}

/// An ingredient row tagged with the name of the meal it belongs to.
#[derive(Queryable, Debug, Clone, PartialEq)]
pub struct MealIngredient {
    pub meal: String,
    pub name: String,
    pub amount: f64,
    pub unit: String,
}

#[derive(Queryable, Debug, Clone, PartialEq, Eq)]
pub struct MealLink {
    pub name: String,
    pub url: String,
}

#[derive(Queryable, Selectable, Identifiable, Debug, Clone, PartialEq)]
#[diesel(table_name = crate::database::schema::receipt_items)]
pub struct ReceiptItem {
    pub id: ReceiptItemId,
    pub item_name: String,
    pub price: f64,
    pub shop: String,
    pub price_date: chrono::NaiveDate,
    pub quantity: f64,
    pub unit: String,
    pub receipt_image_path: String,
}

#[derive(Insertable, Debug, Clone, PartialEq)]
#[diesel(table_name = crate::database::schema::receipt_items)]
pub struct NewReceiptItem {
    pub item_name: String,
    pub price: f64,
    pub shop: String,
    pub price_date: chrono::NaiveDate,
    pub quantity: f64,
    pub unit: String,
    pub receipt_image_path: String,
}

#[derive(
    Debug, Display, EnumIter, Hash, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, DbEnum,
)]
pub enum MenuDay {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl MenuDay {
    pub fn iter() -> impl Iterator<Item = Self> {
        <Self as strum::IntoEnumIterator>::iter()
    }

    pub fn index(&self) -> usize {
        *self as usize
    }
}

impl From<chrono::Weekday> for MenuDay {
    fn from(day: chrono::Weekday) -> Self {
        use chrono::Weekday::*;

        match day {
            Mon => Self::Monday,
            Tue => Self::Tuesday,
            Wed => Self::Wednesday,
            Thu => Self::Thursday,
            Fri => Self::Friday,
            Sat => Self::Saturday,
            Sun => Self::Sunday,
        }
    }
}

#[derive(Insertable, Debug, Clone, PartialEq)]
#[diesel(table_name = crate::database::schema::week_menu)]
pub struct NewWeekMenuEntry {
    pub day: MenuDay,
    pub recipe_id: RecipeId,
    pub created_at: chrono::NaiveDateTime,
}

#[test]
fn health_grade_range() {
    assert_eq!(HealthGrade::new(0), None);
    assert_eq!(HealthGrade::new(1).map(|g| g.to_string()), Some("1".into()));
    assert_eq!(HealthGrade::new(3).map(|g| g.to_string()), Some("3".into()));
    assert_eq!(HealthGrade::new(4), None);
}

#[test]
fn menu_day_order() {
    let days: Vec<String> = MenuDay::iter().map(|d| d.to_string()).collect();
    assert_eq!(
        days,
        ["Monday", "Tuesday", "Wednesday", "Thursday", "Friday", "Saturday", "Sunday"]
    );
    assert_eq!(MenuDay::Wednesday.index(), 2);
    assert_eq!(MenuDay::from(chrono::Weekday::Sun), MenuDay::Sunday);
}
