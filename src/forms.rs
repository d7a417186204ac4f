// Copyright 2023 Remi Bernotavicius

use crate::cooking_time::parse_cooking_time;
use crate::database::models::{HealthGrade, NewIngredient, NewRecipe, RecipeHandle};
use chrono::NaiveDate;
use derive_more::{Display, Error};

#[derive(Debug, Display, Error, PartialEq, Eq)]
pub enum FormError {
    #[display("a recipe needs a name")]
    MissingName,
    #[display("persons must be a whole number, got {value:?}")]
    InvalidPersons { value: String },
    #[display("health grade must be 1, 2 or 3, got {value:?}")]
    InvalidHealthGrade { value: String },
    #[display("choose a recipe to add ingredients to")]
    MissingRecipe,
    #[display("ingredient {row}: amount {value:?} is not a number")]
    InvalidAmount { row: usize, value: String },
    #[display("ingredient {row}: price {value:?} is not a number")]
    InvalidPrice { row: usize, value: String },
    #[display("ingredient {row}: date {value:?} is not YYYY-MM-DD")]
    InvalidDate { row: usize, value: String },
    #[display("fill in at least one ingredient with an amount and a name")]
    NoIngredients,
}

/// Raw text of the recipe form.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RecipeForm {
    pub name: String,
    pub persons: String,
    pub cooking_time: String,
    pub cuisine_origin: String,
    pub file_location: String,
    pub url: String,
    pub health_grade: String,
}

impl RecipeForm {
    pub fn to_new_recipe(&self) -> Result<NewRecipe, FormError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(FormError::MissingName);
        }

        let persons = match self.persons.trim() {
            "" => 0,
            value => value
                .parse::<u32>()
                .ok()
                .and_then(|p| i32::try_from(p).ok())
                .ok_or_else(|| FormError::InvalidPersons {
                    value: value.into(),
                })?,
        };

        let health_grade = match self.health_grade.trim() {
            "" => None,
            value => Some(
                value
                    .parse()
                    .ok()
                    .and_then(HealthGrade::new)
                    .ok_or_else(|| FormError::InvalidHealthGrade {
                        value: value.into(),
                    })?,
            ),
        };

        Ok(NewRecipe {
            name: name.into(),
            persons,
            cooking_time: parse_cooking_time(&self.cooking_time),
            cuisine_origin: self.cuisine_origin.trim().into(),
            file_location: self.file_location.trim().into(),
            url: self.url.trim().into(),
            health_grade,
        })
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IngredientRow {
    pub amount: String,
    pub unit: String,
    pub name: String,
    pub price: String,
    pub shop: String,
    pub price_date: String,
}

impl IngredientRow {
    fn is_blank(&self) -> bool {
        self.amount.trim().is_empty() || self.name.trim().is_empty()
    }

    /// `row` is 1-based and only used in error messages.
    fn parse(&self, row: usize) -> Result<ParsedRow, FormError> {
        let amount = self.amount.trim();
        let amount = parse_number(amount).ok_or_else(|| FormError::InvalidAmount {
            row,
            value: amount.into(),
        })?;

        let price = match self.price.trim() {
            "" => 0.0,
            value => parse_number(value).ok_or_else(|| FormError::InvalidPrice {
                row,
                value: value.into(),
            })?,
        };

        let price_date = match self.price_date.trim() {
            "" => None,
            value => Some(NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| {
                FormError::InvalidDate {
                    row,
                    value: value.into(),
                }
            })?),
        };

        Ok(ParsedRow {
            amount,
            price,
            price_date,
        })
    }
}

/// Only finite numbers, `str::parse` alone also takes "NaN" and "inf".
fn parse_number(value: &str) -> Option<f64> {
    value.parse::<f64>().ok().filter(|v| v.is_finite())
}

struct ParsedRow {
    amount: f64,
    price: f64,
    price_date: Option<NaiveDate>,
}

pub const DEFAULT_INGREDIENT_ROWS: usize = 5;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IngredientForm {
    pub recipe: Option<RecipeHandle>,
    pub rows: Vec<IngredientRow>,
}

impl Default for IngredientForm {
    fn default() -> Self {
        Self {
            recipe: None,
            rows: vec![IngredientRow::default(); DEFAULT_INGREDIENT_ROWS],
        }
    }
}

impl IngredientForm {
    /// Rows missing an amount or a name are left out.
    pub fn to_new_ingredients(&self) -> Result<Vec<NewIngredient>, FormError> {
        let recipe = self.recipe.as_ref().ok_or(FormError::MissingRecipe)?;

        let mut ingredients = vec![];
        for (i, row) in self.rows.iter().enumerate() {
            if row.is_blank() {
                continue;
            }
            let parsed = row.parse(i + 1)?;
            ingredients.push(NewIngredient {
                recipe_id: recipe.id,
                amount: parsed.amount,
                unit: row.unit.trim().into(),
                name: row.name.trim().into(),
                price: parsed.price,
                shop: row.shop.trim().into(),
                price_date: parsed.price_date,
            });
        }

        if ingredients.is_empty() {
            return Err(FormError::NoIngredients);
        }
        Ok(ingredients)
    }

    pub fn clear_rows(&mut self) {
        self.rows = vec![IngredientRow::default(); DEFAULT_INGREDIENT_ROWS];
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::RecipeId;

    #[test]
    fn recipe_form_parses_fields() {
        let form = RecipeForm {
            name: " Stoofvlees ".into(),
            persons: "4".into(),
            cooking_time: "2 hours 30 min".into(),
            cuisine_origin: "Belgian".into(),
            health_grade: "3".into(),
            ..Default::default()
        };
        let recipe = form.to_new_recipe().unwrap();
        assert_eq!(recipe.name, "Stoofvlees");
        assert_eq!(recipe.persons, 4);
        assert_eq!(recipe.cooking_time, 150);
        assert_eq!(recipe.health_grade, HealthGrade::new(3));
    }

    #[test]
    fn recipe_form_defaults() {
        let form = RecipeForm {
            name: "Toast".into(),
            ..Default::default()
        };
        let recipe = form.to_new_recipe().unwrap();
        assert_eq!(recipe.persons, 0);
        assert_eq!(recipe.cooking_time, 0);
        assert_eq!(recipe.health_grade, None);
    }

    #[test]
    fn recipe_form_errors() {
        assert_eq!(
            RecipeForm::default().to_new_recipe(),
            Err(FormError::MissingName)
        );

        let form = |persons: &str, grade: &str| RecipeForm {
            name: "x".into(),
            persons: persons.into(),
            health_grade: grade.into(),
            ..Default::default()
        };
        assert!(matches!(
            form("-1", "").to_new_recipe(),
            Err(FormError::InvalidPersons { .. })
        ));
        assert!(matches!(
            form("2", "4").to_new_recipe(),
            Err(FormError::InvalidHealthGrade { .. })
        ));
        assert!(matches!(
            form("2", "good").to_new_recipe(),
            Err(FormError::InvalidHealthGrade { .. })
        ));
    }

    fn ingredient_row(amount: &str, name: &str, price: &str, date: &str) -> IngredientRow {
        IngredientRow {
            amount: amount.into(),
            unit: "g".into(),
            name: name.into(),
            price: price.into(),
            shop: String::new(),
            price_date: date.into(),
        }
    }

    fn form_with(rows: Vec<IngredientRow>) -> IngredientForm {
        IngredientForm {
            recipe: Some(RecipeHandle {
                id: RecipeId::from_raw(1),
                name: "Soep".into(),
            }),
            rows,
        }
    }

    #[test]
    fn ingredient_form_skips_incomplete_rows() {
        let form = form_with(vec![
            ingredient_row("200", "wortel", "", ""),
            ingredient_row("", "ui", "", ""),
            ingredient_row("1", " ", "", ""),
            ingredient_row("1.5", "prei", "0.89", "2024-05-12"),
        ]);
        let ingredients = form.to_new_ingredients().unwrap();
        assert_eq!(ingredients.len(), 2);
        assert_eq!(ingredients[0].price, 0.0);
        assert_eq!(ingredients[0].price_date, None);
        assert_eq!(ingredients[1].amount, 1.5);
        assert_eq!(ingredients[1].price, 0.89);
        assert_eq!(
            ingredients[1].price_date,
            NaiveDate::from_ymd_opt(2024, 5, 12)
        );
    }

    #[test]
    fn ingredient_form_errors() {
        let mut form = form_with(vec![ingredient_row("1", "ui", "", "")]);
        form.recipe = None;
        assert_eq!(form.to_new_ingredients(), Err(FormError::MissingRecipe));

        let bad = |row| form_with(vec![ingredient_row("1", "ui", "", ""), row]);
        assert_eq!(
            bad(ingredient_row("veel", "zout", "", "")).to_new_ingredients(),
            Err(FormError::InvalidAmount {
                row: 2,
                value: "veel".into()
            })
        );
        assert!(matches!(
            bad(ingredient_row("1", "zout", "duur", "")).to_new_ingredients(),
            Err(FormError::InvalidPrice { row: 2, .. })
        ));
        for value in ["NaN", "inf", "-infinity"] {
            assert_eq!(
                bad(ingredient_row(value, "zout", "", "")).to_new_ingredients(),
                Err(FormError::InvalidAmount {
                    row: 2,
                    value: value.into()
                })
            );
            assert_eq!(
                bad(ingredient_row("1", "zout", value, "")).to_new_ingredients(),
                Err(FormError::InvalidPrice {
                    row: 2,
                    value: value.into()
                })
            );
        }
        assert!(matches!(
            bad(ingredient_row("1", "zout", "", "12/05/2024")).to_new_ingredients(),
            Err(FormError::InvalidDate { row: 2, .. })
        ));

        assert_eq!(
            IngredientForm {
                recipe: form_with(vec![]).recipe,
                ..Default::default()
            }
            .to_new_ingredients(),
            Err(FormError::NoIngredients)
        );
    }
}
