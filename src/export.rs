// Copyright 2023 Remi Bernotavicius

use crate::database::models::{MealIngredient, MenuDay};
use crate::database::{self, query};
use crate::menu::{group_by_meal, WeekMenu};
use chrono::NaiveDateTime;
use derive_more::{Display, Error, From};
use std::collections::{BTreeMap, HashMap};
use std::io::Write as _;
use std::path::{Path, PathBuf};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const BLANK: [&str; 0] = [];

#[derive(Debug, Display, Error, From)]
pub enum ExportError {
    #[display("the week menu is empty, assign some recipes first")]
    EmptyMenu,
    #[display("{_0}")]
    #[from]
    Io(std::io::Error),
    #[display("{_0}")]
    #[from]
    Csv(csv::Error),
    #[display("{_0}")]
    #[from]
    Database(database::DatabaseError),
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ExportFormat {
    Text,
    Csv,
}

impl ExportFormat {
    /// `.csv` files get CSV, everything else plain text.
    pub fn for_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("csv") => Self::Csv,
            _ => Self::Text,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ExportedMeal {
    pub day: MenuDay,
    pub name: String,
    pub url: String,
}

/// Everything that goes into an exported week menu.
#[derive(Clone, Debug, PartialEq)]
pub struct MenuExport {
    pub meals: Vec<ExportedMeal>,
    pub ingredients: BTreeMap<String, Vec<MealIngredient>>,
    pub generated_at: NaiveDateTime,
}

impl MenuExport {
    pub fn gather(
        conn: &mut database::Connection,
        menu: &WeekMenu,
        generated_at: NaiveDateTime,
    ) -> Result<Self, ExportError> {
        if menu.is_empty() {
            return Err(ExportError::EmptyMenu);
        }

        let names = menu.meal_names();
        let urls: HashMap<String, String> = query::meals_with_urls(conn, &names)?
            .into_iter()
            .map(|link| (link.name, link.url))
            .collect();
        let meals = menu
            .entries()
            .map(|(day, recipe)| ExportedMeal {
                day,
                name: recipe.name.clone(),
                url: urls.get(&recipe.name).cloned().unwrap_or_default(),
            })
            .collect();
        let ingredients = group_by_meal(&query::ingredient_rows_for_meals(conn, &names)?);

        Ok(Self {
            meals,
            ingredients,
            generated_at,
        })
    }

    pub fn render_text(&self) -> String {
        let mut out = String::new();
        out += "CuisineCraft - Week Menu\n";
        out += &"=".repeat(30);
        out += "\n\nMEALS FOR THE WEEK:\n";
        out += &"-".repeat(20);
        out += "\n";

        for (i, meal) in self.meals.iter().enumerate() {
            out += &format!("{}. {}: {}", i + 1, meal.day, meal.name);
            if !meal.url.is_empty() {
                out += &format!(" ({})", meal.url);
            }
            out += "\n";
        }

        out += "\n\nSHOPPING LIST:\n";
        out += &"-".repeat(15);
        out += "\n";
        for (meal, ingredients) in &self.ingredients {
            out += &format!("\n--- Ingredients for {meal} ---\n");
            for i in ingredients {
                out += &format!("• {}, {}, {}\n", i.name, i.amount, i.unit);
            }
        }

        out += &format!(
            "\n\nGenerated on: {}\n",
            self.generated_at.format(TIMESTAMP_FORMAT)
        );
        out
    }

    pub fn write_csv(&self, output: impl std::io::Write, delimiter: u8) -> Result<(), ExportError> {
        let mut writer = csv::WriterBuilder::new()
            .flexible(true)
            .delimiter(delimiter)
            .from_writer(output);

        writer.write_record(["CuisineCraft Week Menu Export"])?;
        writer.write_record([format!(
            "Generated on: {}",
            self.generated_at.format(TIMESTAMP_FORMAT)
        )])?;
        writer.write_record(BLANK)?;

        writer.write_record(["Week Meals"])?;
        writer.write_record(["Day", "Meal", "URL"])?;
        for meal in &self.meals {
            writer.write_record([
                meal.day.to_string().as_str(),
                meal.name.as_str(),
                meal.url.as_str(),
            ])?;
        }
        writer.write_record(BLANK)?;

        writer.write_record(["Shopping List (Grouped by Meal)"])?;
        for (meal, ingredients) in &self.ingredients {
            writer.write_record(BLANK)?;
            writer.write_record([format!("Ingredients for {meal}")])?;
            writer.write_record(["Ingredient", "Amount", "Unit"])?;
            for i in ingredients {
                writer.write_record([
                    i.name.as_str(),
                    i.amount.to_string().as_str(),
                    i.unit.as_str(),
                ])?;
            }
        }
        writer.flush()?;
        Ok(())
    }

    pub fn write_to(
        &self,
        path: &Path,
        format: ExportFormat,
        delimiter: u8,
    ) -> Result<(), ExportError> {
        log::info!("exporting week menu to {} as {format:?}", path.display());
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut file = std::fs::File::create(path)?;
        match format {
            ExportFormat::Text => file.write_all(self.render_text().as_bytes())?,
            ExportFormat::Csv => self.write_csv(file, delimiter)?,
        }
        Ok(())
    }
}

/// Where an export goes when the user doesn't pick a file.
pub fn default_export_path(export_dir: &Path, now: NaiveDateTime) -> PathBuf {
    export_dir.join(format!("week_menu_{}.txt", now.format("%Y%m%d_%H%M%S")))
}

/// Writes `menu` to `path`, picking the format from the file extension.
pub fn export_menu(
    conn: &mut database::Connection,
    menu: &WeekMenu,
    path: &Path,
    delimiter: u8,
    now: NaiveDateTime,
) -> Result<(), ExportError> {
    MenuExport::gather(conn, menu, now)?.write_to(path, ExportFormat::for_path(path), delimiter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::{NewIngredient, NewRecipe, RecipeHandle};
    use crate::database::test_connection;
    use maplit::btreemap;

    fn generated_at() -> NaiveDateTime {
        chrono::NaiveDate::from_ymd_opt(2024, 6, 3)
            .unwrap()
            .and_hms_opt(9, 5, 0)
            .unwrap()
    }

    fn ingredient(meal: &str, name: &str, amount: f64, unit: &str) -> MealIngredient {
        MealIngredient {
            meal: meal.into(),
            name: name.into(),
            amount,
            unit: unit.into(),
        }
    }

    fn sample() -> MenuExport {
        MenuExport {
            meals: vec![
                ExportedMeal {
                    day: MenuDay::Monday,
                    name: "Soep".into(),
                    url: "https://15gram.be/soep".into(),
                },
                ExportedMeal {
                    day: MenuDay::Wednesday,
                    name: "Croque".into(),
                    url: String::new(),
                },
            ],
            ingredients: btreemap! {
                "Croque".into() => vec![ingredient("Croque", "brood", 2.0, "snede")],
                "Soep".into() => vec![
                    ingredient("Soep", "prei", 0.5, "stuk"),
                    ingredient("Soep", "water", 1.0, "l"),
                ],
            },
            generated_at: generated_at(),
        }
    }

    #[test]
    fn format_from_extension() {
        assert_eq!(ExportFormat::for_path(Path::new("a.csv")), ExportFormat::Csv);
        assert_eq!(ExportFormat::for_path(Path::new("a.CSV")), ExportFormat::Csv);
        assert_eq!(ExportFormat::for_path(Path::new("a.txt")), ExportFormat::Text);
        assert_eq!(ExportFormat::for_path(Path::new("menu")), ExportFormat::Text);
    }

    #[test]
    fn text_layout() {
        let expected = "\
CuisineCraft - Week Menu
==============================

MEALS FOR THE WEEK:
--------------------
1. Monday: Soep (https://15gram.be/soep)
2. Wednesday: Croque


SHOPPING LIST:
---------------

--- Ingredients for Croque ---
• brood, 2, snede

--- Ingredients for Soep ---
• prei, 0.5, stuk
• water, 1, l


Generated on: 2024-06-03 09:05:00
";
        assert_eq!(sample().render_text(), expected);
    }

    #[test]
    fn csv_layout() {
        let mut out = vec![];
        sample().write_csv(&mut out, b';').unwrap();
        let out = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = out.lines().collect();

        assert_eq!(lines[0], "CuisineCraft Week Menu Export");
        assert_eq!(lines[1], "Generated on: 2024-06-03 09:05:00");
        assert_eq!(lines[3], "Week Meals");
        assert_eq!(lines[4], "Day;Meal;URL");
        assert_eq!(lines[5], "Monday;Soep;https://15gram.be/soep");
        assert_eq!(lines[6], "Wednesday;Croque;");
        assert_eq!(lines[8], "Shopping List (Grouped by Meal)");
        assert_eq!(lines[10], "Ingredients for Croque");
        assert_eq!(lines[11], "Ingredient;Amount;Unit");
        assert_eq!(lines[12], "brood;2;snede");
        assert_eq!(lines[14], "Ingredients for Soep");
        assert_eq!(lines[16], "prei;0.5;stuk");
        assert_eq!(lines.len(), 18);
    }

    #[test]
    fn export_menu_to_file() {
        let mut conn = test_connection();
        let mut new = NewRecipe::named("Soep");
        new.url = "https://15gram.be/soep".into();
        let soup = query::insert_recipe(&mut conn, &new).unwrap();
        query::insert_ingredients(
            &mut conn,
            &[NewIngredient {
                recipe_id: soup,
                amount: 1.0,
                unit: "stuk".into(),
                name: "prei".into(),
                price: 0.0,
                shop: String::new(),
                price_date: None,
            }],
        )
        .unwrap();

        let mut menu = WeekMenu::new();
        menu.assign(
            MenuDay::Tuesday,
            RecipeHandle {
                id: soup,
                name: "Soep".into(),
            },
        );

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("menu.txt");
        export_menu(&mut conn, &menu, &path, b',', generated_at()).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("1. Tuesday: Soep (https://15gram.be/soep)"));
        assert!(text.contains("• prei, 1, stuk"));
    }

    #[test]
    fn empty_menu_not_exported() {
        let mut conn = test_connection();
        let dir = tempfile::tempdir().unwrap();
        let error = export_menu(
            &mut conn,
            &WeekMenu::new(),
            &dir.path().join("menu.csv"),
            b',',
            generated_at(),
        )
        .unwrap_err();
        assert!(matches!(error, ExportError::EmptyMenu));
    }

    #[test]
    fn default_path_is_timestamped() {
        assert_eq!(
            default_export_path(Path::new("/data/exports"), generated_at()),
            Path::new("/data/exports/week_menu_20240603_090500.txt")
        );
    }
}
