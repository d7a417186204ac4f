use super::{report_error, run_action};
use crate::database::models::{Ingredient, Recipe, RecipeId};
use crate::database::{query, Database};
use eframe::egui;

pub struct RecipeWindow {
    recipe: Recipe,
    ingredients: Vec<Ingredient>,
}

impl RecipeWindow {
    pub fn new(
        database: &Database,
        toasts: &mut egui_toast::Toasts,
        recipe_id: RecipeId,
    ) -> Option<Self> {
        run_action(database, toasts, "Opening recipe", |conn| {
            let recipe = query::get_recipe(conn, recipe_id)?;
            let ingredients = query::ingredients_for_recipe(conn, &recipe)?;
            Ok(Self {
                recipe,
                ingredients,
            })
        })
    }

    pub fn refresh(&mut self, database: &Database, toasts: &mut egui_toast::Toasts) {
        if let Some(fresh) = Self::new(database, toasts, self.recipe.id) {
            *self = fresh;
        }
    }

    fn update_details(&self, ui: &mut egui::Ui, toasts: &mut egui_toast::Toasts) {
        let recipe = &self.recipe;
        egui::Grid::new(("recipe details", recipe.id)).show(ui, |ui| {
            ui.label("Persons");
            ui.label(recipe.persons.to_string());
            ui.end_row();

            ui.label("Cooking time");
            ui.label(format!("{} minutes", recipe.cooking_time));
            ui.end_row();

            ui.label("Cuisine");
            ui.label(&recipe.cuisine_origin);
            ui.end_row();

            ui.label("Health grade");
            ui.label(
                recipe
                    .health_grade
                    .map(|g| g.to_string())
                    .unwrap_or_else(|| "not graded".into()),
            );
            ui.end_row();

            if !recipe.url.is_empty() {
                ui.label("URL");
                ui.hyperlink(&recipe.url);
                ui.end_row();
            }

            if !recipe.file_location.is_empty() {
                ui.label("File");
                if ui.link(&recipe.file_location).clicked() {
                    if let Err(error) = open::that(&recipe.file_location) {
                        report_error(toasts, "Opening recipe file", error);
                    }
                }
                ui.end_row();
            }
        });
    }

    fn update_ingredients(&self, ui: &mut egui::Ui) {
        if self.ingredients.is_empty() {
            ui.label("No ingredients yet");
            return;
        }

        egui::Grid::new(("ingredient grid", self.recipe.id))
            .striped(true)
            .show(ui, |ui| {
                for title in ["Amount", "Unit", "Ingredient", "Price", "Shop"] {
                    ui.strong(title);
                }
                ui.end_row();

                for i in &self.ingredients {
                    ui.label(i.amount.to_string());
                    ui.label(&i.unit);
                    ui.label(&i.name);
                    if i.price > 0.0 {
                        ui.label(format!("€{:.2}", i.price));
                    } else {
                        ui.label("");
                    }
                    ui.label(&i.shop);
                    ui.end_row();
                }
            });
    }

    /// Returns true once the window is closed.
    pub fn update(&mut self, ctx: &egui::Context, toasts: &mut egui_toast::Toasts) -> bool {
        let mut open = true;
        egui::Window::new(&self.recipe.name)
            .id(egui::Id::new(("recipe", self.recipe.id)))
            .open(&mut open)
            .show(ctx, |ui| {
                self.update_details(ui, toasts);
                ui.separator();
                self.update_ingredients(ui);
            });
        !open
    }
}
