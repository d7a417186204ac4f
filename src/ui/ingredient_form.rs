use super::search::{RecipeChoices, SearchWidget};
use super::{new_success_toast, run_action, UpdateEvent};
use crate::database::models::RecipeHandle;
use crate::database::{query, Database};
use crate::forms::{IngredientForm, IngredientRow};
use eframe::egui;

pub struct IngredientFormWindow {
    form: IngredientForm,
    recipe_name: String,
    choices: RecipeChoices,
}

impl IngredientFormWindow {
    /// Starts out pointing at the most recently added recipe.
    pub fn new(database: &Database, toasts: &mut egui_toast::Toasts) -> Self {
        let latest = run_action(database, toasts, "Loading latest recipe", |conn| {
            Ok(match query::latest_recipe_id(conn)? {
                Some(id) => Some(query::get_recipe(conn, id)?.to_handle()),
                None => None,
            })
        })
        .flatten();

        let mut form = IngredientForm::default();
        let recipe_name = latest.as_ref().map(|r| r.name.clone()).unwrap_or_default();
        form.recipe = latest;
        Self {
            form,
            recipe_name,
            choices: RecipeChoices::default(),
        }
    }

    pub fn recipes_changed(&mut self) {
        self.choices.invalidate();
    }

    fn save(&mut self, database: &Database, toasts: &mut egui_toast::Toasts) -> bool {
        let form = &self.form;
        let saved = run_action(database, toasts, "Saving ingredients", |conn| {
            let ingredients = form.to_new_ingredients()?;
            Ok(query::insert_ingredients(conn, &ingredients)?)
        });
        match saved {
            Some(count) => {
                let recipe = self.form.recipe.as_ref().map(|r| r.name.as_str());
                toasts.add(new_success_toast(format!(
                    "Added {count} ingredients to {}",
                    recipe.unwrap_or_default()
                )));
                self.form.clear_rows();
                true
            }
            None => false,
        }
    }

    fn update_rows(&mut self, ui: &mut egui::Ui) {
        let mut remove = None;
        egui::Grid::new("ingredient rows").striped(true).show(ui, |ui| {
            for title in ["Amount", "Unit", "Ingredient", "Price", "Shop", "Price date", ""] {
                ui.strong(title);
            }
            ui.end_row();

            for (i, row) in self.form.rows.iter_mut().enumerate() {
                ui.add(egui::TextEdit::singleline(&mut row.amount).desired_width(60.0));
                ui.add(egui::TextEdit::singleline(&mut row.unit).desired_width(60.0));
                ui.add(egui::TextEdit::singleline(&mut row.name).desired_width(160.0));
                ui.add(
                    egui::TextEdit::singleline(&mut row.price)
                        .hint_text("optional")
                        .desired_width(60.0),
                );
                ui.add(egui::TextEdit::singleline(&mut row.shop).desired_width(90.0));
                ui.add(
                    egui::TextEdit::singleline(&mut row.price_date)
                        .hint_text("YYYY-MM-DD")
                        .desired_width(90.0),
                );
                if ui.small_button("✖").clicked() {
                    remove = Some(i);
                }
                ui.end_row();
            }
        });
        if let Some(i) = remove {
            self.form.rows.remove(i);
        }
    }

    pub fn update(
        &mut self,
        ctx: &egui::Context,
        database: &Database,
        toasts: &mut egui_toast::Toasts,
    ) -> Vec<UpdateEvent> {
        let mut events = vec![];
        let mut open = true;
        let mut save = false;
        egui::Window::new("Add Ingredients")
            .open(&mut open)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.label("Recipe");
                    let choices = &mut self.choices;
                    let mut picked: Option<RecipeHandle> = self.form.recipe.clone();
                    ui.add(
                        SearchWidget::new(
                            "ingredient form recipe",
                            &mut self.recipe_name,
                            &mut picked,
                            |text| choices.matching(database, toasts, text),
                        )
                        .hint_text("search for recipe")
                        .desired_width(250.0),
                    );
                    self.form.recipe = picked;
                });
                ui.separator();
                self.update_rows(ui);
                ui.horizontal(|ui| {
                    if ui.button("Add Row").clicked() {
                        self.form.rows.push(IngredientRow::default());
                    }
                    save = ui.button("Save Ingredients").clicked();
                });
            });

        if save && self.save(database, toasts) {
            events.push(UpdateEvent::RecipesChanged);
        }
        if !open {
            events.push(UpdateEvent::Closed);
        }
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_without_recipe_keeps_rows() {
        let dir = tempfile::tempdir().unwrap();
        let database = Database::open(dir.path().join("data.sqlite")).unwrap();
        let mut toasts = egui_toast::Toasts::new();

        let mut window = IngredientFormWindow::new(&database, &mut toasts);
        assert_eq!(window.form.recipe, None);
        window.form.rows = vec![IngredientRow {
            amount: "200".into(),
            unit: "g".into(),
            name: "Bloem".into(),
            ..Default::default()
        }];

        assert!(!window.save(&database, &mut toasts));
        assert_eq!(window.form.rows.len(), 1);
        let mut conn = database.connect().unwrap();
        assert_eq!(query::latest_recipe_id(&mut conn).unwrap(), None);
    }
}
