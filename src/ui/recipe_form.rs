use super::{new_success_toast, run_action, UpdateEvent};
use crate::cooking_time::parse_cooking_time;
use crate::database::{query, Database};
use crate::forms::RecipeForm;
use eframe::egui;

pub struct RecipeFormWindow {
    form: RecipeForm,
}

impl RecipeFormWindow {
    pub fn new() -> Self {
        Self {
            form: RecipeForm::default(),
        }
    }

    fn save(&mut self, database: &Database, toasts: &mut egui_toast::Toasts) -> bool {
        let form = &self.form;
        let saved = run_action(database, toasts, "Saving recipe", |conn| {
            let recipe = form.to_new_recipe()?;
            query::insert_recipe(conn, &recipe)?;
            Ok(recipe.name)
        });
        match saved {
            Some(name) => {
                toasts.add(new_success_toast(format!("Recipe {name:?} saved")));
                self.form = RecipeForm::default();
                true
            }
            None => false,
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
        egui::Window::new("New Recipe")
            .open(&mut open)
            .show(ctx, |ui| {
                let form = &mut self.form;
                egui::Grid::new("recipe form").num_columns(2).show(ui, |ui| {
                    ui.label("Name");
                    ui.text_edit_singleline(&mut form.name);
                    ui.end_row();

                    ui.label("Persons");
                    ui.text_edit_singleline(&mut form.persons);
                    ui.end_row();

                    ui.label("Cooking time");
                    ui.horizontal(|ui| {
                        ui.add(
                            egui::TextEdit::singleline(&mut form.cooking_time)
                                .hint_text("1 hour 30 min"),
                        );
                        if !form.cooking_time.trim().is_empty() {
                            ui.weak(format!("{} min", parse_cooking_time(&form.cooking_time)));
                        }
                    });
                    ui.end_row();

                    ui.label("Cuisine");
                    ui.text_edit_singleline(&mut form.cuisine_origin);
                    ui.end_row();

                    ui.label("File");
                    ui.horizontal(|ui| {
                        ui.text_edit_singleline(&mut form.file_location);
                        if ui.button("Browse").clicked() {
                            if let Some(file) = rfd::FileDialog::new().pick_file() {
                                form.file_location = file.display().to_string();
                            }
                        }
                    });
                    ui.end_row();

                    ui.label("URL");
                    ui.text_edit_singleline(&mut form.url);
                    ui.end_row();

                    ui.label("Health grade");
                    ui.add(egui::TextEdit::singleline(&mut form.health_grade).hint_text("1-3"));
                    ui.end_row();
                });
                ui.separator();
                save = ui.button("Save Recipe").clicked();
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
