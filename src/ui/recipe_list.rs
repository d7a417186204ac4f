use super::{run_action, UpdateEvent};
use crate::database::models::Recipe;
use crate::database::{query, Database};
use eframe::egui;
use std::time::{Duration, Instant};

/// How long typing has to pause before the list is searched again.
const SEARCH_DELAY: Duration = Duration::from_millis(300);

#[derive(Default)]
struct SearchDebounce {
    due: Option<Instant>,
}

impl SearchDebounce {
    fn typed(&mut self, now: Instant) {
        self.due = Some(now + SEARCH_DELAY);
    }

    fn cancel(&mut self) {
        self.due = None;
    }

    /// True once, when the pause is over.
    fn take_due(&mut self, now: Instant) -> bool {
        match self.due {
            Some(due) if now >= due => {
                self.due = None;
                true
            }
            _ => false,
        }
    }

    fn remaining(&self, now: Instant) -> Option<Duration> {
        self.due.map(|due| due.saturating_duration_since(now))
    }
}

fn grade_label(recipe: &Recipe) -> String {
    recipe
        .health_grade
        .map(|g| g.to_string())
        .unwrap_or_else(|| "-".into())
}

pub struct RecipeListWindow {
    search: String,
    debounce: SearchDebounce,
    recipes: Vec<Recipe>,
}

impl RecipeListWindow {
    pub fn new(database: &Database, toasts: &mut egui_toast::Toasts) -> Self {
        let mut window = Self {
            search: String::new(),
            debounce: SearchDebounce::default(),
            recipes: vec![],
        };
        window.refresh(database, toasts);
        window
    }

    pub fn refresh(&mut self, database: &Database, toasts: &mut egui_toast::Toasts) {
        let search = self.search.clone();
        if let Some(recipes) = run_action(database, toasts, "Searching recipes", |conn| {
            Ok(query::search_recipes(conn, &search)?)
        }) {
            self.recipes = recipes;
        }
    }

    fn update_table(&self, ui: &mut egui::Ui, events: &mut Vec<UpdateEvent>) {
        let available_height = ui.available_height();
        egui_extras::TableBuilder::new(ui)
            .id_salt("recipe table")
            .striped(true)
            .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
            .column(egui_extras::Column::remainder().at_least(160.0))
            .column(egui_extras::Column::exact(60.0))
            .column(egui_extras::Column::exact(70.0))
            .column(egui_extras::Column::exact(100.0))
            .column(egui_extras::Column::exact(50.0))
            .min_scrolled_height(0.0)
            .max_scroll_height(available_height)
            .header(20.0, |mut header| {
                for title in ["Name", "Persons", "Time", "Cuisine", "Grade"] {
                    header.col(|ui| {
                        ui.strong(title);
                    });
                }
            })
            .body(|mut body| {
                for recipe in &self.recipes {
                    body.row(20.0, |mut row| {
                        row.col(|ui| {
                            if ui.link(&recipe.name).clicked() {
                                events.push(UpdateEvent::OpenRecipe(recipe.id));
                            }
                        });
                        row.col(|ui| {
                            ui.label(recipe.persons.to_string());
                        });
                        row.col(|ui| {
                            ui.label(format!("{} min", recipe.cooking_time));
                        });
                        row.col(|ui| {
                            ui.label(&recipe.cuisine_origin);
                        });
                        row.col(|ui| {
                            ui.label(grade_label(recipe));
                        });
                    });
                }
            });
    }

    pub fn update(
        &mut self,
        ctx: &egui::Context,
        database: &Database,
        toasts: &mut egui_toast::Toasts,
    ) -> Vec<UpdateEvent> {
        let mut events = vec![];
        let mut search = false;
        let mut typed = false;
        egui::Window::new("Recipes").show(ctx, |ui| {
            ui.horizontal(|ui| {
                let response = ui.add(
                    egui::TextEdit::singleline(&mut self.search)
                        .hint_text("name, cuisine or ingredient")
                        .desired_width(ui.available_width() - 70.0),
                );
                typed = response.changed();
                search |= response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
                search |= ui.button("Search").clicked();
            });
            ui.separator();
            if self.recipes.is_empty() {
                ui.label("No recipes found");
            } else {
                self.update_table(ui, &mut events);
            }
        });

        let now = Instant::now();
        if typed {
            self.debounce.typed(now);
        }
        if search {
            self.debounce.cancel();
            self.refresh(database, toasts);
        } else if self.debounce.take_due(now) {
            self.refresh(database, toasts);
        } else if let Some(remaining) = self.debounce.remaining(now) {
            ctx.request_repaint_after(remaining);
        }
        events
    }
}
