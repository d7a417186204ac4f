use super::search::{RecipeChoices, SearchWidget};
use super::{new_success_toast, report_error, run_action, UpdateEvent};
use crate::config::Settings;
use crate::database::models::{MenuDay, RecipeHandle};
use crate::database::{query, Database};
use crate::export;
use crate::menu::{self, ShoppingListItem, WeekMenu};
use chrono::Datelike as _;
use eframe::egui;
use std::collections::HashMap;
use std::path::PathBuf;
use thousands::Separable as _;

fn now() -> chrono::NaiveDateTime {
    chrono::Local::now().naive_local()
}

fn format_price(price: f64) -> String {
    format!("€{}", format!("{price:.2}").separate_with_commas())
}

#[derive(Default)]
struct RecipeBeingSelected {
    name: String,
    recipe: Option<RecipeHandle>,
}

pub struct WeekMenuWindow {
    menu: WeekMenu,
    recipes_being_selected: HashMap<MenuDay, RecipeBeingSelected>,
    choices: RecipeChoices,
    shopping_list: Option<Vec<ShoppingListItem>>,
}

impl WeekMenuWindow {
    /// Opens with whatever menu was last saved.
    pub fn new(database: &Database, toasts: &mut egui_toast::Toasts) -> Self {
        let menu = run_action(database, toasts, "Loading week menu", |conn| {
            Ok(WeekMenu::load(conn)?)
        })
        .unwrap_or_default();
        Self {
            menu,
            recipes_being_selected: HashMap::new(),
            choices: RecipeChoices::default(),
            shopping_list: None,
        }
    }

    pub fn recipes_changed(&mut self) {
        self.choices.invalidate();
    }

    pub fn receipts_changed(&mut self, database: &Database, toasts: &mut egui_toast::Toasts) {
        if self.shopping_list.is_some() {
            self.update_shopping_list(database, toasts);
        }
    }

    fn menu_changed(&mut self) {
        self.shopping_list = None;
        self.recipes_being_selected.clear();
    }

    fn update_shopping_list(&mut self, database: &Database, toasts: &mut egui_toast::Toasts) {
        let menu = &self.menu;
        self.shopping_list = run_action(database, toasts, "Building shopping list", |conn| {
            Ok(menu::shopping_list(conn, menu)?)
        });
    }

    pub fn generate_random(&mut self, database: &Database, toasts: &mut egui_toast::Toasts) {
        let recipes = self.choices.all(database, toasts);
        match menu::generate_random(recipes, &mut rand::rng()) {
            Ok(menu) => {
                self.menu = menu;
                self.menu_changed();
            }
            Err(error) => report_error(toasts, "Generating week menu", error),
        }
    }

    fn save(&mut self, database: &Database, toasts: &mut egui_toast::Toasts) {
        let menu = &self.menu;
        if let Some(count) = run_action(database, toasts, "Saving week menu", |conn| {
            Ok(menu.save(conn, now())?)
        }) {
            toasts.add(new_success_toast(format!("Saved {count} meals")));
        }
    }

    fn load(&mut self, database: &Database, toasts: &mut egui_toast::Toasts) {
        if let Some(menu) = run_action(database, toasts, "Loading week menu", |conn| {
            Ok(WeekMenu::load(conn)?)
        }) {
            self.menu = menu;
            self.menu_changed();
        }
    }

    fn clear(&mut self, database: &Database, toasts: &mut egui_toast::Toasts) {
        if run_action(database, toasts, "Clearing week menu", |conn| {
            Ok(query::clear_week_menu(conn)?)
        })
        .is_some()
        {
            self.menu.clear();
            self.menu_changed();
        }
    }

    pub fn export(&mut self, database: &Database, settings: &Settings, toasts: &mut egui_toast::Toasts) {
        let default_path = export::default_export_path(&settings.export_dir, now());
        if let Err(error) = std::fs::create_dir_all(&settings.export_dir) {
            log::warn!("couldn't create {}: {error}", settings.export_dir.display());
        }
        let Some(path): Option<PathBuf> = rfd::FileDialog::new()
            .set_title("Export Week Menu")
            .set_directory(&settings.export_dir)
            .set_file_name(
                default_path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default(),
            )
            .add_filter("Text files", &["txt"])
            .add_filter("CSV files", &["csv"])
            .save_file()
        else {
            return;
        };

        let menu = &self.menu;
        let exported = run_action(database, toasts, "Exporting week menu", |conn| {
            export::export_menu(conn, menu, &path, settings.csv_delimiter, now())?;
            Ok(())
        });
        if exported.is_some() {
            toasts.add(new_success_toast(format!(
                "Week menu exported to {}",
                path.display()
            )));
            if let Err(error) = open::that(&path) {
                report_error(toasts, "Opening export", error);
            }
        }
    }

    fn update_days(&mut self, ui: &mut egui::Ui, database: &Database, toasts: &mut egui_toast::Toasts) {
        let mut changed = false;
        let today = MenuDay::from(chrono::Local::now().weekday());
        egui::Grid::new("week menu grid").show(ui, |ui| {
            for day in MenuDay::iter() {
                if day == today {
                    ui.strong(day.to_string());
                } else {
                    ui.label(day.to_string());
                }
                if let Some(recipe) = self.menu.get(day) {
                    ui.label(&recipe.name);
                    if ui.button("Clear").clicked() {
                        self.menu.clear_day(day);
                        changed = true;
                    }
                } else {
                    let e = self.recipes_being_selected.entry(day).or_default();
                    let choices = &mut self.choices;
                    ui.add(
                        SearchWidget::new(
                            ("week menu day", day),
                            &mut e.name,
                            &mut e.recipe,
                            |text| choices.matching(database, toasts, text),
                        )
                        .hint_text("pick a recipe")
                        .desired_width(200.0),
                    );
                    if ui.button("Assign").clicked() {
                        if let Some(recipe) = e.recipe.take() {
                            self.menu.assign(day, recipe);
                            changed = true;
                        }
                    }
                }
                ui.end_row();
            }
        });
        if changed {
            self.menu_changed();
        }
    }

    fn update_shopping_list_table(&self, ui: &mut egui::Ui) {
        let Some(items) = &self.shopping_list else {
            return;
        };
        ui.separator();
        ui.strong("Shopping List");
        if items.is_empty() {
            ui.label("The meals on this menu have no ingredients");
            return;
        }

        egui_extras::TableBuilder::new(ui)
            .id_salt("shopping list table")
            .striped(true)
            .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
            .column(egui_extras::Column::remainder().at_least(140.0))
            .column(egui_extras::Column::exact(70.0))
            .column(egui_extras::Column::exact(60.0))
            .column(egui_extras::Column::exact(70.0))
            .column(egui_extras::Column::exact(90.0))
            .min_scrolled_height(0.0)
            .max_scroll_height(250.0)
            .header(20.0, |mut header| {
                for title in ["Ingredient", "Amount", "Unit", "Price", "Shop"] {
                    header.col(|ui| {
                        ui.strong(title);
                    });
                }
            })
            .body(|mut body| {
                for item in items {
                    body.row(18.0, |mut row| {
                        row.col(|ui| {
                            ui.label(&item.ingredient.name);
                        });
                        row.col(|ui| {
                            ui.label(item.ingredient.amount.to_string());
                        });
                        row.col(|ui| {
                            ui.label(&item.ingredient.unit);
                        });
                        row.col(|ui| {
                            ui.label(item.price.map(format_price).unwrap_or_default());
                        });
                        row.col(|ui| {
                            ui.label(item.shop.as_deref().unwrap_or_default());
                        });
                    });
                }
            });
        ui.label(format!(
            "Estimated total: {}",
            format_price(menu::estimated_total(items))
        ));
    }

    pub fn update(
        &mut self,
        ctx: &egui::Context,
        database: &Database,
        settings: &Settings,
        toasts: &mut egui_toast::Toasts,
    ) -> Vec<UpdateEvent> {
        let mut open = true;
        egui::Window::new("Week Menu")
            .open(&mut open)
            .show(ctx, |ui| {
                self.update_days(ui, database, toasts);
                ui.separator();
                ui.horizontal(|ui| {
                    if ui.button("Random").clicked() {
                        self.generate_random(database, toasts);
                    }
                    if ui.button("Save").clicked() {
                        self.save(database, toasts);
                    }
                    if ui.button("Load").clicked() {
                        self.load(database, toasts);
                    }
                    if ui.button("Clear").clicked() {
                        self.clear(database, toasts);
                    }
                });
                ui.horizontal(|ui| {
                    let has_meals = !self.menu.is_empty();
                    if ui
                        .add_enabled(has_meals, egui::Button::new("Shopping List"))
                        .clicked()
                    {
                        self.update_shopping_list(database, toasts);
                    }
                    if ui
                        .add_enabled(has_meals, egui::Button::new("Export"))
                        .clicked()
                    {
                        self.export(database, settings, toasts);
                    }
                });
                self.update_shopping_list_table(ui);
            });

        if open {
            vec![]
        } else {
            vec![UpdateEvent::Closed]
        }
    }
}
