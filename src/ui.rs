// Copyright 2023 Remi Bernotavicius

use crate::config::Settings;
use crate::database::models::RecipeId;
use crate::database::{self, Database};
use eframe::egui;
use std::collections::HashMap;
use std::fmt::Display;

mod about;
mod import;
mod ingredient_form;
mod receipt;
mod recipe;
mod recipe_form;
mod recipe_list;
mod search;
mod week_menu;

use about::AboutWindow;
use import::ImportWindow;
use ingredient_form::IngredientFormWindow;
use receipt::ReceiptWindow;
use recipe::RecipeWindow;
use recipe_form::RecipeFormWindow;
use recipe_list::RecipeListWindow;
use week_menu::WeekMenuWindow;

fn new_toast(kind: egui_toast::ToastKind, text: impl Into<egui::WidgetText>) -> egui_toast::Toast {
    egui_toast::Toast {
        text: text.into(),
        kind,
        options: egui_toast::ToastOptions::default()
            .duration_in_seconds(3.0)
            .show_progress(false)
            .show_icon(true),
        ..Default::default()
    }
}

pub fn new_error_toast(text: impl Into<egui::WidgetText>) -> egui_toast::Toast {
    new_toast(egui_toast::ToastKind::Error, text)
}

pub fn new_success_toast(text: impl Into<egui::WidgetText>) -> egui_toast::Toast {
    new_toast(egui_toast::ToastKind::Success, text)
}

/// Logs `error` and shows it to the user.
pub fn report_error(toasts: &mut egui_toast::Toasts, action: &str, error: impl Display) {
    log::error!("{action} failed: {error}");
    toasts.add(new_error_toast(format!("{action} failed: {error}")));
}

/// Runs `body` with a fresh connection. Failures are reported and turn into `None`.
pub fn run_action<T>(
    database: &Database,
    toasts: &mut egui_toast::Toasts,
    action: &str,
    body: impl FnOnce(&mut database::Connection) -> crate::Result<T>,
) -> Option<T> {
    let result = database
        .connect()
        .map_err(crate::Error::from)
        .and_then(|mut conn| body(&mut conn));
    match result {
        Ok(value) => Some(value),
        Err(error) => {
            report_error(toasts, action, error);
            None
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Shortcut {
    NewRecipe,
    Refresh,
    GenerateMenu,
    ExportMenu,
}

/// Ctrl+N, Ctrl+R or F5, Ctrl+G and Ctrl+E. Cmd instead of Ctrl on macOS.
fn read_shortcut(ctx: &egui::Context) -> Option<Shortcut> {
    use egui::{Key, Modifiers};

    ctx.input_mut(|i| {
        if i.consume_key(Modifiers::COMMAND, Key::N) {
            Some(Shortcut::NewRecipe)
        } else if i.consume_key(Modifiers::COMMAND, Key::R) || i.consume_key(Modifiers::NONE, Key::F5)
        {
            Some(Shortcut::Refresh)
        } else if i.consume_key(Modifiers::COMMAND, Key::G) {
            Some(Shortcut::GenerateMenu)
        } else if i.consume_key(Modifiers::COMMAND, Key::E) {
            Some(Shortcut::ExportMenu)
        } else {
            None
        }
    })
}

/// What a window tells the rest of the application after drawing a frame.
pub enum UpdateEvent {
    Closed,
    RecipesChanged,
    ReceiptsChanged,
    OpenRecipe(RecipeId),
}

pub struct CuisineCraft {
    database: Database,
    settings: Settings,
    toasts: egui_toast::Toasts,
    recipe_list: RecipeListWindow,
    recipe_windows: HashMap<RecipeId, RecipeWindow>,
    recipe_form: Option<RecipeFormWindow>,
    ingredient_form: Option<IngredientFormWindow>,
    week_menu: Option<WeekMenuWindow>,
    receipts: Option<ReceiptWindow>,
    import: Option<ImportWindow>,
    about: Option<AboutWindow>,
}

impl CuisineCraft {
    pub fn new(database: Database, settings: Settings) -> Self {
        let mut toasts = egui_toast::Toasts::new()
            .anchor(egui::Align2::RIGHT_BOTTOM, (-10.0, -10.0))
            .direction(egui::Direction::BottomUp);
        let recipe_list = RecipeListWindow::new(&database, &mut toasts);
        Self {
            database,
            settings,
            toasts,
            recipe_list,
            recipe_windows: HashMap::new(),
            recipe_form: None,
            ingredient_form: None,
            week_menu: None,
            receipts: None,
            import: None,
            about: None,
        }
    }

    fn update_menu(&mut self, ui: &mut egui::Ui) {
        egui::menu::bar(ui, |ui| {
            ui.menu_button("Recipes", |ui| {
                if ui.button("New Recipe").clicked() {
                    self.recipe_form.get_or_insert_with(RecipeFormWindow::new);
                    ui.close_menu();
                }
                if ui.button("Add Ingredients").clicked() {
                    if self.ingredient_form.is_none() {
                        self.ingredient_form =
                            Some(IngredientFormWindow::new(&self.database, &mut self.toasts));
                    }
                    ui.close_menu();
                }
                if ui.button("Import from URL").clicked() {
                    self.import.get_or_insert_with(ImportWindow::default);
                    ui.close_menu();
                }
            });
            ui.menu_button("Planning", |ui| {
                if ui.button("Week Menu").clicked() {
                    if self.week_menu.is_none() {
                        self.week_menu = Some(WeekMenuWindow::new(&self.database, &mut self.toasts));
                    }
                    ui.close_menu();
                }
                if ui.button("Receipts").clicked() {
                    if self.receipts.is_none() {
                        self.receipts = Some(ReceiptWindow::new(&self.database, &mut self.toasts));
                    }
                    ui.close_menu();
                }
            });
            ui.menu_button("Help", |ui| {
                if ui.button("About").clicked() {
                    self.about.get_or_insert_with(AboutWindow::new);
                    ui.close_menu();
                }
            });
        });
    }

    fn week_menu_window(&mut self) -> &mut WeekMenuWindow {
        self.week_menu
            .get_or_insert_with(|| WeekMenuWindow::new(&self.database, &mut self.toasts))
    }

    fn handle_shortcut(&mut self, shortcut: Shortcut) {
        log::debug!("shortcut {shortcut:?}");
        match shortcut {
            Shortcut::NewRecipe => {
                self.recipe_form.get_or_insert_with(RecipeFormWindow::new);
            }
            Shortcut::Refresh => self.handle_events(vec![UpdateEvent::RecipesChanged]),
            Shortcut::GenerateMenu => {
                self.week_menu_window();
                if let Some(w) = &mut self.week_menu {
                    w.generate_random(&self.database, &mut self.toasts);
                }
            }
            Shortcut::ExportMenu => {
                self.week_menu_window();
                if let Some(w) = &mut self.week_menu {
                    w.export(&self.database, &self.settings, &mut self.toasts);
                }
            }
        }
    }

    fn handle_events(&mut self, events: Vec<UpdateEvent>) {
        for event in events {
            match event {
                UpdateEvent::RecipesChanged => {
                    self.recipe_list.refresh(&self.database, &mut self.toasts);
                    if let Some(w) = &mut self.week_menu {
                        w.recipes_changed();
                    }
                    if let Some(w) = &mut self.ingredient_form {
                        w.recipes_changed();
                    }
                    for w in self.recipe_windows.values_mut() {
                        w.refresh(&self.database, &mut self.toasts);
                    }
                }
                UpdateEvent::ReceiptsChanged => {
                    if let Some(w) = &mut self.week_menu {
                        w.receipts_changed(&self.database, &mut self.toasts);
                    }
                }
                UpdateEvent::OpenRecipe(id) => {
                    if !self.recipe_windows.contains_key(&id) {
                        if let Some(w) = RecipeWindow::new(&self.database, &mut self.toasts, id) {
                            self.recipe_windows.insert(id, w);
                        }
                    }
                }
                UpdateEvent::Closed => {}
            }
        }
    }
}

/// Drops the window when it reports being closed and returns the rest of its events.
fn update_optional_window<W>(
    window: &mut Option<W>,
    update: impl FnOnce(&mut W) -> Vec<UpdateEvent>,
) -> Vec<UpdateEvent> {
    let Some(w) = window else {
        return vec![];
    };
    let events = update(w);
    if events.iter().any(|e| matches!(e, UpdateEvent::Closed)) {
        *window = None;
    }
    events
}

impl eframe::App for CuisineCraft {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if let Some(shortcut) = read_shortcut(ctx) {
            self.handle_shortcut(shortcut);
        }
        egui::TopBottomPanel::top("menu bar").show(ctx, |ui| self.update_menu(ui));
        egui::CentralPanel::default().show(ctx, |_ui| {});

        let database = &self.database;
        let settings = &self.settings;
        let toasts = &mut self.toasts;

        let mut events = self.recipe_list.update(ctx, database, toasts);

        let mut closed = vec![];
        for (id, w) in &mut self.recipe_windows {
            if w.update(ctx, toasts) {
                closed.push(*id);
            }
        }
        for id in closed {
            self.recipe_windows.remove(&id);
        }

        events.extend(update_optional_window(&mut self.recipe_form, |w| {
            w.update(ctx, database, toasts)
        }));
        events.extend(update_optional_window(&mut self.ingredient_form, |w| {
            w.update(ctx, database, toasts)
        }));
        events.extend(update_optional_window(&mut self.week_menu, |w| {
            w.update(ctx, database, settings, toasts)
        }));
        events.extend(update_optional_window(&mut self.receipts, |w| {
            w.update(ctx, database, settings, toasts)
        }));
        events.extend(update_optional_window(&mut self.import, |w| {
            w.update(ctx, database, settings)
        }));
        if let Some(about) = &mut self.about {
            if about.update(ctx) {
                self.about = None;
            }
        }

        self.handle_events(events);
        self.toasts.show(ctx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shortcut_for(modifiers: egui::Modifiers, key: egui::Key) -> Option<Shortcut> {
        let ctx = egui::Context::default();
        let input = egui::RawInput {
            events: vec![egui::Event::Key {
                key,
                physical_key: None,
                pressed: true,
                repeat: false,
                modifiers,
            }],
            ..Default::default()
        };
        let mut shortcut = None;
        let _ = ctx.run(input, |ctx| shortcut = read_shortcut(ctx));
        shortcut
    }

    #[test]
    fn keyboard_shortcuts() {
        use egui::{Key, Modifiers};

        assert_eq!(
            shortcut_for(Modifiers::COMMAND, Key::N),
            Some(Shortcut::NewRecipe)
        );
        assert_eq!(
            shortcut_for(Modifiers::COMMAND, Key::R),
            Some(Shortcut::Refresh)
        );
        assert_eq!(shortcut_for(Modifiers::NONE, Key::F5), Some(Shortcut::Refresh));
        assert_eq!(
            shortcut_for(Modifiers::COMMAND, Key::G),
            Some(Shortcut::GenerateMenu)
        );
        assert_eq!(
            shortcut_for(Modifiers::COMMAND, Key::E),
            Some(Shortcut::ExportMenu)
        );
        assert_eq!(shortcut_for(Modifiers::NONE, Key::N), None);
    }
}
