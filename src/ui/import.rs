use super::UpdateEvent;
use crate::config::Settings;
use crate::database::Database;
use crate::import::{self, SUPPORTED_DOMAINS};
use eframe::egui;

pub enum ImportWindow {
    Ready { url: String },
    Failed { error: String },
    Success { name: String },
}

impl Default for ImportWindow {
    fn default() -> Self {
        Self::Ready { url: String::new() }
    }
}

impl ImportWindow {
    pub fn update(
        &mut self,
        ctx: &egui::Context,
        database: &Database,
        settings: &Settings,
    ) -> Vec<UpdateEvent> {
        let mut events = vec![];
        let mut open = true;
        egui::Window::new("Import Recipe")
            .open(&mut open)
            .show(ctx, |ui| {
                let next = match self {
                    Self::Ready { url } => Self::update_ready(url, database, settings, ui),
                    Self::Failed { error } => Self::update_failed(error, ui),
                    Self::Success { name } => Self::update_success(name, ui),
                };
                if let Some(next) = next {
                    if matches!(next, Self::Success { .. }) {
                        events.push(UpdateEvent::RecipesChanged);
                    }
                    *self = next;
                }
            });
        if !open {
            events.push(UpdateEvent::Closed);
        }
        events
    }

    fn update_ready(
        url: &mut String,
        database: &Database,
        settings: &Settings,
        ui: &mut egui::Ui,
    ) -> Option<Self> {
        ui.label(format!("Supported sites: {}", SUPPORTED_DOMAINS.join(", ")));
        ui.horizontal(|ui| {
            ui.add(
                egui::TextEdit::singleline(url)
                    .hint_text("https://")
                    .desired_width(300.0),
            );
            ui.button("Import").clicked()
        })
        .inner
        .then(|| Self::import(url, database, settings))
    }

    fn import(url: &str, database: &Database, settings: &Settings) -> Self {
        let result = database
            .connect()
            .map_err(crate::Error::from)
            .and_then(|mut conn| {
                Ok(import::import_recipe_from_url(
                    &mut conn,
                    url,
                    &settings.recipes_dir,
                )?)
            });
        match result {
            Ok(recipe) => {
                log::info!("imported {:?} from {url}", recipe.name);
                Self::Success { name: recipe.name }
            }
            Err(error) => {
                log::error!("importing {url} failed: {error}");
                Self::Failed {
                    error: error.to_string(),
                }
            }
        }
    }

    fn update_failed(error: &str, ui: &mut egui::Ui) -> Option<Self> {
        ui.label(format!("import failed with error: {error}"));
        ui.button("okay").clicked().then(Self::default)
    }

    fn update_success(name: &str, ui: &mut egui::Ui) -> Option<Self> {
        ui.label(format!("import succeeded. {name:?} added to recipes."));
        ui.button("okay").clicked().then(Self::default)
    }
}
