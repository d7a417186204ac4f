use super::run_action;
use crate::database::models::RecipeHandle;
use crate::database::{query, Database};
use eframe::egui;
use std::hash::Hash;

/// A text field with a pop-up of matching choices. Picking a choice fills in `value`.
pub struct SearchWidget<'a, SearchFn, ValueT> {
    buf: &'a mut String,
    value: &'a mut Option<ValueT>,
    search_fn: SearchFn,
    pop_up_id: egui::Id,
    hint_text: Option<egui::WidgetText>,
    desired_width: Option<f32>,
}

impl<'a, SearchFn, ValueT> SearchWidget<'a, SearchFn, ValueT>
where
    SearchFn: FnOnce(&str) -> Vec<(ValueT, String)>,
{
    pub fn new(
        id_salt: impl Hash,
        buf: &'a mut String,
        value: &'a mut Option<ValueT>,
        search_fn: SearchFn,
    ) -> Self {
        Self {
            buf,
            value,
            search_fn,
            pop_up_id: egui::Id::new(id_salt),
            hint_text: None,
            desired_width: None,
        }
    }

    pub fn hint_text(mut self, hint_text: impl Into<egui::WidgetText>) -> Self {
        self.hint_text = Some(hint_text.into());
        self
    }

    pub fn desired_width(mut self, desired_width: f32) -> Self {
        self.desired_width = Some(desired_width);
        self
    }
}

impl<'a, SearchFn, ValueT> egui::Widget for SearchWidget<'a, SearchFn, ValueT>
where
    SearchFn: FnOnce(&str) -> Vec<(ValueT, String)>,
    ValueT: Clone,
{
    fn ui(self, ui: &mut egui::Ui) -> egui::Response {
        let Self {
            pop_up_id,
            buf,
            value,
            search_fn,
            hint_text,
            desired_width,
        } = self;

        let mut edit = egui::TextEdit::singleline(buf);
        if let Some(hint_text) = hint_text {
            edit = edit.hint_text(hint_text);
        }
        if let Some(desired_width) = desired_width {
            edit = edit.desired_width(desired_width);
        }
        let mut response = edit.show(ui).response;
        if response.gained_focus() {
            ui.memory_mut(|m| m.open_popup(pop_up_id));
        }

        let mut changed = false;
        egui::popup_below_widget(
            ui,
            pop_up_id,
            &response,
            egui::PopupCloseBehavior::CloseOnClick,
            |ui| {
                egui::ScrollArea::vertical()
                    .max_height(200.0)
                    .show(ui, |ui| {
                        let mut matches_valid = false;
                        for (choice, text) in search_fn(buf) {
                            if buf == &text {
                                matches_valid = true;
                                if value.is_none() {
                                    *value = Some(choice.clone());
                                }
                            }

                            if ui.selectable_label(false, &text).clicked() {
                                *value = Some(choice);
                                *buf = text;
                                changed = true;
                                ui.memory_mut(|m| m.close_popup());
                                matches_valid = true;
                            }
                        }
                        if !matches_valid {
                            *value = None;
                        }
                    });
            },
        );

        if changed {
            response.mark_changed();
        }
        response
    }
}

/// Every recipe name, loaded once and filtered as the user types.
#[derive(Default)]
pub struct RecipeChoices {
    recipes: Option<Vec<RecipeHandle>>,
}

impl RecipeChoices {
    /// Forget the loaded recipes so the next search sees new ones.
    pub fn invalidate(&mut self) {
        self.recipes = None;
    }

    fn load(&mut self, database: &Database, toasts: &mut egui_toast::Toasts) -> &[RecipeHandle] {
        self.recipes.get_or_insert_with(|| {
            run_action(database, toasts, "Loading recipes", |conn| {
                Ok(query::recipe_choices(conn)?)
            })
            .unwrap_or_default()
        })
    }

    pub fn matching(
        &mut self,
        database: &Database,
        toasts: &mut egui_toast::Toasts,
        text: &str,
    ) -> Vec<(RecipeHandle, String)> {
        let needle = text.trim().to_lowercase();
        self.load(database, toasts)
            .iter()
            .filter(|r| r.name.to_lowercase().contains(&needle))
            .map(|r| (r.clone(), r.name.clone()))
            .collect()
    }

    pub fn all(&mut self, database: &Database, toasts: &mut egui_toast::Toasts) -> &[RecipeHandle] {
        self.load(database, toasts)
    }
}
