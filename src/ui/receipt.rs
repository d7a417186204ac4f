use super::{new_success_toast, report_error, run_action, UpdateEvent};
use crate::config::Settings;
use crate::database::models::ReceiptItem;
use crate::database::{query, Database};
use crate::receipt::{parse_receipt, perform_ocr, ReceiptScan};
use eframe::egui;
use std::path::PathBuf;

struct PendingReceipt {
    image_path: PathBuf,
    scan: ReceiptScan,
}

pub struct ReceiptWindow {
    pending: Option<PendingReceipt>,
    saved: Vec<ReceiptItem>,
}

impl ReceiptWindow {
    pub fn new(database: &Database, toasts: &mut egui_toast::Toasts) -> Self {
        let mut window = Self {
            pending: None,
            saved: vec![],
        };
        window.refresh(database, toasts);
        window
    }

    fn refresh(&mut self, database: &Database, toasts: &mut egui_toast::Toasts) {
        if let Some(saved) = run_action(database, toasts, "Loading receipt items", |conn| {
            Ok(query::list_receipt_items(conn)?)
        }) {
            self.saved = saved;
        }
    }

    fn scan(&mut self, settings: &Settings, toasts: &mut egui_toast::Toasts) {
        let Some(image_path) = rfd::FileDialog::new()
            .set_title("Scan Receipt")
            .add_filter("Images", &["png", "jpg", "jpeg", "bmp", "tiff"])
            .pick_file()
        else {
            return;
        };

        match perform_ocr(&image_path, &settings.tesseract) {
            Ok(text) => {
                let scan = parse_receipt(&text, chrono::Local::now().date_naive());
                if scan.items.is_empty() {
                    report_error(toasts, "Scanning receipt", "no priced lines were recognized");
                }
                self.pending = Some(PendingReceipt { image_path, scan });
            }
            Err(error) => report_error(toasts, "Scanning receipt", error),
        }
    }

    fn save(&mut self, database: &Database, toasts: &mut egui_toast::Toasts) -> bool {
        let Some(pending) = &self.pending else {
            return false;
        };
        let items = pending
            .scan
            .to_new_items(&pending.image_path.display().to_string());
        let saved = run_action(database, toasts, "Saving receipt", |conn| {
            Ok(query::insert_receipt_items(conn, &items)?)
        });
        match saved {
            Some(count) => {
                toasts.add(new_success_toast(format!("Saved {count} receipt items")));
                self.pending = None;
                self.refresh(database, toasts);
                true
            }
            None => false,
        }
    }

    fn update_pending(pending: &mut PendingReceipt, ui: &mut egui::Ui) {
        ui.label(pending.image_path.display().to_string());
        egui::Grid::new("receipt header").show(ui, |ui| {
            ui.label("Shop");
            ui.text_edit_singleline(&mut pending.scan.shop);
            ui.end_row();

            ui.label("Date");
            ui.add(egui_extras::DatePickerButton::new(&mut pending.scan.date));
            ui.end_row();
        });

        let mut remove = None;
        egui::ScrollArea::vertical()
            .id_salt("pending receipt items")
            .max_height(200.0)
            .show(ui, |ui| {
                egui::Grid::new("receipt items").striped(true).show(ui, |ui| {
                    ui.strong("Item");
                    ui.strong("Price");
                    ui.end_row();
                    for (i, item) in pending.scan.items.iter_mut().enumerate() {
                        ui.text_edit_singleline(&mut item.name);
                        ui.add(
                            egui::DragValue::new(&mut item.price)
                                .speed(0.01)
                                .range(0.0..=f64::MAX)
                                .fixed_decimals(2),
                        );
                        if ui.small_button("✖").clicked() {
                            remove = Some(i);
                        }
                        ui.end_row();
                    }
                });
            });
        if let Some(i) = remove {
            pending.scan.items.remove(i);
        }
    }

    fn update_saved(&self, ui: &mut egui::Ui) {
        ui.strong("Saved prices");
        if self.saved.is_empty() {
            ui.label("No receipts saved yet");
            return;
        }
        egui_extras::TableBuilder::new(ui)
            .id_salt("saved receipt items")
            .striped(true)
            .column(egui_extras::Column::remainder().at_least(140.0))
            .column(egui_extras::Column::exact(70.0))
            .column(egui_extras::Column::exact(90.0))
            .column(egui_extras::Column::exact(90.0))
            .min_scrolled_height(0.0)
            .max_scroll_height(250.0)
            .header(20.0, |mut header| {
                for title in ["Item", "Price", "Shop", "Date"] {
                    header.col(|ui| {
                        ui.strong(title);
                    });
                }
            })
            .body(|body| {
                body.rows(18.0, self.saved.len(), |mut row| {
                    let item = &self.saved[row.index()];
                    row.col(|ui| {
                        ui.label(&item.item_name);
                    });
                    row.col(|ui| {
                        ui.label(format!("€{:.2}", item.price));
                    });
                    row.col(|ui| {
                        ui.label(&item.shop);
                    });
                    row.col(|ui| {
                        ui.label(item.price_date.to_string());
                    });
                });
            });
    }

    pub fn update(
        &mut self,
        ctx: &egui::Context,
        database: &Database,
        settings: &Settings,
        toasts: &mut egui_toast::Toasts,
    ) -> Vec<UpdateEvent> {
        let mut events = vec![];
        let mut open = true;
        let mut scan = false;
        let mut save = false;
        let mut discard = false;
        egui::Window::new("Receipts")
            .open(&mut open)
            .show(ctx, |ui| {
                scan = ui.button("Scan Receipt").clicked();
                if let Some(pending) = &mut self.pending {
                    ui.separator();
                    Self::update_pending(pending, ui);
                    ui.horizontal(|ui| {
                        save = ui.button("Save Items").clicked();
                        discard = ui.button("Discard").clicked();
                    });
                }
                ui.separator();
                self.update_saved(ui);
            });

        if scan {
            self.scan(settings, toasts);
        }
        if save && self.save(database, toasts) {
            events.push(UpdateEvent::ReceiptsChanged);
        }
        if discard {
            self.pending = None;
        }
        if !open {
            events.push(UpdateEvent::Closed);
        }
        events
    }
}
