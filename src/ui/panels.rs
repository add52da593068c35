use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::data::export;
use crate::data::filter::{observed, Dimension};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    let Some(table) = state.table.clone() else {
        ui.label("No dataset loaded.");
        return;
    };

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for dim in Dimension::ALL {
                let all_values = observed(&table, dim).clone();
                let n_selected = state.selection.selected(dim).len();
                let header_text =
                    format!("{}  ({}/{})", dim.label(), n_selected, all_values.len());

                egui::CollapsingHeader::new(RichText::new(header_text).strong())
                    .id_salt(dim.label())
                    .default_open(true)
                    .show(ui, |ui: &mut Ui| {
                        // Select all / none buttons
                        ui.horizontal(|ui: &mut Ui| {
                            if ui.small_button("All").clicked() {
                                state.select_all(dim);
                            }
                            if ui.small_button("None").clicked() {
                                state.select_none(dim);
                            }
                        });

                        for value in &all_values {
                            let mut checked = state.selection.selected(dim).contains(value);
                            if ui.checkbox(&mut checked, value.as_str()).changed() {
                                state.toggle_value(dim, value);
                            }
                        }
                    });
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            let has_table = state.table.is_some();
            if ui
                .add_enabled(has_table, egui::Button::new("Export CSV…"))
                .clicked()
            {
                export_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if ui.selectable_label(!state.dark_mode, "Light").clicked() {
            state.dark_mode = false;
        }
        if ui.selectable_label(state.dark_mode, "Dark").clicked() {
            state.dark_mode = true;
        }

        ui.separator();

        if let Some(table) = &state.table {
            ui.label(format!(
                "{} records loaded, {} visible",
                table.len(),
                state.visible_indices.len()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open order data")
        .add_filter("CSV", &["csv"])
        .pick_file();

    if let Some(path) = file {
        state.load_file(&path);
    }
}

fn export_dialog(state: &mut AppState) {
    let Some(table) = state.table.clone() else {
        return;
    };
    let file = rfd::FileDialog::new()
        .set_title("Export filtered data")
        .set_file_name("filtered_orders.csv")
        .add_filter("CSV", &["csv"])
        .save_file();

    if let Some(path) = file {
        match export::export_csv(&table, &state.visible_indices, &path) {
            Ok(()) => {
                log::info!(
                    "exported {} records to {}",
                    state.visible_indices.len(),
                    path.display()
                );
                state.status_message =
                    Some(format!("Exported {} records", state.visible_indices.len()));
            }
            Err(e) => {
                log::error!("export failed: {e:#}");
                state.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}
