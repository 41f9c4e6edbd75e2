use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::data::filter::active_filter_count;
use crate::data::model::Column;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel: one multi-select per filterable column.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.horizontal(|ui: &mut Ui| {
        ui.heading("Filters");
        let active = active_filter_count(&state.filters);
        if active > 0 && ui.small_button(format!("Reset ({active})")).clicked() {
            state.clear_all_filters();
        }
    });
    ui.separator();

    let Some(dataset) = &state.dataset else {
        ui.label("No dataset loaded.");
        return;
    };

    // Options are collected up front so the loop can mutate state.
    let options: Vec<(Column, Vec<String>)> = Column::FILTERABLE
        .iter()
        .map(|&col| (col, dataset.selector_options(col)))
        .collect();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for (col, values) in &options {
                let n_selected = state.filters.get(col).map_or(0, |s| s.len());
                let header_text = if n_selected == 0 {
                    format!("{}  (all)", col.label())
                } else {
                    format!("{}  ({n_selected}/{})", col.label(), values.len())
                };

                egui::CollapsingHeader::new(RichText::new(header_text).strong())
                    .id_salt(col.header())
                    .default_open(false)
                    .show(ui, |ui: &mut Ui| {
                        if values.is_empty() {
                            ui.weak("No values in this file.");
                            return;
                        }
                        if n_selected > 0 && ui.small_button("Clear").clicked() {
                            state.clear_filter(*col);
                        }

                        for val in values {
                            let mut text = RichText::new(val);
                            if *col == Column::RelianceEffect {
                                text = text.color(state.effect_colors.color_for(val));
                            }

                            let mut checked = state.is_selected(*col, val);
                            if ui.checkbox(&mut checked, text).changed() {
                                state.toggle_filter_value(*col, val);
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
            let can_export = state.dataset.is_some();
            if ui
                .add_enabled(can_export, egui::Button::new("Export filtered table…"))
                .clicked()
            {
                export_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(ds) = &state.dataset {
            ui.label(format!(
                "{} studies, {} reliance records, {} visible",
                ds.study_count(),
                ds.len(),
                state.view.rows.len()
            ));
            if let Some(source) = &state.source {
                ui.weak(source.display().to_string());
            }
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
        .set_title("Open review data")
        .add_filter(
            "Supported files",
            &["xlsx", "xlsm", "xls", "ods", "csv", "json", "parquet", "pq"],
        )
        .add_filter("Spreadsheet", &["xlsx", "xlsm", "xls", "ods"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        if let Err(e) = state.load_path(&path) {
            log::error!("Failed to load file: {e:#}");
            state.status_message = Some(format!("Error: {e:#}"));
        }
    }
}

pub fn export_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Export filtered table")
        .set_file_name("filtered_reliance.csv")
        .add_filter("CSV", &["csv"])
        .save_file();

    if let Some(path) = file {
        match state.export_filtered(&path) {
            Ok(()) => {
                state.status_message = None;
            }
            Err(e) => {
                log::error!("Failed to export: {e:#}");
                state.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}
