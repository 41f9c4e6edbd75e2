use eframe::egui::{self, Ui};
use egui_extras::{Column as TableColumn, TableBuilder};

use crate::data::model::Column;
use crate::state::AppState;

const ROW_HEIGHT: f32 = 18.0;

/// Paginated listing of the filtered long table.
pub fn data_table(ui: &mut Ui, state: &mut AppState) {
    if state.dataset.is_none() {
        return;
    }

    ui.horizontal(|ui: &mut Ui| {
        ui.heading("Filtered Data Table");
        ui.add_space(12.0);
        if ui
            .add_enabled(state.page > 0, egui::Button::new("◀"))
            .clicked()
        {
            state.prev_page();
        }
        ui.label(format!("Page {} of {}", state.page + 1, state.page_count()));
        if ui
            .add_enabled(state.page + 1 < state.page_count(), egui::Button::new("▶"))
            .clicked()
        {
            state.next_page();
        }
    });

    if state.view.rows.is_empty() {
        ui.weak("No records match the current filters.");
        return;
    }

    let Some(dataset) = &state.dataset else {
        return;
    };
    let records = dataset.records();
    let page_rows = state.page_rows();

    egui::ScrollArea::horizontal()
        .id_salt("data_table_scroll")
        .show(ui, |ui: &mut Ui| {
            TableBuilder::new(ui)
                .striped(true)
                .resizable(true)
                .vscroll(false)
                .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
                .columns(TableColumn::auto().at_least(60.0).clip(true), Column::ALL.len())
                .header(ROW_HEIGHT + 4.0, |mut header| {
                    for col in Column::ALL {
                        header.col(|ui: &mut Ui| {
                            ui.strong(col.header());
                        });
                    }
                })
                .body(|body| {
                    body.rows(ROW_HEIGHT, page_rows.len(), |mut row| {
                        let record = &records[page_rows[row.index()]];
                        for col in Column::ALL {
                            row.col(|ui: &mut Ui| {
                                ui.label(record.value(col).unwrap_or(""));
                            });
                        }
                    });
                });
        });
}
