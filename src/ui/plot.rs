use std::collections::BTreeSet;

use eframe::egui::{self, Align2, FontId, Sense, Ui, Vec2};
use egui_plot::{Bar, BarChart, Legend, Plot};

use crate::color::{contrast_text, viridis};
use crate::data::aggregate::{BarCount, CrossTab};
use crate::data::model::{KNOWN_EFFECTS, RelianceType};
use crate::state::AppState;

const FACET_HEIGHT: f32 = 260.0;
const MISSING_LABEL: &str = "(missing)";

// ---------------------------------------------------------------------------
// Bar chart: reliance effects by explanation modality, one facet per type
// ---------------------------------------------------------------------------

/// Grouped bar chart of the bar counts, faceted by reliance type.
pub fn reliance_bar_chart(ui: &mut Ui, state: &AppState) {
    ui.heading("Reliance Effects by Explanation Modality");

    let bars = &state.view.bars;
    if bars.is_empty() {
        ui.weak("Nothing to chart for the current filters.");
        return;
    }

    let modalities: Vec<String> = bars
        .iter()
        .map(modality_label)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect();
    let effects = effect_order(bars);

    ui.columns(RelianceType::ALL.len(), |columns: &mut [Ui]| {
        for (ui, kind) in columns.iter_mut().zip(RelianceType::ALL) {
            ui.vertical_centered(|ui: &mut Ui| {
                ui.strong(kind.header());
            });
            facet(ui, state, kind, &modalities, &effects);
        }
    });
}

fn facet(
    ui: &mut Ui,
    state: &AppState,
    kind: RelianceType,
    modalities: &[String],
    effects: &[String],
) {
    let width = 0.8 / effects.len() as f64;
    let charts: Vec<BarChart> = effects
        .iter()
        .enumerate()
        .map(|(e_idx, effect)| {
            let offset = (e_idx as f64 - (effects.len() - 1) as f64 / 2.0) * width;
            let color = state.effect_colors.color_for(effect);
            let group: Vec<Bar> = state
                .view
                .bars
                .iter()
                .filter(|b| b.reliance_type == kind && b.effect == *effect)
                .filter_map(|b| {
                    let m_idx = modalities.iter().position(|m| m == modality_label(b))?;
                    Some(
                        Bar::new(m_idx as f64 + offset, b.count as f64)
                            .width(width)
                            .name(format!("{} · {effect}", modality_label(b))),
                    )
                })
                .collect();
            BarChart::new(group).name(effect).color(color)
        })
        .collect();

    let labels = modalities.to_vec();
    Plot::new(("reliance_bars", kind.header()))
        .height(FACET_HEIGHT)
        .legend(Legend::default())
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .allow_boxed_zoom(false)
        .include_y(0.0)
        .y_axis_label("Count")
        .x_axis_formatter(move |mark, _range| {
            let rounded = mark.value.round();
            if (mark.value - rounded).abs() > 1e-6 || rounded < 0.0 {
                return String::new();
            }
            labels.get(rounded as usize).cloned().unwrap_or_default()
        })
        .show(ui, |plot_ui| {
            for chart in charts {
                plot_ui.bar_chart(chart);
            }
        });
}

fn modality_label(bar: &BarCount) -> &str {
    bar.modality.as_deref().unwrap_or(MISSING_LABEL)
}

/// Increase and Decrease first, then any other effects alphabetically.
fn effect_order(bars: &[BarCount]) -> Vec<String> {
    let present: BTreeSet<&str> = bars.iter().map(|b| b.effect.as_str()).collect();
    let known = KNOWN_EFFECTS.iter().copied().filter(|e| present.contains(e));
    let other = present
        .iter()
        .copied()
        .filter(|e| !KNOWN_EFFECTS.contains(e));
    known.chain(other).map(str::to_string).collect()
}

// ---------------------------------------------------------------------------
// Heatmap: modality × format co-occurrences
// ---------------------------------------------------------------------------

const CELL_SIZE: Vec2 = Vec2::new(72.0, 28.0);

/// Colour-scaled matrix of the modality × format cross-tab.
pub fn heatmap(ui: &mut Ui, state: &AppState) {
    ui.heading("Co-occurrences of Explanation Modality and Format");

    let tab = &state.view.pivot;
    let range = tab.count_range().filter(|_| !tab.is_empty());
    let Some((min, max)) = range else {
        ui.weak("Nothing to chart for the current filters.");
        return;
    };

    egui::ScrollArea::horizontal()
        .id_salt("heatmap_scroll")
        .show(ui, |ui: &mut Ui| {
            egui::Grid::new("heatmap_grid")
                .spacing([2.0, 2.0])
                .show(ui, |ui: &mut Ui| {
                    ui.label("");
                    for format in &tab.formats {
                        ui.add_sized(CELL_SIZE, egui::Label::new(format.as_str()).truncate())
                            .on_hover_text(format.as_str());
                    }
                    ui.end_row();

                    for (row, modality) in tab.modalities.iter().enumerate() {
                        ui.strong(modality.as_str());
                        for col in 0..tab.formats.len() {
                            heatmap_cell(ui, tab, row, col, (min, max));
                        }
                        ui.end_row();
                    }
                });
        });

    color_bar(ui, min, max);
}

fn heatmap_cell(ui: &mut Ui, tab: &CrossTab, row: usize, col: usize, range: (usize, usize)) {
    let (rect, response) = ui.allocate_exact_size(CELL_SIZE, Sense::hover());
    let painter = ui.painter();

    let (fill, text) = match tab.get(row, col) {
        Some(count) => (viridis(scale(count, range)), count.to_string()),
        None => (ui.visuals().faint_bg_color, String::new()),
    };
    painter.rect_filled(rect, 2.0, fill);
    if !text.is_empty() {
        painter.text(
            rect.center(),
            Align2::CENTER_CENTER,
            &text,
            FontId::proportional(13.0),
            contrast_text(fill),
        );
    }

    let hover = format!(
        "Modality: {}\nFormat: {}\nCount: {}",
        tab.modalities[row],
        tab.formats[col],
        if text.is_empty() { "none observed" } else { text.as_str() }
    );
    response.on_hover_text(hover);
}

/// Position of `count` within the observed range; a single distinct count
/// sits mid-scale.
fn scale(count: usize, (min, max): (usize, usize)) -> f32 {
    if max == min {
        return 0.5;
    }
    (count.saturating_sub(min)) as f32 / (max - min) as f32
}

fn color_bar(ui: &mut Ui, min: usize, max: usize) {
    const STEPS: usize = 32;
    ui.horizontal(|ui: &mut Ui| {
        ui.label(min.to_string());
        let (rect, _) = ui.allocate_exact_size(Vec2::new(160.0, 12.0), Sense::hover());
        let step_width = rect.width() / STEPS as f32;
        for i in 0..STEPS {
            let left = rect.left() + i as f32 * step_width;
            let strip = egui::Rect::from_min_size(
                egui::pos2(left, rect.top()),
                Vec2::new(step_width + 0.5, rect.height()),
            );
            ui.painter()
                .rect_filled(strip, 0.0, viridis(i as f32 / (STEPS - 1) as f32));
        }
        ui.label(max.to_string());
    });
}
