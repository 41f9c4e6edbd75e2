use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::color::ColorMap;
use crate::data::export::export_csv;
use crate::data::filter::FilterState;
use crate::data::loader::load_file;
use crate::data::model::{Column, ReviewDataset};
use crate::data::view::{DashboardView, page_bounds, page_count, render};

/// Rows per table page when nothing else is configured.
pub const DEFAULT_PAGE_SIZE: usize = 10;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Loaded dataset (None until a file is loaded).
    pub dataset: Option<ReviewDataset>,

    /// File the dataset came from.
    pub source: Option<PathBuf>,

    /// Per-column filter selections.
    pub filters: FilterState,

    /// Table rows and chart data for the current filters (cached).
    pub view: DashboardView,

    /// Colours for reliance effects in the bar chart.
    pub effect_colors: ColorMap,

    /// Zero-based page of the data table.
    pub page: usize,

    pub page_size: usize,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            dataset: None,
            source: None,
            filters: FilterState::default(),
            view: DashboardView::default(),
            effect_colors: ColorMap::default(),
            page: 0,
            page_size: DEFAULT_PAGE_SIZE,
            status_message: None,
        }
    }
}

impl AppState {
    /// Ingest a newly loaded dataset and reset filters.
    pub fn set_dataset(&mut self, dataset: ReviewDataset, source: Option<PathBuf>) {
        if dataset.is_empty() {
            log::warn!("No reliance outcomes recorded in the loaded file");
        }
        self.filters = FilterState::default();
        self.effect_colors =
            ColorMap::for_effects(dataset.records().iter().map(|r| r.effect.as_str()));
        self.view = render(&dataset, &self.filters);
        self.page = 0;

        self.dataset = Some(dataset);
        self.source = source;
        self.status_message = None;
    }

    /// Load a file, replacing the current dataset. On failure the current
    /// dataset is kept.
    pub fn load_path(&mut self, path: &Path) -> Result<()> {
        let dataset =
            load_file(path).with_context(|| format!("loading {}", path.display()))?;
        self.set_dataset(dataset, Some(path.to_path_buf()));
        Ok(())
    }

    /// Recompute the cached view after a filter change.
    pub fn refilter(&mut self) {
        if let Some(ds) = &self.dataset {
            self.view = render(ds, &self.filters);
        }
        self.page = 0;
    }

    /// Toggle a single value in a column's selection.
    pub fn toggle_filter_value(&mut self, column: Column, value: &str) {
        let selected = self.filters.entry(column).or_default();
        if !selected.remove(value) {
            selected.insert(value.to_string());
        }
        self.refilter();
    }

    /// Drop the selection for one column (no restriction).
    pub fn clear_filter(&mut self, column: Column) {
        if self.filters.remove(&column).is_some() {
            self.refilter();
        }
    }

    /// Drop every selection.
    pub fn clear_all_filters(&mut self) {
        self.filters.clear();
        self.refilter();
    }

    pub fn is_selected(&self, column: Column, value: &str) -> bool {
        self.filters
            .get(&column)
            .is_some_and(|selected| selected.contains(value))
    }

    pub fn page_count(&self) -> usize {
        page_count(self.view.rows.len(), self.page_size)
    }

    /// Long-table indices on the current page.
    pub fn page_rows(&self) -> &[usize] {
        &self.view.rows[page_bounds(self.view.rows.len(), self.page_size, self.page)]
    }

    pub fn next_page(&mut self) {
        self.page = (self.page + 1).min(self.page_count() - 1);
    }

    pub fn prev_page(&mut self) {
        self.page = self.page.saturating_sub(1);
    }

    /// Write the currently filtered rows to `path` as CSV.
    pub fn export_filtered(&self, path: &Path) -> Result<()> {
        let dataset = self.dataset.as_ref().context("no dataset loaded")?;
        export_csv(path, dataset, &self.view.rows)
    }
}
