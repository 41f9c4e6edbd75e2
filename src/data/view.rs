use std::ops::Range;

use super::aggregate::{BarCount, CrossTab, bar_counts, cross_tab};
use super::filter::{FilterState, filtered_indices};
use super::model::ReviewDataset;

/// Everything the dashboard draws for one filter selection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DashboardView {
    /// Indices into [`ReviewDataset::records`] passing the filters.
    pub rows: Vec<usize>,
    pub bars: Vec<BarCount>,
    pub pivot: CrossTab,
}

/// Recompute the filtered rows and both aggregates from scratch.
pub fn render(dataset: &ReviewDataset, filters: &FilterState) -> DashboardView {
    let rows = filtered_indices(dataset.records(), filters);
    let subset = || rows.iter().map(|&i| &dataset.records()[i]);

    let bars = bar_counts(subset());
    let pivot = cross_tab(subset());

    DashboardView { rows, bars, pivot }
}

/// Number of pages needed for `total` rows; at least one so an empty
/// table still shows "page 1 of 1".
pub fn page_count(total: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 1;
    }
    total.div_ceil(page_size).max(1)
}

/// Row range shown on `page` (zero-based), clamped to the last page.
pub fn page_bounds(total: usize, page_size: usize, page: usize) -> Range<usize> {
    if page_size == 0 {
        return 0..total;
    }
    let page = page.min(page_count(total, page_size) - 1);
    let start = page * page_size;
    start.min(total)..(start + page_size).min(total)
}
