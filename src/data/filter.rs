use std::collections::{BTreeMap, BTreeSet};

use super::model::{Column, RelianceRecord};

// ---------------------------------------------------------------------------
// Filter predicate: which values are selected per column
// ---------------------------------------------------------------------------

/// Per-column selection state: maps column → set of allowed values.
/// If a column is absent or its set is empty, it means "no filter" (show all).
pub type FilterState = BTreeMap<Column, BTreeSet<String>>;

/// Whether a record passes every active column filter.
///
/// A missing cell never matches a non-empty selection.
pub fn matches(record: &RelianceRecord, filters: &FilterState) -> bool {
    filters.iter().all(|(column, selected)| {
        if selected.is_empty() {
            return true;
        }
        record
            .value(*column)
            .is_some_and(|value| selected.contains(value))
    })
}

/// Return indices of records that pass all active filters, in table order.
pub fn filtered_indices(records: &[RelianceRecord], filters: &FilterState) -> Vec<usize> {
    records
        .iter()
        .enumerate()
        .filter(|(_, record)| matches(record, filters))
        .map(|(i, _)| i)
        .collect()
}

/// Number of columns with a non-empty selection.
pub fn active_filter_count(filters: &FilterState) -> usize {
    filters.values().filter(|selected| !selected.is_empty()).count()
}
