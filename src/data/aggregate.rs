use std::collections::{BTreeMap, BTreeSet};

use super::model::{RelianceRecord, RelianceType};

// ---------------------------------------------------------------------------
// Grouped counts for the bar chart
// ---------------------------------------------------------------------------

/// Number of rows sharing one (modality, reliance type, effect) triple.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BarCount {
    /// `None` groups rows whose modality cell was empty.
    pub modality: Option<String>,
    pub reliance_type: RelianceType,
    pub effect: String,
    pub count: usize,
}

/// Group the subset by (modality, reliance type, effect) and count.
///
/// Only triples that occur are returned, sorted by the triple.
pub fn bar_counts<'a, I>(subset: I) -> Vec<BarCount>
where
    I: IntoIterator<Item = &'a RelianceRecord>,
{
    let mut groups: BTreeMap<(Option<&'a str>, RelianceType, &'a str), usize> = BTreeMap::new();
    for record in subset {
        let key = (
            record.attributes.modality.as_deref(),
            record.reliance_type,
            record.effect.as_str(),
        );
        *groups.entry(key).or_default() += 1;
    }

    groups
        .into_iter()
        .map(|((modality, reliance_type, effect), count)| BarCount {
            modality: modality.map(str::to_string),
            reliance_type,
            effect: effect.to_string(),
            count,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Modality × format cross-tab for the heatmap
// ---------------------------------------------------------------------------

/// Co-occurrence counts of explanation modality (rows) and format (columns).
///
/// A cell is `None` when the pair never occurs in the subset, which the
/// heatmap draws differently from a count.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrossTab {
    pub modalities: Vec<String>,
    pub formats: Vec<String>,
    cells: Vec<Vec<Option<usize>>>,
}

impl CrossTab {
    pub fn get(&self, row: usize, col: usize) -> Option<usize> {
        self.cells.get(row)?.get(col).copied().flatten()
    }

    /// Smallest and largest observed count, `None` when no pair occurs.
    pub fn count_range(&self) -> Option<(usize, usize)> {
        let counts = self.cells.iter().flatten().filter_map(|c| *c);
        let min = counts.clone().min()?;
        let max = counts.max()?;
        Some((min, max))
    }

    pub fn is_empty(&self) -> bool {
        self.modalities.is_empty() || self.formats.is_empty()
    }
}

/// Count the subset by (modality, format). Rows missing either value are
/// left out, as they have no cell to land in.
pub fn cross_tab<'a, I>(subset: I) -> CrossTab
where
    I: IntoIterator<Item = &'a RelianceRecord>,
{
    let mut counts: BTreeMap<(&'a str, &'a str), usize> = BTreeMap::new();
    let mut modalities: BTreeSet<&'a str> = BTreeSet::new();
    let mut formats: BTreeSet<&'a str> = BTreeSet::new();

    for record in subset {
        let (Some(modality), Some(format)) = (
            record.attributes.modality.as_deref(),
            record.attributes.format.as_deref(),
        ) else {
            continue;
        };
        modalities.insert(modality);
        formats.insert(format);
        *counts.entry((modality, format)).or_default() += 1;
    }

    let cells = modalities
        .iter()
        .map(|m| {
            formats
                .iter()
                .map(|f| counts.get(&(*m, *f)).copied())
                .collect()
        })
        .collect();

    CrossTab {
        modalities: modalities.into_iter().map(str::to_string).collect(),
        formats: formats.into_iter().map(str::to_string).collect(),
        cells,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::{FilterState, filtered_indices};
    use crate::data::model::tests::study;
    use crate::data::model::{Column, ReviewDataset};

    fn sample() -> ReviewDataset {
        ReviewDataset::from_studies(&[
            study("R1", "Visual", "Heatmap", ["Increase", "", "Decrease"]),
            study("R2", "Textual", "Rules", ["", "Decrease", ""]),
            study("R3", "Visual", "Heatmap", ["Increase", "Increase", ""]),
            study("R4", "", "Speech", ["", "", "Increase"]),
        ])
    }

    #[test]
    fn bar_counts_sum_to_subset_size() {
        let ds = sample();
        let bars = bar_counts(ds.records());
        assert_eq!(bars.iter().map(|b| b.count).sum::<usize>(), ds.len());
    }

    #[test]
    fn bar_counts_group_identical_triples() {
        let ds = sample();
        let bars = bar_counts(ds.records());
        let visual_over_increase = bars
            .iter()
            .find(|b| {
                b.modality.as_deref() == Some("Visual")
                    && b.reliance_type == RelianceType::OverReliance
                    && b.effect == "Increase"
            })
            .map(|b| b.count);
        assert_eq!(visual_over_increase, Some(2));
        assert!(bars.iter().all(|b| b.count > 0));
        assert_eq!(bars.len(), 5);
    }

    #[test]
    fn five_visual_increase_rows_out_of_eight() {
        let mut studies = Vec::new();
        for i in 0..5 {
            studies.push(study(&format!("V{i}"), "Visual", "Chart", ["Increase", "", ""]));
        }
        studies.push(study("T1", "Textual", "Rules", ["Increase", "", ""]));
        studies.push(study("V9", "Visual", "Chart", ["", "Decrease", ""]));
        studies.push(study("A1", "Audio", "Speech", ["", "", "Decrease"]));
        let ds = ReviewDataset::from_studies(&studies);
        assert_eq!(ds.len(), 8);

        let filters = FilterState::from([
            (Column::Modality, ["Visual".to_string()].into()),
            (Column::RelianceEffect, ["Increase".to_string()].into()),
        ]);
        let rows = filtered_indices(ds.records(), &filters);
        assert_eq!(rows.len(), 5);

        let bars = bar_counts(rows.iter().map(|&i| &ds.records()[i]));
        assert_eq!(bars.iter().map(|b| b.count).sum::<usize>(), 5);
    }

    #[test]
    fn cross_tab_marks_unobserved_pairs_as_none() {
        let ds = sample();
        let tab = cross_tab(ds.records());

        assert_eq!(tab.modalities, vec!["Textual", "Visual"]);
        assert_eq!(tab.formats, vec!["Heatmap", "Rules"]);
        assert_eq!(tab.get(1, 0), Some(4));
        assert_eq!(tab.get(0, 1), Some(1));
        assert_eq!(tab.get(0, 0), None);
        assert_eq!(tab.get(1, 1), None);
        assert_eq!(tab.count_range(), Some((1, 4)));
    }

    #[test]
    fn empty_subset_gives_empty_aggregates() {
        let none: Vec<RelianceRecord> = Vec::new();
        assert!(bar_counts(&none).is_empty());

        let tab = cross_tab(&none);
        assert!(tab.is_empty());
        assert_eq!(tab.count_range(), None);
        assert_eq!(tab.get(0, 0), None);
    }
}
